use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role. Admin accounts unlock the management API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A store account. The password hash never leaves the database layer;
/// responses use [`UserView`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: String,
}

/// Public projection of a user, safe to serialize in responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
        }
    }
}

/// User row in the admin listing, with how many orders it has placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithOrderCount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub created_at: String,
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub created_at: String,
}

/// Catalog entry with its reviews embedded, newest review first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductWithReviews {
    #[serde(flatten)]
    pub product: Product,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub product_id: i64,
    pub rating: i32,
    pub content: String,
    pub image: Option<String>,
    pub created_at: String,
}

/// Minimal product reference embedded in admin review rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewWithProduct {
    #[serde(flatten)]
    pub review: Review,
    pub product: Option<ProductRef>,
}

/// The social/messaging platform an order is handed off to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OrderChannel {
    Whatsapp,
    Instagram,
    Facebook,
}

impl OrderChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
        }
    }

    /// Display name used in dashboard buckets.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Whatsapp => "WhatsApp",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
        }
    }

    pub const ALL: [OrderChannel; 3] = [Self::Whatsapp, Self::Instagram, Self::Facebook];
}

impl FromStr for OrderChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatsapp" => Ok(Self::Whatsapp),
            "instagram" => Ok(Self::Instagram),
            "facebook" => Ok(Self::Facebook),
            _ => Err(format!("Invalid order channel: {}", s)),
        }
    }
}

/// Flat, manually-transitioned order state. No enforced transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub const ALL: [OrderStatus; 4] =
        [Self::Pending, Self::Processing, Self::Completed, Self::Cancelled];
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub quantity: i64,
    pub total_price: f64,
    #[serde(rename = "orderType")]
    pub channel: OrderChannel,
    #[serde(rename = "orderStatus")]
    pub status: OrderStatus,
    pub order_date: String,
}

/// Product summary embedded in order listings. Null when the product has
/// since been deleted from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithProduct {
    #[serde(flatten)]
    pub order: Order,
    pub product: Option<ProductSummary>,
}

/// Global store settings: the single record driving WhatsApp handoff links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
    pub whatsapp_number: Option<String>,
    pub whatsapp_template: Option<String>,
}

// Dashboard view types

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRevenue {
    pub date: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: i64,
    pub total_revenue: f64,
    pub total_products: i64,
    pub total_reviews: i64,
    pub orders_by_channel: Vec<NamedCount>,
    pub orders_by_status: Vec<NamedCount>,
    pub daily_revenue: Vec<DailyRevenue>,
}
