use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::auth::{self, Claims};
use crate::cart::CartLine;
use crate::dashboard;
use crate::db::{DbHandle, NewOrder};
use crate::errors::AuthError;
use crate::models::{OrderChannel, OrderStatus, UserView};
use crate::seed;
use crate::whatsapp;

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub db: DbHandle,
    pub jwt_secret: String,
    pub dev_mode: bool,
}

pub type SharedState = Arc<AppState>;

// ── Request payload types ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    // Accepts a number or a numeric string, as submitted by the admin form.
    pub price: Option<Value>,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub product_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub total_price: Option<Value>,
    pub order_type: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Option<Vec<CartLine>>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub order_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub order_status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub product_id: Option<i64>,
    pub rating: Option<Value>,
    pub content: Option<String>,
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminSettingsRequest {
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub whatsapp_number: Option<String>,
    pub whatsapp_template: Option<String>,
}

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub phone: Option<String>,
}

// ── Error handling ────────────────────────────────────────────────────

pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::AdminRequired => ApiError::Forbidden(err.to_string()),
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        .route("/api/setup", post(setup))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/checkout", post(checkout))
        .route("/api/orders/{id}", put(update_order))
        .route("/api/reviews", post(create_review))
        .route("/api/reviews/{id}", delete(delete_review))
        .route("/api/settings", get(public_settings))
        .route("/api/admin/reviews", get(admin_list_reviews))
        .route("/api/admin/users", get(admin_list_users))
        .route(
            "/api/admin/settings",
            get(admin_settings).put(admin_update_settings),
        )
        .route("/api/admin/dashboard", get(admin_dashboard))
        .route("/health", get(health_check))
}

// ── Helpers ───────────────────────────────────────────────────────────

fn require_admin(state: &SharedState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    Ok(auth::require_admin(headers, &state.jwt_secret)?)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::Internal(err.to_string())
}

/// Numbers may arrive as JSON numbers or as numeric strings from forms.
fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required<'a>(field: &'a Option<String>) -> Option<&'a str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Empty or whitespace-only strings collapse to None.
fn normalize(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn session_response(
    user: &crate::models::User,
    state: &SharedState,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let token = auth::generate_token(user, &state.jwt_secret).map_err(internal)?;
    let cookie = auth::session_cookie(&token, state.dev_mode);
    let body = serde_json::json!({"token": token, "user": UserView::from(user)});
    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

// ── Handlers ──────────────────────────────────────────────────────────

async fn health_check() -> &'static str {
    "ok"
}

async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (required(&req.email), required(&req.password)) else {
        return Err(ApiError::BadRequest(
            "Email and password are required".into(),
        ));
    };
    let email = email.to_string();
    let password = password.to_string();

    let user = state
        .db
        .call(move |db| db.get_user_by_email(&email))
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".into()))?;

    if !auth::verify_password(&password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Invalid email or password".into()));
    }

    session_response(&user, &state, StatusCode::OK)
}

async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let (Some(name), Some(email), Some(phone), Some(password)) = (
        required(&req.name),
        required(&req.email),
        required(&req.phone),
        required(&req.password),
    ) else {
        return Err(ApiError::BadRequest("All fields are required".into()));
    };
    let (name, email, phone) = (name.to_string(), email.to_string(), phone.to_string());

    let hash = auth::hash_password(password).map_err(internal)?;

    let lookup_email = email.clone();
    let exists = state
        .db
        .call(move |db| db.get_user_by_email(&lookup_email))
        .await
        .map_err(internal)?
        .is_some();
    if exists {
        return Err(ApiError::BadRequest("Email already in use".into()));
    }

    let user = state
        .db
        .call(move |db| {
            db.create_user(&name, &email, &phone, &hash, crate::models::Role::Customer)
        })
        .await
        .map_err(internal)?;

    session_response(&user, &state, StatusCode::CREATED)
}

async fn me(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let claims = auth::authenticate(&headers, &state.jwt_secret)?;
    let user = state
        .db
        .call(move |db| db.get_user(claims.user_id))
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(serde_json::json!({"user": UserView::from(&user)})))
}

async fn setup(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let (user, created) = state
        .db
        .call(|db| seed::ensure_admin(db))
        .await
        .map_err(internal)?;
    if !created {
        return Err(ApiError::BadRequest("Admin user already exists".into()));
    }
    let token = auth::generate_token(&user, &state.jwt_secret).map_err(internal)?;
    Ok(Json(serde_json::json!({
        "message": "Admin user created successfully",
        "user": UserView::from(&user),
        "token": token,
    })))
}

async fn list_products(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .db
        .call(|db| db.list_products_with_reviews())
        .await
        .map_err(internal)?;
    Ok(Json(products))
}

async fn get_product(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .db
        .call(move |db| db.get_product_with_reviews(id))
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

/// Fields shared by product create and update, all mandatory.
fn validated_product(
    req: &ProductRequest,
) -> Result<(String, String, f64, String, String), ApiError> {
    let (Some(name), Some(description), Some(category), Some(image)) = (
        required(&req.name),
        required(&req.description),
        required(&req.category),
        required(&req.image),
    ) else {
        return Err(ApiError::BadRequest("All fields are required".into()));
    };
    let price = req
        .price
        .as_ref()
        .and_then(number_from)
        .ok_or_else(|| ApiError::BadRequest("All fields are required".into()))?;
    Ok((
        name.to_string(),
        description.to_string(),
        price,
        category.to_string(),
        image.to_string(),
    ))
}

async fn create_product(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<ProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let (name, description, price, category, image) = validated_product(&req)?;
    let product = state
        .db
        .call(move |db| db.create_product(&name, &description, price, &category, &image))
        .await
        .map_err(internal)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let (name, description, price, category, image) = validated_product(&req)?;
    let product = state
        .db
        .call(move |db| {
            if db.get_product(id)?.is_none() {
                return Ok(None);
            }
            db.update_product(id, &name, &description, price, &category, &image)
                .map(Some)
        })
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let deleted = state
        .db
        .call(move |db| db.delete_product(id))
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::NotFound("Product not found".into()));
    }
    Ok(Json(serde_json::json!({"message": "Product deleted"})))
}

async fn list_orders(
    State(state): State<SharedState>,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let phone = normalize(query.phone);
    let orders = state
        .db
        .call(move |db| db.list_orders(phone.as_deref()))
        .await
        .map_err(internal)?;
    Ok(Json(orders))
}

async fn create_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(product_id), Some(customer_name), Some(customer_phone), Some(order_type)) = (
        req.product_id,
        required(&req.customer_name),
        required(&req.customer_phone),
        required(&req.order_type),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };

    let channel = OrderChannel::from_str(&order_type.to_lowercase())
        .map_err(ApiError::BadRequest)?;
    let total_price = req
        .total_price
        .as_ref()
        .and_then(number_from)
        .filter(|price| *price > 0.0)
        .ok_or_else(|| ApiError::BadRequest("Invalid price value".into()))?;

    let customer_name = customer_name.to_string();
    let customer_phone = customer_phone.to_string();
    let customer_email = normalize(req.customer_email);
    let quantity = req.quantity.unwrap_or(1).max(1);
    // Logged-in customers get the order attached to their account.
    let user_id = auth::authenticate(&headers, &state.jwt_secret)
        .ok()
        .map(|claims| claims.user_id);

    let order = state
        .db
        .call(move |db| {
            if db.get_product(product_id)?.is_none() {
                return Ok(None);
            }
            db.create_order(&NewOrder {
                product_id,
                user_id,
                customer_name: &customer_name,
                customer_phone: &customer_phone,
                customer_email: customer_email.as_deref(),
                quantity,
                total_price,
                channel,
            })
            .map(Some)
        })
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    Ok((StatusCode::CREATED, Json(order)))
}

async fn checkout(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let items = req.items.unwrap_or_default();
    if items.is_empty() {
        return Err(ApiError::BadRequest("Cart is empty".into()));
    }
    let (Some(customer_name), Some(customer_phone), Some(order_type)) = (
        required(&req.customer_name),
        required(&req.customer_phone),
        required(&req.order_type),
    ) else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };
    let channel = OrderChannel::from_str(&order_type.to_lowercase())
        .map_err(ApiError::BadRequest)?;
    if items.iter().any(|line| line.price <= 0.0) {
        return Err(ApiError::BadRequest("Invalid price value".into()));
    }

    let customer_name = customer_name.to_string();
    let customer_phone = customer_phone.to_string();
    let customer_email = normalize(req.customer_email);
    let user_id = auth::authenticate(&headers, &state.jwt_secret)
        .ok()
        .map(|claims| claims.user_id);

    let db_items = items.clone();
    let (name, phone, email) = (
        customer_name.clone(),
        customer_phone.clone(),
        customer_email.clone(),
    );
    let (orders, settings) = state
        .db
        .call(move |db| {
            // Verify the whole cart before inserting anything, so a missing
            // product cannot leave a partially recorded checkout behind.
            for line in &db_items {
                if db.get_product(line.product_id)?.is_none() {
                    return Ok(None);
                }
            }
            let mut orders = Vec::with_capacity(db_items.len());
            for line in &db_items {
                orders.push(db.create_order(&NewOrder {
                    product_id: line.product_id,
                    user_id,
                    customer_name: &name,
                    customer_phone: &phone,
                    customer_email: email.as_deref(),
                    quantity: line.effective_quantity(),
                    total_price: line.line_total(),
                    channel,
                })?);
            }
            let settings = db.get_or_create_settings()?;
            Ok(Some((orders, settings)))
        })
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    // Single-item carts use the configurable per-product message, bigger
    // carts get the itemized one.
    let message = if let [line] = items.as_slice() {
        let ctx = whatsapp::MessageContext {
            product: &line.name,
            quantity: line.effective_quantity(),
            total: line.line_total(),
            name: &customer_name,
            phone: &customer_phone,
            email: customer_email.as_deref(),
        };
        match settings.whatsapp_template.as_deref() {
            Some(template) => whatsapp::render_message(template, &ctx),
            None => whatsapp::default_message(&ctx),
        }
    } else {
        whatsapp::cart_message(
            &items,
            &whatsapp::Customer {
                name: &customer_name,
                phone: &customer_phone,
                email: customer_email.as_deref(),
            },
        )
    };
    let whatsapp_link = match (channel, settings.whatsapp_number.as_deref()) {
        (OrderChannel::Whatsapp, Some(number)) => Some(whatsapp::deep_link(number, &message)),
        _ => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "orders": orders,
            "message": message,
            "whatsappLink": whatsapp_link,
        })),
    ))
}

async fn update_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let status = required(&req.order_status)
        .ok_or_else(|| ApiError::BadRequest("Missing required fields".into()))
        .and_then(|s| OrderStatus::from_str(&s.to_lowercase()).map_err(ApiError::BadRequest))?;
    let order = state
        .db
        .call(move |db| db.update_order_status(id, status))
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;
    Ok(Json(order))
}

async fn create_review(
    State(state): State<SharedState>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(product_id), Some(content)) = (req.product_id, required(&req.content)) else {
        return Err(ApiError::BadRequest("Missing required fields".into()));
    };
    let rating = req
        .rating
        .as_ref()
        .and_then(number_from)
        .ok_or_else(|| ApiError::BadRequest("Missing required fields".into()))?;
    if rating.fract() != 0.0 || !(1.0..=5.0).contains(&rating) {
        return Err(ApiError::BadRequest("Rating must be between 1 and 5".into()));
    }
    let rating = rating as i32;

    let content = content.to_string();
    let image = normalize(req.image);
    let review = state
        .db
        .call(move |db| {
            if db.get_product(product_id)?.is_none() {
                return Ok(None);
            }
            db.create_review(product_id, rating, &content, image.as_deref())
                .map(Some)
        })
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    Ok((StatusCode::CREATED, Json(review)))
}

async fn delete_review(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let deleted = state
        .db
        .call(move |db| db.delete_review(id))
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::NotFound("Review not found".into()));
    }
    Ok(Json(serde_json::json!({"message": "Review deleted"})))
}

async fn public_settings(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let settings = state
        .db
        .call(|db| db.get_or_create_settings())
        .await
        .map_err(internal)?;
    Ok(Json(settings))
}

async fn admin_list_reviews(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let reviews = state
        .db
        .call(|db| db.list_reviews_with_product())
        .await
        .map_err(internal)?;
    Ok(Json(reviews))
}

async fn admin_list_users(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let users = state
        .db
        .call(|db| db.list_users_with_order_counts())
        .await
        .map_err(internal)?;
    Ok(Json(users))
}

async fn admin_settings(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_admin(&state, &headers)?;
    let (user, settings) = state
        .db
        .call(move |db| {
            let user = db.get_user(claims.user_id)?;
            let settings = db.get_or_create_settings()?;
            Ok((user, settings))
        })
        .await
        .map_err(internal)?;
    let user = user.ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(serde_json::json!({
        "user": UserView::from(&user),
        "settings": settings,
    })))
}

async fn admin_update_settings(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(req): Json<UpdateAdminSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = require_admin(&state, &headers)?;

    let current_password = required(&req.current_password)
        .ok_or_else(|| ApiError::BadRequest("Current password is required".into()))?
        .to_string();

    let user = state
        .db
        .call(move |db| db.get_user(claims.user_id))
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if !auth::verify_password(&current_password, &user.password_hash) {
        return Err(ApiError::BadRequest("Current password is incorrect".into()));
    }

    // Account changes: email and/or password.
    let new_email = match normalize(req.email) {
        Some(email) if email != user.email => {
            let lookup = email.clone();
            let taken = state
                .db
                .call(move |db| db.get_user_by_email(&lookup))
                .await
                .map_err(internal)?
                .is_some();
            if taken {
                return Err(ApiError::BadRequest("Email already in use".into()));
            }
            Some(email)
        }
        _ => None,
    };
    let new_hash = match normalize(req.new_password) {
        Some(password) => {
            if password.len() < 6 {
                return Err(ApiError::BadRequest(
                    "Password must be at least 6 characters".into(),
                ));
            }
            Some(auth::hash_password(&password).map_err(internal)?)
        }
        None => None,
    };

    // Store settings changes: an absent field keeps the stored value, an
    // empty string clears it.
    let number_update = req.whatsapp_number.map(normalize_field);
    let template_update = req.whatsapp_template.map(normalize_field);

    if new_email.is_none()
        && new_hash.is_none()
        && number_update.is_none()
        && template_update.is_none()
    {
        return Err(ApiError::BadRequest("No changes provided".into()));
    }

    let user_id = user.id;
    let (user, settings) = state
        .db
        .call(move |db| {
            let user = if new_email.is_some() || new_hash.is_some() {
                db.update_user_account(user_id, new_email.as_deref(), new_hash.as_deref())?
            } else {
                db.get_user(user_id)?
                    .ok_or_else(|| anyhow::anyhow!("User disappeared during update"))?
            };
            let current = db.get_or_create_settings()?;
            let settings = if number_update.is_some() || template_update.is_some() {
                let number = number_update.unwrap_or(current.whatsapp_number);
                let template = template_update.unwrap_or(current.whatsapp_template);
                db.update_settings(number.as_deref(), template.as_deref())?
            } else {
                current
            };
            Ok((user, settings))
        })
        .await
        .map_err(internal)?;

    Ok(Json(serde_json::json!({
        "user": UserView::from(&user),
        "settings": settings,
    })))
}

fn normalize_field(value: String) -> Option<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

async fn admin_dashboard(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&state, &headers)?;
    let (orders, total_products, total_reviews) = state
        .db
        .call(|db| {
            let orders = db.list_all_orders()?;
            let products = db.count_products()?;
            let reviews = db.count_reviews()?;
            Ok((orders, products, reviews))
        })
        .await
        .map_err(internal)?;
    let stats = dashboard::compute_stats(
        &orders,
        total_products,
        total_reviews,
        Utc::now().date_naive(),
    );
    Ok(Json(stats))
}

// ── Tests ─────────────────────────────────────────────────────────────
