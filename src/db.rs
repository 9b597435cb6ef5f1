use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::models::*;

/// Async-safe handle to the store database.
///
/// Wraps `StoreDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, preventing synchronous SQLite
/// I/O from tying up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<StoreDb>>,
}

impl DbHandle {
    pub fn new(db: StoreDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&StoreDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }
}

pub struct StoreDb {
    conn: Connection,
}

/// Parameters for recording a new order. `user_id` is only populated when the
/// order is placed by a logged-in account.
pub struct NewOrder<'a> {
    pub product_id: i64,
    pub user_id: Option<i64>,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub customer_email: Option<&'a str>,
    pub quantity: i64,
    pub total_price: f64,
    pub channel: OrderChannel,
}

impl StoreDb {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    phone TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    role TEXT NOT NULL DEFAULT 'customer',
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE TABLE IF NOT EXISTS products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    price REAL NOT NULL,
                    category TEXT NOT NULL,
                    image TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                -- product_id is intentionally not a foreign key: orders outlive
                -- catalog deletions, and listings tolerate the dangling id.
                CREATE TABLE IF NOT EXISTS orders (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    product_id INTEGER NOT NULL,
                    user_id INTEGER REFERENCES users(id),
                    customer_name TEXT NOT NULL,
                    customer_phone TEXT NOT NULL,
                    customer_email TEXT,
                    quantity INTEGER NOT NULL DEFAULT 1,
                    total_price REAL NOT NULL,
                    channel TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'pending',
                    order_date TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE TABLE IF NOT EXISTS reviews (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                    rating INTEGER NOT NULL,
                    content TEXT NOT NULL,
                    image TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE TABLE IF NOT EXISTS settings (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    whatsapp_number TEXT,
                    whatsapp_template TEXT,
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email);
                CREATE INDEX IF NOT EXISTS idx_orders_phone ON orders(customer_phone);
                CREATE INDEX IF NOT EXISTS idx_orders_product ON orders(product_id);
                CREATE INDEX IF NOT EXISTS idx_reviews_product ON reviews(product_id);
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    // ── User CRUD ─────────────────────────────────────────────────────

    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User> {
        self.conn
            .execute(
                "INSERT INTO users (name, email, phone, password_hash, role) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, email, phone, password_hash, role.as_str()],
            )
            .context("Failed to insert user")?;
        let id = self.conn.last_insert_rowid();
        self.get_user(id)?.context("User not found after insert")
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.query_user("SELECT id, name, email, phone, password_hash, role, created_at FROM users WHERE id = ?1", params![id])
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_user("SELECT id, name, email, phone, password_hash, role, created_at FROM users WHERE email = ?1", params![email])
    }

    fn query_user(&self, sql: &str, args: impl rusqlite::Params) -> Result<Option<User>> {
        let mut stmt = self.conn.prepare(sql).context("Failed to prepare user query")?;
        let mut rows = stmt
            .query_map(args, |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                    password_hash: row.get(4)?,
                    role: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .context("Failed to query user")?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("Failed to read user row")?.into_user()?)),
            None => Ok(None),
        }
    }

    /// All users, newest first, with the number of orders each has placed.
    pub fn list_users_with_order_counts(&self) -> Result<Vec<UserWithOrderCount>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT u.id, u.name, u.email, u.phone, u.role, u.created_at, COUNT(o.id)
                 FROM users u LEFT JOIN orders o ON o.user_id = u.id
                 GROUP BY u.id ORDER BY u.created_at DESC, u.id DESC",
            )
            .context("Failed to prepare list_users")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })
            .context("Failed to query users")?;
        let mut users = Vec::new();
        for row in rows {
            let (id, name, email, phone, role, created_at, order_count) =
                row.context("Failed to read user row")?;
            let role = Role::from_str(&role)
                .map_err(|e| anyhow::anyhow!(e))
                .context("Failed to parse user role")?;
            users.push(UserWithOrderCount {
                id,
                name,
                email,
                phone,
                role,
                created_at,
                order_count,
            });
        }
        Ok(users)
    }

    /// Update the email and/or password hash of an account.
    pub fn update_user_account(
        &self,
        id: i64,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User> {
        if let Some(email) = email {
            self.conn
                .execute("UPDATE users SET email = ?1 WHERE id = ?2", params![email, id])
                .context("Failed to update user email")?;
        }
        if let Some(hash) = password_hash {
            self.conn
                .execute(
                    "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                    params![hash, id],
                )
                .context("Failed to update user password")?;
        }
        self.get_user(id)?.context("User not found after update")
    }

    // ── Product CRUD ──────────────────────────────────────────────────

    pub fn create_product(
        &self,
        name: &str,
        description: &str,
        price: f64,
        category: &str,
        image: &str,
    ) -> Result<Product> {
        self.conn
            .execute(
                "INSERT INTO products (name, description, price, category, image) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, description, price, category, image],
            )
            .context("Failed to insert product")?;
        let id = self.conn.last_insert_rowid();
        self.get_product(id)?
            .context("Product not found after insert")
    }

    pub fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, description, price, category, image, created_at FROM products WHERE id = ?1",
            )
            .context("Failed to prepare get_product")?;
        let mut rows = stmt
            .query_map(params![id], |row| {
                Ok(Product {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    price: row.get(3)?,
                    category: row.get(4)?,
                    image: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .context("Failed to query product")?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("Failed to read product row")?)),
            None => Ok(None),
        }
    }

    pub fn get_product_with_reviews(&self, id: i64) -> Result<Option<ProductWithReviews>> {
        let Some(product) = self.get_product(id)? else {
            return Ok(None);
        };
        let reviews = self.list_reviews_for_product(product.id)?;
        Ok(Some(ProductWithReviews { product, reviews }))
    }

    /// Full catalog, newest product first, each with its reviews embedded.
    pub fn list_products_with_reviews(&self) -> Result<Vec<ProductWithReviews>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, description, price, category, image, created_at
                 FROM products ORDER BY created_at DESC, id DESC",
            )
            .context("Failed to prepare list_products")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Product {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    price: row.get(3)?,
                    category: row.get(4)?,
                    image: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .context("Failed to query products")?;
        let mut products = Vec::new();
        for row in rows {
            let product = row.context("Failed to read product row")?;
            let reviews = self.list_reviews_for_product(product.id)?;
            products.push(ProductWithReviews { product, reviews });
        }
        Ok(products)
    }

    pub fn update_product(
        &self,
        id: i64,
        name: &str,
        description: &str,
        price: f64,
        category: &str,
        image: &str,
    ) -> Result<Product> {
        self.conn
            .execute(
                "UPDATE products SET name = ?1, description = ?2, price = ?3, category = ?4, image = ?5 WHERE id = ?6",
                params![name, description, price, category, image, id],
            )
            .context("Failed to update product")?;
        self.get_product(id)?
            .context("Product not found after update")
    }

    /// Delete a product; its reviews cascade. Returns false when no row matched.
    pub fn delete_product(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])
            .context("Failed to delete product")?;
        Ok(deleted > 0)
    }

    pub fn count_products(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .context("Failed to count products")
    }

    // ── Order CRUD ────────────────────────────────────────────────────

    pub fn create_order(&self, order: &NewOrder<'_>) -> Result<Order> {
        self.conn
            .execute(
                "INSERT INTO orders (product_id, user_id, customer_name, customer_phone, customer_email, quantity, total_price, channel)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    order.product_id,
                    order.user_id,
                    order.customer_name,
                    order.customer_phone,
                    order.customer_email,
                    order.quantity,
                    order.total_price,
                    order.channel.as_str(),
                ],
            )
            .context("Failed to insert order")?;
        let id = self.conn.last_insert_rowid();
        self.get_order(id)?.context("Order not found after insert")
    }

    pub fn get_order(&self, id: i64) -> Result<Option<Order>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, product_id, user_id, customer_name, customer_phone, customer_email, quantity, total_price, channel, status, order_date
                 FROM orders WHERE id = ?1",
            )
            .context("Failed to prepare get_order")?;
        let mut rows = stmt
            .query_map(params![id], order_row)
            .context("Failed to query order")?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("Failed to read order row")?.into_order()?)),
            None => Ok(None),
        }
    }

    /// Orders newest first, each with a summary of its product (null when the
    /// product was deleted). `phone` filters on the exact customer phone.
    pub fn list_orders(&self, phone: Option<&str>) -> Result<Vec<OrderWithProduct>> {
        let base = "SELECT o.id, o.product_id, o.user_id, o.customer_name, o.customer_phone, o.customer_email, o.quantity, o.total_price, o.channel, o.status, o.order_date,
                           p.id, p.name, p.image, p.price
                    FROM orders o LEFT JOIN products p ON p.id = o.product_id";
        let order_by = " ORDER BY o.order_date DESC, o.id DESC";

        let map = |row: &rusqlite::Row<'_>| {
            let order = order_row(row)?;
            let product = match row.get::<_, Option<i64>>(11)? {
                Some(pid) => Some(ProductSummary {
                    id: pid,
                    name: row.get(12)?,
                    image: row.get(13)?,
                    price: row.get(14)?,
                }),
                None => None,
            };
            Ok((order, product))
        };

        let mut orders = Vec::new();
        match phone {
            Some(phone) => {
                let sql = format!("{} WHERE o.customer_phone = ?1{}", base, order_by);
                let mut stmt = self.conn.prepare(&sql).context("Failed to prepare list_orders")?;
                let rows = stmt
                    .query_map(params![phone], map)
                    .context("Failed to query orders")?;
                for row in rows {
                    let (order, product) = row.context("Failed to read order row")?;
                    orders.push(OrderWithProduct {
                        order: order.into_order()?,
                        product,
                    });
                }
            }
            None => {
                let sql = format!("{}{}", base, order_by);
                let mut stmt = self.conn.prepare(&sql).context("Failed to prepare list_orders")?;
                let rows = stmt.query_map([], map).context("Failed to query orders")?;
                for row in rows {
                    let (order, product) = row.context("Failed to read order row")?;
                    orders.push(OrderWithProduct {
                        order: order.into_order()?,
                        product,
                    });
                }
            }
        }
        Ok(orders)
    }

    /// Bare orders, unordered, for dashboard aggregation.
    pub fn list_all_orders(&self) -> Result<Vec<Order>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, product_id, user_id, customer_name, customer_phone, customer_email, quantity, total_price, channel, status, order_date FROM orders",
            )
            .context("Failed to prepare list_all_orders")?;
        let rows = stmt
            .query_map([], order_row)
            .context("Failed to query orders")?;
        let mut orders = Vec::new();
        for row in rows {
            orders.push(row.context("Failed to read order row")?.into_order()?);
        }
        Ok(orders)
    }

    /// Set an order's status. Returns None when the order does not exist.
    pub fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Option<Order>> {
        let updated = self
            .conn
            .execute(
                "UPDATE orders SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id],
            )
            .context("Failed to update order status")?;
        if updated == 0 {
            return Ok(None);
        }
        self.get_order(id)
    }

    // ── Review CRUD ───────────────────────────────────────────────────

    pub fn create_review(
        &self,
        product_id: i64,
        rating: i32,
        content: &str,
        image: Option<&str>,
    ) -> Result<Review> {
        self.conn
            .execute(
                "INSERT INTO reviews (product_id, rating, content, image) VALUES (?1, ?2, ?3, ?4)",
                params![product_id, rating, content, image],
            )
            .context("Failed to insert review")?;
        let id = self.conn.last_insert_rowid();
        let mut reviews = self.query_reviews(
            "SELECT id, product_id, rating, content, image, created_at FROM reviews WHERE id = ?1",
            params![id],
        )?;
        reviews.pop().context("Review not found after insert")
    }

    fn list_reviews_for_product(&self, product_id: i64) -> Result<Vec<Review>> {
        self.query_reviews(
            "SELECT id, product_id, rating, content, image, created_at
             FROM reviews WHERE product_id = ?1 ORDER BY created_at DESC, id DESC",
            params![product_id],
        )
    }

    fn query_reviews(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Review>> {
        let mut stmt = self.conn.prepare(sql).context("Failed to prepare review query")?;
        let rows = stmt
            .query_map(args, |row| {
                Ok(Review {
                    id: row.get(0)?,
                    product_id: row.get(1)?,
                    rating: row.get(2)?,
                    content: row.get(3)?,
                    image: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .context("Failed to query reviews")?;
        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row.context("Failed to read review row")?);
        }
        Ok(reviews)
    }

    /// All reviews newest first, each with the product it belongs to.
    pub fn list_reviews_with_product(&self) -> Result<Vec<ReviewWithProduct>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT r.id, r.product_id, r.rating, r.content, r.image, r.created_at, p.id, p.name
                 FROM reviews r LEFT JOIN products p ON p.id = r.product_id
                 ORDER BY r.created_at DESC, r.id DESC",
            )
            .context("Failed to prepare list_reviews")?;
        let rows = stmt
            .query_map([], |row| {
                let review = Review {
                    id: row.get(0)?,
                    product_id: row.get(1)?,
                    rating: row.get(2)?,
                    content: row.get(3)?,
                    image: row.get(4)?,
                    created_at: row.get(5)?,
                };
                let product = match row.get::<_, Option<i64>>(6)? {
                    Some(pid) => Some(ProductRef {
                        id: pid,
                        name: row.get(7)?,
                    }),
                    None => None,
                };
                Ok(ReviewWithProduct { review, product })
            })
            .context("Failed to query reviews")?;
        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row.context("Failed to read review row")?);
        }
        Ok(reviews)
    }

    /// Returns false when no review matched.
    pub fn delete_review(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM reviews WHERE id = ?1", params![id])
            .context("Failed to delete review")?;
        Ok(deleted > 0)
    }

    pub fn count_reviews(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))
            .context("Failed to count reviews")
    }

    // ── Settings ──────────────────────────────────────────────────────

    /// The settings singleton, lazily created empty on first read.
    pub fn get_or_create_settings(&self) -> Result<StoreSettings> {
        self.conn
            .execute("INSERT OR IGNORE INTO settings (id) VALUES (1)", [])
            .context("Failed to ensure settings row")?;
        self.conn
            .query_row(
                "SELECT whatsapp_number, whatsapp_template FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok(StoreSettings {
                        whatsapp_number: row.get(0)?,
                        whatsapp_template: row.get(1)?,
                    })
                },
            )
            .context("Failed to read settings")
    }

    pub fn update_settings(
        &self,
        whatsapp_number: Option<&str>,
        whatsapp_template: Option<&str>,
    ) -> Result<StoreSettings> {
        self.conn
            .execute("INSERT OR IGNORE INTO settings (id) VALUES (1)", [])
            .context("Failed to ensure settings row")?;
        self.conn
            .execute(
                "UPDATE settings SET whatsapp_number = ?1, whatsapp_template = ?2, updated_at = datetime('now') WHERE id = 1",
                params![whatsapp_number, whatsapp_template],
            )
            .context("Failed to update settings")?;
        self.get_or_create_settings()
    }
}

// ── Internal row helpers ──────────────────────────────────────────────

/// Intermediate row struct for reading orders before converting the channel
/// and status strings into typed values.
struct OrderRow {
    id: i64,
    product_id: i64,
    user_id: Option<i64>,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    quantity: i64,
    total_price: f64,
    channel: String,
    status: String,
    order_date: String,
}

fn order_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderRow> {
    Ok(OrderRow {
        id: row.get(0)?,
        product_id: row.get(1)?,
        user_id: row.get(2)?,
        customer_name: row.get(3)?,
        customer_phone: row.get(4)?,
        customer_email: row.get(5)?,
        quantity: row.get(6)?,
        total_price: row.get(7)?,
        channel: row.get(8)?,
        status: row.get(9)?,
        order_date: row.get(10)?,
    })
}

impl OrderRow {
    fn into_order(self) -> Result<Order> {
        let channel = OrderChannel::from_str(&self.channel)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse order channel")?;
        let status = OrderStatus::from_str(&self.status)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse order status")?;
        Ok(Order {
            id: self.id,
            product_id: self.product_id,
            user_id: self.user_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            quantity: self.quantity,
            total_price: self.total_price,
            channel,
            status,
            order_date: self.order_date,
        })
    }
}

/// Intermediate row struct for users.
struct UserRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    role: String,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User> {
        let role = Role::from_str(&self.role)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse user role")?;
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product(db: &StoreDb) -> Product {
        db.create_product(
            "Rose Glow Serum",
            "Brightening facial serum",
            3200.0,
            "skincare",
            "/images/rose-glow.jpg",
        )
        .unwrap()
    }

    fn sample_order(db: &StoreDb, product_id: i64, phone: &str) -> Order {
        db.create_order(&NewOrder {
            product_id,
            user_id: None,
            customer_name: "Amna Silva",
            customer_phone: phone,
            customer_email: Some("amna@example.com"),
            quantity: 2,
            total_price: 6400.0,
            channel: OrderChannel::Whatsapp,
        })
        .unwrap()
    }

    #[test]
    fn test_migrations_create_all_tables() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let table_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('users', 'products', 'orders', 'reviews', 'settings')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(table_count, 5, "Expected 5 tables to exist");

        let index_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name IN ('idx_users_email', 'idx_orders_phone', 'idx_orders_product', 'idx_reviews_product')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(index_count, 4, "Expected 4 indexes to exist");
        Ok(())
    }

    #[test]
    fn test_migrations_are_idempotent() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        db.run_migrations()?;
        db.run_migrations()?;
        Ok(())
    }

    #[test]
    fn test_product_crud() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        assert!(product.id > 0);
        assert_eq!(product.name, "Rose Glow Serum");
        assert!(!product.created_at.is_empty());

        let updated = db.update_product(
            product.id,
            "Rose Glow Serum",
            "Brightening facial serum, 30ml",
            3500.0,
            "skincare",
            "/images/rose-glow.jpg",
        )?;
        assert_eq!(updated.price, 3500.0);
        assert_eq!(updated.description, "Brightening facial serum, 30ml");

        assert!(db.delete_product(product.id)?);
        assert!(db.get_product(product.id)?.is_none());
        assert!(!db.delete_product(product.id)?);
        Ok(())
    }

    #[test]
    fn test_deleting_product_cascades_reviews() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        db.create_review(product.id, 5, "Lovely scent", None)?;
        db.create_review(product.id, 4, "Works well", None)?;
        assert_eq!(db.count_reviews()?, 2);

        db.delete_product(product.id)?;
        assert_eq!(db.count_reviews()?, 0);
        Ok(())
    }

    #[test]
    fn test_list_products_embeds_reviews_newest_first() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        let first = db.create_review(product.id, 4, "first", None)?;
        let second = db.create_review(product.id, 5, "second", None)?;

        let products = db.list_products_with_reviews()?;
        assert_eq!(products.len(), 1);
        let reviews = &products[0].reviews;
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].id, second.id);
        assert_eq!(reviews[1].id, first.id);
        Ok(())
    }

    #[test]
    fn test_create_order_defaults_to_pending() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        let order = sample_order(&db, product.id, "0771234567");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.channel, OrderChannel::Whatsapp);
        assert_eq!(order.quantity, 2);
        assert!(!order.order_date.is_empty());
        Ok(())
    }

    #[test]
    fn test_list_orders_filters_by_phone() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        sample_order(&db, product.id, "0771234567");
        sample_order(&db, product.id, "0777654321");
        sample_order(&db, product.id, "0771234567");

        let all = db.list_orders(None)?;
        assert_eq!(all.len(), 3);

        let filtered = db.list_orders(Some("0771234567"))?;
        assert_eq!(filtered.len(), 2);
        for entry in &filtered {
            assert_eq!(entry.order.customer_phone, "0771234567");
        }

        let none = db.list_orders(Some("0000000000"))?;
        assert!(none.is_empty());
        Ok(())
    }

    #[test]
    fn test_list_orders_tolerates_deleted_product() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        sample_order(&db, product.id, "0771234567");
        db.delete_product(product.id)?;

        let orders = db.list_orders(None)?;
        assert_eq!(orders.len(), 1);
        assert!(orders[0].product.is_none());
        Ok(())
    }

    #[test]
    fn test_update_order_status() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        let order = sample_order(&db, product.id, "0771234567");

        let updated = db
            .update_order_status(order.id, OrderStatus::Completed)?
            .expect("order should exist");
        assert_eq!(updated.status, OrderStatus::Completed);

        assert!(db.update_order_status(999, OrderStatus::Cancelled)?.is_none());
        Ok(())
    }

    #[test]
    fn test_user_email_is_unique() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        db.create_user("A", "a@example.com", "071", "hash", Role::Customer)?;
        let dup = db.create_user("B", "a@example.com", "072", "hash", Role::Customer);
        assert!(dup.is_err());
        Ok(())
    }

    #[test]
    fn test_get_user_by_email() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let created = db.create_user("Admin", "admin@glowing.com", "000", "hash", Role::Admin)?;
        let fetched = db
            .get_user_by_email("admin@glowing.com")?
            .expect("user should exist");
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.role, Role::Admin);
        assert!(db.get_user_by_email("nobody@example.com")?.is_none());
        Ok(())
    }

    #[test]
    fn test_update_user_account() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let user = db.create_user("A", "a@example.com", "071", "old-hash", Role::Admin)?;

        let updated = db.update_user_account(user.id, Some("new@example.com"), None)?;
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.password_hash, "old-hash");

        let updated = db.update_user_account(user.id, None, Some("new-hash"))?;
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.password_hash, "new-hash");
        Ok(())
    }

    #[test]
    fn test_list_users_counts_orders_through_user_id() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        let user = db.create_user("A", "a@example.com", "071", "hash", Role::Customer)?;
        db.create_user("B", "b@example.com", "072", "hash", Role::Customer)?;

        db.create_order(&NewOrder {
            product_id: product.id,
            user_id: Some(user.id),
            customer_name: "A",
            customer_phone: "071",
            customer_email: None,
            quantity: 1,
            total_price: 3200.0,
            channel: OrderChannel::Instagram,
        })?;

        let users = db.list_users_with_order_counts()?;
        assert_eq!(users.len(), 2);
        let a = users.iter().find(|u| u.email == "a@example.com").unwrap();
        let b = users.iter().find(|u| u.email == "b@example.com").unwrap();
        assert_eq!(a.order_count, 1);
        assert_eq!(b.order_count, 0);
        Ok(())
    }

    #[test]
    fn test_settings_singleton() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let settings = db.get_or_create_settings()?;
        assert!(settings.whatsapp_number.is_none());
        assert!(settings.whatsapp_template.is_none());

        let updated = db.update_settings(Some("94767388576"), Some("Hi {name}, {product} x{qty}"))?;
        assert_eq!(updated.whatsapp_number.as_deref(), Some("94767388576"));

        // Re-reading returns the same single row, not a second one.
        let again = db.get_or_create_settings()?;
        assert_eq!(again.whatsapp_number.as_deref(), Some("94767388576"));
        let row_count: i64 =
            db.conn
                .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;
        assert_eq!(row_count, 1);

        let cleared = db.update_settings(None, None)?;
        assert!(cleared.whatsapp_number.is_none());
        Ok(())
    }

    #[test]
    fn test_delete_review() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        let review = db.create_review(product.id, 3, "Okay", Some("/images/r.jpg"))?;
        assert!(db.delete_review(review.id)?);
        assert!(!db.delete_review(review.id)?);
        Ok(())
    }

    #[test]
    fn test_list_reviews_with_product() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let product = sample_product(&db);
        db.create_review(product.id, 5, "Great", None)?;

        let reviews = db.list_reviews_with_product()?;
        assert_eq!(reviews.len(), 1);
        let product_ref = reviews[0].product.as_ref().expect("product should be set");
        assert_eq!(product_ref.name, "Rose Glow Serum");
        Ok(())
    }
}
