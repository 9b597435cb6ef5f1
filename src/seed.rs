//! Idempotent database seeding: the default admin account, a sample customer,
//! and a starter catalog. Safe to run repeatedly.

use anyhow::Result;

use crate::auth;
use crate::db::StoreDb;
use crate::models::{Role, User};

pub const ADMIN_EMAIL: &str = "admin@glowing.com";
pub const ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub admin_created: bool,
    pub customer_created: bool,
    pub products_created: usize,
}

/// Create the default admin account if it does not exist. Returns the account
/// and whether this call created it.
pub fn ensure_admin(db: &StoreDb) -> Result<(User, bool)> {
    if let Some(existing) = db.get_user_by_email(ADMIN_EMAIL)? {
        return Ok((existing, false));
    }
    let hash = auth::hash_password(ADMIN_PASSWORD)?;
    let admin = db.create_user("Admin", ADMIN_EMAIL, "0000000000", &hash, Role::Admin)?;
    Ok((admin, true))
}

pub fn seed(db: &StoreDb) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let (_, created) = ensure_admin(db)?;
    summary.admin_created = created;

    if db.get_user_by_email("customer@example.com")?.is_none() {
        let hash = auth::hash_password("password123")?;
        db.create_user(
            "John Doe",
            "customer@example.com",
            "1234567890",
            &hash,
            Role::Customer,
        )?;
        summary.customer_created = true;
    }

    if db.count_products()? == 0 {
        let catalog = [
            (
                "Rose Glow Serum",
                "Brightening facial serum with rose extract, 30ml",
                3200.0,
                "skincare",
                "/images/rose-glow-serum.jpg",
            ),
            (
                "Velvet Matte Lipstick",
                "Long-wear matte lipstick in warm rosewood",
                1850.0,
                "makeup",
                "/images/velvet-matte-lipstick.jpg",
            ),
            (
                "Hydra Boost Moisturizer",
                "Lightweight gel moisturizer with hyaluronic acid, 50ml",
                2750.0,
                "skincare",
                "/images/hydra-boost.jpg",
            ),
            (
                "Silk Repair Hair Oil",
                "Nourishing argan hair oil for frizz control, 100ml",
                2100.0,
                "haircare",
                "/images/silk-repair-oil.jpg",
            ),
        ];
        for (name, description, price, category, image) in catalog {
            db.create_product(name, description, price, category, image)?;
            summary.products_created += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_creates_accounts_and_catalog() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let summary = seed(&db)?;
        assert!(summary.admin_created);
        assert!(summary.customer_created);
        assert_eq!(summary.products_created, 4);

        let admin = db.get_user_by_email(ADMIN_EMAIL)?.expect("admin exists");
        assert_eq!(admin.role, Role::Admin);
        assert!(auth::verify_password(ADMIN_PASSWORD, &admin.password_hash));
        Ok(())
    }

    #[test]
    fn test_seed_is_idempotent() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        seed(&db)?;
        let second = seed(&db)?;
        assert!(!second.admin_created);
        assert!(!second.customer_created);
        assert_eq!(second.products_created, 0);
        assert_eq!(db.count_products()?, 4);
        Ok(())
    }

    #[test]
    fn test_ensure_admin_returns_existing_account() -> Result<()> {
        let db = StoreDb::new_in_memory()?;
        let (first, created) = ensure_admin(&db)?;
        assert!(created);
        let (second, created) = ensure_admin(&db)?;
        assert!(!created);
        assert_eq!(first.id, second.id);
        Ok(())
    }
}
