use anyhow::Result;
use tracing::info;

use glowstore::config::Config;
use glowstore::db::StoreDb;
use glowstore::seed;
use glowstore::server::{ServerConfig, start_server};

pub async fn serve(config: Config, port: Option<u16>, dev: bool) -> Result<()> {
    start_server(ServerConfig {
        port: port.unwrap_or(config.port),
        db_path: config.db_path,
        jwt_secret: config.jwt_secret,
        dev_mode: dev || config.dev_mode,
    })
    .await
}

pub fn init_db(config: &Config) -> Result<()> {
    // Opening the database runs migrations.
    StoreDb::new(&config.db_path)?;
    info!("Database ready at {}", config.db_path.display());
    println!("Database ready at {}", config.db_path.display());
    Ok(())
}

pub fn seed(config: &Config) -> Result<()> {
    let db = StoreDb::new(&config.db_path)?;
    let summary = seed::seed(&db)?;
    if summary.admin_created {
        println!(
            "Created admin account {} (password: {})",
            seed::ADMIN_EMAIL,
            seed::ADMIN_PASSWORD
        );
    } else {
        println!("Admin account already exists, skipping");
    }
    if summary.customer_created {
        println!("Created sample customer account");
    }
    if summary.products_created > 0 {
        println!("Created {} starter products", summary.products_created);
    } else {
        println!("Products already present, skipping catalog seed");
    }
    Ok(())
}
