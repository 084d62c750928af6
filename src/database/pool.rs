use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::Result;

pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await?;
    tracing::info!("database pool ready");
    Ok(pool)
}

/// Pool that only connects on first use, for wiring the router without a database.
pub fn lazy_pool(database_url: &str) -> Result<PgPool> {
    Ok(PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy(database_url)?)
}
