use ll_domain::error::{Error, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn connect(dsn: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(dsn)
        .await
        .map_err(|e| Error::Store(format!("failed to connect: {e}")))
}
