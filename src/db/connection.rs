use super::DbPool;
use anyhow::{Result, anyhow};
use diesel::PgConnection;
use diesel::r2d2::ConnectionManager;

pub const DEFAULT_POOL_SIZE: u32 = 5;

/// Crée le pool de connexions PostgreSQL.
/// Échoue si la base n'est pas joignable au démarrage.
pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    diesel::r2d2::Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| anyhow!("Failed to create pool: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
    fn create_pool_uses_requested_size() {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let pool = create_pool(&database_url, DEFAULT_POOL_SIZE)
            .expect("Pool creation should succeed with valid DATABASE_URL");
        assert_eq!(pool.max_size(), DEFAULT_POOL_SIZE, "Pool max_size should be 5");
    }
}
