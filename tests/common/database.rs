//! Database test fixtures and utilities
//!
//! The PostgreSQL suite only runs when `DATABASE_URL` is set; every helper
//! here returns `None` otherwise so tests can skip cleanly.

use convodesk::backend::store::PgStore;

/// Connect to the test database and run migrations
///
/// Returns `None` when `DATABASE_URL` is not set.
pub async fn test_pg_store() -> Option<PgStore> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };

    let store = PgStore::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    Some(store)
}
