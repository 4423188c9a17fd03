//! Read-only connectivity probe used by the health report.

use std::future::Future;

use crate::entities::SqliteStore;

/// Identity of the database behind a successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub db_type: String,
    pub db_version: String,
}

pub trait StoreProbe: Send + Sync + 'static {
    /// Acquire a connection and run a trivial query. Never mutates state.
    fn probe(&self) -> impl Future<Output = Result<DatabaseInfo, sqlx::Error>> + Send;
}

impl StoreProbe for SqliteStore {
    async fn probe(&self) -> Result<DatabaseInfo, sqlx::Error> {
        // The pooled connection returns to the pool when `conn` drops,
        // including on the error path.
        let mut conn = self.pool.acquire().await?;
        let db_version: String = sqlx::query_scalar("SELECT sqlite_version()")
            .fetch_one(&mut *conn)
            .await?;
        Ok(DatabaseInfo { db_type: "SQLite".to_owned(), db_version })
    }
}
