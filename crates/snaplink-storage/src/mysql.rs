use async_trait::async_trait;
use jiff::Timestamp;
use snaplink_core::store::{MappingStore, Result};
use snaplink_core::{Mapping, ShortCode, StorageError};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::debug;

const SCHEMA: &str = include_str!("../ddl/mysql/mappings.sql");

/// MySQL implementation of the mapping store contract.
///
/// The unique key on `code` is what makes `create` collision-safe; the
/// generator's `exists` probe only avoids obviously doomed inserts.
/// `created_at` is stored as milliseconds since the Unix epoch.
#[derive(Debug, Clone)]
pub struct MySqlMappingStore {
    pool: MySqlPool,
}

impl MySqlMappingStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a store by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `mappings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("mysql schema ensured");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_created_at(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", millis))
    })
}

fn row_to_mapping(row: &MySqlRow) -> Result<Mapping> {
    let code: String = row.try_get("code").map_err(map_sqlx_error)?;
    let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
    let owner_ref: String = row.try_get("owner_ref").map_err(map_sqlx_error)?;
    let click_count: u64 = row.try_get("click_count").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    let code = ShortCode::new(&code)
        .map_err(|e| StorageError::InvalidData(format!("stored code '{code}': {e}")))?;

    Ok(Mapping {
        code,
        long_url,
        click_count,
        owner_ref,
        created_at: parse_created_at(created_at)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl MappingStore for MySqlMappingStore {
    async fn create(&self, code: &ShortCode, long_url: &str, owner_ref: &str) -> Result<Mapping> {
        let mapping = Mapping::new(code.clone(), long_url, owner_ref);

        let result = sqlx::query(
            r#"
            INSERT INTO mappings (code, long_url, owner_ref, click_count, created_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(code.as_str())
        .bind(&mapping.long_url)
        .bind(&mapping.owner_ref)
        .bind(mapping.created_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(mapping),
            Err(err) if is_unique_violation(&err) => Err(StorageError::Conflict(code.to_string())),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM mappings
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn find_by_code(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        let row = sqlx::query(
            r#"
            SELECT code, long_url, owner_ref, click_count, created_at
            FROM mappings
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }

    async fn increment_count(&self, code: &ShortCode) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE mappings
            SET click_count = click_count + 1
            WHERE code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(code.to_string()));
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner_ref: &str) -> Result<Vec<Mapping>> {
        let rows = sqlx::query(
            r#"
            SELECT code, long_url, owner_ref, click_count, created_at
            FROM mappings
            WHERE owner_ref = ?
            ORDER BY created_at DESC, code ASC
            "#,
        )
        .bind(owner_ref)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_mapping).collect()
    }
}
