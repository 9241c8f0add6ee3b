//! SeaORM storage backend
//!
//! One `SeaOrmStorage` serves every entity of the portal; operations are
//! split per aggregate (taxonomy, participants, events, reports, users).
//! SQLite, MySQL/MariaDB and PostgreSQL are supported.

mod connection;
mod converters;
mod events;
mod participants;
mod reports;
pub mod retry;
mod stats;
mod taxonomy;
mod users;

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::{DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::errors::{PortalError, Result};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use retry::{ErrorClass, RetryConfig, is_unique_violation};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(PortalError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 将裸文件路径转换为 sqlx 可识别的 SQLite URL
fn sqlite_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else if database_url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite://{}?mode=rwc", database_url)
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// 参与者分页 COUNT 缓存（TTL 30 秒）
    count_cache: Cache<String, u64>,
    retry_config: RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(PortalError::database_config("database_url 未设置"));
        }

        let config = crate::config::get_config();
        let retry_config = RetryConfig {
            max_retries: config.database.retry_count,
            base_delay_ms: config.database.retry_base_delay_ms,
            max_delay_ms: config.database.retry_max_delay_ms,
        };

        let db = if backend_name == "sqlite" {
            connect_sqlite(&sqlite_url(database_url)).await?
        } else if let Some(rest) = database_url.strip_prefix("mariadb://") {
            // sqlx 只识别 mysql:// 前缀
            connect_generic(&format!("mysql://{}", rest), backend_name).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            count_cache: Cache::builder()
                .time_to_live(Duration::from_secs(30))
                .max_capacity(100)
                .build(),
            retry_config,
        };

        run_migrations(&storage.db).await?;

        info!("{} storage initialized", storage.backend_name.to_uppercase());
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// 健康检查用的连接探测
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| PortalError::database_connection(format!("数据库不可用: {}", e)))
    }

    /// 清除分页 COUNT 缓存（参与者变更时调用）
    pub fn invalidate_count_cache(&self) {
        self.count_cache.invalidate_all();
    }

    /// 关闭连接池（克隆共享同一个池）
    pub async fn close(&self) -> Result<()> {
        self.db
            .clone()
            .close()
            .await
            .map_err(|e| PortalError::database_connection(format!("关闭数据库失败: {}", e)))
    }
}

/// 统一的数据库错误包装：记录细节，只返回操作描述
pub(crate) fn db_error(action: &str, err: DbErr) -> PortalError {
    warn!("{} failed: {}", action, err);
    PortalError::database_operation(format!("{}: {}", action, err))
}
