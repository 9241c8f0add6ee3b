//! 数据库操作重试
//!
//! 连接类错误和锁冲突会按指数退避重试；唯一约束冲突是业务信号，立即返回。

use std::future::Future;
use std::time::Duration;

use rand::RngExt;
use sea_orm::{DbErr, SqlErr};
use tokio::time::sleep;
use tracing::{debug, warn};

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 连接丢失、连接池耗尽、死锁、SQLite BUSY 等
    Transient,
    /// 唯一索引冲突
    UniqueViolation,
    Fatal,
}

/// 对数据库错误进行分类
pub fn classify(err: &DbErr) -> ErrorClass {
    if is_unique_violation(err) {
        return ErrorClass::UniqueViolation;
    }
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => ErrorClass::Transient,
        DbErr::Exec(runtime) | DbErr::Query(runtime) if is_lock_conflict(runtime) => {
            ErrorClass::Transient
        }
        _ => ErrorClass::Fatal,
    }
}

/// 是否为唯一约束冲突
pub fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    // 驱动未给出结构化错误时按消息判断
    let msg = err.to_string().to_lowercase();
    msg.contains("unique constraint failed")
        || msg.contains("duplicate entry")
        || msg.contains("duplicate key value")
}

fn is_lock_conflict(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            let code = sqlx_err
                .as_database_error()
                .and_then(|db_err| db_err.code().map(|c| c.into_owned()));
            if let Some(code) = code {
                // MySQL 1213/1205，PostgreSQL 40001/40P01，SQLite 5/6
                return matches!(
                    code.as_str(),
                    "1213" | "1205" | "40001" | "40P01" | "5" | "6"
                );
            }
            lock_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => lock_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn lock_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    ["deadlock", "lock wait timeout", "database is locked", "serialization failure"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// 重试参数，来自 `database.retry_*` 配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl RetryConfig {
    /// 第 `attempt` 次重试前的等待时间（毫秒），附加 0-25% 抖动
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.max_delay_ms);
        let jitter = rand::rng().random_range(0..=capped / 4);
        capped.saturating_add(jitter)
    }
}

/// 执行数据库操作，瞬时错误按退避策略重试
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("'{}' succeeded after {} retries", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if classify(&err) != ErrorClass::Transient || attempt >= config.max_retries {
            debug!("'{}' failed: {}", operation_name, err);
            return Err(err);
        }

        attempt += 1;
        let delay = config.backoff_ms(attempt);
        warn!(
            "'{}' failed (attempt {}/{}): {}; retrying in {} ms",
            operation_name,
            attempt,
            config.max_retries + 1,
            err,
            delay
        );
        sleep(Duration::from_millis(delay)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::error::{ConnAcquireErr, RuntimeErr};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay_ms: 5,
            max_delay_ms: 20,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(&DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)),
            ErrorClass::Transient
        );
        assert_eq!(
            classify(&DbErr::Query(RuntimeErr::Internal(
                "database is locked".to_string()
            ))),
            ErrorClass::Transient
        );
        assert_eq!(
            classify(&DbErr::RecordNotFound("x".to_string())),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn test_unique_violation_by_message() {
        let err = DbErr::Exec(RuntimeErr::Internal(
            "UNIQUE constraint failed: regions.code".to_string(),
        ));
        assert!(is_unique_violation(&err));
        assert_eq!(classify(&err), ErrorClass::UniqueViolation);
    }

    #[test]
    fn test_backoff_bounds() {
        let config = RetryConfig::default();
        assert!((100..=125).contains(&config.backoff_ms(1)));
        assert!((400..=500).contains(&config.backoff_ms(3)));
        assert!((2000..=2500).contains(&config.backoff_ms(12)));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = with_retry("op", fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = AtomicU32::new(0);
        let result = with_retry("op", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unique_violation_not_retried() {
        let calls = AtomicU32::new(0);
        let result = with_retry("op", fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(DbErr::Exec(RuntimeErr::Internal(
                    "UNIQUE constraint failed: sub_users.username".to_string(),
                )))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
