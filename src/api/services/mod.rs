//! HTTP 端点
//!
//! 每个资源一个模块，统一的 JSON 信封与错误码在 `helpers` / `error_code` 中。

pub mod error_code;
mod events;
pub mod health;
pub mod helpers;
mod participants;
mod reports;
pub mod routes;
mod taxonomy;
pub mod types;
mod users;

pub use error_code::ErrorCode;
pub use health::AppStartTime;
pub use routes::configure;
pub use types::*;
