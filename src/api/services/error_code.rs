//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::PortalError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 区域 / majlis 错误
/// - 4000-4099: 报告与导出错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    PayloadTooLarge = 1011,
    DatabaseError = 1020,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    RateLimitExceeded = 2004,

    // 区域 / majlis 错误 3000-3099
    RegionHasMajlis = 3000,
    CodeExhausted = 3001,

    // 报告错误 4000-4099
    ExportFailed = 4001,
}

impl From<&PortalError> for ErrorCode {
    fn from(err: &PortalError) -> Self {
        match err {
            PortalError::Validation(_) => ErrorCode::BadRequest,
            PortalError::NotFound(_) => ErrorCode::NotFound,
            PortalError::Conflict(_) => ErrorCode::Conflict,
            PortalError::RegionHasMajlis(_) => ErrorCode::RegionHasMajlis,
            PortalError::CodeExhausted(_) => ErrorCode::CodeExhausted,
            PortalError::AuthFailed(_) => ErrorCode::AuthFailed,
            PortalError::ExportFailed(_) => ErrorCode::ExportFailed,
            PortalError::DatabaseConfig(_)
            | PortalError::DatabaseConnection(_)
            | PortalError::DatabaseOperation(_) => ErrorCode::DatabaseError,
            PortalError::PasswordHash(_)
            | PortalError::Serialization(_)
            | PortalError::FileOperation(_) => ErrorCode::InternalServerError,
        }
    }
}
