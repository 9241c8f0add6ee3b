use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum PortalError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    RegionHasMajlis(String),
    CodeExhausted(String),
    PasswordHash(String),
    AuthFailed(String),
    Serialization(String),
    FileOperation(String),
    ExportFailed(String),
}

impl PortalError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PortalError::DatabaseConfig(_) => "E001",
            PortalError::DatabaseConnection(_) => "E002",
            PortalError::DatabaseOperation(_) => "E003",
            PortalError::Validation(_) => "E004",
            PortalError::NotFound(_) => "E005",
            PortalError::Conflict(_) => "E006",
            PortalError::RegionHasMajlis(_) => "E007",
            PortalError::CodeExhausted(_) => "E008",
            PortalError::PasswordHash(_) => "E009",
            PortalError::AuthFailed(_) => "E010",
            PortalError::Serialization(_) => "E011",
            PortalError::FileOperation(_) => "E012",
            PortalError::ExportFailed(_) => "E013",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PortalError::DatabaseConfig(_) => "Database Configuration Error",
            PortalError::DatabaseConnection(_) => "Database Connection Error",
            PortalError::DatabaseOperation(_) => "Database Operation Error",
            PortalError::Validation(_) => "Validation Error",
            PortalError::NotFound(_) => "Resource Not Found",
            PortalError::Conflict(_) => "Conflict",
            PortalError::RegionHasMajlis(_) => "Region Has Dependent Majlis",
            PortalError::CodeExhausted(_) => "Code Space Exhausted",
            PortalError::PasswordHash(_) => "Password Hash Error",
            PortalError::AuthFailed(_) => "Authentication Failed",
            PortalError::Serialization(_) => "Serialization Error",
            PortalError::FileOperation(_) => "File Operation Error",
            PortalError::ExportFailed(_) => "Export Failed",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PortalError::DatabaseConfig(msg)
            | PortalError::DatabaseConnection(msg)
            | PortalError::DatabaseOperation(msg)
            | PortalError::Validation(msg)
            | PortalError::NotFound(msg)
            | PortalError::Conflict(msg)
            | PortalError::RegionHasMajlis(msg)
            | PortalError::CodeExhausted(msg)
            | PortalError::PasswordHash(msg)
            | PortalError::AuthFailed(msg)
            | PortalError::Serialization(msg)
            | PortalError::FileOperation(msg)
            | PortalError::ExportFailed(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    pub fn http_status(&self) -> StatusCode {
        match self {
            PortalError::Validation(_)
            | PortalError::Conflict(_)
            | PortalError::RegionHasMajlis(_) => StatusCode::BAD_REQUEST,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::AuthFailed(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message may be shown to API clients as-is.
    ///
    /// Storage failures carry driver details that only belong in the log.
    pub fn is_client_visible(&self) -> bool {
        !matches!(
            self,
            PortalError::DatabaseConfig(_)
                | PortalError::DatabaseConnection(_)
                | PortalError::DatabaseOperation(_)
                | PortalError::PasswordHash(_)
                | PortalError::Serialization(_)
                | PortalError::FileOperation(_)
        )
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PortalError {}

// 便捷的构造函数
impl PortalError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        PortalError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        PortalError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        PortalError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PortalError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PortalError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        PortalError::Conflict(msg.into())
    }

    pub fn region_has_majlis<T: Into<String>>(msg: T) -> Self {
        PortalError::RegionHasMajlis(msg.into())
    }

    pub fn code_exhausted<T: Into<String>>(msg: T) -> Self {
        PortalError::CodeExhausted(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        PortalError::PasswordHash(msg.into())
    }

    pub fn auth_failed<T: Into<String>>(msg: T) -> Self {
        PortalError::AuthFailed(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PortalError::Serialization(msg.into())
    }

    pub fn export_failed<T: Into<String>>(msg: T) -> Self {
        PortalError::ExportFailed(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for PortalError {
    fn from(err: sea_orm::DbErr) -> Self {
        PortalError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for PortalError {
    fn from(err: csv::Error) -> Self {
        PortalError::ExportFailed(err.to_string())
    }
}

impl From<crate::utils::password::PasswordError> for PortalError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        PortalError::PasswordHash(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            PortalError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PortalError::region_has_majlis("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PortalError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PortalError::auth_failed("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            PortalError::code_exhausted("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_errors_are_hidden() {
        assert!(!PortalError::database_operation("syntax error near").is_client_visible());
        assert!(PortalError::conflict("Username already exists").is_client_visible());
    }

    #[test]
    fn test_format_simple() {
        let err = PortalError::not_found("Region 7 not found");
        assert_eq!(err.format_simple(), "Resource Not Found: Region 7 not found");
        assert_eq!(err.to_string(), err.format_simple());
    }

    #[test]
    fn test_from_db_err() {
        let err: PortalError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.code(), "E003");
        assert!(err.message().contains("boom"));
    }
}
