//! Sub-user accounts and the secondary login path

use std::str::FromStr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{PortalError, Result};
use crate::storage::{SeaOrmStorage, SubUser, UserRole};
use crate::utils::password::{
    dummy_verify, process_new_password, process_update_password, verify_password,
};
use crate::utils::validators::require_text;

const MAX_USERNAME_LEN: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct CreateUserRequest {
    pub name: String,
    pub role: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub username: Option<String>,
    /// 为空时保留原密码
    pub password: Option<String>,
}

pub fn parse_role(value: &str) -> Result<UserRole> {
    UserRole::from_str(value.trim()).map_err(|_| {
        PortalError::validation(format!(
            "Unknown role '{}'. Valid: admin, regional, majlis, viewer",
            value.trim()
        ))
    })
}

fn validate_username(username: &str) -> Result<String> {
    let username = require_text("username", username)?;
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(PortalError::validation(format!(
            "username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(PortalError::validation("username must not contain spaces"));
    }
    Ok(username)
}

pub struct UserService {
    storage: Arc<SeaOrmStorage>,
}

impl UserService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_users(&self) -> Result<Vec<SubUser>> {
        self.storage.list_sub_users().await
    }

    pub async fn get_user(&self, id: i32) -> Result<SubUser> {
        self.storage
            .get_sub_user(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("User {} not found", id)))
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<SubUser> {
        let name = require_text("name", &req.name)?;
        let username = validate_username(&req.username)?;
        let role = match req.role.as_deref() {
            Some(role) if !role.trim().is_empty() => parse_role(role)?,
            _ => UserRole::default(),
        };
        if req.password.is_empty() {
            return Err(PortalError::validation("password is required"));
        }

        let hash = process_new_password(&req.password)?;
        self.storage
            .insert_sub_user(&name, role, &username, &hash)
            .await
    }

    pub async fn update_user(&self, id: i32, req: UpdateUserRequest) -> Result<SubUser> {
        let mut user = self.get_user(id).await?;

        if let Some(name) = req.name {
            user.name = require_text("name", &name)?;
        }
        if let Some(role) = req.role {
            user.role = parse_role(&role)?;
        }
        if let Some(username) = req.username {
            user.username = validate_username(&username)?;
        }
        let password_changed = req.password.as_deref().is_some_and(|p| !p.is_empty());
        user.password_hash = process_update_password(req.password.as_deref(), user.password_hash)?;

        let updated = self.storage.update_sub_user(&user).await?;
        info!(
            "Sub user updated: {} (password changed: {})",
            updated.username, password_changed
        );
        Ok(updated)
    }

    pub async fn delete_user(&self, id: i32) -> Result<()> {
        self.storage.delete_sub_user(id).await
    }

    /// 子账户登录；用户不存在与密码错误返回同一个错误
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SubUser> {
        let failed = || PortalError::auth_failed("Invalid username or password");

        let Some(user) = self
            .storage
            .find_sub_user_by_username(username.trim())
            .await?
        else {
            dummy_verify(password);
            warn!("Sub-login failed: unknown user");
            return Err(failed());
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {
                info!("Sub-login succeeded: {}", user.username);
                Ok(user)
            }
            Ok(false) => {
                warn!("Sub-login failed for {}", user.username);
                Err(failed())
            }
            Err(e) => {
                warn!("Stored hash for {} is unreadable: {}", user.username, e);
                Err(failed())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("Regional").unwrap(), UserRole::Regional);
        assert!(parse_role("root").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("  amir ").unwrap(), "amir");
        assert!(validate_username("").is_err());
        assert!(validate_username("two words").is_err());
        assert!(validate_username(&"u".repeat(65)).is_err());
    }
}
