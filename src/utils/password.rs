//! 密码哈希工具模块
//!
//! 使用 Argon2id 算法进行密码哈希和验证。存储格式为 PHC 字符串，
//! salt 与 hash 一起保存（`$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`）。

use std::sync::OnceLock;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, SaltString, rand_core::OsRng},
};
use subtle::ConstantTimeEq;

/// 密码哈希错误
#[derive(Debug)]
pub enum PasswordError {
    HashError(String),
    VerifyError(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashError(msg) => write!(f, "Password hash error: {}", msg),
            Self::VerifyError(msg) => write!(f, "Password verify error: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// 对密码进行 Argon2id 哈希（随机 salt）
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    hash_with_salt_string(password, &salt)
}

/// 使用给定 salt（B64 编码）进行哈希，相同输入得到相同结果
pub fn hash_password_with_salt(password: &str, salt_b64: &str) -> Result<String, PasswordError> {
    let salt = SaltString::from_b64(salt_b64).map_err(|e| PasswordError::HashError(e.to_string()))?;
    hash_with_salt_string(password, &salt)
}

fn hash_with_salt_string(password: &str, salt: &SaltString) -> Result<String, PasswordError> {
    Argon2::default()
        .hash_password(password.as_bytes(), salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// 验证密码是否匹配哈希
///
/// 使用存储字符串中的算法参数和 salt 重新计算，再以常量时间比较输出。
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| PasswordError::VerifyError(e.to_string()))?;

    let salt = parsed
        .salt
        .ok_or_else(|| PasswordError::VerifyError("stored hash has no salt".to_string()))?;
    let expected = parsed
        .hash
        .ok_or_else(|| PasswordError::VerifyError("stored hash has no output".to_string()))?;

    let algorithm =
        Algorithm::try_from(parsed.algorithm).map_err(|e| PasswordError::VerifyError(e.to_string()))?;
    let version = match parsed.version {
        Some(v) => Version::try_from(v).map_err(|e| PasswordError::VerifyError(e.to_string()))?,
        None => Version::default(),
    };
    let params = Params::try_from(&parsed).map_err(|e| PasswordError::VerifyError(e.to_string()))?;

    let recomputed = Argon2::new(algorithm, version, params)
        .hash_password(password.as_bytes(), salt)
        .map_err(|e| PasswordError::VerifyError(e.to_string()))?;

    let Some(actual) = recomputed.hash else {
        return Ok(false);
    };

    Ok(expected.as_bytes().ct_eq(actual.as_bytes()).into())
}

/// 对未知用户执行一次等价的验证，使登录耗时不暴露用户名是否存在
pub fn dummy_verify(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    if let Some(hash) = DUMMY_HASH.get_or_init(|| hash_password("dummy-password").ok()) {
        let _ = verify_password(password, hash);
    }
}

/// 检测字符串是否是 Argon2 哈希格式
pub fn is_argon2_hash(s: &str) -> bool {
    s.starts_with("$argon2")
}

/// 处理新建账户的密码 - 必填，始终哈希
pub fn process_new_password(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::HashError("password must not be empty".to_string()));
    }
    hash_password(password)
}

/// 处理更新时的密码
///
/// - `new_password` 为 None 或空字符串时保留 `existing_hash`
/// - 否则对新密码进行哈希
pub fn process_update_password(
    new_password: Option<&str>,
    existing_hash: String,
) -> Result<String, PasswordError> {
    match new_password {
        Some(pwd) if !pwd.is_empty() => hash_password(pwd),
        _ => Ok(existing_hash),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "test_password_123";
        let hash = hash_password(password).expect("hash should succeed");

        assert!(is_argon2_hash(&hash));
        assert!(verify_password(password, &hash).expect("verify should succeed"));
        assert!(!verify_password("wrong_password", &hash).expect("verify should succeed"));
    }

    #[test]
    fn test_same_salt_reproduces_hash() {
        let salt = SaltString::generate(&mut OsRng);
        let first = hash_password_with_salt("khidmat2024", salt.as_str()).unwrap();
        let second = hash_password_with_salt("khidmat2024", salt.as_str()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_char_mutation_fails() {
        let password = "khidmat2024";
        let hash = hash_password(password).unwrap();

        let mutations = ["khidmat2025", "Khidmat2024", "khidmat202", "khidmat20244", "khidmet2024"];
        for m in mutations {
            assert!(!verify_password(m, &hash).unwrap(), "mutation {m} verified");
        }
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(verify_password("x", "not-a-hash").is_err());
        assert!(verify_password("x", "salt:deadbeef").is_err());
    }

    #[test]
    fn test_process_update_password_keeps_existing() {
        let existing = hash_password("old").unwrap();
        assert_eq!(
            process_update_password(None, existing.clone()).unwrap(),
            existing
        );
        assert_eq!(
            process_update_password(Some(""), existing.clone()).unwrap(),
            existing
        );
        let changed = process_update_password(Some("new"), existing.clone()).unwrap();
        assert_ne!(changed, existing);
        assert!(verify_password("new", &changed).unwrap());
    }

    #[test]
    fn test_process_new_password_rejects_empty() {
        assert!(process_new_password("").is_err());
        assert!(process_new_password("secret").is_ok());
    }

    #[test]
    fn test_is_argon2_hash() {
        assert!(is_argon2_hash("$argon2id$v=19$m=19456,t=2,p=1$xxx"));
        assert!(!is_argon2_hash("plaintext_password"));
        assert!(!is_argon2_hash("$bcrypt$xxx"));
    }
}
