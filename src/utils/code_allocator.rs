//! Short code allocation for regions and majlis
//!
//! A code is derived from a seed (explicit code, else display name):
//! trimmed, upper-cased and cut to three characters. Collisions are
//! resolved by appending an increasing numeric suffix.

use std::future::Future;

use tracing::{debug, warn};

use crate::errors::{PortalError, Result};

/// 基础候选码长度
pub const BASE_CODE_LEN: usize = 3;

/// 候选码最大长度
pub const MAX_CODE_LEN: usize = 10;

/// 候选码尝试上限（基础码 + 后缀 1..=999）
pub const MAX_ATTEMPTS: usize = 1000;

/// Outcome of a single insert attempt made by the caller.
#[derive(Debug)]
pub enum InsertOutcome<T> {
    Inserted(T),
    /// The store rejected the candidate because the code is already taken.
    Taken,
}

/// Pick the allocation seed: a non-blank explicit code wins over the name.
pub fn select_seed<'a>(explicit: Option<&'a str>, name: &'a str) -> &'a str {
    match explicit {
        Some(code) if !code.trim().is_empty() => code,
        _ => name,
    }
}

/// Normalize a seed into the base candidate. Returns `None` for blank input.
pub fn normalize_seed(seed: &str) -> Option<String> {
    let base: String = seed
        .trim()
        .to_uppercase()
        .chars()
        .take(BASE_CODE_LEN)
        .collect();
    if base.is_empty() { None } else { Some(base) }
}

/// Normalize a code given explicitly on update (no suffixing).
pub fn normalize_explicit_code(code: &str) -> Result<String> {
    let normalized: String = code
        .trim()
        .to_uppercase()
        .chars()
        .take(MAX_CODE_LEN)
        .collect();
    if normalized.is_empty() {
        return Err(PortalError::validation("Code must not be empty"));
    }
    Ok(normalized)
}

/// Candidate sequence for a base: `BASE`, `BASE1`, `BASE2`, ...
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    std::iter::once(base.to_string())
        .chain((1..MAX_ATTEMPTS).map(move |n| truncate(&format!("{base}{n}"), MAX_CODE_LEN)))
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn base_for(seed: &str) -> Result<String> {
    normalize_seed(seed)
        .ok_or_else(|| PortalError::validation("Cannot derive a code from an empty name"))
}

fn exhausted(base: &str) -> PortalError {
    warn!(
        "Code allocation exhausted for base '{}' after {} attempts",
        base, MAX_ATTEMPTS
    );
    PortalError::code_exhausted(format!(
        "No free code for '{}' after {} attempts",
        base, MAX_ATTEMPTS
    ))
}

/// Probe-style allocation against an existence check.
///
/// Returns the first candidate `exists` reports as free. Only suitable when
/// the caller holds the code space exclusively; the HTTP path uses
/// [`allocate_with_insert`].
pub fn allocate<F>(seed: &str, mut exists: F) -> Result<String>
where
    F: FnMut(&str) -> bool,
{
    let base = base_for(seed)?;
    for candidate in candidates(&base) {
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }
    Err(exhausted(&base))
}

/// Insert-driven allocation.
///
/// Each candidate is handed to `insert`, which performs one atomic insert and
/// reports a unique-constraint rejection as [`InsertOutcome::Taken`]. Any other
/// error aborts the allocation.
pub async fn allocate_with_insert<T, F, Fut>(seed: &str, mut insert: F) -> Result<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<InsertOutcome<T>>>,
{
    let base = base_for(seed)?;
    for (attempt, candidate) in candidates(&base).enumerate() {
        match insert(candidate.clone()).await? {
            InsertOutcome::Inserted(value) => {
                if attempt > 0 {
                    debug!(
                        "Allocated code '{}' after {} collisions",
                        candidate, attempt
                    );
                }
                return Ok(value);
            }
            InsertOutcome::Taken => continue,
        }
    }
    Err(exhausted(&base))
}
