//! Package name and build identifier rules

use crate::error::{ScaffoldError, ScaffoldResult};

/// Longest accepted package name
pub const MAX_NAME_LEN: usize = 64;

/// Check that a package name is usable both as a directory and as a pkg-config module
///
/// Names start with an ASCII letter and continue with ASCII letters, digits,
/// `_` or `-` (`hppCore`, `hpp-new-algo`).
pub fn validate_name(name: &str) -> ScaffoldResult<()> {
    let invalid = |reason| {
        Err(ScaffoldError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.len() > MAX_NAME_LEN {
        return invalid("name is longer than 64 characters");
    }
    if name.contains(['/', '\\']) {
        return invalid("name contains a path separator");
    }
    if name.chars().any(char::is_whitespace) {
        return invalid("name contains whitespace");
    }

    let mut chars = name.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return invalid("name must start with an ASCII letter");
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return invalid("name may only contain ASCII letters, digits, '_' and '-'");
    }

    Ok(())
}

/// Whether a token is a valid build identifier (`HPPCORE`, `KWS_PLUS`)
pub fn is_build_id(id: &str) -> bool {
    let mut chars = id.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c == '_')
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Derive the conventional build identifier for a package name
///
/// `hppCore` becomes `HPPCORE`, `hpp-model` becomes `HPP_MODEL`.
pub fn derive_build_id(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
