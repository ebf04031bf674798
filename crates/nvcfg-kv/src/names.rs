//! Namespace and key name validation.
//!
//! Valid names:
//! - Must be non-empty
//! - Must be at most [`MAX_NAME_LEN`] bytes
//! - Must contain only ASCII letters, digits, `_` and `-`
//!
//! The length limit matches flash-backed preference stores, so a name that
//! works here also works on a device. The character set keeps names usable as
//! file names for [`FsKv`](crate::FsKv).

use crate::error::{KvError, KvResult};

/// Maximum length of a namespace or key name in bytes.
pub const MAX_NAME_LEN: usize = 15;

/// Validate a namespace or key name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use nvcfg_kv::names::validate_name;
///
/// assert!(validate_name("main").is_ok());
/// assert!(validate_name("wifi_creds").is_ok());
/// assert!(validate_name("").is_err());
/// assert!(validate_name("../etc").is_err());
/// ```
pub fn validate_name(name: &str) -> KvResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "name must not be empty".into()));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(invalid(
            name,
            format!("longer than {MAX_NAME_LEN} bytes ({})", name.len()),
        ));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(invalid(name, format!("contains forbidden character: {ch:?}")));
    }

    Ok(())
}

fn invalid(name: &str, reason: String) -> KvError {
    KvError::InvalidName {
        name: name.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_names() {
        assert!(validate_name("main").is_ok());
        assert!(validate_name("config").is_ok());
        assert!(validate_name("net-2").is_ok());
        assert!(validate_name("a_b_c").is_ok());
    }

    #[test]
    fn accepts_max_length() {
        let name = "x".repeat(MAX_NAME_LEN);
        assert!(validate_name(&name).is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(validate_name("").is_err());
    }

    #[test]
    fn rejects_too_long() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_name(&name).unwrap_err();
        assert!(err.to_string().contains("longer than 15"));
    }

    #[test]
    fn rejects_path_characters() {
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("back\\slash").is_err());
    }

    #[test]
    fn rejects_whitespace_and_non_ascii() {
        assert!(validate_name("has space").is_err());
        assert!(validate_name("tab\t").is_err());
        assert!(validate_name("café").is_err());
    }
}
