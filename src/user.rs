use crate::error::{Result, TaskflowError};

pub const USER_ENV: &str = "TASKFLOW_USER";

/// Resolve the acting user.
///
/// Precedence: explicit flag, then `TASKFLOW_USER`, then the logged-in user
/// recorded in the workspace config. Blank values are skipped.
pub fn resolve_user(flag: Option<&str>, configured: Option<&str>) -> Result<String> {
    let env = std::env::var(USER_ENV).ok();
    let candidate = [flag, env.as_deref(), configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .ok_or(TaskflowError::NotAuthenticated)?;
    validate_user(candidate)?;
    Ok(candidate.to_string())
}

pub fn validate_user(user: &str) -> Result<()> {
    let valid = !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if valid {
        Ok(())
    } else {
        Err(TaskflowError::InvalidUser(user.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-var tests must not run concurrently.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn validate_user_rules() {
        assert!(validate_user("alice").is_ok());
        assert!(validate_user("alice.smith@example.com").is_ok());
        assert!(validate_user("a_b-c").is_ok());
        assert!(validate_user("").is_err());
        assert!(validate_user("has space").is_err());
        assert!(validate_user("semi;colon").is_err());
    }

    #[test]
    fn resolve_user_precedence() {
        let _guard = ENV_LOCK.lock().unwrap();

        unsafe { std::env::remove_var(USER_ENV) };
        assert!(matches!(
            resolve_user(None, None),
            Err(TaskflowError::NotAuthenticated)
        ));
        assert_eq!(resolve_user(None, Some("cfg")).unwrap(), "cfg");

        unsafe { std::env::set_var(USER_ENV, "env-user") };
        assert_eq!(resolve_user(None, Some("cfg")).unwrap(), "env-user");
        assert_eq!(resolve_user(Some("flag"), Some("cfg")).unwrap(), "flag");

        // Blank values fall through
        unsafe { std::env::set_var(USER_ENV, "  ") };
        assert_eq!(resolve_user(Some(""), Some("cfg")).unwrap(), "cfg");

        unsafe { std::env::remove_var(USER_ENV) };
    }

    #[test]
    fn resolve_user_rejects_invalid_flag() {
        let err = resolve_user(Some("bad user"), None).unwrap_err();
        assert_eq!(err.code(), "invalid_user");
    }
}
