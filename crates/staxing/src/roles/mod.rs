// Role wrappers over User
//
// Each role reads its own credential environment variables and adds the
// navigation and workflow surface that role sees in the UI.

mod admin;
mod content;
mod student;
mod teacher;

pub use admin::Admin;
pub use content::ContentQa;
pub use student::Student;
pub use teacher::Teacher;

use crate::browser::HelperOptions;
use crate::error::{Error, Result};
use crate::helper::Helper;
use crate::user::{Credentials, User};

/// Environment variable carrying the target server URL
pub const SERVER_URL_VAR: &str = "SERVER_URL";

pub(crate) fn require_env(name: &'static str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::MissingEnvVar(name))
}

pub(crate) fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Build credentials for a role from its `*_USER`/`*_PASSWORD` variables
/// plus the shared `TEST_EMAIL_*` account.
pub(crate) fn credentials_from_env(
    user_var: &'static str,
    password_var: &'static str,
) -> Result<Credentials> {
    let mut credentials = Credentials::new(require_env(user_var)?, require_env(password_var)?);
    credentials.email = optional_env("TEST_EMAIL_ACCOUNT");
    credentials.email_username = optional_env("TEST_EMAIL_USER");
    credentials.email_password = optional_env("TEST_EMAIL_PASSWORD");
    Ok(credentials)
}

/// Launch a session and bind env-supplied credentials to it.
pub(crate) async fn user_from_env(
    options: HelperOptions,
    user_var: &'static str,
    password_var: &'static str,
) -> Result<User> {
    let credentials = credentials_from_env(user_var, password_var)?;
    let site = require_env(SERVER_URL_VAR)?;
    let helper = Helper::launch(options).await?;
    User::new(helper, credentials, &site)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test so they
    // cannot race each other.
    #[test]
    fn credentials_from_env_reads_role_and_email_vars() {
        unsafe {
            std::env::set_var("ROLE_TEST_USER", "qa-teacher");
            std::env::set_var("ROLE_TEST_PASSWORD", "secret");
            std::env::set_var("TEST_EMAIL_ACCOUNT", "qa@example.org");
            std::env::remove_var("TEST_EMAIL_USER");
        }
        let credentials = credentials_from_env("ROLE_TEST_USER", "ROLE_TEST_PASSWORD").unwrap();
        assert_eq!(credentials.username, "qa-teacher");
        assert_eq!(credentials.password, "secret");
        assert_eq!(credentials.email.as_deref(), Some("qa@example.org"));
        assert_eq!(credentials.email_username, None);

        unsafe {
            std::env::remove_var("ROLE_TEST_PASSWORD");
        }
        let missing = credentials_from_env("ROLE_TEST_USER", "ROLE_TEST_PASSWORD");
        assert!(matches!(
            missing,
            Err(Error::MissingEnvVar("ROLE_TEST_PASSWORD"))
        ));
    }
}
