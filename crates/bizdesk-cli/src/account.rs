//! Account identity resolution for CLI commands.
//!
//! The resolution chain: `--account` flag > `BIZDESK_ACCOUNT` env > `account`
//! in the user config. The email follows the same chain through `--email`,
//! `BIZDESK_EMAIL`, and `email`, falling back to `<account>@localhost`.
//! Every record command runs as exactly one account.

use bizdesk_core::Identity;
use bizdesk_core::config::UserConfig;
use std::env;

pub const ACCOUNT_ENV: &str = "BIZDESK_ACCOUNT";
pub const EMAIL_ENV: &str = "BIZDESK_EMAIL";

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

/// Real environment reader.
struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn first_of(flag: Option<&str>, env_value: Option<String>, configured: Option<&str>) -> Option<String> {
    non_blank(flag.map(str::to_string))
        .or_else(|| non_blank(env_value))
        .or_else(|| non_blank(configured.map(str::to_string)))
}

/// Core resolution logic, parameterized by environment reader.
fn resolve_identity_with(
    account_flag: Option<&str>,
    email_flag: Option<&str>,
    user: &UserConfig,
    env: &dyn EnvReader,
) -> Option<Identity> {
    let account = first_of(account_flag, env.get(ACCOUNT_ENV), user.account.as_deref())?;
    let email = first_of(email_flag, env.get(EMAIL_ENV), user.email.as_deref())
        .unwrap_or_else(|| format!("{account}@localhost"));
    Some(Identity::new(account, email))
}

/// Resolve the acting identity, or `None` when no account is configured.
pub fn resolve_identity(
    account_flag: Option<&str>,
    email_flag: Option<&str>,
    user: &UserConfig,
) -> Option<Identity> {
    resolve_identity_with(account_flag, email_flag, user, &RealEnv)
}
