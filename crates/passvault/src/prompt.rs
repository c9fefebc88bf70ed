// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Principal password acquisition via `PASSVAULT_USER_PASSWORD` or a TTY prompt.

use passvault_core::PassvaultError;
use secrecy::SecretString;

/// The environment variable name for providing a new principal's password.
pub const USER_PASSWORD_ENV_VAR: &str = "PASSVAULT_USER_PASSWORD";

/// Get a new principal password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `PASSVAULT_USER_PASSWORD` (for scripted provisioning)
/// 2. Interactive TTY prompt via `rpassword`, entered twice
pub fn get_user_password_with_confirm() -> Result<SecretString, PassvaultError> {
    // Env var does not need confirmation.
    if let Ok(password) = std::env::var(USER_PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Password: ");
        let pass1 = rpassword::read_password()
            .map_err(|e| PassvaultError::Internal(format!("failed to read password: {e}")))?;
        eprint!("Confirm password: ");
        let pass2 = rpassword::read_password()
            .map_err(|e| PassvaultError::Internal(format!("failed to read password: {e}")))?;

        if pass1 != pass2 {
            return Err(PassvaultError::invalid_field("password", "passwords do not match"));
        }
        if pass1.is_empty() {
            return Err(PassvaultError::invalid_field("password", "This field may not be blank."));
        }
        return Ok(SecretString::from(pass1));
    }

    Err(PassvaultError::Config(format!(
        "No password provided. Set {USER_PASSWORD_ENV_VAR} or run interactively."
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn password_from_env_var() {
        // SAFETY: test-only env mutation, serialized.
        unsafe { std::env::set_var(USER_PASSWORD_ENV_VAR, "hunter2-but-longer") };
        let result = get_user_password_with_confirm();
        unsafe { std::env::remove_var(USER_PASSWORD_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "hunter2-but-longer");
    }

    #[test]
    #[serial]
    fn empty_env_var_is_rejected() {
        unsafe { std::env::set_var(USER_PASSWORD_ENV_VAR, "") };
        // In CI/test, stdin is not a terminal, so this will fail.
        let result = get_user_password_with_confirm();
        unsafe { std::env::remove_var(USER_PASSWORD_ENV_VAR) };

        assert!(result.is_err());
    }
}
