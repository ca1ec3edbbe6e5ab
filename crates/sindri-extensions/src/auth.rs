//! Auth Manager (C6): validates one of five built-in providers, plus the
//! per-extension orchestration that decides whether an auth-dependent
//! command may run at all.

use sindri_core::error::Error as CoreError;
use sindri_core::types::{AuthCapability, AuthProvider, AuthValidator};
use tracing::{debug, warn};

/// Outcome of `CheckExtensionAuth`: warnings never abort the caller, a
/// `Err` does (unless the caller treats the command as `conditional`).
#[derive(Debug, Default)]
pub struct AuthCheckOutcome {
    pub warnings: Vec<String>,
}

pub struct AuthManager;

impl AuthManager {
    pub fn new() -> Self {
        Self
    }

    /// Validate a single provider in isolation, independent of any
    /// extension's `auth` capability. `validator` is only consulted for
    /// `AuthProvider::Custom`.
    pub fn validate_provider(
        &self,
        provider: AuthProvider,
        validator: Option<&AuthValidator>,
    ) -> Result<(), CoreError> {
        match provider {
            AuthProvider::None => Ok(()),
            AuthProvider::Anthropic => self.validate_anthropic(),
            AuthProvider::Openai => self.validate_openai(),
            AuthProvider::Github => self.validate_github(),
            AuthProvider::Custom => self.validate_custom(validator),
        }
    }

    fn validate_anthropic(&self) -> Result<(), CoreError> {
        if std::env::var("ANTHROPIC_API_KEY").is_err() {
            return Err(CoreError::AuthMissing {
                provider: "anthropic".to_string(),
            });
        }
        self.command_succeeds("claude", &["--version"])
            .then_some(())
            .ok_or(CoreError::AuthInvalid {
                provider: "anthropic".to_string(),
            })
    }

    fn validate_openai(&self) -> Result<(), CoreError> {
        if std::env::var("OPENAI_API_KEY").is_err() {
            return Err(CoreError::AuthMissing {
                provider: "openai".to_string(),
            });
        }
        Ok(())
    }

    fn validate_github(&self) -> Result<(), CoreError> {
        if !self.command_succeeds("gh", &["--version"]) {
            return Err(CoreError::AuthMissing {
                provider: "github".to_string(),
            });
        }
        if !self.command_succeeds("gh", &["auth", "status"]) {
            return Err(CoreError::AuthInvalid {
                provider: "github".to_string(),
            });
        }
        Ok(())
    }

    fn validate_custom(&self, validator: Option<&AuthValidator>) -> Result<(), CoreError> {
        let validator = validator.ok_or_else(|| CoreError::AuthMissing {
            provider: "custom".to_string(),
        })?;

        let expected = validator.expected_exit_code;
        let actual = self.run_exit_code(&validator.command);
        if actual == Some(expected) {
            Ok(())
        } else {
            Err(CoreError::AuthInvalid {
                provider: "custom".to_string(),
            })
        }
    }

    fn command_succeeds(&self, program: &str, args: &[&str]) -> bool {
        duct::cmd(program, args)
            .stdout_null()
            .stderr_null()
            .unchecked()
            .run()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Run a shell command line (as declared in `auth.validator.command`)
    /// and return its exit code, or `None` if it could not be spawned.
    fn run_exit_code(&self, command_line: &str) -> Option<i32> {
        duct::cmd!("sh", "-c", command_line)
            .stdout_null()
            .stderr_null()
            .unchecked()
            .run()
            .ok()
            .and_then(|output| output.status.code())
    }

    /// Extension-level orchestration: checks declared env vars (required
    /// ones abort, optional ones warn) then validates the provider itself.
    /// A `required: false` capability downgrades a provider failure to a
    /// warning rather than aborting the caller.
    pub fn check_extension_auth(
        &self,
        auth: &AuthCapability,
    ) -> Result<AuthCheckOutcome, CoreError> {
        let mut outcome = AuthCheckOutcome::default();

        for var in &auth.env_vars {
            if std::env::var(var).is_err() {
                let message = format!("environment variable {} is not set", var);
                if auth.required {
                    return Err(CoreError::AuthMissing {
                        provider: format!("{:?}", auth.provider).to_lowercase(),
                    });
                }
                warn!("{}", message);
                outcome.warnings.push(message);
            }
        }

        match self.validate_provider(auth.provider, auth.validator.as_ref()) {
            Ok(()) => {}
            Err(e) if auth.required => return Err(e),
            Err(e) => {
                let message = format!("auth provider check downgraded to warning: {}", e);
                warn!("{}", message);
                outcome.warnings.push(message);
            }
        }

        debug!(
            "auth check for provider {:?} completed with {} warning(s)",
            auth.provider,
            outcome.warnings.len()
        );
        Ok(outcome)
    }
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}
