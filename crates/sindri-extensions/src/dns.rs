//! Domain pre-check: resolves an extension's declared network domains
//! before installation starts. Critical domains must resolve or the
//! install aborts; optional domains only produce a warning.

use sindri_core::error::Error as CoreError;
use sindri_core::retry::retry_with_policy;
use sindri_core::types::{DomainRequirements, RetryPolicy, RetryStrategy};
use tracing::warn;

/// 2s / 4s / 8s backoff across three attempts, jittered by the shared
/// retry engine (up to 25% added, the engine's only jitter shape).
fn dns_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        strategy: RetryStrategy::ExponentialBackoff,
        backoff_multiplier: 2.0,
        initial_delay_ms: 2000,
        max_delay_ms: 8000,
    }
}

pub struct DnsChecker {
    policy: RetryPolicy,
}

impl DnsChecker {
    pub fn new() -> Self {
        Self {
            policy: dns_retry_policy(),
        }
    }

    /// Resolve every domain in `requirements`, honouring the critical/
    /// optional split. Returns warnings for any optional domain that
    /// never resolved, and aborts on the first unresolved critical one.
    pub async fn check(&self, requirements: &DomainRequirements) -> Result<Vec<String>, CoreError> {
        let (critical, optional) = split(requirements);
        let mut warnings = Vec::new();

        for domain in &critical {
            if self.resolve_with_retry(domain).await.is_err() {
                return Err(CoreError::DnsValidation {
                    domain: domain.clone(),
                });
            }
        }

        for domain in &optional {
            if self.resolve_with_retry(domain).await.is_err() {
                let message = format!("optional domain {} did not resolve", domain);
                warn!("{}", message);
                warnings.push(message);
            }
        }

        Ok(warnings)
    }

    async fn resolve_with_retry(&self, domain: &str) -> Result<(), std::io::Error> {
        let target = format!("{}:443", domain);
        retry_with_policy(&self.policy, || {
            let target = target.clone();
            async move { tokio::net::lookup_host(target).await.map(|_| ()) }
        })
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))
    }
}

impl Default for DnsChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn split(requirements: &DomainRequirements) -> (Vec<String>, Vec<String>) {
    match requirements {
        DomainRequirements::Flat(domains) => (Vec::new(), domains.clone()),
        DomainRequirements::Split { critical, optional } => (critical.clone(), optional.clone()),
    }
}
