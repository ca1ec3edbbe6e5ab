//! Structured security audit log.
//!
//! Every auth decision, config override, install action, and schema
//! validation failure is appended as one `key=value` line, in the style
//! syslog consumers expect for facility `auth.notice`. This is distinct
//! from `ledger.rs`'s event ledger: the ledger tracks extension lifecycle
//! for `status`/`history` reporting, this tracks security-relevant
//! decisions for an auditor.

use anyhow::{Context, Result};
use chrono::Utc;
use fs4::fs_std::FileExt;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// The category an audit entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventType {
    Auth,
    Config,
    Install,
    Validation,
    Access,
}

impl AuditEventType {
    fn as_str(self) -> &'static str {
        match self {
            AuditEventType::Auth => "auth",
            AuditEventType::Config => "config",
            AuditEventType::Install => "install",
            AuditEventType::Validation => "validation",
            AuditEventType::Access => "access",
        }
    }
}

pub struct AuditEntry {
    pub event_type: AuditEventType,
    pub actor: String,
    pub action: String,
    pub result: &'static str,
    pub resource: String,
    pub details: Option<String>,
}

impl AuditEntry {
    pub fn success(
        event_type: AuditEventType,
        actor: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            actor: actor.into(),
            action: action.into(),
            result: "success",
            resource: resource.into(),
            details: None,
        }
    }

    pub fn failure(
        event_type: AuditEventType,
        actor: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            actor: actor.into(),
            action: action.into(),
            result: "failure",
            resource: resource.into(),
            details: Some(details.into()),
        }
    }

    fn to_line(&self) -> String {
        let mut line = String::new();
        let _ = write!(
            line,
            "timestamp={} event_type={} actor={} action={} result={} resource={}",
            Utc::now().to_rfc3339(),
            self.event_type.as_str(),
            quote(&self.actor),
            quote(&self.action),
            self.result,
            quote(&self.resource),
        );
        if let Some(details) = &self.details {
            let _ = write!(line, " details={}", quote(details));
        }
        line
    }
}

/// `key=value` field values are quoted so an embedded space doesn't split
/// the line into extra fields for a naive log parser.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

pub struct SecurityLog {
    log_path: PathBuf,
}

impl SecurityLog {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
        }
    }

    /// `<state root>/logs/sindri-security.log`, matching where the event
    /// ledger and extension logs already live under the home directory.
    pub fn default_path(home_dir: &Path) -> PathBuf {
        home_dir.join(".sindri").join("logs").join("sindri-security.log")
    }

    pub fn append(&self, entry: &AuditEntry) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent).context("creating security log directory")?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .context("opening security log")?;
        file.lock_exclusive().context("locking security log")?;

        writeln!(file, "{}", entry.to_line()).context("writing security log entry")?;
        file.sync_all().context("syncing security log")?;
        Ok(())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
