//! Shared configuration types for fragscan.
//!
//! These types are plain serde data so they can live in a config file
//! (loaded by the CLI through `confy`) and be handed to the core loader
//! without the core knowing where they came from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Error Policies
// ═══════════════════════════════════════════════════════════════════════════

/// What the loader does when a line fails to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop loading and return the error
    #[default]
    Abort,
    /// Log a warning, skip the line and keep going
    Warn,
    /// Skip the line quietly (debug log only)
    Skip,
}

impl ErrorPolicy {
    /// Whether loading continues past an error under this policy
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Abort)
    }
}

/// Per-error-class policies used while loading a fragfile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadPolicy {
    /// `#DEFINE` lines with an unknown kind or unusable field values
    pub define_errors: ErrorPolicy,

    /// Lines with an unknown directive token or missing arguments
    pub malformed_lines: ErrorPolicy,
}

impl LoadPolicy {
    /// Every error aborts the load
    pub fn strict() -> Self {
        Self::default()
    }

    /// Every error is logged and the offending line skipped
    pub fn lenient() -> Self {
        Self {
            define_errors: ErrorPolicy::Warn,
            malformed_lines: ErrorPolicy::Warn,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CLI Config
// ═══════════════════════════════════════════════════════════════════════════

/// Persistent settings for the `fragscan` command-line tool
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Policies applied when loading fragfiles
    pub load: LoadPolicy,

    /// Emit matches as JSON lines instead of text
    pub json_output: bool,

    /// Append logs to this file instead of stderr
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}
