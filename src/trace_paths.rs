//! Centralized home-based storage paths for trace-autogen persistence.
//!
//! Layout under `~/.trace-autogen/` (or `$TRACE_AUTOGEN_HOME`):
//! - `sessions/<session-id>/logs/` - Session, agent-stream and JSONL event logs
//! - `logs/startup.log` - Early log lines written before a session exists
//!
//! Generated test-case files are NOT stored here; they go to the configured
//! output directory relative to the working directory.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// The name of the trace-autogen home directory.
const TRACE_HOME_DIR: &str = ".trace-autogen";

/// Environment variable that relocates the home directory (tests, CI).
pub const TRACE_HOME_ENV: &str = "TRACE_AUTOGEN_HOME";

/// Returns the home-based directory: `~/.trace-autogen/`
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn trace_home_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(TRACE_HOME_ENV) {
        Some(custom) => PathBuf::from(custom),
        None => dirs::home_dir()
            .context("Could not determine home directory for session storage")?
            .join(TRACE_HOME_DIR),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create trace-autogen directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the sessions directory: `~/.trace-autogen/sessions/`
pub fn sessions_dir() -> Result<PathBuf> {
    let dir = trace_home_dir()?.join("sessions");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create sessions directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the session directory: `~/.trace-autogen/sessions/<session-id>/`
pub fn session_dir(session_id: &str) -> Result<PathBuf> {
    let dir = sessions_dir()?.join(session_id);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the session logs directory: `~/.trace-autogen/sessions/<session-id>/logs/`
pub fn session_logs_dir(session_id: &str) -> Result<PathBuf> {
    let dir = session_dir(session_id)?.join("logs");
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create session logs directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the startup log path: `~/.trace-autogen/logs/startup.log`
///
/// Used for early logging before a session is created.
pub fn startup_log_path() -> Result<PathBuf> {
    let logs = trace_home_dir()?.join("logs");
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs.join("startup.log"))
}

/// Resolves a configured directory (output, knowledge base) against the
/// working directory. Absolute paths are returned unchanged.
pub fn resolve_dir(working_dir: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        working_dir.join(configured)
    }
}

/// Computes a short content hash (SHA256 truncated to 12 hex characters).
pub fn short_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    hex_encode(&result[..6])
}

/// Encodes bytes as lowercase hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "tests/trace_paths_tests.rs"]
mod tests;
