//! Debug Context
//!
//! Every builder returns a [`MoveCallInfo`] describing the call it just
//! appended. A dry run gathers them, together with the raw node response,
//! into a [`DebugInfo`] that travels with any error raised for it.
//! These records are for display only; nothing reads them back to build
//! transactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One named argument of a move call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCallArgument {
    pub name: String,
    /// Object id, pure value, or a placeholder such as `Result(3)`
    pub value: String,
}

/// Description of one emitted move call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCallInfo {
    pub target: String,
    pub arguments: Vec<MoveCallArgument>,
    pub type_arguments: Vec<String>,
}

impl MoveCallInfo {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            arguments: Vec::new(),
            type_arguments: Vec::new(),
        }
    }

    /// Value of a named argument, if present
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// The `module::function` part of the target
    pub fn function_path(&self) -> &str {
        self.target
            .splitn(2, "::")
            .nth(1)
            .unwrap_or(self.target.as_str())
    }
}

/// Everything known about one logical operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub move_call: Vec<MoveCallInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_output: Option<String>,
}

impl DebugInfo {
    pub fn new(move_call: Vec<MoveCallInfo>) -> Self {
        Self {
            move_call,
            raw_result: None,
            parsed_output: None,
        }
    }

    pub fn with_raw_result(mut self, raw: serde_json::Value) -> Self {
        self.raw_result = Some(raw);
        self
    }

    pub fn with_parsed_output(mut self, parsed: impl Into<String>) -> Self {
        self.parsed_output = Some(parsed.into());
        self
    }

    /// Pretty JSON for terminals and error dialogs
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserialisable: {}>", e))
    }
}

// ============================================
// DEBUG LOG
// ============================================

#[derive(Debug, Serialize)]
struct DebugLogEntry<'a> {
    timestamp: DateTime<Utc>,
    operation: &'a str,
    success: bool,
    debug_info: &'a DebugInfo,
}

/// Appends dry-run context to a JSON-lines file
#[derive(Debug, Clone)]
pub struct DebugLog {
    path: PathBuf,
}

impl DebugLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, operation: &str, success: bool, info: &DebugInfo) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let entry = DebugLogEntry {
            timestamp: Utc::now(),
            operation,
            success,
            debug_info: info,
        };
        let json = serde_json::to_string(&entry)?;
        writeln!(file, "{}", json)?;

        debug!("📝 Logged {} dry run to {}", operation, self.path.display());
        Ok(())
    }

    /// Like [`DebugLog::append`], but a failing log write never fails the caller
    pub fn record(&self, operation: &str, success: bool, info: &DebugInfo) {
        if let Err(e) = self.append(operation, success, info) {
            warn!("Failed to write debug log {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_call() -> MoveCallInfo {
        MoveCallInfo {
            target: "0xabc::sy::deposit".to_string(),
            arguments: vec![
                MoveCallArgument { name: "version".into(), value: "0x1".into() },
                MoveCallArgument { name: "coin".into(), value: "Result(0)".into() },
            ],
            type_arguments: vec!["0x2::sui::SUI".into()],
        }
    }

    #[test]
    fn test_argument_lookup() {
        let call = sample_call();
        assert_eq!(call.argument("coin"), Some("Result(0)"));
        assert_eq!(call.argument("missing"), None);
        assert_eq!(call.function_path(), "sy::deposit");
    }

    #[test]
    fn test_debug_info_json_shape() {
        let info = DebugInfo::new(vec![sample_call()]).with_parsed_output("1.5");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["moveCall"][0]["typeArguments"][0], "0x2::sui::SUI");
        assert_eq!(json["parsedOutput"], "1.5");
        assert!(json.get("rawResult").is_none());
    }

    #[test]
    fn test_debug_log_appends_lines() {
        let dir = std::env::temp_dir().join(format!("ptyt-debug-log-{}", std::process::id()));
        let log = DebugLog::new(dir.join("dry_runs.jsonl"));
        let info = DebugInfo::new(vec![sample_call()]);

        log.append("mint_py", true, &info).unwrap();
        log.append("mint_py", false, &info).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["success"], false);
        assert_eq!(second["operation"], "mint_py");

        fs::remove_dir_all(&dir).ok();
    }
}
