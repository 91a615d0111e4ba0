//! Display-ready machine records and their closed status sets.

use serde::Serialize;
use std::fmt;

/// Canonical machine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Ready,
    Provisioning,
    Error,
    Offline,
    Maintenance,
    Unknown,
}

impl MachineStatus {
    /// Every status, in display order.
    pub const ALL: [MachineStatus; 6] = [
        MachineStatus::Ready,
        MachineStatus::Provisioning,
        MachineStatus::Error,
        MachineStatus::Offline,
        MachineStatus::Maintenance,
        MachineStatus::Unknown,
    ];

    /// Maps free text from the backend onto a canonical status.
    ///
    /// Matching is exact after trimming and lower-casing. Anything not in
    /// the table, including the empty string, is `Unknown`.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "ready" | "active" | "online" | "healthy" | "available" => MachineStatus::Ready,
            "provisioning" | "provisioned" | "installing" | "deploying" | "pending" => {
                MachineStatus::Provisioning
            }
            "error" | "failed" => MachineStatus::Error,
            "offline" | "down" | "unreachable" => MachineStatus::Offline,
            "maintenance" => MachineStatus::Maintenance,
            _ => MachineStatus::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Ready => "ready",
            MachineStatus::Provisioning => "provisioning",
            MachineStatus::Error => "error",
            MachineStatus::Offline => "offline",
            MachineStatus::Maintenance => "maintenance",
            MachineStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical status of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl RunStatus {
    /// Maps free text onto a canonical run status, defaulting to `Unknown`.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "running" => RunStatus::Running,
            "success" | "succeeded" | "completed" => RunStatus::Succeeded,
            "failed" | "failure" | "error" | "errored" => RunStatus::Failed,
            _ => RunStatus::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware summary. Each field is `None` when unresolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hardware {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmc: Option<String>,
}

/// A network interface descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineNetwork {
    pub interface: String,
    pub mac: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<String>,
}

/// Run summary shown in a machine's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRun {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<String>,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

/// One human-readable fact line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineFactEntry {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A machine flattened for display.
///
/// Produced by [`crate::normalize`]. Records are never patched in place;
/// every fetch rebuilds them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    pub id: String,
    pub mac: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// Never empty.
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub status: MachineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blueprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Deduplicated and sorted.
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_hours: Option<f64>,
    pub hardware: Hardware,
    pub networks: Vec<MachineNetwork>,
    pub runs: Vec<MachineRun>,
    pub facts: Vec<MachineFactEntry>,
}
