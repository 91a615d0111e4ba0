//! Raw machine payloads as returned by the `/v1/machines` endpoint.
//!
//! These structures mirror the backend JSON. Every field the backend may
//! omit is defaulted so that one odd item never fails the whole list.

use serde::{Deserialize, Serialize};

/// A machine enrolled with goose'd.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Machine {
    /// Machine identifier (UUID).
    #[serde(default)]
    pub id: String,
    /// Primary MAC address (lower-cased by the backend).
    #[serde(default)]
    pub mac: String,
    /// Hardware serial number, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// Opaque, backend-defined profile of arbitrary nested structure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
    /// Creation timestamp (RFC 3339).
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    #[serde(default)]
    pub updated_at: String,
}

/// The latest fact snapshot reported by a machine's agent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MachineFact {
    #[serde(default)]
    pub id: String,
    /// Free-form key/value snapshot, in the order the agent reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: String,
}

/// One execution of a blueprint against a machine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Run {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub machine_id: String,
    #[serde(default)]
    pub blueprint_id: String,
    /// Free-text status (e.g. "running", "succeeded", "errored").
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

/// A single entry of the machine listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MachineListItem {
    pub machine: Machine,
    /// Status already derived by the backend from the latest run and fact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_fact: Option<MachineFact>,
    /// Most recent runs, newest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_runs: Option<Vec<Run>>,
}
