//! Flattens backend machine listings into [`MachineRecord`]s.
//!
//! Normalization is total: any payload shape produces a record. Fields
//! that cannot be resolved are left as `None` or empty.

use crate::core::domain::model::{
    machine::{MachineListItem, Run},
    machine_record::{
        Hardware, MachineNetwork, MachineRecord, MachineRun, MachineStatus, RunStatus,
    },
};
use crate::inventory::{
    facts::fact_entries,
    profile_path::{FieldPath, first_number, first_text, lookup, scalar_text, string_list, text},
};
use serde_json::Value;
use std::collections::BTreeSet;

static NULL: Value = Value::Null;

const HOSTNAME: &[FieldPath] = &[
    &["hostname"],
    &["profile", "hostname"],
    &["spec", "hostname"],
    &["machine", "hostname"],
    &["metadata", "name"],
    &["metadata", "labels", "hostname"],
    &["metadata", "annotations", "hostname"],
];
const SNAPSHOT_HOSTNAME: &[FieldPath] = &[&["hostname"], &["fqdn"]];

const DISPLAY_NAME: &[FieldPath] = &[
    &["display_name"],
    &["displayName"],
    &["name"],
    &["profile", "display_name"],
    &["profile", "displayName"],
    &["metadata", "annotations", "display_name"],
    &["metadata", "annotations", "displayName"],
];

const STATUS: &[FieldPath] = &[
    &["status"],
    &["profile", "status"],
    &["spec", "status"],
    &["machine", "status"],
    &["metadata", "labels", "status"],
];

const BLUEPRINT: &[FieldPath] = &[
    &["blueprint"],
    &["blueprint_name"],
    &["profile", "blueprint"],
    &["spec", "blueprint"],
    &["machine", "blueprint"],
    &["metadata", "labels", "blueprint"],
];

const OS: &[FieldPath] = &[
    &["os"],
    &["os_name"],
    &["profile", "os"],
    &["spec", "os"],
    &["machine", "os"],
    &["metadata", "labels", "os"],
];
const SNAPSHOT_OS: &[FieldPath] = &[&["os"], &["os_name"], &["os_release"]];

const SITE: &[FieldPath] = &[
    &["site"],
    &["location", "site"],
    &["profile", "site"],
    &["spec", "site"],
    &["machine", "site"],
    &["metadata", "labels", "site"],
];

const RACK: &[FieldPath] = &[
    &["rack"],
    &["location", "rack"],
    &["profile", "rack"],
    &["spec", "rack"],
    &["machine", "rack"],
    &["metadata", "labels", "rack"],
];

const POSITION: &[FieldPath] = &[
    &["position"],
    &["rack_position"],
    &["location", "position"],
    &["profile", "position"],
    &["spec", "position"],
    &["metadata", "labels", "position"],
];

const OWNER: &[FieldPath] = &[
    &["owner"],
    &["profile", "owner"],
    &["spec", "owner"],
    &["machine", "owner"],
    &["metadata", "labels", "owner"],
    &["metadata", "annotations", "owner"],
];

const NOTES: &[FieldPath] = &[
    &["notes"],
    &["profile", "notes"],
    &["spec", "notes"],
    &["metadata", "annotations", "notes"],
];

const IP: &[FieldPath] = &[
    &["ip"],
    &["ip_address"],
    &["ipAddress"],
    &["network", "ip"],
    &["profile", "ip"],
    &["spec", "ip"],
    &["machine", "ip"],
    &["metadata", "annotations", "ip"],
];
const SNAPSHOT_IP: &[FieldPath] = &[&["ip"], &["ip_address"], &["primary_ip"]];

const CPU: &[FieldPath] = &[
    &["hardware", "cpu"],
    &["cpu"],
    &["cpu_model"],
    &["profile", "hardware", "cpu"],
    &["profile", "cpu"],
    &["spec", "hardware", "cpu"],
];
const SNAPSHOT_CPU: &[FieldPath] = &[&["cpu"], &["cpu_model"]];

const MEMORY: &[FieldPath] = &[
    &["hardware", "memory"],
    &["memory"],
    &["profile", "hardware", "memory"],
    &["profile", "memory"],
    &["spec", "hardware", "memory"],
];
// Dual-cased variants come from older backends.
const MEMORY_GB: &[FieldPath] = &[
    &["memory_gb"],
    &["memoryGB"],
    &["hardware", "memory_gb"],
    &["hardware", "memoryGB"],
    &["profile", "memory_gb"],
    &["profile", "memoryGB"],
];

const STORAGE: &[FieldPath] = &[
    &["hardware", "storage"],
    &["storage"],
    &["disk"],
    &["profile", "hardware", "storage"],
    &["profile", "storage"],
    &["spec", "hardware", "storage"],
];

const BMC: &[FieldPath] = &[
    &["hardware", "bmc"],
    &["bmc"],
    &["bmc_address"],
    &["ipmi", "address"],
    &["profile", "hardware", "bmc"],
    &["profile", "bmc"],
    &["spec", "bmc"],
];

const TAG_LISTS: &[FieldPath] = &[&["tags"], &["profile", "tags"]];
const LABELS: FieldPath = &["metadata", "labels"];

const INTERFACE_LISTS: &[FieldPath] = &[
    &["interfaces"],
    &["profile", "interfaces"],
    &["spec", "interfaces"],
    &["network", "interfaces"],
];

const UPTIME_HOURS: &[FieldPath] = &[&["uptime_hours"], &["uptimeHours"]];
const UPTIME_SECONDS: &[FieldPath] = &[&["uptime_seconds"], &["uptime"]];

/// Hostname used when neither profile, snapshot, mac nor id resolve.
const FALLBACK_HOSTNAME: &str = "unknown";

/// Builds the display record for one listing entry.
pub fn normalize(item: &MachineListItem) -> MachineRecord {
    let machine = &item.machine;
    let profile = machine.profile.as_ref().unwrap_or(&NULL);
    let snapshot = item
        .latest_fact
        .as_ref()
        .and_then(|fact| fact.snapshot.as_ref())
        .unwrap_or(&NULL);

    let networks = extract_networks(profile);
    let ip = first_text(profile, IP)
        .or_else(|| networks.iter().find_map(|network| network.ip.clone()))
        .or_else(|| first_text(snapshot, SNAPSHOT_IP));

    let fact_created_at = item
        .latest_fact
        .as_ref()
        .and_then(|fact| non_blank(&fact.created_at));
    let last_check_in = fact_created_at
        .clone()
        .or_else(|| non_blank(&machine.updated_at));

    MachineRecord {
        id: machine.id.clone(),
        mac: machine.mac.clone(),
        serial: machine.serial.as_deref().and_then(non_blank),
        hostname: resolve_hostname(item, profile, snapshot),
        display_name: first_text(profile, DISPLAY_NAME),
        status: resolve_status(item.status.as_deref(), profile),
        ip,
        os: first_text(profile, OS).or_else(|| first_text(snapshot, SNAPSHOT_OS)),
        blueprint: first_text(profile, BLUEPRINT),
        site: first_text(profile, SITE),
        rack: first_text(profile, RACK),
        position: first_text(profile, POSITION),
        owner: first_text(profile, OWNER),
        notes: first_text(profile, NOTES),
        tags: extract_tags(profile),
        last_check_in,
        uptime_hours: extract_uptime_hours(snapshot),
        hardware: extract_hardware(profile, snapshot),
        networks,
        runs: item
            .recent_runs
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(normalize_run)
            .collect(),
        facts: fact_entries(snapshot, fact_created_at.as_deref()),
    }
}

/// Normalizes a whole listing, preserving order.
pub fn normalize_all(items: &[MachineListItem]) -> Vec<MachineRecord> {
    items.iter().map(normalize).collect()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn resolve_hostname(item: &MachineListItem, profile: &Value, snapshot: &Value) -> String {
    first_text(profile, HOSTNAME)
        .or_else(|| first_text(snapshot, SNAPSHOT_HOSTNAME))
        .or_else(|| non_blank(&item.machine.mac))
        .or_else(|| non_blank(&item.machine.id))
        .unwrap_or_else(|| FALLBACK_HOSTNAME.to_string())
}

/// The backend-derived status wins, except that an operator-set
/// maintenance status in the profile overrides it.
fn resolve_status(backend: Option<&str>, profile: &Value) -> MachineStatus {
    let from_profile = first_text(profile, STATUS).map(|raw| MachineStatus::classify(&raw));
    if from_profile == Some(MachineStatus::Maintenance) {
        return MachineStatus::Maintenance;
    }

    match backend.and_then(non_blank) {
        Some(raw) => MachineStatus::classify(&raw),
        None => from_profile.unwrap_or(MachineStatus::Unknown),
    }
}

fn extract_tags(profile: &Value) -> Vec<String> {
    let listed = TAG_LISTS
        .iter()
        .filter_map(|path| lookup(profile, path))
        .flat_map(string_list)
        .map(str::to_string);

    let labelled = lookup(profile, LABELS)
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            scalar_text(value).map(|value| format!("{}:{}", key.trim(), value))
        });

    listed
        .chain(labelled)
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn extract_networks(profile: &Value) -> Vec<MachineNetwork> {
    let interfaces = INTERFACE_LISTS
        .iter()
        .find_map(|path| lookup(profile, path).and_then(Value::as_array));

    match interfaces {
        Some(entries) => entries.iter().filter_map(network_entry).collect(),
        None => network_entry_with_names(profile, &["interface"])
            .into_iter()
            .collect(),
    }
}

fn network_entry(entry: &Value) -> Option<MachineNetwork> {
    network_entry_with_names(entry, &["name", "interface"])
}

fn network_entry_with_names(entry: &Value, name_keys: &[&str]) -> Option<MachineNetwork> {
    let interface = name_keys
        .iter()
        .find_map(|key| lookup(entry, &[*key]).and_then(text))?;
    let mac = lookup(entry, &["mac"]).and_then(text)?;

    Some(MachineNetwork {
        interface,
        mac,
        ip: first_text(entry, &[&["ip"], &["address"], &["ipv4"]]),
        vlan: lookup(entry, &["vlan"]).and_then(scalar_text),
    })
}

fn extract_hardware(profile: &Value, snapshot: &Value) -> Hardware {
    let memory = first_text(profile, MEMORY).or_else(|| {
        first_number(profile, MEMORY_GB)
            .or_else(|| first_number(snapshot, MEMORY_GB))
            .map(|gb| format!("{} GB", gb))
    });

    Hardware {
        cpu: first_text(profile, CPU).or_else(|| first_text(snapshot, SNAPSHOT_CPU)),
        memory,
        storage: first_text(profile, STORAGE),
        bmc: first_text(profile, BMC),
    }
}

fn extract_uptime_hours(snapshot: &Value) -> Option<f64> {
    first_number(snapshot, UPTIME_HOURS)
        .or_else(|| first_number(snapshot, UPTIME_SECONDS).map(|seconds| seconds / 3600.0))
}

fn normalize_run(run: &Run) -> MachineRun {
    MachineRun {
        id: run.id.clone(),
        blueprint: non_blank(&run.blueprint_id),
        status: RunStatus::classify(&run.status),
        started_at: run.started_at.as_deref().and_then(non_blank),
        finished_at: run.finished_at.as_deref().and_then(non_blank),
    }
}
