//! Status counts, site options and the inventory filter.

use crate::core::domain::model::machine_record::{MachineRecord, MachineStatus};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Number of records per status. Every status is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts(BTreeMap<MachineStatus, usize>);

impl StatusCounts {
    fn zeroed() -> Self {
        Self(MachineStatus::ALL.iter().map(|status| (*status, 0)).collect())
    }

    #[must_use]
    pub fn get(&self, status: MachineStatus) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    /// Sum over all buckets; equals the number of counted records.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MachineStatus, usize)> + '_ {
        self.0.iter().map(|(status, count)| (*status, *count))
    }
}

/// Tallies records by status.
pub fn compute_counts(records: &[MachineRecord]) -> StatusCounts {
    let mut counts = StatusCounts::zeroed();
    for record in records {
        *counts.0.entry(record.status).or_insert(0) += 1;
    }
    counts
}

/// Distinct non-empty sites, sorted.
pub fn site_options(records: &[MachineRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.site.as_deref())
        .map(str::trim)
        .filter(|site| !site.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Status selector of the inventory filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(MachineStatus),
}

/// Site selector of the inventory filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SiteFilter {
    #[default]
    All,
    Only(String),
}

/// Free-text search plus status and site selectors, combined with AND.
///
/// The default filter lets every record through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFilter {
    pub search: String,
    pub status: StatusFilter,
    pub site: SiteFilter,
}

impl InventoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn status(mut self, status: MachineStatus) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = SiteFilter::Only(site.into());
        self
    }

    /// Returns `true` if the record passes every clause.
    #[must_use]
    pub fn matches(&self, record: &MachineRecord) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => record.status == status,
        };
        let site_ok = match &self.site {
            SiteFilter::All => true,
            SiteFilter::Only(site) => record.site.as_deref() == Some(site.as_str()),
        };
        let term = self.search.trim().to_lowercase();
        let search_ok = term.is_empty() || search_text(record).contains(&term);

        status_ok && site_ok && search_ok
    }
}

/// Lower-cased text the search term is matched against.
fn search_text(record: &MachineRecord) -> String {
    let fields = [
        Some(record.hostname.as_str()),
        record.display_name.as_deref(),
        record.serial.as_deref(),
        record.os.as_deref(),
        record.blueprint.as_deref(),
        Some(record.mac.as_str()),
        record.ip.as_deref(),
        record.owner.as_deref(),
        record.site.as_deref(),
        record.rack.as_deref(),
    ];

    fields
        .into_iter()
        .flatten()
        .chain(record.tags.iter().map(String::as_str))
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Records passing `filter`, in their original order.
pub fn filter_records<'a>(
    records: &'a [MachineRecord],
    filter: &InventoryFilter,
) -> Vec<&'a MachineRecord> {
    records.iter().filter(|record| filter.matches(record)).collect()
}
