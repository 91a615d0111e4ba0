//! Machine inventory pipeline: listing items → display records → counts and filters.

pub mod aggregate;
pub mod facts;
pub mod normalizer;
mod profile_path;

use crate::core::domain::model::{machine::MachineListItem, machine_record::MachineRecord};
use aggregate::{InventoryFilter, StatusCounts};

/// A normalized machine listing.
///
/// Built fresh from every fetch; records keep the backend's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    records: Vec<MachineRecord>,
}

impl Inventory {
    /// Normalizes every listing item.
    pub fn from_items(items: &[MachineListItem]) -> Self {
        Self {
            records: normalizer::normalize_all(items),
        }
    }

    pub fn records(&self) -> &[MachineRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn counts(&self) -> StatusCounts {
        aggregate::compute_counts(&self.records)
    }

    pub fn sites(&self) -> Vec<String> {
        aggregate::site_options(&self.records)
    }

    pub fn filter(&self, filter: &InventoryFilter) -> Vec<&MachineRecord> {
        aggregate::filter_records(&self.records, filter)
    }

    /// Looks a record up by machine id.
    pub fn get(&self, id: &str) -> Option<&MachineRecord> {
        self.records.iter().find(|record| record.id == id)
    }
}

impl From<Vec<MachineRecord>> for Inventory {
    fn from(records: Vec<MachineRecord>) -> Self {
        Self { records }
    }
}
