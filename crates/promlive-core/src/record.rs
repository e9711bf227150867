//! Metric records and the per-scrape snapshot that holds them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One named series from an exposition body.
///
/// Fields fill in as lines are read; a record may carry only metadata
/// (from `# HELP` / `# TYPE`) or only a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub metric_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl MetricRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// All records from one scrape, keyed by name in first-seen order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    /// Milliseconds since the Unix epoch when the scrape started.
    pub captured_at: u64,
    records: Vec<MetricRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl MetricsSnapshot {
    /// An empty snapshot, used when a scrape produced nothing.
    pub fn empty(captured_at: u64) -> Self {
        Self {
            captured_at,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Get the record for `name`, inserting an empty one if absent.
    pub fn entry(&mut self, name: &str) -> &mut MetricRecord {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.records.len();
                self.records.push(MetricRecord::new(name));
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.records[idx]
    }

    pub fn get(&self, name: &str) -> Option<&MetricRecord> {
        self.index.get(name).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Record names in first-seen order.
    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [MetricRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
