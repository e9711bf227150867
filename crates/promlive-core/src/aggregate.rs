//! Parent series aggregation.
//!
//! Exposition bodies often carry only labelled samples for a metric
//! (`http_requests_total{code="200"}`) while its HELP/TYPE lines create a
//! bare parent record with no value. The parent's value is derived as the
//! sum of its children so that it can be charted like any other series.

use tracing::trace;

use crate::record::MetricsSnapshot;

/// Fill unset parent values with the sum of their `<name>{…}` children.
///
/// Must run after the whole body has been parsed, since it needs the full
/// key set. Sums are computed against the parsed values before any parent
/// is written, so derived values never feed into other derived values.
/// Directly sampled values are left untouched. A sum that overflows to
/// infinity leaves the parent unset.
pub fn aggregate_series(snapshot: &mut MetricsSnapshot) {
    let records = snapshot.records();

    let derived: Vec<(usize, f64)> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.value.is_none())
        .filter_map(|(idx, parent)| {
            let prefix = format!("{}{{", parent.name);
            let mut children = records
                .iter()
                .filter(|child| child.name.starts_with(&prefix))
                .peekable();
            children.peek()?;
            let sum: f64 = children.map(|child| child.value.unwrap_or(0.0)).sum();
            if !sum.is_finite() {
                trace!(name = %parent.name, "parent sum overflowed, left unset");
                return None;
            }
            Some((idx, sum))
        })
        .collect();

    let records = snapshot.records_mut();
    for (idx, sum) in derived {
        trace!(name = %records[idx].name, sum, "derived parent value");
        records[idx].value = Some(sum);
    }
}
