//! Default metric selection.
//!
//! When nothing is selected yet, recognise common client library runtimes
//! by their metric prefixes and follow the series most people want to see
//! first. Anything else falls back to the first metric in the body.

/// Substring that marks a Node.js `prom-client` runtime.
pub const NODE_RUNTIME_MARKER: &str = "nodejs_";
/// Followed for Node.js runtimes.
pub const NODE_DEFAULT_METRIC: &str = "process_resident_memory_bytes";

/// Substring that marks a JVM (Micrometer / simpleclient) runtime.
pub const JVM_RUNTIME_MARKER: &str = "jvm_";
/// Followed for JVM runtimes.
pub const JVM_DEFAULT_METRIC: &str = "jvm_threads_daemon_threads";

/// Pick a metric to follow from names in first-seen order.
///
/// Returns `None` only when `names` is empty.
pub fn select_default<S: AsRef<str>>(names: &[S]) -> Option<String> {
    let has_marker = |marker: &str| names.iter().any(|n| n.as_ref().contains(marker));

    if has_marker(NODE_RUNTIME_MARKER) {
        Some(NODE_DEFAULT_METRIC.to_string())
    } else if has_marker(JVM_RUNTIME_MARKER) {
        Some(JVM_DEFAULT_METRIC.to_string())
    } else {
        names.first().map(|n| n.as_ref().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_runtime_selects_resident_memory() {
        let names = ["process_cpu_user_seconds_total", "nodejs_heap_total_bytes"];
        assert_eq!(select_default(&names).as_deref(), Some(NODE_DEFAULT_METRIC));
    }

    #[test]
    fn jvm_runtime_selects_daemon_threads() {
        let names = ["process_uptime_seconds", "jvm_memory_used_bytes{area=\"heap\"}"];
        assert_eq!(select_default(&names).as_deref(), Some(JVM_DEFAULT_METRIC));
    }

    #[test]
    fn node_marker_wins_over_jvm_marker() {
        let names = ["jvm_classes_loaded", "nodejs_eventloop_lag_seconds"];
        assert_eq!(select_default(&names).as_deref(), Some(NODE_DEFAULT_METRIC));
    }

    #[test]
    fn otherwise_first_name() {
        let names = vec!["go_goroutines".to_string(), "go_threads".to_string()];
        assert_eq!(select_default(&names).as_deref(), Some("go_goroutines"));
    }

    #[test]
    fn no_names_no_selection() {
        let names: [&str; 0] = [];
        assert_eq!(select_default(&names), None);
    }
}
