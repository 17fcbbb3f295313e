//! Core data types for the CPM engine.

/// A task record as supplied by the input collaborator.
///
/// Predecessors are referenced by name and resolved once when the graph is built.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTask {
    pub name: String,
    pub duration: f64,
    pub predecessors: Vec<String>,
}

impl RawTask {
    pub fn new<I, S>(name: impl Into<String>, duration: f64, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            duration,
            predecessors: predecessors.into_iter().map(Into::into).collect(),
        }
    }
}

/// Schedule fields computed for one graph node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskTiming {
    /// Earliest possible start time (from forward pass).
    pub early_start: f64,
    /// Earliest possible finish time (from forward pass).
    pub early_finish: f64,
    /// Latest allowable start time (from backward pass).
    pub late_start: f64,
    /// Latest allowable finish time (from backward pass).
    pub late_finish: f64,
    /// late_start - early_start.
    pub total_float: f64,
    /// Slack before the earliest successor start is delayed.
    pub free_float: f64,
    pub is_critical: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_task_new() {
        let task = RawTask::new("c", 4.0, ["a", "b"]);
        assert_eq!(task.name, "c");
        assert!((task.duration - 4.0).abs() < 1e-9);
        assert_eq!(task.predecessors, vec!["a".to_string(), "b".to_string()]);

        let root = RawTask::new("a", 3.0, Vec::<String>::new());
        assert!(root.predecessors.is_empty());
    }
}
