//! Task registry: validated raw records and name resolution.
//!
//! Maps task names to integer node IDs so later passes index arrays instead of
//! hashing strings.

use rustc_hash::FxHashMap;

use crate::graph::GraphError;
use crate::models::RawTask;

/// Node ID (u32 for compact storage and fast hashing).
pub type NodeId = u32;

/// Registry of raw task records keyed by name.
///
/// Task IDs follow input order, so a record's ID is its position in the input.
#[derive(Debug, Clone)]
pub struct TaskRegistry<'a> {
    to_id: FxHashMap<&'a str, NodeId>,
    records: Vec<&'a RawTask>,
}

impl<'a> TaskRegistry<'a> {
    /// Register records in order, rejecting empty names, invalid durations and duplicates.
    pub fn from_records(records: &'a [RawTask]) -> Result<Self, GraphError> {
        let mut to_id: FxHashMap<&'a str, NodeId> =
            FxHashMap::with_capacity_and_hasher(records.len(), Default::default());

        for (index, record) in records.iter().enumerate() {
            if record.name.is_empty() {
                return Err(GraphError::EmptyName(index));
            }
            if !record.duration.is_finite() || record.duration < 0.0 {
                return Err(GraphError::InvalidDuration(
                    record.name.clone(),
                    record.duration,
                ));
            }
            if to_id.insert(record.name.as_str(), index as NodeId).is_some() {
                return Err(GraphError::DuplicateTask(record.name.clone()));
            }
        }

        Ok(Self {
            to_id,
            records: records.iter().collect(),
        })
    }

    /// Resolve every predecessor name to a task ID.
    ///
    /// Repeated names within one record collapse into a single reference.
    pub fn resolve_predecessors(&self) -> Result<Vec<Vec<NodeId>>, GraphError> {
        self.records
            .iter()
            .map(|record| {
                let mut resolved: Vec<NodeId> = Vec::with_capacity(record.predecessors.len());
                for name in &record.predecessors {
                    let id = self.get(name).ok_or_else(|| {
                        GraphError::UnknownPredecessor(record.name.clone(), name.clone())
                    })?;
                    if !resolved.contains(&id) {
                        resolved.push(id);
                    }
                }
                Ok(resolved)
            })
            .collect()
    }

    /// Get the ID for a task name, if registered.
    #[inline]
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.to_id.get(name).copied()
    }

    /// Get the record for an ID.
    #[inline]
    pub fn record(&self, id: NodeId) -> Option<&'a RawTask> {
        self.records.get(id as usize).copied()
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(name: &str, duration: f64, preds: &[&str]) -> RawTask {
        RawTask::new(name, duration, preds.iter().copied())
    }

    #[test]
    fn test_register_and_lookup() {
        let tasks = vec![make_task("a", 3.0, &[]), make_task("b", 2.0, &["a"])];
        let registry = TaskRegistry::from_records(&tasks).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a"), Some(0));
        assert_eq!(registry.get("b"), Some(1));
        assert_eq!(registry.get("A"), None); // case-sensitive
        assert_eq!(registry.record(1).map(|r| r.name.as_str()), Some("b"));
        assert!(registry.record(2).is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let tasks = vec![make_task("A", 1.0, &[]), make_task("A", 2.0, &[])];
        let err = TaskRegistry::from_records(&tasks).unwrap_err();
        assert_eq!(err, GraphError::DuplicateTask("A".to_string()));
    }

    #[test]
    fn test_invalid_records_rejected() {
        let tasks = vec![make_task("", 1.0, &[])];
        assert_eq!(
            TaskRegistry::from_records(&tasks).unwrap_err(),
            GraphError::EmptyName(0)
        );

        let tasks = vec![make_task("a", -1.0, &[])];
        assert!(matches!(
            TaskRegistry::from_records(&tasks),
            Err(GraphError::InvalidDuration(name, _)) if name == "a"
        ));

        let tasks = vec![make_task("a", f64::NAN, &[])];
        assert!(TaskRegistry::from_records(&tasks).is_err());
    }

    #[test]
    fn test_resolve_predecessors() {
        let tasks = vec![
            make_task("a", 3.0, &[]),
            make_task("b", 2.0, &["a"]),
            make_task("c", 4.0, &["a", "b", "a"]),
        ];
        let registry = TaskRegistry::from_records(&tasks).unwrap();
        let resolved = registry.resolve_predecessors().unwrap();

        assert_eq!(resolved, vec![vec![], vec![0], vec![0, 1]]);
    }

    #[test]
    fn test_unknown_predecessor() {
        let tasks = vec![make_task("a", 3.0, &[]), make_task("B", 2.0, &["Z"])];
        let registry = TaskRegistry::from_records(&tasks).unwrap();
        assert_eq!(
            registry.resolve_predecessors().unwrap_err(),
            GraphError::UnknownPredecessor("B".to_string(), "Z".to_string())
        );
    }
}
