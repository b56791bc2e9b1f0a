//! Grouping of the inbound connections of a node into execution attempts.
//!
//! A node with several inbound connections per input slot can only be run
//! once per combination of at most one connection per slot. The grouper
//! builds as many combinations from sources that have data as it can before
//! falling back to sources that do not, and marks the latter as incomplete.
//!
//! # Example
//!
//! ```text
//! ┌───────┐0
//! │   a   ├────┐
//! └───────┘    │   ┌────┐
//! ┌───────┐0   ├──►│    │
//! │   b   ├────┘   │node│
//! └───────┘    ┌──►│    │
//! ┌───────┐1   │   └────┘
//! │   c   ├────┘
//! └───────┘
//! ```
//!
//! With data for all sources this yields two complete groups, `[a, c]` and
//! `[b]`. Connections sharing a slot are taken in source name order.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet, VecDeque},
    ops::Bound,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    PartflowError, Result,
    data::DataOracle,
    graph::{Connection, Graph, Node},
};

/// One execution attempt of a node: at most one connection per input slot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// true if every source of the group has data
    pub complete: bool,
    /// connections in ascending input slot order
    pub connections: Vec<Connection>,
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl Group {
    pub fn new() -> Self {
        Self {
            complete: true,
            connections: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn input_indices(&self) -> Vec<usize> {
        self.connections.iter().map(|c| c.input_index).collect()
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.connections.iter().map(|c| c.from.name.as_str()).collect()
    }
}

/// Orders connections by input slot, then by source node name.
///
/// Names are compared byte-wise, not locale-aware: `"B"` sorts before `"a"`.
/// The output slot only separates connections from the same source into
/// the same slot, so that the order is total.
pub fn by_input_then_source(
    a: &Connection,
    b: &Connection,
) -> Ordering {
    a.input_index.cmp(&b.input_index).then_with(|| a.from.name.cmp(&b.from.name)).then_with(|| a.output_index.cmp(&b.output_index))
}

/// Unconsumed connections of one partition, bucketed by input slot.
///
/// Buckets keep the sort order of the connections pushed into them and
/// are dropped once empty, so every key present has a connection left.
#[derive(Debug, Default)]
struct SlotQueue {
    slots: BTreeMap<usize, VecDeque<Connection>>,
}

impl SlotQueue {
    fn from_sorted(connections: Vec<Connection>) -> Self {
        let mut slots: BTreeMap<usize, VecDeque<Connection>> = BTreeMap::new();
        for connection in connections {
            slots.entry(connection.input_index).or_default().push_back(connection);
        }
        Self {
            slots,
        }
    }

    fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// first slot with a connection left that is greater than `slot`
    fn next_slot_after(
        &self,
        slot: Option<usize>,
    ) -> Option<usize> {
        let lower = match slot {
            Some(s) => Bound::Excluded(s),
            None => Bound::Unbounded,
        };
        self.slots.range((lower, Bound::Unbounded)).next().map(|(s, _)| *s)
    }

    fn pop(
        &mut self,
        slot: usize,
    ) -> Option<Connection> {
        let bucket = self.slots.get_mut(&slot)?;
        let connection = bucket.pop_front();
        if bucket.is_empty() {
            self.slots.remove(&slot);
        }
        connection
    }
}

/// Groups the inbound connections of `target` in `graph`.
///
/// Fails with [`PartflowError::Argument`] if `target` is not part of the graph.
pub fn group(
    target: &Node,
    graph: &Graph,
    oracle: &DataOracle,
) -> Result<Vec<Group>> {
    trace!("partial::group({})", target.name);
    if !graph.contains(target) {
        return Err(PartflowError::Argument(format!("node '{}' is not part of the graph", target.name)));
    }

    let connections = graph.connections_into(target);
    group_connections(target, &connections, oracle)
}

/// Groups an explicit list of connections into `target`.
///
/// The result is independent of the order of `connections`. A target
/// without connections yields a single empty, complete group. Fails with
/// [`PartflowError::Argument`] if a connection does not point at `target`
/// or appears twice.
pub fn group_connections(
    target: &Node,
    connections: &[Connection],
    oracle: &DataOracle,
) -> Result<Vec<Group>> {
    let mut seen = HashSet::with_capacity(connections.len());
    for connection in connections {
        if !connection.to.is_same(target) {
            return Err(PartflowError::Argument(format!("connection {} does not point at node '{}'", connection, target.name)));
        }
        if !seen.insert(connection) {
            return Err(PartflowError::Argument(format!("duplicate connection {}", connection)));
        }
    }

    let (mut with_data, mut without_data): (Vec<Connection>, Vec<Connection>) = connections.iter().cloned().partition(|c| oracle.has_data(&c.from.name));
    with_data.sort_by(by_input_then_source);
    without_data.sort_by(by_input_then_source);

    let groups = assemble(SlotQueue::from_sorted(with_data), SlotQueue::from_sorted(without_data));
    debug!(
        "partial::group({}): {} connections in {} groups, {} incomplete",
        target.name,
        connections.len(),
        groups.len(),
        groups.iter().filter(|g| !g.complete).count()
    );

    Ok(groups)
}

/// Fills groups slot by slot, preferring connections with data.
///
/// A group is closed once no slot above the last filled one has a
/// connection left in either partition.
fn assemble(
    mut with_data: SlotQueue,
    mut without_data: SlotQueue,
) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut current = Group::new();
    let mut slot = None;

    while !with_data.is_empty() || !without_data.is_empty() {
        let next = [with_data.next_slot_after(slot), without_data.next_slot_after(slot)].into_iter().flatten().min();
        let Some(next) = next else {
            groups.push(std::mem::take(&mut current));
            slot = None;
            continue;
        };
        slot = Some(next);

        if let Some(connection) = with_data.pop(next) {
            current.connections.push(connection);
        } else if let Some(connection) = without_data.pop(next) {
            current.connections.push(connection);
            current.complete = false;
        }
    }

    groups.push(current);
    groups
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;
    use crate::data::{PinData, RunData, RunRecord};

    fn node(name: &str) -> Node {
        Node::new(name, name)
    }

    fn run_data(names: &[&str]) -> RunData {
        names.iter().map(|n| (n.to_string(), vec![RunRecord::default()])).collect()
    }

    fn names(group: &Group) -> Vec<&str> {
        group.source_names()
    }

    /// `target` with one connection per `(source, input_index)`.
    fn fan_in(inputs: &[(&str, usize)]) -> (Graph, Node) {
        let target = node("target");
        let mut nodes: Vec<Node> = vec![target.clone()];
        let mut connections = Vec::new();
        for (source, input_index) in inputs {
            let source = node(source);
            if !nodes.contains(&source) {
                nodes.push(source.clone());
            }
            connections.push(Connection::new(&source, &target, 0, *input_index));
        }
        (Graph::new(nodes, connections).unwrap(), target)
    }

    #[test]
    fn test_same_slot_yields_one_group_per_connection() {
        let (graph, target) = fan_in(&[("source1", 1), ("source2", 1), ("source3", 1)]);
        let run_data = run_data(&["source1", "source2", "source3"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(names(&groups[0]), vec!["source1"]);
        assert_eq!(names(&groups[1]), vec!["source2"]);
        assert_eq!(names(&groups[2]), vec!["source3"]);
        assert!(groups.iter().all(|g| g.complete));
    }

    #[test]
    fn test_source_without_data_comes_last() {
        let (graph, target) = fan_in(&[("source1", 1), ("source2", 1), ("source3", 1)]);
        let run_data = run_data(&["source2", "source3"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(names(&groups[0]), vec!["source2"]);
        assert!(groups[0].complete);
        assert_eq!(names(&groups[1]), vec!["source3"]);
        assert!(groups[1].complete);
        assert_eq!(names(&groups[2]), vec!["source1"]);
        assert!(!groups[2].complete);
    }

    #[test]
    fn test_one_connection_per_input() {
        let (graph, target) = fan_in(&[("second", 1), ("first", 0)]);
        let run_data = run_data(&["first", "second"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].complete);
        assert_eq!(groups[0].input_indices(), vec![0, 1]);
        assert_eq!(names(&groups[0]), vec!["first", "second"]);
    }

    #[test]
    fn test_leftover_connection_forms_own_group() {
        let (graph, target) = fan_in(&[("b", 0), ("c", 1), ("a", 0)]);
        let run_data = run_data(&["a", "b", "c"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(names(&groups[0]), vec!["a", "c"]);
        assert!(groups[0].complete);
        assert_eq!(names(&groups[1]), vec!["b"]);
        assert!(groups[1].complete);
    }

    #[test]
    fn test_no_inbound_connections() {
        let (graph, target) = fan_in(&[]);
        let run_data = RunData::new();
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups, vec![Group::new()]);
        assert!(groups[0].complete);
        assert!(groups[0].is_empty());
    }

    #[test]
    fn test_missing_source_fills_its_slot_incomplete() {
        let (graph, target) = fan_in(&[("source1", 0), ("source2", 1), ("source3", 1)]);
        let run_data = run_data(&["source2", "source3"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(names(&groups[0]), vec!["source1", "source2"]);
        assert!(!groups[0].complete);
        assert_eq!(names(&groups[1]), vec!["source3"]);
        assert!(groups[1].complete);
    }

    #[test]
    fn test_slot_with_data_preferred_over_slot_without() {
        let (graph, target) = fan_in(&[("a", 0), ("b", 0), ("c", 1)]);
        let run_data = run_data(&["b", "c"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(names(&groups[0]), vec!["b", "c"]);
        assert!(groups[0].complete);
        assert_eq!(names(&groups[1]), vec!["a"]);
        assert!(!groups[1].complete);
    }

    #[test]
    fn test_pinned_data_counts_as_data() {
        let (graph, target) = fan_in(&[("a", 0), ("b", 1)]);
        let run_data = run_data(&["a"]);
        let mut pin_data = PinData::new();
        pin_data.insert("b".to_string(), vec![json!({ "pinned": true })]);
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].complete);
    }

    #[test]
    fn test_sparse_input_indices() {
        let (graph, target) = fan_in(&[("a", 5), ("b", 5), ("c", 2)]);
        let run_data = run_data(&["a", "b", "c"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].input_indices(), vec![2, 5]);
        assert_eq!(names(&groups[0]), vec!["c", "a"]);
        assert_eq!(groups[1].input_indices(), vec![5]);
        assert_eq!(names(&groups[1]), vec!["b"]);
    }

    #[test]
    fn test_same_source_into_same_slot_twice() {
        let a = node("a");
        let target = node("target");
        let graph = Graph::new(vec![a.clone(), target.clone()], vec![Connection::new(&a, &target, 1, 0), Connection::new(&a, &target, 0, 0)]).unwrap();
        let run_data = run_data(&["a"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].connections[0].output_index, 0);
        assert_eq!(groups[1].connections[0].output_index, 1);
    }

    #[test]
    fn test_groups_cover_all_connections_once() {
        let (graph, target) = fan_in(&[("a", 0), ("b", 0), ("c", 0), ("d", 1), ("e", 1), ("f", 2), ("g", 3), ("h", 3)]);
        let run_data = run_data(&["a", "c", "e", "g"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();

        let mut grouped: Vec<Connection> = groups.iter().flat_map(|g| g.connections.clone()).collect();
        let mut expected = graph.connections_into(&target);
        grouped.sort_by(by_input_then_source);
        expected.sort_by(by_input_then_source);
        assert_eq!(grouped, expected);

        for group in &groups {
            let slots: HashSet<usize> = group.input_indices().into_iter().collect();
            assert_eq!(slots.len(), group.connections.len());
            assert_eq!(group.complete, group.connections.iter().all(|c| oracle.has_data(&c.from.name)));
        }
    }

    #[test]
    fn test_group_is_idempotent() {
        let (graph, target) = fan_in(&[("a", 0), ("b", 0), ("c", 1), ("d", 1), ("e", 2)]);
        let run_data = run_data(&["b", "c"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let first = group(&target, &graph, &oracle).unwrap();
        let second = group(&target, &graph, &oracle).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let (graph, target) = fan_in(&[("a", 0), ("b", 0), ("c", 1), ("d", 1), ("e", 2), ("f", 0)]);
        let run_data = run_data(&["a", "d", "f"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let mut connections = graph.connections_into(&target);
        connections.sort_by(by_input_then_source);
        let expected = group_connections(&target, &connections, &oracle).unwrap();

        connections.reverse();
        assert_eq!(group_connections(&target, &connections, &oracle).unwrap(), expected);

        for _ in 0..connections.len() {
            connections.rotate_left(1);
            assert_eq!(group_connections(&target, &connections, &oracle).unwrap(), expected);
        }
    }

    #[test]
    fn test_target_not_in_graph() {
        let (graph, _) = fan_in(&[("a", 0)]);
        let run_data = RunData::new();
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let err = group(&node("ghost"), &graph, &oracle).unwrap_err();
        assert!(matches!(err, PartflowError::Argument(_)));
    }

    #[test]
    fn test_duplicate_connections_rejected() {
        let (a, target) = (node("a"), node("target"));
        let connection = Connection::new(&a, &target, 0, 0);
        let run_data = RunData::new();
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let err = group_connections(&target, &[connection.clone(), connection], &oracle).unwrap_err();
        assert!(matches!(err, PartflowError::Argument(_)));
    }

    #[test]
    fn test_foreign_connection_rejected() {
        let (a, b, target) = (node("a"), node("b"), node("target"));
        let run_data = RunData::new();
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let err = group_connections(&target, &[Connection::new(&a, &b, 0, 0)], &oracle).unwrap_err();
        assert!(matches!(err, PartflowError::Argument(_)));
    }

    #[test]
    fn test_upper_case_names_sort_first() {
        let (graph, target) = fan_in(&[("a", 0), ("B", 0)]);
        let run_data = run_data(&["a", "B"]);
        let pin_data = PinData::new();
        let oracle = DataOracle::new(&run_data, &pin_data);

        let groups = group(&target, &graph, &oracle).unwrap();
        assert_eq!(groups.iter().map(names).collect::<Vec<_>>(), vec![vec!["B"], vec!["a"]]);
    }

    /// Every fan-in shape of 1 to 4 slots with 1 to 3 sources each, laid
    /// out contiguously and sparsely, up to 7 sources in total.
    fn fan_in_shapes() -> Vec<Vec<(String, usize)>> {
        let mut shapes = Vec::new();
        for slot_count in 1..=4u32 {
            for counts in 0..3usize.pow(slot_count) {
                let per_slot: Vec<usize> = (0..slot_count).map(|i| counts / 3usize.pow(i) % 3 + 1).collect();
                if per_slot.iter().sum::<usize>() > 7 {
                    continue;
                }
                for sparse in [false, true] {
                    let mut inputs = Vec::new();
                    for (slot, count) in per_slot.iter().enumerate() {
                        let input_index = if sparse { slot * 2 + 1 } else { slot };
                        for _ in 0..*count {
                            // names deliberately out of creation order
                            let k = inputs.len();
                            inputs.push((format!("n{:02}", k * 5 % 17), input_index));
                        }
                    }
                    shapes.push(inputs);
                }
            }
        }
        shapes
    }

    #[test]
    fn test_invariants_hold_for_generated_fan_ins() {
        let pin_data = PinData::new();
        let mut cases = 0;

        for shape in fan_in_shapes() {
            let inputs: Vec<(&str, usize)> = shape.iter().map(|(n, i)| (n.as_str(), *i)).collect();
            let (graph, target) = fan_in(&inputs);
            let mut expected = graph.connections_into(&target);
            expected.sort_by(by_input_then_source);

            for mask in 0..(1u32 << inputs.len()) {
                let with_data: Vec<&str> = inputs.iter().enumerate().filter(|(i, _)| mask & (1 << i) != 0).map(|(_, (n, _))| *n).collect();
                let run_data = run_data(&with_data);
                let oracle = DataOracle::new(&run_data, &pin_data);

                let groups = group(&target, &graph, &oracle).unwrap();

                let mut grouped: Vec<Connection> = groups.iter().flat_map(|g| g.connections.clone()).collect();
                grouped.sort_by(by_input_then_source);
                assert_eq!(grouped, expected, "coverage for {:?} with data {:?}", inputs, with_data);

                for g in &groups {
                    let slots: HashSet<usize> = g.input_indices().into_iter().collect();
                    assert_eq!(slots.len(), g.connections.len(), "distinct slots for {:?}", inputs);
                    assert_eq!(g.complete, g.connections.iter().all(|c| oracle.has_data(&c.from.name)), "completeness for {:?}", inputs);
                    assert!(!g.is_empty());
                }

                assert_eq!(group(&target, &graph, &oracle).unwrap(), groups);

                let mut reversed = expected.clone();
                reversed.reverse();
                assert_eq!(group_connections(&target, &reversed, &oracle).unwrap(), groups);

                cases += 1;
            }
        }

        assert!(cases > 1000);
    }
}
