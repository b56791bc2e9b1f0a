//! Re-execution planning for the part of a workflow feeding one node.
//!
//! The planner walks backwards from the target node, reuses every upstream
//! output that is available, and schedules the target plus every ancestor
//! whose output is missing. Nodes are ordered by a topological sort whose
//! ties are broken by node name, so the same inputs always yield the same
//! plan.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::{
    PartflowError, PlannerConfig, Result,
    data::DataOracle,
    graph::{Graph, Node},
    partial::{
        group::group_connections,
        plan::{Plan, PlanStep},
    },
};

/// Computes re-execution plans.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans the re-execution of `target`.
    ///
    /// Fails with [`PartflowError::Argument`] if `target` is not part of the
    /// graph and with [`PartflowError::Cycle`] if the nodes feeding it do not
    /// form a DAG. Cycles are detected before any grouping happens.
    pub fn plan(
        &self,
        target: &Node,
        graph: &Graph,
        oracle: &DataOracle,
    ) -> Result<Plan> {
        trace!("planner::plan({})", target.name);
        if !graph.contains(target) {
            return Err(PartflowError::Argument(format!("node '{}' is not part of the graph", target.name)));
        }

        let oracle = if self.config.reuse_run_data { *oracle } else { oracle.pinned_only() };

        let order = topological_order(target, graph)?;
        debug!("planner::plan({}): order {:?}", target.name, order.iter().map(|n| n.name.as_str()).collect::<Vec<_>>());

        let rerun = self.rerun_set(target, &order, graph, &oracle);

        let mut steps = Vec::new();
        for node in order.into_iter().filter(|n| rerun.contains(n.name.as_str())) {
            // a single input slot degenerates to one run per connection
            let connections = graph.connections_into(node);
            for group in group_connections(node, &connections, &oracle)? {
                if !group.complete {
                    warn!("planner::plan({}): node {} will run with partial upstream data from {:?}", target.name, node.name, group.source_names());
                }
                steps.push(PlanStep {
                    node: node.clone(),
                    group,
                });
            }
        }

        Ok(Plan {
            target: target.clone(),
            steps,
        })
    }

    /// Names of the nodes that must run, decided downstream first.
    fn rerun_set<'g>(
        &self,
        target: &Node,
        order: &[&'g Node],
        graph: &'g Graph,
        oracle: &DataOracle,
    ) -> HashSet<&'g str> {
        let mut rerun = HashSet::new();
        if let Some(target) = graph.node(&target.name) {
            if self.config.schedule_target || !oracle.has_data(&target.name) {
                rerun.insert(target.name.as_str());
            }
        }

        for node in order.iter().rev() {
            if !rerun.contains(node.name.as_str()) {
                continue;
            }
            for connection in graph.connections_into(node) {
                if oracle.has_data(&connection.from.name) {
                    continue;
                }
                if let Some(source) = graph.node(&connection.from.name) {
                    rerun.insert(source.name.as_str());
                }
            }
        }

        rerun
    }
}

/// Plans the re-execution of `target` with the default configuration.
pub fn plan(
    target: &Node,
    graph: &Graph,
    oracle: &DataOracle,
) -> Result<Plan> {
    Planner::default().plan(target, graph, oracle)
}

/// Topological order of `target` and its ancestors, ties broken by name.
fn topological_order<'g>(
    target: &Node,
    graph: &'g Graph,
) -> Result<Vec<&'g Node>> {
    let target = graph.node(&target.name).ok_or(PartflowError::Argument(format!("node '{}' is not part of the graph", target.name)))?;
    let mut members = graph.ancestors(target);
    members.push(target);

    let mut in_degree: HashMap<&str, usize> = members.iter().map(|&n| (n.name.as_str(), graph.connections_into(n).len())).collect();
    let mut ready: BTreeMap<&str, &Node> = members.iter().filter(|n| in_degree[n.name.as_str()] == 0).map(|&n| (n.name.as_str(), n)).collect();

    let mut order = Vec::with_capacity(members.len());
    while let Some((_, node)) = ready.pop_first() {
        order.push(node);
        for connection in graph.connections_from(node) {
            let Some(degree) = in_degree.get_mut(connection.to.name.as_str()) else {
                continue;
            };
            *degree -= 1;
            if *degree == 0 {
                if let Some(next) = graph.node(&connection.to.name) {
                    ready.insert(next.name.as_str(), next);
                }
            }
        }
    }

    if order.len() < members.len() {
        let mut nodes: Vec<String> = in_degree.into_iter().filter(|(_, d)| *d > 0).map(|(n, _)| n.to_string()).collect();
        nodes.sort();
        return Err(PartflowError::Cycle {
            nodes,
        });
    }

    Ok(order)
}
