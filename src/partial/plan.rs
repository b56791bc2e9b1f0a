//! Ordered re-execution plan produced by the planner.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{graph::Node, partial::Group};

/// One scheduled run of a node with the connections it takes its input from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub node: Node,
    pub group: Group,
}

/// Ordered list of node runs.
///
/// Every source of a step's group either already has data or is run by an
/// earlier step.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// The node the plan was computed for.
    pub target: Node,
    /// Runs in execution order.
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanStep> {
        self.steps.iter()
    }

    /// scheduled nodes, each once, in order of their first run
    pub fn nodes(&self) -> Vec<&Node> {
        let mut seen = HashSet::new();
        self.steps.iter().map(|s| &s.node).filter(|n| seen.insert(n.name.as_str())).collect()
    }

    /// all runs of the named node
    pub fn steps_for(
        &self,
        name: &str,
    ) -> Vec<&PlanStep> {
        self.steps.iter().filter(|s| s.node.name == name).collect()
    }

    /// Runs that depend on data produced earlier in the plan.
    pub fn incomplete_steps(&self) -> Vec<&PlanStep> {
        self.steps.iter().filter(|s| !s.group.complete).collect()
    }

    /// Output a human-readable representation of the plan
    pub fn schema(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("=== Plan for {} ===", self.target.name));
        lines.push(format!("Steps: {}", self.steps.len()));
        for (i, step) in self.steps.iter().enumerate() {
            let inputs: Vec<String> = step.group.connections.iter().map(|c| c.to_string()).collect();
            let inputs = if inputs.is_empty() { "(no input)".to_string() } else { inputs.join(", ") };
            let status = if step.group.complete { "complete" } else { "incomplete" };
            lines.push(format!("{}. {} <- {} [{}]", i + 1, step.node.name, inputs, status));
        }

        lines.join("\n")
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a PlanStep;
    type IntoIter = std::slice::Iter<'a, PlanStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
