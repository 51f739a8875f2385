//! Derives per-step `onSuccess`/`onFailure` lists from the connections.
//!
//! The connection list is the single source of truth for control flow. This
//! pass rebuilds every branch list from scratch, so it is idempotent and never
//! accumulates stale targets from earlier graph states.

use crate::document::{CriterionTarget, Workflow};

use super::connection::{BranchKind, Connection};
use super::node::{GraphNode, NodeKind};

/// Rewrites the branch lists of all steps, in both the workflow record and
/// the step-node copies.
///
/// Connections touching the workflow root (or any non-step node) describe
/// entry-point layout, not control flow, and contribute nothing. Connection
/// order is preserved within each branch list.
pub(super) fn reconcile_branches(
    nodes: &mut [GraphNode],
    connections: &[Connection],
    workflow: &mut Workflow,
) {
    for step in &mut workflow.steps {
        step.on_success.clear();
        step.on_failure.clear();
    }
    for node in nodes.iter_mut() {
        if let Some(step) = node.data.as_step_mut() {
            step.on_success.clear();
            step.on_failure.clear();
        }
    }

    for conn in connections {
        if !is_step_node(nodes, &conn.source) || !is_step_node(nodes, &conn.target) {
            continue;
        }
        let Some(step) = workflow.step_mut(&conn.source) else {
            continue;
        };

        let target = CriterionTarget::step(&conn.target);
        match conn.branch_kind() {
            BranchKind::Success => step.on_success.push(target.clone()),
            BranchKind::Failure => step.on_failure.push(target.clone()),
        }

        let node_copy = nodes
            .iter_mut()
            .find(|node| node.id == conn.source)
            .and_then(|node| node.data.as_step_mut());
        if let Some(step_copy) = node_copy {
            match conn.branch_kind() {
                BranchKind::Success => step_copy.on_success.push(target),
                BranchKind::Failure => step_copy.on_failure.push(target),
            }
        }
    }
}

fn is_step_node(nodes: &[GraphNode], id: &str) -> bool {
    nodes
        .iter()
        .any(|node| node.id == id && node.kind == NodeKind::Step)
}
