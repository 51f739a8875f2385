//! The authoritative store behind the canvas.
//!
//! Everything a frontend renders (nodes, connections, the document, the
//! selection) lives here, and every mutation flows through here. The store
//! owns the derived-state discipline: after any mutation that can change
//! control flow it re-runs the path reconciler, and after any mutation at all
//! it persists the selected source's snapshot.

use itertools::iproduct;
use log::debug;
use serde_json::{Map, Value};

use crate::document::{self, ArazzoDocument, Parameter, Step, Workflow};
use crate::error::{ExportError, GraphError, OperationIdError};
use crate::index::OperationIndex;
use crate::openapi::Operation;
use crate::storage::{MemoryBackend, StorageBackend};

use super::connection::{Connection, DEFAULT_TARGET_HANDLE};
use super::node::{GraphNode, NodeKind};
use super::reconcile;

mod persist;

/// Holds the visual graph, the Arazzo document derived from it, and the
/// operation index the steps are validated against.
///
/// The store is single-threaded by design: it expects to run on one event
/// loop, and nothing in it is `Sync`. Construct one per editing session via
/// [`GraphStore::builder`] and inject a storage backend; tests use the
/// in-memory default.
pub struct GraphStore {
    nodes: Vec<GraphNode>,
    connections: Vec<Connection>,
    document: ArazzoDocument,
    selected_node_id: Option<String>,
    selected_source_id: Option<String>,
    defer_path_updates: bool,
    index: OperationIndex,
    storage: Box<dyn StorageBackend>,
    reconcile_runs: u64,
}

impl GraphStore {
    /// A store over the given backend, with default document metadata.
    pub fn new(storage: impl StorageBackend + 'static) -> Self {
        Self::builder().with_storage(storage).build()
    }

    pub fn builder() -> GraphStoreBuilder {
        GraphStoreBuilder::new()
    }

    // --- read access -----------------------------------------------------

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn document(&self) -> &ArazzoDocument {
        &self.document
    }

    pub fn main_workflow(&self) -> &Workflow {
        self.document.main_workflow()
    }

    pub fn index(&self) -> &OperationIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut OperationIndex {
        &mut self.index
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn node_by_id(&self, node_id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn incoming_connections(&self, node_id: &str) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|conn| conn.target == node_id)
            .collect()
    }

    pub fn outgoing_connections(&self, node_id: &str) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|conn| conn.source == node_id)
            .collect()
    }

    /// How many reconciliation passes have run since construction.
    pub fn reconcile_runs(&self) -> u64 {
        self.reconcile_runs
    }

    pub fn is_deferring_path_updates(&self) -> bool {
        self.defer_path_updates
    }

    // --- node mutations ---------------------------------------------------

    /// Adds a node to the canvas. Step nodes also append their step record to
    /// the main workflow, keeping the two copies in lockstep from the start.
    pub fn add_node(&mut self, node: GraphNode) -> Result<(), GraphError> {
        if self.node_by_id(&node.id).is_some() {
            return Err(GraphError::DuplicateNodeId { id: node.id });
        }
        if node.kind == NodeKind::Step {
            if let Some(step) = node.data.as_step() {
                self.document.main_workflow_mut().steps.push(step.clone());
            }
        }
        self.nodes.push(node);
        self.reconcile_unless_deferred();
        self.save_workflow_to_storage();
        Ok(())
    }

    /// Removes a node, its step record, and every connection touching it.
    /// Unknown ids are ignored.
    pub fn remove_node(&mut self, node_id: &str) {
        if self.remove_node_inner(node_id) {
            self.reconcile_unless_deferred();
            self.save_workflow_to_storage();
        }
    }

    fn remove_node_inner(&mut self, node_id: &str) -> bool {
        let Some(at) = self.nodes.iter().position(|node| node.id == node_id) else {
            return false;
        };
        let node = self.nodes.remove(at);
        if node.kind == NodeKind::Step {
            self.document
                .main_workflow_mut()
                .steps
                .retain(|step| step.step_id != node_id);
        }
        self.connections
            .retain(|conn| conn.source != node_id && conn.target != node_id);
        true
    }

    /// Applies a field patch to a step, in both the node copy and the
    /// workflow record. Missing or non-step nodes are ignored. The derived
    /// branch lists are never part of a patch, so no reconciliation runs.
    pub fn update_node(&mut self, node_id: &str, patch: StepPatch) {
        let Some(step) = self
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .and_then(|node| node.data.as_step_mut())
        else {
            return;
        };
        patch.apply(step);
        if let Some(step) = self.document.main_workflow_mut().step_mut(node_id) {
            patch.apply(step);
        }
        self.save_workflow_to_storage();
    }

    // --- connection mutations ----------------------------------------------

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
        self.reconcile_unless_deferred();
        self.save_workflow_to_storage();
    }

    /// Removes a connection by id. Unknown ids are ignored.
    pub fn remove_connection(&mut self, connection_id: &str) {
        let before = self.connections.len();
        self.connections.retain(|conn| conn.id != connection_id);
        if self.connections.len() != before {
            self.reconcile_unless_deferred();
            self.save_workflow_to_storage();
        }
    }

    /// Runs many connection mutations with reconciliation deferred, then
    /// reconciles exactly once. Nesting is safe: inner batches restore the
    /// deferral flag and leave the single pass to the outermost batch.
    pub fn batch_connections<F>(&mut self, work: F)
    where
        F: FnOnce(&mut Self),
    {
        let previous = self.defer_path_updates;
        self.defer_path_updates = true;
        work(self);
        self.defer_path_updates = previous;
        if !previous {
            self.reconcile_paths();
            // Snapshots written mid-batch predate this pass; overwrite them
            // with the reconciled state.
            self.save_workflow_to_storage();
        }
    }

    /// Removes a step while preserving the flow through it: every inbound
    /// connection is bridged to every outbound target before the node and its
    /// own connections go away.
    ///
    /// A bridge keeps the inbound connection's branch and the outbound
    /// connection's target handle, and is skipped when an identical route
    /// already exists. Non-step or unknown ids are ignored.
    pub fn remove_step_with_reconnect(&mut self, step_id: &str) {
        let Some(node) = self.node_by_id(step_id) else {
            return;
        };
        if node.kind != NodeKind::Step {
            return;
        }

        let incoming: Vec<Connection> = self
            .connections
            .iter()
            .filter(|conn| conn.target == step_id)
            .cloned()
            .collect();
        let outgoing: Vec<Connection> = self
            .connections
            .iter()
            .filter(|conn| conn.source == step_id)
            .cloned()
            .collect();

        let mut bridges: Vec<Connection> = Vec::new();
        for (inbound, outbound) in iproduct!(&incoming, &outgoing) {
            // Loops through the removed node cannot be preserved.
            if inbound.source == step_id || outbound.target == step_id {
                continue;
            }
            let bridge = Connection {
                id: format!(
                    "conn-{}-{}-{}",
                    inbound.source,
                    outbound.target,
                    inbound.branch_kind().as_str()
                ),
                source: inbound.source.clone(),
                target: outbound.target.clone(),
                // Normalized: an inbound edge without a handle bridges as an
                // explicit success edge.
                source_handle: Some(inbound.branch_kind()),
                target_handle: Some(
                    outbound
                        .target_handle
                        .clone()
                        .unwrap_or_else(|| DEFAULT_TARGET_HANDLE.to_string()),
                ),
            };
            let duplicate = self
                .connections
                .iter()
                .chain(&bridges)
                .any(|existing| existing.same_route(&bridge));
            if !duplicate {
                bridges.push(bridge);
            }
        }
        debug!(
            "removing step '{step_id}': {} inbound x {} outbound, {} bridge(s)",
            incoming.len(),
            outgoing.len(),
            bridges.len()
        );

        let was_selected = self.selected_node_id.as_deref() == Some(step_id);
        self.remove_node_inner(step_id);
        self.connections.extend(bridges);
        if was_selected {
            self.selected_node_id = None;
        }
        self.reconcile_paths();
        self.save_workflow_to_storage();
    }

    // --- selection ----------------------------------------------------------

    pub fn select_node(&mut self, node_id: Option<&str>) {
        self.selected_node_id = node_id.map(str::to_string);
    }

    pub fn selected_node_id(&self) -> Option<&str> {
        self.selected_node_id.as_deref()
    }

    /// The selected node, or `None` when the selection points at nothing
    /// (for example after the node was removed).
    pub fn selected_node(&self) -> Option<&GraphNode> {
        self.selected_node_id
            .as_deref()
            .and_then(|id| self.node_by_id(id))
    }

    pub fn selected_step(&self) -> Option<&Step> {
        self.selected_node().and_then(|node| node.data.as_step())
    }

    pub fn selected_source_id(&self) -> Option<&str> {
        self.selected_source_id.as_deref()
    }

    // --- derived paths --------------------------------------------------------

    /// Rebuilds every step's `onSuccess`/`onFailure` lists from the current
    /// connections. Idempotent; safe to call at any time.
    pub fn reconcile_paths(&mut self) {
        self.reconcile_runs += 1;
        reconcile::reconcile_branches(
            &mut self.nodes,
            &self.connections,
            self.document.main_workflow_mut(),
        );
    }

    fn reconcile_unless_deferred(&mut self) {
        if !self.defer_path_updates {
            self.reconcile_paths();
        }
    }

    // --- operation lookups ------------------------------------------------------

    /// Resolves an operationId against the loaded sources, memoized.
    pub fn find_operation(&mut self, operation_id: &str) -> Option<&Operation> {
        self.index.find_operation(operation_id)
    }

    pub fn validate_operation_id(&mut self, operation_id: &str) -> Result<(), OperationIdError> {
        self.index.validate_operation_id(operation_id)
    }

    // --- validation and export ----------------------------------------------------

    /// Checks the workflow for structural problems and unresolvable steps.
    ///
    /// Resolution against the operation index only runs once at least one
    /// source has finished loading, so a half-loaded session does not drown
    /// in false "unknown operationId" errors.
    pub fn validate_workflow(&mut self) -> ValidationReport {
        let mut errors = Vec::new();

        if !self.nodes.iter().any(|node| node.kind == NodeKind::Workflow) {
            errors.push("Workflow must have a workflow node".to_string());
        }

        let workflow = self.document.main_workflow();
        if workflow.steps.is_empty() {
            errors.push("Workflow must have at least one step".to_string());
        }
        for step in &workflow.steps {
            if step.operation_id.is_empty() {
                errors.push(format!("Step '{}' is missing an operationId", step.step_id));
            }
        }
        if self.index.has_operations() {
            for step in &workflow.steps {
                if !step.operation_id.is_empty()
                    && self.index.find_operation(&step.operation_id).is_none()
                {
                    errors.push(format!(
                        "Step '{}' references unknown operationId '{}'",
                        step.step_id, step.operation_id
                    ));
                }
            }
        }

        let orphaned = self
            .nodes
            .iter()
            .filter(|node| {
                node.kind == NodeKind::Step
                    && !self
                        .connections
                        .iter()
                        .any(|conn| conn.source == node.id || conn.target == node.id)
            })
            .count();
        if orphaned > 0 {
            errors.push(format!(
                "{orphaned} step(s) are not connected to the workflow"
            ));
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Renders the document as Arazzo YAML, reconciling first so the branch
    /// lists reflect the connections as drawn.
    pub fn export_to_yaml(&mut self) -> Result<String, ExportError> {
        self.reconcile_paths();
        document::to_yaml(&self.document)
    }

    // --- document metadata ------------------------------------------------------

    pub fn set_workflow_title(&mut self, title: impl Into<String>) {
        self.document.info.title = title.into();
        self.save_workflow_to_storage();
    }

    pub fn set_workflow_description(&mut self, description: impl Into<String>) {
        self.document.info.description = description.into();
        self.save_workflow_to_storage();
    }

    /// True when the canvas holds anything worth saving or warning about.
    pub fn has_workflow_data(&self) -> bool {
        !self.nodes.is_empty() || !self.document.main_workflow().steps.is_empty()
    }

    /// Clears the canvas and the workflow's steps, then persists the empty
    /// state. The document metadata and source list stay.
    pub fn clear_workflow_data(&mut self) {
        self.clear_workflow_state();
        self.save_workflow_to_storage();
    }

    fn clear_workflow_state(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.selected_node_id = None;
        self.document.main_workflow_mut().steps.clear();
    }
}

/// Constructs a [`GraphStore`] with custom document metadata and backend.
pub struct GraphStoreBuilder {
    title: Option<String>,
    version: Option<String>,
    description: Option<String>,
    storage: Box<dyn StorageBackend>,
}

impl GraphStoreBuilder {
    fn new() -> Self {
        Self {
            title: None,
            version: None,
            description: None,
            storage: Box::new(MemoryBackend::new()),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_storage(mut self, storage: impl StorageBackend + 'static) -> Self {
        self.storage = Box::new(storage);
        self
    }

    pub fn build(self) -> GraphStore {
        let mut document = ArazzoDocument::new();
        if let Some(title) = self.title {
            document.info.title = title;
        }
        if let Some(version) = self.version {
            document.info.version = version;
        }
        if let Some(description) = self.description {
            document.info.description = description;
        }
        GraphStore {
            nodes: Vec::new(),
            connections: Vec::new(),
            document,
            selected_node_id: None,
            selected_source_id: None,
            defer_path_updates: false,
            index: OperationIndex::new(),
            storage: self.storage,
            reconcile_runs: 0,
        }
    }
}

impl Default for GraphStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`GraphStore::validate_workflow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// A partial update to a step. Fields left `None` are untouched; the stepId
/// and the derived branch lists can never be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepPatch {
    /// New operationId. An explicit empty string unsets it.
    pub operation_id: Option<String>,
    pub description: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    /// New request body. An explicit `Value::Null` clears it.
    pub request_body: Option<Value>,
    pub success_criteria: Option<Vec<String>>,
    pub outputs: Option<Map<String, Value>>,
}

impl StepPatch {
    /// The most common patch: pointing a step at a different operation.
    pub fn operation_id(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: Some(operation_id.into()),
            ..Self::default()
        }
    }

    pub fn apply(&self, step: &mut Step) {
        if let Some(operation_id) = &self.operation_id {
            step.operation_id = operation_id.clone();
        }
        if let Some(description) = &self.description {
            step.description = description.clone();
        }
        if let Some(parameters) = &self.parameters {
            step.parameters = parameters.clone();
        }
        if let Some(request_body) = &self.request_body {
            step.request_body = if request_body.is_null() {
                None
            } else {
                Some(request_body.clone())
            };
        }
        if let Some(success_criteria) = &self.success_criteria {
            step.success_criteria = success_criteria.clone();
        }
        if let Some(outputs) = &self.outputs {
            step.outputs = outputs.clone();
        }
    }
}
