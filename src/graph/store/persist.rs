//! Persistence and source management for [`GraphStore`].
//!
//! Storage failures are never fatal here: the store logs them and keeps
//! operating on its in-memory state, the same way an editor keeps working
//! when localStorage is full.

use log::{debug, warn};

use crate::document::{SourceDescription, SourceKind};
use crate::error::{GraphError, SourceLoadError};
use crate::graph::node::GraphNode;
use crate::openapi::ParsedSource;
use crate::storage::{SOURCES_KEY, SnapshotMap, SourcesRecord, WORKFLOWS_KEY, WorkflowSnapshot};

use super::GraphStore;

impl GraphStore {
    // --- snapshots ------------------------------------------------------

    /// Saves the selected source's canvas and document into the snapshot
    /// map, and refreshes the sources record. Does nothing when no source is
    /// selected.
    pub fn save_workflow_to_storage(&mut self) {
        let Some(source_id) = self.selected_source_id.clone() else {
            return;
        };
        let mut snapshots = self.read_snapshot_map();
        snapshots.insert(
            source_id,
            WorkflowSnapshot {
                nodes: self.nodes.clone(),
                connections: self.connections.clone(),
                workflow: self.document.clone(),
            },
        );
        match serde_json::to_string(&snapshots) {
            Ok(payload) => {
                if let Err(err) = self.storage.write(WORKFLOWS_KEY, &payload) {
                    warn!("failed to write workflow snapshots: {err}");
                }
            }
            Err(err) => warn!("failed to encode workflow snapshots: {err}"),
        }
        self.write_sources_record();
    }

    /// Restores the selected source's snapshot. Nodes and connections come
    /// back verbatim; the reconciler is not re-run on load. Returns whether a
    /// snapshot was found.
    pub fn load_workflow_from_storage(&mut self) -> bool {
        let Some(source_id) = self.selected_source_id.clone() else {
            return false;
        };
        let mut snapshots = self.read_snapshot_map();
        let Some(snapshot) = snapshots.remove(&source_id) else {
            return false;
        };

        // The live source list always wins over whatever the snapshot froze.
        let live_sources = std::mem::take(&mut self.document.source_descriptions);
        self.nodes = snapshot.nodes;
        self.connections = snapshot.connections;
        self.document = snapshot.workflow;
        self.document.source_descriptions = live_sources;
        self.document.ensure_main_workflow();
        true
    }

    /// Restores the source list and selection pointer from the sources
    /// record. The canvas itself is not hydrated; callers follow up with
    /// [`load_workflow_from_storage`](Self::load_workflow_from_storage) or a
    /// fresh [`select_source`](Self::select_source).
    pub fn load_sources_from_storage(&mut self) -> bool {
        let payload = match self.storage.read(SOURCES_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return false,
            Err(err) => {
                warn!("failed to read sources record: {err}");
                return false;
            }
        };
        match serde_json::from_str::<SourcesRecord>(&payload) {
            Ok(record) => {
                self.document.source_descriptions = record.sources;
                self.selected_source_id = record.selected_source_id;
                true
            }
            Err(err) => {
                warn!("discarding corrupt sources record: {err}");
                false
            }
        }
    }

    fn read_snapshot_map(&mut self) -> SnapshotMap {
        match self.storage.read(WORKFLOWS_KEY) {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(snapshots) => snapshots,
                Err(err) => {
                    warn!("discarding corrupt workflow snapshots: {err}");
                    SnapshotMap::default()
                }
            },
            Ok(None) => SnapshotMap::default(),
            Err(err) => {
                warn!("failed to read workflow snapshots: {err}");
                SnapshotMap::default()
            }
        }
    }

    fn write_sources_record(&mut self) {
        let record = SourcesRecord {
            sources: self.document.source_descriptions.clone(),
            selected_source_id: self.selected_source_id.clone(),
        };
        match serde_json::to_string(&record) {
            Ok(payload) => {
                if let Err(err) = self.storage.write(SOURCES_KEY, &payload) {
                    warn!("failed to write sources record: {err}");
                }
            }
            Err(err) => warn!("failed to encode sources record: {err}"),
        }
    }

    // --- source management ---------------------------------------------------

    pub fn source_descriptions(&self) -> &[SourceDescription] {
        &self.document.source_descriptions
    }

    /// Switches the editing context to another source (or to none).
    ///
    /// When moving away from a selected source its state is saved first, so
    /// switching back restores the canvas exactly. A source selected for the
    /// first time gets a fresh canvas holding only the workflow root node.
    pub fn select_source(&mut self, source_id: Option<&str>) {
        let next = source_id.map(str::to_string);
        if self.selected_source_id.is_some() && self.selected_source_id != next {
            self.save_workflow_to_storage();
        }
        self.selected_source_id = next;
        self.write_sources_record();
        self.clear_workflow_state();
        let restored = self.load_workflow_from_storage();
        if !restored && self.selected_source_id.is_some() {
            self.nodes.push(GraphNode::workflow_root());
        }
        debug!("selected source: {:?}", self.selected_source_id);
    }

    /// Registers a source, begins a load for OpenAPI-kind sources, and makes
    /// it the selected source. Names must be unique.
    ///
    /// Loading itself happens outside the store; the host fetches and parses
    /// the document and reports back through
    /// [`complete_source_load`](Self::complete_source_load).
    pub fn add_source_description(&mut self, source: SourceDescription) -> Result<(), GraphError> {
        if self
            .document
            .source_descriptions
            .iter()
            .any(|existing| existing.name == source.name)
        {
            return Err(GraphError::DuplicateSourceName { name: source.name });
        }
        let name = source.name.clone();
        let kind = source.kind;
        self.document.source_descriptions.push(source);
        if kind == SourceKind::Openapi {
            self.index.begin_load(&name);
        }
        self.select_source(Some(&name));
        Ok(())
    }

    /// Drops a source from the document and the operation index. Removing
    /// the selected source clears the canvas without saving it; the old
    /// snapshot stays in storage under the removed name.
    pub fn remove_source_description(&mut self, name: &str) {
        let before = self.document.source_descriptions.len();
        self.document
            .source_descriptions
            .retain(|source| source.name != name);
        if self.document.source_descriptions.len() == before {
            return;
        }
        self.index.remove_source(name);
        if self.selected_source_id.as_deref() == Some(name) {
            self.selected_source_id = None;
            self.clear_workflow_state();
        }
        self.write_sources_record();
    }

    /// Reports the outcome of a source load started by
    /// [`add_source_description`](Self::add_source_description). Completions
    /// for sources that have since been removed are discarded. When the same
    /// source is loaded twice concurrently, the last completion wins.
    pub fn complete_source_load(
        &mut self,
        name: &str,
        result: Result<ParsedSource, SourceLoadError>,
    ) {
        if !self
            .document
            .source_descriptions
            .iter()
            .any(|source| source.name == name)
        {
            debug!("discarding load completion for removed source '{name}'");
            return;
        }
        match result {
            Ok(mut parsed) => {
                parsed.source_name = name.to_string();
                debug!(
                    "source '{name}' loaded with {} operation(s)",
                    parsed.operations.len()
                );
                self.index.finish_load(parsed);
            }
            Err(err) => {
                warn!("failed to load source '{name}': {err}");
                self.index.fail_load(name, err.to_string());
            }
        }
    }
}
