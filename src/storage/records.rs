use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::document::{ArazzoDocument, SourceDescription};
use crate::graph::{Connection, GraphNode};

/// Everything needed to rebuild one source's canvas: the nodes, the
/// connections, and the document as it stood at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSnapshot {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    pub workflow: ArazzoDocument,
}

/// The record stored under [`WORKFLOWS_KEY`](super::WORKFLOWS_KEY): one
/// snapshot per source name.
pub type SnapshotMap = AHashMap<String, WorkflowSnapshot>;

/// The record stored under [`SOURCES_KEY`](super::SOURCES_KEY): the source
/// list and which one was selected, so a session resumes where it left off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcesRecord {
    #[serde(default)]
    pub sources: Vec<SourceDescription>,
    #[serde(default)]
    pub selected_source_id: Option<String>,
}
