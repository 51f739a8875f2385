use thiserror::Error;

/// Errors raised by graph mutations that reject invalid input outright.
///
/// Every other mutation on the store is a silent no-op when its target does
/// not exist, so UI code can call them speculatively.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("A node with id '{id}' already exists in the graph")]
    DuplicateNodeId { id: String },

    #[error("A source description named '{name}' already exists")]
    DuplicateSourceName { name: String },
}

/// Raised when a step node's payload cannot be decoded as an Arazzo step.
#[derive(Error, Debug)]
#[error("Node '{id}' carries data that is not a valid Arazzo step: {source}")]
pub struct NodeDataError {
    pub id: String,
    #[source]
    pub source: serde_json::Error,
}

/// Errors that can occur while retrieving or decoding a source description's
/// API document. These are recorded per source name and never propagated to
/// the caller that started the load.
#[derive(Error, Debug, Clone)]
pub enum SourceLoadError {
    #[error("Failed to decode source document: {0}")]
    Decode(String),

    #[error("Source document could not be retrieved: {0}")]
    Unavailable(String),
}

/// Errors at the durable-storage boundary. The store catches these, logs
/// them, and keeps running on its in-memory state.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend rejected the operation: {0}")]
    Backend(String),

    #[error("Failed to encode persisted record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that can occur while rendering the document to YAML.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to render workflow document as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Outcomes of checking a step's operationId against the operation index.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationIdError {
    #[error("operationId is required")]
    Required,

    #[error("operationId '{0}' was not found in any loaded source")]
    NotFound(String),
}
