//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the arazzo-canvas
//! crate. Import this module to get access to the core functionality without
//! having to import each type individually.
//!
//! # Example
//!
//! ```rust
//! // Use the prelude to get easy access to all the core types.
//! use arazzo_canvas::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let mut store = GraphStore::builder().with_title("Orders").build();
//!
//! store.add_node(GraphNode::step(Step::new("create-order", "createOrder"), None))?;
//! store.add_node(GraphNode::step(Step::new("notify", "notifyCustomer"), None))?;
//! store.add_connection(
//!     Connection::new("c1", "create-order", "notify").with_branch(BranchKind::Failure),
//! );
//!
//! let yaml = store.export_to_yaml()?;
//! assert!(yaml.contains("onFailure"));
//! # Ok(())
//! # }
//! ```

// Graph state and mutations
pub use crate::graph::{
    BranchKind, Connection, GraphNode, GraphStore, GraphStoreBuilder, NodeData, NodeKind,
    Position, StepPatch, ValidationReport, WORKFLOW_ROOT_ID,
};

// Document model
pub use crate::document::{
    ArazzoDocument, CriterionTarget, DocumentInfo, Parameter, ParameterLocation,
    SourceDescription, SourceKind, Step, TargetKind, Workflow,
};

// Operation lookup
pub use crate::index::OperationIndex;
pub use crate::openapi::{Operation, OperationParameter, ParsedSource};

// Storage backends and records
pub use crate::storage::{
    FileBackend, MemoryBackend, SourcesRecord, StorageBackend, WorkflowSnapshot,
};

// Error types
pub use crate::error::{ExportError, GraphError, OperationIdError, SourceLoadError, StorageError};

// Re-exports commonly used together with this crate
pub use serde_json::{Value, json};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
