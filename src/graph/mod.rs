//! The visual graph: nodes, connections, and the store that owns them.

pub mod connection;
pub mod node;
mod reconcile;
pub mod store;

pub use connection::{BranchKind, Connection, DEFAULT_TARGET_HANDLE};
pub use node::{GraphNode, NodeData, NodeKind, Position, WORKFLOW_ROOT_ID};
pub use store::{GraphStore, GraphStoreBuilder, StepPatch, ValidationReport};
