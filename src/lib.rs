//! # Arazzo Canvas - Workflow Graph State Engine
//!
//! **Arazzo Canvas** is the state engine behind a visual editor for [OpenAPI
//! Arazzo](https://spec.openapis.org/arazzo/latest.html) workflows. It owns a
//! node-and-connection graph the way a canvas frontend draws it, keeps an
//! Arazzo document in lockstep with that graph, and derives each step's
//! `onSuccess`/`onFailure` transitions from the drawn connections so control
//! flow can never drift out of sync with the picture.
//!
//! ## Core Workflow
//!
//! The engine is host-agnostic: it performs no I/O of its own beyond a
//! pluggable key-value storage backend. The primary workflow is:
//!
//! 1.  **Build a store**: Use [`GraphStore::builder`](graph::GraphStore::builder) to create a store, injecting a [`StorageBackend`](storage::StorageBackend) (in-memory, file-based, or your own).
//! 2.  **Register sources**: Add OpenAPI source descriptions. The host fetches each document, runs it through [`openapi::parse_text`], and hands the result back via `complete_source_load`. Parsed operations land in the [`OperationIndex`](index::OperationIndex).
//! 3.  **Edit the graph**: Add, update, and remove step nodes and connections. Every mutation re-derives the affected steps' branch lists and persists a per-source snapshot.
//! 4.  **Validate and export**: Check the workflow against the loaded operations, then render it as Arazzo YAML.
//!
//! ## Quick Start
//!
//! The following example demonstrates the end-to-end process.
//!
//! ```rust
//! use arazzo_canvas::openapi;
//! use arazzo_canvas::prelude::*;
//!
//! fn main() -> Result<()> {
//!     // 1. A store over the default in-memory storage.
//!     let mut store = GraphStore::builder().with_title("Pet adoption").build();
//!
//!     // 2. Register a source, then feed its parsed document back in. In a
//!     // real host the fetch happens elsewhere (HTTP, disk, ...); the store
//!     // only sees the outcome.
//!     store.add_source_description(SourceDescription::openapi(
//!         "petstore",
//!         "https://example.com/petstore.json",
//!     ))?;
//!     let document = serde_json::json!({
//!         "paths": {
//!             "/pets": {
//!                 "get": { "operationId": "listPets", "summary": "List pets" }
//!             }
//!         }
//!     });
//!     store.complete_source_load("petstore", Ok(openapi::parse_document(&document, "petstore")));
//!
//!     // 3. Grow the graph. Branch lists are derived from connections, so
//!     // there is nothing to wire up by hand.
//!     store.add_node(GraphNode::step(Step::new("list-pets", "listPets"), None))?;
//!     store.add_connection(Connection::new("c1", WORKFLOW_ROOT_ID, "list-pets"));
//!
//!     // 4. Validate against the loaded operations and export.
//!     let report = store.validate_workflow();
//!     assert!(report.valid, "unexpected errors: {:?}", report.errors);
//!     println!("{}", store.export_to_yaml()?);
//!
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod error;
pub mod graph;
pub mod index;
pub mod openapi;
pub mod prelude;
pub mod storage;
