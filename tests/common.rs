//! Common test utilities for building stores, sources, and graph fixtures.
use arazzo_canvas::openapi;
use arazzo_canvas::prelude::*;

/// Creates a store over fresh in-memory storage.
#[allow(dead_code)]
pub fn memory_store() -> GraphStore {
    GraphStore::builder().with_title("Test Workflow").build()
}

/// Creates a store with one registered petstore source, fully loaded and
/// selected. The canvas holds only the synthesized workflow root.
#[allow(dead_code)]
pub fn store_with_petstore() -> GraphStore {
    let mut store = memory_store();
    store
        .add_source_description(SourceDescription::openapi(
            "petstore",
            "https://petstore.example/openapi.json",
        ))
        .expect("Failed to add petstore source");
    store.complete_source_load("petstore", Ok(petstore_source("petstore")));
    store
}

/// The OpenAPI document all petstore fixtures are parsed from.
///
/// Covers the parser's interesting cases: path-level parameters, an
/// operation-level query parameter, a request body, and an operation with
/// nothing but an id.
#[allow(dead_code)]
pub fn petstore_document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "summary": "List all pets",
                    "parameters": [
                        { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                    ]
                },
                "post": {
                    "operationId": "createPet",
                    "summary": "Create a pet",
                    "requestBody": {
                        "required": true,
                        "description": "The pet to create",
                        "content": {
                            "application/json": { "schema": { "type": "object" } }
                        }
                    }
                }
            },
            "/pets/{petId}": {
                "parameters": [
                    { "name": "petId", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "get": {
                    "operationId": "getPet",
                    "summary": "Get a pet by id"
                },
                "delete": { "operationId": "deletePet" }
            }
        }
    })
}

/// The petstore document parsed under the given source name.
#[allow(dead_code)]
pub fn petstore_source(name: &str) -> ParsedSource {
    openapi::parse_document(&petstore_document(), name)
}

/// Creates a step node whose id doubles as the stepId.
#[allow(dead_code)]
pub fn step_node(id: &str, operation_id: &str) -> GraphNode {
    GraphNode::step(Step::new(id, operation_id), None)
}

/// Creates a success connection.
#[allow(dead_code)]
pub fn connect(id: &str, source: &str, target: &str) -> Connection {
    Connection::new(id, source, target)
}

/// Creates a failure-branch connection.
#[allow(dead_code)]
pub fn connect_failure(id: &str, source: &str, target: &str) -> Connection {
    Connection::new(id, source, target).with_branch(BranchKind::Failure)
}
