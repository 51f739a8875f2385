//! Tests for graph mutations: nodes, connections, patches, batching, and
//! step removal with reconnection.
mod common;
use arazzo_canvas::error::GraphError;
use arazzo_canvas::prelude::*;
use common::*;

#[test]
fn test_add_node_appends_step_record() {
    let mut store = memory_store();
    store
        .add_node(step_node("fetch", "listPets"))
        .expect("Failed to add node");

    assert_eq!(store.nodes().len(), 1);
    assert_eq!(store.main_workflow().steps.len(), 1);
    assert_eq!(store.main_workflow().steps[0].step_id, "fetch");
    assert_eq!(store.main_workflow().steps[0].operation_id, "listPets");
}

#[test]
fn test_add_node_rejects_duplicate_id() {
    let mut store = memory_store();
    store
        .add_node(step_node("fetch", "listPets"))
        .expect("Failed to add node");

    let err = store
        .add_node(step_node("fetch", "getPet"))
        .expect_err("Duplicate id must be rejected");
    assert_eq!(
        err,
        GraphError::DuplicateNodeId {
            id: "fetch".to_string()
        }
    );

    // The graph is untouched by the failed add.
    assert_eq!(store.nodes().len(), 1);
    assert_eq!(store.main_workflow().steps.len(), 1);
    assert_eq!(store.main_workflow().steps[0].operation_id, "listPets");
}

#[test]
fn test_workflow_node_contributes_no_step() {
    let mut store = memory_store();
    store
        .add_node(GraphNode::workflow_root())
        .expect("Failed to add workflow node");

    assert_eq!(store.nodes().len(), 1);
    assert!(store.main_workflow().steps.is_empty());
}

#[test]
fn test_remove_node_cascades_connections_and_step() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_connection(connect("c1", "a", "b"));
    assert_eq!(store.main_workflow().steps[0].on_success.len(), 1);

    store.remove_node("b");

    assert_eq!(store.nodes().len(), 1);
    assert!(store.connections().is_empty());
    assert_eq!(store.main_workflow().steps.len(), 1);
    // Reconciliation ran after the cascade, so the stale target is gone.
    assert!(store.main_workflow().steps[0].on_success.is_empty());
}

#[test]
fn test_remove_unknown_node_is_a_noop() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    let runs = store.reconcile_runs();

    store.remove_node("ghost");

    assert_eq!(store.nodes().len(), 1);
    assert_eq!(store.reconcile_runs(), runs);
}

#[test]
fn test_update_node_patches_both_copies() {
    let mut store = memory_store();
    store.add_node(step_node("fetch", "")).expect("add node");

    store.update_node(
        "fetch",
        StepPatch {
            description: Some("Fetches the pet list".to_string()),
            ..StepPatch::default()
        },
    );
    store.update_node("fetch", StepPatch::operation_id("listPets"));

    let node_step = store
        .node_by_id("fetch")
        .and_then(|node| node.data.as_step())
        .expect("step node");
    assert_eq!(node_step.operation_id, "listPets");
    assert_eq!(node_step.description, "Fetches the pet list");

    let record = store.main_workflow().step("fetch").expect("step record");
    assert_eq!(record.operation_id, "listPets");
    assert_eq!(record.description, "Fetches the pet list");
}

#[test]
fn test_update_node_ignores_non_step_targets() {
    let mut store = memory_store();
    store
        .add_node(GraphNode::workflow_root())
        .expect("add root");

    store.update_node(WORKFLOW_ROOT_ID, StepPatch::operation_id("listPets"));
    store.update_node("missing", StepPatch::operation_id("listPets"));

    assert!(store.main_workflow().steps.is_empty());
}

#[test]
fn test_patch_can_unset_operation_id_and_request_body() {
    let mut store = memory_store();
    let mut step = Step::new("s", "createPet");
    step.request_body = Some(json!({"name": "Rex"}));
    store.add_node(GraphNode::step(step, None)).expect("add node");

    store.update_node(
        "s",
        StepPatch {
            operation_id: Some(String::new()),
            request_body: Some(Value::Null),
            ..StepPatch::default()
        },
    );

    let record = store.main_workflow().step("s").expect("step record");
    assert_eq!(record.operation_id, "");
    assert!(record.request_body.is_none());
}

#[test]
fn test_patch_never_touches_derived_branch_lists() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_connection(connect("c1", "a", "b"));

    let runs = store.reconcile_runs();
    store.update_node(
        "a",
        StepPatch {
            description: Some("patched".to_string()),
            ..StepPatch::default()
        },
    );

    // No reconciliation ran, and the derived list is intact.
    assert_eq!(store.reconcile_runs(), runs);
    let record = store.main_workflow().step("a").expect("step record");
    assert_eq!(record.on_success, vec![CriterionTarget::step("b")]);
}

#[test]
fn test_remove_connection_reruns_reconciliation() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_connection(connect("c1", "a", "b"));

    store.remove_connection("c1");

    assert!(store.connections().is_empty());
    assert!(store.main_workflow().steps[0].on_success.is_empty());

    let runs = store.reconcile_runs();
    store.remove_connection("ghost");
    assert_eq!(store.reconcile_runs(), runs); // nothing removed, nothing rerun
}

#[test]
fn test_batch_reconciles_exactly_once() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");

    let before = store.reconcile_runs();
    store.batch_connections(|store| {
        store.add_connection(connect("c1", "a", "b"));
        store.add_connection(connect_failure("c2", "a", "b"));
        assert!(store.is_deferring_path_updates());
        assert_eq!(store.reconcile_runs(), before); // deferred so far
    });

    assert!(!store.is_deferring_path_updates());
    assert_eq!(store.reconcile_runs(), before + 1);

    let record = store.main_workflow().step("a").expect("step record");
    assert_eq!(record.on_success, vec![CriterionTarget::step("b")]);
    assert_eq!(record.on_failure, vec![CriterionTarget::step("b")]);
}

#[test]
fn test_nested_batches_reconcile_once_at_outermost_end() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_node(step_node("c", "deletePet")).expect("add c");

    let before = store.reconcile_runs();
    store.batch_connections(|store| {
        store.add_connection(connect("c1", "a", "b"));
        store.batch_connections(|store| {
            store.add_connection(connect("c2", "b", "c"));
        });
        // The inner batch restored the outer deferral instead of reconciling.
        assert!(store.is_deferring_path_updates());
        assert_eq!(store.reconcile_runs(), before);
    });

    assert_eq!(store.reconcile_runs(), before + 1);
    assert_eq!(
        store.main_workflow().step("a").expect("step a").on_success,
        vec![CriterionTarget::step("b")]
    );
    assert_eq!(
        store.main_workflow().step("b").expect("step b").on_success,
        vec![CriterionTarget::step("c")]
    );
}

#[test]
fn test_reconnect_bridges_a_linear_chain() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_node(step_node("c", "deletePet")).expect("add c");
    store.add_connection(connect("c1", "a", "b"));
    store.add_connection(connect("c2", "b", "c"));

    store.remove_step_with_reconnect("b");

    assert!(store.node_by_id("b").is_none());
    assert_eq!(store.connections().len(), 1);
    let bridge = &store.connections()[0];
    assert_eq!(bridge.id, "conn-a-c-success");
    assert_eq!(bridge.source, "a");
    assert_eq!(bridge.target, "c");
    // The handleless inbound edge bridges as an explicit success edge.
    assert_eq!(bridge.source_handle, Some(BranchKind::Success));
    assert_eq!(bridge.target_handle.as_deref(), Some("prev"));

    let record = store.main_workflow().step("a").expect("step record");
    assert_eq!(record.on_success, vec![CriterionTarget::step("c")]);
}

#[test]
fn test_reconnect_builds_the_full_cross_product() {
    let mut store = memory_store();
    for (id, op) in [
        ("in1", "listPets"),
        ("in2", "getPet"),
        ("mid", "createPet"),
        ("out1", "deletePet"),
        ("out2", "listPets"),
    ] {
        store.add_node(step_node(id, op)).expect("add node");
    }
    store.add_connection(connect("e1", "in1", "mid"));
    store.add_connection(connect_failure("e2", "in2", "mid"));
    store.add_connection(connect("e3", "mid", "out1"));
    store.add_connection(connect("e4", "mid", "out2").with_target_handle("next"));

    store.remove_step_with_reconnect("mid");

    // 2 inbound x 2 outbound = 4 bridges, nothing else left.
    assert_eq!(store.connections().len(), 4);
    let find = |source: &str, target: &str| {
        store
            .connections()
            .iter()
            .find(|conn| conn.source == source && conn.target == target)
            .unwrap_or_else(|| panic!("missing bridge {source} -> {target}"))
    };
    assert_eq!(find("in1", "out1").branch_kind(), BranchKind::Success);
    assert_eq!(find("in1", "out2").target_handle.as_deref(), Some("next"));
    assert_eq!(find("in2", "out1").branch_kind(), BranchKind::Failure);
    assert_eq!(find("in2", "out1").target_handle.as_deref(), Some("prev"));
    assert_eq!(find("in2", "out2").branch_kind(), BranchKind::Failure);

    let in2 = store.main_workflow().step("in2").expect("step record");
    assert_eq!(in2.on_success.len(), 0);
    assert_eq!(in2.on_failure.len(), 2);
}

#[test]
fn test_reconnect_skips_routes_that_already_exist() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_node(step_node("c", "deletePet")).expect("add c");
    store.add_connection(connect("c1", "a", "b"));
    store.add_connection(connect("c2", "b", "c").with_target_handle("prev"));
    // A direct edge identical to the would-be bridge.
    store.add_connection(connect("direct", "a", "c").with_target_handle("prev"));

    store.remove_step_with_reconnect("b");

    assert_eq!(store.connections().len(), 1);
    assert_eq!(store.connections()[0].id, "direct");
    let record = store.main_workflow().step("a").expect("step record");
    assert_eq!(record.on_success, vec![CriterionTarget::step("c")]);
}

#[test]
fn test_reconnect_treats_explicit_success_handles_as_the_same_route() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_node(step_node("c", "deletePet")).expect("add c");
    store.add_connection(connect("c1", "a", "b")); // no handle, implicit success
    store.add_connection(connect("c2", "b", "c"));
    // A direct edge on the explicit success handle: the same route as the
    // would-be bridge, spelled differently.
    store.add_connection(
        connect("direct", "a", "c")
            .with_branch(BranchKind::Success)
            .with_target_handle("prev"),
    );

    store.remove_step_with_reconnect("b");

    assert_eq!(store.connections().len(), 1);
    assert_eq!(store.connections()[0].id, "direct");
    let record = store.main_workflow().step("a").expect("step record");
    assert_eq!(record.on_success, vec![CriterionTarget::step("c")]);
}

#[test]
fn test_reconnect_preserves_the_failure_branch() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_node(step_node("c", "deletePet")).expect("add c");
    store.add_connection(connect_failure("c1", "a", "b"));
    store.add_connection(connect("c2", "b", "c"));

    store.remove_step_with_reconnect("b");

    let bridge = &store.connections()[0];
    assert_eq!(bridge.id, "conn-a-c-failure");
    assert_eq!(bridge.branch_kind(), BranchKind::Failure);

    let record = store.main_workflow().step("a").expect("step record");
    assert!(record.on_success.is_empty());
    assert_eq!(record.on_failure, vec![CriterionTarget::step("c")]);
}

#[test]
fn test_reconnect_clears_selection_of_the_removed_step() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_connection(connect("c1", "a", "b"));

    store.select_node(Some("b"));
    store.remove_step_with_reconnect("b");
    assert!(store.selected_node_id().is_none());

    // Removing some other step leaves the selection alone.
    store.add_node(step_node("b2", "getPet")).expect("add b2");
    store.select_node(Some("a"));
    store.remove_step_with_reconnect("b2");
    assert_eq!(store.selected_node_id(), Some("a"));
}

#[test]
fn test_reconnect_ignores_non_step_targets() {
    let mut store = memory_store();
    store
        .add_node(GraphNode::workflow_root())
        .expect("add root");
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_connection(connect("c1", WORKFLOW_ROOT_ID, "a"));

    store.remove_step_with_reconnect(WORKFLOW_ROOT_ID);
    store.remove_step_with_reconnect("ghost");

    assert!(store.node_by_id(WORKFLOW_ROOT_ID).is_some());
    assert_eq!(store.connections().len(), 1);
}

#[test]
fn test_selection_accessors_follow_the_graph() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");

    store.select_node(Some("a"));
    assert_eq!(store.selected_node().expect("selected").id, "a");
    assert_eq!(store.selected_step().expect("selected step").step_id, "a");

    store.remove_node("a");
    assert!(store.selected_node().is_none());
    assert!(store.selected_step().is_none());

    store.select_node(None);
    assert!(store.selected_node_id().is_none());
}

#[test]
fn test_validate_flags_missing_structure() {
    let mut store = memory_store();

    let report = store.validate_workflow();

    assert!(!report.valid);
    assert!(report
        .errors
        .contains(&"Workflow must have a workflow node".to_string()));
    assert!(report
        .errors
        .contains(&"Workflow must have at least one step".to_string()));
}

#[test]
fn test_validate_flags_steps_without_an_operation_id() {
    let mut store = store_with_petstore();
    store.add_node(step_node("unbound", "")).expect("add node");
    store.add_connection(connect("c1", WORKFLOW_ROOT_ID, "unbound"));

    let report = store.validate_workflow();

    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec!["Step 'unbound' is missing an operationId".to_string()]
    );
}

#[test]
fn test_validate_resolves_operation_ids_once_sources_loaded() {
    let mut store = store_with_petstore();
    store.add_node(step_node("fetch", "listPets")).expect("add");
    store.add_node(step_node("typo", "listPetz")).expect("add");
    store.batch_connections(|store| {
        store.add_connection(connect("c1", WORKFLOW_ROOT_ID, "fetch"));
        store.add_connection(connect("c2", "fetch", "typo"));
    });

    let report = store.validate_workflow();

    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec!["Step 'typo' references unknown operationId 'listPetz'".to_string()]
    );
}

#[test]
fn test_validate_skips_resolution_before_any_source_loads() {
    let mut store = memory_store();
    store
        .add_source_description(SourceDescription::openapi("pending", "https://p.example"))
        .expect("add source");
    store.add_node(step_node("fetch", "listPets")).expect("add");
    store.add_connection(connect("c1", WORKFLOW_ROOT_ID, "fetch"));

    // The source is still loading: an unresolvable id is not an error yet.
    let report = store.validate_workflow();
    assert!(report.valid, "unexpected errors: {:?}", report.errors);

    store.complete_source_load("pending", Ok(petstore_source("pending")));
    assert!(store.validate_workflow().valid);
}

#[test]
fn test_validate_counts_orphaned_steps_without_naming_them() {
    let mut store = store_with_petstore();
    store.add_node(step_node("fetch", "listPets")).expect("add");
    store.add_node(step_node("lost1", "getPet")).expect("add");
    store.add_node(step_node("lost2", "deletePet")).expect("add");
    store.add_connection(connect("c1", WORKFLOW_ROOT_ID, "fetch"));

    let report = store.validate_workflow();

    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec!["2 step(s) are not connected to the workflow".to_string()]
    );
}

#[test]
fn test_validate_passes_a_fully_specified_flow() {
    let mut store = store_with_petstore();
    store.add_node(step_node("fetch", "listPets")).expect("add");
    store.add_node(step_node("show", "getPet")).expect("add");
    store.batch_connections(|store| {
        store.add_connection(connect("c1", WORKFLOW_ROOT_ID, "fetch"));
        store.add_connection(connect("c2", "fetch", "show"));
    });

    let report = store.validate_workflow();

    assert!(report.valid, "unexpected errors: {:?}", report.errors);
    assert!(report.errors.is_empty());
}

#[test]
fn test_connection_lookups_by_endpoint() {
    let mut store = memory_store();
    store.add_node(step_node("a", "listPets")).expect("add a");
    store.add_node(step_node("b", "getPet")).expect("add b");
    store.add_node(step_node("c", "deletePet")).expect("add c");
    store.add_connection(connect("c1", "a", "b"));
    store.add_connection(connect("c2", "c", "b"));
    store.add_connection(connect("c3", "b", "c"));

    let incoming = store.incoming_connections("b");
    assert_eq!(incoming.len(), 2);
    assert_eq!(incoming[0].id, "c1");
    assert_eq!(incoming[1].id, "c2");

    let outgoing = store.outgoing_connections("b");
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].id, "c3");
}
