use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Step;
use crate::error::NodeDataError;

/// Id of the synthetic entry node present in every non-empty canvas.
pub const WORKFLOW_ROOT_ID: &str = "workflow-root";

/// A node on the visual canvas.
///
/// The wire shape matches what node-editor frontends emit: an `id`, a `type`
/// discriminator, a free-form `data` payload and an optional position. The
/// payload is decoded according to the discriminator, so a step node whose
/// data is not a valid [`Step`] fails deserialization instead of smuggling
/// junk into the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGraphNode", into = "RawGraphNode")]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub data: NodeData,
    pub position: Option<Position>,
}

impl GraphNode {
    /// A step node. The node id is the step's `stepId`; the two are the same
    /// identifier by construction.
    pub fn step(step: Step, position: Option<Position>) -> Self {
        Self {
            id: step.step_id.clone(),
            kind: NodeKind::Step,
            data: NodeData::Step(step),
            position,
        }
    }

    /// The entry node the store synthesizes for an empty canvas.
    pub fn workflow_root() -> Self {
        Self {
            id: WORKFLOW_ROOT_ID.to_string(),
            kind: NodeKind::Workflow,
            data: NodeData::Container(Value::Object(serde_json::Map::new())),
            position: Some(Position { x: 0.0, y: 0.0 }),
        }
    }

    pub fn is_step(&self) -> bool {
        self.kind == NodeKind::Step
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Step,
    Workflow,
}

/// Payload of a node, decoded per [`NodeKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// A full step record. Kept in sync with the document's copy by the store.
    Step(Step),
    /// Opaque payload of container nodes (the workflow root). Preserved
    /// verbatim so frontend state survives a save/load cycle.
    Container(Value),
}

impl NodeData {
    pub fn as_step(&self) -> Option<&Step> {
        match self {
            NodeData::Step(step) => Some(step),
            NodeData::Container(_) => None,
        }
    }

    pub fn as_step_mut(&mut self) -> Option<&mut Step> {
        match self {
            NodeData::Step(step) => Some(step),
            NodeData::Container(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Untyped wire form of a node, converted to and from [`GraphNode`].
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGraphNode {
    id: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
}

impl TryFrom<RawGraphNode> for GraphNode {
    type Error = NodeDataError;

    fn try_from(raw: RawGraphNode) -> Result<Self, Self::Error> {
        let data = match raw.kind {
            NodeKind::Step => {
                let step = serde_json::from_value(raw.data).map_err(|source| NodeDataError {
                    id: raw.id.clone(),
                    source,
                })?;
                NodeData::Step(step)
            }
            NodeKind::Workflow => NodeData::Container(raw.data),
        };
        Ok(GraphNode {
            id: raw.id,
            kind: raw.kind,
            data,
            position: raw.position,
        })
    }
}

impl From<GraphNode> for RawGraphNode {
    fn from(node: GraphNode) -> Self {
        let data = match node.data {
            NodeData::Step(step) => serde_json::to_value(step).unwrap_or(Value::Null),
            NodeData::Container(value) => value,
        };
        RawGraphNode {
            id: node.id,
            kind: node.kind,
            data,
            position: node.position,
        }
    }
}
