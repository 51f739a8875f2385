use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version of the Arazzo specification the document declares.
pub const ARAZZO_VERSION: &str = "1.0.0";

/// Identifier and summary given to the single workflow every document carries.
pub const MAIN_WORKFLOW_ID: &str = "main-workflow";
pub const MAIN_WORKFLOW_SUMMARY: &str = "Main workflow";

/// The authored Arazzo document. This is the artifact the whole store exists
/// to build: sources feed the operation index, the graph feeds the steps, and
/// exporting renders this struct as YAML.
///
/// Field order matters: serialization emits fields in declaration order, which
/// is the order the Arazzo specification lists them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArazzoDocument {
    pub arazzo: String,
    pub info: DocumentInfo,
    #[serde(default)]
    pub source_descriptions: Vec<SourceDescription>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

impl ArazzoDocument {
    /// A fresh document holding one empty main workflow.
    pub fn new() -> Self {
        Self {
            arazzo: ARAZZO_VERSION.to_string(),
            info: DocumentInfo::default(),
            source_descriptions: Vec::new(),
            workflows: vec![Workflow::main()],
        }
    }

    /// The primary workflow. Documents constructed by this crate always hold
    /// exactly one; [`ensure_main_workflow`](Self::ensure_main_workflow)
    /// repairs documents restored from storage that lost it.
    pub fn main_workflow(&self) -> &Workflow {
        &self.workflows[0]
    }

    pub fn main_workflow_mut(&mut self) -> &mut Workflow {
        &mut self.workflows[0]
    }

    /// Re-establishes the one-workflow invariant after deserialization.
    pub fn ensure_main_workflow(&mut self) {
        if self.workflows.is_empty() {
            self.workflows.push(Workflow::main());
        }
    }
}

impl Default for ArazzoDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "New Workflow".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
        }
    }
}

/// A registered API description the workflow draws operations from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescription {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
}

impl SourceDescription {
    pub fn openapi(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind: SourceKind::Openapi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Openapi,
    Arazzo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub workflow_id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub outputs: Map<String, Value>,
}

impl Workflow {
    /// The main workflow every fresh document starts with.
    pub fn main() -> Self {
        Self {
            workflow_id: MAIN_WORKFLOW_ID.to_string(),
            summary: MAIN_WORKFLOW_SUMMARY.to_string(),
            description: String::new(),
            inputs: Map::new(),
            steps: Vec::new(),
            outputs: Map::new(),
        }
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.step_id == step_id)
    }

    pub fn step_mut(&mut self, step_id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|step| step.step_id == step_id)
    }
}

/// One step of the workflow. The graph holds a second copy of each step
/// inside its node, and the store keeps the two in sync on every mutation.
///
/// `on_success` and `on_failure` are derived from the visual connections and
/// rewritten wholesale by the path reconciler; editing them directly is
/// pointless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub step_id: String,
    #[serde(default)]
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "value_is_unset")]
    pub request_body: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_success: Vec<CriterionTarget>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_failure: Vec<CriterionTarget>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub outputs: Map<String, Value>,
}

impl Step {
    pub fn new(step_id: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            operation_id: operation_id.into(),
            description: String::new(),
            parameters: Vec::new(),
            request_body: None,
            success_criteria: Vec::new(),
            on_success: Vec::new(),
            on_failure: Vec::new(),
            outputs: Map::new(),
        }
    }
}

/// Exports drop request bodies that carry no content, not just absent ones.
fn value_is_unset(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            location: None,
            value,
            description: None,
        }
    }

    pub fn with_location(mut self, location: ParameterLocation) -> Self {
        self.location = Some(location);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

/// Where control flows after a step. Written by the path reconciler from the
/// success/failure connections of the step's node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionTarget {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<String>,
}

impl CriterionTarget {
    /// A `goto`-style target pointing at another step.
    pub fn step(step_id: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Step,
            step_id: Some(step_id.into()),
            criteria: Vec::new(),
        }
    }

    /// Terminates the workflow on this branch.
    pub fn end() -> Self {
        Self {
            kind: TargetKind::End,
            step_id: None,
            criteria: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Step,
    End,
}
