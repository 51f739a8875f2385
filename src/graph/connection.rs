use serde::{Deserialize, Serialize};

/// Target handle assigned to bridge connections when the replaced edge never
/// declared one.
pub const DEFAULT_TARGET_HANDLE: &str = "prev";

/// Which outcome branch a connection leaves its source node on.
///
/// An absent source handle means success; frontends only attach a handle when
/// the user drags from an explicit branch port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Success,
    Failure,
}

impl BranchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchKind::Success => "success",
            BranchKind::Failure => "failure",
        }
    }
}

/// A directed edge between two canvas nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<BranchKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Connection {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn with_branch(mut self, branch: BranchKind) -> Self {
        self.source_handle = Some(branch);
        self
    }

    pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }

    /// The branch this connection routes, defaulting to success.
    pub fn branch_kind(&self) -> BranchKind {
        self.source_handle.unwrap_or(BranchKind::Success)
    }

    /// True when both connections describe the same route, ignoring ids.
    /// An absent source handle and an explicit success handle are the same
    /// branch, so they count as the same route.
    pub(crate) fn same_route(&self, other: &Connection) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.branch_kind() == other.branch_kind()
            && self.target_handle == other.target_handle
    }
}
