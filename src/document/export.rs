use super::model::ArazzoDocument;
use crate::error::ExportError;

/// Renders the document as Arazzo YAML.
///
/// Serialization handles pruning: optional step fields that are empty never
/// reach the output (see the `skip_serializing_if` attributes on
/// [`Step`](super::model::Step)). Callers that want the derived branch lists
/// to reflect the latest connections should reconcile first;
/// `GraphStore::export_to_yaml` does exactly that.
pub fn to_yaml(document: &ArazzoDocument) -> Result<String, ExportError> {
    Ok(serde_yaml::to_string(document)?)
}

/// Parses a YAML Arazzo document, for round-tripping exports back in.
pub fn from_yaml(text: &str) -> Result<ArazzoDocument, ExportError> {
    Ok(serde_yaml::from_str(text)?)
}
