//! Lookup of operations across every loaded source.

use ahash::{AHashMap, AHashSet};

use crate::error::OperationIdError;
use crate::openapi::{Operation, ParsedSource};

/// All operations parsed out of the registered sources, with a memoized
/// operationId lookup on top.
///
/// Sources keep their registration order, and within a source the operations
/// keep document order; when two sources declare the same operationId, the
/// earliest one wins. Any change to the set of sources clears the memo and
/// bumps [`refresh_tick`](Self::refresh_tick) so watchers can refresh.
#[derive(Debug, Default)]
pub struct OperationIndex {
    sources: Vec<ParsedSource>,
    cache: AHashMap<String, Operation>,
    loading: AHashSet<String>,
    load_errors: AHashMap<String, String>,
    refresh_tick: u64,
    scan_count: u64,
}

impl OperationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an operationId, scanning all sources on the first miss and
    /// serving repeat lookups from the memo. Unknown ids are rescanned every
    /// time, since a source load may have introduced them meanwhile.
    pub fn find_operation(&mut self, operation_id: &str) -> Option<&Operation> {
        if !self.cache.contains_key(operation_id) {
            self.scan_count += 1;
            let found = self
                .sources
                .iter()
                .flat_map(|source| source.operations.iter())
                .find(|op| op.operation_id == operation_id)
                .cloned();
            match found {
                Some(op) => {
                    self.cache.insert(operation_id.to_string(), op);
                }
                None => return None,
            }
        }
        self.cache.get(operation_id)
    }

    /// Checks that an operationId is present and resolvable.
    pub fn validate_operation_id(&mut self, operation_id: &str) -> Result<(), OperationIdError> {
        if operation_id.is_empty() {
            return Err(OperationIdError::Required);
        }
        if self.find_operation(operation_id).is_none() {
            return Err(OperationIdError::NotFound(operation_id.to_string()));
        }
        Ok(())
    }

    /// Operations whose id, path, summary or description contains the query,
    /// case-insensitively. An empty query matches everything.
    pub fn matching_operations(&self, query: &str) -> Vec<&Operation> {
        let needle = query.to_lowercase();
        self.all_operations()
            .filter(|op| {
                needle.is_empty()
                    || op.operation_id.to_lowercase().contains(&needle)
                    || op.path.to_lowercase().contains(&needle)
                    || op
                        .summary
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                    || op
                        .description
                        .as_deref()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
            .collect()
    }

    // --- load lifecycle ---------------------------------------------------

    /// Marks a source as loading and clears any stale error for it.
    pub fn begin_load(&mut self, name: &str) {
        self.loading.insert(name.to_string());
        self.load_errors.remove(name);
    }

    /// Records a finished load and makes its operations available.
    pub fn finish_load(&mut self, parsed: ParsedSource) {
        self.loading.remove(&parsed.source_name);
        self.insert_source(parsed);
    }

    /// Records a failed load. The error is kept per source name until the
    /// next load attempt for the same source.
    pub fn fail_load(&mut self, name: &str, message: String) {
        self.loading.remove(name);
        self.load_errors.insert(name.to_string(), message);
    }

    /// Adds a parsed source, replacing any previous parse of the same name.
    pub fn insert_source(&mut self, parsed: ParsedSource) {
        self.load_errors.remove(&parsed.source_name);
        match self
            .sources
            .iter_mut()
            .find(|source| source.source_name == parsed.source_name)
        {
            Some(existing) => *existing = parsed,
            None => self.sources.push(parsed),
        }
        self.invalidate();
    }

    pub fn remove_source(&mut self, name: &str) {
        let before = self.sources.len();
        self.sources.retain(|source| source.source_name != name);
        self.loading.remove(name);
        self.load_errors.remove(name);
        if self.sources.len() != before {
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.cache.clear();
        self.refresh_tick += 1;
    }

    // --- read access ------------------------------------------------------

    pub fn sources(&self) -> &[ParsedSource] {
        &self.sources
    }

    pub fn all_operations(&self) -> impl Iterator<Item = &Operation> {
        self.sources.iter().flat_map(|source| source.operations.iter())
    }

    /// True once at least one source contributed an operation. Validation
    /// uses this to skip resolution checks while nothing has loaded yet.
    pub fn has_operations(&self) -> bool {
        self.sources.iter().any(|source| !source.operations.is_empty())
    }

    pub fn operation_count(&self) -> usize {
        self.sources.iter().map(|source| source.operations.len()).sum()
    }

    pub fn is_loading(&self, name: &str) -> bool {
        self.loading.contains(name)
    }

    pub fn has_pending_loads(&self) -> bool {
        !self.loading.is_empty()
    }

    pub fn load_error(&self, name: &str) -> Option<&str> {
        self.load_errors.get(name).map(String::as_str)
    }

    /// Bumped whenever the set of available operations changes.
    pub fn refresh_tick(&self) -> u64 {
        self.refresh_tick
    }

    /// How many full scans the memo has absorbed; diagnostics only.
    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }
}
