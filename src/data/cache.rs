use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::error::DataError;
use super::filter::{self, FilterSpec};
use super::model::Table;

/// Identity of an uploaded file: name, size and a hash of the content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub name: String,
    pub len: usize,
    digest: u64,
}

impl FileKey {
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        FileKey {
            name: name.to_string(),
            len: bytes.len(),
            digest: hasher.finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsed-table cache
// ---------------------------------------------------------------------------

/// Holds the table parsed from the most recent upload.
///
/// Re-rendering with the same file is a lookup; a different file replaces the
/// entry. Failed parses are not cached.
#[derive(Debug, Default)]
pub struct LoadCache {
    entry: Option<(FileKey, Arc<Table>)>,
}

impl LoadCache {
    pub fn get_or_load<F>(&mut self, key: &FileKey, load: F) -> Result<Arc<Table>, DataError>
    where
        F: FnOnce() -> Result<Table, DataError>,
    {
        if let Some((cached, table)) = &self.entry {
            if cached == key {
                log::debug!("load cache hit for '{}'", key.name);
                return Ok(Arc::clone(table));
            }
        }
        log::debug!("load cache miss for '{}'", key.name);
        self.entry = None;
        let table = Arc::new(load()?);
        self.entry = Some((key.clone(), Arc::clone(&table)));
        Ok(table)
    }

    pub fn current_key(&self) -> Option<&FileKey> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

// ---------------------------------------------------------------------------
// Filter-result cache
// ---------------------------------------------------------------------------

/// Memoises [`filter::apply`] results for one source table.
///
/// Keyed by the source's [`FileKey`] plus the [`FilterSpec`]; asking with a
/// different source drops every entry. Oldest entries are evicted past `capacity`.
#[derive(Debug)]
pub struct FilterCache {
    source: Option<FileKey>,
    entries: HashMap<FilterSpec, Arc<Table>>,
    order: VecDeque<FilterSpec>,
    capacity: usize,
}

impl Default for FilterCache {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl FilterCache {
    pub fn with_capacity(capacity: usize) -> Self {
        FilterCache {
            source: None,
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get_or_apply(
        &mut self,
        source: &FileKey,
        raw: &Table,
        spec: &FilterSpec,
    ) -> Result<Arc<Table>, DataError> {
        if self.source.as_ref() != Some(source) {
            self.clear();
            self.source = Some(source.clone());
        }
        if let Some(table) = self.entries.get(spec) {
            log::debug!("filter cache hit");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(filter::apply(raw, spec)?);
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(spec.clone());
        self.entries.insert(spec.clone(), Arc::clone(&table));
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.entries.clear();
        self.order.clear();
    }
}
