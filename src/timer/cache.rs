//! Process-wide Timer schema cache
//!
//! A Timer definition is parsed at most once per source for the lifetime of the
//! process. Each source owns a slot guarded by its own mutex: the first caller
//! parses while holding the slot, concurrent callers for the same source block on
//! it and then share the same [`Arc<Schema>`]. Different sources never wait on
//! each other. Failed parses leave the slot empty so a later call can retry after
//! the definition file is fixed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use tracing::debug;

use super::BUILTIN_DEFINITION;
use super::definition::parse_definition;
use crate::types::Schema;
use crate::{Result, RmError};

/// Where a Timer definition comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SchemaSource {
    /// The `timer.h` shipped inside the crate
    #[default]
    Builtin,
    /// A definition file on disk
    File(PathBuf),
}

impl SchemaSource {
    /// Use `path` when given, the shipped definition otherwise.
    pub fn from_override(path: Option<PathBuf>) -> Self {
        path.map_or(SchemaSource::Builtin, SchemaSource::File)
    }

    fn load(&self) -> Result<Schema> {
        match self {
            SchemaSource::Builtin => Ok(parse_definition(BUILTIN_DEFINITION)?),
            SchemaSource::File(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| RmError::file_error(path.clone(), e))?;
                Ok(parse_definition(&text)?)
            }
        }
    }
}

type Slot = Arc<Mutex<Option<Arc<Schema>>>>;

/// Memoized schemas keyed by [`SchemaSource`].
#[derive(Debug, Default)]
pub struct SchemaCache {
    slots: Mutex<HashMap<SchemaSource, Slot>>,
    parses: AtomicUsize,
}

static GLOBAL: LazyLock<SchemaCache> = LazyLock::new(SchemaCache::new);

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static SchemaCache {
        &GLOBAL
    }

    /// Schema for `source`, parsing it on first use.
    pub fn get(&self, source: &SchemaSource) -> Result<Arc<Schema>> {
        let slot = {
            let mut slots = lock(&self.slots);
            Arc::clone(slots.entry(source.clone()).or_default())
        };

        let mut entry = lock(&slot);
        if let Some(schema) = entry.as_ref() {
            debug!(?source, "Using cached Timer schema");
            return Ok(Arc::clone(schema));
        }

        debug!(?source, "Parsing Timer definition");
        let schema = Arc::new(source.load()?);
        self.parses.fetch_add(1, Ordering::Relaxed);
        *entry = Some(Arc::clone(&schema));
        Ok(schema)
    }

    /// Schema for `source` if it has already been parsed.
    pub fn cached(&self, source: &SchemaSource) -> Option<Arc<Schema>> {
        let slot = lock(&self.slots).get(source).cloned()?;
        let entry = lock(&slot);
        entry.clone()
    }

    /// Number of successful parses performed by this cache.
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    /// Forget every cached schema; the next [`get`](Self::get) parses again.
    pub fn clear(&self) {
        lock(&self.slots).clear();
    }
}

// A panic while parsing leaves the slot empty, so the data stays consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaError;
    use crate::test_utils::write_temp_file;

    fn temp_definition(contents: &str) -> PathBuf {
        write_temp_file("cache-definition", contents.as_bytes())
    }

    #[test]
    fn builtin_is_parsed_once() {
        let cache = SchemaCache::new();
        let first = cache.get(&SchemaSource::Builtin).unwrap();
        let second = cache.get(&SchemaSource::Builtin).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.parse_count(), 1);
        assert_eq!(first.record_size(), 256);
    }

    #[test]
    fn concurrent_first_use_shares_one_schema() {
        let cache = SchemaCache::new();
        let schemas: Vec<Arc<Schema>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.get(&SchemaSource::Builtin).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(cache.parse_count(), 1);
        assert!(schemas.iter().all(|s| Arc::ptr_eq(s, &schemas[0])));
    }

    #[test]
    fn sources_are_cached_separately() {
        let path = temp_definition("int mjd;\ndouble fracmjd;\n");
        let cache = SchemaCache::new();

        let file_schema = cache.get(&SchemaSource::File(path.clone())).unwrap();
        let builtin = cache.get(&SchemaSource::Builtin).unwrap();
        assert_eq!(file_schema.record_size(), 12);
        assert_ne!(file_schema.record_size(), builtin.record_size());
        assert_eq!(cache.parse_count(), 2);
        assert!(cache.cached(&SchemaSource::File(path.clone())).is_some());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn failures_are_not_cached() {
        let path = temp_definition("short flags;\n");
        let cache = SchemaCache::new();
        let source = SchemaSource::File(path.clone());

        let err = cache.get(&source).unwrap_err();
        assert!(matches!(err, RmError::Schema(SchemaError::UnknownType { line: 1, .. })));
        assert!(cache.cached(&source).is_none());
        assert_eq!(cache.parse_count(), 0);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn same_length_definitions_stay_distinct() {
        let first = temp_definition("int a;\n");
        let second = temp_definition("int b;\n");
        assert_ne!(first, second);

        let cache = SchemaCache::new();
        let a = cache.get(&SchemaSource::File(first.clone())).unwrap();
        let b = cache.get(&SchemaSource::File(second.clone())).unwrap();
        assert!(a.field("a").is_some());
        assert!(b.field("b").is_some());

        std::fs::remove_file(first).ok();
        std::fs::remove_file(second).ok();
    }

    #[test]
    fn missing_file_reports_path() {
        let path = PathBuf::from("/nonexistent/simplerm/timer.h");
        let err = SchemaCache::new().get(&SchemaSource::File(path.clone())).unwrap_err();
        assert!(matches!(err, RmError::File { path: ref p, .. } if *p == path));
    }

    #[test]
    fn clear_forces_a_new_parse() {
        let cache = SchemaCache::new();
        let first = cache.get(&SchemaSource::Builtin).unwrap();
        cache.clear();
        assert!(cache.cached(&SchemaSource::Builtin).is_none());
        let second = cache.get(&SchemaSource::Builtin).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(cache.parse_count(), 2);
    }

    #[test]
    fn override_selects_source() {
        assert_eq!(SchemaSource::from_override(None), SchemaSource::Builtin);
        assert_eq!(
            SchemaSource::from_override(Some(PathBuf::from("t.h"))),
            SchemaSource::File(PathBuf::from("t.h"))
        );
    }
}
