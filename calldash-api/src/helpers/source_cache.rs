use crate::config::DataConfig;
use loaders::SourceLoader;
use shared_types::{CallRecord, MergedRecord, OrderRecord, SourceError, Table};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

struct CachedTable<R> {
    modified: SystemTime,
    table: Arc<Table<R>>,
}

/// Tables keyed by path; an entry is valid while the file's mtime is unchanged.
pub struct TableCache<R> {
    entries: RwLock<HashMap<PathBuf, CachedTable<R>>>,
}

impl<R> Default for TableCache<R> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<R> TableCache<R> {
    pub fn get_or_load<F>(&self, path: &Path, load: F) -> Result<Arc<Table<R>>, SourceError>
    where
        F: FnOnce(&Path) -> Result<Table<R>, SourceError>,
    {
        let modified = modified_at(path)?;

        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = entries.get(path) {
                if cached.modified == modified {
                    tracing::debug!("Source cache hit for {}", path.display());
                    return Ok(cached.table.clone());
                }
            }
        }

        let table = Arc::new(load(path)?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            path.to_path_buf(),
            CachedTable {
                modified,
                table: table.clone(),
            },
        );

        Ok(table)
    }
}

fn modified_at(path: &Path) -> Result<SystemTime, SourceError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })
}

/// The three dashboard sources, read through per-table caches.
///
/// With caching disabled every call goes back to disk.
pub struct SourceCache {
    loader: SourceLoader,
    data: DataConfig,
    merged: TableCache<MergedRecord>,
    calls: TableCache<CallRecord>,
    orders: TableCache<OrderRecord>,
}

impl SourceCache {
    pub fn new(data: DataConfig, delimiter: u8) -> Self {
        Self {
            loader: SourceLoader::with_delimiter(delimiter),
            data,
            merged: TableCache::default(),
            calls: TableCache::default(),
            orders: TableCache::default(),
        }
    }

    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }

    pub fn data(&self) -> &DataConfig {
        &self.data
    }

    pub fn merged(&self) -> Result<Arc<Table<MergedRecord>>, SourceError> {
        let path = &self.data.merged_path;
        if !self.data.cache_sources {
            return self.loader.load_merged(path).map(Arc::new);
        }
        self.merged.get_or_load(path, |p| self.loader.load_merged(p))
    }

    pub fn calls(&self) -> Result<Arc<Table<CallRecord>>, SourceError> {
        let path = &self.data.calls_path;
        if !self.data.cache_sources {
            return self.loader.load_calls(path).map(Arc::new);
        }
        self.calls.get_or_load(path, |p| self.loader.load_calls(p))
    }

    pub fn orders(&self) -> Result<Arc<Table<OrderRecord>>, SourceError> {
        let path = &self.data.orders_path;
        if !self.data.cache_sources {
            return self.loader.load_orders(path).map(Arc::new);
        }
        self.orders.get_or_load(path, |p| self.loader.load_orders(p))
    }
}
