use super::address::{address_key, route_key, Address, Coord};
use super::error::CacheError;
use super::route::RouteRecord;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

pub const GEOCODE_CACHE_FILE: &str = "geocode_cache.json";
pub const ROUTE_CACHE_FILE: &str = "route_cache.json";

/// Field whose absence marks a route entry written before biking data was recorded.
const BIKING_DISTANCE_FIELD: &str = "biking_distance";

/// Write-through disk cache for geocodes and resolved routes.
///
/// Both maps are loaded once on [`RouteCache::open`] and rewritten in full after
/// every mutation, so anything a call has stored is durable once it returns.
/// A single process is assumed to own the cache directory.
#[derive(Debug)]
pub struct RouteCache {
    geocode_path: PathBuf,
    route_path: PathBuf,
    geocodes: BTreeMap<String, Coord>,
    // Raw JSON so entries from older schemas still load and can be skipped.
    routes: BTreeMap<String, Value>,
}

impl RouteCache {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, CacheError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|source| CacheError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let geocode_path = dir.join(GEOCODE_CACHE_FILE);
        let route_path = dir.join(ROUTE_CACHE_FILE);
        let geocodes = load_map(&geocode_path)?;
        let routes = load_map(&route_path)?;
        log::debug!(
            "Loaded {} geocodes and {} routes from {}",
            geocodes.len(),
            routes.len(),
            dir.display()
        );

        Ok(Self {
            geocode_path,
            route_path,
            geocodes,
            routes,
        })
    }

    pub fn get_geocode(&self, address: &Address) -> Option<Coord> {
        self.geocodes.get(&address_key(address)).copied()
    }

    pub fn set_geocode(&mut self, address: &Address, coord: Coord) -> Result<(), CacheError> {
        self.geocodes.insert(address_key(address), coord);
        self.save()
    }

    /// Returns the cached record, or `None` when there is no entry or the entry
    /// predates biking data (forcing a fresh resolution).
    pub fn get_route(
        &self,
        origin: &Address,
        destination: &Address,
        departure: Option<&NaiveDateTime>,
    ) -> Option<RouteRecord> {
        let key = route_key(origin, destination, departure);
        let entry = self.routes.get(&key)?;

        if entry.get(BIKING_DISTANCE_FIELD).is_none() {
            log::debug!("[CACHE STALE] {} has no {}", key, BIKING_DISTANCE_FIELD);
            return None;
        }

        match serde_json::from_value(entry.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Ignoring unreadable cached route {}: {}", key, e);
                None
            }
        }
    }

    pub fn set_route(
        &mut self,
        origin: &Address,
        destination: &Address,
        departure: Option<&NaiveDateTime>,
        record: &RouteRecord,
    ) -> Result<(), CacheError> {
        let key = route_key(origin, destination, departure);
        let value = serde_json::to_value(record).map_err(|source| CacheError::Json {
            path: self.route_path.clone(),
            source,
        })?;
        self.routes.insert(key, value);
        self.save()
    }

    pub fn clear_route_cache(&mut self) -> Result<(), CacheError> {
        self.routes.clear();
        self.save()
    }

    pub fn geocode_count(&self) -> usize {
        self.geocodes.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    fn save(&self) -> Result<(), CacheError> {
        save_map(&self.geocode_path, &self.geocodes)?;
        save_map(&self.route_path, &self.routes)
    }
}

fn load_map<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, T>, CacheError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let data = fs::read_to_string(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| CacheError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes to a temporary file next to `path` and renames it into place, so a
/// killed process leaves either the old file or the new one, never a torn write.
fn save_map<T: Serialize>(path: &Path, map: &BTreeMap<String, T>) -> Result<(), CacheError> {
    let data = serde_json::to_string_pretty(map).map_err(|source| CacheError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let io_err = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(data.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
