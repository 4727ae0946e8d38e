use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::format::model::{FormatKey, FormatSpec, SafeZone, ZoneRect};
use crate::foundation::error::{SafezoneError, SafezoneResult};

/// One row of the format catalog, as stored by the hosting backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatRecord {
    pub platform: String,
    pub format_name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference_link: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub safe_zone: Option<SafeZone>,
    #[serde(default)]
    pub danger_zones: Option<Vec<ZoneRect>>,
}

fn default_active() -> bool {
    true
}

impl FormatRecord {
    pub fn key(&self) -> FormatKey {
        FormatKey::new(&self.platform, &self.format_name)
    }

    pub fn spec(&self) -> FormatSpec {
        FormatSpec {
            width: self.width,
            height: self.height,
            safe_zone: self.safe_zone,
            danger_zones: self.danger_zones.clone(),
        }
    }
}

/// Source of format definitions.
///
/// Implementations return the active rows; the snapshot still filters on `active` so a
/// permissive source cannot leak disabled formats.
pub trait FormatCatalog {
    fn list_active_formats(&self) -> SafezoneResult<Vec<FormatRecord>>;
}

/// Catalog held in memory, e.g. built by a host adapter from a backend response.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<FormatRecord>,
}

impl StaticCatalog {
    pub fn new(records: Vec<FormatRecord>) -> Self {
        Self { records }
    }
}

impl FormatCatalog for StaticCatalog {
    fn list_active_formats(&self) -> SafezoneResult<Vec<FormatRecord>> {
        Ok(self.records.iter().filter(|r| r.active).cloned().collect())
    }
}

/// Catalog read from a JSON array of [`FormatRecord`] rows on disk.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FormatCatalog for JsonFileCatalog {
    fn list_active_formats(&self) -> SafezoneResult<Vec<FormatRecord>> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read format catalog '{}'", self.path.display()))?;
        let records: Vec<FormatRecord> = serde_json::from_slice(&bytes).map_err(|e| {
            SafezoneError::catalog(format!(
                "parse format catalog '{}': {e}",
                self.path.display()
            ))
        })?;
        Ok(records.into_iter().filter(|r| r.active).collect())
    }
}

/// A catalog entry together with its display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub key: FormatKey,
    pub spec: FormatSpec,
    pub description: Option<String>,
    pub reference_link: Option<String>,
}

/// Read-only snapshot of the active formats, loaded once per view activation.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    entries: Vec<CatalogEntry>,
    index: HashMap<FormatKey, usize>,
}

impl CatalogSnapshot {
    /// Load and index the catalog.
    ///
    /// Rows are ordered by `sort_order` (ties keep source order). A row repeating an earlier
    /// key replaces that entry's spec in place. Rows with invalid geometry are skipped.
    #[tracing::instrument(skip(catalog))]
    pub fn load(catalog: &dyn FormatCatalog) -> SafezoneResult<Self> {
        let records = catalog.list_active_formats()?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(mut records: Vec<FormatRecord>) -> Self {
        records.retain(|r| r.active);
        records.sort_by_key(|r| r.sort_order);

        let mut snapshot = Self::default();
        for record in records {
            let spec = record.spec();
            if let Err(e) = spec.validate() {
                tracing::warn!(
                    platform = %record.platform,
                    format = %record.format_name,
                    "skipping catalog row: {e}"
                );
                continue;
            }

            let entry = CatalogEntry {
                key: record.key(),
                spec,
                description: record.description,
                reference_link: record.reference_link,
            };
            match snapshot.index.get(&entry.key) {
                Some(&i) => snapshot.entries[i] = entry,
                None => {
                    snapshot.index.insert(entry.key.clone(), snapshot.entries.len());
                    snapshot.entries.push(entry);
                }
            }
        }
        tracing::debug!(formats = snapshot.entries.len(), "catalog snapshot loaded");
        snapshot
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, platform: &str, format: &str) -> Option<&CatalogEntry> {
        let key = FormatKey::new(platform, format);
        self.index.get(&key).map(|&i| &self.entries[i])
    }

    pub fn get(&self, platform: &str, format: &str) -> Option<&FormatSpec> {
        self.entry(platform, format).map(|e| &e.spec)
    }

    pub fn get_key(&self, key: &FormatKey) -> Option<&FormatSpec> {
        self.index.get(key).map(|&i| &self.entries[i].spec)
    }

    /// Platforms in first-seen order.
    pub fn platforms(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for e in &self.entries {
            if !out.contains(&e.key.platform.as_str()) {
                out.push(&e.key.platform);
            }
        }
        out
    }

    pub fn formats(&self, platform: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.key.platform == platform)
            .map(|e| e.key.format.as_str())
            .collect()
    }

    pub fn first_format(&self, platform: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key.platform == platform)
            .map(|e| e.key.format.as_str())
    }

    /// Whether a safe-zone test makes sense for this format.
    pub fn has_mask_geometry(&self, platform: &str, format: &str) -> bool {
        self.get(platform, format)
            .is_some_and(FormatSpec::has_mask_geometry)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/catalog.rs"]
mod tests;
