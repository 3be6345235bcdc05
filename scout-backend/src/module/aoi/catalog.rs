//! AOI catalog - the read-only registry of named areas of interest
//!
//! Loaded once at startup from a JSON file (or the built-in copy) and shared
//! by handle afterwards. Every entry is validated up front so the resolver and
//! planner can trust bboxes and aliases without re-checking them.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use scout_common::{AoiCatalogEntry, Bbox};

use super::resolver::normalize_hint;
use crate::error::ConfigurationError;

const BUILTIN_CATALOG: &str = include_str!("../../../data/aoi_catalog.json");

/// Versioned catalog file; a bare top-level list of entries is also accepted
#[derive(Debug, Deserialize)]
struct VersionedFile {
    version: u32,
    entries: Vec<RawEntry>,
}

/// Entry before validation; the bbox is kept loose to report arity errors
#[derive(Debug, Deserialize)]
struct RawEntry {
    id: String,
    #[serde(default)]
    aliases: Vec<String>,
    bbox: Option<Vec<f64>>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    default_cloud_cover: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct AoiCatalog {
    version: Option<u32>,
    entries: Vec<AoiCatalogEntry>,
    /// Normalized id/alias -> entry index
    alias_index: HashMap<String, usize>,
}

impl AoiCatalog {
    /// Catalog shipped inside the binary
    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        tracing::info!("Loading AOI catalog from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        // choose the shape from the first token so serde reports the field at fault
        let (version, raw_entries) = if json.trim_start().starts_with('[') {
            (None, serde_json::from_str::<Vec<RawEntry>>(json)?)
        } else {
            let file: VersionedFile = serde_json::from_str(json)?;
            (Some(file.version), file.entries)
        };

        let entries = raw_entries
            .into_iter()
            .enumerate()
            .map(|(index, raw)| validate_entry(index, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_entries(version, entries)
    }

    /// Build from already-typed entries, applying the cross-entry checks.
    pub fn from_entries(
        version: Option<u32>,
        entries: Vec<AoiCatalogEntry>,
    ) -> Result<Self, ConfigurationError> {
        let mut alias_index: HashMap<String, usize> = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            if let Some(reason) = entry.bbox.violation() {
                return Err(invalid(index, &entry.id, reason));
            }
            if entries[..index].iter().any(|e| e.id == entry.id) {
                return Err(ConfigurationError::DuplicateId(entry.id.clone()));
            }

            for name in std::iter::once(&entry.id).chain(entry.aliases.iter()) {
                let key = normalize_hint(name);
                if key.is_empty() {
                    return Err(invalid(index, &entry.id, format!("empty alias {:?}", name)));
                }
                match alias_index.get(&key) {
                    Some(&owner) if owner != index => {
                        return Err(ConfigurationError::OverlappingAlias {
                            alias: name.clone(),
                            first: entries[owner].id.clone(),
                            second: entry.id.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        alias_index.insert(key, index);
                    }
                }
            }
        }

        tracing::info!(
            "Loaded {} AOIs ({} names), catalog version {}",
            entries.len(),
            alias_index.len(),
            version.map_or_else(|| "unversioned".to_string(), |v| v.to_string())
        );

        Ok(Self {
            version,
            entries,
            alias_index,
        })
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Entries in file order
    pub fn entries(&self) -> &[AoiCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AoiCatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entry owning an already-normalized name
    pub(crate) fn lookup_normalized(&self, key: &str) -> Option<&AoiCatalogEntry> {
        self.alias_index.get(key).map(|&i| &self.entries[i])
    }

    /// Render the catalog as a bullet list, one AOI per line:
    /// `- hokkaido_east: [143.0, 42.5, 146.0, 45.5] (note; default cloud_cover_max 10.0)`
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let mut extras = Vec::new();
                if let Some(note) = entry.note.as_deref().filter(|n| !n.is_empty()) {
                    extras.push(note.to_string());
                }
                if let Some(cloud) = entry.default_cloud_cover {
                    extras.push(format!("default cloud_cover_max {:?}", cloud));
                }

                let suffix = if extras.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", extras.join("; "))
                };
                format!("- {}: {}{}", entry.id, entry.bbox, suffix)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn validate_entry(index: usize, raw: RawEntry) -> Result<AoiCatalogEntry, ConfigurationError> {
    if raw.id.trim().is_empty() {
        return Err(invalid(index, &raw.id, "id must not be empty"));
    }

    let bbox = match raw.bbox.as_deref() {
        None => return Err(invalid(index, &raw.id, "missing bbox")),
        Some(&[min_lon, min_lat, max_lon, max_lat]) => {
            Bbox::new(min_lon, min_lat, max_lon, max_lat)
        }
        Some(other) => {
            return Err(invalid(
                index,
                &raw.id,
                format!("bbox must have 4 numbers, got {}", other.len()),
            ));
        }
    };

    if let Some(cloud) = raw.default_cloud_cover {
        if !(0.0..=100.0).contains(&cloud) {
            return Err(invalid(
                index,
                &raw.id,
                format!("default_cloud_cover {} is outside [0, 100]", cloud),
            ));
        }
    }

    Ok(AoiCatalogEntry {
        id: raw.id,
        aliases: raw.aliases,
        bbox,
        note: raw.note,
        default_cloud_cover: raw.default_cloud_cover,
    })
}

fn invalid(index: usize, id: &str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidEntry {
        index,
        id: id.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_ids() {
        let catalog = AoiCatalog::builtin().unwrap();
        let ids: Vec<&str> = catalog.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "japan",
                "usa_mainland",
                "united_kingdom",
                "france",
                "germany",
                "tokyo_area",
                "osaka_area",
                "sapporo_area",
                "nagoya_area",
                "fukuoka_area",
                "hokkaido_east",
                "japan_cloud_free_focused",
            ]
        );
        assert_eq!(catalog.version(), Some(1));
    }

    #[test]
    fn test_plain_list_accepted() {
        let catalog = AoiCatalog::from_json_str(
            r#"[{"id": "a", "aliases": ["Alpha"], "bbox": [0.0, 0.0, 1.0, 1.0]}]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.version(), None);
        assert!(catalog.get("a").is_some());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = AoiCatalog::from_json_str(
            r#"[
                {"id": "a", "bbox": [0.0, 0.0, 1.0, 1.0]},
                {"id": "a", "bbox": [2.0, 2.0, 3.0, 3.0]}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_overlapping_alias_rejected() {
        let err = AoiCatalog::from_json_str(
            r#"[
                {"id": "a", "aliases": ["Twin City"], "bbox": [0.0, 0.0, 1.0, 1.0]},
                {"id": "b", "aliases": ["twin-city"], "bbox": [2.0, 2.0, 3.0, 3.0]}
            ]"#,
        )
        .unwrap_err();
        match err {
            ConfigurationError::OverlappingAlias { first, second, .. } => {
                assert_eq!(first, "a");
                assert_eq!(second, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_alias_repeating_own_id_is_fine() {
        let catalog = AoiCatalog::from_json_str(
            r#"[{"id": "tokyo_area", "aliases": ["Tokyo area"], "bbox": [138.8, 34.8, 140.0, 36.2]}]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_malformed_entries_rejected() {
        let missing = AoiCatalog::from_json_str(r#"[{"id": "a"}]"#).unwrap_err();
        assert!(matches!(missing, ConfigurationError::InvalidEntry { ref reason, .. } if reason == "missing bbox"));

        let arity = AoiCatalog::from_json_str(r#"[{"id": "a", "bbox": [0.0, 0.0, 1.0]}]"#)
            .unwrap_err();
        assert!(matches!(arity, ConfigurationError::InvalidEntry { index: 0, .. }));

        let order = AoiCatalog::from_json_str(r#"[{"id": "a", "bbox": [1.0, 0.0, 0.0, 1.0]}]"#)
            .unwrap_err();
        assert!(matches!(order, ConfigurationError::InvalidEntry { .. }));

        let range = AoiCatalog::from_json_str(r#"[{"id": "a", "bbox": [0.0, 0.0, 181.0, 1.0]}]"#)
            .unwrap_err();
        assert!(matches!(range, ConfigurationError::InvalidEntry { .. }));

        let cloud = AoiCatalog::from_json_str(
            r#"[{"id": "a", "bbox": [0.0, 0.0, 1.0, 1.0], "default_cloud_cover": 120.0}]"#,
        )
        .unwrap_err();
        assert!(matches!(cloud, ConfigurationError::InvalidEntry { .. }));

        let syntax = AoiCatalog::from_json_str("{not json").unwrap_err();
        assert!(matches!(syntax, ConfigurationError::CatalogFormat(_)));
    }

    #[test]
    fn test_format_error_names_the_bad_field() {
        let versioned = AoiCatalog::from_json_str(
            r#"{"version": 2, "entries": [{"id": "a", "bbox": [0.0, "north", 1.0, 1.0]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(versioned, ConfigurationError::CatalogFormat(_)));
        let message = versioned.to_string();
        assert!(message.contains("invalid type"), "{message}");
        assert!(!message.contains("did not match any variant"), "{message}");

        let plain = AoiCatalog::from_json_str(r#"[{"aliases": ["x"], "bbox": [0.0, 0.0, 1.0, 1.0]}]"#)
            .unwrap_err();
        assert!(plain.to_string().contains("missing field `id`"), "{plain}");

        let no_version = AoiCatalog::from_json_str(r#"{"entries": []}"#).unwrap_err();
        assert!(no_version.to_string().contains("missing field `version`"), "{no_version}");
    }

    #[test]
    fn test_describe_lists_notes_and_defaults() {
        let catalog = AoiCatalog::builtin().unwrap();
        let text = catalog.describe();
        assert_eq!(text.lines().count(), catalog.len());
        assert!(text.contains("- germany: [5.9, 47.3, 15.0, 55.1]\n"));
        assert!(text.contains("- japan_cloud_free_focused: [129.0, 31.0, 142.0, 41.5] ("));
        assert!(text.contains("default cloud_cover_max 10.0)"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aois.json");
        std::fs::write(&path, r#"[{"id": "x", "bbox": [10.0, 10.0, 11.0, 11.0]}]"#).unwrap();

        let catalog = AoiCatalog::load_from_file(&path).unwrap();
        assert_eq!(catalog.entries()[0].id, "x");

        let err = AoiCatalog::load_from_file(dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, ConfigurationError::Io { .. }));
    }
}
