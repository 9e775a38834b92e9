use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tracing::warn;

use crate::core::error::ParseError;
use crate::core::json;
use crate::core::paths::is_contained;

/// Host serving content-addressed asset objects.
pub const RESOURCES_URL: &str = "https://resources.download.minecraft.net";

/// Top-level asset index JSON structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetIndex {
    /// Pre-1.6 layout: objects are copied into `<game dir>/resources`.
    #[serde(default)]
    pub map_to_resources: bool,
    /// Objects are materialized under `assets/virtual/<assets id>`.
    #[serde(rename = "virtual", default)]
    pub is_virtual: bool,
    #[serde(default)]
    pub objects: BTreeMap<String, AssetObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetObject {
    pub hash: String,
    #[serde(default)]
    pub size: u64,
}

/// Where the game expects to find the objects of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetLayout {
    ContentAddressed,
    Virtual,
    Resources,
}

/// A content-addressed object that still has to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingObject {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: String,
    pub size: u64,
}

impl AssetObject {
    /// First two characters of the hash, the bucket directory name.
    pub fn hash_prefix(&self) -> &str {
        self.hash.get(..2).unwrap_or(&self.hash)
    }

    /// `objects/<hash[0:2]>/<hash>`, relative to the assets directory.
    pub fn storage_path(&self) -> String {
        format!("objects/{}/{}", self.hash_prefix(), self.hash)
    }

    pub fn download_url(&self, base: &str) -> String {
        format!(
            "{}/{}/{}",
            base.trim_end_matches('/'),
            self.hash_prefix(),
            self.hash
        )
    }
}

impl AssetIndex {
    pub fn layout(&self) -> AssetLayout {
        if self.map_to_resources {
            AssetLayout::Resources
        } else if self.is_virtual {
            AssetLayout::Virtual
        } else {
            AssetLayout::ContentAddressed
        }
    }

    /// Sum of every object size, saturating at `u64::MAX`.
    pub fn total_size(&self) -> u64 {
        self.objects
            .values()
            .fold(0u64, |total, o| total.saturating_add(o.size))
    }

    /// Copy targets for legacy layouts, as `(stored object, expected location)`.
    ///
    /// Empty for content-addressed indexes, which are read in place. Names
    /// that would land outside the target directory are skipped.
    pub fn materialization_targets(
        &self,
        assets_dir: &Path,
        game_dir: &Path,
        assets_id: &str,
    ) -> Vec<(PathBuf, PathBuf)> {
        let root = match self.layout() {
            AssetLayout::ContentAddressed => return vec![],
            AssetLayout::Virtual => assets_dir.join("virtual").join(assets_id),
            AssetLayout::Resources => game_dir.join("resources"),
        };

        self.objects
            .iter()
            .filter(|(name, _)| {
                let contained = is_contained(name);
                if !contained {
                    warn!("Skipping asset with unsafe name {:?}", name);
                }
                contained
            })
            .map(|(name, obj)| (assets_dir.join(obj.storage_path()), root.join(name)))
            .collect()
    }

    /// Objects not yet present under `assets_dir`.
    pub fn missing_objects(&self, assets_dir: &Path, base_url: &str) -> Vec<PendingObject> {
        self.objects
            .values()
            .filter_map(|obj| {
                let dest = assets_dir.join(obj.storage_path());
                if dest.exists() {
                    return None;
                }
                Some(PendingObject {
                    url: obj.download_url(base_url),
                    dest,
                    sha1: obj.hash.clone(),
                    size: obj.size,
                })
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ParseError> {
        for (name, obj) in &self.objects {
            if !is_contained(name) {
                return Err(ParseError::InvalidField {
                    field: format!("objects.{name}"),
                    reason: "object name must be a relative path without `..`".to_string(),
                });
            }
            if obj.hash.len() < 2 || !obj.hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ParseError::InvalidField {
                    field: format!("objects.{name}.hash"),
                    reason: format!("`{}` is not a hex digest", obj.hash),
                });
            }
        }
        Ok(())
    }
}

/// Parse an asset index document.
pub fn parse_asset_index(bytes: &[u8]) -> Result<AssetIndex, ParseError> {
    let index: AssetIndex = json::from_slice(bytes)?;
    index.validate()?;
    Ok(index)
}
