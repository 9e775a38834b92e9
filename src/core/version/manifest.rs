// ─── Version Manifest ───
// The Mojang version manifest index: latest pointers plus every known version.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::core::error::ParseError;
use crate::core::json;

/// Top-level Mojang version manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VersionManifestIndex {
    #[serde(default)]
    pub latest: Latest,
    #[serde(default)]
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Latest {
    #[serde(default)]
    pub release: String,
    #[serde(default)]
    pub snapshot: String,
}

/// Release channel of a version. Unrecognized channels keep their raw name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    #[default]
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
    #[serde(untagged)]
    Other(String),
}

impl VersionType {
    pub fn as_str(&self) -> &str {
        match self {
            VersionType::Release => "release",
            VersionType::Snapshot => "snapshot",
            VersionType::OldBeta => "old_beta",
            VersionType::OldAlpha => "old_alpha",
            VersionType::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for VersionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type", default)]
    pub version_type: VersionType,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub release_time: String,
    /// SHA-1 of the game manifest document behind `url`.
    #[serde(default)]
    pub sha1: String,
    /// Non-zero when the version needs the newer EULA/compliance prompt.
    #[serde(default)]
    pub compliance_level: u32,
}

impl VersionEntry {
    pub fn released_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.release_time).ok()
    }

    pub fn expected_sha1(&self) -> Option<&str> {
        Some(self.sha1.as_str()).filter(|s| !s.is_empty())
    }
}

impl VersionManifestIndex {
    pub fn latest_release(&self) -> Option<&str> {
        Some(self.latest.release.as_str()).filter(|s| !s.is_empty())
    }

    pub fn latest_snapshot(&self) -> Option<&str> {
        Some(self.latest.snapshot.as_str()).filter(|s| !s.is_empty())
    }

    /// Find a specific version entry by ID (e.g. "1.20.4").
    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }

    /// List every entry of one release channel, in manifest order.
    pub fn versions_of(&self, version_type: &VersionType) -> Vec<&VersionEntry> {
        self.versions
            .iter()
            .filter(|v| &v.version_type == version_type)
            .collect()
    }

    pub fn releases(&self) -> Vec<&VersionEntry> {
        self.versions_of(&VersionType::Release)
    }

    fn validate(&self) -> Result<(), ParseError> {
        let pointers = [
            ("release", self.latest_release()),
            ("snapshot", self.latest_snapshot()),
        ];
        for (kind, id) in pointers {
            if let Some(id) = id {
                if self.find_version(id).is_none() {
                    return Err(ParseError::DanglingLatest {
                        kind,
                        id: id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Parse a version manifest index document.
pub fn parse_version_manifest_index(bytes: &[u8]) -> Result<VersionManifestIndex, ParseError> {
    let manifest: VersionManifestIndex = json::from_slice(bytes)?;
    manifest.validate()?;
    Ok(manifest)
}
