use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::arch::Architecture;

const JAVA_VERSION_KEY: &str = "JAVA_VERSION=\"";
const OS_ARCH_KEY: &str = "OS_ARCH=\"";

/// An installed Java runtime, as discovered in the runtimes directory.
///
/// Two descriptors with the same `name` are the same runtime, whatever
/// their other fields say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeDescriptor {
    pub name: String,
    /// `None` until the runtime has been identified from its release file.
    pub version_string: Option<String>,
    pub arch: Option<String>,
    pub java_major_version: u32,
    pub is_provided_by_launcher: bool,
}

impl PartialEq for RuntimeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for RuntimeDescriptor {}

impl Hash for RuntimeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl RuntimeDescriptor {
    /// A runtime directory whose `release` file is missing or unreadable.
    pub fn unidentified(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_string: None,
            arch: None,
            java_major_version: 0,
            is_provided_by_launcher: false,
        }
    }

    /// Build a descriptor from the contents of a runtime's `release` file.
    /// Falls back to [`RuntimeDescriptor::unidentified`] when either key is absent.
    pub fn from_release_file(name: &str, content: &str, is_provided_by_launcher: bool) -> Self {
        let version = extract_quoted(content, JAVA_VERSION_KEY);
        let arch = extract_quoted(content, OS_ARCH_KEY);

        match (version, arch) {
            (Some(version), Some(arch)) => Self {
                name: name.to_string(),
                java_major_version: parse_major_version(version),
                version_string: Some(version.to_string()),
                arch: Some(arch.to_string()),
                is_provided_by_launcher,
            },
            _ => Self::unidentified(name),
        }
    }

    pub fn architecture(&self) -> Architecture {
        self.arch
            .as_deref()
            .map_or(Architecture::Unknown, Architecture::from_arch_str)
    }

    pub fn is_compatible_with(&self, device_arch: Architecture) -> bool {
        is_compatible(self, device_arch)
    }

    /// Key used to order runtimes: version string, or the name when unidentified.
    pub fn sort_key(&self) -> &str {
        self.version_string.as_deref().unwrap_or(&self.name)
    }
}

/// A runtime is usable iff it has been identified and was built for the device's
/// architecture. Unknown architectures never match.
pub fn is_compatible(runtime: &RuntimeDescriptor, device_arch: Architecture) -> bool {
    if runtime.version_string.is_none() {
        return false;
    }
    let arch = runtime.architecture();
    arch != Architecture::Unknown && arch == device_arch
}

/// `17.0.8` -> 17, `1.8.0_392` -> 8.
pub fn parse_major_version(version: &str) -> u32 {
    let mut parts = version.split('.');
    let first = parts.next().unwrap_or("0");

    if first == "1" {
        parts.next().and_then(|s| s.parse().ok()).unwrap_or(0)
    } else {
        first.parse().unwrap_or(0)
    }
}

/// Compare dotted version strings numerically; non-numeric parts count as 0.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let l: Vec<u32> = left.split('.').map(|p| p.parse().unwrap_or(0)).collect();
    let r: Vec<u32> = right.split('.').map(|p| p.parse().unwrap_or(0)).collect();

    for i in 0..l.len().max(r.len()) {
        let a = l.get(i).copied().unwrap_or(0);
        let b = r.get(i).copied().unwrap_or(0);
        match a.cmp(&b) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn extract_quoted<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    let start = content.find(key)? + key.len();
    let len = content[start..].find('"')?;
    Some(&content[start..start + len])
}
