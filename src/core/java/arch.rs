use serde::{Deserialize, Serialize};

/// CPU architectures a runtime can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    Arm,
    Arm64,
    X86,
    X86_64,
    Unknown,
}

impl Architecture {
    /// Map an architecture string (as found in a runtime's `release` file)
    /// onto the closed set. Anything unrecognized becomes `Unknown`.
    pub fn from_arch_str(arch: &str) -> Self {
        let arch = arch.trim().to_ascii_lowercase().replace(' ', "");

        if arch.contains("arm64") || arch == "aarch64" {
            Architecture::Arm64
        } else if arch.contains("arm") || arch == "aarch32" {
            Architecture::Arm
        } else if arch.contains("x86_64") || arch.contains("amd64") {
            Architecture::X86_64
        } else if arch.contains("x86") || is_ix86(&arch) {
            Architecture::X86
        } else {
            Architecture::Unknown
        }
    }

    /// Architecture of the device this binary runs on.
    pub fn device() -> Self {
        if cfg!(target_arch = "aarch64") {
            Architecture::Arm64
        } else if cfg!(target_arch = "arm") {
            Architecture::Arm
        } else if cfg!(target_arch = "x86_64") {
            Architecture::X86_64
        } else if cfg!(target_arch = "x86") {
            Architecture::X86
        } else {
            Architecture::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
            Architecture::X86 => "x86",
            Architecture::X86_64 => "x86_64",
            Architecture::Unknown => "unknown",
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Architecture::Arm64 | Architecture::X86_64)
    }
}

impl std::fmt::Display for Architecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// i386, i486, i586, i686
fn is_ix86(arch: &str) -> bool {
    arch.len() == 4 && arch.starts_with('i') && arch.ends_with("86")
}
