// ─── Library Patches ───
// Some library versions shipped in vanilla manifests do not run on the
// launcher's platforms. They are swapped for known-good releases.

use tracing::debug;

use super::version_file::{Library, LibraryArtifact, LibraryDownloads};
use crate::core::maven::{MavenArtifact, MAVEN_CENTRAL};

struct Replacement {
    name: &'static str,
    sha1: &'static str,
}

const JNA_5_13: Replacement = Replacement {
    name: "net.java.dev.jna:jna:5.13.0",
    sha1: "1200e7ebeedbe0d10062093f32925a912020e747",
};

const OSHI_6_3: Replacement = Replacement {
    name: "com.github.oshi:oshi-core:6.3.0",
    sha1: "9e98cf55be371cafdb9c70c35d04ec2a8c2b42ac",
};

const ASM_ALL_5_0_4: Replacement = Replacement {
    name: "org.ow2.asm:asm-all:5.0.4",
    sha1: "e6244859997b3d4237a552669279780876228909",
};

/// Replace known-broken library versions in place.
/// Returns how many libraries were changed.
pub fn patch_libraries(libraries: &mut [Library]) -> usize {
    libraries
        .iter_mut()
        .map(patch_library)
        .filter(|changed| *changed)
        .count()
}

fn patch_library(library: &mut Library) -> bool {
    let Ok(coord) = MavenArtifact::parse(&library.name) else {
        return false;
    };
    let (major, minor) = version_pair(&coord.version);

    let replacement = match (coord.group_id.as_str(), coord.artifact_id.as_str()) {
        ("net.java.dev.jna", "jna") if (major, minor) < (5, 13) => &JNA_5_13,
        ("com.github.oshi", "oshi-core") if major == 6 && minor == 2 => &OSHI_6_3,
        ("org.ow2.asm", "asm-all") if major < 5 => &ASM_ALL_5_0_4,
        _ => return false,
    };

    apply(library, replacement);
    true
}

fn apply(library: &mut Library, replacement: &Replacement) {
    let Ok(coord) = MavenArtifact::parse(replacement.name) else {
        return;
    };
    debug!(
        "Library {} has been changed to {}",
        library.name, replacement.name
    );

    library.name = replacement.name.to_string();
    library.url = None;
    library.sha1 = None;
    library.size = None;

    let downloads = library.downloads.get_or_insert_with(LibraryDownloads::default);
    downloads.artifact = Some(LibraryArtifact {
        path: coord.local_path(),
        sha1: replacement.sha1.to_string(),
        size: 0,
        url: coord.url(MAVEN_CENTRAL),
    });
}

fn version_pair(version: &str) -> (u32, u32) {
    let mut parts = version.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    (major, minor)
}
