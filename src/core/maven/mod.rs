mod artifact;

pub use artifact::MavenArtifact;

/// Default repository for libraries that carry no explicit URL.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net";
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
