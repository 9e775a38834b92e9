pub mod manifest;
pub mod patches;
pub mod rules;
pub mod version_file;

pub use manifest::{
    parse_version_manifest_index, Latest, VersionEntry, VersionManifestIndex, VersionType,
};
pub use patches::patch_libraries;
pub use rules::{
    library_is_applicable, rules_allow, FeatureSet, Features, OsRule, Rule, RuleAction,
    RuleContext,
};
pub use version_file::{
    parse_game_manifest, Argument, ArgumentValue, Arguments, AssetIndexRef, DownloadArtifact,
    GameManifest, JavaVersion, Library, LibraryArtifact, LibraryDownloads, Logging,
    LoggingClient, LoggingFile, VersionDownloads,
};
