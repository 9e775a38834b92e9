pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::assets::{parse_asset_index, AssetIndex};
pub use crate::core::error::{LauncherError, LauncherResult, ParseError};
pub use crate::core::java::{is_compatible, Architecture, RuntimeDescriptor, RuntimeRegistry};
pub use crate::core::version::{
    library_is_applicable, parse_game_manifest, parse_version_manifest_index, GameManifest,
    Library, Rule, RuleContext, VersionManifestIndex,
};

/// Install the global `tracing` subscriber, honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,launcher_meta=debug")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
