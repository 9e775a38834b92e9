// ─── launcher-meta core ───
// Metadata layer of a Minecraft launcher: documents, rules and runtimes.
//
// Architecture:
//   core/
//     version/    Mojang manifest index + version JSON + OS rules + patches
//     maven/      Artifact coordinates and repository paths
//     assets/     Asset index + storage layout
//     java/       Runtime descriptors, architecture, installed registry
//     downloader/ Document fetcher and on-disk cache
//     state/      Data directory and launcher settings

pub mod assets;
pub mod downloader;
pub mod error;
pub mod http;
pub mod java;
pub mod json;
pub mod maven;
pub mod paths;
pub mod state;
pub mod version;
