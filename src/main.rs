mod cli;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use cli::{Cli, SubCommands};
use launcher_meta::core::assets::parse_asset_index;
use launcher_meta::core::downloader::{DocumentCache, HttpFetcher};
use launcher_meta::core::java::{Architecture, RuntimeRegistry};
use launcher_meta::core::state::{default_data_dir, AppState};
use launcher_meta::core::version::{
    parse_game_manifest, parse_version_manifest_index, patch_libraries, RuleContext,
};
use launcher_meta::{init_tracing, LauncherError, LauncherResult};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> LauncherResult<()> {
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let state = AppState::load(&data_dir)?;

    match cli.subcommand {
        SubCommands::Index { file } => show_index(&file).await,
        SubCommands::Manifest {
            file,
            os,
            arch,
            os_version,
        } => {
            let mut ctx = RuleContext::current();
            if let Some(os) = os {
                ctx.os_name = os;
            }
            if let Some(arch) = arch {
                ctx.os_arch = arch;
            }
            if let Some(version) = os_version {
                ctx = ctx.with_os_version(version);
            }
            show_manifest(&file, &ctx).await
        }
        SubCommands::Assets { file } => show_assets(&file, &state).await,
        SubCommands::Runtimes { dir, major } => {
            let dir = dir.unwrap_or_else(|| state.runtimes_dir());
            show_runtimes(dir, major, &state).await
        }
        SubCommands::Fetch { version } => fetch(version, &state).await,
    }
}

async fn read(path: &Path) -> LauncherResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| LauncherError::io(path, e))
}

async fn show_index(file: &Path) -> LauncherResult<()> {
    let index = parse_version_manifest_index(&read(file).await?)?;

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for entry in &index.versions {
        *by_type.entry(entry.version_type.to_string()).or_default() += 1;
    }

    println!("latest release:  {}", index.latest_release().unwrap_or("-"));
    println!("latest snapshot: {}", index.latest_snapshot().unwrap_or("-"));
    println!("versions:        {}", index.versions.len());
    for (kind, count) in by_type {
        println!("  {kind:<10} {count}");
    }
    Ok(())
}

async fn show_manifest(file: &Path, ctx: &RuleContext) -> LauncherResult<()> {
    let mut manifest = parse_game_manifest(&read(file).await?)?;
    let patched = patch_libraries(&mut manifest.libraries);

    println!("id:          {}", manifest.id);
    if let Some(parent) = &manifest.inherits_from {
        println!("inherits:    {parent}");
    }
    println!("main class:  {}", manifest.main_class);
    println!("java:        {}", manifest.required_java_major());
    if let Some(assets) = &manifest.asset_index {
        println!("assets:      {} ({} bytes)", assets.id, assets.total_size);
    }

    let libraries = manifest.applicable_libraries(ctx);
    println!(
        "libraries:   {} of {} apply to {}/{} ({} patched)",
        libraries.len(),
        manifest.libraries.len(),
        ctx.os_name,
        ctx.os_arch,
        patched
    );
    for library in libraries {
        match library.artifact_path() {
            Ok(path) => println!("  {path}"),
            Err(e) => println!("  {} ({e})", library.name),
        }
    }
    Ok(())
}

async fn show_assets(file: &Path, state: &AppState) -> LauncherResult<()> {
    let index = parse_asset_index(&read(file).await?)?;
    let missing = index.missing_objects(
        &state.assets_dir(),
        &state.launcher_settings.resources_url,
    );

    println!("layout:  {:?}", index.layout());
    println!("objects: {}", index.objects.len());
    println!("size:    {} bytes", index.total_size());
    println!(
        "missing: {} ({} bytes)",
        missing.len(),
        missing
            .iter()
            .fold(0u64, |total, o| total.saturating_add(o.size))
    );
    Ok(())
}

async fn show_runtimes(dir: PathBuf, major: Option<u32>, state: &AppState) -> LauncherResult<()> {
    let registry =
        RuntimeRegistry::scan(dir, state.launcher_settings.bundled_runtimes.clone()).await?;
    let device = Architecture::device();

    println!("device: {device}");
    for rt in registry.runtimes() {
        println!(
            "  {:<20} {:<14} {:<8} {}{}",
            rt.name,
            rt.version_string.as_deref().unwrap_or("?"),
            rt.arch.as_deref().unwrap_or("?"),
            if rt.is_compatible_with(device) { "compatible" } else { "incompatible" },
            if rt.is_provided_by_launcher { " (bundled)" } else { "" },
        );
    }

    if let Some(major) = major {
        match registry.compatible_for(major, device) {
            Some(rt) => println!("java {major}: {}", rt.name),
            None => return Err(LauncherError::RuntimeNotFound(major)),
        }
    }
    Ok(())
}

async fn fetch(version: Option<String>, state: &AppState) -> LauncherResult<()> {
    let settings = &state.launcher_settings;
    let fetcher = HttpFetcher::new()?.with_retries(settings.fetch_retries);
    let cache = DocumentCache::new(fetcher, settings.manifest_max_age());

    let index = cache
        .load_version_manifest_index(&state.version_manifest_path(), &settings.version_manifest_url)
        .await?;

    let id = match version.as_deref().or(index.latest_release()) {
        Some(id) => id.to_string(),
        None => return Err(LauncherError::VersionNotFound("latest release".to_string())),
    };
    let entry = index
        .find_version(&id)
        .ok_or_else(|| LauncherError::VersionNotFound(id.clone()))?;

    let manifest_path = state.game_manifest_path(&id)?;
    let manifest = cache
        .load_game_manifest(&manifest_path, entry, settings.verify_integrity)
        .await?;
    info!("Stored {} at {:?}", manifest.id, manifest_path);

    if let Some(asset_ref) = &manifest.asset_index {
        let index_path = state.asset_index_path(&asset_ref.id)?;
        let assets = cache
            .load_asset_index(&index_path, asset_ref, settings.verify_integrity)
            .await?;
        let missing = assets.missing_objects(&state.assets_dir(), &settings.resources_url);
        println!(
            "{}: asset index {} ({} objects, {} missing)",
            manifest.id,
            asset_ref.id,
            assets.objects.len(),
            missing.len()
        );
    }
    Ok(())
}
