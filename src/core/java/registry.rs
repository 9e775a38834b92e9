use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use super::arch::Architecture;
use super::runtime::{compare_versions, RuntimeDescriptor};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::version::GameManifest;

const RELEASE_FILE: &str = "release";

/// Java runtimes installed under a single directory, newest first.
#[derive(Debug, Clone)]
pub struct RuntimeRegistry {
    root: PathBuf,
    bundled: Vec<String>,
    runtimes: Vec<RuntimeDescriptor>,
}

impl RuntimeRegistry {
    /// Scan `root` for runtimes. Names listed in `bundled` are marked as
    /// provided by the launcher.
    pub async fn scan(root: impl Into<PathBuf>, bundled: Vec<String>) -> LauncherResult<Self> {
        let mut registry = Self {
            root: root.into(),
            bundled,
            runtimes: Vec::new(),
        };
        registry.rescan().await?;
        Ok(registry)
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn rescan(&mut self) -> LauncherResult<()> {
        self.runtimes.clear();

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Runtime directory {:?} does not exist", self.root);
                return Ok(());
            }
            Err(e) => return Err(LauncherError::io(&self.root, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LauncherError::io(&self.root, e))?
        {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let runtime = self.load_runtime(&name).await;
            debug!(
                "Found runtime {} (version={:?}, arch={:?})",
                runtime.name, runtime.version_string, runtime.arch
            );
            self.runtimes.push(runtime);
        }

        self.sort();
        info!("Registered {} Java runtimes", self.runtimes.len());
        Ok(())
    }

    /// Re-read a single runtime, adding it if it was not known yet.
    pub async fn reload(&mut self, name: &str) -> &RuntimeDescriptor {
        let runtime = self.load_runtime(name).await;
        self.runtimes.retain(|rt| rt.name != name);
        self.runtimes.push(runtime);
        self.sort();

        let idx = self
            .runtimes
            .iter()
            .position(|rt| rt.name == name)
            .unwrap_or_default();
        &self.runtimes[idx]
    }

    /// Delete a runtime's directory and forget it.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, name: &str) -> LauncherResult<bool> {
        let Some(pos) = self.runtimes.iter().position(|rt| rt.name == name) else {
            return Ok(false);
        };

        let home = self.runtime_home(name);
        if home.exists() {
            tokio::fs::remove_dir_all(&home)
                .await
                .map_err(|e| LauncherError::io(&home, e))?;
        }
        self.runtimes.remove(pos);
        info!("Removed runtime {}", name);
        Ok(true)
    }

    async fn load_runtime(&self, name: &str) -> RuntimeDescriptor {
        let release = self.runtime_home(name).join(RELEASE_FILE);
        let provided = self.bundled.iter().any(|b| b == name);

        match tokio::fs::read_to_string(&release).await {
            Ok(content) => RuntimeDescriptor::from_release_file(name, &content, provided),
            Err(e) => {
                debug!("No readable release file for {}: {}", name, e);
                RuntimeDescriptor {
                    is_provided_by_launcher: provided,
                    ..RuntimeDescriptor::unidentified(name)
                }
            }
        }
    }

    fn sort(&mut self) {
        self.runtimes
            .sort_by(|a, b| compare_versions(b.sort_key(), a.sort_key()));
    }

    // ── Queries ─────────────────────────────────────────

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runtime_home(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn runtimes(&self) -> &[RuntimeDescriptor] {
        &self.runtimes
    }

    pub fn get(&self, name: &str) -> Option<&RuntimeDescriptor> {
        self.runtimes.iter().find(|rt| rt.name == name)
    }

    /// Newest identified runtime with exactly this major version.
    pub fn exact(&self, major: u32) -> Option<&RuntimeDescriptor> {
        self.runtimes
            .iter()
            .find(|rt| rt.version_string.is_some() && rt.java_major_version == major)
    }

    /// Identified runtime with the smallest major version not below `major`.
    pub fn nearest(&self, major: u32) -> Option<&RuntimeDescriptor> {
        self.runtimes
            .iter()
            .filter(|rt| rt.version_string.is_some() && rt.java_major_version >= major)
            .min_by_key(|rt| rt.java_major_version)
    }

    /// Best runtime for `major` that can run on `device`: an exact major
    /// match if one exists, otherwise the nearest newer one.
    pub fn compatible_for(&self, major: u32, device: Architecture) -> Option<&RuntimeDescriptor> {
        let compatible = || {
            self.runtimes
                .iter()
                .filter(move |rt| rt.is_compatible_with(device))
        };

        compatible()
            .find(|rt| rt.java_major_version == major)
            .or_else(|| {
                compatible()
                    .filter(|rt| rt.java_major_version >= major)
                    .min_by_key(|rt| rt.java_major_version)
            })
    }

    pub fn select_for(
        &self,
        manifest: &GameManifest,
        device: Architecture,
    ) -> LauncherResult<&RuntimeDescriptor> {
        let major = manifest.required_java_major();
        self.compatible_for(major, device)
            .ok_or(LauncherError::RuntimeNotFound(major))
    }
}
