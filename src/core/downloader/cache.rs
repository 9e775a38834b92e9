use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument, warn};

use super::client::{sha1_hex, DocumentFetcher};
use crate::core::assets::{parse_asset_index, AssetIndex};
use crate::core::error::{LauncherError, LauncherResult, ParseError};
use crate::core::version::{
    parse_game_manifest, parse_version_manifest_index, AssetIndexRef, GameManifest, VersionEntry,
    VersionManifestIndex,
};

/// On-disk cache of Mojang documents, refreshed through a [`DocumentFetcher`].
pub struct DocumentCache<F> {
    fetcher: F,
    max_age: Duration,
}

impl<F: DocumentFetcher> DocumentCache<F> {
    pub fn new(fetcher: F, max_age: Duration) -> Self {
        Self { fetcher, max_age }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Return the document stored at `target`, fetching it from `url` when
    /// the cached copy is absent, stale, or fails verification.
    ///
    /// Documents with an `expected_sha1` never go stale; documents without
    /// one are refetched once older than the cache's maximum age.
    #[instrument(skip(self, target), fields(target = %target.display()))]
    pub async fn load(
        &self,
        target: &Path,
        url: &str,
        expected_sha1: Option<&str>,
        verify: bool,
    ) -> LauncherResult<Vec<u8>> {
        if let Some(bytes) = self.cached(target, expected_sha1, verify).await {
            debug!("Using cached {:?}", target);
            return Ok(bytes);
        }
        self.refresh(target, url, expected_sha1, verify).await
    }

    async fn cached(
        &self,
        target: &Path,
        expected_sha1: Option<&str>,
        verify: bool,
    ) -> Option<Vec<u8>> {
        let metadata = tokio::fs::metadata(target).await.ok()?;

        if expected_sha1.is_none() {
            let modified: DateTime<Utc> = metadata.modified().ok()?.into();
            if Utc::now() - modified > self.max_age {
                debug!("Cached {:?} is stale", target);
                return None;
            }
        }

        let bytes = tokio::fs::read(target).await.ok()?;
        if bytes.is_empty() {
            return None;
        }
        if verify {
            if let Some(expected) = expected_sha1 {
                if !sha1_hex(&bytes).eq_ignore_ascii_case(expected) {
                    warn!("Cached {:?} failed SHA-1 verification", target);
                    return None;
                }
            }
        }
        Some(bytes)
    }

    /// Fetch `url` unconditionally and replace whatever is stored at `target`.
    pub async fn refresh(
        &self,
        target: &Path,
        url: &str,
        expected_sha1: Option<&str>,
        verify: bool,
    ) -> LauncherResult<Vec<u8>> {
        info!("Fetching {}", url);
        let bytes = self.fetcher.fetch(url).await?;

        if bytes.is_empty() {
            return Err(LauncherError::EmptyDocument(url.to_string()));
        }
        if verify {
            if let Some(expected) = expected_sha1 {
                let actual = sha1_hex(&bytes);
                if !actual.eq_ignore_ascii_case(expected) {
                    return Err(LauncherError::Sha1Mismatch {
                        url: url.to_string(),
                        expected: expected.to_string(),
                        actual,
                    });
                }
            }
        }

        write_atomic(target, &bytes).await?;
        Ok(bytes)
    }

    async fn load_parsed<T>(
        &self,
        target: &Path,
        url: &str,
        expected_sha1: Option<&str>,
        verify: bool,
        parse: fn(&[u8]) -> Result<T, ParseError>,
    ) -> LauncherResult<T> {
        let bytes = self.load(target, url, expected_sha1, verify).await?;
        match parse(&bytes) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!("Cached {:?} is unreadable ({}), fetching again", target, e);
                let bytes = self.refresh(target, url, expected_sha1, verify).await?;
                Ok(parse(&bytes)?)
            }
        }
    }

    pub async fn load_version_manifest_index(
        &self,
        target: &Path,
        url: &str,
    ) -> LauncherResult<VersionManifestIndex> {
        self.load_parsed(target, url, None, false, parse_version_manifest_index)
            .await
    }

    pub async fn load_game_manifest(
        &self,
        target: &Path,
        entry: &VersionEntry,
        verify: bool,
    ) -> LauncherResult<GameManifest> {
        self.load_parsed(
            target,
            &entry.url,
            entry.expected_sha1(),
            verify,
            parse_game_manifest,
        )
        .await
    }

    pub async fn load_asset_index(
        &self,
        target: &Path,
        index: &AssetIndexRef,
        verify: bool,
    ) -> LauncherResult<AssetIndex> {
        let expected = Some(index.sha1.as_str()).filter(|s| !s.is_empty());
        self.load_parsed(target, &index.url, expected, verify, parse_asset_index)
            .await
    }
}

/// Write through a uniquely named sibling and rename it into place.
async fn write_atomic(target: &Path, bytes: &[u8]) -> LauncherResult<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = target.with_file_name(format!("{file_name}.{}.tmp", uuid::Uuid::new_v4()));

    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| LauncherError::io(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, target).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(LauncherError::io(target, e));
    }
    Ok(())
}
