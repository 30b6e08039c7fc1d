//! Delivery of exported images
//!
//! Sharing goes through a native share sink when one is available and falls
//! back to a plain download when sharing is unsupported or fails. The URL
//! helpers only read ring metadata and never touch session state.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::ExportArtifact;
use crate::domain::RingAsset;
use crate::error::{Result, TryOnError};
use crate::session::state::RingAssignment;

/// Why a share attempt did not go through
#[derive(thiserror::Error, Debug)]
pub enum ShareError {
    #[error("sharing is not supported here")]
    Unsupported,
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// Native share mechanism
pub trait ShareSink {
    fn share(&self, artifact: &ExportArtifact, caption: &str) -> Result<(), ShareError>;
}

/// Plain download of the artifact
pub trait DownloadSink {
    /// Store the artifact and return where it ended up
    fn download(&self, artifact: &ExportArtifact) -> anyhow::Result<PathBuf>;
}

/// How an artifact was delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Shared,
    Downloaded(PathBuf),
}

/// Share if possible, otherwise download
pub fn deliver(
    artifact: &ExportArtifact,
    caption: &str,
    share: Option<&dyn ShareSink>,
    download: &dyn DownloadSink,
) -> Result<Delivery> {
    if let Some(sink) = share {
        match sink.share(artifact, caption) {
            Ok(()) => {
                log::info!("Shared {}", artifact.filename);
                return Ok(Delivery::Shared);
            }
            Err(e) => log::warn!("Share failed, falling back to download: {}", e),
        }
    }
    download
        .download(artifact)
        .map(Delivery::Downloaded)
        .map_err(|e| TryOnError::ExportCapture(format!("{e:#}")))
}

/// Writes artifacts into a folder without overwriting existing files
#[derive(Debug, Clone)]
pub struct FileDownload {
    dir: PathBuf,
}

impl FileDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn free_path(&self, filename: &str) -> PathBuf {
        let candidate = self.dir.join(filename);
        if !candidate.exists() {
            return candidate;
        }
        let path = Path::new(filename);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("ring");
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
        (1..)
            .map(|n| self.dir.join(format!("{stem}-{n}.{ext}")))
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

impl DownloadSink for FileDownload {
    fn download(&self, artifact: &ExportArtifact) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.free_path(&artifact.filename);

        let mut file = tempfile::Builder::new()
            .prefix(".ringfit-")
            .suffix(".png")
            .tempfile_in(&self.dir)?;
        file.write_all(&artifact.png)?;
        file.persist(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        log::info!("Saved try-on image to {}", path.display());
        Ok(path)
    }
}

/// Caption text mentioning the ring being worn
pub fn share_caption(caption: &str, assignment: Option<&RingAssignment>) -> String {
    match assignment {
        Some(a) if caption.is_empty() => a.display_tag(),
        Some(a) => format!("{caption}: {}", a.display_tag()),
        None => caption.to_string(),
    }
}

/// Social compose URL with the caption (and optional link) prefilled
pub fn compose_post_url(base: &str, text: &str, link: Option<&str>) -> String {
    let mut url = format!("{}?text={}", base, percent_encode(text));
    if let Some(link) = link {
        url.push_str("&url=");
        url.push_str(&percent_encode(link));
    }
    url
}

/// Storefront page for a ring
pub fn storefront_url(base: &str, ring: &RingAsset) -> String {
    format!("{}/{}", base.trim_end_matches('/'), percent_encode(&ring.id))
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
