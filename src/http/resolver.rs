//! Maps request URIs onto files under the resource root.
//!
//! Resolution never leaves the root: `..` segments are refused outright and
//! the canonical target of anything found (symlinks included) must still lie
//! inside the canonical root. Refusals look exactly like missing files.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use url::Url;

use crate::http::error::HandlerError;

/// Longest file name the common filesystems accept.
const MAX_SEGMENT_LEN: usize = 255;

/// Outcome of looking a URI up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// A regular file is present at `path`.
    pub exists: bool,
    /// Where the file is, or would have been.
    pub path: PathBuf,
    /// File size in bytes when it exists.
    pub size: Option<u64>,
}

impl ResolvedResource {
    fn missing(path: PathBuf) -> Self {
        Self {
            exists: false,
            path,
            size: None,
        }
    }
}

/// Resolves `uri` against `root`.
///
/// "Not found" is a normal outcome (`exists == false`); only unexpected
/// filesystem failures such as permission errors are returned as
/// [`HandlerError::ResolutionError`]. The file is not opened here.
pub async fn resolve(uri: &str, root: &Path) -> Result<ResolvedResource, HandlerError> {
    let resource = resource_path(uri);

    let Some(relative) = confine(&resource) else {
        tracing::warn!(uri, "Rejected path outside resource root");
        return Ok(ResolvedResource::missing(root.to_path_buf()));
    };

    let path = root.join(relative);

    let metadata = match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Ok(ResolvedResource::missing(path)),
        Err(e) if is_missing(&e) => return Ok(ResolvedResource::missing(path)),
        Err(e) => return Err(HandlerError::ResolutionError(e)),
    };

    let canonical_root = fs::canonicalize(root)
        .await
        .map_err(HandlerError::ResolutionError)?;

    let canonical = match fs::canonicalize(&path).await {
        Ok(p) => p,
        Err(e) if is_missing(&e) => return Ok(ResolvedResource::missing(path)),
        Err(e) => return Err(HandlerError::ResolutionError(e)),
    };

    if !canonical.starts_with(&canonical_root) {
        tracing::warn!(uri, resolved = %canonical.display(), "Rejected link leading outside resource root");
        return Ok(ResolvedResource::missing(path));
    }

    Ok(ResolvedResource {
        exists: true,
        path: canonical,
        size: Some(metadata.len()),
    })
}

/// Reduces a request URI to its path component with exactly one leading `/`.
///
/// Absolute URIs (`http://host/path`) lose their scheme and authority;
/// anything else is kept as sent.
pub fn resource_path(uri: &str) -> String {
    let path = match Url::parse(uri) {
        Ok(url) if url.has_host() => url.path().to_string(),
        _ => uri.to_string(),
    };

    format!("/{}", path.trim_start_matches('/'))
}

/// Turns a URI path into a relative filesystem path, or `None` if any segment
/// could climb out of the root.
fn confine(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s if s.len() > MAX_SEGMENT_LEN => return None,
            s => relative.push(s),
        }
    }

    Some(relative)
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidFilename
    )
}
