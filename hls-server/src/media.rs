//! Media directory confinement for enqueue requests
//!
//! Requested paths are resolved against the configured media directory.
//! Relative paths are joined to it; absolute paths must already point inside
//! it. `..` components are refused outright and the final check runs on the
//! canonical path, so symlinks cannot lead out of the directory either.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaPathError {
    #[error("{} is outside the media directory", .0.display())]
    Forbidden(PathBuf),

    #[error("{} not found", .0.display())]
    NotFound(PathBuf),

    #[error("failed to resolve {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolve `requested` to a canonical file path inside `media_dir`
pub async fn resolve_media_path(
    media_dir: &Path,
    requested: &Path,
) -> Result<PathBuf, MediaPathError> {
    let forbidden = || MediaPathError::Forbidden(requested.to_path_buf());

    if requested
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(forbidden());
    }

    let root = tokio::fs::canonicalize(media_dir)
        .await
        .map_err(|source| MediaPathError::Io {
            path: media_dir.to_path_buf(),
            source,
        })?;

    let joined = if requested.is_absolute() {
        if !requested.starts_with(media_dir) && !requested.starts_with(&root) {
            return Err(forbidden());
        }
        requested.to_path_buf()
    } else {
        root.join(requested)
    };

    let resolved = match tokio::fs::canonicalize(&joined).await {
        Ok(path) => path,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(MediaPathError::NotFound(requested.to_path_buf()))
        }
        Err(source) => return Err(MediaPathError::Io { path: joined, source }),
    };

    if !resolved.starts_with(&root) {
        return Err(forbidden());
    }
    if !tokio::fs::metadata(&resolved).await.is_ok_and(|m| m.is_file()) {
        return Err(MediaPathError::NotFound(requested.to_path_buf()));
    }
    Ok(resolved)
}
