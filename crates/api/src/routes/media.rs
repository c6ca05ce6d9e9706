//! Serves photos written by the local media backend.

use axum::{
    body::Body,
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::app::AppState;

/// Stored objects never change; a new upload gets a new name.
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// GET {media.public_path}/*path
pub async fn serve_media(State(state): State<AppState>, UrlPath(path): UrlPath<String>) -> Response {
    let base_dir = PathBuf::from(&state.config.media.upload_dir);
    let file_path = base_dir.join(path.trim_start_matches('/'));

    if !is_safe_path(&base_dir, &file_path) {
        warn!(
            requested_path = %file_path.display(),
            base_dir = %base_dir.display(),
            "Path traversal attempt detected"
        );
        return StatusCode::FORBIDDEN.into_response();
    }

    match fs::read(&file_path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.to_string()),
                    (header::CACHE_CONTROL, CACHE_CONTROL.to_string()),
                ],
                Body::from(content),
            )
                .into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Check that `path` stays inside `base`.
fn is_safe_path(base: &Path, path: &Path) -> bool {
    if path.exists() {
        match (base.canonicalize(), path.canonicalize()) {
            (Ok(canonical_base), Ok(canonical_path)) => canonical_path.starts_with(canonical_base),
            _ => false,
        }
    } else {
        normalize_path(path).starts_with(normalize_path(base))
    }
}

/// Resolve `.` and `..` lexically.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            component => result.push(component),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("uploads/./a/../b.jpg")),
            PathBuf::from("uploads/b.jpg")
        );
    }

    #[test]
    fn test_is_safe_path() {
        let base = Path::new("/srv/uploads");
        assert!(is_safe_path(base, Path::new("/srv/uploads/owner/photo.jpg")));
        assert!(!is_safe_path(base, Path::new("/srv/uploads/../secrets.txt")));
        assert!(!is_safe_path(base, Path::new("/srv/uploads/a/../../etc/passwd")));
    }
}
