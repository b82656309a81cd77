//! Embedded static assets: stylesheet, scripts, icon and the service worker.

use axum::{
    body::Body,
    extract::Path,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, include_dir};
use mime_guess::{Mime, MimeGuess};

use crate::application::error::ErrorReport;

static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

const SERVICE_WORKER: &str = "sw.js";
const FAVICON: &str = "favicon.svg";

/// Serve files under `/static/`.
pub async fn serve_static(path: Option<Path<String>>) -> Response {
    let captured = path.map(|Path(value)| value);
    respond(
        resolve_asset(captured),
        CachePolicy::Immutable,
        "infra::assets::serve_static",
    )
}

/// The service worker lives at the site root so its scope covers every page.
pub async fn serve_service_worker() -> Response {
    respond(
        resolve_asset(Some(SERVICE_WORKER.to_string())),
        CachePolicy::Revalidate,
        "infra::assets::serve_service_worker",
    )
}

pub async fn serve_favicon() -> Response {
    respond(
        resolve_asset(Some(FAVICON.to_string())),
        CachePolicy::Immutable,
        "infra::assets::serve_favicon",
    )
}

#[derive(Clone, Copy)]
enum CachePolicy {
    Immutable,
    Revalidate,
}

impl CachePolicy {
    fn header(self) -> HeaderValue {
        match self {
            CachePolicy::Immutable => HeaderValue::from_static("public, max-age=86400"),
            CachePolicy::Revalidate => HeaderValue::from_static("no-cache"),
        }
    }
}

fn respond(asset: Option<Asset>, policy: CachePolicy, source: &'static str) -> Response {
    match asset {
        Some(asset) => asset.into_response_with(policy),
        None => not_found_response(source),
    }
}

fn not_found_response(source: &'static str) -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    ErrorReport::from_message(source, StatusCode::NOT_FOUND, "Static asset not found")
        .attach(&mut response);
    response
}

struct Asset {
    contents: &'static [u8],
    mime: MimeGuess,
}

fn resolve_asset(path: Option<String>) -> Option<Asset> {
    let candidate = path.unwrap_or_default();
    let candidate = candidate.trim_start_matches('/');

    if candidate.is_empty() || candidate.ends_with('/') || candidate.contains("..") {
        return None;
    }

    let file = STATIC_ASSETS.get_file(candidate)?;
    Some(Asset {
        contents: file.contents(),
        mime: mime_guess::from_path(candidate),
    })
}

impl Asset {
    fn into_response_with(self, policy: CachePolicy) -> Response {
        let mime = self.mime.first_or_octet_stream();
        build_response(Bytes::from_static(self.contents), mime, policy)
    }
}

fn build_response(bytes: Bytes, mime: Mime, policy: CachePolicy) -> Response {
    let len = bytes.len();
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
        headers.insert(header::CONTENT_LENGTH, value);
    }
    headers.insert(header::CACHE_CONTROL, policy.header());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_embedded_files() {
        let asset = resolve_asset(Some("app.js".to_string())).expect("app.js is embedded");
        assert!(
            asset
                .mime
                .first_or_octet_stream()
                .essence_str()
                .ends_with("javascript")
        );
        assert!(!asset.contents.is_empty());
    }

    #[test]
    fn response_carries_embedded_bytes_and_length() {
        let asset = resolve_asset(Some("favicon.svg".to_string())).expect("favicon is embedded");
        let expected = asset.contents.len().to_string();

        let response = asset.into_response_with(CachePolicy::Immutable);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).map(HeaderValue::as_bytes),
            Some(expected.as_bytes())
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(HeaderValue::as_bytes),
            Some(b"image/svg+xml".as_slice())
        );
    }

    #[test]
    fn rejects_traversal_and_directories() {
        assert!(resolve_asset(Some("../Cargo.toml".to_string())).is_none());
        assert!(resolve_asset(Some("nested/".to_string())).is_none());
        assert!(resolve_asset(None).is_none());
    }
}
