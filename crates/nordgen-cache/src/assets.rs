//! Static asset store.
//!
//! Every file under the public directory is loaded once at startup along
//! with a brotli variant. The index template is held back: each snapshot
//! derives its own served index page from it (see [`AssetStore::render_index`]).

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::snapshot::etag;

/// Brotli quality used for every compressed variant.
const BROTLI_QUALITY: u32 = 11;

/// Brotli window size (log2).
const BROTLI_LGWIN: u32 = 22;

const BROTLI_BUFFER: usize = 4096;

/// Extension of precompressed sibling files.
const BROTLI_EXT: &str = "br";

const INDEX_MIME: &str = "text/html; charset=utf-8";

/// A servable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Raw bytes.
    pub content: Vec<u8>,
    /// Brotli-compressed bytes.
    pub brotli: Vec<u8>,
    /// MIME type.
    pub mime: &'static str,
    /// Validation token.
    pub etag: String,
}

impl Asset {
    /// Whether a client-supplied `If-None-Match` value still matches.
    #[must_use]
    pub fn is_fresh(&self, if_none_match: Option<&str>) -> bool {
        etag::matches(if_none_match, &self.etag)
    }

    /// The body to send for an `Accept-Encoding` value, with its content encoding.
    #[must_use]
    pub fn negotiate(&self, accept_encoding: Option<&str>) -> (&[u8], Option<&'static str>) {
        let accepts_br = accept_encoding.is_some_and(|v| {
            v.split(',')
                .any(|coding| coding.split(';').next().is_some_and(|c| c.trim() == "br"))
        });
        if accepts_br && !self.brotli.is_empty() {
            (&self.brotli, Some("br"))
        } else {
            (&self.content, None)
        }
    }
}

/// Static assets keyed by web path, plus the index template.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: HashMap<String, Arc<Asset>>,
    index_path: String,
    template: Option<Vec<u8>>,
}

impl AssetStore {
    /// An empty store that serves nothing.
    #[must_use]
    pub fn empty(index_path: impl Into<String>) -> Self {
        Self {
            index_path: index_path.into(),
            ..Self::default()
        }
    }

    /// Recursively load every file under `dir`.
    ///
    /// `.br` files are only used as the precompressed variant of their
    /// sibling. The file at `index_path` becomes the template. Unreadable
    /// files are skipped with a warning.
    pub fn load(dir: &Path, index_path: &str) -> crate::Result<Self> {
        if !dir.is_dir() {
            return Err(crate::CacheError::Asset(format!(
                "public directory {} not found",
                dir.display()
            )));
        }

        let mut store = Self::empty(index_path);

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == BROTLI_EXT) {
                continue;
            }
            let Some(web_path) = web_path(dir, path) else {
                continue;
            };

            let content = match std::fs::read(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable asset");
                    continue;
                }
            };

            if web_path == store.index_path {
                debug!(path = %web_path, bytes = content.len(), "loaded index template");
                store.template = Some(content);
                continue;
            }

            let brotli = match precompressed_sibling(path) {
                Some(bytes) => bytes,
                None => compress(&content)?,
            };

            let asset = Asset {
                etag: etag::asset_etag(content.len()),
                mime: mime_for(path),
                content,
                brotli,
            };
            debug!(path = %web_path, bytes = asset.content.len(), mime = asset.mime, "loaded asset");
            store.assets.insert(web_path, Arc::new(asset));
        }

        Ok(store)
    }

    /// A static asset by web path. The index is served from the snapshot, not here.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Arc<Asset>> {
        self.assets.get(path).cloned()
    }

    /// Whether `path` addresses the derived index page.
    #[must_use]
    pub fn is_index(&self, path: &str) -> bool {
        path == "/" || path == self.index_path
    }

    /// Whether an index template was loaded.
    #[must_use]
    pub const fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Number of static assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when no static asset is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Derive the served index page by embedding a listing payload into the template.
    pub fn render_index(&self, payload: &[u8], etag: &str) -> crate::Result<Option<Asset>> {
        let Some(template) = self.template.as_deref() else {
            return Ok(None);
        };
        let content = embed_payload(template, payload);
        let brotli = compress(&content)?;
        Ok(Some(Asset {
            content,
            brotli,
            mime: INDEX_MIME,
            etag: etag.to_string(),
        }))
    }
}

/// Insert the payload as a JSON data island before the first `</body>`.
fn embed_payload(template: &[u8], payload: &[u8]) -> Vec<u8> {
    const OPEN: &[u8] = br#"<script id="server-data" type="application/json">"#;
    const CLOSE: &[u8] = b"</script>";
    const BODY_END: &[u8] = b"</body>";

    let split = template
        .windows(BODY_END.len())
        .position(|w| w == BODY_END)
        .unwrap_or(template.len());

    let mut out = Vec::with_capacity(template.len() + OPEN.len() + payload.len() + CLOSE.len());
    out.extend_from_slice(&template[..split]);
    out.extend_from_slice(OPEN);
    out.extend_from_slice(payload);
    out.extend_from_slice(CLOSE);
    out.extend_from_slice(&template[split..]);
    out
}

fn web_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(format!("/{}", parts.join("/")))
}

fn precompressed_sibling(path: &Path) -> Option<Vec<u8>> {
    let mut sibling = path.as_os_str().to_owned();
    sibling.push(".");
    sibling.push(BROTLI_EXT);
    std::fs::read(Path::new(&sibling)).ok()
}

fn compress(content: &[u8]) -> crate::Result<Vec<u8>> {
    let mut writer = brotli::CompressorWriter::new(
        Vec::with_capacity(content.len() / 4),
        BROTLI_BUFFER,
        BROTLI_QUALITY,
        BROTLI_LGWIN,
    );
    writer.write_all(content)?;
    writer.flush()?;
    Ok(writer.into_inner())
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "webmanifest" => "application/manifest+json",
        _ => "application/octet-stream",
    }
}
