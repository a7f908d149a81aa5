// ── Keepsake Engine: Image Store ───────────────────────────────────────────
// Caregiver photos arrive as base64 data URLs and land on disk under a
// UUID-derived filename. Serving goes through `load`, which only accepts
// plain filenames — no separators, no traversal.

use std::path::PathBuf;
use std::sync::LazyLock;

use base64::Engine;
use log::info;
use regex::Regex;

use crate::atoms::error::{KeepsakeError, KeepsakeResult};

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:(image/[a-zA-Z0-9.+-]+);base64,(.+)$").expect("data url pattern")
});

/// Split a `data:image/...;base64,...` URL into (mime, payload).
pub fn parse_data_url(data_url: &str) -> Option<(&str, &str)> {
    let caps = DATA_URL.captures(data_url)?;
    Some((
        caps.get(1).map(|m| m.as_str())?,
        caps.get(2).map(|m| m.as_str())?,
    ))
}

pub fn ext_from_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "bin",
    }
}

fn mime_from_ext(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Create the image directory if needed.
    pub fn open(dir: PathBuf) -> KeepsakeResult<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(ImageStore { dir })
    }

    /// Decode and persist a data-URL image; returns the serving path
    /// (`/images/<uuid>.<ext>`).
    pub fn save(&self, data_url: &str) -> KeepsakeResult<String> {
        let (mime, payload) = parse_data_url(data_url)
            .ok_or_else(|| KeepsakeError::Other("invalid image format".into()))?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| KeepsakeError::Other(format!("invalid image base64: {e}")))?;

        let filename = format!("{}.{}", uuid::Uuid::new_v4(), ext_from_mime(mime));
        std::fs::write(self.dir.join(&filename), bytes)?;
        info!("[images] stored {filename} ({mime})");
        Ok(format!("/images/{filename}"))
    }

    /// Read a stored image by filename. Rejects anything that isn't a plain
    /// `uuid.ext`-shaped name; returns None when the file doesn't exist.
    pub fn load(&self, name: &str) -> KeepsakeResult<Option<(&'static str, Vec<u8>)>> {
        let safe = !name.is_empty()
            && !name.contains("..")
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');
        if !safe {
            return Ok(None);
        }
        match std::fs::read(self.dir.join(name)) {
            Ok(bytes) => Ok(Some((mime_from_ext(name), bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
