//! Presenting notes: text rendering, clipboard copy and image download.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::persona::Persona;

use super::association::persona_label;
use super::types::Note;

/// Text placed on the clipboard for a note.
pub fn clipboard_text(note: &Note) -> String {
    format!("{}\n\n{}", note.title, note.body)
}

/// Plain-text card for terminal output.
pub fn render_note(note: &Note, personas: &[Persona]) -> String {
    let mut out = String::new();
    out.push_str(&format!("[{}] {}\n", note.kind.display_name(), note.id));
    out.push_str(&format!("人设: {}\n", persona_label(note, personas)));
    out.push_str(&format!("封面: {}\n", note.cover_title));
    if let Some(url) = &note.image_url {
        out.push_str(&format!("图片: {}\n", url));
    }
    out.push('\n');
    out.push_str(&note.title);
    out.push_str("\n\n");
    out.push_str(&note.body);
    out.push('\n');
    out
}

// ─────────────────────────────────────────────────────────────────
// Clipboard
// ─────────────────────────────────────────────────────────────────

/// Destination for copied text.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> std::io::Result<()>;
}

/// Writes OSC 52 escape sequences, which most terminals turn into a
/// clipboard write.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl Osc52Clipboard<std::io::Stderr> {
    /// Clipboard writing to stderr, leaving stdout for command output.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> ClipboardSink for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()
    }
}

fn osc52_sequence(text: &str) -> String {
    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

/// In-memory sink, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> std::io::Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Copy a note's title and body to the clipboard.
pub fn copy_to_clipboard(note: &Note, sink: &mut dyn ClipboardSink) -> Result<()> {
    sink.set_text(&clipboard_text(note))
        .map_err(|e| Error::ClipboardFailed {
            message: e.to_string(),
        })?;
    debug!(note = %note.id, "Note copied to clipboard");
    Ok(())
}

/// Copy several notes as one clipboard entry, separated by a blank line.
pub fn copy_all_to_clipboard(notes: &[Note], sink: &mut dyn ClipboardSink) -> Result<()> {
    if let [note] = notes {
        return copy_to_clipboard(note, sink);
    }
    let text = notes
        .iter()
        .map(clipboard_text)
        .collect::<Vec<_>>()
        .join("\n\n");
    sink.set_text(&text).map_err(|e| Error::ClipboardFailed {
        message: e.to_string(),
    })?;
    debug!(notes = notes.len(), "Notes copied to clipboard");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Image Download
// ─────────────────────────────────────────────────────────────────

/// Saves note images into a directory.
pub struct ImageDownloader {
    client: reqwest::Client,
    output_dir: PathBuf,
    max_bytes: u64,
}

/// Default cap on a downloaded image body
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

impl ImageDownloader {
    pub fn new(output_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            output_dir: output_dir.into(),
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        })
    }

    /// Reject bodies larger than `max_bytes`
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetch `url` and write it to `filename` inside the output directory.
    ///
    /// A single attempt is made; any failure is reported as
    /// [`Error::DownloadFailed`].
    pub async fn download(&self, url: &str, filename: &str) -> Result<PathBuf> {
        let parsed = Url::parse(url).map_err(|e| Error::download_failed(url, format!("Invalid URL: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::download_failed(
                url,
                format!("Unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        validate_filename(filename).map_err(|reason| Error::download_failed(url, reason))?;

        let dest = self.output_dir.join(filename);
        info!(url = %url, dest = %dest.display(), "Downloading image");

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| Error::download_failed(url, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::download_failed(
                url,
                format!("HTTP error: {}", response.status()),
            ));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(Error::download_failed(
                    url,
                    format!("Image is {} bytes, limit is {}", len, self.max_bytes),
                ));
            }
        }

        // Content-Length may be absent or wrong
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::download_failed(url, format!("Failed to read response body: {}", e)))?
        {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(Error::download_failed(
                    url,
                    format!("Image exceeds the {} byte limit", self.max_bytes),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Error::IoWrite {
                path: self.output_dir.clone(),
                source: e,
            })?;
        tokio::fs::write(&dest, &bytes)
            .await
            .map_err(|e| Error::IoWrite {
                path: dest.clone(),
                source: e,
            })?;

        info!(dest = %dest.display(), bytes = bytes.len(), "Image saved");
        Ok(dest)
    }

    /// Download a note's image under its default file name.
    pub async fn download_note_image(&self, note: &Note) -> Result<PathBuf> {
        let url = note
            .image_url
            .as_deref()
            .ok_or_else(|| Error::download_failed("", format!("Note {} has no image", note.id)))?;
        self.download(url, &note.image_filename()).await
    }
}

fn validate_filename(filename: &str) -> std::result::Result<(), String> {
    if filename.is_empty() || filename == "." || filename == ".." {
        return Err(format!("Invalid file name '{}'", filename));
    }
    if filename.contains(['/', '\\']) {
        return Err(format!("File name '{}' must not contain path separators", filename));
    }
    Ok(())
}
