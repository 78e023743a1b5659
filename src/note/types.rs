//! Note data model.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Note Kind
// ─────────────────────────────────────────────────────────────────

/// The two note styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteKind {
    /// Big-text poster cover note (大字报).
    Poster,
    /// Image note with a cover picture (图文).
    Image,
}

impl NoteKind {
    pub fn slug(&self) -> &'static str {
        match self {
            NoteKind::Poster => "poster",
            NoteKind::Image => "image",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NoteKind::Poster => "大字报笔记",
            NoteKind::Image => "图文笔记",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for NoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "poster" => Ok(NoteKind::Poster),
            "image" => Ok(NoteKind::Image),
            _ => Err(format!("Unknown note kind '{}'. Valid: poster, image", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Note
// ─────────────────────────────────────────────────────────────────

/// A generated note. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique per generation event and persona.
    pub id: String,

    pub kind: NoteKind,

    pub title: String,

    pub body: String,

    pub cover_title: String,

    /// Cover picture; always present on image notes, never on poster notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Personas this note was generated for.
    pub persona_ids: BTreeSet<String>,

    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn is_for(&self, persona_id: &str) -> bool {
        self.persona_ids.contains(persona_id)
    }

    /// File name used when saving this note's image.
    pub fn image_filename(&self) -> String {
        format!("note-image-{}.jpg", self.id)
    }
}

// ─────────────────────────────────────────────────────────────────
// Generation Parameters
// ─────────────────────────────────────────────────────────────────

/// User-supplied parameters for one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    pub kind: NoteKind,

    /// Image search keyword; required (non-blank) for image notes.
    pub keyword: Option<String>,
}

impl GenerationParams {
    pub fn poster() -> Self {
        Self {
            kind: NoteKind::Poster,
            keyword: None,
        }
    }

    pub fn image(keyword: impl Into<String>) -> Self {
        Self {
            kind: NoteKind::Image,
            keyword: Some(keyword.into()),
        }
    }

    /// Keyword with surrounding whitespace removed, if non-blank.
    pub fn trimmed_keyword(&self) -> Option<&str> {
        self.keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
