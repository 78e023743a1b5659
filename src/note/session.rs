//! Session-local note list and the generation workflow around it.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::persona::Persona;

use super::association::{group_by_persona, NoteGroups};
use super::generator::NoteGenerator;
use super::types::{GenerationParams, Note, NoteKind};

/// Owns the notes generated during one session.
///
/// Notes are only ever appended. A failed or rejected request leaves the
/// list exactly as it was.
pub struct NoteSession<G> {
    generator: G,
    notes: Vec<Note>,
    last_base_id: i64,
}

impl<G: NoteGenerator> NoteSession<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            notes: Vec::new(),
            last_base_id: 0,
        }
    }

    /// Generate one note per persona and append them.
    ///
    /// Returns the newly appended notes. After a successful image request the
    /// keyword in `params` is cleared.
    pub async fn generate(&mut self, personas: &[Persona], params: &mut GenerationParams) -> Result<&[Note]> {
        if personas.is_empty() {
            return Err(Error::NoPersonaSelected);
        }
        if params.kind == NoteKind::Image && params.trimmed_keyword().is_none() {
            return Err(Error::BlankKeyword);
        }

        let base_id = self.next_base_id();
        let generated = self
            .generator
            .generate(personas, &*params, &base_id)
            .await
            .map_err(|e| {
                warn!(error = %e, kind = %params.kind, "Note generation failed");
                match e {
                    Error::GenerationFailed { .. } => e,
                    other => Error::generation_failed(other.to_string()),
                }
            })?;

        if generated.len() != personas.len() {
            warn!(
                expected = personas.len(),
                actual = generated.len(),
                "Generator returned the wrong number of notes"
            );
            return Err(Error::generation_failed(format!(
                "expected {} notes, got {}",
                personas.len(),
                generated.len()
            )));
        }

        let start = self.notes.len();
        self.notes.extend(generated);
        if params.kind == NoteKind::Image {
            params.keyword = None;
        }

        info!(
            kind = %params.kind,
            base_id = %base_id,
            count = personas.len(),
            total = self.notes.len(),
            "Notes generated"
        );
        Ok(&self.notes[start..])
    }

    /// All notes in generation order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes_for_persona(&self, persona_id: &str) -> Vec<&Note> {
        self.notes.iter().filter(|n| n.is_for(persona_id)).collect()
    }

    pub fn group_by_persona<'a>(&'a self, personas: &'a [Persona]) -> NoteGroups<'a> {
        group_by_persona(&self.notes, personas)
    }

    /// Time-based base id, strictly increasing within the session.
    fn next_base_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last_base_id = now.max(self.last_base_id + 1);
        self.last_base_id.to_string()
    }
}
