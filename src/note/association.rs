//! Lookups that tie notes back to the personas they were generated for.

use crate::persona::Persona;

use super::types::Note;

/// One persona and the notes generated for it.
#[derive(Debug)]
pub struct PersonaNotes<'a> {
    pub persona: &'a Persona,
    pub notes: Vec<&'a Note>,
}

/// Notes grouped by persona, in persona order.
#[derive(Debug)]
pub struct NoteGroups<'a> {
    /// Personas with at least one note.
    pub groups: Vec<PersonaNotes<'a>>,

    /// Notes none of whose persona ids match a known persona.
    pub orphans: Vec<&'a Note>,
}

/// Group `notes` under the personas they reference.
///
/// A note that references several personas appears under each of them.
pub fn group_by_persona<'a>(notes: &'a [Note], personas: &'a [Persona]) -> NoteGroups<'a> {
    let groups = personas
        .iter()
        .map(|persona| PersonaNotes {
            persona,
            notes: notes.iter().filter(|n| n.is_for(&persona.id)).collect(),
        })
        .filter(|group| !group.notes.is_empty())
        .collect();

    let orphans = notes
        .iter()
        .filter(|n| !personas.iter().any(|p| n.is_for(&p.id)))
        .collect();

    NoteGroups { groups, orphans }
}

/// Nicknames of a note's personas joined with "、"; unknown ids are shown raw.
pub fn persona_label(note: &Note, personas: &[Persona]) -> String {
    note.persona_ids
        .iter()
        .map(|id| {
            personas
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.nickname.as_str())
                .unwrap_or(id.as_str())
        })
        .collect::<Vec<_>>()
        .join("、")
}
