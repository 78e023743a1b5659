//! Persona store — owns the persona collection and its storage lifecycle.
//!
//! Every mutation writes the whole collection through the persistence port
//! first and only updates memory once the write succeeded, so the in-memory
//! list never diverges from what is stored.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::selection::SelectionSet;

use super::persistence::PersonaPersistence;
use super::types::Persona;

/// Ordered persona collection (oldest first) backed by a persistence port.
pub struct PersonaStore<P> {
    persistence: P,
    personas: Vec<Persona>,
    selected: Option<String>,
}

impl<P: PersonaPersistence> PersonaStore<P> {
    /// Load the collection and the selection marker once.
    pub fn open(persistence: P) -> Result<Self> {
        let personas = persistence.load()?;
        let mut selected = persistence.load_selected()?;

        if let Some(ref id) = selected {
            if !personas.iter().any(|p| &p.id == id) {
                warn!(persona_id = %id, "Selected persona no longer exists, ignoring");
                selected = None;
            }
        }

        debug!(count = personas.len(), selected = ?selected, "Persona store opened");
        Ok(Self {
            persistence,
            personas,
            selected,
        })
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    // ─────────────────────────────────────────────────────────────
    // List / Query
    // ─────────────────────────────────────────────────────────────

    /// All personas in insertion order.
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Persona> {
        self.get(id).ok_or_else(|| Error::persona_not_found(id))
    }

    /// Personas whose ids are in `ids`, in store order.
    ///
    /// Fails on the first selected id that is not in the store.
    pub fn resolve(&self, ids: &SelectionSet<String>) -> Result<Vec<Persona>> {
        if let Some(missing) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(Error::persona_not_found(missing.clone()));
        }
        Ok(ids
            .filter(&self.personas, |p| &p.id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Fresh time-based id (epoch milliseconds), unique within the store.
    pub fn next_id(&self) -> String {
        let mut candidate = Utc::now().timestamp_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    // ─────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────

    /// Append a persona and persist the full collection.
    pub fn add(&mut self, persona: Persona) -> Result<()> {
        if self.get(&persona.id).is_some() {
            return Err(Error::DuplicatePersona { id: persona.id });
        }

        let mut next = self.personas.clone();
        next.push(persona);
        self.persistence.save(&next)?;

        if let Some(added) = next.last() {
            info!(persona_id = %added.id, nickname = %added.nickname, "Persona added");
        }
        self.personas = next;
        Ok(())
    }

    /// Remove every persona whose id is in `ids`, returning how many were removed.
    pub fn remove_by_ids(&mut self, ids: &SelectionSet<String>) -> Result<usize> {
        let next: Vec<Persona> = self
            .personas
            .iter()
            .filter(|p| !ids.is_selected(&p.id))
            .cloned()
            .collect();
        let removed = self.personas.len() - next.len();

        self.persistence.save(&next)?;

        let selection_removed = self
            .selected
            .as_ref()
            .is_some_and(|id| ids.is_selected(id));
        self.personas = next;

        if selection_removed {
            // The collection is already consistent; a stale marker is
            // ignored on the next open.
            if let Err(e) = self.persistence.save_selected(None) {
                warn!(error = %e, "Failed to clear selection marker");
            }
            self.selected = None;
        }

        info!(removed, remaining = self.personas.len(), "Personas removed");
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────
    // Selected-persona handoff
    // ─────────────────────────────────────────────────────────────

    /// Mark `id` as the persona later commands act on.
    pub fn select(&mut self, id: &str) -> Result<&Persona> {
        self.require(id)?;
        self.persistence.save_selected(Some(id))?;
        self.selected = Some(id.to_string());
        info!(persona_id = %id, "Persona selected");
        self.require(id)
    }

    pub fn selected(&self) -> Option<&Persona> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        self.persistence.save_selected(None)?;
        self.selected = None;
        Ok(())
    }
}
