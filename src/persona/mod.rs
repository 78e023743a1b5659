//! Persona system — profiles used as the generation context for notes.
//!
//! Personas are stored as one whole collection behind a persistence port,
//! along with a marker naming the persona later commands act on.

pub mod generator;
pub mod persistence;
pub mod store;
pub mod types;

pub use generator::{PersonaGenerator, StubPersonaGenerator};
pub use persistence::{JsonFilePersistence, MemoryPersistence, PersonaPersistence};
pub use store::PersonaStore;
pub use types::{Persona, PersonaRequest, DEFAULT_REFERENCE_TAGS};
