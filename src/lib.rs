//! Persona Notes
//!
//! Stores persona profiles and generates social notes for one or more of
//! them at a time. The binary in `main.rs` is a thin CLI over this library.

pub mod config;
pub mod error;
pub mod logging;
pub mod note;
pub mod persona;
pub mod selection;
pub mod version;

pub use error::{Error, Result};
