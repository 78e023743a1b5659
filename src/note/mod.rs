//! Notes generated for personas, and the session that collects them.

pub mod association;
pub mod generator;
pub mod session;
pub mod types;
pub mod view;

pub use association::{group_by_persona, persona_label, NoteGroups, PersonaNotes};
pub use generator::{FixedNoteGenerator, NoteGenerator};
pub use session::NoteSession;
pub use types::{GenerationParams, Note, NoteKind};
pub use view::{
    clipboard_text, copy_all_to_clipboard, copy_to_clipboard, render_note, ClipboardSink, ImageDownloader,
    MemoryClipboard, Osc52Clipboard,
};
