// Re-export model types and the board controller
pub mod model;
pub mod service;

pub use model::{BoardNote, CreateNotePayload, Draft, DraftField, ImageFile, Note, NoteState};
pub use service::{BoardError, CreateOutcome, NoteBoard};
