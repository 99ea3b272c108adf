use serde::{Deserialize, Serialize};

/// Note domain model - a persisted record in the record store.
///
/// `image` is the opaque storage path of the attached file. The resolved
/// fetch URL is deliberately not part of this type; it lives on
/// [`BoardNote`] so a signed URL can never be written back to the store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub created_at: String,
}

impl Note {
    /// Storage path of the attached image. An empty path counts as no image.
    pub fn image_path(&self) -> Option<&str> {
        self.image.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNotePayload {
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

/// A staged local file: the original filename plus its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Local form state for the note being composed. Starts empty, is edited
/// one field at a time, and is only cleared by a successful submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub description: String,
    pub image: Option<ImageFile>,
}

impl Draft {
    /// A draft needs a non-empty name and description before it can be
    /// submitted. The staged image is optional.
    pub fn is_submittable(&self) -> bool {
        !self.name.is_empty() && !self.description.is_empty()
    }

    /// Merge a single field edit, leaving the other fields untouched.
    /// A new image replaces any previously staged one.
    pub fn apply(&mut self, field: DraftField) {
        match field {
            DraftField::Name(name) => self.name = name,
            DraftField::Description(description) => self.description = description,
            DraftField::Image(image) => self.image = Some(image),
        }
    }
}

/// A single draft field edit.
#[derive(Debug, Clone)]
pub enum DraftField {
    Name(String),
    Description(String),
    Image(ImageFile),
}

/// Lifecycle tag for a note tracked on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Created this session, not yet confirmed by a completed refresh.
    Pending,
    /// Present in the latest completed refresh.
    Ready,
    /// A delete was issued and no refresh has completed since. The next
    /// completed refresh replaces the tag either way: the entry goes away
    /// if the record is gone, or comes back as `Ready` if it survived.
    Deleting,
}

/// A note as the board tracks it: the stored record plus its resolved
/// fetch URL and lifecycle tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardNote {
    pub note: Note,
    pub image_url: Option<String>,
    pub state: NoteState,
}
