use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::notes::model::{BoardNote, CreateNotePayload, Draft, DraftField, Note, NoteState};
use crate::store::{BlobStore, RecordStore, StoreError};

/// Upper bound on in-flight fetch-URL resolutions during a refresh.
const URL_RESOLVE_CONCURRENCY: usize = 16;

/// Failure of a board operation. Every variant is also logged at the point
/// the operation is abandoned; nothing is retried.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Listing or URL resolution failed; the previous entries are kept.
    #[error("error fetching notes: {source}")]
    Refresh {
        #[source]
        source: StoreError,
    },

    /// The staged image could not be uploaded; no record was written.
    #[error("error creating note: image upload to {path} failed: {source}")]
    Upload {
        path: String,
        #[source]
        source: StoreError,
    },

    /// The record write failed after the image upload. The uploaded object
    /// is left behind at `uploaded_image`.
    #[error("error creating note: {source}")]
    CreateRecord {
        uploaded_image: Option<String>,
        #[source]
        source: StoreError,
    },

    /// Image removal failed; the record delete was not attempted.
    #[error("error deleting note: image removal of {path} failed: {source}")]
    RemoveImage {
        path: String,
        #[source]
        source: StoreError,
    },

    /// The record delete failed after the image was already removed.
    #[error("error deleting note {id}: {source}")]
    DeleteRecord {
        id: String,
        #[source]
        source: StoreError,
    },
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The record was written and is now tracked as pending.
    Created(Note),
    /// Name or description was missing; nothing was touched.
    DraftIncomplete,
}

struct BoardState {
    notes: Vec<BoardNote>,
    draft: Draft,
}

/// The board controller. Owns the tracked notes and the draft, and
/// orchestrates the record store and the blob store.
///
/// All store I/O runs outside the state lock: overlapping operations each
/// commit at their own completion, so the later-resolving call's result is
/// the one that sticks.
pub struct NoteBoard<R, B> {
    records: R,
    blobs: B,
    state: Mutex<BoardState>,
}

impl<R: RecordStore, B: BlobStore> NoteBoard<R, B> {
    pub fn new(records: R, blobs: B) -> Self {
        NoteBoard {
            records,
            blobs,
            state: Mutex::new(BoardState {
                notes: Vec::new(),
                draft: Draft::default(),
            }),
        }
    }

    /// Current board entries, in the order the record store returned them.
    pub async fn notes(&self) -> Vec<BoardNote> {
        self.state.lock().await.notes.clone()
    }

    /// Current draft contents.
    pub async fn draft(&self) -> Draft {
        self.state.lock().await.draft.clone()
    }

    /// Merge a single field edit into the draft.
    pub async fn update_draft(&self, field: DraftField) {
        self.state.lock().await.draft.apply(field);
    }

    /// Reload the board from the record store, resolving a fetch URL for
    /// every note that has an image. On any failure the previous entries
    /// are kept unchanged.
    pub async fn refresh(&self) -> Result<(), BoardError> {
        let notes = match self.load_board_notes().await {
            Ok(notes) => notes,
            Err(source) => {
                tracing::error!("error fetching notes: {}", source);
                return Err(BoardError::Refresh { source });
            }
        };

        self.state.lock().await.notes = notes;
        Ok(())
    }

    /// Submit the draft: upload the staged image if there is one, write the
    /// record, then clear the draft. An incomplete draft is a quiet no-op.
    pub async fn create_note(&self) -> Result<CreateOutcome, BoardError> {
        let draft = self.draft().await;
        if !draft.is_submittable() {
            return Ok(CreateOutcome::DraftIncomplete);
        }
        let Draft {
            name,
            description,
            image: staged,
        } = draft;

        // Upload first so the record never points at a missing object
        let image = match staged {
            Some(file) => {
                let path = storage_path(&file.file_name);
                if let Err(source) = self.blobs.upload(&path, file.bytes).await {
                    tracing::error!("error creating note: image upload to {} failed: {}", path, source);
                    return Err(BoardError::Upload { path, source });
                }
                Some(path)
            }
            None => None,
        };

        let payload = CreateNotePayload {
            name,
            description,
            image: image.clone(),
        };
        let note = match self.records.create_note(payload).await {
            Ok(note) => note,
            Err(source) => {
                tracing::error!("error creating note: {}", source);
                return Err(BoardError::CreateRecord {
                    uploaded_image: image,
                    source,
                });
            }
        };

        {
            let mut state = self.state.lock().await;
            state.notes.push(BoardNote {
                note: note.clone(),
                image_url: None,
                state: NoteState::Pending,
            });
            state.draft = Draft::default();
        }

        // Best effort; refresh logs its own failures
        let _ = self.refresh().await;

        Ok(CreateOutcome::Created(note))
    }

    /// Delete a note: remove its image from the blob store first, then
    /// delete the record. A failed step stops the sequence where it
    /// happened and leaves the entry tagged [`NoteState::Deleting`].
    pub async fn delete_note(&self, note: &Note) -> Result<(), BoardError> {
        self.mark_deleting(&note.id).await;

        if let Some(path) = note.image_path() {
            if let Err(source) = self.blobs.remove(path).await {
                tracing::error!("error deleting note {}: image removal of {} failed: {}", note.id, path, source);
                return Err(BoardError::RemoveImage {
                    path: path.to_string(),
                    source,
                });
            }
        }

        if let Err(source) = self.records.delete_note(&note.id).await {
            tracing::error!("error deleting note {}: {}", note.id, source);
            return Err(BoardError::DeleteRecord {
                id: note.id.clone(),
                source,
            });
        }

        // Best effort; refresh logs its own failures
        let _ = self.refresh().await;

        Ok(())
    }

    async fn load_board_notes(&self) -> Result<Vec<BoardNote>, StoreError> {
        let notes = self.records.list_notes().await?;

        stream::iter(notes)
            .map(|note| self.resolve_board_note(note))
            .buffered(URL_RESOLVE_CONCURRENCY)
            .try_collect()
            .await
    }

    async fn resolve_board_note(&self, note: Note) -> Result<BoardNote, StoreError> {
        let image_url = match note.image_path() {
            Some(path) => Some(self.blobs.get_url(path).await?.url),
            None => None,
        };

        Ok(BoardNote {
            note,
            image_url,
            state: NoteState::Ready,
        })
    }

    async fn mark_deleting(&self, id: &str) {
        let mut state = self.state.lock().await;
        if let Some(entry) = state.notes.iter_mut().find(|entry| entry.note.id == id) {
            entry.state = NoteState::Deleting;
        }
    }
}

/// Storage path for an uploaded image. The millisecond stamp keeps
/// resubmissions of the same filename from colliding.
fn storage_path(file_name: &str) -> String {
    format!("media/{}-{}", chrono::Utc::now().timestamp_millis(), file_name)
}
