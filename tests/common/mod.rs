#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use noteboard::{
    BlobStore, CreateNotePayload, FetchUrl, Note, NoteBoard, RecordStore, StoreError,
};

/// Ordered log of every store call, shared by both fakes so tests can
/// assert cross-store sequencing.
#[derive(Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallJournal {
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> usize {
        let entries = self.entries();
        entries
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("journal has no {:?}, got {:?}", entry, entries))
    }

    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

/// In-memory record store. Calls are journaled before they can fail, so
/// failed attempts still show up in the log.
#[derive(Clone)]
pub struct FakeRecordStore {
    inner: Arc<RecordInner>,
}

struct RecordInner {
    notes: Mutex<Vec<Note>>,
    next_id: AtomicU64,
    list_failures: Mutex<VecDeque<StoreError>>,
    create_failures: Mutex<VecDeque<StoreError>>,
    delete_failures: Mutex<VecDeque<StoreError>>,
    list_delays: Mutex<VecDeque<Duration>>,
    journal: CallJournal,
}

impl FakeRecordStore {
    pub fn new(journal: CallJournal) -> Self {
        FakeRecordStore {
            inner: Arc::new(RecordInner {
                notes: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                list_failures: Mutex::new(VecDeque::new()),
                create_failures: Mutex::new(VecDeque::new()),
                delete_failures: Mutex::new(VecDeque::new()),
                list_delays: Mutex::new(VecDeque::new()),
                journal,
            }),
        }
    }

    /// Insert a note directly, bypassing the journal. Setup helper.
    pub fn seed_note(&self, name: &str, description: &str, image: Option<&str>) -> Note {
        let note = Note {
            id: format!("note-{}", self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1),
            name: name.to_string(),
            description: description.to_string(),
            image: image.map(|s| s.to_string()),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.inner.notes.lock().unwrap().push(note.clone());
        note
    }

    pub fn stored_notes(&self) -> Vec<Note> {
        self.inner.notes.lock().unwrap().clone()
    }

    pub fn fail_next_list(&self, err: StoreError) {
        self.inner.list_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_create(&self, err: StoreError) {
        self.inner.create_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_delete(&self, err: StoreError) {
        self.inner.delete_failures.lock().unwrap().push_back(err);
    }

    /// Delay the next list call. The listing is snapshotted at call time
    /// and returned after the delay, like a slow read of consistent data.
    pub fn delay_next_list(&self, delay: Duration) {
        self.inner.list_delays.lock().unwrap().push_back(delay);
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        self.inner.journal.record("record.list");
        if let Some(err) = self.inner.list_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let snapshot = self.inner.notes.lock().unwrap().clone();
        let delay = self.inner.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(snapshot)
    }

    async fn create_note(&self, payload: CreateNotePayload) -> Result<Note, StoreError> {
        self.inner
            .journal
            .record(format!("record.create {}", payload.name));
        if let Some(err) = self.inner.create_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let note = Note {
            id: format!("note-{}", self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1),
            name: payload.name,
            description: payload.description,
            image: payload.image,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.inner.notes.lock().unwrap().push(note.clone());

        Ok(note)
    }

    async fn delete_note(&self, id: &str) -> Result<(), StoreError> {
        self.inner.journal.record(format!("record.delete {}", id));
        if let Some(err) = self.inner.delete_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        self.inner.notes.lock().unwrap().retain(|n| n.id != id);
        Ok(())
    }
}

/// In-memory blob store. URLs resolve only for objects that exist;
/// removing a missing object is a no-op, like the real store.
#[derive(Clone)]
pub struct FakeBlobStore {
    inner: Arc<BlobInner>,
}

struct BlobInner {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    upload_failures: Mutex<VecDeque<StoreError>>,
    url_failures: Mutex<VecDeque<StoreError>>,
    remove_failures: Mutex<VecDeque<StoreError>>,
    url_delays: Mutex<VecDeque<Duration>>,
    url_calls_in_flight: AtomicUsize,
    url_calls_peak: AtomicUsize,
    journal: CallJournal,
}

impl FakeBlobStore {
    pub fn new(journal: CallJournal) -> Self {
        FakeBlobStore {
            inner: Arc::new(BlobInner {
                objects: Mutex::new(HashMap::new()),
                upload_failures: Mutex::new(VecDeque::new()),
                url_failures: Mutex::new(VecDeque::new()),
                remove_failures: Mutex::new(VecDeque::new()),
                url_delays: Mutex::new(VecDeque::new()),
                url_calls_in_flight: AtomicUsize::new(0),
                url_calls_peak: AtomicUsize::new(0),
                journal,
            }),
        }
    }

    /// Insert an object directly, bypassing the journal. Setup helper.
    pub fn seed_object(&self, path: &str, bytes: Vec<u8>) {
        self.inner.objects.lock().unwrap().insert(path.to_string(), bytes);
    }

    pub fn object(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.objects.lock().unwrap().get(path).cloned()
    }

    pub fn has_object(&self, path: &str) -> bool {
        self.inner.objects.lock().unwrap().contains_key(path)
    }

    pub fn object_count(&self) -> usize {
        self.inner.objects.lock().unwrap().len()
    }

    pub fn fail_next_upload(&self, err: StoreError) {
        self.inner.upload_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_url(&self, err: StoreError) {
        self.inner.url_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_remove(&self, err: StoreError) {
        self.inner.remove_failures.lock().unwrap().push_back(err);
    }

    /// Delay the next get_url call. Delays are handed out in call order.
    pub fn delay_next_url(&self, delay: Duration) {
        self.inner.url_delays.lock().unwrap().push_back(delay);
    }

    /// Highest number of get_url calls that were in flight at once.
    pub fn peak_concurrent_url_calls(&self) -> usize {
        self.inner.url_calls_peak.load(Ordering::Relaxed)
    }

    fn track_url_call(&self) -> UrlCallGuard {
        let in_flight = self.inner.url_calls_in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.url_calls_peak.fetch_max(in_flight, Ordering::Relaxed);
        UrlCallGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Holds the in-flight slot for one get_url call; dropping releases it.
struct UrlCallGuard {
    inner: Arc<BlobInner>,
}

impl Drop for UrlCallGuard {
    fn drop(&mut self) {
        self.inner.url_calls_in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.inner.journal.record(format!("blob.upload {}", path));
        if let Some(err) = self.inner.upload_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        self.inner.objects.lock().unwrap().insert(path.to_string(), bytes);
        Ok(())
    }

    async fn get_url(&self, path: &str) -> Result<FetchUrl, StoreError> {
        let _call = self.track_url_call();
        self.inner.journal.record(format!("blob.get_url {}", path));

        let delay = self.inner.url_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.inner.url_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        if !self.inner.objects.lock().unwrap().contains_key(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }

        Ok(FetchUrl {
            url: format!("https://blobs.test/{}", path),
            valid_until: None,
        })
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.inner.journal.record(format!("blob.remove {}", path));
        if let Some(err) = self.inner.remove_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        self.inner.objects.lock().unwrap().remove(path);
        Ok(())
    }
}

/// A board over fresh fakes plus handles to everything a test inspects.
pub fn board_with_fakes() -> (
    NoteBoard<FakeRecordStore, FakeBlobStore>,
    FakeRecordStore,
    FakeBlobStore,
    CallJournal,
) {
    let journal = CallJournal::default();
    let records = FakeRecordStore::new(journal.clone());
    let blobs = FakeBlobStore::new(journal.clone());
    let board = NoteBoard::new(records.clone(), blobs.clone());

    (board, records, blobs, journal)
}
