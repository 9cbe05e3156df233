use anyhow::Result;
use async_trait::async_trait;
use autotag::providers::metadata::{MetadataFile, MetadataStore};
use autotag::providers::vision::VisionProvider;
use autotag::{Caption, Category, MetadataDocument, Tag, TagError, VisionResult};
use image::{Rgb, RgbImage};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

// --- Mock Vision Provider ---

/// A vision provider that replays pre-programmed results in order.
///
/// Once the queue is exhausted it falls back to the default result, or fails
/// with a `VisionApi` error if none was set.
#[derive(Clone, Debug, Default)]
pub struct MockVisionProvider {
    responses: Arc<Mutex<VecDeque<Result<VisionResult, TagError>>>>,
    default: Option<VisionResult>,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl MockVisionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that answers every call with `result`.
    pub fn always(result: VisionResult) -> Self {
        Self {
            default: Some(result),
            ..Self::default()
        }
    }

    pub fn push_response(&self, result: VisionResult) {
        self.responses.lock().unwrap().push_back(Ok(result));
    }

    pub fn push_error(&self, error: TagError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Sizes of the payloads received so far, in call order.
    pub fn get_calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn analyze(&self, image: &[u8]) -> Result<VisionResult, TagError> {
        self.calls.lock().unwrap().push(image.len());

        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return response;
        }
        self.default.clone().ok_or_else(|| TagError::VisionApi {
            status: 500,
            body: "MockVisionProvider: no response programmed".to_string(),
        })
    }
}

// --- In-Memory Metadata Store ---

#[derive(Debug, Default)]
struct StoreState {
    documents: HashMap<PathBuf, MetadataDocument>,
    read_only: HashSet<PathBuf>,
    open: HashSet<PathBuf>,
    open_threads: Vec<ThreadId>,
    writes: usize,
}

/// A metadata store that keeps documents in memory, keyed by path.
///
/// Opening a path that is already open fails, which lets tests check that
/// every handle is closed.
#[derive(Clone, Debug, Default)]
pub struct InMemoryMetadataStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &Path, doc: MetadataDocument) {
        self.state
            .lock()
            .unwrap()
            .documents
            .insert(path.to_path_buf(), doc);
    }

    pub fn document(&self, path: &Path) -> Option<MetadataDocument> {
        self.state.lock().unwrap().documents.get(path).cloned()
    }

    /// Makes `can_write` return `false` for `path`.
    pub fn reject_writes(&self, path: &Path) {
        self.state
            .lock()
            .unwrap()
            .read_only
            .insert(path.to_path_buf());
    }

    pub fn open_handles(&self) -> usize {
        self.state.lock().unwrap().open.len()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    /// The threads each `open` call ran on, in call order.
    pub fn open_threads(&self) -> Vec<ThreadId> {
        self.state.lock().unwrap().open_threads.clone()
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn open(&self, path: &Path) -> Result<Box<dyn MetadataFile>, TagError> {
        let mut state = self.state.lock().unwrap();
        state.open_threads.push(thread::current().id());
        if !state.open.insert(path.to_path_buf()) {
            return Err(TagError::Metadata(format!(
                "'{}' is already open",
                path.display()
            )));
        }
        Ok(Box::new(InMemoryFile {
            path: path.to_path_buf(),
            store: self.clone(),
        }))
    }
}

struct InMemoryFile {
    path: PathBuf,
    store: InMemoryMetadataStore,
}

impl MetadataFile for InMemoryFile {
    fn read(&mut self) -> Result<MetadataDocument, TagError> {
        let state = self.store.state.lock().unwrap();
        Ok(state.documents.get(&self.path).cloned().unwrap_or_default())
    }

    fn can_write(&self, _doc: &MetadataDocument) -> bool {
        !self.store.state.lock().unwrap().read_only.contains(&self.path)
    }

    fn write(&mut self, doc: &MetadataDocument) -> Result<(), TagError> {
        let mut state = self.store.state.lock().unwrap();
        state.documents.insert(self.path.clone(), doc.clone());
        state.writes += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.store.state.lock().unwrap().open.remove(&self.path);
    }
}

// --- Fixtures ---

/// The "cat on a mat" result used across the test suites.
pub fn cat_on_a_mat() -> VisionResult {
    VisionResult::new(
        Caption {
            text: "cat on a mat".to_string(),
            confidence: 0.95,
        },
        vec![Category {
            name: "animal_".to_string(),
            score: 0.8,
        }],
        vec![
            Tag {
                name: "cat".to_string(),
                confidence: 0.9,
            },
            Tag {
                name: "mat".to_string(),
                confidence: 0.05,
            },
        ],
    )
}

/// Writes a gradient image of the given size; the format follows the file extension.
pub fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> Result<PathBuf> {
    let path = dir.join(name);
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    img.save(&path)?;
    Ok(path)
}
