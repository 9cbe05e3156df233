//! # Tagger
//!
//! Drives the per-file pipeline: prepare the upload, analyze it, then
//! reconcile the result into the file's metadata and write it back.
//! A failing file never stops the rest of a batch.

use crate::{
    constants::DEFAULT_RESIZE_WIDTH,
    errors::TagError,
    providers::{
        metadata::{MetadataFile, MetadataStore},
        vision::VisionProvider,
    },
    reconcile::{ReconcileOutcome, Reconciler},
    types::VisionResult,
    upload::{check_resize_width, prepare_image},
};
use futures::stream::{self, StreamExt};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// The outcome of processing one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<ReconcileOutcome, TagError>,
}

/// Per-file outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &TagError)> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().err().map(|e| (f.path.as_path(), e)))
    }
}

/// Tags image files using a vision provider and a metadata store.
pub struct Tagger {
    provider: Box<dyn VisionProvider>,
    store: Box<dyn MetadataStore>,
    reconciler: Reconciler,
    resize_width: u32,
}

impl fmt::Debug for Tagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tagger")
            .field("provider", &self.provider)
            .field("store", &self.store)
            .field("reconciler", &self.reconciler)
            .field("resize_width", &self.resize_width)
            .finish()
    }
}

impl Tagger {
    /// Runs the full pipeline for a single file.
    ///
    /// Image preparation and metadata I/O run on the blocking pool.
    pub async fn process_file(&self, path: &Path) -> Result<ReconcileOutcome, TagError> {
        let source = path.to_path_buf();
        let resize_width = self.resize_width;
        let prepared =
            tokio::task::spawn_blocking(move || prepare_image(&source, resize_width)).await??;

        let result = self.provider.analyze(&prepared.bytes).await?;
        info!("[{}] Response received from vision API", path.display());

        let store = self.store.clone();
        let reconciler = self.reconciler.clone();
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            write_metadata(store.as_ref(), &reconciler, &target, &result)
        })
        .await?
    }

    /// Processes `paths` with up to `jobs` files in flight.
    ///
    /// Reports come back in input order regardless of completion order.
    pub async fn process_batch(&self, paths: &[PathBuf], jobs: usize) -> BatchReport {
        let total = paths.len();
        let files = stream::iter(paths.iter().enumerate())
            .map(|(idx, path)| async move {
                info!(
                    "[{}] Reading input file {}/{}",
                    path.display(),
                    idx + 1,
                    total
                );
                let result = self.process_file(path).await;
                match &result {
                    Ok(_) => info!(
                        "[{}] Finished writing metadata to file {}/{}",
                        path.display(),
                        idx + 1,
                        total
                    ),
                    Err(e) => error!("[{}] Skipped: {}", path.display(), e),
                }
                FileReport {
                    path: path.clone(),
                    result,
                }
            })
            .buffered(jobs.max(1))
            .collect::<Vec<_>>()
            .await;

        BatchReport { files }
    }
}

/// Opens `path`, reconciles `result` into it and writes it back.
///
/// The file is closed whether or not the write succeeds.
fn write_metadata(
    store: &dyn MetadataStore,
    reconciler: &Reconciler,
    path: &Path,
    result: &VisionResult,
) -> Result<ReconcileOutcome, TagError> {
    let mut file = store.open(path)?;
    let outcome = reconcile_into(file.as_mut(), reconciler, path, result);
    file.close();
    outcome
}

fn reconcile_into(
    file: &mut dyn MetadataFile,
    reconciler: &Reconciler,
    path: &Path,
    result: &VisionResult,
) -> Result<ReconcileOutcome, TagError> {
    let mut doc = file.read()?;
    let outcome = reconciler.reconcile(&mut doc, result)?;
    if !file.can_write(&doc) {
        return Err(TagError::WriteRejected(path.to_path_buf()));
    }
    file.write(&doc)?;
    Ok(outcome)
}

/// A builder for creating `Tagger` instances.
#[derive(Default)]
pub struct TaggerBuilder {
    provider: Option<Box<dyn VisionProvider>>,
    store: Option<Box<dyn MetadataStore>>,
    reconciler: Option<Reconciler>,
    resize_width: Option<u32>,
}

impl TaggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vision_provider(mut self, provider: Box<dyn VisionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn metadata_store(mut self, store: Box<dyn MetadataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    /// Sets the upload resize width. `0` disables resizing.
    pub fn resize_width(mut self, width: u32) -> Self {
        self.resize_width = Some(width);
        self
    }

    /// Builds the `Tagger`, failing if a component is missing or the width is invalid.
    pub fn build(self) -> Result<Tagger, TagError> {
        let resize_width = check_resize_width(self.resize_width.unwrap_or(DEFAULT_RESIZE_WIDTH))?;
        Ok(Tagger {
            provider: self
                .provider
                .ok_or(TagError::MissingComponent("vision provider"))?,
            store: self
                .store
                .ok_or(TagError::MissingComponent("metadata store"))?,
            reconciler: self
                .reconciler
                .ok_or(TagError::MissingComponent("reconciler"))?,
            resize_width,
        })
    }
}
