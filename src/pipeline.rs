use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use tracing::{debug, info, warn};

use crate::detection::{CardDetector, Detection};
use crate::error::{DetectError, Result};
use crate::io;

/// Images a detection run can hand out, in the order they are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Grayscale,
    Blurred,
    EdgeMap,
    Annotated,
    Rectified,
}

impl ArtifactKind {
    /// Intermediate images are only worth keeping while debugging
    pub fn is_intermediate(&self) -> bool {
        matches!(self, ArtifactKind::Grayscale | ArtifactKind::Blurred)
    }

    /// Human-readable stage name (used for debug directory names)
    pub fn name(&self) -> &str {
        match self {
            ArtifactKind::Grayscale => "Grayscale",
            ArtifactKind::Blurred => "Gaussian Blur",
            ArtifactKind::EdgeMap => "Edge Detection",
            ArtifactKind::Annotated => "Detected Card",
            ArtifactKind::Rectified => "Warped Card",
        }
    }

    /// File name for the primary outputs
    pub fn file_name(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::EdgeMap => Some("edges_debug.png"),
            ArtifactKind::Annotated => Some("detected_card.png"),
            ArtifactKind::Rectified => Some("warped_card.png"),
            ArtifactKind::Grayscale | ArtifactKind::Blurred => None,
        }
    }

    fn step_index(&self) -> usize {
        match self {
            ArtifactKind::Grayscale => 1,
            ArtifactKind::Blurred => 2,
            ArtifactKind::EdgeMap => 3,
            ArtifactKind::Annotated => 4,
            ArtifactKind::Rectified => 5,
        }
    }
}

/// Decides whether and where stage images are persisted.
///
/// The detector never touches the filesystem itself; it reports each image
/// here as soon as the stage producing it succeeds.
pub trait ArtifactSink: Send + Sync {
    fn save(&self, kind: ArtifactKind, image: &DynamicImage) -> Result<()>;
}

/// Discards every artifact
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ArtifactSink for NullSink {
    fn save(&self, _kind: ArtifactKind, _image: &DynamicImage) -> Result<()> {
        Ok(())
    }
}

/// Debug configuration for intermediate outputs
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// Use `output_dir` for debug images.
    /// The directory must be empty or non-existent
    pub fn prepare(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        let write_error = |reason: String| DetectError::WriteError {
            path: output_dir.clone(),
            reason,
        };

        if output_dir.exists() {
            let mut entries = std::fs::read_dir(&output_dir).map_err(|e| write_error(e.to_string()))?;
            if entries.next().is_some() {
                return Err(DetectError::InvalidConfig(format!(
                    "debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(|e| write_error(e.to_string()))?;
        }

        Ok(Self { output_dir })
    }

    /// Debug configuration for one image of a batch
    pub fn child(&self, name: &str) -> Self {
        Self {
            output_dir: self.output_dir.join(name),
        }
    }

    /// Step directory path, e.g. "02_gaussian_blur/01.png"
    fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        let step_dir_name = format!(
            "{:02}_{}",
            kind.step_index(),
            kind.name().to_lowercase().replace(' ', "_")
        );
        self.output_dir.join(step_dir_name).join("01.png")
    }
}

/// Writes the primary outputs into one directory, and the intermediates into
/// numbered step directories when debugging is enabled.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    output_dir: PathBuf,
    debug: Option<DebugConfig>,
}

impl DirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            debug: None,
        }
    }

    /// Enable debug mode
    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Where an artifact ends up, or `None` when this sink drops it
    pub fn path_for(&self, kind: ArtifactKind) -> Option<PathBuf> {
        match kind.file_name() {
            Some(name) => Some(self.output_dir.join(name)),
            None => self.debug.as_ref().map(|d| d.path_for(kind)),
        }
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, kind: ArtifactKind, image: &DynamicImage) -> Result<()> {
        let Some(path) = self.path_for(kind) else {
            return Ok(());
        };
        io::save_image(&path, image)?;
        if kind.is_intermediate() {
            debug!(path = %path.display(), "Debug: saved {}", kind.name());
        } else {
            info!(path = %path.display(), "{} saved", kind.name());
        }
        Ok(())
    }
}

/// Outcome for one input of a batch
pub struct BatchResult {
    pub path: PathBuf,
    pub result: Result<Detection>,
}

/// Runs independent detections on a bounded pool of worker threads.
///
/// Workers share only the read-only detector and claim inputs from a shared
/// counter, so at most `max_workers` images are decoded at once. Results
/// travel back over an MPSC channel and are returned in input order.
pub struct BatchExecutor {
    detector: CardDetector,
    max_workers: usize,
}

impl BatchExecutor {
    /// One worker per available CPU.
    pub fn new(detector: CardDetector) -> Self {
        let max_workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            detector,
            max_workers,
        }
    }

    /// Limit how many images are in flight at once (at least one).
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Load and process every path. `make_sink` builds the sink for each input.
    pub fn execute<S, F>(&self, paths: &[PathBuf], make_sink: F) -> Vec<BatchResult>
    where
        S: ArtifactSink,
        F: Fn(&Path) -> S + Sync,
    {
        let (sender, receiver) = mpsc::channel();
        let next = AtomicUsize::new(0);
        let workers = self.max_workers.min(paths.len());
        debug!(inputs = paths.len(), workers, "starting batch");

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let sender = sender.clone();
                let detector = &self.detector;
                let make_sink = &make_sink;
                let next = &next;
                scope.spawn(move || {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(path) = paths.get(index) else {
                            break;
                        };
                        let result = io::load_image(path)
                            .and_then(|img| detector.detect(&img, &make_sink(path)));
                        if let Err(e) = &result {
                            warn!(path = %path.display(), error = %e, "detection failed");
                        }
                        // The receiver outlives the scope, so this cannot fail.
                        let _ = sender.send((index, result));
                    }
                });
            }
        });
        drop(sender);

        let mut results: Vec<(usize, Result<Detection>)> = receiver.into_iter().collect();
        results.sort_by_key(|(index, _)| *index);
        results
            .into_iter()
            .map(|(index, result)| BatchResult {
                path: paths[index].clone(),
                result,
            })
            .collect()
    }
}
