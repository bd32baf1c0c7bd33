pub mod config;
pub mod detection;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;

pub use config::PipelineConfig;
pub use detection::{CardDetector, Detection};
pub use error::{DetectError, Result};
pub use models::{Contour, OrderedRect, Point2D, Quad};
pub use pipeline::{
    ArtifactKind, ArtifactSink, BatchExecutor, BatchResult, DebugConfig, DirectorySink, NullSink,
};
