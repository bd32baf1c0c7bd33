mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from cardscan for tests
pub use cardscan::{
    ArtifactKind, CardDetector, DetectError, DirectorySink, NullSink, PipelineConfig, Point2D,
};
