use std::path::PathBuf;

use thiserror::Error;

/// Every way a single detection run can end early.
///
/// The variants stay distinct so callers can react per kind, e.g. retry with
/// other thresholds on [`DetectError::NoQuadFound`].
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("no 4-cornered boundary found among {candidates} qualifying contours")]
    NoQuadFound { candidates: usize },

    #[error("degenerate quadrilateral: {0}")]
    DegenerateQuad(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("failed to write {}: {reason}", path.display())]
    WriteError { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DetectError {
    /// Process exit code reported by the CLI for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            DetectError::InvalidImage(_) => 2,
            DetectError::NoQuadFound { .. } => 3,
            DetectError::DegenerateQuad(_) => 4,
            DetectError::DegenerateGeometry(_) => 5,
            DetectError::WriteError { .. } => 6,
            DetectError::InvalidConfig(_) => 7,
        }
    }
}

pub type Result<T> = std::result::Result<T, DetectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = [
            DetectError::InvalidImage("x".into()),
            DetectError::NoQuadFound { candidates: 0 },
            DetectError::DegenerateQuad("x".into()),
            DetectError::DegenerateGeometry("x".into()),
            DetectError::WriteError {
                path: PathBuf::from("out.png"),
                reason: "x".into(),
            },
            DetectError::InvalidConfig("x".into()),
        ];
        let mut codes: Vec<u8> = errors.iter().map(DetectError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0) && !codes.contains(&1));
    }

    #[test]
    fn write_error_message_names_the_path() {
        let err = DetectError::WriteError {
            path: PathBuf::from("output/warped_card.png"),
            reason: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write output/warped_card.png: permission denied"
        );
    }
}
