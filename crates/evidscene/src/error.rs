//! Error taxonomy for the evidence pipeline.

use std::path::PathBuf;

/// Error type returned by backend implementations.
///
/// Backends wrap arbitrary runtimes, so their failures are boxed; the fusion
/// engine and depth stage attach the backend name when surfacing them.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the pipeline.
///
/// Depth samples that fall outside the depth map are recovered locally and
/// never appear here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A backend failed to load.
    #[error("backend '{backend}' unavailable: {reason}")]
    BackendUnavailable { backend: String, reason: String },

    /// A loaded backend failed during a call. Fatal to the current request.
    #[error("inference failed in backend '{backend}'")]
    InferenceFailure {
        backend: String,
        #[source]
        source: BackendError,
    },

    /// Input image could not be decoded or has no pixels.
    #[error("malformed image: {0}")]
    MalformedImage(String),

    /// Configuration or derived geometry is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Raster encoding of a texture or annotated image failed.
    #[error("failed to encode {what}")]
    Encode {
        what: &'static str,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
