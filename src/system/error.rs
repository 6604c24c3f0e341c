use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while reading host counters.
///
/// Only `SourceUnavailable` is fatal to a tick. `Parse` and `DiskQuery` are
/// absorbed by the sampler, which substitutes zeroed values instead.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("counter source {} is unavailable: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed counter data: {0}")]
    Parse(String),

    #[error("cannot query filesystem space for {}: {source}", path.display())]
    DiskQuery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SampleError {
    pub fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SampleError::SourceUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, SampleError::SourceUnavailable { .. })
    }
}
