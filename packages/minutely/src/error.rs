use thiserror::Error;

use crate::SinkError;

/// Errors that can occur when flushing metrics or configuring the process-wide collector.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A flush was requested but no sink has been installed to receive the metrics.
    ///
    /// Nothing was extracted from the collector, so no data was lost.
    #[error("cannot flush metrics because no sink has been installed")]
    SinkNotSet,

    /// The sink failed to accept a flushed payload. The payload has been dropped.
    #[error("metrics sink failed to accept the flushed payload")]
    Sink(#[source] SinkError),

    /// The process-wide collector was already initialized when an attempt was made
    /// to install a different one.
    #[error("the process-wide metrics collector has already been initialized")]
    GlobalAlreadyInstalled,
}

/// A specialized `Result` type for metrics operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
