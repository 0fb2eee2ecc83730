//! Upload and publish error types.

/// Errors from uploading a single file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("publisher returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no content id in publisher response")]
    MissingContentId,

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

/// Errors that stop the whole publish run.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to scan build directory {path}: {source}")]
    Scan {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
