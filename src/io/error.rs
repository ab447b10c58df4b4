use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("byte count mismatch at line {line}: header says {declared}, record has {actual}")]
    ByteCountMismatch {
        line: usize,
        declared: u8,
        actual: usize,
    },

    #[error("{record_type} record at line {line} must have {expected} data bytes, got {actual}")]
    AddressRecordLength {
        line: usize,
        record_type: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid sidecar {path}: {source}")]
    Sidecar {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("segment {id:02} size mismatch: sidecar says {expected}, binary has {actual}")]
    SizeMismatch {
        id: usize,
        expected: u64,
        actual: usize,
    },

    #[error("segment {id:02} has an invalid range: {message}")]
    InvalidSegment { id: usize, message: String },

    #[error("segment {id:02} {digest} mismatch: expected {expected}, got {actual}")]
    DigestMismatch {
        id: usize,
        digest: &'static str,
        expected: String,
        actual: String,
    },
}
