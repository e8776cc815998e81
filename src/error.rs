use thiserror::Error;

/// Result alias for fallible dictionary operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure kinds reported by `Dict` operations.
///
/// Missing keys on `delete`, `rename`, and lookups are benign no-ops or
/// `None`, never errors; callers cannot distinguish "nothing to do" from
/// "succeeded trivially" and that is intentional.
#[derive(Debug, Error)]
pub enum Error {
    /// `insert` on a key that is already present.
    #[error("key already present: {0:?}")]
    DuplicateKey(String),

    /// `rename` target already maps to a different entry.
    #[error("rename target already occupied: {0:?}")]
    KeyCollision(String),

    /// `pack` with a key that does not fit the 1-byte wire length field.
    #[error("key is {0} bytes, wire format allows at most 255")]
    KeyTooLong(usize),

    /// `pack` with a value that does not fit the 4-byte wire length field.
    #[error("value is {0} bytes, wire format allows at most 4294967295")]
    ValueTooLong(usize),

    /// `pack` with more entries than the 4-byte wire count field can hold.
    #[error("dict has {0} entries, wire format allows at most 4294967295")]
    TooManyEntries(usize),

    /// `unpack` input that does not follow the wire layout.
    #[error("corrupt wire data: {0}")]
    CorruptWireData(&'static str),

    /// File store open/read/write/stat failure.
    #[error("file i/o: {0}")]
    Io(#[from] std::io::Error),
}
