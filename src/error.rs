use trackable::error::{ErrorKind as TrackableErrorKind, TrackableError};

/// This crate specific `Error` type.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(TrackableError<ErrorKind>);

/// Possible error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed box sizes or layouts (and duplicate boxes in strict mode).
    InvalidInput,

    /// Box features this crate does not handle (e.g., 64-bit sizes).
    Unsupported,

    /// The movie header, the first track or its track header is missing.
    UnusableContainer,

    /// The movie header declares a time scale of zero.
    ZeroTimescale,

    /// I/O failures of the underlying stream.
    Other,
}
impl TrackableErrorKind for ErrorKind {}
