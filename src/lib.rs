//! This is a library for reading the pixel dimensions and the duration of an MP4 file.
//!
//! Only the `moov`, `mvhd`, `trak` and `tkhd` boxes are inspected.
//! Every other box (including `mdat`) is skipped by seeking past it,
//! so the media samples are never read.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> videohead::Result<()> {
//! let head = videohead::Decoder::new().decode_file("movie.mp4")?;
//! println!("width: {}px height: {}px", head.width, head.height);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - [ISO Base Media File Format (ISO/IEC 14496-12)]
//!
//! [ISO Base Media File Format (ISO/IEC 14496-12)]: https://www.iso.org/standard/68960.html
#![warn(missing_docs)]
#[macro_use]
extern crate trackable;

macro_rules! track_io {
    ($expr:expr) => {
        $expr.map_err(|e: ::std::io::Error| {
            use trackable::error::ErrorKindExt;
            track!($crate::Error::from($crate::ErrorKind::Other.cause(e)))
        })
    };
}

pub use error::{Error, ErrorKind};
pub use head::{Decoder, Head};

pub mod isobmff;

mod error;
mod head;
mod io;

/// This crate specific `Result` type.
pub type Result<T> = std::result::Result<T, Error>;

/// Decodes the dimensions and the duration of the MP4 stream `reader` with the default options.
///
/// The stream must be positioned at the start of the file.
/// This is equivalent to `Decoder::new().decode(reader)`.
pub fn decode<R: std::io::Read + std::io::Seek>(reader: R) -> Result<Head> {
    track!(Decoder::new().decode(reader))
}
