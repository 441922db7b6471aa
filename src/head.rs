use std::fs;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::time::Duration;

use crate::isobmff::File;
use crate::{ErrorKind, Result};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Dimensions and duration of a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Head {
    /// Duration of the movie in nanoseconds.
    pub duration_nanos: i64,

    /// Width of the first track in pixels.
    pub width: u32,

    /// Height of the first track in pixels.
    pub height: u32,
}
impl Head {
    /// Builds a `Head` from the boxes collected by [`File::read_from`].
    ///
    /// The movie header, the first track and its track header must all be present.
    /// Otherwise `ErrorKind::UnusableContainer` is returned, whichever one is missing.
    pub fn from_file(file: &File) -> Result<Self> {
        let found = file.moov_box.as_ref().and_then(|moov| {
            let mvhd = moov.mvhd_box.as_ref()?;
            let tkhd = moov.trak_boxes.first()?.tkhd_box.as_ref()?;
            Some((mvhd, tkhd))
        });
        let (mvhd, tkhd) = track_assert_some!(found, ErrorKind::UnusableContainer);
        track_assert_ne!(mvhd.timescale, 0, ErrorKind::ZeroTimescale);

        let nanos = u128::from(mvhd.duration) * NANOS_PER_SEC / u128::from(mvhd.timescale);
        track_assert!(nanos <= i64::MAX as u128, ErrorKind::InvalidInput, "nanos={:?}", nanos);
        Ok(Head {
            duration_nanos: nanos as i64,
            width: u32::from(tkhd.width.integer()),
            height: u32::from(tkhd.height.integer()),
        })
    }

    /// Returns the duration of the movie.
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration_nanos as u64)
    }
}

/// MP4 header decoder.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> videohead::Result<()> {
/// use videohead::Decoder;
///
/// let head = Decoder::new().strict(true).decode_file("movie.mp4")?;
/// println!("{:?}", head.duration());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    strict: bool,
}
impl Decoder {
    /// Makes a new `Decoder` with the default (lenient) options.
    pub fn new() -> Self {
        Decoder { strict: false }
    }

    /// Sets whether duplicate `moov`, `mvhd` and `tkhd` boxes are rejected.
    ///
    /// If `false` (the default), later boxes replace earlier ones and tracks
    /// of a later `moov` box are appended.
    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    /// Decodes the MP4 stream `reader`, which must be positioned at the start of the file.
    ///
    /// The stream is never closed by this method.
    pub fn decode<R: Read + Seek>(&self, reader: R) -> Result<Head> {
        let file = track!(File::read_from(reader, self.strict))?;
        let head = track!(Head::from_file(&file))?;
        log::debug!("{:?}", head);
        Ok(head)
    }

    /// Opens and decodes the MP4 file at `path`.
    pub fn decode_file<P: AsRef<Path>>(&self, path: P) -> Result<Head> {
        let path = path.as_ref();
        let file = track_io!(fs::File::open(path))?;
        let head = track!(self.decode(BufReader::new(file)), "path={:?}", path)?;
        Ok(head)
    }
}
