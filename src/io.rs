use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom};

use crate::Result;

/// Reads a single byte, or returns `None` if the stream is at its end.
pub(crate) fn peek_u8<R: Read>(mut reader: R) -> Result<Option<u8>> {
    let mut peek = [0];
    loop {
        match reader.read(&mut peek) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(peek[0])),
            Err(ref e) if e.kind() == IoErrorKind::Interrupted => {}
            Err(e) => return track_io!(Err(e)),
        }
    }
}

/// Advances `reader` by exactly `n` bytes without reading them.
pub(crate) fn skip<R: Seek>(mut reader: R, n: u64) -> Result<()> {
    if n != 0 {
        track_io!(reader.seek(SeekFrom::Current(n as i64)))?;
    }
    Ok(())
}
