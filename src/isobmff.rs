//! ISO BMFF boxes needed to locate the movie and track headers.
use std::fmt;
use std::io::{Read, Seek};
use std::str;
use byteorder::{BigEndian, ReadBytesExt};

use crate::io;
use crate::{ErrorKind, Result};

/// Box header: a 32-bit big-endian size followed by a four-character type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoxHeader {
    /// Size of the whole box in bytes, including this header.
    pub size: u32,

    /// Type of the box.
    pub kind: BoxType,
}
impl BoxHeader {
    /// Size of the header itself in bytes.
    pub const SIZE: u32 = 8;

    /// Reads a box header from `reader`.
    ///
    /// The "extends to end of file" (`size == 0`) and "64-bit size follows" (`size == 1`)
    /// forms are reported as `ErrorKind::Unsupported`.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let size = track_io!(reader.read_u32::<BigEndian>())?;
        let kind = track!(BoxType::read_from(&mut reader))?;
        track_assert_ne!(size, 1, ErrorKind::Unsupported, "kind={:?}", kind);
        track_assert_ne!(size, 0, ErrorKind::Unsupported, "kind={:?}", kind);
        track_assert!(size >= Self::SIZE, ErrorKind::InvalidInput, "size={:?}, kind={:?}", size, kind);
        Ok(BoxHeader { size, kind })
    }

    /// Reads the next box header, or returns `None` if `reader` is at a clean end of stream.
    ///
    /// The end of the stream in the middle of a header is an error.
    pub fn read_next<R: Read>(mut reader: R) -> Result<Option<Self>> {
        match track!(io::peek_u8(&mut reader))? {
            None => Ok(None),
            Some(b) => {
                let header = track!(Self::read_from((&[b][..]).chain(reader)))?;
                Ok(Some(header))
            }
        }
    }

    /// Size of the payload following the header.
    pub fn data_size(&self) -> u32 {
        self.size - Self::SIZE
    }
}

/// Four-character box type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxType(pub [u8; 4]);
impl BoxType {
    /// Reads a box type from `reader`.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = [0; 4];
        track_io!(reader.read_exact(&mut buf[..]))?;
        Ok(BoxType(buf))
    }
}
impl fmt::Debug for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Ok(s) = str::from_utf8(&self.0) {
            write!(f, "BoxType(b{:?})", s)
        } else {
            write!(f, "BoxType({:?})", self.0)
        }
    }
}

/// Unsigned 16.16 fixed-point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fixed16_16(pub u32);
impl Fixed16_16 {
    /// Returns the integer part (the upper 16 bits).
    pub fn integer(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Returns the fractional part (the lower 16 bits).
    pub fn fraction(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let n = track_io!(reader.read_u32::<BigEndian>())?;
        Ok(Fixed16_16(n))
    }
}

/// Movie Header Box.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MvhdBox {
    /// Number of time units per second.
    pub timescale: u32,

    /// Duration of the movie in `timescale` units.
    pub duration: u64,
}
impl MvhdBox {
    /// Box type (`mvhd`).
    pub const TYPE: BoxType = BoxType(*b"mvhd");

    const V0_LAYOUT_SIZE: u32 = 12 + 4 + 4;
    const V1_LAYOUT_SIZE: u32 = 4 + 16 + 4 + 8;

    /// Reads the payload of the box described by `header` from `reader`.
    ///
    /// On success `reader` is positioned at the end of the box,
    /// whatever trailing fields it declares.
    pub fn read_from<R: Read + Seek>(mut reader: R, header: &BoxHeader) -> Result<Self> {
        let data_size = header.data_size();
        track_assert!(data_size >= Self::V0_LAYOUT_SIZE, ErrorKind::InvalidInput, "data_size={:?}", data_size);

        let version = track_io!(reader.read_u8())?;
        let _flags = track_io!(reader.read_u24::<BigEndian>())?;
        let layout_size;
        let timescale;
        let duration;
        if version == 0 {
            let _ = track_io!(reader.read_u64::<BigEndian>())?; // creation/modification time
            timescale = track_io!(reader.read_u32::<BigEndian>())?;
            duration = u64::from(track_io!(reader.read_u32::<BigEndian>())?);
            layout_size = Self::V0_LAYOUT_SIZE;
        } else if version == 1 {
            track_assert!(data_size >= Self::V1_LAYOUT_SIZE, ErrorKind::InvalidInput, "data_size={:?}", data_size);
            let _ = track_io!(reader.read_exact(&mut [0; 16]))?; // creation/modification time
            timescale = track_io!(reader.read_u32::<BigEndian>())?;
            duration = track_io!(reader.read_u64::<BigEndian>())?;
            layout_size = Self::V1_LAYOUT_SIZE;
        } else {
            track_panic!(ErrorKind::Unsupported, "mvhd version={}", version);
        }
        track!(io::skip(&mut reader, u64::from(data_size - layout_size)))?;
        Ok(MvhdBox {
            timescale,
            duration,
        })
    }
}

/// Track Header Box.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TkhdBox {
    /// Identifier of the track.
    pub track_id: u32,

    /// Duration of the track in the movie time scale.
    pub duration: u64,

    /// Presentation width.
    pub width: Fixed16_16,

    /// Presentation height.
    pub height: Fixed16_16,
}
impl TkhdBox {
    /// Box type (`tkhd`).
    pub const TYPE: BoxType = BoxType(*b"tkhd");

    const V0_LAYOUT_SIZE: u32 = 12 + 4 + 4 + 4 + 52 + 4 + 4;
    const V1_LAYOUT_SIZE: u32 = 4 + 16 + 4 + 4 + 8 + 52 + 4 + 4;

    /// Reads the payload of the box described by `header` from `reader`.
    ///
    /// On success `reader` is positioned at the end of the box.
    pub fn read_from<R: Read + Seek>(mut reader: R, header: &BoxHeader) -> Result<Self> {
        let data_size = header.data_size();
        track_assert!(data_size >= Self::V0_LAYOUT_SIZE, ErrorKind::InvalidInput, "data_size={:?}", data_size);

        let version = track_io!(reader.read_u8())?;
        let _flags = track_io!(reader.read_u24::<BigEndian>())?;
        let layout_size;
        let track_id;
        let duration;
        if version == 0 {
            let _ = track_io!(reader.read_u64::<BigEndian>())?; // creation/modification time
            track_id = track_io!(reader.read_u32::<BigEndian>())?;
            let _ = track_io!(reader.read_u32::<BigEndian>())?; // reserved
            duration = u64::from(track_io!(reader.read_u32::<BigEndian>())?);
            layout_size = Self::V0_LAYOUT_SIZE;
        } else if version == 1 {
            track_assert!(data_size >= Self::V1_LAYOUT_SIZE, ErrorKind::InvalidInput, "data_size={:?}", data_size);
            let _ = track_io!(reader.read_exact(&mut [0; 16]))?; // creation/modification time
            track_id = track_io!(reader.read_u32::<BigEndian>())?;
            let _ = track_io!(reader.read_u32::<BigEndian>())?; // reserved
            duration = track_io!(reader.read_u64::<BigEndian>())?;
            layout_size = Self::V1_LAYOUT_SIZE;
        } else {
            track_panic!(ErrorKind::Unsupported, "tkhd version={}", version);
        }

        // reserved, layer, alternate_group, volume, reserved and matrix
        let _ = track_io!(reader.read_exact(&mut [0; 52]))?;
        let width = track!(Fixed16_16::read_from(&mut reader))?;
        let height = track!(Fixed16_16::read_from(&mut reader))?;
        track!(io::skip(&mut reader, u64::from(data_size - layout_size)))?;
        Ok(TkhdBox {
            track_id,
            duration,
            width,
            height,
        })
    }
}

/// Track Box.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TrakBox {
    /// Track header, if the track has one.
    pub tkhd_box: Option<TkhdBox>,
}
impl TrakBox {
    /// Box type (`trak`).
    pub const TYPE: BoxType = BoxType(*b"trak");

    /// Reads the children of the box described by `header` from `reader`.
    ///
    /// If `strict` is `true`, a second `tkhd` box is an error.
    pub fn read_from<R: Read + Seek>(mut reader: R, header: &BoxHeader, strict: bool) -> Result<Self> {
        let mut tkhd_box = None;
        track!(each_boxes_within(&mut reader, "trak", header.data_size(), |header, reader| {
            if header.kind == TkhdBox::TYPE {
                let x = track!(TkhdBox::read_from(reader, header))?;
                log::debug!("[tkhd] {:?}", x);
                if tkhd_box.is_some() {
                    track_assert!(!strict, ErrorKind::InvalidInput, "Duplicate tkhd box");
                    log::warn!("Duplicate tkhd box; the last one is used");
                }
                tkhd_box = Some(x);
                Ok(())
            } else {
                track!(io::skip(reader, u64::from(header.data_size())))
            }
        }))?;
        Ok(TrakBox { tkhd_box })
    }
}

/// Movie Box.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MoovBox {
    /// Movie header, if the movie has one.
    pub mvhd_box: Option<MvhdBox>,

    /// Tracks in the order they appear in the file.
    pub trak_boxes: Vec<TrakBox>,
}
impl MoovBox {
    /// Box type (`moov`).
    pub const TYPE: BoxType = BoxType(*b"moov");

    /// Reads the children of the box described by `header` from `reader`.
    ///
    /// If `strict` is `true`, a second `mvhd` box (or a second `tkhd` box in a track) is an error.
    pub fn read_from<R: Read + Seek>(mut reader: R, header: &BoxHeader, strict: bool) -> Result<Self> {
        let mut mvhd_box = None;
        let mut trak_boxes = Vec::new();
        track!(each_boxes_within(&mut reader, "moov", header.data_size(), |header, reader| match &header.kind.0 {
            b"mvhd" => {
                let x = track!(MvhdBox::read_from(reader, header))?;
                log::debug!("[mvhd] {:?}", x);
                if mvhd_box.is_some() {
                    track_assert!(!strict, ErrorKind::InvalidInput, "Duplicate mvhd box");
                    log::warn!("Duplicate mvhd box; the last one is used");
                }
                mvhd_box = Some(x);
                Ok(())
            }
            b"trak" => {
                let x = track!(TrakBox::read_from(reader, header, strict))?;
                trak_boxes.push(x);
                Ok(())
            }
            _ => track!(io::skip(reader, u64::from(header.data_size()))),
        }))?;
        Ok(MoovBox {
            mvhd_box,
            trak_boxes,
        })
    }

    /// Folds a later `moov` box into this one.
    ///
    /// The tracks of `other` are appended and its movie header (if any) replaces ours.
    pub fn merge(&mut self, other: MoovBox) {
        if other.mvhd_box.is_some() {
            self.mvhd_box = other.mvhd_box;
        }
        self.trak_boxes.extend(other.trak_boxes);
    }
}

/// The top-level boxes of an MP4 file that this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct File {
    /// Movie box, if the file has one.
    pub moov_box: Option<MoovBox>,
}
impl File {
    /// Walks the top-level boxes of `reader` until the end of the stream.
    ///
    /// `reader` must be positioned at the start of the file.
    /// If `strict` is `true`, more than one `moov` box (or duplicate headers inside it) is an error.
    pub fn read_from<R: Read + Seek>(reader: R, strict: bool) -> Result<Self> {
        let mut moov_box: Option<MoovBox> = None;
        track!(each_boxes(reader, |header, reader| {
            if header.kind == MoovBox::TYPE {
                let x = track!(MoovBox::read_from(reader, header, strict))?;
                if let Some(ref mut first) = moov_box {
                    track_assert!(!strict, ErrorKind::InvalidInput, "Duplicate moov box");
                    log::warn!("Duplicate moov box; merged into the first one");
                    first.merge(x);
                } else {
                    moov_box = Some(x);
                }
                Ok(())
            } else {
                track!(io::skip(reader, u64::from(header.data_size())))
            }
        }))?;
        Ok(File { moov_box })
    }
}

fn each_boxes<R: Read + Seek, F>(mut reader: R, mut f: F) -> Result<()>
where
    F: FnMut(&BoxHeader, &mut R) -> Result<()>,
{
    while let Some(header) = track!(BoxHeader::read_next(&mut reader))? {
        log::trace!("{:?} size={}", header.kind, header.size);
        track!(f(&header, &mut reader))?;
    }
    Ok(())
}

fn each_boxes_within<R: Read + Seek, F>(reader: &mut R, parent: &str, budget: u32, mut f: F) -> Result<()>
where
    F: FnMut(&BoxHeader, &mut R) -> Result<()>,
{
    let mut consumed = 0;
    while consumed < budget {
        let remaining = budget - consumed;
        track_assert!(remaining >= BoxHeader::SIZE, ErrorKind::InvalidInput, "parent={:?}, remaining={:?}", parent, remaining);

        let header = track!(BoxHeader::read_from(&mut *reader))?;
        track_assert!(header.size <= remaining, ErrorKind::InvalidInput, "parent={:?}, header={:?}, remaining={:?}", parent, header, remaining);
        log::trace!("{}/{:?} size={}", parent, header.kind, header.size);

        track!(f(&header, &mut *reader))?;
        consumed += header.size;
    }
    Ok(())
}
