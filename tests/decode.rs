use std::io::{Cursor, Seek, SeekFrom, Write};
use byteorder::{BigEndian, WriteBytesExt};
use videohead::{Decoder, ErrorKind, Head};

fn atom(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<BigEndian>(8 + payload.len() as u32).unwrap();
    buf.write_all(kind).unwrap();
    buf.write_all(payload).unwrap();
    buf
}

fn mvhd(timescale: u32, duration: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 12];
    buf.write_u32::<BigEndian>(timescale).unwrap();
    buf.write_u32::<BigEndian>(duration).unwrap();
    buf.write_all(&[0; 80]).unwrap(); // rate, volume, matrix, pre_defined, next_track_ID
    atom(b"mvhd", &buf)
}

fn tkhd(track_id: u32, width: u32, height: u32) -> Vec<u8> {
    let mut buf = vec![0u8; 12];
    buf.write_u32::<BigEndian>(track_id).unwrap();
    buf.write_u32::<BigEndian>(0).unwrap();
    buf.write_u32::<BigEndian>(5000).unwrap();
    buf.write_all(&[0; 52]).unwrap();
    buf.write_u32::<BigEndian>(width).unwrap();
    buf.write_u32::<BigEndian>(height).unwrap();
    atom(b"tkhd", &buf)
}

fn trak(children: &[Vec<u8>]) -> Vec<u8> {
    atom(b"trak", &children.concat())
}

fn moov(children: &[Vec<u8>]) -> Vec<u8> {
    atom(b"moov", &children.concat())
}

fn movie(boxes: &[Vec<u8>]) -> Cursor<Vec<u8>> {
    Cursor::new(boxes.concat())
}

fn video_track() -> Vec<u8> {
    trak(&[
        tkhd(1, 0x0190_0000, 0x00F0_0000),
        atom(b"mdia", &[0; 64]),
    ])
}

#[test]
fn decode_works() {
    let mut reader = movie(&[
        atom(b"ftyp", b"isom\0\0\x02\0isomiso2"),
        moov(&[mvhd(1000, 5000), video_track()]),
        atom(b"mdat", &[0x11; 512]),
    ]);
    let head = videohead::decode(&mut reader).unwrap();
    assert_eq!(
        head,
        Head {
            duration_nanos: 5_000_000_000,
            width: 400,
            height: 240,
        }
    );
}

#[test]
fn moov_after_mdat_works() {
    let mut reader = movie(&[
        atom(b"ftyp", b"mp42\0\0\0\0"),
        atom(b"mdat", &[0x22; 4096]),
        atom(b"free", &[]),
        moov(&[atom(b"udta", &[0; 10]), video_track(), mvhd(600, 1200)]),
    ]);
    let head = videohead::decode(&mut reader).unwrap();
    assert_eq!(head.duration_nanos, 2_000_000_000);
    assert_eq!((head.width, head.height), (400, 240));
}

#[test]
fn missing_moov_is_unusable() {
    let mut reader = movie(&[atom(b"ftyp", b"isom\0\0\0\0"), atom(b"mdat", &[0; 32])]);
    let e = videohead::decode(&mut reader).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::UnusableContainer);
}

#[test]
fn empty_stream_is_unusable() {
    let e = videohead::decode(Cursor::new(Vec::new())).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::UnusableContainer);
}

#[test]
fn moov_without_trak_is_unusable() {
    let mut reader = movie(&[moov(&[mvhd(1000, 5000)])]);
    let e = videohead::decode(&mut reader).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::UnusableContainer);
}

#[test]
fn first_trak_without_tkhd_is_unusable() {
    let mut reader = movie(&[moov(&[
        mvhd(1000, 5000),
        trak(&[atom(b"mdia", &[0; 8])]),
        video_track(),
    ])]);
    let e = videohead::decode(&mut reader).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::UnusableContainer);
}

#[test]
fn first_track_is_used() {
    let mut reader = movie(&[moov(&[
        mvhd(1000, 5000),
        trak(&[tkhd(1, 0x0780_0000, 0x0438_0000)]),
        trak(&[tkhd(2, 0, 0)]),
    ])]);
    let head = videohead::decode(&mut reader).unwrap();
    assert_eq!((head.width, head.height), (1920, 1080));
}

#[test]
fn zero_timescale_is_reported() {
    let mut reader = movie(&[moov(&[mvhd(0, 5000), video_track()])]);
    let e = videohead::decode(&mut reader).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::ZeroTimescale);
}

#[test]
fn truncated_moov_is_stream_fault() {
    let mut bytes = moov(&[mvhd(1000, 5000), video_track()]);
    bytes.truncate(200); // cuts the tkhd box short
    let e = videohead::decode(Cursor::new(bytes)).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::Other);
}

#[test]
fn truncated_top_level_header_is_stream_fault() {
    let mut bytes = moov(&[mvhd(1000, 5000), video_track()]);
    bytes.extend_from_slice(&[0, 0, 0, 16, b'f']);
    let e = videohead::decode(Cursor::new(bytes)).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::Other);
}

#[test]
fn large_size_is_unsupported() {
    let mut bytes = vec![0u8, 0, 0, 1];
    bytes.extend_from_slice(b"mdat");
    bytes.write_u64::<BigEndian>(16).unwrap();
    let e = videohead::decode(Cursor::new(bytes)).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::Unsupported);
}

#[test]
fn decode_is_repeatable() {
    let mut reader = movie(&[
        atom(b"ftyp", b"isom\0\0\0\0"),
        moov(&[mvhd(90_000, 123_456), video_track()]),
    ]);
    let first = videohead::decode(&mut reader).unwrap();
    reader.seek(SeekFrom::Start(0)).unwrap();
    let second = videohead::decode(&mut reader).unwrap();
    assert_eq!(first, second);
}

#[test]
fn duplicate_mvhd_depends_on_strictness() {
    let bytes = moov(&[mvhd(1000, 1000), mvhd(1000, 3000), video_track()]);

    let head = Decoder::new().decode(Cursor::new(bytes.clone())).unwrap();
    assert_eq!(head.duration_nanos, 3_000_000_000);

    let e = Decoder::new()
        .strict(true)
        .decode(Cursor::new(bytes))
        .err()
        .unwrap();
    assert_eq!(*e.kind(), ErrorKind::InvalidInput);
}

#[test]
fn second_moov_depends_on_strictness() {
    let mut reader = movie(&[
        moov(&[trak(&[tkhd(1, 0x0010_0000, 0x0020_0000)])]),
        moov(&[mvhd(10, 25), video_track()]),
    ]);
    let head = Decoder::new().decode(&mut reader).unwrap();
    assert_eq!(head.duration_nanos, 2_500_000_000);
    assert_eq!((head.width, head.height), (16, 32));

    reader.seek(SeekFrom::Start(0)).unwrap();
    let e = Decoder::new().strict(true).decode(&mut reader).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::InvalidInput);
}

#[test]
fn decode_file_works() {
    let path = std::env::temp_dir().join(format!("videohead-{}.mp4", std::process::id()));
    std::fs::write(&path, movie(&[moov(&[mvhd(1000, 5000), video_track()])]).into_inner()).unwrap();
    let result = Decoder::new().decode_file(&path);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(result.unwrap().duration_nanos, 5_000_000_000);

    let e = Decoder::new().decode_file(&path).err().unwrap();
    assert_eq!(*e.kind(), ErrorKind::Other);
}
