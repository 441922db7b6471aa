extern crate clap;
#[macro_use]
extern crate trackable;
extern crate videohead;

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use clap::{App, Arg};
use trackable::error::Failure;
use videohead::isobmff::BoxHeader;

const CONTAINERS: &[&[u8; 4]] = &[b"moov", b"trak", b"mdia", b"minf", b"stbl", b"edts", b"udta"];

fn main() {
    let matches = App::new("dump_boxes")
        .about("Prints the box tree of an MP4 file")
        .arg(Arg::with_name("FILE").index(1).required(true))
        .get_matches();
    let path = matches.value_of("FILE").unwrap();

    let file = track_try_unwrap!(File::open(path).map_err(Failure::from_error));
    let mut reader = BufReader::new(file);
    while let Some(header) = track_try_unwrap!(BoxHeader::read_next(&mut reader)) {
        dump(&mut reader, &header, 0);
    }
}

fn dump<R: Read + Seek>(reader: &mut R, header: &BoxHeader, depth: usize) {
    println!("{:indent$}{:?} {} bytes", "", header.kind, header.size, indent = depth * 4);
    if CONTAINERS.contains(&&header.kind.0) {
        let mut consumed = 0;
        while consumed < header.data_size() {
            let child = track_try_unwrap!(BoxHeader::read_from(&mut *reader));
            dump(reader, &child, depth + 1);
            consumed += child.size;
        }
    } else {
        track_try_unwrap!(
            reader
                .seek(SeekFrom::Current(i64::from(header.data_size())))
                .map_err(Failure::from_error)
        );
    }
}
