extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate trackable;
extern crate videohead;

use clap::{App, Arg};
use videohead::Decoder;

fn main() {
    env_logger::init();
    let matches = App::new("videohead")
        .about("Prints the dimensions of an MP4 file")
        .arg(Arg::with_name("FILE").index(1).required(true))
        .arg(
            Arg::with_name("STRICT")
                .long("strict")
                .help("Rejects duplicate moov, mvhd and tkhd boxes"),
        )
        .arg(
            Arg::with_name("DURATION")
                .long("duration")
                .help("Also prints the duration in nanoseconds"),
        )
        .get_matches();
    let path = matches.value_of("FILE").unwrap();

    let mut decoder = Decoder::new();
    decoder.strict(matches.is_present("STRICT"));
    let head = track_try_unwrap!(decoder.decode_file(path));
    println!("width: {}px height: {}px", head.width, head.height);
    if matches.is_present("DURATION") {
        println!("duration: {}ns", head.duration_nanos);
    }
}
