extern crate clap;
extern crate pictor;

mod atlas;
mod commands;
mod fill;
mod partition;
mod stroke;

use clap::*;
use commands::*;

use std::fs::File;
use std::io::{stderr, stdout, Write};

fn main() {
    env_logger::init();

    let matches = App::new("Pictor command-line interface")
        .version("0.1")
        .about("Path partitioning and GPU attribute data inspector")
        .subcommand(
            SubCommand::with_name("partition")
                .about("Partitions a procedurally generated path and prints the subset tree")
                .arg(
                    Arg::with_name("POINTS")
                        .short("p")
                        .long("points")
                        .help("Number of points in the generated path (200 by default)")
                        .value_name("POINTS")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("CLIP")
                        .short("c")
                        .long("clip")
                        .help("Culls against the half plane x >= CLIP before reporting")
                        .value_name("CLIP")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("stroke")
                .about("Generates stroke attribute data and prints per-style sizes")
                .arg(
                    Arg::with_name("POINTS")
                        .short("p")
                        .long("points")
                        .help("Number of points in the generated path (200 by default)")
                        .value_name("POINTS")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("THRESH")
                        .short("t")
                        .long("thresh")
                        .help("Rounded join/cap tessellation threshold (0.1 by default)")
                        .value_name("THRESH")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("fill")
                .about("Generates fill attribute data and prints the winding chunk table")
                .arg(
                    Arg::with_name("QUADS")
                        .short("q")
                        .long("quads")
                        .help("Number of quads in the generated triangulation (120 by default)")
                        .value_name("QUADS")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("atlas")
                .about("Packs random rectangles into an atlas and prints statistics")
                .arg(
                    Arg::with_name("WIDTH")
                        .long("width")
                        .help("Atlas width (1024 by default)")
                        .value_name("WIDTH")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("HEIGHT")
                        .long("height")
                        .help("Atlas height (1024 by default)")
                        .value_name("HEIGHT")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("COUNT")
                        .short("n")
                        .long("count")
                        .help("Number of rectangles to pack (500 by default)")
                        .value_name("COUNT")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("SEED")
                        .long("seed")
                        .help("Seed of the rectangle size generator (0 by default)")
                        .value_name("SEED")
                        .takes_value(true),
                ),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Sets the output file to use")
                .value_name("FILE")
                .short("o")
                .long("output")
                .takes_value(true)
                .required(false),
        )
        .get_matches();

    let mut output: Box<dyn Write> = Box::new(stdout());
    if let Some(output_file) = matches.value_of("OUTPUT") {
        if let Ok(file) = File::create(output_file) {
            output = Box::new(file);
        } else {
            writeln!(&mut stderr(), "Cannot create file {}", output_file).unwrap();
            return;
        }
    }

    if let Some(partition_matches) = matches.subcommand_matches("partition") {
        let cmd = PartitionCmd {
            points: get_usize(partition_matches, "POINTS", 200),
            clip_x: partition_matches
                .value_of("CLIP")
                .and_then(|s| s.parse().ok()),
            output,
        };
        partition::partition(cmd).unwrap();
    } else if let Some(stroke_matches) = matches.subcommand_matches("stroke") {
        let cmd = StrokeCmd {
            points: get_usize(stroke_matches, "POINTS", 200),
            thresh: get_f32(stroke_matches, "THRESH", 0.1),
            output,
        };
        stroke::stroke(cmd).unwrap();
    } else if let Some(fill_matches) = matches.subcommand_matches("fill") {
        let cmd = FillCmd {
            quads: get_usize(fill_matches, "QUADS", 120),
            output,
        };
        fill::fill(cmd).unwrap();
    } else if let Some(atlas_matches) = matches.subcommand_matches("atlas") {
        let cmd = AtlasCmd {
            width: get_i32(atlas_matches, "WIDTH", 1024),
            height: get_i32(atlas_matches, "HEIGHT", 1024),
            count: get_usize(atlas_matches, "COUNT", 500),
            seed: get_usize(atlas_matches, "SEED", 0) as u64,
            output,
        };
        atlas::atlas(cmd).unwrap();
    }
}
