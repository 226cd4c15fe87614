use std::io;

use log::info;
use pictor::spatial::geom::math::int_size;
use pictor::spatial::RectAtlas;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::commands::AtlasCmd;

pub fn atlas(mut cmd: AtlasCmd) -> io::Result<()> {
    let mut atlas = RectAtlas::new(int_size(cmd.width, cmd.height));
    let mut rng = StdRng::seed_from_u64(cmd.seed);

    let mut placed = 0;
    let mut rejected = 0;
    let mut area = 0i64;
    for _ in 0..cmd.count {
        let w = rng.gen_range(4, 128);
        let h = rng.gen_range(4, 128);
        let location = atlas.add_rectangle(int_size(w, h));
        if location == RectAtlas::FAILURE {
            rejected += 1;
        } else {
            placed += 1;
            area += (w * h) as i64;
        }
    }
    info!("packed {} of {} rectangles", placed, cmd.count);

    let capacity = cmd.width as i64 * cmd.height as i64;
    writeln!(cmd.output, "atlas: {}x{}", cmd.width, cmd.height)?;
    writeln!(cmd.output, "placed: {}", placed)?;
    writeln!(cmd.output, "rejected: {}", rejected)?;
    writeln!(
        cmd.output,
        "occupancy: {:.1}%",
        100.0 * area as f64 / capacity as f64
    )?;

    Ok(())
}
