use std::io;

use log::info;
use pictor::math::point;
use pictor::painter::filled_path::{self, FilledPath};
use pictor::path::{BoundaryChain, FillTessellation};

use crate::commands::FillCmd;

pub fn fill(mut cmd: FillCmd) -> io::Result<()> {
    let tess = build_strip(cmd.quads);
    let filled = FilledPath::new(&tess);
    info!("filled path: {} subsets", filled.number_subsets());

    let data = filled.painter_data(0);
    writeln!(cmd.output, "subsets: {}", filled.number_subsets())?;
    writeln!(
        cmd.output,
        "{:<8} {:>8} {:>10}",
        "chunk", "winding", "triangles"
    )?;
    for chunk in 0..data.number_index_chunks() {
        if chunk > filled_path::COMPLEMENT_NONZERO_CHUNK
            && chunk < filled_path::FILL_RULE_DATA_COUNT
        {
            // Reserved fill-rule slots hold no winding of their own.
            continue;
        }
        writeln!(
            cmd.output,
            "{:<8} {:>8} {:>10}",
            chunk,
            filled_path::winding_number_from_chunk(chunk),
            data.index_data_chunk(chunk).len() / 3,
        )?;
    }

    let fuzz = filled.aa_fuzz_painter_data(0);
    writeln!(cmd.output, "fuzz chunks: {}", fuzz.number_index_chunks())?;
    for chunk in 0..fuzz.number_index_chunks() {
        writeln!(
            cmd.output,
            "{:<8} {:>8} {:>10}",
            chunk,
            filled_path::winding_number_from_fuzz_chunk(chunk),
            fuzz.index_data_chunk(chunk).len() / 3,
        )?;
    }

    Ok(())
}

/// A horizontal strip of quads alternating between winding 1 and 2, with
/// a boundary chain at every winding change.
fn build_strip(quads: usize) -> FillTessellation {
    let mut tess = FillTessellation::new();
    for i in 0..quads.max(1) {
        let x = i as f32;
        let winding = 1 + (i % 2) as i32;
        let a = tess.add_point(point(x, 0.0));
        let b = tess.add_point(point(x + 1.0, 0.0));
        let c = tess.add_point(point(x + 1.0, 1.0));
        let d = tess.add_point(point(x, 1.0));
        tess.add_triangle([a, b, c], winding);
        tess.add_triangle([a, c, d], winding);
        tess.add_boundary_chain(BoundaryChain {
            point_indices: vec![b, c],
            winding,
            neighbor_winding: 3 - winding,
            closed: false,
        });
    }
    tess
}
