use std::io;

use log::info;
use pictor::painter::attribute_data::PainterAttributeData;
use pictor::painter::StrokedPath;

use crate::commands::{build_spiral, StrokeCmd};

pub fn stroke(mut cmd: StrokeCmd) -> io::Result<()> {
    let path = build_spiral(cmd.points);
    let stroked = StrokedPath::new(&path);
    let root = stroked.partition().root_subset().id();
    info!(
        "stroking {} subsets, {} depth values at the root",
        stroked.partition().number_subsets(),
        stroked.number_depths(root)
    );

    let rows: Vec<(&str, std::rc::Rc<PainterAttributeData>)> = vec![
        ("edges", stroked.edges(root)),
        ("bevel joins", stroked.bevel_joins(root)),
        ("miter-clip joins", stroked.miter_clip_joins(root)),
        ("miter joins", stroked.miter_joins(root)),
        ("miter-bevel joins", stroked.miter_bevel_joins(root)),
        ("rounded joins", stroked.rounded_joins(root, cmd.thresh)),
        ("arc-rounded joins", stroked.arc_rounded_joins(root)),
        ("square caps", stroked.square_caps(root)),
        ("flat caps", stroked.flat_caps(root)),
        ("adjustable caps", stroked.adjustable_caps(root)),
        ("rounded caps", stroked.rounded_caps(root, cmd.thresh)),
        ("arc-rounded caps", stroked.arc_rounded_caps(root)),
    ];

    writeln!(
        cmd.output,
        "{:<20} {:>10} {:>10} {:>10}",
        "style", "attributes", "indices", "triangles"
    )?;
    for (name, data) in &rows {
        writeln!(
            cmd.output,
            "{:<20} {:>10} {:>10} {:>10}",
            name,
            data.attribute_data().len(),
            data.index_data().len(),
            data.index_data().len() / 3,
        )?;
    }

    Ok(())
}
