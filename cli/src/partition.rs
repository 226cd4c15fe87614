use std::io;

use log::info;
use pictor::math::vector;
use pictor::painter::partitioned_path::{
    GeometryInflation, PartitionedTessellatedPath, ScratchSpace, Subset,
};
use pictor::geom::Matrix3;

use crate::commands::{build_spiral, PartitionCmd};

pub fn partition(mut cmd: PartitionCmd) -> io::Result<()> {
    let path = build_spiral(cmd.points);
    info!(
        "built a spiral path: {} contours, {} segments",
        path.number_contours(),
        path.segments().len()
    );

    let partition = PartitionedTessellatedPath::new(&path);
    writeln!(cmd.output, "subsets: {}", partition.number_subsets())?;

    let mut leaves = 0;
    let mut max_depth = 0;
    let mut segments = 0;
    visit(&partition.root_subset(), 0, &mut |subset, depth| {
        if !subset.has_children() {
            leaves += 1;
            max_depth = max_depth.max(depth);
            segments += subset
                .segment_chains()
                .iter()
                .map(|c| c.segments.len())
                .sum::<usize>();
        }
    });
    writeln!(cmd.output, "leaves: {}", leaves)?;
    writeln!(cmd.output, "depth: {}", max_depth)?;
    writeln!(cmd.output, "leaf segments: {}", segments)?;

    visit(&partition.root_subset(), 0, &mut |subset, depth| {
        let bbox = subset.bounding_box();
        writeln!(
            cmd.output,
            "{:indent$}#{} [{:.2} {:.2}] x [{:.2} {:.2}] {} joins {} caps",
            "",
            subset.id().index(),
            bbox.min().x,
            bbox.max().x,
            bbox.min().y,
            bbox.max().y,
            subset.joins().len(),
            subset.caps().len(),
            indent = depth * 2,
        )
        .unwrap();
    });

    if let Some(x) = cmd.clip_x {
        let mut scratch = ScratchSpace::default();
        let mut selected = Vec::new();
        let n = partition.select_subsets(
            &mut scratch,
            &[[1.0, 0.0, -x]],
            &Matrix3::identity(),
            vector(1.0, 1.0),
            &GeometryInflation::default(),
            &mut selected,
        );
        writeln!(cmd.output, "selected against x >= {}: {} subsets", x, n)?;
        for id in &selected {
            writeln!(cmd.output, "  #{}", id.index())?;
        }
    }

    Ok(())
}

fn visit(subset: &Subset, depth: usize, callback: &mut impl FnMut(&Subset, usize)) {
    callback(subset, depth);
    if let Some((a, b)) = subset.children() {
        visit(&a, depth + 1, callback);
        visit(&b, depth + 1, callback);
    }
}
