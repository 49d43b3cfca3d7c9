use crate::bom;
use crate::error::ExportError;
use crate::normalize::Placement;
use crate::subunit;
use crate::types::*;
use crate::writer::{self, OutputSink};
use crate::ExportOptions;
use log::{debug, info};
use serde::Serialize;

/// Flat, not yet aggregated export records in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    pub bom_entries: Vec<BomEntry>,
    pub pos_rows: Vec<PosRow>,
    /// Footprints left out by the exclusion rule.
    pub excluded: Vec<String>,
}

/// Walk the board and produce one BOM entry and one POS row per placement.
///
/// Sub-units of a footprint come first and are kept even when the footprint
/// itself is excluded.
pub fn collect(board: &Board, opts: &ExportOptions) -> Collected {
    let mut out = Collected::default();

    for fp in &board.footprints {
        for unit in subunit::expand(fp) {
            debug!("{}: sub-unit {} ({})", fp.reference, unit.designator, unit.comment);
            out.bom_entries.push(unit.bom_entry());
            out.pos_rows.push(unit.pos_row(opts));
        }

        let placement = Placement::from_footprint(fp);
        if placement.is_excluded(opts) {
            debug!("Excluding '{}' ({})", placement.designator, placement.comment);
            out.excluded.push(placement.designator);
            continue;
        }
        out.bom_entries.push(placement.bom_entry());
        out.pos_rows.push(placement.pos_row(opts));
    }

    out
}

/// Outcome of one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub bom_rows: usize,
    pub pos_rows: usize,
    pub excluded: Vec<String>,
    pub skipped_rows: usize,
}

/// Run the whole pipeline for one board and write both CSV files into `sink`.
pub fn run_export(
    board: &Board,
    sink: &mut dyn OutputSink,
    opts: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let collected = collect(board, opts);
    let rows = bom::aggregate(&collected.bom_entries);

    let mut skipped = writer::write_bom(sink, &opts.bom_file, &rows)?;
    skipped += writer::write_pos(sink, &opts.pos_file, &collected.pos_rows)?;

    info!(
        "Exported {} BOM rows and {} placements ({} excluded, {} skipped)",
        rows.len(),
        collected.pos_rows.len(),
        collected.excluded.len(),
        skipped
    );

    Ok(ExportSummary {
        bom_rows: rows.len(),
        pos_rows: collected.pos_rows.len(),
        excluded: collected.excluded,
        skipped_rows: skipped,
    })
}
