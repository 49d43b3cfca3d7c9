//! Per-component field derivation: footprint names, layer codes, millimetre
//! positions and rotation strings in the form the assembly house expects.

use crate::types::*;
use crate::ExportOptions;
use once_cell::sync::Lazy;
use regex::Regex;

/// Nanometres per millimetre.
const NM_PER_MM: f64 = 1_000_000.0;

static METRIC_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_\d+Metric$").expect("metric suffix pattern"));

/// Strip a trailing `_<digits>Metric` so metric/imperial variants share one name.
pub fn strip_metric_suffix(name: &str) -> &str {
    match METRIC_SUFFIX.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

/// Convert a board-internal coordinate to millimetres along one axis.
pub fn to_mm(nm: i64, direction: i8) -> f64 {
    nm as f64 / NM_PER_MM * f64::from(direction)
}

/// Decimal rendering used for every numeric CSV field.
///
/// Integral values keep one decimal place (`1.0`), everything else uses the
/// shortest representation that round-trips. The sign of zero is kept, so a
/// flipped zero coordinate prints as `-0.0`.
pub fn format_decimal(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

pub fn format_mm(nm: i64, direction: i8) -> String {
    format!("{}mm", format_decimal(to_mm(nm, direction)))
}

/// A component with every output field derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub designator: String,
    pub comment: String,
    pub footprint: String,
    pub side: Side,
    pub position: [i64; 2],
    pub rotation: f64,
}

impl Placement {
    pub fn from_footprint(fp: &Footprint) -> Self {
        Self {
            designator: fp.reference.clone(),
            comment: fp.value.clone(),
            footprint: strip_metric_suffix(&fp.lib_item_name).to_string(),
            side: Side::from_layer(&fp.layer),
            position: fp.position,
            rotation: fp.orientation,
        }
    }

    /// TestPoint parts and unnamed parts never reach either output.
    pub fn is_excluded(&self, opts: &ExportOptions) -> bool {
        self.designator.is_empty() || self.comment == opts.excluded_value
    }

    pub fn bom_entry(&self) -> BomEntry {
        BomEntry {
            comment: self.comment.clone(),
            designator: self.designator.clone(),
            footprint: self.footprint.clone(),
        }
    }

    pub fn pos_row(&self, opts: &ExportOptions) -> PosRow {
        PosRow {
            designator: self.designator.clone(),
            mid_x: format_mm(self.position[0], opts.x_direction),
            mid_y: format_mm(self.position[1], opts.y_direction),
            layer: self.side.as_str().to_string(),
            rotation: format_decimal(self.rotation),
        }
    }
}
