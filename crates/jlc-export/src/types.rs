use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Board snapshot ──────────────────────────────────────────────────

/// Read-only snapshot of a loaded board, taken once per export run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub info: BoardInfo,
    /// Footprint placements in the board's native order.
    pub footprints: Vec<Footprint>,
}

/// File header details, only used for the run log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_version: Option<String>,
}

// ─── Footprint ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub reference: String,
    pub value: String,
    /// Library item name without the `Library:` nickname, e.g. `R_0603_1608Metric`.
    pub lib_item_name: String,
    /// Absolute position in nanometres.
    pub position: [i64; 2],
    /// Absolute orientation in degrees.
    #[serde(default)]
    pub orientation: f64,
    /// Copper layer name, e.g. `F.Cu`.
    pub layer: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub graphics: Vec<GraphicItem>,
}

impl Footprint {
    /// Text items among the footprint's drawable children.
    pub fn texts(&self) -> impl Iterator<Item = &GraphicItem> {
        self.graphics
            .iter()
            .filter(|item| item.kind == GraphicKind::Text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicKind {
    Text,
    Shape,
}

/// A drawable child of a footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicItem {
    pub kind: GraphicKind,
    /// Text content; empty for shapes.
    #[serde(default)]
    pub text: String,
    /// Absolute position in nanometres.
    pub position: [i64; 2],
    /// Absolute text angle in degrees.
    #[serde(default)]
    pub angle: f64,
}

// ─── Side helper ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
}

impl Side {
    /// Only the front copper layer is top; everything else collapses to bottom.
    pub fn from_layer(layer: &str) -> Self {
        if layer == "F.Cu" {
            Side::Top
        } else {
            Side::Bottom
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "T",
            Side::Bottom => "B",
        }
    }
}

// ─── Export records ──────────────────────────────────────────────────

/// One (Comment, Designator, Footprint) triple fed to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomEntry {
    pub comment: String,
    pub designator: String,
    pub footprint: String,
}

/// Aggregated BOM line: every designator sharing one comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomRow {
    pub comment: String,
    pub designators: Vec<String>,
    pub footprint: String,
}

impl BomRow {
    /// Designators joined with `,` in the order they were aggregated.
    pub fn designator_list(&self) -> String {
        self.designators.join(",")
    }
}

/// One physical placement in the pick-and-place file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PosRow {
    #[serde(rename = "Designator")]
    pub designator: String,
    #[serde(rename = "Mid X")]
    pub mid_x: String,
    #[serde(rename = "Mid Y")]
    pub mid_y: String,
    #[serde(rename = "Layer")]
    pub layer: String,
    #[serde(rename = "Rotation")]
    pub rotation: String,
}
