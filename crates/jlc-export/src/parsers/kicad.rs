use crate::error::ExportError;
use crate::parsers::kicad_sexpr::{self, SExpr};
use crate::types::*;
use log::debug;
use std::collections::HashMap;
use std::f64::consts::PI;

/// Parse a KiCad .kicad_pcb file from bytes into a board snapshot.
pub fn parse(data: &[u8]) -> Result<Board, ExportError> {
    let root = kicad_sexpr::parse(data)
        .map_err(|e| ExportError::ParseError(format!("S-expression parse error: {e}")))?;

    if root.tag() != Some("kicad_pcb") {
        return Err(ExportError::ParseError("not a kicad_pcb file".to_string()));
    }

    let info = BoardInfo {
        version: root.value("version").map(str::to_string),
        generator: root.value("generator").map(str::to_string),
        generator_version: root.value("generator_version").map(str::to_string),
    };

    // KiCad 6+ writes `footprint`, KiCad 5 wrote `module`; keep file order.
    let footprints: Vec<Footprint> = root
        .children()
        .iter()
        .filter(|c| matches!(c.tag(), Some("footprint" | "module")))
        .map(parse_footprint)
        .collect();

    debug!("Parsed {} footprints", footprints.len());
    Ok(Board { info, footprints })
}

// ─── Units ───────────────────────────────────────────────────────────

/// Board files store millimetres; the snapshot keeps integer nanometres.
fn mm_to_nm(mm: f64) -> i64 {
    (mm * 1_000_000.0).round() as i64
}

fn get_layer_name(node: &SExpr) -> String {
    node.value("layer").unwrap_or("").to_string()
}

fn parse_at(node: &SExpr) -> (f64, f64, f64) {
    let at_node = node.find("at");
    (
        at_node.and_then(|n| n.f64_at(0)).unwrap_or(0.0),
        at_node.and_then(|n| n.f64_at(1)).unwrap_or(0.0),
        at_node.and_then(|n| n.f64_at(2)).unwrap_or(0.0),
    )
}

// ─── Footprints ──────────────────────────────────────────────────────

fn parse_footprint(node: &SExpr) -> Footprint {
    let (fp_x, fp_y, fp_angle) = parse_at(node);

    // "Resistor_SMD:R_0402_1005Metric" -> "R_0402_1005Metric"
    let lib_id = node.atom_at(0).unwrap_or("");
    let lib_item_name = lib_id
        .split_once(':')
        .map_or(lib_id, |(_, item)| item)
        .to_string();

    let mut reference = String::new();
    let mut value = String::new();
    let mut properties: HashMap<String, String> = HashMap::new();
    let mut graphics = Vec::new();

    for child in node.children() {
        let tag = match child.tag() {
            Some(t) => t,
            None => continue,
        };

        match tag {
            "fp_text" => {
                let text_type = child.atom_at(0).unwrap_or("");
                let text_val = child.atom_at(1).unwrap_or("");
                match text_type {
                    "reference" => reference = text_val.to_string(),
                    "value" => value = text_val.to_string(),
                    _ => graphics.push(parse_fp_text(child, fp_x, fp_y, fp_angle)),
                }
            }
            "property" => {
                // KiCad 8+ stores reference and value as properties too
                let prop_name = child.atom_at(0).unwrap_or("");
                let prop_val = child.atom_at(1).unwrap_or("");
                match prop_name {
                    "Reference" => reference = prop_val.to_string(),
                    "Value" => value = prop_val.to_string(),
                    _ => {
                        properties.insert(prop_name.to_string(), prop_val.to_string());
                    }
                }
            }
            "fp_line" | "fp_rect" | "fp_circle" | "fp_arc" | "fp_poly" | "fp_curve" => {
                graphics.push(parse_fp_shape(child, fp_x, fp_y, fp_angle));
            }
            _ => {}
        }
    }

    Footprint {
        reference,
        value,
        lib_item_name,
        position: [mm_to_nm(fp_x), mm_to_nm(fp_y)],
        orientation: fp_angle,
        layer: get_layer_name(node),
        properties,
        graphics,
    }
}

/// User text; hidden text still counts as a drawable child.
///
/// The `at` offset is footprint-relative but the stored angle is already absolute.
fn parse_fp_text(node: &SExpr, fp_x: f64, fp_y: f64, fp_angle: f64) -> GraphicItem {
    let (local_x, local_y, text_angle) = parse_at(node);
    let (abs_x, abs_y) = rotate_and_translate(local_x, local_y, fp_x, fp_y, fp_angle);

    GraphicItem {
        kind: GraphicKind::Text,
        text: node.atom_at(1).unwrap_or("").to_string(),
        position: [mm_to_nm(abs_x), mm_to_nm(abs_y)],
        angle: text_angle,
    }
}

fn parse_fp_shape(node: &SExpr, fp_x: f64, fp_y: f64, fp_angle: f64) -> GraphicItem {
    let anchor = node
        .find("start")
        .or_else(|| node.find("center"))
        .map(|n| (n.f64_at(0).unwrap_or(0.0), n.f64_at(1).unwrap_or(0.0)))
        .unwrap_or((0.0, 0.0));
    let (abs_x, abs_y) = rotate_and_translate(anchor.0, anchor.1, fp_x, fp_y, fp_angle);

    GraphicItem {
        kind: GraphicKind::Shape,
        text: String::new(),
        position: [mm_to_nm(abs_x), mm_to_nm(abs_y)],
        angle: 0.0,
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// Rotate point (lx, ly) by angle degrees and translate to (tx, ty).
fn rotate_and_translate(lx: f64, ly: f64, tx: f64, ty: f64, angle_deg: f64) -> (f64, f64) {
    if angle_deg == 0.0 {
        return (lx + tx, ly + ty);
    }
    let angle_rad = -angle_deg * PI / 180.0;
    let cos_a = angle_rad.cos();
    let sin_a = angle_rad.sin();
    let rx = lx * cos_a - ly * sin_a;
    let ry = lx * sin_a + ly * cos_a;
    (rx + tx, ry + ty)
}
