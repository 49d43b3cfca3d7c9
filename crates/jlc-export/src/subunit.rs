//! Secondary placements embedded in a footprint.
//!
//! A footprint carries a property `BOM_A<n> = <part value>` and a text item whose
//! text is literally `BOM_A<n>`. The text item's position and angle locate the
//! extra part; its designator is the marker text without the `BOM_` prefix.

use crate::normalize::Placement;
use crate::types::*;
use once_cell::sync::Lazy;
use regex::Regex;

const MARKER_PREFIX: &str = "BOM_";

static SUBUNIT_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^BOM_A\d+").expect("sub-unit key pattern"));

/// Whether a property key names a sub-unit. Anything after the digits is ignored.
pub fn is_subunit_key(key: &str) -> bool {
    SUBUNIT_KEY.is_match(key)
}

/// Whether a text item's content marks the sub-unit described by `key`.
pub fn marker_matches(key: &str, text: &str) -> bool {
    key == text
}

/// Materialize every sub-unit of `fp`, in the footprint's text item order.
///
/// Placements inherit the parent's side and use the marker's own position and
/// angle. Sub-unit properties without a matching marker yield nothing.
pub fn expand(fp: &Footprint) -> Vec<Placement> {
    let keys: Vec<&str> = fp
        .properties
        .keys()
        .map(String::as_str)
        .filter(|k| is_subunit_key(k))
        .collect();
    if keys.is_empty() {
        return Vec::new();
    }

    let side = Side::from_layer(&fp.layer);
    let mut units = Vec::new();
    for item in fp.texts() {
        let Some(key) = keys.iter().find(|k| marker_matches(k, &item.text)) else {
            continue;
        };
        let value = fp.properties[*key].clone();
        units.push(Placement {
            designator: item.text.replace(MARKER_PREFIX, ""),
            comment: value.clone(),
            footprint: value,
            side,
            position: item.position,
            rotation: item.angle,
        });
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExportOptions;
    use std::collections::HashMap;

    fn text(text: &str, position: [i64; 2], angle: f64) -> GraphicItem {
        GraphicItem {
            kind: GraphicKind::Text,
            text: text.to_string(),
            position,
            angle,
        }
    }

    fn matrix_cell(properties: &[(&str, &str)], graphics: Vec<GraphicItem>) -> Footprint {
        Footprint {
            reference: "U1".to_string(),
            value: "MATRIX".to_string(),
            lib_item_name: "LED_Matrix".to_string(),
            position: [10_000_000, 10_000_000],
            orientation: 0.0,
            layer: "F.Cu".to_string(),
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            graphics,
        }
    }

    #[test]
    fn test_is_subunit_key() {
        assert!(is_subunit_key("BOM_A1"));
        assert!(is_subunit_key("BOM_A42"));
        assert!(is_subunit_key("BOM_A1_extra"));
        assert!(!is_subunit_key("BOM_A"));
        assert!(!is_subunit_key("bom_a1"));
        assert!(!is_subunit_key("X_BOM_A1"));
        assert!(!is_subunit_key("BOM_B1"));
    }

    #[test]
    fn test_marker_matches_is_exact() {
        assert!(marker_matches("BOM_A1", "BOM_A1"));
        assert!(!marker_matches("BOM_A1", "BOM_A1 "));
        assert!(!marker_matches("BOM_A1", "bom_a1"));
    }

    #[test]
    fn test_expand_uses_marker_geometry() {
        let fp = matrix_cell(
            &[("BOM_A1", "LED_RED")],
            vec![text("BOM_A1", [500_000, -500_000], 45.0)],
        );
        let units = expand(&fp);
        assert_eq!(units.len(), 1);

        let unit = &units[0];
        assert_eq!(unit.designator, "A1");
        assert_eq!(unit.comment, "LED_RED");
        assert_eq!(unit.footprint, "LED_RED");

        let row = unit.pos_row(&ExportOptions::default());
        assert_eq!(row.mid_x, "0.5mm");
        assert_eq!(row.mid_y, "0.5mm");
        assert_eq!(row.layer, "T");
        assert_eq!(row.rotation, "45.0");
    }

    #[test]
    fn test_expand_without_marker_is_empty() {
        let fp = matrix_cell(
            &[("BOM_A1", "LED_RED")],
            vec![text("A1", [0, 0], 0.0), text("${REFERENCE}", [0, 0], 0.0)],
        );
        assert!(expand(&fp).is_empty());
    }

    #[test]
    fn test_expand_ignores_shapes() {
        let fp = matrix_cell(
            &[("BOM_A1", "LED_RED")],
            vec![GraphicItem {
                kind: GraphicKind::Shape,
                text: "BOM_A1".to_string(),
                position: [0, 0],
                angle: 0.0,
            }],
        );
        assert!(expand(&fp).is_empty());
    }

    #[test]
    fn test_expand_follows_text_order_and_side() {
        let mut fp = matrix_cell(
            &[("BOM_A2", "LED_GREEN"), ("BOM_A1", "LED_RED"), ("Sheetfile", "x")],
            vec![
                text("BOM_A1", [1_000_000, 0], 0.0),
                text("BOM_A2", [2_000_000, 0], 180.0),
                text("BOM_A3", [3_000_000, 0], 0.0),
            ],
        );
        fp.layer = "B.Cu".to_string();

        let units = expand(&fp);
        let designators: Vec<&str> = units.iter().map(|u| u.designator.as_str()).collect();
        assert_eq!(designators, vec!["A1", "A2"]);
        assert!(units.iter().all(|u| u.side == Side::Bottom));
        assert_eq!(units[1].comment, "LED_GREEN");
    }
}
