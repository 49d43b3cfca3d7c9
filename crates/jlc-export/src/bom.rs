use crate::types::*;
use log::warn;
use std::collections::HashMap;

/// Group BOM entries into rows keyed by comment.
///
/// Rows come out in the order their comment was first seen, and each row keeps
/// the footprint of its first member. Entries with an empty comment are dropped.
pub fn aggregate(entries: &[BomEntry]) -> Vec<BomRow> {
    let mut rows: Vec<BomRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in entries {
        if entry.comment.is_empty() {
            continue;
        }

        match index.get(entry.comment.as_str()) {
            Some(&i) => {
                let row = &mut rows[i];
                if row.footprint != entry.footprint {
                    warn!(
                        "BOM row '{}': {} has footprint '{}', keeping '{}'",
                        row.comment, entry.designator, entry.footprint, row.footprint
                    );
                }
                row.designators.push(entry.designator.clone());
            }
            None => {
                index.insert(entry.comment.as_str(), rows.len());
                rows.push(BomRow {
                    comment: entry.comment.clone(),
                    designators: vec![entry.designator.clone()],
                    footprint: entry.footprint.clone(),
                });
            }
        }
    }

    rows
}
