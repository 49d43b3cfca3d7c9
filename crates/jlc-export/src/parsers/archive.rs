use std::io::{Cursor, Read};

use log::debug;

use crate::error::ExportError;
use crate::types::Board;

/// Parse the first `.kicad_pcb` found in a zip archive.
pub fn parse(data: &[u8]) -> Result<Board, ExportError> {
    let cursor = Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() || !file.name().to_lowercase().ends_with(".kicad_pcb") {
            continue;
        }

        debug!("Reading board {} from archive", file.name());
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        return super::kicad::parse(&content);
    }

    Err(ExportError::ParseError(
        "No .kicad_pcb file found in zip".into(),
    ))
}
