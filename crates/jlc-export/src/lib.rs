pub mod action;
pub mod bom;
pub mod error;
pub mod export;
pub mod normalize;
pub mod parsers;
pub mod subunit;
pub mod types;
pub mod writer;

use error::ExportError;
use std::path::Path;
use types::Board;

pub use action::ExportAction;
pub use export::{run_export, ExportSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardFormat {
    KiCad,
    Zip,
    Json,
}

/// Fixed conventions of the assembly house's upload format.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Sign applied to X when converting to millimetres.
    pub x_direction: i8,
    /// Sign applied to Y; board Y grows downwards, the placement file's grows upwards.
    pub y_direction: i8,
    /// Components with exactly this value are left out of both files.
    pub excluded_value: String,
    /// Directory, relative to the project, receiving both files.
    pub output_dir: String,
    pub bom_file: String,
    pub pos_file: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            x_direction: 1,
            y_direction: -1,
            excluded_value: "TestPoint".to_string(),
            output_dir: "JLC".to_string(),
            bom_file: "JLC_BOM.csv".to_string(),
            pos_file: "JLC_POS.csv".to_string(),
        }
    }
}

/// Detect format from file extension.
pub fn detect_format(path: &Path) -> Option<BoardFormat> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("kicad_pcb") => Some(BoardFormat::KiCad),
        Some("zip") => Some(BoardFormat::Zip),
        Some("json") => Some(BoardFormat::Json),
        _ => None,
    }
}

/// Auto-detect format from extension and read the board.
pub fn read_board(path: &Path) -> Result<Board, ExportError> {
    let format = detect_format(path).ok_or_else(|| {
        ExportError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        )
    })?;
    let data = std::fs::read(path)?;
    read_board_bytes(&data, format)
}

/// Read a board from bytes with explicit format.
pub fn read_board_bytes(data: &[u8], format: BoardFormat) -> Result<Board, ExportError> {
    match format {
        BoardFormat::KiCad => parsers::kicad::parse(data),
        BoardFormat::Zip => parsers::archive::parse(data),
        BoardFormat::Json => parsers::snapshot::parse(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format(Path::new("a/board.kicad_pcb")), Some(BoardFormat::KiCad));
        assert_eq!(detect_format(Path::new("board.KICAD_PCB")), Some(BoardFormat::KiCad));
        assert_eq!(detect_format(Path::new("project.zip")), Some(BoardFormat::Zip));
        assert_eq!(detect_format(Path::new("snapshot.json")), Some(BoardFormat::Json));
        assert_eq!(detect_format(Path::new("board.brd")), None);
        assert_eq!(detect_format(Path::new("board")), None);
    }

    #[test]
    fn test_read_board_unsupported() {
        let err = read_board(Path::new("board.brd")).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(ext) if ext == "brd"));
    }

    #[test]
    fn test_default_options() {
        let opts = ExportOptions::default();
        assert_eq!((opts.x_direction, opts.y_direction), (1, -1));
        assert_eq!(opts.excluded_value, "TestPoint");
        assert_eq!(opts.output_dir, "JLC");
    }
}
