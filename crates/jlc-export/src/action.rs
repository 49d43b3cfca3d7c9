//! The single user-facing action: read a board, write both CSV files next to it.

use crate::error::ExportError;
use crate::export::{run_export, ExportSummary};
use crate::types::BoardInfo;
use crate::writer::DirSink;
use crate::{read_board, read_board_bytes, BoardFormat, ExportOptions};
use log::info;
use std::path::{Path, PathBuf};

pub struct ExportAction {
    options: ExportOptions,
}

impl ExportAction {
    pub const NAME: &'static str = "Export JLC bom and pos";
    pub const CATEGORY: &'static str = "Modify Drawing PCB and schematics";
    pub const DESCRIPTION: &'static str = "Export JLC bom and pos";

    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Directory holding the board file; output lands below it.
    pub fn project_dir(board_path: &Path) -> PathBuf {
        match board_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Export `board_path`. Output goes to `<base>/<output_dir>` where base defaults
    /// to the board's project directory.
    pub fn run(
        &self,
        board_path: &Path,
        format: Option<BoardFormat>,
        output_base: Option<&Path>,
    ) -> Result<ExportSummary, ExportError> {
        info!("{} v{} started", Self::NAME, env!("CARGO_PKG_VERSION"));
        info!(
            "Running on: {} ({})",
            std::env::consts::OS,
            std::env::consts::ARCH
        );

        let board = match format {
            Some(format) => read_board_bytes(&std::fs::read(board_path)?, format)?,
            None => read_board(board_path)?,
        };
        log_board_info(board_path, &board.info);

        let base = output_base
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::project_dir(board_path));
        let mut sink = DirSink::new(base.join(&self.options.output_dir));
        info!("Writing to {}", sink.root().display());

        run_export(&board, &mut sink, &self.options)
    }
}

impl Default for ExportAction {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

fn log_board_info(path: &Path, board: &BoardInfo) {
    info!(
        "Board {}: generator {} {}, format version {}",
        path.display(),
        board.generator.as_deref().unwrap_or("unknown"),
        board.generator_version.as_deref().unwrap_or("unknown"),
        board.version.as_deref().unwrap_or("unknown"),
    );
}
