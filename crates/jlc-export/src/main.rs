use clap::Parser;
use jlc_export::error::ExportError;
use jlc_export::parsers::snapshot;
use jlc_export::{read_board, read_board_bytes, BoardFormat, ExportAction, ExportOptions};
use log::error;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "jlc-export",
    version,
    about = "Export JLC BOM and placement files from a PCB"
)]
struct Cli {
    /// Input board (.kicad_pcb, .zip, .json snapshot)
    input: PathBuf,

    /// Base directory for the JLC/ output folder (default: the board's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Override auto-detected format (kicad, zip, json)
    #[arg(short, long)]
    format: Option<String>,

    /// Component value excluded from both files
    #[arg(long, default_value = "TestPoint")]
    exclude_value: String,

    /// Write the run log to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print an export summary as JSON on stdout
    #[arg(long)]
    summary: bool,

    /// Print the parsed board snapshot as JSON instead of exporting
    #[arg(long)]
    dump_board: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn parse_format(s: &str) -> Result<BoardFormat, String> {
    match s.to_lowercase().as_str() {
        "kicad" => Ok(BoardFormat::KiCad),
        "zip" => Ok(BoardFormat::Zip),
        "json" => Ok(BoardFormat::Json),
        _ => Err(format!("Unknown format: {s}. Use: kicad, zip, json")),
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<(), String> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .map_err(|e| format!("cannot create log file {}: {e}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn dump_board(cli: &Cli, format: Option<BoardFormat>) -> Result<String, ExportError> {
    let board = match format {
        Some(format) => read_board_bytes(&std::fs::read(&cli.input)?, format)?,
        None => read_board(&cli.input)?,
    };
    snapshot::to_json(&board, cli.pretty)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_ref()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let format = match cli.format.as_deref().map(parse_format).transpose() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if cli.dump_board {
        match dump_board(&cli, format) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let options = ExportOptions {
        excluded_value: cli.exclude_value,
        ..ExportOptions::default()
    };
    let action = ExportAction::new(options);

    match action.run(&cli.input, format, cli.output_dir.as_deref()) {
        Ok(summary) => {
            if cli.summary {
                let json = if cli.pretty {
                    serde_json::to_string_pretty(&summary)
                } else {
                    serde_json::to_string(&summary)
                };
                match json {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!("Failed to serialize summary: {e}");
                        std::process::exit(1);
                    }
                }
            }
        }
        Err(e) => {
            error!("Export failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
