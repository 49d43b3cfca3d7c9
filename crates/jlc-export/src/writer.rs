//! CSV output for the BOM and placement files, plus the sinks they write into.

use crate::error::ExportError;
use crate::types::*;
use csv::{Terminator, WriterBuilder};
use log::{debug, error};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const BOM_HEADER: [&str; 3] = ["Comment", "Designator", "Footprint"];
pub const POS_HEADER: [&str; 5] = ["Designator", "Mid X", "Mid Y", "Layer", "Rotation"];

/// Destination for named output files.
pub trait OutputSink {
    /// Open `name` for writing, creating it or truncating any previous content.
    fn create(&mut self, name: &str) -> Result<Box<dyn Write + '_>, ExportError>;
}

/// Writes files into a directory, creating the directory on first use.
#[derive(Debug, Clone)]
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for DirSink {
    fn create(&mut self, name: &str) -> Result<Box<dyn Write + '_>, ExportError> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(name);
        debug!("Writing {}", path.display());
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}

/// Keeps output in memory; used by tests and callers that post-process the CSV.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.files
            .get(name)
            .and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl OutputSink for MemorySink {
    fn create(&mut self, name: &str) -> Result<Box<dyn Write + '_>, ExportError> {
        let buf = self.files.entry(name.to_string()).or_default();
        buf.clear();
        Ok(Box::new(buf))
    }
}

#[derive(Debug, Serialize)]
struct BomRecord<'a> {
    #[serde(rename = "Comment")]
    comment: &'a str,
    #[serde(rename = "Designator")]
    designator: String,
    #[serde(rename = "Footprint")]
    footprint: &'a str,
}

fn record_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new())
}

fn finish_record(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Encode one row as a complete CSV record, terminator included.
fn encode_row<T: Serialize>(row: &T) -> Result<Vec<u8>, ExportError> {
    let mut writer = record_writer();
    writer.serialize(row)?;
    finish_record(writer)
}

fn write_rows<W, T, I>(mut out: W, header: &[&str], rows: I) -> Result<usize, ExportError>
where
    W: Write,
    T: Serialize + std::fmt::Debug,
    I: IntoIterator<Item = T>,
{
    let mut writer = record_writer();
    writer.write_record(header)?;
    out.write_all(&finish_record(writer)?)?;

    // Rows are encoded whole before touching `out`, so a failed row leaves no
    // partial record behind.
    let mut skipped = 0;
    for row in rows {
        let written = encode_row(&row)
            .and_then(|record| out.write_all(&record).map_err(ExportError::from));
        if let Err(e) = written {
            error!("Skipping row {row:?}: {e}");
            skipped += 1;
        }
    }
    out.flush()?;
    Ok(skipped)
}

/// Write aggregated BOM rows. Returns the number of rows that failed and were skipped.
pub fn write_bom(
    sink: &mut dyn OutputSink,
    name: &str,
    rows: &[BomRow],
) -> Result<usize, ExportError> {
    let out = sink.create(name)?;
    let records = rows.iter().map(|row| BomRecord {
        comment: &row.comment,
        designator: row.designator_list(),
        footprint: &row.footprint,
    });
    write_rows(out, &BOM_HEADER, records)
}

/// Write placement rows in emission order. Returns the number of skipped rows.
pub fn write_pos(
    sink: &mut dyn OutputSink,
    name: &str,
    rows: &[PosRow],
) -> Result<usize, ExportError> {
    let out = sink.create(name)?;
    write_rows(out, &POS_HEADER, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bom_row(comment: &str, designators: &[&str], footprint: &str) -> BomRow {
        BomRow {
            comment: comment.to_string(),
            designators: designators.iter().map(|d| d.to_string()).collect(),
            footprint: footprint.to_string(),
        }
    }

    fn pos_row(designator: &str, x: &str, y: &str) -> PosRow {
        PosRow {
            designator: designator.to_string(),
            mid_x: x.to_string(),
            mid_y: y.to_string(),
            layer: "T".to_string(),
            rotation: "0.0".to_string(),
        }
    }

    #[test]
    fn test_write_bom() {
        let mut sink = MemorySink::new();
        let rows = vec![
            bom_row("10k", &["R1", "R2"], "R_0603"),
            bom_row("LED_RED", &["A1"], "LED_RED"),
        ];
        let skipped = write_bom(&mut sink, "JLC_BOM.csv", &rows).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(
            sink.get("JLC_BOM.csv").unwrap(),
            "Comment,Designator,Footprint\r\n10k,\"R1,R2\",R_0603\r\nLED_RED,A1,LED_RED\r\n"
        );
    }

    #[test]
    fn test_write_pos() {
        let mut sink = MemorySink::new();
        let rows = vec![pos_row("R1", "1.0mm", "-2.0mm"), pos_row("A1", "0.5mm", "0.5mm")];
        write_pos(&mut sink, "JLC_POS.csv", &rows).unwrap();
        assert_eq!(
            sink.get("JLC_POS.csv").unwrap(),
            "Designator,Mid X,Mid Y,Layer,Rotation\r\n\
             R1,1.0mm,-2.0mm,T,0.0\r\n\
             A1,0.5mm,0.5mm,T,0.0\r\n"
        );
    }

    #[test]
    fn test_header_written_without_rows() {
        let mut sink = MemorySink::new();
        write_bom(&mut sink, "bom.csv", &[]).unwrap();
        write_pos(&mut sink, "pos.csv", &[]).unwrap();
        assert_eq!(sink.get("bom.csv").unwrap(), "Comment,Designator,Footprint\r\n");
        assert_eq!(
            sink.get("pos.csv").unwrap(),
            "Designator,Mid X,Mid Y,Layer,Rotation\r\n"
        );
    }

    #[test]
    fn test_memory_sink_truncates() {
        let mut sink = MemorySink::new();
        write_pos(&mut sink, "pos.csv", &[pos_row("R1", "1.0mm", "1.0mm")]).unwrap();
        write_pos(&mut sink, "pos.csv", &[pos_row("C9", "2.0mm", "2.0mm")]).unwrap();
        let content = sink.get("pos.csv").unwrap();
        assert!(content.contains("C9"));
        assert!(!content.contains("R1"));
    }

    /// Refuses any write containing `marker`; everything else lands in `out`.
    struct RejectingWriter<'a> {
        out: &'a mut Vec<u8>,
        marker: &'static [u8],
    }

    impl Write for RejectingWriter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.windows(self.marker.len()).any(|w| w == self.marker) {
                return Err(std::io::Error::other("disk full"));
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct RejectingSink {
        out: Vec<u8>,
        marker: &'static [u8],
    }

    impl OutputSink for RejectingSink {
        fn create(&mut self, _name: &str) -> Result<Box<dyn Write + '_>, ExportError> {
            self.out.clear();
            Ok(Box::new(RejectingWriter {
                out: &mut self.out,
                marker: self.marker,
            }))
        }
    }

    #[test]
    fn test_failed_row_is_skipped_cleanly() {
        let mut sink = RejectingSink {
            out: Vec::new(),
            marker: b"BAD",
        };
        let long = "9".repeat(10_000);
        let rows = vec![
            pos_row("R1", &long, "1.0mm"),
            pos_row("BAD1", &long, "2.0mm"),
            pos_row("R3", "3.0mm", &long),
        ];
        let skipped = write_pos(&mut sink, "pos.csv", &rows).unwrap();
        assert_eq!(skipped, 1);

        let content = String::from_utf8(sink.out).unwrap();
        let lines: Vec<&str> = content.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Designator,Mid X,Mid Y,Layer,Rotation");
        assert!(lines[1].starts_with("R1,"));
        assert!(lines[2].starts_with("R3,"));
        assert!(lines.iter().all(|l| l.split(',').count() == 5));
    }

    #[test]
    fn test_header_failure_is_fatal() {
        let mut sink = RejectingSink {
            out: Vec::new(),
            marker: b"Designator",
        };
        let err = write_pos(&mut sink, "pos.csv", &[]).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }

    #[test]
    fn test_dir_sink_creates_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("JLC");
        let mut sink = DirSink::new(&root);

        let long = vec![bom_row("10k", &["R1", "R2", "R3"], "R_0603")];
        write_bom(&mut sink, "JLC_BOM.csv", &long).unwrap();
        assert!(root.is_dir());

        // Directory already exists; shorter content must fully replace the old file
        let short = vec![bom_row("1k", &["R9"], "R")];
        write_bom(&mut sink, "JLC_BOM.csv", &short).unwrap();
        let content = fs::read_to_string(root.join("JLC_BOM.csv")).unwrap();
        assert_eq!(content, "Comment,Designator,Footprint\r\n1k,R9,R\r\n");
    }
}
