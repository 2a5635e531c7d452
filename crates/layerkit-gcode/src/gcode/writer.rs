//! G-code text writer and file persistence

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::document::GcodeFile;
use super::line::GcodeLine;
use super::parser::GcodeParser;
use crate::error::GcodeIoError;

/// Writes lines in their canonical text form, one per line
pub struct GcodeWriter<W: Write> {
    inner: W,
    lines_written: usize,
}

impl<W: Write> GcodeWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            lines_written: 0,
        }
    }

    /// Write a single line followed by `\n`
    pub fn write_line(&mut self, line: &GcodeLine) -> io::Result<()> {
        writeln!(self.inner, "{}", line)?;
        self.lines_written += 1;
        Ok(())
    }

    /// Write every line of a document
    pub fn write_file(&mut self, file: &GcodeFile) -> io::Result<()> {
        for line in file.lines() {
            self.write_line(line)?;
        }
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Render a document to a string
pub fn to_gcode_string(file: &GcodeFile) -> String {
    let mut out = String::new();
    for line in file.lines() {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

/// Persist a document as G-code text
pub fn save_gcode(path: &Path, file: &GcodeFile) -> Result<(), GcodeIoError> {
    let io_err = |source: io::Error| GcodeIoError::Io {
        path: path.to_path_buf(),
        source,
    };
    let handle = File::create(path).map_err(io_err)?;
    let mut writer = GcodeWriter::new(BufWriter::new(handle));
    writer.write_file(file).map_err(io_err)?;
    writer.into_inner().map_err(io_err)?;
    tracing::debug!("Saved {} G-code lines to {:?}", file.len(), path);
    Ok(())
}

/// Read a document previously written by [`save_gcode`] or any compatible
/// tool. Layer spans are rebuilt from the marker comments.
pub fn load_gcode(path: &Path) -> Result<GcodeFile, GcodeIoError> {
    let content = std::fs::read_to_string(path).map_err(|source| GcodeIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file = GcodeParser::new()
        .parse_str(&content)
        .map_err(|e| GcodeIoError::Parse {
            path: path.to_path_buf(),
            line: e.line,
            reason: e.reason,
        })?;
    tracing::debug!("Loaded {} G-code lines from {:?}", file.len(), path);
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_counts_lines() {
        let file = GcodeFile::from_lines(vec![
            GcodeLine::comment("LAYER:0"),
            GcodeLine::g(1).with_float('X', 1.5).with_int('F', 600),
        ]);
        let mut writer = GcodeWriter::new(Vec::new());
        writer.write_file(&file).unwrap();
        assert_eq!(writer.lines_written(), 2);
        let bytes = writer.into_inner().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), ";LAYER:0\nG1 X1.5 F600\n");
    }

    #[test]
    fn test_string_matches_writer() {
        let file = GcodeFile::from_lines(vec![GcodeLine::m(84), GcodeLine::blank()]);
        assert_eq!(to_gcode_string(&file), "M84\n\n");
    }
}
