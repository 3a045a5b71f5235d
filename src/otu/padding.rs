use crate::error::{PipelineError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Keeps only unambiguous uppercase bases. Anything else, including lowercase
/// `acgt` and the engine's alignment padding, is dropped.
pub fn strip_padding(line: &str) -> String {
    line.chars()
        .filter(|c| matches!(c, 'G' | 'A' | 'T' | 'C'))
        .collect()
}

/// Copies header lines verbatim and strips padding from sequence lines.
/// Sequence lines left empty are not written. Returns the header count.
///
/// `input` and `output` only label I/O errors from the reader and writer.
pub fn clean_padding<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    input: &Path,
    output: &Path,
) -> Result<usize> {
    let write_err = |e: std::io::Error| PipelineError::io(output, e);
    let mut headers = 0;
    let mut line = String::new();
    while reader
        .read_line(&mut line)
        .map_err(|e| PipelineError::io(input, e))?
        > 0
    {
        if line.starts_with('>') {
            writer.write_all(line.as_bytes()).map_err(write_err)?;
            if !line.ends_with('\n') {
                writer.write_all(b"\n").map_err(write_err)?;
            }
            headers += 1;
        } else {
            let bases = strip_padding(&line);
            if !bases.is_empty() {
                writeln!(writer, "{}", bases).map_err(write_err)?;
            }
        }
        line.clear();
    }
    writer.flush().map_err(write_err)?;
    Ok(headers)
}

pub fn clean_padding_file(input: &Path, output: &Path) -> Result<usize> {
    let reader = BufReader::new(File::open(input).map_err(|e| PipelineError::io(input, e))?);
    let writer = BufWriter::new(File::create(output).map_err(|e| PipelineError::io(output, e))?);
    clean_padding(reader, writer, input, output)
}
