use crate::error::{PipelineError, Result};
use niffler::get_reader;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Opens a possibly compressed input. Files shorter than a compression magic
/// number are handed back as-is.
pub(crate) fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    if file_size(path)? < 5 {
        return Ok(Box::new(file));
    }
    let (inner_reader, _compression) = get_reader(Box::new(file))
        .map_err(|e| PipelineError::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
    Ok(inner_reader)
}

fn open_lines(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    Ok(BufReader::with_capacity(1024 * 1024, open_input(path)?))
}

/// Number of records in a FASTA file (lines starting with `>`).
pub fn count_fasta(path: &Path) -> Result<usize> {
    let mut count = 0;
    for line in open_lines(path)?.lines() {
        let line = line.map_err(|e| PipelineError::io(path, e))?;
        if line.starts_with('>') {
            count += 1;
        }
    }
    Ok(count)
}

/// Number of records in a FASTQ file, assuming four lines per record.
pub fn count_fastq(path: &Path) -> Result<usize> {
    let mut lines = 0;
    for line in open_lines(path)?.lines() {
        line.map_err(|e| PipelineError::io(path, e))?;
        lines += 1;
    }
    Ok(lines / 4)
}

pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| PipelineError::io(path, e))
}

/// Formats a byte count with binary (1024) steps, e.g. `1.5 KB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 8] = ["", "K", "M", "G", "T", "P", "E", "Z"];
    let mut num = bytes as f64;
    for unit in UNITS {
        if num < 1024.0 {
            return format!("{:.1} {}B", num, unit);
        }
        num /= 1024.0;
    }
    format!("{:.1} YB", num)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn counts_fasta_headers_only() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, ">a\nACGT\nACGT\n>b\nGG\n>c\n\n").unwrap();
        assert_eq!(count_fasta(file.path()).unwrap(), 3);
    }

    #[test]
    fn counts_fastq_by_line_quads() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "@r1\nACGT\n+\nIIII\n@r2\nACGA\n+\nIIII\n").unwrap();
        assert_eq!(count_fastq(file.path()).unwrap(), 2);
    }

    #[test]
    fn human_size_steps_by_1024() {
        assert_eq!(human_size(512), "512.0 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(4_294_967_296), "4.0 GB");
    }

    #[test]
    fn empty_file_has_no_records() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(count_fasta(file.path()).unwrap(), 0);
        assert_eq!(count_fastq(file.path()).unwrap(), 0);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = count_fasta(Path::new("/no/such/file.fa")).unwrap_err();
        assert!(err.to_string().contains("/no/such/file.fa"));
    }
}
