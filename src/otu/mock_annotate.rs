use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Columns in a USEARCH `.uc` record.
pub const UC_FIELDS: usize = 10;

/// Target label written by the engine when a query had no hit.
pub const NO_MATCH: &str = "*";

/// OTU label → mock reference label.
///
/// When several OTUs hit the same reference, or one OTU appears twice, the
/// record read last wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MockLabels {
    labels: HashMap<String, String>,
}

impl MockLabels {
    pub fn from_uc<R: BufRead>(reader: R, source: &Path) -> Result<Self> {
        let mut labels = HashMap::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| PipelineError::io(source, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != UC_FIELDS {
                return Err(PipelineError::parse(
                    source,
                    i + 1,
                    format!("expected {} tab-separated fields, found {}", UC_FIELDS, fields.len()),
                ));
            }
            let target = fields[UC_FIELDS - 1];
            let query = fields[UC_FIELDS - 2];
            if target != NO_MATCH {
                labels.insert(query.to_string(), target.to_string());
            }
        }
        Ok(Self { labels })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        Self::from_uc(BufReader::new(file), path)
    }

    pub fn get(&self, otu: &str) -> Option<&str> {
        self.labels.get(otu).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationStats {
    pub records: usize,
    pub relabelled: usize,
}

/// Rewrites OTU headers to their mock label. Unmatched headers are cut to
/// their first whitespace-delimited token; sequence lines are copied as-is.
pub fn annotate<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    labels: &MockLabels,
    input: &Path,
    output: &Path,
) -> Result<AnnotationStats> {
    let mut stats = AnnotationStats::default();
    let write_err = |e: std::io::Error| PipelineError::io(output, e);

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| PipelineError::io(input, e))?;
        match line.strip_prefix('>') {
            Some(header) => {
                let token = header.split_whitespace().next().ok_or_else(|| {
                    PipelineError::parse(input, i + 1, "FASTA header has no identifier")
                })?;
                stats.records += 1;
                let label = match labels.get(token) {
                    Some(mock) => {
                        stats.relabelled += 1;
                        mock
                    }
                    None => token,
                };
                writeln!(writer, ">{}", label).map_err(write_err)?;
            }
            None => writeln!(writer, "{}", line).map_err(write_err)?,
        }
    }
    writer.flush().map_err(write_err)?;
    Ok(stats)
}

pub fn annotate_file(input: &Path, mapping: &Path, output: &Path) -> Result<AnnotationStats> {
    let labels = MockLabels::load(mapping)?;
    let reader = BufReader::new(File::open(input).map_err(|e| PipelineError::io(input, e))?);
    let writer = BufWriter::new(File::create(output).map_err(|e| PipelineError::io(output, e))?);
    annotate(reader, writer, &labels, input, output)
}
