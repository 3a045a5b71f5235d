use crate::error::{PipelineError, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const OTU_ID_COLUMN: &str = "OTUId";

/// One OTU's abundance in a single sample column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtuAbundance {
    pub otu: String,
    pub count: u64,
}

/// Result of pulling one sample column out of an OTU table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleColumn {
    Found(Vec<OtuAbundance>),
    /// The sample label is not a column of the table.
    Missing,
}

/// Reads the tab-delimited table written by the uc → table converter and
/// returns `(OTUId, abundance)` for `sample`, in table order.
pub fn read_sample_column<R: BufRead>(reader: R, sample: &str, source: &Path) -> Result<SampleColumn> {
    let mut lines = reader.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => line.map_err(|e| PipelineError::io(source, e))?,
        None => return Err(PipelineError::parse(source, 1, "OTU table is empty")),
    };
    let columns: Vec<&str> = header.trim_end_matches(['\r', '\n']).split('\t').collect();

    let Some(sample_idx) = columns.iter().position(|c| *c == sample) else {
        return Ok(SampleColumn::Missing);
    };
    let id_idx = columns
        .iter()
        .position(|c| *c == OTU_ID_COLUMN)
        .ok_or_else(|| PipelineError::parse(source, 1, format!("no {} column in header", OTU_ID_COLUMN)))?;

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (i, line) in lines {
        let line = line.map_err(|e| PipelineError::io(source, e))?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let (Some(otu), Some(count)) = (fields.get(id_idx), fields.get(sample_idx)) else {
            return Err(PipelineError::parse(
                source,
                i + 1,
                format!("row has {} fields, header has {}", fields.len(), columns.len()),
            ));
        };
        let count = count.trim().parse::<u64>().map_err(|_| {
            PipelineError::parse(source, i + 1, format!("abundance '{}' is not a count", count))
        })?;
        if !seen.insert(otu.to_string()) {
            return Err(PipelineError::parse(source, i + 1, format!("duplicate OTU id {}", otu)));
        }
        rows.push(OtuAbundance {
            otu: otu.to_string(),
            count,
        });
    }

    Ok(SampleColumn::Found(rows))
}

pub fn load_sample_column(path: &Path, sample: &str) -> Result<SampleColumn> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    read_sample_column(BufReader::new(file), sample, path)
}
