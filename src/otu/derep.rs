//! Full-length dereplication of quality-filtered reads.
//!
//! Exact duplicates (byte-identical, no case folding, no reverse complement)
//! collapse into one record carrying a `size=<n>;` annotation. Records are
//! written in first-encounter order; abundance sorting is left to the
//! engine's sort stage.

use crate::error::{PipelineError, Result};
use crate::utils::record_count::open_input;
use bio::io::{fasta, fastq};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// A distinct sequence and how many reads carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueSequence {
    /// Identifier of the first read seen with this sequence.
    pub id: String,
    pub size: u64,
}

impl UniqueSequence {
    fn first(id: &str) -> Self {
        Self {
            id: id.to_string(),
            size: 1,
        }
    }

    /// Header with the abundance annotation, e.g. `read1;size=3;`.
    pub fn header(&self) -> String {
        if self.id.ends_with(';') {
            format!("{}size={};", self.id, self.size)
        } else {
            format!("{};size={};", self.id, self.size)
        }
    }
}

/// Sequence → abundance map that remembers first-encounter order.
#[derive(Debug, Default)]
pub struct Dereplicator {
    index: HashMap<Vec<u8>, usize>,
    uniques: Vec<(Vec<u8>, UniqueSequence)>,
    reads: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerepStats {
    pub input_reads: u64,
    pub unique_sequences: usize,
}

impl Dereplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one read. A repeat of a known sequence only bumps its size; the
    /// repeat's own identifier is discarded.
    pub fn add(&mut self, id: &str, seq: &[u8]) {
        self.reads += 1;
        match self.index.get(seq) {
            Some(&slot) => self.uniques[slot].1.size += 1,
            None => {
                self.index.insert(seq.to_vec(), self.uniques.len());
                self.uniques.push((seq.to_vec(), UniqueSequence::first(id)));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &UniqueSequence)> {
        self.uniques.iter().map(|(seq, unique)| (seq.as_slice(), unique))
    }

    pub fn stats(&self) -> DerepStats {
        DerepStats {
            input_reads: self.reads,
            unique_sequences: self.uniques.len(),
        }
    }

    pub fn write_fasta<W: Write>(&self, writer: W) -> std::io::Result<()> {
        let mut writer = fasta::Writer::new(writer);
        for (seq, unique) in self.iter() {
            writer.write(&unique.header(), None, seq)?;
        }
        writer.flush()
    }
}

/// First line of the zero-based `record` in four-line FASTQ.
fn record_start_line(record: usize) -> usize {
    4 * record + 1
}

/// Dereplicates the FASTQ at `input` into the FASTA at `output`.
///
/// A corrupt record stops the run; nothing is skipped.
pub fn dereplicate(input: &Path, output: &Path) -> Result<DerepStats> {
    let reader = fastq::Reader::new(BufReader::with_capacity(16 * 1024 * 1024, open_input(input)?));
    let mut derep = Dereplicator::new();

    for (i, record) in reader.records().enumerate() {
        let line = record_start_line(i);
        let record = record.map_err(|e| {
            PipelineError::parse(input, line, format!("malformed FASTQ record {}: {}", i + 1, e))
        })?;
        record.check().map_err(|e| {
            PipelineError::parse(
                input,
                line,
                format!("invalid FASTQ record {} '{}': {}", i + 1, record.id(), e),
            )
        })?;
        derep.add(record.id(), record.seq());
    }

    let file = File::create(output).map_err(|e| PipelineError::io(output, e))?;
    derep
        .write_fasta(BufWriter::new(file))
        .map_err(|e| PipelineError::io(output, e))?;

    Ok(derep.stats())
}
