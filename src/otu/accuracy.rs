//! Clustering accuracy against a sequenced mock community.
//!
//! OTUs relabelled by the mock annotation step carry the reference name; OTUs
//! still named `OTU_<n>` had no confident mock hit and count as spurious.

use super::otu_table::{self, OtuAbundance, SampleColumn};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// Substring marking an identifier the mock annotation left untouched.
pub const UNMATCHED_MARKER: &str = "OTU";

/// Per-class breakdown of OTUs detected in the mock sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccuracySummary {
    pub mock_label: String,
    /// Sequences in the mock reference, when known.
    pub theoretical: Option<usize>,
    /// OTUs with a positive count in the mock column.
    pub num_otus: usize,
    pub mock_found: usize,
    pub spurious: usize,
    /// Counts of real OTUs, ascending.
    pub good_otu: Vec<u64>,
    /// Counts of spurious OTUs, descending.
    pub bad_otu: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MockEvaluation {
    Evaluated(AccuracySummary),
    NotApplicable { mock_label: String },
}

pub fn is_real_otu(otu: &str) -> bool {
    !otu.contains(UNMATCHED_MARKER)
}

impl AccuracySummary {
    pub fn from_counts(mock_label: &str, rows: &[OtuAbundance], theoretical: Option<usize>) -> Self {
        let mut good_otu = Vec::new();
        let mut bad_otu = Vec::new();
        for row in rows.iter().filter(|r| r.count > 0) {
            if is_real_otu(&row.otu) {
                good_otu.push(row.count);
            } else {
                bad_otu.push(row.count);
            }
        }
        good_otu.sort_unstable();
        bad_otu.sort_unstable_by(|a, b| b.cmp(a));

        let num_otus = good_otu.len() + bad_otu.len();
        let mock_found = good_otu.len();
        Self {
            mock_label: mock_label.to_string(),
            theoretical,
            num_otus,
            mock_found,
            spurious: num_otus - mock_found,
            good_otu,
            bad_otu,
        }
    }

    pub fn good_reads(&self) -> u64 {
        self.good_otu.iter().sum()
    }

    pub fn bad_reads(&self) -> u64 {
        self.bad_otu.iter().sum()
    }

    /// Up to three lowest real-OTU counts.
    pub fn lowest_real(&self) -> &[u64] {
        &self.good_otu[..self.good_otu.len().min(3)]
    }

    /// Up to three highest spurious-OTU counts.
    pub fn highest_spurious(&self) -> &[u64] {
        &self.bad_otu[..self.bad_otu.len().min(3)]
    }

    /// Human-readable report; wording is informational only.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(theoretical) = self.theoretical {
            lines.push(format!("Theoretical OTUs in Mock:  {}", theoretical));
        }
        lines.push(format!(
            "Total OTUs detected in {}:  {}",
            self.mock_label, self.num_otus
        ));

        lines.push(String::new());
        lines.push(format!("Real Mock OTUs found:  {}", self.mock_found));
        if let (Some(low), Some(high)) = (self.good_otu.first(), self.good_otu.last()) {
            lines.push(format!("Range of counts from Real OTUs:  {} - {}", high, low));
            lines.extend(match self.lowest_real() {
                [a] => Some(format!("Lowest count from Real OTUs:  {}", a)),
                [a, b] => Some(format!("Lowest counts from Real OTUs:  {}, {}", a, b)),
                [a, b, c, ..] => Some(format!("Lowest counts from Real OTUs:  {}, {}, {}", a, b, c)),
                [] => None,
            });
            lines.push(format!("Total number of reads in Real OTUs: {}", self.good_reads()));
        }

        lines.push(String::new());
        lines.push(format!("Spurious OTUs found:  {}", self.spurious));
        if let (Some(high), Some(low)) = (self.bad_otu.first(), self.bad_otu.last()) {
            lines.push(format!("Range of counts from Spurious OTUs:  {} - {}", high, low));
            lines.extend(match self.highest_spurious() {
                [a] => Some(format!("Highest count from Spurious OTUs:  {}", a)),
                [a, b] => Some(format!("Highest counts from Spurious OTUs:  {}, {}", a, b)),
                [a, b, c, ..] => Some(format!("Highest counts from Spurious OTUs:  {}, {}, {}", a, b, c)),
                [] => None,
            });
            lines.push(format!("Total number of reads in Spurious OTUs: {}", self.bad_reads()));
        }
        lines
    }
}

/// Evaluates the mock sample column of an OTU table.
///
/// A table without the mock column yields `NotApplicable`; malformed tables
/// are errors.
pub fn evaluate(table: &Path, mock_label: &str, theoretical: Option<usize>) -> Result<MockEvaluation> {
    Ok(match otu_table::load_sample_column(table, mock_label)? {
        SampleColumn::Found(rows) => {
            MockEvaluation::Evaluated(AccuracySummary::from_counts(mock_label, &rows, theoretical))
        }
        SampleColumn::Missing => MockEvaluation::NotApplicable {
            mock_label: mock_label.to_string(),
        },
    })
}
