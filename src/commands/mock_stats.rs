use crate::otu::accuracy::{self, MockEvaluation};
use crate::utils::record_count::count_fasta;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

pub fn run(
    table: PathBuf,
    mock: String,
    mock_reference: Option<PathBuf>,
    summary_json: Option<PathBuf>,
) -> Result<()> {
    let theoretical = mock_reference
        .as_deref()
        .map(count_fasta)
        .transpose()
        .context("Failed to count mock community sequences")?;

    let evaluation = accuracy::evaluate(&table, &mock, theoretical)
        .with_context(|| format!("Failed to evaluate {}", table.display()))?;

    print_evaluation(&evaluation);

    if let Some(path) = summary_json {
        write_summary_json(&path, &evaluation)?;
    }
    Ok(())
}

pub(crate) fn print_evaluation(evaluation: &MockEvaluation) {
    match evaluation {
        MockEvaluation::Evaluated(summary) => {
            for line in summary.report_lines() {
                println!("{}", line);
            }
        }
        MockEvaluation::NotApplicable { mock_label } => {
            println!(
                "{} not found in OTU table, mock community stats not applicable",
                mock_label
            );
        }
    }
}

pub(crate) fn write_summary_json(path: &Path, evaluation: &MockEvaluation) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), evaluation)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
