use crate::otu::derep;
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use crate::utils::run_log::RunLog;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn run(input: PathBuf, output: PathBuf) -> Result<()> {
    let log = RunLog::console_only();
    let progress = ProgressBarBuilder::new(format!("Dereplicating {}...", input.display()))
        .with_tick()
        .build();

    let result = derep::dereplicate(&input, &output);
    progress.finish_and_clear();
    let stats = result.with_context(|| format!("Failed to dereplicate {}", input.display()))?;

    log.info(format!(
        "Collapsed {} reads into {} unique sequences ({})",
        stats.input_reads,
        stats.unique_sequences,
        output.display()
    ));
    Ok(())
}
