//! Sequential OTU clustering pipeline.
//!
//! `filter → dereplicate → [denoise] → sort → cluster → clean-padding →
//! [chimera-filter] → [mock-annotate] → map-reads → build-table → [mock-evaluate]`
//!
//! Each stage consumes whatever file the previous stage left in the
//! pipeline's current-file state; a skipped stage leaves that state as is.

mod paths;

pub use paths::OutputPaths;

use crate::error::{PipelineError, Result};
use crate::otu::{accuracy, derep, mock_annotate, padding, MockEvaluation};
use crate::types::MAX_INPUT_BYTES;
use crate::utils::external_tools::{ClusterEngine, StageKind, StageRequest, TableConverter};
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use crate::utils::record_count::{count_fasta, count_fastq, file_size, human_size};
use crate::utils::run_log::RunLog;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Filter,
    Dereplicate,
    Denoise,
    Sort,
    Cluster,
    CleanPadding,
    ChimeraFilter,
    MockAnnotate,
    MapReads,
    BuildTable,
    MockEvaluate,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Filter => "filter",
            Stage::Dereplicate => "dereplicate",
            Stage::Denoise => "denoise",
            Stage::Sort => "sort",
            Stage::Cluster => "cluster",
            Stage::CleanPadding => "clean-padding",
            Stage::ChimeraFilter => "chimera-filter",
            Stage::MockAnnotate => "mock-annotate",
            Stage::MapReads => "map-reads",
            Stage::BuildTable => "build-table",
            Stage::MockEvaluate => "mock-evaluate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mock community sequenced alongside the samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MockOptions {
    /// Sample (barcode) label of the mock in the OTU table.
    pub label: String,
    /// Multi-FASTA of the mock's member sequences.
    pub reference: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub fastq: PathBuf,
    /// Base name for every output file.
    pub out: String,
    /// Expected-errors threshold, kept as given since it is part of file names.
    pub max_ee: String,
    pub pct_otu: u32,
    pub min_size: u32,
    pub trunc_len: u32,
    pub map_identity: f64,
    pub unoise: bool,
    pub size_annotations: bool,
    pub map_unfiltered: bool,
    pub chimera_db: Option<PathBuf>,
    pub mock: Option<MockOptions>,
}

impl PipelineOptions {
    pub fn new(fastq: impl Into<PathBuf>, out: impl Into<String>) -> Self {
        Self {
            fastq: fastq.into(),
            out: out.into(),
            max_ee: "1.0".to_string(),
            pct_otu: 97,
            min_size: 2,
            trunc_len: 250,
            map_identity: 0.97,
            unoise: false,
            size_annotations: false,
            map_unfiltered: false,
            chimera_db: None,
            mock: None,
        }
    }

    pub fn otu_radius_pct(&self) -> Result<u32> {
        100u32
            .checked_sub(self.pct_otu)
            .ok_or_else(|| PipelineError::InvalidRequest {
                stage: Stage::Cluster.name().to_string(),
                reason: format!("OTU clustering percent {} is above 100", self.pct_otu),
            })
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub paths: OutputPaths,
    pub stages: Vec<Stage>,
    /// Final OTU FASTA the reads were mapped against.
    pub otus: PathBuf,
    pub evaluation: Option<MockEvaluation>,
}

/// Rejects inputs the 32-bit engine cannot address.
pub fn check_input_size(path: &Path) -> Result<u64> {
    let size = file_size(path)?;
    if size >= MAX_INPUT_BYTES {
        return Err(PipelineError::InputTooLarge {
            path: path.to_path_buf(),
            size,
        });
    }
    Ok(size)
}

pub struct Pipeline<'a> {
    options: &'a PipelineOptions,
    engine: &'a dyn ClusterEngine,
    converter: &'a dyn TableConverter,
    log: &'a RunLog,
    paths: OutputPaths,
    current_reads: PathBuf,
    current_seqs: Option<PathBuf>,
    current_otus: Option<PathBuf>,
    completed: Vec<Stage>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        options: &'a PipelineOptions,
        engine: &'a dyn ClusterEngine,
        converter: &'a dyn TableConverter,
        log: &'a RunLog,
    ) -> Self {
        Self {
            options,
            engine,
            converter,
            log,
            paths: OutputPaths::new(&options.out, &options.max_ee),
            current_reads: options.fastq.clone(),
            current_seqs: None,
            current_otus: None,
            completed: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<PipelineReport> {
        let options = self.options;
        self.check_preconditions()?;

        self.filter()?;
        self.dereplicate()?;
        if options.unoise {
            self.denoise()?;
        }
        self.sort()?;
        self.cluster()?;
        self.clean_padding()?;
        if let Some(database) = &options.chimera_db {
            self.chimera_filter(database)?;
        }
        let theoretical = match &options.mock {
            Some(mock) => Some(self.mock_annotate(mock)?),
            None => None,
        };
        self.map_reads()?;
        self.build_table()?;
        let evaluation = match &options.mock {
            Some(mock) => Some(self.mock_evaluate(mock, theoretical)?),
            None => None,
        };

        let otus = self.otus()?.to_path_buf();
        Ok(PipelineReport {
            paths: self.paths,
            stages: self.completed,
            otus,
            evaluation,
        })
    }

    fn check_preconditions(&self) -> Result<()> {
        let version = self.engine.version()?;
        self.log.info(format!("{} version: {}", self.engine.name(), version));

        let size = check_input_size(&self.options.fastq)?;
        self.log.info("Loading FASTQ Records");
        let total = count_fastq(&self.options.fastq)?;
        self.log.info(format!(
            "{} reads ({})",
            with_thousands(total),
            human_size(size)
        ));
        Ok(())
    }

    fn seqs(&self) -> Result<&Path> {
        self.current_seqs.as_deref().ok_or_else(|| out_of_order(Stage::Sort))
    }

    fn otus(&self) -> Result<&Path> {
        self.current_otus.as_deref().ok_or_else(|| out_of_order(Stage::MapReads))
    }

    fn finish(&mut self, stage: Stage) {
        self.completed.push(stage);
    }

    /// Validates, runs and verifies one engine call.
    fn run_engine(&self, stage: Stage, request: StageRequest) -> Result<PathBuf> {
        request.validate().map_err(|e| retag(stage, e))?;
        self.log.debug(format!("{} {}", self.engine.name(), request));

        remove_stale(&request.output)?;
        let progress = ProgressBarBuilder::new(format!("Running {}...", stage))
            .with_tick()
            .build();
        let result = self.engine.run(&request);
        progress.finish_and_clear();
        result.map_err(|e| retag(stage, e))?;

        require_output(stage, &request.output)?;
        Ok(request.output)
    }

    fn filter(&mut self) -> Result<()> {
        self.log.info(format!(
            "Quality Filtering, expected errors < {}",
            self.options.max_ee
        ));
        let request = StageRequest::new(
            StageKind::QualityFilter {
                trunc_len: self.options.trunc_len,
                max_ee: self.options.max_ee.clone(),
            },
            &self.options.fastq,
            &self.paths.filtered,
        );
        self.current_reads = self.run_engine(Stage::Filter, request)?;
        let total = count_fastq(&self.current_reads)?;
        self.log.info(format!("{} reads passed", with_thousands(total)));
        self.finish(Stage::Filter);
        Ok(())
    }

    fn dereplicate(&mut self) -> Result<()> {
        self.log.info("De-replication (remove duplicate reads)");
        let stats = derep::dereplicate(&self.current_reads, &self.paths.derep)?;
        self.log.debug(format!(
            "{} reads collapsed into {} unique sequences",
            stats.input_reads, stats.unique_sequences
        ));
        self.log.info(format!(
            "{} reads passed",
            with_thousands(stats.unique_sequences)
        ));
        self.current_seqs = Some(self.paths.derep.clone());
        self.finish(Stage::Dereplicate);
        Ok(())
    }

    fn denoise(&mut self) -> Result<()> {
        self.log.info("Denoising Data with UNOISE");
        let request = StageRequest::new(StageKind::Denoise, self.seqs()?, &self.paths.denoised);
        let denoised = self.run_engine(Stage::Denoise, request)?;
        self.log.info(format!(
            "{} reads passed",
            with_thousands(count_fasta(&denoised)?)
        ));
        self.current_seqs = Some(denoised);
        self.finish(Stage::Denoise);
        Ok(())
    }

    fn sort(&mut self) -> Result<()> {
        self.log.info("Sorting reads by size");
        let request = StageRequest::new(
            StageKind::SortBySize {
                min_size: self.options.min_size,
            },
            self.seqs()?,
            &self.paths.sorted,
        );
        self.current_seqs = Some(self.run_engine(Stage::Sort, request)?);
        self.finish(Stage::Sort);
        Ok(())
    }

    fn cluster(&mut self) -> Result<()> {
        self.log.info("Clustering OTUs (UPARSE)");
        let request = StageRequest::new(
            StageKind::ClusterOtus {
                radius_pct: self.options.otu_radius_pct()?,
                size_annotations: self.options.size_annotations,
            },
            self.seqs()?,
            &self.paths.otus,
        );
        let otus = self.run_engine(Stage::Cluster, request)?;
        self.log.info(format!("{} OTUs", with_thousands(count_fasta(&otus)?)));
        self.current_otus = Some(otus);
        self.finish(Stage::Cluster);
        Ok(())
    }

    fn clean_padding(&mut self) -> Result<()> {
        self.log.info("Cleaning up padding from OTUs");
        let records = padding::clean_padding_file(self.otus()?, &self.paths.clean_otus)?;
        self.log.debug(format!(
            "{} OTUs written to {}",
            records,
            self.paths.clean_otus.display()
        ));
        self.current_otus = Some(self.paths.clean_otus.clone());
        self.finish(Stage::CleanPadding);
        Ok(())
    }

    fn chimera_filter(&mut self, database: &Path) -> Result<()> {
        self.log.info("Chimera Filtering (UCHIME)");
        let request = StageRequest::new(
            StageKind::ChimeraFilter {
                database: database.to_path_buf(),
            },
            self.otus()?,
            &self.paths.uchime_otus,
        );
        let filtered = self.run_engine(Stage::ChimeraFilter, request)?;
        self.log.info(format!(
            "{} OTUs passed",
            with_thousands(count_fasta(&filtered)?)
        ));
        self.current_otus = Some(filtered);
        self.finish(Stage::ChimeraFilter);
        Ok(())
    }

    /// Relabels OTUs that hit a mock member. Returns the mock's member count.
    fn mock_annotate(&mut self, mock: &MockOptions) -> Result<usize> {
        self.log.info("Mapping Mock Community");
        let request = StageRequest::new(
            StageKind::MapGlobal {
                database: mock.reference.clone(),
                identity: self.options.map_identity,
            },
            self.otus()?,
            &self.paths.mock_map,
        );
        let mock_map = self.run_engine(Stage::MockAnnotate, request)?;
        let theoretical = count_fasta(&mock.reference)?;

        let stats = mock_annotate::annotate_file(self.otus()?, &mock_map, &self.paths.mock_otus)?;
        self.log.debug(format!(
            "{} of {} OTUs relabelled from {}",
            stats.relabelled,
            stats.records,
            mock.reference.display()
        ));
        self.current_otus = Some(self.paths.mock_otus.clone());
        self.finish(Stage::MockAnnotate);
        Ok(theoretical)
    }

    fn map_reads(&mut self) -> Result<()> {
        let reads = if self.options.map_unfiltered {
            self.options.fastq.as_path()
        } else {
            self.current_reads.as_path()
        };
        self.log.info("Mapping Reads to OTUs");
        let request = StageRequest::new(
            StageKind::MapGlobal {
                database: self.otus()?.to_path_buf(),
                identity: self.options.map_identity,
            },
            reads,
            &self.paths.mapping,
        );
        self.run_engine(Stage::MapReads, request)?;
        self.finish(Stage::MapReads);
        Ok(())
    }

    fn build_table(&mut self) -> Result<()> {
        self.log.info("Creating OTU Table");
        self.log.debug(format!(
            "{} {} {}",
            self.converter.name(),
            self.paths.mapping.display(),
            self.paths.otu_table.display()
        ));
        remove_stale(&self.paths.otu_table)?;
        self.converter
            .convert(&self.paths.mapping, &self.paths.otu_table)
            .map_err(|e| retag(Stage::BuildTable, e))?;
        require_output(Stage::BuildTable, &self.paths.otu_table)?;
        self.finish(Stage::BuildTable);
        Ok(())
    }

    fn mock_evaluate(&mut self, mock: &MockOptions, theoretical: Option<usize>) -> Result<MockEvaluation> {
        let evaluation = accuracy::evaluate(&self.paths.otu_table, &mock.label, theoretical)?;
        match &evaluation {
            MockEvaluation::Evaluated(summary) => {
                self.log.debug(format!(
                    "{}: {} OTUs, {} real, {} spurious",
                    summary.mock_label, summary.num_otus, summary.mock_found, summary.spurious
                ));
                fs::remove_file(&self.paths.mock_map)
                    .map_err(|e| PipelineError::io(&self.paths.mock_map, e))?;
            }
            MockEvaluation::NotApplicable { mock_label } => {
                self.log.warn(format!(
                    "{} not found in OTU table, skipping stats",
                    mock_label
                ));
            }
        }
        self.finish(Stage::MockEvaluate);
        Ok(evaluation)
    }
}

/// Reports stage-scoped errors under the orchestrator's stage name; several
/// stages share one engine operation.
fn retag(stage: Stage, err: PipelineError) -> PipelineError {
    match err {
        PipelineError::StageFailed { reason, .. } => PipelineError::StageFailed {
            stage: stage.name().to_string(),
            reason,
        },
        PipelineError::InvalidRequest { reason, .. } => PipelineError::InvalidRequest {
            stage: stage.name().to_string(),
            reason,
        },
        other => other,
    }
}

/// A leftover from an earlier run must not pass the output check.
fn remove_stale(output: &Path) -> Result<()> {
    if output.is_file() {
        fs::remove_file(output).map_err(|e| PipelineError::io(output, e))?;
    }
    Ok(())
}

fn require_output(stage: Stage, output: &Path) -> Result<()> {
    if !output.is_file() {
        return Err(PipelineError::StageFailed {
            stage: stage.name().to_string(),
            reason: format!("expected output {} was not written", output.display()),
        });
    }
    Ok(())
}

fn out_of_order(stage: Stage) -> PipelineError {
    PipelineError::InvalidRequest {
        stage: stage.name().to_string(),
        reason: "no input produced by an earlier stage".to_string(),
    }
}

/// `1234567` → `1,234,567`.
pub fn with_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separator() {
        assert_eq!(with_thousands(0), "0");
        assert_eq!(with_thousands(999), "999");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn radius_is_complement_of_percent() {
        let mut options = PipelineOptions::new("reads.fq", "out");
        assert_eq!(options.otu_radius_pct().unwrap(), 3);
        options.pct_otu = 101;
        assert!(options.otu_radius_pct().is_err());
    }

    #[test]
    fn shared_engine_operations_report_the_pipeline_stage() {
        let invalid = PipelineError::InvalidRequest {
            stage: "map".to_string(),
            reason: "database mock.fa does not exist".to_string(),
        };
        assert!(matches!(
            retag(Stage::MockAnnotate, invalid),
            PipelineError::InvalidRequest { ref stage, .. } if stage == "mock-annotate"
        ));

        let failed = PipelineError::StageFailed {
            stage: "map".to_string(),
            reason: "exit status: 1".to_string(),
        };
        assert!(matches!(
            retag(Stage::MapReads, failed),
            PipelineError::StageFailed { ref stage, .. } if stage == "map-reads"
        ));
    }

    #[test]
    fn stage_names_match_log_wording() {
        assert_eq!(Stage::CleanPadding.to_string(), "clean-padding");
        assert_eq!(Stage::MockEvaluate.to_string(), "mock-evaluate");
    }
}
