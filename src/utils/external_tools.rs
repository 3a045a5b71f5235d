use crate::error::{PipelineError, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Operation requested from the clustering engine, with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum StageKind {
    QualityFilter { trunc_len: u32, max_ee: String },
    Denoise,
    SortBySize { min_size: u32 },
    ClusterOtus { radius_pct: u32, size_annotations: bool },
    ChimeraFilter { database: PathBuf },
    MapGlobal { database: PathBuf, identity: f64 },
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::QualityFilter { .. } => "filter",
            StageKind::Denoise => "denoise",
            StageKind::SortBySize { .. } => "sort",
            StageKind::ClusterOtus { .. } => "cluster",
            StageKind::ChimeraFilter { .. } => "chimera-filter",
            StageKind::MapGlobal { .. } => "map",
        }
    }
}

/// One call to the clustering engine: input file in, output file out.
#[derive(Debug, Clone, PartialEq)]
pub struct StageRequest {
    pub kind: StageKind,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl StageRequest {
    pub fn new(kind: StageKind, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Checks everything the engine needs before it is spawned.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| PipelineError::InvalidRequest {
            stage: self.name().to_string(),
            reason,
        };

        if !self.input.is_file() {
            return Err(invalid(format!("input {} does not exist", self.input.display())));
        }
        if self.output.as_os_str().is_empty() {
            return Err(invalid("output path is empty".to_string()));
        }
        if self.input == self.output {
            return Err(invalid("input and output are the same file".to_string()));
        }
        match &self.kind {
            StageKind::ChimeraFilter { database } | StageKind::MapGlobal { database, .. }
                if !database.is_file() =>
            {
                Err(invalid(format!("database {} does not exist", database.display())))
            }
            StageKind::MapGlobal { identity, .. } if !(0.0..=1.0).contains(identity) => {
                Err(invalid(format!("identity {} is outside 0..=1", identity)))
            }
            StageKind::ClusterOtus { radius_pct, .. } if *radius_pct > 100 => {
                Err(invalid(format!("OTU radius {}% is above 100", radius_pct)))
            }
            _ => Ok(()),
        }
    }

    /// Engine flags for this request, in the order USEARCH expects them.
    pub fn args(&self) -> Vec<OsString> {
        fn flags(args: &mut Vec<OsString>, values: &[&str]) {
            args.extend(values.iter().map(OsString::from));
        }

        let input = self.input.clone().into_os_string();
        let output = self.output.clone().into_os_string();
        let mut args: Vec<OsString> = Vec::new();

        match &self.kind {
            StageKind::QualityFilter { trunc_len, max_ee } => {
                flags(&mut args, &["-fastq_filter"]);
                args.push(input);
                let trunc_len = trunc_len.to_string();
                flags(
                    &mut args,
                    &["-fastq_trunclen", trunc_len.as_str(), "-fastq_maxee", max_ee.as_str(), "-fastqout"],
                );
                args.push(output);
            }
            StageKind::Denoise => {
                flags(&mut args, &["-cluster_fast"]);
                args.push(input);
                flags(&mut args, &["-centroids"]);
                args.push(output);
                flags(
                    &mut args,
                    &["-id", "0.9", "-maxdiffs", "5", "-abskew", "10", "-sizein", "-sizeout", "-sort", "size"],
                );
            }
            StageKind::SortBySize { min_size } => {
                flags(&mut args, &["-sortbysize"]);
                args.push(input);
                let min_size = min_size.to_string();
                flags(&mut args, &["-minsize", min_size.as_str(), "-fastaout"]);
                args.push(output);
            }
            StageKind::ClusterOtus {
                radius_pct,
                size_annotations,
            } => {
                flags(&mut args, &["-cluster_otus"]);
                args.push(input);
                if *size_annotations {
                    flags(&mut args, &["-sizein", "-sizeout"]);
                }
                let radius_pct = radius_pct.to_string();
                flags(&mut args, &["-relabel", "OTU_", "-otu_radius_pct", radius_pct.as_str(), "-otus"]);
                args.push(output);
            }
            StageKind::ChimeraFilter { database } => {
                flags(&mut args, &["-uchime_ref"]);
                args.push(input);
                flags(&mut args, &["-strand", "plus", "-db"]);
                args.push(database.clone().into_os_string());
                flags(&mut args, &["-nonchimeras"]);
                args.push(output);
            }
            StageKind::MapGlobal { database, identity } => {
                flags(&mut args, &["-usearch_global"]);
                args.push(input);
                let identity = identity.to_string();
                flags(&mut args, &["-strand", "plus", "-id", identity.as_str(), "-db"]);
                args.push(database.clone().into_os_string());
                flags(&mut args, &["-uc"]);
                args.push(output);
            }
        }
        args
    }
}

impl fmt::Display for StageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self
            .args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        write!(f, "{}", args.join(" "))
    }
}

/// The external clustering engine. Implementations block until the call is done.
pub trait ClusterEngine {
    /// Name used in log lines (usually the binary).
    fn name(&self) -> &str;
    /// Version banner; failing here means the engine is unusable.
    fn version(&self) -> Result<String>;
    /// Runs one stage. Must fail when the engine exits unsuccessfully.
    fn run(&self, request: &StageRequest) -> Result<()>;
}

/// External uc → OTU table converter.
pub trait TableConverter {
    fn name(&self) -> &str;
    fn convert(&self, mapping: &Path, table: &Path) -> Result<()>;
}

/// USEARCH (or a compatible binary) run as a subprocess.
pub struct Usearch {
    binary: String,
}

impl Usearch {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl ClusterEngine for Usearch {
    fn name(&self) -> &str {
        &self.binary
    }

    fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("-version")
            .output()
            .map_err(|source| PipelineError::EngineUnavailable {
                engine: self.binary.clone(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run(&self, request: &StageRequest) -> Result<()> {
        let status = Command::new(&self.binary)
            .args(request.args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| PipelineError::StageFailed {
                stage: request.name().to_string(),
                reason: format!("could not start {}: {}", self.binary, e),
            })?;

        if !status.success() {
            return Err(PipelineError::StageFailed {
                stage: request.name().to_string(),
                reason: format!("{} exited with {}", self.binary, status),
            });
        }
        Ok(())
    }
}

/// The `uc2otutable.py` helper script.
pub struct Uc2OtuTable {
    script: PathBuf,
}

impl Uc2OtuTable {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl TableConverter for Uc2OtuTable {
    fn name(&self) -> &str {
        self.script.to_str().unwrap_or("uc2otutable")
    }

    fn convert(&self, mapping: &Path, table: &Path) -> Result<()> {
        let status = Command::new(&self.script)
            .arg(mapping)
            .arg(table)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| PipelineError::StageFailed {
                stage: "build-table".to_string(),
                reason: format!("could not start {}: {}", self.script.display(), e),
            })?;

        if !status.success() {
            return Err(PipelineError::StageFailed {
                stage: "build-table".to_string(),
                reason: format!("{} exited with {}", self.script.display(), status),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn joined(request: &StageRequest) -> String {
        request.to_string()
    }

    #[test]
    fn quality_filter_flags() {
        let request = StageRequest::new(
            StageKind::QualityFilter {
                trunc_len: 250,
                max_ee: "1.0".to_string(),
            },
            "in.fq",
            "out.EE1.0.filter.fq",
        );
        assert_eq!(
            joined(&request),
            "-fastq_filter in.fq -fastq_trunclen 250 -fastq_maxee 1.0 -fastqout out.EE1.0.filter.fq"
        );
    }

    #[test]
    fn cluster_flags_follow_size_annotations() {
        let mut kind = StageKind::ClusterOtus {
            radius_pct: 3,
            size_annotations: false,
        };
        let request = StageRequest::new(kind.clone(), "s.fa", "o.fa");
        assert_eq!(
            joined(&request),
            "-cluster_otus s.fa -relabel OTU_ -otu_radius_pct 3 -otus o.fa"
        );

        if let StageKind::ClusterOtus {
            size_annotations, ..
        } = &mut kind
        {
            *size_annotations = true;
        }
        let request = StageRequest::new(kind, "s.fa", "o.fa");
        assert_eq!(
            joined(&request),
            "-cluster_otus s.fa -sizein -sizeout -relabel OTU_ -otu_radius_pct 3 -otus o.fa"
        );
    }

    #[test]
    fn map_global_flags() {
        let request = StageRequest::new(
            StageKind::MapGlobal {
                database: PathBuf::from("otus.fa"),
                identity: 0.97,
            },
            "reads.fq",
            "map.uc",
        );
        assert_eq!(
            joined(&request),
            "-usearch_global reads.fq -strand plus -id 0.97 -db otus.fa -uc map.uc"
        );
    }

    #[test]
    fn validate_rejects_missing_input() {
        let request = StageRequest::new(StageKind::Denoise, "/no/such/derep.fa", "out.fa");
        let err = request.validate().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest { ref stage, .. } if stage == "denoise"));
    }

    #[test]
    fn validate_rejects_missing_database() {
        let input = NamedTempFile::new().unwrap();
        let request = StageRequest::new(
            StageKind::ChimeraFilter {
                database: PathBuf::from("/no/such/db.fasta"),
            },
            input.path(),
            "out.fa",
        );
        assert!(request.validate().is_err());
    }

    #[test]
    fn validate_accepts_existing_input() {
        let input = NamedTempFile::new().unwrap();
        let request = StageRequest::new(StageKind::SortBySize { min_size: 2 }, input.path(), "sorted.fa");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn missing_engine_is_unavailable() {
        let engine = Usearch::new("definitely-not-a-clustering-engine");
        assert!(matches!(
            engine.version(),
            Err(PipelineError::EngineUnavailable { .. })
        ));
    }
}
