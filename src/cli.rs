use crate::types::ChimeraReference;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Also show debug lines (engine command lines) on the console
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cluster reads into OTUs with UPARSE and build an OTU table
    Cluster(ClusterArgs),

    /// Collapse identical reads of a FASTQ into size-annotated FASTA
    Dereplicate {
        /// Quality-filtered FASTQ file
        input: PathBuf,
        /// Output FASTA of unique sequences
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Summarize mock community accuracy from an existing OTU table
    MockStats {
        /// Tab-delimited OTU table
        table: PathBuf,
        /// Sample label of the mock community
        #[arg(long)]
        mock: String,
        /// Multi-FASTA of the mock community, for the theoretical OTU count
        #[arg(long = "mc")]
        mock_reference: Option<PathBuf>,
        /// Also write the summary as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ClusterArgs {
    /// Demultiplexed FASTQ file
    #[arg(short = 'i', long = "fastq")]
    pub fastq: PathBuf,

    /// Base output name
    #[arg(short = 'o', long = "out", default_value = "out")]
    pub out: String,

    /// Quality trim expected errors value
    #[arg(short = 'e', long = "maxee", default_value = "1.0")]
    pub max_ee: String,

    /// OTU clustering percent
    #[arg(short = 'p', long = "pct-otu", alias = "pct_otu", default_value = "97")]
    pub pct_otu: u32,

    /// Minimum size to keep for clustering
    #[arg(short = 'm', long = "minsize", default_value = "2")]
    pub min_size: u32,

    /// Length to trim reads
    #[arg(short = 'l', long = "length", default_value = "250")]
    pub length: u32,

    /// Clustering engine executable (overrides the config file)
    #[arg(short = 'u', long = "usearch")]
    pub usearch: Option<String>,

    /// Spike-in control: sample label of the mock community
    #[arg(long)]
    pub mock: Option<String>,

    /// Multi-FASTA mock community (default: ufits_mock3.fa in the reference directory)
    #[arg(long = "mc")]
    pub mock_reference: Option<PathBuf>,

    /// Run reference-based chimera filtering against this database
    #[arg(long = "uchime-ref", alias = "uchime_ref", value_enum)]
    pub uchime_ref: Option<ChimeraReference>,

    /// Map the original reads, not the filtered ones, back to OTUs
    #[arg(long, alias = "map_unfiltered")]
    pub map_unfiltered: bool,

    /// Denoise dereplicated reads before clustering
    #[arg(long)]
    pub unoise: bool,

    /// Keep size annotations on clustered OTUs
    #[arg(long, alias = "size_annotations")]
    pub size_annotations: bool,

    /// Write the mock accuracy summary as JSON
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}
