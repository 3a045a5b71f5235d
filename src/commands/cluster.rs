use crate::cli::ClusterArgs;
use crate::commands::mock_stats::{print_evaluation, write_summary_json};
use crate::config::Config;
use crate::otu::MockEvaluation;
use crate::pipeline::{MockOptions, OutputPaths, Pipeline, PipelineOptions, PipelineReport};
use crate::types::DEFAULT_MOCK_REFERENCE;
use crate::utils::external_tools::{Uc2OtuTable, Usearch};
use crate::utils::run_log::RunLog;
use anyhow::{Context, Result};

const RULE: &str = "-------------------------------------------------------";

pub fn run(args: ClusterArgs) -> Result<()> {
    let config = Config::load();

    let log_path = OutputPaths::log_for(&args.out);
    let log = RunLog::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
    log.debug(std::env::args().collect::<Vec<_>>().join(" "));
    log.info(format!("Operating system: {}", std::env::consts::OS));

    let options = pipeline_options(&args, &config);
    let engine = Usearch::new(args.usearch.clone().unwrap_or_else(|| config.usearch.clone()));
    let converter = Uc2OtuTable::new(config.uc2otutable());

    let report = Pipeline::new(&options, &engine, &converter, &log)
        .run()
        .map_err(|e| {
            log.error(e.to_string());
            e
        })
        .context("OTU clustering failed")?;

    if let Some(evaluation) = &report.evaluation {
        if let MockEvaluation::Evaluated(_) = evaluation {
            println!("{}", RULE);
            println!(
                "Summarizing data for {}, Length: {} bp, Quality Trimming: EE {}",
                args.out, args.length, args.max_ee
            );
            println!("{}", RULE);
        }
        print_evaluation(evaluation);
        if let Some(path) = &args.summary_json {
            write_summary_json(path, evaluation)?;
        }
    }

    print_outputs(&args, &options, &report, &log);
    Ok(())
}

fn pipeline_options(args: &ClusterArgs, config: &Config) -> PipelineOptions {
    let reference_dir = config.reference_dir();

    let mut options = PipelineOptions::new(&args.fastq, args.out.clone());
    options.max_ee = args.max_ee.clone();
    options.pct_otu = args.pct_otu;
    options.min_size = args.min_size;
    options.trunc_len = args.length;
    options.map_identity = config.map_identity;
    options.unoise = args.unoise;
    options.size_annotations = args.size_annotations;
    options.map_unfiltered = args.map_unfiltered;
    options.chimera_db = args.uchime_ref.map(|db| db.path_in(&reference_dir));
    options.mock = args.mock.clone().map(|label| MockOptions {
        label,
        reference: args
            .mock_reference
            .clone()
            .unwrap_or_else(|| reference_dir.join(DEFAULT_MOCK_REFERENCE)),
    });
    options
}

fn print_outputs(args: &ClusterArgs, options: &PipelineOptions, report: &PipelineReport, log: &RunLog) {
    let paths = &report.paths;
    println!("{}", RULE);
    println!("OTU Clustering Script has Finished Successfully");
    println!("{}", RULE);
    println!("Input FASTQ:           {}", args.fastq.display());
    println!("Filtered FASTQ:        {}", paths.filtered.display());
    println!("Dereplicated FASTA:    {}", paths.derep.display());
    if options.unoise {
        println!("Denoised FASTA:        {}", paths.denoised.display());
    }
    println!("Sorted FASTA:          {}", paths.sorted.display());
    println!("Clustered OTUs:        {}", paths.clean_otus.display());
    if options.chimera_db.is_some() {
        println!("Chimera Filtered OTUs: {}", paths.uchime_otus.display());
    }
    if options.mock.is_some() {
        println!("Mock Annotated OTUs:   {}", paths.mock_otus.display());
    }
    println!("UCLUST Mapping file:   {}", paths.mapping.display());
    println!("OTU Table:             {}", paths.otu_table.display());
    if let Some(path) = log.path() {
        println!("LogFile:               {}", path.display());
    }
    println!("{}", RULE);
}
