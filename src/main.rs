use clap::Parser;
use otu_cluster_tools::{cli, commands, logging};

fn main() {
    let args = cli::Args::parse();
    logging::init_logger(args.verbose);

    let result = match args.command {
        cli::Commands::Cluster(cluster_args) => commands::cluster::run(cluster_args),
        cli::Commands::Dereplicate { input, output } => commands::dereplicate::run(input, output),
        cli::Commands::MockStats {
            table,
            mock,
            mock_reference,
            summary_json,
        } => commands::mock_stats::run(table, mock, mock_reference, summary_json),
        cli::Commands::Config { write } => commands::config::run(write),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
