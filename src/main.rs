use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger;

use taxi_slot_routes::{summarize_outputs, weekday_name, AnalysisConfig, TaxiAnalysis};


#[derive(Parser)]
#[command(name = "taxi_slot_routes",
          about = "Times trips between Manhattan landmarks over hourly taxi travel-time graphs")]
struct Cli {
    /// YAML config file; defaults are used for anything it leaves out
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the config's trip table
    #[arg(long)]
    trips: Option<PathBuf>,
    /// Overrides the config's output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the slot graphs, evaluate every route and write all tables (the default)
    Run,
    /// Recompute the summary tables from route and degree tables already written
    Summarize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(trips) = cli.trips {
        config.trips_path = trips;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let analysis = TaxiAnalysis::from_config(config)?;
            let report = analysis.run()?;
            for row in &report.travel_time_by_day {
                println!("{}: mean time on road {:.2} min over {} routes",
                         weekday_name(row.day), row.mean_total_time, row.route_count);
            }
            if report.sweep.exclusions.total() > 0 {
                println!("{} route combinations could not be evaluated",
                         report.sweep.exclusions.total());
            }
        }
        Commands::Summarize => {
            let (by_day, _) = summarize_outputs(&config.output_dir)?;
            for row in &by_day {
                println!("{}: mean time on road {:.2} min over {} routes",
                         weekday_name(row.day), row.mean_total_time, row.route_count);
            }
        }
    }
    Ok(())
}
