use std::error::Error;
use std::path::Path;

use super::blocks::{count_connections, BlockConnections, BlockPositions};
use super::config::AnalysisConfig;
use super::degrees::{node_degrees, DegreeRow};
use super::landmarks::{all_tour_routes, Landmark};
use super::output;
use super::route_sim::{RouteSimulator, RouteSweep};
use super::route_stats::RouteStats;
use super::slot_graphs::SlotGraphIndex;
use super::summary::{travel_time_by_day, travel_vs_congestion, CongestionRow, DayTravelTime};
use super::trips::{subsample_trips, TripRecord};

pub static ROUTES_CSV: &str = "popular_routes.csv";
pub static DEGREES_CSV: &str = "degrees.csv";
pub static ROUTE_STATS_CSV: &str = "route_stats.csv";
pub static BLOCK_CONNECTIONS_CSV: &str = "block_connections.csv";
pub static TRAVEL_TIME_BY_DAY_CSV: &str = "travel_time_by_day.csv";
pub static TRAVEL_VS_CONGESTION_CSV: &str = "travel_vs_congestion.csv";


/// What one full run produced.
#[derive(PartialEq, Debug, Clone)]
pub struct AnalysisReport {
    pub sweep: RouteSweep,
    pub degrees: Vec<DegreeRow>,
    pub travel_time_by_day: Vec<DayTravelTime>,
    pub travel_vs_congestion: Vec<CongestionRow>,
}

/// The trip set and everything built from it: block positions, route stats and the per-slot
/// graphs.  Built once, then read by the route and degree reports.
pub struct TaxiAnalysis {
    config: AnalysisConfig,
    trips: Vec<TripRecord>,
    positions: BlockPositions,
    route_stats: RouteStats,
    graphs: SlotGraphIndex,
}

impl TaxiAnalysis {
    pub fn from_cfg(config_path: &Path) -> Result<TaxiAnalysis, Box<dyn Error>> {
        let config = AnalysisConfig::from_file(config_path)?;
        TaxiAnalysis::from_config(config)
    }

    /// Loads, filters and optionally subsamples the configured trip file, then builds.
    pub fn from_config(config: AnalysisConfig) -> Result<TaxiAnalysis, Box<dyn Error>> {
        config.validate()?;
        let trips = TripRecord::all_from_csv(&config.trips_path)?;
        let trips = config.trip_filter.apply(trips);
        let trips = subsample_trips(trips, config.subsample_fraction, config.random_seed);
        Ok(TaxiAnalysis::from_trips(config, trips))
    }

    /// Builds from trips that have already been loaded and filtered.
    pub fn from_trips(config: AnalysisConfig, trips: Vec<TripRecord>) -> TaxiAnalysis {
        log::info!("building graphs from {} trips", trips.len());
        let positions = BlockPositions::from_trips(&trips);
        for landmark in Landmark::ALL.iter() {
            let block_id = config.landmarks.block_id(*landmark);
            if !positions.contains(block_id) {
                log::warn!("{} (block {}) never appears in the trips", landmark, block_id);
            }
        }

        let route_stats = RouteStats::from_trips(&trips);
        let graphs = SlotGraphIndex::build(&route_stats, &positions, &config.hours, &config.days,
                                           config.edge_merge);
        TaxiAnalysis{config, trips, positions, route_stats, graphs}
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn trips(&self) -> &[TripRecord] {
        &self.trips
    }

    pub fn positions(&self) -> &BlockPositions {
        &self.positions
    }

    pub fn route_stats(&self) -> &RouteStats {
        &self.route_stats
    }

    pub fn graphs(&self) -> &SlotGraphIndex {
        &self.graphs
    }

    pub fn evaluate_routes(&self) -> RouteSweep {
        let simulator = RouteSimulator::new(&self.graphs, &self.config.landmarks);
        simulator.evaluate(&all_tour_routes(), &self.config.start_hours, &self.config.days)
    }

    pub fn node_degrees(&self) -> Vec<DegreeRow> {
        node_degrees(&self.graphs, &self.config.landmarks.block_ids())
    }

    pub fn block_connections(&self) -> Vec<BlockConnections> {
        count_connections(&self.trips, &self.positions)
    }

    /// Computes every report and writes all the output tables.
    pub fn run(&self) -> Result<AnalysisReport, Box<dyn Error>> {
        let output_dir = &self.config.output_dir;
        std::fs::create_dir_all(output_dir)?;

        output::write_route_stats(&output_dir.join(ROUTE_STATS_CSV), &self.route_stats)?;
        output::write_block_connections(&output_dir.join(BLOCK_CONNECTIONS_CSV),
                                        &self.block_connections())?;

        let degrees = self.node_degrees();
        output::write_degrees(&output_dir.join(DEGREES_CSV), &degrees)?;

        let sweep = self.evaluate_routes();
        output::write_routes(&output_dir.join(ROUTES_CSV), &sweep.rows)?;

        let by_day = travel_time_by_day(&sweep.rows);
        let congestion = travel_vs_congestion(&sweep.rows, &degrees);
        write_summaries(output_dir, &by_day, &congestion)?;

        Ok(AnalysisReport {
            sweep,
            degrees,
            travel_time_by_day: by_day,
            travel_vs_congestion: congestion,
        })
    }
}

fn write_summaries(output_dir: &Path, by_day: &[DayTravelTime], congestion: &[CongestionRow])
                   -> Result<(), Box<dyn Error>> {
    output::write_travel_time_by_day(&output_dir.join(TRAVEL_TIME_BY_DAY_CSV), by_day)?;
    output::write_travel_vs_congestion(&output_dir.join(TRAVEL_VS_CONGESTION_CSV), congestion)?;
    log::info!("wrote summaries to {}", output_dir.display());
    Ok(())
}

/// Recomputes the summary tables from route and degree tables already in `output_dir`.
/// Without a degree table the congestion comparison only has route times.
pub fn summarize_outputs(output_dir: &Path)
                         -> Result<(Vec<DayTravelTime>, Vec<CongestionRow>), Box<dyn Error>> {
    let routes = output::read_routes(&output_dir.join(ROUTES_CSV))?;
    let degrees_path = output_dir.join(DEGREES_CSV);
    let degrees = if degrees_path.exists() {
        output::read_degrees(&degrees_path)?
    } else {
        log::warn!("no degree table in {}, skipping degrees", output_dir.display());
        vec![]
    };

    let by_day = travel_time_by_day(&routes);
    let congestion = travel_vs_congestion(&routes, &degrees);
    write_summaries(output_dir, &by_day, &congestion)?;
    Ok((by_day, congestion))
}
