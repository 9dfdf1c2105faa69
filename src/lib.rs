// imports of other modules from this crate
mod block_id;
pub use block_id::normalize_block_id;

mod geometry;
pub use geometry::{BoundingBox, GeoPoint, MeanPoint};

mod trips;
pub use trips::{parse_timestamp, parse_weekday, subsample_trips, weekday_name, TripFilter,
                TripRecord};

mod blocks;
pub use blocks::{count_connections, BlockConnections, BlockPositions};

mod route_stats;
pub use route_stats::{RouteStat, RouteStats};

mod slot_graphs;
pub use slot_graphs::{EdgeMergePolicy, SlotGraph, SlotGraphIndex, SlotKey};

mod landmarks;
pub use landmarks::{all_tour_routes, Landmark, LandmarkSite, Landmarks, TourRoute};

mod route_sim;
pub use route_sim::{round_to_hundredths, ExclusionCounts, LegResult, RouteFailure, RouteRow,
                    RouteSimulator, RouteSweep, SimulatedRoute};

mod degrees;
pub use degrees::{node_degrees, DegreeRow};

mod summary;
pub use summary::{travel_time_by_day, travel_vs_congestion, CongestionRow, DayTravelTime};

pub mod output;

mod config;
pub use config::{str_to_absolute_path, AnalysisConfig};

mod analysis;
pub use analysis::{summarize_outputs, AnalysisReport, TaxiAnalysis, BLOCK_CONNECTIONS_CSV,
                   DEGREES_CSV, ROUTES_CSV, ROUTE_STATS_CSV, TRAVEL_TIME_BY_DAY_CSV,
                   TRAVEL_VS_CONGESTION_CSV};
