use std::error::Error;
use std::fmt;

use chrono::Weekday;

use super::landmarks::{Landmark, Landmarks, TourRoute};
use super::slot_graphs::{SlotGraphIndex, SlotKey};
use super::trips::weekday_name;


/// Why a route couldn't be simulated.
#[derive(PartialEq, Debug, Clone)]
pub enum RouteFailure {
    /// No graph was built for the slot the route was in when it needed one.
    MissingSlot { hour: u32, day: Weekday },
    /// A landmark's block isn't a node of the slot graph.
    UnknownBlock { block_id: String, slot: SlotKey },
    /// The two blocks aren't connected in the slot graph.
    NoPath { from: String, to: String, slot: SlotKey },
}

impl fmt::Display for RouteFailure {
    fn fmt(&self, ff: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RouteFailure::MissingSlot{hour, day} =>
                write!(ff, "no graph for slot {}", SlotKey::new(*hour, *day)),
            RouteFailure::UnknownBlock{block_id, slot} =>
                write!(ff, "block {} is not in the graph for slot {}", block_id, slot),
            RouteFailure::NoPath{from, to, slot} =>
                write!(ff, "no path from {} to {} in slot {}", from, to, slot),
        }
    }
}

impl Error for RouteFailure {}


#[derive(PartialEq, Debug, Clone)]
pub struct LegResult {
    pub from: Landmark,
    pub to: Landmark,
    // the slot whose graph this leg was routed on
    pub slot: SlotKey,
    pub travel_time_min: f64,
    pub blocks: Vec<String>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SimulatedRoute {
    /// Minutes spent driving, summed over all legs.
    pub time_on_road: f64,
    /// Minutes from the start to the end of the last visit, driving and dwelling.
    pub total_time: f64,
    /// Clock hour (fractional, wrapped to [0, 24)) at the start, then at the end of the visit
    /// to each later stop.  One entry per stop.
    pub arrival_times: Vec<f64>,
    pub legs: Vec<LegResult>,
}


/// One row of the route evaluation table.
#[derive(PartialEq, Debug, Clone)]
pub struct RouteRow {
    pub route_name: String,
    pub start_time: u32,
    pub day: Weekday,
    // time on road, rounded to 2 decimals
    pub total_time: f64,
    pub arrival_times: Vec<f64>,
}

/// How many route combinations were dropped from the sweep, and why.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct ExclusionCounts {
    pub missing_slot: usize,
    pub unknown_block: usize,
    pub no_path: usize,
}

impl ExclusionCounts {
    pub fn record(&mut self, failure: &RouteFailure) {
        match failure {
            RouteFailure::MissingSlot{..} => self.missing_slot += 1,
            RouteFailure::UnknownBlock{..} => self.unknown_block += 1,
            RouteFailure::NoPath{..} => self.no_path += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_slot + self.unknown_block + self.no_path
    }
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct RouteSweep {
    pub rows: Vec<RouteRow>,
    pub exclusions: ExclusionCounts,
}


pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.).round() / 100.
}

/// Walks tourist routes over the slot graphs, always routing each leg on the graph for the
/// hour the tourist is actually in at that point.
pub struct RouteSimulator<'a> {
    graphs: &'a SlotGraphIndex,
    landmarks: &'a Landmarks,
}

impl<'a> RouteSimulator<'a> {
    pub fn new(graphs: &'a SlotGraphIndex, landmarks: &'a Landmarks) -> RouteSimulator<'a> {
        RouteSimulator{graphs, landmarks}
    }

    /// Simulates visiting `stops` in order, leaving the first at `start_hour` on `day`.
    ///
    /// Fails as a whole if any leg can't be routed; there are no partial results.
    pub fn simulate(&self, stops: &[Landmark], start_hour: u32, day: Weekday)
                    -> Result<SimulatedRoute, RouteFailure> {
        let start = start_hour as f64;
        let mut total_time = 0.;
        let mut time_on_road = 0.;
        let mut arrival_times = vec![start];
        let mut legs = vec![];

        for pair in stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let current_hour = ((start + total_time / 60.).floor() as u64 % 24) as u32;
            let slot = SlotKey::new(current_hour, day);
            let graph = match self.graphs.get(current_hour, day) {
                Some(graph) => graph,
                None => return Err(RouteFailure::MissingSlot{hour: current_hour, day}),
            };

            let from_block = self.landmarks.block_id(from);
            let to_block = self.landmarks.block_id(to);
            for block_id in &[from_block, to_block] {
                if !graph.contains_block(block_id) {
                    return Err(RouteFailure::UnknownBlock{block_id: String::from(*block_id),
                                                          slot});
                }
            }
            let (path_time, path) = match graph.shortest_path(from_block, to_block) {
                Some(found) => found,
                None => return Err(RouteFailure::NoPath{from: String::from(from_block),
                                                        to: String::from(to_block), slot}),
            };
            log::debug!("{} -> {} in slot {}: {:.2} min over {} blocks", from, to, slot,
                        path_time, path.len());

            total_time += path_time;
            time_on_road += path_time;
            total_time += self.landmarks.dwell_min(to);
            arrival_times.push((start + total_time / 60.) % 24.);

            legs.push(LegResult {
                from,
                to,
                slot,
                travel_time_min: path_time,
                blocks: path.into_iter().map(String::from).collect(),
            });
        }

        Ok(SimulatedRoute{time_on_road, total_time, arrival_times, legs})
    }

    /// Simulates every route for every start hour and day.  Combinations that fail are left
    /// out of the rows and counted in the exclusions.  Rows come out ordered by start hour,
    /// then day, then route.
    pub fn evaluate(&self, routes: &[TourRoute], start_hours: &[u32], days: &[Weekday])
                    -> RouteSweep {
        let mut sweep = RouteSweep::default();
        for start_hour in start_hours {
            for day in days {
                for route in routes {
                    match self.simulate(&route.stops, *start_hour, *day) {
                        Ok(simulated) => sweep.rows.push(RouteRow {
                            route_name: route.label(),
                            start_time: *start_hour,
                            day: *day,
                            total_time: round_to_hundredths(simulated.time_on_road),
                            arrival_times: simulated.arrival_times,
                        }),
                        Err(failure) => {
                            log::debug!("dropping {} at {} on {}: {}", route.label(), start_hour,
                                        weekday_name(*day), failure);
                            sweep.exclusions.record(&failure);
                        }
                    }
                }
            }
        }

        log::info!("evaluated {} route combinations: {} kept, {} dropped \
                    ({} missing slot, {} unknown block, {} no path)",
                   sweep.rows.len() + sweep.exclusions.total(), sweep.rows.len(),
                   sweep.exclusions.total(), sweep.exclusions.missing_slot,
                   sweep.exclusions.unknown_block, sweep.exclusions.no_path);
        sweep
    }
}
