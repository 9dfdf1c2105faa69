use std::collections::BTreeMap;

use chrono::Weekday;

use super::slot_graphs::SlotKey;
use super::trips::TripRecord;


/// Average travel time of all trips from one block to another that were picked up in a given
/// hour on a given weekday.  Rows are directional: A->B and B->A are separate rows.
#[derive(PartialEq, Debug, Clone)]
pub struct RouteStat {
    pub hour: u32,
    pub day: Weekday,
    pub origin: String,
    pub destination: String,
    pub avg_travel_time: f64,
    pub trip_count: usize,
}

impl RouteStat {
    pub fn slot(&self) -> SlotKey {
        SlotKey::new(self.hour, self.day)
    }
}

#[derive(Default)]
struct TimeSum {
    total_min: f64,
    count: usize,
}

/// The per-slot edge list, sorted by hour, weekday (Monday first), origin and destination.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RouteStats {
    rows: Vec<RouteStat>,
}

impl RouteStats {
    pub fn from_trips(trips: &[TripRecord]) -> RouteStats {
        let mut sums: BTreeMap<(SlotKey, &str, &str), TimeSum> = BTreeMap::new();
        for trip in trips {
            let key = (SlotKey::new(trip.pickup_hour(), trip.pickup_day()),
                       trip.pickup_block.as_str(), trip.dropoff_block.as_str());
            let sum = sums.entry(key).or_default();
            sum.total_min += trip.travel_time_min();
            sum.count += 1;
        }

        let rows: Vec<RouteStat> = sums.into_iter().map(|((slot, origin, destination), sum)| {
            RouteStat {
                hour: slot.hour,
                day: slot.day,
                origin: String::from(origin),
                destination: String::from(destination),
                avg_travel_time: sum.total_min / sum.count as f64,
                trip_count: sum.count,
            }
        }).collect();
        log::info!("built {} route stats from {} trips", rows.len(), trips.len());
        RouteStats{rows}
    }

    pub fn from_rows(rows: Vec<RouteStat>) -> RouteStats {
        RouteStats{rows}
    }

    pub fn rows(&self) -> &[RouteStat] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows recorded for one (hour, weekday) slot.
    pub fn for_slot(&self, slot: SlotKey) -> impl Iterator<Item = &RouteStat> + '_ {
        self.rows.iter().filter(move |row| row.slot() == slot)
    }
}
