use std::collections::BTreeMap;

use chrono::Weekday;

use super::degrees::DegreeRow;
use super::route_sim::RouteRow;
use super::slot_graphs::SlotKey;


#[derive(PartialEq, Debug, Clone)]
pub struct DayTravelTime {
    pub day: Weekday,
    pub mean_total_time: f64,
    pub route_count: usize,
}

/// Per weekday, the mean time on road over all evaluated routes.  Days come out Monday first.
pub fn travel_time_by_day(rows: &[RouteRow]) -> Vec<DayTravelTime> {
    let mut sums: BTreeMap<u32, (Weekday, f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = sums.entry(row.day.num_days_from_monday()).or_insert((row.day, 0., 0));
        entry.1 += row.total_time;
        entry.2 += 1;
    }
    sums.into_iter().map(|(_, (day, sum, count))| DayTravelTime {
        day,
        mean_total_time: sum / count as f64,
        route_count: count,
    }).collect()
}


/// Mean route time and mean landmark degree for one slot.  Either side is None when there's
/// nothing to average: no route started that hour, or no degree was recorded in that slot.
#[derive(PartialEq, Debug, Clone)]
pub struct CongestionRow {
    pub slot: SlotKey,
    pub mean_total_time: Option<f64>,
    pub mean_degree: Option<f64>,
}

#[derive(Default)]
struct Sums {
    time_sum: f64,
    time_count: usize,
    degree_sum: f64,
    degree_count: usize,
}

fn mean(sum: f64, count: usize) -> Option<f64> {
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Lines up route times (by start hour) with landmark degrees (by slot), ordered by weekday
/// then hour.
pub fn travel_vs_congestion(routes: &[RouteRow], degrees: &[DegreeRow]) -> Vec<CongestionRow> {
    let mut sums: BTreeMap<(u32, u32), (SlotKey, Sums)> = BTreeMap::new();
    for row in routes {
        let slot_sums = slot_entry(&mut sums, SlotKey::new(row.start_time, row.day));
        slot_sums.time_sum += row.total_time;
        slot_sums.time_count += 1;
    }
    for row in degrees {
        let slot_sums = slot_entry(&mut sums, row.slot);
        slot_sums.degree_sum += row.degree as f64;
        slot_sums.degree_count += 1;
    }

    sums.into_iter().map(|(_, (slot, ss))| CongestionRow {
        slot,
        mean_total_time: mean(ss.time_sum, ss.time_count),
        mean_degree: mean(ss.degree_sum, ss.degree_count),
    }).collect()
}

fn slot_entry(sums: &mut BTreeMap<(u32, u32), (SlotKey, Sums)>, slot: SlotKey) -> &mut Sums {
    let key = (slot.day.num_days_from_monday(), slot.hour);
    &mut sums.entry(key).or_insert_with(|| (slot, Sums::default())).1
}
