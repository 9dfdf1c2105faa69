use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::path::Path;

use super::blocks::BlockConnections;
use super::degrees::DegreeRow;
use super::route_sim::RouteRow;
use super::route_stats::RouteStats;
use super::slot_graphs::SlotKey;
use super::summary::{CongestionRow, DayTravelTime};
use super::trips::{parse_weekday, weekday_name};

// A convenience type for parsing csv data
type Row = HashMap<String, String>;

static ROUTE_COLS: [&str; 4] = ["route_name", "start_time", "day", "total_time"];
static DEGREE_COLS: [&str; 3] = ["graph", "node", "degree"];

fn check_columns<'a, I>(path: &Path, headers: &csv::StringRecord, cols: I)
                        -> Result<(), Box<dyn Error>>
    where I: IntoIterator<Item = &'a str>
{
    for col in cols {
        if !headers.iter().any(|hh| hh == col) {
            return Err(format!("{}: missing required column {}", path.display(), col).into());
        }
    }
    Ok(())
}


fn opt_to_field(value: Option<f64>) -> String {
    match value {
        Some(vv) => format!("{}", vv),
        None => String::new(),
    }
}

/// Writes the route evaluation table.  There's one arrival column per stop of the longest
/// route; shorter routes leave the trailing ones blank.
pub fn write_routes(path: &Path, rows: &[RouteRow]) -> Result<(), Box<dyn Error>> {
    let num_stops = rows.iter().map(|row| row.arrival_times.len()).max().unwrap_or(3);
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![String::from("route_name"), String::from("start_time"),
                          String::from("day"), String::from("total_time")];
    for ii in 1..=num_stops {
        header.push(format!("arrival_time_{}", ii));
    }
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.route_name.clone(), row.start_time.to_string(),
                              String::from(weekday_name(row.day)), row.total_time.to_string()];
        for ii in 0..num_stops {
            record.push(opt_to_field(row.arrival_times.get(ii).cloned()));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    log::info!("wrote {} routes to {}", rows.len(), path.display());
    Ok(())
}

/// Reads back a table written by `write_routes`.
pub fn read_routes(path: &Path) -> Result<Vec<RouteRow>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?.clone();
    let num_stops = headers.iter()
        .filter(|hh| hh.starts_with("arrival_time_"))
        .count();
    let arrival_cols: Vec<String> = (1..=num_stops)
        .map(|ii| format!("arrival_time_{}", ii))
        .collect();
    check_columns(path, &headers, ROUTE_COLS.iter().cloned())?;
    // arrival columns must be numbered 1..n with no gaps
    check_columns(path, &headers, arrival_cols.iter().map(|col| col.as_str()))?;

    let mut rows = vec![];
    for result in reader.deserialize() {
        let row: Row = result?;
        let mut arrival_times: Vec<f64> = vec![];
        for col in &arrival_cols {
            let field = row[col].trim();
            if !field.is_empty() {
                arrival_times.push(field.parse()?);
            }
        }
        rows.push(RouteRow {
            route_name: row["route_name"].clone(),
            start_time: row["start_time"].trim().parse()?,
            day: parse_weekday(&row["day"])?,
            total_time: row["total_time"].trim().parse()?,
            arrival_times,
        });
    }
    Ok(rows)
}

pub fn write_degrees(path: &Path, rows: &[DegreeRow]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&["graph", "node", "degree"])?;
    for row in rows {
        writer.write_record(&[row.slot.to_string(), row.block_id.clone(),
                              row.degree.to_string()])?;
    }
    writer.flush()?;
    log::info!("wrote {} node degrees to {}", rows.len(), path.display());
    Ok(())
}

/// Reads back a table written by `write_degrees`, splitting each "hour_day" graph key.
pub fn read_degrees(path: &Path) -> Result<Vec<DegreeRow>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?.clone();
    check_columns(path, &headers, DEGREE_COLS.iter().cloned())?;

    let mut rows = vec![];
    for result in reader.deserialize() {
        let row: Row = result?;
        rows.push(DegreeRow {
            slot: row["graph"].parse::<SlotKey>()?,
            block_id: row["node"].trim().to_string(),
            degree: row["degree"].trim().parse()?,
        });
    }
    Ok(rows)
}

pub fn write_route_stats(path: &Path, stats: &RouteStats) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&["pickup_hour", "pickup_day", "BCTCB2010_x", "BCTCB2010_y",
                          "avg_travel_time", "trip_count"])?;
    for row in stats.rows() {
        writer.write_record(&[row.hour.to_string(), String::from(weekday_name(row.day)),
                              row.origin.clone(), row.destination.clone(),
                              row.avg_travel_time.to_string(), row.trip_count.to_string()])?;
    }
    writer.flush()?;
    log::info!("wrote {} route stats to {}", stats.len(), path.display());
    Ok(())
}

pub fn write_block_connections(path: &Path, conns: &[BlockConnections])
                               -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&["block_id", "lat", "lng", "trip_count_pickup", "trip_count_dropoff",
                          "total_connections"])?;
    for conn in conns {
        writer.write_record(&[conn.block_id.clone(), conn.pos.lat.to_string(),
                              conn.pos.lng.to_string(), conn.pickups.to_string(),
                              conn.dropoffs.to_string(), conn.total().to_string()])?;
    }
    writer.flush()?;
    log::info!("wrote {} block connection counts to {}", conns.len(), path.display());
    Ok(())
}

pub fn write_travel_time_by_day(path: &Path, rows: &[DayTravelTime])
                                -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&["day", "mean_total_time", "route_count"])?;
    for row in rows {
        writer.write_record(&[String::from(weekday_name(row.day)),
                              row.mean_total_time.to_string(), row.route_count.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_travel_vs_congestion(path: &Path, rows: &[CongestionRow])
                                  -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&["day", "hour", "mean_total_time", "mean_degree"])?;
    for row in rows {
        writer.write_record(&[String::from(weekday_name(row.slot.day)), row.slot.hour.to_string(),
                              opt_to_field(row.mean_total_time),
                              opt_to_field(row.mean_degree)])?;
    }
    writer.flush()?;
    Ok(())
}
