use std::path::Path;
use std::collections::HashMap;
use std::fs::File;
use std::error::Error;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_isaac::Isaac64Rng;

use super::block_id::normalize_block_id;
use super::geometry::{BoundingBox, GeoPoint};

static PICKUP_TIME_COL: &str = "tpep_pickup_datetime";
static DROPOFF_TIME_COL: &str = "tpep_dropoff_datetime";
static PICKUP_BLOCK_COL: &str = "BCTCB2010_x";
static DROPOFF_BLOCK_COL: &str = "BCTCB2010_y";
static PICKUP_BORO_COL: &str = "BoroName_x";
static DROPOFF_BORO_COL: &str = "BoroName_y";

static REQUIRED_COLS: [&str; 8] = [
    "tpep_pickup_datetime",
    "tpep_dropoff_datetime",
    "BCTCB2010_x",
    "BCTCB2010_y",
    "pickup_longitude",
    "pickup_latitude",
    "dropoff_longitude",
    "dropoff_latitude",
];

static TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];


/// Full English name of a weekday, as used in slot keys and output tables.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn parse_weekday(name: &str) -> Result<Weekday, Box<dyn Error>> {
    match name.trim().parse::<Weekday>() {
        Ok(day) => Ok(day),
        Err(_) => Err(format!("\"{}\" is not a weekday", name).into()),
    }
}

pub fn parse_timestamp(timestr: &str) -> Option<NaiveDateTime> {
    let timestr = timestr.trim();
    TIMESTAMP_FORMATS.iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(timestr, fmt).ok())
}


/// One taxi trip between two census blocks.  Travel time, pickup hour and pickup weekday are
/// derived once on construction.
#[derive(PartialEq, Debug, Clone)]
pub struct TripRecord {
    pub pickup_time: NaiveDateTime,
    pub dropoff_time: NaiveDateTime,
    pub pickup_block: String,
    pub dropoff_block: String,
    pub pickup_pos: GeoPoint,
    pub dropoff_pos: GeoPoint,
    pub pickup_borough: Option<String>,
    pub dropoff_borough: Option<String>,
    travel_time_min: f64,
    pickup_hour: u32,
    pickup_day: Weekday,
}

// A convenience type for parsing csv data
type Row = HashMap<String, String>;

impl TripRecord {
    pub fn new(pickup_time: NaiveDateTime, dropoff_time: NaiveDateTime, pickup_block: &str,
               dropoff_block: &str, pickup_pos: GeoPoint, dropoff_pos: GeoPoint) -> TripRecord {
        let travel_time_min = (dropoff_time - pickup_time).num_milliseconds() as f64 / 60_000.;
        TripRecord {
            pickup_time,
            dropoff_time,
            pickup_block: String::from(pickup_block),
            dropoff_block: String::from(dropoff_block),
            pickup_pos,
            dropoff_pos,
            pickup_borough: None,
            dropoff_borough: None,
            travel_time_min,
            pickup_hour: pickup_time.hour(),
            pickup_day: pickup_time.weekday(),
        }
    }

    pub fn with_boroughs(mut self, pickup_borough: &str, dropoff_borough: &str) -> TripRecord {
        self.pickup_borough = Some(String::from(pickup_borough));
        self.dropoff_borough = Some(String::from(dropoff_borough));
        self
    }

    pub fn travel_time_min(&self) -> f64 {
        self.travel_time_min
    }

    pub fn pickup_hour(&self) -> u32 {
        self.pickup_hour
    }

    pub fn pickup_day(&self) -> Weekday {
        self.pickup_day
    }

    /// Reads trips from a csv with one row per trip, as produced by the block-matching step.
    ///
    /// A missing column, bad timestamp or bad coordinate is an error naming the offending row.
    /// Rows where either end didn't land in a census block (empty or "nan" block id) are
    /// skipped.
    pub fn all_from_csv(csvpath: &Path) -> Result<Vec<TripRecord>, Box<dyn Error>> {
        let file = File::open(csvpath)?;
        let mut reader = csv::Reader::from_reader(file);

        let headers = reader.headers()?.clone();
        for col in REQUIRED_COLS.iter() {
            if !headers.iter().any(|hh| hh == *col) {
                return Err(format!("{}: missing required column {}", csvpath.display(), col)
                    .into());
            }
        }
        let has_boroughs = headers.iter().any(|hh| hh == PICKUP_BORO_COL) &&
                           headers.iter().any(|hh| hh == DROPOFF_BORO_COL);

        let mut trips = vec![];
        let mut num_unmatched = 0;
        for (ii, result) in reader.deserialize().enumerate() {
            let row: Row = result?;
            // +2 for the header and 1-based line numbers
            let line = ii + 2;

            let pickup_block = normalize_block_id(&row[PICKUP_BLOCK_COL]);
            let dropoff_block = normalize_block_id(&row[DROPOFF_BLOCK_COL]);
            let (pickup_block, dropoff_block) = match (pickup_block, dropoff_block) {
                (Some(pb), Some(db)) => (pb, db),
                _ => {
                    num_unmatched += 1;
                    continue;
                }
            };

            let pickup_time = parse_time_field(&row, PICKUP_TIME_COL, line)?;
            let dropoff_time = parse_time_field(&row, DROPOFF_TIME_COL, line)?;
            let pickup_pos = GeoPoint::new(parse_float_field(&row, "pickup_longitude", line)?,
                                           parse_float_field(&row, "pickup_latitude", line)?);
            let dropoff_pos = GeoPoint::new(parse_float_field(&row, "dropoff_longitude", line)?,
                                            parse_float_field(&row, "dropoff_latitude", line)?);

            let mut trip = TripRecord::new(pickup_time, dropoff_time, &pickup_block,
                                           &dropoff_block, pickup_pos, dropoff_pos);
            if has_boroughs {
                trip = trip.with_boroughs(row[PICKUP_BORO_COL].trim(),
                                          row[DROPOFF_BORO_COL].trim());
            }
            trips.push(trip);
        }

        if num_unmatched > 0 {
            log::info!("skipped {} trips with no census block at one end", num_unmatched);
        }
        log::info!("read {} trips from {}", trips.len(), csvpath.display());
        Ok(trips)
    }
}

fn parse_time_field(row: &Row, col: &str, line: usize) -> Result<NaiveDateTime, Box<dyn Error>> {
    match parse_timestamp(&row[col]) {
        Some(time) => Ok(time),
        None => Err(format!("line {}: bad timestamp \"{}\" in {}", line, row[col], col).into()),
    }
}

fn parse_float_field(row: &Row, col: &str, line: usize) -> Result<f64, Box<dyn Error>> {
    match row[col].trim().parse::<f64>() {
        Ok(val) => Ok(val),
        Err(err) => Err(format!("line {}: bad number \"{}\" in {}: {}", line, row[col], col, err)
                            .into()),
    }
}


/// Which trips survive into the analysis.
#[derive(PartialEq, Debug, Clone)]
pub struct TripFilter {
    // if set, both ends must be in this borough.  Ignored for trips without borough info.
    pub borough: Option<String>,
    pub bbox: BoundingBox,
    pub min_travel_time_min: f64,
    pub max_travel_time_min: f64,
}

impl Default for TripFilter {
    fn default() -> TripFilter {
        TripFilter {
            borough: Some(String::from("Manhattan")),
            bbox: BoundingBox::nyc(),
            min_travel_time_min: 1.,
            max_travel_time_min: 300.,
        }
    }
}

impl TripFilter {
    pub fn apply(&self, trips: Vec<TripRecord>) -> Vec<TripRecord> {
        let initial = trips.len();

        let trips: Vec<TripRecord> = match &self.borough {
            Some(borough) => trips.into_iter().filter(|trip| {
                match (&trip.pickup_borough, &trip.dropoff_borough) {
                    (Some(pb), Some(db)) => pb == borough && db == borough,
                    _ => true,
                }
            }).collect(),
            None => trips,
        };
        let after_borough = trips.len();
        log::info!("borough filter dropped {} trips", initial - after_borough);

        let trips: Vec<TripRecord> = trips.into_iter()
            .filter(|trip| self.bbox.contains(&trip.pickup_pos) &&
                           self.bbox.contains(&trip.dropoff_pos))
            .collect();
        let after_bbox = trips.len();
        log::info!("bounding box filter dropped {} trips", after_borough - after_bbox);

        let trips: Vec<TripRecord> = trips.into_iter()
            .filter(|trip| trip.travel_time_min >= self.min_travel_time_min &&
                           trip.travel_time_min <= self.max_travel_time_min)
            .collect();
        log::info!("travel time filter dropped {} trips", after_bbox - trips.len());

        trips
    }
}


/// Keeps a uniformly random `fraction` of the trips.  The same seed always keeps the same trips.
pub fn subsample_trips(trips: Vec<TripRecord>, fraction: f64, seed: u64) -> Vec<TripRecord> {
    if fraction >= 1.0 {
        return trips;
    }
    let amount = (trips.len() as f64 * fraction) as usize;
    let mut rng = Isaac64Rng::seed_from_u64(seed);
    let sampled: Vec<TripRecord> = trips.choose_multiple(&mut rng, amount).cloned().collect();
    log::info!("subsampled {} of {} trips", sampled.len(), trips.len());
    sampled
}
