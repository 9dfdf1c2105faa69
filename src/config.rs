use std::error::Error;
use std::path::{Path, PathBuf};

use chrono::Weekday;
use yaml_rust::{Yaml, YamlLoader};

use super::geometry::BoundingBox;
use super::landmarks::{Landmark, LandmarkSite, Landmarks};
use super::slot_graphs::EdgeMergePolicy;
use super::trips::{parse_weekday, TripFilter};


pub fn str_to_absolute_path(path_str: &str, default_base_dir: &Path) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        return path;
    } else {
        return [default_base_dir, Path::new(&path)].iter().collect();
    }
}

fn yaml_number(yaml: &Yaml) -> Option<f64> {
    match yaml {
        Yaml::Real(_) => yaml.as_f64(),
        Yaml::Integer(ii) => Some(*ii as f64),
        _ => None,
    }
}

fn yaml_hour(yaml: &Yaml, what: &str) -> Result<u32, Box<dyn Error>> {
    match yaml.as_i64() {
        Some(hour) if hour >= 0 && hour <= 23 => Ok(hour as u32),
        _ => Err(format!("{} must be an hour from 0 to 23, got {:?}", what, yaml).into()),
    }
}

fn yaml_f64(yaml: &Yaml, what: &str) -> Result<f64, Box<dyn Error>> {
    yaml_number(yaml).ok_or_else(|| format!("{} must be a number, got {:?}", what, yaml).into())
}


/// Everything that parameterizes one run.  The defaults reproduce the standard Manhattan
/// analysis: Monday and Saturday, graphs for 10:00 through 21:00, tours starting at 10, 12, 14
/// and 16.
#[derive(PartialEq, Debug, Clone)]
pub struct AnalysisConfig {
    // csv of block-matched taxi trips
    pub trips_path: PathBuf,
    // where all output tables are written
    pub output_dir: PathBuf,
    pub days: Vec<Weekday>,
    // hours to build slot graphs for
    pub hours: Vec<u32>,
    // hours at which simulated tours leave their first stop
    pub start_hours: Vec<u32>,
    pub landmarks: Landmarks,
    pub edge_merge: EdgeMergePolicy,
    pub trip_filter: TripFilter,
    // The random fraction of trips that will be considered.
    // If 1, that's all of them. If 0.5, half of them.  etc.
    pub subsample_fraction: f64,
    pub random_seed: u64,
}

impl Default for AnalysisConfig {
    fn default() -> AnalysisConfig {
        AnalysisConfig {
            trips_path: PathBuf::from("output/manhattan_taxi_blocks.csv"),
            output_dir: PathBuf::from("output"),
            days: vec![Weekday::Mon, Weekday::Sat],
            hours: (10..=21).collect(),
            start_hours: vec![10, 12, 14, 16],
            landmarks: Landmarks::default(),
            edge_merge: EdgeMergePolicy::WeightedMean,
            trip_filter: TripFilter::default(),
            subsample_fraction: 1.0,
            random_seed: 100,
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<AnalysisConfig, Box<dyn Error>> {
        let file_contents = std::fs::read_to_string(path)
            .map_err(|err| format!("couldn't read config {}: {}", path.display(), err))?;
        let config_dir = match path.parent() {
            Some(dir) => dir,
            None => Path::new("."),
        };
        AnalysisConfig::from_yaml_str(&file_contents, config_dir)
    }

    /// Parses a yaml config.  Keys left out keep their default values; relative paths are
    /// taken relative to `config_dir`.
    pub fn from_yaml_str(contents: &str, config_dir: &Path)
                         -> Result<AnalysisConfig, Box<dyn Error>> {
        let yaml_cfgs = YamlLoader::load_from_str(contents)?;
        let mut config = AnalysisConfig::default();
        let yaml_cfg = match yaml_cfgs.get(0) {
            Some(yaml_cfg) => yaml_cfg,
            // an empty file means all defaults
            None => return Ok(config),
        };

        if let Some(trips_path) = yaml_cfg["trips_path"].as_str() {
            config.trips_path = str_to_absolute_path(trips_path, config_dir);
        }
        if let Some(output_dir) = yaml_cfg["output_dir"].as_str() {
            config.output_dir = str_to_absolute_path(output_dir, config_dir);
        }

        if let Some(days) = yaml_cfg["days"].as_vec() {
            config.days = vec![];
            for day in days {
                let name = day.as_str().ok_or("days must be weekday names")?;
                config.days.push(parse_weekday(name)?);
            }
        }

        let hours = &yaml_cfg["hours"];
        if !hours.is_badvalue() {
            let first = yaml_hour(&hours["first"], "hours.first")?;
            let last = yaml_hour(&hours["last"], "hours.last")?;
            if first > last {
                return Err(format!("hours.first ({}) is after hours.last ({})", first, last)
                    .into());
            }
            config.hours = (first..=last).collect();
        }

        if let Some(start_hours) = yaml_cfg["start_hours"].as_vec() {
            config.start_hours = start_hours.iter()
                .map(|hh| yaml_hour(hh, "start_hours"))
                .collect::<Result<Vec<u32>, Box<dyn Error>>>()?;
        }

        let landmarks = &yaml_cfg["landmarks"];
        if !landmarks.is_badvalue() {
            for landmark in Landmark::ALL.iter() {
                let site_cfg = &landmarks[landmark.config_key()];
                if site_cfg.is_badvalue() {
                    continue;
                }
                let default_site = config.landmarks.site(*landmark).clone();
                let block_id = match &site_cfg["block_id"] {
                    Yaml::String(ss) => ss.clone(),
                    // unquoted ids parse as integers
                    Yaml::Integer(ii) => ii.to_string(),
                    Yaml::BadValue => default_site.block_id,
                    other => return Err(format!("landmarks.{}.block_id is not an id: {:?}",
                                                landmark.config_key(), other).into()),
                };
                let dwell_min = match &site_cfg["dwell_min"] {
                    Yaml::BadValue => default_site.dwell_min,
                    dwell => yaml_f64(dwell, "dwell_min")?,
                };
                config.landmarks.set_site(*landmark, LandmarkSite{block_id, dwell_min});
            }
        }

        if let Some(policy) = yaml_cfg["edge_merge"].as_str() {
            config.edge_merge = policy.parse()?;
        }

        match &yaml_cfg["borough"] {
            Yaml::String(borough) => config.trip_filter.borough = Some(borough.clone()),
            Yaml::Null => config.trip_filter.borough = None,
            _ => (),
        }
        if !yaml_cfg["min_travel_time_min"].is_badvalue() {
            config.trip_filter.min_travel_time_min =
                yaml_f64(&yaml_cfg["min_travel_time_min"], "min_travel_time_min")?;
        }
        if !yaml_cfg["max_travel_time_min"].is_badvalue() {
            config.trip_filter.max_travel_time_min =
                yaml_f64(&yaml_cfg["max_travel_time_min"], "max_travel_time_min")?;
        }
        let bbox = &yaml_cfg["bbox"];
        if !bbox.is_badvalue() {
            config.trip_filter.bbox = BoundingBox {
                min_lon: yaml_f64(&bbox["min_lon"], "bbox.min_lon")?,
                max_lon: yaml_f64(&bbox["max_lon"], "bbox.max_lon")?,
                min_lat: yaml_f64(&bbox["min_lat"], "bbox.min_lat")?,
                max_lat: yaml_f64(&bbox["max_lat"], "bbox.max_lat")?,
            };
        }

        if !yaml_cfg["subsample_fraction"].is_badvalue() {
            config.subsample_fraction =
                yaml_f64(&yaml_cfg["subsample_fraction"], "subsample_fraction")?;
        }
        let seed = &yaml_cfg["random_seed"];
        if !seed.is_badvalue() {
            config.random_seed = match seed.as_i64() {
                Some(value) if value >= 0 => value as u64,
                _ => return Err(format!("random_seed must be a non-negative integer, got {:?}",
                                        seed).into()),
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.days.is_empty() {
            return Err("at least one day is needed".into());
        }
        if self.hours.is_empty() {
            return Err("at least one hour is needed".into());
        }
        if self.hours.iter().chain(self.start_hours.iter()).any(|hh| *hh > 23) {
            return Err("hours must be from 0 to 23".into());
        }
        self.landmarks.validate()?;
        let filter = &self.trip_filter;
        if filter.min_travel_time_min > filter.max_travel_time_min {
            return Err("min_travel_time_min is above max_travel_time_min".into());
        }
        if filter.bbox.min_lon > filter.bbox.max_lon || filter.bbox.min_lat > filter.bbox.max_lat {
            return Err("bbox minimums must not exceed its maximums".into());
        }
        if !(self.subsample_fraction > 0. && self.subsample_fraction <= 1.) {
            return Err(format!("subsample_fraction must be in (0, 1], got {}",
                               self.subsample_fraction).into());
        }
        Ok(())
    }
}
