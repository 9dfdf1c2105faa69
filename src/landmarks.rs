use std::error::Error;
use std::fmt;

use itertools::Itertools;


/// The fixed set of sights a tourist route visits.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
pub enum Landmark {
    TimesSquare,
    EmpireState,
    Met,
}

impl Landmark {
    pub const ALL: [Landmark; 3] = [Landmark::TimesSquare, Landmark::EmpireState, Landmark::Met];

    /// Name used for this landmark in config files.
    pub fn config_key(&self) -> &'static str {
        match self {
            Landmark::TimesSquare => "times_square",
            Landmark::EmpireState => "empire_state",
            Landmark::Met => "met",
        }
    }

    fn index(&self) -> usize {
        match self {
            Landmark::TimesSquare => 0,
            Landmark::EmpireState => 1,
            Landmark::Met => 2,
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, ff: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Landmark::TimesSquare => "Times Square",
            Landmark::EmpireState => "Empire State Building",
            Landmark::Met => "The MET",
        };
        write!(ff, "{}", name)
    }
}


/// Where a landmark is and how long a visit there takes.
#[derive(PartialEq, Debug, Clone)]
pub struct LandmarkSite {
    pub block_id: String,
    pub dwell_min: f64,
}

impl LandmarkSite {
    pub fn new(block_id: &str, dwell_min: f64) -> LandmarkSite {
        LandmarkSite{block_id: String::from(block_id), dwell_min}
    }
}

/// Block and dwell time for each landmark, resolved once from config.
#[derive(PartialEq, Debug, Clone)]
pub struct Landmarks {
    sites: [LandmarkSite; 3],
}

impl Default for Landmarks {
    fn default() -> Landmarks {
        Landmarks {
            sites: [
                LandmarkSite::new("10113001008", 30.),
                LandmarkSite::new("10076001001", 120.),
                LandmarkSite::new("10143001021", 180.),
            ],
        }
    }
}

impl Landmarks {
    pub fn site(&self, landmark: Landmark) -> &LandmarkSite {
        &self.sites[landmark.index()]
    }

    pub fn block_id(&self, landmark: Landmark) -> &str {
        &self.sites[landmark.index()].block_id
    }

    pub fn dwell_min(&self, landmark: Landmark) -> f64 {
        self.sites[landmark.index()].dwell_min
    }

    pub fn set_site(&mut self, landmark: Landmark, site: LandmarkSite) {
        self.sites[landmark.index()] = site;
    }

    /// Block ids in `Landmark::ALL` order.
    pub fn block_ids(&self) -> Vec<&str> {
        Landmark::ALL.iter().map(|lm| self.block_id(*lm)).collect()
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        for landmark in Landmark::ALL.iter() {
            let site = self.site(*landmark);
            if site.block_id.trim().is_empty() {
                return Err(format!("landmark {} has no block id", landmark.config_key()).into());
            }
            if !(site.dwell_min >= 0.) {
                return Err(format!("landmark {} has a negative dwell time",
                                   landmark.config_key()).into());
            }
        }
        let ids = self.block_ids();
        if ids.iter().unique().count() != ids.len() {
            return Err("two landmarks share a block id".into());
        }
        Ok(())
    }
}


/// One fixed visiting order of the landmarks.
#[derive(PartialEq, Debug, Clone)]
pub struct TourRoute {
    pub number: usize,
    pub stops: Vec<Landmark>,
}

impl TourRoute {
    pub fn label(&self) -> String {
        format!("Route {}", self.number)
    }
}

/// Every visiting order of all the landmarks, numbered from 1 in lexicographic order of
/// `Landmark::ALL` (Times Square -> Empire State -> MET is route 1).
pub fn all_tour_routes() -> Vec<TourRoute> {
    Landmark::ALL.iter().cloned()
        .permutations(Landmark::ALL.len())
        .enumerate()
        .map(|(ii, stops)| TourRoute{number: ii + 1, stops})
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let landmarks = Landmarks::default();
        assert_eq!(landmarks.block_id(Landmark::TimesSquare), "10113001008");
        assert_eq!(landmarks.dwell_min(Landmark::EmpireState), 120.);
        assert_eq!(landmarks.dwell_min(Landmark::Met), 180.);
        assert!(landmarks.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut landmarks = Landmarks::default();
        landmarks.set_site(Landmark::Met, LandmarkSite::new("10113001008", 10.));
        assert!(landmarks.validate().is_err());

        let mut landmarks = Landmarks::default();
        landmarks.set_site(Landmark::Met, LandmarkSite::new("5", -1.));
        assert!(landmarks.validate().is_err());

        let mut landmarks = Landmarks::default();
        landmarks.set_site(Landmark::Met, LandmarkSite::new(" ", 1.));
        assert!(landmarks.validate().is_err());
    }

    #[test]
    fn test_tour_routes() {
        use Landmark::*;
        let routes = all_tour_routes();
        assert_eq!(routes.len(), 6);
        let expected = vec![
            vec![TimesSquare, EmpireState, Met],
            vec![TimesSquare, Met, EmpireState],
            vec![EmpireState, TimesSquare, Met],
            vec![EmpireState, Met, TimesSquare],
            vec![Met, TimesSquare, EmpireState],
            vec![Met, EmpireState, TimesSquare],
        ];
        for (ii, (route, stops)) in routes.iter().zip(expected.iter()).enumerate() {
            assert_eq!(route.number, ii + 1);
            assert_eq!(&route.stops, stops);
        }
        assert_eq!(routes[5].label(), "Route 6");
    }
}
