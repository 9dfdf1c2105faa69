use std::collections::BTreeMap;

use super::geometry::{GeoPoint, MeanPoint};
use super::trips::TripRecord;


/// Mean position of every block seen in the trip set, as an origin or as a destination.
///
/// Iteration is in block id order, so anything built from this (graph node order, output
/// rows) is the same from run to run.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct BlockPositions {
    positions: BTreeMap<String, GeoPoint>,
}

impl BlockPositions {
    pub fn from_trips(trips: &[TripRecord]) -> BlockPositions {
        let mut means: BTreeMap<&str, MeanPoint> = BTreeMap::new();
        for trip in trips {
            means.entry(&trip.pickup_block).or_default().add(&trip.pickup_pos);
            means.entry(&trip.dropoff_block).or_default().add(&trip.dropoff_pos);
        }

        let positions = means.into_iter()
            .filter_map(|(id, mean)| mean.mean().map(|pos| (String::from(id), pos)))
            .collect();
        BlockPositions{positions}
    }

    pub fn from_positions<I>(positions: I) -> BlockPositions
        where I: IntoIterator<Item = (String, GeoPoint)>
    {
        BlockPositions{positions: positions.into_iter().collect()}
    }

    pub fn get(&self, block_id: &str) -> Option<&GeoPoint> {
        self.positions.get(block_id)
    }

    pub fn contains(&self, block_id: &str) -> bool {
        self.positions.contains_key(block_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GeoPoint)> {
        self.positions.iter()
    }
}


/// How many trips touched a block.
#[derive(PartialEq, Debug, Clone)]
pub struct BlockConnections {
    pub block_id: String,
    pub pos: GeoPoint,
    pub pickups: usize,
    pub dropoffs: usize,
}

impl BlockConnections {
    pub fn total(&self) -> usize {
        self.pickups + self.dropoffs
    }
}

/// Counts pickups and dropoffs per block, one entry per block in `positions`.
pub fn count_connections(trips: &[TripRecord], positions: &BlockPositions)
                         -> Vec<BlockConnections> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for trip in trips {
        counts.entry(&trip.pickup_block).or_default().0 += 1;
        counts.entry(&trip.dropoff_block).or_default().1 += 1;
    }

    positions.iter().map(|(block_id, pos)| {
        let (pickups, dropoffs) = counts.get(block_id.as_str()).cloned().unwrap_or((0, 0));
        BlockConnections {
            block_id: block_id.clone(),
            pos: *pos,
            pickups,
            dropoffs,
        }
    }).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use super::super::trips::parse_timestamp;

    fn make_trip(from: &str, to: &str, from_pos: GeoPoint, to_pos: GeoPoint) -> TripRecord {
        TripRecord::new(parse_timestamp("2015-01-05 10:00:00").unwrap(),
                        parse_timestamp("2015-01-05 10:10:00").unwrap(),
                        from, to, from_pos, to_pos)
    }

    #[test]
    fn test_mean_positions_use_both_ends() {
        let trips = vec![
            make_trip("aa", "bb", GeoPoint::new(-73.0, 40.0), GeoPoint::new(-74.0, 41.0)),
            make_trip("bb", "cc", GeoPoint::new(-74.2, 41.2), GeoPoint::new(-75.0, 42.0)),
        ];
        let positions = BlockPositions::from_trips(&trips);
        assert_eq!(positions.len(), 3);

        let bb = positions.get("bb").unwrap();
        assert_relative_eq!(bb.lng, -74.1, epsilon = 1e-12);
        assert_relative_eq!(bb.lat, 41.1, epsilon = 1e-12);
        assert_eq!(positions.get("aa"), Some(&GeoPoint::new(-73.0, 40.0)));
        assert!(!positions.contains("dd"));

        let ids: Vec<&String> = positions.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["aa", "bb", "cc"]);
    }

    #[test]
    fn test_empty() {
        let positions = BlockPositions::from_trips(&[]);
        assert!(positions.is_empty());
        assert!(count_connections(&[], &positions).is_empty());
    }

    #[test]
    fn test_connection_counts() {
        let pos = GeoPoint::new(-73.98, 40.75);
        let trips = vec![
            make_trip("aa", "bb", pos, pos),
            make_trip("aa", "cc", pos, pos),
            make_trip("cc", "aa", pos, pos),
        ];
        let positions = BlockPositions::from_trips(&trips);
        let conns = count_connections(&trips, &positions);

        assert_eq!(conns.len(), 3);
        assert_eq!(conns[0].block_id, "aa");
        assert_eq!((conns[0].pickups, conns[0].dropoffs, conns[0].total()), (2, 1, 3));
        assert_eq!((conns[1].pickups, conns[1].dropoffs), (0, 1));
        assert_eq!((conns[2].pickups, conns[2].dropoffs), (1, 1));
    }
}
