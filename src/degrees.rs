use super::slot_graphs::{SlotGraphIndex, SlotKey};


#[derive(PartialEq, Debug, Clone)]
pub struct DegreeRow {
    pub slot: SlotKey,
    pub block_id: String,
    pub degree: usize,
}

/// Degree of each target block in each slot graph, in slot order.  Blocks that aren't nodes
/// of a slot's graph are skipped rather than reported as zero.
pub fn node_degrees(graphs: &SlotGraphIndex, targets: &[&str]) -> Vec<DegreeRow> {
    let mut rows = vec![];
    for graph in graphs.iter_sorted() {
        for block_id in targets {
            match graph.degree(block_id) {
                Some(degree) => rows.push(DegreeRow {
                    slot: graph.key(),
                    block_id: String::from(*block_id),
                    degree,
                }),
                None => log::warn!("block {} is not in the graph for slot {}", block_id,
                                   graph.key()),
            }
        }
    }
    rows
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use super::super::blocks::BlockPositions;
    use super::super::geometry::GeoPoint;
    use super::super::route_stats::{RouteStat, RouteStats};
    use super::super::slot_graphs::{EdgeMergePolicy, SlotGraph};

    fn build_slot(hour: u32, day: Weekday, edges: &[(&str, &str)]) -> SlotGraph {
        let positions = BlockPositions::from_positions(
            ["aa", "bb", "cc", "dd"].iter()
                .map(|id| (String::from(*id), GeoPoint::new(-73.98, 40.75))));
        let rows: Vec<RouteStat> = edges.iter().map(|(from, to)| RouteStat {
            hour,
            day,
            origin: String::from(*from),
            destination: String::from(*to),
            avg_travel_time: 5.,
            trip_count: 1,
        }).collect();
        SlotGraph::build(SlotKey::new(hour, day), &positions, &rows,
                         EdgeMergePolicy::WeightedMean)
    }

    #[test]
    fn test_degrees() {
        let mut index = SlotGraphIndex::default();
        // aa-bb both ways counts once
        index.insert(build_slot(11, Weekday::Mon, &[("aa", "bb"), ("bb", "aa"), ("aa", "cc")]));
        index.insert(build_slot(10, Weekday::Sat, &[("bb", "cc")]));

        let rows = node_degrees(&index, &["aa", "dd", "zz"]);
        let expected = vec![
            DegreeRow{slot: SlotKey::new(10, Weekday::Sat), block_id: String::from("aa"), degree: 0},
            DegreeRow{slot: SlotKey::new(10, Weekday::Sat), block_id: String::from("dd"), degree: 0},
            DegreeRow{slot: SlotKey::new(11, Weekday::Mon), block_id: String::from("aa"), degree: 2},
            DegreeRow{slot: SlotKey::new(11, Weekday::Mon), block_id: String::from("dd"), degree: 0},
        ];
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_slot_without_trips_reports_zero() {
        let positions = BlockPositions::from_positions(
            ["aa", "bb"].iter().map(|id| (String::from(*id), GeoPoint::new(-73.98, 40.75))));
        let stats = RouteStats::from_rows(vec![RouteStat {
            hour: 10,
            day: Weekday::Mon,
            origin: String::from("aa"),
            destination: String::from("bb"),
            avg_travel_time: 5.,
            trip_count: 2,
        }]);
        let index = SlotGraphIndex::build(&stats, &positions, &[10, 11], &[Weekday::Mon],
                                          EdgeMergePolicy::WeightedMean);

        let rows = node_degrees(&index, &["aa"]);
        let expected = vec![
            DegreeRow{slot: SlotKey::new(10, Weekday::Mon), block_id: String::from("aa"), degree: 1},
            DegreeRow{slot: SlotKey::new(11, Weekday::Mon), block_id: String::from("aa"), degree: 0},
        ];
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_no_graphs() {
        let index = SlotGraphIndex::default();
        assert!(node_degrees(&index, &["aa"]).is_empty());
    }
}
