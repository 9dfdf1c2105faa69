use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use itertools::iproduct;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use rayon::prelude::*;

use super::blocks::BlockPositions;
use super::route_stats::{RouteStat, RouteStats};
use super::trips::{parse_weekday, weekday_name};


/// An (hour, weekday) pair.  Displays as "{hour}_{weekday}", e.g. "10_Monday".
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub struct SlotKey {
    pub hour: u32,
    pub day: Weekday,
}

impl SlotKey {
    pub fn new(hour: u32, day: Weekday) -> SlotKey {
        SlotKey{hour, day}
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, ff: &mut fmt::Formatter) -> fmt::Result {
        write!(ff, "{}_{}", self.hour, weekday_name(self.day))
    }
}

impl FromStr for SlotKey {
    type Err = Box<dyn Error>;

    fn from_str(ss: &str) -> Result<SlotKey, Self::Err> {
        let mut parts = ss.splitn(2, '_');
        let hour = parts.next().unwrap_or("");
        let day = match parts.next() {
            Some(day) => day,
            None => return Err(format!("slot key \"{}\" has no weekday", ss).into()),
        };
        let hour: u32 = hour.trim().parse()
            .map_err(|err| format!("slot key \"{}\" has a bad hour: {}", ss, err))?;
        if hour > 23 {
            return Err(format!("slot key \"{}\" has hour out of range", ss).into());
        }
        Ok(SlotKey::new(hour, parse_weekday(day)?))
    }
}

// hour first, then weekday from Monday
impl Ord for SlotKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.hour, self.day.num_days_from_monday())
            .cmp(&(other.hour, other.day.num_days_from_monday()))
    }
}

impl PartialOrd for SlotKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}


/// How the A->B and B->A route stats of one slot combine into the single undirected edge.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum EdgeMergePolicy {
    /// Mean of the directional averages, weighted by their trip counts.
    WeightedMean,
    /// The direction with more trips.  Ties go to the lexicographically smaller origin.
    MostTrips,
}

impl FromStr for EdgeMergePolicy {
    type Err = Box<dyn Error>;

    fn from_str(ss: &str) -> Result<EdgeMergePolicy, Self::Err> {
        match ss.trim() {
            "weighted_mean" => Ok(EdgeMergePolicy::WeightedMean),
            "most_trips" => Ok(EdgeMergePolicy::MostTrips),
            other => Err(format!("unknown edge merge policy \"{}\"", other).into()),
        }
    }
}

struct MergedEdge<'a> {
    weighted_sum: f64,
    trip_count: usize,
    best: &'a RouteStat,
}

impl<'a> MergedEdge<'a> {
    fn new(row: &'a RouteStat) -> MergedEdge<'a> {
        MergedEdge {
            weighted_sum: row.avg_travel_time * row.trip_count as f64,
            trip_count: row.trip_count,
            best: row,
        }
    }

    fn add(&mut self, row: &'a RouteStat) {
        self.weighted_sum += row.avg_travel_time * row.trip_count as f64;
        self.trip_count += row.trip_count;
        let better = match row.trip_count.cmp(&self.best.trip_count) {
            Ordering::Greater => true,
            Ordering::Equal => row.origin < self.best.origin,
            Ordering::Less => false,
        };
        if better {
            self.best = row;
        }
    }

    fn weight(&self, policy: EdgeMergePolicy) -> f64 {
        match policy {
            EdgeMergePolicy::WeightedMean => self.weighted_sum / self.trip_count as f64,
            EdgeMergePolicy::MostTrips => self.best.avg_travel_time,
        }
    }
}


/// The undirected travel-time graph for one slot.  Every known block is a node, whether or not
/// any trip touched it in this slot; edge weights are average travel times in minutes.
#[derive(Debug, Clone)]
pub struct SlotGraph {
    key: SlotKey,
    graph: UnGraph<String, f64>,
    node_idxs_by_id: HashMap<String, NodeIndex>,
}

impl SlotGraph {
    pub fn build<'a, I>(key: SlotKey, positions: &BlockPositions, rows: I,
                        policy: EdgeMergePolicy) -> SlotGraph
        where I: IntoIterator<Item = &'a RouteStat>
    {
        let mut graph = UnGraph::with_capacity(positions.len(), 0);
        let mut node_idxs_by_id = HashMap::new();
        for (block_id, _) in positions.iter() {
            let idx = graph.add_node(block_id.clone());
            node_idxs_by_id.insert(block_id.clone(), idx);
        }

        // combine both directions of each block pair before adding anything to the graph
        let mut merged: BTreeMap<(&str, &str), MergedEdge> = BTreeMap::new();
        for row in rows {
            if row.origin == row.destination {
                // trips within one block never help get anywhere
                continue;
            }
            let pair = if row.origin < row.destination {
                (row.origin.as_str(), row.destination.as_str())
            } else {
                (row.destination.as_str(), row.origin.as_str())
            };
            match merged.get_mut(&pair) {
                Some(edge) => edge.add(row),
                None => {
                    merged.insert(pair, MergedEdge::new(row));
                }
            }
        }

        for ((aa, bb), edge) in &merged {
            let aa_idx = node_index_or_insert(&mut graph, &mut node_idxs_by_id, aa);
            let bb_idx = node_index_or_insert(&mut graph, &mut node_idxs_by_id, bb);
            graph.add_edge(aa_idx, bb_idx, edge.weight(policy));
        }

        log::debug!("slot {}: {} nodes, {} edges", key, graph.node_count(), graph.edge_count());
        SlotGraph{key, graph, node_idxs_by_id}
    }

    pub fn key(&self) -> SlotKey {
        self.key
    }

    pub fn contains_block(&self, block_id: &str) -> bool {
        self.node_idxs_by_id.contains_key(block_id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of distinct blocks this block has an edge to in this slot, or None if the block
    /// isn't in the graph.
    pub fn degree(&self, block_id: &str) -> Option<usize> {
        let idx = self.node_idxs_by_id.get(block_id)?;
        Some(self.graph.neighbors(*idx).count())
    }

    pub fn edge_weight(&self, block_a: &str, block_b: &str) -> Option<f64> {
        let aa = self.node_idxs_by_id.get(block_a)?;
        let bb = self.node_idxs_by_id.get(block_b)?;
        let edge = self.graph.find_edge(*aa, *bb)?;
        self.graph.edge_weight(edge).cloned()
    }

    /// Cheapest travel time between two blocks in this slot, with the blocks along the way.
    /// None if either block is missing or they aren't connected.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<(f64, Vec<&str>)> {
        let from_idx = self.node_idxs_by_id.get(from)?;
        let to_idx = self.node_idxs_by_id.get(to)?;
        // with a zero heuristic this is Dijkstra that stops at the goal
        let (cost, path) = astar(&self.graph, *from_idx, |node| node == *to_idx,
                                 |edge| *edge.weight(), |_| 0.)?;
        let path = path.iter().map(|idx| self.graph[*idx].as_str()).collect();
        Some((cost, path))
    }
}

fn node_index_or_insert(graph: &mut UnGraph<String, f64>,
                        node_idxs_by_id: &mut HashMap<String, NodeIndex>, block_id: &str)
                        -> NodeIndex {
    if let Some(idx) = node_idxs_by_id.get(block_id) {
        return *idx;
    }
    log::warn!("block {} has route stats but no known position", block_id);
    let idx = graph.add_node(String::from(block_id));
    node_idxs_by_id.insert(String::from(block_id), idx);
    idx
}


/// One graph per configured (hour, weekday) slot.  A configured slot without trips still has
/// a graph, with every known block and no edges.  Slots outside the configured hours and days
/// have no entry.
#[derive(Debug, Clone, Default)]
pub struct SlotGraphIndex {
    graphs: HashMap<SlotKey, SlotGraph>,
}

impl SlotGraphIndex {
    pub fn build(route_stats: &RouteStats, positions: &BlockPositions, hours: &[u32],
                 days: &[Weekday], policy: EdgeMergePolicy) -> SlotGraphIndex {
        let keys: Vec<SlotKey> = iproduct!(hours.iter(), days.iter())
            .map(|(hour, day)| SlotKey::new(*hour, *day))
            .collect();

        let graphs: HashMap<SlotKey, SlotGraph> = keys.par_iter()
            .map(|key| {
                let graph = SlotGraph::build(*key, positions, route_stats.for_slot(*key),
                                             policy);
                if graph.edge_count() == 0 {
                    log::warn!("slot {} has no trips between distinct blocks", key);
                }
                (*key, graph)
            })
            .collect();
        log::info!("built {} slot graphs over {} blocks", graphs.len(), positions.len());
        SlotGraphIndex{graphs}
    }

    pub fn insert(&mut self, graph: SlotGraph) {
        self.graphs.insert(graph.key(), graph);
    }

    pub fn get(&self, hour: u32, day: Weekday) -> Option<&SlotGraph> {
        self.graphs.get(&SlotKey::new(hour, day))
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Graphs in slot order: by hour, then weekday.
    pub fn iter_sorted(&self) -> Vec<&SlotGraph> {
        let mut graphs: Vec<&SlotGraph> = self.graphs.values().collect();
        graphs.sort_by_key(|graph| graph.key());
        graphs
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use super::super::geometry::GeoPoint;

    fn stat(hour: u32, day: Weekday, origin: &str, destination: &str, avg: f64, count: usize)
            -> RouteStat {
        RouteStat {
            hour,
            day,
            origin: String::from(origin),
            destination: String::from(destination),
            avg_travel_time: avg,
            trip_count: count,
        }
    }

    fn positions(ids: &[&str]) -> BlockPositions {
        BlockPositions::from_positions(
            ids.iter().map(|id| (String::from(*id), GeoPoint::new(-73.98, 40.75))))
    }

    #[test]
    fn test_slot_key_format() -> Result<(), Box<dyn Error>> {
        let key = SlotKey::new(10, Weekday::Mon);
        assert_eq!(key.to_string(), "10_Monday");
        assert_eq!("21_Saturday".parse::<SlotKey>()?, SlotKey::new(21, Weekday::Sat));
        assert!("10".parse::<SlotKey>().is_err());
        assert!("xx_Monday".parse::<SlotKey>().is_err());
        assert!("24_Monday".parse::<SlotKey>().is_err());
        assert!("10_Someday".parse::<SlotKey>().is_err());
        Ok(())
    }

    #[test]
    fn test_slot_key_order() {
        let mut keys = vec![SlotKey::new(11, Weekday::Mon), SlotKey::new(10, Weekday::Sat),
                            SlotKey::new(10, Weekday::Mon)];
        keys.sort();
        assert_eq!(keys, vec![SlotKey::new(10, Weekday::Mon), SlotKey::new(10, Weekday::Sat),
                              SlotKey::new(11, Weekday::Mon)]);
    }

    #[test]
    fn test_isolated_nodes_present() {
        let key = SlotKey::new(10, Weekday::Mon);
        let rows = vec![stat(10, Weekday::Mon, "aa", "bb", 5., 1)];
        let graph = SlotGraph::build(key, &positions(&["aa", "bb", "cc"]), &rows,
                                     EdgeMergePolicy::WeightedMean);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_block("cc"));
        assert_eq!(graph.degree("cc"), Some(0));
        assert_eq!(graph.degree("aa"), Some(1));
        assert_eq!(graph.degree("zz"), None);
        assert_eq!(graph.shortest_path("aa", "cc"), None);
    }

    #[test]
    fn test_merge_weighted_mean() {
        let key = SlotKey::new(10, Weekday::Mon);
        let rows = vec![
            stat(10, Weekday::Mon, "aa", "bb", 10., 3),
            stat(10, Weekday::Mon, "bb", "aa", 20., 1),
        ];
        let graph = SlotGraph::build(key, &positions(&["aa", "bb"]), &rows,
                                     EdgeMergePolicy::WeightedMean);
        assert_eq!(graph.edge_count(), 1);
        assert_relative_eq!(graph.edge_weight("aa", "bb").unwrap(), 12.5);
        assert_relative_eq!(graph.edge_weight("bb", "aa").unwrap(), 12.5);

        // insertion order doesn't matter
        let reversed: Vec<RouteStat> = rows.iter().rev().cloned().collect();
        let graph = SlotGraph::build(key, &positions(&["aa", "bb"]), &reversed,
                                     EdgeMergePolicy::WeightedMean);
        assert_relative_eq!(graph.edge_weight("aa", "bb").unwrap(), 12.5);
    }

    #[test]
    fn test_merge_most_trips() {
        let key = SlotKey::new(10, Weekday::Mon);
        let rows = vec![
            stat(10, Weekday::Mon, "aa", "bb", 10., 1),
            stat(10, Weekday::Mon, "bb", "aa", 20., 2),
            stat(10, Weekday::Mon, "cc", "bb", 7., 2),
            stat(10, Weekday::Mon, "bb", "cc", 9., 2),
        ];
        let graph = SlotGraph::build(key, &positions(&["aa", "bb", "cc"]), &rows,
                                     EdgeMergePolicy::MostTrips);
        assert_relative_eq!(graph.edge_weight("aa", "bb").unwrap(), 20.);
        // tie on trips, "bb" < "cc"
        assert_relative_eq!(graph.edge_weight("bb", "cc").unwrap(), 9.);
    }

    #[test]
    fn test_self_loops_ignored() {
        let key = SlotKey::new(10, Weekday::Mon);
        let rows = vec![stat(10, Weekday::Mon, "aa", "aa", 3., 4)];
        let graph = SlotGraph::build(key, &positions(&["aa"]), &rows,
                                     EdgeMergePolicy::WeightedMean);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.degree("aa"), Some(0));
    }

    #[test]
    fn test_shortest_path() {
        let key = SlotKey::new(10, Weekday::Mon);
        let rows = vec![
            stat(10, Weekday::Mon, "aa", "cc", 30., 1),
            stat(10, Weekday::Mon, "aa", "bb", 10., 1),
            stat(10, Weekday::Mon, "cc", "bb", 8., 1),
        ];
        let graph = SlotGraph::build(key, &positions(&["aa", "bb", "cc"]), &rows,
                                     EdgeMergePolicy::WeightedMean);
        let (cost, path) = graph.shortest_path("aa", "cc").unwrap();
        assert_relative_eq!(cost, 18.);
        assert_eq!(path, vec!["aa", "bb", "cc"]);
        assert_eq!(graph.shortest_path("aa", "zz"), None);
    }

    #[test]
    fn test_index_build() {
        let rows = vec![
            stat(10, Weekday::Mon, "aa", "bb", 5., 1),
            stat(11, Weekday::Mon, "bb", "cc", 5., 1),
            stat(10, Weekday::Sat, "aa", "cc", 5., 1),
            // outside the requested hours
            stat(3, Weekday::Mon, "aa", "cc", 5., 1),
        ];
        let stats = RouteStats::from_rows(rows);
        let blocks = positions(&["aa", "bb", "cc", "dd"]);
        let index = SlotGraphIndex::build(&stats, &blocks, &[10, 11, 12],
                                          &[Weekday::Mon, Weekday::Sat],
                                          EdgeMergePolicy::WeightedMean);
        assert_eq!(index.len(), 6);
        assert!(index.get(3, Weekday::Mon).is_none());
        assert_eq!(index.get(10, Weekday::Mon).unwrap().edge_count(), 1);

        let keys: Vec<String> = index.iter_sorted().iter().map(|gg| gg.key().to_string())
            .collect();
        assert_eq!(keys, vec!["10_Monday", "10_Saturday", "11_Monday", "11_Saturday",
                              "12_Monday", "12_Saturday"]);

        // every built graph holds every known block
        for graph in index.iter_sorted() {
            for (block_id, _) in blocks.iter() {
                assert!(graph.contains_block(block_id));
            }
        }
    }

    #[test]
    fn test_slot_without_trips_is_edgeless() {
        let rows = vec![stat(10, Weekday::Mon, "aa", "bb", 5., 1)];
        let stats = RouteStats::from_rows(rows);
        let blocks = positions(&["aa", "bb", "cc"]);
        let index = SlotGraphIndex::build(&stats, &blocks, &[10, 11], &[Weekday::Sun],
                                          EdgeMergePolicy::WeightedMean);
        assert_eq!(index.len(), 2);
        for hour in &[10, 11] {
            let graph = index.get(*hour, Weekday::Sun).unwrap();
            assert_eq!(graph.node_count(), 3);
            assert_eq!(graph.edge_count(), 0);
            assert_eq!(graph.degree("aa"), Some(0));
            assert_eq!(graph.shortest_path("aa", "bb"), None);
        }
        // the Monday row is outside the configured days
        assert!(index.get(10, Weekday::Mon).is_none());
    }

    #[test]
    fn test_shortest_path_same_block() {
        let key = SlotKey::new(10, Weekday::Mon);
        let graph = SlotGraph::build(key, &positions(&["aa"]), Vec::<&RouteStat>::new(),
                                     EdgeMergePolicy::WeightedMean);
        let (cost, path) = graph.shortest_path("aa", "aa").unwrap();
        assert_relative_eq!(cost, 0.);
        assert_eq!(path, vec!["aa"]);
    }

    #[test]
    fn test_shortest_path_matches_petgraph() {
        let key = SlotKey::new(10, Weekday::Mon);
        let ids = ["n0", "n1", "n2", "n3", "n4", "n5", "n6", "n7"];
        let edges = [(0, 1, 2.5), (1, 2, 1.), (2, 3, 7.25), (3, 0, 1.5), (4, 5, 3.),
                     (1, 4, 10.), (5, 6, 0.5), (6, 7, 2.), (7, 4, 4.), (2, 6, 6.)];
        let rows: Vec<RouteStat> = edges.iter()
            .map(|(ii, jj, ww)| stat(10, Weekday::Mon, ids[*ii], ids[*jj], *ww, 1))
            .collect();
        let graph = SlotGraph::build(key, &positions(&ids), &rows, EdgeMergePolicy::WeightedMean);

        let start = graph.node_idxs_by_id["n0"];
        let all_costs = petgraph::algo::dijkstra(&graph.graph, start, None, |er| *er.weight());
        for id in ids.iter() {
            let (cost, path) = graph.shortest_path("n0", id).unwrap();
            assert_relative_eq!(cost, all_costs[&graph.node_idxs_by_id[*id]]);
            assert_eq!(path[0], "n0");
            assert_eq!(path[path.len() - 1], *id);
        }
    }
}
