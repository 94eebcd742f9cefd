use std::collections::HashSet;

/// Undirected set of consecutive pairs along the best route.
#[derive(Clone, Debug, Default)]
pub(super) struct RouteEdges {
    pairs: HashSet<(String, String)>,
    stops: HashSet<String>,
}

impl RouteEdges {
    pub(super) fn from_route(route: &[String]) -> Self {
        let mut pairs = HashSet::new();
        for pair in route.windows(2) {
            if let [from, to] = pair
                && from != to
            {
                pairs.insert(ordered(from, to));
            }
        }

        Self {
            pairs,
            stops: route.iter().cloned().collect(),
        }
    }

    pub(super) fn contains(&self, from: &str, to: &str) -> bool {
        !self.is_empty() && self.pairs.contains(&ordered(from, to))
    }

    pub(super) fn visits(&self, node_id: &str) -> bool {
        self.stops.contains(node_id)
    }

    pub(super) fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn ordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn matches_adjacent_pairs_in_either_direction() {
        let edges = RouteEdges::from_route(&route(&["Start", "R1", "R2"]));
        assert!(edges.contains("R1", "Start"));
        assert!(edges.contains("Start", "R1"));
        assert!(edges.contains("R2", "R1"));
        assert!(!edges.contains("R1", "R3"));
        assert!(!edges.contains("Start", "R2"));
    }

    #[test]
    fn empty_or_single_stop_route_matches_nothing() {
        assert!(RouteEdges::from_route(&[]).is_empty());
        let single = RouteEdges::from_route(&route(&["Start"]));
        assert!(single.is_empty());
        assert!(!single.contains("Start", "Start"));
        assert!(single.visits("Start"));
    }

    #[test]
    fn revisited_nodes_keep_every_adjacent_pair() {
        let edges = RouteEdges::from_route(&route(&["A", "B", "C", "B", "D"]));
        assert!(edges.contains("B", "C"));
        assert!(edges.contains("D", "B"));
        assert!(!edges.contains("A", "D"));
    }

    #[test]
    fn unknown_route_ids_are_ignored() {
        let edges = RouteEdges::from_route(&route(&["Start", "Ghost", "End"]));
        assert!(!edges.contains("Start", "End"));
        assert!(edges.contains("Ghost", "End"));
    }
}
