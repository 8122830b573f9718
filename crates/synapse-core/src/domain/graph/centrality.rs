//! Betweenness centrality (Brandes)
//!
//! Shortest paths are counted by hop, edge weights are ignored. Scores are
//! normalized by 1/((n-1)(n-2)) for undirected graphs with more than two
//! nodes, so a path graph's middle node scores 1.0.

use std::collections::VecDeque;

use super::store::Adjacency;

/// Betweenness score per dense index
pub fn betweenness(adjacency: &Adjacency) -> Vec<f64> {
    let n = adjacency.len();
    let mut scores = vec![0.0; n];

    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    let mut distance = vec![-1_i64; n];
    let mut delta = vec![0.0_f64; n];
    let mut queue = VecDeque::with_capacity(n);

    for source in 0..n {
        stack.clear();
        queue.clear();
        for v in 0..n {
            predecessors[v].clear();
            sigma[v] = 0.0;
            distance[v] = -1;
            delta[v] = 0.0;
        }
        sigma[source] = 1.0;
        distance[source] = 0;
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &(w, _) in &adjacency.neighbors[v] {
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
                if distance[w] == distance[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                scores[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for score in &mut scores {
            *score *= scale;
        }
    }

    scores
}

/// Entity ids with their scores, highest first, ties in insertion order
pub fn ranked_betweenness(adjacency: &Adjacency) -> Vec<(String, f64)> {
    let scores = betweenness(adjacency);
    let mut ranked: Vec<(String, f64)> = adjacency.ids.iter().cloned().zip(scores).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(ids: &[&str], edges: &[(usize, usize)]) -> Adjacency {
        let mut neighbors = vec![Vec::new(); ids.len()];
        for &(a, b) in edges {
            neighbors[a].push((b, 1.0));
            neighbors[b].push((a, 1.0));
        }
        for list in &mut neighbors {
            list.sort_by_key(|(i, _)| *i);
        }
        Adjacency {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            neighbors,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_path_graph_center() {
        let adj = adjacency(&["a", "b", "c"], &[(0, 1), (1, 2)]);
        let scores = betweenness(&adj);
        assert!(approx(scores[0], 0.0));
        assert!(approx(scores[1], 1.0));
        assert!(approx(scores[2], 0.0));
    }

    #[test]
    fn test_star_graph() {
        let adj = adjacency(&["hub", "x", "y", "z"], &[(0, 1), (0, 2), (0, 3)]);
        let scores = betweenness(&adj);
        assert!(approx(scores[0], 1.0));
        assert!(scores[1..].iter().all(|s| approx(*s, 0.0)));
    }

    #[test]
    fn test_triangle_has_no_brokers() {
        let adj = adjacency(&["a", "b", "c"], &[(0, 1), (1, 2), (0, 2)]);
        assert!(betweenness(&adj).iter().all(|s| approx(*s, 0.0)));
    }

    #[test]
    fn test_path_of_four() {
        // a - b - c - d: b and c each sit on 2 of the 3 pairs not touching them
        let adj = adjacency(&["a", "b", "c", "d"], &[(0, 1), (1, 2), (2, 3)]);
        let scores = betweenness(&adj);
        assert!(approx(scores[1], 2.0 / 3.0));
        assert!(approx(scores[2], 2.0 / 3.0));
    }

    #[test]
    fn test_split_shortest_paths() {
        // square a-b-d, a-c-d: b and c split the a..d paths
        let adj = adjacency(&["a", "b", "c", "d"], &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let scores = betweenness(&adj);
        assert!(approx(scores[1], scores[2]));
        assert!(approx(scores[0], scores[3]));
        assert!(approx(scores[1], 1.0 / 6.0));
    }

    #[test]
    fn test_two_nodes_not_scaled() {
        let adj = adjacency(&["a", "b"], &[(0, 1)]);
        assert_eq!(betweenness(&adj), vec![0.0, 0.0]);
    }

    #[test]
    fn test_ranked_ties_keep_insertion_order() {
        let adj = adjacency(&["a", "b", "c", "d", "e"], &[(0, 1), (1, 2), (3, 4)]);
        let ranked = ranked_betweenness(&adj);
        assert_eq!(ranked[0].0, "b");
        let rest: Vec<&str> = ranked[1..].iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(rest, vec!["a", "c", "d", "e"]);
    }
}
