//! # Directed graph with longest-path distances.
//!
//! [`Graph`] stores vertices in insertion order and, per vertex, an ordered list of
//! de-duplicated outgoing edges. Iteration order is therefore reproducible for a given
//! sequence of `add_vertex`/`add_edge` calls, which keeps stage membership and reported
//! cycles deterministic.
//!
//! ## Distance computation
//! ```text
//! adjacency_to_node(target):
//!   reverse() ──► DFS from target (marks: unvisited / in progress / done)
//!                   ├─ in-progress revisit ──► Err(Cycle { stack[from..] + vertex })
//!                   └─ post-order
//!   relax in reverse post-order: dist[w] = max(dist[w], dist[u] + 1)
//! ```
//! Every vertex with a path to `target` receives the length of its **longest** path.

use std::collections::HashMap;
use std::hash::Hash;

/// A closed walk found while computing distances.
///
/// `path` starts and ends with the same vertex. Consecutive entries `x, y` are joined by
/// the edge `y → x` when found by [`Graph::adjacency_to_node`], and by `x → y` when found
/// by [`Graph::find_cycle_from`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<V> {
    /// Vertices along the cycle.
    pub path: Vec<V>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Directed graph keyed by vertex value.
#[derive(Debug, Clone)]
pub struct Graph<V> {
    vertices: Vec<V>,
    index: HashMap<V, usize>,
    out: Vec<Vec<usize>>,
}

impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            index: HashMap::new(),
            out: Vec::new(),
        }
    }
}

impl<V: Clone + Eq + Hash> Graph<V> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex; a no-op if it is already present.
    pub fn add_vertex(&mut self, v: V) {
        self.slot(v);
    }

    /// Adds the edge `from → to`, inserting missing endpoints; a no-op if present.
    pub fn add_edge(&mut self, from: V, to: V) {
        let from = self.slot(from);
        let to = self.slot(to);
        if !self.out[from].contains(&to) {
            self.out[from].push(to);
        }
    }

    /// Vertices without outgoing edges, in insertion order.
    ///
    /// Each call starts a fresh iteration.
    pub fn leaves(&self) -> impl Iterator<Item = &V> + '_ {
        self.vertices
            .iter()
            .zip(&self.out)
            .filter(|(_, out)| out.is_empty())
            .map(|(v, _)| v)
    }

    /// Returns a new graph with every edge flipped.
    pub fn reverse(&self) -> Self {
        let mut out = vec![Vec::new(); self.vertices.len()];
        for (from, targets) in self.out.iter().enumerate() {
            for &to in targets {
                out[to].push(from);
            }
        }
        Self {
            vertices: self.vertices.clone(),
            index: self.index.clone(),
            out,
        }
    }

    /// Returns a copy sharing vertex values but with independent edge sets.
    pub fn shallow_clone(&self) -> Self {
        self.clone()
    }

    /// Longest path length from every vertex to `target`.
    ///
    /// Only vertices with a path to `target` appear in the result; `target` maps to `0`.
    /// An absent `target` yields an empty map.
    ///
    /// ### Errors
    /// [`Cycle`] if a cycle exists among the vertices with a path to `target`.
    pub fn adjacency_to_node(&self, target: &V) -> Result<HashMap<V, usize>, Cycle<V>> {
        let Some(&start) = self.index.get(target) else {
            return Ok(HashMap::new());
        };

        let rev = self.reverse();
        let order = rev.post_order(start)?;

        let mut dist: Vec<Option<usize>> = vec![None; self.vertices.len()];
        dist[start] = Some(0);
        for &u in order.iter().rev() {
            let Some(d) = dist[u] else { continue };
            for &w in &rev.out[u] {
                dist[w] = Some(dist[w].map_or(d + 1, |cur| cur.max(d + 1)));
            }
        }

        Ok(order
            .into_iter()
            .filter_map(|u| dist[u].map(|d| (self.vertices[u].clone(), d)))
            .collect())
    }

    /// Follows edges from `start` and returns the first cycle met, if any.
    pub fn find_cycle_from(&self, start: &V) -> Option<Cycle<V>> {
        let &i = self.index.get(start)?;
        self.post_order(i).err()
    }

    /// Depth-first post-order of everything reachable from `start`.
    ///
    /// Iterative: each frame is a vertex and the index of its next edge to follow, so
    /// chain length is bounded by heap, not by the call stack.
    fn post_order(&self, start: usize) -> Result<Vec<usize>, Cycle<V>> {
        let mut marks = vec![Mark::Unvisited; self.vertices.len()];
        let mut order = Vec::with_capacity(self.vertices.len());
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        marks[start] = Mark::InProgress;

        while let Some(&(u, next)) = stack.last() {
            let Some(&w) = self.out[u].get(next) else {
                stack.pop();
                marks[u] = Mark::Done;
                order.push(u);
                continue;
            };
            let top = stack.len() - 1;
            stack[top].1 += 1;

            match marks[w] {
                Mark::Done => {}
                Mark::Unvisited => {
                    marks[w] = Mark::InProgress;
                    stack.push((w, 0));
                }
                Mark::InProgress => {
                    let from = stack.iter().rposition(|&(x, _)| x == w).unwrap_or(0);
                    let path = stack[from..]
                        .iter()
                        .map(|&(x, _)| x)
                        .chain(std::iter::once(w))
                        .map(|x| self.vertices[x].clone())
                        .collect();
                    return Err(Cycle { path });
                }
            }
        }
        Ok(order)
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns true if `v` is a vertex.
    pub fn contains(&self, v: &V) -> bool {
        self.index.contains_key(v)
    }

    /// Returns true if the edge `from → to` exists.
    pub fn has_edge(&self, from: &V, to: &V) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&f), Some(&t)) => self.out[f].contains(&t),
            _ => false,
        }
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &V> + '_ {
        self.vertices.iter()
    }

    /// Direct successors of `v` in edge insertion order.
    pub fn successors<'a>(&'a self, v: &V) -> impl Iterator<Item = &'a V> + 'a {
        let targets = self.index.get(v).map(|&i| self.out[i].as_slice()).unwrap_or(&[]);
        targets.iter().map(|&t| &self.vertices[t])
    }

    fn slot(&mut self, v: V) -> usize {
        if let Some(&i) = self.index.get(&v) {
            return i;
        }
        let i = self.vertices.len();
        self.index.insert(v.clone(), i);
        self.vertices.push(v);
        self.out.push(Vec::new());
        i
    }
}
