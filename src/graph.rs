//! Immutable graphs as adjacency lists, plus the canned topologies the CLI
//! can build by name.

use std::fmt;
use std::str::FromStr;

// ============================================================================
// Graph
// ============================================================================

/// An undirected simple graph, immutable once built.
///
/// Neighbour lists are kept sorted ascending. The sampler's "neighbour
/// `w > v`" rule depends on this ordering being stable between construction
/// and traversal; it is not otherwise meaningful.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    neighbours: Vec<Vec<usize>>,
    num_edges: usize,
    max_degree: usize,
}

/// Named topologies the binary can construct directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphKind {
    /// The cycle on `n` vertices (a single edge when `n == 2`).
    Cycle,
    /// The complete graph on `n` vertices.
    Complete,
}

impl FromStr for GraphKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "cycle" => Ok(GraphKind::Cycle),
            "complete" => Ok(GraphKind::Complete),
            other => Err(format!(
                "unknown graph type {other:?} (expected \"cycle\" or \"complete\")"
            )),
        }
    }
}

/// Errors encountered while building a graph from an explicit edge list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphBuildError {
    /// An edge joins a vertex to itself.
    SelfLoop {
        /// The vertex with a self-loop.
        vertex: usize,
    },
    /// An edge endpoint is not a vertex of the graph.
    EndpointOutOfRange {
        /// The offending endpoint.
        vertex: usize,
        /// The number of vertices in the graph.
        size: usize,
    },
}

impl fmt::Display for GraphBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphBuildError::SelfLoop { vertex } => {
                write!(f, "self-loop at vertex {vertex}")
            }
            GraphBuildError::EndpointOutOfRange { vertex, size } => {
                write!(f, "edge endpoint {vertex} out of range for {size} vertices")
            }
        }
    }
}

impl std::error::Error for GraphBuildError {}

impl Graph {
    /// Builds a graph on `n` vertices from an edge list.
    ///
    /// Duplicate edges (in either orientation) are collapsed.
    ///
    /// # Errors
    /// Returns an error on a self-loop or an out-of-range endpoint.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self, GraphBuildError> {
        let mut canonical = Vec::with_capacity(edges.len());
        for &(u, v) in edges {
            if u >= n {
                return Err(GraphBuildError::EndpointOutOfRange { vertex: u, size: n });
            }
            if v >= n {
                return Err(GraphBuildError::EndpointOutOfRange { vertex: v, size: n });
            }
            if u == v {
                return Err(GraphBuildError::SelfLoop { vertex: u });
            }
            canonical.push((u.min(v), u.max(v)));
        }
        canonical.sort_unstable();
        canonical.dedup();
        Ok(Self::from_canonical_edges(n, &canonical))
    }

    /// Builds a named topology.
    pub fn build(n: usize, kind: GraphKind) -> Self {
        match kind {
            GraphKind::Cycle => Self::cycle(n),
            GraphKind::Complete => Self::complete(n),
        }
    }

    /// Builds the cycle on `n` vertices.
    ///
    /// `n == 2` degenerates to a single edge and `n < 2` to no edges.
    pub fn cycle(n: usize) -> Self {
        let mut edges = Vec::with_capacity(n);
        for u in 0..n {
            let v = (u + 1) % n;
            if u != v {
                edges.push((u.min(v), u.max(v)));
            }
        }
        edges.sort_unstable();
        edges.dedup();
        Self::from_canonical_edges(n, &edges)
    }

    /// Builds the complete graph on `n` vertices.
    pub fn complete(n: usize) -> Self {
        let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for u in 0..n {
            for v in (u + 1)..n {
                edges.push((u, v));
            }
        }
        Self::from_canonical_edges(n, &edges)
    }

    /// `edges` must be deduplicated pairs `(u, v)` with `u < v < n`.
    fn from_canonical_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut neighbours = vec![Vec::new(); n];
        for &(u, v) in edges {
            neighbours[u].push(v);
            neighbours[v].push(u);
        }
        for list in &mut neighbours {
            list.sort_unstable();
        }
        let max_degree = neighbours.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            neighbours,
            num_edges: edges.len(),
            max_degree,
        }
    }

    /// Returns the number of vertices.
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.neighbours.len()
    }

    /// Returns the number of edges.
    #[inline(always)]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Returns the maximum degree over all vertices.
    #[inline(always)]
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Returns the degree of `v`.
    #[inline(always)]
    pub fn degree(&self, v: usize) -> usize {
        self.neighbours[v].len()
    }

    /// Returns the neighbours of `v` in ascending order.
    #[inline(always)]
    pub fn neighbours(&self, v: usize) -> &[usize] {
        &self.neighbours[v]
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v, list) in self.neighbours.iter().enumerate() {
            write!(f, "{v}: {{")?;
            for (i, w) in list.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{w}")?;
            }
            writeln!(f, "}}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
