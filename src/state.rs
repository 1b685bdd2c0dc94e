//! Run parameters and the coupled chain state: one colouring plus one
//! bounding list per vertex, with the derived queries the update operators
//! consume.

use crate::bounding::BoundingList;
use crate::graph::Graph;
use crate::update::{SampleError, UpdateKind};
use std::fmt;

// ============================================================================
// Parameters
// ============================================================================

/// Run parameters for the sampler.
///
/// The verification inequalities (`q > 2Δ`, `Δ ≥ 3`,
/// `1 − (q − 2Δ)/Δ < B < 1`) are the hypotheses of the expected-polynomial
/// convergence theorem. The core assumes they were checked by the caller and
/// never re-validates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameters {
    /// Number of vertices.
    pub n: usize,
    /// Number of colours.
    pub q: usize,
    /// Maximum degree bound of the graph.
    pub delta: usize,
    /// Temperature; `b < 1` penalizes like-coloured neighbours
    /// (anti-ferromagnetic).
    pub b: f64,
}

/// A violated parameter constraint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterError {
    /// `Δ < 3`.
    DegreeTooSmall {
        /// The supplied degree bound.
        delta: usize,
    },
    /// `q ≤ 2Δ`.
    TooFewColours {
        /// The supplied colour count.
        q: usize,
        /// The supplied degree bound.
        delta: usize,
    },
    /// `B ≥ 1`.
    TemperatureTooHigh {
        /// The supplied temperature.
        b: f64,
    },
    /// `B ≤ 1 − (q − 2Δ)/Δ`.
    TemperatureTooLow {
        /// The supplied temperature.
        b: f64,
        /// The exclusive lower bound `1 − (q − 2Δ)/Δ`.
        minimum: f64,
    },
    /// `q > 64`, which does not fit the `u64` bounding-list representation.
    TooManyColours {
        /// The supplied colour count.
        q: usize,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::DegreeTooSmall { delta } => {
                write!(f, "delta must be at least 3 (got {delta})")
            }
            ParameterError::TooFewColours { q, delta } => {
                write!(
                    f,
                    "the number of colours q must exceed 2 * delta (got q = {q}, delta = {delta})"
                )
            }
            ParameterError::TemperatureTooHigh { b } => {
                write!(f, "B must be less than 1 (got {b})")
            }
            ParameterError::TemperatureTooLow { b, minimum } => {
                write!(
                    f,
                    "B must satisfy B > 1 - (q - 2 * delta) / delta, i.e. B > {minimum} (got {b})"
                )
            }
            ParameterError::TooManyColours { q } => {
                write!(f, "this implementation supports q <= 64 colours (got {q})")
            }
        }
    }
}

impl std::error::Error for ParameterError {}

impl Parameters {
    /// Returns the exclusive lower bound on the temperature,
    /// `1 − (q − 2Δ)/Δ`.
    pub fn temperature_lower_bound(&self) -> f64 {
        1.0 - (self.q as f64 - 2.0 * self.delta as f64) / self.delta as f64
    }

    /// Returns every violated constraint, in checking order.
    pub fn violations(&self) -> Vec<ParameterError> {
        let mut result = Vec::new();
        if self.delta < 3 {
            result.push(ParameterError::DegreeTooSmall { delta: self.delta });
        }
        if self.q <= 2 * self.delta {
            result.push(ParameterError::TooFewColours {
                q: self.q,
                delta: self.delta,
            });
        }
        if self.b >= 1.0 {
            result.push(ParameterError::TemperatureTooHigh { b: self.b });
        }
        if self.b <= self.temperature_lower_bound() {
            result.push(ParameterError::TemperatureTooLow {
                b: self.b,
                minimum: self.temperature_lower_bound(),
            });
        }
        if self.q > 64 {
            result.push(ParameterError::TooManyColours { q: self.q });
        }
        result
    }

    /// Checks the convergence-theorem hypotheses.
    ///
    /// # Errors
    /// Returns the first violated constraint.
    pub fn verify(&self) -> Result<(), ParameterError> {
        match self.violations().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// The coupled chain state for one sampling run.
///
/// Holds the graph and parameters by reference, the current colouring, and
/// the bounding chain. Every bounding list starts as the full colour set and
/// the colouring starts at zero; while enforcement is active,
/// `colouring[v] ∈ bounding_chain[v]` is an invariant. Enforcement is
/// disabled only during backward replay.
#[derive(Clone, Debug)]
pub struct State<'a> {
    graph: &'a Graph,
    params: &'a Parameters,
    colouring: Vec<usize>,
    bounding_chain: Vec<BoundingList>,
    enforce_bounding: bool,
}

impl<'a> State<'a> {
    /// Creates the initial state: all-ones bounding lists, zero colouring,
    /// enforcement on.
    pub fn new(params: &'a Parameters, graph: &'a Graph) -> Self {
        let n = graph.size();
        Self {
            graph,
            params,
            colouring: vec![0; n],
            bounding_chain: vec![BoundingList::full(params.q); n],
            enforce_bounding: true,
        }
    }

    /// Returns the graph this state runs on.
    #[inline(always)]
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Returns the run parameters.
    #[inline(always)]
    pub fn params(&self) -> &'a Parameters {
        self.params
    }

    /// Returns the current colouring.
    #[inline(always)]
    pub fn colouring(&self) -> &[usize] {
        &self.colouring
    }

    /// Returns the colour of `v`.
    #[inline(always)]
    pub fn colour(&self, v: usize) -> usize {
        self.colouring[v]
    }

    /// Returns the bounding list of `v`.
    #[inline(always)]
    pub fn bounding_list(&self, v: usize) -> BoundingList {
        self.bounding_chain[v]
    }

    /// Enables or disables the bounding-list membership check in
    /// [`State::set_colour`]. Disabled only during backward replay.
    pub fn set_enforcement(&mut self, on: bool) {
        self.enforce_bounding = on;
    }

    /// Sets the colour of `v`.
    ///
    /// # Errors
    /// Returns [`SampleError::ColourOutsideBoundingList`] if enforcement is
    /// active and `c` is not in the bounding list of `v`; this signals a
    /// construction/ordering bug in the calling operator, tagged `kind`.
    pub fn set_colour(&mut self, v: usize, c: usize, kind: UpdateKind) -> Result<(), SampleError> {
        if self.enforce_bounding && !self.bounding_chain[v].contains(c) {
            return Err(SampleError::ColourOutsideBoundingList {
                vertex: v,
                colour: c,
                kind,
            });
        }
        self.colouring[v] = c;
        Ok(())
    }

    /// Replaces the bounding list of `v`.
    pub fn set_bounding_list(&mut self, v: usize, list: BoundingList) {
        debug_assert_eq!(list.width(), self.params.q);
        debug_assert!(list.count() > 0, "bounding list at {v} may never be empty");
        self.bounding_chain[v] = list;
    }

    /// Returns whether every bounding list has collapsed to a singleton.
    pub fn is_converged(&self) -> bool {
        self.bounding_chain.iter().all(BoundingList::is_singleton)
    }

    // ------------------------------------------------------------------------
    // Derived queries
    // ------------------------------------------------------------------------

    /// Union, over neighbours of `v` whose bounding list still has more than
    /// one candidate, of those lists. A vertex with no such neighbours
    /// correctly yields the empty set.
    pub fn unfixed_colours(&self, v: usize) -> BoundingList {
        let mut result = BoundingList::empty(self.params.q);
        for &w in self.graph.neighbours(v) {
            let list = self.bounding_chain[w];
            if list.count() > 1 {
                result = result.union(&list);
            }
        }
        result
    }

    /// Complement of [`State::unfixed_colours`].
    pub fn fixed_colours(&self, v: usize) -> BoundingList {
        self.unfixed_colours(v).complement()
    }

    /// Length-q histogram of the assigned colours on the neighbours of `v`.
    pub fn neighbourhood_colour_count(&self, v: usize) -> Vec<u32> {
        let mut count = vec![0u32; self.params.q];
        for &w in self.graph.neighbours(v) {
            count[self.colouring[w]] += 1;
        }
        count
    }

    /// Number of neighbours of `v` whose bounding list has collapsed to
    /// exactly `{c}`.
    pub fn m_q(&self, v: usize, c: usize) -> u32 {
        let mut result = 0;
        for &w in self.graph.neighbours(v) {
            let list = self.bounding_chain[w];
            if list.is_singleton() && list.contains(c) {
                result += 1;
            }
        }
        result
    }

    /// Builds the candidate set `A` for the neighbourhood of `v`: the union
    /// of the bounding lists of neighbours `w > v`, truncated to its `size`
    /// lowest colours, then padded with the lowest unset colours until
    /// exactly `min(q, size)` bits are set.
    ///
    /// The fixed cardinality is required by the Compress operator.
    pub fn generate_a(&self, v: usize, size: usize) -> BoundingList {
        debug_assert!(size <= self.params.q);

        let mut a = BoundingList::empty(self.params.q);
        for &w in self.graph.neighbours(v) {
            if w > v {
                a = a.union(&self.bounding_chain[w]);
            }
        }
        a.truncate_to_at_most_k(size);

        let target = size.min(self.params.q);
        while a.count() < target {
            match a.first_unset() {
                Some(c) => a.set(c),
                None => break,
            }
        }
        a
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn bl(width: usize, colours: &[usize]) -> BoundingList {
        BoundingList::from_colours(width, colours).unwrap()
    }

    fn five_cycle_params() -> Parameters {
        Parameters {
            n: 5,
            q: 7,
            delta: 3,
            b: 0.95,
        }
    }

    // -------------------------------------------------------------------------
    // Parameter verification
    // -------------------------------------------------------------------------

    #[test]
    fn valid_parameters_verify() {
        assert_eq!(five_cycle_params().verify(), Ok(()));
    }

    #[test]
    fn small_degree_is_rejected() {
        let params = Parameters { n: 5, q: 7, delta: 2, b: 0.95 };
        assert_eq!(
            params.verify(),
            Err(ParameterError::DegreeTooSmall { delta: 2 })
        );
    }

    #[test]
    fn too_few_colours_is_rejected() {
        let params = Parameters { n: 5, q: 6, delta: 3, b: 0.95 };
        assert_eq!(
            params.verify(),
            Err(ParameterError::TooFewColours { q: 6, delta: 3 })
        );
    }

    #[test]
    fn hot_temperature_is_rejected() {
        let params = Parameters { n: 5, q: 7, delta: 3, b: 1.0 };
        assert_eq!(
            params.verify(),
            Err(ParameterError::TemperatureTooHigh { b: 1.0 })
        );
    }

    #[test]
    fn cold_temperature_is_rejected() {
        // Lower bound for q = 7, delta = 3 is 1 - 1/3.
        let params = Parameters { n: 5, q: 7, delta: 3, b: 0.5 };
        assert!(matches!(
            params.verify(),
            Err(ParameterError::TemperatureTooLow { .. })
        ));
    }

    #[test]
    fn wide_colour_count_is_rejected() {
        let params = Parameters { n: 5, q: 65, delta: 3, b: 0.95 };
        assert_eq!(
            params.verify(),
            Err(ParameterError::TooManyColours { q: 65 })
        );
    }

    #[test]
    fn violations_reports_every_failure() {
        let params = Parameters { n: 5, q: 4, delta: 2, b: 1.5 };
        let violations = params.violations();
        assert!(violations.len() >= 3, "got {violations:?}");
    }

    // -------------------------------------------------------------------------
    // State initialization and colour enforcement
    // -------------------------------------------------------------------------

    #[test]
    fn state_initializes_with_full_bounding_chain() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let state = State::new(&params, &graph);
        for v in 0..5 {
            assert_eq!(state.bounding_list(v), BoundingList::full(7));
            assert_eq!(state.colour(v), 0);
        }
        assert!(!state.is_converged());
    }

    #[test]
    fn set_colour_inside_bounding_list() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);
        state.set_colour(0, 3, UpdateKind::Contract).unwrap();
        assert_eq!(state.colour(0), 3);
    }

    #[test]
    fn set_colour_only_inside_bounding_list() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);

        state.set_bounding_list(4, bl(7, &[1]));
        let err = state.set_colour(4, 2, UpdateKind::Contract).unwrap_err();
        assert_eq!(
            err,
            SampleError::ColourOutsideBoundingList {
                vertex: 4,
                colour: 2,
                kind: UpdateKind::Contract
            }
        );
    }

    #[test]
    fn replay_disables_enforcement() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);
        state.set_bounding_list(4, bl(7, &[1]));
        state.set_enforcement(false);
        state.set_colour(4, 2, UpdateKind::Contract).unwrap();
        assert_eq!(state.colour(4), 2);
    }

    // -------------------------------------------------------------------------
    // Derived queries (fixtures from the 5-cycle, q = 7)
    // -------------------------------------------------------------------------

    #[test]
    fn unfixed_colours_of_full_chain_is_full() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let state = State::new(&params, &graph);
        assert_eq!(state.unfixed_colours(0), BoundingList::full(7));
    }

    #[test]
    fn unfixed_colours_skips_singleton_neighbours() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);

        // Neighbours of 3 are 2 and 4.
        state.set_bounding_list(2, bl(7, &[1]));
        state.set_bounding_list(4, bl(7, &[3, 4]));
        assert_eq!(state.unfixed_colours(3), bl(7, &[3, 4]));
        assert_eq!(state.fixed_colours(3), bl(7, &[0, 1, 2, 5, 6]));
    }

    #[test]
    fn neighbourhood_colour_count_histogram() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);
        state.set_colour(2, 2, UpdateKind::Contract).unwrap();
        state.set_colour(4, 4, UpdateKind::Contract).unwrap();
        assert_eq!(
            state.neighbourhood_colour_count(3),
            vec![0, 0, 1, 0, 1, 0, 0]
        );
    }

    #[test]
    fn m_q_counts_collapsed_neighbours() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);

        for c in 0..7 {
            assert_eq!(state.m_q(3, c), 0);
        }

        state.set_bounding_list(2, bl(7, &[1]));
        assert_eq!(state.m_q(3, 1), 1);
        assert_eq!(state.m_q(3, 2), 0);
    }

    #[test]
    fn generate_a_on_full_chain() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let state = State::new(&params, &graph);
        assert_eq!(state.generate_a(0, 3), bl(7, &[0, 1, 2]));
    }

    #[test]
    fn generate_a_pads_to_requested_size() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);

        state.set_bounding_list(2, bl(7, &[1, 2]));
        state.set_bounding_list(4, bl(7, &[2, 3]));
        // Only neighbour 4 of vertex 3 is greater than 3; its list {2,3} is
        // padded up with the lowest unset colours.
        assert_eq!(state.generate_a(3, 5), bl(7, &[0, 1, 2, 3, 4]));
    }

    #[test]
    fn generate_a_cardinality_is_fixed() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);
        state.set_bounding_list(1, bl(7, &[6]));
        state.set_bounding_list(2, bl(7, &[0, 5]));
        state.set_bounding_list(4, bl(7, &[3]));

        for v in 0..5 {
            for size in 0..=7 {
                let a = state.generate_a(v, size);
                assert_eq!(a.count(), size.min(7), "v = {v}, size = {size}");
            }
        }
    }

    #[test]
    fn convergence_detection() {
        let params = five_cycle_params();
        let graph = Graph::cycle(5);
        let mut state = State::new(&params, &graph);
        assert!(!state.is_converged());
        for v in 0..5 {
            state.set_bounding_list(v, bl(7, &[v]));
        }
        assert!(state.is_converged());
    }
}
