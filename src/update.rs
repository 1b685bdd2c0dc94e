//! The two coupled update operators, Compress and Contract.
//!
//! Every update is built in two steps: the constructor draws all of its
//! randomness up front (so an archived update replays without touching the
//! generator), and `apply` writes the bounding chain first and the colouring
//! second. The bounding write must come first: the colouring write is checked
//! against the list it just produced.

use crate::bounding::BoundingList;
use crate::random;
use crate::state::State;
use rand::Rng;
use std::fmt;

// ============================================================================
// Errors
// ============================================================================

/// Which operator produced an update or an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    /// Edge update; shrinks a neighbour's bounding list to at most `Δ + 1`
    /// colours.
    Compress,
    /// Vertex update; shrinks a bounding list towards a singleton.
    Contract,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateKind::Compress => write!(f, "compress"),
            UpdateKind::Contract => write!(f, "contract"),
        }
    }
}

/// A failure while constructing or applying an update.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleError {
    /// A colouring write fell outside the vertex's bounding list while
    /// enforcement was active. Indicates an operator bug, never bad input.
    ColourOutsideBoundingList {
        /// The vertex being written.
        vertex: usize,
        /// The rejected colour.
        colour: usize,
        /// The operator that produced the write.
        kind: UpdateKind,
    },
    /// A draw had an empty support.
    EmptyCandidateSet {
        /// The vertex being updated.
        vertex: usize,
        /// The operator that made the draw.
        kind: UpdateKind,
    },
    /// The inverse-CDF walk over the candidate set exhausted every colour
    /// without accepting one; accumulated floating-point rounding.
    RoundingFailure {
        /// The vertex being updated.
        vertex: usize,
        /// The operator that made the draw.
        kind: UpdateKind,
    },
    /// A failure annotated with the sampler iteration it occurred in.
    Iteration {
        /// Zero-based epoch index.
        iteration: usize,
        /// Whether the failure happened while replaying archived seeds
        /// rather than while running forward.
        replay: bool,
        /// The underlying failure.
        source: Box<SampleError>,
    },
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::ColourOutsideBoundingList {
                vertex,
                colour,
                kind,
            } => write!(
                f,
                "{kind} update assigned colour {colour} at vertex {vertex}, \
                 outside its bounding list"
            ),
            SampleError::EmptyCandidateSet { vertex, kind } => write!(
                f,
                "{kind} update at vertex {vertex} drew from an empty candidate set"
            ),
            SampleError::RoundingFailure { vertex, kind } => write!(
                f,
                "{kind} update at vertex {vertex} accepted no colour from its \
                 candidate set (rounding error)"
            ),
            SampleError::Iteration {
                iteration,
                replay,
                source,
            } => {
                if *replay {
                    write!(f, "iteration {iteration} (from seed): {source}")
                } else {
                    write!(f, "iteration {iteration}: {source}")
                }
            }
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Iteration { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

// ============================================================================
// Weights
// ============================================================================

/// Maps a neighbourhood colour histogram through `m -> B^m`.
pub fn compute_weights(b: f64, counts: &[u32]) -> Vec<f64> {
    counts.iter().map(|&m| b.powi(m as i32)).collect()
}

// ============================================================================
// Update
// ============================================================================

/// One archived update: all random draws fixed at construction, the state
/// writes deferred to `apply`. Replay re-runs `apply_colouring` alone.
#[derive(Clone, Copy, Debug)]
pub enum Update {
    /// Compress on the neighbour `vertex` of an edge, with shared candidate
    /// set `a`.
    Compress {
        /// The vertex whose list and colour are written.
        vertex: usize,
        /// Uniform draw from the complement of `a`.
        c1: usize,
        /// Uniform real in `[0, 1)` driving both the cutoff decision and the
        /// inverse-CDF walk over `a`.
        tau: f64,
        /// The candidate set shared by both endpoints of the edge.
        a: BoundingList,
    },
    /// Contract at `vertex`.
    Contract {
        /// The vertex whose list and colour are written.
        vertex: usize,
        /// Uniform draw from the unfixed colours (0 when that set is empty;
        /// both cutoffs are then 0 and c1 is never chosen).
        c1: usize,
        /// Categorical draw from the fixed colours, weighted by `B^{m_Q}`.
        c2: usize,
        /// Uniform real in `[0, 1)` shared by the colouring and bounding
        /// decisions.
        gamma: f64,
        /// Cardinality of the unfixed colour set, frozen at construction.
        unfixed_count: usize,
    },
}

impl Update {
    /// Draws a Compress update for the neighbour `vertex` with candidate set
    /// `a`.
    ///
    /// # Errors
    /// Returns [`SampleError::EmptyCandidateSet`] if the complement of `a`
    /// is empty, which cannot happen while `|A| = Δ < q` holds.
    pub fn compress<R: Rng>(
        vertex: usize,
        a: BoundingList,
        rng: &mut R,
    ) -> Result<Self, SampleError> {
        let c1 = random::uniform_over_set_bits(rng, &a.complement()).ok_or(
            SampleError::EmptyCandidateSet {
                vertex,
                kind: UpdateKind::Compress,
            },
        )?;
        let tau = random::unit(rng);
        Ok(Update::Compress { vertex, c1, tau, a })
    }

    /// Draws a Contract update at `vertex`.
    ///
    /// # Errors
    /// Returns [`SampleError::EmptyCandidateSet`] if no colour is fixed in
    /// the neighbourhood, which cannot happen while `q > 2Δ` holds.
    pub fn contract<R: Rng>(
        state: &State<'_>,
        vertex: usize,
        rng: &mut R,
    ) -> Result<Self, SampleError> {
        let unfixed = state.unfixed_colours(vertex);
        let c1 = random::uniform_over_set_bits(rng, &unfixed).unwrap_or(0);
        let gamma = random::unit(rng);

        let mut weights = vec![0.0; state.params().q];
        for c in state.fixed_colours(vertex).iter() {
            weights[c] = state.params().b.powi(state.m_q(vertex, c) as i32);
        }
        let c2 = random::sample_from_weights(rng, &weights).ok_or(
            SampleError::EmptyCandidateSet {
                vertex,
                kind: UpdateKind::Contract,
            },
        )?;

        Ok(Update::Contract {
            vertex,
            c1,
            c2,
            gamma,
            unfixed_count: unfixed.count(),
        })
    }

    /// Writes the bounding chain, then the colouring.
    ///
    /// # Errors
    /// Propagates any colouring failure.
    pub fn apply(&self, state: &mut State<'_>) -> Result<(), SampleError> {
        self.apply_bounding_chain(state);
        self.apply_colouring(state)
    }

    /// Writes the new bounding list of the updated vertex.
    pub fn apply_bounding_chain(&self, state: &mut State<'_>) {
        match *self {
            Update::Compress { vertex, c1, a, .. } => {
                let mut list = a;
                list.set(c1);
                state.set_bounding_list(vertex, list);
            }
            Update::Contract {
                vertex,
                c1,
                c2,
                gamma,
                unfixed_count,
            } => {
                let p = state.params();
                let cutoff =
                    unfixed_count as f64 / (p.q as f64 - p.delta as f64 * (1.0 - p.b));
                let mut list = BoundingList::empty(p.q);
                list.set(c2);
                if gamma <= cutoff {
                    list.set(c1);
                }
                state.set_bounding_list(vertex, list);
            }
        }
    }

    /// Writes the new colour of the updated vertex. Used alone during
    /// backward replay.
    ///
    /// # Errors
    /// Returns [`SampleError::RoundingFailure`] if the inverse-CDF walk over
    /// the candidate set accepts nothing, and propagates enforcement
    /// failures from the state.
    pub fn apply_colouring(&self, state: &mut State<'_>) -> Result<(), SampleError> {
        match *self {
            Update::Compress { vertex, c1, tau, a } => {
                let p = state.params();
                let weights = compute_weights(p.b, &state.neighbourhood_colour_count(vertex));
                let z: f64 = weights.iter().sum();
                let cutoff = (p.q as f64 - p.delta as f64) * weights[c1] / z;
                let colour = if tau < cutoff {
                    c1
                } else {
                    sample_from_a(vertex, tau, &a, &weights)?
                };
                state.set_colour(vertex, colour, UpdateKind::Compress)
            }
            Update::Contract {
                vertex,
                c1,
                c2,
                gamma,
                unfixed_count,
            } => {
                let p = state.params();
                let weights = compute_weights(p.b, &state.neighbourhood_colour_count(vertex));
                let z: f64 = weights.iter().sum();
                let cutoff = p.b.powf(weights[c1]) * unfixed_count as f64 / z;
                let colour = if gamma < cutoff { c1 } else { c2 };
                state.set_colour(vertex, colour, UpdateKind::Contract)
            }
        }
    }
}

/// Inverse-CDF walk over the candidate set in ascending colour order, with
/// acceptance threshold `tau` times the restricted normalizer.
fn sample_from_a(
    vertex: usize,
    tau: f64,
    a: &BoundingList,
    weights: &[f64],
) -> Result<usize, SampleError> {
    let norm: f64 = a.iter().map(|c| weights[c]).sum();
    let threshold = tau * norm;

    let mut total = 0.0;
    for c in a.iter() {
        if total + weights[c] > threshold {
            return Ok(c);
        }
        total += weights[c];
    }
    Err(SampleError::RoundingFailure {
        vertex,
        kind: UpdateKind::Compress,
    })
}

// ============================================================================
// Tests
// ============================================================================
