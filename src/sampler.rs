//! The epoch/phase driver: coupling from the past over the bounding chain.
//!
//! Each epoch runs Phase One (a vertex-ascending sweep of Compress and
//! Contract updates) and Phase Two (a fixed number of Contract updates at
//! random vertices), archiving every applied update. Once all bounding lists
//! are singletons, every archived epoch except the most recent is replayed in
//! forward chronological order with only its colouring effects, which yields
//! an exact sample.

use crate::graph::Graph;
use crate::state::{Parameters, State};
use crate::update::{SampleError, Update};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Number of Phase Two contractions per epoch,
/// `n + 1 + |E| + n²·(q − Δ(1−B)/(q − Δ(3−B)))`.
///
/// Chosen so the expected epoch count is polynomial; the exact value affects
/// performance only, never correctness of the sample.
pub fn phase_two_iters(graph: &Graph, params: &Parameters) -> usize {
    let n = graph.size() as f64;
    let q = params.q as f64;
    let delta = params.delta as f64;
    let tail = n * n * (q - delta * (1.0 - params.b) / (q - delta * (3.0 - params.b)));
    graph.size() + 1 + graph.num_edges() + tail as usize
}

/// One sampling run over a graph.
pub struct Sampler<'a> {
    state: State<'a>,
    phase_two_iters: usize,
    history: Vec<Vec<Update>>,
}

impl<'a> Sampler<'a> {
    /// Creates a sampler with the default Phase Two length.
    pub fn new(params: &'a Parameters, graph: &'a Graph) -> Self {
        let iters = phase_two_iters(graph, params);
        Self::with_phase_two_iters(params, graph, iters)
    }

    /// Creates a sampler with an explicit Phase Two length. A shorter phase
    /// trades epoch cost against convergence speed.
    pub fn with_phase_two_iters(
        params: &'a Parameters,
        graph: &'a Graph,
        phase_two_iters: usize,
    ) -> Self {
        Self {
            state: State::new(params, graph),
            phase_two_iters,
            history: Vec::new(),
        }
    }

    /// Runs one epoch and archives its updates.
    fn epoch<R: Rng>(&mut self, rng: &mut R) -> Result<(), SampleError> {
        let graph = self.state.graph();
        let delta = self.state.params().delta;
        let mut seeds = Vec::new();

        // Phase One: ascending sweep. All neighbours w > v are compressed
        // with the one candidate set generated for v, then v contracts.
        for v in 0..graph.size() {
            let a = self.state.generate_a(v, delta);
            for &w in graph.neighbours(v) {
                if w > v {
                    let update = Update::compress(w, a, rng)?;
                    update.apply(&mut self.state)?;
                    seeds.push(update);
                }
            }
            let update = Update::contract(&self.state, v, rng)?;
            update.apply(&mut self.state)?;
            seeds.push(update);
        }

        // Phase Two: contractions at uniformly random vertices.
        for _ in 0..self.phase_two_iters {
            let v = rng.random_range(0..graph.size());
            let update = Update::contract(&self.state, v, rng)?;
            update.apply(&mut self.state)?;
            seeds.push(update);
        }

        self.history.push(seeds);
        Ok(())
    }

    /// Runs epochs until the bounding chain collapses, then replays the
    /// archive and returns the sampled colouring.
    ///
    /// # Errors
    /// Any update failure, annotated with the epoch it occurred in and
    /// whether it happened during replay.
    pub fn run<R: Rng>(mut self, rng: &mut R) -> Result<Vec<usize>, SampleError> {
        let mut t = 0;
        while !self.state.is_converged() {
            self.epoch(rng).map_err(|err| SampleError::Iteration {
                iteration: t,
                replay: false,
                source: Box::new(err),
            })?;
            t += 1;
        }

        // Replay all epochs but the most recent, oldest first, colouring
        // effects only. The bounding chain was already advanced forward and
        // the final epoch's colouring is authoritative as written.
        self.state.set_enforcement(false);
        let history = std::mem::take(&mut self.history);
        let replayed = history.len().saturating_sub(1);
        for (t, epoch) in history[..replayed].iter().enumerate() {
            for update in epoch {
                update
                    .apply_colouring(&mut self.state)
                    .map_err(|err| SampleError::Iteration {
                        iteration: t,
                        replay: true,
                        source: Box::new(err),
                    })?;
            }
        }

        Ok(self.state.colouring().to_vec())
    }
}

/// Draws one exact sample from the anti-ferromagnetic Potts distribution on
/// `graph` with the given (already verified) parameters.
///
/// # Errors
/// Propagates any update failure; see [`SampleError`].
pub fn sample<R: Rng>(
    params: &Parameters,
    graph: &Graph,
    rng: &mut R,
) -> Result<Vec<usize>, SampleError> {
    Sampler::new(params, graph).run(rng)
}

/// [`sample`] driven by a fresh generator seeded with `seed`.
///
/// # Errors
/// Propagates any update failure; see [`SampleError`].
pub fn sample_seeded(
    params: &Parameters,
    graph: &Graph,
    seed: u64,
) -> Result<Vec<usize>, SampleError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    sample(params, graph, &mut rng)
}

// ============================================================================
// Tests
// ============================================================================
