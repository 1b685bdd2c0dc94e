//! # Potts Perfect Sampler
//!
//! Exact sampling from the anti-ferromagnetic Potts model via bounding
//! chains and coupling from the past.
//!
//! This crate provides:
//! - A compact bitset representation of per-vertex candidate colour sets
//!   ("bounding lists") over up to 64 colours.
//! - The two coupled update operators, **Compress** and **Contract**, that
//!   drive every bounding list towards a singleton.
//! - An epoch/phase sampler that detects collapse of the bounding chain and
//!   replays its archived randomness to emit an unbiased colouring.
//!
//! ## Quick Start
//!
//! ```
//! use potts::graph::Graph;
//! use potts::sampler::sample_seeded;
//! use potts::state::Parameters;
//!
//! // Sample a colouring of the 5-cycle with 7 colours.
//! let params = Parameters { n: 5, q: 7, delta: 3, b: 0.95 };
//! params.verify().expect("parameters satisfy the convergence theorem");
//!
//! let graph = Graph::cycle(5);
//! let colouring = sample_seeded(&params, &graph, 42).expect("sampling succeeds");
//! assert_eq!(colouring.len(), 5);
//! assert!(colouring.iter().all(|&c| c < 7));
//! ```
//!
//! ## Modules
//!
//! - [`bounding`]: Fixed-width bitsets over the colour set.
//! - [`graph`]: Immutable adjacency-list graphs and canned topologies.
//! - [`random`]: Sampling primitives over a caller-supplied generator.
//! - [`state`]: Run parameters plus the coupled colouring/bounding-chain state.
//! - [`update`]: The Compress and Contract operators.
//! - [`sampler`]: The epoch/phase driver and the `sample` entry points.
//!
//! ## Performance Notes
//!
//! - Bounding lists are `u64` bitsets, limiting runs to `q <= 64` colours.
//! - The whole run consumes one linear pseudorandom stream; a fixed seed
//!   reproduces the sample exactly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::inline_always)] // Intentional for hot-path code
#![allow(clippy::many_single_char_names)] // Mathematical variable names
#![allow(clippy::doc_markdown)] // LaTeX-style notation in docs
#![allow(clippy::multiple_crate_versions)] // Cargo.lock management is external

pub mod bounding;
pub mod graph;
pub mod random;
pub mod sampler;
pub mod state;
pub mod update;

/// Re-export commonly used types for convenience.
pub mod prelude {
    pub use crate::bounding::BoundingList;
    pub use crate::graph::{Graph, GraphKind};
    pub use crate::sampler::{sample, sample_seeded, Sampler};
    pub use crate::state::{Parameters, State};
    pub use crate::update::{SampleError, Update, UpdateKind};
}
