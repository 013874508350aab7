//! First-order hidden Markov model: counting, normalization and Viterbi decoding.

pub mod counts;
pub mod model;
pub mod tagger;
pub mod trainer;
pub mod viterbi;

pub use counts::{FrequencyTable, RawCounts};
pub use model::{Cell, Model};
pub use tagger::Tagger;
pub use trainer::{Trainer, TrainerOpt, DEFAULT_UNSEEN_PENALTY};
pub use viterbi::HmmTagger;

/// Synthetic label every sequence starts from.
pub const START: &str = "start";
