//! Supervised first-order hidden Markov model tagger.
//!
//! Transition and emission counts are gathered from line-aligned word/tag
//! corpora, normalized into log-probabilities and decoded with Viterbi.
//!
//! ```
//! use hmm_tagger::{Tagger, Trainer};
//!
//! let mut trainer = Trainer::new();
//! trainer.append(&["dog", "chase", "cat"], &["noun", "verb", "noun"]).unwrap();
//! let model = trainer.train();
//! let labels = model.tagger().tag(&["Dog", "chase", "cat"]).unwrap();
//! assert_eq!(labels, ["noun", "verb", "noun"]);
//! ```

pub mod hmm;
pub mod quark;
mod dataset;
mod error;
mod evaluation;

pub use dataset::{format_predictions, parse_predictions, read_sentences, tokenize, Dataset, Sequence};
pub use error::{Error, Result};
pub use evaluation::{compare, score, Estimation, Evaluation, LabelMeasure};
pub use hmm::{
    FrequencyTable, HmmTagger, Model, RawCounts, Tagger, Trainer, TrainerOpt, DEFAULT_UNSEEN_PENALTY, START,
};
