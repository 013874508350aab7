use std::time::Instant;

use crate::{
    dataset::Dataset,
    error::{Error, Result},
};

use super::{counts::RawCounts, model::Model, START};

pub const DEFAULT_UNSEEN_PENALTY: f64 = -100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainerOpt {
    /// Emission score of a word that never co-occurred with a label.
    pub unseen_penalty: f64,
    /// Count the emission of the last token of every sequence. When off, the
    /// last token is skipped entirely, and one-token sequences contribute
    /// nothing.
    pub count_final_token: bool,
}

impl Default for TrainerOpt {
    fn default() -> Self {
        Self { unseen_penalty: DEFAULT_UNSEEN_PENALTY, count_final_token: true }
    }
}

/// Accumulates transition and emission counts from labeled sequences.
#[derive(Debug, Default)]
pub struct Trainer {
    opt: TrainerOpt,
    counts: RawCounts,
    num_seqs: usize,
    num_items: usize,
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_opt(opt: TrainerOpt) -> Self {
        Self { opt, ..Default::default() }
    }

    pub fn opt(&self) -> &TrainerOpt {
        &self.opt
    }

    /// Sets a training parameter by name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let invalid = || Error::InvalidParameter { name: name.to_string(), value: value.to_string() };
        match name {
            "unseen_penalty" => {
                let v: f64 = value.parse().map_err(|_| invalid())?;
                if !v.is_finite() {
                    return Err(invalid());
                }
                self.opt.unseen_penalty = v;
            }
            "count_final_token" => {
                self.opt.count_final_token = value.parse().map_err(|_| invalid())?;
            }
            _ => return Err(invalid()),
        }
        log::debug!("set {name} = {value}");
        Ok(())
    }

    /// Counts one sequence. Words are lowercased before they are recorded.
    pub fn append<S: AsRef<str>, T: AsRef<str>>(&mut self, words: &[S], labels: &[T]) -> Result<()> {
        if words.is_empty() {
            return Err(Error::InputFormat("empty sequence".to_string()));
        }
        if words.len() != labels.len() {
            return Err(Error::InputFormat(format!(
                "{} words but {} labels",
                words.len(),
                labels.len()
            )));
        }
        if labels.iter().any(|l| l.as_ref() == START) {
            return Err(Error::InputFormat(format!("label {START:?} is reserved")));
        }

        let n = words.len();
        let end = if self.opt.count_final_token { n } else { n - 1 };
        for i in 0..end {
            let label = labels[i].as_ref();
            self.counts.emissions.record(&words[i].as_ref().to_lowercase(), label);
            if i == 0 {
                self.counts.transitions.record(START, label);
            }
            if i + 1 < n {
                self.counts.transitions.record(label, labels[i + 1].as_ref());
            }
        }
        self.num_seqs += 1;
        self.num_items += n;
        Ok(())
    }

    pub fn append_dataset(&mut self, ds: &Dataset) -> Result<()> {
        for seq in ds {
            self.append(&seq.words, &seq.labels)?;
        }
        Ok(())
    }

    pub fn counts(&self) -> &RawCounts {
        &self.counts
    }

    pub fn num_sequences(&self) -> usize {
        self.num_seqs
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Normalizes the accumulated counts into a model.
    pub fn train(self) -> Model {
        let begin = Instant::now();
        log::info!(
            "training on {} sequences, {} items (count_final_token: {})",
            self.num_seqs,
            self.num_items,
            self.opt.count_final_token
        );
        let model = self.counts.normalize(self.opt.unseen_penalty);
        log::info!("time cost: {:?}", begin.elapsed());
        model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_sequence() {
        let mut trainer = Trainer::new();
        trainer.append(&["Dog", "chase", "cat"], &["noun", "verb", "noun"]).unwrap();
        let c = trainer.counts();
        assert_eq!(c.transitions().get(START, "noun"), Some(1.0));
        assert_eq!(c.transitions().get("noun", "verb"), Some(1.0));
        assert_eq!(c.transitions().get("verb", "noun"), Some(1.0));
        assert_eq!(c.transitions().row("noun").unwrap().len(), 1);
        assert_eq!(c.emissions().get("dog", "noun"), Some(1.0));
        assert_eq!(c.emissions().get("Dog", "noun"), None);
        assert_eq!(c.emissions().get("cat", "noun"), Some(1.0));
        assert_eq!(trainer.num_sequences(), 1);
        assert_eq!(trainer.num_items(), 3);
    }

    #[test]
    fn final_token_skipped_on_request() {
        let mut trainer = Trainer::new();
        trainer.set("count_final_token", "false").unwrap();
        trainer.append(&["dog", "chase", "cat"], &["noun", "verb", "noun"]).unwrap();
        trainer.append(&["run"], &["verb"]).unwrap();
        let c = trainer.counts();
        assert_eq!(c.emissions().get("cat", "noun"), None);
        assert_eq!(c.emissions().get("chase", "verb"), Some(1.0));
        assert_eq!(c.emissions().get("run", "verb"), None);
        assert_eq!(c.transitions().get(START, "noun"), Some(1.0));
        assert_eq!(c.transitions().get(START, "verb"), None);
        assert_eq!(c.transitions().get("verb", "noun"), Some(1.0));
    }

    #[test]
    fn single_token_sequence() {
        let mut trainer = Trainer::new();
        trainer.append(&["run"], &["verb"]).unwrap();
        let c = trainer.counts();
        assert_eq!(c.transitions().get(START, "verb"), Some(1.0));
        assert_eq!(c.transitions().len(), 1);
        assert_eq!(c.emissions().get("run", "verb"), Some(1.0));
    }

    #[test]
    fn malformed_sequences() {
        let mut trainer = Trainer::new();
        let empty: [&str; 0] = [];
        assert!(matches!(trainer.append(&empty, &empty), Err(Error::InputFormat(_))));
        assert!(matches!(trainer.append(&["a", "b"], &["x"]), Err(Error::InputFormat(_))));
        assert!(matches!(trainer.append(&["a"], &[START]), Err(Error::InputFormat(_))));
        assert!(trainer.counts().transitions().is_empty());
        assert!(trainer.counts().emissions().is_empty());
        assert_eq!(trainer.num_sequences(), 0);
    }

    #[test]
    fn parameters() {
        let mut trainer = Trainer::new();
        trainer.set("unseen_penalty", "-42.5").unwrap();
        assert_eq!(trainer.opt().unseen_penalty, -42.5);
        assert!(matches!(trainer.set("unseen_penalty", "abc"), Err(Error::InvalidParameter { .. })));
        assert!(matches!(trainer.set("unseen_penalty", "-inf"), Err(Error::InvalidParameter { .. })));
        assert!(matches!(trainer.set("count_final_token", "maybe"), Err(Error::InvalidParameter { .. })));
        assert!(matches!(trainer.set("smoothing", "1"), Err(Error::InvalidParameter { .. })));
        trainer.append(&["a"], &["x"]).unwrap();
        assert_eq!(trainer.train().unseen_penalty(), -42.5);
    }
}
