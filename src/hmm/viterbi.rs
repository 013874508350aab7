use crate::error::{Error, Result};

use super::{
    model::{Cell, Model},
    tagger::Tagger,
};

/// Work space of the Viterbi decoder, reused across sequences.
#[derive(Debug, Default)]
pub(crate) struct ViterbiContext {
    /// The total number of interned labels (L), start included.
    pub num_labels: usize,

    /// The number of items (T) in the loaded sequence.
    num_items: usize,

    /**
     * Emission scores.
     *  This is a [T][L] matrix whose element [t][l] is the log-probability
     *  of label #l emitting observation #t, or the unseen penalty.
     */
    emission: Vec<f64>,

    /// Best score of each label at the previous step, `None` if unreached.
    score: Vec<Option<f64>>,

    /// Best score of each label at the current step.
    next: Vec<Option<f64>>,

    /**
     * Backward edges.
     *  This is a [T][L] matrix whose element [t][j] is the label #i at t-1
     *  that yields the maximum score to arrive at (t, j). Only meaningful
     *  for labels reached at t.
     */
    backward_edge: Vec<usize>,
}

impl ViterbiContext {
    pub fn new(num_labels: usize) -> Self {
        Self {
            num_labels,
            score: vec![None; num_labels],
            next: vec![None; num_labels],
            ..Default::default()
        }
    }

    pub fn set_num_items(&mut self, t: usize) {
        self.num_items = t;
        self.emission.resize(self.num_labels * t, 0.0);
        self.backward_edge.resize(self.num_labels * t, 0);
    }

    /// Fills the emission scores of item #t from a sparse row.
    fn set_emission(&mut self, t: usize, row: &[Cell], unseen: f64) {
        let l = self.num_labels;
        let scores = &mut self.emission[l * t..l * (t + 1)];
        scores.fill(unseen);
        for c in row {
            scores[c.id] = c.value;
        }
    }

    /// Runs the recursion from `start` over the trained transitions.
    ///
    /// Candidates are visited in ascending label order and only a strictly
    /// greater score replaces the current one, so ties resolve to the
    /// lowest id.
    #[allow(non_snake_case)]
    pub fn viterbi(&mut self, model: &Model, labels: &mut [usize]) -> Result<f64> {
        let T = self.num_items;
        let L = self.num_labels;
        if T == 0 {
            return Ok(0.0);
        }

        self.score.fill(None);
        self.score[model.start_id()] = Some(0.0);
        for t in 0..T {
            self.next.fill(None);
            for i in 0..L {
                let Some(prev) = self.score[i] else { continue };
                for c in model.trans_row(i) {
                    let j = c.id;
                    let score = prev + c.value + self.emission[L * t + j];
                    match self.next[j] {
                        Some(best) if best >= score => {}
                        _ => {
                            self.next[j] = Some(score);
                            self.backward_edge[L * t + j] = i;
                        }
                    }
                }
            }
            std::mem::swap(&mut self.score, &mut self.next);
        }

        /* Find the label at #T-1 with the maximum score. */
        let mut best: Option<(usize, f64)> = None;
        for (j, score) in self.score.iter().enumerate() {
            if let Some(s) = *score {
                if best.map_or(true, |(_, b)| s > b) {
                    best = Some((j, s));
                }
            }
        }
        let (last, max_score) = best.ok_or(Error::NoPathFound { len: T })?;

        /* Tag labels by tracing the backward links. */
        labels[T - 1] = last;
        for t in (1..T).rev() {
            labels[t - 1] = self.backward_edge[L * t + labels[t]];
        }
        Ok(max_score)
    }
}

/// Viterbi tagger over a trained [`Model`].
pub struct HmmTagger<'a> {
    model: &'a Model,
    ctx: ViterbiContext,
}

impl<'a> HmmTagger<'a> {
    pub fn new(model: &'a Model) -> Self {
        Self { model, ctx: ViterbiContext::new(model.num_states()) }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }
}

impl<'a> Tagger for HmmTagger<'a> {
    fn set_seq<S: AsRef<str>>(&mut self, words: &[S]) {
        let model = self.model;
        self.ctx.set_num_items(words.len());
        let unseen = model.unseen_penalty();
        for (t, word) in words.iter().enumerate() {
            let row = match model.word_id(word.as_ref()) {
                Some(w) => model.emit_row(w),
                None => {
                    log::debug!("unseen word: {}", word.as_ref());
                    &[]
                }
            };
            self.ctx.set_emission(t, row, unseen);
        }
    }

    fn len(&self) -> usize {
        self.ctx.num_items
    }

    fn viterbi(&mut self, labels: &mut [usize]) -> Result<f64> {
        if labels.len() < self.len() {
            return Err(Error::InputFormat(format!(
                "label buffer holds {} items but the sequence has {}",
                labels.len(),
                self.len()
            )));
        }
        self.ctx.viterbi(self.model, labels)
    }

    fn tag<S: AsRef<str>>(&mut self, words: &[S]) -> Result<Vec<String>> {
        self.set_seq(words);
        let mut path = vec![0; words.len()];
        let score = self.viterbi(&mut path)?;
        log::debug!("decoded {} items, score = {score}", path.len());
        path.iter()
            .map(|&id| {
                self.model
                    .label(id)
                    .map(str::to_string)
                    .ok_or_else(|| Error::InvalidModel(format!("unknown label id {id}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::{Trainer, START};

    fn trained(words: &[&str], tags: &[&str]) -> Model {
        let mut trainer = Trainer::new();
        for (w, t) in words.iter().zip(tags) {
            let w: Vec<&str> = w.split_whitespace().collect();
            let t: Vec<&str> = t.split_whitespace().collect();
            trainer.append(&w, &t).unwrap();
        }
        trainer.train()
    }

    #[test]
    fn decode_training_sentence() {
        let model = trained(&["dog chase cat"], &["noun verb noun"]);
        let mut tagger = model.tagger();
        assert_eq!(tagger.tag(&["dog", "chase", "cat"]).unwrap(), vec!["noun", "verb", "noun"]);
        assert_eq!(tagger.len(), 3);
    }

    #[test]
    fn path_score() {
        let model = trained(&["dog chase cat"], &["noun verb noun"]);
        let mut tagger = model.tagger();
        tagger.set_seq(&["dog", "bark", "cat"]);
        let mut labels = [0; 3];
        let score = tagger.viterbi(&mut labels).unwrap();
        assert!((score - model.unseen_penalty()).abs() < 1e-12);
    }

    #[test]
    fn empty_sequence() {
        let model = trained(&["dog"], &["noun"]);
        let mut tagger = model.tagger();
        assert!(tagger.tag::<&str>(&[]).unwrap().is_empty());
        assert!(tagger.is_empty());
    }

    #[test]
    fn short_label_buffer() {
        let model = trained(&["dog chase"], &["noun verb"]);
        let mut tagger = model.tagger();
        tagger.set_seq(&["dog", "chase"]);
        let mut labels = [0; 1];
        assert!(matches!(tagger.viterbi(&mut labels), Err(Error::InputFormat(_))));
    }

    #[test]
    fn untrained_model_has_no_path() {
        let model = Trainer::new().train();
        let mut tagger = model.tagger();
        match tagger.tag(&["dog"]) {
            Err(Error::NoPathFound { len }) => assert_eq!(len, 1),
            r => panic!("unexpected result: {r:?}"),
        }
    }

    #[test]
    fn path_dies_without_transitions() {
        // "y" only ever ends a sentence, so nothing follows it.
        let model = trained(&["a b"], &["x y"]);
        assert_eq!(model.transition(START, "x"), Some(0.0));
        let mut tagger = model.tagger();
        assert_eq!(tagger.tag(&["a", "b"]).unwrap(), vec!["x", "y"]);
        assert!(matches!(tagger.tag(&["a", "b", "c"]), Err(Error::NoPathFound { len: 3 })));
    }

    #[test]
    fn ties_prefer_smaller_label() {
        let a = trained(&["fish", "fish"], &["noun", "verb"]);
        let b = trained(&["fish", "fish"], &["verb", "noun"]);
        assert_eq!(a.tagger().tag(&["fish"]).unwrap(), vec!["noun"]);
        assert_eq!(b.tagger().tag(&["fish"]).unwrap(), vec!["noun"]);
    }

    #[test]
    fn tied_predecessors_prefer_smaller_label() {
        // "x" and "y" both reach "z" with the same score.
        let a = trained(&["a b", "a b"], &["y z", "x z"]);
        let b = trained(&["a b", "a b"], &["x z", "y z"]);
        assert_eq!(a.transition(START, "x"), a.transition(START, "y"));
        assert_eq!(a.tagger().tag(&["a", "b"]).unwrap(), vec!["x", "z"]);
        assert_eq!(b.tagger().tag(&["a", "b"]).unwrap(), vec!["x", "z"]);
    }

    #[test]
    fn context_resolves_ambiguity() {
        let model = trained(&["i watch dogs", "the watch ticks"], &["pro verb noun", "det noun verb"]);
        let mut tagger = model.tagger();
        assert_eq!(tagger.tag(&["the", "watch"]).unwrap(), vec!["det", "noun"]);
        assert_eq!(tagger.tag(&["I", "Watch"]).unwrap(), vec!["pro", "verb"]);
    }
}
