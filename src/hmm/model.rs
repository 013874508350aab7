use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    quark::{Quark, StringTable},
};

use super::{tagger::Tagger, viterbi::HmmTagger, START};

/// A `(column id, log-probability)` entry of a sparse table row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: usize,
    pub value: f64,
}

impl Cell {
    pub fn new(id: usize, value: f64) -> Self {
        Self { id, value }
    }
}

/// Trained first-order HMM holding log-probabilities.
///
/// Labels and words are interned with lexicographically ordered ids.
/// `trans[i]` lists the successors of label `i` and `emit[w]` lists the
/// labels that emitted word `w`, both in ascending id order.
/// A model is only produced by [`RawCounts::normalize`](super::RawCounts::normalize)
/// or by loading a saved one, and never changes afterwards apart from the
/// unseen penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    labels: Quark,
    words: Quark,
    start: usize,
    trans: Vec<Vec<Cell>>,
    emit: Vec<Vec<Cell>>,
    unseen_penalty: f64,
}

impl Model {
    pub(crate) fn new(
        labels: Quark,
        words: Quark,
        start: usize,
        trans: Vec<Vec<Cell>>,
        emit: Vec<Vec<Cell>>,
        unseen_penalty: f64,
    ) -> Self {
        Self { labels, words, start, trans, emit, unseen_penalty }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let model: Self = serde_json::from_reader(BufReader::new(f))?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_memory(buf: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(buf)?;
        model.validate()?;
        Ok(model)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.to_writer(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, w: W) -> Result<()> {
        serde_json::to_writer(w, self)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(Error::InvalidModel(msg.to_string()));
        let num_labels = self.labels.len();
        if self.labels.to_str(self.start) != Some(START) {
            return invalid("start label is missing");
        }
        if !self.labels.is_sorted() || !self.words.is_sorted() {
            return invalid("labels and words must be unique and sorted");
        }
        if self.trans.len() != num_labels {
            return invalid("transition rows do not match the label count");
        }
        if self.emit.len() != self.words.len() {
            return invalid("emission rows do not match the word count");
        }
        let in_range = |row: &Vec<Cell>| {
            row.iter().all(|c| c.id < num_labels && c.value.is_finite() && c.value <= 0.0)
                && row.windows(2).all(|w| w[0].id < w[1].id)
        };
        if !self.trans.iter().all(in_range) || !self.emit.iter().all(in_range) {
            return invalid("table row holds an unknown label or a score that is not a log-probability");
        }
        if self.trans.iter().any(|row| row.iter().any(|c| c.id == self.start)) {
            return invalid("start label cannot be a transition target");
        }
        if self.emit.iter().any(|row| row.iter().any(|c| c.id == self.start)) {
            return invalid("start label cannot emit a word");
        }
        if !self.unseen_penalty.is_finite() {
            return invalid("unseen penalty must be finite");
        }
        Ok(())
    }

    pub fn tagger(&self) -> HmmTagger<'_> {
        HmmTagger::new(self)
    }

    /// Decodes independent sequences, one result per sequence.
    #[cfg(not(feature = "parallel"))]
    pub fn tag_all<S: AsRef<str> + Sync>(&self, seqs: &[Vec<S>]) -> Vec<Result<Vec<String>>> {
        let mut tagger = self.tagger();
        seqs.iter().map(|seq| tagger.tag(seq)).collect()
    }

    /// Decodes independent sequences on the rayon pool, one result per sequence.
    #[cfg(feature = "parallel")]
    pub fn tag_all<S: AsRef<str> + Sync>(&self, seqs: &[Vec<S>]) -> Vec<Result<Vec<String>>> {
        use rayon::prelude::*;
        seqs.par_iter()
            .map_init(|| self.tagger(), |tagger, seq| tagger.tag(seq))
            .collect()
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len() - 1
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Labels in id order, without the synthetic start label.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().filter(|&l| l != START)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter()
    }

    pub fn unseen_penalty(&self) -> f64 {
        self.unseen_penalty
    }

    pub fn set_unseen_penalty(&mut self, penalty: f64) -> Result<()> {
        if !penalty.is_finite() {
            return Err(Error::InvalidParameter {
                name: "unseen_penalty".to_string(),
                value: penalty.to_string(),
            });
        }
        self.unseen_penalty = penalty;
        Ok(())
    }

    pub fn transition(&self, from: &str, to: &str) -> Option<f64> {
        self.transition_row(from).find(|&(l, _)| l == to).map(|(_, v)| v)
    }

    /// `word` is case-normalized before lookup.
    pub fn emission(&self, word: &str, label: &str) -> Option<f64> {
        self.emission_row(word).find(|&(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn transition_row(&self, from: &str) -> impl Iterator<Item = (&str, f64)> {
        let row = self.labels.to_id(from).map_or(&[][..], |i| &self.trans[i][..]);
        self.named(row)
    }

    pub fn emission_row(&self, word: &str) -> impl Iterator<Item = (&str, f64)> {
        let row = self.word_id(word).map_or(&[][..], |i| &self.emit[i][..]);
        self.named(row)
    }

    fn named<'a>(&'a self, row: &'a [Cell]) -> impl Iterator<Item = (&'a str, f64)> {
        row.iter().filter_map(move |c| self.labels.to_str(c.id).map(|l| (l, c.value)))
    }

    pub(crate) fn word_id(&self, word: &str) -> Option<usize> {
        self.words.to_id(&word.to_lowercase())
    }

    pub(crate) fn label(&self, id: usize) -> Option<&str> {
        self.labels.to_str(id)
    }

    pub(crate) fn start_id(&self) -> usize {
        self.start
    }

    /// Number of interned labels, including the start label.
    pub(crate) fn num_states(&self) -> usize {
        self.labels.len()
    }

    pub(crate) fn trans_row(&self, i: usize) -> &[Cell] {
        &self.trans[i]
    }

    pub(crate) fn emit_row(&self, w: usize) -> &[Cell] {
        &self.emit[w]
    }

    /// Writes both tables in a plain-text format.
    pub fn dump<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "FILEHEADER = {{")?;
        writeln!(w, "  num_labels: {}", self.num_labels())?;
        writeln!(w, "  num_words: {}", self.num_words())?;
        writeln!(w, "  unseen_penalty: {}", self.unseen_penalty)?;
        writeln!(w, "}}\n")?;
        writeln!(w, "TRANSITIONS = {{")?;
        for src in self.labels.iter() {
            for (dst, value) in self.transition_row(src) {
                writeln!(w, "  ({src}) --> ({dst}): {value:.6}")?;
            }
        }
        writeln!(w, "}}\n")?;
        writeln!(w, "EMISSIONS = {{")?;
        for word in self.words.iter() {
            for (label, value) in self.emission_row(word) {
                writeln!(w, "  {word} --> ({label}): {value:.6}")?;
            }
        }
        writeln!(w, "}}")
    }
}
