use std::collections::{BTreeMap, BTreeSet};

use crate::quark::{Quark, StringTable, TextVectorizer};

use super::model::{Cell, Model};
use super::START;

pub type Row = BTreeMap<String, f64>;

/// Co-occurrence counts keyed by row then column.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrequencyTable {
    rows: BTreeMap<String, Row>,
}

impl FrequencyTable {
    /// Adds one to `[row][col]`, creating the row or cell at 1.0.
    pub fn record(&mut self, row: &str, col: &str) {
        if let Some(cells) = self.rows.get_mut(row) {
            if let Some(c) = cells.get_mut(col) {
                *c += 1.0;
            } else {
                cells.insert(col.to_string(), 1.0);
            }
            return;
        }
        self.rows.insert(row.to_string(), Row::from([(col.to_string(), 1.0)]));
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row(&self, row: &str) -> Option<&Row> {
        self.rows.get(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.rows.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of every cell.
    pub fn total(&self) -> f64 {
        self.rows.values().flat_map(|r| r.values()).sum()
    }
}

/// Converts a row of counts to log-probabilities against the row total.
fn log_row(row: &Row) -> impl Iterator<Item = (&str, f64)> {
    let sum: f64 = row.values().sum();
    row.iter().map(move |(k, &c)| (k.as_str(), (c / sum).ln()))
}

/// Counting phase of the model: transition and emission tables before normalization.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawCounts {
    pub(crate) transitions: FrequencyTable,
    pub(crate) emissions: FrequencyTable,
}

impl RawCounts {
    pub fn transitions(&self) -> &FrequencyTable {
        &self.transitions
    }

    pub fn emissions(&self) -> &FrequencyTable {
        &self.emissions
    }

    /// Turns counts into a decodable [`Model`] of log-probabilities.
    ///
    /// Labels and words are interned in lexicographic order, so lower ids
    /// always belong to lexicographically smaller keys.
    pub fn normalize(self, unseen_penalty: f64) -> Model {
        let mut labels = BTreeSet::new();
        labels.insert(START);
        for (src, row) in self.transitions.rows() {
            labels.insert(src);
            labels.extend(row.keys().map(String::as_str));
        }
        for (_, row) in self.emissions.rows() {
            labels.extend(row.keys().map(String::as_str));
        }
        let mut label_quark = Quark::default();
        for label in labels {
            label_quark.find_or_insert(label);
        }
        let mut word_quark = Quark::default();
        for (word, _) in self.emissions.rows() {
            word_quark.find_or_insert(word);
        }

        let mut trans = vec![Vec::new(); label_quark.len()];
        for (src, row) in self.transitions.rows() {
            let sid = label_quark.find_or_insert(src);
            trans[sid] = log_row(row)
                .map(|(dst, value)| Cell::new(label_quark.find_or_insert(dst), value))
                .collect();
        }
        let mut emit = vec![Vec::new(); word_quark.len()];
        for (word, row) in self.emissions.rows() {
            let wid = word_quark.find_or_insert(word);
            emit[wid] = log_row(row)
                .map(|(label, value)| Cell::new(label_quark.find_or_insert(label), value))
                .collect();
        }
        let start = label_quark.find_or_insert(START);

        log::info!(
            "normalized model (labels: {}, words: {}, transition rows: {}, unseen penalty: {})",
            label_quark.len() - 1,
            word_quark.len(),
            self.transitions.len(),
            unseen_penalty
        );
        if self.transitions.row(START).is_none() {
            log::warn!("model has no start transitions, every decode will fail");
        }
        Model::new(label_quark, word_quark, start, trans, emit, unseen_penalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts() {
        let mut t = FrequencyTable::default();
        assert!(t.is_empty());
        t.record("noun", "verb");
        t.record("noun", "verb");
        t.record("noun", "det");
        t.record("verb", "noun");
        assert_eq!(t.get("noun", "verb"), Some(2.0));
        assert_eq!(t.get("noun", "det"), Some(1.0));
        assert_eq!(t.get("verb", "det"), None);
        assert_eq!(t.get("det", "noun"), None);
        assert_eq!(t.len(), 2);
        assert_eq!(t.total(), 4.0);
    }

    #[test]
    fn log_row_uses_row_total() {
        let mut t = FrequencyTable::default();
        t.record("a", "x");
        t.record("a", "x");
        t.record("a", "x");
        t.record("a", "y");
        let row: Vec<(&str, f64)> = log_row(t.row("a").unwrap()).collect();
        assert_eq!(row.len(), 2);
        assert!((row[0].1 - 0.75f64.ln()).abs() < 1e-12);
        assert!((row[1].1 - 0.25f64.ln()).abs() < 1e-12);
        let sum: f64 = row.iter().map(|(_, v)| v.exp()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_interns_in_order() {
        let mut counts = RawCounts::default();
        counts.transitions.record(START, "verb");
        counts.transitions.record("verb", "adj");
        counts.emissions.record("run", "verb");
        counts.emissions.record("red", "adj");
        let model = counts.normalize(-100.0);
        let labels: Vec<&str> = model.labels().collect();
        assert_eq!(labels, vec!["adj", "verb"]);
        let words: Vec<&str> = model.words().collect();
        assert_eq!(words, vec!["red", "run"]);
        assert_eq!(model.transition(START, "verb"), Some(0.0));
        assert_eq!(model.emission("red", "adj"), Some(0.0));
    }
}
