use std::{collections::BTreeMap, fmt::Display, io::BufRead, iter::zip};

use crate::{
    dataset::{parse_predictions, tokenize},
    error::{Error, Result},
};

fn check_lengths(predicted: usize, reference: usize) -> Result<()> {
    if predicted != reference {
        return Err(Error::ComparisonLength { predicted, reference });
    }
    Ok(())
}

/// Counts `(correct, incorrect)` positions between two label sequences.
pub fn score<P: AsRef<str>, R: AsRef<str>>(predicted: &[P], reference: &[R]) -> Result<(usize, usize)> {
    check_lengths(predicted.len(), reference.len())?;
    let correct = zip(predicted, reference).filter(|&(p, r)| p.as_ref() == r.as_ref()).count();
    Ok((correct, predicted.len() - correct))
}

/// Label-wise performance values.
#[derive(Debug, Default, Clone)]
pub struct LabelMeasure {
    /// Number of correct predictions.
    pub num_correct: usize,
    /** Number of occurrences of the label in the gold-standard data. */
    pub num_observation: usize,
    /** Number of predictions. */
    pub num_prediction: usize,
    pub precision: f64,
    pub recall: f64,
    /** F1 score. */
    pub fmeasure: f64,
}

/// An overall performance values.
#[derive(Debug, Default)]
pub struct Evaluation {
    tbl: BTreeMap<String, LabelMeasure>,

    /** Number of correctly predicted items. */
    item_total_correct: usize,
    /** Total number of items. */
    item_total_num: usize,
    /** Item-level accuracy. */
    item_accuracy: f64,

    /** Number of correctly predicted instances. */
    inst_total_correct: usize,
    /** Total number of instances. */
    inst_total_num: usize,
    /** Instance-level accuracy. */
    inst_accuracy: f64,

    /** Macro-averaged precision. */
    macro_precision: f64,
    /** Macro-averaged recall. */
    macro_recall: f64,
    /** Macro-averaged F1 score. */
    macro_fmeasure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimation {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
    pub accuracy: f64,
}

impl Evaluation {
    pub fn accumulate<R: AsRef<str>, P: AsRef<str>>(&mut self, reference: &[R], prediction: &[P]) -> Result<()> {
        check_lengths(prediction.len(), reference.len())?;
        let mut matched = 0;
        for (r, p) in zip(reference, prediction) {
            let (r, p) = (r.as_ref(), p.as_ref());
            self.tbl.entry(r.to_string()).or_default().num_observation += 1;
            self.tbl.entry(p.to_string()).or_default().num_prediction += 1;
            if r == p {
                self.tbl.entry(r.to_string()).or_default().num_correct += 1;
                matched += 1;
            }
        }
        self.item_total_correct += matched;
        self.item_total_num += prediction.len();

        if matched == prediction.len() {
            self.inst_total_correct += 1;
        }
        self.inst_total_num += 1;
        Ok(())
    }

    pub fn correct(&self) -> usize {
        self.item_total_correct
    }

    pub fn incorrect(&self) -> usize {
        self.item_total_num - self.item_total_correct
    }

    pub fn label(&self, label: &str) -> Option<&LabelMeasure> {
        self.tbl.get(label)
    }

    /// Computes label-wise and averaged measures over everything accumulated.
    /// Labels that never occur in the reference are left out of the averages.
    pub fn evaluate(&mut self) -> Estimation {
        self.macro_precision = 0.0;
        self.macro_recall = 0.0;
        self.macro_fmeasure = 0.0;
        let mut num_labels = 0;
        for lev in self.tbl.values_mut() {
            lev.precision = 0.0;
            lev.recall = 0.0;
            lev.fmeasure = 0.0;
            if lev.num_observation == 0 {
                continue;
            }
            num_labels += 1;

            if lev.num_prediction > 0 {
                lev.precision = lev.num_correct as f64 / lev.num_prediction as f64;
            }
            lev.recall = lev.num_correct as f64 / lev.num_observation as f64;
            if lev.precision + lev.recall > 0.0 {
                lev.fmeasure = lev.precision * lev.recall * 2.0 / (lev.precision + lev.recall);
            }
            self.macro_precision += lev.precision;
            self.macro_recall += lev.recall;
            self.macro_fmeasure += lev.fmeasure;
        }

        if num_labels > 0 {
            self.macro_precision /= num_labels as f64;
            self.macro_recall /= num_labels as f64;
            self.macro_fmeasure /= num_labels as f64;
        }
        if self.item_total_num > 0 {
            self.item_accuracy = self.item_total_correct as f64 / self.item_total_num as f64;
        }
        if self.inst_total_num > 0 {
            self.inst_accuracy = self.inst_total_correct as f64 / self.inst_total_num as f64;
        }
        Estimation {
            precision: self.macro_precision,
            recall: self.macro_recall,
            fmeasure: self.macro_fmeasure,
            accuracy: self.item_accuracy,
        }
    }
}

impl Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Performance by label (#match, #model, #ref) (precision, recall, F1):")?;
        for (label, lev) in &self.tbl {
            if lev.num_observation == 0 {
                writeln!(f, "\t{}: ({}, {}, {}) (******, ******, ******)", label, lev.num_correct, lev.num_prediction, lev.num_observation)?;
            } else {
                writeln!(f, "\t{}: ({}, {}, {}) ({:.4}, {:.4}, {:.4})", label, lev.num_correct, lev.num_prediction, lev.num_observation,
                    lev.precision, lev.recall, lev.fmeasure
                )?;
            }
        }
        writeln!(f, "Macro-average precision, recall, F1: ({:.6}, {:.6}, {:.6})", self.macro_precision, self.macro_recall, self.macro_fmeasure)?;
        writeln!(f, "Item accuracy: {} / {} ({:.4})", self.item_total_correct, self.item_total_num, self.item_accuracy)?;
        write!(f, "Instance accuracy: {} / {} ({:.4})", self.inst_total_correct, self.inst_total_num, self.inst_accuracy)
    }
}

/// Scores a prediction blob against gold tags, line by line.
pub fn compare<R: BufRead>(predictions: &str, reference: R) -> Result<Evaluation> {
    let mut evaluation = Evaluation::default();
    let mut gold = reference.lines();
    for (i, prediction) in parse_predictions(predictions).iter().enumerate() {
        let line = gold
            .next()
            .ok_or_else(|| Error::InputFormat(format!("line {}: missing reference line", i + 1)))??;
        evaluation.accumulate(&tokenize(&line), prediction)?;
    }
    evaluation.evaluate();
    Ok(evaluation)
}
