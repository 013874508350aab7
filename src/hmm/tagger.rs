use crate::error::Result;

pub trait Tagger {
    /// Loads an observation sequence, replacing any previous one.
    fn set_seq<S: AsRef<str>>(&mut self, words: &[S]);
    /// Length of the loaded sequence.
    fn len(&self) -> usize;
    /// Writes the best label ids for the loaded sequence into `labels` and
    /// returns the path score.
    fn viterbi(&mut self, labels: &mut [usize]) -> Result<f64>;
    /// Labels of the best path for `words`.
    fn tag<S: AsRef<str>>(&mut self, words: &[S]) -> Result<Vec<String>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
