use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::error::{Error, Result};

/// Splits a line into whitespace-separated tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// One training example: words paired with their labels.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sequence {
    pub words: Vec<String>,
    pub labels: Vec<String>,
}

impl Sequence {
    pub fn push(&mut self, word: &str, label: &str) {
        self.words.push(word.to_string());
        self.labels.push(label.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

/// Line-aligned training corpus.
#[derive(Debug, Default)]
pub struct Dataset {
    pub seqs: Vec<Sequence>,
}

impl Dataset {
    /// Pairs line N of `words` with line N of `tags`.
    pub fn read<W: BufRead, T: BufRead>(words: W, tags: T) -> Result<Self> {
        let mut seqs = Vec::new();
        let mut words = words.lines();
        let mut tags = tags.lines();
        let mut lineno = 0;
        loop {
            lineno += 1;
            let (w, t) = match (words.next(), tags.next()) {
                (None, None) => break,
                (Some(w), Some(t)) => (w?, t?),
                (Some(_), None) => {
                    return Err(Error::InputFormat(format!("line {lineno}: missing tag line")))
                }
                (None, Some(_)) => {
                    return Err(Error::InputFormat(format!("line {lineno}: missing word line")))
                }
            };
            let w = tokenize(&w);
            let t = tokenize(&t);
            if w.is_empty() || t.is_empty() {
                return Err(Error::InputFormat(format!("line {lineno}: empty line")));
            }
            if w.len() != t.len() {
                return Err(Error::InputFormat(format!(
                    "line {lineno}: {} words but {} tags",
                    w.len(),
                    t.len()
                )));
            }
            seqs.push(Sequence { words: w, labels: t });
        }
        if seqs.is_empty() {
            return Err(Error::InputFormat("no training sequences".to_string()));
        }
        log::debug!("read {} sequences", seqs.len());
        Ok(Self { seqs })
    }

    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(words: P, tags: Q) -> Result<Self> {
        let words = BufReader::new(File::open(words)?);
        let tags = BufReader::new(File::open(tags)?);
        Self::read(words, tags)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.seqs.iter()
    }

    pub fn max_length(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sequence;
    type IntoIter = std::slice::Iter<'a, Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reads decoding input, one token sequence per line. Empty lines stay empty.
pub fn read_sentences<R: BufRead>(input: R) -> Result<Vec<Vec<String>>> {
    input
        .lines()
        .map(|line| line.map(|l| tokenize(&l)).map_err(Error::from))
        .collect()
}

/// Renders predicted labels one line per sequence, followed by a blank line.
pub fn format_predictions<S: AsRef<str>>(paths: &[Vec<S>]) -> String {
    let mut out = String::new();
    for path in paths {
        let line: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Inverse of [`format_predictions`].
pub fn parse_predictions(blob: &str) -> Vec<Vec<String>> {
    let mut lines: Vec<&str> = blob.lines().collect();
    if lines.last().map_or(false, |l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.into_iter().map(tokenize).collect()
}
