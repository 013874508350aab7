use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use clap::Parser;
use hmm_tagger::{tokenize, Evaluation, Model, Tagger};

/// Assign suitable labels to the sentences given by a file (FILE)
/// Evaluate the performance of the model on gold tags (with -t option)
#[derive(Debug, Parser)]
struct Argv {
    /// read a model from a file (MODEL)
    #[arg(short, long, required = true, value_name = "MODEL")]
    model: String,
    /// report the performance of the model against the tags in this file
    #[arg(short = 't', long = "test", value_name = "TAGS")]
    reference: Option<PathBuf>,
    /// override the unseen penalty stored in the model
    #[arg(short, long, allow_hyphen_values = true)]
    unseen_penalty: Option<f64>,
    /// suppress tagging results (useful for test mode)
    #[arg(short, long)]
    quiet: bool,
    /// sentence file
    #[arg(value_name = "FILE")]
    sentences: PathBuf,
}

fn main() {
    env_logger::init();
    let argv = Argv::parse();
    log::info!("{:?}", argv);
    let mut model = Model::from_file(&argv.model).expect("failed to load model");
    if let Some(penalty) = argv.unseen_penalty {
        model.set_unseen_penalty(penalty).expect("invalid unseen penalty");
    }
    let mut tagger = model.tagger();
    let mut evaluation = Evaluation::default();
    let mut gold = argv
        .reference
        .as_ref()
        .map(|p| BufReader::new(File::open(p).expect("failed to open the reference tags")).lines());

    let f = File::open(&argv.sentences).expect("failed to open the stream for the input data");
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line.expect("failed to read line");
        let words = tokenize(&line);
        let reference = gold.as_mut().map(|g| match g.next() {
            Some(Ok(r)) => Some(tokenize(&r)),
            _ => None,
        });
        let prediction = match tagger.tag(&words) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("line {}: {e}", i + 1);
                continue;
            }
        };
        match reference {
            Some(Some(reference)) => {
                if let Err(e) = evaluation.accumulate(&reference, &prediction) {
                    log::warn!("line {}: {e}", i + 1);
                }
            }
            Some(None) => log::warn!("line {}: missing reference", i + 1),
            None => {}
        }
        if !argv.quiet {
            println!("{}", prediction.join(" "));
        }
    }
    if gold.is_some() {
        evaluation.evaluate();
        println!("{}", evaluation);
    }
}
