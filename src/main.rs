use std::{
    fs::{self, File},
    io::BufReader,
    path::PathBuf,
    time::Instant,
};

use clap::Parser;
use hmm_tagger::{compare, format_predictions, read_sentences, Dataset, Result, Trainer};

/// Train an HMM tagger on a word/tag corpus, tag a test file and compare
/// the output with gold tags
#[derive(Debug, Parser)]
#[command(version)]
struct Argv {
    /// training sentences, one per line
    #[arg(long, value_name = "FILE")]
    train_words: PathBuf,
    /// training tags, line-aligned with the sentences
    #[arg(long, value_name = "FILE")]
    train_tags: PathBuf,
    /// sentences to tag
    #[arg(long, value_name = "FILE")]
    test_words: PathBuf,
    /// gold tags for the test sentences
    #[arg(long, value_name = "FILE")]
    test_tags: Option<PathBuf>,
    /// training parameters (e.g. unseen_penalty=-100, count_final_token=false)
    #[arg(short, value_name = "NAME=VALUE")]
    parameters: Vec<String>,
    /// write the tags to a file instead of STDOUT
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// suppress tagging results
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let argv = Argv::parse();
    log::info!("argv: {:?}", argv);

    let mut trainer = Trainer::new();
    for s in &argv.parameters {
        if let Some((name, value)) = s.split_once('=') {
            trainer.set(name, value)?;
        } else {
            log::warn!("ignoring parameter without a value: {s}");
        }
    }
    let ds = Dataset::from_paths(&argv.train_words, &argv.train_tags)?;
    trainer.append_dataset(&ds)?;
    let model = trainer.train();

    let begin = Instant::now();
    let sentences = read_sentences(BufReader::new(File::open(&argv.test_words)?))?;
    let paths = model.tag_all(&sentences).into_iter().collect::<Result<Vec<_>>>()?;
    let sec = begin.elapsed().as_secs_f64();
    log::info!("tagged {} sentences in {sec:.3} [sec]", paths.len());

    let tags = format_predictions(&paths);
    if let Some(output) = &argv.output {
        fs::write(output, &tags)?;
    } else if !argv.quiet {
        println!("tags for input:");
        println!("{tags}");
    }

    if let Some(gold) = &argv.test_tags {
        let evaluation = compare(&tags, BufReader::new(File::open(gold)?))?;
        println!("correct tags: {}", evaluation.correct());
        println!("incorrect tags: {}", evaluation.incorrect());
        println!("{evaluation}");
    }
    Ok(())
}
