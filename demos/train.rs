use clap::Parser;
use hmm_tagger::{Dataset, Trainer};

/// Train an HMM tagger from line-aligned word and tag files and store the
/// model as JSON
#[derive(Debug, Parser)]
#[command(version)]
struct Argv {
    /// write the model to a file (MODEL)
    #[arg(short, long, value_name = "MODEL")]
    model: String,
    /// training parameters as NAME=VALUE
    #[arg(short)]
    parameters: Vec<String>,
    /// sentence file
    #[arg(required = true)]
    words: String,
    /// tag file, line-aligned with the sentences
    #[arg(required = true)]
    tags: String,
}

fn main() {
    env_logger::init();

    let argv = Argv::parse();
    log::info!("argv: {:?}", argv);
    let mut trainer = Trainer::new();
    argv.parameters.iter().for_each(|s| {
        if let Some((name, value)) = s.split_once('=') {
            trainer
                .set(name, value)
                .unwrap_or_else(|e| panic!("failed to set parameter {s}: {e}"));
        } else {
            log::warn!("ignoring parameter without a value: {s}");
        }
    });
    let ds = Dataset::from_paths(&argv.words, &argv.tags).expect("failed to read training data");
    trainer.append_dataset(&ds).expect("failed to append dataset");
    let model = trainer.train();
    model.save(&argv.model).expect("failed to write model");
    log::info!("write model to {}", argv.model);
}
