use clap::Parser;
use trainer::{Cli, Command, commands, convert, smoke};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Train {
            corpus,
            output,
            regenerate,
            alpha,
        } => commands::train(&corpus, output, regenerate, alpha),
        Command::Generate { corpus } => commands::generate(&corpus),
        Command::Convert {
            input,
            variant,
            models_dir,
            data_dir,
            output,
        } => {
            let output = Command::convert_output(variant, models_dir, &data_dir, output);
            convert::convert(&input, variant, &output)
        }
        Command::Smoke { url, out } => smoke::run(&url, &out),
    }
}
