use std::path::PathBuf;

use anthropometry::Heuristic;
use body_model::model_path;
use clap::{Args, Parser, Subcommand};
use machine_learning::{
    corpus_path,
    regression::{DEFAULT_ALPHA, DEFAULT_SEED},
    synthetic::{DEFAULT_SAMPLES, GeneratorConfig},
};
use specs::BodyVariant;

#[derive(Parser, Debug)]
#[command(name = "trainer")]
#[command(about = "Trains the measurement to shape regression and checks a running service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit the regression on a corpus, generating the corpus first if there is none
    Train {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Where the trained artifact is written (default: <data-dir>/regression_model.json)
        #[arg(long, env = "REGRESSION_MODEL")]
        output: Option<PathBuf>,
        /// Generate a fresh corpus even if one exists
        #[arg(long, default_value_t = false)]
        regenerate: bool,
        /// Ridge penalty
        #[arg(long, default_value_t = DEFAULT_ALPHA)]
        alpha: f64,
    },
    /// Generate and save a synthetic corpus
    Generate {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Convert an SMPL .npz release into the model file the service loads
    Convert {
        /// The SMPL archive, e.g. SMPL_NEUTRAL.npz
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = BodyVariant::Neutral)]
        variant: BodyVariant,
        /// Directory the model is written under (default: <data-dir>/models)
        #[arg(long, env = "MODELS_DIR")]
        models_dir: Option<PathBuf>,
        #[arg(long, env = "DATA_DIR", default_value = ".")]
        data_dir: PathBuf,
        /// Write the model here instead of <models-dir>/smpl/SMPL_<VARIANT>.safetensors
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Exercise every endpoint of a running service
    Smoke {
        #[arg(long, default_value = "http://localhost:8000")]
        url: String,
        /// Where the generated mesh is saved
        #[arg(long, default_value = "test_avatar.glb")]
        out: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Root of the corpora and the default artifact location
    #[arg(long, env = "DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,
    /// Directory holding smpl/SMPL_<VARIANT>.safetensors (default: <data-dir>/models)
    #[arg(long, env = "MODELS_DIR")]
    pub models_dir: Option<PathBuf>,
    /// Number of bodies to draw
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    pub samples: usize,
    #[arg(long, default_value_t = BodyVariant::Neutral)]
    pub variant: BodyVariant,
    /// Seeds both the beta draws and the train/test split
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
    /// geometric or proportional
    #[arg(long, default_value_t = Heuristic::Geometric)]
    pub heuristic: Heuristic,
}

impl Command {
    /// Where `convert` writes its model.
    pub fn convert_output(
        variant: BodyVariant,
        models_dir: Option<PathBuf>,
        data_dir: &std::path::Path,
        output: Option<PathBuf>,
    ) -> PathBuf {
        output.unwrap_or_else(|| {
            let models_dir = models_dir.unwrap_or_else(|| data_dir.join("models"));
            model_path(&models_dir, variant)
        })
    }
}

impl CorpusArgs {
    pub fn model_file(&self) -> PathBuf {
        let models_dir = self
            .models_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("models"));

        model_path(&models_dir, self.variant)
    }

    pub fn corpus_file(&self) -> PathBuf {
        corpus_path(&self.data_dir, self.variant)
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            samples: self.samples,
            seed: self.seed,
            heuristic: self.heuristic,
            ..GeneratorConfig::default()
        }
    }
}
