use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use body_model::{BodyModel, SmplModel};
use log::info;
use machine_learning::{
    Corpus, RegressionArtifact,
    regression::{RegressionTrainer, TrainingConfig},
    synthetic::{GeneratorConfig, SyntheticGenerator},
};
use specs::BodyVariant;

use crate::cli::CorpusArgs;

fn load_model(args: &CorpusArgs) -> Result<SmplModel> {
    let path = args.model_file();
    SmplModel::load(&path, args.variant)
        .with_context(|| format!("loading body model {}", path.display()))
}

/// Generates a corpus from `model` and saves it at `path`.
pub fn generate_corpus(
    model: &dyn BodyModel,
    config: GeneratorConfig,
    path: &Path,
) -> Result<Corpus> {
    let (corpus, stats) = SyntheticGenerator::new(model, config).generate()?;
    corpus
        .save(path)
        .with_context(|| format!("saving corpus {}", path.display()))?;

    println!(
        "kept {} of {} bodies ({} out of range, {} measured with fallbacks)",
        stats.kept, stats.requested, stats.discarded, stats.degraded
    );
    println!("corpus saved to {}", path.display());

    Ok(corpus)
}

/// Fits the regression on `corpus` and prints its scores.
pub fn fit(
    corpus: &Corpus,
    variant: BodyVariant,
    config: TrainingConfig,
) -> Result<RegressionArtifact> {
    let artifact = RegressionTrainer::new(config).train(corpus, variant)?;

    if let Some(metrics) = &artifact.metrics {
        println!(
            "train R2 {:.4} ({} samples), test R2 {:.4} ({} samples), test MSE {:.4}",
            metrics.train_r2,
            metrics.train_samples,
            metrics.test_r2,
            metrics.test_samples,
            metrics.test_mse
        );
    }

    Ok(artifact)
}

pub fn generate(args: &CorpusArgs) -> Result<()> {
    let model = load_model(args)?;
    generate_corpus(&model, args.generator_config(), &args.corpus_file())?;
    Ok(())
}

/// Trains on the variant's corpus, reusing the one on disk unless `regenerate` is set.
pub fn train(
    args: &CorpusArgs,
    output: Option<PathBuf>,
    regenerate: bool,
    alpha: f64,
) -> Result<()> {
    let corpus_file = args.corpus_file();
    let corpus = if corpus_file.exists() && !regenerate {
        info!("reusing corpus {}", corpus_file.display());
        Corpus::load(&corpus_file)
            .with_context(|| format!("loading corpus {}", corpus_file.display()))?
    } else {
        let model = load_model(args)?;
        generate_corpus(&model, args.generator_config(), &corpus_file)?
    };

    let config = TrainingConfig {
        seed: args.seed,
        alpha,
        ..TrainingConfig::default()
    };
    let artifact = fit(&corpus, args.variant, config)?;

    let output = output.unwrap_or_else(|| args.data_dir.join("regression_model.json"));
    artifact
        .save(&output)
        .with_context(|| format!("saving artifact {}", output.display()))?;
    info!("regression artifact written to {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use anthropometry::Heuristic;
    use body_model::fixtures;
    use machine_learning::{Predictor, corpus_path};
    use specs::MeasurementSet;

    use super::*;

    fn args(data_dir: &Path, samples: usize) -> CorpusArgs {
        CorpusArgs {
            data_dir: data_dir.to_path_buf(),
            models_dir: Some(data_dir.join("no-models")),
            samples,
            variant: BodyVariant::Neutral,
            seed: 7,
            heuristic: Heuristic::Geometric,
        }
    }

    #[test]
    fn trained_artifact_serves_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let model = fixtures::ring_body(BodyVariant::Neutral);
        let args = args(dir.path(), 60);

        let corpus = generate_corpus(&model, args.generator_config(), &args.corpus_file()).unwrap();
        assert_eq!(corpus.len(), 60);

        let output = dir.path().join("artifact.json");
        train(&args, Some(output.clone()), false, 1.0).unwrap();

        let predictor = Predictor::load(&output).unwrap();
        assert!(predictor.is_loaded());

        let set = MeasurementSet::new([175.0, 95.0, 80.0, 98.0, 45.0, 66.5, 78.75, 38.0]);
        assert!(!predictor.predict(&set).is_degraded());
    }

    #[test]
    fn train_reuses_the_corpus_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let model = fixtures::ring_body(BodyVariant::Neutral);
        let path = corpus_path(dir.path(), BodyVariant::Neutral);
        generate_corpus(&model, args(dir.path(), 30).generator_config(), &path).unwrap();

        // No body model exists under models_dir, so only a reused corpus can train.
        let output = dir.path().join("artifact.json");
        train(&args(dir.path(), 30), Some(output.clone()), false, 1.0).unwrap();
        assert!(output.exists());

        let err = train(&args(dir.path(), 30), Some(output), true, 1.0).unwrap_err();
        assert!(format!("{err:#}").contains("loading body model"));
    }

    #[test]
    fn default_output_lives_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let model = fixtures::ring_body(BodyVariant::Neutral);
        let args = args(dir.path(), 30);
        generate_corpus(&model, args.generator_config(), &args.corpus_file()).unwrap();

        train(&args, None, false, 0.5).unwrap();

        let artifact = RegressionArtifact::load(dir.path().join("regression_model.json")).unwrap();
        assert_eq!(artifact.alpha, 0.5);
        assert_eq!(artifact.metrics.unwrap().test_samples, 6);
    }
}
