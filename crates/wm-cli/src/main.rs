//! wm-selector: build routing datasets, optimize a selector artifact and evaluate it offline.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use wm_core::{LabeledExample, SelectorConfig};
use wm_dataset::{split_examples, DatasetBuilder, LabelDistribution};
use wm_eval::{
    load_artifact, optimize, save_artifact, Blocking, Comparison, Evaluator, FewShotPredictor, HeuristicBaseline,
    OptimizeOptions,
};

#[derive(Parser)]
#[command(name = "wm-selector")]
#[command(author, version, about = "Train and evaluate the task-to-model selector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON selector configuration (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the labeled dataset and print its label distribution
    Prepare {
        /// Aggregated eval records (JSONL)
        #[arg(long)]
        evals: PathBuf,
        /// Truncate prompts to this many characters
        #[arg(long)]
        max_prompt_length: Option<usize>,
    },

    /// Select few-shot demonstrations and write the selector artifact
    Optimize {
        #[arg(long)]
        evals: PathBuf,
        #[arg(long, default_value = "optimized-selector.json")]
        output: PathBuf,
        /// Train fraction of the positional split
        #[arg(long)]
        split: Option<f64>,
        #[arg(long)]
        max_demos: Option<usize>,
        /// Model recorded as the artifact's teacher
        #[arg(long)]
        teacher: Option<String>,
        /// Model recorded as the artifact's runtime
        #[arg(long)]
        runtime: Option<String>,
    },

    /// Compare the heuristic baseline with an optimized artifact on the validation split
    Evaluate {
        #[arg(long)]
        evals: PathBuf,
        #[arg(long, default_value = "optimized-selector.json")]
        artifact: PathBuf,
        #[arg(long)]
        split: Option<f64>,
        /// Predictions in flight at once
        #[arg(long, default_value_t = 4)]
        threads: usize,
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SelectorConfig> {
    match path {
        Some(path) => SelectorConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(SelectorConfig::default()),
    }
}

fn load_examples(builder: &DatasetBuilder<'_>, evals: &Path) -> anyhow::Result<Vec<LabeledExample>> {
    let examples = builder.load_file(evals)?;
    info!(path = %evals.display(), examples = examples.len(), "loaded eval records");
    Ok(examples)
}

fn cmd_prepare(config: SelectorConfig, evals: &Path, max_prompt_length: Option<usize>) -> anyhow::Result<()> {
    let mut builder = DatasetBuilder::new(config);
    if let Some(n) = max_prompt_length {
        builder = builder.max_prompt_length(n);
    }
    let examples = load_examples(&builder, evals)?;

    println!("Loaded {} training examples", examples.len());
    println!();
    print!("{}", LabelDistribution::from_examples(&examples));
    Ok(())
}

fn cmd_optimize(config: SelectorConfig, evals: &Path, output: &Path, options: OptimizeOptions) -> anyhow::Result<()> {
    let builder = DatasetBuilder::new(config);
    let examples = load_examples(&builder, evals)?;
    let data = std::fs::read(evals)?;

    let report = optimize(&examples, builder.config(), &options, &evals.display().to_string(), &data)?;
    save_artifact(output, &report.artifact)?;

    println!("Training examples:   {}", report.train_count);
    println!("Validation examples: {}", report.val_count);
    println!("Demonstrations:      {}", report.artifact.few_shot_examples.len());
    println!();
    println!("Baseline score:  {:.4}", report.baseline_score);
    println!("Optimized score: {:.4}", report.optimized_score);
    println!("Improvement:     {:+.4}", report.improvement());
    println!();
    println!("Saved optimized selector to {}", output.display());
    Ok(())
}

async fn cmd_evaluate(
    config: SelectorConfig,
    evals: &Path,
    artifact_path: &Path,
    split: Option<f64>,
    threads: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let builder = DatasetBuilder::new(config);
    let config = builder.config();
    let examples = load_examples(&builder, evals)?;
    let (_, val) = split_examples(&examples, split.unwrap_or(config.dataset.train_split));
    let dist = LabelDistribution::from_examples(val);

    let evaluator = Evaluator::new(config);
    let baseline = evaluator.evaluate(val, &HeuristicBaseline::new(config), "Heuristic");

    let (artifact, notice) = match load_artifact(artifact_path) {
        Ok(artifact) => (Some(artifact), None),
        Err(e) if e.is_not_found() => (
            None,
            Some(format!("No artifact found at {}, skipping optimized evaluation.", artifact_path.display())),
        ),
        Err(e) => {
            warn!(path = %artifact_path.display(), error = %e, "unreadable artifact");
            (
                None,
                Some(format!(
                    "Could not load artifact at {}: {e}. Skipping optimized evaluation.",
                    artifact_path.display()
                )),
            )
        }
    };

    let predictor = artifact
        .as_ref()
        .map(|a| Arc::new(Blocking::new(FewShotPredictor::from_artifact(a))));
    let optimized = match &predictor {
        Some(predictor) => Some(
            evaluator
                .evaluate_concurrent(val, Arc::clone(predictor), "Optimized", threads)
                .await,
        ),
        None => None,
    };

    if let OutputFormat::Json = format {
        let doc = serde_json::json!({
            "validation": dist,
            "baseline": baseline,
            "optimized": optimized,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("Validation set: {} examples", dist.total);
    println!("Ground-truth model distribution:");
    for (model, count) in &dist.models {
        println!("  {model}: {count} ({:.0}%)", dist.model_share(model) * 100.0);
    }
    println!();

    match (&artifact, &predictor) {
        (Some(a), Some(predictor)) => {
            println!("Loaded optimized selector from {}", artifact_path.display());
            println!(
                "  version {}, {} demonstrations, validation score {:.4}",
                a.version,
                predictor.inner().demos().len(),
                a.metadata.val_score
            );
        }
        _ => {
            if let Some(notice) = &notice {
                println!("{notice}");
            }
        }
    }
    println!();

    let failures = optimized.as_ref().map_or(0, |r| r.failures);
    println!("{}", Comparison::new(baseline, optimized));
    if failures > 0 {
        println!("{failures} predictions failed and were replaced by the heuristic default.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wm_cli=info".parse()?)
                .add_directive("wm_dataset=info".parse()?)
                .add_directive("wm_eval=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Prepare { evals, max_prompt_length } => cmd_prepare(config, &evals, max_prompt_length),
        Commands::Optimize { evals, output, split, max_demos, teacher, runtime } => {
            let defaults = OptimizeOptions::from_config(&config);
            let options = OptimizeOptions {
                split: split.unwrap_or(defaults.split),
                max_demos: max_demos.unwrap_or(defaults.max_demos),
                teacher_model: teacher.unwrap_or(defaults.teacher_model),
                runtime_model: runtime.unwrap_or(defaults.runtime_model),
            };
            cmd_optimize(config, &evals, &output, options)
        }
        Commands::Evaluate { evals, artifact, split, threads, format } => {
            cmd_evaluate(config, &evals, &artifact, split, threads, format).await
        }
    }
}
