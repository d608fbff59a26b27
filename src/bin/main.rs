//! bsvm command line interface
//!
//! Streams LibSVM format data through the budgeted online trainer, and
//! evaluates or inspects saved models.

use bsvm::api::{evaluate_detailed, BudgetSvm};
use bsvm::core::{Dataset, DecisionModel, Result};
use bsvm::data::LibSvmDataset;
use bsvm::persistence::SerializableModel;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "bsvm")]
#[command(about = "Budgeted online kernel SVM training")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream training data through the budgeted online trainer
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (LibSVM format)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Number of reprocessing passes
    #[arg(short, long, default_value = "2")]
    epochs: usize,

    /// Support vector budget
    #[arg(short, long, default_value = "256")]
    budget: usize,

    /// Soft-overflow multiplier triggering pruning
    #[arg(long, default_value = "1.05")]
    capacity: f64,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file (LibSVM format)
    #[arg(long)]
    data: PathBuf,

    /// Show decision values alongside labels
    #[arg(long)]
    confidence: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Test data file (LibSVM format)
    #[arg(long)]
    data: PathBuf,

    /// Show detailed metrics
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => cmd_train(args),
        Commands::Predict(args) => cmd_predict(args),
        Commands::Evaluate(args) => cmd_evaluate(args),
        Commands::Info(args) => cmd_info(args),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

fn cmd_train(args: TrainArgs) -> Result<()> {
    info!("loading training data from {}", args.data.display());
    let dataset = LibSvmDataset::from_file(&args.data)?;
    info!("streaming {} samples, budget {}", dataset.len(), args.budget);

    let model = BudgetSvm::new()
        .with_c(args.c)
        .with_epochs(args.epochs)
        .with_budget(args.budget)
        .with_capacity(args.capacity)
        .train_stream(dataset.into_samples());

    println!(
        "trained: {} support vectors (budget {})",
        model.n_support_vectors(),
        args.budget
    );

    SerializableModel::from_trainer(&model, "linear").save_to_file(&args.output)?;
    println!("model saved to {}", args.output.display());
    Ok(())
}

fn cmd_predict(args: PredictArgs) -> Result<()> {
    let model = SerializableModel::load_from_file(&args.model)?.to_trainer()?;
    let dataset = LibSvmDataset::from_file(&args.data)?;

    for sample in dataset.into_samples() {
        let pred = model.predict(&sample.features);
        if args.confidence {
            println!("{:+.0} {:.6}", pred.label, pred.decision_value);
        } else {
            println!("{:+.0}", pred.label);
        }
    }
    Ok(())
}

fn cmd_evaluate(args: EvaluateArgs) -> Result<()> {
    let model = SerializableModel::load_from_file(&args.model)?.to_trainer()?;
    let dataset = LibSvmDataset::from_file(&args.data)?;

    let metrics = evaluate_detailed(&model, &dataset);
    println!("accuracy:  {:.4}", metrics.accuracy());
    if args.detailed {
        println!("precision: {:.4}", metrics.precision());
        println!("recall:    {:.4}", metrics.recall());
        println!("f1 score:  {:.4}", metrics.f1_score());
        println!(
            "confusion: tp={} tn={} fp={} fn={}",
            metrics.true_positives,
            metrics.true_negatives,
            metrics.false_positives,
            metrics.false_negatives
        );
    }
    Ok(())
}

fn cmd_info(args: InfoArgs) -> Result<()> {
    let model = SerializableModel::load_from_file(&args.model)?;
    model.print_summary();
    Ok(())
}
