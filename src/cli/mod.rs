//! Loan approval CLI module
//!
//! Command-line interface for training, serving the form and one-shot
//! predictions.

pub(crate) mod style;

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{AppConfig, ArtifactPaths, DEFAULT_DATA_PATH, DEFAULT_MODEL_PATH, DEFAULT_SCHEMA_PATH};
use crate::data::load_table;
use crate::inference::{FormDefaults, InferenceConfig, InferenceEngine, RowBuilder};
use crate::preprocessing::{binarize, detect_target};
use crate::training::{TrainEngine, TrainingConfig};
use crate::ui::{available_modes, render_prediction, theme, ServingSession, TerminalPrompter};
use style::*;

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "loan-approval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a loan approval classifier and score applications")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Dataset and artifact locations
#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Training CSV (also used for form defaults)
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Serialized model pipeline
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Feature schema descriptor
    #[arg(short, long, default_value = DEFAULT_SCHEMA_PATH)]
    pub schema: PathBuf,
}

impl PathArgs {
    pub fn to_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new()
            .with_data(&self.data)
            .with_model(&self.model)
            .with_schema(&self.schema)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the classifier and write the model and schema artifacts
    Train {
        #[command(flatten)]
        paths: PathArgs,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,

        /// Seed for the stratified split
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Open the interactive prediction form
    Serve {
        #[command(flatten)]
        paths: PathArgs,

        /// Approval threshold on the predicted probability
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
    },

    /// Score one application given as column=value pairs
    Predict {
        #[command(flatten)]
        paths: PathArgs,

        /// Feature value, e.g. --set age=35 (repeatable)
        #[arg(long = "set", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Approval threshold on the predicted probability
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,
    },

    /// Show dataset information
    Info {
        /// Input CSV file
        #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,
    },
}

/// Parse `column=value`; the value may itself contain `=`
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (column, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", s))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{}'", s));
    }
    Ok((column.to_string(), value.to_string()))
}

impl Commands {
    /// Build the run configuration from the parsed flags
    pub fn config(&self) -> AppConfig {
        match self {
            Commands::Train { paths, test_size, seed } => AppConfig::new()
                .with_paths(paths.to_paths())
                .with_training(
                    TrainingConfig::new()
                        .with_test_size(*test_size)
                        .with_random_seed(*seed),
                ),
            Commands::Serve { paths, threshold } | Commands::Predict { paths, threshold, .. } => {
                AppConfig::new()
                    .with_paths(paths.to_paths())
                    .with_inference(InferenceConfig::new().with_threshold(*threshold))
            }
            Commands::Info { data } => {
                AppConfig::new().with_paths(ArtifactPaths::new().with_data(data))
            }
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config: &AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    let paths = &config.paths;
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let table = load_table(&paths.data).inspect_err(|_| step_failed())?;
    step_done(&format!("{} rows × {} cols in {:?}", table.n_rows(), table.n_cols(), start.elapsed()));

    step_run(&format!("Fitting {}", "logistic regression".cyan()));
    let start = Instant::now();
    let mut engine = TrainEngine::new(config.training.clone());
    engine.fit(&table).inspect_err(|_| step_failed())?;
    step_done(&format!("{:?}", start.elapsed()));

    if let Some(schema) = engine.schema() {
        let [negatives, positives] = engine.class_counts();
        println!();
        println!("  {:<16} {}", muted("Target"), schema.target.white());
        println!("  {:<16} {} approved / {} rejected", muted("Labels"), positives, negatives);
        if engine.dropped_rows() > 0 {
            println!("  {:<16} {}", muted("Dropped rows"), engine.dropped_rows().to_string().yellow());
        }
        println!("  {:<16} {}", muted("Numeric"), schema.num.join(", "));
        println!("  {:<16} {}", muted("Categorical"), schema.cat.join(", "));
    }

    if let Some(metrics) = engine.metrics() {
        println!();
        println!("  {}", metrics.summary().white().bold());
        println!("  {:<16} {} train / {} test", muted("Rows"), metrics.n_train, metrics.n_test);
        println!("  {:<16} {}", muted("Features"), metrics.n_features);
    }
    if let Some(report) = engine.report() {
        println!();
        for line in report.to_string().lines() {
            println!("  {}", line);
        }
    }

    println!();
    step_run("Saving artifacts");
    engine.save(paths).inspect_err(|_| step_failed())?;
    step_done(&format!("{} + {}", paths.model.display(), paths.schema.display()));
    println!();

    Ok(())
}

fn load_engine(config: &AppConfig) -> anyhow::Result<(InferenceEngine, FormDefaults)> {
    config.validate()?;
    let engine = InferenceEngine::load(&config.paths, config.inference.clone())?;
    let defaults = FormDefaults::compute(engine.schema(), &config.paths.data);
    Ok((engine, defaults))
}

pub fn cmd_serve(config: &AppConfig) -> anyhow::Result<()> {
    let (engine, defaults) = load_engine(config)?;
    let schema = engine.schema();
    let modes: Vec<String> = available_modes(schema).iter().map(|m| m.to_string()).collect();

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Loan Approval Prediction".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Model   ", &config.paths.model.display().to_string()));
    line_box(&kv("Columns ", &format!("{} numeric, {} categorical", schema.num.len(), schema.cat.len())));
    line_box(&kv("Modes   ", &modes.join(", ")));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let mut prompter = TerminalPrompter::new();
    let mut session = ServingSession::new(&engine, &defaults);
    let served = session.run(&mut prompter)?;

    println!();
    step_ok(&format!("{} application(s) scored", served));
    println!();
    Ok(())
}

pub fn cmd_predict(config: &AppConfig, values: &[(String, String)]) -> anyhow::Result<()> {
    let (engine, defaults) = load_engine(config)?;

    let mut builder = RowBuilder::new(engine.schema(), &defaults);
    for (column, value) in values {
        builder.set(column.as_str(), value.as_str());
    }
    let row = builder.build()?;
    let prediction = engine.predict(&row)?;

    section("Predict");
    for (column, value) in row.iter() {
        println!("  {:<20} {}", muted(column), value);
    }
    render_prediction(&prediction);
    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let table = load_table(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), table.n_rows());
    println!("  {:<12} {}", muted("Columns"), table.n_cols());
    println!();

    println!("  {:<24} {:<12} {:>6}", muted("Column"), muted("Kind"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(44)));

    for col in table.columns() {
        println!(
            "  {:<24} {:<12} {:>6}",
            col.name(),
            col.kind().to_string().truecolor(140, 140, 140),
            col.null_count()
        );
    }
    println!();

    match detect_target(&table.column_names()) {
        Ok(target) => {
            println!("  {:<12} {}", muted("Target"), target.white());
            let labels = table.column(&target).map(binarize);
            match labels {
                Some(Ok(binary)) => {
                    let [negatives, positives] = binary.class_counts();
                    println!("  {:<12} {} approved / {} rejected", muted("Labels"), positives, negatives);
                    println!("  {:<12} {}", muted("Unmapped"), binary.dropped_rows);
                }
                Some(Err(e)) => step_warn(&e.to_string()),
                None => {}
            }
        }
        Err(e) => step_warn(&e.to_string()),
    }

    println!();
    Ok(())
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!();
    println!("       {}", "╻  ┏━┓┏━┓┏┓╻   ┏━┓┏━┓┏━┓┏━┓┏━┓╻ ╻┏━┓╻  ".truecolor(120, 170, 255));
    println!("       {}", "┃  ┃ ┃┣━┫┃┗┫   ┣━┫┣━┛┣━┛┣┳┛┃ ┃┃┏┛┣━┫┃  ".truecolor(100, 150, 240));
    println!("       {}", "┗━╸┗━┛╹ ╹╹ ╹   ╹ ╹╹  ╹  ╹┗╸┗━┛┗┛ ╹ ╹┗━╸".truecolor(80, 130, 220));
    println!();
    println!("       {}", dim(&format!("loan approval classifier  ·  v{}  ·  rust", env!("CARGO_PKG_VERSION"))));
    println!();
}

fn report_error(e: anyhow::Error) {
    println!();
    step_warn(&format!("{:#}", e));
}

pub fn cmd_interactive(config: &AppConfig) -> anyhow::Result<()> {
    use dialoguer::Select;

    print_banner();
    let theme = theme();

    loop {
        let items = &[
            "Train model           fit on the dataset, write artifacts",
            "Open prediction form  score applications interactively",
            "Inspect dataset       columns, kinds, label distribution",
            "Exit",
        ];

        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("What would you like to do")
            .items(items)
            .default(0)
            .interact_opt()?;

        match sel {
            Some(0) => {
                if let Err(e) = cmd_train(config) {
                    report_error(e);
                }
                wait_enter();
            }
            Some(1) => {
                if let Err(e) = cmd_serve(config) {
                    report_error(e);
                    wait_enter();
                }
            }
            Some(2) => {
                if let Err(e) = cmd_info(&config.paths.data) {
                    report_error(e);
                }
                wait_enter();
            }
            Some(3) | None => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
