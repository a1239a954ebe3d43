use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use downtime_predictor::core::dataset::Dataset;
use downtime_predictor::logging;
use downtime_predictor::server::{self, AppState, UploadResponse};
use downtime_predictor::serving::{ModelHolder, PredictionRequest, predict};
use downtime_predictor::store::ModelStore;
use downtime_predictor::streams::CsvStream;
use downtime_predictor::tasks::TrainingConfig;
use downtime_predictor::ui::cli::args::{Cli, Command, PredictArgs, ServeArgs, TrainArgs};
use downtime_predictor::utils::math::round_to;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level).context("failed to initialize logging")?;

    let holder = Arc::new(ModelHolder::new(ModelStore::new(&cli.model_path)));

    let command = match cli.command {
        Some(command) => command,
        None => Command::Serve(ServeArgs::from_env().context("invalid serve options")?),
    };
    match command {
        Command::Serve(args) => run_serve(holder, args).await,
        Command::Train(args) => run_train(holder, args).await,
        Command::Predict(args) => run_predict(holder, args).await,
    }
}

async fn run_serve(holder: Arc<ModelHolder>, args: ServeArgs) -> Result<()> {
    let config = args.into_server_config();
    let listener = TcpListener::bind(config.address)
        .await
        .with_context(|| format!("failed to bind {}", config.address))?;

    match holder.current() {
        Ok(Some(_)) => tracing::info!(path = %holder.store().path().display(), "serving stored model"),
        Ok(None) => tracing::info!("no model stored yet; POST a CSV to /upload to train one"),
        Err(e) => tracing::warn!(error = %e, "stored model could not be loaded"),
    }

    let state = AppState::new(holder, TrainingConfig::default());
    server::serve(listener, &config, state)
        .await
        .context("server terminated with an error")
}

async fn run_train(holder: Arc<ModelHolder>, args: TrainArgs) -> Result<()> {
    let path = args.data;
    let report = tokio::task::spawn_blocking(move || {
        let mut stream = CsvStream::from_path(&path)?;
        let dataset = Dataset::from_stream(&mut stream)?;
        holder.retrain_dataset(&dataset, &TrainingConfig::default())
    })
    .await
    .context("training task panicked")?
    .context("training failed")?;

    print_json(&UploadResponse {
        message: "Model trained successfully!".to_string(),
        accuracy: round_to(report.accuracy, 2),
        f1_score: round_to(report.f1_score, 2),
    })
}

async fn run_predict(holder: Arc<ModelHolder>, args: PredictArgs) -> Result<()> {
    let model = holder.require().context("cannot predict")?;
    let result = predict(&model, PredictionRequest::new(args.temperature, args.run_time))
        .context("prediction failed")?;
    print_json(&result)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).context("failed to encode output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}
