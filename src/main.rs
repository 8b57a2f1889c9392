// Entry point of the media-plan deck generator.
//
// **Architecture Overview:**
// - `core/` = Business logic (deck reconciliation, report pipeline, scheduling)
// - `infra/` = Implementations of core traits (Google APIs, forecast service, LLM, JSON store)
// - `cli/` = Command-line surface (arguments, command handlers, refresh loop)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Dispatch the requested command

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{DataSourceArgs, GoogleArgs, LlmArgs};
use crate::cli::{commands, scheduler, Cli, Command};
use crate::core::ai::{AiConfig, AiService, ReportPipeline};
use crate::core::mediaplan::{MediaplanConfig, MediaplanService};
use crate::core::schedule::WeeklySchedule;
use crate::core::slides::TemplateLayout;
use crate::infra::ai::OpenRouterClient;
use crate::infra::forecast::MediaplanApiClient;
use crate::infra::google::{
    AccessTokenProvider, AuthorizedUserAuth, GoogleDeckClient, ServiceAccountAuth,
};
use crate::infra::mediaplan::JsonMediaplanStore;

type AppService = MediaplanService<
    GoogleDeckClient<Box<dyn AccessTokenProvider>>,
    Option<MediaplanApiClient>,
    Option<ReportPipeline<OpenRouterClient>>,
    JsonMediaplanStore,
>;

/// Picks the first configured credential: inline key, key file, then token file.
async fn google_auth(args: &GoogleArgs) -> anyhow::Result<Box<dyn AccessTokenProvider>> {
    if let Some(json) = &args.service_account_json {
        let auth = ServiceAccountAuth::from_json(json)?;
        tracing::info!(client_email = auth.client_email(), "Using service account credentials");
        return Ok(Box::new(auth));
    }
    if let Some(path) = &args.service_account_key {
        let auth = ServiceAccountAuth::from_file(path)
            .await
            .with_context(|| format!("loading service account key {}", path))?;
        tracing::info!(client_email = auth.client_email(), "Using service account credentials");
        return Ok(Box::new(auth));
    }
    if let Some(path) = &args.token_file {
        let auth = AuthorizedUserAuth::from_file(path)
            .await
            .with_context(|| format!("loading token file {}", path))?;
        tracing::info!(token_file = %path, "Using authorized user credentials");
        return Ok(Box::new(auth));
    }

    anyhow::bail!(
        "No Google credentials configured. Set GOOGLE_SERVICE_ACCOUNT_KEY, \
         GOOGLE_SERVICE_ACCOUNT_JSON or GOOGLE_TOKEN_FILE."
    )
}

fn forecast_source(args: &DataSourceArgs) -> Option<MediaplanApiClient> {
    let source = args
        .mediaplan_url
        .as_ref()
        .map(|url| MediaplanApiClient::new(url.as_str(), args.audience_info_url.clone()));
    if source.is_none() {
        tracing::warn!("MEDIAPLAN_URL is not set; forecasts must be supplied as files");
    }
    source
}

fn report_pipeline(args: &LlmArgs) -> Option<ReportPipeline<OpenRouterClient>> {
    let pipeline = args.openrouter_api_key.as_ref().map(|key| {
        let config = AiConfig::new(args.openrouter_model.as_str());
        ReportPipeline::new(AiService::new(OpenRouterClient::new(key.clone()), config))
    });
    if pipeline.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; decks cannot be generated");
    }
    pipeline
}

async fn build_service(cli: &Cli) -> anyhow::Result<AppService> {
    let generating = matches!(cli.command, Command::Generate { .. } | Command::GenerateAll);
    let template_id = match cli.google.template_id.clone() {
        Some(id) => id,
        None if generating => anyhow::bail!("MEDIAPLAN_TEMPLATE_ID is required to generate decks"),
        None => String::new(),
    };

    let layout = match &cli.template_layout {
        Some(path) => TemplateLayout::from_file(path)
            .await
            .with_context(|| format!("loading template layout {}", path.display()))?,
        None => TemplateLayout::default(),
    };

    let deck = GoogleDeckClient::new(google_auth(&cli.google).await?);
    let store = JsonMediaplanStore::open(&cli.store_path)
        .await
        .with_context(|| format!("opening {}", cli.store_path.display()))?;

    let config = MediaplanConfig {
        template_id,
        shared_folder_id: cli.google.shared_folder_id.clone(),
        layout,
    };

    Ok(MediaplanService::new(
        deck,
        forecast_source(&cli.data),
        report_pipeline(&cli.llm),
        store,
        config,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        // Listing cohorts only talks to the forecast service.
        Command::Cohorts => {
            let source =
                forecast_source(&cli.data).context("MEDIAPLAN_URL is required to list cohorts")?;
            commands::list_cohorts(&source).await
        }
        Command::Generate {
            cohort,
            audience_json,
            forecast_json,
        } => {
            let data = match forecast_json {
                Some(forecast) => {
                    Some(commands::load_cohort_data(audience_json.as_deref(), forecast).await?)
                }
                None => None,
            };
            let service = build_service(&cli).await?;
            commands::generate(&service, cohort, data).await
        }
        Command::GenerateAll => {
            let service = build_service(&cli).await?;
            commands::generate_all(&service).await
        }
        Command::Refresh { cohort } => {
            let service = build_service(&cli).await?;
            commands::refresh(&service, cohort.as_deref()).await
        }
        Command::Schedule { run_now, schedule } => {
            let schedule = WeeklySchedule::parse(
                &schedule.refresh_day,
                &schedule.refresh_time,
                &schedule.refresh_tz,
            )?;
            let service = Arc::new(build_service(&cli).await?);

            tokio::select! {
                _ = scheduler::run_weekly_refresh(service, schedule, *run_now) => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    signal.context("listening for shutdown signal")?;
                    tracing::info!("Shutting down refresh scheduler");
                    Ok(())
                }
            }
        }
    }
}
