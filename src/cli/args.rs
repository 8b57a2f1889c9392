use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Builds and refreshes audience media-plan decks in Google Slides.
#[derive(Parser, Debug)]
#[command(name = "mediaplan-deck", version)]
#[command(about = "Generate cohort media-plan decks in Google Slides and keep their forecasts current")]
pub struct Cli {
    #[command(flatten)]
    pub google: GoogleArgs,

    #[command(flatten)]
    pub data: DataSourceArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// JSON file recording the deck generated for each cohort
    #[arg(long, env = "MEDIAPLAN_STORE_PATH", default_value = "data/mediaplan_responses.json")]
    pub store_path: PathBuf,

    /// Optional JSON file describing where things live in the template
    #[arg(long, env = "MEDIAPLAN_TEMPLATE_LAYOUT")]
    pub template_layout: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GoogleArgs {
    /// Path to a service account JSON key
    #[arg(long, env = "GOOGLE_SERVICE_ACCOUNT_KEY")]
    pub service_account_key: Option<String>,

    /// Service account JSON key content
    #[arg(long, env = "GOOGLE_SERVICE_ACCOUNT_JSON", hide_env_values = true)]
    pub service_account_json: Option<String>,

    /// Authorized-user token file holding a refresh token
    #[arg(long, env = "GOOGLE_TOKEN_FILE")]
    pub token_file: Option<String>,

    /// Template presentation copied for every cohort
    #[arg(long, env = "MEDIAPLAN_TEMPLATE_ID")]
    pub template_id: Option<String>,

    /// Drive folder that receives the generated decks
    #[arg(long, env = "MEDIAPLAN_SHARED_FOLDER_ID")]
    pub shared_folder_id: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DataSourceArgs {
    /// Base URL of the mediaplan forecast service
    #[arg(long, env = "MEDIAPLAN_URL")]
    pub mediaplan_url: Option<String>,

    /// Base URL of the audience-info service
    #[arg(long, env = "AUDIENCE_INFO_URL")]
    pub audience_info_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    #[arg(long, env = "OPENROUTER_MODEL", default_value = "openai/gpt-4o-mini")]
    pub openrouter_model: String,
}

#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    #[arg(long, env = "MEDIAPLAN_REFRESH_DAY", default_value = "monday")]
    pub refresh_day: String,

    /// Local time of the refresh, HH:MM
    #[arg(long, env = "MEDIAPLAN_REFRESH_TIME", default_value = "13:10")]
    pub refresh_time: String,

    #[arg(long, env = "MEDIAPLAN_REFRESH_TZ", default_value = "Asia/Kolkata")]
    pub refresh_tz: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a deck for one cohort
    Generate {
        cohort: String,

        /// Audience segments (abbreviation -> name/description) instead of the audience service
        #[arg(long, requires = "forecast_json")]
        audience_json: Option<PathBuf>,

        /// Forecast (preset -> geography -> numbers) instead of the forecast service
        #[arg(long)]
        forecast_json: Option<PathBuf>,
    },

    /// Generate decks for every cohort the forecast service lists
    GenerateAll,

    /// Refresh the numbers of recorded decks (all of them when no cohort is given)
    Refresh { cohort: Option<String> },

    /// Run the weekly refresh until stopped
    Schedule {
        /// Refresh once immediately before waiting for the first slot
        #[arg(long)]
        run_now: bool,

        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// List the cohorts known to the forecast service
    Cohorts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_with_files() {
        let cli = Cli::try_parse_from([
            "mediaplan-deck",
            "generate",
            "Food Lovers",
            "--audience-json",
            "aud.json",
            "--forecast-json",
            "fc.json",
        ])
        .unwrap();

        match cli.command {
            Command::Generate {
                cohort,
                audience_json,
                forecast_json,
            } => {
                assert_eq!(cohort, "Food Lovers");
                assert_eq!(audience_json, Some(PathBuf::from("aud.json")));
                assert_eq!(forecast_json, Some(PathBuf::from("fc.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_audience_file_needs_forecast_file() {
        assert!(Cli::try_parse_from([
            "mediaplan-deck",
            "generate",
            "Food Lovers",
            "--audience-json",
            "aud.json",
        ])
        .is_err());
    }

    #[test]
    fn test_schedule_defaults() {
        let cli = Cli::try_parse_from(["mediaplan-deck", "schedule", "--run-now"]).unwrap();
        match cli.command {
            Command::Schedule { run_now, schedule } => {
                assert!(run_now);
                if std::env::var_os("MEDIAPLAN_REFRESH_TIME").is_none() {
                    assert_eq!(schedule.refresh_time, "13:10");
                }
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_refresh_cohort_is_optional() {
        let cli = Cli::try_parse_from(["mediaplan-deck", "refresh"]).unwrap();
        assert!(matches!(cli.command, Command::Refresh { cohort: None }));
    }
}
