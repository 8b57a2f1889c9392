use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

use super::mediaplan_models::{
    GenerateAllSummary, GenerateRequest, GeneratedDeck, MediaplanRecord, RefreshSummary,
};
use super::mediaplan_store::{MediaplanStore, StoreError};
use super::task_registry::TaskRegistry;
use crate::core::ai::ReportGenerator;
use crate::core::content::{
    deck_content, forecast_content, forecast_tables, persona_slots, ReportError,
};
use crate::core::forecast::{AudienceForecast, ForecastError, ForecastSource};
use crate::core::slides::{
    count_filled_personas, prune_slides, reconcile_table, reconcile_text, DeckError, DeckService,
    EditBatch, Presentation, TemplateLayout,
};

#[derive(Debug, thiserror::Error)]
pub enum MediaplanError {
    #[error(transparent)]
    Deck(#[from] DeckError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Not a presentation URL: '{0}'")]
    InvalidUrl(String),
    #[error("No deck recorded for cohort '{0}'")]
    NoDeck(String),
}

#[derive(Debug, Clone)]
pub struct MediaplanConfig {
    /// Presentation copied for every cohort.
    pub template_id: String,
    /// Drive folder receiving the copies.
    pub shared_folder_id: Option<String>,
    pub layout: TemplateLayout,
}

pub struct MediaplanService<D, F, R, S>
where
    D: DeckService,
    F: ForecastSource,
    R: ReportGenerator,
    S: MediaplanStore,
{
    deck: D,
    source: F,
    reports: R,
    store: S,
    tasks: TaskRegistry,
    config: MediaplanConfig,
}

impl<D, F, R, S> MediaplanService<D, F, R, S>
where
    D: DeckService,
    F: ForecastSource,
    R: ReportGenerator,
    S: MediaplanStore,
{
    pub fn new(deck: D, source: F, reports: R, store: S, config: MediaplanConfig) -> Self {
        Self {
            deck,
            source,
            reports,
            store,
            tasks: TaskRegistry::new(),
            config,
        }
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Builds a new deck for one cohort and records the outcome, success or
    /// failure, in the store.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GeneratedDeck, MediaplanError> {
        let cohort_name = request.cohort_name.clone();
        let task_id = self.tasks.start(&cohort_name);
        tracing::info!(cohort = %cohort_name, task_id = %task_id, "Starting mediaplan generation");

        match self.run_generation(&task_id, request).await {
            Ok(presentation_id) => {
                let url = drive_url(&presentation_id);
                self.tasks.complete(&task_id, &url);
                self.record(&cohort_name, MediaplanRecord::success(&cohort_name, &url))
                    .await;
                tracing::info!(cohort = %cohort_name, url = %url, "Mediaplan generated");
                Ok(GeneratedDeck {
                    task_id,
                    presentation_id,
                    url,
                })
            }
            Err(e) => {
                let message = format!("Error generating mediaplan for {}: {}", cohort_name, e);
                self.tasks.fail(&task_id, &e.to_string());
                self.record(&cohort_name, MediaplanRecord::error(message)).await;
                tracing::error!(cohort = %cohort_name, error = %e, "Mediaplan generation failed");
                Err(e)
            }
        }
    }

    async fn run_generation(
        &self,
        task_id: &str,
        request: GenerateRequest,
    ) -> Result<String, MediaplanError> {
        let cohort_name = request.cohort_name.as_str();

        self.tasks.progress(task_id, 10, "Fetching data...");
        let data = match request.data {
            Some(data) => data,
            None => self.source.fetch_cohort_data(cohort_name).await?,
        };

        self.tasks.progress(task_id, 20, "Running report agents...");
        let report = self
            .reports
            .generate_report(cohort_name, &data.audiences)
            .await?;

        self.tasks
            .progress(task_id, 80, "Creating Google Slides presentation...");
        let today = Local::now().date_naive();
        let presentation_id = self
            .deck
            .copy_file(
                &self.config.template_id,
                &deck_file_name(cohort_name, today),
                self.config.shared_folder_id.as_deref(),
            )
            .await?;

        // One snapshot serves text, tables and pruning.
        let snapshot = self.deck.get_presentation(&presentation_id).await?;
        let content = deck_content(cohort_name, &report, &data.forecast, today);

        let mut batch = EditBatch::new();
        batch.add_content(reconcile_text(&snapshot, &content));
        self.add_tables(&mut batch, &snapshot, &data.forecast);

        let filled = count_filled_personas(&persona_slots(&content));
        batch.add_deletions(prune_slides(&snapshot, &self.config.layout, filled));

        batch.submit(&self.deck, &presentation_id).await?;
        Ok(presentation_id)
    }

    /// Rewrites the numbers of an existing deck and moves its title to the
    /// current month. Returns the new file name.
    pub async fn refresh_cohort(&self, cohort_name: &str, url: &str) -> Result<String, MediaplanError> {
        let presentation_id =
            presentation_id_from_url(url).ok_or_else(|| MediaplanError::InvalidUrl(url.to_string()))?;

        let forecast = self.source.fetch_forecast(cohort_name).await?;
        if forecast.is_empty() {
            tracing::warn!(cohort = cohort_name, "Forecast is empty; only the date line changes");
        }

        let today = Local::now().date_naive();
        let snapshot = self.deck.get_presentation(&presentation_id).await?;

        let mut batch = EditBatch::new();
        batch.add_content(reconcile_text(&snapshot, &forecast_content(&forecast, today)));
        self.add_tables(&mut batch, &snapshot, &forecast);
        let sent = batch.submit(&self.deck, &presentation_id).await?;

        let current = self.deck.file_name(&presentation_id).await?;
        let renamed = retitle(&current, today);
        if renamed != current {
            self.deck.rename_file(&presentation_id, &renamed).await?;
        }

        tracing::info!(
            cohort = cohort_name,
            presentation_id = %presentation_id,
            requests = sent,
            name = %renamed,
            "Deck refreshed"
        );
        Ok(renamed)
    }

    /// Refreshes the deck recorded for one cohort.
    pub async fn refresh_recorded(&self, cohort_name: &str) -> Result<String, MediaplanError> {
        let record = self.store.get_record(cohort_name).await?;
        let url = record
            .as_ref()
            .and_then(MediaplanRecord::url)
            .ok_or_else(|| MediaplanError::NoDeck(cohort_name.to_string()))?;
        self.refresh_cohort(cohort_name, url).await
    }

    /// Refreshes every recorded deck, one at a time. A failing cohort is
    /// logged and does not stop the pass.
    pub async fn refresh_all(&self) -> Result<RefreshSummary, MediaplanError> {
        let records = self.store.all_records().await?;
        tracing::info!(cohorts = records.len(), "Starting refresh of all recorded decks");

        let mut summary = RefreshSummary::default();
        for (cohort_name, record) in records {
            let Some(url) = record.url() else {
                tracing::debug!(cohort = %cohort_name, "No deck URL recorded, skipping");
                summary.skipped.push(cohort_name);
                continue;
            };

            match self.refresh_cohort(&cohort_name, url).await {
                Ok(_) => summary.refreshed.push(cohort_name),
                Err(e) => {
                    tracing::error!(cohort = %cohort_name, error = %e, "Failed to refresh deck");
                    summary.failed.push((cohort_name, e.to_string()));
                }
            }
        }

        Ok(summary)
    }

    /// Generates a deck for every cohort the data source lists, one at a time.
    pub async fn generate_all(&self) -> Result<GenerateAllSummary, MediaplanError> {
        let cohorts = self.source.list_cohorts().await?;
        tracing::info!(cohorts = cohorts.len(), "Generating decks for all cohorts");

        let mut summary = GenerateAllSummary::default();
        for cohort_name in cohorts {
            match self.generate(GenerateRequest::new(cohort_name.clone())).await {
                Ok(deck) => summary.generated.push((cohort_name, deck.url)),
                Err(e) => summary.failed.push((cohort_name, e.to_string())),
            }
        }
        Ok(summary)
    }

    fn add_tables(&self, batch: &mut EditBatch, snapshot: &Presentation, forecast: &AudienceForecast) {
        let clear = self.config.layout.cell_clear.into();
        for (tag, rows) in forecast_tables(forecast, self.config.layout.table_layout) {
            batch.add_tables(reconcile_table(snapshot, &tag, &rows, clear));
        }
    }

    async fn record(&self, cohort_name: &str, record: MediaplanRecord) {
        if let Err(e) = self.store.save_record(cohort_name, record).await {
            tracing::warn!(cohort = cohort_name, error = %e, "Failed to save mediaplan record");
        }
    }
}

/// `TIL_CohortDashboard_{CohortWithoutSpaces}_Forecast_{MonthYYYY}`.
pub fn deck_file_name(cohort_name: &str, today: NaiveDate) -> String {
    format!(
        "TIL_CohortDashboard_{}_Forecast_{}",
        cohort_name.split(' ').collect::<String>(),
        today.format("%B%Y")
    )
}

/// Replaces a trailing `MonthYYYY` in `name` with the current month.
pub fn retitle(name: &str, today: NaiveDate) -> String {
    static MONTH_YEAR: OnceLock<Regex> = OnceLock::new();
    let re = MONTH_YEAR
        .get_or_init(|| Regex::new(r"[A-Za-z]+[0-9]{4}$").expect("static regex is valid"));
    re.replace(name, today.format("%B%Y").to_string().as_str())
        .into_owned()
}

pub fn drive_url(presentation_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}", presentation_id)
}

/// Presentation id from a Drive file URL, a Slides editor URL or a bare id.
pub fn presentation_id_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = ["/file/d/", "/presentation/d/"]
        .iter()
        .find_map(|marker| url.find(marker).map(|i| &url[i + marker.len()..]));

    let id = match rest {
        Some(rest) => rest.split(['/', '?', '#']).next().unwrap_or_default(),
        None if !url.contains("://") => url,
        None => return None,
    };

    (!id.is_empty()).then(|| id.to_string())
}
