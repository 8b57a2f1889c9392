use anyhow::Context;
use std::path::Path;

use crate::core::ai::ReportGenerator;
use crate::core::forecast::{AudienceCatalog, AudienceForecast, CohortData, ForecastSource};
use crate::core::mediaplan::{GenerateRequest, MediaplanService, MediaplanStore};
use crate::core::slides::DeckService;

/// Reads cohort data supplied as files instead of fetching it.
pub async fn load_cohort_data(
    audience_json: Option<&Path>,
    forecast_json: &Path,
) -> anyhow::Result<CohortData> {
    let forecast_text = tokio::fs::read_to_string(forecast_json)
        .await
        .with_context(|| format!("reading {}", forecast_json.display()))?;
    let forecast: AudienceForecast = serde_json::from_str(&forecast_text)
        .with_context(|| format!("parsing forecast {}", forecast_json.display()))?;

    let audiences = match audience_json {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<AudienceCatalog>(&text)
                .with_context(|| format!("parsing audiences {}", path.display()))?
        }
        None => AudienceCatalog::new(),
    };

    Ok(CohortData {
        forecast,
        audiences,
    })
}

pub async fn generate<D, F, R, S>(
    service: &MediaplanService<D, F, R, S>,
    cohort: &str,
    data: Option<CohortData>,
) -> anyhow::Result<()>
where
    D: DeckService,
    F: ForecastSource,
    R: ReportGenerator,
    S: MediaplanStore,
{
    let mut request = GenerateRequest::new(cohort);
    if let Some(data) = data {
        request = request.with_data(data);
    }

    let deck = service.generate(request).await?;
    if let Some(task) = service.tasks().get(&deck.task_id) {
        tracing::info!(
            task_id = %task.task_id,
            status = ?task.status,
            progress = task.progress,
            "Generation task finished"
        );
    }
    println!("✅ {} -> {}", cohort, deck.url);
    Ok(())
}

pub async fn generate_all<D, F, R, S>(service: &MediaplanService<D, F, R, S>) -> anyhow::Result<()>
where
    D: DeckService,
    F: ForecastSource,
    R: ReportGenerator,
    S: MediaplanStore,
{
    let summary = service.generate_all().await?;
    for task in service.tasks().list() {
        tracing::debug!(task_id = %task.task_id, status = ?task.status, message = %task.message, "Task");
    }
    for (cohort, url) in &summary.generated {
        println!("✅ {} -> {}", cohort, url);
    }
    for (cohort, error) in &summary.failed {
        println!("❌ {}: {}", cohort, error);
    }
    println!(
        "Generated {} decks, {} failed",
        summary.generated.len(),
        summary.failed.len()
    );
    Ok(())
}

pub async fn refresh<D, F, R, S>(
    service: &MediaplanService<D, F, R, S>,
    cohort: Option<&str>,
) -> anyhow::Result<()>
where
    D: DeckService,
    F: ForecastSource,
    R: ReportGenerator,
    S: MediaplanStore,
{
    if let Some(cohort) = cohort {
        let name = service.refresh_recorded(cohort).await?;
        println!("🔄 {} -> {}", cohort, name);
        return Ok(());
    }

    let summary = service.refresh_all().await?;
    for cohort in &summary.skipped {
        println!("⏭️  {} (no deck recorded)", cohort);
    }
    for (cohort, error) in &summary.failed {
        println!("❌ {}: {}", cohort, error);
    }
    println!(
        "Refreshed {} of {} decks",
        summary.refreshed.len(),
        summary.total()
    );
    Ok(())
}

pub async fn list_cohorts(source: &impl ForecastSource) -> anyhow::Result<()> {
    let cohorts = source.list_cohorts().await?;
    for cohort in &cohorts {
        println!("{}", cohort);
    }
    tracing::info!(count = cohorts.len(), "Listed cohorts");
    Ok(())
}
