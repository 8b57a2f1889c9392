use chrono::NaiveDate;

use crate::core::forecast::{AudienceForecast, ForecastEntry, Preset};
use crate::core::slides::{SlideContent, SlideText, TableContent, TableLayout};

use super::report_models::{MediaplanReport, PERSONA_SLOTS};

/// Geography that feeds the headline `reach_*` / `impressions_*` tags.
pub const HEADLINE_GEOGRAPHY: &str = "India";

/// Countries with their own reach/impressions tags: (forecast name, tag prefix).
pub const GEO_TAGS: [(&str, &str); 12] = [
    ("India", "india"),
    ("United States", "usa"),
    ("Canada", "canada"),
    ("GCC", "gcc"),
    ("Singapore", "singapore"),
    ("United Arab Emirates", "uae"),
    ("Saudi Arabia", "saudi_arabia"),
    ("Malaysia", "malaysia"),
    ("Indonesia", "indonesia"),
    ("South Africa", "south_africa"),
    ("Mauritius", "mauritius"),
    ("Australia", "australia"),
];

const CITY_GROUPS: [&str; 5] = [
    "Tier1 Cities",
    "Tier2 Cities",
    "Tier3",
    "Top 8 Metro Cities",
    "Top 10 Cities",
];

const STATES: [&str; 5] = [
    "Maharashtra",
    "Karnataka",
    "Telangana",
    "Tamil Nadu",
    "Andhra Pradesh",
];

const COUNTRIES: [&str; 5] = [
    "India",
    "United States",
    "GCC",
    "Canada",
    "United Arab Emirates",
];

const CITIES: [&str; 16] = [
    "Bengaluru",
    "Delhi",
    "Mumbai",
    "Pune",
    "Hyderabad",
    "Nagpur",
    "Ahmedabad",
    "Vadodara",
    "Jaipur",
    "Chandigarh",
    "Indore",
    "Lucknow",
    "Kolkata",
    "Chennai",
    "Coimbatore",
    "Kochi",
];

const LEGACY_CITIES: [&str; 5] = ["Bengaluru", "Delhi", "Mumbai", "Pune", "Jaipur"];

/// Date line shown on the cover, e.g. `October 2026`.
pub fn month_label(today: NaiveDate) -> String {
    today.format("%B %Y").to_string()
}

/// Every text tag of a freshly generated deck.
pub fn deck_content(
    cohort_name: &str,
    report: &MediaplanReport,
    forecast: &AudienceForecast,
    today: NaiveDate,
) -> SlideContent {
    let mut content = forecast_content(forecast, today);

    content.insert("cohort_title".into(), cohort_name.into());
    content.insert(
        "cohort_definition_title".into(),
        format!("{} Cohort Definition", cohort_name).into(),
    );
    content.insert(
        "cohort_definition".into(),
        report.cohort_definition.as_str().into(),
    );

    for (i, group) in report.data_signals.iter().enumerate() {
        let n = i + 1;
        content.insert(format!("data_signal_{}_title", n), group.title.as_str().into());
        for (j, signal) in group.signals.iter().enumerate() {
            content.insert(format!("data_signal_{}_{}", n, j + 1), signal.as_str().into());
        }
    }

    for (i, persona) in report.personas.iter().enumerate() {
        let n = i + 1;
        content.insert(format!("persona_{}_title", n), SlideText::title(&persona.title));
        content.insert(
            format!("persona_{}_description", n),
            persona.description.as_str().into(),
        );
        content.insert(
            format!("persona_{}_segments", n),
            format!("{} Segments", persona.segments).into(),
        );
        content.insert(
            format!("persona_{}_target_profiles", n),
            SlideText::Bullets(persona.target_profiles.clone()),
        );
    }

    for (i, insight) in report.insights.iter().enumerate() {
        let n = i + 1;
        content.insert(format!("insight_{}_title", n), insight.title.as_str().into());
        content.insert(
            format!("insight_{}_description", n),
            insight.description.as_str().into(),
        );
    }

    for (i, rec) in report.recommendations.iter().enumerate() {
        let n = i + 1;
        content.insert(format!("recommendation_title_{}", n), rec.title.as_str().into());
        content.insert(
            format!("recommendation_description_{}", n),
            rec.description.as_str().into(),
        );
    }

    content.insert(
        "competitive_advantage".into(),
        report.competitive_advantage.as_str().into(),
    );

    content
}

/// The numeric tags, shared by generation and the weekly refresh.
pub fn forecast_content(forecast: &AudienceForecast, today: NaiveDate) -> SlideContent {
    let mut content = SlideContent::new();
    content.insert(
        "cohort_updated_date".into(),
        format!(
            "Audience Media Plan Forecast & Insights for {}",
            month_label(today)
        )
        .into(),
    );

    for preset in Preset::ALL {
        let label = preset.reach_label();

        if let Some(entry) = forecast.entry(preset, HEADLINE_GEOGRAPHY) {
            content.insert(format!("reach_{}", label), entry.fcap1().into());
            content.insert(format!("impressions_{}", label), entry.fcap3().into());
        }

        for (geography, tag) in GEO_TAGS {
            if let Some(entry) = forecast.entry(preset, geography) {
                content.insert(format!("{}_reach_{}", tag, label), entry.fcap1().into());
                content.insert(format!("{}_impressions_{}", tag, label), entry.fcap3().into());
            }
        }
    }

    content
}

/// Table rows for every preset in the template's table layout.
pub fn forecast_tables(forecast: &AudienceForecast, layout: TableLayout) -> TableContent {
    let mut tables = TableContent::new();

    for preset in Preset::ALL {
        let prefix = preset.table_prefix();
        let rows = |names: &[&str]| geography_rows(forecast, preset, names);

        match layout {
            TableLayout::Combined => {
                let mut country_tier_state = vec![section_header("Countries")];
                country_tier_state.extend(rows(&COUNTRIES));
                country_tier_state.push(section_header("Geographic Tiers"));
                country_tier_state.extend(rows(&CITY_GROUPS));
                country_tier_state.push(section_header("State"));
                country_tier_state.extend(rows(&STATES));

                let mut city = vec![section_header("Cities")];
                city.extend(rows(&CITIES));

                tables.push((format!("{}_country_tier_state", prefix), country_tier_state));
                tables.push((format!("{}_city", prefix), city));
            }
            TableLayout::Legacy => {
                tables.push((format!("{}_tier", prefix), rows(&CITY_GROUPS)));
                tables.push((format!("{}_state", prefix), rows(&STATES)));
                tables.push((format!("{}_city", prefix), rows(&LEGACY_CITIES)));
                tables.push((format!("{}_country", prefix), rows(&COUNTRIES)));
            }
        }
    }

    tables
}

/// The persona title strings in slot order.
pub fn persona_slots(content: &SlideContent) -> Vec<String> {
    (1..=PERSONA_SLOTS)
        .map(|n| {
            content
                .get(&format!("persona_{}_title", n))
                .filter(|title| !title.is_blank())
                .map(SlideText::render)
                .unwrap_or_default()
        })
        .collect()
}

fn geography_rows(forecast: &AudienceForecast, preset: Preset, names: &[&str]) -> Vec<Vec<String>> {
    names
        .iter()
        .filter_map(|name| forecast.entry(preset, name).map(|entry| metric_row(name, entry)))
        .collect()
}

fn metric_row(label: &str, entry: &ForecastEntry) -> Vec<String> {
    vec![
        label.to_string(),
        SlideText::from(entry.fcap1()).render(),
        SlideText::from(entry.table_fcap3()).render(),
    ]
}

fn section_header(title: &str) -> Vec<String> {
    vec![title.to_string(), String::new(), String::new()]
}
