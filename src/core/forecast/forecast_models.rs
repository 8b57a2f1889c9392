use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::slides::slide_content::round2;

/// Raw forecast numbers for one geography under one preset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(default)]
    pub user: f64,
    #[serde(default)]
    pub impr: f64,
}

impl ForecastEntry {
    /// Single-exposure reach.
    pub fn fcap1(&self) -> f64 {
        round2(self.user)
    }

    /// Triple-exposure impressions, capped by the available impressions.
    pub fn fcap3(&self) -> f64 {
        round2((self.user * 3.0).min(self.impr))
    }

    /// Table variant: triples the already rounded reach, so a row's Fcap-3
    /// is consistent with the Fcap-1 printed next to it.
    pub fn table_fcap3(&self) -> f64 {
        round2((self.fcap1() * 3.0).min(self.impr))
    }
}

/// Preset key -> geography name -> numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudienceForecast(pub HashMap<String, HashMap<String, ForecastEntry>>);

impl AudienceForecast {
    pub fn entry(&self, preset: Preset, geography: &str) -> Option<&ForecastEntry> {
        self.0.get(preset.key()).and_then(|geos| geos.get(geography))
    }

    pub fn insert(&mut self, preset_key: impl Into<String>, geos: HashMap<String, ForecastEntry>) {
        self.0.insert(preset_key.into(), geos);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn preset_count(&self) -> usize {
        self.0.len()
    }
}

/// The six inventory presets every deck reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Cluster,
    Languages,
    Toi,
    Et,
    Combo,
    Nbt,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Cluster,
        Preset::Languages,
        Preset::Toi,
        Preset::Et,
        Preset::Combo,
        Preset::Nbt,
    ];

    /// Key under which the data source reports this preset.
    pub fn key(&self) -> &'static str {
        match self {
            Preset::Cluster => "TIL_All_Cluster_RNF",
            Preset::Languages => "TIL_All_Languages_RNF",
            Preset::Toi => "TIL_TOI_Only_RNF",
            Preset::Et => "TIL_ET_Only_RNF",
            Preset::Combo => "TIL_ET_And_TOI_RNF",
            Preset::Nbt => "TIL_NBT_Only_RNF",
        }
    }

    /// Suffix of the `reach_*` / `impressions_*` text tags.
    pub fn reach_label(&self) -> &'static str {
        match self {
            Preset::Cluster => "cluster",
            Preset::Languages => "languages",
            Preset::Toi => "toi",
            Preset::Et => "et",
            Preset::Combo => "combo",
            Preset::Nbt => "nbt",
        }
    }

    /// Prefix of the preset's table tags.
    pub fn table_prefix(&self) -> &'static str {
        match self {
            Preset::Cluster => "cluster",
            Preset::Languages => "language",
            Preset::Toi => "TOI",
            Preset::Et => "ET",
            Preset::Combo => "combo",
            Preset::Nbt => "NBT",
        }
    }
}

/// Audience segment metadata keyed by abbreviation, fed to the report pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub type AudienceCatalog = BTreeMap<String, AudienceInfo>;

/// Everything the data source knows about a cohort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortData {
    pub forecast: AudienceForecast,
    pub audiences: AudienceCatalog,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fcap3_is_capped_by_impressions() {
        let entry = ForecastEntry {
            user: 10.5,
            impr: 100.0,
        };
        assert_eq!(entry.fcap1(), 10.5);
        assert_eq!(entry.fcap3(), 31.5);

        let capped = ForecastEntry {
            user: 10.0,
            impr: 12.346,
        };
        assert_eq!(capped.fcap3(), 12.35);
    }

    #[test]
    fn test_table_fcap3_triples_rounded_reach() {
        let entry = ForecastEntry {
            user: 1.234,
            impr: 100.0,
        };
        assert!((entry.fcap3() - 3.7).abs() < 1e-9);
        assert!((entry.table_fcap3() - 3.69).abs() < 1e-9);

        let capped = ForecastEntry {
            user: 10.0,
            impr: 12.346,
        };
        assert_eq!(capped.table_fcap3(), 12.35);
    }

    #[test]
    fn test_forecast_parses_source_shape() {
        let forecast: AudienceForecast = serde_json::from_str(
            r#"{"TIL_TOI_Only_RNF": {"India": {"user": 1.5, "impr": 9}, "Pune": {"user": 0.2}}}"#,
        )
        .unwrap();

        assert_eq!(forecast.entry(Preset::Toi, "India").unwrap().impr, 9.0);
        assert_eq!(forecast.entry(Preset::Toi, "Pune").unwrap().impr, 0.0);
        assert!(forecast.entry(Preset::Et, "India").is_none());
    }

    #[test]
    fn test_preset_labels_are_distinct() {
        let prefixes: std::collections::HashSet<_> =
            Preset::ALL.iter().map(|p| p.table_prefix()).collect();
        assert_eq!(prefixes.len(), Preset::ALL.len());
    }
}
