use super::ai_service::{AiProvider, AiService};
use crate::core::content::{MediaplanReport, ReportError};
use crate::core::forecast::AudienceCatalog;
use async_trait::async_trait;

/// Produces the structured report for a cohort.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate_report(
        &self,
        cohort_name: &str,
        audiences: &AudienceCatalog,
    ) -> Result<MediaplanReport, ReportError>;
}

/// One agent of the pipeline: a role (system prompt) and its task.
#[derive(Debug, Clone, Copy)]
pub struct AgentStage {
    pub name: &'static str,
    pub role: &'static str,
    pub task: &'static str,
}

pub const STAGES: [AgentStage; 6] = [
    AgentStage {
        name: "definition",
        role: "You are an audience strategist at a large digital publisher. You write crisp, \
               advertiser-facing definitions of audience cohorts.",
        task: "Write a two to three sentence definition of the '{cohort_name}' cohort, based on \
               the audience segments it is built from. Describe who these people are and why \
               advertisers care about them.",
    },
    AgentStage {
        name: "data_signals",
        role: "You are a data analyst who explains which behavioural signals identify an \
               audience.",
        task: "Group the data signals behind the '{cohort_name}' cohort into exactly 3 themed \
               groups. Give each group a short title and exactly 5 concise signals.",
    },
    AgentStage {
        name: "personas",
        role: "You are a consumer researcher who turns audience data into vivid personas.",
        task: "Create up to 6 personas for the '{cohort_name}' cohort, most important first. \
               Each persona has a title written as a single emoji, a newline, then a short \
               name; a one-sentence description; the number of audience segments it covers; \
               and 3 to 5 target profiles.",
    },
    AgentStage {
        name: "insights",
        role: "You are a media planner who finds the commercial story in audience data.",
        task: "Write exactly 3 insights about the '{cohort_name}' cohort, each with a short \
               title and a one to two sentence description.",
    },
    AgentStage {
        name: "recommendations",
        role: "You are a media strategist who turns insights into campaign advice.",
        task: "Write exactly 4 campaign recommendations for advertisers targeting the \
               '{cohort_name}' cohort, each with a short title and a one to two sentence \
               description. Finish with one sentence on the publisher's competitive advantage \
               for this cohort.",
    },
    AgentStage {
        name: "formatter",
        role: "You are a meticulous editor who converts research notes into strict JSON.",
        task: "Combine the work above for the '{cohort_name}' cohort into a single ```json \
               fenced block with exactly these keys: cohort_definition (string); data_signals \
               (3 objects with title and data_signals, a list of 5 strings); personas (up to 6 \
               objects with title, description, segments and target_profiles, a list of \
               strings); insights (3 objects with title and description); recommendations (4 \
               objects with title and description); competitive_advantage (string). Output \
               nothing but the fenced block.",
    },
];

/// Runs the six agents in order. Every stage sees the cohort, its audience
/// segments and the outputs of all earlier stages; the last stage's output is
/// parsed into the report.
pub struct ReportPipeline<P: AiProvider> {
    service: AiService<P>,
}

impl<P: AiProvider> ReportPipeline<P> {
    pub fn new(service: AiService<P>) -> Self {
        Self { service }
    }
}

fn stage_prompt(
    stage: &AgentStage,
    cohort_name: &str,
    audience_data: &str,
    previous: &[(&'static str, String)],
) -> String {
    let mut prompt = stage.task.replace("{cohort_name}", cohort_name);
    prompt.push_str("\n\nAudience segments (abbreviation -> name and description):\n");
    prompt.push_str(audience_data);

    for (name, output) in previous {
        prompt.push_str(&format!("\n\n### Output of the {} stage\n{}", name, output));
    }
    prompt
}

#[async_trait]
impl<P: AiProvider> ReportGenerator for ReportPipeline<P> {
    async fn generate_report(
        &self,
        cohort_name: &str,
        audiences: &AudienceCatalog,
    ) -> Result<MediaplanReport, ReportError> {
        let audience_data = serde_json::to_string_pretty(audiences)?;
        let mut outputs: Vec<(&'static str, String)> = Vec::with_capacity(STAGES.len());

        for stage in &STAGES {
            tracing::info!(cohort = cohort_name, stage = stage.name, "Running report stage");
            let prompt = stage_prompt(stage, cohort_name, &audience_data, &outputs);
            let output = self.service.complete(stage.role, &prompt).await?;
            outputs.push((stage.name, output));
        }

        let final_report = outputs
            .last()
            .map(|(_, output)| output.as_str())
            .unwrap_or_default();
        MediaplanReport::from_markdown(final_report)
    }
}

#[async_trait]
impl<G: ReportGenerator> ReportGenerator for Option<G> {
    async fn generate_report(
        &self,
        cohort_name: &str,
        audiences: &AudienceCatalog,
    ) -> Result<MediaplanReport, ReportError> {
        match self {
            Some(generator) => generator.generate_report(cohort_name, audiences).await,
            None => Err(ReportError::NotConfigured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ai::models::{AiConfig, AiMessage, AiProviderResponse};
    use crate::core::forecast::AudienceInfo;
    use std::error::Error;
    use std::sync::Mutex;

    /// Answers each call with the stage name, and the formatter with JSON.
    struct ScriptedProvider {
        prompts: Mutex<Vec<Vec<AiMessage>>>,
        formatter_output: String,
    }

    impl ScriptedProvider {
        fn new(formatter_output: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                formatter_output: formatter_output.to_string(),
            }
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        async fn chat_complete(
            &self,
            messages: &[AiMessage],
            _config: &AiConfig,
        ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(messages.to_vec());
            let content = if prompts.len() == STAGES.len() {
                self.formatter_output.clone()
            } else {
                format!("notes from call {}", prompts.len())
            };
            Ok(AiProviderResponse {
                content,
                thinking: None,
            })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl AiProvider for FailingProvider {
        async fn chat_complete(
            &self,
            _messages: &[AiMessage],
            _config: &AiConfig,
        ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
            Err("429 rate limited".into())
        }
    }

    fn audiences() -> AudienceCatalog {
        let mut catalog = AudienceCatalog::new();
        catalog.insert(
            "ckl".to_string(),
            AudienceInfo {
                name: "Cooking Lovers".to_string(),
                description: "Reads recipes weekly".to_string(),
            },
        );
        catalog
    }

    #[tokio::test]
    async fn test_stages_run_in_order_with_context() {
        let provider = ScriptedProvider::new(
            "Here you go:\n```json\n{\"cohort_definition\": \"Home cooks\"}\n```",
        );
        let pipeline = ReportPipeline::new(AiService::new(provider, AiConfig::new("test-model")));

        let report = pipeline
            .generate_report("Food Lovers", &audiences())
            .await
            .unwrap();
        assert_eq!(report.cohort_definition, "Home cooks");

        let prompts = pipeline.service_prompts();
        assert_eq!(prompts.len(), 6);
        assert_eq!(prompts[0][0].content, STAGES[0].role);
        assert!(prompts[0][1].content.contains("'Food Lovers'"));
        assert!(prompts[0][1].content.contains("Cooking Lovers"));
        assert!(!prompts[0][1].content.contains("### Output"));

        let formatter = &prompts[5][1].content;
        assert!(formatter.contains("### Output of the definition stage\nnotes from call 1"));
        assert!(formatter.contains("### Output of the recommendations stage\nnotes from call 5"));
    }

    #[tokio::test]
    async fn test_unparseable_formatter_output_fails() {
        let provider = ScriptedProvider::new("I could not produce JSON, sorry.");
        let pipeline = ReportPipeline::new(AiService::new(provider, AiConfig::new("test-model")));

        let err = pipeline
            .generate_report("Food Lovers", &audiences())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingJson));
    }

    #[tokio::test]
    async fn test_provider_error_stops_pipeline() {
        let pipeline =
            ReportPipeline::new(AiService::new(FailingProvider, AiConfig::new("test-model")));

        let err = pipeline
            .generate_report("Food Lovers", &AudienceCatalog::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Provider(msg) if msg.contains("429")));
    }

    impl ReportPipeline<ScriptedProvider> {
        fn service_prompts(&self) -> Vec<Vec<AiMessage>> {
            self.service.provider().prompts.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn test_missing_generator_reports_not_configured() {
        let generator: Option<ReportPipeline<FailingProvider>> = None;
        let err = generator
            .generate_report("Food Lovers", &audiences())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::NotConfigured));
    }
}
