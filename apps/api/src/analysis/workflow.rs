//! Workflow orchestrator — an explicit state machine over the fixed analysis
//! topology.
//!
//! ExtractCvSkills → ExtractJobRequirements → CalculateSkillMatch →
//! GenerateRecommendation → EvaluateQuality → Done, with one conditional
//! branch out of ExtractCvSkills: re-enter it while the retry budget lasts,
//! otherwise jump to the HandleError terminal path. The topology is small and
//! fixed, so no graph library is involved; the transition table is a match.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::state::{AnalysisState, ComparisonResult};
use super::steps;
use crate::llm_provider::LlmProvider;
use crate::metrics::MetricsSink;

/// Retry budget for the CV-skill extraction step.
const MAX_RETRIES: u32 = 3;

/// Nodes of the analysis state machine. `Done` is the only state with no
/// outgoing transition; `HandleError` reaches it after shaping the degraded
/// response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkflowState {
    ExtractCvSkills,
    ExtractJobRequirements,
    CalculateSkillMatch,
    GenerateRecommendation,
    EvaluateQuality,
    HandleError,
    Done,
}

/// Drives one analysis run per call. Holds the provider and metrics sink;
/// each run owns its `AnalysisState` exclusively, so concurrent `analyze`
/// calls need no synchronization.
pub struct AnalysisWorkflow {
    provider: Arc<dyn LlmProvider>,
    metrics: Arc<dyn MetricsSink>,
}

impl AnalysisWorkflow {
    pub fn new(provider: Arc<dyn LlmProvider>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { provider, metrics }
    }

    /// Runs the complete analysis workflow.
    ///
    /// Always returns a structurally valid `ComparisonResult` — catastrophic
    /// failure is absorbed into the degraded terminal path, never raised.
    pub async fn analyze(
        &self,
        cv_text: String,
        job_text: String,
        job_name: String,
        cv_filename: String,
    ) -> ComparisonResult {
        info!("Starting CV analysis: cv={cv_filename} job={job_name}");
        let started = Instant::now();

        self.metrics.set_tag("llm_provider", self.provider.provider_name());
        self.metrics.set_tag("llm_model", self.provider.model_name());
        self.metrics.set_tag("job_name", &job_name);
        self.metrics.set_tag("cv_filename", &cv_filename);

        let mut state = AnalysisState::new(cv_text, job_text, job_name, cv_filename);
        let provider = self.provider.as_ref();
        let metrics = self.metrics.as_ref();

        let mut current = WorkflowState::ExtractCvSkills;
        while current != WorkflowState::Done {
            current = match current {
                WorkflowState::ExtractCvSkills => {
                    state.apply(steps::extract_cv_skills(&state, provider, metrics).await);
                    after_cv_extraction(&state)
                }
                WorkflowState::ExtractJobRequirements => {
                    state.apply(steps::extract_job_requirements(&state, provider, metrics).await);
                    WorkflowState::CalculateSkillMatch
                }
                WorkflowState::CalculateSkillMatch => {
                    state.apply(steps::calculate_skill_match(&state, metrics));
                    WorkflowState::GenerateRecommendation
                }
                WorkflowState::GenerateRecommendation => {
                    state.apply(steps::generate_recommendation(&state, provider, metrics).await);
                    WorkflowState::EvaluateQuality
                }
                // Quality evaluation is non-fatal; it always reaches Done
                WorkflowState::EvaluateQuality => {
                    state.apply(steps::evaluate_quality(&state, provider, metrics).await);
                    WorkflowState::Done
                }
                WorkflowState::HandleError => {
                    state.apply(steps::handle_error(&state));
                    WorkflowState::Done
                }
                WorkflowState::Done => unreachable!("Done has no outgoing transition"),
            };
        }

        let execution_time_ms = started.elapsed().as_millis() as u64;
        self.metrics
            .record_metric("total_execution_time_ms", execution_time_ms as f64);

        info!(
            "Analysis complete in {execution_time_ms}ms: score_final={:?} skill_match={:?}",
            state.score_final, state.skill_match_score
        );

        state.into_result(execution_time_ms)
    }
}

/// Conditional edge evaluated after each CV-skill extraction attempt.
fn after_cv_extraction(state: &AnalysisState) -> WorkflowState {
    match &state.error {
        None => WorkflowState::ExtractJobRequirements,
        Some(err) if state.retry_count < MAX_RETRIES => {
            warn!(
                "Retry attempt {}/{MAX_RETRIES} due to: {err}",
                state.retry_count
            );
            WorkflowState::ExtractCvSkills
        }
        Some(err) => {
            error!("Max retries reached. Last error: {err}");
            WorkflowState::HandleError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_provider::testing::ScriptedProvider;
    use crate::llm_provider::ProviderError;
    use crate::metrics::NoopMetricsSink;

    const SKILLS_JSON: &str = r#"{"skills": ["Python", "SQL", "Docker"]}"#;
    const REQUIREMENTS_JSON: &str = r#"{"requirements": ["Python", "AWS"]}"#;
    const RECOMMENDATION_JSON: &str = r#"{
        "score_final": 75,
        "resumen": "Buen encaje técnico para el puesto",
        "fortalezas": ["Python sólido", "Experiencia con SQL"],
        "debilidades": ["Sin experiencia AWS"]
    }"#;

    fn workflow_over(script: Vec<Result<String, ProviderError>>) -> (AnalysisWorkflow, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(script));
        let workflow = AnalysisWorkflow::new(provider.clone(), Arc::new(NoopMetricsSink));
        (workflow, provider)
    }

    async fn run(workflow: &AnalysisWorkflow) -> crate::analysis::state::ComparisonResult {
        workflow
            .analyze(
                "Experience in Python, SQL and Docker".to_string(),
                "Looking for a profile with Python and AWS".to_string(),
                "Backend Developer".to_string(),
                "cv_test.pdf".to_string(),
            )
            .await
    }

    #[tokio::test]
    async fn test_full_workflow_success() {
        let (workflow, provider) = workflow_over(vec![
            ScriptedProvider::ok(SKILLS_JSON),
            ScriptedProvider::ok(REQUIREMENTS_JSON),
            ScriptedProvider::ok(RECOMMENDATION_JSON),
            ScriptedProvider::ok("4"),
        ]);

        let result = run(&workflow).await;

        assert_eq!(result.score_final, Some(75));
        assert!(result.resumen.unwrap().contains("Buen encaje"));
        assert_eq!(result.llm_evaluation_score, Some(4));
        assert!(result.metadata.cv_skills.contains(&"Python".to_string()));
        assert!(result
            .metadata
            .job_requirements
            .contains(&"AWS".to_string()));
        assert_eq!(result.metadata.skill_match_score, Some(50));
        // skills + requirements + recommendation + judge
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_retry_budget_exhausted_routes_to_handle_error() {
        let provider = Arc::new(ScriptedProvider::always_failing("model unavailable"));
        let workflow = AnalysisWorkflow::new(provider.clone(), Arc::new(NoopMetricsSink));

        let result = run(&workflow).await;

        assert_eq!(result.score_final, Some(0));
        assert!(result.fortalezas.is_empty());
        assert_eq!(result.debilidades, vec!["Error en el procesamiento"]);
        let resumen = result.resumen.unwrap();
        assert!(resumen.contains("Error en el análisis"));
        assert!(resumen.contains("model unavailable"));
        assert!(result.llm_evaluation_score.is_none());
        // One attempt per retry budget slot, then straight to HandleError
        assert_eq!(provider.calls(), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_retry_then_success_clears_error() {
        let (workflow, provider) = workflow_over(vec![
            ScriptedProvider::err("transient failure"),
            ScriptedProvider::err("transient failure"),
            ScriptedProvider::ok(SKILLS_JSON),
            ScriptedProvider::ok(REQUIREMENTS_JSON),
            ScriptedProvider::ok(RECOMMENDATION_JSON),
            ScriptedProvider::ok("5"),
        ]);

        let result = run(&workflow).await;

        assert_eq!(result.score_final, Some(75));
        assert_eq!(result.llm_evaluation_score, Some(5));
        assert_eq!(result.metadata.skill_match_score, Some(50));
        assert_eq!(provider.calls(), 6);
    }

    #[tokio::test]
    async fn test_evaluation_failure_is_non_fatal() {
        let (workflow, _provider) = workflow_over(vec![
            ScriptedProvider::ok(SKILLS_JSON),
            ScriptedProvider::ok(REQUIREMENTS_JSON),
            ScriptedProvider::ok(RECOMMENDATION_JSON),
            ScriptedProvider::err("judge down"),
        ]);

        let result = run(&workflow).await;

        assert!(result.llm_evaluation_score.is_none());
        assert_eq!(result.score_final, Some(75));
        assert_eq!(result.metadata.skill_match_score, Some(50));
        assert!(!result.debilidades.is_empty());
    }

    #[tokio::test]
    async fn test_requirements_failure_neither_retries_nor_aborts() {
        let (workflow, provider) = workflow_over(vec![
            ScriptedProvider::ok(SKILLS_JSON),
            ScriptedProvider::err("requirements extraction failed"),
            ScriptedProvider::ok(RECOMMENDATION_JSON),
            ScriptedProvider::ok("3"),
        ]);

        let result = run(&workflow).await;

        // No requirements extracted: overlap defined as 0, workflow continues
        assert!(result.metadata.job_requirements.is_empty());
        assert_eq!(result.metadata.skill_match_score, Some(0));
        assert_eq!(result.score_final, Some(75));
        assert_eq!(result.llm_evaluation_score, Some(3));
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_fenced_model_output_is_tolerated() {
        let fenced_skills = "```json\n{\"skills\": [\"Python\", \"SQL\", \"Docker\"]}\n```";
        let (workflow, _provider) = workflow_over(vec![
            ScriptedProvider::ok(fenced_skills),
            ScriptedProvider::ok(REQUIREMENTS_JSON),
            ScriptedProvider::ok(RECOMMENDATION_JSON),
            ScriptedProvider::ok("4"),
        ]);

        let result = run(&workflow).await;

        assert_eq!(result.metadata.cv_skills.len(), 3);
        assert_eq!(result.metadata.skill_match_score, Some(50));
    }

    #[tokio::test]
    async fn test_recommendation_failure_degrades_result_shape_only() {
        let (workflow, _provider) = workflow_over(vec![
            ScriptedProvider::ok(SKILLS_JSON),
            ScriptedProvider::ok(REQUIREMENTS_JSON),
            ScriptedProvider::err("generation failed"),
            ScriptedProvider::ok("2"),
        ]);

        let result = run(&workflow).await;

        // Recommendation fields stay absent, but the shape is intact and the
        // deterministic metadata still reaches the caller
        assert!(result.score_final.is_none());
        assert!(result.resumen.is_none());
        assert_eq!(result.metadata.skill_match_score, Some(50));
        assert_eq!(result.metadata.cv_skills.len(), 3);
    }
}
