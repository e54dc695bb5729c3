//! Workflow step functions.
//!
//! Each step consumes the cumulative `AnalysisState` and returns a sparse
//! `StateUpdate` with only the fields it changed; the orchestrator merges
//! updates non-destructively. Steps never panic across this boundary:
//! provider and parse failures become recorded errors in the update.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::parser::{parse_structured, ParseError};
use super::prompts;
use super::scoring::skill_match_score;
use super::state::{AnalysisState, StateUpdate};
use crate::llm_provider::{LlmProvider, ProviderError, Recommendation};
use crate::metrics::MetricsSink;

/// Per-call timeout for the extraction prompts.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);
/// Recommendation generation gets longer — slow local inference is common.
const RECOMMENDATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Failure inside a step, recorded into `AnalysisState::error`.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("model response is missing required field `{0}`")]
    MissingField(&'static str),
}

#[derive(Debug, Deserialize)]
struct SkillsPayload {
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RequirementsPayload {
    #[serde(default)]
    requirements: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendationPayload {
    score_final: Option<i64>,
    resumen: Option<String>,
    #[serde(default)]
    fortalezas: Vec<String>,
    #[serde(default)]
    debilidades: Vec<String>,
}

/// Extracts key skills from the CV. The only retry-eligible step: every
/// failed execution counts one attempt, and a successful run clears any
/// previously recorded error.
pub async fn extract_cv_skills(
    state: &AnalysisState,
    provider: &dyn LlmProvider,
    metrics: &dyn MetricsSink,
) -> StateUpdate {
    info!("[extract_cv_skills] extracting CV skills");

    match run_cv_skills(state, provider).await {
        Ok(skills) => {
            metrics.record_metric("cv_skills_count", skills.len() as f64);
            let mut update = StateUpdate {
                cv_skills: Some(skills),
                ..Default::default()
            };
            // This success supersedes any failure recorded by earlier attempts
            if state.error.is_some() {
                update.error = Some(None);
            }
            update
        }
        Err(e) => {
            let message = format!("Error extracting CV skills: {e}");
            warn!("{message}");
            StateUpdate {
                error: Some(Some(message)),
                retry_count: Some(state.retry_count + 1),
                ..Default::default()
            }
        }
    }
}

async fn run_cv_skills(
    state: &AnalysisState,
    provider: &dyn LlmProvider,
) -> Result<Vec<String>, StepError> {
    let prompt = prompts::cv_skills_prompt(&state.cv_text);
    let raw = provider.generate(&prompt, EXTRACTION_TIMEOUT).await?;
    let payload: SkillsPayload = parse_structured(&raw)?;
    Ok(payload.skills)
}

/// Extracts the key requirements from the job description. Failures are
/// recorded but trigger no retry: downstream steps tolerate the absent field.
pub async fn extract_job_requirements(
    state: &AnalysisState,
    provider: &dyn LlmProvider,
    metrics: &dyn MetricsSink,
) -> StateUpdate {
    info!("[extract_job_requirements] extracting job requirements");

    match run_job_requirements(state, provider).await {
        Ok(requirements) => {
            metrics.record_metric("job_requirements_count", requirements.len() as f64);
            StateUpdate {
                job_requirements: Some(requirements),
                ..Default::default()
            }
        }
        Err(e) => {
            let message = format!("Error extracting job requirements: {e}");
            warn!("{message}");
            record_if_new(state, message)
        }
    }
}

async fn run_job_requirements(
    state: &AnalysisState,
    provider: &dyn LlmProvider,
) -> Result<Vec<String>, StepError> {
    let prompt = prompts::job_requirements_prompt(&state.job_text);
    let raw = provider.generate(&prompt, EXTRACTION_TIMEOUT).await?;
    let payload: RequirementsPayload = parse_structured(&raw)?;
    Ok(payload.requirements)
}

/// Deterministic skill-overlap scoring. Pure and total: never fails, even
/// when either extraction step left its list absent.
pub fn calculate_skill_match(state: &AnalysisState, metrics: &dyn MetricsSink) -> StateUpdate {
    info!("[calculate_skill_match] scoring skill overlap");

    let cv_skills = state.cv_skills.as_deref().unwrap_or_default();
    let job_requirements = state.job_requirements.as_deref().unwrap_or_default();

    let score = skill_match_score(cv_skills, job_requirements);
    metrics.record_metric("skill_match_score", score as f64);

    StateUpdate {
        skill_match_score: Some(score),
        ..Default::default()
    }
}

/// Generates the final recommendation from the accumulated context. Bounded
/// text prefixes keep the prompt within model context limits.
pub async fn generate_recommendation(
    state: &AnalysisState,
    provider: &dyn LlmProvider,
    metrics: &dyn MetricsSink,
) -> StateUpdate {
    info!("[generate_recommendation] generating recommendation");

    match run_recommendation(state, provider).await {
        Ok(update) => {
            if let Some(score) = update.score_final {
                metrics.record_metric("score_final", score as f64);
            }
            metrics.record_metric(
                "fortalezas_count",
                update.fortalezas.as_deref().map_or(0, <[String]>::len) as f64,
            );
            metrics.record_metric(
                "debilidades_count",
                update.debilidades.as_deref().map_or(0, <[String]>::len) as f64,
            );
            update
        }
        Err(e) => {
            let message = format!("Error generating recommendation: {e}");
            warn!("{message}");
            record_if_new(state, message)
        }
    }
}

async fn run_recommendation(
    state: &AnalysisState,
    provider: &dyn LlmProvider,
) -> Result<StateUpdate, StepError> {
    let prompt = prompts::recommendation_prompt(
        &state.job_name,
        state.cv_skills.as_deref().unwrap_or_default(),
        state.job_requirements.as_deref().unwrap_or_default(),
        state.skill_match_score.unwrap_or(0),
        &state.cv_text,
        &state.job_text,
    );
    let raw = provider.generate(&prompt, RECOMMENDATION_TIMEOUT).await?;
    let payload: RecommendationPayload = parse_structured(&raw)?;

    let score = payload
        .score_final
        .ok_or(StepError::MissingField("score_final"))?;

    Ok(StateUpdate {
        score_final: Some(score.clamp(0, 100) as u8),
        resumen: payload.resumen,
        fortalezas: Some(payload.fortalezas),
        debilidades: Some(payload.debilidades),
        ..Default::default()
    })
}

/// LLM-as-a-judge scoring of the generated recommendation. Non-fatal by
/// design: any failure leaves `llm_evaluation_score` absent and the workflow
/// proceeds.
pub async fn evaluate_quality(
    state: &AnalysisState,
    provider: &dyn LlmProvider,
    metrics: &dyn MetricsSink,
) -> StateUpdate {
    info!("[evaluate_quality] judging recommendation quality");

    let recommendation = Recommendation {
        score_final: state.score_final,
        resumen: state.resumen.clone(),
        fortalezas: state.fortalezas.clone().unwrap_or_default(),
        debilidades: state.debilidades.clone().unwrap_or_default(),
    };

    match provider
        .evaluate_recommendation(&state.cv_text, &state.job_text, &recommendation)
        .await
    {
        Some(score) => {
            metrics.record_metric("llm_evaluation_score", score as f64);
            StateUpdate {
                llm_evaluation_score: Some(score),
                ..Default::default()
            }
        }
        None => {
            warn!("Quality evaluation unavailable; leaving llm_evaluation_score unset");
            StateUpdate::default()
        }
    }
}

/// Terminal fallback: shapes the degraded response once the retry budget is
/// exhausted.
pub fn handle_error(state: &AnalysisState) -> StateUpdate {
    let reason = state.error.as_deref().unwrap_or("unknown error");
    warn!("[handle_error] returning degraded response: {reason}");

    StateUpdate {
        score_final: Some(0),
        resumen: Some(format!("Error en el análisis: {reason}")),
        fortalezas: Some(Vec::new()),
        debilidades: Some(vec!["Error en el procesamiento".to_string()]),
        ..Default::default()
    }
}

/// Records the error only when it differs from the one already in state —
/// re-observing the same failure leaves the state untouched.
fn record_if_new(state: &AnalysisState, message: String) -> StateUpdate {
    if state.error.as_deref() == Some(message.as_str()) {
        StateUpdate::default()
    } else {
        StateUpdate {
            error: Some(Some(message)),
            ..Default::default()
        }
    }
}
