//! LLM provider capability — the single seam through which the workflow talks
//! to a model backend.
//!
//! ARCHITECTURAL RULE: no other module may call a model API directly. The
//! orchestrator depends only on `dyn LlmProvider`, never on a concrete
//! backend; backends are constructed once at startup from explicit config.
//!
//! No output format is guaranteed by `generate` — callers must parse
//! defensively (see `analysis::parser`).

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub mod gemini;
pub mod ollama;
pub mod prompts;

/// Per-call timeout for judge calls. Extraction and recommendation timeouts
/// live with the steps that own those calls.
const EVALUATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("provider returned empty content")]
    EmptyContent,
}

/// The recommendation under judgment, assembled from workflow state.
#[derive(Debug, Clone, Default)]
pub struct Recommendation {
    pub score_final: Option<u8>,
    pub resumen: Option<String>,
    pub fortalezas: Vec<String>,
    pub debilidades: Vec<String>,
}

/// Polymorphic model-calling capability. Stateless per call — independent
/// workflow runs may invoke one provider concurrently.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    fn model_name(&self) -> &str;

    /// Sends a prompt and returns the raw generated text. A timeout counts
    /// as any other call failure.
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError>;

    /// LLM-as-a-judge: scores the adequacy of a recommendation from 1 to 5.
    /// Non-fatal by contract — any failure yields `None`, never an error.
    async fn evaluate_recommendation(
        &self,
        cv_text: &str,
        job_text: &str,
        recommendation: &Recommendation,
    ) -> Option<u8> {
        let prompt = prompts::evaluation_prompt(cv_text, job_text, recommendation);
        match self.generate(&prompt, EVALUATION_TIMEOUT).await {
            Ok(raw) => parse_judge_score(&raw),
            Err(e) => {
                warn!("Quality evaluation call failed: {e}");
                None
            }
        }
    }
}

/// Extracts the first integer from judge output and clamps it to 1–5.
/// Tolerates surrounding prose ("Respuesta: 4/5" scores 4).
fn parse_judge_score(raw: &str) -> Option<u8> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let value: u64 = digits.parse().ok()?;
    Some(value.clamp(1, 5) as u8)
}
