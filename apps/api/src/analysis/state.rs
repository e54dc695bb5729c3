//! Workflow state and the final response shape.

use serde::{Deserialize, Serialize};

/// The single mutable record threaded through one workflow run.
///
/// Optional fields are absent in the initial state and become present only
/// after their producing step completes successfully. The state is owned by
/// exactly one run, is never shared across concurrent runs, and is discarded
/// once the final `ComparisonResult` is extracted.
#[derive(Debug, Clone)]
pub struct AnalysisState {
    // Immutable inputs
    pub cv_text: String,
    pub job_text: String,
    pub job_name: String,
    pub cv_filename: String,

    // Intermediate results
    pub cv_skills: Option<Vec<String>>,
    pub job_requirements: Option<Vec<String>>,
    pub skill_match_score: Option<u8>,

    // Final results
    pub score_final: Option<u8>,
    pub resumen: Option<String>,
    pub fortalezas: Option<Vec<String>>,
    pub debilidades: Option<Vec<String>>,
    pub llm_evaluation_score: Option<u8>,

    // Failure tracking
    pub error: Option<String>,
    pub retry_count: u32,
}

/// Sparse update returned by a step: only the fields the step changed.
/// Never a full replacement — the orchestrator merges non-destructively.
///
/// `error` is doubly optional: `None` leaves the recorded error untouched,
/// `Some(None)` clears it, `Some(Some(_))` overwrites it.
#[derive(Debug, Default)]
pub struct StateUpdate {
    pub cv_skills: Option<Vec<String>>,
    pub job_requirements: Option<Vec<String>>,
    pub skill_match_score: Option<u8>,
    pub score_final: Option<u8>,
    pub resumen: Option<String>,
    pub fortalezas: Option<Vec<String>>,
    pub debilidades: Option<Vec<String>>,
    pub llm_evaluation_score: Option<u8>,
    pub error: Option<Option<String>>,
    pub retry_count: Option<u32>,
}

impl AnalysisState {
    pub fn new(cv_text: String, job_text: String, job_name: String, cv_filename: String) -> Self {
        Self {
            cv_text,
            job_text,
            job_name,
            cv_filename,
            cv_skills: None,
            job_requirements: None,
            skill_match_score: None,
            score_final: None,
            resumen: None,
            fortalezas: None,
            debilidades: None,
            llm_evaluation_score: None,
            error: None,
            retry_count: 0,
        }
    }

    /// Overlays a partial update onto the cumulative state. Fields absent
    /// from the update are left untouched; present fields (including an
    /// explicit error clear) overwrite.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(v) = update.cv_skills {
            self.cv_skills = Some(v);
        }
        if let Some(v) = update.job_requirements {
            self.job_requirements = Some(v);
        }
        if let Some(v) = update.skill_match_score {
            self.skill_match_score = Some(v);
        }
        if let Some(v) = update.score_final {
            self.score_final = Some(v);
        }
        if let Some(v) = update.resumen {
            self.resumen = Some(v);
        }
        if let Some(v) = update.fortalezas {
            self.fortalezas = Some(v);
        }
        if let Some(v) = update.debilidades {
            self.debilidades = Some(v);
        }
        if let Some(v) = update.llm_evaluation_score {
            self.llm_evaluation_score = Some(v);
        }
        if let Some(v) = update.error {
            self.error = v;
        }
        if let Some(v) = update.retry_count {
            self.retry_count = v;
        }
    }

    /// Final assembly once the workflow reaches its terminal state.
    pub fn into_result(self, execution_time_ms: u64) -> ComparisonResult {
        ComparisonResult {
            score_final: self.score_final,
            resumen: self.resumen,
            fortalezas: self.fortalezas.unwrap_or_default(),
            debilidades: self.debilidades.unwrap_or_default(),
            llm_evaluation_score: self.llm_evaluation_score,
            metadata: AnalysisMetadata {
                cv_skills: self.cv_skills.unwrap_or_default(),
                job_requirements: self.job_requirements.unwrap_or_default(),
                skill_match_score: self.skill_match_score,
                execution_time_ms,
            },
        }
    }
}

/// Final response of one analysis run. Degraded runs keep exactly this shape
/// (score 0, explanatory resumen) — callers never see a structurally
/// different reply on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub score_final: Option<u8>,
    pub resumen: Option<String>,
    pub fortalezas: Vec<String>,
    pub debilidades: Vec<String>,
    pub llm_evaluation_score: Option<u8>,
    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub cv_skills: Vec<String>,
    pub job_requirements: Vec<String>,
    pub skill_match_score: Option<u8>,
    pub execution_time_ms: u64,
}
