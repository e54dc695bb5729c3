//! Judge prompt shared by every provider backend.

use super::Recommendation;

/// Builds the LLM-as-a-judge prompt. The reply is expected to be a bare
/// integer from 1 to 5, but the caller tolerates surrounding prose.
pub fn evaluation_prompt(
    cv_text: &str,
    job_text: &str,
    recommendation: &Recommendation,
) -> String {
    format!(
        "Evalúa si la recomendación generada es adecuada para el puesto.\n\
         \n\
         CV:\n{cv}\n\
         \n\
         JOB:\n{job}\n\
         \n\
         RECOMENDACIÓN:\n\
         Score: {score}\n\
         Resumen: {resumen}\n\
         Fortalezas: {fortalezas}\n\
         Debilidades: {debilidades}\n\
         \n\
         Responde SOLO un número entero del 1 al 5:\n\
         1 = Muy mala\n\
         5 = Excelente",
        cv = cv_text,
        job = job_text,
        score = recommendation
            .score_final
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        resumen = recommendation.resumen.as_deref().unwrap_or("N/A"),
        fortalezas = recommendation.fortalezas.join(", "),
        debilidades = recommendation.debilidades.join(", "),
    )
}
