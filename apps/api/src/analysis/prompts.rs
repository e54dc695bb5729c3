//! Prompt construction for the analysis steps.
//!
//! Source texts are truncated to bounded character prefixes before prompting
//! to respect model context limits. Every prompt asks for a single JSON
//! object; the response parser tolerates fences and surrounding prose anyway.

use super::truncate_chars;

/// Longest CV/job prefix quoted in the extraction prompts.
const EXTRACTION_TEXT_LIMIT: usize = 3000;
/// Longest CV/job prefix quoted in the recommendation prompt.
const RECOMMENDATION_TEXT_LIMIT: usize = 4000;
/// How many extracted skills/requirements are echoed back as context.
const CONTEXT_LIST_LIMIT: usize = 10;

pub fn cv_skills_prompt(cv_text: &str) -> String {
    format!(
        "Analiza el siguiente CV y extrae las habilidades técnicas y profesionales clave.\n\
         Devuelve SOLO un JSON con esta estructura:\n\
         {{\n  \"skills\": [\"skill1\", \"skill2\", ...]\n}}\n\
         \n\
         CV:\n{}",
        truncate_chars(cv_text, EXTRACTION_TEXT_LIMIT)
    )
}

pub fn job_requirements_prompt(job_text: &str) -> String {
    format!(
        "Analiza la siguiente descripción de trabajo y extrae los requisitos clave.\n\
         Devuelve SOLO un JSON con esta estructura:\n\
         {{\n  \"requirements\": [\"req1\", \"req2\", ...]\n}}\n\
         \n\
         JOB:\n{}",
        truncate_chars(job_text, EXTRACTION_TEXT_LIMIT)
    )
}

pub fn recommendation_prompt(
    job_name: &str,
    cv_skills: &[String],
    job_requirements: &[String],
    skill_match_score: u8,
    cv_text: &str,
    job_text: &str,
) -> String {
    format!(
        "Eres un experto en selección de personal. Evalúa este CV contra el puesto: {job_name}\n\
         \n\
         CONTEXTO ADICIONAL:\n\
         - Skills del CV: {skills}\n\
         - Requisitos del puesto: {requirements}\n\
         - Match de skills calculado: {skill_match_score}%\n\
         \n\
         Devuelve SOLO este JSON:\n\
         {{\n  \"score_final\": 0-100,\n  \"resumen\": \"texto descriptivo\",\n  \"fortalezas\": [\"fortaleza 1\", \"fortaleza 2\"],\n  \"debilidades\": [\"debilidad 1\", \"debilidad 2\"]\n}}\n\
         \n\
         CV:\n{cv}\n\
         \n\
         JOB:\n{job}",
        skills = join_limited(cv_skills),
        requirements = join_limited(job_requirements),
        cv = truncate_chars(cv_text, RECOMMENDATION_TEXT_LIMIT),
        job = truncate_chars(job_text, RECOMMENDATION_TEXT_LIMIT),
    )
}

fn join_limited(items: &[String]) -> String {
    items
        .iter()
        .take(CONTEXT_LIST_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cv_skills_prompt_names_the_array_key() {
        let prompt = cv_skills_prompt("Python y SQL");
        assert!(prompt.contains("\"skills\""));
        assert!(prompt.contains("Python y SQL"));
    }

    #[test]
    fn test_job_requirements_prompt_names_the_array_key() {
        let prompt = job_requirements_prompt("Se requiere Python");
        assert!(prompt.contains("\"requirements\""));
    }

    #[test]
    fn test_extraction_prompt_truncates_long_text() {
        let long = "a".repeat(EXTRACTION_TEXT_LIMIT + 500);
        let prompt = cv_skills_prompt(&long);
        assert!(!prompt.contains(&"a".repeat(EXTRACTION_TEXT_LIMIT + 1)));
        assert!(prompt.contains(&"a".repeat(EXTRACTION_TEXT_LIMIT)));
    }

    #[test]
    fn test_recommendation_prompt_carries_context() {
        let skills = vec!["Python".to_string(), "SQL".to_string()];
        let requirements = vec!["Python".to_string(), "AWS".to_string()];
        let prompt =
            recommendation_prompt("Backend Developer", &skills, &requirements, 50, "cv", "job");
        assert!(prompt.contains("Backend Developer"));
        assert!(prompt.contains("Python, SQL"));
        assert!(prompt.contains("50%"));
        assert!(prompt.contains("\"score_final\""));
    }

    #[test]
    fn test_recommendation_prompt_limits_context_lists() {
        let skills: Vec<String> = (0..20).map(|i| format!("skill{i}")).collect();
        let prompt = recommendation_prompt("Puesto", &skills, &[], 0, "cv", "job");
        assert!(prompt.contains("skill9"));
        assert!(!prompt.contains("skill10"));
    }
}
