//! Skill-overlap scoring — deterministic set intersection between extracted
//! CV skills and job requirements.

use std::collections::HashSet;

/// Percentage (0–100) of job requirements also present in the CV skills.
///
/// Both lists are case-folded into sets, so the score is invariant under
/// case and list-order permutations. An empty requirement set scores 0
/// rather than dividing by zero. Truncates toward zero.
pub fn skill_match_score(cv_skills: &[String], job_requirements: &[String]) -> u8 {
    let cv: HashSet<String> = cv_skills.iter().map(|s| s.to_lowercase()).collect();
    let requirements: HashSet<String> =
        job_requirements.iter().map(|r| r.to_lowercase()).collect();

    if requirements.is_empty() {
        return 0;
    }

    let matched = requirements.iter().filter(|r| cv.contains(*r)).count();
    ((matched * 100) / requirements.len()) as u8
}
