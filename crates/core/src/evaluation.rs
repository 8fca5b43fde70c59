//! Evaluation domain rules: score bounds and the deletion window.

use crate::types::Timestamp;

/// Inclusive score bounds for an evaluation.
pub const SCORE_MIN: i16 = 0;
pub const SCORE_MAX: i16 = 100;

/// How long after creation an evaluator may delete their own evaluation.
pub const DELETE_WINDOW_HOURS: i64 = 24;

/// Validate that a score lies in `[SCORE_MIN, SCORE_MAX]`.
pub fn validate_score(score: i16) -> Result<(), String> {
    if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return Err(format!(
            "Score must be between {SCORE_MIN} and {SCORE_MAX}, got {score}"
        ));
    }
    Ok(())
}

/// Whether `now` is still within the evaluator's deletion window.
pub fn within_delete_window(created_at: Timestamp, now: Timestamp) -> bool {
    now - created_at <= chrono::Duration::hours(DELETE_WINDOW_HOURS)
}

/// Build the personnel-confirmation string stored on each evaluation
/// (evaluator name plus affiliation, when known).
pub fn personnel_confirmation(full_name: &str, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if !unit.is_empty() => format!("{full_name} ({unit})"),
        _ => full_name.to_string(),
    }
}
