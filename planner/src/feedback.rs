//! Retry prompt builders.

use crate::config::FeedbackMode;

/// A diagnostic together with the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Ordinal of the failed attempt.
    pub attempt: usize,
    /// Validator message.
    pub message: String,
}

/// Build the prompt for the next retry.
///
/// With a continued conversation and [`FeedbackMode::Latest`] the prompt is
/// exactly the newest diagnostic. [`FeedbackMode::Cumulative`] lists every
/// diagnostic, labelled by attempt. Without a continued conversation the
/// model has not seen the query, so it is restated first.
///
/// # Examples
///
/// ```
/// use mission_planner::feedback::{build_retry_prompt, Diagnostic};
/// use mission_planner::FeedbackMode;
///
/// let history = vec![Diagnostic { attempt: 0, message: "missing <task>".into() }];
/// let prompt = build_retry_prompt("plan", &history, FeedbackMode::Latest, true);
/// assert_eq!(prompt, "missing <task>");
/// ```
#[must_use]
pub fn build_retry_prompt(
    query: &str,
    history: &[Diagnostic],
    mode: FeedbackMode,
    continued: bool,
) -> String {
    let Some(latest) = history.last() else {
        return query.to_string();
    };

    let feedback = match mode {
        FeedbackMode::Latest => latest.message.clone(),
        FeedbackMode::Cumulative => {
            let mut text = String::from("Validation errors so far:\n");
            for diagnostic in history {
                text.push_str("  - Attempt ");
                text.push_str(&diagnostic.attempt.to_string());
                text.push_str(": ");
                text.push_str(&diagnostic.message);
                text.push('\n');
            }
            text.push_str("\nPlease fix all errors and answer again with the complete document.");
            text
        }
    };

    if continued {
        feedback
    } else {
        format!(
            "{query}\n\nA previous answer to this request failed validation:\n{feedback}"
        )
    }
}
