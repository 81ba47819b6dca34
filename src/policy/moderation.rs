use crate::error::{AppError, AppResult};

/// Substrings that may not appear in a comment, lower-case.
pub const BAD_WORDS: [&str; 2] = ["редиска", "негодяй"];

/// Message returned to the submitter on rejection.
pub const WARNING: &str = "Не ругайтесь!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Rejected { word: &'static str },
}

/// validate_text
///
/// Rejects text that contains any banned word anywhere, regardless of letter case.
pub fn validate_text(text: &str) -> Verdict {
    let lowered = text.to_lowercase();
    BAD_WORDS
        .iter()
        .copied()
        .find(|word| lowered.contains(word))
        .map_or(Verdict::Ok, |word| Verdict::Rejected { word })
}

/// Full comment-form validation: the text is required and must pass the filter.
/// Returns the trimmed text to persist.
pub fn clean_comment_text(text: &str) -> AppResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::validation("text", "This field is required."));
    }
    match validate_text(text) {
        Verdict::Ok => Ok(text.to_string()),
        Verdict::Rejected { word } => {
            tracing::warn!(banned_word = word, "comment rejected by content filter");
            Err(AppError::BannedContent {
                message: WARNING.to_string(),
            })
        }
    }
}
