use crate::{
    error::{AppError, AppResult},
    repository::Repository,
};

/// Column width of `notes.slug`.
pub const SLUG_MAX_LENGTH: usize = 100;

/// Appended to the conflicting slug in the duplicate error.
pub const DUPLICATE_SLUG_WARNING: &str =
    " - такой slug уже существует, придумайте уникальное значение!";

/// slugify
///
/// Deterministic title -> slug transform:
/// lower-case, `&` spelled out as `and`, Cyrillic transliterated to ASCII, anything
/// else dropped. Runs of whitespace and dashes between words become a single `-`;
/// leading and trailing ones vanish. Truncated to [`SLUG_MAX_LENGTH`] characters.
pub fn slugify(title: &str) -> String {
    let lowered = title
        .to_lowercase()
        .replace("&amp;", " and ")
        .replace('&', " and ");

    let mut slug = String::with_capacity(lowered.len());
    let mut separator_pending = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() || matches!(ch, '-' | '–' | '—') {
            separator_pending = true;
            continue;
        }

        let mut buf = [0u8; 4];
        let piece: &str = if ch.is_ascii_alphanumeric() || ch == '_' {
            ch.encode_utf8(&mut buf)
        } else if let Some(latin) = transliterate(ch) {
            latin
        } else {
            continue;
        };

        if piece.is_empty() {
            continue;
        }
        if separator_pending && !slug.is_empty() {
            slug.push('-');
        }
        separator_pending = false;
        slug.push_str(piece);
    }

    let truncated: String = slug.chars().take(SLUG_MAX_LENGTH).collect();
    truncated.trim_end_matches('-').to_string()
}

// Hard and soft signs have no Latin counterpart and vanish.
fn transliterate(ch: char) -> Option<&'static str> {
    let latin = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        'є' => "ye",
        'і' => "i",
        'ї' => "yi",
        'ґ' => "g",
        _ => return None,
    };
    Some(latin)
}

/// True for non-empty ASCII `[A-Za-z0-9_-]` strings that fit the column.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.chars().count() <= SLUG_MAX_LENGTH
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// The error returned when `slug` is already used by another note.
pub fn duplicate_slug(slug: &str) -> AppError {
    AppError::DuplicateSlug {
        slug: slug.to_string(),
        message: format!("{}{}", slug, DUPLICATE_SLUG_WARNING),
    }
}

/// candidate_slug
///
/// The slug a submission asks for, before the uniqueness check: a non-blank explicit
/// slug verbatim, otherwise the slugified title.
pub fn candidate_slug(title: &str, explicit: Option<&str>) -> AppResult<String> {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) if is_valid_slug(slug) => Ok(slug.to_string()),
        Some(_) => Err(AppError::validation(
            "slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        )),
        None => {
            let derived = slugify(title);
            if derived.is_empty() {
                return Err(AppError::validation(
                    "slug",
                    "Could not derive a slug from the title; provide one explicitly.",
                ));
            }
            Ok(derived)
        }
    }
}

/// assign_slug
///
/// Picks the slug for a note and rejects it if any other note already uses it.
/// `editing` is the id of the note being updated, which may keep its own slug.
pub async fn assign_slug(
    repo: &dyn Repository,
    title: &str,
    explicit: Option<&str>,
    editing: Option<i64>,
) -> AppResult<String> {
    let slug = candidate_slug(title, explicit)?;
    if repo.slug_taken(&slug, editing).await? {
        return Err(duplicate_slug(&slug));
    }
    Ok(slug)
}
