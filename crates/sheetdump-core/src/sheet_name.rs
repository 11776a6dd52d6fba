//! Output sheet naming.
//!
//! Remote worksheet titles are free text, while xlsx sheet names must be at
//! most 31 characters, must not contain `[ ] : * ? / \`, must not start or
//! end with an apostrophe, must be unique ignoring case and must not be the
//! reserved name `History`. Valid titles pass through untouched; anything
//! else is rewritten by [`SheetNamer`].

use std::collections::HashSet;

/// Maximum length of an xlsx sheet name, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const RESERVED_NAME: &str = "History";

/// Assigns unique, valid output sheet names in document order.
#[derive(Debug, Default)]
pub struct SheetNamer {
    taken: HashSet<String>,
    assigned: usize,
}

impl SheetNamer {
    /// Creates a namer with no names taken yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the output name for the next worksheet titled `title`.
    pub fn assign(&mut self, title: &str) -> String {
        self.assigned += 1;

        let mut base = sanitize(title);
        if base.is_empty() {
            base = format!("Sheet{}", self.assigned);
        } else if base.eq_ignore_ascii_case(RESERVED_NAME) {
            base.push('_');
        }

        let mut name = base.clone();
        let mut n = 2;
        while self.taken.contains(&name.to_lowercase()) {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
            let stem: String = base.chars().take(keep).collect();
            name = format!("{stem}{suffix}");
            n += 1;
        }

        self.taken.insert(name.to_lowercase());
        name
    }
}

/// Applies the character, apostrophe and length rules to a single title.
///
/// Uniqueness and the reserved name are handled by [`SheetNamer`].
pub fn sanitize(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let truncated: String = replaced
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    truncated.trim_end_matches('\'').to_string()
}

/// True when `title` can be used as an xlsx sheet name as-is.
pub fn is_valid(title: &str) -> bool {
    !title.is_empty()
        && !title.eq_ignore_ascii_case(RESERVED_NAME)
        && sanitize(title) == title
}
