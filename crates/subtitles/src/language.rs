use std::collections::BTreeSet;

use tracing::warn;

/// Platform codes that differ from the canonical ones used in filenames.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("zt", "zh-Hant"),
    ("zh", "zh-Hans"),
    ("pt", "pt-BR"),
    ("iw", "he"),
    ("in", "id"),
    ("jw", "jv"),
];

pub fn normalize_language_code(raw: &str) -> String {
    let code = raw.trim().to_ascii_lowercase();
    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, canonical)| *alias == code || canonical.eq_ignore_ascii_case(&code))
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(code)
}

/// The set of languages a user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedLanguages {
    all: bool,
    codes: BTreeSet<String>,
}

impl RequestedLanguages {
    pub fn all() -> Self {
        Self {
            all: true,
            codes: BTreeSet::new(),
        }
    }

    pub fn only<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            all: false,
            codes: codes
                .into_iter()
                .map(|c| normalize_language_code(c.as_ref()))
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Parses `"en,zh-Hant"`; `all` anywhere selects every language.
    pub fn parse(input: &str) -> Self {
        let parts: Vec<&str> = input
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.iter().any(|p| p.eq_ignore_ascii_case("all")) {
            Self::all()
        } else {
            Self::only(parts)
        }
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn codes(&self) -> &BTreeSet<String> {
        &self.codes
    }

    pub fn contains(&self, code: &str) -> bool {
        self.all || self.codes.contains(code)
    }
}

/// Warns about every requested language the video does not offer.
pub fn report_missing_languages(
    available: &BTreeSet<String>,
    requested: &RequestedLanguages,
) -> Vec<String> {
    if requested.is_all() {
        return Vec::new();
    }

    let missing: Vec<String> = requested
        .codes()
        .iter()
        .filter(|code| !available.contains(*code))
        .cloned()
        .collect();

    for code in &missing {
        warn!(
            language = %code,
            available = ?available,
            "Subtitle language is not available"
        );
    }
    missing
}
