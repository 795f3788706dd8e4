use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::error::SubtitleError;

#[inline]
pub fn capture_group_1<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[inline]
pub fn capture_group_1_or_validation<'a>(
    re: &Regex,
    input: &'a str,
    what: &str,
) -> Result<&'a str, SubtitleError> {
    capture_group_1(re, input)
        .ok_or_else(|| SubtitleError::ValidationError(format!("Failed to extract {what}")))
}

const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turns a title into a dot-separated, filesystem-safe name.
///
/// `"Show X.2020"` becomes `"Show.X.2020"`.
pub fn sanitize_filename(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut pending_dot = false;

    for c in input.chars() {
        if INVALID_FILENAME_CHARS.contains(&c) || c.is_control() {
            continue;
        }
        if c.is_whitespace() || c == '.' {
            pending_dot = true;
            continue;
        }
        if pending_dot && !result.is_empty() {
            result.push('.');
        }
        pending_dot = false;
        result.push(c);
    }

    result
}

/// Accepts `3` as well as `"3"`.
pub fn deserialize_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Reads an explicit `null` as the type's default.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Show X.2020"), "Show.X.2020");
        assert_eq!(sanitize_filename("  Show   Y .S02 "), "Show.Y.S02");
        assert_eq!(sanitize_filename("What? A: Story/Part 1"), "What.A.StoryPart.1");
        assert_eq!(sanitize_filename("...dots..."), "dots");
    }

    #[test]
    fn test_capture_group_1() {
        let re = Regex::new(r"id=(\d+)").unwrap();
        assert_eq!(capture_group_1(&re, "a id=42 b"), Some("42"));
        assert!(capture_group_1_or_validation(&re, "none", "id").is_err());
    }

    #[test]
    fn test_number_or_string() {
        #[derive(Deserialize)]
        struct Episode {
            #[serde(deserialize_with = "deserialize_number_or_string")]
            number: u32,
        }

        let a: Episode = serde_json::from_str(r#"{"number": 7}"#).unwrap();
        let b: Episode = serde_json::from_str(r#"{"number": "12"}"#).unwrap();
        assert_eq!(a.number, 7);
        assert_eq!(b.number, 12);
        assert!(serde_json::from_str::<Episode>(r#"{"number": "x"}"#).is_err());
    }
}
