//! Cookie-based credential store.
//!
//! Cookies are exported from a logged-in browser session either as a
//! Netscape `cookies.txt` file or as a raw `Cookie` header string.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::error::SubtitleError;

#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
    cookies: FxHashMap<String, String>,
}

impl CookieStore {
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, SubtitleError> {
        let path = path.into();
        let content = tokio::fs::read_to_string(&path).await?;
        let cookies = parse_cookies(&content);
        debug!(path = %path.display(), count = cookies.len(), "Loaded cookies");
        Ok(Self { path, cookies })
    }

    pub fn from_parts(path: impl Into<PathBuf>, cookies: FxHashMap<String, String>) -> Self {
        Self {
            path: path.into(),
            cookies,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cookies(&self) -> &FxHashMap<String, String> {
        &self.cookies
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn require(&self, name: &str) -> Result<&str, SubtitleError> {
        self.get(name)
            .ok_or_else(|| SubtitleError::MissingCookie(name.to_string()))
    }

    /// Deletes the backing cookie file once the platform rejected it.
    pub async fn invalidate(&self) -> Result<(), SubtitleError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "Removed expired cookies");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub fn parse_cookies(content: &str) -> FxHashMap<String, String> {
    let mut cookies = FxHashMap::default();

    let is_netscape = content
        .lines()
        .any(|line| line.split('\t').count() >= 7);

    if is_netscape {
        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                continue;
            }
            let (name, value) = (fields[5].trim(), fields[6].trim());
            if !name.is_empty() {
                cookies.insert(name.to_owned(), value.to_owned());
            }
        }
        return cookies;
    }

    for part in content.split(&[';', '\n'][..]).map(str::trim) {
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            continue;
        }
        cookies.insert(name.to_owned(), value.to_owned());
    }
    cookies
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_netscape_cookies() {
        let content = "# Netscape HTTP Cookie File\n\
            .viki.com\tTRUE\t/\tTRUE\t1999999999\tsession__id\tabc123\n\
            #HttpOnly_.viki.com\tTRUE\t/\tTRUE\t1999999999\tdevice_id\t42d\n";
        let cookies = parse_cookies(content);
        assert_eq!(cookies.get("session__id").unwrap(), "abc123");
        assert_eq!(cookies.get("device_id").unwrap(), "42d");
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn test_parse_header_string() {
        let cookies = parse_cookies("session__id=abc; device_id=xyz; empty=");
        assert_eq!(cookies.get("session__id").unwrap(), "abc");
        assert_eq!(cookies.get("device_id").unwrap(), "xyz");
        assert!(!cookies.contains_key("empty"));
    }

    #[tokio::test]
    async fn test_invalidate_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("viki.txt");
        tokio::fs::write(&path, "session__id=abc").await.unwrap();

        let store = CookieStore::load(&path).await.unwrap();
        assert_eq!(store.require("session__id").unwrap(), "abc");
        assert!(matches!(
            store.require("device_id"),
            Err(SubtitleError::MissingCookie(_))
        ));

        store.invalidate().await.unwrap();
        assert!(!path.exists());
        // Second call finds nothing to delete.
        store.invalidate().await.unwrap();
    }
}
