use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Parser;
use subtitle_platforms::{DownloadOptions, RequestedLanguages, SubtitleFormat};

use crate::config::AppConfig;
use crate::error::{CliError, Result};

#[derive(Parser, Debug)]
#[command(
    name = "subfetch",
    version,
    about = "Download subtitles from Viki movies and series"
)]
pub struct Args {
    /// Movie or series page URL
    pub url: String,

    /// Languages to download, comma separated, or `all`
    #[arg(short = 'l', long = "language")]
    pub languages: Option<String>,

    /// Seasons to download, e.g. `1,3-4`
    #[arg(short, long, value_parser = parse_number_list)]
    pub season: Option<BTreeSet<u32>>,

    /// Episodes to download, e.g. `1-8,10`
    #[arg(short, long, value_parser = parse_number_list)]
    pub episode: Option<BTreeSet<u32>>,

    /// Only download the newest episode of the season
    #[arg(long)]
    pub last_episode: bool,

    /// Download directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Subtitle format: srt or vtt
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<SubtitleFormat>,

    /// Cookie file (Netscape cookies.txt or a Cookie header)
    #[arg(long, env = "SUBFETCH_COOKIES")]
    pub cookies: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn cookies_path(&self, config: &AppConfig) -> PathBuf {
        self.cookies
            .clone()
            .unwrap_or_else(|| config.cookies_path.clone())
    }

    pub fn download_options(&self, config: &AppConfig) -> Result<DownloadOptions> {
        let languages =
            RequestedLanguages::parse(self.languages.as_deref().unwrap_or(&config.languages));
        if !languages.is_all() && languages.codes().is_empty() {
            return Err(CliError::InvalidInput("no language requested".to_string()));
        }

        let download_path = self
            .output
            .clone()
            .unwrap_or_else(|| config.download_path.clone());
        let mut options = DownloadOptions::new(download_path, languages);
        options.subtitle_format = self.format.unwrap_or(config.format);
        options.seasons = self.season.clone().unwrap_or_default();
        options.episodes = self.episode.clone().unwrap_or_default();
        options.last_episode = self.last_episode;
        Ok(options)
    }
}

fn parse_format(value: &str) -> std::result::Result<SubtitleFormat, String> {
    value.parse().map_err(|e: subtitle_platforms::SubtitleError| e.to_string())
}

/// `"1,3-5"` -> `{1, 3, 4, 5}`
pub fn parse_number_list(value: &str) -> std::result::Result<BTreeSet<u32>, String> {
    let mut numbers = BTreeSet::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let parse = |s: &str| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid number `{s}` in `{value}`"))
        };
        match part.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse(start)?, parse(end)?);
                if start > end {
                    return Err(format!("invalid range `{part}`"));
                }
                numbers.extend(start..=end);
            }
            None => {
                numbers.insert(parse(part)?);
            }
        }
    }
    if numbers.is_empty() {
        return Err("expected at least one number".to_string());
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["subfetch", "https://www.viki.com/tv/37350c-show-y"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_number_list() {
        assert_eq!(
            parse_number_list("1,3-5").unwrap(),
            BTreeSet::from([1, 3, 4, 5])
        );
        assert_eq!(parse_number_list(" 2 ").unwrap(), BTreeSet::from([2]));
        assert!(parse_number_list("5-3").is_err());
        assert!(parse_number_list("a").is_err());
        assert!(parse_number_list(",").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let config = AppConfig {
            download_path: PathBuf::from("/from/config"),
            languages: "ko".to_string(),
            ..AppConfig::default()
        };
        let options = args(&["-l", "en,zt", "-s", "2", "-e", "1-3", "-f", "vtt", "-o", "/out"])
            .download_options(&config)
            .unwrap();

        assert_eq!(options.download_path, PathBuf::from("/out"));
        assert!(options.languages.contains("zh-Hant"));
        assert!(!options.languages.contains("ko"));
        assert_eq!(options.subtitle_format, SubtitleFormat::Vtt);
        assert_eq!(options.seasons, BTreeSet::from([2]));
        assert_eq!(options.episodes, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let config = AppConfig {
            download_path: PathBuf::from("/from/config"),
            cookies_path: PathBuf::from("/from/config/cookies.txt"),
            languages: "all".to_string(),
            ..AppConfig::default()
        };
        let parsed = args(&["--last-episode"]);
        let options = parsed.download_options(&config).unwrap();

        assert_eq!(options.download_path, PathBuf::from("/from/config"));
        assert!(options.languages.is_all());
        assert!(options.last_episode);
        assert!(options.seasons.is_empty());
        assert_eq!(
            parsed.cookies_path(&config),
            PathBuf::from("/from/config/cookies.txt")
        );
    }

    #[test]
    fn test_empty_language_list_is_rejected() {
        let result = args(&["-l", ","]).download_options(&AppConfig::default());
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["subfetch", "https://www.viki.com/tv/1c", "-v", "-q"]);
        assert!(result.is_err());
    }
}
