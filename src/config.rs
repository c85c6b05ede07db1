use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::*;
use crate::display::layout::{LayoutConstraints, Orientation, PanelSpec, Rotation};
use crate::poller::Timing;
use crate::service::TimeRange;
use crate::spotify::{Credentials, SpotifySettings};

/// Environment variables consulted for secrets (between YAML and CLI).
pub const ENV_CLIENT_ID: &str = "NOWINK_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "NOWINK_CLIENT_SECRET";
pub const ENV_REFRESH_TOKEN: &str = "NOWINK_REFRESH_TOKEN";
pub const ENV_ACCESS_TOKEN: &str = "NOWINK_ACCESS_TOKEN";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Every field is optional so files, the
/// environment and the command line can be layered; accessors below
/// fill in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub panel: Option<PanelConfig>,
    pub layout: Option<LayoutConfig>,
    pub timing: Option<TimingConfig>,
    pub spotify: Option<SpotifyConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PanelConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub orientation: Option<Rotation>,
    pub flip_180: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LayoutConfig {
    /// The one knob: nominal album art side in pixels
    pub album_art_side: Option<u32>,
    pub min_bar_height: Option<u32>,
    pub min_column_width: Option<u32>,
    pub column_margin: Option<u32>,
}

/// Intervals in seconds unless the name says otherwise
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimingConfig {
    pub idle_secs: Option<u64>,
    pub poll_active: Option<u64>,
    pub poll_idle: Option<u64>,
    pub debounce_ms: Option<u64>,
    pub top_cache_ttl: Option<u64>,
    pub idle_refresh_secs: Option<u64>,
    pub error_backoff: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    /// Static bearer token, used instead of the refresh grant
    pub access_token: Option<String>,
    pub top_limit: Option<u32>,
    pub top_time_range: Option<TimeRange>,
    pub api_base: Option<String>,
    pub accounts_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    pub sink: Option<SinkKind>,
    /// Frame file for the ppm sink
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Ppm,
    None,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "nowink", about = "Now playing on an e-paper panel", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub panel_width: Option<u32>,
    #[arg(long)]
    pub panel_height: Option<u32>,
    #[arg(long, value_parser = parse_rotation)]
    pub orientation: Option<Rotation>,
    #[arg(long, action = ArgAction::Set)]
    pub flip_180: Option<bool>,
    #[arg(long)]
    pub album_art_side: Option<u32>,
    #[arg(long, value_enum)]
    pub sink: Option<SinkKind>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub output_path: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_rotation(s: &str) -> Result<Rotation, String> {
    match s.to_ascii_lowercase().as_str() {
        "landscape" => Ok(Rotation::Landscape),
        "portrait" => Ok(Rotation::Portrait),
        other => Err(format!("orientation must be landscape|portrait, got '{}'", other)),
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_from(&cli, |k| std::env::var(k).ok())?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Layer defaults, YAML, environment and `cli`, then validate.
pub fn load_from<F>(cli: &Cli, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) secrets from the environment
    apply_env_overrides(&mut cfg, env);

    // 4) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 5) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/nowink/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/nowink/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/nowink.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["nowink.yaml", "config.yaml", "config/nowink.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Overwrite `dst` when `src` carries a value.
fn set<T>(dst: &mut Option<T>, src: Option<T>) {
    if src.is_some() { *dst = src; }
}

/// Merge one optional group, creating it on first use.
fn merge_group<T, F>(dst: &mut Option<T>, src: Option<T>, f: F)
where
    F: FnOnce(&mut T, T),
{
    match (dst.as_mut(), src) {
        (None, Some(s)) => *dst = Some(s),
        (Some(d), Some(s)) => f(d, s),
        _ => {}
    }
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    set(&mut dst.log_level, src.log_level);
    merge_group(&mut dst.panel, src.panel, |d, s| {
        set(&mut d.width, s.width);
        set(&mut d.height, s.height);
        set(&mut d.orientation, s.orientation);
        set(&mut d.flip_180, s.flip_180);
    });
    merge_group(&mut dst.layout, src.layout, |d, s| {
        set(&mut d.album_art_side, s.album_art_side);
        set(&mut d.min_bar_height, s.min_bar_height);
        set(&mut d.min_column_width, s.min_column_width);
        set(&mut d.column_margin, s.column_margin);
    });
    merge_group(&mut dst.timing, src.timing, |d, s| {
        set(&mut d.idle_secs, s.idle_secs);
        set(&mut d.poll_active, s.poll_active);
        set(&mut d.poll_idle, s.poll_idle);
        set(&mut d.debounce_ms, s.debounce_ms);
        set(&mut d.top_cache_ttl, s.top_cache_ttl);
        set(&mut d.idle_refresh_secs, s.idle_refresh_secs);
        set(&mut d.error_backoff, s.error_backoff);
    });
    merge_group(&mut dst.spotify, src.spotify, merge_spotify);
    merge_group(&mut dst.output, src.output, |d, s| {
        set(&mut d.sink, s.sink);
        set(&mut d.path, s.path);
    });
}

fn merge_spotify(dst: &mut SpotifyConfig, src: SpotifyConfig) {
    set(&mut dst.client_id, src.client_id);
    set(&mut dst.client_secret, src.client_secret);
    set(&mut dst.refresh_token, src.refresh_token);
    set(&mut dst.access_token, src.access_token);
    set(&mut dst.top_limit, src.top_limit);
    set(&mut dst.top_time_range, src.top_time_range);
    set(&mut dst.api_base, src.api_base);
    set(&mut dst.accounts_base, src.accounts_base);
}

fn apply_env_overrides<F>(cfg: &mut Config, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = SpotifyConfig {
        client_id: env(ENV_CLIENT_ID),
        client_secret: env(ENV_CLIENT_SECRET),
        refresh_token: env(ENV_REFRESH_TOKEN),
        access_token: env(ENV_ACCESS_TOKEN),
        ..Default::default()
    };
    let any = from_env.client_id.is_some()
        || from_env.client_secret.is_some()
        || from_env.refresh_token.is_some()
        || from_env.access_token.is_some();
    if any {
        merge_group(&mut cfg.spotify, Some(from_env), merge_spotify);
    }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    set(&mut cfg.log_level, cli.log_level.clone());

    let any_panel = cli.panel_width.is_some()
        || cli.panel_height.is_some()
        || cli.orientation.is_some()
        || cli.flip_180.is_some();
    if any_panel {
        let panel = cfg.panel.get_or_insert_with(PanelConfig::default);
        set(&mut panel.width, cli.panel_width);
        set(&mut panel.height, cli.panel_height);
        set(&mut panel.orientation, cli.orientation);
        set(&mut panel.flip_180, cli.flip_180);
    }
    if cli.album_art_side.is_some() {
        let layout = cfg.layout.get_or_insert_with(LayoutConfig::default);
        layout.album_art_side = cli.album_art_side;
    }
    if cli.sink.is_some() || cli.output_path.is_some() {
        let output = cfg.output.get_or_insert_with(OutputConfig::default);
        set(&mut output.sink, cli.sink);
        set(&mut output.path, cli.output_path.clone());
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let panel = cfg.panel_spec();
    if panel.width == 0 || panel.height == 0 {
        return Err(ConfigError::Validation("panel width/height must be > 0".into()));
    }

    let t = cfg.timing();
    if t.poll_active.is_zero() || t.poll_idle.is_zero() {
        return Err(ConfigError::Validation("poll_active/poll_idle must be > 0".into()));
    }

    let limit = cfg.top_limit();
    if limit == 0 || limit > TOP_LIMIT_MAX {
        return Err(ConfigError::Validation(format!(
            "spotify top_limit must be 1..={}",
            TOP_LIMIT_MAX
        )));
    }

    cfg.credentials()?;
    Ok(())
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn panel_spec(&self) -> PanelSpec {
        let p = self.panel.clone().unwrap_or_default();
        PanelSpec::new(p.width.unwrap_or(PANEL_WIDTH), p.height.unwrap_or(PANEL_HEIGHT))
    }

    pub fn orientation(&self) -> Orientation {
        let p = self.panel.clone().unwrap_or_default();
        Orientation {
            rotation: p.orientation.unwrap_or_default(),
            flip_180: p.flip_180.unwrap_or(false),
        }
    }

    pub fn layout_constraints(&self) -> LayoutConstraints {
        let l = self.layout.clone().unwrap_or_default();
        LayoutConstraints {
            nominal_art_side: l.album_art_side.unwrap_or(ALBUM_ART_SIDE),
            min_bar_height: l.min_bar_height.unwrap_or(MIN_BAR_HEIGHT),
            min_column_width: l.min_column_width.unwrap_or(MIN_COLUMN_WIDTH),
            column_margin: l.column_margin.unwrap_or(COLUMN_MARGIN),
        }
    }

    pub fn timing(&self) -> Timing {
        let t = self.timing.clone().unwrap_or_default();
        Timing {
            idle_threshold: Duration::from_secs(t.idle_secs.unwrap_or(IDLE_SECS)),
            poll_active: Duration::from_secs(t.poll_active.unwrap_or(POLL_ACTIVE_SECS)),
            poll_idle: Duration::from_secs(t.poll_idle.unwrap_or(POLL_IDLE_SECS)),
            debounce: Duration::from_millis(t.debounce_ms.unwrap_or(DEBOUNCE_MS)),
            top_cache_ttl: Duration::from_secs(t.top_cache_ttl.unwrap_or(TOP_CACHE_TTL_SECS)),
            idle_refresh: Duration::from_secs(t.idle_refresh_secs.unwrap_or(IDLE_REFRESH_SECS)),
            error_backoff: Duration::from_secs(t.error_backoff.unwrap_or(ERROR_BACKOFF_SECS)),
        }
    }

    pub fn top_limit(&self) -> u32 {
        self.spotify.as_ref().and_then(|s| s.top_limit).unwrap_or(TOP_LIMIT)
    }

    pub fn top_time_range(&self) -> TimeRange {
        self.spotify.as_ref().and_then(|s| s.top_time_range).unwrap_or_default()
    }

    /// Refresh-grant credentials win over a static token.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let s = self.spotify.clone().unwrap_or_default();
        match (non_empty(&s.client_id), non_empty(&s.client_secret), non_empty(&s.refresh_token)) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Ok(Credentials::Refresh {
                client_id,
                client_secret,
                refresh_token,
            }),
            _ => non_empty(&s.access_token)
                .map(|access_token| Credentials::Static { access_token })
                .ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "spotify credentials missing: set client_id, client_secret and refresh_token \
                         (or {}, {}, {}), or an access_token",
                        ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_REFRESH_TOKEN
                    ))
                }),
        }
    }

    pub fn spotify_settings(&self) -> Result<SpotifySettings, ConfigError> {
        let mut settings = SpotifySettings::new(self.credentials()?);
        if let Some(s) = self.spotify.as_ref() {
            if let Some(base) = s.api_base.clone() {
                settings.api_base = base;
            }
            if let Some(base) = s.accounts_base.clone() {
                settings.accounts_base = base;
            }
        }
        Ok(settings)
    }

    pub fn output(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn yaml(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn cli_for(file: &tempfile::NamedTempFile) -> Cli {
        Cli { config: Some(file.path().to_path_buf()), ..Default::default() }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    const CREDS: &str = "spotify:\n  client_id: id\n  client_secret: secret\n  refresh_token: r\n";

    #[test]
    fn test_defaults_with_credentials() {
        let f = yaml(CREDS);
        let cfg = load_from(&cli_for(&f), no_env).unwrap();
        assert_eq!(cfg.panel_spec(), PanelSpec::new(600, 448));
        assert_eq!(cfg.layout_constraints(), LayoutConstraints::default());
        assert_eq!(cfg.timing(), Timing::default());
        assert_eq!(cfg.top_limit(), 7);
        assert_eq!(cfg.top_time_range(), TimeRange::ShortTerm);
        assert_eq!(cfg.log_level(), "info");
        assert!(matches!(cfg.credentials().unwrap(), Credentials::Refresh { .. }));
    }

    #[test]
    fn test_yaml_groups() {
        let f = yaml(&format!(
            "{}panel:\n  orientation: portrait\n  flip_180: true\nlayout:\n  album_art_side: 300\ntiming:\n  poll_active: 3\n  debounce_ms: 1500\noutput:\n  sink: none\n",
            CREDS
        ));
        let cfg = load_from(&cli_for(&f), no_env).unwrap();
        assert_eq!(cfg.orientation(), Orientation { rotation: Rotation::Portrait, flip_180: true });
        assert_eq!(cfg.layout_constraints().nominal_art_side, 300);
        assert_eq!(cfg.timing().poll_active, Duration::from_secs(3));
        assert_eq!(cfg.timing().debounce, Duration::from_millis(1500));
        assert_eq!(cfg.output().sink, Some(SinkKind::None));
    }

    #[test]
    fn test_cli_beats_yaml() {
        let f = yaml(&format!("{}panel:\n  width: 800\n", CREDS));
        let mut cli = cli_for(&f);
        cli.panel_width = Some(640);
        cli.album_art_side = Some(200);
        cli.log_level = Some("debug".into());
        let cfg = load_from(&cli, no_env).unwrap();
        assert_eq!(cfg.panel_spec(), PanelSpec::new(640, 448));
        assert_eq!(cfg.layout_constraints().nominal_art_side, 200);
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn test_env_supplies_secrets() {
        let f = yaml("log_level: warn\n");
        let env: HashMap<&str, &str> = [
            (ENV_CLIENT_ID, "env-id"),
            (ENV_CLIENT_SECRET, "env-secret"),
            (ENV_REFRESH_TOKEN, "env-refresh"),
        ]
        .into_iter()
        .collect();
        let cfg = load_from(&cli_for(&f), |k| env.get(k).map(|v| v.to_string())).unwrap();
        match cfg.credentials().unwrap() {
            Credentials::Refresh { client_id, .. } => assert_eq!(client_id, "env-id"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_static_token_fallback() {
        let f = yaml("spotify:\n  access_token: abc\n  client_id: only-id\n");
        let cfg = load_from(&cli_for(&f), no_env).unwrap();
        assert_eq!(cfg.credentials().unwrap(), Credentials::Static { access_token: "abc".into() });
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let f = yaml("log_level: info\n");
        assert!(matches!(load_from(&cli_for(&f), no_env), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let f = yaml(&format!("{}panel:\n  width: 0\n", CREDS));
        assert!(matches!(load_from(&cli_for(&f), no_env), Err(ConfigError::Validation(_))));

        let f = yaml(&format!("{}timing:\n  poll_idle: 0\n", CREDS));
        assert!(matches!(load_from(&cli_for(&f), no_env), Err(ConfigError::Validation(_))));

    }

    #[test]
    fn test_top_limit_range_checked() {
        let with_limit = |n: u32| yaml(&format!("{}  top_limit: {}\n", CREDS, n));

        let f = with_limit(99);
        assert!(matches!(load_from(&cli_for(&f), no_env), Err(ConfigError::Validation(_))));

        let f = with_limit(0);
        assert!(matches!(load_from(&cli_for(&f), no_env), Err(ConfigError::Validation(_))));

        let f = with_limit(50);
        assert_eq!(load_from(&cli_for(&f), no_env).unwrap().top_limit(), 50);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let cli = Cli { config: Some("/nonexistent/nowink.yaml".into()), ..Default::default() };
        assert!(matches!(load_from(&cli, no_env), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        let f = yaml("panel: [not, a, map\n");
        assert!(matches!(load_from(&cli_for(&f), no_env), Err(ConfigError::Yaml(_))));
    }
}
