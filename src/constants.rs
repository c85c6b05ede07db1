//! Defaults shared by configuration, layout and the poller.

/// Waveshare 5.65" class panel.
pub const PANEL_WIDTH: u32 = 600;
pub const PANEL_HEIGHT: u32 = 448;

/// Nominal album art side; everything else in the layout derives from it.
pub const ALBUM_ART_SIDE: u32 = 408;
pub const MIN_BAR_HEIGHT: u32 = 36;
pub const MIN_COLUMN_WIDTH: u32 = 90;
pub const COLUMN_MARGIN: u32 = 12;

/// Seconds without playback before the idle screen takes over.
pub const IDLE_SECS: u64 = 300;
pub const POLL_ACTIVE_SECS: u64 = 5;
pub const POLL_IDLE_SECS: u64 = 60;
/// Listening time a new track needs before it is drawn.
pub const DEBOUNCE_MS: u64 = 3000;
pub const TOP_CACHE_TTL_SECS: u64 = 6 * 60 * 60;
pub const IDLE_REFRESH_SECS: u64 = 30 * 60;
/// Floor on the sleep after a failed tick.
pub const ERROR_BACKOFF_SECS: u64 = 60;
/// Used when a 429 carries no usable Retry-After.
pub const RETRY_AFTER_DEFAULT_SECS: u64 = 10;

pub const TOP_LIMIT: u32 = 7;
/// Service maximum for the top tracks page.
pub const TOP_LIMIT_MAX: u32 = 50;

pub const FRAME_PATH: &str = "nowink.ppm";

pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// HTTP timeouts (ms)
pub const HTTP_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const HTTP_TIMEOUT_MS: u64 = 15_000;
