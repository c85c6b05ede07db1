/*
 *  spotify.rs
 *
 *  NowInk - now playing, on paper
 *  (c) 2020-26 Stuart Hunter
 *
 *  Spotify Web API client for playback state and top tracks
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::header::{self, HeaderMap};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::constants::{
    HTTP_CONNECT_TIMEOUT_MS, HTTP_TIMEOUT_MS, RETRY_AFTER_DEFAULT_SECS, SPOTIFY_ACCOUNTS_BASE,
    SPOTIFY_API_BASE,
};
use crate::deutils::{deserialize_artist_names, deserialize_null_default, deserialize_numeric_u64};
use crate::service::{MusicService, ServiceError, TimeRange, TrackSnapshot, TrackSummary};

/// Renew the access token this long before it expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// How the client gets a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Pre-issued token; cannot be renewed.
    Static { access_token: String },
    /// Refresh-token grant against the accounts service.
    Refresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub credentials: Credentials,
    pub api_base: String,
    pub accounts_base: String,
}

impl SpotifySettings {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api_base: SPOTIFY_API_BASE.to_string(),
            accounts_base: SPOTIFY_ACCOUNTS_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    /// None for static tokens
    expires_at: Option<Instant>,
}

impl AccessToken {
    fn usable(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now + EXPIRY_MARGIN < at)
    }
}

/// Token endpoint reply
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
    /// Sent when the service rotates the refresh token
    #[serde(default)]
    refresh_token: Option<String>,
}

fn default_expires_in() -> u64 {
    3600
}

/// `GET /me/player/currently-playing`
#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    is_playing: bool,
    #[serde(default, deserialize_with = "deserialize_numeric_u64")]
    progress_ms: u64,
    #[serde(default)]
    item: Option<Item>,
}

/// `GET /me/top/tracks`
#[derive(Debug, Deserialize)]
struct TopTracksPage {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    items: Vec<Item>,
}

/// A track, or an episode when podcasts are playing.
#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    name: String,
    #[serde(default, deserialize_with = "deserialize_artist_names")]
    artists: String,
    #[serde(default)]
    album: Option<Album>,
    /// Episodes carry images here instead of on an album
    #[serde(default, deserialize_with = "deserialize_null_default")]
    images: Vec<Image>,
    #[serde(default)]
    show: Option<Show>,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    images: Vec<Image>,
}

#[derive(Debug, Deserialize)]
struct Image {
    url: String,
}

#[derive(Debug, Deserialize)]
struct Show {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    name: String,
}

impl Item {
    /// Stable id; local files have no id, so fall back to uri then name.
    fn identity(&self) -> Option<String> {
        self.id
            .as_deref()
            .or(self.uri.as_deref())
            .or(Some(self.name.as_str()))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn artists(&self) -> String {
        match (&self.show, self.artists.is_empty()) {
            (Some(show), true) => show.name.clone(),
            _ => self.artists.clone(),
        }
    }

    /// First image is the largest.
    fn art_url(&self) -> Option<String> {
        self.album
            .as_ref()
            .and_then(|a| a.images.first())
            .or(self.images.first())
            .map(|i| i.url.clone())
    }

    fn into_summary(self) -> Option<TrackSummary> {
        Some(TrackSummary {
            id: self.identity()?,
            title: self.name.clone(),
            artists: self.artists(),
            art_url: self.art_url(),
        })
    }
}

/// Parse a currently-playing body; None when no item is loaded.
fn parse_current(body: &str) -> Result<Option<TrackSnapshot>, ServiceError> {
    let current: CurrentlyPlaying = serde_json::from_str(body)?;
    let Some(item) = current.item else {
        return Ok(None);
    };
    let Some(id) = item.identity() else {
        return Ok(None);
    };
    Ok(Some(TrackSnapshot {
        id,
        artists: item.artists(),
        art_url: item.art_url(),
        title: item.name,
        progress_ms: current.progress_ms,
        is_playing: current.is_playing,
    }))
}

fn parse_top(body: &str) -> Result<Vec<TrackSummary>, ServiceError> {
    let page: TopTracksPage = serde_json::from_str(body)?;
    Ok(page.items.into_iter().filter_map(Item::into_summary).collect())
}

/// Seconds from a Retry-After header, or the default when absent or unparsable.
pub fn retry_after(headers: &HeaderMap) -> Duration {
    let secs = headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(RETRY_AFTER_DEFAULT_SECS);
    Duration::from_secs(secs)
}

/// A client for the handful of Web API calls the display needs.
#[derive(Debug)]
pub struct SpotifyClient {
    client: Client,
    settings: SpotifySettings,
    token: Option<AccessToken>,
}

impl SpotifyClient {
    pub fn new(settings: SpotifySettings) -> Result<Self, ServiceError> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(VERSION));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS))
            .timeout(Duration::from_millis(HTTP_TIMEOUT_MS))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            settings,
            token: None,
        })
    }

    fn can_refresh(&self) -> bool {
        matches!(self.settings.credentials, Credentials::Refresh { .. })
    }

    async fn bearer(&mut self) -> Result<String, ServiceError> {
        if let Some(token) = &self.token {
            if token.usable(Instant::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = match &self.settings.credentials {
            Credentials::Static { access_token } => AccessToken {
                value: access_token.clone(),
                expires_at: None,
            },
            Credentials::Refresh { .. } => self.refresh().await?,
        };
        let value = token.value.clone();
        self.token = Some(token);
        Ok(value)
    }

    async fn refresh(&mut self) -> Result<AccessToken, ServiceError> {
        let Credentials::Refresh { client_id, client_secret, refresh_token } =
            &mut self.settings.credentials
        else {
            return Err(ServiceError::Auth("static token cannot be refreshed".into()));
        };

        let url = format!("{}/api/token", self.settings.accounts_base);
        let response = self
            .client
            .post(&url)
            .basic_auth(client_id.as_str(), Some(client_secret.as_str()))
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::RateLimited { retry_after: retry_after(response.headers()) });
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ServiceError::Auth(format!("token refresh HTTP {}: {}", status.as_u16(), body)));
        }

        let reply: TokenResponse = serde_json::from_str(&body)?;
        if let Some(rotated) = reply.refresh_token {
            *refresh_token = rotated;
        }
        info!("access token renewed, valid for {}s", reply.expires_in);
        Ok(AccessToken {
            value: reply.access_token,
            expires_at: Some(Instant::now() + Duration::from_secs(reply.expires_in)),
        })
    }

    /// Authorized GET; Ok(None) for 204 No Content.
    ///
    /// A 401 drops the token and retries once with a fresh one.
    async fn get(&mut self, path: &str, query: &[(&str, String)]) -> Result<Option<String>, ServiceError> {
        let url = format!("{}{}", self.settings.api_base, path);
        for attempt in 0..2 {
            let bearer = self.bearer().await?;
            let response = self
                .client
                .get(&url)
                .query(query)
                .bearer_auth(bearer)
                .send()
                .await?;

            let status = response.status();
            debug!("GET {} -> {}", path, status);
            match status {
                StatusCode::NO_CONTENT => return Ok(None),
                StatusCode::UNAUTHORIZED if attempt == 0 && self.can_refresh() => {
                    warn!("access token rejected, renewing");
                    self.token = None;
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(ServiceError::Auth("access token rejected".into()));
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return Err(ServiceError::RateLimited {
                        retry_after: retry_after(response.headers()),
                    });
                }
                s if s.is_success() => {
                    let body = response.text().await?;
                    return Ok((!body.trim().is_empty()).then_some(body));
                }
                s => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ServiceError::Status { status: s.as_u16(), body });
                }
            }
        }
        Err(ServiceError::Auth("access token rejected after renewal".into()))
    }
}

impl MusicService for SpotifyClient {
    async fn current_playback(&mut self) -> Result<Option<TrackSnapshot>, ServiceError> {
        match self.get("/me/player/currently-playing", &[]).await? {
            Some(body) => parse_current(&body),
            None => Ok(None),
        }
    }

    async fn top_tracks(
        &mut self,
        limit: u32,
        window: TimeRange,
    ) -> Result<Vec<TrackSummary>, ServiceError> {
        let query = [
            ("limit", limit.to_string()),
            ("time_range", window.as_str().to_string()),
        ];
        match self.get("/me/top/tracks", &query).await? {
            Some(body) => parse_top(&body),
            None => Ok(Vec::new()),
        }
    }
}
