use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::sync::OnceLock;
use std::time::Duration;

use super::captions::{self, CaptionTrack};
use super::{FetchedTranscript, SourceError, TranscriptSource, TranscriptTrack};
use crate::config::HttpConfig;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";

/// Client context sent to the innertube player endpoint
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

/// Transcript source backed by YouTube's caption tracks
pub struct YoutubeTranscriptSource {
    client: Client,
}

fn api_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid api key regex")
    })
}

impl YoutubeTranscriptSource {
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the watch page, accepting the EU consent interstitial once if shown
    async fn fetch_watch_html(&self, video_id: &str) -> Result<String, SourceError> {
        let url = format!("{}{}", WATCH_URL, urlencoding::encode(video_id));
        tracing::debug!("Fetching watch page: {}", url);

        let html = self.get_text(&url, None).await?;
        let Some(cookie) = captions::consent_cookie(&html) else {
            return Ok(html);
        };
        let cookie = cookie?;

        tracing::debug!("Accepting consent interstitial for {}", video_id);
        let html = self.get_text(&url, Some(&cookie)).await?;

        captions::accepted_watch_page(html)
    }

    async fn get_text(&self, url: &str, cookie: Option<&str>) -> Result<String, SourceError> {
        let mut request = self.client.get(url);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        check_status(response.status(), url)?;

        Ok(response.text().await?)
    }

    fn extract_api_key(html: &str) -> Result<String, SourceError> {
        if let Some(caps) = api_key_regex().captures(html) {
            return Ok(caps[1].to_string());
        }

        if html.contains("class=\"g-recaptcha\"") {
            return Err(SourceError::TooManyRequests);
        }

        Err(SourceError::Unparsable("INNERTUBE_API_KEY not found in watch page".to_string()))
    }

    async fn fetch_player_response(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> Result<captions::PlayerResponse, SourceError> {
        let url = format!("{}?key={}", PLAYER_URL, urlencoding::encode(api_key));
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        tracing::debug!("Requesting player response for {}", video_id);
        let response = self.client.post(&url).json(&body).send().await?;
        check_status(response.status(), PLAYER_URL)?;

        let text = response.text().await?;
        captions::parse_player_response(&text)
    }

    /// Resolve the caption tracks of a video, manually created ones first
    async fn caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, SourceError> {
        if video_id.starts_with("http://") || video_id.starts_with("https://") {
            return Err(SourceError::InvalidVideoId(video_id.to_string()));
        }

        let html = self.fetch_watch_html(video_id).await?;
        let api_key = Self::extract_api_key(&html)?;
        let player = self.fetch_player_response(video_id, &api_key).await?;

        captions::caption_tracks(video_id, &player)
    }
}

fn check_status(status: StatusCode, url: &str) -> Result<(), SourceError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::TooManyRequests);
    }

    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(())
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> Result<FetchedTranscript, SourceError> {
        let tracks = self.caption_tracks(video_id).await?;
        let track = captions::select_track(video_id, &tracks, languages)?;

        tracing::debug!(
            "Selected {} track ({}) for {}",
            track.language_code,
            if track.is_generated() { "generated" } else { "manual" },
            video_id
        );

        let xml = self.get_text(&track.download_url(), None).await?;
        let segments = captions::parse_timedtext(&xml);

        Ok(FetchedTranscript {
            segments,
            video_id: video_id.to_string(),
            language_code: track.language_code.clone(),
            language: track.display_name(),
            is_generated: track.is_generated(),
        })
    }

    async fn list(&self, video_id: &str) -> Result<Vec<TranscriptTrack>, SourceError> {
        let tracks = self.caption_tracks(video_id).await?;
        Ok(tracks.iter().map(CaptionTrack::to_track).collect())
    }

    fn name(&self) -> &'static str {
        "YouTube"
    }
}
