use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use super::{SourceError, TranscriptSegment, TranscriptTrack};

/// Subset of the innertube `player` response we care about
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub playability_status: Option<PlayabilityStatus>,
    pub video_details: Option<VideoDetails>,
    pub captions: Option<Captions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
    pub error_screen: Option<ErrorScreen>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorScreen {
    pub player_error_message_renderer: Option<PlayerErrorMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerErrorMessage {
    pub subreason: Option<TextRuns>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Captions {
    pub player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracklistRenderer {
    #[serde(default)]
    pub caption_tracks: Vec<CaptionTrack>,
}

/// A caption track entry as it appears in the player response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    #[serde(default)]
    pub name: TextRuns,
    pub language_code: String,
    pub kind: Option<String>,
    #[serde(default)]
    pub is_translatable: bool,
}

/// YouTube renders text either as `simpleText` or as a list of runs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRuns {
    pub simple_text: Option<String>,
    #[serde(default)]
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextRun {
    pub text: String,
}

impl TextRuns {
    pub fn to_text(&self) -> String {
        match &self.simple_text {
            Some(text) => text.clone(),
            None => self.runs.iter().map(|run| run.text.as_str()).collect(),
        }
    }
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    /// Caption download URL, forcing the plain timedtext XML format
    pub fn download_url(&self) -> String {
        self.base_url.replace("&fmt=srv3", "")
    }

    pub fn display_name(&self) -> String {
        let name = self.name.to_text();
        if name.is_empty() {
            self.language_code.clone()
        } else {
            name
        }
    }

    pub fn to_track(&self) -> TranscriptTrack {
        TranscriptTrack {
            language_code: self.language_code.clone(),
            language: self.display_name(),
            is_generated: self.is_generated(),
            is_translatable: self.is_translatable,
        }
    }
}

const CONSENT_FORM: &str = "action=\"https://consent.youtube.com/s\"";

fn consent_value_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"name="v" value="(.*?)""#).expect("valid consent regex"))
}

/// Cookie that accepts the EU consent interstitial, or `None` when the watch
/// page is not a consent page.
pub fn consent_cookie(html: &str) -> Option<Result<String, SourceError>> {
    if !html.contains(CONSENT_FORM) {
        return None;
    }

    let cookie = consent_value_regex()
        .captures(html)
        .map(|caps| format!("CONSENT=YES+{}", &caps[1]))
        .ok_or_else(|| SourceError::Unparsable("consent page without consent token".to_string()));

    Some(cookie)
}

/// Check the watch page fetched with the consent cookie
pub fn accepted_watch_page(html: String) -> Result<String, SourceError> {
    if html.contains(CONSENT_FORM) {
        return Err(SourceError::Unparsable("consent cookie was not accepted".to_string()));
    }
    Ok(html)
}

pub fn parse_player_response(body: &str) -> Result<PlayerResponse, SourceError> {
    serde_json::from_str(body)
        .map_err(|e| SourceError::Unparsable(format!("player response: {}", e)))
}

/// Map the player's playability status onto a source error
pub fn check_playability(video_id: &str, response: &PlayerResponse) -> Result<(), SourceError> {
    let Some(status) = &response.playability_status else {
        return Ok(());
    };

    let reason = status.reason.clone().unwrap_or_default();

    match status.status.as_str() {
        "OK" => {
            let returned_id = response
                .video_details
                .as_ref()
                .and_then(|details| details.video_id.as_deref());
            match returned_id {
                Some(id) if id != video_id => Err(SourceError::VideoUnavailable(video_id.to_string())),
                _ => Ok(()),
            }
        }
        "LOGIN_REQUIRED" if reason.contains("inappropriate") || reason.contains("confirm your age") => {
            Err(SourceError::AgeRestricted(video_id.to_string()))
        }
        "LOGIN_REQUIRED" if reason.starts_with("Sign in to confirm you") => {
            Err(SourceError::RequestBlocked)
        }
        "ERROR" if reason == "This video is unavailable" => {
            Err(SourceError::VideoUnavailable(video_id.to_string()))
        }
        _ => {
            let sub_reasons = status
                .error_screen
                .as_ref()
                .and_then(|screen| screen.player_error_message_renderer.as_ref())
                .and_then(|renderer| renderer.subreason.as_ref())
                .map(|subreason| subreason.to_text())
                .filter(|text| !text.is_empty());

            let reason = match (reason.is_empty(), sub_reasons) {
                (true, None) => status.status.clone(),
                (true, Some(sub)) => sub,
                (false, None) => reason,
                (false, Some(sub)) => format!("{} ({})", reason, sub),
            };

            Err(SourceError::Unplayable {
                video_id: video_id.to_string(),
                reason,
            })
        }
    }
}

/// Caption tracks offered by a playable video, manually created ones first
pub fn caption_tracks(video_id: &str, response: &PlayerResponse) -> Result<Vec<CaptionTrack>, SourceError> {
    check_playability(video_id, response)?;

    let tracks = response
        .captions
        .as_ref()
        .and_then(|captions| captions.player_captions_tracklist_renderer.as_ref())
        .map(|renderer| renderer.caption_tracks.clone())
        .unwrap_or_default();

    if tracks.is_empty() {
        return Err(SourceError::TranscriptsDisabled(video_id.to_string()));
    }

    let (mut manual, generated): (Vec<_>, Vec<_>) =
        tracks.into_iter().partition(|track| !track.is_generated());
    manual.extend(generated);

    Ok(manual)
}

/// Pick a track. For each preferred language, a manually created track wins
/// over a generated one. Without preferences the first track is used.
pub fn select_track<'a>(
    video_id: &str,
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Result<&'a CaptionTrack, SourceError> {
    if languages.is_empty() {
        return tracks
            .iter()
            .find(|track| !track.is_generated())
            .or_else(|| tracks.first())
            .ok_or_else(|| SourceError::NoTranscriptAvailable(video_id.to_string()));
    }

    for language in languages {
        let candidates = tracks.iter().filter(|track| &track.language_code == language);
        let mut generated = None;
        for track in candidates {
            if !track.is_generated() {
                return Ok(track);
            }
            generated.get_or_insert(track);
        }
        if let Some(track) = generated {
            return Ok(track);
        }
    }

    Err(SourceError::NoTranscriptFound {
        video_id: video_id.to_string(),
        requested: languages.to_vec(),
        available: tracks.iter().map(|track| track.language_code.clone()).collect(),
    })
}

fn text_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)").expect("valid text element regex"))
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\b(start|dur)="([^"]*)""#).expect("valid attribute regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

/// Parse a timedtext XML document into segments, in document order
pub fn parse_timedtext(xml: &str) -> Vec<TranscriptSegment> {
    let mut segments = Vec::new();

    for element in text_element_regex().captures_iter(xml) {
        let raw = element.get(2).map(|m| m.as_str()).unwrap_or_default();

        // Caption bodies are escaped twice: once by XML, once by the caption markup.
        let text = unescape_entities(&unescape_entities(raw));
        let text = tag_regex().replace_all(&text, "").into_owned();
        if text.is_empty() {
            continue;
        }

        let mut start = 0.0;
        let mut duration = 0.0;
        if let Some(attributes) = element.get(1) {
            for attribute in attribute_regex().captures_iter(attributes.as_str()) {
                let value = attribute[2].parse::<f64>().unwrap_or(0.0);
                match &attribute[1] {
                    "start" => start = value,
                    _ => duration = value,
                }
            }
        }

        segments.push(TranscriptSegment { text, start, duration });
    }

    segments
}

/// Decode named and numeric character references. Unknown references are
/// left untouched.
pub fn unescape_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONSENT_PAGE: &str = r#"<form action="https://consent.youtube.com/s" method="POST">
        <input type="hidden" name="gl" value="DE">
        <input type="hidden" name="v" value="cb.20210328-17-p0.de+FX+123">
    </form>"#;

    fn track(code: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://www.youtube.com/api/timedtext?v=x&lang={}&fmt=srv3", code),
            name: TextRuns {
                simple_text: Some(code.to_uppercase()),
                runs: Vec::new(),
            },
            language_code: code.to_string(),
            kind: kind.map(str::to_string),
            is_translatable: true,
        }
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0" dur="1.54">Hey there</text>
<text start="1.54" dur="4.16">how are you &amp;amp; you&amp;#39;re
fine</text>
<text start="5.7">no duration</text>
<text start="6.0" dur="1.0"></text>
<text start="7.0" dur="1.0"/>
</transcript>"#;

        let segments = parse_timedtext(xml);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], TranscriptSegment::new("Hey there", 0.0, 1.54));
        assert_eq!(segments[1].text, "how are you & you're\nfine");
        assert_eq!(segments[1].start, 1.54);
        assert_eq!(segments[2].duration, 0.0);
    }

    #[test]
    fn test_parse_timedtext_strips_markup() {
        let xml = r#"<transcript><text start="1" dur="2">&lt;font color=&quot;#E5E5E5&quot;&gt;Never&lt;/font&gt; gonna</text></transcript>"#;
        let segments = parse_timedtext(xml);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "Never gonna");
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_entities("a &lt;b&gt; &quot;c&quot;"), "a <b> \"c\"");
        assert_eq!(unescape_entities("&#39;&#x41;&#X42;"), "'AB");
        assert_eq!(unescape_entities("fish & chips"), "fish & chips");
        assert_eq!(unescape_entities("&unknown; &"), "&unknown; &");
    }

    #[test]
    fn test_download_url_drops_srv3() {
        let t = track("en", None);
        assert_eq!(t.download_url(), "https://www.youtube.com/api/timedtext?v=x&lang=en");
    }

    #[test]
    fn test_select_track_prefers_manual() {
        let tracks = vec![track("en", Some("asr")), track("de", None), track("en", None)];
        let selected = select_track("vid", &tracks, &langs(&["en"])).unwrap();
        assert_eq!(selected.language_code, "en");
        assert!(!selected.is_generated());
    }

    #[test]
    fn test_select_track_follows_preference_order() {
        let tracks = vec![track("de", None), track("es", Some("asr"))];
        let selected = select_track("vid", &tracks, &langs(&["fr", "es", "de"])).unwrap();
        assert_eq!(selected.language_code, "es");
        assert!(selected.is_generated());
    }

    #[test]
    fn test_select_track_unconstrained() {
        let tracks = vec![track("en", Some("asr")), track("ko", None)];
        let selected = select_track("vid", &tracks, &[]).unwrap();
        assert_eq!(selected.language_code, "ko");

        let tracks = vec![track("en", Some("asr"))];
        let selected = select_track("vid", &tracks, &[]).unwrap();
        assert_eq!(selected.language_code, "en");

        let err = select_track("vid", &[], &[]).unwrap_err();
        assert!(matches!(err, SourceError::NoTranscriptAvailable(_)));
    }

    #[test]
    fn test_select_track_not_found() {
        let tracks = vec![track("de", None)];
        let err = select_track("vid", &tracks, &langs(&["en", "en-US"])).unwrap_err();
        match err {
            SourceError::NoTranscriptFound { requested, available, .. } => {
                assert_eq!(requested, langs(&["en", "en-US"]));
                assert_eq!(available, langs(&["de"]));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_caption_tracks_orders_manual_first() {
        let body = r#"{
            "playabilityStatus": {"status": "OK"},
            "videoDetails": {"videoId": "vid"},
            "captions": {"playerCaptionsTracklistRenderer": {"captionTracks": [
                {"baseUrl": "u1", "name": {"runs": [{"text": "English (auto-generated)"}]}, "languageCode": "en", "kind": "asr", "isTranslatable": true},
                {"baseUrl": "u2", "name": {"simpleText": "German"}, "languageCode": "de"}
            ]}}
        }"#;
        let response = parse_player_response(body).unwrap();
        let tracks = caption_tracks("vid", &response).unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].language_code, "de");
        assert_eq!(tracks[1].display_name(), "English (auto-generated)");

        let listed = tracks[1].to_track();
        assert!(listed.is_generated);
        assert!(listed.is_translatable);
        assert!(!tracks[0].to_track().is_translatable);
    }

    #[test]
    fn test_caption_tracks_disabled() {
        let response = parse_player_response(r#"{"playabilityStatus": {"status": "OK"}}"#).unwrap();
        let err = caption_tracks("vid", &response).unwrap_err();
        assert!(matches!(err, SourceError::TranscriptsDisabled(_)));
    }

    #[test]
    fn test_check_playability() {
        let unavailable = parse_player_response(
            r#"{"playabilityStatus": {"status": "ERROR", "reason": "This video is unavailable"}}"#,
        )
        .unwrap();
        assert!(matches!(
            check_playability("vid", &unavailable),
            Err(SourceError::VideoUnavailable(_))
        ));

        let bot = parse_player_response(
            r#"{"playabilityStatus": {"status": "LOGIN_REQUIRED", "reason": "Sign in to confirm you're not a bot"}}"#,
        )
        .unwrap();
        assert!(matches!(check_playability("vid", &bot), Err(SourceError::RequestBlocked)));

        let private = parse_player_response(
            r#"{"playabilityStatus": {"status": "UNPLAYABLE", "reason": "Video unplayable",
                "errorScreen": {"playerErrorMessageRenderer": {"subreason": {"runs": [{"text": "Private video"}]}}}}}"#,
        )
        .unwrap();
        match check_playability("vid", &private) {
            Err(SourceError::Unplayable { reason, .. }) => {
                assert_eq!(reason, "Video unplayable (Private video)")
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let mismatched = parse_player_response(
            r#"{"playabilityStatus": {"status": "OK"}, "videoDetails": {"videoId": "other"}}"#,
        )
        .unwrap();
        assert!(matches!(
            check_playability("vid", &mismatched),
            Err(SourceError::VideoUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_player_response_rejects_garbage() {
        let err = parse_player_response("<html>").unwrap_err();
        assert!(matches!(err, SourceError::Unparsable(_)));
    }

    #[test]
    fn test_consent_cookie_from_token() {
        let cookie = consent_cookie(CONSENT_PAGE).unwrap().unwrap();
        assert_eq!(cookie, "CONSENT=YES+cb.20210328-17-p0.de+FX+123");
    }

    #[test]
    fn test_consent_cookie_not_needed() {
        assert!(consent_cookie(r#"<html>"INNERTUBE_API_KEY": "abc"</html>"#).is_none());
    }

    #[test]
    fn test_consent_page_without_token() {
        let html = r#"<form action="https://consent.youtube.com/s"><input name="gl" value="DE"></form>"#;
        let err = consent_cookie(html).unwrap().unwrap_err();
        assert!(matches!(err, SourceError::Unparsable(_)));
    }

    #[test]
    fn test_consent_page_shown_twice() {
        let err = accepted_watch_page(CONSENT_PAGE.to_string()).unwrap_err();
        assert!(matches!(err, SourceError::Unparsable(_)));

        let html = accepted_watch_page("<html>watch</html>".to_string()).unwrap();
        assert_eq!(html, "<html>watch</html>");
    }
}
