// src/youtube/client.rs
//
// URL parsing and page-scrape metadata extraction. There is no public
// metadata API without a key, so titles, durations and chapters come
// from the watch/playlist page HTML.

use super::models::{Chapter, PlaylistMetadata, PlaylistVideo, VideoMetadata};
use crate::{client::RobustClient, constants, error::*, udemy::markdown};
use log::{debug, warn};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());
static EMBED_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:embed|v|shorts)/([A-Za-z0-9_-]{11})").unwrap());

static OG_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<meta property="og:title" content="(.*?)""#).unwrap());
static TITLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<title>(.*?)</title>").unwrap());
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""author":"(.*?)""#).unwrap());
static OG_DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<meta property="og:description" content="(.*?)""#).unwrap());
static LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""lengthSeconds":"(\d+)""#).unwrap());
static UPLOAD_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""uploadDate":"(.*?)""#).unwrap());
static VIEW_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""viewCount":"(\d+)""#).unwrap());
static INITIAL_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var ytInitialData = (\{.*?\});").unwrap());
static CHAPTER_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}:\d{2}(?::\d{2})?)\s+(.+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedUrl {
    Video { video_id: String },
    Playlist { playlist_id: String },
}

/// Accepts watch, short, embed, shorts and playlist URL forms. A `list`
/// parameter wins over a video id, matching how the share links behave.
pub fn parse_url(input: &str) -> AppResult<ParsedUrl> {
    let parsed = url::Url::parse(input.trim())
        .map_err(|_| AppError::Validation(format!("Not a valid URL: {input}")))?;

    if let Some((_, list)) = parsed.query_pairs().find(|(k, _)| k == "list") {
        return Ok(ParsedUrl::Playlist {
            playlist_id: list.to_string(),
        });
    }

    let video_id = parsed
        .query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.to_string())
        .or_else(|| {
            if parsed.host_str() == Some("youtu.be") {
                parsed.path().trim_matches('/').split('/').next().map(str::to_string)
            } else {
                None
            }
        })
        .or_else(|| {
            EMBED_PATH_RE
                .captures(parsed.path())
                .map(|c| c[1].to_string())
        });

    match video_id {
        Some(id) if VIDEO_ID_RE.is_match(&id) => Ok(ParsedUrl::Video { video_id: id }),
        _ => Err(AppError::Validation(format!(
            "Could not extract a video or playlist id from: {input}"
        ))),
    }
}

pub struct YoutubeClient {
    http: RobustClient,
}

impl YoutubeClient {
    pub fn new(http: RobustClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &RobustClient {
        &self.http
    }

    pub async fn video_metadata(&self, video_id: &str) -> AppResult<VideoMetadata> {
        let url = format!("{}/watch?v={video_id}", constants::youtube::BASE_URL);
        let html = self.http.get_text(&url).await?;

        let description = capture(&OG_DESCRIPTION_RE, &html).unwrap_or_default();
        Ok(VideoMetadata {
            id: video_id.to_string(),
            url,
            title: extract_title(&html),
            channel: capture(&AUTHOR_RE, &html).unwrap_or_else(|| "Unknown Channel".to_string()),
            duration: capture(&LENGTH_RE, &html)
                .and_then(|s| s.parse::<u64>().ok())
                .map(format_duration),
            upload_date: capture(&UPLOAD_DATE_RE, &html),
            view_count: capture(&VIEW_COUNT_RE, &html).and_then(|s| s.parse().ok()),
            thumbnail_url: format!("https://i.ytimg.com/vi/{video_id}/maxresdefault.jpg"),
            chapters: extract_chapters(&description),
            description,
        })
    }

    pub async fn playlist_metadata(&self, playlist_id: &str) -> AppResult<PlaylistMetadata> {
        let url = format!("{}/playlist?list={playlist_id}", constants::youtube::BASE_URL);
        let html = self.http.get_text(&url).await?;

        let initial_data: Option<Value> = INITIAL_DATA_RE
            .captures(&html)
            .and_then(|c| serde_json::from_str(&c[1]).ok());

        let mut metadata = PlaylistMetadata {
            id: playlist_id.to_string(),
            url,
            title: "Unknown Playlist".to_string(),
            description: String::new(),
            videos: Vec::new(),
        };
        let Some(data) = initial_data else {
            warn!("could not locate ytInitialData on the playlist page");
            return Ok(metadata);
        };

        let sidebar = &data["sidebar"]["playlistSidebarRenderer"]["items"][0]
            ["playlistSidebarPrimaryInfoRenderer"];
        if let Some(title) = sidebar["title"]["runs"][0]["text"].as_str() {
            metadata.title = title.to_string();
        }
        if let Some(desc) = sidebar["description"]["simpleText"].as_str() {
            metadata.description = desc.to_string();
        }

        let contents = &data["contents"]["twoColumnBrowseResultsRenderer"]["tabs"][0]
            ["tabRenderer"]["content"]["sectionListRenderer"]["contents"][0]
            ["itemSectionRenderer"]["contents"][0]["playlistVideoListRenderer"]["contents"];
        for item in contents.as_array().into_iter().flatten() {
            let renderer = &item["playlistVideoRenderer"];
            let Some(video_id) = renderer["videoId"].as_str() else {
                continue;
            };
            metadata.videos.push(PlaylistVideo {
                id: video_id.to_string(),
                title: renderer["title"]["runs"][0]["text"]
                    .as_str()
                    .unwrap_or("Unknown")
                    .to_string(),
                url: format!("{}/watch?v={video_id}", constants::youtube::BASE_URL),
            });
        }
        debug!("playlist {playlist_id}: {} videos", metadata.videos.len());

        Ok(metadata)
    }
}

fn capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .map(|c| markdown::unescape_entities(&c[1]))
        .filter(|s| !s.is_empty())
}

fn extract_title(html: &str) -> String {
    if let Some(title) = capture(&OG_TITLE_RE, html) {
        return title;
    }
    capture(&TITLE_TAG_RE, html)
        .map(|t| t.replace(" - YouTube", ""))
        .unwrap_or_else(|| "Unknown Title".to_string())
}

/// Chapters live in the description as `MM:SS Chapter name` lines.
pub fn extract_chapters(description: &str) -> Vec<Chapter> {
    description
        .split('\n')
        .filter_map(|line| {
            CHAPTER_LINE_RE.captures(line.trim()).map(|caps| Chapter {
                timestamp: caps[1].to_string(),
                title: caps[2].trim().to_string(),
            })
        })
        .collect()
}

fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
