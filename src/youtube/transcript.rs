// src/youtube/transcript.rs
//
// Transcripts come from the caption tracks advertised on the watch
// page. Manually written captions are preferred over auto-generated
// ones; the track body is timedtext XML.

use super::client::YoutubeClient;
use crate::{constants, error::*, udemy::markdown, utils};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static CAPTION_TRACKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""captionTracks":(\[.*?\])"#).unwrap());
static TEXT_NODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<text start="([\d.]+)"[^>]*>(.*?)</text>"#).unwrap()
});

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    /// "asr" marks auto-generated tracks.
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub start: f64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    pub is_generated: bool,
    pub entries: Vec<TranscriptEntry>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TranscriptStats {
    pub success: usize,
    pub no_transcript: usize,
    pub failed: usize,
}

pub struct TranscriptExtractor {
    language: String,
    stats: TranscriptStats,
}

impl TranscriptExtractor {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            stats: TranscriptStats::default(),
        }
    }

    pub fn stats(&self) -> TranscriptStats {
        self.stats
    }

    /// Returns None when the video has no usable captions. Network
    /// failures count separately so the summary can distinguish them.
    pub async fn extract(
        &mut self,
        client: &YoutubeClient,
        video_id: &str,
    ) -> Option<Transcript> {
        match self.try_extract(client, video_id).await {
            Ok(Some(transcript)) => {
                self.stats.success += 1;
                Some(transcript)
            }
            Ok(None) => {
                self.stats.no_transcript += 1;
                None
            }
            Err(e) => {
                warn!("transcript fetch failed for {video_id}: {e}");
                self.stats.failed += 1;
                None
            }
        }
    }

    async fn try_extract(
        &self,
        client: &YoutubeClient,
        video_id: &str,
    ) -> AppResult<Option<Transcript>> {
        let url = format!("{}/watch?v={video_id}", constants::youtube::BASE_URL);
        let html = client.http().get_text(&url).await?;

        let Some(caps) = CAPTION_TRACKS_RE.captures(&html) else {
            debug!("no caption tracks advertised for {video_id}");
            return Ok(None);
        };
        let tracks: Vec<CaptionTrack> = serde_json::from_str(&caps[1])?;

        let Some(track) = pick_track(&tracks, &self.language) else {
            return Ok(None);
        };

        let xml = client
            .http()
            .get_text(&track.base_url.replace("\\u0026", "&"))
            .await?;
        let entries = parse_timedtext(&xml);
        if entries.is_empty() {
            return Ok(None);
        }

        Ok(Some(Transcript {
            video_id: video_id.to_string(),
            language: track.language_code.clone(),
            is_generated: track.is_generated(),
            entries,
        }))
    }
}

fn pick_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code.starts_with(language) && !t.is_generated())
        .or_else(|| tracks.iter().find(|t| t.language_code.starts_with(language)))
        .or_else(|| tracks.first())
}

fn parse_timedtext(xml: &str) -> Vec<TranscriptEntry> {
    TEXT_NODE_RE
        .captures_iter(xml)
        .filter_map(|caps| {
            let start: f64 = caps[1].parse().ok()?;
            let text = markdown::clean_html_text(&caps[2]);
            if text.is_empty() {
                return None;
            }
            Some(TranscriptEntry { start, text })
        })
        .collect()
}

/// Transcript document with a metadata header and one timestamped
/// paragraph per caption entry.
pub fn format_as_markdown(transcript: &Transcript, video_title: &str, video_url: &str) -> String {
    let mut doc = format!(
        "# {video_title}\n\n**Video URL:** {video_url}\n**Language:** {}\n**Transcript Type:** {}\n\n---\n\n## Transcript\n\n",
        transcript.language,
        if transcript.is_generated { "Auto-generated" } else { "Manual" },
    );
    let body: Vec<String> = transcript
        .entries
        .iter()
        .map(|e| format!("[{}] {}", utils::format_timestamp(e.start), e.text))
        .collect();
    doc.push_str(&body.join("\n\n"));
    doc.push('\n');
    doc
}
