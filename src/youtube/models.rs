// src/youtube/models.rs

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub timestamp: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoMetadata {
    pub id: String,
    pub url: String,
    pub title: String,
    pub channel: String,
    pub description: String,
    pub duration: Option<String>,
    pub upload_date: Option<String>,
    pub view_count: Option<u64>,
    pub thumbnail_url: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistVideo {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistMetadata {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub videos: Vec<PlaylistVideo>,
}

impl PlaylistMetadata {
    pub fn video_count(&self) -> usize {
        self.videos.len()
    }
}
