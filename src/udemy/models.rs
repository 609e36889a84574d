// src/udemy/models.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paginated API envelope. `next` is a URL when more pages exist.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrolledCourse {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub published_title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Instructor {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}

impl Instructor {
    pub fn name(&self) -> Option<&str> {
        self.display_name.as_deref().or(self.title.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructional_level: String,
    /// Course length in seconds.
    #[serde(default)]
    pub estimated_content_length: u64,
    #[serde(default)]
    pub num_subscribers: u64,
    #[serde(default)]
    pub num_reviews: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub visible_instructors: Vec<Instructor>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub published_time: String,
    #[serde(default)]
    pub last_update_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Caption {
    #[serde(default)]
    pub locale_id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileUrl {
    #[serde(default)]
    pub file: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadUrls {
    #[serde(rename = "File", default)]
    pub file: Vec<FileUrl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub view_html: Option<String>,
    #[serde(default)]
    pub media_sources: Option<Value>,
    #[serde(default)]
    pub captions: Vec<Caption>,
    #[serde(default)]
    pub time_estimation: u64,
    #[serde(default)]
    pub quiz: Option<Value>,
}

impl Asset {
    pub fn has_media(&self) -> bool {
        self.media_sources
            .as_ref()
            .is_some_and(|v| !v.is_null() && v.as_array().is_none_or(|a| !a.is_empty()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupplementaryAsset {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub size_in_bytes: u64,
    #[serde(default)]
    pub download_urls: Option<DownloadUrls>,
}

impl SupplementaryAsset {
    pub fn download_url(&self) -> Option<&str> {
        self.download_urls
            .as_ref()
            .and_then(|d| d.file.first())
            .map(|f| f.file.as_str())
            .filter(|u| !u.is_empty())
    }
}

/// Flat curriculum item; `_class` distinguishes chapters from lectures.
#[derive(Debug, Clone, Deserialize)]
pub struct CurriculumItem {
    #[serde(rename = "_class", default)]
    pub class: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub asset: Option<Asset>,
    #[serde(default)]
    pub supplementary_assets: Vec<SupplementaryAsset>,
    #[serde(default)]
    pub quiz: Option<Value>,
}

/// Lecture details fetched for transcript access.
#[derive(Debug, Clone, Deserialize)]
pub struct LectureDetails {
    #[serde(default)]
    pub asset: Option<Asset>,
}

#[derive(Debug, Clone)]
pub struct Lecture {
    pub id: u64,
    pub title: String,
    pub asset: Option<Asset>,
    pub supplementary_assets: Vec<SupplementaryAsset>,
    pub quiz: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub id: u64,
    pub title: String,
    pub lectures: Vec<Lecture>,
}

/// Normalized course: curriculum folded into sections, details merged in.
#[derive(Debug, Clone)]
pub struct Course {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub details: Option<CourseDetails>,
    pub sections: Vec<Section>,
}

impl Course {
    pub fn total_lectures(&self) -> usize {
        self.sections.iter().map(|s| s.lectures.len()).sum()
    }
}

/// One transcript segment with a normalized MM:SS timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub time: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizQuestion {
    pub id: usize,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub options: Value,
    pub correct_answer: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizContent {
    pub lecture_number: usize,
    pub title: String,
    pub lecture_id: u64,
    pub quiz_type: String,
    pub questions: Vec<QuizQuestion>,
}
