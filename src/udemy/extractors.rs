// src/udemy/extractors.rs
//
// Per-content-type extractors. Each one keeps its own success/partial/
// failed/skipped tally for the end-of-run report.

use super::{
    api::UdemyClient,
    markdown,
    models::{Lecture, QuizContent, QuizQuestion},
};
use crate::utils;
use log::{debug, warn};
use regex::Regex;
use serde_json::Value;
use std::{collections::BTreeMap, sync::LazyLock};
use url::Url;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractorStats {
    pub success: usize,
    pub partial: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct ArticleData {
    pub lecture_id: u64,
    pub title: String,
    pub article_type: &'static str,
    pub content: String,
    pub asset_type: String,
    pub time_estimation: u64,
}

#[derive(Default)]
pub struct ArticleExtractor {
    stats: ExtractorStats,
}

const PROMO_TITLE_WORDS: [&str; 3] = ["bonus", "keep learning", "certificate"];
const RESOURCE_TITLE_WORDS: [&str; 4] = ["additional resource", "tips", "guide", "reference"];

impl ArticleExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    pub fn extract(&mut self, lecture: &Lecture) -> Option<ArticleData> {
        let asset = lecture.asset.as_ref();
        let html = asset
            .and_then(|a| a.body.as_deref())
            .or_else(|| asset.and_then(|a| a.view_html.as_deref()))
            .filter(|h| !h.is_empty());

        let Some(html) = html else {
            debug!("lecture {} ({}): no article content", lecture.id, lecture.title);
            self.stats.skipped += 1;
            return None;
        };

        let mut content = markdown::html_to_markdown(html);
        if content.is_empty() {
            // Keep the raw HTML rather than losing the lecture entirely.
            warn!(
                "lecture {} ({}): markdown conversion produced nothing, keeping raw HTML",
                lecture.id, lecture.title
            );
            content = format!("```html\n{html}\n```");
            self.stats.partial += 1;
        } else {
            self.stats.success += 1;
        }

        let article_type = detect_article_type(&lecture.title, &content);

        Some(ArticleData {
            lecture_id: lecture.id,
            title: lecture.title.clone(),
            article_type,
            content,
            asset_type: asset.map(|a| a.asset_type.clone()).unwrap_or_default(),
            time_estimation: asset.map(|a| a.time_estimation).unwrap_or(0),
        })
    }
}

fn detect_article_type(title: &str, content: &str) -> &'static str {
    let title = title.to_lowercase();
    if title.contains("solution") {
        return "coding_solution";
    }
    if PROMO_TITLE_WORDS.iter().any(|w| title.contains(w)) {
        return "promotional";
    }
    if RESOURCE_TITLE_WORDS.iter().any(|w| title.contains(w)) {
        return "technical_resource";
    }
    if content.contains("```") || content.contains("public class") || content.contains("def ") {
        return "coding_solution";
    }
    "general"
}

#[derive(Default)]
pub struct QuizExtractor {
    stats: ExtractorStats,
}

impl QuizExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    pub fn extract(&mut self, lecture: &Lecture, lecture_number: usize) -> Option<QuizContent> {
        let quiz = lecture
            .quiz
            .as_ref()
            .or_else(|| lecture.asset.as_ref().and_then(|a| a.quiz.as_ref()));
        let Some(quiz) = quiz else {
            self.stats.skipped += 1;
            return None;
        };

        let questions = parse_quiz_questions(quiz);
        if questions.is_empty() {
            warn!(
                "lecture {} ({}): quiz has no parseable questions",
                lecture.id, lecture.title
            );
            self.stats.partial += 1;
            return None;
        }
        self.stats.success += 1;

        Some(QuizContent {
            lecture_number,
            title: lecture.title.clone(),
            lecture_id: lecture.id,
            quiz_type: quiz
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            questions,
        })
    }
}

fn parse_quiz_questions(quiz: &Value) -> Vec<QuizQuestion> {
    let list = quiz
        .get("questions")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    list.iter()
        .enumerate()
        .map(|(idx, q)| QuizQuestion {
            id: idx + 1,
            text: q
                .get("question")
                .or_else(|| q.get("prompt"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            kind: q
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("multiple_choice")
                .to_string(),
            options: q
                .get("options")
                .or_else(|| q.get("answers"))
                .cloned()
                .unwrap_or(Value::Array(Vec::new())),
            correct_answer: q
                .get("correct_answer")
                .or_else(|| q.get("correct_response"))
                .cloned()
                .unwrap_or(Value::Null),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub filename: String,
    pub file_type: String,
    pub url: Option<String>,
    pub size: u64,
    pub content: Option<Vec<u8>>,
}

impl ResourceRecord {
    pub fn downloaded(&self) -> bool {
        self.content.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ResourceData {
    pub lecture_id: u64,
    pub title: String,
    pub resources: Vec<ResourceRecord>,
}

impl ResourceData {
    pub fn downloaded_count(&self) -> usize {
        self.resources.iter().filter(|r| r.downloaded()).count()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadStats {
    pub downloaded: usize,
    pub skipped_size: usize,
    pub failed: usize,
    pub total_bytes: u64,
}

pub struct ResourceExtractor {
    download_enabled: bool,
    max_file_size_mb: u64,
    stats: ExtractorStats,
    download_stats: DownloadStats,
}

impl ResourceExtractor {
    pub fn new(download_enabled: bool, max_file_size_mb: u64) -> Self {
        Self {
            download_enabled,
            max_file_size_mb,
            stats: ExtractorStats::default(),
            download_stats: DownloadStats::default(),
        }
    }

    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    pub fn download_stats(&self) -> DownloadStats {
        self.download_stats
    }

    pub async fn extract(
        &mut self,
        client: &UdemyClient,
        lecture: &Lecture,
    ) -> Option<ResourceData> {
        if lecture.supplementary_assets.is_empty() {
            self.stats.skipped += 1;
            return None;
        }

        let mut resources = Vec::new();
        for asset in &lecture.supplementary_assets {
            let url = asset.download_url().map(str::to_string);
            let mut record = ResourceRecord {
                filename: if asset.filename.is_empty() {
                    "unknown".to_string()
                } else {
                    asset.filename.clone()
                },
                file_type: asset.asset_type.clone(),
                url: url.clone(),
                size: asset.size_in_bytes,
                content: None,
            };

            if self.download_enabled {
                if let Some(url) = &url {
                    let size_mb = record.size / (1024 * 1024);
                    if size_mb > self.max_file_size_mb {
                        warn!(
                            "skipping {} ({}): exceeds the {}MB limit",
                            record.filename,
                            utils::format_size(record.size),
                            self.max_file_size_mb
                        );
                        self.download_stats.skipped_size += 1;
                    } else {
                        match client.download_resource(url).await {
                            Ok(bytes) => {
                                self.download_stats.downloaded += 1;
                                self.download_stats.total_bytes += bytes.len() as u64;
                                record.size = bytes.len() as u64;
                                record.content = Some(bytes);
                            }
                            Err(e) => {
                                warn!("failed to download {}: {e}", record.filename);
                                self.download_stats.failed += 1;
                            }
                        }
                    }
                }
            }
            resources.push(record);
        }

        self.stats.success += 1;
        Some(ResourceData {
            lecture_id: lecture.id,
            title: lecture.title.clone(),
            resources,
        })
    }
}

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap());

const CATEGORY_PATTERNS: [(&str, &str); 6] = [
    ("github", r"github\.com/[\w-]+/[\w-]+"),
    ("stackoverflow", r"stackoverflow\.com/questions/\d+"),
    ("documentation", r"(?:docs?\.|documentation)"),
    ("youtube", r"(?:youtube\.com|youtu\.be)"),
    ("medium", r"medium\.com"),
    ("dev_to", r"dev\.to"),
];

static CATEGORY_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    CATEGORY_PATTERNS
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(&format!("(?i){pattern}")).unwrap()))
        .collect()
});

#[derive(Debug, Clone)]
pub struct Mention {
    pub lecture_number: usize,
    pub lecture_title: String,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct LinkEntry {
    pub url: String,
    pub domain: String,
    pub mentions: Vec<Mention>,
}

#[derive(Debug, Default)]
pub struct LinksSummary {
    pub total: usize,
    pub by_category: BTreeMap<&'static str, Vec<LinkEntry>>,
}

/// Collects external URLs mentioned in transcripts and articles,
/// deduplicated by URL with every mention site kept.
#[derive(Default)]
pub struct ExternalLinkScanner {
    found: Vec<(String, &'static str, String, Mention)>,
}

impl ExternalLinkScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_content(
        &mut self,
        content: &str,
        content_type: &'static str,
        lecture_number: usize,
        lecture_title: &str,
    ) {
        for m in URL_RE.find_iter(content) {
            let url = m.as_str().trim_end_matches(['.', ',', ';', ':', ')']);
            let category = CATEGORY_RES
                .iter()
                .find(|(_, re)| re.is_match(url))
                .map(|(name, _)| *name)
                .unwrap_or("other");
            let domain = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string());

            self.found.push((
                url.to_string(),
                category,
                domain,
                Mention {
                    lecture_number,
                    lecture_title: lecture_title.to_string(),
                    content_type,
                },
            ));
        }
    }

    pub fn summary(&self) -> LinksSummary {
        let mut by_category: BTreeMap<&'static str, Vec<LinkEntry>> = BTreeMap::new();

        for (url, category, domain, mention) in &self.found {
            let entries = by_category.entry(category).or_default();
            match entries.iter_mut().find(|e| &e.url == url) {
                Some(entry) => entry.mentions.push(mention.clone()),
                None => entries.push(LinkEntry {
                    url: url.clone(),
                    domain: domain.clone(),
                    mentions: vec![mention.clone()],
                }),
            }
        }

        let total = by_category.values().map(Vec::len).sum();
        LinksSummary { total, by_category }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::udemy::models::Asset;
    use serde_json::json;

    fn article_lecture(title: &str, body: &str) -> Lecture {
        Lecture {
            id: 5,
            title: title.to_string(),
            asset: Some(Asset {
                asset_type: "Article".to_string(),
                body: Some(body.to_string()),
                ..Asset::default()
            }),
            supplementary_assets: Vec::new(),
            quiz: None,
        }
    }

    #[test]
    fn article_extraction_converts_and_classifies() {
        let mut extractor = ArticleExtractor::new();
        let data = extractor
            .extract(&article_lecture(
                "MultiExecutor Solution",
                "<h2>Answer</h2><pre><code>int x = 1;</code></pre>",
            ))
            .unwrap();
        assert_eq!(data.article_type, "coding_solution");
        assert!(data.content.contains("## Answer"));
        assert_eq!(extractor.stats().success, 1);
    }

    #[test]
    fn lecture_without_article_body_is_skipped() {
        let mut extractor = ArticleExtractor::new();
        let lecture = Lecture {
            id: 1,
            title: "Video only".to_string(),
            asset: None,
            supplementary_assets: Vec::new(),
            quiz: None,
        };
        assert!(extractor.extract(&lecture).is_none());
        assert_eq!(extractor.stats().skipped, 1);
    }

    #[test]
    fn quiz_questions_accept_both_field_spellings() {
        let quiz = json!({
            "type": "simple-quiz",
            "questions": [
                {"question": "What is 2+2?", "options": ["3", "4"], "correct_answer": "4"},
                {"prompt": "Pick one", "answers": ["a", "b"], "correct_response": "a"},
            ]
        });
        let questions = parse_quiz_questions(&quiz);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text, "What is 2+2?");
        assert_eq!(questions[1].text, "Pick one");
        assert_eq!(questions[1].correct_answer, json!("a"));
    }

    #[test]
    fn link_scanner_categorizes_and_dedups() {
        let mut scanner = ExternalLinkScanner::new();
        scanner.scan_content(
            "See https://github.com/rust-lang/rust and https://docs.oracle.com/javase.",
            "transcript",
            1,
            "Intro",
        );
        scanner.scan_content(
            "Again https://github.com/rust-lang/rust here.",
            "article",
            2,
            "Details",
        );

        let summary = scanner.summary();
        assert_eq!(summary.total, 2);
        let github = &summary.by_category["github"];
        assert_eq!(github.len(), 1);
        assert_eq!(github[0].mentions.len(), 2);
        assert!(summary.by_category.contains_key("documentation"));
    }

    #[test]
    fn trailing_punctuation_is_stripped_from_urls() {
        let mut scanner = ExternalLinkScanner::new();
        scanner.scan_content("Go to https://example.org/page.", "article", 1, "L");
        let summary = scanner.summary();
        assert_eq!(summary.by_category["other"][0].url, "https://example.org/page");
    }
}
