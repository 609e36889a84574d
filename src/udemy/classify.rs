// src/udemy/classify.rs

use super::models::Lecture;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Video,
    Article,
    CodingSolution,
    CodingExercise,
    Quiz,
    Promotional,
    TechnicalResource,
    Ebook,
    Unknown,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Article => "article",
            ContentType::CodingSolution => "coding_solution",
            ContentType::CodingExercise => "coding_exercise",
            ContentType::Quiz => "quiz",
            ContentType::Promotional => "promotional",
            ContentType::TechnicalResource => "technical_resource",
            ContentType::Ebook => "ebook",
            ContentType::Unknown => "unknown",
        }
    }

    pub fn is_article_like(&self) -> bool {
        matches!(
            self,
            ContentType::Article
                | ContentType::CodingSolution
                | ContentType::TechnicalResource
                | ContentType::Promotional
        )
    }
}

const PROMOTIONAL_WORDS: [&str; 4] = ["bonus", "keep learning", "certificate", "congratulations"];
const RESOURCE_WORDS: [&str; 4] = ["additional resource", "tips", "guide", "reference"];

/// Priority-ordered classification over the asset type and title keywords.
/// First match wins.
pub fn detect(lecture: &Lecture) -> ContentType {
    let asset = lecture.asset.as_ref();
    let asset_type = asset
        .map(|a| a.asset_type.to_lowercase())
        .unwrap_or_default();
    let title = lecture.title.to_lowercase();

    if asset_type == "video" || asset.is_some_and(|a| a.has_media()) {
        return ContentType::Video;
    }

    let has_article_body = asset.is_some_and(|a| {
        a.body.as_deref().is_some_and(|b| !b.is_empty())
            || a.view_html.as_deref().is_some_and(|h| !h.is_empty())
    });
    if asset_type == "article" || has_article_body {
        if title.contains("solution") {
            return ContentType::CodingSolution;
        }
        if title.contains("quiz") {
            return ContentType::Quiz;
        }
        if title.contains("exercise") || title.contains("practice") {
            return ContentType::CodingExercise;
        }
        if PROMOTIONAL_WORDS.iter().any(|w| title.contains(w)) {
            return ContentType::Promotional;
        }
        if RESOURCE_WORDS.iter().any(|w| title.contains(w)) {
            return ContentType::TechnicalResource;
        }
        return ContentType::Article;
    }

    if asset_type == "e-book" || asset_type == "file" {
        return ContentType::Ebook;
    }

    ContentType::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::udemy::models::Asset;

    fn lecture(title: &str, asset_type: &str, body: Option<&str>) -> Lecture {
        Lecture {
            id: 1,
            title: title.to_string(),
            asset: Some(Asset {
                asset_type: asset_type.to_string(),
                body: body.map(str::to_string),
                ..Asset::default()
            }),
            supplementary_assets: Vec::new(),
            quiz: None,
        }
    }

    #[test]
    fn video_asset_type_wins() {
        assert_eq!(
            detect(&lecture("Bonus: thanks!", "Video", None)),
            ContentType::Video
        );
    }

    #[test]
    fn article_subtypes_by_title() {
        assert_eq!(
            detect(&lecture("MultiExecutor Solution", "Article", Some("<p>x</p>"))),
            ContentType::CodingSolution
        );
        assert_eq!(
            detect(&lecture("Section Quiz", "Article", Some("<p>x</p>"))),
            ContentType::Quiz
        );
        assert_eq!(
            detect(&lecture("Practice Exercise 3", "Article", Some("<p>x</p>"))),
            ContentType::CodingExercise
        );
        assert_eq!(
            detect(&lecture("Bonus: keep learning", "Article", Some("<p>x</p>"))),
            ContentType::Promotional
        );
        assert_eq!(
            detect(&lecture("Additional Resources", "Article", Some("<p>x</p>"))),
            ContentType::TechnicalResource
        );
        assert_eq!(
            detect(&lecture("Threading basics", "Article", Some("<p>x</p>"))),
            ContentType::Article
        );
    }

    #[test]
    fn unclassifiable_is_unknown() {
        assert_eq!(detect(&lecture("Mystery", "", None)), ContentType::Unknown);
        assert_eq!(
            detect(&lecture("Course notes", "e-book", None)),
            ContentType::Ebook
        );
    }
}
