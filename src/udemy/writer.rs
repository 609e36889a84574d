// src/udemy/writer.rs
//
// Owns the on-disk course layout. All content files funnel through here
// so naming and directory conventions stay in one place.

use super::{
    extractors::{ArticleData, DownloadStats, LinksSummary, ResourceData},
    markdown,
    models::{Course, Cue, QuizContent},
};
use crate::{cli::QuizFormat, constants::udemy::dirs, error::*, utils};
use chrono::Local;
use log::debug;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

const CONTENT_DIRS: [&str; 5] = [
    dirs::TRANSCRIPTS,
    dirs::ARTICLES,
    dirs::QUIZZES,
    dirs::SLIDES,
    dirs::RESOURCES,
];

const CATEGORY_LABELS: [(&str, &str); 7] = [
    ("github", "GitHub Repositories"),
    ("stackoverflow", "Stack Overflow"),
    ("documentation", "Documentation"),
    ("youtube", "YouTube Videos"),
    ("medium", "Medium Articles"),
    ("dev_to", "Dev.to Articles"),
    ("other", "Other Resources"),
];

const README_TEMPLATE: &str = r#"# {COURSE_NAME}

> Extracted from [{COURSE_URL}]({COURSE_URL}) on {DATE}.

## Course Overview

- **Instructor**: {INSTRUCTOR_NAME}
- **Level**: {COURSE_LEVEL}
- **Duration**: {COURSE_DURATION}
- **Students**: {NUM_SUBSCRIBERS}
- **Rating**: {COURSE_RATING} ({NUM_RATINGS} ratings)
- **Last updated**: {LAST_UPDATED}

{COURSE_DESCRIPTION}

## About the Instructor

{INSTRUCTOR_BIO}

## Curriculum

{COURSE_SECTIONS}

## Extraction Details

| | |
|---|---|
| Extraction date | {EXTRACTION_DATE} |
| Sections | {NUM_SECTIONS} |
| Lectures | {NUM_LECTURES} |
| Transcripts | {NUM_TRANSCRIPTS} ({TRANSCRIPTS_SIZE}) |
| Articles | {NUM_ARTICLES} ({ARTICLES_SIZE}) |
| Resources | {NUM_RESOURCES} ({RESOURCES_SIZE}) |
| External links | {NUM_EXTERNAL_LINKS} |

## Key Takeaways

_Add your own notes here as you work through `{COURSE_SLUG}`._
"#;

#[derive(Debug, Clone)]
struct TrackedResource {
    section: String,
    lecture_number: usize,
    lecture_title: String,
    filename: String,
    file_type: String,
    size: u64,
    downloaded: bool,
    has_url: bool,
}

#[derive(Debug, Default, Clone)]
pub struct ExtractionStats {
    pub transcripts: usize,
    pub articles: usize,
    pub quizzes: usize,
    pub resources: usize,
    pub external_links: usize,
}

pub struct CourseWriter {
    course_dir: PathBuf,
    tracked: Vec<TrackedResource>,
}

impl CourseWriter {
    pub fn new(course_dir: PathBuf) -> Self {
        Self {
            course_dir,
            tracked: Vec::new(),
        }
    }

    pub fn course_dir(&self) -> &Path {
        &self.course_dir
    }

    pub fn create_directory_structure(&self) -> AppResult<()> {
        for dir in CONTENT_DIRS {
            fs::create_dir_all(self.course_dir.join(dir))?;
        }
        let placeholder = self.course_dir.join(dirs::RESOURCES).join("git-repo.md");
        if !placeholder.exists() {
            fs::write(
                &placeholder,
                "# Course Repository\n\nIf the course references a Git repository, clone it here:\n\n```bash\ngit clone <repository-url>\n```\n",
            )?;
        }
        Ok(())
    }

    /// Transcript document: title header, then one `[MM:SS] text` line
    /// per cue. Stray markup in caption text is stripped.
    pub fn save_transcript(
        &self,
        lecture_number: usize,
        title: &str,
        cues: &[Cue],
    ) -> AppResult<PathBuf> {
        let mut doc = format!("# {title}\n\n---\n\n");
        for cue in cues {
            let text = markdown::clean_html_text(&cue.text);
            if !text.is_empty() {
                doc.push_str(&format!("[{}] {}\n", cue.time, text));
            }
        }

        let path = self
            .course_dir
            .join(dirs::TRANSCRIPTS)
            .join(utils::numbered_filename(lecture_number, title, "lecture", "md"));
        fs::write(&path, doc)?;
        debug!("wrote transcript {}", path.display());
        Ok(path)
    }

    pub fn save_article(&self, lecture_number: usize, article: &ArticleData) -> AppResult<PathBuf> {
        let minutes = article.time_estimation / 60;
        let doc = format!(
            "---\nlecture_number: {}\ntitle: \"{}\"\ntype: {}\nlecture_id: {}\nasset_type: {}\nestimated_time_minutes: {}\n---\n\n# {}\n\n{}\n",
            lecture_number,
            article.title.replace('"', "\\\""),
            article.article_type,
            article.lecture_id,
            article.asset_type,
            minutes,
            article.title,
            article.content,
        );

        let path = self
            .course_dir
            .join(dirs::ARTICLES)
            .join(utils::numbered_filename(lecture_number, &article.title, "lecture", "md"));
        fs::write(&path, doc)?;
        Ok(path)
    }

    pub fn save_quiz(
        &self,
        lecture_number: usize,
        quiz: &QuizContent,
        format: QuizFormat,
    ) -> AppResult<PathBuf> {
        let (ext, body) = match format {
            QuizFormat::Yaml => ("yaml", serde_yaml::to_string(quiz)?),
            QuizFormat::Json => ("json", serde_json::to_string_pretty(quiz)?),
        };
        let path = self
            .course_dir
            .join(dirs::QUIZZES)
            .join(utils::numbered_filename(lecture_number, &quiz.title, "quiz", ext));
        fs::write(&path, body)?;
        Ok(path)
    }

    /// Downloaded files land in a per-lecture folder under resources/.
    pub fn save_resource_file(
        &self,
        lecture_number: usize,
        lecture_title: &str,
        filename: &str,
        content: &[u8],
    ) -> AppResult<PathBuf> {
        let folder = self.course_dir.join(dirs::RESOURCES).join(format!(
            "{:03}-{}",
            lecture_number,
            utils::kebab_slug(lecture_title, "lecture")
        ));
        fs::create_dir_all(&folder)?;
        let path = folder.join(utils::sanitize_filename(filename));
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Records resource metadata for the DOWNLOADED_RESOURCES.md summary.
    pub fn track_resources(&mut self, section: &str, lecture_number: usize, data: &ResourceData) {
        for r in &data.resources {
            self.tracked.push(TrackedResource {
                section: section.to_string(),
                lecture_number,
                lecture_title: data.title.clone(),
                filename: r.filename.clone(),
                file_type: r.file_type.clone(),
                size: r.size,
                downloaded: r.downloaded(),
                has_url: r.url.is_some(),
            });
        }
    }

    pub fn save_external_links(&self, summary: &LinksSummary) -> AppResult<Option<PathBuf>> {
        if summary.total == 0 {
            return Ok(None);
        }

        let mut doc = format!(
            "# External Resources\n\n{} unique links were mentioned across the course content.\n",
            summary.total
        );
        for (key, label) in CATEGORY_LABELS {
            let Some(entries) = summary.by_category.get(key) else {
                continue;
            };
            doc.push_str(&format!("\n## {label}\n"));
            for entry in entries {
                doc.push_str(&format!("\n### [{}]({})\n\n", entry.domain, entry.url));
                for mention in &entry.mentions {
                    doc.push_str(&format!(
                        "- Lecture {}: {} ({})\n",
                        mention.lecture_number, mention.lecture_title, mention.content_type
                    ));
                }
            }
        }

        let path = self.course_dir.join("external-links.md");
        fs::write(&path, doc)?;
        Ok(Some(path))
    }

    pub fn save_resources_summary(
        &self,
        download_stats: DownloadStats,
        download_enabled: bool,
        max_file_size_mb: u64,
    ) -> AppResult<PathBuf> {
        let mut doc = String::from("# Downloaded Resources\n\n## Summary\n\n");
        doc.push_str(&format!(
            "- Downloaded: {} files ({})\n- Skipped (size limit): {}\n- Failed: {}\n",
            download_stats.downloaded,
            utils::format_size(download_stats.total_bytes),
            download_stats.skipped_size,
            download_stats.failed,
        ));

        let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.tracked {
            *by_type.entry(r.file_type.as_str()).or_default() += 1;
        }
        if !by_type.is_empty() {
            doc.push_str("\n## By File Type\n\n");
            for (file_type, count) in &by_type {
                doc.push_str(&format!("- {file_type}: {count}\n"));
            }
        }

        let mut by_section: BTreeMap<&str, Vec<&TrackedResource>> = BTreeMap::new();
        for r in &self.tracked {
            by_section.entry(r.section.as_str()).or_default().push(r);
        }
        for (section, resources) in &by_section {
            doc.push_str(&format!("\n## {section}\n\n"));
            for r in resources {
                let mark = if r.downloaded { "✓" } else { "○" };
                doc.push_str(&format!(
                    "- {mark} `{}` ({}) — lecture {:03} {}\n",
                    r.filename,
                    utils::format_size(r.size),
                    r.lecture_number,
                    r.lecture_title,
                ));
            }
        }

        let failed: Vec<&TrackedResource> = self
            .tracked
            .iter()
            .filter(|r| download_enabled && r.has_url && !r.downloaded)
            .collect();
        if !failed.is_empty() {
            doc.push_str("\n## Not Downloaded\n\n");
            for r in failed {
                let reason = if r.size / (1024 * 1024) > max_file_size_mb {
                    "over the size limit"
                } else {
                    "download failed"
                };
                doc.push_str(&format!("- `{}`: {reason}\n", r.filename));
            }
        }

        doc.push_str(&format!(
            "\n---\n\nDownload settings: enabled={download_enabled}, max file size={max_file_size_mb}MB\n"
        ));

        let path = self.course_dir.join("DOWNLOADED_RESOURCES.md");
        fs::write(&path, doc)?;
        Ok(path)
    }

    pub fn save_course_readme(&self, course: &Course, course_url: &str) -> AppResult<PathBuf> {
        let details = course.details.clone().unwrap_or_default();
        let instructor = details.visible_instructors.first();

        let sections_list: String = course
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {} ({} lectures)\n", i + 1, s.title, s.lectures.len()))
            .collect();

        let doc = README_TEMPLATE
            .replace("{COURSE_NAME}", &course.title)
            .replace("{COURSE_URL}", course_url)
            .replace("{DATE}", &Local::now().format("%Y-%m-%d").to_string())
            .replace(
                "{INSTRUCTOR_NAME}",
                instructor.and_then(|i| i.name()).unwrap_or("Unknown"),
            )
            .replace(
                "{COURSE_LEVEL}",
                if details.instructional_level.is_empty() {
                    "Unknown"
                } else {
                    &details.instructional_level
                },
            )
            .replace(
                "{COURSE_DURATION}",
                &format_duration(details.estimated_content_length),
            )
            .replace("{NUM_SUBSCRIBERS}", &group_thousands(details.num_subscribers))
            .replace("{COURSE_RATING}", &format!("{:.1}", details.rating))
            .replace(
                "{COURSE_DESCRIPTION}",
                if details.headline.is_empty() {
                    "_No description available._"
                } else {
                    &details.headline
                },
            )
            .replace("{COURSE_SECTIONS}", sections_list.trim_end())
            .replace(
                "{INSTRUCTOR_BIO}",
                instructor
                    .and_then(|i| i.job_title.as_deref())
                    .unwrap_or("_Not available._"),
            )
            .replace("{NUM_RATINGS}", &group_thousands(details.num_reviews))
            .replace(
                "{LAST_UPDATED}",
                if details.last_update_date.is_empty() {
                    "Unknown"
                } else {
                    &details.last_update_date
                },
            )
            .replace("{COURSE_SLUG}", &course.slug);

        let path = self.course_dir.join("README.md");
        fs::write(&path, doc)?;
        Ok(path)
    }

    /// Fills the extraction-details placeholders once the run finishes
    /// and the final counts are known.
    pub fn update_readme_with_stats(&self, course: &Course, stats: &ExtractionStats) -> AppResult<()> {
        let path = self.course_dir.join("README.md");
        let readme = fs::read_to_string(&path)?;

        let updated = readme
            .replace(
                "{EXTRACTION_DATE}",
                &Local::now().format("%Y-%m-%d %H:%M").to_string(),
            )
            .replace("{NUM_SECTIONS}", &course.sections.len().to_string())
            .replace("{NUM_LECTURES}", &course.total_lectures().to_string())
            .replace("{NUM_TRANSCRIPTS}", &stats.transcripts.to_string())
            .replace("{NUM_ARTICLES}", &stats.articles.to_string())
            .replace("{NUM_RESOURCES}", &stats.resources.to_string())
            .replace("{NUM_EXTERNAL_LINKS}", &stats.external_links.to_string())
            .replace(
                "{TRANSCRIPTS_SIZE}",
                &utils::format_size(dir_size(&self.course_dir.join(dirs::TRANSCRIPTS))),
            )
            .replace(
                "{ARTICLES_SIZE}",
                &utils::format_size(dir_size(&self.course_dir.join(dirs::ARTICLES))),
            )
            .replace(
                "{RESOURCES_SIZE}",
                &utils::format_size(dir_size(&self.course_dir.join(dirs::RESOURCES))),
            );

        fs::write(&path, updated)?;
        Ok(())
    }
}

fn dir_size(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|e| match e.metadata() {
            Ok(m) if m.is_dir() => dir_size(&e.path()),
            Ok(m) => m.len(),
            Err(_) => 0,
        })
        .sum()
}

/// Seconds to "5h 30m".
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::udemy::models::{CourseDetails, Instructor, Lecture, Section};
    use tempfile::tempdir;

    fn writer() -> (tempfile::TempDir, CourseWriter) {
        let dir = tempdir().unwrap();
        let writer = CourseWriter::new(dir.path().join("my-course"));
        writer.create_directory_structure().unwrap();
        (dir, writer)
    }

    fn sample_course() -> Course {
        Course {
            id: 42,
            slug: "threads-101".to_string(),
            title: "Threads 101".to_string(),
            details: Some(CourseDetails {
                title: "Threads 101".to_string(),
                headline: "Concurrency from the ground up.".to_string(),
                instructional_level: "Intermediate".to_string(),
                estimated_content_length: 19800,
                num_subscribers: 12500,
                num_reviews: 1400,
                rating: 4.672,
                visible_instructors: vec![Instructor {
                    display_name: Some("Ada Example".to_string()),
                    ..Instructor::default()
                }],
                ..CourseDetails::default()
            }),
            sections: vec![Section {
                id: 1,
                title: "Getting Started".to_string(),
                lectures: vec![Lecture {
                    id: 10,
                    title: "Welcome".to_string(),
                    asset: None,
                    supplementary_assets: Vec::new(),
                    quiz: None,
                }],
            }],
        }
    }

    #[test]
    fn directory_structure_includes_repo_placeholder() {
        let (_dir, writer) = writer();
        for sub in CONTENT_DIRS {
            assert!(writer.course_dir().join(sub).is_dir());
        }
        assert!(writer.course_dir().join("resources/git-repo.md").is_file());
    }

    #[test]
    fn transcript_file_has_timestamped_lines() {
        let (_dir, writer) = writer();
        let path = writer
            .save_transcript(
                3,
                "Intro to Threads",
                &[
                    Cue { time: "00:01".into(), text: "Hello <i>there</i>".into() },
                    Cue { time: "00:05".into(), text: "Welcome".into() },
                ],
            )
            .unwrap();
        assert!(path.ends_with("transcripts/003-intro-to-threads.md"));
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("# Intro to Threads\n\n---\n\n"));
        assert!(content.contains("[00:01] Hello there"));
        assert!(content.contains("[00:05] Welcome"));
    }

    #[test]
    fn article_file_carries_frontmatter() {
        let (_dir, writer) = writer();
        let article = ArticleData {
            lecture_id: 88,
            title: "Locks \"explained\"".to_string(),
            article_type: "general",
            content: "Body text.".to_string(),
            asset_type: "Article".to_string(),
            time_estimation: 300,
        };
        let path = writer.save_article(4, &article).unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("---\nlecture_number: 4\n"));
        assert!(content.contains("title: \"Locks \\\"explained\\\"\""));
        assert!(content.contains("estimated_time_minutes: 5"));
        assert!(content.contains("# Locks \"explained\"\n\nBody text."));
    }

    #[test]
    fn readme_placeholders_are_filled_in_two_passes() {
        let (_dir, mut writer) = writer();
        let course = sample_course();
        writer
            .save_course_readme(&course, "https://www.udemy.com/course/threads-101/")
            .unwrap();

        let readme = fs::read_to_string(writer.course_dir().join("README.md")).unwrap();
        assert!(readme.contains("# Threads 101"));
        assert!(readme.contains("**Instructor**: Ada Example"));
        assert!(readme.contains("**Duration**: 5h 30m"));
        assert!(readme.contains("**Students**: 12,500"));
        assert!(readme.contains("**Rating**: 4.7 (1,400 ratings)"));
        assert!(readme.contains("1. Getting Started (1 lectures)"));
        // Stats placeholders survive the first pass.
        assert!(readme.contains("{NUM_TRANSCRIPTS}"));

        let stats = ExtractionStats {
            transcripts: 9,
            articles: 2,
            quizzes: 1,
            resources: 3,
            external_links: 5,
        };
        writer.update_readme_with_stats(&course, &stats).unwrap();
        let readme = fs::read_to_string(writer.course_dir().join("README.md")).unwrap();
        assert!(readme.contains("| Transcripts | 9 ("));
        assert!(readme.contains("| External links | 5 |"));
        assert!(!readme.contains("{NUM_TRANSCRIPTS}"));
    }

    #[test]
    fn format_duration_examples() {
        assert_eq!(format_duration(19800), "5h 30m");
        assert_eq!(format_duration(540), "9m");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
