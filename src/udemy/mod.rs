// src/udemy/mod.rs
//
// Course extraction pipeline: resolve the course, walk the curriculum,
// and write transcripts, articles, quizzes and resources to disk.

pub mod api;
pub mod auth;
pub mod classify;
pub mod extractors;
pub mod markdown;
pub mod models;
pub mod progress;
pub mod vtt;
pub mod writer;

use crate::{
    cli::UdemyArgs,
    client::RobustClient,
    config::{self, AppConfig},
    constants,
    error::*,
    symbols, ui,
};
use api::UdemyClient;
use classify::ContentType;
use colored::Colorize;
use extractors::{
    ArticleExtractor, ExternalLinkScanner, ExtractorStats, QuizExtractor, ResourceExtractor,
};
use futures::{StreamExt, stream};
use log::{info, warn};
use models::{Course, Cue, Lecture, Section};
use progress::ProgressTracker;
use regex::Regex;
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::{Arc, LazyLock},
};
use writer::{CourseWriter, ExtractionStats};

static COURSE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/course/([^/?#]+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseUrl {
    pub slug: String,
    pub base_url: String,
}

/// Accepts full course URLs and bare slugs. The platform host is kept
/// so business-tier domains keep working.
pub fn parse_course_url(input: &str) -> AppResult<CourseUrl> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::Validation("Course URL cannot be empty".into()));
    }

    if let Some(caps) = COURSE_PATH_RE.captures(input) {
        let slug = caps[1].to_string();
        let base_url = match url::Url::parse(input) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => format!("{}://{host}", parsed.scheme()),
                None => constants::udemy::BASE_URL.to_string(),
            },
            Err(_) => constants::udemy::BASE_URL.to_string(),
        };
        return Ok(CourseUrl { slug, base_url });
    }

    if !input.contains('/') && !input.contains(' ') {
        return Ok(CourseUrl {
            slug: input.to_string(),
            base_url: constants::udemy::BASE_URL.to_string(),
        });
    }

    Err(AppError::Validation(format!(
        "Could not find a course slug in '{input}'. Expected .../course/<slug>/ or a bare slug."
    )))
}

fn parse_content_types(selection: &str) -> HashSet<&'static str> {
    const ALL: [&str; 4] = ["video", "article", "quiz", "resource"];
    let selection = selection.trim().to_lowercase();
    if selection.is_empty() || selection == "all" {
        return ALL.into_iter().collect();
    }
    ALL.into_iter()
        .filter(|t| selection.split(',').any(|s| s.trim() == *t))
        .collect()
}

/// Verifies access before creating any output: enrollment, course
/// details and curriculum. A missing transcript on the first video is
/// only a warning.
async fn preflight(client: &UdemyClient, slug: &str) -> AppResult<Course> {
    ui::print_sub_header("Pre-flight checks");

    println!("  [1/3] Checking enrollment...");
    let Some(course_id) = client.resolve_course_id(slug).await? else {
        return Err(AppError::Validation(format!(
            "You are not enrolled in '{slug}' (or the slug is wrong)."
        )));
    };
    println!("  {} Enrolled (course id {course_id})", *symbols::OK);

    println!("  [2/3] Fetching course details...");
    match client.course_details(course_id).await {
        Ok(details) => println!("  {} {}", *symbols::OK, details.title),
        Err(e) => println!("  {} Details unavailable: {e}", *symbols::WARN),
    }

    println!("  [3/3] Fetching course structure...");
    let Some(course) = client.course_structure(slug).await? else {
        return Err(AppError::Validation(
            "Could not retrieve the course curriculum.".into(),
        ));
    };
    println!(
        "  {} {} sections, {} lectures",
        *symbols::OK,
        course.sections.len(),
        course.total_lectures()
    );

    if let Some(lecture) = first_video_lecture(&course) {
        match client.lecture_transcript(course.id, lecture.id).await {
            Ok(Some(_)) => {}
            Ok(None) => println!(
                "  {} First video has no transcript; captions may be missing for this course",
                *symbols::WARN
            ),
            Err(e) => println!("  {} Transcript probe failed: {e}", *symbols::WARN),
        }
    }

    Ok(course)
}

fn first_video_lecture(course: &Course) -> Option<&Lecture> {
    course
        .sections
        .iter()
        .flat_map(|s| s.lectures.iter())
        .find(|l| classify::detect(l) == ContentType::Video)
}

/// Fetches transcripts for a batch of lectures concurrently. Request
/// pacing still applies inside the shared client.
async fn fetch_transcripts(
    client: &UdemyClient,
    course_id: u64,
    lectures: &[&Lecture],
    workers: usize,
) -> HashMap<u64, Vec<Cue>> {
    let results: Vec<(u64, Option<Vec<Cue>>)> = stream::iter(lectures.iter().map(|lecture| {
        let id = lecture.id;
        let title = lecture.title.clone();
        async move {
            match client.lecture_transcript(course_id, id).await {
                Ok(cues) => (id, cues),
                Err(e) => {
                    warn!("transcript fetch failed for '{title}': {e}");
                    (id, None)
                }
            }
        }
    }))
    .buffer_unordered(workers.max(1))
    .collect()
    .await;

    results
        .into_iter()
        .filter_map(|(id, cues)| cues.map(|c| (id, c)))
        .collect()
}

pub async fn run(args: &UdemyArgs) -> AppResult<()> {
    if args.cookies_help {
        let lines: Vec<&str> = constants::HELP_COOKIES_GUIDE.lines().collect();
        ui::box_message("How to export session cookies", &lines, |s| s.cyan());
        return Ok(());
    }

    let course_url = parse_course_url(&args.course_url)?;
    let wanted = parse_content_types(&args.content_types);
    if wanted.is_empty() {
        return Err(AppError::Validation(format!(
            "No valid content types in '{}'. Choose from video, article, quiz, resource.",
            args.content_types
        )));
    }

    ui::print_header(&format!("Course Extractor - {}", course_url.slug));

    let max_retries = if args.no_retry { 0 } else { args.max_retries };
    let app_config = Arc::new(AppConfig::new(max_retries, args.parallel_workers));
    let workers = if args.no_parallel { 1 } else { app_config.max_workers };

    let authenticator = auth::Authenticator::load(Path::new("."))?;
    if !authenticator.has_session_cookies() {
        println!(
            "  {} No session cookies found; API access will likely fail. See --cookies-help.",
            *symbols::WARN
        );
    }
    let http = RobustClient::with_headers(app_config, authenticator.headers()?)?;
    let client = UdemyClient::new(http, &course_url.base_url, Path::new("."));

    let course = preflight(&client, &course_url.slug).await?;

    let course_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config::extraction_root("udemy").join(&course.slug));
    let mut writer = CourseWriter::new(course_dir);
    writer.create_directory_structure()?;
    writer.save_course_readme(&course, &args.course_url)?;
    info!("writing course output to {}", writer.course_dir().display());

    let mut tracker = ProgressTracker::load(writer.course_dir());
    if args.no_resume {
        tracker.clear()?;
    } else if tracker.completed_count() > 0 {
        println!(
            "\n  {} Resuming: {} lectures already extracted",
            *symbols::INFO,
            tracker.completed_count()
        );
    }

    let mut articles = ArticleExtractor::new();
    let mut quizzes = QuizExtractor::new();
    let mut resources =
        ResourceExtractor::new(!args.no_download_resources, args.max_resource_size);
    let mut links = ExternalLinkScanner::new();
    let mut stats = ExtractionStats::default();

    let mut lecture_number = 0usize;
    for section in &course.sections {
        ui::print_sub_header(&section.title);

        let transcripts = prefetch_section_transcripts(
            &client, &course, section, &tracker, &wanted, workers,
        )
        .await;

        for lecture in &section.lectures {
            lecture_number += 1;
            if lecture.id == 0 {
                continue;
            }
            if tracker.is_complete(lecture.id) {
                println!("  [{lecture_number:03}] - {} (already done)", lecture.title);
                continue;
            }

            let content_type = classify::detect(lecture);
            if args.skip_promotional && content_type == ContentType::Promotional {
                println!("  [{lecture_number:03}] - {} (promotional)", lecture.title);
                tracker.mark_complete(lecture.id)?;
                continue;
            }

            let mut produced: Vec<&str> = Vec::new();

            if content_type == ContentType::Video && wanted.contains("video") {
                if let Some(cues) = transcripts.get(&lecture.id) {
                    let joined: String = cues
                        .iter()
                        .map(|c| c.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    links.scan_content(&joined, "transcript", lecture_number, &lecture.title);
                    writer.save_transcript(lecture_number, &lecture.title, cues)?;
                    stats.transcripts += 1;
                    produced.push("transcript");
                }
            }

            if content_type.is_article_like() && wanted.contains("article") {
                if let Some(article) = articles.extract(lecture) {
                    links.scan_content(&article.content, "article", lecture_number, &lecture.title);
                    writer.save_article(lecture_number, &article)?;
                    stats.articles += 1;
                    produced.push("article");
                }
            }

            if content_type == ContentType::Quiz && wanted.contains("quiz") {
                if let Some(quiz) = quizzes.extract(lecture, lecture_number) {
                    writer.save_quiz(lecture_number, &quiz, args.quiz_format)?;
                    stats.quizzes += 1;
                    produced.push("quiz");
                }
            }

            if wanted.contains("resource") && !lecture.supplementary_assets.is_empty() {
                if let Some(data) = resources.extract(&client, lecture).await {
                    for record in &data.resources {
                        if let Some(content) = &record.content {
                            writer.save_resource_file(
                                lecture_number,
                                &lecture.title,
                                &record.filename,
                                content,
                            )?;
                        }
                    }
                    stats.resources += data.resources.len();
                    writer.track_resources(&section.title, lecture_number, &data);
                    produced.push("resources");
                }
            }

            if produced.is_empty() {
                println!(
                    "  [{lecture_number:03}] - {} ({})",
                    lecture.title,
                    content_type.label()
                );
            } else {
                println!(
                    "  [{lecture_number:03}] {} {} [{}]",
                    *symbols::OK,
                    lecture.title,
                    produced.join(", ")
                );
            }
            tracker.mark_complete(lecture.id)?;
        }
    }

    let summary = links.summary();
    stats.external_links = summary.total;
    writer.save_external_links(&summary)?;
    if wanted.contains("resource") {
        writer.save_resources_summary(
            resources.download_stats(),
            !args.no_download_resources,
            args.max_resource_size,
        )?;
    }
    writer.update_readme_with_stats(&course, &stats)?;
    tracker.clear()?;

    if client.has_new_endpoints() {
        client.update_api_documentation()?;
        println!("  {} API.md updated with newly discovered endpoints", *symbols::INFO);
    }

    ui::print_sub_header("Extraction complete");
    println!("  Transcripts: {}", stats.transcripts);
    println!("  Articles:    {}{}", stats.articles, tally_note(articles.stats()));
    println!("  Quizzes:     {}{}", stats.quizzes, tally_note(quizzes.stats()));
    println!("  Resources:   {}{}", stats.resources, tally_note(resources.stats()));
    println!("  Links found: {}", stats.external_links);
    let dl = resources.download_stats();
    if dl.downloaded > 0 || dl.failed > 0 || dl.skipped_size > 0 {
        println!(
            "  Downloads:   {} ok, {} skipped (size), {} failed",
            dl.downloaded, dl.skipped_size, dl.failed
        );
    }
    println!("\n  Output: {}", writer.course_dir().display());

    Ok(())
}

/// Trailing annotation for the summary lines, empty when every attempt
/// succeeded cleanly.
fn tally_note(stats: ExtractorStats) -> String {
    let mut notes = Vec::new();
    if stats.partial > 0 {
        notes.push(format!("{} partial", stats.partial));
    }
    if stats.failed > 0 {
        notes.push(format!("{} failed", stats.failed));
    }
    if stats.skipped > 0 {
        notes.push(format!("{} skipped", stats.skipped));
    }
    if notes.is_empty() {
        String::new()
    } else {
        format!(" ({})", notes.join(", "))
    }
}

async fn prefetch_section_transcripts(
    client: &UdemyClient,
    course: &Course,
    section: &Section,
    tracker: &ProgressTracker,
    wanted: &HashSet<&'static str>,
    workers: usize,
) -> HashMap<u64, Vec<Cue>> {
    if !wanted.contains("video") {
        return HashMap::new();
    }
    let pending: Vec<&Lecture> = section
        .lectures
        .iter()
        .filter(|l| {
            l.id != 0 && !tracker.is_complete(l.id) && classify::detect(l) == ContentType::Video
        })
        .collect();
    if pending.is_empty() {
        return HashMap::new();
    }
    fetch_transcripts(client, course.id, &pending, workers).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_course_urls() {
        let parsed =
            parse_course_url("https://www.udemy.com/course/java-multithreading/learn/lecture/1")
                .unwrap();
        assert_eq!(parsed.slug, "java-multithreading");
        assert_eq!(parsed.base_url, "https://www.udemy.com");
    }

    #[test]
    fn keeps_business_tier_hosts() {
        let parsed = parse_course_url("https://acme.udemy.com/course/rust-basics/").unwrap();
        assert_eq!(parsed.base_url, "https://acme.udemy.com");
    }

    #[test]
    fn accepts_bare_slugs() {
        let parsed = parse_course_url("rust-basics").unwrap();
        assert_eq!(parsed.slug, "rust-basics");
        assert_eq!(parsed.base_url, constants::udemy::BASE_URL);
    }

    #[test]
    fn rejects_urls_without_a_course_path() {
        assert!(parse_course_url("https://www.udemy.com/cart/").is_err());
        assert!(parse_course_url("").is_err());
    }

    #[test]
    fn content_type_selection_parsing() {
        assert_eq!(parse_content_types("all").len(), 4);
        let only = parse_content_types("video, quiz");
        assert!(only.contains("video"));
        assert!(only.contains("quiz"));
        assert!(!only.contains("article"));
        assert!(parse_content_types("bogus").is_empty());
    }

    #[test]
    fn tally_note_reports_imperfect_runs_only() {
        assert_eq!(tally_note(ExtractorStats::default()), "");
        let stats = ExtractorStats {
            success: 3,
            partial: 1,
            failed: 2,
            skipped: 0,
        };
        assert_eq!(tally_note(stats), " (1 partial, 2 failed)");
    }
}
