// src/udemy/api.rs

use super::{
    models::{
        Course, CourseDetails, Cue, CurriculumItem, EnrolledCourse, Lecture, LectureDetails, Page,
        Section,
    },
    vtt,
};
use crate::{client::RobustClient, constants, error::*};
use chrono::Local;
use log::{debug, info, warn};
use std::{fs::OpenOptions, io::Write, path::PathBuf, sync::Mutex};

const DETAIL_FIELDS: &str = "title,headline,description,instructional_level,\
estimated_content_length,num_subscribers,rating,visible_instructors,\
locale,created,published_time";

const CURRICULUM_FIELDS: &str = "fields[asset]=results,title,external_url,time_estimation,\
download_urls,slide_urls,filename,asset_type,captions,media_license_token,course_is_drmed,\
media_sources,stream_urls,body\
&fields[chapter]=object_index,title,sort_order\
&fields[lecture]=id,title,object_index,asset,supplementary_assets,view_html";

// Candidate curriculum endpoints, tried in order when the documented
// one stops answering.
const DISCOVERY_PATTERNS: [&str; 4] = [
    "/api-2.0/courses/{course_id}/cached-subscriber-curriculum-items",
    "/api-2.0/courses/{course_id}/curriculum-items",
    "/api-2.0/courses/{course_id}/public-curriculum-items",
    "/api-2.0/courses/{course_id}/subscriber-curriculum-items",
];

#[derive(Debug, Clone)]
struct DiscoveredEndpoint {
    kind: &'static str,
    pattern: String,
    description: &'static str,
    example_response: String,
}

/// Course platform API client. Pagination, slug resolution and endpoint
/// discovery live here; the HTTP layer (retries, pacing, auth headers)
/// is the shared RobustClient.
pub struct UdemyClient {
    http: RobustClient,
    base_url: String,
    api_doc_file: PathBuf,
    discovered: Mutex<Vec<DiscoveredEndpoint>>,
}

impl UdemyClient {
    pub fn new(http: RobustClient, base_url: &str, project_root: &std::path::Path) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_doc_file: project_root.join("API.md"),
            discovered: Mutex::new(Vec::new()),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Numeric identifiers pass through; slugs are matched against the
    /// enrolled course list page by page.
    pub async fn resolve_course_id(&self, course_slug: &str) -> AppResult<Option<u64>> {
        if let Ok(id) = course_slug.parse::<u64>() {
            return Ok(Some(id));
        }

        let mut page = 1;
        loop {
            let endpoint = format!(
                "/api-2.0/users/me/subscribed-courses/?page_size={}&page={}",
                constants::udemy::SUBSCRIBED_COURSES_PAGE_SIZE,
                page
            );
            let value = self.http.get_json(&self.url(&endpoint)).await?;
            let parsed: Page<EnrolledCourse> = serde_json::from_value(value)?;

            if parsed.results.is_empty() {
                break;
            }
            for course in &parsed.results {
                if course.url.contains(course_slug) || course.published_title == course_slug {
                    info!("resolved '{course_slug}' to course id {}", course.id);
                    return Ok(Some(course.id));
                }
            }
            if parsed.next.is_none() {
                break;
            }
            page += 1;
        }

        warn!("course slug '{course_slug}' not found in enrolled courses");
        Ok(None)
    }

    pub async fn course_details(&self, course_id: u64) -> AppResult<CourseDetails> {
        let endpoint = format!("/api-2.0/courses/{course_id}/?fields[course]={DETAIL_FIELDS}");
        let value = self.http.get_json(&self.url(&endpoint)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetches the full curriculum and folds the flat chapter/lecture
    /// stream into sections. Lectures before the first chapter go into
    /// a default "Main Content" section.
    pub async fn course_structure(&self, course_slug: &str) -> AppResult<Option<Course>> {
        let Some(course_id) = self.resolve_course_id(course_slug).await? else {
            return Ok(None);
        };
        let details = match self.course_details(course_id).await {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("could not fetch course details: {e}");
                None
            }
        };

        let mut all_items: Vec<CurriculumItem> = Vec::new();
        let mut page = 1;
        loop {
            let endpoint = format!(
                "/api-2.0/courses/{course_id}/subscriber-curriculum-items/?{CURRICULUM_FIELDS}&page_size={}&page={}",
                constants::udemy::CURRICULUM_PAGE_SIZE,
                page
            );
            debug!("requesting curriculum page {page}");
            let value = match self.http.get_json(&self.url(&endpoint)).await {
                Ok(v) => v,
                Err(e) if page == 1 => {
                    warn!("documented curriculum endpoint failed ({e}), attempting discovery");
                    return self.discover_course_structure(course_id, course_slug, details).await;
                }
                Err(_) => break,
            };
            let parsed: Page<CurriculumItem> = serde_json::from_value(value)?;
            if parsed.results.is_empty() {
                break;
            }
            all_items.extend(parsed.results);
            if parsed.next.is_none() {
                break;
            }
            page += 1;
        }

        if all_items.is_empty() {
            return Ok(None);
        }
        info!("retrieved {} curriculum items across {page} page(s)", all_items.len());
        Ok(Some(build_course(all_items, course_slug, course_id, details)))
    }

    async fn discover_course_structure(
        &self,
        course_id: u64,
        course_slug: &str,
        details: Option<CourseDetails>,
    ) -> AppResult<Option<Course>> {
        for pattern in DISCOVERY_PATTERNS {
            let endpoint = pattern.replace("{course_id}", &course_id.to_string());
            debug!("trying {endpoint}");
            let Ok(value) = self.http.get_json(&self.url(&endpoint)).await else {
                continue;
            };
            let Ok(parsed) = serde_json::from_value::<Page<CurriculumItem>>(value.clone()) else {
                continue;
            };
            if parsed.results.is_empty() {
                continue;
            }

            if let Ok(mut discovered) = self.discovered.lock() {
                discovered.push(DiscoveredEndpoint {
                    kind: "course_structure",
                    pattern: pattern.to_string(),
                    description: "Course structure (sections and lectures)",
                    example_response: truncate_json(&value, 500),
                });
            }
            return Ok(Some(build_course(parsed.results, course_slug, course_id, details)));
        }
        warn!("could not discover a working curriculum endpoint");
        Ok(None)
    }

    /// English captions preferred; returns None when the lecture has no
    /// usable transcript rather than failing the run.
    pub async fn lecture_transcript(
        &self,
        course_id: u64,
        lecture_id: u64,
    ) -> AppResult<Option<Vec<Cue>>> {
        let endpoint = format!(
            "/api-2.0/users/me/subscribed-courses/{course_id}/lectures/{lecture_id}/?fields[asset]=captions&fields[lecture]=asset"
        );
        let value = self.http.get_json(&self.url(&endpoint)).await?;
        let details: LectureDetails = serde_json::from_value(value)?;

        let captions = details.asset.map(|a| a.captions).unwrap_or_default();
        if captions.is_empty() {
            debug!("no captions for lecture {lecture_id}");
            return Ok(None);
        }

        let Some(vtt_url) = captions
            .iter()
            .find(|c| c.locale_id.starts_with("en"))
            .and_then(|c| c.url.clone())
        else {
            debug!("no English captions for lecture {lecture_id}");
            return Ok(None);
        };

        // VTT URLs carry short-lived secure tokens; a 403 here means the
        // token expired, not that auth is broken.
        let content = self.http.get_text(&vtt_url).await?;
        let cues = vtt::parse(&content);
        if cues.is_empty() {
            return Ok(None);
        }
        Ok(Some(cues))
    }

    pub async fn download_resource(&self, url: &str) -> AppResult<Vec<u8>> {
        let res = self.http.get(url).await?;
        Ok(res.bytes().await?.to_vec())
    }

    pub fn has_new_endpoints(&self) -> bool {
        self.discovered.lock().map(|d| !d.is_empty()).unwrap_or(false)
    }

    /// Appends newly discovered endpoints to API.md so the next run can
    /// start from the documented pattern.
    pub fn update_api_documentation(&self) -> AppResult<()> {
        let discovered = match self.discovered.lock() {
            Ok(d) => d.clone(),
            Err(_) => return Ok(()),
        };
        if discovered.is_empty() {
            return Ok(());
        }

        let mut section = String::from("\n\n---\n\n## Discovered Endpoints\n\n");
        section.push_str(&format!(
            "**Discovery Date**: {}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        for endpoint in &discovered {
            section.push_str(&format!("### {}\n\n", endpoint.kind));
            section.push_str(&format!("**Description**: {}\n\n", endpoint.description));
            section.push_str(&format!(
                "**Endpoint Pattern**:\n```\n{}\n```\n\n",
                endpoint.pattern
            ));
            section.push_str(&format!(
                "**Example Response**:\n```json\n{}\n```\n\n",
                endpoint.example_response
            ));
        }

        if !self.api_doc_file.exists() {
            std::fs::write(&self.api_doc_file, "# Udemy API Documentation\n\n")?;
        }
        let mut file = OpenOptions::new().append(true).open(&self.api_doc_file)?;
        file.write_all(section.as_bytes())?;
        Ok(())
    }
}

fn build_course(
    items: Vec<CurriculumItem>,
    course_slug: &str,
    course_id: u64,
    details: Option<CourseDetails>,
) -> Course {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for item in items {
        match item.class.as_str() {
            "chapter" => {
                if let Some(section) = current.take() {
                    sections.push(section);
                }
                current = Some(Section {
                    id: item.id,
                    title: item.title,
                    lectures: Vec::new(),
                });
            }
            "lecture" => {
                let section = current.get_or_insert_with(|| Section {
                    id: 0,
                    title: "Main Content".to_string(),
                    lectures: Vec::new(),
                });
                section.lectures.push(Lecture {
                    id: item.id,
                    title: item.title,
                    asset: item.asset,
                    supplementary_assets: item.supplementary_assets,
                    quiz: item.quiz,
                });
            }
            _ => {}
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }

    let fallback_title = course_slug
        .split('-')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let title = details
        .as_ref()
        .map(|d| d.title.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or(fallback_title);

    Course {
        id: course_id,
        slug: course_slug.to_string(),
        title,
        details,
        sections,
    }
}

fn truncate_json(value: &serde_json::Value, max_length: usize) -> String {
    let json = serde_json::to_string_pretty(value).unwrap_or_default();
    if json.len() > max_length {
        let cut = json
            .char_indices()
            .take_while(|(i, _)| *i < max_length)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}\n  ...\n}}", &json[..cut])
    } else {
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(class: &str, id: u64, title: &str) -> CurriculumItem {
        serde_json::from_value(json!({
            "_class": class,
            "id": id,
            "title": title,
        }))
        .unwrap()
    }

    #[test]
    fn curriculum_folds_into_sections() {
        let items = vec![
            item("chapter", 10, "Getting Started"),
            item("lecture", 11, "Welcome"),
            item("lecture", 12, "Setup"),
            item("chapter", 20, "Core Topics"),
            item("lecture", 21, "Threads"),
        ];
        let course = build_course(items, "java-threads", 99, None);
        assert_eq!(course.sections.len(), 2);
        assert_eq!(course.sections[0].title, "Getting Started");
        assert_eq!(course.sections[0].lectures.len(), 2);
        assert_eq!(course.sections[1].lectures[0].id, 21);
        assert_eq!(course.total_lectures(), 3);
    }

    #[test]
    fn lectures_before_any_chapter_get_a_default_section() {
        let items = vec![item("lecture", 1, "Orientation")];
        let course = build_course(items, "intro", 7, None);
        assert_eq!(course.sections.len(), 1);
        assert_eq!(course.sections[0].title, "Main Content");
    }

    #[test]
    fn title_falls_back_to_slug_words() {
        let course = build_course(vec![], "react-complete-guide", 1, None);
        assert_eq!(course.title, "React Complete Guide");
    }

    #[test]
    fn truncates_long_json_examples() {
        let value = json!({"key": "x".repeat(1000)});
        let out = truncate_json(&value, 100);
        assert!(out.len() < 200);
        assert!(out.ends_with("}"));
    }
}
