// src/youtube/mod.rs
//
// Video and playlist extraction: transcripts, metadata and thumbnails.

pub mod client;
pub mod models;
pub mod transcript;

use crate::{
    cli::YoutubeArgs,
    client::RobustClient,
    config::{self, AppConfig},
    constants,
    error::*,
    symbols, ui, utils,
};
use chrono::Local;
use client::{ParsedUrl, YoutubeClient};
use log::info;
use models::{PlaylistMetadata, VideoMetadata};
use std::{fs, path::PathBuf, sync::Arc};
use transcript::TranscriptExtractor;
use writer::VideoWriter;

pub async fn run(args: &YoutubeArgs) -> AppResult<()> {
    let parsed = client::parse_url(&args.url)?;

    ui::print_header("Video Extractor");
    let app_config = Arc::new(AppConfig::new(constants::DEFAULT_MAX_RETRIES, 1));
    let http = RobustClient::new(app_config)?;
    let yt = YoutubeClient::new(http);
    let mut transcripts = TranscriptExtractor::new("en");

    match parsed {
        ParsedUrl::Video { video_id } => {
            extract_video(&yt, &mut transcripts, &video_id, args).await?;
        }
        ParsedUrl::Playlist { playlist_id } => {
            extract_playlist(&yt, &mut transcripts, &playlist_id, args).await?;
        }
    }

    let stats = transcripts.stats();
    if stats.no_transcript > 0 || stats.failed > 0 {
        println!(
            "\n  {} {} videos had no transcript, {} fetch failures",
            *symbols::WARN,
            stats.no_transcript,
            stats.failed
        );
    }
    Ok(())
}

fn output_dir(args: &YoutubeArgs, title: &str) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        config::extraction_root("youtube").join(utils::kebab_slug(title, "video"))
    })
}

async fn extract_video(
    yt: &YoutubeClient,
    transcripts: &mut TranscriptExtractor,
    video_id: &str,
    args: &YoutubeArgs,
) -> AppResult<()> {
    println!("  Fetching metadata for {video_id}...");
    let metadata = yt.video_metadata(video_id).await?;
    println!("  {} {}", *symbols::OK, metadata.title);

    let writer = VideoWriter::new(output_dir(args, &metadata.title));
    writer.create_directory_structure()?;
    info!("writing video output to {}", writer.root().display());

    match transcripts.extract(yt, video_id).await {
        Some(t) => {
            let doc = transcript::format_as_markdown(&t, &metadata.title, &metadata.url);
            writer.save_transcript(&doc, "transcript")?;
            println!("  {} Transcript saved", *symbols::OK);
        }
        None => println!("  {} No transcript available", *symbols::WARN),
    }

    if !args.transcript_only {
        writer.save_metadata_json(&metadata)?;
        writer.save_video_readme(&metadata)?;
        match yt.http().get(&metadata.thumbnail_url).await {
            Ok(res) => {
                let bytes = res.bytes().await?;
                writer.save_thumbnail(&bytes, "thumbnail", &metadata.thumbnail_url)?;
                println!("  {} Thumbnail saved", *symbols::OK);
            }
            Err(e) => println!("  {} Thumbnail download failed: {e}", *symbols::WARN),
        }
    }

    println!("\n  Output: {}", writer.root().display());
    Ok(())
}

async fn extract_playlist(
    yt: &YoutubeClient,
    transcripts: &mut TranscriptExtractor,
    playlist_id: &str,
    args: &YoutubeArgs,
) -> AppResult<()> {
    println!("  Fetching playlist {playlist_id}...");
    let metadata = yt.playlist_metadata(playlist_id).await?;
    println!(
        "  {} {} ({} videos)",
        *symbols::OK,
        metadata.title,
        metadata.video_count()
    );
    if metadata.videos.is_empty() {
        return Err(AppError::Validation(
            "No videos found in the playlist (it may be private).".into(),
        ));
    }

    let writer = VideoWriter::new(output_dir(args, &metadata.title));
    writer.create_directory_structure()?;
    info!("writing playlist output to {}", writer.root().display());

    if !args.transcript_only {
        writer.save_metadata_json(&metadata)?;
        writer.save_playlist_readme(&metadata)?;
    }

    let total = metadata.video_count();
    for (idx, video) in metadata.videos.iter().enumerate() {
        let number = idx + 1;
        let filename = format!("{:03}-{}", number, utils::kebab_slug(&video.title, "video"));
        println!("  [{number:03}/{total:03}] {}", video.title);

        if !args.no_resume && writer.transcript_exists(&filename) {
            println!("    - already extracted");
            continue;
        }

        match transcripts.extract(yt, &video.id).await {
            Some(t) => {
                let doc = transcript::format_as_markdown(&t, &video.title, &video.url);
                writer.save_transcript(&doc, &filename)?;
                println!("    {} Transcript saved", *symbols::OK);
            }
            None => println!("    {} No transcript available", *symbols::WARN),
        }
    }

    ui::print_sub_header("Playlist extraction complete");
    let stats = transcripts.stats();
    println!("  Videos:      {total}");
    println!("  Transcripts: {}", stats.success);
    println!("  Missing:     {}", stats.no_transcript);
    println!("  Failed:      {}", stats.failed);
    println!("\n  Output: {}", writer.root().display());
    Ok(())
}

mod writer {
    use super::*;

    pub struct VideoWriter {
        root: PathBuf,
    }

    impl VideoWriter {
        pub fn new(root: PathBuf) -> Self {
            Self { root }
        }

        pub fn root(&self) -> &std::path::Path {
            &self.root
        }

        pub fn create_directory_structure(&self) -> AppResult<()> {
            fs::create_dir_all(self.root.join("resources"))?;
            Ok(())
        }

        pub fn transcript_exists(&self, filename: &str) -> bool {
            self.root.join(format!("{filename}.md")).exists()
        }

        pub fn save_transcript(&self, markdown: &str, filename: &str) -> AppResult<PathBuf> {
            let path = self.root.join(format!("{filename}.md"));
            fs::write(&path, markdown)?;
            Ok(path)
        }

        pub fn save_metadata_json<T: serde::Serialize>(&self, metadata: &T) -> AppResult<()> {
            utils::write_json_atomic(&self.root.join("metadata.json"), metadata)
        }

        pub fn save_thumbnail(&self, bytes: &[u8], filename: &str, url: &str) -> AppResult<PathBuf> {
            let ext = if url.contains(".png") {
                "png"
            } else if url.contains(".webp") {
                "webp"
            } else {
                "jpg"
            };
            let path = self.root.join("resources").join(format!("{filename}.{ext}"));
            fs::write(&path, bytes)?;
            Ok(path)
        }

        pub fn save_video_readme(&self, metadata: &VideoMetadata) -> AppResult<()> {
            let mut doc = format!(
                "# {}\n\n## Video Information\n\n**Channel:** {}\n**Duration:** {}\n**Upload Date:** {}\n**Views:** {}\n**URL:** {}\n\n## Description\n\n{}\n",
                metadata.title,
                metadata.channel,
                metadata.duration.as_deref().unwrap_or("Unknown"),
                metadata.upload_date.as_deref().unwrap_or("Unknown"),
                metadata
                    .view_count
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                metadata.url,
                if metadata.description.is_empty() {
                    "No description available."
                } else {
                    &metadata.description
                },
            );

            if !metadata.chapters.is_empty() {
                doc.push_str("\n## Chapters\n\n");
                for chapter in &metadata.chapters {
                    doc.push_str(&format!("- **{}** - {}\n", chapter.timestamp, chapter.title));
                }
            }
            doc.push_str(&format!("\n---\n\n**Extracted:** {}\n", Local::now().to_rfc3339()));

            fs::write(self.root.join("README.md"), doc)?;
            Ok(())
        }

        pub fn save_playlist_readme(&self, metadata: &PlaylistMetadata) -> AppResult<()> {
            let mut doc = format!(
                "# {}\n\n## Playlist Information\n\n**Videos:** {}\n**URL:** {}\n",
                metadata.title,
                metadata.video_count(),
                metadata.url,
            );
            if !metadata.description.is_empty() {
                doc.push_str(&format!("\n## Description\n\n{}\n", metadata.description));
            }
            doc.push_str("\n## Videos\n\n");
            for (idx, video) in metadata.videos.iter().enumerate() {
                doc.push_str(&format!("{}. [{}]({})\n", idx + 1, video.title, video.url));
            }
            doc.push_str(&format!("\n---\n\n**Extracted:** {}\n", Local::now().to_rfc3339()));

            fs::write(self.root.join("README.md"), doc)?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::youtube::models::{Chapter, PlaylistVideo};
        use tempfile::tempdir;

        fn video_metadata() -> VideoMetadata {
            VideoMetadata {
                id: "dQw4w9WgXcQ".to_string(),
                url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
                title: "Rust Intro".to_string(),
                channel: "Systems Channel".to_string(),
                description: "Learn the basics.".to_string(),
                duration: Some("12:34".to_string()),
                upload_date: Some("2024-03-01".to_string()),
                view_count: Some(1500),
                thumbnail_url: "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg".to_string(),
                chapters: vec![Chapter {
                    timestamp: "0:00".to_string(),
                    title: "Welcome".to_string(),
                }],
            }
        }

        #[test]
        fn video_readme_lists_chapters() {
            let dir = tempdir().unwrap();
            let writer = VideoWriter::new(dir.path().to_path_buf());
            writer.create_directory_structure().unwrap();
            writer.save_video_readme(&video_metadata()).unwrap();

            let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
            assert!(readme.starts_with("# Rust Intro"));
            assert!(readme.contains("**Channel:** Systems Channel"));
            assert!(readme.contains("- **0:00** - Welcome"));
        }

        #[test]
        fn playlist_readme_numbers_videos() {
            let dir = tempdir().unwrap();
            let writer = VideoWriter::new(dir.path().to_path_buf());
            writer.create_directory_structure().unwrap();
            writer
                .save_playlist_readme(&PlaylistMetadata {
                    id: "PL1".to_string(),
                    url: "https://www.youtube.com/playlist?list=PL1".to_string(),
                    title: "Rust Course".to_string(),
                    description: String::new(),
                    videos: vec![PlaylistVideo {
                        id: "dQw4w9WgXcQ".to_string(),
                        title: "Episode One".to_string(),
                        url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
                    }],
                })
                .unwrap();

            let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
            assert!(readme.contains("**Videos:** 1"));
            assert!(readme.contains("1. [Episode One](https://www.youtube.com/watch?v=dQw4w9WgXcQ)"));
        }

        #[test]
        fn transcript_resume_check() {
            let dir = tempdir().unwrap();
            let writer = VideoWriter::new(dir.path().to_path_buf());
            writer.create_directory_structure().unwrap();
            assert!(!writer.transcript_exists("001-intro"));
            writer.save_transcript("# Intro\n", "001-intro").unwrap();
            assert!(writer.transcript_exists("001-intro"));
        }
    }
}
