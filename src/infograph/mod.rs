// src/infograph/mod.rs
//
// Infographic rendering through a generative image API. Two engines:
// `gemini` calls the API directly and saves the returned images,
// `nanobanana` compiles an optimized prompt file for manual rendering.

mod prompt;

use crate::{
    cli::{ImageEngine, ImageMode, InfographArgs},
    client::RobustClient,
    config::{self, AppConfig},
    constants,
    error::*,
    symbols, ui,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Local;
use log::info;
use prompt::Layout;
use serde_json::{Value, json};
use std::{fs, path::Path, sync::Arc};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub async fn run(args: &InfographArgs) -> AppResult<()> {
    ui::print_header("Infographic Generator");
    fs::create_dir_all(&args.output_dir)?;

    let prompt = compile_prompt(args)?;

    match args.engine {
        ImageEngine::Gemini => render_via_api(args, &prompt).await,
        ImageEngine::Nanobanana => save_prompt_file(args, &prompt),
    }
}

fn compile_prompt(args: &InfographArgs) -> AppResult<String> {
    match args.mode {
        ImageMode::Text => {
            let path = args.prompt_file.as_deref().ok_or_else(|| {
                AppError::Validation("--prompt-file is required in text mode".into())
            })?;
            Ok(fs::read_to_string(path)?)
        }
        ImageMode::Structured => {
            let path = args.layout_file.as_deref().ok_or_else(|| {
                AppError::Validation("--layout-file is required in structured mode".into())
            })?;
            let layout: Layout = serde_json::from_str(&fs::read_to_string(path)?)?;
            Ok(match args.engine {
                ImageEngine::Gemini => prompt::structured_prompt(&layout),
                ImageEngine::Nanobanana => prompt::nanobanana_prompt(&layout),
            })
        }
    }
}

async fn render_via_api(args: &InfographArgs, prompt: &str) -> AppResult<()> {
    let api_key = config::gemini_api_key().ok_or_else(|| {
        AppError::Validation(
            "GEMINI_API_KEY is not set. Get a key at https://aistudio.google.com/apikey".into(),
        )
    })?;

    let app_config = Arc::new(AppConfig::new(constants::DEFAULT_MAX_RETRIES, 1));
    let http = RobustClient::new(app_config)?;

    let url = format!("{API_BASE}/models/{}:generateContent?key={api_key}", args.model);
    let body = json!({
        "contents": [{"role": "user", "parts": [{"text": prompt}]}],
        "generationConfig": {"responseModalities": ["IMAGE", "TEXT"]},
    });
    println!("  Requesting {} render...", args.model);
    let response = http.post_json(&url, &body).await?;

    let saved = save_response_parts(&response, &args.output_dir, &args.basename)?;
    if saved == 0 {
        return Err(AppError::Validation(
            "The API returned no image data. Check the model name and prompt.".into(),
        ));
    }
    println!("  {} {saved} image(s) written to {}", *symbols::OK, args.output_dir.display());
    Ok(())
}

/// Saves every inline image part; any text part lands next to the
/// images as `{basename}.txt`.
fn save_response_parts(response: &Value, outdir: &Path, basename: &str) -> AppResult<usize> {
    let parts = response["candidates"][0]["content"]["parts"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let mut file_index = 0;
    for part in &parts {
        if let Some(data) = part["inlineData"]["data"].as_str() {
            let bytes = BASE64.decode(data)?;
            let ext = extension_for(part["inlineData"]["mimeType"].as_str().unwrap_or(""));
            let path = outdir.join(format!("{basename}_{file_index}_{timestamp}.{ext}"));
            fs::write(&path, bytes)?;
            info!("saved image {}", path.display());
            file_index += 1;
        } else if let Some(text) = part["text"].as_str() {
            fs::write(outdir.join(format!("{basename}.txt")), text)?;
        }
    }
    Ok(file_index)
}

fn save_prompt_file(args: &InfographArgs, prompt: &str) -> AppResult<()> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = args
        .output_dir
        .join(format!("{}_{timestamp}_nanobanana_prompt.txt", args.basename));
    fs::write(&path, prompt)?;
    println!("  {} Prompt saved for rendering: {}", *symbols::OK, path.display());
    println!("  Paste it into the image model of your choice to generate the visual.");
    Ok(())
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn saves_inline_images_and_text() {
        let dir = tempdir().unwrap();
        let response = json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": BASE64.encode(b"fakepng")}},
                {"text": "Here is your infographic."},
            ]}}]
        });
        let saved = save_response_parts(&response, dir.path(), "infographic").unwrap();
        assert_eq!(saved, 1);

        let entries: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(entries.iter().any(|n| n.starts_with("infographic_0_") && n.ends_with(".png")));
        assert!(entries.contains(&"infographic.txt".to_string()));
    }

    #[test]
    fn empty_response_saves_nothing() {
        let dir = tempdir().unwrap();
        let saved = save_response_parts(&json!({}), dir.path(), "x").unwrap();
        assert_eq!(saved, 0);
    }

    #[test]
    fn mime_extension_mapping() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("application/octet-stream"), "png");
    }
}
