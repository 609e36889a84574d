// src/udemy/auth.rs

use crate::{error::*, ui};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// Session material for the course API.
///
/// Cookies come from `cookies.json` (a plain map, or the object-array
/// format browser extensions export). Credentials come from `.env`;
/// placeholder values copied from `.env.example` are treated as absent.
pub struct Authenticator {
    env_file: PathBuf,
    credentials: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl Authenticator {
    pub fn load(project_root: &Path) -> AppResult<Self> {
        let mut auth = Self {
            env_file: project_root.join(".env"),
            credentials: BTreeMap::new(),
            cookies: BTreeMap::new(),
        };

        auth.load_cookies(&project_root.join("cookies.json"))?;
        if auth.env_file.exists() {
            auth.read_env_file()?;
        }
        auth.adopt_env_tokens();

        if !auth.has_valid_credentials() && auth.cookies.is_empty() {
            warn!("no cookies.json and no usable .env credentials found");
            auth.prompt_for_credentials()?;
        }

        Ok(auth)
    }

    fn load_cookies(&mut self, cookies_file: &Path) -> AppResult<()> {
        if !cookies_file.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(cookies_file)?;
        let data: Value = serde_json::from_str(&content).map_err(|e| {
            AppError::UserInputError(format!("Invalid JSON in cookies.json: {e}"))
        })?;

        match data {
            Value::Object(map) => {
                for (name, value) in map {
                    if let Some(v) = value.as_str() {
                        self.cookies.insert(name, v.to_string());
                    }
                }
            }
            Value::Array(entries) => {
                for entry in entries {
                    let (Some(name), Some(value)) = (
                        entry.get("name").and_then(Value::as_str),
                        entry.get("value").and_then(Value::as_str),
                    ) else {
                        continue;
                    };
                    self.cookies.insert(name.to_string(), value.to_string());
                }
            }
            _ => {}
        }

        if !self.cookies.is_empty() {
            println!(
                "  Loaded {} cookies from {}",
                self.cookies.len(),
                cookies_file.display()
            );
        }
        Ok(())
    }

    fn read_env_file(&mut self) -> AppResult<()> {
        let content = fs::read_to_string(&self.env_file)?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            self.credentials
                .insert(key.trim().to_string(), value.to_string());
        }
        debug!("loaded {} keys from .env", self.credentials.len());
        Ok(())
    }

    /// `.env` token keys become session cookies, so a user can paste the
    /// two cookie values instead of exporting a full cookies.json.
    fn adopt_env_tokens(&mut self) {
        for (env_key, cookie_name) in
            [("UDEMY_ACCESS_TOKEN", "access_token"), ("UDEMY_CLIENT_ID", "client_id")]
        {
            let Some(value) = self.credentials.get(env_key).map(|s| s.trim()) else {
                continue;
            };
            if value.is_empty() || value.starts_with('<') {
                continue;
            }
            self.cookies
                .entry(cookie_name.to_string())
                .or_insert_with(|| value.to_string());
        }
    }

    fn has_valid_credentials(&self) -> bool {
        let username = self
            .credentials
            .get("UDEMY_USERNAME")
            .map(|s| s.trim())
            .unwrap_or_default();
        let password = self
            .credentials
            .get("UDEMY_PASSWORD")
            .map(|s| s.trim())
            .unwrap_or_default();

        !username.is_empty()
            && !password.is_empty()
            && !username.contains("example.com")
            && !password.contains("password-here")
    }

    fn prompt_for_credentials(&mut self) -> AppResult<()> {
        println!("\nEnter your account credentials.");
        println!("(Used for this session only. Save them in .env to skip this prompt.)");

        let username = ui::prompt("Account email", None)?;
        let password = ui::prompt_hidden("Account password")?;

        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(AppError::UserInputError(
                "Username and password cannot be empty".to_string(),
            ));
        }

        self.credentials
            .insert("UDEMY_USERNAME".to_string(), username.trim().to_string());
        self.credentials
            .insert("UDEMY_PASSWORD".to_string(), password.trim().to_string());
        Ok(())
    }

    pub fn has_session_cookies(&self) -> bool {
        !self.cookies.is_empty()
    }

    /// Default headers for every API request, session cookie included.
    pub fn headers(&self) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let referer = self
            .credentials
            .get("UDEMY_URL")
            .cloned()
            .unwrap_or_else(|| crate::constants::udemy::BASE_URL.to_string());

        let pairs: Vec<(&str, String)> = vec![
            ("accept", "application/json, text/plain, */*".to_string()),
            ("accept-language", "en-US,en;q=0.9".to_string()),
            ("content-type", "application/json".to_string()),
            ("referer", referer),
        ];
        for (name, value) in pairs {
            insert_header(&mut headers, name, &value)?;
        }

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            insert_header(&mut headers, "cookie", &cookie)?;
        }

        Ok(headers)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| AppError::UserInputError(format!("Invalid value for {name} header: {e}")))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn bare(dir: &Path) -> Authenticator {
        Authenticator {
            env_file: dir.join(".env"),
            credentials: BTreeMap::new(),
            cookies: BTreeMap::new(),
        }
    }

    #[test]
    fn cookies_simple_map() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cookies.json");
        fs::write(&file, r#"{"access_token": "tok", "client_id": "cid"}"#).unwrap();

        let mut auth = bare(dir.path());
        auth.load_cookies(&file).unwrap();
        assert_eq!(auth.cookies.get("access_token").unwrap(), "tok");
        assert!(auth.has_session_cookies());
    }

    #[test]
    fn cookies_browser_export_array() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cookies.json");
        fs::write(
            &file,
            r#"[{"name": "access_token", "value": "tok", "domain": ".udemy.com"}, {"other": 1}]"#,
        )
        .unwrap();

        let mut auth = bare(dir.path());
        auth.load_cookies(&file).unwrap();
        assert_eq!(auth.cookies.len(), 1);
        assert_eq!(auth.cookies.get("access_token").unwrap(), "tok");
    }

    #[test]
    fn env_file_strips_quotes_and_comments() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "# comment\nUDEMY_USERNAME=\"me@site.org\"\nUDEMY_PASSWORD='hunter2'\n\nBROKEN\n",
        )
        .unwrap();

        let mut auth = bare(dir.path());
        auth.read_env_file().unwrap();
        assert_eq!(auth.credentials.get("UDEMY_USERNAME").unwrap(), "me@site.org");
        assert_eq!(auth.credentials.get("UDEMY_PASSWORD").unwrap(), "hunter2");
        assert!(auth.has_valid_credentials());
    }

    #[test]
    fn placeholder_credentials_are_not_valid() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "UDEMY_USERNAME=you@example.com\nUDEMY_PASSWORD=your-password-here\n",
        )
        .unwrap();

        let mut auth = bare(dir.path());
        auth.read_env_file().unwrap();
        assert!(!auth.has_valid_credentials());
    }

    #[test]
    fn env_tokens_become_session_cookies() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".env"),
            "UDEMY_ACCESS_TOKEN=tok123\nUDEMY_CLIENT_ID=cid456\n",
        )
        .unwrap();

        let mut auth = bare(dir.path());
        auth.read_env_file().unwrap();
        auth.adopt_env_tokens();
        assert!(auth.has_session_cookies());
        assert_eq!(auth.cookies.get("access_token").unwrap(), "tok123");
        assert_eq!(auth.cookies.get("client_id").unwrap(), "cid456");
    }

    #[test]
    fn placeholder_env_tokens_are_ignored() {
        let dir = TempDir::new().unwrap();
        let mut auth = bare(dir.path());
        auth.credentials.insert(
            "UDEMY_ACCESS_TOKEN".to_string(),
            "<value of the access_token cookie>".to_string(),
        );
        auth.adopt_env_tokens();
        assert!(!auth.has_session_cookies());
    }

    #[test]
    fn cookie_header_is_assembled() {
        let dir = TempDir::new().unwrap();
        let mut auth = bare(dir.path());
        auth.cookies.insert("a".to_string(), "1".to_string());
        auth.cookies.insert("b".to_string(), "2".to_string());

        let headers = auth.headers().unwrap();
        assert_eq!(headers.get("cookie").unwrap(), "a=1; b=2");
        assert_eq!(
            headers.get("accept").unwrap(),
            "application/json, text/plain, */*"
        );
    }
}
