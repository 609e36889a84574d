// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const MAX_FILENAME_BYTES: usize = 200;
pub const SLUG_MAX_CHARS: usize = 100;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const PROGRESS_FILE_NAME: &str = ".extraction_progress.json";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_MIN_REQUEST_INTERVAL_MS: u64 = 500;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const MAX_PARALLEL_WORKERS: usize = 5;

pub const DEFAULT_TTL_DAYS: i64 = 30;
pub const DEFAULT_DOCS_DIR: &str = "docs/research";

pub mod udemy {
    pub const BASE_URL: &str = "https://www.udemy.com";
    pub const SUBSCRIBED_COURSES_PAGE_SIZE: u32 = 100;
    pub const CURRICULUM_PAGE_SIZE: u32 = 200;
    pub const DEFAULT_RESOURCE_SIZE_CAP_MB: u64 = 100;

    pub mod dirs {
        pub const TRANSCRIPTS: &str = "transcripts";
        pub const ARTICLES: &str = "articles";
        pub const QUIZZES: &str = "quizzes";
        pub const RESOURCES: &str = "resources";
        pub const SLIDES: &str = "slides";
    }
}

pub mod youtube {
    pub const BASE_URL: &str = "https://www.youtube.com";
}

pub const HELP_COOKIES_GUIDE: &str = r#"
1. Log in to the platform in Chrome / Edge / Firefox.
2. Open developer tools:
   - Windows / Linux: press F12 or Ctrl+Shift+I
   - macOS: press Cmd+Opt+I
3. Switch to the "Application" (or "Storage") tab and select Cookies.
4. Export the cookies for the site as JSON (a browser extension such as
   "Cookie-Editor" can do this in one click) and save them as cookies.json
   in the project root.
5. Alternatively create a .env file with:
----------------------------------------------
UDEMY_ACCESS_TOKEN=<value of the access_token cookie>
UDEMY_CLIENT_ID=<value of the client_id cookie>
----------------------------------------------
Keep these values private; they grant access to your account."#;
