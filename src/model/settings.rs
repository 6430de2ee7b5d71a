use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_CHUNK_SIZE: usize = 10;
pub const DEFAULT_DELAY_SECONDS: u64 = 3;
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Korean,
    English,
    Japanese,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Korean => "korean",
            Language::English => "english",
            Language::Japanese => "japanese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "korean" | "ko" => Ok(Language::Korean),
            "english" | "en" => Ok(Language::English),
            "japanese" | "ja" => Ok(Language::Japanese),
            other => Err(format!("unsupported language: {other}")),
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_delay_seconds() -> u64 {
    DEFAULT_DELAY_SECONDS
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub last_directory: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_delay_seconds", alias = "delay_time")]
    pub delay_seconds: u64,

    #[serde(default)]
    pub include_subfolders: bool,

    /// Comma separated, as typed by the user (e.g. "jpg,png,mp3").
    #[serde(default)]
    pub excluded_extensions: String,

    #[serde(default = "default_model_name")]
    pub model_name: String,

    #[serde(default)]
    pub custom_prompt: String,

    #[serde(default)]
    pub translate_folders: bool,

    #[serde(default, alias = "selected_language")]
    pub language: Language,

    #[serde(default = "default_true")]
    pub deepest_first: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: String::new(),
            last_directory: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            delay_seconds: DEFAULT_DELAY_SECONDS,
            include_subfolders: false,
            excluded_extensions: String::new(),
            model_name: default_model_name(),
            custom_prompt: String::new(),
            translate_folders: false,
            language: Language::Korean,
            deepest_first: true,
        }
    }
}

impl Settings {
    /// Applies the same fallbacks the input form used: a zero chunk size or a
    /// blank model name goes back to the default.
    pub fn normalized(mut self) -> Self {
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.model_name.trim().is_empty() {
            self.model_name = default_model_name();
        }
        self.model_name = self.model_name.trim().to_string();
        self.api_key = self.api_key.trim().to_string();
        self
    }

    /// The stored key, or `GEMINI_API_KEY` when none is stored.
    ///
    /// The environment value is resolved at use time and never copied into
    /// `self`, so saving the settings cannot persist it.
    pub fn effective_api_key(&self) -> String {
        self.api_key_or(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_or(&self, fallback: Option<String>) -> String {
        let stored = self.api_key.trim();
        if !stored.is_empty() {
            return stored.to_string();
        }
        fallback.map(|k| k.trim().to_string()).unwrap_or_default()
    }

    pub fn custom_prompt(&self) -> Option<&str> {
        let p = self.custom_prompt.trim();
        if p.is_empty() {
            None
        } else {
            Some(p)
        }
    }
}
