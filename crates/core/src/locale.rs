//! User-facing language selection.
//!
//! The prompt templates and every message that can reach the end user
//! exist once per [`Locale`]. Japanese is the default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of prompt templates and user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl Locale {
    /// Shown when the generator answers without a usable question.
    pub fn question_fallback(self) -> &'static str {
        match self {
            Locale::Ja => "エラー: 質問を生成できませんでした",
            Locale::En => "Error: could not generate a question",
        }
    }

    /// Shown when the generator answers without usable advice.
    pub fn advice_fallback(self) -> &'static str {
        match self {
            Locale::Ja => "エラー: アドバイスを生成できませんでした",
            Locale::En => "Error: could not generate advice",
        }
    }

    pub fn timeout_message(self) -> &'static str {
        match self {
            Locale::Ja => "生成サービスの応答がタイムアウトしました。しばらくしてから再度お試しください。",
            Locale::En => "The generation service timed out. Please try again shortly.",
        }
    }

    pub fn parse_message(self) -> &'static str {
        match self {
            Locale::Ja => "生成サービスからの応答を解析できませんでした。",
            Locale::En => "Could not parse the response from the generation service.",
        }
    }

    pub fn database_connection_message(self) -> &'static str {
        match self {
            Locale::Ja => "データベース接続エラーが発生しました。しばらくしてから再度お試しください。",
            Locale::En => "A database connection error occurred. Please try again shortly.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Ja => "ja",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ja" | "ja-jp" | "japanese" => Ok(Locale::Ja),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::En),
            other => Err(format!("unsupported locale '{other}' (expected 'ja' or 'en')")),
        }
    }
}
