//! Per-invocation configuration
//!
//! The author identity stamped on commits comes from the environment when the
//! binary runs; library callers build a [`Config`] directly.

use anyhow::Context;

pub const AUTHOR_NAME_VAR: &str = "TWIG_AUTHOR_NAME";
pub const AUTHOR_EMAIL_VAR: &str = "TWIG_AUTHOR_EMAIL";
pub const AUTHOR_DATE_VAR: &str = "TWIG_AUTHOR_DATE";
pub const LOG_FILTER_VAR: &str = "TWIG_LOG";

const DEFAULT_AUTHOR_NAME: &str = "user";
const DEFAULT_AUTHOR_EMAIL: &str = "user@localhost";
const AUTHOR_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub author_name: String,
    pub author_email: String,
    /// Fixed commit date; `None` stamps commits with the current time
    pub author_date: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
            author_date: None,
        }
    }
}

impl Config {
    pub fn new(author_name: impl Into<String>, author_email: impl Into<String>) -> Self {
        Config {
            author_name: author_name.into(),
            author_email: author_email.into(),
            author_date: None,
        }
    }

    pub fn with_author_date(mut self, date: chrono::DateTime<chrono::FixedOffset>) -> Self {
        self.author_date = Some(date);
        self
    }

    /// Read `TWIG_AUTHOR_NAME`, `TWIG_AUTHOR_EMAIL` and `TWIG_AUTHOR_DATE`,
    /// falling back to defaults for anything unset
    pub fn load_from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let author_name = std::env::var(AUTHOR_NAME_VAR).unwrap_or(defaults.author_name);
        let author_email = std::env::var(AUTHOR_EMAIL_VAR).unwrap_or(defaults.author_email);
        let author_date = match std::env::var(AUTHOR_DATE_VAR) {
            Ok(raw) => Some(
                parse_author_date(&raw)
                    .with_context(|| format!("{AUTHOR_DATE_VAR} is not a valid date: {raw}"))?,
            ),
            Err(_) => None,
        };

        Ok(Config {
            author_name,
            author_email,
            author_date,
        })
    }

    pub fn author(&self) -> String {
        format!("{} <{}>", self.author_name, self.author_email)
    }

    pub fn commit_date(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.author_date
            .unwrap_or_else(|| chrono::Local::now().fixed_offset())
    }
}

fn parse_author_date(raw: &str) -> anyhow::Result<chrono::DateTime<chrono::FixedOffset>> {
    chrono::DateTime::parse_from_str(raw, AUTHOR_DATE_FORMAT)
        .or_else(|_| chrono::DateTime::parse_from_rfc2822(raw))
        .map_err(Into::into)
}
