use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ProjectId);

/// Preview image every project gets; no thumbnails are rendered.
pub const PLACEHOLDER_PREVIEW: &str = "/placeholder.svg";

/// Name the store falls back to when a create request carries none.
pub const DEFAULT_PROJECT_NAME: &str = "Новый проект";

const PUBLISHED_URL_SCHEME: &str = "https://";
const PUBLISHED_URL_SUFFIX: &str = ".dev";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    Draft,
    Published,
}

/// One uploaded site and its publish state.
///
/// Field names follow the store's wire representation. `file_content` is never
/// part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(rename = "preview_url")]
    pub preview: String,
    pub published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn draft(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            preview: PLACEHOLDER_PREVIEW.to_string(),
            published: false,
            published_url: None,
            file_name: None,
            file_size: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn state(&self) -> PublishState {
        if self.published {
            PublishState::Published
        } else {
            PublishState::Draft
        }
    }

    /// URL this project is (or would be) published under.
    pub fn derived_url(&self) -> String {
        published_url(&self.name)
    }
}

/// Parses a store timestamp. RFC 3339 is preferred; offset-less
/// `YYYY-MM-DD HH:MM:SS[.f]` values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Metadata timestamps never fail a decode: anything unreadable becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(parse_timestamp))
}

/// Strips the final extension from an uploaded file name.
///
/// Only a non-empty suffix after the last dot counts as an extension, so
/// `index.` keeps its dot while `.htaccess` becomes empty.
pub fn project_name_from_file(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() && !file_name[dot + 1..].contains('/') => {
            file_name[..dot].to_string()
        }
        _ => file_name.to_string(),
    }
}

/// Lowercases `name` and replaces each run of whitespace with a single `-`.
/// Non-ASCII letters are kept as they are.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for ch in lowered.chars() {
        if is_slug_whitespace(ch) {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(ch);
            in_whitespace = false;
        }
    }
    slug
}

/// Whitespace as browsers' regex `\s` sees it: Unicode `White_Space` plus
/// the byte-order mark, minus NEXT LINE.
fn is_slug_whitespace(ch: char) -> bool {
    match ch {
        '\u{feff}' => true,
        '\u{0085}' => false,
        _ => ch.is_whitespace(),
    }
}

pub fn published_url(name: &str) -> String {
    format!("{PUBLISHED_URL_SCHEME}{}{PUBLISHED_URL_SUFFIX}", slugify(name))
}
