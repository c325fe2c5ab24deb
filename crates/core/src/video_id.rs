use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::{Result, TubescriptError};

const ID_LEN: usize = 11;

/// A validated YouTube video id.
///
/// The id ends up as an argument to an external process, so anything that is
/// not exactly 11 characters of `[A-Za-z0-9_-]` is rejected up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

fn is_bare_id(s: &str) -> bool {
    s.len() == ID_LEN
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn is_youtube_host(host: &str) -> bool {
    let h = host.to_ascii_lowercase();
    h == "youtube.com" || h == "youtu.be" || h.ends_with(".youtube.com")
}

fn id_from_url(u: &Url) -> Option<String> {
    let host = u.host_str()?;
    if !is_youtube_host(host) {
        return None;
    }

    // youtu.be/<id>
    if host.eq_ignore_ascii_case("youtu.be") {
        return u.path_segments()?.next().map(str::to_string);
    }

    // youtube.com/watch?v=<id>
    if u.path().starts_with("/watch") {
        return u
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.trim().to_string());
    }

    // youtube.com/shorts/<id>, /embed/<id>, /live/<id>
    let mut segs = u.path_segments()?;
    let kind = segs.next().unwrap_or("");
    if matches!(kind, "shorts" | "embed" | "live") {
        return segs.next().map(str::to_string);
    }

    None
}

impl VideoId {
    /// Accepts a bare id or any of the common YouTube URL shapes.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if is_bare_id(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }

        let parsed = Url::parse(trimmed).or_else(|_| Url::parse(&format!("https://{trimmed}")));
        if let Some(id) = parsed.ok().as_ref().and_then(id_from_url)
            && is_bare_id(&id)
        {
            return Ok(Self(id));
        }

        Err(TubescriptError::InvalidVideoId {
            input: input.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl FromStr for VideoId {
    type Err = TubescriptError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for VideoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for VideoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        VideoId::parse(&raw).map_err(serde::de::Error::custom)
    }
}
