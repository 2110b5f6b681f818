//! Response shapes of the Kemono JSON API. Only the fields the downloader needs are modelled.

use crate::http::{HttpUrl, InvalidUrl};
use serde::{Deserialize, Deserializer};

/// `GET /api/v1/{service}/user/{creator_id}/post/{post_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct PostResponse {
    pub post: PostInfo,
    pub previews: Vec<FileEntry>,
    pub attachments: Vec<FileEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// An entry of `previews` or `attachments`. Embeds carry no `path` and are not downloadable.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub server: Option<String>,
}

impl FileEntry {
    /// The name the file is saved under: the advertised name, or the last path segment.
    pub fn file_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.path.as_deref()?.rsplit('/').find(|s| !s.is_empty()))
    }

    /// `{server}/data{path}?f={name}`, falling back to the site origin when no usable server is given.
    pub fn download_url(&self, site: &HttpUrl) -> Result<Option<HttpUrl>, InvalidUrl> {
        let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) else {
            return Ok(None);
        };

        let base = match self.server.as_deref().filter(|s| !s.is_empty()) {
            Some(server) => match HttpUrl::parse(server) {
                Ok(server) => server.origin(),
                Err(e) => {
                    tracing::warn!(server, error = %e, "Ignoring invalid file server, using the site origin");
                    site.origin()
                }
            },
            None => site.origin(),
        };
        let mut url = HttpUrl::parse(&format!("{base}/data/{}", path.trim_start_matches('/')))?
            .as_url()
            .clone();
        if let Some(name) = self.file_name() {
            url.query_pairs_mut().append_pair("f", name);
        }

        HttpUrl::try_from(url).map(Some)
    }
}

/// `GET /api/v1/{service}/user/{creator_id}/profile`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatorProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub service: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}
