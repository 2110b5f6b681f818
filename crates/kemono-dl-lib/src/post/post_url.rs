use crate::http::{HttpUrl, InvalidUrl};
use std::fmt;

/// A post page URL of the form `{origin}/{service}/user/{creator_id}/post/{post_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostUrl {
    url: HttpUrl,
    service: String,
    creator_id: String,
    post_id: String,
}

impl PostUrl {
    pub fn parse(input: &str) -> Result<Self, InvalidUrl> {
        let url = HttpUrl::parse(input.trim())?;
        let invalid = |reason: &str| InvalidUrl {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = url
            .as_url()
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let [service, "user", creator_id, "post", post_id, ..] = segments.as_slice() else {
            return Err(invalid(
                "expected a post URL like https://kemono.su/<service>/user/<creator>/post/<post>",
            ));
        };

        Ok(Self {
            service: service.to_string(),
            creator_id: creator_id.to_string(),
            post_id: post_id.to_string(),
            url,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn origin(&self) -> &HttpUrl {
        &self.url
    }

    pub fn api_post_url(&self) -> Result<HttpUrl, InvalidUrl> {
        self.url.with_path(&format!(
            "api/v1/{}/user/{}/post/{}",
            self.service, self.creator_id, self.post_id
        ))
    }

    pub fn api_profile_url(&self) -> Result<HttpUrl, InvalidUrl> {
        self.url.with_path(&format!(
            "api/v1/{}/user/{}/profile",
            self.service, self.creator_id
        ))
    }
}

impl fmt::Display for PostUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.url, f)
    }
}
