use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(DomainError::Validation {
                field: "status",
                message: "must be one of: draft, published",
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: String,
    pub(crate) status: PostStatus,
    pub(crate) author_id: Uuid,
    pub(crate) published_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Publish timestamp after moving to `status`. It is stamped on the first
/// transition into `published` and never changes afterwards, even when the
/// post goes back to draft.
pub(crate) fn stamp_published_at(
    status: PostStatus,
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (status, current) {
        (_, Some(published_at)) => Some(published_at),
        (PostStatus::Published, None) => Some(now),
        (PostStatus::Draft, None) => None,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) slug: Option<String>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) category_ids: Vec<Uuid>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            slug: normalize_slug_source(self.slug),
            status: self.status,
            category_ids: self.category_ids,
        })
    }

    /// Text the slug is derived from: the explicit slug when given, else the title.
    pub(crate) fn slug_source(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.title)
    }
}

/// Partial update. `category_ids: Some(..)` replaces the whole category set.
#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) slug: Option<String>,
    pub(crate) status: Option<PostStatus>,
    pub(crate) category_ids: Option<Vec<Uuid>>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = self
            .title
            .filter(|title| !title.trim().is_empty())
            .map(|title| normalize_title(&title))
            .transpose()?;
        let content = self
            .content
            .filter(|content| !content.trim().is_empty())
            .map(|content| normalize_content(&content))
            .transpose()?;

        Ok(Self {
            title,
            content,
            slug: normalize_slug_source(self.slug),
            status: self.status,
            category_ids: self.category_ids,
        })
    }

    /// Text a new slug should be derived from, if the slug has to change at all:
    /// an explicit slug, or a title that differs from the current one.
    pub(crate) fn slug_source<'a>(&'a self, current: &Post) -> Option<&'a str> {
        match (&self.slug, &self.title) {
            (Some(slug), _) => Some(slug.as_str()),
            (None, Some(title)) if *title != current.title => Some(title.as_str()),
            _ => None,
        }
    }
}

fn normalize_slug_source(slug: Option<String>) -> Option<String> {
    slug.map(|slug| slug.trim().to_string())
        .filter(|slug| !slug.is_empty())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
