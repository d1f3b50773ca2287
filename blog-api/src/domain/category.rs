use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCategoryRequest {
    pub(crate) name: String,
    pub(crate) slug: Option<String>,
}

impl CreateCategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: normalize_name(&self.name)?,
            slug: self
                .slug
                .map(|slug| slug.trim().to_string())
                .filter(|slug| !slug.is_empty()),
        })
    }

    pub(crate) fn slug_source(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateCategoryRequest {
    pub(crate) name: Option<String>,
    pub(crate) slug: Option<String>,
}

impl UpdateCategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .map(|name| normalize_name(&name))
            .transpose()?;
        Ok(Self {
            name,
            slug: self
                .slug
                .map(|slug| slug.trim().to_string())
                .filter(|slug| !slug.is_empty()),
        })
    }

    pub(crate) fn slug_source<'a>(&'a self, current: &Category) -> Option<&'a str> {
        match (&self.slug, &self.name) {
            (Some(slug), _) => Some(slug.as_str()),
            (None, Some(name)) if *name != current.name => Some(name.as_str()),
            _ => None,
        }
    }
}

fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 255 {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be 1..255 chars",
        });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{Category, CreateCategoryRequest, UpdateCategoryRequest};

    #[test]
    fn create_category_requires_name() {
        let req = CreateCategoryRequest {
            name: "  ".to_string(),
            slug: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_category_slug_defaults_to_name() {
        let req = CreateCategoryRequest {
            name: " Systems Programming ".to_string(),
            slug: Some(String::new()),
        }
        .validate()
        .expect("must validate");
        assert_eq!(req.slug_source(), "Systems Programming");
    }

    #[test]
    fn update_category_keeps_slug_for_same_name() {
        let now = Utc::now();
        let current = Category {
            id: Uuid::new_v4(),
            name: "Rust".to_string(),
            slug: "rust".to_string(),
            created_at: now,
            updated_at: now,
        };

        let same = UpdateCategoryRequest {
            name: Some("Rust".to_string()),
            slug: None,
        };
        assert!(same.slug_source(&current).is_none());

        let renamed = UpdateCategoryRequest {
            name: Some("Rust Lang".to_string()),
            slug: None,
        };
        assert_eq!(renamed.slug_source(&current), Some("Rust Lang"));
    }
}
