//! Article input rules shared by the HTTP boundary and the store adapters.

use crate::domain::error::DomainError;

pub const MAX_TITLE_CHARS: usize = 255;

/// Title and content for a create or update, validated but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    title: String,
    content: String,
}

impl ArticleDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Result<Self, DomainError> {
        let title = title.into();
        let content = content.into();

        if title.trim().is_empty() {
            return Err(DomainError::validation("title must not be empty"));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(DomainError::validation(format!(
                "title must be at most {MAX_TITLE_CHARS} characters"
            )));
        }
        if content.trim().is_empty() {
            return Err(DomainError::validation("content must not be empty"));
        }

        Ok(Self { title, content })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_parts(self) -> (String, String) {
        (self.title, self.content)
    }
}

/// Parse a path segment into an article id. Only positive integers are valid.
pub fn parse_article_id(raw: &str) -> Result<i64, DomainError> {
    let id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| DomainError::validation(format!("`{raw}` is not a valid article id")))?;
    if id <= 0 {
        return Err(DomainError::validation(format!(
            "article id must be positive, got {id}"
        )));
    }
    Ok(id)
}
