//! Review domain entity, language allow-list and review styles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Languages accepted for review submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Python,
    Java,
    Csharp,
    Cpp,
    Php,
    Go,
    Ruby,
    Rust,
}

impl Default for Language {
    fn default() -> Self {
        Language::Javascript
    }
}

impl Language {
    /// Lowercase wire name, also used inside prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Csharp => "csharp",
            Language::Cpp => "cpp",
            Language::Php => "php",
            Language::Go => "go",
            Language::Ruby => "ruby",
            Language::Rust => "rust",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "javascript" => Ok(Language::Javascript),
            "typescript" => Ok(Language::Typescript),
            "python" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "csharp" => Ok(Language::Csharp),
            "cpp" => Ok(Language::Cpp),
            "php" => Ok(Language::Php),
            "go" => Ok(Language::Go),
            "ruby" => Ok(Language::Ruby),
            "rust" => Ok(Language::Rust),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review style requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStyle {
    Detailed,
    Concise,
}

impl Default for ReviewStyle {
    fn default() -> Self {
        ReviewStyle::Detailed
    }
}

impl ReviewStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStyle::Detailed => "detailed",
            ReviewStyle::Concise => "concise",
        }
    }
}

impl std::fmt::Display for ReviewStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Saved review domain entity.
///
/// Always owned by exactly one user; ownership is enforced on every
/// read and write, not just at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub review: String,
    pub language: Language,
    pub review_style: Option<ReviewStyle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a review record
#[derive(Debug, Clone)]
pub struct NewReview {
    pub code: String,
    pub review: String,
    pub language: Language,
    pub review_style: Option<ReviewStyle>,
}

/// Fields for updating a review record
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub code: Option<String>,
    pub review: Option<String>,
    pub language: Option<Language>,
}

/// Review response (client-facing shape)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    /// Unique review identifier
    pub id: Uuid,
    /// Submitted source code
    pub code: String,
    /// Generated review text (markdown)
    pub review: String,
    /// Language of the submitted code
    #[schema(example = "javascript")]
    pub language: Language,
    /// Style the review was generated with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_style: Option<ReviewStyle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            code: review.code,
            review: review.review,
            language: review.language,
            review_style: review.review_style,
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_round_trip() {
        for name in [
            "javascript",
            "typescript",
            "python",
            "java",
            "csharp",
            "cpp",
            "php",
            "go",
            "ruby",
            "rust",
        ] {
            let lang: Language = name.parse().unwrap();
            assert_eq!(lang.as_str(), name);
        }
    }

    #[test]
    fn test_language_rejects_unknown() {
        assert!("brainfuck".parse::<Language>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Language::default(), Language::Javascript);
        assert_eq!(ReviewStyle::default(), ReviewStyle::Detailed);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Language::Typescript).unwrap(),
            "\"typescript\""
        );
        assert_eq!(
            serde_json::from_str::<ReviewStyle>("\"concise\"").unwrap(),
            ReviewStyle::Concise
        );
    }
}
