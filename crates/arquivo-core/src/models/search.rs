use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Sort order for search results.
///
/// `Relevance` carries no scoring; it is an alias for newest-created-first,
/// the same order used when no sort key is given.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    DateDesc,
    DateAsc,
    Title,
    Size,
    #[default]
    Relevance,
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SortKey::DateDesc => write!(f, "date_desc"),
            SortKey::DateAsc => write!(f, "date_asc"),
            SortKey::Title => write!(f, "title"),
            SortKey::Size => write!(f, "size"),
            SortKey::Relevance => write!(f, "relevance"),
        }
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date_desc" => Ok(SortKey::DateDesc),
            "date_asc" => Ok(SortKey::DateAsc),
            "title" => Ok(SortKey::Title),
            "size" => Ok(SortKey::Size),
            "relevance" => Ok(SortKey::Relevance),
            _ => Err(anyhow::anyhow!("Invalid sort key: {}", s)),
        }
    }
}

/// Search filter set; all provided filters combine with logical AND.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Free text, matched case-insensitively across title, description,
    /// subject, and extracted text.
    pub query: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Exact department match.
    pub department: Option<String>,
    /// Inclusive lower bound on document date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on document date.
    pub date_to: Option<NaiveDate>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.category.is_none()
            && self.department.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_display() {
        assert_eq!(SortKey::DateDesc.to_string(), "date_desc");
        assert_eq!(SortKey::DateAsc.to_string(), "date_asc");
        assert_eq!(SortKey::Title.to_string(), "title");
        assert_eq!(SortKey::Size.to_string(), "size");
        assert_eq!(SortKey::Relevance.to_string(), "relevance");
    }

    #[test]
    fn test_sort_key_from_str() {
        assert_eq!("date_desc".parse::<SortKey>().unwrap(), SortKey::DateDesc);
        assert_eq!("title".parse::<SortKey>().unwrap(), SortKey::Title);
        assert_eq!("relevance".parse::<SortKey>().unwrap(), SortKey::Relevance);
        assert!("best_match".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_sort_key_default_is_relevance() {
        assert_eq!(SortKey::default(), SortKey::Relevance);
    }

    #[test]
    fn test_search_filters_is_empty() {
        assert!(SearchFilters::default().is_empty());

        let filters = SearchFilters {
            category: Some("contrato".to_string()),
            ..Default::default()
        };
        assert!(!filters.is_empty());
    }
}
