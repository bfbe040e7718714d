//! Request option types for the Exa search endpoint.

use serde::{Deserialize, Serialize};

/// How the provider interprets the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Keyword,
    Neural,
    Auto,
}

impl SearchType {
    /// Wire names accepted by the provider.
    pub const VARIANTS: &'static [&'static str] = &["keyword", "neural", "auto"];
}

/// Data category the provider focuses on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "company")]
    Company,
    #[serde(rename = "research paper")]
    ResearchPaper,
    #[serde(rename = "news")]
    News,
    #[serde(rename = "linkedin profile")]
    LinkedinProfile,
    #[serde(rename = "github")]
    Github,
    #[serde(rename = "tweet")]
    Tweet,
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "song")]
    Song,
    #[serde(rename = "personal site")]
    PersonalSite,
    #[serde(rename = "pdf")]
    Pdf,
    #[serde(rename = "financial report")]
    FinancialReport,
}

impl Category {
    /// Wire names accepted by the provider.
    pub const VARIANTS: &'static [&'static str] = &[
        "company",
        "research paper",
        "news",
        "linkedin profile",
        "github",
        "tweet",
        "movie",
        "song",
        "personal site",
        "pdf",
        "financial report",
    ];
}

/// Everything a search request carries besides the query itself.
///
/// Unset fields are omitted from the request body so the provider applies
/// its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_autoprompt: Option<bool>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_crawl_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_crawl_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_text: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_text: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<ContentsOptions>,
}

/// Shapes which page contents come back with each result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<HighlightsOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryOptions>,
}

/// Parsed page text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_characters: Option<i64>,
    #[serde(default)]
    pub include_html_tags: bool,
}

/// Relevant extracts from each page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightsOptions {
    #[serde(default = "default_num_sentences")]
    pub num_sentences: i64,
    #[serde(default = "default_highlights_per_url")]
    pub highlights_per_url: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

fn default_num_sentences() -> i64 {
    5
}

fn default_highlights_per_url() -> i64 {
    1
}

impl Default for HighlightsOptions {
    fn default() -> Self {
        Self {
            num_sentences: default_num_sentences(),
            highlights_per_url: default_highlights_per_url(),
            query: None,
        }
    }
}

/// Per-result summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_options_are_omitted() {
        let value = serde_json::to_value(SearchOptions::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_wire_names() {
        let opts = SearchOptions {
            search_type: Some(SearchType::Neural),
            category: Some(Category::ResearchPaper),
            num_results: Some(3),
            include_text: Some(vec!["rust".to_string()]),
            ..Default::default()
        };
        let value = serde_json::to_value(opts).unwrap();
        assert_eq!(value["type"], "neural");
        assert_eq!(value["category"], "research paper");
        assert_eq!(value["numResults"], 3);
        assert_eq!(value["includeText"], json!(["rust"]));
    }

    #[test]
    fn test_category_variants_match_serde() {
        for name in Category::VARIANTS {
            let parsed: Category = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(serde_json::to_value(parsed).unwrap(), json!(name));
        }
        for name in SearchType::VARIANTS {
            let parsed: SearchType = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(serde_json::to_value(parsed).unwrap(), json!(name));
        }
    }

    #[test]
    fn test_nested_defaults() {
        let contents: ContentsOptions =
            serde_json::from_value(json!({ "highlights": {}, "text": {} })).unwrap();
        let highlights = contents.highlights.unwrap();
        assert_eq!(highlights.num_sentences, 5);
        assert_eq!(highlights.highlights_per_url, 1);
        assert!(!contents.text.unwrap().include_html_tags);
        assert!(contents.summary.is_none());
    }
}
