//! Tool: search — Semantic web search through the Exa API.

use serde::Deserialize;
use serde_json::Value;

use exa_search::{Category, SearchOptions, SearchType};

use crate::session::CapabilitySession;
use crate::types::{ToolDefinition, ToolError, ToolResult, Violation};

use super::schema::{DefaultValue, FieldKind, FieldSpec, ObjectSpec};

pub const TOOL_NAME: &str = "search";

pub const DEFAULT_NUM_RESULTS: i64 = 10;
pub const MAX_NUM_RESULTS: i64 = 10_000;

const TEXT_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("maxCharacters", FieldKind::Integer { min: None, max: None })
        .describe("Max length in characters for the text returned"),
    FieldSpec::optional("includeHtmlTags", FieldKind::Boolean)
        .with_default(DefaultValue::Boolean(false))
        .describe("Whether HTML tags should be included. Default false"),
];

const HIGHLIGHTS_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("numSentences", FieldKind::Integer { min: None, max: None })
        .with_default(DefaultValue::Integer(5))
        .describe("The number of sentences to be returned in each snippet. Default 5"),
    FieldSpec::optional("highlightsPerUrl", FieldKind::Integer { min: None, max: None })
        .with_default(DefaultValue::Integer(1))
        .describe("The number of snippets to return per page. Default 1"),
    FieldSpec::optional("query", FieldKind::String).describe("Query for highlights"),
];

const SUMMARY_FIELDS: &[FieldSpec] = &[FieldSpec::optional("query", FieldKind::String)
    .describe("If specified, tries to answer the query in the summary")];

const CONTENTS_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("text", FieldKind::Object(ObjectSpec::new(TEXT_FIELDS)))
        .describe("Parsed contents of the page."),
    FieldSpec::optional(
        "highlights",
        FieldKind::Object(ObjectSpec::new(HIGHLIGHTS_FIELDS)),
    )
    .describe("Relevant extract(s) from the webpage."),
    FieldSpec::optional("summary", FieldKind::Object(ObjectSpec::new(SUMMARY_FIELDS))),
];

const SEARCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("query", FieldKind::String).describe("The query string."),
    FieldSpec::optional("useAutoprompt", FieldKind::Boolean).describe(
        "If true, your query will be converted to a Exa query. Default to 'false'. \
         Neural or Auto search only.",
    ),
    FieldSpec::optional("type", FieldKind::Enum(SearchType::VARIANTS)).describe(
        "The Type of search, 'keyword', 'neural', or 'auto' (decides between keyword and neural). \
         Default to 'neural'.",
    ),
    FieldSpec::optional("category", FieldKind::Enum(Category::VARIANTS)).describe(
        "(beta) A data category to focus on, with higher comprehensivity and data cleanliness.",
    ),
    FieldSpec::optional(
        "numResults",
        FieldKind::Integer {
            min: Some(1),
            max: Some(MAX_NUM_RESULTS),
        },
    )
    .with_default(DefaultValue::Integer(DEFAULT_NUM_RESULTS))
    .describe("Number of search results to return. Default to 10."),
    FieldSpec::optional("includeDomains", FieldKind::StringArray { max_items: None })
        .describe("List of domains to include in the search."),
    FieldSpec::optional("excludeDomains", FieldKind::StringArray { max_items: None })
        .describe("List of domains to exclude in the search."),
    FieldSpec::optional("startCrawlDate", FieldKind::DateTime).describe(
        "Crawl date refers to the date that Exa discovered a link. \
         Results will include links that were crawled after this date.",
    ),
    FieldSpec::optional("endCrawlDate", FieldKind::DateTime).describe(
        "Crawl date refers to the date that Exa discovered a link. \
         Results will include links that were crawled before this date.",
    ),
    FieldSpec::optional("startPublishedDate", FieldKind::DateTime)
        .describe("Only links with a published date after this will be returned."),
    FieldSpec::optional("endPublishedDate", FieldKind::DateTime)
        .describe("Only links with a published date before this will be returned."),
    FieldSpec::optional("includeText", FieldKind::StringArray { max_items: Some(1) }).describe(
        "List of strings that must be present in webpage text of results. \
         Currently, only 1 string is supported, of up to 5 words.",
    ),
    FieldSpec::optional("excludeText", FieldKind::StringArray { max_items: Some(1) }).describe(
        "List of strings that must not be present in webpage text of results. \
         Currently, only 1 string is supported, of up to 5 words.",
    ),
    FieldSpec::optional("contents", FieldKind::Object(ObjectSpec::new(CONTENTS_FIELDS))),
];

/// Input contract of the search tool.
pub const SEARCH_PARAMETERS: ObjectSpec =
    ObjectSpec::new(SEARCH_FIELDS).describe("Search parameters for Exa API");

/// Validated arguments of a search call.
///
/// The query is kept apart from the option bundle; it is the positional
/// argument of the upstream call and never travels inside `options`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchParameters {
    pub query: String,
    #[serde(flatten)]
    pub options: SearchOptions,
}

/// Render the input contract as JSON Schema.
pub fn describe_search_parameters() -> Value {
    SEARCH_PARAMETERS.to_json_schema()
}

/// Validate raw tool arguments, applying defaults.
pub fn validate(raw: &Value) -> ToolResult<SearchParameters> {
    let normalized = SEARCH_PARAMETERS
        .validate(raw)
        .map_err(ToolError::InvalidArguments)?;

    serde_json::from_value(normalized)
        .map_err(|e| ToolError::InvalidArguments(vec![Violation::new("", e.to_string())]))
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: TOOL_NAME.to_string(),
        description: Some("Search the web using semantic queries.".to_string()),
        input_schema: describe_search_parameters(),
    }
}

pub async fn execute(args: Value, session: &CapabilitySession) -> ToolResult<Value> {
    let provider = session.upstream_client().await?;
    let params = validate(&args)?;

    tracing::debug!(
        num_results = ?params.options.num_results,
        "Forwarding search request"
    );

    let result = provider.search(&params.query, &params.options).await?;
    Ok(result)
}
