//! Response extraction: fold provider content blocks into one user-facing
//! string and append a deduplicated sources section.

use std::collections::HashSet;

use distillery_core::provider::{
    CitationSource, ContentBlock, GenerationResponse, GenerationResult, UsageMetrics,
};

pub const SOURCES_HEADER: &str = "Sources:";

/// Merges content blocks, dedupes citations by URL and derives the search count.
pub struct ResponseExtractor;

impl ResponseExtractor {
    /// Full extraction of a generator response.
    pub fn extract(response: GenerationResponse) -> GenerationResult {
        let (text, citations) = Self::fold(&response.content);
        let sources = Self::dedupe(citations);
        let searches_used = Self::searches_used(&response.usage);

        GenerationResult {
            text: Self::render(text, &sources),
            usage: response.usage,
            searches_used,
        }
    }

    /// Left-to-right fold into the concatenated text and every citation seen.
    pub fn fold(blocks: &[ContentBlock]) -> (String, Vec<&CitationSource>) {
        blocks
            .iter()
            .fold((String::new(), Vec::new()), |(mut text, mut citations), block| {
                text.push_str(block.as_text());
                citations.extend(block.citations());
                (text, citations)
            })
    }

    /// Keep the first occurrence of each URL, in first-seen order.
    pub fn dedupe(citations: Vec<&CitationSource>) -> Vec<&CitationSource> {
        let mut seen = HashSet::new();
        citations
            .into_iter()
            .filter(|&c| seen.insert(c.url.as_str()))
            .collect()
    }

    /// Append the sources section; text is returned untouched when there are none.
    pub fn render(mut text: String, sources: &[&CitationSource]) -> String {
        if sources.is_empty() {
            return text;
        }

        text.push_str("\n\n");
        text.push_str(SOURCES_HEADER);
        for source in sources {
            text.push_str(&format!("\n• {}: {}", source.title, source.url));
        }
        text
    }

    /// `usage.server_tool_use.web_search_requests`, or 0 when any level is absent.
    pub fn searches_used(usage: &UsageMetrics) -> u64 {
        usage
            .raw()
            .get("server_tool_use")
            .and_then(|s| s.get("web_search_requests"))
            .and_then(|n| n.as_u64())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(content: Vec<ContentBlock>, usage: serde_json::Value) -> GenerationResponse {
        GenerationResponse {
            content,
            usage: UsageMetrics::new(usage),
            model: "mock-model".into(),
        }
    }

    #[test]
    fn single_plain_block_is_returned_verbatim() {
        let result = ResponseExtractor::extract(response(
            vec![ContentBlock::text("gBETA is a free 6-week accelerator.")],
            json!({"input_tokens": 12, "output_tokens": 9}),
        ));
        assert_eq!(result.text, "gBETA is a free 6-week accelerator.");
        assert_eq!(result.searches_used, 0);
    }

    #[test]
    fn blocks_concatenate_in_order_without_separator() {
        let result = ResponseExtractor::extract(response(
            vec![
                ContentBlock::text("Winning "),
                ContentBlock::cited("Wednesday", vec![]),
                ContentBlock::text(" is weekly."),
            ],
            json!({}),
        ));
        assert_eq!(result.text, "Winning Wednesday is weekly.");
    }

    #[test]
    fn duplicate_citation_yields_one_bullet() {
        let x = CitationSource::new("X", "http://a");
        let result = ResponseExtractor::extract(response(
            vec![
                ContentBlock::cited("One. ", vec![x.clone()]),
                ContentBlock::cited("Two.", vec![x]),
            ],
            json!({}),
        ));
        assert_eq!(result.text, "One. Two.\n\nSources:\n• X: http://a");
        assert!(result.text.ends_with("• X: http://a"));
        assert_eq!(result.text.matches('•').count(), 1);
    }

    #[test]
    fn dedupe_keeps_first_title_and_first_position() {
        let result = ResponseExtractor::extract(response(
            vec![
                ContentBlock::cited(
                    "a",
                    vec![
                        CitationSource::new("First", "http://a"),
                        CitationSource::new("B", "http://b"),
                    ],
                ),
                ContentBlock::cited(
                    "b",
                    vec![
                        CitationSource::new("Second", "http://a"),
                        CitationSource::new("C", "http://c"),
                    ],
                ),
            ],
            json!({}),
        ));
        assert_eq!(
            result.text,
            "ab\n\nSources:\n• First: http://a\n• B: http://b\n• C: http://c"
        );
    }

    #[test]
    fn dedupe_is_idempotent() {
        let a = CitationSource::new("A", "http://a");
        let b = CitationSource::new("B", "http://b");
        let input = vec![&a, &b, &a, &b];
        let once = ResponseExtractor::dedupe(input);
        let twice = ResponseExtractor::dedupe(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once, vec![&a, &b]);
    }

    #[test]
    fn searches_used_reads_nested_counter() {
        let usage = UsageMetrics::new(json!({"server_tool_use": {"web_search_requests": 2}}));
        assert_eq!(ResponseExtractor::searches_used(&usage), 2);
    }

    #[test]
    fn searches_used_defaults_to_zero_for_any_missing_level() {
        for usage in [
            json!({}),
            json!(null),
            json!({"input_tokens": 5}),
            json!({"server_tool_use": null}),
            json!({"server_tool_use": {}}),
            json!({"server_tool_use": {"web_search_requests": "two"}}),
        ] {
            assert_eq!(
                ResponseExtractor::searches_used(&UsageMetrics::new(usage.clone())),
                0,
                "usage {usage}"
            );
        }
    }

    #[test]
    fn usage_is_passed_through_unchanged() {
        let raw = json!({"input_tokens": 1, "output_tokens": 2, "server_tool_use": {"web_search_requests": 3}});
        let result = ResponseExtractor::extract(response(vec![ContentBlock::text("ok")], raw.clone()));
        assert_eq!(result.usage.raw(), &raw);
        assert_eq!(result.searches_used, 3);
    }
}
