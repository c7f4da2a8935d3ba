//! Mapping the grounding side channel into citation sources.

use serde::{Deserialize, Serialize};

use crate::analysis::{Grounding, Source, DEFAULT_SOURCE_TITLE};

/// One grounding chunk as reported next to a search-augmented completion.
///
/// Only web references are of interest; other chunk kinds deserialize with
/// `web` unset and are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingReference {
    #[serde(default)]
    pub web: Option<WebReference>,
}

/// A consulted web page, as reported by the model service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebReference {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GroundingReference {
    pub fn web(uri: impl Into<String>, title: Option<String>) -> Self {
        Self {
            web: Some(WebReference {
                uri: Some(uri.into()),
                title,
            }),
        }
    }
}

/// Collects the usable web references, in order.
///
/// Entries without a web reference or with an empty URI are dropped. A
/// missing or blank title becomes [`DEFAULT_SOURCE_TITLE`].
pub fn collect_sources(references: &[GroundingReference]) -> Grounding {
    let sources = references
        .iter()
        .filter_map(|reference| reference.web.as_ref())
        .filter_map(|web| {
            let uri = web.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
            let title = web
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_SOURCE_TITLE);
            Some(Source::new(uri, title))
        })
        .collect();

    Grounding::from_sources(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_entries_without_uri() {
        let refs = vec![
            GroundingReference::web("https://x", Some("X".to_string())),
            GroundingReference { web: None },
            GroundingReference {
                web: Some(WebReference {
                    uri: None,
                    title: Some("orphan".to_string()),
                }),
            },
        ];

        assert_eq!(
            collect_sources(&refs),
            Grounding::Grounded(vec![Source::new("https://x", "X")])
        );
    }

    #[test]
    fn test_missing_title_defaults() {
        let refs = vec![
            GroundingReference::web("https://a", None),
            GroundingReference::web("https://b", Some("  ".to_string())),
        ];

        let grounding = collect_sources(&refs);
        let titles: Vec<&str> = grounding.sources().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Source", "Source"]);
    }

    #[test]
    fn test_empty_side_channel_is_no_grounding() {
        assert!(collect_sources(&[]).is_none());
        assert!(collect_sources(&[GroundingReference::default()]).is_none());
    }

    #[test]
    fn test_deserializes_service_shape() {
        let json = r#"[{"web": {"uri": "https://x", "title": "X"}}, {"retrievedContext": {}}]"#;
        let refs: Vec<GroundingReference> = serde_json::from_str(json).expect("deserialize");
        assert_eq!(refs.len(), 2);
        assert!(refs[1].web.is_none());
        assert_eq!(collect_sources(&refs).sources().len(), 1);
    }
}
