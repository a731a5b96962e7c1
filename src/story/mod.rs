pub mod loader;

use serde::Deserialize;

/// One unit of story content, aligned by timestamp.
///
/// Every field is optional: a timestamp-only segment is valid and plays as a
/// short rest. Wire names are the language codes the story files use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, rename = "en")]
    pub source_text: Option<String>,
    #[serde(default, rename = "ru")]
    pub target_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub title: String,
    pub source: String,
}

/// A loaded story. Immutable once loaded; segment order is meaningful and
/// fixed at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct Story {
    pub meta: Meta,
    pub content: Vec<Segment>,
}
