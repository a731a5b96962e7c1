use std::path::Path;

use thiserror::Error;
use tracing::info;

use super::Story;

/// A story that cannot be read or parsed is fatal to the session. No retry;
/// the user reloads.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("failed to read story file: {0}")]
    Io(#[from] std::io::Error),
    #[error("story is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to fetch story: {0}")]
    Http(#[from] reqwest::Error),
}

pub fn load_story(path: impl AsRef<Path>) -> Result<Story, StoryError> {
    let raw = std::fs::read_to_string(path)?;
    let story: Story = serde_json::from_str(&raw)?;
    info!(
        title = %story.meta.title,
        segments = story.content.len(),
        "story loaded"
    );
    Ok(story)
}

/// Single static-resource fetch. The story is fetched exactly once at
/// startup; there is no refresh path.
pub async fn fetch_story(url: &str) -> Result<Story, StoryError> {
    let story: Story = reqwest::get(url)
        .await?
        .error_for_status()?
        .json()
        .await?;
    info!(
        title = %story.meta.title,
        segments = story.content.len(),
        url,
        "story fetched"
    );
    Ok(story)
}
