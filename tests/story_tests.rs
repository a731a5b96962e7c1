use std::io::Write;

use skazka::story::loader::{load_story, StoryError};

const SAMPLE: &str = r#"{
  "meta": { "title": "Медведь и пчела", "source": "folk tale" },
  "content": [
    { "timestamp": "00:01" },
    { "timestamp": "00:03", "en": "Hi", "ru": "Привет" },
    { "en": "The bear walked into the forest." }
  ]
}"#;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write story");
    file
}

#[test]
fn loads_story_with_optional_fields() {
    let file = write_temp(SAMPLE);
    let story = load_story(file.path()).expect("sample story is valid");

    assert_eq!(story.meta.title, "Медведь и пчела");
    assert_eq!(story.meta.source, "folk tale");
    assert_eq!(story.content.len(), 3);

    let pause = &story.content[0];
    assert_eq!(pause.timestamp.as_deref(), Some("00:01"));
    assert!(pause.source_text.is_none(), "timestamp-only segment is valid");
    assert!(pause.target_text.is_none());

    let bilingual = &story.content[1];
    assert_eq!(bilingual.source_text.as_deref(), Some("Hi"));
    assert_eq!(bilingual.target_text.as_deref(), Some("Привет"));

    let source_only = &story.content[2];
    assert!(source_only.timestamp.is_none());
    assert!(source_only.target_text.is_none());
}

#[test]
fn malformed_json_is_a_parse_error() {
    let file = write_temp("{ not json");
    let err = load_story(file.path()).expect_err("must not parse");
    assert!(matches!(err, StoryError::Parse(_)), "got {err:?}");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_story("/nonexistent/bear_and_bee.json").expect_err("must not load");
    assert!(matches!(err, StoryError::Io(_)), "got {err:?}");
}
