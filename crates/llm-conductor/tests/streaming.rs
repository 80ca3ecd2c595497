//! Streaming text and structured-object streams over scripted delta sequences.

mod common;

use std::sync::Arc;

use common::*;
use futures::StreamExt;
use llm_conductor::util::partial_json::parse_partial;
use llm_conductor::*;
use serde::Deserialize;

fn done(usage: Option<Usage>) -> Result<TextStreamDelta, Error> {
    Ok(TextStreamDelta::done(usage, FinishReason::Stop))
}

fn text(s: &str) -> Result<TextStreamDelta, Error> {
    Ok(TextStreamDelta::text(s))
}

// ============================================================================
// Text streams
// ============================================================================

#[tokio::test]
async fn test_stream_text_forwards_every_delta_in_order() {
    let pieces = ["The ", "quick ", "brown ", "fox"];
    let mut script: Vec<_> = pieces.iter().map(|p| text(p)).collect();
    script.push(done(Some(Usage::new(7, 0))));
    let provider = ScriptedProvider::new("m").stream_script(script);
    let tracker = Arc::new(InMemoryUsageTracker::new());

    let mut result = stream_text(
        &provider,
        GenerateOptions::new(vec![Message::user("fox")]).usage_tracker(tracker.clone()),
    )
    .unwrap();
    let streamed: Vec<String> = result.text_stream().map(|t| t.unwrap()).collect().await;

    assert_eq!(streamed, pieces);
    assert_eq!(result.text(), "The quick brown fox");

    // 4 + 6 + 6 + 3 chars estimate to 1 + 2 + 2 + 1 output tokens.
    let records = tracker.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].usage, Usage::new(7, 6));
    assert!(tracker.open_sessions().is_empty());
}

#[tokio::test]
async fn test_stream_text_aborts_on_error() {
    let provider = ScriptedProvider::new("m").stream_script(vec![
        text("Hello"),
        Err(Error::api(500, "upstream exploded")),
    ]);
    let tracker = Arc::new(InMemoryUsageTracker::new());

    let items: Vec<_> = stream_text(
        &provider,
        GenerateOptions::new(vec![Message::user("hi")]).usage_tracker(tracker.clone()),
    )
    .unwrap()
    .collect()
    .await;

    assert_eq!(items.len(), 2);
    assert!(items[1].is_err());
    assert!(tracker.records().is_empty());
    assert!(tracker.open_sessions().is_empty());
}

#[tokio::test]
async fn test_stream_text_does_not_run_tools() {
    let provider = ScriptedProvider::new("m").stream_script(vec![
        Ok(TextStreamDelta::ToolCall {
            tool_call: call("s1", "broken", serde_json::json!({})),
        }),
        Ok(TextStreamDelta::done(None, FinishReason::ToolCalls)),
    ]);

    let mut result = stream_text(
        &provider,
        GenerateOptions::new(vec![Message::user("go")])
            .tools(vec![broken_tool()])
            .max_steps(5),
    )
    .unwrap();
    while result.next().await.is_some() {}

    assert_eq!(provider.requests().len(), 1);
    assert_eq!(provider.requests()[0].tools.as_ref().map(Vec::len), Some(1));
    assert_eq!(result.tool_calls()[0].name, "broken");
}

// ============================================================================
// Object streams
// ============================================================================

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Person {
    name: Option<String>,
    age: Option<u32>,
}

#[test]
fn test_truncations_never_contradict_final_object() {
    let full = r#"{"name":"Ada","age":37}"#;
    for end in 0..=full.len() {
        if let Some(partial) = parse_partial::<Person>(&full[..end]) {
            if let Some(name) = &partial.name {
                assert_eq!(name, "Ada", "prefix {:?}", &full[..end]);
            }
            if let Some(age) = partial.age {
                assert_eq!(age, 37, "prefix {:?}", &full[..end]);
            }
        }
    }
}

#[tokio::test]
async fn test_stream_object_character_by_character() {
    let full = r#"{"name":"Ada","age":37}"#;
    let mut script: Vec<_> = full
        .chars()
        .map(|c| Ok(TextStreamDelta::text(c.to_string())))
        .collect();
    script.push(done(Some(Usage::new(5, 10))));
    let provider = ScriptedProvider::new("m").stream_script(script);

    let items: Vec<ObjectStreamDelta<Person>> = stream_object(
        &provider,
        GenerateOptions::new(vec![Message::user("Ada?")]),
        None,
    )
    .unwrap()
    .map(|d| d.unwrap())
    .collect()
    .await;

    assert_eq!(items.first(), Some(&ObjectStreamDelta::Start));
    let starts = items
        .iter()
        .filter(|d| matches!(d, ObjectStreamDelta::Start))
        .count();
    let completes = items
        .iter()
        .filter(|d| matches!(d, ObjectStreamDelta::Complete { .. }))
        .count();
    assert_eq!(starts, 1);
    assert_eq!(completes, 1);

    let mut previous: Option<&Person> = None;
    for delta in &items {
        if let ObjectStreamDelta::Partial { object } = delta {
            assert_ne!(previous, Some(object));
            assert!(object.name.as_deref().is_none_or(|n| n == "Ada"));
            assert!(object.age.is_none_or(|a| a == 37));
            previous = Some(object);
        }
    }

    let final_person = Person {
        name: Some("Ada".into()),
        age: Some(37),
    };
    assert_eq!(
        items[items.len() - 2],
        ObjectStreamDelta::Complete {
            object: final_person
        }
    );
    assert!(items[items.len() - 1].is_done());
}

#[tokio::test]
async fn test_stream_object_fatal_when_nothing_parses() {
    let provider = ScriptedProvider::new("m").stream_script(vec![
        text("I'd rather "),
        text("not."),
        done(None),
    ]);

    let items: Vec<_> = stream_object::<Person>(
        &provider,
        GenerateOptions::new(vec![Message::user("Ada?")]),
        None,
    )
    .unwrap()
    .collect()
    .await;

    let err = items.last().unwrap().as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!items
        .iter()
        .any(|d| matches!(d, Ok(ObjectStreamDelta::Complete { .. }))));
}
