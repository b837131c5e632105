//! Tests for decoding event streams that arrive in pieces.

use std::time::Duration;

use ai_services_mcp::chat::{collect_fragments, fragments};
use futures_util::StreamExt;
use tokio::io::{AsyncWriteExt, BufReader};

fn event(content: &str) -> String {
    format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{content}\"}}}}]}}\n\n")
}

#[tokio::test]
async fn lines_split_across_writes_are_reassembled() {
    let (mut writer, reader) = tokio::io::duplex(64);

    let body = format!("{}{}data: [DONE]\n\n", event("Hello"), event(" world"));
    let writing = tokio::spawn(async move {
        for chunk in body.as_bytes().chunks(7) {
            writer.write_all(chunk).await.unwrap();
        }
    });

    let text = collect_fragments(BufReader::new(reader)).await.unwrap();
    writing.await.unwrap();

    assert_eq!(text, "Hello world");
}

#[tokio::test]
async fn fragments_arrive_before_the_stream_ends() {
    let (mut writer, reader) = tokio::io::duplex(1024);
    let mut stream = std::pin::pin!(fragments(BufReader::new(reader)));

    writer.write_all(event("first").as_bytes()).await.unwrap();
    let first = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("first fragment should not wait for end of input");
    assert_eq!(first.unwrap().unwrap(), "first");

    writer.write_all(event("second").as_bytes()).await.unwrap();
    drop(writer);
    assert_eq!(stream.next().await.unwrap().unwrap(), "second");
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn done_sentinel_stops_reading() {
    let (mut writer, reader) = tokio::io::duplex(1024);
    writer.write_all(event("A").as_bytes()).await.unwrap();
    writer.write_all(b"data: [DONE]\n\n").await.unwrap();

    // The writer stays open: only the sentinel can end collection.
    let text = tokio::time::timeout(
        Duration::from_secs(5),
        collect_fragments(BufReader::new(reader)),
    )
    .await
    .expect("collection should stop at the sentinel")
    .unwrap();

    assert_eq!(text, "A");
    drop(writer);
}

#[tokio::test]
async fn noise_between_events_is_ignored() {
    let (mut writer, reader) = tokio::io::duplex(1024);
    let body = format!(
        ": keep-alive\n\nevent: message\n{}data: {{broken\n\n{}data: {{\"choices\":[]}}\n\n",
        event("A"),
        event("B"),
    );
    writer.write_all(body.as_bytes()).await.unwrap();
    drop(writer);

    assert_eq!(
        collect_fragments(BufReader::new(reader)).await.unwrap(),
        "AB"
    );
}
