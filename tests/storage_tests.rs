// Tests for the artifact store: audio artifact naming, traversal
// rejection, and the best-effort history mirror.

use chrono::Utc;
use parla::{ArtifactStore, Message, Role};
use tempfile::tempdir;

fn message(original: &str, translated: &str) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: Utc::now(),
        sender_role: Role::RoleA,
        original_text: original.to_string(),
        translated_text: translated.to_string(),
        audio_url: "/api/audio/clip.mp3".to_string(),
        source_lang: "en".to_string(),
        target_lang: "es".to_string(),
    }
}

#[tokio::test]
async fn open_creates_the_audio_directories() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");

    ArtifactStore::open(&input, &output, None).await.unwrap();

    assert!(input.is_dir());
    assert!(output.is_dir());
}

#[tokio::test]
async fn saved_audio_lands_in_the_right_directory() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::open(dir.path().join("in"), dir.path().join("out"), None)
        .await
        .unwrap();

    let input_name = store.save_input_audio(b"raw clip").await.unwrap();
    assert!(input_name.starts_with("input_"));
    assert!(input_name.ends_with(".webm"));
    assert!(dir.path().join("in").join(&input_name).is_file());

    let output_name = store.save_output_audio(b"synth clip").await.unwrap();
    assert!(output_name.starts_with("translated_"));
    assert!(output_name.ends_with(".mp3"));

    let path = store.output_path(&output_name).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"synth clip");
}

#[tokio::test]
async fn output_path_rejects_traversal() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::open(dir.path().join("in"), dir.path().join("out"), None)
        .await
        .unwrap();

    assert!(store.output_path("../secret.mp3").is_none());
    assert!(store.output_path("a/b.mp3").is_none());
    assert!(store.output_path("a\\b.mp3").is_none());
    assert!(store.output_path("").is_none());
    assert!(store.output_path("clip.mp3").is_some());
}

#[tokio::test]
async fn mirrored_messages_come_back_in_order() {
    let dir = tempdir().unwrap();
    let history_file = dir.path().join("history.json");
    let store = ArtifactStore::open(
        dir.path().join("in"),
        dir.path().join("out"),
        Some(history_file),
    )
    .await
    .unwrap();

    store.mirror_message("ABC123", &message("one", "uno")).await;
    store.mirror_message("ABC123", &message("two", "dos")).await;
    store.mirror_message("XYZ789", &message("three", "tres")).await;

    let all = store.history_tail(0).await;
    let texts: Vec<_> = all.iter().map(|e| e.message.original_text.as_str()).collect();
    assert_eq!(texts, ["one", "two", "three"]);

    let tail = store.history_tail(2).await;
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].message.original_text, "two");
    assert_eq!(tail[1].session_id, "XYZ789");
}

#[tokio::test]
async fn a_corrupt_history_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let history_file = dir.path().join("history.json");
    std::fs::write(&history_file, "not json at all").unwrap();

    let store = ArtifactStore::open(
        dir.path().join("in"),
        dir.path().join("out"),
        Some(history_file),
    )
    .await
    .unwrap();

    assert!(store.history_tail(0).await.is_empty());

    // And the next mirror write starts a fresh file.
    store.mirror_message("ABC123", &message("one", "uno")).await;
    assert_eq!(store.history_tail(0).await.len(), 1);
}

#[tokio::test]
async fn disabled_mirror_stays_silent() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::open(dir.path().join("in"), dir.path().join("out"), None)
        .await
        .unwrap();

    store.mirror_message("ABC123", &message("one", "uno")).await;

    assert!(store.history_tail(0).await.is_empty());
}
