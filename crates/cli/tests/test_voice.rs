use assert_cmd::Command;
use futures::{SinkExt, StreamExt};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// One second of 0x11 samples at 24 kHz
fn first_reply_chunk() -> String {
    "ERER".repeat(16_000)
}

/// Half a second of 0x22 samples at 24 kHz
fn second_reply_chunk() -> String {
    "IiIi".repeat(8_000)
}

fn server_audio(data: String) -> Value {
    json!({"serverContent": {"modelTurn": {"parts": [
        {"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": data}}
    ]}}})
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_voice_drops_unplayed_audio_after_interruption() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let mut stream_ended = false;
        while !stream_ended {
            if let Message::Text(text) = ws.next().await.unwrap().unwrap() {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                if value.get("setup").is_some() {
                    ws.send(Message::text(json!({"setupComplete": {}}).to_string()))
                        .await
                        .unwrap();
                }
                stream_ended = value["realtimeInput"]["audioStreamEnd"] == true;
            }
        }

        for message in [
            server_audio(first_reply_chunk()),
            json!({"serverContent": {"interrupted": true}}),
            server_audio(second_reply_chunk()),
            json!({"serverContent": {"turnComplete": true}}),
        ] {
            ws.send(Message::text(message.to_string())).await.unwrap();
        }

        while let Some(Ok(_)) = ws.next().await {}
    });

    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    let input = dir.path().join("question.pcm");
    let output = dir.path().join("reply.pcm");
    fs::write(&config, "").unwrap();
    fs::write(&input, [1u8, 0, 2, 0]).unwrap();

    let (dir_path, output_path) = (dir.path().to_path_buf(), output.clone());
    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("aidentify")
            .unwrap()
            .env_clear()
            .env("RUST_LOG", "error")
            .env("GEMINI_API_KEY", "test-key")
            .env("GEMINI_LIVE_URL", format!("ws://{addr}/ws"))
            .current_dir(&dir_path)
            .arg("--config")
            .arg(&config)
            .arg("voice")
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&output_path)
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote"));
    })
    .await
    .unwrap();

    server.await.unwrap();

    let written = fs::read(&output).unwrap();
    // the interrupted reply is cut at its playback position, which is only a
    // few milliseconds in
    assert!(written.len() >= 24_000, "len {}", written.len());
    assert!(written.len() < 48_000, "len {}", written.len());
    assert_eq!(written.len() % 2, 0);
    let (heard, second) = written.split_at(written.len() - 24_000);
    assert!(heard.iter().all(|&b| b == 0x11));
    assert!(second.iter().all(|&b| b == 0x22));
}
