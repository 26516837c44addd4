use cli::context::{load_photo, load_photos};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_photo_file_becomes_inline_jpeg() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("front.jpg");
    fs::write(&path, [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10]).unwrap();

    let photo = load_photo(&path).await.unwrap();
    assert!(photo.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_unreadable_photo_is_an_error() {
    let dir = TempDir::new().unwrap();
    let text = dir.path().join("notes.txt");
    fs::write(&text, "not an image").unwrap();

    let err = load_photo(&text).await.unwrap_err();
    assert!(err.to_string().contains("not a readable image"));

    assert!(load_photos(&[dir.path().join("missing.jpg")]).await.is_err());
    assert!(load_photos::<&str>(&[]).await.unwrap().is_empty());
}
