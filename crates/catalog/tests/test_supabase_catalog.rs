use catalog::{import_csv, BucketStatus, CatalogError, SupabaseCatalog};
use domain::{PartDraft, PartModel, PartRecord, PartRepository, PhotoRef};
use mockito::{Matcher, Server};
use serde_json::json;

fn catalog(server: &Server) -> SupabaseCatalog {
    SupabaseCatalog::new(&server.url(), "anon-key", "parts-images").unwrap()
}

fn draft(number: &str) -> PartDraft {
    PartDraft {
        part_number: number.to_string(),
        part_name: "Bracket".to_string(),
        workstation: "WS-1".to_string(),
        models: vec![PartModel::B03],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_list_parts_maps_rows_in_server_order() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/v1/parts")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("select".into(), "*".into()),
            Matcher::UrlEncoded("order".into(), "timestamp.desc".into()),
        ]))
        .match_header("apikey", "anon-key")
        .match_header("authorization", "Bearer anon-key")
        .with_status(200)
        .with_body(
            json!([
                {"id": "new", "part_number": "N-2", "part_name": "Clip", "color": "Ayers Grey",
                 "workstation": "WS-2", "models": ["B03"], "image_urls": ["https://cdn/x.jpg"], "timestamp": 20},
                {"id": "old", "part_number": "N-1", "part_name": "Bracket", "color": null,
                 "workstation": "WS-1", "models": null, "image_urls": null, "timestamp": 10}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let parts = catalog(&server).list_parts().await.unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].id, "new");
    assert_eq!(parts[0].models, vec![PartModel::B03]);
    assert!(parts[1].image_urls.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_error_message_is_surfaced() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/rest/v1/parts")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"Invalid API key","hint":"Double check your Supabase `anon` or `service_role` API key."}"#)
        .create_async()
        .await;

    let err = catalog(&server).list_parts().await.unwrap_err();
    match err {
        CatalogError::Http { status, message } => {
            assert_eq!(status, 401);
            assert!(message.starts_with("Invalid API key"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_save_part_uploads_inline_photos_then_upserts() {
    let mut server = Server::new_async().await;

    let upload = server
        .mock(
            "POST",
            Matcher::Regex(r"^/storage/v1/object/parts-images/p_100/[0-9a-f-]{36}\.jpg$".to_string()),
        )
        .match_header("content-type", "image/jpeg")
        .match_header("x-upsert", "true")
        .match_header("cache-control", "3600")
        .with_status(200)
        .with_body(r#"{"Key":"parts-images/p_100/x.jpg"}"#)
        .expect(1)
        .create_async()
        .await;

    let upsert = server
        .mock("POST", "/rest/v1/parts")
        .match_query(Matcher::UrlEncoded("on_conflict".into(), "id".into()))
        .match_header("prefer", Matcher::Regex("resolution=merge-duplicates".to_string()))
        .match_body(Matcher::Regex(r#""part_number":"P-100""#.to_string()))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let inline = PhotoRef::inline("image/jpeg", &[0xff, 0xd8, 0xff]).to_url_string();
    let mut part = PartRecord::from_draft(
        draft("P-100"),
        vec![inline, "https://cdn.example.com/kept.jpg".to_string()],
    )
    .unwrap();
    part.timestamp = 0;

    let stored = catalog(&server).save_part(&part).await.unwrap();

    let public_prefix = format!("{}/storage/v1/object/public/parts-images/p_100/", server.url());
    assert!(stored.image_urls[0].starts_with(&public_prefix));
    assert_eq!(stored.image_urls[1], "https://cdn.example.com/kept.jpg");
    assert!(stored.timestamp > 0);
    upload.assert_async().await;
    upsert.assert_async().await;
}

#[tokio::test]
async fn test_blank_part_number_uses_unnamed_folder() {
    let mut server = Server::new_async().await;
    let upload = server
        .mock(
            "POST",
            Matcher::Regex(r"^/storage/v1/object/parts-images/unnamed_part/.+\.jpg$".to_string()),
        )
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", "/rest/v1/parts")
        .match_query(Matcher::Any)
        .with_status(201)
        .create_async()
        .await;

    let mut part = PartRecord::imported(draft(" "));
    part.add_photo(PhotoRef::inline("image/jpeg", &[1, 2, 3]).to_url_string());

    catalog(&server).save_part(&part).await.unwrap();
    upload.assert_async().await;
}

#[tokio::test]
async fn test_failed_upload_aborts_save() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", Matcher::Regex(r"^/storage/".to_string()))
        .with_status(400)
        .with_body(r#"{"statusCode":"404","error":"Bucket not found","message":"Bucket not found"}"#)
        .create_async()
        .await;
    let upsert = server
        .mock("POST", "/rest/v1/parts")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut part = PartRecord::imported(draft("P-1"));
    part.add_photo(PhotoRef::inline("image/jpeg", &[1]).to_url_string());

    let err = catalog(&server).save_part(&part).await.unwrap_err();
    assert!(err.to_string().contains("Bucket not found"));
    upsert.assert_async().await;
}

#[tokio::test]
async fn test_delete_filters_by_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/rest/v1/parts")
        .match_query(Matcher::UrlEncoded("id".into(), "eq.abc-123".into()))
        .with_status(204)
        .create_async()
        .await;

    PartRepository::delete_part(&catalog(&server), "abc-123")
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ensure_bucket_creates_missing_bucket() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/storage/v1/bucket")
        .with_status(200)
        .with_body(r#"[{"id":"avatars","name":"avatars","public":false}]"#)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/storage/v1/bucket")
        .match_body(Matcher::PartialJson(json!({
            "id": "parts-images",
            "public": true,
            "file_size_limit": 5242880
        })))
        .with_status(200)
        .with_body(r#"{"name":"parts-images"}"#)
        .expect(1)
        .create_async()
        .await;

    assert_eq!(catalog(&server).ensure_bucket().await, BucketStatus::Created);
    create.assert_async().await;
}

#[tokio::test]
async fn test_ensure_bucket_existing_and_failure() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/storage/v1/bucket")
        .with_status(200)
        .with_body(r#"[{"id":"parts-images","name":"parts-images","public":true}]"#)
        .create_async()
        .await;

    assert_eq!(catalog(&server).ensure_bucket().await, BucketStatus::Exists);
    list.assert_async().await;

    let mut failing = Server::new_async().await;
    failing
        .mock("GET", "/storage/v1/bucket")
        .with_status(403)
        .with_body(r#"{"error":"Unauthorized","message":"new row violates row-level security policy"}"#)
        .create_async()
        .await;

    match catalog(&failing).ensure_bucket().await {
        BucketStatus::Unavailable(reason) => assert!(reason.contains("row-level security")),
        other => panic!("unexpected status: {other:?}"),
    }
}

#[tokio::test]
async fn test_import_csv_saves_each_row() {
    let mut server = Server::new_async().await;
    let upsert = server
        .mock("POST", "/rest/v1/parts")
        .match_query(Matcher::Any)
        .match_body(Matcher::Regex(r#""image_urls":\[\]"#.to_string()))
        .with_status(201)
        .expect(2)
        .create_async()
        .await;

    let csv = "partNumber,partName,color,workstation,models\nA-1,Clip,,WS-1,B03\nA-2,Nut,KU Grey,WS-2,\n";
    let imported = import_csv(csv.as_bytes(), &catalog(&server)).await.unwrap();

    assert_eq!(imported, 2);
    upsert.assert_async().await;
}
