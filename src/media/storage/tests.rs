use super::*;

fn test_client() -> StorageClient {
    StorageClient::new(StorageConfig {
        endpoint: String::from("http://minio:9000"),
        bucket: String::from("content"),
        key_prefix: String::from("dev"),
        public_base_url: None,
    })
    .unwrap()
}

#[test]
fn test_generate_key_with_filename() {
    let client = test_client();
    assert_eq!(
        client.generate_key(Some("cover.png")),
        "dev/images/cover.png"
    );
}

#[test]
fn test_generate_key_auto_generated() {
    let client = test_client();
    let key = client.generate_key(None);

    assert!(key.starts_with("dev/images/ai-"));
    assert!(key.ends_with(".png"));
    // 两次生成的键必须不同
    assert_ne!(key, client.generate_key(None));
}

#[test]
fn test_generate_key_blank_filename_falls_back() {
    let client = test_client();
    let key = client.generate_key(Some("  "));
    assert!(key.starts_with("dev/images/ai-"));
}

#[test]
fn test_public_url() {
    let client = test_client();
    assert_eq!(
        client.public_url("dev/images/cover.png"),
        "http://minio:9000/content/dev/images/cover.png"
    );
}

#[test]
fn test_public_url_with_override() {
    let client = StorageClient::new(StorageConfig {
        endpoint: String::from("http://minio:9000"),
        bucket: String::from("content"),
        key_prefix: String::from("dev"),
        public_base_url: Some(String::from("https://cdn.example.com")),
    })
    .unwrap();

    assert_eq!(
        client.public_url("dev/images/cover.png"),
        "https://cdn.example.com/dev/images/cover.png"
    );
}

#[tokio::test]
async fn test_upload_from_unreachable_source_is_failure_record() {
    let client = StorageClient::new(StorageConfig {
        endpoint: String::from("http://127.0.0.1:1"),
        bucket: String::from("content"),
        key_prefix: String::from("dev"),
        public_base_url: None,
    })
    .unwrap();

    let outcome = client
        .upload_from_url("http://127.0.0.1:1/download/a.png", "image/png")
        .await;

    assert!(!outcome.success);
    assert!(outcome.public_url.is_none());
    assert!(outcome.error.is_some());
}
