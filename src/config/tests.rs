use super::*;
use std::str::FromStr;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert!(config.topic.is_none());
    assert!(config.keywords.is_empty());
    assert!(!config.skip_article);
    assert!(!config.skip_images);
    assert!(!config.verbose);
}

#[test]
fn test_default_gate_config() {
    let config = GateConfig::default();
    assert_eq!(config.max_concurrent_articles, 2);
}

#[test]
fn test_default_image_config() {
    let config = ImageConfig::default();

    assert_eq!(config.width, 1024);
    assert_eq!(config.height, 1024);
    assert_eq!(config.steps, 9);
    assert_eq!(config.guidance_scale, 0.0);
    assert_eq!(config.max_images, 2);
    assert_eq!(config.article_excerpt_chars, 2000);
    assert_eq!(config.min_prompt_chars, 15);
    assert_eq!(config.min_sentence_chars, 30);
    assert_eq!(config.min_line_spacing, 10);
}

#[test]
fn test_default_safety_config() {
    let config = SafetyConfig::default();

    assert!(config.api_base_url.is_empty());
    assert_eq!(config.threshold, 0.3);
}

#[test]
fn test_llm_provider_from_str() {
    assert_eq!(LLMProvider::from_str("openai").unwrap(), LLMProvider::OpenAI);
    assert_eq!(
        LLMProvider::from_str("DeepSeek").unwrap(),
        LLMProvider::DeepSeek
    );
    assert_eq!(LLMProvider::from_str("OLLAMA").unwrap(), LLMProvider::Ollama);
    assert!(LLMProvider::from_str("unknown").is_err());
}

#[test]
fn test_llm_provider_display_roundtrip() {
    for provider in [
        LLMProvider::OpenAI,
        LLMProvider::DeepSeek,
        LLMProvider::Moonshot,
        LLMProvider::Ollama,
    ] {
        let parsed = LLMProvider::from_str(&provider.to_string()).unwrap();
        assert_eq!(parsed, provider);
    }
}

#[test]
fn test_image_style_from_str() {
    assert_eq!(ImageStyle::from_str("photo").unwrap(), ImageStyle::Photo);
    assert_eq!(
        ImageStyle::from_str("Infographic").unwrap(),
        ImageStyle::Infographic
    );
    assert!(ImageStyle::from_str("sketch").is_err());
}

#[test]
fn test_image_style_modifier_is_deterministic() {
    // 同一风格必须永远产出同样的修饰词
    assert_eq!(
        ImageStyle::Photo.prompt_modifier(),
        ImageStyle::Photo.prompt_modifier()
    );
    assert!(
        ImageStyle::Auto
            .prompt_modifier()
            .contains("high quality")
    );
    assert!(!ImageStyle::Cartoon.negative_prompt().is_empty());
}

#[test]
fn test_storage_public_base_from_endpoint() {
    let config = StorageConfig {
        endpoint: String::from("http://minio:9000/"),
        bucket: String::from("content"),
        key_prefix: String::from("dev"),
        public_base_url: None,
    };

    assert_eq!(config.public_base(), "http://minio:9000/content");
}

#[test]
fn test_storage_public_base_override() {
    let config = StorageConfig {
        endpoint: String::from("http://minio:9000"),
        bucket: String::from("content"),
        key_prefix: String::from("dev"),
        public_base_url: Some(String::from("https://cdn.example.com/")),
    };

    assert_eq!(config.public_base(), "https://cdn.example.com");
}

#[test]
fn test_config_from_toml() {
    let toml_content = r#"
topic = "NFL season preview"
keywords = ["football", "playoffs"]
output_path = "./out"
skip_article = false
skip_images = false
verbose = true

[llm]
provider = "ollama"
api_key = ""
api_base_url = "http://localhost:11434"
model = "qwen2.5:3b"
max_tokens = 4096
temperature = 0.7
retry_attempts = 3
retry_delay_ms = 1000
timeout_seconds = 120

[gate]
max_concurrent_articles = 3

[image]
api_base_url = "http://localhost:7860"
model = "Tongyi-MAI/Z-Image-Turbo"
width = 512
height = 512
steps = 9
guidance_scale = 0.0
max_images = 2
style = "photo"
article_excerpt_chars = 2000
min_prompt_chars = 15
min_sentence_chars = 30
min_line_spacing = 10

[safety]
api_base_url = "http://localhost:8080"
threshold = 0.3

[storage]
endpoint = "http://localhost:9000"
bucket = "content"
key_prefix = "test"
"#;

    let config: Config = toml::from_str(toml_content).unwrap();
    assert_eq!(config.topic.as_deref(), Some("NFL season preview"));
    assert_eq!(config.keywords.len(), 2);
    assert_eq!(config.gate.max_concurrent_articles, 3);
    assert_eq!(config.image.width, 512);
    assert_eq!(config.image.style, ImageStyle::Photo);
    assert_eq!(config.safety.api_base_url, "http://localhost:8080");
    assert_eq!(config.storage.key_prefix, "test");
}

#[test]
fn test_config_from_file_missing() {
    let path = PathBuf::from("/nonexistent/inkpress.toml");
    assert!(Config::from_file(&path).is_err());
}
