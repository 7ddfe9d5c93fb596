use super::*;

fn enabled_client() -> SafetyClient {
    SafetyClient::new(&SafetyConfig {
        api_base_url: String::from("http://safety:8080"),
        threshold: 0.3,
    })
    .unwrap()
}

fn disabled_client() -> SafetyClient {
    SafetyClient::new(&SafetyConfig::default()).unwrap()
}

#[test]
fn test_screen_prompt_accepts_clean_prompt() {
    let client = disabled_client();
    assert!(
        client
            .screen_prompt("A professional football player in action during a game")
            .is_none()
    );
}

#[test]
fn test_screen_prompt_rejects_empty() {
    let client = disabled_client();
    assert!(client.screen_prompt("   ").is_some());
}

#[test]
fn test_screen_prompt_rejects_keyword() {
    let client = disabled_client();
    let reason = client.screen_prompt("a nude figure on the beach");
    assert!(reason.is_some());
    assert!(reason.unwrap().contains("nude"));
}

#[test]
fn test_screen_prompt_word_boundary() {
    let client = disabled_client();
    // "football"不包含整词"ball"，关键词"kill"也不应命中"skills"
    assert!(
        client
            .screen_prompt("football players showing their skills on the field")
            .is_none()
    );
}

#[test]
fn test_screen_prompt_rejects_blocked_pattern() {
    let client = disabled_client();
    assert!(client.screen_prompt("a Sexy  Girl posing").is_some());
}

#[test]
fn test_judge_flags_nsfw_above_threshold() {
    let client = enabled_client();
    let results = vec![
        ClassificationScore {
            label: String::from("normal"),
            score: 0.55,
        },
        ClassificationScore {
            label: String::from("nsfw"),
            score: 0.45,
        },
    ];

    let verdict = client.judge(&results);
    assert!(!verdict.is_safe);
    assert!(verdict.explanation.is_some());
    let scores = verdict.scores.unwrap();
    assert_eq!(scores["nsfw"], 0.45);
}

#[test]
fn test_judge_passes_nsfw_below_threshold() {
    let client = enabled_client();
    let results = vec![
        ClassificationScore {
            label: String::from("normal"),
            score: 0.9,
        },
        ClassificationScore {
            label: String::from("nsfw"),
            score: 0.1,
        },
    ];

    let verdict = client.judge(&results);
    assert!(verdict.is_safe);
    assert!(verdict.explanation.is_none());
}

#[test]
fn test_judge_ignores_unrelated_labels() {
    let client = enabled_client();
    let results = vec![ClassificationScore {
        label: String::from("landscape"),
        score: 0.99,
    }];

    assert!(client.judge(&results).is_safe);
}

#[tokio::test]
async fn test_check_image_disabled_returns_safe() {
    let client = disabled_client();
    let verdict = client.check_image("http://backend/download/a.png").await;
    assert!(verdict.is_safe);
    assert!(verdict.scores.is_none());
}

#[tokio::test]
async fn test_check_image_unreachable_blocks_conservatively() {
    let client = SafetyClient::new(&SafetyConfig {
        api_base_url: String::from("http://127.0.0.1:1"),
        threshold: 0.3,
    })
    .unwrap();

    let verdict = client.check_image("http://backend/download/a.png").await;
    assert!(!verdict.is_safe);
    assert!(verdict.explanation.unwrap().contains("Unable to verify"));
}
