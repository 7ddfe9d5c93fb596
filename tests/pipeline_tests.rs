use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::{sleep, timeout};

use inkpress_rs::config::Config;
use inkpress_rs::gate::ResourceGate;
use inkpress_rs::generator::illustrate::embed::{count_image_markers, embed_images};
use inkpress_rs::generator::illustrate::prompts::{parse_prompt_response, ParseLimits};
use inkpress_rs::generator::illustrate::types::ImageOutcome;

/// 端到端验证准入规则：配图轮次必须等所有文章退场，且开始时活跃计数为0
#[tokio::test]
async fn test_image_turn_waits_for_all_articles() {
    let gate = Arc::new(ResourceGate::new(2));

    let slot_a = gate.acquire_article().await.unwrap();
    let slot_b = gate.acquire_article().await.unwrap();

    let gate_for_image = Arc::clone(&gate);
    let image_task = tokio::spawn(async move {
        let _turn = gate_for_image.acquire_image_turn().await.unwrap();
        gate_for_image.status().active_articles
    });

    // 文章还在进行，配图不可能开始
    sleep(Duration::from_millis(50)).await;
    assert!(!image_task.is_finished());

    drop(slot_a);
    sleep(Duration::from_millis(50)).await;
    assert!(!image_task.is_finished());

    drop(slot_b);
    let active_at_start = timeout(Duration::from_secs(1), image_task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active_at_start, 0);
}

/// 模型响应解析到文章嵌入的纯数据通路
#[test]
fn test_parse_then_embed_round() {
    let limits = ParseLimits {
        min_prompt_chars: 15,
        min_sentence_chars: 30,
    };
    let response = "1. A community garden on a rooftop\n2. Hands planting seedlings in rich soil";
    let prompts = parse_prompt_response(response, 2, limits);
    assert_eq!(prompts.len(), 2);

    let article = "# Growing Up\n\n## Getting Started\n\nEvery garden begins with a plan.\n\n## Daily Care\n\nWatering is a quiet ritual.\n";
    let outcomes = vec![
        ImageOutcome::success("https://cdn.test/garden.png", None),
        ImageOutcome::failure("backend unavailable"),
    ];

    let (content, images) = embed_images(article, &prompts, &outcomes, 10);

    // 只有成功的那张进入正文与元数据，且两者数量一致
    assert_eq!(images.len(), 1);
    assert_eq!(count_image_markers(&content), 1);
    assert_eq!(images[0].index, 1);
    assert_eq!(images[0].prompt, "A community garden on a rooftop");
    assert!(content.contains("https://cdn.test/garden.png"));
}

/// 配置文件落盘再读取
#[test]
fn test_config_round_trip_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("inkpress.toml");

    let mut config = Config::default();
    config.topic = Some(String::from("Coastal birds"));
    config.gate.max_concurrent_articles = 3;
    config.image.max_images = 1;

    let serialized = toml::to_string(&config).unwrap();
    fs::write(&config_path, serialized).unwrap();

    let loaded = Config::from_file(&config_path).unwrap();
    assert_eq!(loaded.topic, Some(String::from("Coastal birds")));
    assert_eq!(loaded.gate.max_concurrent_articles, 3);
    assert_eq!(loaded.image.max_images, 1);
}

/// 配图任务互相串行：并发提交多个轮次，任意时刻只有一个在执行
#[tokio::test]
async fn test_image_turns_never_overlap() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let gate = Arc::new(ResourceGate::new(2));
    let running = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let gate = Arc::clone(&gate);
        let running = Arc::clone(&running);
        let max_seen = Arc::clone(&max_seen);
        handles.push(tokio::spawn(async move {
            let _turn = gate.acquire_image_turn().await.unwrap();
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(20)).await;
            running.fetch_sub(1, Ordering::SeqCst);
        }));
    }

    for handle in handles {
        timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    }
    assert_eq!(max_seen.load(std::sync::atomic::Ordering::SeqCst), 1);
}
