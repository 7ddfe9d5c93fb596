use crate::config::Config;
use crate::generator::article::ArticleWriter;
use crate::generator::context::GeneratorContext;
use crate::generator::illustrate::Illustrator;

use anyhow::{Context, Result};
use std::fs;

/// 启动内容生成工作流
pub async fn launch(config: &Config) -> Result<()> {
    let context = GeneratorContext::new(config.clone())?;

    // 启动时检查模型连接
    context.llm_client.check_connection().await?;

    // 图片后端不可用不阻塞文章生成，先提示再继续
    if !config.skip_images && !context.image_backend.check_health().await {
        eprintln!("⚠️ 图片后端当前不可用，配图步骤可能失败");
    }

    fs::create_dir_all(&config.output_path).context("Failed to create output directory")?;
    let article_path = config.output_path.join("article.md");

    let article = if config.skip_article {
        println!("⏭️ 跳过文章生成，读取已有文章: {:?}", article_path);
        fs::read_to_string(&article_path).context(format!(
            "Failed to read existing article at {:?}",
            article_path
        ))?
    } else {
        let topic = config.topic.as_deref().context(
            "No topic given; pass --topic or set it in the config file",
        )?;
        let content = ArticleWriter::generate(&context, topic, &config.keywords).await?;
        fs::write(&article_path, &content).context("Failed to write article")?;
        println!("✓ 文章已写入: {:?}", article_path);
        content
    };

    if config.skip_images {
        println!("⏭️ 跳过配图生成");
        return Ok(());
    }

    let result =
        Illustrator::generate_and_embed(&context, &article, config.image.max_images).await?;

    if !result.success {
        eprintln!("⚠️ 配图未完成: {}", result.message);
        return Ok(());
    }

    fs::write(&article_path, &result.content).context("Failed to write illustrated article")?;

    if !result.images.is_empty() {
        let metadata_path = config.output_path.join("images.json");
        let json = serde_json::to_string_pretty(&result.images)
            .context("Failed to serialize image metadata")?;
        fs::write(&metadata_path, json).context("Failed to write image metadata")?;
        println!("✓ 图片元数据已写入: {:?}", metadata_path);
    }

    println!("🎉 {}", result.message);
    Ok(())
}
