//! 文章配图流水线
//!
//! 提取提示词 → 并发生成 → 安全检查 → 转存 → 嵌入文章。
//! 整个流程在资源准入门的配图轮次内执行，部分失败折叠进结果，
//! 只有取不到配图轮次这类基础设施故障才作为错误向上传播。

pub mod batch;
pub mod embed;
pub mod prompts;
pub mod types;

use anyhow::Result;
use std::sync::Arc;

use batch::{apply_style, generate_images_batch, BackendImageProducer, ImageProducer};
use embed::embed_images;
use prompts::extract_image_prompts;
use types::IllustrationResult;

use super::context::GeneratorContext;

/// 配图流水线入口
pub struct Illustrator;

impl Illustrator {
    /// 为文章生成并嵌入配图
    ///
    /// `image_count` 为期望的图片数量，实际数量还会被配置的上限约束。
    /// 返回的结果总是结构化的：没有提示词、全部生成失败都体现在
    /// `success` 与 `message` 上，不作为错误抛出。
    pub async fn generate_and_embed(
        context: &GeneratorContext,
        article: &str,
        image_count: usize,
    ) -> Result<IllustrationResult> {
        if image_count == 0 {
            return Ok(IllustrationResult::skipped(article, "No images requested"));
        }
        let count = image_count.min(context.config.image.max_images);

        // 配图必须在准入门的轮次内进行：等待所有文章任务退场并独占后端
        let _turn = context.gate.acquire_image_turn().await?;
        println!("🎨 开始配图流程 (计划 {} 张)...", count);

        let prompts =
            extract_image_prompts(&context.llm_client, article, count, &context.config.image)
                .await;
        if prompts.is_empty() {
            return Ok(IllustrationResult::no_images(
                article,
                "Failed to generate image prompts",
            ));
        }

        let producer: Arc<dyn ImageProducer> = Arc::new(BackendImageProducer::new(
            Arc::clone(&context.image_backend),
            Arc::clone(&context.safety),
            Arc::clone(&context.storage),
            context.config.image.style,
        ));

        let styled = apply_style(&prompts, context.config.image.style);
        let outcomes = generate_images_batch(producer, &styled).await;

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        if succeeded == 0 {
            let first_error = outcomes
                .iter()
                .find_map(|o| o.error.clone())
                .unwrap_or_else(|| String::from("unknown error"));
            eprintln!("❌ 所有配图任务都失败了: {}", first_error);
            return Ok(IllustrationResult::no_images(
                embed::strip_placeholder_tags(article),
                format!("Failed to generate any images: {}", first_error),
            ));
        }

        // 嵌入与元数据使用原始提示词，不带风格修饰
        let (content, images) = embed_images(
            article,
            &prompts,
            &outcomes,
            context.config.image.min_line_spacing,
        );

        let message = format!("Generated {}/{} images successfully", succeeded, prompts.len());
        println!("✓ {}", message);

        Ok(IllustrationResult {
            success: true,
            content,
            images,
            message,
        })
    }
}
