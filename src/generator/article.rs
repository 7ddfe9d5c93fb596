//! 文章生成器
//!
//! 文章生成是主要任务，在资源准入门的文章槽位内执行。槽位在函数返回时
//! 自动释放，之后配图任务才可能获得轮次。

use anyhow::{Context, Result};

use super::context::GeneratorContext;

/// 文章生成的系统提示
const ARTICLE_SYSTEM_PROMPT: &str = r#"You are a professional content writer.

Write a well-structured, engaging article on the given topic in Markdown:
- Start with a single `#` title line
- Organize the body into sections, each introduced by a `##` heading
- Each section contains one or more short paragraphs separated by blank lines
- Naturally work the given keywords into the text
- Do not include any images, image placeholders or HTML"#;

/// 文章生成器
pub struct ArticleWriter;

impl ArticleWriter {
    /// 生成一篇文章
    pub async fn generate(
        context: &GeneratorContext,
        topic: &str,
        keywords: &[String],
    ) -> Result<String> {
        // 占住一个文章槽位；同类任务最多K个并行，配图任务此时被挡在门外
        let _slot = context.gate.acquire_article().await?;
        println!("📝 开始生成文章: {}", topic);

        let user_prompt = build_article_prompt(topic, keywords);
        let content = context
            .llm_client
            .generate_with_default_temperature(ARTICLE_SYSTEM_PROMPT, &user_prompt)
            .await
            .context("Article generation failed")?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            anyhow::bail!("Model returned an empty article");
        }

        println!("✓ 文章生成完成 ({} 字符)", trimmed.chars().count());
        Ok(trimmed.to_string())
    }
}

/// 拼装文章生成的用户提示
fn build_article_prompt(topic: &str, keywords: &[String]) -> String {
    if keywords.is_empty() {
        format!("Write an article about: {}", topic)
    } else {
        format!(
            "Write an article about: {}\n\nKeywords to include: {}",
            topic,
            keywords.join(", ")
        )
    }
}
