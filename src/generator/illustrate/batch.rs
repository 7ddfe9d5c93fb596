//! 配图批量生成
//!
//! 所有提示词的任务同时启动，但真正排队发生在资源准入门与后端内部，
//! 这里只负责扇出与按原始顺序收拢结果。单条提示词全链路是
//! 生成 → 安全检查 → 转存 → 清理，任何一步失败都折叠为该位置的失败记录。

use async_trait::async_trait;
use std::sync::Arc;

use super::types::ImageOutcome;
use crate::config::ImageStyle;
use crate::media::{backend::ImageBackendClient, safety::SafetyClient, storage::StorageClient};

/// 单条提示词的配图执行器
///
/// 失败永远折叠进返回的结果记录，实现不允许panic之外的方式中断兄弟任务。
#[async_trait]
pub trait ImageProducer: Send + Sync {
    async fn produce(&self, prompt: &str) -> ImageOutcome;
}

/// 对接真实后端的执行器：生成、安全检查、转存、清理
pub struct BackendImageProducer {
    backend: Arc<ImageBackendClient>,
    safety: Arc<SafetyClient>,
    storage: Arc<StorageClient>,
    style: ImageStyle,
}

impl BackendImageProducer {
    pub fn new(
        backend: Arc<ImageBackendClient>,
        safety: Arc<SafetyClient>,
        storage: Arc<StorageClient>,
        style: ImageStyle,
    ) -> Self {
        Self {
            backend,
            safety,
            storage,
            style,
        }
    }
}

#[async_trait]
impl ImageProducer for BackendImageProducer {
    async fn produce(&self, prompt: &str) -> ImageOutcome {
        // 调用后端之前先过提示词过滤，省一次昂贵的推理
        if let Some(reason) = self.safety.screen_prompt(prompt) {
            return ImageOutcome::failure(reason);
        }

        let seed = rand::random::<u32>() as u64;
        let generated = self
            .backend
            .generate_image(prompt, Some(self.style.negative_prompt()), Some(seed))
            .await;

        if !generated.success {
            return ImageOutcome::failure(
                generated
                    .error
                    .unwrap_or_else(|| String::from("Image generation failed")),
            );
        }

        let download_url = match generated.download_url {
            Some(url) => url,
            None => return ImageOutcome::failure("Image generated but no URL returned"),
        };

        let verdict = self.safety.check_image(&download_url).await;
        if !verdict.is_safe {
            // 被拦下的图片同样要清掉后端临时文件
            self.backend.delete_file(&download_url).await;
            return ImageOutcome::failure(
                verdict
                    .explanation
                    .unwrap_or_else(|| String::from("Image failed safety check")),
            );
        }

        let upload = self.storage.upload_from_url(&download_url, "image/png").await;
        if !upload.success {
            return ImageOutcome::failure(format!(
                "Failed to save image to storage: {}",
                upload.error.unwrap_or_default()
            ));
        }

        // 转存成功后清理后端临时文件；失败只记日志，不影响结果
        self.backend.delete_file(&download_url).await;

        match upload.public_url {
            Some(url) => ImageOutcome::success(url, generated.generation_time),
            None => ImageOutcome::failure("Upload succeeded but no public URL produced"),
        }
    }
}

/// 给每条提示词追加风格修饰
///
/// 拼接是确定性的：同样的提示词与风格永远得到同样的最终提示词。
pub fn apply_style(prompts: &[String], style: ImageStyle) -> Vec<String> {
    prompts
        .iter()
        .map(|prompt| format!("{}{}", prompt, style.prompt_modifier()))
        .collect()
}

/// 并发执行一批提示词，返回与输入同序同长的结果列表
///
/// 任务panic不会丢位置：join错误在对应位置折叠为失败记录。
pub async fn generate_images_batch(
    producer: Arc<dyn ImageProducer>,
    prompts: &[String],
) -> Vec<ImageOutcome> {
    let handles: Vec<_> = prompts
        .iter()
        .cloned()
        .map(|prompt| {
            let producer = Arc::clone(&producer);
            tokio::spawn(async move { producer.produce(&prompt).await })
        })
        .collect();

    let joined = futures::future::join_all(handles).await;
    joined
        .into_iter()
        .map(|result| match result {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("❌ 配图任务异常中止: {}", e);
                ImageOutcome::failure(format!("Image task aborted: {}", e))
            }
        })
        .collect()
}
