//! 图片生成后端客户端
//!
//! 对接外部图片推理服务（HuggingFace模型托管API），该服务一次只能可靠处理一个
//! 请求，因此调用方必须先通过资源准入门取得配图轮次。生成结果存放在后端的
//! 临时存储中，下游拿到download_url后应尽快转存并清理。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::ImageConfig;

/// 图片生成请求
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model_id: &'a str,
    prompt: &'a str,
    width: u32,
    height: u32,
    num_inference_steps: u32,
    guidance_scale: f64,
    model_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

/// 后端的生成响应
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    file: Option<String>,
}

/// 健康检查响应
#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: Option<String>,
}

/// 单次图片生成的结果
///
/// 后端调用失败不会作为错误向上传播，而是折叠成 `success=false` 的结果记录，
/// 避免单个提示词的失败中断兄弟任务。
#[derive(Debug, Clone)]
pub struct ImageGenerationOutcome {
    pub success: bool,
    /// 后端临时存储的下载地址（绝对URL）
    pub download_url: Option<String>,
    pub error: Option<String>,
    /// 生成耗时
    pub generation_time: Option<Duration>,
}

impl ImageGenerationOutcome {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            download_url: None,
            error: Some(error.into()),
            generation_time: None,
        }
    }
}

/// 图片生成后端客户端
#[derive(Clone)]
pub struct ImageBackendClient {
    base_url: String,
    client: reqwest::Client,
    config: ImageConfig,
}

impl ImageBackendClient {
    /// 创建新的后端客户端
    ///
    /// 生成超时放到30分钟，慢模型在冷启动时可能需要很长时间。
    pub fn new(config: ImageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1800))
            .build()
            .context("Failed to build image backend HTTP client")?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
            config,
        })
    }

    /// 检查后端服务是否可用
    pub async fn check_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => health.status.as_deref() == Some("healthy"),
                    Err(_) => false,
                }
            }
            Ok(response) => {
                eprintln!(
                    "⚠️ 图片后端健康检查返回异常状态: {} ({})",
                    response.status(),
                    self.base_url
                );
                false
            }
            Err(e) => {
                eprintln!(
                    "⚠️ 图片后端健康检查失败: {} (服务地址: {})",
                    e, self.base_url
                );
                false
            }
        }
    }

    /// 生成一张图片
    ///
    /// 任何失败（HTTP错误、超时、响应缺少下载地址）都折叠为失败结果，不抛错。
    pub async fn generate_image(
        &self,
        prompt: &str,
        negative_prompt: Option<&str>,
        seed: Option<u64>,
    ) -> ImageGenerationOutcome {
        let request = GenerateRequest {
            model_id: &self.config.model,
            prompt,
            width: self.config.width,
            height: self.config.height,
            num_inference_steps: self.config.steps,
            guidance_scale: self.config.guidance_scale,
            model_type: "image",
            negative_prompt,
            seed,
        };

        let url = format!("{}/generate", self.base_url);
        let started = Instant::now();

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                eprintln!(
                    "❌ 图片后端连接失败: {}\n  请求地址: {}\n  请检查图片后端服务是否在运行",
                    e, url
                );
                return ImageGenerationOutcome::failure(format!(
                    "Connection failed: cannot reach image backend at {}",
                    self.base_url
                ));
            }
            Err(e) if e.is_timeout() => {
                eprintln!("❌ 图片后端请求超时: {}", e);
                return ImageGenerationOutcome::failure(
                    "Request timeout: image backend took too long to respond",
                );
            }
            Err(e) => {
                eprintln!("❌ 图片后端请求失败: {}", e);
                return ImageGenerationOutcome::failure(e.to_string());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eprintln!("❌ 图片后端HTTP错误: {} - {}", status, body);
            let brief: String = body.chars().take(200).collect();
            return ImageGenerationOutcome::failure(format!("HTTP {}: {}", status, brief));
        }

        let result: GenerateResponse = match response.json().await {
            Ok(result) => result,
            Err(e) => {
                eprintln!("❌ 图片后端响应解析失败: {}", e);
                return ImageGenerationOutcome::failure(format!("Invalid backend response: {}", e));
            }
        };

        let download_url = match self.resolve_download_url(&result) {
            Some(url) => url,
            None => {
                eprintln!("❌ 图片生成成功但后端未返回下载地址 (job: {:?})", result.job_id);
                return ImageGenerationOutcome::failure("Image generated but no URL returned");
            }
        };

        ImageGenerationOutcome {
            success: true,
            download_url: Some(download_url),
            error: None,
            generation_time: Some(started.elapsed()),
        }
    }

    /// 将后端返回的下载地址规整为绝对URL
    fn resolve_download_url(&self, result: &GenerateResponse) -> Option<String> {
        if let Some(url) = &result.download_url {
            if url.starts_with("http://") || url.starts_with("https://") {
                return Some(url.clone());
            }
            return Some(format!("{}/{}", self.base_url, url.trim_start_matches('/')));
        }

        // 某些版本的后端只返回服务器侧文件路径，从中取文件名拼下载地址
        let file = result.file.as_deref()?;
        let name = file.rsplit('/').next()?;
        if name.is_empty() {
            return None;
        }
        Some(format!("{}/download/{}", self.base_url, name))
    }

    /// 删除后端的临时文件（尽力而为）
    ///
    /// 图片转存到持久化存储后调用。删除失败只记录日志，绝不向上传播——
    /// 后端磁盘上多留一个文件比打断配图流程便宜得多。
    pub async fn delete_file(&self, download_url: &str) -> bool {
        let file_id = match Self::extract_file_id(download_url) {
            Some(id) => id,
            None => {
                eprintln!("⚠️ 无法从下载地址解析文件标识: {}", download_url);
                return false;
            }
        };

        // 优先尝试对下载端点发DELETE
        let delete_url = format!("{}/download/{}", self.base_url, file_id);
        if let Ok(response) = self.client.delete(&delete_url).send().await
            && (response.status().is_success() || response.status().as_u16() == 204)
        {
            println!("🧹 已清理后端临时文件: {}", file_id);
            return true;
        }

        // DELETE不可用时退回cleanup端点
        let cleanup_url = format!("{}/cleanup/{}", self.base_url, file_id);
        if let Ok(response) = self.client.post(&cleanup_url).send().await
            && (response.status().is_success() || response.status().as_u16() == 204)
        {
            println!("🧹 已清理后端临时文件: {}", file_id);
            return true;
        }

        eprintln!(
            "⚠️ 未能删除后端临时文件: {} (地址: {})，可能需要在服务器上手动清理",
            file_id, download_url
        );
        false
    }

    /// 从下载地址中提取文件标识
    ///
    /// 地址格式: http://server:port/download/{file_id}.png
    fn extract_file_id(download_url: &str) -> Option<&str> {
        let (_, path) = download_url.split_once("/download/")?;
        let file_id = path.split(['?', '#']).next().unwrap_or(path);
        if file_id.is_empty() {
            return None;
        }
        Some(file_id)
    }
}
