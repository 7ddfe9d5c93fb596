//! 持久化存储上传器
//!
//! 图片后端的临时存储会被清理，下游只允许引用持久化存储的公开URL。
//! 本模块从后端的临时地址下载字节，再PUT到S3兼容网关（MinIO等部署形态），
//! 对象键按 `{prefix}/images/ai-{日期}-{短uuid}.png` 编排。

use chrono::Utc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::config::StorageConfig;

/// 存储操作错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to build storage HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("failed to download source image: {0}")]
    Download(reqwest::Error),
    #[error("source image download returned HTTP {0}")]
    DownloadStatus(reqwest::StatusCode),
    #[error("source image body was empty")]
    EmptyBody,
    #[error("upload request failed: {0}")]
    Upload(reqwest::Error),
    #[error("storage gateway returned HTTP {0}")]
    UploadStatus(reqwest::StatusCode),
}

/// 上传结果
///
/// 调用方拿到的永远是结果记录；内部错误折叠进 `error` 字段，不向上传播。
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub success: bool,
    /// 持久化存储中的公开访问URL
    pub public_url: Option<String>,
    /// 对象键
    pub key: Option<String>,
    /// 上传的字节数
    pub size: Option<usize>,
    pub error: Option<String>,
}

/// 持久化存储客户端
#[derive(Clone)]
pub struct StorageClient {
    config: StorageConfig,
    client: reqwest::Client,
}

impl StorageClient {
    /// 创建新的存储客户端
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(StorageError::Client)?;

        println!(
            "💾 存储客户端已初始化 (bucket: {}, prefix: {})",
            config.bucket, config.key_prefix
        );

        Ok(Self { config, client })
    }

    /// 生成对象键
    ///
    /// 未指定文件名时按 `ai-{YYYYMMDD}-{uuid前8位}.png` 自动生成。
    pub fn generate_key(&self, filename: Option<&str>) -> String {
        let name = match filename {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                let date = Utc::now().format("%Y%m%d");
                let unique: String = Uuid::new_v4().to_string().chars().take(8).collect();
                format!("ai-{}-{}.png", date, unique)
            }
        };

        format!(
            "{}/images/{}",
            self.config.key_prefix.trim_matches('/'),
            name
        )
    }

    /// 对象的公开访问URL
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.public_base(), key)
    }

    /// 从临时URL下载图片并上传到持久化存储
    pub async fn upload_from_url(&self, source_url: &str, content_type: &str) -> UploadOutcome {
        match self.try_upload(source_url, content_type).await {
            Ok((key, size)) => {
                let public_url = self.public_url(&key);
                println!("✓ 图片已保存到持久化存储: {} ({} bytes)", key, size);
                UploadOutcome {
                    success: true,
                    public_url: Some(public_url),
                    key: Some(key),
                    size: Some(size),
                    error: None,
                }
            }
            Err(e) => {
                eprintln!("❌ 图片转存失败: {}", e);
                UploadOutcome {
                    success: false,
                    public_url: None,
                    key: None,
                    size: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    async fn try_upload(
        &self,
        source_url: &str,
        content_type: &str,
    ) -> Result<(String, usize), StorageError> {
        // 第一步：从后端临时地址下载字节
        let response = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(StorageError::Download)?;

        if !response.status().is_success() {
            return Err(StorageError::DownloadStatus(response.status()));
        }

        let bytes = response.bytes().await.map_err(StorageError::Download)?;
        if bytes.is_empty() {
            return Err(StorageError::EmptyBody);
        }
        let size = bytes.len();

        // 第二步：PUT到S3兼容网关
        let key = self.generate_key(None);
        let upload_url = format!(
            "{}/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.bucket.trim_matches('/'),
            key
        );

        println!("⬆️ 上传图片到持久化存储: {} ({} bytes)", key, size);

        let response = self
            .client
            .put(&upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(StorageError::Upload)?;

        if !response.status().is_success() {
            return Err(StorageError::UploadStatus(response.status()));
        }

        Ok((key, size))
    }
}

// Include tests
#[cfg(test)]
mod tests;
