use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 单个提示词的配图结果
///
/// 与输入提示词按位置一一对应；生成、安全检查或转存任一环节失败都折叠为
/// `success=false` 的记录，不影响兄弟提示词。
#[derive(Debug, Clone)]
pub struct ImageOutcome {
    pub success: bool,
    /// 持久化存储中的公开URL（绝不是后端的临时地址）
    pub url: Option<String>,
    pub error: Option<String>,
    /// 后端生成耗时
    pub generation_time: Option<Duration>,
}

impl ImageOutcome {
    pub fn success(url: impl Into<String>, generation_time: Option<Duration>) -> Self {
        Self {
            success: true,
            url: Some(url.into()),
            error: None,
            generation_time,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(error.into()),
            generation_time: None,
        }
    }
}

/// 已嵌入文章的图片元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// 对应提示词的序号（1起）
    pub index: usize,
    /// 原始提示词（不含风格修饰）
    pub prompt: String,
    /// 持久化存储中的公开URL
    pub url: String,
    /// 由提示词推导的替代文本
    pub alt_text: String,
    /// 生成耗时（秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_time_secs: Option<f64>,
}

/// 配图流程的整体结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IllustrationResult {
    pub success: bool,
    /// 嵌入图片后的文章内容；流程失败时为原始内容
    pub content: String,
    /// 实际嵌入的图片元数据，顺序与提示词顺序一致
    pub images: Vec<EmbeddedImage>,
    /// 人类可读的状态信息
    pub message: String,
}

impl IllustrationResult {
    pub fn no_images(content: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: content.into(),
            images: vec![],
            message: message.into(),
        }
    }

    pub fn skipped(content: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            images: vec![],
            message: message.into(),
        }
    }
}
