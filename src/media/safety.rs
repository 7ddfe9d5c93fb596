//! 内容安全服务
//!
//! 两道防线：
//! 1. 提示词过滤 - 在调用图片后端之前拦截不当的生成请求（本地正则，无网络开销）
//! 2. 图片安全分类 - 将生成后的图片交给外部NSFW分类服务打分判定
//!
//! 分类服务被当作二值/打分神谕消费，本模块不关心其模型细节。

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::SafetyConfig;

/// 提示词中禁止出现的关键词（按整词匹配，避免误伤如football中的ball）
const NSFW_KEYWORDS: &[&str] = &[
    "nude",
    "naked",
    "nudity",
    "sex",
    "sexual",
    "porn",
    "pornographic",
    "explicit",
    "erotic",
    "nsfw",
    "violence",
    "violent",
    "gore",
    "weapon",
    "murder",
    "kill",
    "suicide",
    "torture",
    "hate",
    "racist",
];

/// 禁止的词组组合
const BLOCKED_PATTERNS: &[&str] = &[
    r"sexy\s+girl",
    r"hot\s+girl",
    r"naked\s+woman",
    r"nude\s+woman",
    r"sexy\s+woman",
    r"bikini\s+girl",
    r"lingerie\s+model",
];

/// 被视为NSFW的分类标签片段
const NSFW_LABEL_TERMS: &[&str] = &["nsfw", "porn", "sexy", "hentai", "pornographic"];

/// 分类服务返回的单条打分
#[derive(Debug, Deserialize, Serialize)]
struct ClassificationScore {
    #[serde(default)]
    label: String,
    #[serde(default)]
    score: f64,
}

/// 图片安全判定结果
#[derive(Debug, Clone)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    /// 不安全时给出的解释
    pub explanation: Option<String>,
    /// 分类服务返回的原始打分（按标签）
    pub scores: Option<HashMap<String, f64>>,
}

impl SafetyVerdict {
    fn safe(scores: Option<HashMap<String, f64>>) -> Self {
        Self {
            is_safe: true,
            explanation: None,
            scores,
        }
    }

    fn unsafe_with(explanation: impl Into<String>, scores: Option<HashMap<String, f64>>) -> Self {
        Self {
            is_safe: false,
            explanation: Some(explanation.into()),
            scores,
        }
    }
}

/// 内容安全客户端
#[derive(Clone)]
pub struct SafetyClient {
    base_url: String,
    threshold: f64,
    client: reqwest::Client,
    keyword_patterns: Vec<Regex>,
    blocked_patterns: Vec<Regex>,
}

impl SafetyClient {
    /// 创建新的安全客户端
    ///
    /// `api_base_url` 留空表示图片分类检查被禁用，此时只保留提示词过滤。
    pub fn new(config: &SafetyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build safety HTTP client")?;

        let keyword_patterns = NSFW_KEYWORDS
            .iter()
            .map(|keyword| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))
                    .context("invalid keyword pattern")
            })
            .collect::<Result<Vec<_>>>()?;

        let blocked_patterns = BLOCKED_PATTERNS
            .iter()
            .map(|pattern| {
                Regex::new(&format!("(?i){}", pattern)).context("invalid blocked pattern")
            })
            .collect::<Result<Vec<_>>>()?;

        if config.api_base_url.trim().is_empty() {
            eprintln!("⚠️ 未配置安全分类服务地址，图片安全检查被禁用，仅保留提示词过滤");
        }

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            threshold: config.threshold,
            client,
            keyword_patterns,
            blocked_patterns,
        })
    }

    /// 图片安全检查是否启用
    pub fn image_check_enabled(&self) -> bool {
        !self.base_url.is_empty()
    }

    /// 提示词预过滤
    ///
    /// 返回 `Some(原因)` 表示提示词不可用；`None` 表示通过。
    pub fn screen_prompt(&self, prompt: &str) -> Option<String> {
        if prompt.trim().is_empty() {
            return Some(String::from("Prompt cannot be empty"));
        }

        for pattern in &self.blocked_patterns {
            if pattern.is_match(prompt) {
                eprintln!("⚠️ 提示词命中禁用词组: {}", pattern.as_str());
                return Some(String::from(
                    "Prompt contains inappropriate content pattern and cannot be processed",
                ));
            }
        }

        for (pattern, keyword) in self.keyword_patterns.iter().zip(NSFW_KEYWORDS) {
            if pattern.is_match(prompt) {
                eprintln!("⚠️ 提示词命中禁用关键词: {}", keyword);
                return Some(format!(
                    "Prompt contains inappropriate content ('{}') and cannot be processed",
                    keyword
                ));
            }
        }

        None
    }

    /// 对生成的图片执行NSFW判定
    ///
    /// 分类调用自身失败时采取保守策略：判定为不安全，由上层折叠为失败记录。
    pub async fn check_image(&self, image_url: &str) -> SafetyVerdict {
        if !self.image_check_enabled() {
            return SafetyVerdict::safe(None);
        }

        let url = format!("{}/classify", self.base_url);
        let response = match self
            .client
            .post(&url)
            .json(&serde_json::json!({ "image_url": image_url }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                eprintln!("❌ 图片安全检查请求失败: {}", e);
                return SafetyVerdict::unsafe_with(
                    format!("Unable to verify image safety: {}", e),
                    None,
                );
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            eprintln!("❌ 图片安全检查HTTP错误: {}", status);
            return SafetyVerdict::unsafe_with(
                format!("Unable to verify image safety: HTTP {}", status),
                None,
            );
        }

        let results: Vec<ClassificationScore> = match response.json().await {
            Ok(results) => results,
            Err(e) => {
                eprintln!("❌ 图片安全检查响应解析失败: {}", e);
                return SafetyVerdict::unsafe_with(
                    format!("Unable to verify image safety: {}", e),
                    None,
                );
            }
        };

        self.judge(&results)
    }

    /// 根据分类打分作出判定
    fn judge(&self, results: &[ClassificationScore]) -> SafetyVerdict {
        let mut scores = HashMap::new();
        let mut is_safe = true;

        for result in results {
            let label = result.label.to_lowercase();
            scores.insert(label.clone(), result.score);

            if NSFW_LABEL_TERMS.iter().any(|term| label.contains(term))
                && result.score > self.threshold
            {
                is_safe = false;
                eprintln!(
                    "⚠️ 检测到NSFW内容: {} (score: {:.2})",
                    label, result.score
                );
            }
        }

        if is_safe {
            SafetyVerdict::safe(Some(scores))
        } else {
            SafetyVerdict::unsafe_with(
                "Generated image contains inappropriate content and cannot be displayed",
                Some(scores),
            )
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
