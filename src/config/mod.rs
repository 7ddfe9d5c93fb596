use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "ollama")]
    #[default]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 配图风格预设
///
/// 每个风格对应一组固定的提示词修饰与反向提示词，拼接规则是确定性的，
/// 同样的风格与提示词组合永远产出同样的最终提示词。
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
pub enum ImageStyle {
    #[serde(rename = "auto")]
    #[default]
    Auto,
    #[serde(rename = "photo")]
    Photo,
    #[serde(rename = "illustration")]
    Illustration,
    #[serde(rename = "infographic")]
    Infographic,
    #[serde(rename = "cartoon")]
    Cartoon,
    #[serde(rename = "realistic")]
    Realistic,
}

impl ImageStyle {
    /// 附加到提示词末尾的风格修饰
    pub fn prompt_modifier(&self) -> &'static str {
        match self {
            ImageStyle::Photo => ", professional photography, high quality, realistic",
            ImageStyle::Illustration => ", digital illustration, vibrant colors, modern style",
            ImageStyle::Infographic => ", infographic design, clean layout, professional",
            ImageStyle::Cartoon => ", cartoon style, animated, colorful, playful",
            ImageStyle::Realistic => {
                ", photorealistic, highly detailed, realistic, professional photography"
            }
            ImageStyle::Auto => ", high quality, professional, detailed",
        }
    }

    /// 提交给图片后端的反向提示词
    pub fn negative_prompt(&self) -> &'static str {
        match self {
            ImageStyle::Photo | ImageStyle::Realistic => {
                "blurry, low quality, deformed, watermark, text"
            }
            ImageStyle::Infographic => "blurry, cluttered, illegible, watermark",
            _ => "blurry, low quality, watermark",
        }
    }
}

impl std::fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImageStyle::Auto => "auto",
            ImageStyle::Photo => "photo",
            ImageStyle::Illustration => "illustration",
            ImageStyle::Infographic => "infographic",
            ImageStyle::Cartoon => "cartoon",
            ImageStyle::Realistic => "realistic",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ImageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ImageStyle::Auto),
            "photo" => Ok(ImageStyle::Photo),
            "illustration" => Ok(ImageStyle::Illustration),
            "infographic" => Ok(ImageStyle::Infographic),
            "cartoon" => Ok(ImageStyle::Cartoon),
            "realistic" => Ok(ImageStyle::Realistic),
            _ => Err(format!("Unknown image style: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// 文章主题
    pub topic: Option<String>,

    /// 文章关键词
    pub keywords: Vec<String>,

    /// 输出路径
    pub output_path: PathBuf,

    /// 跳过文章生成（对已有文章配图时使用）
    pub skip_article: bool,

    /// 跳过配图生成
    pub skip_images: bool,

    /// 是否启用详细日志
    pub verbose: bool,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 资源准入配置
    pub gate: GateConfig,

    /// 配图生成配置
    pub image: ImageConfig,

    /// 内容安全配置
    pub safety: SafetyConfig,

    /// 持久化存储配置
    pub storage: StorageConfig,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 推理模型
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 资源准入配置
///
/// 文章生成与配图生成共用同一台推理服务器，两类任务的并发度都由这里约束。
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GateConfig {
    /// 允许同时进行的文章生成数量（≥1）
    pub max_concurrent_articles: usize,
}

/// 配图生成配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageConfig {
    /// 图片后端API基地址
    pub api_base_url: String,

    /// 图片生成模型
    pub model: String,

    /// 图片宽度（像素）
    pub width: u32,

    /// 图片高度（像素）
    pub height: u32,

    /// 推理步数
    pub steps: u32,

    /// CFG引导系数（Turbo类模型要求0.0）
    pub guidance_scale: f64,

    /// 单次请求最多生成的图片数量
    pub max_images: usize,

    /// 配图风格
    pub style: ImageStyle,

    /// 提取提示词时送入LLM的文章前缀长度（字符）
    pub article_excerpt_chars: usize,

    /// 行解析与段落解析接受的最小提示词长度（字符）
    pub min_prompt_chars: usize,

    /// 句子兜底解析接受的最小长度（字符）
    pub min_sentence_chars: usize,

    /// 均匀分布兜底插图时的最小行距
    pub min_line_spacing: usize,
}

/// 内容安全配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SafetyConfig {
    /// 安全分类服务基地址（留空表示禁用图片安全检查，仅保留提示词过滤）
    pub api_base_url: String,

    /// NSFW判定阈值
    pub threshold: f64,
}

/// 持久化存储配置
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// S3兼容网关地址
    pub endpoint: String,

    /// 存储桶名称
    pub bucket: String,

    /// 对象键前缀（通常按环境区分，如dev/prod）
    pub key_prefix: String,

    /// 公开访问的基地址；留空时由endpoint与bucket拼出
    pub public_base_url: Option<String>,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: None,
            keywords: vec![],
            output_path: PathBuf::from("./inkpress.out"),
            skip_article: false,
            skip_images: false,
            verbose: false,
            llm: LLMConfig::default(),
            gate: GateConfig::default(),
            image: ImageConfig::default(),
            safety: SafetyConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("INKPRESS_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("http://localhost:11434"),
            model: String::from("qwen2.5:3b"),
            max_tokens: 4096,
            temperature: 0.7,
            retry_attempts: 3,
            retry_delay_ms: 5000,
            timeout_seconds: 300,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_concurrent_articles: 2,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::from("http://localhost:7860"),
            model: String::from("Tongyi-MAI/Z-Image-Turbo"),
            width: 1024,
            height: 1024,
            steps: 9,
            guidance_scale: 0.0,
            max_images: 2,
            style: ImageStyle::default(),
            article_excerpt_chars: 2000,
            min_prompt_chars: 15,
            min_sentence_chars: 30,
            min_line_spacing: 10,
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            threshold: 0.3,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://localhost:9000"),
            bucket: String::from("inkpress-content-storage"),
            key_prefix: String::from("dev"),
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// 对象的公开访问基地址
    pub fn public_base(&self) -> String {
        match &self.public_base_url {
            Some(base) if !base.trim().is_empty() => base.trim_end_matches('/').to_string(),
            _ => format!(
                "{}/{}",
                self.endpoint.trim_end_matches('/'),
                self.bucket.trim_matches('/')
            ),
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
