use crate::config::{Config, ImageStyle, LLMProvider};
use clap::Parser;
use std::path::PathBuf;

/// Inkpress - AI驱动的文章与配图生成引擎
#[derive(Parser, Debug)]
#[command(name = "inkpress-rs")]
#[command(
    about = "AI-based content generation engine. It writes an article on a given topic, then illustrates it with AI-generated images embedded at sensible positions."
)]
#[command(version)]
pub struct Args {
    /// 文章主题
    #[arg(short, long)]
    pub topic: Option<String>,

    /// 文章关键词（逗号分隔）
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// 输出路径
    #[arg(short, long, default_value = "./inkpress.out")]
    pub output_path: PathBuf,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 跳过文章生成，对输出目录中已有的文章配图
    #[arg(long)]
    pub skip_article: bool,

    /// 跳过配图生成
    #[arg(long)]
    pub skip_images: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM Provider (openai, deepseek, moonshot, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// 推理模型
    #[arg(long)]
    pub model: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 允许同时进行的文章生成数量
    #[arg(long)]
    pub max_concurrent_articles: Option<usize>,

    /// 单次请求最多生成的图片数量
    #[arg(long)]
    pub image_count: Option<usize>,

    /// 配图风格 (auto, photo, illustration, infographic, cartoon, realistic)
    #[arg(long)]
    pub image_style: Option<String>,

    /// 图片后端API基地址
    #[arg(long)]
    pub image_api_base_url: Option<String>,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Config {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定了配置文件路径，从该路径加载
            Config::from_file(config_path).unwrap_or_else(|e| {
                eprintln!(
                    "⚠️ 警告: 无法读取配置文件 {:?} ({})，使用默认配置",
                    config_path, e
                );
                Config::default()
            })
        } else {
            // 没有显式指定配置文件，尝试从默认位置加载
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("inkpress.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).unwrap_or_else(|e| {
                    eprintln!(
                        "⚠️ 警告: 无法读取默认配置文件 {:?} ({})，使用默认配置",
                        default_config_path, e
                    );
                    Config::default()
                })
            } else {
                Config::default()
            }
        };

        // 覆盖配置文件中的设置
        config.output_path = self.output_path;

        if let Some(topic) = self.topic {
            config.topic = Some(topic);
        }
        if let Some(keywords) = self.keywords {
            config.keywords = keywords
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        // 覆盖准入与配图配置
        if let Some(max_concurrent_articles) = self.max_concurrent_articles {
            config.gate.max_concurrent_articles = max_concurrent_articles;
        }
        if let Some(image_count) = self.image_count {
            config.image.max_images = image_count;
        }
        if let Some(style_str) = self.image_style {
            if let Ok(style) = style_str.parse::<ImageStyle>() {
                config.image.style = style;
            } else {
                eprintln!("⚠️ 警告: 未知的配图风格: {}，使用默认风格", style_str);
            }
        }
        if let Some(image_api_base_url) = self.image_api_base_url {
            config.image.api_base_url = image_api_base_url;
        }

        config.skip_article = self.skip_article;
        config.skip_images = self.skip_images;
        config.verbose = self.verbose;

        config
    }
}
