//! 配图提示词提取器
//!
//! 把文章交给LLM，让它产出若干条英文的图片生成提示词。模型输出的格式并不可靠，
//! 因此解析按严格度递减安排了三道关卡：行解析、段落解析、句子兜底。
//! 前一道关卡凑够数量后，后面的不再执行。

use regex::Regex;

use crate::config::ImageConfig;
use crate::llm::LLMClient;

/// 提示词提取的系统提示
const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are an expert at writing prompts for AI image generation models.

Given an article, produce image generation prompts that illustrate its key moments or concepts.

Requirements:
- Each prompt must be a single English sentence describing one concrete visual scene
- Prompts must be family-friendly and appropriate for a general audience
- No text, logos, watermarks or real person names in the described scene
- Output ONLY the prompts, one per line, numbered

Example output:
1. A wide view of a sunlit stadium filled with cheering spectators
2. A close-up of weathered hands holding a vintage leather ball"#;

/// 解析阈值
#[derive(Debug, Clone, Copy)]
pub struct ParseLimits {
    /// 行解析与段落解析接受的最小长度（字符）
    pub min_prompt_chars: usize,
    /// 句子兜底接受的最小长度（字符）
    pub min_sentence_chars: usize,
}

impl From<&ImageConfig> for ParseLimits {
    fn from(config: &ImageConfig) -> Self {
        Self {
            min_prompt_chars: config.min_prompt_chars,
            min_sentence_chars: config.min_sentence_chars,
        }
    }
}

/// 从文章中提取配图提示词
///
/// 提取失败（模型调用失败或响应中解析不出任何提示词）不是致命错误，
/// 返回空列表由上层折叠为"无图"结果。
pub async fn extract_image_prompts(
    llm: &LLMClient,
    article: &str,
    count: usize,
    config: &ImageConfig,
) -> Vec<String> {
    if count == 0 {
        return vec![];
    }

    // 只送文章前缀，足够让模型领会主题，又不浪费上下文
    let excerpt: String = article.chars().take(config.article_excerpt_chars).collect();
    let user_prompt = format!(
        "Generate exactly {} image prompts for the following article:\n\n{}",
        count, excerpt
    );

    println!("🤖 正在提取配图提示词 (期望 {} 条)...", count);

    // 提示词需要一定的发散性，温度固定取0.8而不是配置的默认温度
    let response = match llm.generate(EXTRACTION_SYSTEM_PROMPT, &user_prompt, 0.8).await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("❌ 配图提示词提取失败: {}", e);
            return vec![];
        }
    };

    let prompts = parse_prompt_response(&response, count, ParseLimits::from(config));
    if prompts.is_empty() {
        eprintln!("⚠️ 模型响应中未解析出任何可用的提示词");
    } else {
        println!("✓ 解析出 {} 条配图提示词", prompts.len());
    }
    prompts
}

/// 解析关卡的统一签名：输入原始响应、已接受的提示词与还差的数量，返回新接受的条目
type ParsePass = fn(&str, &[String], usize, ParseLimits) -> Vec<String>;

/// 按严格度递减排列的解析关卡
const PARSE_PASSES: [ParsePass; 3] = [pass_lines, pass_paragraphs, pass_sentences];

/// 从模型响应中解析提示词
///
/// 依次尝试各解析关卡，凑够 `count` 条即停，最终结果截断到 `count`。
pub fn parse_prompt_response(response: &str, count: usize, limits: ParseLimits) -> Vec<String> {
    let mut accepted: Vec<String> = Vec::new();

    for pass in PARSE_PASSES {
        if accepted.len() >= count {
            break;
        }
        let needed = count - accepted.len();
        accepted.extend(pass(response, &accepted, needed, limits));
    }

    accepted.truncate(count);
    accepted
}

/// 第一关：按行解析
///
/// 逐行剥掉编号、列表符与"Prompt N:"前缀，接受达到最小长度的行。
fn pass_lines(response: &str, accepted: &[String], needed: usize, limits: ParseLimits) -> Vec<String> {
    let mut found = Vec::new();

    for line in response.lines() {
        if found.len() >= needed {
            break;
        }

        let cleaned = strip_list_markers(line);
        if cleaned.chars().count() >= limits.min_prompt_chars
            && !accepted.contains(&cleaned)
            && !found.contains(&cleaned)
        {
            found.push(cleaned);
        }
    }

    found
}

/// 第二关：按段落解析
///
/// 去掉代码围栏后按空行切段，整段作为一条提示词。应对模型把提示词
/// 写成多行散文而不是列表的情况。
fn pass_paragraphs(
    response: &str,
    accepted: &[String],
    needed: usize,
    limits: ParseLimits,
) -> Vec<String> {
    let fence = Regex::new(r"(?s)```.*?```").unwrap();
    let without_fences = fence.replace_all(response, "");

    let mut found = Vec::new();
    for paragraph in without_fences.split("\n\n") {
        if found.len() >= needed {
            break;
        }

        let cleaned = strip_list_markers(&paragraph.replace('\n', " "));
        if cleaned.chars().count() >= limits.min_prompt_chars
            && !accepted.contains(&cleaned)
            && !found.contains(&cleaned)
        {
            found.push(cleaned);
        }
    }

    found
}

/// 第三关：按句子兜底
///
/// 整段响应按句末标点切开，接受足够长的句子。门槛更高，避免把
/// 模型的客套话当成提示词。
fn pass_sentences(
    response: &str,
    accepted: &[String],
    needed: usize,
    limits: ParseLimits,
) -> Vec<String> {
    let boundary = Regex::new(r"[.!?]\s+").unwrap();

    let mut found = Vec::new();
    for sentence in boundary.split(response) {
        if found.len() >= needed {
            break;
        }

        let cleaned = strip_list_markers(sentence);
        if cleaned.chars().count() >= limits.min_sentence_chars
            && !accepted.contains(&cleaned)
            && !found.contains(&cleaned)
        {
            found.push(cleaned);
        }
    }

    found
}

/// 剥掉行首的编号、列表符与"Prompt N:"前缀，以及包裹的引号与反引号
fn strip_list_markers(line: &str) -> String {
    let numbered = Regex::new(r"^\d+[.)]\s*").unwrap();
    let bullet = Regex::new(r"^[-*•]\s+").unwrap();
    let labeled = Regex::new(r"(?i)^prompt\s*\d*\s*[:\-]\s*").unwrap();

    let mut cleaned = line.trim().to_string();
    cleaned = numbered.replace(&cleaned, "").to_string();
    cleaned = bullet.replace(&cleaned, "").to_string();
    cleaned = labeled.replace(&cleaned, "").to_string();

    cleaned
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}

// Include tests
#[cfg(test)]
mod tests;
