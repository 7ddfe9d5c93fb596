//! 配图嵌入器
//!
//! 把生成好的图片以Markdown引用的形式织入文章。插入位置按三个策略依次补齐：
//! 标题锚定、段落间隙、均匀分布。策略只产出候选位置，真正的插入统一
//! 从后往前执行，保证前面的位置不被后面的插入挤歪。
//!
//! 这里的函数全部是纯文本变换，同样的输入永远产出同样的文章。

use regex::Regex;

use super::types::{EmbeddedImage, ImageOutcome};

/// 提示词转替代文本时剔除的修饰词
const ALT_FILLER_WORDS: &[&str] = &["professional", "high", "quality", "detailed"];

/// 标题锚定时向下寻找段落末尾的最大行数
const HEADING_SCAN_WINDOW: usize = 10;

/// 把成功生成的图片嵌入文章
///
/// 返回嵌入后的内容与图片元数据。元数据与提示词按位置对应（序号1起），
/// 失败的提示词被跳过。没有任何成功图片时原样返回（仅清理占位标签）。
pub fn embed_images(
    content: &str,
    prompts: &[String],
    outcomes: &[ImageOutcome],
    min_line_spacing: usize,
) -> (String, Vec<EmbeddedImage>) {
    let cleaned = strip_placeholder_tags(content);

    let mut images: Vec<EmbeddedImage> = Vec::new();
    for (i, (prompt, outcome)) in prompts.iter().zip(outcomes).enumerate() {
        if !outcome.success {
            continue;
        }
        let Some(url) = &outcome.url else {
            eprintln!("⚠️ 第 {} 条结果标记成功但缺少URL，跳过", i + 1);
            continue;
        };
        images.push(EmbeddedImage {
            index: i + 1,
            prompt: prompt.clone(),
            url: url.clone(),
            alt_text: alt_text_for(prompt),
            generation_time_secs: outcome.generation_time.map(|d| d.as_secs_f64()),
        });
    }

    if images.is_empty() {
        return (cleaned, images);
    }

    let markdowns: Vec<String> = images
        .iter()
        .map(|img| format!("![{}]({})", img.alt_text, img.url))
        .collect();

    let result = match splice_images(&cleaned, &markdowns, min_line_spacing) {
        Some(text) if count_image_markers(&text) > 0 => text,
        _ => {
            eprintln!("⚠️ 常规插入未放置任何图片，改为追加到文末");
            append_at_end(&cleaned, &markdowns)
        }
    };

    // 校验而不是假定：最终文本中的图片引用数必须与元数据一致
    let markers = count_image_markers(&result);
    if markers != images.len() {
        eprintln!(
            "⚠️ 嵌入校验不一致: 元数据 {} 条，文中图片引用 {} 个",
            images.len(),
            markers
        );
    }

    (result, images)
}

/// 清理文章中残留的图片占位标签
///
/// 模型偶尔会把 `[IMAGE_PROMPT: ...]` 这类标记原样写进正文。
pub fn strip_placeholder_tags(content: &str) -> String {
    let tag = Regex::new(r"(?i)\[image[_\s]?prompt:[^\]]*\]").unwrap();
    tag.replace_all(content, "").to_string()
}

/// 按候选位置把图片插入正文
///
/// 找不到任何候选位置时返回 `None`，由调用方退回文末追加。
fn splice_images(content: &str, markdowns: &[String], min_line_spacing: usize) -> Option<String> {
    let mut lines: Vec<String> = content.lines().map(String::from).collect();
    if lines.is_empty() {
        lines.push(String::new());
    }

    let mut points = find_insertion_points(&lines, markdowns.len(), min_line_spacing);
    points.sort_unstable();
    points.dedup();
    points.truncate(markdowns.len());
    if points.is_empty() {
        return None;
    }

    // 候选位置不够时，多出来的图片排到文末
    let placed = &markdowns[..points.len()];
    for markdown in &markdowns[points.len()..] {
        lines.push(String::new());
        lines.push(markdown.clone());
    }

    // 从后往前插，前面的候选位置不受影响
    for (point, markdown) in points.iter().rev().zip(placed.iter().rev()) {
        let at = (*point).min(lines.len());
        lines.insert(at, String::new());
        lines.insert(at, markdown.clone());
        lines.insert(at, String::new());
    }

    Some(lines.join("\n"))
}

/// 计算候选插入位置（行号，图片插在该行之前）
///
/// 三个策略按优先级依次补齐到 `needed` 个：
/// 1. H2标题锚定：插在标题后第一个段落的末尾
/// 2. 段落间隙：从文末向前找正文行后的空行
/// 3. 均匀分布：按行距铺开，行距不小于 `min_spacing`
fn find_insertion_points(lines: &[String], needed: usize, min_spacing: usize) -> Vec<usize> {
    let mut points: Vec<usize> = Vec::new();
    if needed == 0 {
        return points;
    }

    // 策略一：标题锚定
    for (i, line) in lines.iter().enumerate() {
        if points.len() >= needed {
            break;
        }
        if !line.trim_start().starts_with("## ") {
            continue;
        }

        // 标题后紧跟的位置做保底，找得到段落末尾再替换
        let mut insert_at = i + 1;
        let scan_end = (i + 1 + HEADING_SCAN_WINDOW).min(lines.len());
        for j in (i + 1)..scan_end {
            let candidate = lines[j].trim();
            if candidate.is_empty() || candidate.starts_with('#') {
                continue;
            }
            if j + 1 >= lines.len() || lines[j + 1].trim().is_empty() {
                insert_at = j + 1;
                break;
            }
        }

        if !points.contains(&insert_at) {
            points.push(insert_at);
        }
    }

    // 策略二：段落间隙，从文末向前扫
    if points.len() < needed {
        for i in (0..lines.len()).rev() {
            if points.len() >= needed {
                break;
            }
            let trimmed = lines[i].trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if i + 1 < lines.len() && lines[i + 1].trim().is_empty() {
                let insert_at = i + 1;
                if !points.contains(&insert_at) {
                    points.push(insert_at);
                }
            }
        }
    }

    // 策略三：均匀分布
    if points.len() < needed {
        let total = lines.len();
        let spacing = (total / (needed + 1)).max(min_spacing);
        for k in 1..=needed {
            if points.len() >= needed {
                break;
            }
            let pos = (k * spacing).min(total);
            if !points.contains(&pos) {
                points.push(pos);
            }
        }
    }

    points
}

/// 统计文本中的Markdown图片引用数量
pub fn count_image_markers(content: &str) -> usize {
    let marker = Regex::new(r"!\[.*?\]\(.*?\)").unwrap();
    marker.find_iter(content).count()
}

/// 兜底：全部图片追加到文末
fn append_at_end(content: &str, markdowns: &[String]) -> String {
    format!(
        "{}\n\n---\n\n{}\n",
        content.trim_end(),
        markdowns.join("\n\n")
    )
}

/// 从提示词推导替代文本
///
/// 取前8个词并剔除修饰词；全剔光时退回固定文案。
fn alt_text_for(prompt: &str) -> String {
    let words: Vec<&str> = prompt
        .split_whitespace()
        .take(8)
        .filter(|word| {
            let bare = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            !ALT_FILLER_WORDS.contains(&bare.as_str())
        })
        .collect();

    if words.is_empty() {
        String::from("Article image")
    } else {
        words.join(" ")
    }
}
