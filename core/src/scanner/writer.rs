// 标注写入
// begin/end 块标注与 &line 行内标注的格式化

use crate::source::{leading_whitespace, line_ending};

pub const KEYWORD_TAG_PREFIX: &str = "KeywordMatch";
pub const API_TAG_PREFIX: &str = "API";

/// 标签只允许字母、数字和下划线
pub fn sanitize_tag_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// `KeywordMatch_<sequence>_<subcategory>`
pub fn keyword_tag(sequence: u64, subcategory: &str) -> String {
    format!(
        "{}_{}_{}",
        KEYWORD_TAG_PREFIX,
        sequence,
        sanitize_tag_component(subcategory)
    )
}

/// `API_<feature>_<method>`，method 取限定名最后一段
pub fn api_tag(feature: &str, qualified_api: &str) -> String {
    let method = qualified_api.rsplit('.').next().unwrap_or(qualified_api);
    format!(
        "{}_{}_{}",
        API_TAG_PREFIX,
        sanitize_tag_component(feature),
        sanitize_tag_component(method)
    )
}

pub fn begin_marker(tags: &[String]) -> String {
    format!("// &begin[{}]", tags.join(", "))
}

pub fn end_marker(tags: &[String]) -> String {
    format!("// &end[{}]", tags.join(", "))
}

pub fn line_marker(tags: &[String]) -> String {
    format!("// &line[{}]", tags.join(", "))
}

/// 用一对 begin/end 标注包裹原始行，原始行本身不做任何修改
///
/// 标注行沿用原始行的缩进与行尾；原始行没有行尾（文件末行）时，
/// end 标注也不带行尾。
pub fn wrap_line(out: &mut String, line: &str, tags: &[String]) {
    let indent = leading_whitespace(line);
    let ending = line_ending(line);

    out.push_str(indent);
    out.push_str(&begin_marker(tags));
    out.push_str(if ending.is_empty() { "\n" } else { ending });

    out.push_str(line);

    if ending.is_empty() {
        out.push('\n');
    }
    out.push_str(indent);
    out.push_str(&end_marker(tags));
    out.push_str(ending);
}

/// 在行尾追加行内标注；已包含相同标注时返回 None
pub fn append_line_marker(line: &str, tags: &[String]) -> Option<String> {
    let marker = line_marker(tags);
    if line.contains(&marker) {
        return None;
    }
    let ending = line_ending(line);
    let body = line[..line.len() - ending.len()].trim_end();
    Some(format!("{} {}{}", body, marker, ending))
}
