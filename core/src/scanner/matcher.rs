use crate::error::{CoreError, Result};
use crate::taxonomy::{Taxonomy, TaxonomyEntry};
use regex::{Regex, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"".*?""#).expect("string literal pattern"));

const LINE_COMMENT: &str = "//";

/// 同一行中属于同一 分类:子分类 的命中关键词
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub category: String,
    pub subcategory: String,
    pub keywords: Vec<String>,
}

impl MatchGroup {
    /// "category : subcategory"
    pub fn key(&self) -> String {
        format!("{} : {}", self.category, self.subcategory)
    }
}

/// Whole-word, case-sensitive keyword matcher over a flattened taxonomy.
pub struct KeywordMatcher {
    set: RegexSet,
    entries: Vec<TaxonomyEntry>,
}

impl KeywordMatcher {
    pub fn new(taxonomy: &Taxonomy) -> Result<Self> {
        let patterns = taxonomy
            .entries()
            .iter()
            .map(|entry| format!(r"\b{}\b", regex::escape(&entry.keyword)));
        let set = RegexSetBuilder::new(patterns)
            .size_limit(64 * (1 << 20))
            .build()
            .map_err(|e| CoreError::Taxonomy(format!("failed to compile keywords: {}", e)))?;
        Ok(Self {
            set,
            entries: taxonomy.entries().to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 返回命中的分组，分组与关键词都按分类配置中的顺序排列
    pub fn match_line(&self, line: &str) -> Vec<MatchGroup> {
        let code = code_portion(line);
        let mut groups: Vec<MatchGroup> = Vec::new();

        for index in self.set.matches(&code).iter() {
            let entry = &self.entries[index];
            match groups
                .iter_mut()
                .find(|g| g.category == entry.category && g.subcategory == entry.subcategory)
            {
                Some(group) => group.keywords.push(entry.keyword.clone()),
                None => groups.push(MatchGroup {
                    category: entry.category.clone(),
                    subcategory: entry.subcategory.clone(),
                    keywords: vec![entry.keyword.clone()],
                }),
            }
        }
        groups
    }
}

/// 去掉双引号字符串后再截掉行尾 `//` 注释
pub fn code_portion(line: &str) -> String {
    let without_strings = STRING_LITERAL.replace_all(line.trim(), "");
    match without_strings.find(LINE_COMMENT) {
        Some(pos) => without_strings[..pos].to_string(),
        None => without_strings.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{parse_keywords, KeywordFormat};

    fn matcher(json: &str) -> KeywordMatcher {
        KeywordMatcher::new(&parse_keywords(json, KeywordFormat::Json).unwrap()).unwrap()
    }

    #[test]
    fn matches_keyword_before_trailing_comment() {
        let m = matcher(r#"{"Crypto": {"Hashing": ["MD5", "SHA1"]}}"#);
        let groups = m.match_line("byte[] h = MD5.digest(x); // comment");
        assert_eq!(
            groups,
            vec![MatchGroup {
                category: "Crypto".into(),
                subcategory: "Hashing".into(),
                keywords: vec!["MD5".into()],
            }]
        );
    }

    #[test]
    fn keyword_inside_string_literal_is_ignored() {
        let m = matcher(r#"{"Authentication": {"Password": ["password"]}}"#);
        assert!(m.match_line(r#"x = "password";"#).is_empty());
        assert!(m.match_line(r#"log("a", "password", "b");"#).is_empty());
        assert_eq!(m.match_line(r#"check("user", password);"#).len(), 1);
    }

    #[test]
    fn keyword_inside_trailing_comment_is_ignored() {
        let m = matcher(r#"{"Crypto": {"Hashing": ["MD5"]}}"#);
        assert!(m.match_line("int x = 1; // MD5").is_empty());
    }

    #[test]
    fn comment_marker_inside_string_does_not_truncate() {
        let m = matcher(r#"{"Network": {"Transport": ["URL"]}}"#);
        assert_eq!(m.match_line(r#"URL u = new URL("https://example.org");"#).len(), 1);
    }

    #[test]
    fn whole_word_and_case_sensitive() {
        let m = matcher(r#"{"Crypto": {"Encryption": ["Cipher"]}}"#);
        assert!(m.match_line("CipherSuite s = pick();").is_empty());
        assert!(m.match_line("cipher c = get();").is_empty());
        assert_eq!(m.match_line("Cipher c = Cipher.getInstance(alg);").len(), 1);
    }

    #[test]
    fn groups_across_subcategories() {
        let m = matcher(
            r#"{"Crypto": {"Hashing": ["MD5"], "Encryption": ["Cipher", "AES"]}, "Logging": ["Logger"]}"#,
        );
        let groups = m.match_line("Cipher c = AES.with(MD5.of(k));");
        let keys: Vec<String> = groups.iter().map(|g| g.key()).collect();
        assert_eq!(keys, vec!["Crypto : Hashing", "Crypto : Encryption"]);
        assert_eq!(groups[1].keywords, vec!["Cipher", "AES"]);
    }

    #[test]
    fn keywords_with_regex_metacharacters() {
        let m = matcher(r#"{"Access": {"Annotations": ["Secured.value"]}}"#);
        assert!(m.match_line("SecuredXvalue x;").is_empty());
        assert_eq!(m.match_line("a = Secured.value;").len(), 1);
    }

    #[test]
    fn empty_taxonomy_never_matches() {
        let m = KeywordMatcher::new(&Taxonomy::default()).unwrap();
        assert!(m.is_empty());
        assert!(m.match_line("MD5 Cipher").is_empty());
    }
}
