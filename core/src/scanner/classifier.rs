// 行分类状态机
// 决定每一行是原样复制还是参与关键词匹配

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&line\[[^\]]+\]").expect("inline tag pattern"));
static BLOCK_BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//\s*&begin\[(.*?)\]").expect("block begin pattern"));
static BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"//\s*&end\[(.*?)\]").expect("block end pattern"));
static TEST_CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bclass\b.*Test|@Test\b").expect("test context pattern"));

const MULTILINE_OPEN: &str = "/*";
const MULTILINE_CLOSE: &str = "*/";
const LINE_COMMENT: &str = "//";

/// Classification of one source line.
///
/// Rules are applied in this order to the trimmed line; the first one that
/// fires decides the class:
///
/// | # | trigger                                   | state change                         | class              |
/// |---|-------------------------------------------|--------------------------------------|--------------------|
/// | 1 | contains `import`                          | none                                 | `Import`           |
/// | 2 | contains `&line[..]`                       | count unseen inline tags             | `InlineAnnotated`  |
/// | 3 | contains `/*`, or inside a block comment   | enter; leave on `*/`                 | `MultilineComment` |
/// | 4 | `class ..Test` / `@Test`                   | enter test context                   | (falls through)    |
/// |   | starts with `}` while in test context      | leave test context                   | (falls through)    |
/// | 5 | contains `// &begin[..]`                   | enter annotated block                | (falls through)    |
/// |   | contains `// &end[..]`                     | leave annotated block                | `BlockEnd`         |
/// |   | in test context                            | none                                 | `TestContext`      |
/// |   | in annotated block                         | none                                 | `AnnotatedBlock`   |
/// | 6 | starts with `//`                           | none                                 | `LineComment`      |
/// |   | otherwise                                  | none                                 | `Eligible`         |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Import,
    InlineAnnotated,
    MultilineComment,
    TestContext,
    AnnotatedBlock,
    BlockEnd,
    LineComment,
    Eligible,
}

impl LineClass {
    pub fn is_eligible(self) -> bool {
        self == LineClass::Eligible
    }
}

/// 单个文件的扫描状态，每个文件开始时重置
#[derive(Debug, Default)]
pub struct ScanState {
    in_multiline_comment: bool,
    in_test_context: bool,
    in_annotated_block: bool,
    seen_inline_tags: HashSet<String>,
    wrapped_lines: HashSet<usize>,
    new_inline_tags: usize,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_multiline_comment(&self) -> bool {
        self.in_multiline_comment
    }

    pub fn in_test_context(&self) -> bool {
        self.in_test_context
    }

    pub fn in_annotated_block(&self) -> bool {
        self.in_annotated_block
    }

    /// 本文件中首次出现的不同行内标注数量
    pub fn new_inline_tags(&self) -> usize {
        self.new_inline_tags
    }

    /// 记录某行已经包裹过 begin/end，重复包裹返回 false
    pub fn mark_wrapped(&mut self, line_number: usize) -> bool {
        self.wrapped_lines.insert(line_number)
    }

    pub fn classify(&mut self, line: &str) -> LineClass {
        let trimmed = line.trim();

        if trimmed.contains("import") {
            return LineClass::Import;
        }

        if INLINE_TAG.is_match(trimmed) {
            for found in INLINE_TAG.find_iter(trimmed) {
                if self.seen_inline_tags.insert(found.as_str().to_string()) {
                    self.new_inline_tags += 1;
                }
            }
            return LineClass::InlineAnnotated;
        }

        if trimmed.contains(MULTILINE_OPEN) {
            self.in_multiline_comment = true;
        }
        if self.in_multiline_comment {
            // 同一行既有 /* 又有 */ 时整行仍按注释跳过
            if trimmed.contains(MULTILINE_CLOSE) {
                self.in_multiline_comment = false;
            }
            return LineClass::MultilineComment;
        }

        if TEST_CONTEXT.is_match(trimmed) {
            self.in_test_context = true;
        }
        if self.in_test_context && trimmed.starts_with('}') {
            self.in_test_context = false;
        }

        if BLOCK_BEGIN.is_match(trimmed) {
            self.in_annotated_block = true;
        }
        if BLOCK_END.is_match(trimmed) {
            self.in_annotated_block = false;
            return LineClass::BlockEnd;
        }

        if self.in_test_context {
            return LineClass::TestContext;
        }
        if self.in_annotated_block {
            return LineClass::AnnotatedBlock;
        }

        // 行尾注释由匹配器截断，这里只跳过纯注释行
        if trimmed.starts_with(LINE_COMMENT) {
            return LineClass::LineComment;
        }

        LineClass::Eligible
    }
}
