//! Builtin language definitions
//!
//! Pattern tables for the nine builtin languages. Order matters: "auto"
//! classification checks languages in this order, first-match-wins.

use super::{CommentPatterns, LanguageDefinition};
use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("builtin language pattern compiles")
}

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources.iter().map(|p| re(p)).collect()
}

fn keywords(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

const C_BLOCK_START: &str = r"^\s*/\*";
const C_BLOCK_END: &str = r"\*/\s*$";
const C_DOC_BLOCK: &str = r"^\s*/\*\*[\s\S]*?\*/";
const DOUBLE_QUOTED: &str = r#""(?:[^"\\]|\\.)*""#;
const SINGLE_OR_DOUBLE_QUOTED: &str = r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#;

fn javascript() -> LanguageDefinition {
    LanguageDefinition {
        id: "javascript".to_string(),
        comment: CommentPatterns {
            single_line: patterns(&[r"^\s*//"]),
            multi_line_start: patterns(&[C_BLOCK_START]),
            multi_line_end: patterns(&[C_BLOCK_END]),
        },
        strings: patterns(&[
            r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|`(?:[^`\\]|\\.)*`"#,
            r"`(?:[^`\\]|\\.)*`",
        ]),
        docstrings: patterns(&[C_DOC_BLOCK]),
        keywords: keywords(&[
            "function", "const", "let", "var", "class", "import", "export",
        ]),
    }
}

fn typescript() -> LanguageDefinition {
    LanguageDefinition {
        id: "typescript".to_string(),
        keywords: keywords(&[
            "function",
            "const",
            "let",
            "var",
            "class",
            "interface",
            "type",
            "import",
            "export",
        ]),
        ..javascript()
    }
}

fn python() -> LanguageDefinition {
    LanguageDefinition {
        id: "python".to_string(),
        comment: CommentPatterns {
            single_line: patterns(&[r"^\s*#"]),
            multi_line_start: Vec::new(),
            multi_line_end: Vec::new(),
        },
        strings: patterns(&[
            SINGLE_OR_DOUBLE_QUOTED,
            r#"f'(?:[^'\\]|\\.)*'|f"(?:[^"\\]|\\.)*""#,
        ]),
        docstrings: patterns(&[r#"^\s*("""|''')"#, r#"^\s*r("""|''')"#]),
        keywords: keywords(&["def", "class", "import", "from", "if", "for", "while"]),
    }
}

fn java() -> LanguageDefinition {
    LanguageDefinition {
        id: "java".to_string(),
        comment: CommentPatterns {
            single_line: patterns(&[r"^\s*//"]),
            multi_line_start: patterns(&[C_BLOCK_START]),
            multi_line_end: patterns(&[C_BLOCK_END]),
        },
        strings: patterns(&[DOUBLE_QUOTED]),
        docstrings: patterns(&[C_DOC_BLOCK]),
        keywords: keywords(&[
            "public",
            "private",
            "class",
            "interface",
            "void",
            "return",
        ]),
    }
}

fn csharp() -> LanguageDefinition {
    LanguageDefinition {
        id: "csharp".to_string(),
        comment: CommentPatterns {
            single_line: patterns(&[r"^\s*//", r"^\s*///"]),
            multi_line_start: patterns(&[C_BLOCK_START]),
            multi_line_end: patterns(&[C_BLOCK_END]),
        },
        strings: patterns(&[DOUBLE_QUOTED, r#"@"(?:[^"]|"")*""#]),
        docstrings: patterns(&[r"^\s*///", C_DOC_BLOCK]),
        keywords: keywords(&[
            "public",
            "private",
            "class",
            "interface",
            "void",
            "namespace",
        ]),
    }
}

fn php() -> LanguageDefinition {
    LanguageDefinition {
        id: "php".to_string(),
        comment: CommentPatterns {
            single_line: patterns(&[r"^\s*//", r"^\s*#"]),
            multi_line_start: patterns(&[C_BLOCK_START]),
            multi_line_end: patterns(&[C_BLOCK_END]),
        },
        strings: patterns(&[SINGLE_OR_DOUBLE_QUOTED]),
        docstrings: patterns(&[C_DOC_BLOCK]),
        keywords: keywords(&["function", "class", "public", "private", "namespace"]),
    }
}

fn ruby() -> LanguageDefinition {
    LanguageDefinition {
        id: "ruby".to_string(),
        comment: CommentPatterns {
            single_line: patterns(&[r"^\s*#"]),
            multi_line_start: patterns(&[r"^\s*=begin"]),
            multi_line_end: patterns(&[r"^\s*=end"]),
        },
        strings: patterns(&[SINGLE_OR_DOUBLE_QUOTED]),
        docstrings: Vec::new(),
        keywords: keywords(&["def", "class", "module", "end", "require"]),
    }
}

fn go() -> LanguageDefinition {
    LanguageDefinition {
        id: "go".to_string(),
        comment: CommentPatterns {
            single_line: patterns(&[r"^\s*//"]),
            multi_line_start: patterns(&[C_BLOCK_START]),
            multi_line_end: patterns(&[C_BLOCK_END]),
        },
        strings: patterns(&[DOUBLE_QUOTED, r"`[^`]*`"]),
        docstrings: Vec::new(),
        keywords: keywords(&["func", "type", "struct", "interface", "package", "import"]),
    }
}

fn rust() -> LanguageDefinition {
    LanguageDefinition {
        id: "rust".to_string(),
        comment: CommentPatterns {
            single_line: patterns(&[r"^\s*//", r"^\s*///"]),
            multi_line_start: patterns(&[C_BLOCK_START]),
            multi_line_end: patterns(&[C_BLOCK_END]),
        },
        strings: patterns(&[DOUBLE_QUOTED, r##"r#*"[^"]*"#*"##]),
        docstrings: patterns(&[r"^\s*///"]),
        keywords: keywords(&["fn", "struct", "enum", "impl", "trait", "use"]),
    }
}

/// The builtin definitions in registry order
pub fn builtin_languages() -> Vec<LanguageDefinition> {
    vec![
        javascript(),
        typescript(),
        python(),
        java(),
        csharp(),
        php(),
        ruby(),
        go(),
        rust(),
    ]
}
