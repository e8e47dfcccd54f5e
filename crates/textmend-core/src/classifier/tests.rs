//! Classifier tests

use super::*;

fn classifier() -> TextClassifier {
    TextClassifier::with_builtin_languages()
}

#[test]
fn blank_lines_are_unclassified() {
    let c = classifier();
    assert_eq!(c.classify_line("", "javascript"), None);
    assert_eq!(c.classify_line("   \t ", "auto"), None);
}

#[test]
fn line_comments_win_over_everything() {
    let c = classifier();
    assert_eq!(
        c.classify_line("// a plain comment", "javascript"),
        Some(TextKind::Comment)
    );
    assert_eq!(
        c.classify_line("# python style", "python"),
        Some(TextKind::Comment)
    );
    // A string embedded in a comment is still a comment.
    assert_eq!(
        c.classify_line("// see \"example\" for details", "javascript"),
        Some(TextKind::Comment)
    );
}

#[test]
fn strings_are_detected() {
    let c = classifier();
    assert_eq!(
        c.classify_line("const greeting = \"Bonjour le monde\";", "javascript"),
        Some(TextKind::StringLiteral)
    );
    assert_eq!(
        c.classify_line("name = 'Ada'", "python"),
        Some(TextKind::StringLiteral)
    );
}

#[test]
fn docstrings_are_detected() {
    let c = classifier();
    assert_eq!(
        c.classify_line("\"\"\"Module docstring.\"\"\"", "python"),
        Some(TextKind::Docstring)
    );
    assert_eq!(
        c.classify_line("/** JSDoc on one line */", "javascript"),
        Some(TextKind::Docstring)
    );
}

#[test]
fn block_comment_openers_classify_as_comments() {
    let c = classifier();
    assert_eq!(
        c.classify_line("/* start of a block", "javascript"),
        Some(TextKind::Comment)
    );
}

#[test]
fn classification_is_idempotent() {
    let c = classifier();
    let line = "let x = \"hello there\";";
    let first = c.classify_line(line, "javascript");
    let second = c.classify_line(line, "javascript");
    assert_eq!(first, second);
}

#[test]
fn aliases_and_unknown_ids_fall_back() {
    let c = classifier();
    assert_eq!(
        c.classify_line("// aliased lookup", "js"),
        Some(TextKind::Comment)
    );
    // Unknown ids use the javascript definition.
    assert_eq!(
        c.classify_line("// unknown language", "cobol"),
        Some(TextKind::Comment)
    );
    assert_eq!(c.classify_line("# not a js comment", "cobol"), None);
}

#[test]
fn auto_mode_checks_registry_order() {
    let c = classifier();
    // `#` lines match python's comment pattern even though javascript
    // is checked first.
    assert_eq!(
        c.classify_line("# shell style", "auto"),
        Some(TextKind::Comment)
    );
}

#[test]
fn detect_language_by_keywords() {
    let c = classifier();
    let python = "def main():\n    for item in items:\n        print(item)\n";
    assert_eq!(c.detect_language(python), "python");

    let rust = "fn main() {\n    let value = compute();\n}\nstruct Config;\nimpl Config {}\n";
    assert_eq!(c.detect_language(rust), "rust");
}

#[test]
fn detect_language_defaults_to_javascript() {
    let c = classifier();
    assert_eq!(c.detect_language(""), "javascript");
    assert_eq!(c.detect_language("12345 67890"), "javascript");
}

#[test]
fn analyze_structure_counts_lines() {
    let c = classifier();
    let code = "// header\nlet x = 1;\nconst s = \"hello world\";\n";
    let report = c.analyze_structure(code, "javascript");
    assert_eq!(report.comments, 1);
    assert_eq!(report.strings, 1);
    assert_eq!(report.docstrings, 0);
    assert_eq!(report.lines, 4);
}
