//! Plain text to markdown normalization
//!
//! This is an escaping pass: extracted text is made safe to embed in a
//! markdown document so that nothing in it is later read as markup. No
//! headings, lists or emphasis are inferred.

use regex::Regex;

pub struct MarkdownNormalizer {
    whitespace_regex: Regex,
    ordered_marker_regex: Regex,
}

impl Default for MarkdownNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownNormalizer {
    pub fn new() -> Self {
        let whitespace_regex = Regex::new(r"[ \t\u{a0}]+").expect("Invalid whitespace regex");

        let ordered_marker_regex =
            Regex::new(r"^(\d{1,9})([.)])(\s|$)").expect("Invalid ordered list regex");

        Self {
            whitespace_regex,
            ordered_marker_regex,
        }
    }

    /// Normalize raw extracted text line by line. Every input line, blank or
    /// not, yields exactly one output line.
    pub fn normalize(&self, text: &str) -> String {
        let unified = text
            .replace("\r\n", "\n")
            .replace(['\r', '\u{c}'], "\n");

        unified
            .split('\n')
            .map(|line| self.normalize_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn normalize_line(&self, line: &str) -> String {
        let collapsed = self.whitespace_regex.replace_all(line, " ");
        // Leading indentation would turn the line into a code block.
        self.escape_block_marker(collapsed.trim())
    }

    /// Escape the first character of a line when it would open a block element,
    /// then escape inline metacharacters in the rest.
    fn escape_block_marker(&self, content: &str) -> String {
        if let Some(caps) = self.ordered_marker_regex.captures(content) {
            let digits = &caps[1];
            let rest = &content[digits.len() + 1..];
            return format!("{}\\{}{}", digits, &caps[2], escape_inline(rest));
        }

        let mut chars = content.chars();
        match chars.next() {
            Some(first @ ('#' | '>')) => format!("\\{}{}", first, escape_inline(chars.as_str())),
            Some(first @ ('-' | '+')) if is_marker_end(chars.as_str()) => {
                format!("\\{}{}", first, escape_inline(chars.as_str()))
            }
            Some('=') if content.chars().all(|c| c == '=') => format!("\\{}", content),
            Some('~') if content.starts_with("~~~") => format!("\\{}", escape_inline(content)),
            _ => escape_inline(content),
        }
    }
}

fn is_marker_end(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(' ') || rest.chars().all(|c| c == '-' || c == ' ')
}

fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '<') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Event, Parser, Tag};

    fn markup_events(markdown: &str) -> Vec<String> {
        Parser::new(markdown)
            .filter_map(|event| match event {
                Event::Start(tag) => match tag {
                    Tag::Paragraph => None,
                    other => Some(format!("{:?}", other)),
                },
                Event::Code(code) => Some(format!("Code({})", code)),
                Event::Html(html) => Some(format!("Html({})", html)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_lines_pass_through() {
        let normalizer = MarkdownNormalizer::new();
        assert_eq!(normalizer.normalize("Hello world.\nSecond line."), "Hello world.\nSecond line.");
    }

    #[test]
    fn test_line_count_is_preserved() {
        let normalizer = MarkdownNormalizer::new();
        let text = "First\n\nThird\n\nFifth";
        let markdown = normalizer.normalize(text);
        assert_eq!(markdown.split('\n').count(), 5);
        assert_eq!(markdown, text);
    }

    #[test]
    fn test_page_breaks_become_newlines() {
        let normalizer = MarkdownNormalizer::new();
        assert_eq!(normalizer.normalize("Page one\u{c}Page two"), "Page one\nPage two");
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_trailing_empty_lines_are_kept() {
        let normalizer = MarkdownNormalizer::new();
        assert_eq!(normalizer.normalize("x\n\n"), "x\n\n");
    }

    #[test]
    fn test_whitespace_collapses_within_lines() {
        let normalizer = MarkdownNormalizer::new();
        assert_eq!(normalizer.normalize("Senior\t\tEngineer   \r\nRust"), "Senior Engineer\nRust");
    }

    #[test]
    fn test_inline_metacharacters_are_escaped() {
        let normalizer = MarkdownNormalizer::new();
        assert_eq!(
            normalizer.normalize("snake_case *bold* `code` [link]"),
            "snake\\_case \\*bold\\* \\`code\\` \\[link\\]"
        );
    }

    #[test]
    fn test_block_markers_are_escaped() {
        let normalizer = MarkdownNormalizer::new();
        assert_eq!(normalizer.normalize("# Skills"), "\\# Skills");
        assert_eq!(normalizer.normalize("- Rust"), "\\- Rust");
        assert_eq!(normalizer.normalize("2019. Joined"), "2019\\. Joined");
        assert_eq!(normalizer.normalize("> quote"), "\\> quote");
        assert_eq!(normalizer.normalize("C-level"), "C-level");
        assert_eq!(normalizer.normalize("-5 degrees"), "-5 degrees");
    }

    #[test]
    fn test_fences_and_angle_brackets_are_escaped() {
        let normalizer = MarkdownNormalizer::new();
        assert_eq!(normalizer.normalize("~~~"), "\\~~~");
        assert_eq!(normalizer.normalize("~ 5 years"), "~ 5 years");
        assert_eq!(
            normalizer.normalize("Contact <john@doe.com>"),
            "Contact \\<john@doe.com>"
        );
    }

    #[test]
    fn test_output_parses_without_markup() {
        let normalizer = MarkdownNormalizer::new();
        let text = "# John Doe\n- Rust, Go\n1. First job\n> quoted\n**Senior** _engineer_\n`grep`\n---\n===\n+ more\n~~~\nfenced\n~~~\n<john@doe.com>\nC <b>bold</b>\n<div>block</div>";
        let markdown = normalizer.normalize(text);
        assert!(markup_events(&markdown).is_empty(), "unexpected markup in {:?}", markdown);
    }
}
