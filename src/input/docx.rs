//! WordprocessingML paragraph reader
//!
//! A DOCX file is a ZIP container; the body text lives in `word/document.xml`.
//! Only paragraphs that are direct children of `<w:body>` are returned, so table
//! cells, headers/footers and text boxes are left out.

use crate::error::{PipelineError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

/// Read the body paragraphs of the DOCX file at `path`, in document order.
pub fn read_paragraphs(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        PipelineError::CorruptDocument(format!("Failed to read DOCX as ZIP: {}", e))
    })?;

    let mut part = archive.by_name(DOCUMENT_PART).map_err(|e| {
        PipelineError::CorruptDocument(format!("Missing {}: {}", DOCUMENT_PART, e))
    })?;

    let mut xml = String::new();
    part.read_to_string(&mut xml).map_err(|e| {
        PipelineError::CorruptDocument(format!("Failed to read {}: {}", DOCUMENT_PART, e))
    })?;

    parse_body_paragraphs(&xml)
}

/// Paragraph currently being collected.
struct OpenParagraph {
    text: String,
    // w:p elements opened inside this one (text boxes, drawings)
    nested: usize,
}

/// Walk the XML tag by tag and collect the text of every body-level `<w:p>`.
pub fn parse_body_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut paragraphs = Vec::new();
    let mut stack: Vec<&str> = Vec::new();
    let mut current: Option<OpenParagraph> = None;
    let mut in_text = false;
    let mut saw_body = false;
    let mut rest = xml;

    while let Some(lt) = rest.find('<') {
        if in_text {
            if let Some(paragraph) = current.as_mut().filter(|p| p.nested == 0) {
                paragraph.text.push_str(&decode_entities(&rest[..lt]));
            }
        }
        rest = &rest[lt..];

        if rest.starts_with("<!--") {
            rest = skip_past(rest, "-->")?;
            continue;
        }
        if rest.starts_with("<![CDATA[") {
            let end = rest.find("]]>").ok_or_else(|| unterminated("CDATA section"))?;
            if in_text {
                if let Some(paragraph) = current.as_mut().filter(|p| p.nested == 0) {
                    paragraph.text.push_str(&rest[9..end]);
                }
            }
            rest = &rest[end + 3..];
            continue;
        }
        if rest.starts_with("<?") || rest.starts_with("<!") {
            rest = skip_past(rest, ">")?;
            continue;
        }

        let gt = rest.find('>').ok_or_else(|| unterminated("tag"))?;
        let tag = &rest[1..gt];
        rest = &rest[gt + 1..];

        if let Some(name) = tag.strip_prefix('/') {
            let name = name.trim();
            stack.pop();
            match name {
                "w:t" => in_text = false,
                "w:p" => close_paragraph(&mut current, &stack, &mut paragraphs),
                _ => {}
            }
            continue;
        }

        let self_closing = tag.ends_with('/');
        let name = tag_name(tag);
        let parent = stack.last().copied();

        match name {
            "w:body" => saw_body = true,
            "w:p" => {
                if let Some(paragraph) = current.as_mut() {
                    if !self_closing {
                        paragraph.nested += 1;
                    }
                } else if parent == Some("w:body") {
                    if self_closing {
                        paragraphs.push(String::new());
                    } else {
                        current = Some(OpenParagraph {
                            text: String::new(),
                            nested: 0,
                        });
                    }
                }
            }
            "w:t" if parent == Some("w:r") && !self_closing => in_text = true,
            "w:tab" | "w:br" | "w:cr" if parent == Some("w:r") => {
                let ch = match name {
                    "w:tab" => Some('\t'),
                    "w:br" => line_break(tag),
                    _ => Some('\n'),
                };
                if let Some((paragraph, ch)) = current.as_mut().filter(|p| p.nested == 0).zip(ch) {
                    paragraph.text.push(ch);
                }
            }
            _ => {}
        }

        if !self_closing {
            stack.push(name);
        }
    }

    if !saw_body {
        return Err(PipelineError::CorruptDocument(
            "document.xml has no <w:body> element".to_string(),
        ));
    }

    Ok(paragraphs)
}

fn close_paragraph(
    current: &mut Option<OpenParagraph>,
    stack: &[&str],
    paragraphs: &mut Vec<String>,
) {
    let Some(paragraph) = current.as_mut() else {
        return;
    };
    if paragraph.nested > 0 {
        paragraph.nested -= 1;
        return;
    }
    if stack.last() == Some(&"w:body") {
        if let Some(paragraph) = current.take() {
            paragraphs.push(paragraph.text);
        }
    }
}

/// Page and column breaks contribute no text; only text-wrapping breaks
/// (the default `w:type`) become a newline.
fn line_break(tag: &str) -> Option<char> {
    match attribute(tag, "w:type") {
        None | Some("textWrapping") => Some('\n'),
        Some(_) => None,
    }
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = tag;
    while let Some(pos) = rest.find(name) {
        let preceded_by_space = rest[..pos].ends_with(char::is_whitespace);
        let after = rest[pos + name.len()..].trim_start();
        rest = &rest[pos + name.len()..];
        if !preceded_by_space {
            continue;
        }
        let Some(value) = after.strip_prefix('=') else {
            continue;
        };
        let value = value.trim_start();
        let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        let value = &value[1..];
        return value.find(quote).map(|end| &value[..end]);
    }
    None
}

fn tag_name(tag: &str) -> &str {
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(tag.len());
    &tag[..end]
}

fn skip_past<'a>(input: &'a str, terminator: &str) -> Result<&'a str> {
    input
        .find(terminator)
        .map(|pos| &input[pos + terminator.len()..])
        .ok_or_else(|| unterminated("markup declaration"))
}

fn unterminated(what: &str) -> PipelineError {
    PipelineError::CorruptDocument(format!("Unterminated {} in document.xml", what))
}

/// Decode the predefined XML entities and numeric character references.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
