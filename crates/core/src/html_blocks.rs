//! Classification of the seven CommonMark HTML block types and their
//! termination conditions.

use serde::Serialize;

use crate::error::TokenizerFault;
use crate::scanner;
use crate::stack::{CloseOptions, ParserState, StackEntry, StackKind};
use crate::token::Token;

/// The seven CommonMark HTML block start conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HtmlBlockKind {
    /// `<script`, `<pre`, or `<style`; ends at the matching end tag.
    Type1,
    /// `<!--` comment; ends at `-->`.
    Type2,
    /// `<?` processing instruction; ends at `?>`.
    Type3,
    /// `<!` followed by an ASCII uppercase letter; ends at `>`.
    Type4,
    /// `<![CDATA[` section; ends at `]]>`.
    Type5,
    /// A known block-level tag name; ends at a blank line.
    Type6,
    /// Any other complete tag alone on its line; ends at a blank line.
    Type7,
}

impl HtmlBlockKind {
    /// Types 6 and 7 close on a blank line; types 1–5 close only via
    /// their literal terminator or the end of the document.
    pub fn closes_on_blank_line(self) -> bool {
        matches!(self, HtmlBlockKind::Type6 | HtmlBlockKind::Type7)
    }
}

const TYPE1_TAGS: [&str; 3] = ["script", "pre", "style"];

/// Tag names whose start or end tag opens a type 6 HTML block.
const BLOCK_LEVEL_TAGS: [&str; 62] = [
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// Recognize the block types identified by the character directly after
/// `<`. `index` points just past the `<`.
pub(crate) fn check_for_special_html_blocks(line: &str, index: usize) -> Option<HtmlBlockKind> {
    let rest = line.get(index..)?;
    if rest.starts_with("!--") {
        Some(HtmlBlockKind::Type2)
    } else if rest.starts_with("![CDATA[") {
        Some(HtmlBlockKind::Type5)
    } else if rest.starts_with('!')
        && rest[1..].starts_with(|c: char| c.is_ascii_uppercase())
    {
        Some(HtmlBlockKind::Type4)
    } else if rest.starts_with('?') {
        Some(HtmlBlockKind::Type3)
    } else {
        None
    }
}

/// Recognize the tag-name driven block types. `start` is the index of the
/// `<` itself; `followed_ok` reports whether the tag name was terminated
/// by whitespace, `>`, `/>`, or the end of the line.
pub(crate) fn check_for_normal_html_blocks(
    tag: &str,
    closing: bool,
    followed_ok: bool,
    line: &str,
    start: usize,
    top_is_paragraph: bool,
) -> Option<HtmlBlockKind> {
    if !closing && followed_ok && TYPE1_TAGS.contains(&tag) {
        return Some(HtmlBlockKind::Type1);
    }
    if followed_ok && BLOCK_LEVEL_TAGS.contains(&tag) {
        return Some(HtmlBlockKind::Type6);
    }
    // Type 7 requires a syntactically complete tag alone on the line and
    // never interrupts a paragraph.
    if !top_is_paragraph && !TYPE1_TAGS.contains(&tag) && is_complete_tag_line(line, start) {
        return Some(HtmlBlockKind::Type7);
    }
    None
}

/// Decide whether `line[start..]` opens an HTML block, returning the
/// block type and the lowercased tag name (empty for types 2–5).
pub(crate) fn determine_html_block_type(
    line: &str,
    start: usize,
    top_is_paragraph: bool,
) -> Option<(HtmlBlockKind, String)> {
    if !scanner::is_character_at_index(line, start, '<') {
        return None;
    }
    if let Some(kind) = check_for_special_html_blocks(line, start + 1) {
        return Some((kind, String::new()));
    }
    let mut index = start + 1;
    let closing = scanner::is_character_at_index(line, index, '/');
    if closing {
        index += 1;
    }
    let name_start = index;
    let bytes = line.as_bytes();
    while bytes
        .get(index)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'-')
    {
        index += 1;
    }
    if index == name_start {
        return None;
    }
    let tag = line[name_start..index].to_ascii_lowercase();
    let followed_ok = index >= line.len()
        || scanner::is_character_at_index_one_of(line, index, " \t>")
        || line[index..].starts_with("/>");
    check_for_normal_html_blocks(&tag, closing, followed_ok, line, start, top_is_paragraph)
        .map(|kind| (kind, tag))
}

/// True when `line[start..]` is one syntactically complete open or close
/// tag followed only by whitespace.
fn is_complete_tag_line(line: &str, start: usize) -> bool {
    let bytes = line.as_bytes();
    let mut index = start;
    if bytes.get(index) != Some(&b'<') {
        return false;
    }
    index += 1;
    let closing = bytes.get(index) == Some(&b'/');
    if closing {
        index += 1;
    }
    if !bytes.get(index).is_some_and(u8::is_ascii_alphabetic) {
        return false;
    }
    while bytes
        .get(index)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'-')
    {
        index += 1;
    }
    if closing {
        let (after_ws, _) = scanner::extract_whitespace(line, index);
        index = after_ws;
    } else {
        loop {
            let (after_ws, ws) = scanner::extract_whitespace(line, index);
            if ws.is_empty() {
                break;
            }
            // attribute name
            if !bytes
                .get(after_ws)
                .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'_' | b':'))
            {
                index = after_ws;
                break;
            }
            let mut attr_end = after_ws + 1;
            while bytes
                .get(attr_end)
                .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'.' | b'-'))
            {
                attr_end += 1;
            }
            let (eq_index, _) = scanner::extract_whitespace(line, attr_end);
            if bytes.get(eq_index) != Some(&b'=') {
                index = attr_end;
                continue;
            }
            // attribute value
            let (value_index, _) = scanner::extract_whitespace(line, eq_index + 1);
            match bytes.get(value_index) {
                Some(&b'"') | Some(&b'\'') => {
                    let quote = bytes[value_index];
                    let mut scan = value_index + 1;
                    while bytes.get(scan).is_some_and(|b| *b != quote) {
                        scan += 1;
                    }
                    if bytes.get(scan) != Some(&quote) {
                        return false;
                    }
                    index = scan + 1;
                }
                Some(_) => {
                    let mut scan = value_index;
                    while bytes
                        .get(scan)
                        .is_some_and(|b| !matches!(b, b' ' | b'\t' | b'"' | b'\'' | b'=' | b'<' | b'>' | b'`'))
                    {
                        scan += 1;
                    }
                    if scan == value_index {
                        return false;
                    }
                    index = scan;
                }
                None => return false,
            }
        }
        if bytes.get(index) == Some(&b'/') {
            index += 1;
        }
    }
    if bytes.get(index) != Some(&b'>') {
        return false;
    }
    let (end, _) = scanner::extract_whitespace(line, index + 1);
    end >= line.len()
}

/// Continuation line of an open HTML block of types 1–5: the line is
/// content, and the block closes when the type-specific terminator
/// occurs anywhere in it.
pub(crate) fn check_normal_html_block_end(
    state: &mut ParserState,
    line: &str,
    start: usize,
) -> Result<(), TokenizerFault> {
    let (kind, tag) = match state.top() {
        StackEntry::HtmlBlock { kind, tag } => (*kind, tag.clone()),
        _ => {
            return Err(TokenizerFault::invariant(
                "HTML block end check without an open HTML block",
            ));
        }
    };
    let rest = &line[start..];
    let position = state.position(start + 1);
    state.append(Token::Text {
        text: rest.to_string(),
        position,
    });
    let terminated = match kind {
        HtmlBlockKind::Type1 => rest.to_ascii_lowercase().contains(&format!("</{tag}>")),
        HtmlBlockKind::Type2 => rest.contains("-->"),
        HtmlBlockKind::Type3 => rest.contains("?>"),
        HtmlBlockKind::Type4 => rest.contains('>'),
        HtmlBlockKind::Type5 => rest.contains("]]>"),
        HtmlBlockKind::Type6 | HtmlBlockKind::Type7 => false,
    };
    if terminated {
        state.close_open_blocks(CloseOptions::only(&[StackKind::HtmlBlock]))?;
    }
    Ok(())
}

/// A blank line closes an open HTML block of types 6 or 7.
pub(crate) fn check_blank_html_block_end(state: &mut ParserState) -> Result<(), TokenizerFault> {
    state.close_open_blocks(CloseOptions::only(&[StackKind::HtmlBlock]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_prefixes_classify() {
        assert_eq!(
            check_for_special_html_blocks("<!-- c -->", 1),
            Some(HtmlBlockKind::Type2)
        );
        assert_eq!(
            check_for_special_html_blocks("<![CDATA[x]]>", 1),
            Some(HtmlBlockKind::Type5)
        );
        assert_eq!(
            check_for_special_html_blocks("<!DOCTYPE html>", 1),
            Some(HtmlBlockKind::Type4)
        );
        assert_eq!(
            check_for_special_html_blocks("<?php", 1),
            Some(HtmlBlockKind::Type3)
        );
        assert_eq!(check_for_special_html_blocks("<div>", 1), None);
    }

    #[test]
    fn script_opens_type_1() {
        assert_eq!(
            determine_html_block_type("<script>", 0, false),
            Some((HtmlBlockKind::Type1, "script".to_string()))
        );
        // closing form is not a type 1 start
        assert_eq!(
            determine_html_block_type("</script>", 0, false),
            None
        );
    }

    #[test]
    fn known_block_tags_open_type_6() {
        assert_eq!(
            determine_html_block_type("<div>", 0, false),
            Some((HtmlBlockKind::Type6, "div".to_string()))
        );
        assert_eq!(
            determine_html_block_type("</TABLE>", 0, false),
            Some((HtmlBlockKind::Type6, "table".to_string()))
        );
        assert_eq!(
            determine_html_block_type("<div class=\"x\"", 0, false),
            Some((HtmlBlockKind::Type6, "div".to_string()))
        );
    }

    #[test]
    fn type_6_interrupts_paragraphs_but_type_7_does_not() {
        assert_eq!(
            determine_html_block_type("<div>", 0, true),
            Some((HtmlBlockKind::Type6, "div".to_string()))
        );
        assert_eq!(determine_html_block_type("<x-widget>", 0, true), None);
        assert_eq!(
            determine_html_block_type("<x-widget>", 0, false),
            Some((HtmlBlockKind::Type7, "x-widget".to_string()))
        );
    }

    #[test]
    fn type_7_requires_a_complete_lone_tag() {
        assert!(is_complete_tag_line("<x-tag attr=\"v\">  ", 0));
        assert!(is_complete_tag_line("</x-tag>", 0));
        assert!(is_complete_tag_line("<br/>", 0));
        assert!(!is_complete_tag_line("<x-tag> trailing", 0));
        assert!(!is_complete_tag_line("<x-tag attr=\"unclosed>", 0));
        assert!(!is_complete_tag_line("<3>", 0));
    }
}
