//! Renders a marlin token stream to HTML in a single pass.
//!
//! Token pairs map directly to tags; `Text` routing depends on the leaf
//! that is open (escaped for paragraphs, headings, and code; raw for
//! HTML blocks). Tight/loose list rendering is out of scope: list items
//! always wrap their paragraphs.

use marlin_core::Token;

mod utils;

use utils::escape_html;

enum Sink {
    None,
    Paragraph { first: bool },
    Heading,
    Code,
    Html,
}

pub fn render_html(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut sink = Sink::None;
    let mut heading_levels: Vec<usize> = Vec::new();
    let mut item_open: Vec<bool> = Vec::new();
    for token in tokens {
        match token {
            Token::Paragraph { .. } => {
                out.push_str("<p>");
                sink = Sink::Paragraph { first: true };
            }
            Token::EndParagraph => {
                out.push_str("</p>\n");
                sink = Sink::None;
            }
            Token::Text { text, .. } => match &mut sink {
                Sink::Paragraph { first } => {
                    if !*first {
                        out.push('\n');
                    }
                    *first = false;
                    escape_html(text, &mut out);
                }
                Sink::Heading | Sink::None => escape_html(text, &mut out),
                Sink::Code => {
                    escape_html(text, &mut out);
                    out.push('\n');
                }
                Sink::Html => {
                    out.push_str(text);
                    out.push('\n');
                }
            },
            Token::AtxHeading { level, .. } => {
                out.push_str(&format!("<h{level}>"));
                heading_levels.push(*level);
                sink = Sink::Heading;
            }
            Token::SetextHeading { underline, .. } => {
                let level = if *underline == '=' { 1 } else { 2 };
                out.push_str(&format!("<h{level}>"));
                heading_levels.push(level);
                sink = Sink::Heading;
            }
            Token::EndAtxHeading | Token::EndSetextHeading => {
                let level = heading_levels.pop().unwrap_or(1);
                out.push_str(&format!("</h{level}>\n"));
                sink = Sink::None;
            }
            Token::ThematicBreak { .. } => {
                out.push_str("<hr />\n");
            }
            Token::IndentedCodeBlock { .. } => {
                out.push_str("<pre><code>");
                sink = Sink::Code;
            }
            Token::FencedCodeBlock { info, .. } => {
                match info.split_whitespace().next() {
                    Some(language) => {
                        out.push_str("<pre><code class=\"language-");
                        escape_html(language, &mut out);
                        out.push_str("\">");
                    }
                    None => out.push_str("<pre><code>"),
                }
                sink = Sink::Code;
            }
            Token::EndIndentedCodeBlock | Token::EndFencedCodeBlock => {
                out.push_str("</code></pre>\n");
                sink = Sink::None;
            }
            Token::HtmlBlock { .. } => {
                sink = Sink::Html;
            }
            Token::EndHtmlBlock => {
                sink = Sink::None;
            }
            Token::BlockQuote { .. } => {
                out.push_str("<blockquote>\n");
            }
            Token::EndBlockQuote => {
                out.push_str("</blockquote>\n");
            }
            Token::UnorderedList { .. } => {
                out.push_str("<ul>\n");
                item_open.push(false);
            }
            Token::OrderedList { start, .. } => {
                if *start == 1 {
                    out.push_str("<ol>\n");
                } else {
                    out.push_str(&format!("<ol start=\"{start}\">\n"));
                }
                item_open.push(false);
            }
            Token::ListItem { .. } => {
                if let Some(open) = item_open.last_mut() {
                    if *open {
                        out.push_str("</li>\n");
                    }
                    *open = true;
                }
                out.push_str("<li>");
            }
            Token::EndUnorderedList => {
                if item_open.pop() == Some(true) {
                    out.push_str("</li>\n");
                }
                out.push_str("</ul>\n");
            }
            Token::EndOrderedList => {
                if item_open.pop() == Some(true) {
                    out.push_str("</li>\n");
                }
                out.push_str("</ol>\n");
            }
            Token::Blank { .. } => {
                if matches!(sink, Sink::Code | Sink::Html) {
                    out.push('\n');
                }
            }
            Token::LinkReferenceDefinition { .. } | Token::EndOfStream => {}
        }
    }
    out
}
