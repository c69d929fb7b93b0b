use marlin_core::{transform, HtmlBlockKind, Options, Position, Token};

fn tokens(input: &str) -> Vec<Token> {
    transform(input, &Options::default()).expect("transform")
}

fn at(line: usize, column: usize) -> Position {
    Position { line, column }
}

fn text(s: &str, line: usize, column: usize) -> Token {
    Token::Text {
        text: s.to_string(),
        position: at(line, column),
    }
}

#[test]
fn atx_heading_with_closing_hash_run() {
    assert_eq!(
        tokens("## foo ##"),
        vec![
            Token::AtxHeading {
                level: 2,
                ws_before: " ".to_string(),
                ws_after: " ".to_string(),
                position: at(1, 1),
            },
            text("foo", 1, 4),
            Token::EndAtxHeading,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn empty_atx_heading_has_no_text_token() {
    assert_eq!(
        tokens("#"),
        vec![
            Token::AtxHeading {
                level: 1,
                ws_before: String::new(),
                ws_after: String::new(),
                position: at(1, 1),
            },
            Token::EndAtxHeading,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn hash_without_following_whitespace_is_a_paragraph() {
    assert_eq!(
        tokens("#5 bolt"),
        vec![
            Token::Paragraph { position: at(1, 1) },
            text("#5 bolt", 1, 1),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn seven_hashes_are_a_paragraph() {
    let stream = tokens("####### x");
    assert!(matches!(stream[0], Token::Paragraph { .. }));
}

#[test]
fn tilde_fence_carries_its_info_string() {
    assert_eq!(
        tokens("~~~rust\ncode\n~~~"),
        vec![
            Token::FencedCodeBlock {
                fence_char: '~',
                fence_len: 3,
                info: "rust".to_string(),
                ws_before: String::new(),
                position: at(1, 1),
            },
            text("code", 2, 1),
            Token::EndFencedCodeBlock,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn shorter_backtick_run_does_not_close_the_fence() {
    assert_eq!(
        tokens("````\n```\n````"),
        vec![
            Token::FencedCodeBlock {
                fence_char: '`',
                fence_len: 4,
                info: String::new(),
                ws_before: String::new(),
                position: at(1, 1),
            },
            text("```", 2, 1),
            Token::EndFencedCodeBlock,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn unclosed_fence_closes_at_end_of_document() {
    assert_eq!(
        tokens("```\nx"),
        vec![
            Token::FencedCodeBlock {
                fence_char: '`',
                fence_len: 3,
                info: String::new(),
                ws_before: String::new(),
                position: at(1, 1),
            },
            text("x", 2, 1),
            Token::EndFencedCodeBlock,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn backtick_info_string_may_not_contain_a_backtick() {
    let stream = tokens("``` a`b");
    assert!(
        matches!(stream[0], Token::Paragraph { .. }),
        "stream = {stream:?}"
    );
}

#[test]
fn indented_code_with_interior_and_trailing_blanks() {
    assert_eq!(
        tokens("    a\n\n    b\n\nc"),
        vec![
            Token::IndentedCodeBlock { position: at(1, 5) },
            text("a", 1, 5),
            Token::Blank { position: at(2, 1) },
            text("b", 3, 5),
            Token::EndIndentedCodeBlock,
            Token::Blank { position: at(4, 1) },
            Token::Paragraph { position: at(5, 1) },
            text("c", 5, 1),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn indented_line_cannot_interrupt_a_paragraph() {
    assert_eq!(
        tokens("a\n    b"),
        vec![
            Token::Paragraph { position: at(1, 1) },
            text("a", 1, 1),
            text("b", 2, 5),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn thematic_break_variants() {
    for (input, marker) in [("***", '*'), ("- - -", '-'), ("_  _  _", '_')] {
        let stream = tokens(input);
        assert_eq!(
            stream,
            vec![
                Token::ThematicBreak {
                    marker,
                    text: input.to_string(),
                    position: at(1, 1),
                },
                Token::EndOfStream,
            ],
            "input = {input:?}"
        );
    }
}

#[test]
fn equals_setext_underline_makes_a_level_one_heading() {
    assert_eq!(
        tokens("Foo\n==="),
        vec![
            Token::SetextHeading {
                underline: '=',
                position: at(1, 1),
            },
            text("Foo", 1, 1),
            Token::EndSetextHeading,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn setext_underline_without_a_paragraph_is_a_paragraph() {
    assert_eq!(
        tokens("==="),
        vec![
            Token::Paragraph { position: at(1, 1) },
            text("===", 1, 1),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn html_comment_closes_on_its_own_line() {
    assert_eq!(
        tokens("<!-- c -->\nx"),
        vec![
            Token::HtmlBlock {
                kind: HtmlBlockKind::Type2,
                position: at(1, 1),
            },
            text("<!-- c -->", 1, 1),
            Token::EndHtmlBlock,
            Token::Paragraph { position: at(2, 1) },
            text("x", 2, 1),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn script_block_runs_to_its_end_tag() {
    assert_eq!(
        tokens("<script>\nvar a = 1;\n</script>\nok"),
        vec![
            Token::HtmlBlock {
                kind: HtmlBlockKind::Type1,
                position: at(1, 1),
            },
            text("<script>", 1, 1),
            text("var a = 1;", 2, 1),
            text("</script>", 3, 1),
            Token::EndHtmlBlock,
            Token::Paragraph { position: at(4, 1) },
            text("ok", 4, 1),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn div_block_closes_on_a_blank_line() {
    assert_eq!(
        tokens("<div>\nfoo\n\nbar"),
        vec![
            Token::HtmlBlock {
                kind: HtmlBlockKind::Type6,
                position: at(1, 1),
            },
            text("<div>", 1, 1),
            text("foo", 2, 1),
            Token::EndHtmlBlock,
            Token::Blank { position: at(3, 1) },
            Token::Paragraph { position: at(4, 1) },
            text("bar", 4, 1),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn custom_tag_cannot_interrupt_a_paragraph() {
    assert_eq!(
        tokens("para\n<x-widget>"),
        vec![
            Token::Paragraph { position: at(1, 1) },
            text("para", 1, 1),
            text("<x-widget>", 2, 1),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn custom_tag_alone_opens_a_type_seven_block() {
    let stream = tokens("<x-widget>\nstuff");
    assert_eq!(
        stream[0],
        Token::HtmlBlock {
            kind: HtmlBlockKind::Type7,
            position: at(1, 1),
        }
    );
    assert_eq!(stream[1], text("<x-widget>", 1, 1));
    assert_eq!(stream[2], text("stuff", 2, 1));
}

#[test]
fn link_reference_definition_on_one_line() {
    assert_eq!(
        tokens("[foo]: /url \"title\""),
        vec![
            Token::LinkReferenceDefinition {
                label: "foo".to_string(),
                destination: "/url".to_string(),
                title: Some("title".to_string()),
                position: at(1, 1),
            },
            Token::EndOfStream,
        ]
    );
}

#[test]
fn link_reference_definition_cannot_interrupt_a_paragraph() {
    assert_eq!(
        tokens("para\n[foo]: /url"),
        vec![
            Token::Paragraph { position: at(1, 1) },
            text("para", 1, 1),
            text("[foo]: /url", 2, 1),
            Token::EndParagraph,
            Token::EndOfStream,
        ]
    );
}

#[test]
fn trailing_junk_degrades_a_definition_to_a_paragraph() {
    let stream = tokens("[foo]: /url junk");
    assert!(
        matches!(stream[0], Token::Paragraph { .. }),
        "stream = {stream:?}"
    );
}

#[test]
fn tabs_expand_before_recognition() {
    // a tab after the bullet expands and the line is still a list item
    let stream = tokens("-\tfoo");
    assert!(
        stream
            .iter()
            .any(|t| matches!(t, Token::UnorderedList { .. })),
        "stream = {stream:?}"
    );
    // a leading tab reaches code-block indentation
    let stream = tokens("\tcode");
    assert_eq!(
        stream[0],
        Token::IndentedCodeBlock { position: at(1, 5) }
    );
    assert_eq!(stream[1], text("code", 1, 5));
}
