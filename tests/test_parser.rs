use std::fmt::Write as _;

use pretty_assertions::assert_eq;
use yaml_reader::{
    Input, Mark, Options, ParseEventType, Parser, ParserError, ScalarStyle, StrippedMarker,
};

/// Render the event stream of `parser` in yaml-test-suite notation.
fn dump_parser(mut parser: Parser<'_>) -> Result<String, ParserError> {
    let mut out = String::new();
    while parser.read()? {
        let properties = |parser: &Parser<'_>| {
            let mut text = String::new();
            if let Some(anchor) = parser.try_get_current_anchor() {
                let _ = write!(text, " {anchor}");
            }
            if let Some(tag) = parser.try_get_current_tag() {
                let _ = write!(text, " <{tag}>");
            }
            text
        };
        let line = match parser.current_event_type() {
            ParseEventType::Nothing => String::from("???"),
            ParseEventType::StreamStart => String::from("+STR"),
            ParseEventType::StreamEnd => String::from("-STR"),
            ParseEventType::DocumentStart => String::from("+DOC"),
            ParseEventType::DocumentEnd => String::from("-DOC"),
            ParseEventType::Alias => format!(
                "=ALI *{}",
                parser.try_get_current_anchor().unwrap().name()
            ),
            ParseEventType::Scalar => {
                let indicator = match parser.current_scalar_style().unwrap() {
                    ScalarStyle::Plain => ':',
                    ScalarStyle::SingleQuoted => '\'',
                    ScalarStyle::DoubleQuoted => '"',
                    ScalarStyle::Literal => '|',
                    ScalarStyle::Folded => '>',
                    _ => unreachable!(),
                };
                let value = parser
                    .try_get_scalar_as_str()
                    .unwrap()
                    .replace('\\', "\\\\")
                    .replace('\n', "\\n")
                    .replace('\t', "\\t");
                format!("=VAL{} {indicator}{value}", properties(&parser))
            }
            ParseEventType::SequenceStart => format!("+SEQ{}", properties(&parser)),
            ParseEventType::SequenceEnd => String::from("-SEQ"),
            ParseEventType::MappingStart => format!("+MAP{}", properties(&parser)),
            ParseEventType::MappingEnd => String::from("-MAP"),
        };
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

fn dump(input: &str) -> String {
    dump_parser(Parser::new(input.as_bytes())).unwrap()
}

fn dump_error(input: &str) -> ParserError {
    dump_parser(Parser::new(input.as_bytes())).unwrap_err()
}

fn events(lines: &[&str]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[test]
fn block_mapping_with_nested_sequence() {
    assert_eq!(
        dump("a: 1\nb:\n  - x\n  - y\n"),
        events(&[
            "+STR", "+DOC", "+MAP", "=VAL :a", "=VAL :1", "=VAL :b", "+SEQ", "=VAL :x",
            "=VAL :y", "-SEQ", "-MAP", "-DOC", "-STR",
        ])
    );
}

#[test]
fn anchors_and_aliases() {
    assert_eq!(
        dump("a: &x 1\nb: *x\n"),
        events(&[
            "+STR", "+DOC", "+MAP", "=VAL :a", "=VAL &x :1", "=VAL :b", "=ALI *x", "-MAP",
            "-DOC", "-STR",
        ])
    );
    assert!(matches!(
        dump_error("a: *x\n"),
        ParserError::UndefinedAlias { name, .. } if name == "x"
    ));
}

#[test]
fn block_scalar_chomping() {
    assert_eq!(
        dump("clip: |\n  text\n\nstrip: |-\n  text\nkeep: |+\n  text\n\n"),
        events(&[
            "+STR",
            "+DOC",
            "+MAP",
            "=VAL :clip",
            "=VAL |text\\n",
            "=VAL :strip",
            "=VAL |text",
            "=VAL :keep",
            "=VAL |text\\n\\n",
            "-MAP",
            "-DOC",
            "-STR",
        ])
    );
}

#[test]
fn folded_block_scalar() {
    assert_eq!(
        dump("folded: >\n  a\n  b\n\n  c\n"),
        events(&[
            "+STR", "+DOC", "+MAP", "=VAL :folded", "=VAL >a b\\nc\\n", "-MAP", "-DOC", "-STR",
        ])
    );
}

#[test]
fn flow_collections() {
    assert_eq!(
        dump("{a: [1, 2], b: {c: d}, e, f: }"),
        events(&[
            "+STR", "+DOC", "+MAP", "=VAL :a", "+SEQ", "=VAL :1", "=VAL :2", "-SEQ", "=VAL :b",
            "+MAP", "=VAL :c", "=VAL :d", "-MAP", "=VAL :e", "=VAL :", "=VAL :f", "=VAL :",
            "-MAP", "-DOC", "-STR",
        ])
    );
}

#[test]
fn json_document() {
    assert_eq!(
        dump(r#"{"a":1,"b":[true,null]}"#),
        events(&[
            "+STR", "+DOC", "+MAP", "=VAL \"a", "=VAL :1", "=VAL \"b", "+SEQ", "=VAL :true",
            "=VAL :null", "-SEQ", "-MAP", "-DOC", "-STR",
        ])
    );
}

#[test]
fn explicit_keys() {
    assert_eq!(
        dump("? a\n: b\n"),
        events(&["+STR", "+DOC", "+MAP", "=VAL :a", "=VAL :b", "-MAP", "-DOC", "-STR"])
    );
}

#[test]
fn documents_and_tags() {
    assert_eq!(
        dump("--- !!str 1\n--- !local\n...\n"),
        events(&[
            "+STR",
            "+DOC",
            "=VAL <!!str> :1",
            "-DOC",
            "+DOC",
            "=VAL <!local> :",
            "-DOC",
            "-STR",
        ])
    );
}

#[test]
fn quoted_scalars_are_strings() {
    let mut parser = Parser::new(b"- '012345'\n- 012345\n- ''\n- \"true\"");
    parser.skip_header().unwrap();
    parser.read_with_verify(ParseEventType::SequenceStart).unwrap();
    assert_eq!(parser.try_get_scalar_as_i32(), None);
    assert_eq!(parser.try_get_scalar_as_str(), Some("012345"));
    parser.read().unwrap();
    assert_eq!(parser.try_get_scalar_as_i32(), Some(12345));
    parser.read().unwrap();
    assert!(!parser.is_null_scalar());
    parser.read().unwrap();
    assert_eq!(parser.try_get_scalar_as_bool(), None);
}

#[test]
fn unicode_content_is_preserved() {
    assert_eq!(
        dump("key: \u{ff12}\u{3000}\u{a0}x\n\u{ff12}: \"\u{3000}\"\n"),
        events(&[
            "+STR",
            "+DOC",
            "+MAP",
            "=VAL :key",
            "=VAL :\u{ff12}\u{3000}\u{a0}x",
            "=VAL :\u{ff12}",
            "=VAL \"\u{3000}",
            "-MAP",
            "-DOC",
            "-STR",
        ])
    );
}

#[test]
fn segmented_input_matches_contiguous() {
    let input = "a: [1, 'two']\nb: |\n  three\n";
    let segments: Vec<&[u8]> = input.as_bytes().chunks(1).collect();
    assert_eq!(
        dump_parser(Parser::from_segments(segments)).unwrap(),
        dump(input)
    );
}

#[test]
fn stripped_marker_hook() {
    let input = "--- !u!1 &1 stripped\na: b\n";
    let options = Options::new().tag_hook(StrippedMarker);
    let parser = Parser::with_options(Input::new(input.as_bytes()), options);
    assert_eq!(
        dump_parser(parser).unwrap(),
        events(&[
            "+STR", "+DOC", "+MAP &1 <!u!1>", "=VAL :a", "=VAL :b", "-MAP", "-DOC", "-STR",
        ])
    );
    assert!(dump_parser(Parser::new(input.as_bytes())).is_err());
}

#[test]
fn malformed_documents() {
    for input in [
        "[ foo\n bar: invalid,",
        "a: b\n c: d",
        "a:\n\tb: c",
        "key: \"unterminated",
        "- a\nb: c",
        "{a: 1",
        "a: @b",
    ] {
        let mut parser = Parser::new(input.as_bytes());
        let result = loop {
            match parser.read() {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        assert!(result.is_err(), "{input:?} should not parse");
    }
}

#[test]
fn error_messages_carry_positions() {
    let err = dump_error("a: 1\n- b\n");
    assert_eq!(
        err.to_string(),
        "2:1: did not find expected key while parsing a block mapping (1:1)"
    );
    assert_eq!(err.mark().line, 1);
}

#[test]
fn malformed_utf8_ends_with_an_error() {
    let err = dump_parser(Parser::new(b"- a\xE3\n- b\n")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "1:4: invalid trailing UTF-8 octet while reading the stream (1:4)"
    );
    assert_eq!(err.mark(), Mark::new(3, 0, 3));

    let err = dump_parser(Parser::new(b"a: b\xE3")).unwrap_err();
    assert_eq!(err.mark(), Mark::new(4, 0, 4));
}

#[test]
fn byte_order_mark_in_content_is_an_error() {
    for input in ["a: b\u{feff}c\n", "a: \"x\u{feff}y\"\n", "- |\n  x\u{feff}\n"] {
        let err = dump_error(input);
        assert!(
            err.to_string()
                .contains("found a byte order mark inside a document"),
            "{input:?}: {err}"
        );
    }
}
