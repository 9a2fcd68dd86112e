use docxml::{attribute, parse, parse_str, Error, ErrorKind, ParseOptions};

fn defaults() -> ParseOptions {
    ParseOptions::default()
}

#[test]
fn entities_decode_in_text() {
    let doc = parse_str("<p>&amp;&lt;&gt;&apos;&quot;&nbsp;&#65;&#x42;</p>", &defaults()).unwrap();
    assert_eq!(doc.root().unwrap().text(), Some("&<>'\"\u{00A0}AB"));
}

#[test]
fn attribute_values_decode_references() {
    let doc = parse_str(
        r#"<a v="x&bogus;y" w="AT&T" z="a & b" n="&#xZZ;" k="&#65;&amp;"/>"#,
        &defaults(),
    )
    .unwrap();
    let a = doc.root().unwrap();
    assert_eq!(a.attribute("v"), Some("x?y"));
    assert_eq!(a.attribute("w"), Some("AT&T"));
    assert_eq!(a.attribute("z"), Some("a & b"));
    assert_eq!(a.attribute("n"), Some("?"));
    assert_eq!(a.attribute("k"), Some("A&"));
}

#[test]
fn unaddressable_block_size_rejected() {
    let opts = ParseOptions::new().arena_block_size(usize::MAX);
    let err = parse(b"<a/>", &opts).unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));
}

#[test]
fn crushed_whitespace_leaves_no_text() {
    let opts = ParseOptions::new().crush_whitespace(true);
    let doc = parse(b"<p>  \n\t </p>", &opts).unwrap();
    assert_eq!(doc.root().unwrap().text(), None);
}

#[test]
fn namespace_prefixes_stripped() {
    let opts = ParseOptions::new().strip_namespace_prefixes(true);
    let doc = parse(br#"<w:p w:val="1"/>"#, &opts).unwrap();
    let p = doc.root().unwrap();
    assert_eq!(p.name(), "p");
    let attrs: Vec<_> = p.attributes().map(|a| (a.name(), a.value())).collect();
    assert_eq!(attrs, vec![("val", "1")]);
}

#[test]
fn stripped_end_tags_still_match() {
    let opts = ParseOptions::new().strip_namespace_prefixes(true);
    let doc = parse(b"<w:body><w:p>x</w:p></w:body>", &opts).unwrap();
    assert_eq!(doc.find_path("/body/p").unwrap().text(), Some("x"));
}

#[test]
fn mismatched_end_tag_rejected() {
    let err = parse_str("<a><b></a>", &defaults()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NestingMismatch));
    assert!(!err.is_fatal());
}

#[test]
fn unterminated_input_rejected() {
    let err = parse_str("<a><b>text", &defaults()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnexpectedEof));
}

#[test]
fn unterminated_constructs_rejected() {
    let cases = [
        ("<a><!-- open</a>", ErrorKind::UnterminatedComment),
        ("<a><![CDATA[ open</a>", ErrorKind::UnterminatedCdata),
        ("<!DOCTYPE x", ErrorKind::UnterminatedDoctype),
        ("<?xml version='1.0'", ErrorKind::UnterminatedPi),
        ("<!ELEMENT a ANY><a/>", ErrorKind::UnknownDeclaration),
        ("< a/>", ErrorKind::WhitespaceAfterOpen),
    ];
    for (input, kind) in cases {
        let err = parse_str(input, &defaults()).unwrap_err();
        assert_eq!(err.kind(), Some(kind), "input {input:?}");
    }
}

#[test]
fn oversized_allocation_is_fatal() {
    let opts = ParseOptions::new().arena_block_size(8);
    let err = parse(b"<a v='0123456789abcdef'/>", &opts).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, Error::Arena(_)));
    assert_eq!(err.kind(), None);
}

#[test]
fn names_interned_once_with_hit_counts() {
    let doc = parse_str(
        "<table><row r='1'/><row r='2'/><row r='3'/><col/></table>",
        &defaults(),
    )
    .unwrap();
    assert_eq!(doc.name_hits("row"), Some(3));
    assert_eq!(doc.name_hits("r"), Some(3));
    assert_eq!(doc.name_hits("table"), Some(1));
    assert_eq!(doc.name_hits("missing"), None);
    assert_eq!(doc.unique_names(), 4);

    let mut rows = doc.root().unwrap().children();
    let first = rows.next().unwrap();
    assert!(rows.all(|r| r.name() != "row" || r.name_id() == first.name_id()));
}

#[test]
fn unfiltered_lookup_matches_find_path() {
    let doc = parse_str(
        "<wb><sheets><sheet n='a'/></sheets><sheets><sheet n='b'/></sheets></wb>",
        &defaults(),
    )
    .unwrap();
    for path in ["/wb/sheets/sheet", "wb/sheets", "/wb/x", "/sheet"] {
        assert_eq!(doc.find_path(path), doc.find_path_filtered(path, None, None));
    }
    let b = doc.find_path_filtered("/wb/sheets/sheet", Some("n"), Some("b"));
    assert_eq!(attribute(b, "n"), Some("b"));
}

#[test]
fn self_closing_elements_are_empty() {
    for crush in [false, true] {
        let opts = ParseOptions::new().crush_whitespace(crush);
        let doc = parse(b"<p>\n  <br/>\n  <br />\n</p>", &opts).unwrap();
        for br in doc.root().unwrap().children() {
            assert_eq!(br.name(), "br");
            assert!(!br.has_children());
            assert_eq!(br.text(), None);
        }
        assert_eq!(doc.root().unwrap().children().count(), 2);
    }
}

#[test]
fn serialize_round_trips_values() {
    let input = r#"<doc title="a &amp; b &lt;c&gt; &quot;q&quot; 'x'"><t>5 &lt; 6 &amp;&amp; 7 &gt; 3</t><e/></doc>"#;
    let opts = ParseOptions::new().crush_whitespace(true);
    let first = parse_str(input, &opts).unwrap();
    let xml = first.to_xml_string();

    let second = parse_str(&xml, &opts).unwrap();
    let (a, b) = (first.root().unwrap(), second.root().unwrap());
    assert_eq!(a.attribute("title"), Some("a & b <c> \"q\" 'x'"));
    assert_eq!(a.attribute("title"), b.attribute("title"));
    // The writer puts text on its own indented line
    let text = second.find_path("/doc/t").and_then(|t| t.text()).map(str::trim);
    assert_eq!(text, Some("5 < 6 && 7 > 3"));
    assert_eq!(second.find_path("/doc/e").map(|e| e.has_children()), Some(false));
}

#[test]
fn bom_and_declaration_skipped() {
    let doc = parse(
        b"\xEF\xBB\xBF<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<w:document/>",
        &defaults(),
    )
    .unwrap();
    assert_eq!(doc.root().unwrap().name(), "w:document");
    assert_eq!(doc.root().unwrap().line(), 2);
}

#[test]
fn invalid_utf8_replaced() {
    let doc = parse(b"<a>bad \xFF byte</a>", &defaults()).unwrap();
    assert_eq!(doc.root().unwrap().text(), Some("bad \u{FFFD} byte"));
}

#[test]
fn release_reports_stats() {
    let doc = parse_str("<a><b>text</b><b x='y'/></a>", &defaults()).unwrap();
    let stats = doc.release();
    assert_eq!(stats.unique_names, 3);
    assert_eq!(stats.interned, 4);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.copied, 2);
}
