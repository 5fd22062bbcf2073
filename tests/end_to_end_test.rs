//! End-to-end tests against the public API
//!
//! Inputs resemble what browsers and editors put on the clipboard.

use link_formatter::{
    FormatOptions, Formatter, MarkupScope, PlainTextRenderer, format_markup, parse_markup,
};

const ARTICLE: &str = r##"<meta charset="utf-8"><h1 style="font-size: 2em">Why Links Matter</h1>
<p>Plain-text platforms drop <a href="https://example.com/a" rel="noopener">hyperlinks</a> entirely.<sup><a class="footnote-ref" rel="footnote" href="#fn1">1</a></sup></p>
<p>Readers still want <a href="https://example.com/b">sources</a>.<br>Numbered markers keep them.</p>
<h2>Notes</h2>
<p>See also <a href="https://example.com/c">the appendix</a>.<sup><a class="footnote-ref" href="#fn2">2</a></sup></p>"##;

#[test]
fn test_article_plain_text() {
    let output = format_markup(ARTICLE).expect("format");

    assert_eq!(
        output.plain_text,
        "𝗪𝗵𝘆 𝗟𝗶𝗻𝗸𝘀 𝗠𝗮𝘁𝘁𝗲𝗿\n\n\
         Plain-text platforms drop hyperlinks[1] entirely.[2]\n\n\
         Readers still want sources[3].\nNumbered markers keep them.\n\n\
         𝗡𝗼𝘁𝗲𝘀\n\n\
         See also the appendix[4].[5]"
    );

    let references: Vec<(usize, &str)> = output.references.iter().collect();
    assert_eq!(
        references,
        vec![
            (1, "hyperlinks"),
            (2, "1"),
            (3, "sources"),
            (4, "the appendix"),
            (5, "2"),
        ]
    );
}

#[test]
fn test_article_compact_text() {
    let output = format_markup(ARTICLE).expect("format");

    assert_eq!(
        output.compact_text,
        "𝗪𝗵𝘆 𝗟𝗶𝗻𝗸𝘀 𝗠𝗮𝘁𝘁𝗲𝗿\n\
         Plain-text platforms drop hyperlinks[1] entirely.[2]\n\
         Readers still want sources[3].\nNumbered markers keep them.\n\
         𝗡𝗼𝘁𝗲𝘀\n\
         See also the appendix[4].[5]"
    );
}

#[test]
fn test_article_markup() {
    let formatter = Formatter::with_options(FormatOptions {
        markup_scope: MarkupScope::Body,
        ..Default::default()
    });
    let output = formatter.format(ARTICLE).expect("format");

    assert!(!output.markup.contains("<sup"));
    assert!(!output.markup.contains("<meta"));
    assert!(!output.markup.contains("style="));
    assert!(output.markup.contains(r##"<span><a href="#fn1">[1]</a></span>"##));
    assert!(output.markup.contains(r##"<span><a href="#fn2">[2]</a></span>"##));
    assert!(
        output
            .markup
            .contains(r#"<a href="https://example.com/a" rel="noopener">hyperlinks</a>"#),
        "links outside footnotes keep their attributes"
    );
    assert!(output.markup.starts_with("<h1>Why Links Matter</h1>"));
}

#[test]
fn test_plain_text_input_passes_through() {
    let output = format_markup("Nothing but words here.").expect("format");
    assert_eq!(output.plain_text, "Nothing but words here.");
    assert_eq!(output.compact_text, "Nothing but words here.");
    assert!(output.references.is_empty());
}

#[test]
fn test_whitespace_only_input() {
    let output = format_markup("   \n\n\n  ").expect("format");
    assert_eq!(output.plain_text, "");
    assert_eq!(output.compact_text, "");
}

#[test]
fn test_malformed_markup_is_tolerated() {
    let output = format_markup("<p>Unclosed <a href=\"/x\">link<p>next <sup>3").expect("format");
    assert!(output.plain_text.contains("Unclosed link"));
    assert!(output.plain_text.ends_with("[3]"), "{}", output.plain_text);
    assert!(!output.markup.contains("<sup"));
}

#[test]
fn test_template_contents_survive_in_markup() {
    let output =
        format_markup("<template><p>keep me<sup>1</sup></p></template><p>x</p>").expect("format");

    assert_eq!(output.plain_text, "x");
    assert_eq!(
        output.markup,
        "<html><head><template><p>keep me<span>1</span></p></template></head><body><p>x</p></body></html>"
    );
}

#[test]
fn test_outputs_do_not_depend_on_each_other() {
    let input = r##"<p>a<sup><a class="x" href="#f">1</a></sup></p>"##;
    let output = format_markup(input).expect("format");

    let rendered_alone = PlainTextRenderer::new().render(&parse_markup(input));
    assert_eq!(output.plain_text, rendered_alone.text);
    assert_eq!(output.references, rendered_alone.references);

    // The brackets added by the rewriter never reach the plain text.
    assert_eq!(output.plain_text, "a[1]");
    assert_eq!(output.references.get(1), Some("1"));
}

#[test]
fn test_reference_list_option() {
    let formatter = Formatter::with_options(FormatOptions {
        append_reference_list: true,
        ..Default::default()
    });
    let output = formatter.format(ARTICLE).expect("format");

    assert!(output.plain_text.ends_with(
        "References:\n[1] hyperlinks\n[2] 1\n[3] sources\n[4] the appendix\n[5] 2"
    ));
    assert!(!output.compact_text.contains("\n\n"));
}

#[test]
fn test_bytes_with_meta_declared_charset() {
    let input = b"<meta charset=\"windows-1252\"><p>\x93quoted\x94 <a href=\"/q\">source</a></p>";
    let output = Formatter::new().format_bytes(input, None).expect("format");
    assert_eq!(output.plain_text, "\u{201C}quoted\u{201D} source[1]");
}

#[test]
fn test_bytes_with_unknown_charset_label() {
    let err = Formatter::new()
        .format_bytes(b"<p>x</p>", Some("text/html; charset=not-a-charset"))
        .expect_err("unknown label");
    assert!(err.is_uninterpretable_input());
    assert!(err.to_string().starts_with("Could not interpret input"));
}
