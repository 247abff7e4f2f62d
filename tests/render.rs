mod helpers;

use pretty_assertions::assert_eq;

use hamlet::{Engine, Format, Options, Program, Sigil, TokenKind};

use helpers::{Stream, StreamBuilder, Writer};

fn render(source: &str, stream: Stream) -> Writer {
    render_with(Options::default(), source, stream)
}

fn render_with(options: Options, source: &str, stream: Stream) -> Writer {
    let program: Program = Engine::new(options).compile(source, stream).unwrap();
    let mut writer = Writer::default();
    program.execute(&mut writer).unwrap();
    writer
}

#[test]
fn render_tag_with_selectors_and_value() {
    let stream = StreamBuilder::new()
        .tok(TokenKind::TagName("div".to_owned()))
        .tok(TokenKind::Class("foo".to_owned()))
        .tok(TokenKind::Id("bar".to_owned()))
        .tok(TokenKind::Value("Hello".to_owned()))
        .build();
    let writer = render("%div.foo#bar Hello", stream);
    assert_eq!(writer.out, "<div id=\"bar\" class=\"foo\">Hello</div>");
}

#[test]
fn render_escaped_script() {
    let stream = StreamBuilder::new()
        .tok(TokenKind::Script {
            sigil: Sigil::AmpEq,
            code: "1 < 2".to_owned(),
        })
        .build();
    let writer = render("&= 1 < 2", stream);
    assert_eq!(writer.out, "1 &lt; 2");
}

#[test]
fn render_preserved_script() {
    let stream = StreamBuilder::new()
        .tok(TokenKind::Script {
            sigil: Sigil::Tilde,
            code: "a\nb".to_owned(),
        })
        .build();
    let writer = render("~ a\nb", stream);
    assert_eq!(writer.out, "a&#x000A;b");
}

#[test]
fn render_inline_expression() {
    let stream = StreamBuilder::new()
        .tok(TokenKind::Value("a @{x} b".to_owned()))
        .build();
    let writer = render("a @{x} b", stream);
    assert_eq!(writer.out, "a x b");
}

#[test]
fn render_silent_script_records_statements() {
    let stream = StreamBuilder::new()
        .tok(TokenKind::SilentScript("for item in items:".to_owned()))
        .newline()
        .depth(1)
        .tok(TokenKind::Value("hi".to_owned()))
        .build();
    let writer = render("- for item in items:\n  hi", stream);
    assert_eq!(writer.statements, vec![("for item in items:".to_owned(), 0)]);
    assert_eq!(writer.out, "hi");
}

#[test]
fn render_self_closing_tag_xhtml() {
    let options = Options {
        format: Format::Xhtml,
        ..Options::default()
    };
    let stream = StreamBuilder::new()
        .tok(TokenKind::TagName("br".to_owned()))
        .build();
    let writer = render_with(options, "%br", stream);
    assert_eq!(writer.out, "<br/>");
}

#[test]
fn render_comment() {
    let stream = StreamBuilder::new()
        .tok(TokenKind::Comment)
        .tok(TokenKind::Value("hi".to_owned()))
        .build();
    let writer = render("/ hi", stream);
    assert_eq!(writer.out, "<!-- hi -->");
}

#[test]
fn render_nested_structure() {
    let stream = StreamBuilder::new()
        .tok(TokenKind::TagName("ul".to_owned()))
        .newline()
        .depth(1)
        .tok(TokenKind::TagName("li".to_owned()))
        .tok(TokenKind::Value("one".to_owned()))
        .newline()
        .tok(TokenKind::TagName("li".to_owned()))
        .tok(TokenKind::Value("two".to_owned()))
        .build();
    let writer = render("%ul\n  %li one\n  %li two", stream);
    assert_eq!(writer.out, "<ul><li>one</li><li>two</li></ul>");
}
