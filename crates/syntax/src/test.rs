use crate::{ParseError, TokenKind, ast::*};
use indoc::indoc;

fn parse(source: &str) -> AST {
  crate::parse(source.to_owned())
}
impl AST {
  fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }

  fn is_err(&self) -> bool {
    !self.is_ok()
  }
}

fn parse_to_string(source: &str) -> String {
  let ast = parse(source);
  assert!(ast.is_ok(), "{:?}", ast.errors);
  ast.to_string()
}

fn first_block(ast: &AST) -> &BlockStatement {
  match &ast.body()[0] {
    Node::Block(block) => block,
    node => panic!("expected block, got {}", node.kind()),
  }
}

fn first_element(ast: &AST) -> &ElementNode {
  match &ast.body()[0] {
    Node::Element(element) => element,
    node => panic!("expected element, got {}", node.kind()),
  }
}

#[test]
fn empty_template() {
  assert!(parse("").is_ok());
  assert!(parse("   \n\n  ").is_ok());
  assert_eq!(parse_to_string(""), "Template\n");
}

#[test]
fn text_and_mustache() {
  let ast = parse_to_string("Hello {{name}}!");
  let expected = indoc! {r#"
    Template
    ├─ Text "Hello "
    ├─ Mustache
    │  ╰─ Path (name)
    ╰─ Text "!"
  "#};
  assert_eq!(ast, expected);
}

#[test]
fn element_with_children() {
  let ast = parse_to_string("<p>{{name}}</p>");
  let expected = indoc! {"
    Template
    ╰─ Element <p>
       ╰─ Children
          ╰─ Mustache
             ╰─ Path (name)
  "};
  assert_eq!(ast, expected);
}

#[test]
fn element_tag_items() {
  let ast = parse_to_string(r#"<div class="a {{b}}" id=x disabled {{on "click" go}}></div>"#);
  let expected = indoc! {r#"
    Template
    ╰─ Element <div>
       ├─ Attributes
       │  ├─ Attribute (class)
       │  │  ╰─ Concat
       │  │     ├─ Text "a "
       │  │     ╰─ Mustache
       │  │        ╰─ Path (b)
       │  ├─ Attribute (id)
       │  │  ╰─ Text "x"
       │  ╰─ Attribute (disabled)
       ╰─ Modifiers
          ╰─ Modifier
             ├─ Path (on)
             ╰─ Params
                ├─ String "click"
                ╰─ Path (go)
  "#};
  assert_eq!(ast, expected);
}

#[test]
fn valueless_and_empty_attributes() {
  let ast = parse(r#"<input disabled value="">"#);
  assert!(ast.is_ok());

  let element = first_element(&ast);
  assert!(element.attributes[0].is_valueless());
  assert!(!element.attributes[1].is_valueless());
  assert!(matches!(&element.attributes[1].value, AttrValue::Text(text) if text.chars.is_empty()));
}

#[test]
fn quoted_text_attribute_span_includes_quotes() {
  let source = r#"<a href='x'></a>"#;
  let ast = parse(source);
  let element = first_element(&ast);

  let AttrValue::Text(text) = &element.attributes[0].value else {
    panic!("expected text value");
  };
  assert_eq!(text.chars, "x");
  assert_eq!(text.span.source_text(source), "'x'");
}

#[test]
fn void_elements() {
  let ast = parse(r#"<img src="x">text"#);
  assert!(ast.is_ok());
  assert_eq!(ast.body().len(), 2);

  let element = first_element(&ast);
  assert!(element.is_void());
  assert!(!element.self_closing);
  assert!(element.children.is_empty());

  assert!(parse("<br><BR><hr/>").is_ok());
}

#[test]
fn whitespace_sensitive_elements() {
  let ast = parse("<pre>\n  keep   this\n</pre>");
  let element = first_element(&ast);

  assert!(element.is_whitespace_sensitive());
  assert!(matches!(
    &element.children[..],
    [Node::Text(text)] if text.chars == "\n  keep   this\n"
  ));

  assert!(first_element(&parse("<TextArea></TextArea>")).is_whitespace_sensitive());
  assert!(!first_element(&parse("<p></p>")).is_whitespace_sensitive());
}

#[test]
fn self_closing_elements() {
  let ast = parse_to_string("<Foo @bar={{baz}} />");
  let expected = indoc! {"
    Template
    ╰─ Element <Foo />
       ╰─ Attributes
          ╰─ Attribute (@bar)
             ╰─ Mustache
                ╰─ Path (baz)
  "};
  assert_eq!(ast, expected);
}

#[test]
fn comments() {
  let ast = parse_to_string("<!-- html -->{{! short }}{{!-- long }} --}}");
  let expected = indoc! {r#"
    Template
    ├─ Comment " html "
    ├─ Mustache Comment " short "
    ╰─ Mustache Comment " long }} "
  "#};
  assert_eq!(ast, expected);

  let ast = parse("{{~! strip ~}}{{~!-- dashes --~}}");
  assert!(ast.is_ok());
  let values: Vec<_> = ast
    .body()
    .iter()
    .map(|node| match node {
      Node::MustacheComment(comment) => comment.value.as_str(),
      _ => "",
    })
    .collect();
  assert_eq!(values, [" strip ", " dashes "]);
}

#[test]
fn blocks() {
  let ast = parse_to_string("{{#each items key=\"id\" as |item index|}}{{item}}{{/each}}");
  let expected = indoc! {r#"
    Template
    ╰─ Block (each)
       ├─ Params
       │  ╰─ Path (items)
       ├─ Hash
       │  ╰─ key=
       │     ╰─ String "id"
       ╰─ Program as |item index|
          ╰─ Mustache
             ╰─ Path (item)
  "#};
  assert_eq!(ast, expected);
}

#[test]
fn block_with_else() {
  let ast = parse_to_string("{{#if a}}A{{else}}B{{/if}}");
  let expected = indoc! {r#"
    Template
    ╰─ Block (if)
       ├─ Params
       │  ╰─ Path (a)
       ├─ Program
       │  ╰─ Text "A"
       ╰─ Inverse
          ╰─ Text "B"
  "#};
  assert_eq!(ast, expected);

  let caret = parse_to_string("{{#if a}}A{{^}}B{{/if}}");
  assert_eq!(caret, expected);
}

#[test]
fn else_chain() {
  let ast = parse_to_string("{{#if a}}A{{else if b}}B{{else}}C{{/if}}");
  let expected = indoc! {r#"
    Template
    ╰─ Block (if)
       ├─ Params
       │  ╰─ Path (a)
       ├─ Program
       │  ╰─ Text "A"
       ╰─ Inverse
          ╰─ Block (if)
             ├─ Params
             │  ╰─ Path (b)
             ├─ Program
             │  ╰─ Text "B"
             ╰─ Inverse
                ╰─ Text "C"
  "#};
  assert_eq!(ast, expected);
}

#[test]
fn strip_flags() {
  let ast = parse("{{~#if x~}} y {{~else~}} z {{~/if~}}");
  assert!(ast.is_ok());

  let block = first_block(&ast);
  let both = StripFlags {
    open: true,
    close: true,
  };
  assert_eq!(block.open_strip, both);
  assert_eq!(block.inverse_strip, both);
  assert_eq!(block.close_strip, both);

  let ast = parse("{{~name}}{{{~html~}}}");
  assert!(ast.is_ok());
  let Node::Mustache(mustache) = &ast.body()[0] else {
    panic!("expected mustache");
  };
  assert_eq!(
    mustache.strip,
    StripFlags {
      open: true,
      close: false
    }
  );
  let Node::Mustache(triple) = &ast.body()[1] else {
    panic!("expected mustache");
  };
  assert!(triple.trusting);
  assert_eq!(triple.strip, both);
}

#[test]
fn expressions() {
  let ast = parse_to_string(
    r#"{{helper 1 -2.5 "s" 'q' true false null undefined (sub a key=b) key=value}}"#,
  );
  let expected = indoc! {r#"
    Template
    ╰─ Mustache
       ├─ Path (helper)
       ├─ Params
       │  ├─ Number (1)
       │  ├─ Number (-2.5)
       │  ├─ String "s"
       │  ├─ String "q"
       │  ├─ Boolean (true)
       │  ├─ Boolean (false)
       │  ├─ Null
       │  ├─ Undefined
       │  ╰─ Sub Expression
       │     ├─ Path (sub)
       │     ├─ Params
       │     │  ╰─ Path (a)
       │     ╰─ Hash
       │        ╰─ key=
       │           ╰─ Path (b)
       ╰─ Hash
          ╰─ key=
             ╰─ Path (value)
  "#};
  assert_eq!(ast, expected);
}

#[test]
fn string_escapes() {
  let ast = parse(r#"{{t "say \"hi\"" 'it\'s'}}"#);
  assert!(ast.is_ok());

  let Node::Mustache(mustache) = &ast.body()[0] else {
    panic!("expected mustache");
  };
  let values: Vec<_> = mustache
    .params
    .iter()
    .map(|param| match param {
      Expression::String(string) => string.value.as_str(),
      _ => "",
    })
    .collect();
  assert_eq!(values, [r#"say "hi""#, "it's"]);
}

#[test]
fn paths() {
  let path = |source: &str| {
    let ast = parse(source);
    assert!(ast.is_ok(), "{:?}", ast.errors);
    match &ast.body()[0] {
      Node::Mustache(MustacheStatement {
        path: Expression::Path(path),
        ..
      }) => path.clone(),
      _ => panic!("expected path"),
    }
  };

  let simple = path("{{this.name}}");
  assert_eq!(simple.original, "this.name");
  assert_eq!(simple.parts.as_slice(), ["this", "name"]);
  assert_eq!(simple.head(), "this");

  let parent = path("{{../parent/name}}");
  assert_eq!(parent.original, "../parent/name");
  assert_eq!(parent.parts.as_slice(), ["parent", "name"]);

  let data = path("{{@index}}");
  assert_eq!(data.parts.as_slice(), ["@index"]);

  let literal = path("{{foo.[bar baz]}}");
  assert_eq!(literal.original, "foo.[bar baz]");
  assert_eq!(literal.parts.as_slice(), ["foo", "bar baz"]);

  let dashed = path("{{my-component}}");
  assert_eq!(dashed.original, "my-component");
}

#[test]
fn escaped_delimiter() {
  let ast = parse(r"\{{name}} and {{value}}");
  assert!(ast.is_ok());

  let Node::Text(text) = &ast.body()[0] else {
    panic!("expected text");
  };
  assert_eq!(text.chars, "{{name}} and ");
  assert_eq!(ast.body().len(), 2);
}

#[test]
fn text_with_angle_brackets() {
  let ast = parse("a < b > c <!DOCTYPE html>");
  assert!(ast.is_ok());
  assert_eq!(ast.body().len(), 1);
}

mod normalize {
  use super::*;
  use crate::parse_unnormalized;

  #[test]
  fn partial_becomes_verbatim() {
    let source = r#"<p>{{> header title="x"}}</p>"#;

    let ast = parse_unnormalized(source.to_owned());
    assert!(matches!(first_element(&ast).children[0], Node::Partial(_)));

    let ast = parse(source);
    assert!(ast.is_ok());
    let Node::Verbatim(verbatim) = &first_element(&ast).children[0] else {
      panic!("expected verbatim");
    };
    assert_eq!(verbatim.text, r#"{{> header title="x"}}"#);
  }

  #[test]
  fn partial_block_becomes_block() {
    let source = "{{#> layout title=t}}body{{/layout}}";

    let ast = parse_unnormalized(source.to_owned());
    assert!(matches!(ast.body()[0], Node::PartialBlock(_)));

    let ast = parse(source);
    assert!(ast.is_ok());
    let block = first_block(&ast);
    assert_eq!(block.kind, BlockKind::Partial);
    assert_eq!(block.path.original, "layout");
    assert_eq!(block.hash.pairs.len(), 1);
    assert!(block.inverse.is_none());

    let expected = indoc! {r#"
      Template
      ╰─ Partial Block (layout)
         ├─ Hash
         │  ╰─ title=
         │     ╰─ Path (t)
         ╰─ Program
            ╰─ Text "body"
    "#};
    assert_eq!(ast.to_string(), expected);
  }

  #[test]
  fn block_in_attribute_value() {
    let source = r#"<div class="x {{#if a}}b{{/if}}"></div>"#;

    let ast = parse_unnormalized(source.to_owned());
    let AttrValue::Concat(concat) = &first_element(&ast).attributes[0].value else {
      panic!("expected concat");
    };
    assert!(matches!(&concat.parts[1], ConcatPart::Gap(gap) if gap.kind == GapKind::Block));

    let ast = parse(source);
    assert!(ast.is_ok());
    let AttrValue::Concat(concat) = &first_element(&ast).attributes[0].value else {
      panic!("expected concat");
    };
    assert_eq!(concat.parts.len(), 2);
    let ConcatPart::Verbatim(verbatim) = &concat.parts[1] else {
      panic!("expected verbatim");
    };
    assert_eq!(verbatim.text, "{{#if a}}b{{/if}}");
  }

  #[test]
  fn nested_block_in_attribute_value() {
    let source = r#"<div class="{{#if a}}{{#if b}}c{{/if}}{{/if}} d"></div>"#;
    let ast = parse(source);
    assert!(ast.is_ok());

    let AttrValue::Concat(concat) = &first_element(&ast).attributes[0].value else {
      panic!("expected concat");
    };
    let ConcatPart::Verbatim(verbatim) = &concat.parts[0] else {
      panic!("expected verbatim");
    };
    assert_eq!(verbatim.text, "{{#if a}}{{#if b}}c{{/if}}{{/if}}");
    assert!(matches!(&concat.parts[1], ConcatPart::Text(text) if text.chars == " d"));
  }

  #[test]
  fn block_in_tag() {
    let source = r#"<input {{#if a}}disabled{{/if}} type="text">"#;
    let ast = parse(source);
    assert!(ast.is_ok());

    let element = first_element(&ast);
    assert_eq!(element.attributes.len(), 1);
    let TagComment::Verbatim(verbatim) = &element.comments[0] else {
      panic!("expected verbatim");
    };
    assert_eq!(verbatim.text, "{{#if a}}disabled{{/if}}");
    assert!(verbatim.span.start < element.attributes[0].span.start);
  }

  #[test]
  fn printable_nodes_are_unchanged() {
    let source = "<p class={{a}}>{{#if b}}{{c}}{{else}}<!-- d -->{{/if}}</p>";
    let unnormalized = parse_unnormalized(source.to_owned());
    let normalized = parse(source);

    assert_eq!(unnormalized.template, normalized.template);
  }
}

mod errors {
  use super::*;

  fn errors(source: &str) -> Vec<ParseError> {
    parse(source).errors
  }

  #[test]
  fn unterminated() {
    assert!(matches!(errors("{{name")[..], [ParseError::UnterminatedMustache(_)]));
    assert!(matches!(errors("{{! comment")[..], [ParseError::UnterminatedComment(_)]));
    assert!(matches!(errors("<!-- comment")[..], [ParseError::UnterminatedComment(_)]));
    assert!(matches!(errors("{{a \"b}}")[..], [ParseError::UnterminatedString(_), ..]));
    assert!(matches!(
      errors("<a href=\"x></a>")[..],
      [ParseError::UnterminatedAttributeValue(_), ..]
    ));
  }

  #[test]
  fn unclosed() {
    assert!(matches!(
      &errors("<div>")[..],
      [ParseError::UnclosedElement { tag, .. }] if tag == "div"
    ));
    assert!(matches!(
      &errors("{{#if a}}")[..],
      [ParseError::UnclosedBlock { path, .. }] if path == "if"
    ));
  }

  #[test]
  fn mismatched() {
    assert!(matches!(
      &errors("{{#if a}}{{/each}}")[..],
      [ParseError::MismatchedBlockClose { expected, found, .. }] if expected == "if" && found == "each"
    ));
    assert!(matches!(
      &errors("<div><span></div>")[..],
      [ParseError::MismatchedClosingTag { expected, found, .. }] if expected == "span" && found == "div"
    ));
  }

  #[test]
  fn unexpected() {
    assert!(matches!(errors("</div>")[..], [ParseError::UnexpectedClosingTag { .. }]));
    assert!(matches!(errors("{{/if}}")[..], [ParseError::UnexpectedBlockClose { .. }]));
    assert!(matches!(errors("a {{else}} b")[..], [ParseError::UnexpectedElse(_)]));
    assert!(matches!(
      errors("{{#if a}}{{else}}{{else}}{{/if}}")[..],
      [ParseError::UnexpectedElse(_)]
    ));
  }

  #[test]
  fn unsupported() {
    assert!(matches!(
      errors("{{#*inline \"x\"}}{{/inline}}")[..],
      [ParseError::UnsupportedSyntax { construct: "decorator", .. }, ..]
    ));
    assert!(matches!(
      errors("{{^items}}none{{/items}}")[..],
      [ParseError::UnsupportedSyntax { construct: "inverse section", .. }, ..]
    ));
  }

  #[test]
  fn block_element_interleaving_recovers() {
    let ast = parse("{{#if a}}<div>{{/if}}</div><p>ok</p>");
    assert!(ast.is_err());
    assert!(
      ast
        .body()
        .iter()
        .any(|node| matches!(node, Node::Element(element) if element.tag == "p"))
    );
  }

  #[test]
  fn arguments() {
    assert!(matches!(errors("{{a key=b c}}")[..], [ParseError::PositionalAfterNamed(_)]));
    assert!(matches!(errors("{{a as |b|}}")[..], [ParseError::UnexpectedBlockParams(_)]));
    assert!(matches!(errors("{{a ; b}}")[..], [ParseError::UnknownCharacter(_)]));
  }

  #[test]
  fn messages() {
    let error = &errors("{{#if a}}{{/each}}")[0];
    assert_eq!(error.title(), "Mismatched Block Close");
    assert_eq!(error.message(), "expected `{{/if}}` but found `{{/each}}`");
    assert_eq!(error.to_string(), error.message());
  }
}

#[test]
fn tokens() {
  let kinds: Vec<_> = crate::tokenise(r#"{{a.b c="d" (e) ~}}"#, 2)
    .map(|token| token.kind)
    .collect();

  assert_eq!(
    kinds,
    [
      TokenKind::Path,
      TokenKind::Path,
      TokenKind::Equal,
      TokenKind::String,
      TokenKind::LeftParen,
      TokenKind::Path,
      TokenKind::RightParen,
      TokenKind::Tilde,
      TokenKind::Close,
    ]
  );
}

#[test]
fn multibyte_utf8_characters() {
  let source = "<p title=\"é\">héllo 🌈 {{ñame}}</p>";
  let ast = parse(source);
  assert!(ast.is_ok());

  let element = first_element(&ast);
  let Node::Text(text) = &element.children[0] else {
    panic!("expected text");
  };
  assert_eq!(text.chars, "héllo 🌈 ");
  assert_eq!(text.span.source_text(source), "héllo 🌈 ");

  let source = "{{a ; b}}";
  let error_span = parse(source).errors[0].span();
  assert_eq!(error_span.source_text(source), ";");
}

#[test]
fn line_index() {
  let ast = parse("<p>\n  {{a}}\n</p>");
  let index = ast.line_index();

  let Node::Text(text) = &first_element(&ast).children[0] else {
    panic!("expected text");
  };
  assert_eq!(index.line(text.span), 1);
  assert_eq!(index.final_line(text.span), 2);

  let Node::Mustache(mustache) = &first_element(&ast).children[1] else {
    panic!("expected mustache");
  };
  assert_eq!(index.line(mustache.span), 2);
  assert_eq!(index.column(mustache.span), 3);
}
