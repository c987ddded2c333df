//! # Normalize
//!
//! Rewrites the constructs which can only be expressed as source text into nodes
//! which can be printed: partials become [`Verbatim`] text, partial blocks become
//! [`BlockStatement`]s of kind [`BlockKind::Partial`], and blocks or partials
//! found inside tags become verbatim tag items or attribute value parts.
//!
//! After normalization, no [`Node::Partial`], [`Node::PartialBlock`],
//! [`TagComment::Gap`], or [`ConcatPart::Gap`] remains in the tree.

use crate::ast::{
  AST, AttrNode, AttrValue, BlockKind, BlockStatement, ConcatPart, ConcatStatement, ElementNode,
  Node, Program, StripFlags, TagComment, Verbatim,
};
use thin_vec::ThinVec;

/// Rewrite an AST so that every node can be printed
pub fn normalize(mut ast: AST) -> AST {
  let template = std::mem::take(&mut ast.template);
  let normalizer = Normalizer {
    source: &ast.source,
  };

  let body = normalizer.nodes(template.body);
  ast.template.body = body;
  ast.template.span = template.span;
  ast
}

struct Normalizer<'source> {
  source: &'source str,
}
impl Normalizer<'_> {
  fn nodes(&self, nodes: ThinVec<Node>) -> ThinVec<Node> {
    nodes.into_iter().map(|node| self.node(node)).collect()
  }

  fn program(&self, program: Program) -> Program {
    Program {
      body: self.nodes(program.body),
      ..program
    }
  }

  fn node(&self, node: Node) -> Node {
    match node {
      Node::Partial(partial) => {
        let text = partial.span.source_text(self.source).to_owned();
        log::debug!("normalized partial `{text}` into verbatim text");

        Node::Verbatim(Verbatim {
          text,
          span: partial.span,
        })
      }
      Node::PartialBlock(partial_block) => {
        log::debug!(
          "normalized partial block `{}` into a block",
          partial_block.name.original
        );

        Node::Block(BlockStatement {
          kind: BlockKind::Partial,
          path: partial_block.name,
          params: partial_block.params,
          hash: partial_block.hash,
          program: self.program(partial_block.program),
          inverse: None,
          open_strip: partial_block.open_strip,
          inverse_strip: StripFlags::default(),
          close_strip: partial_block.close_strip,
          span: partial_block.span,
        })
      }
      Node::Block(block) => Node::Block(BlockStatement {
        program: self.program(block.program),
        inverse: block.inverse.map(|inverse| self.program(inverse)),
        ..block
      }),
      Node::Element(element) => Node::Element(self.element(element)),
      node @ (Node::Text(_)
      | Node::Mustache(_)
      | Node::Comment(_)
      | Node::MustacheComment(_)
      | Node::Verbatim(_)) => node,
    }
  }

  fn element(&self, element: ElementNode) -> ElementNode {
    let comments = element
      .comments
      .into_iter()
      .map(|comment| match comment {
        TagComment::Gap(gap) => {
          log::debug!("normalized {:?} in tag `{}` into verbatim text", gap.kind, element.tag);
          TagComment::Verbatim(Verbatim {
            text: gap.text,
            span: gap.span,
          })
        }
        comment @ (TagComment::Comment(_) | TagComment::Verbatim(_)) => comment,
      })
      .collect();

    let attributes = element.attributes.into_iter().map(attribute).collect();

    ElementNode {
      comments,
      attributes,
      children: self.nodes(element.children),
      ..element
    }
  }
}

fn attribute(attribute: AttrNode) -> AttrNode {
  let concat = match attribute.value {
    AttrValue::Concat(concat) => concat,
    value @ (AttrValue::Text(_) | AttrValue::Mustache(_)) => return AttrNode { value, ..attribute },
  };

  let parts = concat
    .parts
    .into_iter()
    .map(|part| match part {
      ConcatPart::Gap(gap) => {
        log::debug!(
          "normalized {:?} in attribute `{}` into verbatim text",
          gap.kind,
          attribute.name
        );
        ConcatPart::Verbatim(Verbatim {
          text: gap.text,
          span: gap.span,
        })
      }
      part @ (ConcatPart::Text(_) | ConcatPart::Mustache(_) | ConcatPart::Verbatim(_)) => part,
    })
    .collect();

  AttrNode {
    value: AttrValue::Concat(ConcatStatement {
      parts,
      span: concat.span,
    }),
    ..attribute
  }
}
