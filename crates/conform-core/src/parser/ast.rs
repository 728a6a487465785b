//! Declaration AST - parsed structure of a declaration file
//!
//! Member bodies are parsed straight into the model types; the AST only
//! adds what lowering and error reporting need on top: declaration kind,
//! `@implements` attachments, and source spans for names.

use crate::model::{MemberBody, MemberDecl, TypeDecl, CONTRACT};

use super::tokenizer::Span;

/// A value with its source position
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedValue<T> {
    pub value: T,
    pub span: Span,
}

impl<T> SpannedValue<T> {
    pub fn new(value: T, span: Span) -> Self {
        SpannedValue { value, span }
    }
}

/// Whether a declaration introduces a contract or an ordinary type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Contract,
    Type,
}

/// A whole declaration file
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleNode {
    pub declarations: Vec<DeclarationNode>,
}

/// `contract Name: Bases { ... }` or `type Name: Bases { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationNode {
    pub kind: DeclarationKind,
    pub name: SpannedValue<String>,
    pub bases: Vec<SpannedValue<String>>,
    /// Contracts named in `@implements(...)`, in source order
    pub implements: Vec<SpannedValue<String>>,
    pub members: Vec<MemberNode>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberNode {
    pub name: SpannedValue<String>,
    pub body: MemberBody,
    pub span: Span,
}

impl DeclarationNode {
    /// Lower to a model declaration
    ///
    /// Contracts always derive from the `Contract` marker; it is appended
    /// after the written bases unless already listed.
    pub fn to_type_decl(&self) -> TypeDecl {
        let mut bases: Vec<String> = self.bases.iter().map(|b| b.value.clone()).collect();
        if self.kind == DeclarationKind::Contract && !bases.iter().any(|b| b == CONTRACT) {
            bases.push(CONTRACT.to_string());
        }
        TypeDecl {
            name: self.name.value.clone(),
            bases,
            members: self
                .members
                .iter()
                .map(|m| MemberDecl {
                    name: m.name.value.clone(),
                    body: m.body.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeDecl, FunctionDecl};

    fn dummy_span() -> Span {
        Span { line: 0, column: 0, offset: 0 }
    }

    fn node(kind: DeclarationKind, bases: &[&str]) -> DeclarationNode {
        DeclarationNode {
            kind,
            name: SpannedValue::new("Thing".to_string(), dummy_span()),
            bases: bases
                .iter()
                .map(|b| SpannedValue::new(b.to_string(), dummy_span()))
                .collect(),
            implements: vec![],
            members: vec![
                MemberNode {
                    name: SpannedValue::new("run".to_string(), dummy_span()),
                    body: MemberBody::Function(FunctionDecl::method()),
                    span: dummy_span(),
                },
                MemberNode {
                    name: SpannedValue::new("size".to_string(), dummy_span()),
                    body: MemberBody::Attribute(AttributeDecl::default()),
                    span: dummy_span(),
                },
            ],
            span: dummy_span(),
        }
    }

    #[test]
    fn test_contract_gains_marker_base() {
        let decl = node(DeclarationKind::Contract, &["Base"]).to_type_decl();
        assert_eq!(decl.bases, vec!["Base".to_string(), CONTRACT.to_string()]);
        assert_eq!(decl.members.len(), 2);
    }

    #[test]
    fn test_marker_not_duplicated() {
        let decl = node(DeclarationKind::Contract, &[CONTRACT]).to_type_decl();
        assert_eq!(decl.bases, vec![CONTRACT.to_string()]);
    }

    #[test]
    fn test_type_keeps_bases() {
        let decl = node(DeclarationKind::Type, &["Animal"]).to_type_decl();
        assert_eq!(decl.bases, vec!["Animal".to_string()]);
        assert_eq!(decl.members[0].name, "run");
    }
}
