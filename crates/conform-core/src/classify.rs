//! Member classifier - what each visible member of a type is
//!
//! Lookup walks a type's ancestor chain and keeps the first definition of
//! every name, exactly as attribute lookup on an instance would. Each member
//! is then tagged as a callable (with its invocation kind and normalized
//! signature), an accessor, or a plain attribute.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::hierarchy::TypeRegistry;
use crate::model::{AccessorDecl, Binding, Flavor, FunctionDecl, MemberBody, MemberDecl};
use crate::signature::Signature;
use crate::Result;

/// Invocation protocol of a callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallableKind {
    Plain,
    ClassBound,
    Static,
    Coroutine,
    Generator,
    AsyncGenerator,
}

impl fmt::Display for CallableKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CallableKind::Plain => write!(f, "method"),
            CallableKind::ClassBound => write!(f, "classmethod"),
            CallableKind::Static => write!(f, "staticmethod"),
            CallableKind::Coroutine => write!(f, "coroutine method"),
            CallableKind::Generator => write!(f, "generator method"),
            CallableKind::AsyncGenerator => write!(f, "async generator method"),
        }
    }
}

/// Kind of a callable, resolved by priority
///
/// static, then class-bound, then async generator, generator, coroutine,
/// and finally plain. Binding is read through the wrapper chain; flavor comes
/// from the innermost function.
pub fn callable_kind(function: &FunctionDecl) -> CallableKind {
    match function.effective_binding() {
        Binding::Static => return CallableKind::Static,
        Binding::Class => return CallableKind::ClassBound,
        Binding::Instance => {}
    }
    match function.innermost().flavor {
        Flavor::AsyncGenerator => CallableKind::AsyncGenerator,
        Flavor::Generator => CallableKind::Generator,
        Flavor::Coroutine => CallableKind::Coroutine,
        Flavor::Sync => CallableKind::Plain,
    }
}

/// The three independent capabilities of an accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Read,
    Write,
    Delete,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Read, Capability::Write, Capability::Delete];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Capability::Read => write!(f, "getter"),
            Capability::Write => write!(f, "setter"),
            Capability::Delete => write!(f, "deleter"),
        }
    }
}

/// One present capability of an accessor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessorPart {
    pub kind: CallableKind,
    pub signature: Signature,
}

impl AccessorPart {
    fn of(function: &FunctionDecl) -> Self {
        AccessorPart {
            kind: callable_kind(function),
            signature: Signature::of(function),
        }
    }
}

/// Classification of a single member
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum MemberDescriptor {
    Callable {
        kind: CallableKind,
        signature: Signature,
    },
    Accessor {
        getter: Option<AccessorPart>,
        setter: Option<AccessorPart>,
        deleter: Option<AccessorPart>,
    },
    Attribute {
        name: String,
    },
}

impl MemberDescriptor {
    pub fn part(&self, capability: Capability) -> Option<&AccessorPart> {
        match self {
            MemberDescriptor::Accessor {
                getter,
                setter,
                deleter,
            } => match capability {
                Capability::Read => getter.as_ref(),
                Capability::Write => setter.as_ref(),
                Capability::Delete => deleter.as_ref(),
            },
            _ => None,
        }
    }

    /// Short human description, e.g. `staticmethod` or `accessor`
    pub fn describe(&self) -> String {
        match self {
            MemberDescriptor::Callable { kind, .. } => kind.to_string(),
            MemberDescriptor::Accessor { .. } => "accessor".to_string(),
            MemberDescriptor::Attribute { .. } => "attribute".to_string(),
        }
    }
}

/// A visible member, tagged with the type that declares it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedMember {
    pub name: String,
    pub owner: String,
    pub descriptor: MemberDescriptor,
}

/// Classify one declared member on its own
pub fn classify_member(member: &MemberDecl) -> MemberDescriptor {
    match &member.body {
        MemberBody::Function(function) => MemberDescriptor::Callable {
            kind: callable_kind(function),
            signature: Signature::of(function),
        },
        MemberBody::Accessor(accessor) => classify_accessor(accessor),
        MemberBody::Attribute(_) => MemberDescriptor::Attribute {
            name: member.name.clone(),
        },
    }
}

fn classify_accessor(accessor: &AccessorDecl) -> MemberDescriptor {
    MemberDescriptor::Accessor {
        getter: accessor.getter.as_ref().map(AccessorPart::of),
        setter: accessor.setter.as_ref().map(AccessorPart::of),
        deleter: accessor.deleter.as_ref().map(AccessorPart::of),
    }
}

/// Every member visible on `type_name`, keyed by name
///
/// Own members shadow inherited ones; among ancestors the first along the
/// chain wins. The universal root contributes nothing.
pub fn members(registry: &TypeRegistry, type_name: &str) -> Result<BTreeMap<String, ClassifiedMember>> {
    let mut visible = BTreeMap::new();
    for ancestor in registry.ancestors(type_name)? {
        let decl = registry.get(ancestor)?;
        for member in &decl.members {
            visible
                .entry(member.name.clone())
                .or_insert_with(|| ClassifiedMember {
                    name: member.name.clone(),
                    owner: decl.name.clone(),
                    descriptor: classify_member(member),
                });
        }
    }
    Ok(visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttributeDecl, TypeDecl};
    use crate::signature::ParameterSpec;

    #[test]
    fn test_kind_priority() {
        let cases = [
            (FunctionDecl::method(), CallableKind::Plain),
            (FunctionDecl::class_method(), CallableKind::ClassBound),
            (FunctionDecl::static_method(), CallableKind::Static),
            (FunctionDecl::method().flavor(Flavor::Coroutine), CallableKind::Coroutine),
            (FunctionDecl::method().flavor(Flavor::Generator), CallableKind::Generator),
            (
                FunctionDecl::method().flavor(Flavor::AsyncGenerator),
                CallableKind::AsyncGenerator,
            ),
            // binding outranks flavor
            (
                FunctionDecl::static_method().flavor(Flavor::Coroutine),
                CallableKind::Static,
            ),
            (
                FunctionDecl::class_method().flavor(Flavor::AsyncGenerator),
                CallableKind::ClassBound,
            ),
        ];
        for (function, expected) in cases {
            assert_eq!(callable_kind(&function), expected, "{:?}", function);
        }
    }

    #[test]
    fn test_wrapped_coroutine_not_plain() {
        let wrapper = FunctionDecl::default()
            .param(ParameterSpec::var_positional("args"))
            .param(ParameterSpec::var_keyword("kwargs"))
            .wrapping(FunctionDecl::method().flavor(Flavor::Coroutine));
        assert_eq!(callable_kind(&wrapper), CallableKind::Coroutine);
    }

    #[test]
    fn test_wrapped_generator_not_plain() {
        let wrapper = FunctionDecl::default()
            .wrapping(FunctionDecl::default().wrapping(FunctionDecl::method().flavor(Flavor::Generator)));
        assert_eq!(callable_kind(&wrapper), CallableKind::Generator);
    }

    #[test]
    fn test_accessor_capabilities_independent() {
        let write_only = MemberDecl::accessor(
            "token",
            AccessorDecl::default().setter(FunctionDecl::method().param(ParameterSpec::positional("v"))),
        );
        let descriptor = classify_member(&write_only);
        assert!(descriptor.part(Capability::Read).is_none());
        assert!(descriptor.part(Capability::Delete).is_none());
        let setter = descriptor.part(Capability::Write).unwrap();
        assert_eq!(setter.kind, CallableKind::Plain);
        assert_eq!(setter.signature.params.len(), 1);
        assert_eq!(descriptor.describe(), "accessor");
    }

    #[test]
    fn test_attribute_classification() {
        let descriptor = classify_member(&MemberDecl::attribute("size", AttributeDecl::default()));
        assert_eq!(descriptor, MemberDescriptor::Attribute { name: "size".into() });
        assert!(descriptor.part(Capability::Read).is_none());
    }

    #[test]
    fn test_members_include_inherited_and_respect_shadowing() {
        let mut registry = TypeRegistry::new();
        registry
            .declare(
                TypeDecl::new("Animal")
                    .function("speak", FunctionDecl::method())
                    .attribute("name", AttributeDecl::default()),
            )
            .unwrap();
        registry
            .declare(
                TypeDecl::new("Dog")
                    .extends("Animal")
                    .function("speak", FunctionDecl::static_method()),
            )
            .unwrap();

        let members = members(&registry, "Dog").unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members["speak"].owner, "Dog");
        assert_eq!(members["speak"].descriptor.describe(), "staticmethod");
        assert_eq!(members["name"].owner, "Animal");
    }

    #[test]
    fn test_members_of_unknown_type() {
        let registry = TypeRegistry::new();
        assert!(members(&registry, "Ghost").is_err());
    }
}
