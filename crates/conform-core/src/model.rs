//! Type declarations - the metadata the engine reflects over
//!
//! A `TypeDecl` describes one declared type: its name, its direct bases and
//! the members it defines itself. Inherited members are never copied into a
//! declaration; lookup walks the ancestor chain kept by the registry.
//!
//! Declarations are plain data. They can be built in code with the builder
//! methods below, deserialized from JSON, or produced by the declaration
//! language parser.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::signature::{ParameterSpec, TypeTag};

/// Name of the built-in marker every contract derives from
pub const CONTRACT: &str = "Contract";

/// Name of the universal root; never part of an ancestor chain
pub const OBJECT: &str = "object";

/// One declared type (contract or candidate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        TypeDecl {
            name: name.into(),
            bases: Vec::new(),
            members: Vec::new(),
        }
    }

    /// A declaration deriving directly from the `Contract` marker
    pub fn contract(name: impl Into<String>) -> Self {
        TypeDecl::new(name).extends(CONTRACT)
    }

    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn function(self, name: impl Into<String>, function: FunctionDecl) -> Self {
        self.member(MemberDecl::function(name, function))
    }

    pub fn accessor(self, name: impl Into<String>, accessor: AccessorDecl) -> Self {
        self.member(MemberDecl::accessor(name, accessor))
    }

    pub fn attribute(self, name: impl Into<String>, attribute: AttributeDecl) -> Self {
        self.member(MemberDecl::attribute(name, attribute))
    }

    /// Find a member this type declares itself (inherited members excluded)
    pub fn own_member(&self, name: &str) -> Option<&MemberDecl> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A named member as written in a declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDecl {
    pub name: String,
    pub body: MemberBody,
}

impl MemberDecl {
    pub fn function(name: impl Into<String>, function: FunctionDecl) -> Self {
        MemberDecl {
            name: name.into(),
            body: MemberBody::Function(function),
        }
    }

    pub fn accessor(name: impl Into<String>, accessor: AccessorDecl) -> Self {
        MemberDecl {
            name: name.into(),
            body: MemberBody::Accessor(accessor),
        }
    }

    pub fn attribute(name: impl Into<String>, attribute: AttributeDecl) -> Self {
        MemberDecl {
            name: name.into(),
            body: MemberBody::Attribute(attribute),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum MemberBody {
    Function(FunctionDecl),
    Accessor(AccessorDecl),
    Attribute(AttributeDecl),
}

/// How a callable receives its implicit first argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// Receives the instance
    #[default]
    Instance,
    /// Receives the type itself
    Class,
    /// No implicit receiver
    Static,
}

/// What calling the function produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    #[default]
    Sync,
    Coroutine,
    Generator,
    AsyncGenerator,
}

/// A callable declaration, optionally wrapping an inner callable
///
/// A wrapper keeps its own (usually generic) parameter list, but
/// classification and signature comparison follow `wraps` down to the
/// innermost function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    #[serde(default)]
    pub binding: Binding,
    #[serde(default)]
    pub flavor: Flavor,
    #[serde(default)]
    pub params: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wraps: Option<Box<FunctionDecl>>,
}

impl FunctionDecl {
    /// Ordinary instance method taking only `self`
    pub fn method() -> Self {
        FunctionDecl::default().param(ParameterSpec::positional("self"))
    }

    /// Class-bound method taking only `cls`
    pub fn class_method() -> Self {
        FunctionDecl {
            binding: Binding::Class,
            ..FunctionDecl::default()
        }
        .param(ParameterSpec::positional("cls"))
    }

    /// Static function with no parameters
    pub fn static_method() -> Self {
        FunctionDecl {
            binding: Binding::Static,
            ..FunctionDecl::default()
        }
    }

    pub fn flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn returning(mut self, tag: TypeTag) -> Self {
        self.returns = Some(tag);
        self
    }

    /// Turn `self` into a wrapper delegating to `inner`
    pub fn wrapping(mut self, inner: FunctionDecl) -> Self {
        self.wraps = Some(Box::new(inner));
        self
    }

    /// Follow the `wraps` relation to the function that does the work
    pub fn innermost(&self) -> &FunctionDecl {
        let mut current = self;
        while let Some(inner) = current.wraps.as_deref() {
            current = inner;
        }
        current
    }

    /// First non-instance binding along the wrapper chain, outermost first
    pub fn effective_binding(&self) -> Binding {
        let mut current = Some(self);
        while let Some(function) = current {
            if function.binding != Binding::Instance {
                return function.binding;
            }
            current = function.wraps.as_deref();
        }
        Binding::Instance
    }

    /// Iterate the wrapper chain, outermost first
    pub fn chain(&self) -> impl Iterator<Item = &FunctionDecl> {
        std::iter::successors(Some(self), |f| f.wraps.as_deref())
    }
}

/// A data accessor with independently present read/write/delete functions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessorDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub getter: Option<FunctionDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setter: Option<FunctionDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleter: Option<FunctionDecl>,
}

impl AccessorDecl {
    /// Read-only accessor with a `get(self)` function
    pub fn read_only() -> Self {
        AccessorDecl {
            getter: Some(FunctionDecl::method()),
            ..AccessorDecl::default()
        }
    }

    pub fn getter(mut self, function: FunctionDecl) -> Self {
        self.getter = Some(function);
        self
    }

    pub fn setter(mut self, function: FunctionDecl) -> Self {
        self.setter = Some(function);
        self
    }

    pub fn deleter(mut self, function: FunctionDecl) -> Self {
        self.deleter = Some(function);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.getter.is_none() && self.setter.is_none() && self.deleter.is_none()
    }
}

/// A plain data field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}
