//! Signature comparator - normalized parameter shapes and structural equality
//!
//! A `Signature` is built from the innermost function of a wrapper chain.
//! The implicit receiver is dropped for instance and class-bound callables;
//! static callables keep every parameter. Two signatures are equal only when
//! every parameter agrees on name, kind, default and annotation, in order,
//! and the return annotations agree. There is no subtype relaxation.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::{Binding, FunctionDecl};

// ── Parameters ───────────────────────────────────────────

/// Canonical type expression used for annotations
///
/// Whitespace outside quotes is removed on construction so `Optional[ str ]`
/// and `Optional[str]` compare equal. Quoted forward references such as
/// `'My Type'` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(text: &str) -> Self {
        let mut canonical = String::with_capacity(text.len());
        let mut quote: Option<char> = None;
        for c in text.chars() {
            match quote {
                Some(open) => {
                    canonical.push(c);
                    if c == open {
                        quote = None;
                    }
                }
                None if c == '\'' || c == '"' => {
                    canonical.push(c);
                    quote = Some(c);
                }
                None if c.is_whitespace() => {}
                None => canonical.push(c),
            }
        }
        TypeTag(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(TypeTag::new(&text))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut quote: Option<char> = None;
        for c in self.0.chars() {
            match (quote, c) {
                (Some(open), c) => {
                    if c == open {
                        quote = None;
                    }
                    write!(f, "{}", c)?;
                }
                (None, '\'' | '"') => {
                    quote = Some(c);
                    write!(f, "{}", c)?;
                }
                (None, ',') => write!(f, ", ")?,
                (None, '|') => write!(f, " | ")?,
                (None, c) => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}

/// How an argument binds to a parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    #[default]
    Positional,
    KeywordOnly,
    VarPositional,
    VarKeyword,
}

impl ParamKind {
    /// Position in the mandatory declaration order
    fn rank(self) -> u8 {
        match self {
            ParamKind::Positional => 0,
            ParamKind::VarPositional => 1,
            ParamKind::KeywordOnly => 2,
            ParamKind::VarKeyword => 3,
        }
    }

    fn is_variadic(self) -> bool {
        matches!(self, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamKind::Positional => write!(f, "positional"),
            ParamKind::KeywordOnly => write!(f, "keyword-only"),
            ParamKind::VarPositional => write!(f, "variadic positional"),
            ParamKind::VarKeyword => write!(f, "variadic keyword"),
        }
    }
}

/// One parameter of a callable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ParamKind,
    /// `Some(Value::Null)` is a `None` default, distinct from no default
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<TypeTag>,
}

fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl ParameterSpec {
    fn with_kind(name: impl Into<String>, kind: ParamKind) -> Self {
        ParameterSpec {
            name: name.into(),
            kind,
            default: None,
            annotation: None,
        }
    }

    pub fn positional(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::Positional)
    }

    pub fn keyword_only(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::KeywordOnly)
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::VarPositional)
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self::with_kind(name, ParamKind::VarKeyword)
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn annotated(mut self, tag: TypeTag) -> Self {
        self.annotation = Some(tag);
        self
    }
}

impl fmt::Display for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ParamKind::VarPositional => write!(f, "*")?,
            ParamKind::VarKeyword => write!(f, "**")?,
            _ => {}
        }
        write!(f, "{}", self.name)?;
        if let Some(ref tag) = self.annotation {
            write!(f, ": {}", tag)?;
        }
        if let Some(ref value) = self.default {
            if self.annotation.is_some() {
                write!(f, " = {}", render_value(value))?;
            } else {
                write!(f, "={}", render_value(value))?;
            }
        }
        Ok(())
    }
}

// ── Signature ────────────────────────────────────────────

/// Normalized callable signature
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeTag>,
}

impl Signature {
    pub fn new(params: Vec<ParameterSpec>, returns: Option<TypeTag>) -> Self {
        Signature { params, returns }
    }

    /// Build the normalized signature of a callable
    ///
    /// Parameters and return annotation come from the innermost wrapped
    /// function. The receiver is dropped unless the binding is static.
    pub fn of(function: &FunctionDecl) -> Self {
        let inner = function.innermost();
        let mut params = inner.params.clone();
        if function.effective_binding() != Binding::Static && has_receiver(&params) {
            params.remove(0);
        }
        Signature {
            params,
            returns: inner.returns.clone(),
        }
    }

    /// Same shape with every parameter and return annotation erased
    pub fn without_annotations(&self) -> Self {
        Signature {
            params: self
                .params
                .iter()
                .map(|p| ParameterSpec {
                    annotation: None,
                    ..p.clone()
                })
                .collect(),
            returns: None,
        }
    }

    /// First point where `found` departs from `self`, or `None` when equal
    pub fn first_difference(&self, found: &Signature) -> Option<Difference> {
        if self.params.len() != found.params.len() {
            return Some(Difference::Arity {
                expected: self.params.len(),
                found: found.params.len(),
            });
        }

        for (index, (want, have)) in self.params.iter().zip(&found.params).enumerate() {
            if want.name != have.name {
                return Some(Difference::Name {
                    position: index + 1,
                    expected: want.name.clone(),
                    found: have.name.clone(),
                });
            }
            if want.kind != have.kind {
                return Some(Difference::Kind {
                    name: want.name.clone(),
                    expected: want.kind,
                    found: have.kind,
                });
            }
            let same_default = match (&want.default, &have.default) {
                (Some(a), Some(b)) => defaults_equal(a, b),
                (None, None) => true,
                _ => false,
            };
            if !same_default {
                return Some(Difference::Default {
                    name: want.name.clone(),
                    expected: want.default.clone(),
                    found: have.default.clone(),
                });
            }
            if want.annotation != have.annotation {
                return Some(Difference::Annotation {
                    name: want.name.clone(),
                    expected: want.annotation.clone(),
                    found: have.annotation.clone(),
                });
            }
        }

        if self.returns != found.returns {
            return Some(Difference::Return {
                expected: self.returns.clone(),
                found: found.returns.clone(),
            });
        }

        None
    }
}

/// Default-value equality as the host language sees it
///
/// Numbers compare by value (`7 == 7.0`), booleans count as `0` and `1`,
/// and lists and maps compare element-wise under the same rule. `None`
/// only equals `None`.
pub fn defaults_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_integer(a), as_integer(b)) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (as_float(a), as_float(b)) {
        return x == y;
    }
    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| defaults_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| defaults_equal(x, y)))
        }
        _ => a == b,
    }
}

fn as_integer(value: &Value) -> Option<i128> {
    match value {
        Value::Bool(b) => Some(i128::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn has_receiver(params: &[ParameterSpec]) -> bool {
    params
        .first()
        .is_some_and(|p| p.kind == ParamKind::Positional)
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.params.len() + 1);
        let mut keyword_marker = false;
        for param in &self.params {
            match param.kind {
                ParamKind::VarPositional => keyword_marker = true,
                ParamKind::KeywordOnly if !keyword_marker => {
                    parts.push("*".to_string());
                    keyword_marker = true;
                }
                _ => {}
            }
            parts.push(param.to_string());
        }
        write!(f, "({})", parts.join(", "))?;
        if let Some(ref tag) = self.returns {
            write!(f, " -> {}", tag)?;
        }
        Ok(())
    }
}

/// Where two signatures first disagree
#[derive(Debug, Clone, PartialEq)]
pub enum Difference {
    Arity { expected: usize, found: usize },
    Name { position: usize, expected: String, found: String },
    Kind { name: String, expected: ParamKind, found: ParamKind },
    Default { name: String, expected: Option<Value>, found: Option<Value> },
    Annotation { name: String, expected: Option<TypeTag>, found: Option<TypeTag> },
    Return { expected: Option<TypeTag>, found: Option<TypeTag> },
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Difference::Arity { expected, found } => {
                write!(f, "expected {} parameter(s), found {}", expected, found)
            }
            Difference::Name { position, expected, found } => write!(
                f,
                "parameter {} is named '{}', expected '{}'",
                position, found, expected
            ),
            Difference::Kind { name, expected, found } => write!(
                f,
                "parameter '{}' is {}, expected {}",
                name, found, expected
            ),
            Difference::Default { name, expected, found } => write!(
                f,
                "parameter '{}' has {}, expected {}",
                name,
                describe_default(found),
                describe_default(expected)
            ),
            Difference::Annotation { name, expected, found } => write!(
                f,
                "parameter '{}' is annotated {}, expected {}",
                name,
                describe_tag(found),
                describe_tag(expected)
            ),
            Difference::Return { expected, found } => write!(
                f,
                "return annotation is {}, expected {}",
                describe_tag(found),
                describe_tag(expected)
            ),
        }
    }
}

fn describe_default(value: &Option<Value>) -> String {
    match value {
        Some(v) => format!("default {}", render_value(v)),
        None => "no default".to_string(),
    }
}

fn describe_tag(tag: &Option<TypeTag>) -> String {
    match tag {
        Some(t) => format!("'{}'", t),
        None => "nothing".to_string(),
    }
}

/// Render a default value the way it is written in a declaration
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(render_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("'{}': {}", k, render_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

// ── Validation ───────────────────────────────────────────

/// Check a parameter list is well formed
///
/// Order must be positional, variadic positional, keyword-only, variadic
/// keyword. Names are unique, each variadic appears at most once and
/// carries no default, and a positional parameter without a default may
/// not follow one with a default.
pub fn validate_params(params: &[ParameterSpec]) -> std::result::Result<(), String> {
    let mut names = BTreeSet::new();
    let mut highest: Option<ParamKind> = None;
    let mut seen_var_positional = false;
    let mut seen_var_keyword = false;
    let mut seen_default = false;

    for param in params {
        if param.name.is_empty() {
            return Err("parameter with an empty name".to_string());
        }
        if !names.insert(param.name.as_str()) {
            return Err(format!("duplicate parameter '{}'", param.name));
        }

        if let Some(prev) = highest {
            if param.kind.rank() < prev.rank() {
                return Err(format!(
                    "{} parameter '{}' cannot follow a {} parameter",
                    param.kind, param.name, prev
                ));
            }
        }
        if highest.map_or(true, |prev| param.kind.rank() > prev.rank()) {
            highest = Some(param.kind);
        }

        match param.kind {
            ParamKind::VarPositional if seen_var_positional => {
                return Err(format!(
                    "more than one variadic positional parameter ('{}')",
                    param.name
                ));
            }
            ParamKind::VarKeyword if seen_var_keyword => {
                return Err(format!(
                    "more than one variadic keyword parameter ('{}')",
                    param.name
                ));
            }
            ParamKind::VarPositional => seen_var_positional = true,
            ParamKind::VarKeyword => seen_var_keyword = true,
            ParamKind::Positional => {
                if param.default.is_some() {
                    seen_default = true;
                } else if seen_default {
                    return Err(format!(
                        "non-default parameter '{}' follows a default parameter",
                        param.name
                    ));
                }
            }
            ParamKind::KeywordOnly => {}
        }

        if param.kind.is_variadic() && param.default.is_some() {
            return Err(format!(
                "variadic parameter '{}' cannot have a default",
                param.name
            ));
        }
    }

    Ok(())
}

/// Check every function in a wrapper chain, and that bound callables
/// declare their receiver
pub fn validate_function(function: &FunctionDecl) -> std::result::Result<(), String> {
    for link in function.chain() {
        validate_params(&link.params)?;
    }
    let binding = function.effective_binding();
    if binding != Binding::Static && !has_receiver(&function.innermost().params) {
        let receiver = if binding == Binding::Class { "cls" } else { "self" };
        return Err(format!(
            "missing leading receiver parameter (e.g. '{}')",
            receiver
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Flavor;
    use serde_json::json;

    fn foo_full() -> Signature {
        Signature::new(
            vec![
                ParameterSpec::positional("a"),
                ParameterSpec::positional("b").with_default(json!(7)),
                ParameterSpec::var_positional("args"),
                ParameterSpec::var_keyword("kwargs"),
            ],
            None,
        )
    }

    #[test]
    fn test_receiver_dropped_for_instance_method() {
        let f = FunctionDecl::method().param(ParameterSpec::positional("a"));
        let sig = Signature::of(&f);
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].name, "a");
    }

    #[test]
    fn test_receiver_dropped_for_class_method() {
        let sig = Signature::of(&FunctionDecl::class_method());
        assert!(sig.params.is_empty());
    }

    #[test]
    fn test_static_keeps_all_parameters() {
        let f = FunctionDecl::static_method().param(ParameterSpec::positional("x"));
        let sig = Signature::of(&f);
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].name, "x");
    }

    #[test]
    fn test_signature_taken_from_wrapped_function() {
        let inner = FunctionDecl::method()
            .flavor(Flavor::Coroutine)
            .param(ParameterSpec::positional("a"))
            .returning(TypeTag::new("int"));
        let wrapper = FunctionDecl::default()
            .param(ParameterSpec::var_positional("args"))
            .param(ParameterSpec::var_keyword("kwargs"))
            .wrapping(inner);
        let sig = Signature::of(&wrapper);
        assert_eq!(sig.to_string(), "(a) -> int");
    }

    #[test]
    fn test_missing_var_keyword_detected() {
        let mut partial = foo_full();
        partial.params.pop();
        assert_ne!(foo_full(), partial);
        assert_eq!(
            foo_full().first_difference(&partial),
            Some(Difference::Arity { expected: 4, found: 3 })
        );
    }

    #[test]
    fn test_renamed_parameter() {
        let a = Signature::new(vec![ParameterSpec::positional("arg")], None);
        let b = Signature::new(vec![ParameterSpec::positional("arrrrg")], None);
        let diff = a.first_difference(&b).unwrap();
        assert_eq!(diff.to_string(), "parameter 1 is named 'arrrrg', expected 'arg'");
    }

    #[test]
    fn test_reordered_parameters() {
        let a = Signature::new(
            vec![ParameterSpec::positional("a"), ParameterSpec::positional("b")],
            None,
        );
        let b = Signature::new(
            vec![ParameterSpec::positional("b"), ParameterSpec::positional("a")],
            None,
        );
        assert!(matches!(a.first_difference(&b), Some(Difference::Name { position: 1, .. })));
    }

    #[test]
    fn test_keyword_only_differs_from_positional() {
        let a = Signature::new(vec![ParameterSpec::keyword_only("a")], None);
        let b = Signature::new(vec![ParameterSpec::positional("a")], None);
        assert!(matches!(a.first_difference(&b), Some(Difference::Kind { .. })));
    }

    #[test]
    fn test_different_defaults() {
        let a = Signature::new(vec![ParameterSpec::positional("arg").with_default(json!(7))], None);
        let b = Signature::new(vec![ParameterSpec::positional("arg").with_default(json!(8))], None);
        let diff = a.first_difference(&b).unwrap();
        assert_eq!(diff.to_string(), "parameter 'arg' has default 8, expected default 7");
    }

    #[test]
    fn test_numerically_equal_defaults_match() {
        let int = Signature::new(vec![ParameterSpec::positional("b").with_default(json!(7))], None);
        let float = Signature::new(vec![ParameterSpec::positional("b").with_default(json!(7.0))], None);
        assert_eq!(int.first_difference(&float), None);

        let one = Signature::new(vec![ParameterSpec::positional("b").with_default(json!(1))], None);
        let truthy = Signature::new(vec![ParameterSpec::positional("b").with_default(json!(true))], None);
        assert_eq!(one.first_difference(&truthy), None);

        let half = Signature::new(vec![ParameterSpec::positional("b").with_default(json!(7.5))], None);
        assert!(matches!(int.first_difference(&half), Some(Difference::Default { .. })));
    }

    #[test]
    fn test_defaults_equal_rules() {
        assert!(defaults_equal(&json!(false), &json!(0.0)));
        assert!(defaults_equal(&json!([1, true]), &json!([1.0, 1])));
        assert!(defaults_equal(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!defaults_equal(&json!(u64::MAX), &json!(u64::MAX - 1)));
        assert!(!defaults_equal(&json!("1"), &json!(1)));
        assert!(!defaults_equal(&Value::Null, &json!(0)));
        assert!(!defaults_equal(&json!([1]), &json!([1, 1])));
    }

    #[test]
    fn test_none_default_is_not_absent_default() {
        let a = Signature::new(vec![ParameterSpec::positional("x").with_default(Value::Null)], None);
        let b = Signature::new(vec![ParameterSpec::positional("x")], None);
        assert!(matches!(a.first_difference(&b), Some(Difference::Default { .. })));
    }

    #[test]
    fn test_annotation_mismatch_and_erasure() {
        let a = Signature::new(
            vec![ParameterSpec::positional("arg").annotated(TypeTag::new("str"))],
            Some(TypeTag::new("str")),
        );
        let b = Signature::new(
            vec![ParameterSpec::positional("arg").annotated(TypeTag::new("int"))],
            Some(TypeTag::new("int")),
        );
        assert!(matches!(a.first_difference(&b), Some(Difference::Annotation { .. })));
        assert_eq!(a.without_annotations(), b.without_annotations());
    }

    #[test]
    fn test_return_annotation_mismatch() {
        let a = Signature::new(vec![], Some(TypeTag::new("str")));
        let b = Signature::new(vec![], Some(TypeTag::new("int")));
        let diff = a.first_difference(&b).unwrap();
        assert_eq!(diff.to_string(), "return annotation is 'int', expected 'str'");
    }

    #[test]
    fn test_equal_signatures_have_no_difference() {
        assert_eq!(foo_full().first_difference(&foo_full()), None);
    }

    #[test]
    fn test_type_tag_whitespace_insensitive() {
        assert_eq!(TypeTag::new("Dict[str,  int]"), TypeTag::new("Dict[ str, int ]"));
        assert_eq!(TypeTag::new("int|None").to_string(), "int | None");
    }

    #[test]
    fn test_type_tag_keeps_quoted_whitespace() {
        assert_ne!(TypeTag::new("'My Type'"), TypeTag::new("'MyType'"));
        assert_eq!(TypeTag::new("list[ 'My Type' ]").as_str(), "list['My Type']");
        assert_eq!(TypeTag::new("Literal['a,b', \"c\"]").to_string(), "Literal['a,b', \"c\"]");
    }

    #[test]
    fn test_display_matches_declaration_notation() {
        assert_eq!(foo_full().to_string(), "(a, b=7, *args, **kwargs)");

        let kw = Signature::new(
            vec![
                ParameterSpec::positional("a").annotated(TypeTag::new("str")),
                ParameterSpec::keyword_only("flag").with_default(json!(true)),
                ParameterSpec::keyword_only("name").with_default(Value::Null),
            ],
            Some(TypeTag::new("list[str]")),
        );
        assert_eq!(kw.to_string(), "(a: str, *, flag=True, name=None) -> list[str]");
    }

    #[test]
    fn test_render_string_default() {
        assert_eq!(render_value(&json!("it's")), "'it\\'s'");
    }

    #[test]
    fn test_validate_accepts_full_shape() {
        let mut params = foo_full().params;
        params.insert(3, ParameterSpec::keyword_only("k"));
        assert!(validate_params(&params).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let params = vec![ParameterSpec::positional("a"), ParameterSpec::keyword_only("a")];
        assert!(validate_params(&params).unwrap_err().contains("duplicate parameter"));
    }

    #[test]
    fn test_validate_rejects_bad_order() {
        let params = vec![ParameterSpec::var_keyword("kw"), ParameterSpec::positional("a")];
        assert!(validate_params(&params).unwrap_err().contains("cannot follow"));
    }

    #[test]
    fn test_validate_rejects_two_var_positionals() {
        let params = vec![ParameterSpec::var_positional("a"), ParameterSpec::var_positional("b")];
        assert!(validate_params(&params).unwrap_err().contains("more than one"));
    }

    #[test]
    fn test_validate_rejects_non_default_after_default() {
        let params = vec![
            ParameterSpec::positional("a").with_default(json!(1)),
            ParameterSpec::positional("b"),
        ];
        assert!(validate_params(&params).unwrap_err().contains("follows a default"));
    }

    #[test]
    fn test_validate_function_requires_receiver() {
        let bare = FunctionDecl::default();
        assert!(validate_function(&bare).unwrap_err().contains("'self'"));
        assert!(validate_function(&FunctionDecl::static_method()).is_ok());
        assert!(validate_function(&FunctionDecl::class_method()).is_ok());
    }
}
