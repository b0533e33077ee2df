// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use std::sync::Arc;

use crate::error::Error;

/// Element type of a primitive leaf.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DType {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl DType {
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::UInt8 => "uint8",
            DType::Int16 => "int16",
            DType::UInt16 => "uint16",
            DType::Int32 => "int32",
            DType::UInt32 => "uint32",
            DType::Int64 => "int64",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named-tuple descriptor: an ordered mapping of field names to types, with
/// optional alias names resolving to the same fields.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordType {
    fields: Vec<(String, Arc<Type>)>,
    /// `(alias, canonical key)` pairs
    aliases: Vec<(String, String)>,
}

impl RecordType {
    pub fn new<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, Type)>,
    {
        RecordType {
            fields: fields
                .into_iter()
                .map(|(k, t)| (k, Arc::new(t)))
                .collect(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<(String, String)>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn numfields(&self) -> i64 {
        self.fields.len() as i64
    }

    /// Field position for a name, resolving aliases.
    pub fn fieldindex(&self, key: &str) -> Result<i64, Error> {
        let canonical = self
            .aliases
            .iter()
            .find(|(alias, _)| alias == key)
            .map_or(key, |(_, k)| k.as_str());
        self.fields
            .iter()
            .position(|(k, _)| k == canonical)
            .map(|i| i as i64)
            .ok_or_else(|| Error::out_of_bounds("no such field", None, None))
    }

    pub fn key(&self, fieldindex: i64) -> Result<&str, Error> {
        self.fields
            .get(fieldindex as usize)
            .map(|(k, _)| k.as_str())
            .ok_or_else(|| Error::out_of_bounds("no such field", Some(fieldindex), None))
    }

    pub fn haskey(&self, key: &str) -> bool {
        self.fieldindex(key).is_ok()
    }

    /// Alias names resolving to field `fieldindex`.
    pub fn keyaliases(&self, fieldindex: i64) -> Result<Vec<String>, Error> {
        let key = self.key(fieldindex)?;
        Ok(self
            .aliases
            .iter()
            .filter(|(_, k)| k == key)
            .map(|(alias, _)| alias.clone())
            .collect())
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn field(&self, fieldindex: i64) -> Result<&Type, Error> {
        self.fields
            .get(fieldindex as usize)
            .map(|(_, t)| t.as_ref())
            .ok_or_else(|| Error::out_of_bounds("no such field", Some(fieldindex), None))
    }

    pub fn field_by_key(&self, key: &str) -> Result<&Type, Error> {
        self.field(self.fieldindex(key)?)
    }

    fn map_fields(&self, f: impl Fn(&Type) -> Type) -> RecordType {
        RecordType {
            fields: self
                .fields
                .iter()
                .map(|(k, t)| (k.clone(), Arc::new(f(t))))
                .collect(),
            aliases: self.aliases.clone(),
        }
    }
}

/// Structural descriptor mirroring the node variants.
///
/// `equal` (via `PartialEq`) is deep structural equality; [`Type::shallow_equal`]
/// compares only the outermost layer and is what [`crate::Content`]
/// acceptance checks use.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    /// Leaf placeholder.
    Unknown,
    /// Numeric leaf.
    Primitive(DType),
    /// Fixed-size lists.
    Regular(Arc<Type>, i64),
    /// Variable-length lists.
    List(Arc<Type>),
    /// Element may be missing.
    Option(Arc<Type>),
    /// Element is one of several types.
    Union(Vec<Arc<Type>>),
    /// Named tuple.
    Record(RecordType),
    /// Pairs a length with an element type at the outer level only.
    Array(Arc<Type>, i64),
}

impl Type {
    pub fn regular(inner: Type, size: i64) -> Type {
        Type::Regular(Arc::new(inner), size)
    }

    pub fn list(inner: Type) -> Type {
        Type::List(Arc::new(inner))
    }

    pub fn option(inner: Type) -> Type {
        Type::Option(Arc::new(inner))
    }

    pub fn union<I: IntoIterator<Item = Type>>(alternatives: I) -> Type {
        Type::Union(alternatives.into_iter().map(Arc::new).collect())
    }

    pub fn array(inner: Type, length: i64) -> Type {
        Type::Array(Arc::new(inner), length)
    }

    /// Deep structural equality.
    pub fn equal(&self, other: &Type) -> bool {
        self == other
    }

    /// Same outermost variant, ignoring inner types. Fixed sizes, union
    /// arity and record keys still count as part of the outer layer.
    pub fn shallow_equal(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Unknown, Type::Unknown) => true,
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Regular(_, a), Type::Regular(_, b)) => a == b,
            (Type::List(_), Type::List(_)) => true,
            (Type::Option(_), Type::Option(_)) => true,
            (Type::Union(a), Type::Union(b)) => a.len() == b.len(),
            (Type::Record(a), Type::Record(b)) => a.keys() == b.keys(),
            (Type::Array(_, a), Type::Array(_, b)) => a == b,
            _ => false,
        }
    }

    /// The outermost layer with inner types replaced by their canonical
    /// model. Options and outer-length wrappers are invisible to levels.
    pub fn level(&self) -> Type {
        match self {
            Type::Unknown => Type::Unknown,
            Type::Primitive(d) => Type::Primitive(*d),
            Type::Regular(_, size) => Type::regular(Type::Unknown, *size),
            Type::List(_) => Type::list(Type::Unknown),
            Type::Option(inner) => inner.level(),
            Type::Union(alts) => Type::union(alts.iter().map(|_| Type::Unknown)),
            Type::Record(rt) => Type::Record(rt.map_fields(|_| Type::Unknown)),
            Type::Array(inner, _) => inner.level(),
        }
    }

    /// The inner type of one list layer; leaves yield themselves, options
    /// delegate through the wrapped type.
    pub fn inner(&self) -> Type {
        match self {
            Type::Unknown => Type::Unknown,
            Type::Primitive(d) => Type::Primitive(*d),
            Type::Regular(inner, _) | Type::List(inner) | Type::Array(inner, _) => {
                (**inner).clone()
            }
            Type::Option(inner) => inner.inner(),
            Type::Union(_) | Type::Record(_) => self.clone(),
        }
    }

    /// Descend into a record field, delegating through options, lists and
    /// outer-length wrappers.
    pub fn inner_key(&self, key: &str) -> Result<Type, Error> {
        match self {
            Type::Unknown => Ok(Type::Unknown),
            Type::Record(rt) => rt.field_by_key(key).cloned(),
            Type::Option(inner)
            | Type::List(inner)
            | Type::Regular(inner, _)
            | Type::Array(inner, _) => inner.inner_key(key),
            Type::Primitive(_) | Type::Union(_) => Err(Error::no_records()),
        }
    }

    /// Strip the outer-length wrapper, if any.
    pub fn nolength(&self) -> Type {
        match self {
            Type::Array(inner, _) => (**inner).clone(),
            _ => self.clone(),
        }
    }

    /// Collapse chains of nested options to the first non-option type.
    pub fn option_type(&self) -> &Type {
        let mut out = self;
        while let Type::Option(inner) = out {
            out = inner;
        }
        out
    }

    /// Number of record fields, delegating through wrappers; `-1` when the
    /// type reaches no record.
    pub fn numfields(&self) -> i64 {
        match self {
            Type::Record(rt) => rt.numfields(),
            Type::Option(inner)
            | Type::List(inner)
            | Type::Regular(inner, _)
            | Type::Array(inner, _) => inner.numfields(),
            Type::Unknown | Type::Primitive(_) | Type::Union(_) => -1,
        }
    }

    pub fn fieldindex(&self, key: &str) -> Result<i64, Error> {
        self.with_record(|rt| rt.fieldindex(key))
    }

    pub fn key(&self, fieldindex: i64) -> Result<String, Error> {
        self.with_record(|rt| rt.key(fieldindex).map(str::to_owned))
    }

    pub fn haskey(&self, key: &str) -> Result<bool, Error> {
        self.with_record(|rt| Ok(rt.haskey(key)))
    }

    pub fn keyaliases(&self, key: &str) -> Result<Vec<String>, Error> {
        self.with_record(|rt| rt.keyaliases(rt.fieldindex(key)?))
    }

    /// Record field names, delegating through wrappers. A primitive leaf
    /// has none; types that never reach a record fail `NoRecords`.
    pub fn keys(&self) -> Result<Vec<String>, Error> {
        match self {
            Type::Record(rt) => Ok(rt.keys()),
            Type::Primitive(_) => Ok(Vec::new()),
            Type::Option(inner)
            | Type::List(inner)
            | Type::Regular(inner, _)
            | Type::Array(inner, _) => inner.keys(),
            Type::Unknown | Type::Union(_) => Err(Error::no_records()),
        }
    }

    fn with_record<R>(&self, f: impl Fn(&RecordType) -> Result<R, Error>) -> Result<R, Error> {
        match self {
            Type::Record(rt) => f(rt),
            Type::Option(inner)
            | Type::List(inner)
            | Type::Regular(inner, _)
            | Type::Array(inner, _) => inner.with_record(f),
            Type::Unknown | Type::Primitive(_) | Type::Union(_) => Err(Error::no_records()),
        }
    }

    /// Rendered diff used by type-mismatch errors.
    pub(crate) fn compare(&self, other: &Type) -> String {
        format!("{} versus {}", self, other)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Unknown => f.write_str("unknown"),
            Type::Primitive(d) => write!(f, "{}", d),
            Type::Regular(inner, size) => write!(f, "{} * {}", size, inner),
            Type::List(inner) => write!(f, "var * {}", inner),
            Type::Option(inner) => match **inner {
                Type::List(_) | Type::Regular(..) => write!(f, "option[{}]", inner),
                _ => write!(f, "?{}", inner),
            },
            Type::Union(alts) => {
                f.write_str("union[")?;
                for (i, alt) in alts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", alt)?;
                }
                f.write_str("]")
            }
            Type::Record(rt) => {
                f.write_str("{")?;
                for (i, (key, ty)) in rt.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\": {}", key, ty)?;
                }
                f.write_str("}")
            }
            Type::Array(inner, length) => write!(f, "{} * {}", length, inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn record_xy() -> Type {
        Type::Record(RecordType::new(vec![
            ("x".to_owned(), Type::Primitive(DType::Int64)),
            ("y".to_owned(), Type::Primitive(DType::Float64)),
        ]))
    }

    #[test]
    fn option_chains_collapse() {
        let t = Type::option(Type::option(Type::Primitive(DType::Int64)));
        assert_eq!(t.option_type(), &Type::Primitive(DType::Int64));
    }

    #[test]
    fn levels_ignore_inner_types_but_not_sizes() {
        let a = Type::regular(Type::Primitive(DType::Int64), 3);
        let b = Type::regular(Type::list(Type::Primitive(DType::Float32)), 3);
        let c = Type::regular(Type::Primitive(DType::Int64), 4);
        assert!(a.level().shallow_equal(&b.level()));
        assert!(!a.level().shallow_equal(&c.level()));
    }

    #[test]
    fn options_are_invisible_to_levels() {
        let t = Type::option(Type::list(Type::Primitive(DType::Int64)));
        assert!(t.level().shallow_equal(&Type::list(Type::Unknown)));
    }

    #[test]
    fn introspection_delegates_to_wrapped_record() {
        let t = Type::option(Type::option(record_xy()));
        assert_eq!(t.keys().unwrap(), vec!["x", "y"]);
        assert_eq!(t.fieldindex("y").unwrap(), 1);
        assert_eq!(t.numfields(), 2);

        let t = Type::option(Type::list(Type::Primitive(DType::Int64)));
        assert_eq!(t.keys().unwrap(), Vec::<String>::new());
        assert_eq!(t.numfields(), -1);
        assert_eq!(
            t.fieldindex("x").unwrap_err().kind(),
            ErrorKind::NoRecords
        );
    }

    #[test]
    fn aliases_resolve_to_fields() {
        let rt = RecordType::new(vec![
            ("x".to_owned(), Type::Primitive(DType::Int64)),
            ("y".to_owned(), Type::Primitive(DType::Float64)),
        ])
        .with_aliases(vec![("horizontal".to_owned(), "x".to_owned())]);
        assert_eq!(rt.fieldindex("horizontal").unwrap(), 0);
        assert_eq!(rt.keyaliases(0).unwrap(), vec!["horizontal"]);
        assert!(rt.keyaliases(1).unwrap().is_empty());
    }

    #[test]
    fn display_notation() {
        assert_eq!(
            Type::regular(Type::Primitive(DType::Int64), 3).to_string(),
            "3 * int64"
        );
        assert_eq!(
            Type::option(Type::list(Type::Primitive(DType::Int64))).to_string(),
            "option[var * int64]"
        );
        assert_eq!(
            Type::option(Type::Primitive(DType::Float64)).to_string(),
            "?float64"
        );
        assert_eq!(record_xy().to_string(), "{\"x\": int64, \"y\": float64}");
    }
}
