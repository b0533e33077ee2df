// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error;
use std::fmt;

/// An error related to array indexing, identities or types.
///
/// The error encodes the failing slice item and logical row where the
/// producing kernel knows them, and the classname plus identity location of
/// the node that surfaced the failure, all visible in the Display
/// representation.
#[derive(Clone)]
pub struct Error {
    /// Error category
    repr: ErrorKind,
    /// Static description of the failure
    message: &'static str,
    /// Rendered extra info (a type diff, an identity location)
    detail: Option<String>,
    /// The offending value inside the slice item, if any
    slice_index: Option<i64>,
    /// The logical row at which the failure was detected, if any
    logical_index: Option<i64>,
    /// Node that surfaced the failure
    classname: Option<&'static str>,
}

impl Error {
    /// Return the `ErrorKind` of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.repr
    }

    /// Create a new `Error` from the given kind, with its default message.
    pub fn from_kind(repr: ErrorKind) -> Self {
        Error {
            repr,
            message: repr.description(),
            detail: None,
            slice_index: None,
            logical_index: None,
            classname: None,
        }
    }

    /// The offending value inside the slice item, if the failing kernel
    /// reported one.
    #[inline]
    pub fn slice_index(&self) -> Option<i64> {
        self.slice_index
    }

    /// The logical row at which the failure was detected, if the failing
    /// kernel reported one.
    #[inline]
    pub fn logical_index(&self) -> Option<i64> {
        self.logical_index
    }

    /// Node classname attached while the error bubbled up, if any.
    #[inline]
    pub fn classname(&self) -> Option<&'static str> {
        self.classname
    }

    pub(crate) fn out_of_bounds(
        message: &'static str,
        slice_index: Option<i64>,
        logical_index: Option<i64>,
    ) -> Self {
        Error {
            repr: ErrorKind::OutOfBounds,
            message,
            detail: None,
            slice_index,
            logical_index,
            classname: None,
        }
    }

    pub(crate) fn type_mismatch(detail: String) -> Self {
        Error {
            detail: Some(detail),
            ..Self::from_kind(ErrorKind::TypeMismatch)
        }
    }

    pub(crate) fn identity_length(expected: i64, actual: i64) -> Self {
        Error {
            slice_index: Some(expected),
            logical_index: Some(actual),
            ..Self::from_kind(ErrorKind::IdentityLength)
        }
    }

    pub(crate) fn no_records() -> Self {
        Self::from_kind(ErrorKind::NoRecords)
    }

    pub(crate) fn unsupported(message: &'static str) -> Self {
        Error {
            message,
            ..Self::from_kind(ErrorKind::Unsupported)
        }
    }

    /// Attach the classname of the node surfacing this error, and the
    /// rendered identity location of the failure row when one is known.
    /// The first frame to attach context wins; outer frames keep it.
    pub(crate) fn with_context(mut self, classname: &'static str, location: Option<String>) -> Self {
        if self.classname.is_none() {
            self.classname = Some(classname);
            if self.detail.is_none() {
                self.detail = location;
            }
        }
        self
    }
}

/// Error code for an error related to array indexing, identities or types.
///
/// This enumeration is not exhaustive. The representation of the enum
/// is not guaranteed.
#[non_exhaustive]
#[derive(Copy, Clone, Debug)]
pub enum ErrorKind {
    /// out of bounds indexing
    // encodes info: offending slice value and logical row
    OutOfBounds = 1,
    /// a type was assigned to an array of incompatible structure
    // encodes info: rendered diff of the two types
    TypeMismatch,
    /// an identity's length disagrees with the array it is attached to
    // encodes info: expected and actual length
    IdentityLength,
    /// record introspection on something that contains no records
    NoRecords,
    /// structurally unsupported request
    Unsupported,
}

impl ErrorKind {
    fn description(self) -> &'static str {
        match self {
            ErrorKind::OutOfBounds => "index out of range",
            ErrorKind::TypeMismatch => "provided type is incompatible with array",
            ErrorKind::IdentityLength => "content and its identity must have the same length",
            ErrorKind::NoRecords => "array contains no Records",
            ErrorKind::Unsupported => "unsupported operation",
        }
    }
}

impl PartialEq for ErrorKind {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        *self as u8 == *rhs as u8
    }
}

impl PartialEq for Error {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.repr == rhs.repr
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ragged/{:?}: {}", self.kind(), self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {}", detail)?;
        }
        if let Some(at) = self.slice_index {
            write!(f, "; got: {}", at)?;
        }
        if let Some(row) = self.logical_index {
            write!(f, "; at row: {}", row)?;
        }
        if let Some(classname) = self.classname {
            write!(f, " (in {})", classname)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert!(std::mem::size_of::<ErrorKind>() <= std::mem::size_of::<u8>());
    }

    #[test]
    fn test_format() {
        let err = Error::out_of_bounds("index out of range", Some(4), None)
            .with_context("RegularArray", None);
        assert_eq!(
            err.to_string(),
            "ragged/OutOfBounds: index out of range; got: 4 (in RegularArray)"
        );

        let err = Error::identity_length(3, 5);
        assert_eq!(
            err.to_string(),
            "ragged/IdentityLength: content and its identity must have the same length; \
             got: 3; at row: 5"
        );
    }

    #[test]
    fn test_kind_eq() {
        assert_eq!(Error::from_kind(ErrorKind::NoRecords), Error::no_records());
        assert_ne!(Error::from_kind(ErrorKind::OutOfBounds), Error::no_records());
    }
}
