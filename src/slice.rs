// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

use crate::error::Error;

/// A slice (range with step size).
///
/// `end` is an exclusive index. Negative `start` or `end` indexes are counted
/// from the back of the axis. Unspecified bounds are `None`, not magic
/// values: with a negative step the defaults run from the back of the axis,
/// so `None` and `Some(0)` are not interchangeable.
///
/// See also the [`s![]`](s!) macro.
///
/// ## Examples
///
/// `Slice::new(None, None, 1)` is the full range of an axis, also created
/// with `Slice::from(..)`. The Python equivalent is `[:]`.
///
/// `Slice::new(Some(a), Some(b), 2)` is every second element from `a` until
/// `b`, also created with `Slice::from(a..b).step_by(2)`. The Python
/// equivalent is `[a:b:2]`.
///
/// `Slice::new(Some(a), None, -1)` is every element, from `a` towards the
/// front, in reverse order. The Python equivalent is `[a::-1]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slice {
    /// start index; negative are counted from the back of the axis
    pub start: Option<isize>,
    /// end index; negative are counted from the back of the axis
    pub end: Option<isize>,
    /// step size in elements; the default is 1, for every element.
    pub step: isize,
}

impl Slice {
    /// Create a new `Slice` with the given extents.
    ///
    /// See also the `From` impls, converting from ranges; for example
    /// `Slice::from(i..)` or `Slice::from(j..k)`.
    ///
    /// `step` must be nonzero.
    /// (This method checks with a debug assertion that `step` is not zero.)
    pub fn new(start: Option<isize>, end: Option<isize>, step: isize) -> Slice {
        debug_assert_ne!(step, 0, "Slice::new: step must be nonzero");
        Slice { start, end, step }
    }

    /// Create a new `Slice` with the given step size (multiplied with the
    /// previous step size).
    ///
    /// `step` must be nonzero.
    /// (This method checks with a debug assertion that `step` is not zero.)
    #[inline]
    pub fn step_by(self, step: isize) -> Self {
        debug_assert_ne!(step, 0, "Slice::step_by: step must be nonzero");
        Slice {
            step: self.step * step,
            ..self
        }
    }
}

/// Token to represent a new axis in a slice description.
///
/// See also the [`s![]`](s!) macro.
#[derive(Clone, Copy, Debug)]
pub struct NewAxis;

/// Token to represent an ellipsis in a slice description: as many full
/// ranges as the sliced tree has room for.
///
/// See also the [`s![]`](s!) macro.
#[derive(Clone, Copy, Debug)]
pub struct Ellipsis;

/// An integer-array slice item: index values plus the (row-major) shape
/// they were supplied in. The shape is reintroduced around the result of
/// fancy indexing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceArray {
    values: Vec<i64>,
    shape: Vec<i64>,
}

impl SliceArray {
    /// Index values in row-major order with their shape.
    ///
    /// **Panics** if `shape` is empty or its product disagrees with the
    /// number of values.
    pub fn new(values: Vec<i64>, shape: Vec<i64>) -> SliceArray {
        assert!(!shape.is_empty(), "SliceArray: shape must have at least one dimension");
        let product: i64 = shape.iter().product();
        assert_eq!(
            product,
            values.len() as i64,
            "SliceArray: shape does not cover the values"
        );
        SliceArray { values, shape }
    }

    /// One-dimensional index array.
    pub fn from_flat(values: Vec<i64>) -> SliceArray {
        let shape = vec![values.len() as i64];
        SliceArray { values, shape }
    }

    /// The values flattened to one dimension.
    pub fn ravel(&self) -> &[i64] {
        &self.values
    }

    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

/// One dimension's worth of slicing: a range, an index, a new axis, an
/// ellipsis, an integer array, record-field selection, or an index with
/// missing entries.
///
/// See also the [`s![]`](s!) macro for a convenient way to create a
/// [`SliceInfo`].
#[derive(Clone, Debug, PartialEq)]
pub enum SliceItem {
    /// A single index.
    Index(isize),
    /// A range with step size. `end` is an exclusive index. Negative
    /// `start` or `end` indexes are counted from the back of the axis.
    /// Unspecified bounds are `None`.
    Range {
        /// start index; negative are counted from the back of the axis
        start: Option<isize>,
        /// end index; negative are counted from the back of the axis
        end: Option<isize>,
        /// step size in elements; the default is 1, for every element.
        step: isize,
    },
    /// As many full ranges as the sliced tree has room for.
    Ellipsis,
    /// A new axis of length 1.
    NewAxis,
    /// Integer-array (fancy) indexing.
    Array(SliceArray),
    /// Select one record field; does not consume a dimension.
    Field(String),
    /// Select several record fields; does not consume a dimension.
    Fields(Vec<String>),
    /// An index vector whose negative entries mean missing.
    Missing(Vec<i64>),
}

impl SliceItem {
    /// Returns `true` if `self` is an `Index` value.
    pub fn is_index(&self) -> bool {
        matches!(self, SliceItem::Index(_))
    }

    /// Returns `true` if `self` is a `Range` value.
    pub fn is_range(&self) -> bool {
        matches!(self, SliceItem::Range { .. })
    }

    /// Returns `true` if `self` is a `NewAxis` value.
    pub fn is_new_axis(&self) -> bool {
        matches!(self, SliceItem::NewAxis)
    }

    /// Whether this item consumes a dimension of the sliced tree.
    pub fn consumes_dim(&self) -> bool {
        matches!(
            self,
            SliceItem::Index(_)
                | SliceItem::Range { .. }
                | SliceItem::Array(_)
                | SliceItem::Missing(_)
        )
    }
}

impl fmt::Display for SliceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceItem::Index(index) => write!(f, "{}", index)?,
            SliceItem::Range { start, end, step } => {
                if let Some(i) = start {
                    write!(f, "{}", i)?;
                }
                write!(f, "..")?;
                if let Some(i) = end {
                    write!(f, "{}", i)?;
                }
                if *step != 1 {
                    write!(f, ";{}", step)?;
                }
            }
            SliceItem::Ellipsis => write!(f, "...")?,
            SliceItem::NewAxis => write!(f, "{}", stringify!(NewAxis))?,
            SliceItem::Array(array) => {
                write!(f, "[")?;
                for (i, x) in array.ravel().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")?;
            }
            SliceItem::Field(key) => write!(f, "\"{}\"", key)?,
            SliceItem::Fields(keys) => {
                write!(f, "[")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "\"{}\"", key)?;
                }
                write!(f, "]")?;
            }
            SliceItem::Missing(index) => {
                write!(f, "[")?;
                for (i, x) in index.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    if *x < 0 {
                        write!(f, "None")?;
                    } else {
                        write!(f, "{}", x)?;
                    }
                }
                write!(f, "]")?;
            }
        }
        Ok(())
    }
}

macro_rules! impl_slice_variant_from_range {
    ($self:ty, $constructor:path, $index:ty) => {
        impl From<Range<$index>> for $self {
            #[inline]
            fn from(r: Range<$index>) -> $self {
                $constructor {
                    start: Some(r.start as isize),
                    end: Some(r.end as isize),
                    step: 1,
                }
            }
        }

        impl From<RangeInclusive<$index>> for $self {
            #[inline]
            fn from(r: RangeInclusive<$index>) -> $self {
                let end = *r.end() as isize;
                $constructor {
                    start: Some(*r.start() as isize),
                    end: if end == -1 { None } else { Some(end + 1) },
                    step: 1,
                }
            }
        }

        impl From<RangeFrom<$index>> for $self {
            #[inline]
            fn from(r: RangeFrom<$index>) -> $self {
                $constructor {
                    start: Some(r.start as isize),
                    end: None,
                    step: 1,
                }
            }
        }

        impl From<RangeTo<$index>> for $self {
            #[inline]
            fn from(r: RangeTo<$index>) -> $self {
                $constructor {
                    start: None,
                    end: Some(r.end as isize),
                    step: 1,
                }
            }
        }

        impl From<RangeToInclusive<$index>> for $self {
            #[inline]
            fn from(r: RangeToInclusive<$index>) -> $self {
                let end = r.end as isize;
                $constructor {
                    start: None,
                    end: if end == -1 { None } else { Some(end + 1) },
                    step: 1,
                }
            }
        }
    };
}
impl_slice_variant_from_range!(Slice, Slice, isize);
impl_slice_variant_from_range!(Slice, Slice, usize);
impl_slice_variant_from_range!(Slice, Slice, i32);
impl_slice_variant_from_range!(SliceItem, SliceItem::Range, isize);
impl_slice_variant_from_range!(SliceItem, SliceItem::Range, usize);
impl_slice_variant_from_range!(SliceItem, SliceItem::Range, i32);

impl From<RangeFull> for Slice {
    #[inline]
    fn from(_: RangeFull) -> Slice {
        Slice {
            start: None,
            end: None,
            step: 1,
        }
    }
}

impl From<RangeFull> for SliceItem {
    #[inline]
    fn from(_: RangeFull) -> SliceItem {
        SliceItem::Range {
            start: None,
            end: None,
            step: 1,
        }
    }
}

impl From<Slice> for SliceItem {
    #[inline]
    fn from(s: Slice) -> SliceItem {
        SliceItem::Range {
            start: s.start,
            end: s.end,
            step: s.step,
        }
    }
}

macro_rules! impl_sliceitem_from_index {
    ($index:ty) => {
        impl From<$index> for SliceItem {
            #[inline]
            fn from(r: $index) -> SliceItem {
                SliceItem::Index(r as isize)
            }
        }
    };
}
impl_sliceitem_from_index!(isize);
impl_sliceitem_from_index!(usize);
impl_sliceitem_from_index!(i32);

impl From<NewAxis> for SliceItem {
    #[inline]
    fn from(_: NewAxis) -> SliceItem {
        SliceItem::NewAxis
    }
}

impl From<Ellipsis> for SliceItem {
    #[inline]
    fn from(_: Ellipsis) -> SliceItem {
        SliceItem::Ellipsis
    }
}

impl From<&str> for SliceItem {
    #[inline]
    fn from(key: &str) -> SliceItem {
        SliceItem::Field(key.to_owned())
    }
}

impl From<String> for SliceItem {
    #[inline]
    fn from(key: String) -> SliceItem {
        SliceItem::Field(key)
    }
}

impl From<Vec<&str>> for SliceItem {
    #[inline]
    fn from(keys: Vec<&str>) -> SliceItem {
        SliceItem::Fields(keys.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<i64>> for SliceItem {
    #[inline]
    fn from(values: Vec<i64>) -> SliceItem {
        SliceItem::Array(SliceArray::from_flat(values))
    }
}

impl From<SliceArray> for SliceItem {
    #[inline]
    fn from(array: SliceArray) -> SliceItem {
        SliceItem::Array(array)
    }
}

/// Represents all of the necessary information to slice a tree: an ordered
/// sequence of [`SliceItem`]s, one per consumed or inserted dimension.
///
/// At most one item may be an ellipsis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SliceInfo {
    items: Vec<SliceItem>,
}

impl SliceInfo {
    /// Returns a new `SliceInfo`, or an error when more than one item is an
    /// ellipsis.
    pub fn new(items: Vec<SliceItem>) -> Result<SliceInfo, Error> {
        let ellipses = items
            .iter()
            .filter(|item| matches!(item, SliceItem::Ellipsis))
            .count();
        if ellipses > 1 {
            return Err(Error::unsupported("a slice can have at most one ellipsis"));
        }
        Ok(SliceInfo { items })
    }

    /// Like [`SliceInfo::new`], but **panics** on an invalid sequence.
    /// This is what the [`s![]`](s!) macro calls.
    pub fn from_items(items: Vec<SliceItem>) -> SliceInfo {
        Self::new(items).expect("a slice can have at most one ellipsis")
    }

    pub fn items(&self) -> &[SliceItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of tree dimensions the slice consumes.
    pub fn dimlength(&self) -> usize {
        dimlength(&self.items)
    }
}

/// Number of tree dimensions consumed by a run of slice items.
pub(crate) fn dimlength(items: &[SliceItem]) -> usize {
    items.iter().filter(|item| item.consumes_dim()).count()
}

impl AsRef<[SliceItem]> for SliceInfo {
    fn as_ref(&self) -> &[SliceItem] {
        &self.items
    }
}

impl TryFrom<Vec<SliceItem>> for SliceInfo {
    type Error = Error;

    fn try_from(items: Vec<SliceItem>) -> Result<SliceInfo, Error> {
        SliceInfo::new(items)
    }
}

/// Slice argument constructor.
///
/// `s![]` takes a list of ranges/slices/indices/new-axes/field names,
/// separated by comma, with optional step sizes that are separated from the
/// range by a semicolon. It is converted into a [`SliceInfo`] instance.
///
/// Each range/index uses signed indices, where a negative value is counted
/// from the end of the axis. Step sizes are also signed and may be negative,
/// but must not be zero.
///
/// The syntax is `s![` *[ elem [, elem [ , ... ] ] ]* `]`, where *elem* is
/// any of the following:
///
/// * *index*: an index to use for taking a subview with respect to that axis.
/// * *range*: a range with step size 1 to use for slicing that axis.
/// * *range* `;` *step*: a range with step size *step* to use for slicing that axis.
/// * *slice*: a [`Slice`] instance to use for slicing that axis.
/// * *slice* `;` *step*: a range constructed from a [`Slice`] instance,
///   multiplying the step size by *step*, to use for slicing that axis.
/// * *new-axis*: a [`NewAxis`] instance that represents the creation of a new axis.
/// * *ellipsis*: an [`Ellipsis`] instance standing for as many full ranges
///   as fit.
/// * *key*: a string selecting a record field.
/// * *indices*: a `Vec<i64>` or [`SliceArray`] of indices for fancy indexing.
///
/// For example, `s![0..4;2, 6, 1..5, NewAxis]` is a slice of the first axis
/// for 0..4 with step size 2, a subview of the second axis at index 6, a
/// slice of the third axis for 1..5 with default step size 1, and a new axis
/// of length 1 at the end of the shape.
///
/// # Example
///
/// ```
/// use ragged::s;
///
/// let info = s![1..3, 0..2];
/// assert_eq!(info.dimlength(), 2);
/// ```
#[macro_export]
macro_rules! s(
    // convert a..b;c into @convert(a..b, c), final item
    (@parse [$($stack:tt)*] $r:expr;$s:expr) => {
        $crate::SliceInfo::from_items(vec![$($stack)* $crate::s!(@convert $r, $s)])
    };
    // convert a..b into @convert(a..b), final item
    (@parse [$($stack:tt)*] $r:expr) => {
        $crate::SliceInfo::from_items(vec![$($stack)* $crate::s!(@convert $r)])
    };
    // convert a..b;c into @convert(a..b, c), final item, trailing comma
    (@parse [$($stack:tt)*] $r:expr;$s:expr ,) => {
        $crate::s![@parse [$($stack)*] $r;$s]
    };
    // convert a..b into @convert(a..b), final item, trailing comma
    (@parse [$($stack:tt)*] $r:expr ,) => {
        $crate::s![@parse [$($stack)*] $r]
    };
    // convert a..b;c into @convert(a..b, c)
    (@parse [$($stack:tt)*] $r:expr;$s:expr, $($t:tt)*) => {
        $crate::s![@parse [$($stack)* $crate::s!(@convert $r, $s),] $($t)*]
    };
    // convert a..b into @convert(a..b)
    (@parse [$($stack:tt)*] $r:expr, $($t:tt)*) => {
        $crate::s![@parse [$($stack)* $crate::s!(@convert $r),] $($t)*]
    };
    // empty call, i.e. `s![]`
    (@parse []) => {
        $crate::SliceInfo::from_items(vec![])
    };
    // Catch-all clause for syntax errors
    (@parse $($t:tt)*) => { compile_error!("Invalid syntax in s![] call.") };
    // convert range/index/new-axis/field into SliceItem
    (@convert $r:expr) => {
        <$crate::SliceItem as ::core::convert::From<_>>::from($r)
    };
    // convert range/slice and step into SliceItem
    (@convert $r:expr, $s:expr) => {
        <$crate::SliceItem as ::core::convert::From<_>>::from(
            <$crate::Slice as ::core::convert::From<_>>::from($r).step_by($s as isize)
        )
    };
    ($($t:tt)*) => {
        $crate::s![@parse [] $($t)*]
    };
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_conversions_keep_unspecified_bounds() {
        assert_eq!(
            SliceItem::from(..),
            SliceItem::Range {
                start: None,
                end: None,
                step: 1
            }
        );
        assert_eq!(
            SliceItem::from(..4),
            SliceItem::Range {
                start: None,
                end: Some(4),
                step: 1
            }
        );
        assert_eq!(
            SliceItem::from(1..=-1),
            SliceItem::Range {
                start: Some(1),
                end: None,
                step: 1
            }
        );
    }

    #[test]
    fn macro_builds_items_in_order() {
        let info = s![1..3;-1, 2, NewAxis, "x", .., Ellipsis];
        assert_eq!(
            info.items()[0],
            SliceItem::Range {
                start: Some(1),
                end: Some(3),
                step: -1
            }
        );
        assert_eq!(info.items()[1], SliceItem::Index(2));
        assert_eq!(info.items()[2], SliceItem::NewAxis);
        assert_eq!(info.items()[3], SliceItem::Field("x".to_owned()));
        assert!(info.items()[4].is_range());
        assert_eq!(info.items()[5], SliceItem::Ellipsis);
        assert_eq!(info.dimlength(), 3);

        // trailing comma
        let info = s![1.., ..;2,];
        assert_eq!(info.dimlength(), 2);
    }

    #[test]
    fn at_most_one_ellipsis() {
        let bad = vec![SliceItem::Ellipsis, SliceItem::Index(0), SliceItem::Ellipsis];
        assert!(SliceInfo::new(bad).is_err());
    }

    #[test]
    fn slice_array_shape_must_cover_values() {
        let array = SliceArray::new(vec![0, 2, 1, 3], vec![2, 2]);
        assert_eq!(array.ravel(), &[0, 2, 1, 3]);
        assert_eq!(array.shape(), &[2, 2]);
        assert_eq!(SliceArray::from_flat(vec![5, 6]).shape(), &[2]);
    }

    #[test]
    #[should_panic = "shape does not cover"]
    fn slice_array_rejects_bad_shape() {
        let _ = SliceArray::new(vec![0, 1, 2], vec![2, 2]);
    }
}
