// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The array node family and its shared polymorphic contract.
//!
//! A [`Content`] is a node in a tree of views over shared buffers: leaves
//! hold primitive data, the other variants impose grouping, raggedness,
//! indirection, missing values, unions or records on their children.
//! Slicing rewrites the tree without copying payload buffers.

use std::sync::Arc;

use crate::error::Error;
use crate::identity::Identity;
use crate::index::Index64;
use crate::slice::{dimlength, SliceArray, SliceInfo, SliceItem};
use crate::types::Type;

mod indexed;
mod list;
mod numpy;
mod record;
mod regular;
mod union;

pub use indexed::{IndexedArray, OptionArray};
pub use list::{ListArray, ListOffsetArray};
pub use numpy::{EmptyArray, NumpyArray, PrimitiveData, ScalarValue};
pub use record::RecordArray;
pub use regular::RegularArray;
pub use union::UnionArray;

/// A node in the array tree; one of the closed variant family.
///
/// Every variant carries an optional [`Identity`] and an optional stored
/// [`Type`]; nodes are immutable after construction apart from re-assigning
/// those two (`setid*`, `settype_part`). Slicing and carrying return new
/// trees whose payload buffers are shared with the source.
#[derive(Clone, Debug)]
pub enum Content {
    /// Dense rectangular leaf.
    Numpy(NumpyArray),
    /// Zero-length, unknown-typed leaf.
    Empty(EmptyArray),
    /// Fixed-size grouping of its content.
    Regular(RegularArray),
    List32(ListArray<i32>),
    ListU32(ListArray<u32>),
    List64(ListArray<i64>),
    ListOffset32(ListOffsetArray<i32>),
    ListOffsetU32(ListOffsetArray<u32>),
    ListOffset64(ListOffsetArray<i64>),
    Indexed32(IndexedArray<i32>),
    IndexedU32(IndexedArray<u32>),
    Indexed64(IndexedArray<i64>),
    Option32(OptionArray<i32>),
    Option64(OptionArray<i64>),
    Union(UnionArray),
    Record(RecordArray),
}

/// Exhaustive dispatch over every node variant; `$x` binds the inner struct.
macro_rules! dispatch {
    ($self_:expr, $x:ident => $body:expr) => {
        match $self_ {
            Content::Numpy($x) => $body,
            Content::Empty($x) => $body,
            Content::Regular($x) => $body,
            Content::List32($x) => $body,
            Content::ListU32($x) => $body,
            Content::List64($x) => $body,
            Content::ListOffset32($x) => $body,
            Content::ListOffsetU32($x) => $body,
            Content::ListOffset64($x) => $body,
            Content::Indexed32($x) => $body,
            Content::IndexedU32($x) => $body,
            Content::Indexed64($x) => $body,
            Content::Option32($x) => $body,
            Content::Option64($x) => $body,
            Content::Union($x) => $body,
            Content::Record($x) => $body,
        }
    };
}

/// The child a node delegates record introspection to, if any.
enum Introspect<'a> {
    Leaf,
    Child(&'a Content),
    Record(&'a RecordArray),
}

impl Content {
    /// Diagnostic node name, e.g. `"ListArray32"`.
    pub fn classname(&self) -> &'static str {
        dispatch!(self, a => a.classname())
    }

    /// Nominal logical length.
    pub fn length(&self) -> i64 {
        dispatch!(self, a => a.length())
    }

    pub fn id(&self) -> Option<&Identity> {
        dispatch!(self, a => a.id.as_ref())
    }

    pub fn ty(&self) -> Option<&Arc<Type>> {
        dispatch!(self, a => a.ty.as_ref())
    }

    /// New node sharing all children and buffers.
    pub fn shallow_copy(&self) -> Content {
        self.clone()
    }

    /// Attach a fresh root identity (`[0, length)`, width 1) and recompute
    /// children's identities per variant.
    pub fn setid(&mut self) -> Result<(), Error> {
        let id = Identity::new(self.length());
        self.setid_with(Some(id))
    }

    /// Attach `id` (or clear with `None`) and recompute children's
    /// identities per variant. Fails when `id.length()` disagrees with the
    /// node's length.
    pub fn setid_with(&mut self, id: Option<Identity>) -> Result<(), Error> {
        dispatch!(self, a => a.setid_with(id))
    }

    /// Structural type of this node. With `bare` the children's stored
    /// types are ignored; without it they are preserved (minus their outer
    /// length).
    pub fn innertype(&self, bare: bool) -> Type {
        dispatch!(self, a => a.innertype(bare))
    }

    /// True iff the outer layer of `ty` matches this node's canonical
    /// model.
    pub fn accepts(&self, ty: &Type) -> bool {
        dispatch!(self, a => a.accepts(ty))
    }

    /// After an [`Content::accepts`] check, store `ty` and recurse its
    /// inner type into the child.
    pub fn settype_part(&mut self, ty: Type) -> Result<(), Error> {
        dispatch!(self, a => a.settype_part(Arc::new(ty)))
    }

    /// A zero-length slice of the node's element type.
    pub fn getitem_nothing(&self) -> Content {
        match self {
            Content::Numpy(a) => Content::Numpy(a.getitem_range_nowrap(0, 0)),
            Content::Empty(a) => Content::Empty(a.clone()),
            Content::Regular(a) => a.content().getitem_range_nowrap(0, 0),
            Content::List32(a) => a.content().getitem_range_nowrap(0, 0),
            Content::ListU32(a) => a.content().getitem_range_nowrap(0, 0),
            Content::List64(a) => a.content().getitem_range_nowrap(0, 0),
            Content::ListOffset32(a) => a.content().getitem_range_nowrap(0, 0),
            Content::ListOffsetU32(a) => a.content().getitem_range_nowrap(0, 0),
            Content::ListOffset64(a) => a.content().getitem_range_nowrap(0, 0),
            Content::Indexed32(a) => a.content().getitem_nothing(),
            Content::IndexedU32(a) => a.content().getitem_nothing(),
            Content::Indexed64(a) => a.content().getitem_nothing(),
            Content::Option32(a) => a.content().getitem_nothing(),
            Content::Option64(a) => a.content().getitem_nothing(),
            Content::Union(a) => match a.contents().first() {
                Some(c) => c.getitem_nothing(),
                None => Content::Empty(EmptyArray::new()),
            },
            Content::Record(a) => Content::Record(a.getitem_range_nowrap(0, 0)),
        }
    }

    /// Element at `at`, counting negative indices from the back.
    pub fn getitem_at(&self, at: i64) -> Result<Content, Error> {
        let len = self.length();
        let mut regular_at = at;
        if regular_at < 0 {
            regular_at += len;
        }
        if !(0 <= regular_at && regular_at < len) {
            return Err(self.annotate(Error::out_of_bounds("index out of range", Some(at), None)));
        }
        self.getitem_at_nowrap(regular_at)
            .map_err(|e| self.annotate(e))
    }

    /// Element at `at`; `at` must already be in `[0, length)`.
    pub fn getitem_at_nowrap(&self, at: i64) -> Result<Content, Error> {
        dispatch!(self, a => a.getitem_at_nowrap(at))
    }

    /// Contiguous sub-view, with bounds clamped the way a positive-step
    /// range is.
    pub fn getitem_range(&self, start: i64, stop: i64) -> Result<Content, Error> {
        let (mut s, mut e) = (start, stop);
        crate::kernels::regularize_rangeslice(&mut s, &mut e, true, true, true, self.length());
        if let Some(id) = self.id() {
            if e > id.length() {
                return Err(self.annotate(Error::out_of_bounds(
                    "index out of range",
                    Some(stop),
                    None,
                )));
            }
        }
        Ok(self.getitem_range_nowrap(s, e))
    }

    /// Contiguous sub-view; bounds must already be normalized.
    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Content {
        match self {
            Content::Numpy(a) => Content::Numpy(a.getitem_range_nowrap(start, stop)),
            Content::Empty(a) => a.getitem_range_nowrap(start, stop),
            Content::Regular(a) => a.getitem_range_nowrap(start, stop),
            Content::List32(a) => a.getitem_range_nowrap(start, stop),
            Content::ListU32(a) => a.getitem_range_nowrap(start, stop),
            Content::List64(a) => a.getitem_range_nowrap(start, stop),
            Content::ListOffset32(a) => a.getitem_range_nowrap(start, stop),
            Content::ListOffsetU32(a) => a.getitem_range_nowrap(start, stop),
            Content::ListOffset64(a) => a.getitem_range_nowrap(start, stop),
            Content::Indexed32(a) => a.getitem_range_nowrap(start, stop),
            Content::IndexedU32(a) => a.getitem_range_nowrap(start, stop),
            Content::Indexed64(a) => a.getitem_range_nowrap(start, stop),
            Content::Option32(a) => a.getitem_range_nowrap(start, stop),
            Content::Option64(a) => a.getitem_range_nowrap(start, stop),
            Content::Union(a) => a.getitem_range_nowrap(start, stop),
            Content::Record(a) => Content::Record(a.getitem_range_nowrap(start, stop)),
        }
    }

    /// Descend into a record field; non-record containers wrap the result
    /// in an equivalent container.
    pub fn getitem_field(&self, key: &str) -> Result<Content, Error> {
        dispatch!(self, a => a.getitem_field(key)).map_err(|e| self.annotate(e))
    }

    /// Select several record fields at once.
    pub fn getitem_fields(&self, keys: &[String]) -> Result<Content, Error> {
        dispatch!(self, a => a.getitem_fields(keys)).map_err(|e| self.annotate(e))
    }

    /// Gather: the i-th element of the result is the `carry[i]`-th element
    /// of `self`. This is the universal reordering primitive; payload
    /// buffers stay shared.
    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        dispatch!(self, a => a.carry(carry)).map_err(|e| self.annotate(e))
    }

    /// Inclusive `(min, max)` dimensional depth across union branches.
    pub fn minmax_depth(&self) -> (i64, i64) {
        match self {
            Content::Numpy(a) => {
                let d = a.ndim() as i64;
                (d, d)
            }
            Content::Empty(_) => (1, 1),
            Content::Regular(a) => {
                let (lo, hi) = a.content().minmax_depth();
                (lo + 1, hi + 1)
            }
            Content::List32(a) => list_depth(a.content()),
            Content::ListU32(a) => list_depth(a.content()),
            Content::List64(a) => list_depth(a.content()),
            Content::ListOffset32(a) => list_depth(a.content()),
            Content::ListOffsetU32(a) => list_depth(a.content()),
            Content::ListOffset64(a) => list_depth(a.content()),
            Content::Indexed32(a) => a.content().minmax_depth(),
            Content::IndexedU32(a) => a.content().minmax_depth(),
            Content::Indexed64(a) => a.content().minmax_depth(),
            Content::Option32(a) => a.content().minmax_depth(),
            Content::Option64(a) => a.content().minmax_depth(),
            Content::Union(a) => {
                let mut out: Option<(i64, i64)> = None;
                for c in a.contents() {
                    let (lo, hi) = c.minmax_depth();
                    out = Some(match out {
                        None => (lo, hi),
                        Some((olo, ohi)) => (olo.min(lo), ohi.max(hi)),
                    });
                }
                out.unwrap_or((1, 1))
            }
            Content::Record(a) => {
                let mut out: Option<(i64, i64)> = None;
                for (_, c) in a.fields() {
                    let (lo, hi) = c.minmax_depth();
                    out = Some(match out {
                        None => (lo, hi),
                        Some((olo, ohi)) => (olo.min(lo), ohi.max(hi)),
                    });
                }
                out.unwrap_or((1, 1))
            }
        }
    }

    /// Fail when an attached identity is shorter than the node; run before
    /// cursor-based iteration.
    pub fn check_for_iteration(&self) -> Result<(), Error> {
        if let Some(id) = self.id() {
            if id.length() < self.length() {
                return Err(Error::identity_length(self.length(), id.length())
                    .with_context(self.classname(), None));
            }
        }
        Ok(())
    }

    fn introspect(&self) -> Introspect<'_> {
        match self {
            Content::Numpy(_) | Content::Empty(_) => Introspect::Leaf,
            Content::Regular(a) => Introspect::Child(a.content()),
            Content::List32(a) => Introspect::Child(a.content()),
            Content::ListU32(a) => Introspect::Child(a.content()),
            Content::List64(a) => Introspect::Child(a.content()),
            Content::ListOffset32(a) => Introspect::Child(a.content()),
            Content::ListOffsetU32(a) => Introspect::Child(a.content()),
            Content::ListOffset64(a) => Introspect::Child(a.content()),
            Content::Indexed32(a) => Introspect::Child(a.content()),
            Content::IndexedU32(a) => Introspect::Child(a.content()),
            Content::Indexed64(a) => Introspect::Child(a.content()),
            Content::Option32(a) => Introspect::Child(a.content()),
            Content::Option64(a) => Introspect::Child(a.content()),
            Content::Union(a) => match a.contents().first() {
                Some(c) => Introspect::Child(c),
                None => Introspect::Leaf,
            },
            Content::Record(a) => Introspect::Record(a),
        }
    }

    /// Number of record fields, `-1` when no record is reached.
    pub fn numfields(&self) -> i64 {
        match self.introspect() {
            Introspect::Leaf => -1,
            Introspect::Child(c) => c.numfields(),
            Introspect::Record(r) => r.numfields(),
        }
    }

    pub fn fieldindex(&self, key: &str) -> Result<i64, Error> {
        match self.introspect() {
            Introspect::Leaf => Err(self.annotate(Error::no_records())),
            Introspect::Child(c) => c.fieldindex(key),
            Introspect::Record(r) => r.fieldindex(key),
        }
    }

    pub fn key(&self, fieldindex: i64) -> Result<String, Error> {
        match self.introspect() {
            Introspect::Leaf => Err(self.annotate(Error::no_records())),
            Introspect::Child(c) => c.key(fieldindex),
            Introspect::Record(r) => r.key(fieldindex),
        }
    }

    pub fn haskey(&self, key: &str) -> Result<bool, Error> {
        match self.introspect() {
            Introspect::Leaf => Err(self.annotate(Error::no_records())),
            Introspect::Child(c) => c.haskey(key),
            Introspect::Record(r) => Ok(r.haskey(key)),
        }
    }

    pub fn keyaliases(&self, key: &str) -> Result<Vec<String>, Error> {
        match self.introspect() {
            Introspect::Leaf => Err(self.annotate(Error::no_records())),
            Introspect::Child(c) => c.keyaliases(key),
            Introspect::Record(r) => Ok(r.keyaliases(key)),
        }
    }

    pub fn keys(&self) -> Result<Vec<String>, Error> {
        match self.introspect() {
            Introspect::Leaf => Err(self.annotate(Error::no_records())),
            Introspect::Child(c) => c.keys(),
            Introspect::Record(r) => Ok(r.keys()),
        }
    }

    /// Apply a parsed N-dimensional slice to this tree.
    ///
    /// The node is wrapped in a one-row fixed-size adapter so that the
    /// first slice item transforms the node's own axis like any other; the
    /// adapter is stripped again once the recursion returns.
    pub fn getitem(&self, info: &SliceInfo) -> Result<Content, Error> {
        let items = info.items();
        if let Some(SliceItem::Missing(mask)) = items.first() {
            return self.getitem_missing(mask, &items[1..]);
        }
        match items.split_first() {
            None => Ok(self.clone()),
            Some((head, tail)) => {
                let wrap = Content::Regular(RegularArray::new(self.clone(), self.length()));
                let out = wrap.getitem_next(Some(head), tail, &Index64::empty())?;
                out.getitem_at_nowrap(0)
            }
        }
    }

    /// An index vector with missing entries in the leading dimension:
    /// gather the present rows, then rewrap with an option layer restoring
    /// the missing slots.
    fn getitem_missing(&self, mask: &[i64], rest: &[SliceItem]) -> Result<Content, Error> {
        let numnull = crate::kernels::indexedarray_numnull(mask);
        let mut compact = vec![0i64; mask.len() - numnull as usize];
        let mut outindex = vec![0i64; mask.len()];
        crate::kernels::indexedarray_getitem_nextcarry_outindex(
            &mut compact,
            &mut outindex,
            mask,
            self.length(),
        )
        .map_err(|e| self.annotate(e))?;

        let mut items = Vec::with_capacity(rest.len() + 1);
        items.push(SliceItem::Array(SliceArray::from_flat(compact)));
        items.extend_from_slice(rest);
        let out = self.getitem(&SliceInfo::from_items(items))?;
        Ok(Content::Option64(OptionArray::new(
            Index64::from_vec(outindex),
            out,
        )))
    }

    /// Dispatch one dimension of slicing. `head` is the current item,
    /// `tail` the remaining ones, `advanced` the broadcast state of fancy
    /// indexing (empty when none is in progress).
    pub(crate) fn getitem_next(
        &self,
        head: Option<&SliceItem>,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        let head = match head {
            None => return Ok(self.clone()),
            Some(head) => head,
        };
        match head {
            SliceItem::Field(key) => {
                let next = self.getitem_field(key)?;
                let (h, t) = split_head(tail);
                next.getitem_next(h, t, advanced)
            }
            SliceItem::Fields(keys) => {
                let next = self.getitem_fields(keys)?;
                let (h, t) = split_head(tail);
                next.getitem_next(h, t, advanced)
            }
            SliceItem::NewAxis => {
                let (h, t) = split_head(tail);
                let inner = self.getitem_next(h, t, advanced)?;
                Ok(Content::Regular(RegularArray::new(inner, 1)))
            }
            SliceItem::Ellipsis => self.getitem_next_ellipsis(tail, advanced),
            SliceItem::Missing(_) => Err(self.annotate(Error::unsupported(
                "missing slice entries are only supported in the leading dimension",
            ))),
            SliceItem::Index(_) | SliceItem::Range { .. } | SliceItem::Array(_) => {
                dispatch!(self, a => a.getitem_next(head, tail, advanced))
                    .map_err(|e| self.annotate(e))
            }
        }
    }

    /// Expand an ellipsis: a no-op when the remaining items already fill
    /// the tree's depth, otherwise insert a full range and retry.
    fn getitem_next_ellipsis(
        &self,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        let (mindepth, maxdepth) = self.minmax_depth();
        if mindepth != maxdepth {
            return Err(self.annotate(Error::unsupported(
                "ellipsis cannot fill branches of different depths",
            )));
        }
        let taildims = dimlength(tail) as i64;
        if tail.is_empty() || mindepth - 1 == taildims {
            let (h, t) = split_head(tail);
            self.getitem_next(h, t, advanced)
        } else if mindepth - 1 > taildims {
            let full = SliceItem::Range {
                start: None,
                end: None,
                step: 1,
            };
            let mut newtail = Vec::with_capacity(tail.len() + 1);
            newtail.push(SliceItem::Ellipsis);
            newtail.extend_from_slice(tail);
            self.getitem_next(Some(&full), &newtail, advanced)
        } else {
            Err(self.annotate(Error::unsupported("too many dimensions in slice")))
        }
    }

    /// Attach this node's classname and, when the failing row is known and
    /// labelled, its identity location.
    pub(crate) fn annotate(&self, err: Error) -> Error {
        let location = match (err.logical_index(), self.id()) {
            (Some(row), Some(id)) if 0 <= row && row < id.length() => Some(id.location_at(row)),
            _ => None,
        };
        err.with_context(self.classname(), location)
    }
}

/// Glue between the generic node structs and the concrete enum variants of
/// their index width.
pub(crate) trait IndexTyped: crate::index::IndexValue + Sized {
    const LIST_NAME: &'static str;
    const LIST_OFFSET_NAME: &'static str;
    const INDEXED_NAME: &'static str;
    const OPTION_NAME: &'static str;

    fn wrap_list(a: ListArray<Self>) -> Content;
    fn wrap_list_offset(a: ListOffsetArray<Self>) -> Content;
    fn wrap_indexed(a: IndexedArray<Self>) -> Content;
    fn wrap_option(a: OptionArray<Self>) -> Content;
}

impl IndexTyped for i32 {
    const LIST_NAME: &'static str = "ListArray32";
    const LIST_OFFSET_NAME: &'static str = "ListOffsetArray32";
    const INDEXED_NAME: &'static str = "IndexedArray32";
    const OPTION_NAME: &'static str = "OptionArray32";

    fn wrap_list(a: ListArray<Self>) -> Content {
        Content::List32(a)
    }

    fn wrap_list_offset(a: ListOffsetArray<Self>) -> Content {
        Content::ListOffset32(a)
    }

    fn wrap_indexed(a: IndexedArray<Self>) -> Content {
        Content::Indexed32(a)
    }

    fn wrap_option(a: OptionArray<Self>) -> Content {
        Content::Option32(a)
    }
}

impl IndexTyped for u32 {
    const LIST_NAME: &'static str = "ListArrayU32";
    const LIST_OFFSET_NAME: &'static str = "ListOffsetArrayU32";
    const INDEXED_NAME: &'static str = "IndexedArrayU32";
    const OPTION_NAME: &'static str = "OptionArrayU32";

    fn wrap_list(a: ListArray<Self>) -> Content {
        Content::ListU32(a)
    }

    fn wrap_list_offset(a: ListOffsetArray<Self>) -> Content {
        Content::ListOffsetU32(a)
    }

    fn wrap_indexed(a: IndexedArray<Self>) -> Content {
        Content::IndexedU32(a)
    }

    fn wrap_option(_a: OptionArray<Self>) -> Content {
        unreachable!("an unsigned index cannot encode missing values")
    }
}

impl IndexTyped for i64 {
    const LIST_NAME: &'static str = "ListArray64";
    const LIST_OFFSET_NAME: &'static str = "ListOffsetArray64";
    const INDEXED_NAME: &'static str = "IndexedArray64";
    const OPTION_NAME: &'static str = "OptionArray64";

    fn wrap_list(a: ListArray<Self>) -> Content {
        Content::List64(a)
    }

    fn wrap_list_offset(a: ListOffsetArray<Self>) -> Content {
        Content::ListOffset64(a)
    }

    fn wrap_indexed(a: IndexedArray<Self>) -> Content {
        Content::Indexed64(a)
    }

    fn wrap_option(a: OptionArray<Self>) -> Content {
        Content::Option64(a)
    }
}

fn list_depth(content: &Content) -> (i64, i64) {
    let (lo, hi) = content.minmax_depth();
    (lo + 1, hi + 1)
}

pub(crate) fn split_head(items: &[SliceItem]) -> (Option<&SliceItem>, &[SliceItem]) {
    match items.split_first() {
        None => (None, &[]),
        Some((head, tail)) => (Some(head), tail),
    }
}

/// Reintroduce the (row-major) shape of a fancy-index array around the
/// result of its cartesian recursion, innermost size first.
pub(crate) fn getitem_next_array_wrap(outcontent: Content, shape: &[i64]) -> Content {
    let mut out = Content::Regular(RegularArray::new(outcontent, shape[shape.len() - 1]));
    for i in (0..shape.len() - 1).rev() {
        out = Content::Regular(RegularArray::new(out, shape[i]));
    }
    out
}

/// A child's contribution to its parent's structural type: the stored type
/// (minus outer length) when one is present and wanted, the computed type
/// otherwise.
pub(crate) fn inner_or_stored(child: &Content, bare: bool) -> Type {
    match child.ty() {
        Some(t) if !bare => t.nolength(),
        _ => child.innertype(bare),
    }
}

/// Range bounds (with optional ends) of a `Range` slice item, regularized
/// against an axis of `length` elements, together with the number of
/// positions selected per row.
pub(crate) fn regularize_range_item(
    start: Option<isize>,
    end: Option<isize>,
    step: isize,
    length: i64,
) -> (i64, i64, i64, i64) {
    assert!(step != 0, "slice range step must be nonzero");
    let (mut s, mut e) = (
        start.map_or(0, |x| x as i64),
        end.map_or(0, |x| x as i64),
    );
    crate::kernels::regularize_rangeslice(
        &mut s,
        &mut e,
        step > 0,
        start.is_some(),
        end.is_some(),
        length,
    );
    let nextsize = crate::kernels::rangecount(s, e, step as i64);
    (s, e, step as i64, nextsize)
}
