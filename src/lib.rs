// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `ragged` crate provides a columnar engine for ragged, nested,
//! heterogeneous array data: arrays whose elements may themselves be
//! variable-length lists, records, optionals, or unions, kept in flat,
//! contiguous, shared buffers.
//!
//! - [`Content`]: a node in the array tree — primitive leaves
//!   ([`NumpyArray`], [`EmptyArray`]), groupings ([`RegularArray`],
//!   [`ListArray`], [`ListOffsetArray`]), indirection ([`IndexedArray`],
//!   [`OptionArray`]), [`UnionArray`] and [`RecordArray`].
//! - [`SliceInfo`]: a parsed N-dimensional indexer — integers, ranges with
//!   arbitrary step and negative indices counted from the end of the axis,
//!   new axes, ellipses, integer arrays, field names — built conveniently
//!   with the [`s![]`](s!) macro.
//! - [`Identity`]: synthetic row labels that follow elements through every
//!   slicing transform.
//! - [`Type`]: structural types mirroring the node family, with shallow and
//!   deep equality and record introspection.
//!
//! ## Highlights
//!
//! - Slicing, also with arbitrary step size, fancy indexing, and negative
//!   indices to mean elements from the end of the axis.
//! - Slicing never copies payload buffers: results are new trees of views
//!   whose integer indexes are the only fresh allocations.
//! - Nodes are immutable after construction, so trees can be read from many
//!   threads and share children freely.
//! - An XML-like diagnostic renderer (`tostring`) and a JSON event
//!   interface ([`JsonBuilder`]) for host bindings.
//!
//! ## Example
//!
//! ```
//! use ragged::{s, Content, RegularArray};
//!
//! // [[0, 1, 2], [3, 4, 5], [6, 7, 8], [9, 10, 11]]
//! let array = Content::Regular(RegularArray::new(
//!     Content::from((0..12).collect::<Vec<i64>>()),
//!     3,
//! ));
//! let last = array.getitem_at(-1).unwrap();
//! assert_eq!(last.tojson().unwrap(), "[9,10,11]");
//!
//! let sliced = array.getitem(&s![1..3, 0..2]).unwrap();
//! assert_eq!(sliced.tojson().unwrap(), "[[3,4],[6,7]]");
//! ```

mod arrayformat;
mod buffer;
mod content;
mod error;
mod identity;
mod index;
mod iter;
mod json;
pub mod kernels;
mod slice;
mod types;

pub use crate::arrayformat::tostring_part;
pub use crate::buffer::Buffer;
pub use crate::content::{
    Content, EmptyArray, IndexedArray, ListArray, ListOffsetArray, NumpyArray, OptionArray,
    PrimitiveData, RecordArray, RegularArray, ScalarValue, UnionArray,
};
pub use crate::error::{Error, ErrorKind};
pub use crate::identity::{FieldLoc, Identity, IdentityOf};
pub use crate::index::{Index, Index32, Index64, Index8, IndexU32, IndexValue};
pub use crate::iter::Iter;
pub use crate::json::{JsonBuilder, ToJsonString};
pub use crate::slice::{Ellipsis, NewAxis, Slice, SliceArray, SliceInfo, SliceItem};
pub use crate::types::{DType, RecordType, Type};
