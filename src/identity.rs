// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;

use crate::buffer::Buffer;
use crate::error::Error;
use crate::index::{Index64, IndexValue};
use crate::kernels;

/// Ordered `(depth, field name)` pairs naming the record fields an identity
/// descended through. `depth` is the table column at which the descent
/// happened.
pub type FieldLoc = Vec<(i64, String)>;

/// One width specialization of an identity table: `length` rows of `width`
/// integers in a shared buffer, starting at an element offset.
#[derive(Clone)]
pub struct IdentityOf<T> {
    buffer: Buffer<T>,
    offset: usize,
    width: i64,
    length: i64,
    fieldloc: FieldLoc,
}

impl<T: IndexValue> IdentityOf<T> {
    pub fn new(buffer: Buffer<T>, width: i64, length: i64, fieldloc: FieldLoc) -> Self {
        assert!(width >= 1, "identity width must be at least 1");
        assert!(
            (width * length) as usize <= buffer.len(),
            "identity table out of bounds"
        );
        IdentityOf {
            buffer,
            offset: 0,
            width,
            length,
            fieldloc,
        }
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.width
    }

    #[inline]
    pub fn length(&self) -> i64 {
        self.length
    }

    #[inline]
    pub fn fieldloc(&self) -> &FieldLoc {
        &self.fieldloc
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        let n = (self.width * self.length) as usize;
        &self.buffer.as_slice()[self.offset..self.offset + n]
    }

    fn row(&self, at: i64) -> &[T] {
        let w = self.width as usize;
        &self.as_slice()[at as usize * w..(at as usize + 1) * w]
    }

    fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Self {
        debug_assert!(0 <= start && start <= stop && stop <= self.length);
        IdentityOf {
            buffer: self.buffer.clone(),
            offset: self.offset + (start * self.width) as usize,
            width: self.width,
            length: stop - start,
            fieldloc: self.fieldloc.clone(),
        }
    }

    fn getitem_carry(&self, carry: &Index64) -> Result<Self, Error> {
        let mut out = vec![T::from_i64(0); (carry.length() * self.width) as usize];
        kernels::identity_getitem_carry(
            &mut out,
            self.as_slice(),
            carry.as_slice(),
            self.width,
            self.length,
        )?;
        Ok(IdentityOf::new(
            Buffer::from_vec(out),
            self.width,
            carry.length(),
            self.fieldloc.clone(),
        ))
    }
}

/// Synthetic row label attached to a node: a 2-D integer table of shape
/// `(length, width)` plus the field path descended through. Stored in a
/// 32-bit table until some level's length no longer fits, then widened
/// with [`Identity::to64`].
#[derive(Clone)]
pub enum Identity {
    I32(IdentityOf<i32>),
    I64(IdentityOf<i64>),
}

impl Identity {
    /// Fresh root identity `[0, length)` of width 1, in the narrowest table
    /// that fits.
    pub fn new(length: i64) -> Identity {
        if length <= i32::MAX as i64 {
            let mut out = vec![0i32; length as usize];
            kernels::new_identity(&mut out);
            Identity::I32(IdentityOf::new(Buffer::from_vec(out), 1, length, Vec::new()))
        } else {
            let mut out = vec![0i64; length as usize];
            kernels::new_identity(&mut out);
            Identity::I64(IdentityOf::new(Buffer::from_vec(out), 1, length, Vec::new()))
        }
    }

    pub fn classname(&self) -> &'static str {
        match self {
            Identity::I32(_) => "Identity32",
            Identity::I64(_) => "Identity64",
        }
    }

    pub fn width(&self) -> i64 {
        match self {
            Identity::I32(id) => id.width(),
            Identity::I64(id) => id.width(),
        }
    }

    pub fn length(&self) -> i64 {
        match self {
            Identity::I32(id) => id.length(),
            Identity::I64(id) => id.length(),
        }
    }

    pub fn fieldloc(&self) -> &FieldLoc {
        match self {
            Identity::I32(id) => id.fieldloc(),
            Identity::I64(id) => id.fieldloc(),
        }
    }

    /// Row values widened to `i64` regardless of specialization.
    pub fn values_at(&self, row: i64) -> Vec<i64> {
        match self {
            Identity::I32(id) => id.row(row).iter().map(|x| x.to_i64()).collect(),
            Identity::I64(id) => id.row(row).to_vec(),
        }
    }

    /// Widen a 32-bit table to 64 bits; a no-op (cheap clone) when already
    /// wide.
    pub fn to64(&self) -> Identity {
        match self {
            Identity::I32(id) => {
                let wide: Vec<i64> = id.as_slice().iter().map(|x| x.to_i64()).collect();
                Identity::I64(IdentityOf::new(
                    Buffer::from_vec(wide),
                    id.width(),
                    id.length(),
                    id.fieldloc().clone(),
                ))
            }
            Identity::I64(_) => self.clone(),
        }
    }

    /// Same table with one more field-path entry; shares the buffer.
    pub(crate) fn with_field(&self, depth: i64, key: &str) -> Identity {
        let mut out = self.clone();
        let entry = (depth, key.to_owned());
        match &mut out {
            Identity::I32(id) => id.fieldloc.push(entry),
            Identity::I64(id) => id.fieldloc.push(entry),
        }
        out
    }

    pub(crate) fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Identity {
        match self {
            Identity::I32(id) => Identity::I32(id.getitem_range_nowrap(start, stop)),
            Identity::I64(id) => Identity::I64(id.getitem_range_nowrap(start, stop)),
        }
    }

    pub(crate) fn getitem_carry(&self, carry: &Index64) -> Result<Identity, Error> {
        match self {
            Identity::I32(id) => id.getitem_carry(carry).map(Identity::I32),
            Identity::I64(id) => id.getitem_carry(carry).map(Identity::I64),
        }
    }

    /// Child identity for a fixed-size grouping: width + 1, one row per
    /// content element.
    pub(crate) fn for_regulararray(
        &self,
        size: i64,
        content_length: i64,
        outer_length: i64,
    ) -> Identity {
        match self {
            Identity::I32(id) => {
                let mut out = vec![0i32; (content_length * (id.width() + 1)) as usize];
                kernels::identity_from_regulararray(
                    &mut out,
                    id.as_slice(),
                    size,
                    content_length,
                    outer_length,
                    id.width(),
                );
                Identity::I32(IdentityOf::new(
                    Buffer::from_vec(out),
                    id.width() + 1,
                    content_length,
                    id.fieldloc().clone(),
                ))
            }
            Identity::I64(id) => {
                let mut out = vec![0i64; (content_length * (id.width() + 1)) as usize];
                kernels::identity_from_regulararray(
                    &mut out,
                    id.as_slice(),
                    size,
                    content_length,
                    outer_length,
                    id.width(),
                );
                Identity::I64(IdentityOf::new(
                    Buffer::from_vec(out),
                    id.width() + 1,
                    content_length,
                    id.fieldloc().clone(),
                ))
            }
        }
    }

    /// Child identity for variable-length sublists: width + 1, one row per
    /// content element, failing when sublists overlap.
    pub(crate) fn for_listarray<C: IndexValue>(
        &self,
        starts: &[C],
        stops: &[C],
        content_length: i64,
    ) -> Result<Identity, Error> {
        match self {
            Identity::I32(id) => {
                let mut out = vec![0i32; (content_length * (id.width() + 1)) as usize];
                kernels::identity_from_listarray(
                    &mut out,
                    id.as_slice(),
                    starts,
                    stops,
                    content_length,
                    id.width(),
                )?;
                Ok(Identity::I32(IdentityOf::new(
                    Buffer::from_vec(out),
                    id.width() + 1,
                    content_length,
                    id.fieldloc().clone(),
                )))
            }
            Identity::I64(id) => {
                let mut out = vec![0i64; (content_length * (id.width() + 1)) as usize];
                kernels::identity_from_listarray(
                    &mut out,
                    id.as_slice(),
                    starts,
                    stops,
                    content_length,
                    id.width(),
                )?;
                Ok(Identity::I64(IdentityOf::new(
                    Buffer::from_vec(out),
                    id.width() + 1,
                    content_length,
                    id.fieldloc().clone(),
                )))
            }
        }
    }

    /// Render one row's label, interleaving field names at the columns where
    /// record descents happened. Used in error context.
    pub fn location_at(&self, row: i64) -> String {
        if row < 0 || row >= self.length() {
            return String::new();
        }
        let values = self.values_at(row);
        let mut parts: Vec<String> = Vec::new();
        for (c, v) in values.iter().enumerate() {
            for (depth, name) in self.fieldloc() {
                if *depth == c as i64 {
                    parts.push(format!("\"{}\"", name));
                }
            }
            parts.push(v.to_string());
        }
        for (depth, name) in self.fieldloc() {
            if *depth >= values.len() as i64 {
                parts.push(format!("\"{}\"", name));
            }
        }
        parts.join(", ")
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(width={}, length={})",
            self.classname(),
            self.width(),
            self.length()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_root_enumerates_rows() {
        let id = Identity::new(4);
        assert_eq!(id.classname(), "Identity32");
        assert_eq!(id.width(), 1);
        assert_eq!(id.length(), 4);
        assert_eq!(id.values_at(3), vec![3]);
    }

    #[test]
    fn to64_preserves_table() {
        let id = Identity::new(3).to64();
        assert_eq!(id.classname(), "Identity64");
        assert_eq!(id.values_at(2), vec![2]);
    }

    #[test]
    fn carry_gathers_rows() {
        let id = Identity::new(4);
        let carried = id.getitem_carry(&Index64::from_vec(vec![2, 0, 0])).unwrap();
        assert_eq!(carried.length(), 3);
        assert_eq!(carried.values_at(0), vec![2]);
        assert_eq!(carried.values_at(2), vec![0]);

        let err = id.getitem_carry(&Index64::from_vec(vec![4])).unwrap_err();
        assert_eq!(err.slice_index(), Some(4));
    }

    #[test]
    fn location_interleaves_field_names() {
        let id = Identity::new(2)
            .for_regulararray(2, 4, 2)
            .with_field(1, "x");
        assert_eq!(id.location_at(3), "1, \"x\", 1");
    }
}
