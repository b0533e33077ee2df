// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::Arc;

use num_traits::ToPrimitive;

use crate::buffer::Buffer;
use crate::content::{Content, IndexedArray, RegularArray};
use crate::error::Error;
use crate::identity::Identity;
use crate::index::Index64;
use crate::kernels;
use crate::slice::SliceItem;
use crate::types::{DType, Type};

/// Type-erased primitive storage of a leaf.
#[derive(Clone, Debug)]
pub enum PrimitiveData {
    Bool(Buffer<bool>),
    I8(Buffer<i8>),
    U8(Buffer<u8>),
    I16(Buffer<i16>),
    U16(Buffer<u16>),
    I32(Buffer<i32>),
    U32(Buffer<u32>),
    I64(Buffer<i64>),
    U64(Buffer<u64>),
    F32(Buffer<f32>),
    F64(Buffer<f64>),
}

macro_rules! with_primitive {
    ($data:expr, $buf:ident => $body:expr) => {
        match $data {
            PrimitiveData::Bool($buf) => $body,
            PrimitiveData::I8($buf) => $body,
            PrimitiveData::U8($buf) => $body,
            PrimitiveData::I16($buf) => $body,
            PrimitiveData::U16($buf) => $body,
            PrimitiveData::I32($buf) => $body,
            PrimitiveData::U32($buf) => $body,
            PrimitiveData::I64($buf) => $body,
            PrimitiveData::U64($buf) => $body,
            PrimitiveData::F32($buf) => $body,
            PrimitiveData::F64($buf) => $body,
        }
    };
}

impl PrimitiveData {
    pub fn dtype(&self) -> DType {
        match self {
            PrimitiveData::Bool(_) => DType::Bool,
            PrimitiveData::I8(_) => DType::Int8,
            PrimitiveData::U8(_) => DType::UInt8,
            PrimitiveData::I16(_) => DType::Int16,
            PrimitiveData::U16(_) => DType::UInt16,
            PrimitiveData::I32(_) => DType::Int32,
            PrimitiveData::U32(_) => DType::UInt32,
            PrimitiveData::I64(_) => DType::Int64,
            PrimitiveData::U64(_) => DType::UInt64,
            PrimitiveData::F32(_) => DType::Float32,
            PrimitiveData::F64(_) => DType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        with_primitive!(self, buf => buf.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two leaves share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PrimitiveData::Bool(a), PrimitiveData::Bool(b)) => a.ptr_eq(b),
            (PrimitiveData::I8(a), PrimitiveData::I8(b)) => a.ptr_eq(b),
            (PrimitiveData::U8(a), PrimitiveData::U8(b)) => a.ptr_eq(b),
            (PrimitiveData::I16(a), PrimitiveData::I16(b)) => a.ptr_eq(b),
            (PrimitiveData::U16(a), PrimitiveData::U16(b)) => a.ptr_eq(b),
            (PrimitiveData::I32(a), PrimitiveData::I32(b)) => a.ptr_eq(b),
            (PrimitiveData::U32(a), PrimitiveData::U32(b)) => a.ptr_eq(b),
            (PrimitiveData::I64(a), PrimitiveData::I64(b)) => a.ptr_eq(b),
            (PrimitiveData::U64(a), PrimitiveData::U64(b)) => a.ptr_eq(b),
            (PrimitiveData::F32(a), PrimitiveData::F32(b)) => a.ptr_eq(b),
            (PrimitiveData::F64(a), PrimitiveData::F64(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

macro_rules! impl_primitive_from_vec {
    ($t:ty, $variant:ident) => {
        impl From<Vec<$t>> for PrimitiveData {
            fn from(v: Vec<$t>) -> PrimitiveData {
                PrimitiveData::$variant(Buffer::from_vec(v))
            }
        }

        impl From<Vec<$t>> for NumpyArray {
            fn from(v: Vec<$t>) -> NumpyArray {
                NumpyArray::from_data(PrimitiveData::from(v))
            }
        }

        impl From<Vec<$t>> for Content {
            fn from(v: Vec<$t>) -> Content {
                Content::Numpy(NumpyArray::from(v))
            }
        }
    };
}
impl_primitive_from_vec!(bool, Bool);
impl_primitive_from_vec!(i8, I8);
impl_primitive_from_vec!(u8, U8);
impl_primitive_from_vec!(i16, I16);
impl_primitive_from_vec!(u16, U16);
impl_primitive_from_vec!(i32, I32);
impl_primitive_from_vec!(u32, U32);
impl_primitive_from_vec!(i64, I64);
impl_primitive_from_vec!(u64, U64);
impl_primitive_from_vec!(f32, F32);
impl_primitive_from_vec!(f64, F64);

/// A single primitive value read out of a leaf, classified for rendering.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

/// Dense rectangular leaf: a primitive buffer addressed through an element
/// offset, shape and strides (in elements). Positional gets are pure view
/// arithmetic; gathers are represented as [`IndexedArray`] views so that
/// payload buffers are never copied.
#[derive(Clone, Debug)]
pub struct NumpyArray {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
    data: PrimitiveData,
    shape: Vec<i64>,
    strides: Vec<i64>,
    offset: i64,
}

impl NumpyArray {
    /// A one-dimensional, contiguous leaf over the whole of `data`.
    pub fn from_data(data: PrimitiveData) -> NumpyArray {
        let len = data.len() as i64;
        NumpyArray {
            id: None,
            ty: None,
            data,
            shape: vec![len],
            strides: vec![1],
            offset: 0,
        }
    }

    /// A leaf with explicit shape, strides (in elements) and offset.
    ///
    /// **Panics** if shape and strides disagree, or addressing the extreme
    /// elements would leave the buffer.
    pub fn new(data: PrimitiveData, shape: Vec<i64>, strides: Vec<i64>, offset: i64) -> NumpyArray {
        assert_eq!(shape.len(), strides.len(), "shape and strides must agree");
        assert!(shape.iter().all(|&d| d >= 0), "shape must be nonnegative");
        let numel: i64 = shape.iter().product();
        if numel > 0 {
            let mut lo = offset;
            let mut hi = offset;
            for (d, s) in shape.iter().zip(&strides) {
                if *s >= 0 {
                    hi += (d - 1) * s;
                } else {
                    lo += (d - 1) * s;
                }
            }
            assert!(
                0 <= lo && hi < data.len() as i64,
                "shape and strides address outside the buffer"
            );
        }
        NumpyArray {
            id: None,
            ty: None,
            data,
            shape,
            strides,
            offset,
        }
    }

    pub fn data(&self) -> &PrimitiveData {
        &self.data
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    pub fn strides(&self) -> &[i64] {
        &self.strides
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn classname(&self) -> &'static str {
        "NumpyArray"
    }

    pub fn length(&self) -> i64 {
        self.shape.first().copied().unwrap_or(1)
    }

    /// The value of a zero-dimensional (scalar) view.
    pub fn scalar_value(&self) -> ScalarValue {
        debug_assert!(self.shape.is_empty(), "scalar_value on a non-scalar leaf");
        self.value_at_offset(self.offset)
    }

    fn value_at_offset(&self, offset: i64) -> ScalarValue {
        let k = offset as usize;
        match &self.data {
            PrimitiveData::Bool(b) => ScalarValue::Bool(b.as_slice()[k]),
            PrimitiveData::F32(b) => ScalarValue::Float(b.as_slice()[k] as f64),
            PrimitiveData::F64(b) => ScalarValue::Float(b.as_slice()[k]),
            PrimitiveData::I8(b) => ScalarValue::Int(b.as_slice()[k] as i64),
            PrimitiveData::U8(b) => ScalarValue::Int(b.as_slice()[k] as i64),
            PrimitiveData::I16(b) => ScalarValue::Int(b.as_slice()[k] as i64),
            PrimitiveData::U16(b) => ScalarValue::Int(b.as_slice()[k] as i64),
            PrimitiveData::I32(b) => ScalarValue::Int(b.as_slice()[k] as i64),
            PrimitiveData::U32(b) => ScalarValue::Int(b.as_slice()[k] as i64),
            PrimitiveData::I64(b) => ScalarValue::Int(b.as_slice()[k]),
            PrimitiveData::U64(b) => {
                let x = b.as_slice()[k];
                match x.to_i64() {
                    Some(x) => ScalarValue::Int(x),
                    None => ScalarValue::Float(x as f64),
                }
            }
        }
    }

    /// Element values in row-major logical order, rendered for diagnostics;
    /// at most `cap` of them.
    pub(crate) fn value_strings(&self, cap: usize) -> Vec<String> {
        let numel: i64 = self.shape.iter().product();
        let mut out = Vec::new();
        let mut odometer = vec![0i64; self.shape.len()];
        for _ in 0..numel.min(cap as i64) {
            let offset: i64 = self.offset
                + odometer
                    .iter()
                    .zip(&self.strides)
                    .map(|(i, s)| i * s)
                    .sum::<i64>();
            out.push(match self.value_at_offset(offset) {
                ScalarValue::Bool(x) => x.to_string(),
                ScalarValue::Int(x) => x.to_string(),
                ScalarValue::Float(x) => x.to_string(),
            });
            for axis in (0..odometer.len()).rev() {
                odometer[axis] += 1;
                if odometer[axis] < self.shape[axis] {
                    break;
                }
                odometer[axis] = 0;
            }
        }
        out
    }

    pub fn setid_with(&mut self, id: Option<Identity>) -> Result<(), Error> {
        if let Some(id) = &id {
            if id.length() != self.length() {
                return Err(Error::identity_length(self.length(), id.length())
                    .with_context(self.classname(), None));
            }
        }
        self.id = id;
        Ok(())
    }

    pub fn innertype(&self, _bare: bool) -> Type {
        let mut out = Type::Primitive(self.dtype());
        for k in (1..self.shape.len()).rev() {
            out = Type::regular(out, self.shape[k]);
        }
        out
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        ty.level().shallow_equal(&self.innertype(true).level())
    }

    pub fn settype_part(&mut self, ty: Arc<Type>) -> Result<(), Error> {
        if !self.accepts(ty.as_ref()) {
            return Err(self.type_error(ty.as_ref()));
        }
        self.ty = Some(ty);
        Ok(())
    }

    fn type_error(&self, ty: &Type) -> Error {
        let given = Type::array(ty.clone(), self.length());
        let bare = Type::array(self.innertype(true), self.length());
        Error::type_mismatch(given.compare(&bare)).with_context(self.classname(), None)
    }

    pub fn getitem_at_nowrap(&self, at: i64) -> Result<Content, Error> {
        if self.shape.is_empty() {
            return Ok(Content::Numpy(self.clone()));
        }
        Ok(Content::Numpy(NumpyArray {
            id: None,
            ty: None,
            data: self.data.clone(),
            shape: self.shape[1..].to_vec(),
            strides: self.strides[1..].to_vec(),
            offset: self.offset + at * self.strides[0],
        }))
    }

    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> NumpyArray {
        if self.shape.is_empty() {
            return self.clone();
        }
        let mut shape = self.shape.clone();
        shape[0] = stop - start;
        NumpyArray {
            id: self.id.as_ref().map(|id| id.getitem_range_nowrap(start, stop)),
            ty: self.ty.clone(),
            data: self.data.clone(),
            shape,
            strides: self.strides.clone(),
            offset: self.offset + start * self.strides[0],
        }
    }

    pub fn getitem_field(&self, _key: &str) -> Result<Content, Error> {
        Err(Error::no_records())
    }

    pub fn getitem_fields(&self, _keys: &[String]) -> Result<Content, Error> {
        Err(Error::no_records())
    }

    /// Gather into an [`IndexedArray`] view: the carry becomes the index,
    /// the payload buffer is shared untouched. A multi-dimensional leaf is
    /// promoted to fixed-size groups first, so its rows gather as groups.
    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        if self.ndim() > 1 {
            let mut out = self.to_regular()?.carry(carry)?;
            if let Some(id) = &self.id {
                out.setid_with(Some(id.getitem_carry(carry)?))?;
            }
            return Ok(out);
        }
        let mut validated = vec![0i64; carry.length() as usize];
        kernels::indexedarray_getitem_nextcarry(&mut validated, carry.as_slice(), self.length())?;
        let id = match &self.id {
            Some(id) => Some(id.getitem_carry(carry)?),
            None => None,
        };
        let mut bare = self.clone();
        bare.id = None;
        let mut out = IndexedArray::new(Index64::from_vec(validated), Content::Numpy(bare));
        out.id = id;
        Ok(Content::Indexed64(out))
    }

    /// Promote a multi-dimensional leaf to nested fixed-size groupings over
    /// a flat leaf. Requires row-major-nested strides.
    pub fn to_regular(&self) -> Result<Content, Error> {
        if self.ndim() <= 1 {
            return Ok(Content::Numpy(self.clone()));
        }
        for k in 0..self.ndim() - 1 {
            if self.strides[k] != self.strides[k + 1] * self.shape[k + 1] {
                return Err(Error::unsupported(
                    "cannot regroup a leaf with irregular strides",
                ));
            }
        }
        let numel: i64 = self.shape.iter().product();
        let flat = NumpyArray {
            id: None,
            ty: None,
            data: self.data.clone(),
            shape: vec![numel],
            strides: vec![self.strides[self.ndim() - 1]],
            offset: self.offset,
        };
        let mut out = Content::Numpy(flat);
        for k in (1..self.ndim()).rev() {
            out = Content::Regular(RegularArray::new(out, self.shape[k]));
        }
        Ok(out)
    }

    pub fn getitem_next(
        &self,
        head: &SliceItem,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        if self.ndim() > 1 {
            return self.to_regular()?.getitem_next(Some(head), tail, advanced);
        }
        Err(Error::unsupported("too many dimensions in slice"))
    }
}

/// Zero-length, unknown-typed leaf.
#[derive(Clone, Debug, Default)]
pub struct EmptyArray {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
}

impl EmptyArray {
    pub fn new() -> EmptyArray {
        EmptyArray { id: None, ty: None }
    }

    pub fn classname(&self) -> &'static str {
        "EmptyArray"
    }

    pub fn length(&self) -> i64 {
        0
    }

    pub fn setid_with(&mut self, id: Option<Identity>) -> Result<(), Error> {
        if let Some(id) = &id {
            if id.length() != 0 {
                return Err(Error::identity_length(0, id.length())
                    .with_context(self.classname(), None));
            }
        }
        self.id = id;
        Ok(())
    }

    pub fn innertype(&self, _bare: bool) -> Type {
        Type::Unknown
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        ty.level().shallow_equal(&Type::Unknown)
    }

    pub fn settype_part(&mut self, ty: Arc<Type>) -> Result<(), Error> {
        if !self.accepts(ty.as_ref()) {
            let given = Type::array((*ty).clone(), 0);
            let bare = Type::array(Type::Unknown, 0);
            return Err(Error::type_mismatch(given.compare(&bare))
                .with_context(self.classname(), None));
        }
        self.ty = Some(ty);
        Ok(())
    }

    pub fn getitem_at_nowrap(&self, at: i64) -> Result<Content, Error> {
        Err(Error::out_of_bounds("index out of range", Some(at), None))
    }

    pub fn getitem_range_nowrap(&self, _start: i64, _stop: i64) -> Content {
        Content::Empty(self.clone())
    }

    pub fn getitem_field(&self, _key: &str) -> Result<Content, Error> {
        Err(Error::no_records())
    }

    pub fn getitem_fields(&self, _keys: &[String]) -> Result<Content, Error> {
        Err(Error::no_records())
    }

    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        if !carry.is_empty() {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(carry.get(0)),
                None,
            ));
        }
        Ok(Content::Empty(self.clone()))
    }

    pub fn getitem_next(
        &self,
        head: &SliceItem,
        _tail: &[SliceItem],
        _advanced: &Index64,
    ) -> Result<Content, Error> {
        match head {
            SliceItem::Index(at) => Err(Error::out_of_bounds(
                "index out of range",
                Some(*at as i64),
                None,
            )),
            SliceItem::Range { .. } => Ok(Content::Empty(self.clone())),
            SliceItem::Array(array) => {
                if array.ravel().is_empty() {
                    Ok(crate::content::getitem_next_array_wrap(
                        Content::Empty(self.clone()),
                        array.shape(),
                    ))
                } else {
                    Err(Error::out_of_bounds(
                        "index out of range",
                        Some(array.ravel()[0]),
                        None,
                    ))
                }
            }
            _ => unreachable!("non-numeric head dispatched to a leaf"),
        }
    }
}
