// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::Arc;

use crate::content::{Content, IndexTyped};
use crate::error::Error;
use crate::identity::Identity;
use crate::index::{Index, Index64};
use crate::kernels;
use crate::slice::SliceItem;
use crate::types::Type;

/// Lazy gather: element i is `content[index[i]]`. The index composes under
/// further gathers, so payload buffers never move.
#[derive(Clone, Debug)]
pub struct IndexedArray<T> {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
    pub(crate) index: Index<T>,
    pub(crate) content: Box<Content>,
}

impl<T: IndexTyped> IndexedArray<T> {
    pub fn new(index: Index<T>, content: Content) -> IndexedArray<T> {
        IndexedArray {
            id: None,
            ty: None,
            index,
            content: Box::new(content),
        }
    }

    pub fn index(&self) -> &Index<T> {
        &self.index
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn classname(&self) -> &'static str {
        T::INDEXED_NAME
    }

    pub fn length(&self) -> i64 {
        self.index.length()
    }

    pub fn setid_with(&mut self, id: Option<Identity>) -> Result<(), Error> {
        match id {
            None => {
                self.content.setid_with(None)?;
                self.id = None;
            }
            Some(id) => {
                if id.length() != self.length() {
                    return Err(Error::identity_length(self.length(), id.length())
                        .with_context(self.classname(), None));
                }
                // Rows of the content are not one-to-one with rows of this
                // node, so the label stays here rather than propagating.
                self.id = Some(id);
            }
        }
        Ok(())
    }

    pub fn innertype(&self, bare: bool) -> Type {
        self.content.innertype(bare)
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        self.content.accepts(ty)
    }

    pub fn settype_part(&mut self, ty: Arc<Type>) -> Result<(), Error> {
        self.content.settype_part((*ty).clone())?;
        self.ty = Some(ty);
        Ok(())
    }

    pub fn getitem_at_nowrap(&self, at: i64) -> Result<Content, Error> {
        let x = self.index.get(at).to_i64();
        if x < 0 || x >= self.content.length() {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(x),
                Some(at),
            ));
        }
        self.content.getitem_at_nowrap(x)
    }

    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Content {
        T::wrap_indexed(IndexedArray {
            id: self
                .id
                .as_ref()
                .map(|id| id.getitem_range_nowrap(start, stop)),
            ty: self.ty.clone(),
            index: self.index.getitem_range_nowrap(start, stop),
            content: self.content.clone(),
        })
    }

    pub fn getitem_field(&self, key: &str) -> Result<Content, Error> {
        Ok(T::wrap_indexed(IndexedArray {
            id: self.id.clone(),
            ty: None,
            index: self.index.clone(),
            content: Box::new(self.content.getitem_field(key)?),
        }))
    }

    pub fn getitem_fields(&self, keys: &[String]) -> Result<Content, Error> {
        Ok(T::wrap_indexed(IndexedArray {
            id: self.id.clone(),
            ty: None,
            index: self.index.clone(),
            content: Box::new(self.content.getitem_fields(keys)?),
        }))
    }

    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        let mut outindex = vec![T::from_i64(0); carry.length() as usize];
        for (i, &c) in carry.as_slice().iter().enumerate() {
            if c < 0 || c >= self.length() {
                return Err(Error::out_of_bounds(
                    "index out of range",
                    Some(c),
                    Some(i as i64),
                ));
            }
            outindex[i] = self.index.get(c);
        }
        let id = match &self.id {
            Some(id) => Some(id.getitem_carry(carry)?),
            None => None,
        };
        Ok(T::wrap_indexed(IndexedArray {
            id,
            ty: self.ty.clone(),
            index: Index::from_vec(outindex),
            content: self.content.clone(),
        }))
    }

    pub fn getitem_next(
        &self,
        head: &SliceItem,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        if self.content.minmax_depth().0 == 1 {
            return Err(Error::unsupported("too many dimensions in slice"));
        }
        let mut nextcarry = vec![0i64; self.length() as usize];
        kernels::indexedarray_getitem_nextcarry(
            &mut nextcarry,
            self.index.as_slice(),
            self.content.length(),
        )?;
        let next = self.content.carry(&Index64::from_vec(nextcarry))?;
        next.getitem_next(Some(head), tail, advanced)
    }
}

/// Optional elements: element i is missing when `index[i] < 0`, otherwise
/// `content[index[i]]`.
#[derive(Clone, Debug)]
pub struct OptionArray<T> {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
    pub(crate) index: Index<T>,
    pub(crate) content: Box<Content>,
}

impl<T: IndexTyped> OptionArray<T> {
    pub fn new(index: Index<T>, content: Content) -> OptionArray<T> {
        OptionArray {
            id: None,
            ty: None,
            index,
            content: Box::new(content),
        }
    }

    pub fn index(&self) -> &Index<T> {
        &self.index
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Whether element `at` is missing.
    pub fn is_missing(&self, at: i64) -> bool {
        self.index.get(at).to_i64() < 0
    }

    pub fn classname(&self) -> &'static str {
        T::OPTION_NAME
    }

    pub fn length(&self) -> i64 {
        self.index.length()
    }

    pub fn setid_with(&mut self, id: Option<Identity>) -> Result<(), Error> {
        match id {
            None => {
                self.content.setid_with(None)?;
                self.id = None;
            }
            Some(id) => {
                if id.length() != self.length() {
                    return Err(Error::identity_length(self.length(), id.length())
                        .with_context(self.classname(), None));
                }
                self.id = Some(id);
            }
        }
        Ok(())
    }

    pub fn innertype(&self, bare: bool) -> Type {
        Type::option(self.content.innertype(bare))
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        match ty {
            Type::Option(_) => self.content.accepts(ty.option_type()),
            _ => false,
        }
    }

    pub fn settype_part(&mut self, ty: Arc<Type>) -> Result<(), Error> {
        if !self.accepts(ty.as_ref()) {
            let given = Type::array((*ty).clone(), self.length());
            let bare = Type::array(self.innertype(true), self.length());
            return Err(
                Error::type_mismatch(given.compare(&bare)).with_context(self.classname(), None)
            );
        }
        self.content.settype_part(ty.option_type().clone())?;
        self.ty = Some(ty);
        Ok(())
    }

    /// A missing element materializes as the typed empty view of the
    /// content; present elements delegate.
    pub fn getitem_at_nowrap(&self, at: i64) -> Result<Content, Error> {
        let x = self.index.get(at).to_i64();
        if x < 0 {
            return Ok(self.content.getitem_nothing());
        }
        if x >= self.content.length() {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(x),
                Some(at),
            ));
        }
        self.content.getitem_at_nowrap(x)
    }

    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Content {
        T::wrap_option(OptionArray {
            id: self
                .id
                .as_ref()
                .map(|id| id.getitem_range_nowrap(start, stop)),
            ty: self.ty.clone(),
            index: self.index.getitem_range_nowrap(start, stop),
            content: self.content.clone(),
        })
    }

    pub fn getitem_field(&self, key: &str) -> Result<Content, Error> {
        Ok(T::wrap_option(OptionArray {
            id: self.id.clone(),
            ty: None,
            index: self.index.clone(),
            content: Box::new(self.content.getitem_field(key)?),
        }))
    }

    pub fn getitem_fields(&self, keys: &[String]) -> Result<Content, Error> {
        Ok(T::wrap_option(OptionArray {
            id: self.id.clone(),
            ty: None,
            index: self.index.clone(),
            content: Box::new(self.content.getitem_fields(keys)?),
        }))
    }

    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        let mut outindex = vec![T::from_i64(0); carry.length() as usize];
        for (i, &c) in carry.as_slice().iter().enumerate() {
            if c < 0 || c >= self.length() {
                return Err(Error::out_of_bounds(
                    "index out of range",
                    Some(c),
                    Some(i as i64),
                ));
            }
            outindex[i] = self.index.get(c);
        }
        let id = match &self.id {
            Some(id) => Some(id.getitem_carry(carry)?),
            None => None,
        };
        Ok(T::wrap_option(OptionArray {
            id,
            ty: self.ty.clone(),
            index: Index::from_vec(outindex),
            content: self.content.clone(),
        }))
    }

    /// Option projection: compact out the missing slots, slice the rest,
    /// and rewrap so the missing slots reappear in the result.
    pub fn getitem_next(
        &self,
        head: &SliceItem,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        if self.content.minmax_depth().0 == 1 {
            return Err(Error::unsupported("too many dimensions in slice"));
        }
        let numnull = kernels::indexedarray_numnull(self.index.as_slice());
        let mut nextcarry = vec![0i64; (self.length() - numnull) as usize];
        let mut outindex = vec![0i64; self.length() as usize];
        kernels::indexedarray_getitem_nextcarry_outindex(
            &mut nextcarry,
            &mut outindex,
            self.index.as_slice(),
            self.content.length(),
        )?;
        let next = self.content.carry(&Index64::from_vec(nextcarry))?;
        // the broadcast state must stay aligned with the compacted rows
        let adv = if advanced.is_empty() {
            Index64::empty()
        } else {
            let mut v = Vec::with_capacity(outindex.len());
            for (i, &o) in outindex.iter().enumerate() {
                if o >= 0 {
                    v.push(advanced.get(i as i64));
                }
            }
            Index64::from_vec(v)
        };
        let out = next.getitem_next(Some(head), tail, &adv)?;
        Ok(Content::Option64(OptionArray {
            id: self.id.clone(),
            ty: None,
            index: Index64::from_vec(outindex),
            content: Box::new(out),
        }))
    }
}
