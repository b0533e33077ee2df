// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::Arc;

use num_integer::Integer;

use crate::content::{
    getitem_next_array_wrap, inner_or_stored, regularize_range_item, split_head, Content,
};
use crate::error::Error;
use crate::identity::Identity;
use crate::index::Index64;
use crate::kernels;
use crate::slice::SliceItem;
use crate::types::Type;

/// Groups its content into fixed-size sublists; `length` is
/// `content.length / size` (floor), so trailing content elements that do
/// not fill a group are invisible and stay invisible when content grows.
#[derive(Clone, Debug)]
pub struct RegularArray {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
    pub(crate) content: Box<Content>,
    pub(crate) size: i64,
}

impl RegularArray {
    pub fn new(content: Content, size: i64) -> RegularArray {
        assert!(size >= 0, "RegularArray size must be nonnegative");
        RegularArray {
            id: None,
            ty: None,
            content: Box::new(content),
            size,
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn classname(&self) -> &'static str {
        "RegularArray"
    }

    pub fn length(&self) -> i64 {
        if self.size == 0 {
            0
        } else {
            Integer::div_floor(&self.content.length(), &self.size)
        }
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
                let bigid = if self.content.length() > i32::MAX as i64 {
                    id.to64()
                } else {
                    id.clone()
                };
                let subid =
                    bigid.for_regulararray(self.size, self.content.length(), self.length());
                self.content.setid_with(Some(subid))?;
                self.id = Some(id);
            }
        }
        Ok(())
    }

    pub fn innertype(&self, bare: bool) -> Type {
        Type::regular(inner_or_stored(&self.content, bare), self.size)
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        let model = Type::regular(Type::Unknown, self.size);
        ty.level().shallow_equal(&model)
    }

    pub fn settype_part(&mut self, ty: Arc<Type>) -> Result<(), Error> {
        if !self.accepts(ty.as_ref()) {
            let given = Type::array((*ty).clone(), self.length());
            let bare = Type::array(self.innertype(true), self.length());
            return Err(
                Error::type_mismatch(given.compare(&bare)).with_context(self.classname(), None)
            );
        }
        self.content.settype_part(ty.inner())?;
        self.ty = Some(ty);
        Ok(())
    }

    pub fn getitem_at_nowrap(&self, at: i64) -> Result<Content, Error> {
        Ok(self
            .content
            .getitem_range_nowrap(at * self.size, (at + 1) * self.size))
    }

    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Content {
        Content::Regular(RegularArray {
            id: self
                .id
                .as_ref()
                .map(|id| id.getitem_range_nowrap(start, stop)),
            ty: self.ty.clone(),
            content: Box::new(
                self.content
                    .getitem_range_nowrap(start * self.size, stop * self.size),
            ),
            size: self.size,
        })
    }

    pub fn getitem_field(&self, key: &str) -> Result<Content, Error> {
        Ok(Content::Regular(RegularArray {
            id: self.id.clone(),
            ty: None,
            content: Box::new(self.content.getitem_field(key)?),
            size: self.size,
        }))
    }

    pub fn getitem_fields(&self, keys: &[String]) -> Result<Content, Error> {
        Ok(Content::Regular(RegularArray {
            id: self.id.clone(),
            ty: None,
            content: Box::new(self.content.getitem_fields(keys)?),
            size: self.size,
        }))
    }

    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        let mut nextcarry = vec![0i64; (carry.length() * self.size) as usize];
        kernels::regulararray_getitem_carry(&mut nextcarry, carry.as_slice(), self.size);

        let id = match &self.id {
            Some(id) => Some(id.getitem_carry(carry)?),
            None => None,
        };
        Ok(Content::Regular(RegularArray {
            id,
            ty: self.ty.clone(),
            content: Box::new(self.content.carry(&Index64::from_vec(nextcarry))?),
            size: self.size,
        }))
    }

    pub fn getitem_next(
        &self,
        head: &SliceItem,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        match head {
            SliceItem::Index(at) => self.getitem_next_at(*at as i64, tail, advanced),
            SliceItem::Range { start, end, step } => {
                self.getitem_next_range(*start, *end, *step, tail, advanced)
            }
            SliceItem::Array(array) => self.getitem_next_array(array, tail, advanced),
            _ => unreachable!("non-numeric head dispatched to RegularArray"),
        }
    }

    fn getitem_next_at(
        &self,
        at: i64,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        assert!(
            advanced.is_empty(),
            "an integer item cannot follow a fancy index here"
        );
        let len = self.length();
        let (nexthead, nexttail) = split_head(tail);

        let mut nextcarry = vec![0i64; len as usize];
        kernels::regulararray_getitem_next_at(&mut nextcarry, at, len, self.size)?;

        let nextcontent = self.content.carry(&Index64::from_vec(nextcarry))?;
        nextcontent.getitem_next(nexthead, nexttail, advanced)
    }

    fn getitem_next_range(
        &self,
        start: Option<isize>,
        end: Option<isize>,
        step: isize,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        let len = self.length();
        let (nexthead, nexttail) = split_head(tail);
        let (regular_start, _, step, nextsize) =
            regularize_range_item(start, end, step, self.size);

        let mut nextcarry = vec![0i64; (len * nextsize) as usize];
        kernels::regulararray_getitem_next_range(
            &mut nextcarry,
            regular_start,
            step,
            len,
            self.size,
            nextsize,
        );
        let nextcontent = self.content.carry(&Index64::from_vec(nextcarry))?;

        let outtype = self.ty.as_ref().and_then(|t| match t.as_ref() {
            Type::Regular(inner, _) => Some(Arc::new(Type::Regular(inner.clone(), nextsize))),
            _ => None,
        });

        let out = if advanced.is_empty() {
            nextcontent.getitem_next(nexthead, nexttail, advanced)?
        } else {
            let mut nextadvanced = vec![0i64; (len * nextsize) as usize];
            kernels::regulararray_getitem_next_range_spreadadvanced(
                &mut nextadvanced,
                advanced.as_slice(),
                len,
                nextsize,
            );
            nextcontent.getitem_next(nexthead, nexttail, &Index64::from_vec(nextadvanced))?
        };
        Ok(Content::Regular(RegularArray {
            id: self.id.clone(),
            ty: outtype,
            content: Box::new(out),
            size: nextsize,
        }))
    }

    fn getitem_next_array(
        &self,
        array: &crate::slice::SliceArray,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        let len = self.length();
        let (nexthead, nexttail) = split_head(tail);

        let flathead = array.ravel();
        let mut regular_flathead = vec![0i64; flathead.len()];
        kernels::regulararray_getitem_next_array_regularize(
            &mut regular_flathead,
            flathead,
            self.size,
        )?;

        if advanced.is_empty() {
            let n = (len as usize) * flathead.len();
            let mut nextcarry = vec![0i64; n];
            let mut nextadvanced = vec![0i64; n];
            kernels::regulararray_getitem_next_array(
                &mut nextcarry,
                &mut nextadvanced,
                &regular_flathead,
                len,
                self.size,
            );
            let nextcontent = self.content.carry(&Index64::from_vec(nextcarry))?;
            let out =
                nextcontent.getitem_next(nexthead, nexttail, &Index64::from_vec(nextadvanced))?;
            Ok(getitem_next_array_wrap(out, array.shape()))
        } else {
            let mut nextcarry = vec![0i64; len as usize];
            let mut nextadvanced = vec![0i64; len as usize];
            kernels::regulararray_getitem_next_array_advanced(
                &mut nextcarry,
                &mut nextadvanced,
                advanced.as_slice(),
                &regular_flathead,
                self.size,
            );
            let nextcontent = self.content.carry(&Index64::from_vec(nextcarry))?;
            nextcontent.getitem_next(nexthead, nexttail, &Index64::from_vec(nextadvanced))
        }
    }
}
