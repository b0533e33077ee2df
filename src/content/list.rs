// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::Arc;

use crate::content::{
    getitem_next_array_wrap, inner_or_stored, split_head, Content, IndexTyped,
};
use crate::error::Error;
use crate::identity::Identity;
use crate::index::{Index, Index64, IndexValue};
use crate::kernels;
use crate::slice::{SliceArray, SliceItem};
use crate::types::Type;

/// Variable-length lists: the i-th sublist spans
/// `[starts[i], stops[i])` in `content`. Starts and stops may alias,
/// overlap, or be permuted.
#[derive(Clone, Debug)]
pub struct ListArray<T> {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
    pub(crate) starts: Index<T>,
    pub(crate) stops: Index<T>,
    pub(crate) content: Box<Content>,
}

impl<T: IndexTyped> ListArray<T> {
    pub fn new(starts: Index<T>, stops: Index<T>, content: Content) -> ListArray<T> {
        assert_eq!(
            starts.length(),
            stops.length(),
            "list starts and stops must have the same length"
        );
        ListArray {
            id: None,
            ty: None,
            starts,
            stops,
            content: Box::new(content),
        }
    }

    pub fn starts(&self) -> &Index<T> {
        &self.starts
    }

    pub fn stops(&self) -> &Index<T> {
        &self.stops
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn classname(&self) -> &'static str {
        T::LIST_NAME
    }

    pub fn length(&self) -> i64 {
        self.starts.length()
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
                let subid = bigid
                    .for_listarray(
                        self.starts.as_slice(),
                        self.stops.as_slice(),
                        self.content.length(),
                    )
                    .map_err(|e| e.with_context(self.classname(), None))?;
                self.content.setid_with(Some(subid))?;
                self.id = Some(id);
            }
        }
        Ok(())
    }

    pub fn innertype(&self, bare: bool) -> Type {
        Type::list(inner_or_stored(&self.content, bare))
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        ty.level().shallow_equal(&Type::list(Type::Unknown))
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
        let start = self.starts.get(at).to_i64();
        let stop = self.stops.get(at).to_i64();
        check_sublist(start, stop, self.content.length(), at)?;
        Ok(self.content.getitem_range_nowrap(start, stop))
    }

    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Content {
        T::wrap_list(ListArray {
            id: self
                .id
                .as_ref()
                .map(|id| id.getitem_range_nowrap(start, stop)),
            ty: self.ty.clone(),
            starts: self.starts.getitem_range_nowrap(start, stop),
            stops: self.stops.getitem_range_nowrap(start, stop),
            content: self.content.clone(),
        })
    }

    pub fn getitem_field(&self, key: &str) -> Result<Content, Error> {
        Ok(T::wrap_list(ListArray {
            id: self.id.clone(),
            ty: None,
            starts: self.starts.clone(),
            stops: self.stops.clone(),
            content: Box::new(self.content.getitem_field(key)?),
        }))
    }

    pub fn getitem_fields(&self, keys: &[String]) -> Result<Content, Error> {
        Ok(T::wrap_list(ListArray {
            id: self.id.clone(),
            ty: None,
            starts: self.starts.clone(),
            stops: self.stops.clone(),
            content: Box::new(self.content.getitem_fields(keys)?),
        }))
    }

    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        let (starts, stops) =
            carry_list_bounds(&self.starts, &self.stops, carry)?;
        let id = match &self.id {
            Some(id) => Some(id.getitem_carry(carry)?),
            None => None,
        };
        Ok(T::wrap_list(ListArray {
            id,
            ty: self.ty.clone(),
            starts,
            stops,
            content: self.content.clone(),
        }))
    }

    pub fn getitem_next(
        &self,
        head: &SliceItem,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        list_getitem_next(
            &self.id,
            &self.starts,
            &self.stops,
            &self.content,
            head,
            tail,
            advanced,
        )
    }
}

/// Variable-length lists in the packed special case
/// `stops[i] == starts[i + 1] == offsets[i + 1]`.
#[derive(Clone, Debug)]
pub struct ListOffsetArray<T> {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
    pub(crate) offsets: Index<T>,
    pub(crate) content: Box<Content>,
}

impl<T: IndexTyped> ListOffsetArray<T> {
    pub fn new(offsets: Index<T>, content: Content) -> ListOffsetArray<T> {
        assert!(
            offsets.length() >= 1,
            "list offsets must have at least one entry"
        );
        ListOffsetArray {
            id: None,
            ty: None,
            offsets,
            content: Box::new(content),
        }
    }

    pub fn offsets(&self) -> &Index<T> {
        &self.offsets
    }

    /// Sublist starts: a view of all offsets but the last.
    pub fn starts(&self) -> Index<T> {
        self.offsets.getitem_range_nowrap(0, self.length())
    }

    /// Sublist stops: a view of all offsets but the first.
    pub fn stops(&self) -> Index<T> {
        self.offsets.getitem_range_nowrap(1, self.length() + 1)
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn classname(&self) -> &'static str {
        T::LIST_OFFSET_NAME
    }

    pub fn length(&self) -> i64 {
        self.offsets.length() - 1
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
                let subid = bigid
                    .for_listarray(
                        self.starts().as_slice(),
                        self.stops().as_slice(),
                        self.content.length(),
                    )
                    .map_err(|e| e.with_context(self.classname(), None))?;
                self.content.setid_with(Some(subid))?;
                self.id = Some(id);
            }
        }
        Ok(())
    }

    pub fn innertype(&self, bare: bool) -> Type {
        Type::list(inner_or_stored(&self.content, bare))
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        ty.level().shallow_equal(&Type::list(Type::Unknown))
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
        let start = self.offsets.get(at).to_i64();
        let stop = self.offsets.get(at + 1).to_i64();
        check_sublist(start, stop, self.content.length(), at)?;
        Ok(self.content.getitem_range_nowrap(start, stop))
    }

    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Content {
        T::wrap_list_offset(ListOffsetArray {
            id: self
                .id
                .as_ref()
                .map(|id| id.getitem_range_nowrap(start, stop)),
            ty: self.ty.clone(),
            offsets: self.offsets.getitem_range_nowrap(start, stop + 1),
            content: self.content.clone(),
        })
    }

    pub fn getitem_field(&self, key: &str) -> Result<Content, Error> {
        Ok(T::wrap_list_offset(ListOffsetArray {
            id: self.id.clone(),
            ty: None,
            offsets: self.offsets.clone(),
            content: Box::new(self.content.getitem_field(key)?),
        }))
    }

    pub fn getitem_fields(&self, keys: &[String]) -> Result<Content, Error> {
        Ok(T::wrap_list_offset(ListOffsetArray {
            id: self.id.clone(),
            ty: None,
            offsets: self.offsets.clone(),
            content: Box::new(self.content.getitem_fields(keys)?),
        }))
    }

    /// Gathering sublists breaks the packed offsets invariant, so the
    /// result is a [`ListArray`] over the same content.
    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        let (starts, stops) = carry_list_bounds(&self.starts(), &self.stops(), carry)?;
        let id = match &self.id {
            Some(id) => Some(id.getitem_carry(carry)?),
            None => None,
        };
        Ok(T::wrap_list(ListArray {
            id,
            ty: self.ty.clone(),
            starts,
            stops,
            content: self.content.clone(),
        }))
    }

    pub fn getitem_next(
        &self,
        head: &SliceItem,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        list_getitem_next(
            &self.id,
            &self.starts(),
            &self.stops(),
            &self.content,
            head,
            tail,
            advanced,
        )
    }
}

fn check_sublist(start: i64, stop: i64, content_length: i64, at: i64) -> Result<(), Error> {
    if start < 0 || start > stop {
        return Err(Error::out_of_bounds(
            "sublist bounds out of order",
            None,
            Some(at),
        ));
    }
    if stop > content_length {
        return Err(Error::out_of_bounds(
            "sublist bound beyond content",
            None,
            Some(at),
        ));
    }
    Ok(())
}

fn carry_list_bounds<T: IndexValue>(
    starts: &Index<T>,
    stops: &Index<T>,
    carry: &Index64,
) -> Result<(Index<T>, Index<T>), Error> {
    let n = carry.length() as usize;
    let mut outstarts = vec![T::from_i64(0); n];
    let mut outstops = vec![T::from_i64(0); n];
    kernels::listarray_getitem_carry(
        &mut outstarts,
        &mut outstops,
        starts.as_slice(),
        stops.as_slice(),
        carry.as_slice(),
    )?;
    Ok((Index::from_vec(outstarts), Index::from_vec(outstops)))
}

/// One dimension of slicing over variable-length sublists, shared by the
/// general and the packed representation.
fn list_getitem_next<T: IndexTyped>(
    id: &Option<Identity>,
    starts: &Index<T>,
    stops: &Index<T>,
    content: &Content,
    head: &SliceItem,
    tail: &[SliceItem],
    advanced: &Index64,
) -> Result<Content, Error> {
    let lenstarts = starts.length();
    let (nexthead, nexttail) = split_head(tail);
    match head {
        SliceItem::Index(at) => {
            let mut nextcarry = vec![0i64; lenstarts as usize];
            kernels::listarray_getitem_next_at(
                &mut nextcarry,
                starts.as_slice(),
                stops.as_slice(),
                *at as i64,
            )?;
            let nextcontent = content.carry(&Index64::from_vec(nextcarry))?;
            nextcontent.getitem_next(nexthead, nexttail, advanced)
        }
        SliceItem::Range { start, end, step } => {
            assert!(*step != 0, "slice range step must be nonzero");
            let (s, e) = (
                start.map_or(0, |x| x as i64),
                end.map_or(0, |x| x as i64),
            );
            let step = *step as i64;
            let carrylength = kernels::listarray_getitem_next_range_carrylength(
                starts.as_slice(),
                stops.as_slice(),
                s,
                e,
                step,
                start.is_some(),
                end.is_some(),
            );
            let mut offsets = vec![0i64; lenstarts as usize + 1];
            let mut nextcarry = vec![0i64; carrylength as usize];
            kernels::listarray_getitem_next_range(
                &mut offsets,
                &mut nextcarry,
                starts.as_slice(),
                stops.as_slice(),
                s,
                e,
                step,
                start.is_some(),
                end.is_some(),
            );
            let nextcontent = content.carry(&Index64::from_vec(nextcarry))?;

            let out = if advanced.is_empty() {
                nextcontent.getitem_next(nexthead, nexttail, advanced)?
            } else {
                let mut nextadvanced = vec![0i64; carrylength as usize];
                kernels::listarray_getitem_next_range_spreadadvanced(
                    &mut nextadvanced,
                    advanced.as_slice(),
                    &offsets,
                );
                nextcontent.getitem_next(nexthead, nexttail, &Index64::from_vec(nextadvanced))?
            };
            Ok(Content::ListOffset64(ListOffsetArray {
                id: id.clone(),
                ty: None,
                offsets: Index64::from_vec(offsets),
                content: Box::new(out),
            }))
        }
        SliceItem::Array(array) => {
            list_getitem_next_array(starts, stops, content, array, nexthead, nexttail, advanced)
        }
        _ => unreachable!("non-numeric head dispatched to a list node"),
    }
}

fn list_getitem_next_array<T: IndexTyped>(
    starts: &Index<T>,
    stops: &Index<T>,
    content: &Content,
    array: &SliceArray,
    nexthead: Option<&SliceItem>,
    nexttail: &[SliceItem],
    advanced: &Index64,
) -> Result<Content, Error> {
    let lenstarts = starts.length();
    let flathead = array.ravel();

    if advanced.is_empty() {
        let n = (lenstarts as usize) * flathead.len();
        let mut nextcarry = vec![0i64; n];
        let mut nextadvanced = vec![0i64; n];
        kernels::listarray_getitem_next_array(
            &mut nextcarry,
            &mut nextadvanced,
            starts.as_slice(),
            stops.as_slice(),
            flathead,
        )?;
        let nextcontent = content.carry(&Index64::from_vec(nextcarry))?;
        let out = nextcontent.getitem_next(nexthead, nexttail, &Index64::from_vec(nextadvanced))?;
        Ok(getitem_next_array_wrap(out, array.shape()))
    } else {
        let mut nextcarry = vec![0i64; lenstarts as usize];
        let mut nextadvanced = vec![0i64; lenstarts as usize];
        kernels::listarray_getitem_next_array_advanced(
            &mut nextcarry,
            &mut nextadvanced,
            starts.as_slice(),
            stops.as_slice(),
            flathead,
            advanced.as_slice(),
        )?;
        let nextcontent = content.carry(&Index64::from_vec(nextcarry))?;
        nextcontent.getitem_next(nexthead, nexttail, &Index64::from_vec(nextadvanced))
    }
}
