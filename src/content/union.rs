// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::Arc;

use crate::content::Content;
use crate::error::Error;
use crate::identity::Identity;
use crate::index::{Index64, Index8};
use crate::kernels;
use crate::slice::SliceItem;
use crate::types::Type;

/// Tagged union: element i is `contents[tags[i]][index[i]]`.
#[derive(Clone, Debug)]
pub struct UnionArray {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
    pub(crate) tags: Index8,
    pub(crate) index: Index64,
    pub(crate) contents: Vec<Content>,
}

impl UnionArray {
    pub fn new(tags: Index8, index: Index64, contents: Vec<Content>) -> UnionArray {
        assert_eq!(
            tags.length(),
            index.length(),
            "union tags and index must have the same length"
        );
        assert!(
            tags.as_slice()
                .iter()
                .all(|&t| 0 <= t && (t as usize) < contents.len()),
            "union tag names a nonexistent alternative"
        );
        UnionArray {
            id: None,
            ty: None,
            tags,
            index,
            contents,
        }
    }

    pub fn tags(&self) -> &Index8 {
        &self.tags
    }

    pub fn index(&self) -> &Index64 {
        &self.index
    }

    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    pub fn classname(&self) -> &'static str {
        "UnionArray8_64"
    }

    pub fn length(&self) -> i64 {
        self.tags.length()
    }

    pub fn setid_with(&mut self, id: Option<Identity>) -> Result<(), Error> {
        match id {
            None => {
                for content in &mut self.contents {
                    content.setid_with(None)?;
                }
                self.id = None;
            }
            Some(id) => {
                if id.length() != self.length() {
                    return Err(Error::identity_length(self.length(), id.length())
                        .with_context(self.classname(), None));
                }
                // Alternatives interleave, so their rows carry no single
                // label; the label stays on the union itself.
                self.id = Some(id);
            }
        }
        Ok(())
    }

    pub fn innertype(&self, bare: bool) -> Type {
        Type::union(self.contents.iter().map(|c| c.innertype(bare)))
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        let model = Type::union(self.contents.iter().map(|_| Type::Unknown));
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
        if let Type::Union(alternatives) = ty.option_type() {
            for (content, alt) in self.contents.iter_mut().zip(alternatives) {
                content.settype_part((**alt).clone())?;
            }
        }
        self.ty = Some(ty);
        Ok(())
    }

    pub fn getitem_at_nowrap(&self, at: i64) -> Result<Content, Error> {
        let tag = self.tags.get(at) as usize;
        let x = self.index.get(at);
        let content = &self.contents[tag];
        if x < 0 || x >= content.length() {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(x),
                Some(at),
            ));
        }
        content.getitem_at_nowrap(x)
    }

    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> Content {
        Content::Union(UnionArray {
            id: self
                .id
                .as_ref()
                .map(|id| id.getitem_range_nowrap(start, stop)),
            ty: self.ty.clone(),
            tags: self.tags.getitem_range_nowrap(start, stop),
            index: self.index.getitem_range_nowrap(start, stop),
            contents: self.contents.clone(),
        })
    }

    pub fn getitem_field(&self, key: &str) -> Result<Content, Error> {
        let contents = self
            .contents
            .iter()
            .map(|c| c.getitem_field(key))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Content::Union(UnionArray {
            id: self.id.clone(),
            ty: None,
            tags: self.tags.clone(),
            index: self.index.clone(),
            contents,
        }))
    }

    pub fn getitem_fields(&self, keys: &[String]) -> Result<Content, Error> {
        let contents = self
            .contents
            .iter()
            .map(|c| c.getitem_fields(keys))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Content::Union(UnionArray {
            id: self.id.clone(),
            ty: None,
            tags: self.tags.clone(),
            index: self.index.clone(),
            contents,
        }))
    }

    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        let n = carry.length() as usize;
        let mut outtags = vec![0i8; n];
        let mut outindex = vec![0i64; n];
        for (i, &c) in carry.as_slice().iter().enumerate() {
            if c < 0 || c >= self.length() {
                return Err(Error::out_of_bounds(
                    "index out of range",
                    Some(c),
                    Some(i as i64),
                ));
            }
            outtags[i] = self.tags.get(c);
            outindex[i] = self.index.get(c);
        }
        let id = match &self.id {
            Some(id) => Some(id.getitem_carry(carry)?),
            None => None,
        };
        Ok(Content::Union(UnionArray {
            id,
            ty: self.ty.clone(),
            tags: Index8::from_vec(outtags),
            index: Index64::from_vec(outindex),
            contents: self.contents.clone(),
        }))
    }

    /// Partition the elements by tag, slice every alternative's projection
    /// independently, and reassemble with recomputed per-tag positions.
    pub fn getitem_next(
        &self,
        head: &SliceItem,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        let len = self.length();
        let tags = self.tags.as_slice();
        let mut outcontents = Vec::with_capacity(self.contents.len());
        for (t, content) in self.contents.iter().enumerate() {
            let which = t as i8;
            let count = kernels::unionarray_count_tag(tags, which);
            let mut carry = vec![0i64; count as usize];
            kernels::unionarray_project(
                &mut carry,
                tags,
                self.index.as_slice(),
                which,
                content.length(),
            )?;
            let next = content.carry(&Index64::from_vec(carry))?;

            let adv = if advanced.is_empty() {
                Index64::empty()
            } else {
                let mut v = Vec::with_capacity(count as usize);
                for i in 0..len {
                    if tags[i as usize] == which {
                        v.push(advanced.get(i));
                    }
                }
                Index64::from_vec(v)
            };
            outcontents.push(next.getitem_next(Some(head), tail, &adv)?);
        }

        let mut outindex = vec![0i64; len as usize];
        kernels::unionarray_localindex(&mut outindex, tags, self.contents.len());
        Ok(Content::Union(UnionArray {
            id: self.id.clone(),
            ty: None,
            tags: self.tags.clone(),
            index: Index64::from_vec(outindex),
            contents: outcontents,
        }))
    }
}
