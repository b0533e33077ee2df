// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::sync::Arc;

use crate::content::{inner_or_stored, Content};
use crate::error::Error;
use crate::identity::Identity;
use crate::index::Index64;
use crate::slice::SliceItem;
use crate::types::{RecordType, Type};

/// Struct-of-arrays: an ordered mapping of field names to contents, with an
/// explicit length. Fields may be longer than the record; addressing past
/// `length` is forbidden.
#[derive(Clone, Debug)]
pub struct RecordArray {
    pub(crate) id: Option<Identity>,
    pub(crate) ty: Option<Arc<Type>>,
    pub(crate) fields: Vec<(String, Content)>,
    pub(crate) length: i64,
}

impl RecordArray {
    pub fn new(fields: Vec<(String, Content)>, length: i64) -> RecordArray {
        assert!(length >= 0, "record length must be nonnegative");
        for (key, content) in &fields {
            assert!(
                content.length() >= length,
                "record field \"{}\" is shorter than the record",
                key
            );
        }
        RecordArray {
            id: None,
            ty: None,
            fields,
            length,
        }
    }

    pub fn fields(&self) -> &[(String, Content)] {
        &self.fields
    }

    pub fn classname(&self) -> &'static str {
        "RecordArray"
    }

    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn numfields(&self) -> i64 {
        self.fields.len() as i64
    }

    /// Field position for a name; aliases resolve through the stored type
    /// when one is attached.
    pub fn fieldindex(&self, key: &str) -> Result<i64, Error> {
        if let Some(i) = self.fields.iter().position(|(k, _)| k == key) {
            return Ok(i as i64);
        }
        if let Some(ty) = &self.ty {
            if let Ok(i) = ty.fieldindex(key) {
                return Ok(i);
            }
        }
        Err(Error::out_of_bounds("no such field", None, None)
            .with_context(self.classname(), None))
    }

    pub fn key(&self, fieldindex: i64) -> Result<String, Error> {
        self.fields
            .get(fieldindex as usize)
            .map(|(k, _)| k.clone())
            .ok_or_else(|| {
                Error::out_of_bounds("no such field", Some(fieldindex), None)
                    .with_context(self.classname(), None)
            })
    }

    pub fn haskey(&self, key: &str) -> bool {
        self.fieldindex(key).is_ok()
    }

    pub fn keyaliases(&self, key: &str) -> Vec<String> {
        match &self.ty {
            Some(ty) => ty.keyaliases(key).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn setid_with(&mut self, id: Option<Identity>) -> Result<(), Error> {
        match id {
            None => {
                for (_, content) in &mut self.fields {
                    content.setid_with(None)?;
                }
                self.id = None;
            }
            Some(id) => {
                if id.length() != self.length {
                    return Err(Error::identity_length(self.length, id.length())
                        .with_context(self.classname(), None));
                }
                for (key, content) in &mut self.fields {
                    if content.length() == id.length() {
                        content.setid_with(Some(id.with_field(id.width(), key)))?;
                    }
                }
                self.id = Some(id);
            }
        }
        Ok(())
    }

    pub fn innertype(&self, bare: bool) -> Type {
        Type::Record(RecordType::new(
            self.fields
                .iter()
                .map(|(k, c)| (k.clone(), inner_or_stored(c, bare))),
        ))
    }

    pub fn accepts(&self, ty: &Type) -> bool {
        let model = Type::Record(RecordType::new(
            self.fields.iter().map(|(k, _)| (k.clone(), Type::Unknown)),
        ));
        ty.level().shallow_equal(&model)
    }

    pub fn settype_part(&mut self, ty: Arc<Type>) -> Result<(), Error> {
        if !self.accepts(ty.as_ref()) {
            let given = Type::array((*ty).clone(), self.length);
            let bare = Type::array(self.innertype(true), self.length);
            return Err(
                Error::type_mismatch(given.compare(&bare)).with_context(self.classname(), None)
            );
        }
        for (key, content) in &mut self.fields {
            content.settype_part(ty.inner_key(key)?)?;
        }
        self.ty = Some(ty);
        Ok(())
    }

    /// A single row as a one-row record view.
    pub fn getitem_at_nowrap(&self, at: i64) -> Result<Content, Error> {
        Ok(Content::Record(self.getitem_range_nowrap(at, at + 1)))
    }

    pub fn getitem_range_nowrap(&self, start: i64, stop: i64) -> RecordArray {
        RecordArray {
            id: self
                .id
                .as_ref()
                .map(|id| id.getitem_range_nowrap(start, stop)),
            ty: self.ty.clone(),
            fields: self
                .fields
                .iter()
                .map(|(k, c)| (k.clone(), c.getitem_range_nowrap(start, stop)))
                .collect(),
            length: stop - start,
        }
    }

    /// Field selection shares the referenced content unchanged.
    pub fn getitem_field(&self, key: &str) -> Result<Content, Error> {
        let i = self.fieldindex(key)?;
        Ok(self.fields[i as usize].1.clone())
    }

    pub fn getitem_fields(&self, keys: &[String]) -> Result<Content, Error> {
        let mut fields = Vec::with_capacity(keys.len());
        for key in keys {
            let i = self.fieldindex(key)?;
            let (name, content) = &self.fields[i as usize];
            fields.push((name.clone(), content.clone()));
        }
        Ok(Content::Record(RecordArray {
            id: self.id.clone(),
            ty: None,
            fields,
            length: self.length,
        }))
    }

    pub fn carry(&self, carry: &Index64) -> Result<Content, Error> {
        for (i, &c) in carry.as_slice().iter().enumerate() {
            if c < 0 || c >= self.length {
                return Err(Error::out_of_bounds(
                    "index out of range",
                    Some(c),
                    Some(i as i64),
                ));
            }
        }
        let fields = self
            .fields
            .iter()
            .map(|(k, c)| Ok((k.clone(), c.carry(carry)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        let id = match &self.id {
            Some(id) => Some(id.getitem_carry(carry)?),
            None => None,
        };
        Ok(Content::Record(RecordArray {
            id,
            ty: self.ty.clone(),
            fields,
            length: carry.length(),
        }))
    }

    /// Records are transparent to positional slicing: the same item applies
    /// to every field and the record structure is kept.
    pub fn getitem_next(
        &self,
        head: &SliceItem,
        tail: &[SliceItem],
        advanced: &Index64,
    ) -> Result<Content, Error> {
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut length: Option<i64> = None;
        for (key, content) in &self.fields {
            let out = content.getitem_next(Some(head), tail, advanced)?;
            length = Some(match length {
                None => out.length(),
                Some(len) => len.min(out.length()),
            });
            fields.push((key.clone(), out));
        }
        Ok(Content::Record(RecordArray {
            id: None,
            ty: None,
            fields,
            length: length.unwrap_or(self.length),
        }))
    }
}
