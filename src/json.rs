// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The JSON rendering interface: nodes drive a [`JsonBuilder`] in document
//! order; what the builder does with the events is the host's business.
//! [`ToJsonString`] is the reference builder used by the test suite.

use crate::content::{Content, ScalarValue};
use crate::error::Error;

/// Event sink for document-order JSON rendering.
pub trait JsonBuilder {
    fn beginlist(&mut self);
    fn endlist(&mut self);
    fn beginrecord(&mut self);
    fn field(&mut self, key: &str);
    fn endrecord(&mut self);
    fn boolean(&mut self, x: bool);
    fn integer(&mut self, x: i64);
    fn real(&mut self, x: f64);
    fn string(&mut self, x: &str);
    fn null(&mut self);
}

/// Reference [`JsonBuilder`] accumulating a compact JSON string.
#[derive(Default)]
pub struct ToJsonString {
    out: String,
    comma: Vec<bool>,
    pending_field: bool,
}

impl ToJsonString {
    pub fn new() -> ToJsonString {
        ToJsonString::default()
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn value_prefix(&mut self) {
        if self.pending_field {
            self.pending_field = false;
            return;
        }
        if let Some(top) = self.comma.last_mut() {
            if *top {
                self.out.push(',');
            }
            *top = true;
        }
    }
}

impl JsonBuilder for ToJsonString {
    fn beginlist(&mut self) {
        self.value_prefix();
        self.out.push('[');
        self.comma.push(false);
    }

    fn endlist(&mut self) {
        self.comma.pop();
        self.out.push(']');
    }

    fn beginrecord(&mut self) {
        self.value_prefix();
        self.out.push('{');
        self.comma.push(false);
    }

    fn field(&mut self, key: &str) {
        if let Some(top) = self.comma.last_mut() {
            if *top {
                self.out.push(',');
            }
            *top = true;
        }
        self.out.push('"');
        escape_into(&mut self.out, key);
        self.out.push_str("\":");
        self.pending_field = true;
    }

    fn endrecord(&mut self) {
        self.comma.pop();
        self.out.push('}');
    }

    fn boolean(&mut self, x: bool) {
        self.value_prefix();
        self.out.push_str(if x { "true" } else { "false" });
    }

    fn integer(&mut self, x: i64) {
        self.value_prefix();
        self.out.push_str(&x.to_string());
    }

    fn real(&mut self, x: f64) {
        self.value_prefix();
        if x.is_finite() {
            self.out.push_str(&x.to_string());
        } else {
            self.out.push_str("null");
        }
    }

    fn string(&mut self, x: &str) {
        self.value_prefix();
        self.out.push('"');
        escape_into(&mut self.out, x);
        self.out.push('"');
    }

    fn null(&mut self) {
        self.value_prefix();
        self.out.push_str("null");
    }
}

fn escape_into(out: &mut String, x: &str) {
    for c in x.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
}

impl Content {
    /// Drive `builder` through this tree in document order.
    pub fn tojson_part(&self, builder: &mut dyn JsonBuilder) -> Result<(), Error> {
        match self {
            Content::Numpy(a) => {
                if a.ndim() == 0 {
                    match a.scalar_value() {
                        ScalarValue::Bool(x) => builder.boolean(x),
                        ScalarValue::Int(x) => builder.integer(x),
                        ScalarValue::Float(x) => builder.real(x),
                    }
                    return Ok(());
                }
                builder.beginlist();
                for i in 0..a.length() {
                    a.getitem_at_nowrap(i)?.tojson_part(builder)?;
                }
                builder.endlist();
                Ok(())
            }
            Content::Empty(_) => {
                builder.beginlist();
                builder.endlist();
                Ok(())
            }
            Content::Option32(o) => option_tojson(o.length(), builder, |i| o.is_missing(i), self),
            Content::Option64(o) => option_tojson(o.length(), builder, |i| o.is_missing(i), self),
            Content::Record(r) => {
                builder.beginlist();
                for row in 0..r.length() {
                    builder.beginrecord();
                    for (key, content) in r.fields() {
                        builder.field(key);
                        content.getitem_at_nowrap(row)?.tojson_part(builder)?;
                    }
                    builder.endrecord();
                }
                builder.endlist();
                Ok(())
            }
            _ => {
                builder.beginlist();
                for i in 0..self.length() {
                    self.getitem_at_nowrap(i)?.tojson_part(builder)?;
                }
                builder.endlist();
                Ok(())
            }
        }
    }

    /// Render this tree as a compact JSON string.
    pub fn tojson(&self) -> Result<String, Error> {
        let mut builder = ToJsonString::new();
        self.tojson_part(&mut builder)?;
        Ok(builder.finish())
    }
}

fn option_tojson(
    length: i64,
    builder: &mut dyn JsonBuilder,
    is_missing: impl Fn(i64) -> bool,
    content: &Content,
) -> Result<(), Error> {
    builder.beginlist();
    for i in 0..length {
        if is_missing(i) {
            builder.null();
        } else {
            content.getitem_at_nowrap(i)?.tojson_part(builder)?;
        }
    }
    builder.endlist();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_places_commas() {
        let mut b = ToJsonString::new();
        b.beginlist();
        b.integer(1);
        b.beginrecord();
        b.field("x");
        b.integer(2);
        b.field("y");
        b.null();
        b.endrecord();
        b.string("a\"b");
        b.endlist();
        assert_eq!(b.finish(), "[1,{\"x\":2,\"y\":null},\"a\\\"b\"]");
    }
}
