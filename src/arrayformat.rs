// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! XML-like diagnostic rendering of array trees:
//! `<Variant attr="value"> ... </Variant>`, one node per element, with
//! value previews truncated so that large buffers stay readable.

use std::fmt;

use crate::content::Content;
use crate::identity::Identity;
use crate::index::{Index, IndexValue};

const PREVIEW_LIMIT: usize = 30;

fn preview(values: impl Iterator<Item = String>, total: usize) -> String {
    let mut shown: Vec<String> = values.take(PREVIEW_LIMIT).collect();
    if total > PREVIEW_LIMIT {
        shown.push("...".to_owned());
    }
    shown.join(" ")
}

fn fmt_index<T: IndexValue>(index: &Index<T>) -> String {
    format!(
        "<Index{} length=\"{}\">{}</Index{}>",
        T::NAME,
        index.length(),
        preview(
            index.as_slice().iter().map(|x| x.to_string()),
            index.length() as usize
        ),
        T::NAME,
    )
}

fn fmt_identity(id: &Identity, indent: &str) -> String {
    let rows = (0..id.length()).map(|row| {
        id.values_at(row)
            .iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(",")
    });
    format!(
        "{}<{} width=\"{}\" length=\"{}\">{}</{}>\n",
        indent,
        id.classname(),
        id.width(),
        id.length(),
        preview(rows, id.length() as usize),
        id.classname(),
    )
}

/// Render one node (and its children) as an XML-like tree fragment.
/// `pre` and `post` wrap the node, as in the `<content>...</content>`
/// markers emitted around children.
pub fn tostring_part(content: &Content, indent: &str, pre: &str, post: &str) -> String {
    let deeper = format!("{}    ", indent);
    let mut out = String::new();
    let header = |out: &mut String, attrs: &str| {
        out.push_str(indent);
        out.push_str(pre);
        out.push('<');
        out.push_str(content.classname());
        out.push_str(attrs);
        out.push_str(">\n");
    };
    let id_and_type = |out: &mut String| {
        if let Some(id) = content.id() {
            out.push_str(&fmt_identity(id, &deeper));
        }
        if let Some(ty) = content.ty() {
            out.push_str(&format!("{}<type>{}</type>\n", deeper, ty));
        }
    };
    let footer = |out: &mut String| {
        out.push_str(indent);
        out.push_str("</");
        out.push_str(content.classname());
        out.push('>');
        out.push_str(post);
    };
    let simple_index_line = |out: &mut String, tag: &str, rendered: String| {
        out.push_str(&format!("{}<{}>{}</{}>\n", deeper, tag, rendered, tag));
    };

    match content {
        Content::Numpy(a) => {
            let shape = a
                .shape()
                .iter()
                .map(|x| x.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let numel: i64 = a.shape().iter().product();
            out.push_str(indent);
            out.push_str(pre);
            out.push_str(&format!(
                "<NumpyArray format=\"{}\" shape=\"{}\">{}</NumpyArray>",
                a.dtype(),
                shape,
                preview(a.value_strings(PREVIEW_LIMIT).into_iter(), numel as usize),
            ));
            out.push_str(post);
        }
        Content::Empty(_) => {
            out.push_str(indent);
            out.push_str(pre);
            out.push_str("<EmptyArray/>");
            out.push_str(post);
        }
        Content::Regular(a) => {
            out.push_str(indent);
            out.push_str(pre);
            out.push_str(&format!("<RegularArray size=\"{}\">\n", a.size()));
            id_and_type(&mut out);
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::List32(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "starts", fmt_index(a.starts()));
            simple_index_line(&mut out, "stops", fmt_index(a.stops()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::ListU32(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "starts", fmt_index(a.starts()));
            simple_index_line(&mut out, "stops", fmt_index(a.stops()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::List64(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "starts", fmt_index(a.starts()));
            simple_index_line(&mut out, "stops", fmt_index(a.stops()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::ListOffset32(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "offsets", fmt_index(a.offsets()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::ListOffsetU32(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "offsets", fmt_index(a.offsets()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::ListOffset64(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "offsets", fmt_index(a.offsets()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::Indexed32(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "index", fmt_index(a.index()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::IndexedU32(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "index", fmt_index(a.index()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::Indexed64(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "index", fmt_index(a.index()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::Option32(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "index", fmt_index(a.index()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::Option64(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "index", fmt_index(a.index()));
            out.push_str(&tostring_part(a.content(), &deeper, "<content>", "</content>\n"));
            footer(&mut out);
        }
        Content::Union(a) => {
            header(&mut out, "");
            id_and_type(&mut out);
            simple_index_line(&mut out, "tags", fmt_index(a.tags()));
            simple_index_line(&mut out, "index", fmt_index(a.index()));
            for (i, c) in a.contents().iter().enumerate() {
                let open = format!("<content index=\"{}\">", i);
                out.push_str(&tostring_part(c, &deeper, &open, "</content>\n"));
            }
            footer(&mut out);
        }
        Content::Record(a) => {
            out.push_str(indent);
            out.push_str(pre);
            out.push_str(&format!("<RecordArray length=\"{}\">\n", a.length()));
            id_and_type(&mut out);
            for (key, c) in a.fields() {
                let open = format!("<field key=\"{}\">", key);
                out.push_str(&tostring_part(c, &deeper, &open, "</field>\n"));
            }
            footer(&mut out);
        }
    }
    out
}

impl Content {
    /// Render the whole tree as an XML-like diagnostic string.
    pub fn tostring(&self) -> String {
        tostring_part(self, "", "", "")
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tostring())
    }
}

#[cfg(test)]
mod tests {
    use crate::content::{Content, ListArray, RegularArray};
    use crate::index::Index32;

    #[test]
    fn renders_an_xml_like_tree() {
        let mut a = Content::Regular(RegularArray::new(
            Content::from((0..6).collect::<Vec<i64>>()),
            3,
        ));
        a.setid().unwrap();
        let out = a.tostring();
        assert!(out.starts_with("<RegularArray size=\"3\">"));
        assert!(out.contains("<Identity32 width=\"1\" length=\"2\">0 1</Identity32>"));
        assert!(out.contains(
            "<content><NumpyArray format=\"int64\" shape=\"6\">0 1 2 3 4 5</NumpyArray></content>"
        ));
        assert!(out.ends_with("</RegularArray>"));
    }

    #[test]
    fn renders_list_bounds() {
        let a = Content::List32(ListArray::new(
            Index32::from_vec(vec![0, 3]),
            Index32::from_vec(vec![3, 5]),
            Content::from(vec![1i64, 2, 3, 4, 5]),
        ));
        let out = a.tostring();
        assert!(out.starts_with("<ListArray32>"));
        assert!(out.contains("<starts><Index32 length=\"2\">0 3</Index32></starts>"));
        assert!(out.contains("<stops><Index32 length=\"2\">3 5</Index32></stops>"));
    }

    #[test]
    fn long_previews_are_truncated() {
        let a = Content::from((0..100).collect::<Vec<i64>>());
        let out = a.tostring();
        assert!(out.contains("..."));
        assert!(!out.contains("99"));
    }
}
