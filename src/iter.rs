// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::content::Content;
use crate::error::Error;

/// Forward cursor over a node's top-level elements.
///
/// Holds a shallow copy of the node, so the source can keep being used
/// while the cursor runs. Not synchronized; intended for single-producer
/// use.
pub struct Iter {
    content: Content,
    where_: i64,
}

impl Iter {
    /// Begin iterating `content`. Fails when an attached identity is
    /// shorter than the node.
    pub fn new(content: &Content) -> Result<Iter, Error> {
        content.check_for_iteration()?;
        Ok(Iter {
            content: content.shallow_copy(),
            where_: 0,
        })
    }

    /// Whether the cursor has passed the last element.
    pub fn isdone(&self) -> bool {
        self.where_ >= self.content.length()
    }

    /// Position of the next element to be produced.
    pub fn at(&self) -> i64 {
        self.where_
    }
}

impl Iterator for Iter {
    type Item = Result<Content, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.isdone() {
            return None;
        }
        let out = self.content.getitem_at_nowrap(self.where_);
        self.where_ += 1;
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Content, RegularArray};

    #[test]
    fn cursor_walks_top_level_elements() {
        let content = Content::Regular(RegularArray::new(
            Content::from((0..6).collect::<Vec<i64>>()),
            3,
        ));
        let mut it = Iter::new(&content).unwrap();
        assert!(!it.isdone());
        let first = it.next().unwrap().unwrap();
        assert_eq!(first.length(), 3);
        let second = it.next().unwrap().unwrap();
        assert_eq!(second.length(), 3);
        assert!(it.isdone());
        assert!(it.next().is_none());
    }
}
