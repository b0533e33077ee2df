// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pure integer-array transforms backing the node operations.
//!
//! Each kernel writes exactly the output slices it is handed and reports
//! failures through [`Error`] records carrying the offending slice value
//! and logical row; callers attach node context. No payload data flows
//! through here, only index arithmetic.

use num_integer::Integer;

use crate::error::Error;
use crate::index::IndexValue;

/// Number of indices produced by a regularized `[start, stop)` range with
/// nonzero `step`.
pub fn rangecount(start: i64, stop: i64, step: i64) -> i64 {
    if step > 0 && stop > start {
        Integer::div_ceil(&(stop - start), &step)
    } else if step < 0 && stop < start {
        Integer::div_ceil(&(start - stop), &-step)
    } else {
        0
    }
}

/// Normalize a range slice against an axis of `length` elements.
///
/// With a positive step the bounds land in `[0, length]` (defaults `0` and
/// `length`); with a negative step they land in `[-1, length - 1]`
/// (defaults `length - 1` and `-1`), so that `stop` may sit one before the
/// first element. Missing bounds are signalled by `hasstart`/`hasstop`.
/// The sign policy is load-bearing: downstream carry lengths are computed
/// from these exact clamps.
pub fn regularize_rangeslice(
    start: &mut i64,
    stop: &mut i64,
    posstep: bool,
    hasstart: bool,
    hasstop: bool,
    length: i64,
) {
    if posstep {
        if !hasstart {
            *start = 0;
        } else if *start < 0 {
            *start += length;
        }
        if *start < 0 {
            *start = 0;
        }
        if *start > length {
            *start = length;
        }

        if !hasstop {
            *stop = length;
        } else if *stop < 0 {
            *stop += length;
        }
        if *stop < 0 {
            *stop = 0;
        }
        if *stop > length {
            *stop = length;
        }
        if *stop < *start {
            *stop = *start;
        }
    } else {
        if !hasstart {
            *start = length - 1;
        } else if *start < 0 {
            *start += length;
        }
        if *start < -1 {
            *start = -1;
        }
        if *start > length - 1 {
            *start = length - 1;
        }

        if !hasstop {
            *stop = -1;
        } else if *stop < 0 {
            *stop += length;
        }
        if *stop < -1 {
            *stop = -1;
        }
        if *stop > length - 1 {
            *stop = length - 1;
        }
        if *stop > *start {
            *stop = *start;
        }
    }
}

// === identity kernels ===

/// Fill `out[i] = i`.
pub fn new_identity<T: IndexValue>(out: &mut [T]) {
    for (i, x) in out.iter_mut().enumerate() {
        *x = T::from_i64(i as i64);
    }
}

/// Widen an identity of `width` columns over `outer_length` rows into one of
/// `width + 1` columns over `content_length` rows, appending the sub-index
/// within each fixed-size group. Rows past `outer_length * size` are
/// invisible to the grouped view and are filled with `-1`.
pub fn identity_from_regulararray<T: IndexValue>(
    out: &mut [T],
    input: &[T],
    size: i64,
    content_length: i64,
    outer_length: i64,
    width: i64,
) {
    let outwidth = (width + 1) as usize;
    for p in 0..content_length {
        let row = &mut out[p as usize * outwidth..(p as usize + 1) * outwidth];
        let i = if size > 0 { p / size } else { outer_length };
        if i < outer_length {
            let inrow = &input[(i * width) as usize..((i + 1) * width) as usize];
            row[..width as usize].copy_from_slice(inrow);
            row[width as usize] = T::from_i64(p % size);
        } else {
            for x in row {
                *x = T::from_i64(-1);
            }
        }
    }
}

/// Widen an identity through variable-length sublists: every content row
/// covered by sublist `i` gets row `i`'s label plus its position within the
/// sublist. Uncovered rows are filled with `-1`; a row covered twice makes
/// the identity ambiguous.
pub fn identity_from_listarray<T: IndexValue, C: IndexValue>(
    out: &mut [T],
    input: &[T],
    starts: &[C],
    stops: &[C],
    content_length: i64,
    width: i64,
) -> Result<(), Error> {
    let outwidth = (width + 1) as usize;
    for x in out.iter_mut() {
        *x = T::from_i64(-1);
    }
    let mut written = vec![false; content_length as usize];
    for i in 0..starts.len() {
        let start = starts[i].to_i64();
        let stop = stops[i].to_i64();
        for (sub, k) in (start..stop).enumerate() {
            if k < 0 || k >= content_length {
                return Err(Error::out_of_bounds(
                    "sublist bound beyond content",
                    Some(k),
                    Some(i as i64),
                ));
            }
            if written[k as usize] {
                return Err(Error::unsupported(
                    "identity would be ambiguous because sublists overlap",
                ));
            }
            written[k as usize] = true;
            let row = &mut out[k as usize * outwidth..(k as usize + 1) * outwidth];
            let inrow = &input[i * width as usize..(i + 1) * width as usize];
            row[..width as usize].copy_from_slice(inrow);
            row[width as usize] = T::from_i64(sub as i64);
        }
    }
    Ok(())
}

/// Gather identity rows in `carry` order.
pub fn identity_getitem_carry<T: IndexValue>(
    out: &mut [T],
    input: &[T],
    carry: &[i64],
    width: i64,
    length: i64,
) -> Result<(), Error> {
    let w = width as usize;
    for (i, &c) in carry.iter().enumerate() {
        if c < 0 || c >= length {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(c),
                Some(i as i64),
            ));
        }
        out[i * w..(i + 1) * w].copy_from_slice(&input[c as usize * w..(c as usize + 1) * w]);
    }
    Ok(())
}

// === RegularArray kernels ===

/// Expand a carry over grouped rows to a carry over their elements.
pub fn regulararray_getitem_carry(out: &mut [i64], carry: &[i64], size: i64) {
    for (i, &c) in carry.iter().enumerate() {
        for j in 0..size {
            out[i * size as usize + j as usize] = c * size + j;
        }
    }
}

/// One inner position per outer row.
pub fn regulararray_getitem_next_at(
    out: &mut [i64],
    at: i64,
    length: i64,
    size: i64,
) -> Result<(), Error> {
    let regular_at = if at < 0 { at + size } else { at };
    if !(0 <= regular_at && regular_at < size) {
        return Err(Error::out_of_bounds("index out of range", Some(at), None));
    }
    for i in 0..length {
        out[i as usize] = i * size + regular_at;
    }
    Ok(())
}

/// A regularized range of inner positions per outer row.
pub fn regulararray_getitem_next_range(
    out: &mut [i64],
    start: i64,
    step: i64,
    length: i64,
    size: i64,
    nextsize: i64,
) {
    for i in 0..length {
        for j in 0..nextsize {
            out[(i * nextsize + j) as usize] = i * size + start + j * step;
        }
    }
}

/// Broadcast an advanced index across the `nextsize` positions of a range.
pub fn regulararray_getitem_next_range_spreadadvanced(
    out: &mut [i64],
    advanced: &[i64],
    length: i64,
    nextsize: i64,
) {
    for i in 0..length {
        for j in 0..nextsize {
            out[(i * nextsize + j) as usize] = advanced[i as usize];
        }
    }
}

/// Canonicalize negative fancy indices against a fixed inner size.
pub fn regulararray_getitem_next_array_regularize(
    out: &mut [i64],
    flathead: &[i64],
    size: i64,
) -> Result<(), Error> {
    for (j, &x) in flathead.iter().enumerate() {
        let norm = if x < 0 { x + size } else { x };
        if !(0 <= norm && norm < size) {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(x),
                Some(j as i64),
            ));
        }
        out[j] = norm;
    }
    Ok(())
}

/// Cartesian fancy indexing: every outer row crossed with every flathead
/// position, recording the flathead position as the advanced index.
pub fn regulararray_getitem_next_array(
    carry: &mut [i64],
    advanced_out: &mut [i64],
    flathead: &[i64],
    length: i64,
    size: i64,
) {
    let h = flathead.len();
    for i in 0..length as usize {
        for (j, &f) in flathead.iter().enumerate() {
            carry[i * h + j] = i as i64 * size + f;
            advanced_out[i * h + j] = j as i64;
        }
    }
}

/// Zipped fancy indexing: each outer row picks the flathead position named
/// by the incoming advanced index.
pub fn regulararray_getitem_next_array_advanced(
    carry: &mut [i64],
    advanced_out: &mut [i64],
    advanced_in: &[i64],
    flathead: &[i64],
    size: i64,
) {
    for (i, &a) in advanced_in.iter().enumerate() {
        carry[i] = i as i64 * size + flathead[a as usize];
        advanced_out[i] = a;
    }
}

// === list kernels (ListArray / ListOffsetArray, any index width) ===

/// One inner position per sublist, canonicalized per sublist length.
pub fn listarray_getitem_next_at<C: IndexValue>(
    out: &mut [i64],
    starts: &[C],
    stops: &[C],
    at: i64,
) -> Result<(), Error> {
    for i in 0..starts.len() {
        let length = stops[i].to_i64() - starts[i].to_i64();
        let regular_at = if at < 0 { at + length } else { at };
        if !(0 <= regular_at && regular_at < length) {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(at),
                Some(i as i64),
            ));
        }
        out[i] = starts[i].to_i64() + regular_at;
    }
    Ok(())
}

/// Total carry length of a range applied per sublist.
pub fn listarray_getitem_next_range_carrylength<C: IndexValue>(
    starts: &[C],
    stops: &[C],
    start: i64,
    stop: i64,
    step: i64,
    hasstart: bool,
    hasstop: bool,
) -> i64 {
    let mut carrylength = 0;
    for i in 0..starts.len() {
        let length = stops[i].to_i64() - starts[i].to_i64();
        let (mut s, mut e) = (start, stop);
        regularize_rangeslice(&mut s, &mut e, step > 0, hasstart, hasstop, length);
        carrylength += rangecount(s, e, step);
    }
    carrylength
}

/// Fill per-sublist offsets (`starts.len() + 1` entries) and the carry for
/// a range applied per sublist.
pub fn listarray_getitem_next_range<C: IndexValue>(
    offsets: &mut [i64],
    carry: &mut [i64],
    starts: &[C],
    stops: &[C],
    start: i64,
    stop: i64,
    step: i64,
    hasstart: bool,
    hasstop: bool,
) {
    let mut k = 0usize;
    offsets[0] = 0;
    for i in 0..starts.len() {
        let length = stops[i].to_i64() - starts[i].to_i64();
        let (mut s, mut e) = (start, stop);
        regularize_rangeslice(&mut s, &mut e, step > 0, hasstart, hasstop, length);
        let n = rangecount(s, e, step);
        for j in 0..n {
            carry[k] = starts[i].to_i64() + s + j * step;
            k += 1;
        }
        offsets[i + 1] = k as i64;
    }
}

/// Broadcast an advanced index across the per-sublist counts of a range.
pub fn listarray_getitem_next_range_spreadadvanced(
    out: &mut [i64],
    advanced: &[i64],
    offsets: &[i64],
) {
    for i in 0..offsets.len() - 1 {
        for k in offsets[i]..offsets[i + 1] {
            out[k as usize] = advanced[i];
        }
    }
}

/// Cartesian fancy indexing over variable-length sublists.
pub fn listarray_getitem_next_array<C: IndexValue>(
    carry: &mut [i64],
    advanced_out: &mut [i64],
    starts: &[C],
    stops: &[C],
    flathead: &[i64],
) -> Result<(), Error> {
    let h = flathead.len();
    for i in 0..starts.len() {
        let length = stops[i].to_i64() - starts[i].to_i64();
        for (j, &x) in flathead.iter().enumerate() {
            let norm = if x < 0 { x + length } else { x };
            if !(0 <= norm && norm < length) {
                return Err(Error::out_of_bounds(
                    "index out of range",
                    Some(x),
                    Some(i as i64),
                ));
            }
            carry[i * h + j] = starts[i].to_i64() + norm;
            advanced_out[i * h + j] = j as i64;
        }
    }
    Ok(())
}

/// Zipped fancy indexing over variable-length sublists.
pub fn listarray_getitem_next_array_advanced<C: IndexValue>(
    carry: &mut [i64],
    advanced_out: &mut [i64],
    starts: &[C],
    stops: &[C],
    flathead: &[i64],
    advanced_in: &[i64],
) -> Result<(), Error> {
    for (i, &a) in advanced_in.iter().enumerate() {
        let length = stops[i].to_i64() - starts[i].to_i64();
        let x = flathead[a as usize];
        let norm = if x < 0 { x + length } else { x };
        if !(0 <= norm && norm < length) {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(x),
                Some(i as i64),
            ));
        }
        carry[i] = starts[i].to_i64() + norm;
        advanced_out[i] = a;
    }
    Ok(())
}

/// Gather sublist bounds in `carry` order.
pub fn listarray_getitem_carry<C: IndexValue>(
    outstarts: &mut [C],
    outstops: &mut [C],
    starts: &[C],
    stops: &[C],
    carry: &[i64],
) -> Result<(), Error> {
    for (i, &c) in carry.iter().enumerate() {
        if c < 0 || c >= starts.len() as i64 {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(c),
                Some(i as i64),
            ));
        }
        outstarts[i] = starts[c as usize];
        outstops[i] = stops[c as usize];
    }
    Ok(())
}

// === indexed / option kernels ===

/// Count the missing (negative) entries of an index.
pub fn indexedarray_numnull<C: IndexValue>(index: &[C]) -> i64 {
    index.iter().filter(|x| x.to_i64() < 0).count() as i64
}

/// Project an index with no missing entries into a carry.
pub fn indexedarray_getitem_nextcarry<C: IndexValue>(
    out: &mut [i64],
    index: &[C],
    content_length: i64,
) -> Result<(), Error> {
    for (i, x) in index.iter().enumerate() {
        let x = x.to_i64();
        if x < 0 || x >= content_length {
            return Err(Error::out_of_bounds(
                "index out of range",
                Some(x),
                Some(i as i64),
            ));
        }
        out[i] = x;
    }
    Ok(())
}

/// Project an index with missing entries: compact the present ones into a
/// carry and record each slot's position among them (`-1` for missing).
pub fn indexedarray_getitem_nextcarry_outindex<C: IndexValue>(
    out: &mut [i64],
    outindex: &mut [i64],
    index: &[C],
    content_length: i64,
) -> Result<(), Error> {
    let mut k = 0usize;
    for (i, x) in index.iter().enumerate() {
        let x = x.to_i64();
        if x < 0 {
            outindex[i] = -1;
        } else {
            if x >= content_length {
                return Err(Error::out_of_bounds(
                    "index out of range",
                    Some(x),
                    Some(i as i64),
                ));
            }
            out[k] = x;
            outindex[i] = k as i64;
            k += 1;
        }
    }
    Ok(())
}

// === union kernels ===

/// Number of elements carrying tag `which`.
pub fn unionarray_count_tag(tags: &[i8], which: i8) -> i64 {
    tags.iter().filter(|&&t| t == which).count() as i64
}

/// Gather the content positions of every element carrying tag `which`, in
/// element order.
pub fn unionarray_project(
    out: &mut [i64],
    tags: &[i8],
    index: &[i64],
    which: i8,
    content_length: i64,
) -> Result<(), Error> {
    let mut k = 0usize;
    for i in 0..tags.len() {
        if tags[i] == which {
            let x = index[i];
            if x < 0 || x >= content_length {
                return Err(Error::out_of_bounds(
                    "index out of range",
                    Some(x),
                    Some(i as i64),
                ));
            }
            out[k] = x;
            k += 1;
        }
    }
    Ok(())
}

/// Recompute each element's position within its tag's partition.
pub fn unionarray_localindex(out: &mut [i64], tags: &[i8], ncontents: usize) {
    let mut counters = vec![0i64; ncontents];
    for (i, &t) in tags.iter().enumerate() {
        out[i] = counters[t as usize];
        counters[t as usize] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regularized(
        start: Option<i64>,
        stop: Option<i64>,
        step: i64,
        length: i64,
    ) -> (i64, i64) {
        let (mut s, mut e) = (start.unwrap_or(0), stop.unwrap_or(0));
        regularize_rangeslice(&mut s, &mut e, step > 0, start.is_some(), stop.is_some(), length);
        (s, e)
    }

    #[test]
    fn rangeslice_positive_step() {
        assert_eq!(regularized(None, None, 1, 5), (0, 5));
        assert_eq!(regularized(Some(-2), None, 1, 5), (3, 5));
        assert_eq!(regularized(Some(2), Some(100), 1, 5), (2, 5));
        assert_eq!(regularized(Some(4), Some(1), 1, 5), (4, 4));
        assert_eq!(regularized(Some(-100), Some(-100), 1, 5), (0, 0));
    }

    #[test]
    fn rangeslice_negative_step() {
        assert_eq!(regularized(None, None, -1, 5), (4, -1));
        assert_eq!(regularized(Some(3), Some(0), -2, 5), (3, 0));
        assert_eq!(regularized(Some(100), None, -1, 5), (4, -1));
        assert_eq!(regularized(Some(1), Some(3), -1, 5), (1, 1));
    }

    #[test]
    fn rangecounts() {
        assert_eq!(rangecount(0, 5, 1), 5);
        assert_eq!(rangecount(0, 5, 2), 3);
        assert_eq!(rangecount(4, -1, -1), 5);
        assert_eq!(rangecount(4, -1, -2), 3);
        assert_eq!(rangecount(2, 2, 1), 0);
        assert_eq!(rangecount(0, 5, -1), 0);
    }

    #[test]
    fn regular_at_wraps_and_checks() {
        let mut out = [0i64; 4];
        regulararray_getitem_next_at(&mut out, -1, 4, 3).unwrap();
        assert_eq!(out, [2, 5, 8, 11]);
        let err = regulararray_getitem_next_at(&mut out, 3, 4, 3).unwrap_err();
        assert_eq!(err.slice_index(), Some(3));
    }

    #[test]
    fn identity_widens_through_regular_groups() {
        let input = [0i32, 1, 2, 3];
        let mut out = [0i32; 24];
        identity_from_regulararray(&mut out, &input, 3, 12, 4, 1);
        assert_eq!(&out[..6], &[0, 0, 0, 1, 0, 2]);
        assert_eq!(&out[18..], &[3, 0, 3, 1, 3, 2]);
    }

    #[test]
    fn listarray_range_offsets_and_carry() {
        // sublists [0,3), [3,3), [3,5): full range
        let starts = [0i32, 3, 3];
        let stops = [3i32, 3, 5];
        let n = listarray_getitem_next_range_carrylength(&starts, &stops, 0, 0, 1, false, false);
        assert_eq!(n, 5);
        let mut offsets = [0i64; 4];
        let mut carry = [0i64; 5];
        listarray_getitem_next_range(&mut offsets, &mut carry, &starts, &stops, 0, 0, 1, false, false);
        assert_eq!(offsets, [0, 3, 3, 5]);
        assert_eq!(carry, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn option_projection_compacts_missing() {
        let index = [0i64, -1, 1, -1, 2];
        assert_eq!(indexedarray_numnull(&index), 2);
        let mut carry = [0i64; 3];
        let mut outindex = [0i64; 5];
        indexedarray_getitem_nextcarry_outindex(&mut carry, &mut outindex, &index, 3).unwrap();
        assert_eq!(carry, [0, 1, 2]);
        assert_eq!(outindex, [0, -1, 1, -1, 2]);
    }
}
