use itertools::Itertools;
use quickcheck::quickcheck;
use ragged::{s, Content, Index64, ListOffsetArray, RegularArray, SliceInfo};

fn grouped(size: i64, n: i64) -> Content {
    Content::Regular(RegularArray::new(
        Content::from((0..n).collect::<Vec<i64>>()),
        size,
    ))
}

/// Build a ragged array of consecutive integers from sublist lengths.
fn ragged_from_lengths(lengths: &[u8]) -> Content {
    let mut offsets = vec![0i64];
    for &len in lengths {
        offsets.push(offsets.last().unwrap() + (len % 5) as i64);
    }
    let total = *offsets.last().unwrap();
    Content::ListOffset64(ListOffsetArray::new(
        Index64::from_vec(offsets),
        Content::from((0..total).collect::<Vec<i64>>()),
    ))
}

/// A deterministic permutation of `0..n` derived from `seed`.
fn permutation(n: i64, seed: u64) -> Vec<i64> {
    (0..n)
        .sorted_by_key(|&i| (i as u64).wrapping_mul(seed | 1).rotate_left((seed % 31) as u32))
        .collect()
}

#[test]
fn shallow_copy_shares_children() {
    let a = grouped(3, 12);
    let b = a.shallow_copy();
    assert_eq!(a.length(), b.length());
    match (&a, &b) {
        (Content::Regular(x), Content::Regular(y)) => match (x.content(), y.content()) {
            (Content::Numpy(x), Content::Numpy(y)) => assert!(x.data().ptr_eq(y.data())),
            _ => panic!("expected leaves"),
        },
        _ => panic!("expected fixed-size groups"),
    }
}

#[test]
fn wrapping_and_nowrap_agree() {
    let a = ragged_from_lengths(&[3, 0, 2, 4]);
    let len = a.length();
    for i in -len..len {
        let wrapped = a.getitem_at(i).unwrap().tojson().unwrap();
        let i_mod = if i < 0 { i + len } else { i };
        let nowrap = a.getitem_at_nowrap(i_mod).unwrap().tojson().unwrap();
        assert_eq!(wrapped, nowrap);
    }
}

#[test]
fn range_lengths_clamp() {
    let a = grouped(3, 12);
    let cases = [(0i64, 4i64), (1, 3), (3, 1), (-2, 4), (-100, 100), (2, 2)];
    for (start, stop) in cases {
        let out = a.getitem_range(start, stop).unwrap();
        let clamp = |x: i64| {
            let x = if x < 0 { x + 4 } else { x };
            x.clamp(0, 4)
        };
        let expected = (clamp(stop) - clamp(start)).max(0);
        assert_eq!(out.length(), expected, "range {}..{}", start, stop);
    }
}

quickcheck! {
    fn carry_round_trip(lengths: Vec<u8>, seed: u64) -> bool {
        let a = ragged_from_lengths(&lengths);
        let p = permutation(a.length(), seed);
        let carried = a.carry(&Index64::from_vec(p.clone())).unwrap();
        if carried.length() != p.len() as i64 {
            return false;
        }
        (0..p.len() as i64).all(|i| {
            carried.getitem_at(i).unwrap().tojson().unwrap()
                == a.getitem_at(p[i as usize]).unwrap().tojson().unwrap()
        })
    }

    fn getitem_range_matches_elementwise(lengths: Vec<u8>, bounds: (i8, i8)) -> bool {
        let a = ragged_from_lengths(&lengths);
        let (start, stop) = (bounds.0 as i64, bounds.1 as i64);
        let view = a.getitem_range(start, stop).unwrap();
        (0..view.length()).all(|i| {
            let clamped_start = {
                let x = if start < 0 { start + a.length() } else { start };
                x.clamp(0, a.length())
            };
            view.getitem_at(i).unwrap().tojson().unwrap()
                == a.getitem_at(clamped_start + i).unwrap().tojson().unwrap()
        })
    }
}

#[test]
fn slice_composition_law() {
    let a = grouped(4, 32);
    let composed = a.getitem(&s![1..6, 0..3]).unwrap();
    let chained = a.getitem(&s![1..6]).unwrap().getitem(&s![.., 0..3]).unwrap();
    assert_eq!(
        composed.tojson().unwrap(),
        chained.tojson().unwrap()
    );

    let b = ragged_from_lengths(&[4, 1, 0, 3, 2]);
    let composed = b.getitem(&s![1.., ..;-1]).unwrap();
    let chained = b.getitem(&s![1..]).unwrap().getitem(&s![.., ..;-1]).unwrap();
    assert_eq!(composed.tojson().unwrap(), chained.tojson().unwrap());
}

#[test]
fn composition_with_leading_index() {
    let a = grouped(4, 32);
    let composed = a.getitem(&s![2, 1..3]).unwrap();
    let chained = a.getitem(&s![2]).unwrap().getitem(&s![1..3]).unwrap();
    assert_eq!(composed.tojson().unwrap(), chained.tojson().unwrap());
}

#[test]
fn empty_slice_is_identity() {
    let a = ragged_from_lengths(&[2, 3]);
    let out = a.getitem(&SliceInfo::default()).unwrap();
    assert_eq!(out.tojson().unwrap(), a.tojson().unwrap());
}

#[test]
fn empty_array_edge_cases() {
    use ragged::{EmptyArray, ErrorKind};

    let empty = Content::Empty(EmptyArray::new());
    assert_eq!(empty.length(), 0);
    assert_eq!(empty.getitem_at(0).unwrap_err().kind(), ErrorKind::OutOfBounds);
    assert_eq!(empty.getitem_range(0, 10).unwrap().length(), 0);

    let sliced = empty.getitem(&s![..]).unwrap();
    assert_eq!(sliced.length(), 0);
}

#[test]
fn slicing_an_empty_outer_dimension() {
    let a = ragged_from_lengths(&[]);
    assert_eq!(a.length(), 0);
    assert_eq!(a.getitem(&s![..]).unwrap().tojson().unwrap(), "[]");
    assert_eq!(a.getitem(&s![.., 0..1]).unwrap().tojson().unwrap(), "[]");
}

#[test]
fn advanced_state_is_empty_or_full() {
    // a fancy index followed by a range broadcasts across the range
    let a = Content::Regular(RegularArray::new(grouped(2, 24), 3));
    // shape (4, 3, 2): a[1:3, [0, 2], 0:1]
    let out = a.getitem(&s![1..3, vec![0i64, 2], 0..1]).unwrap();
    let expected = a
        .getitem(&s![1..3])
        .unwrap()
        .getitem(&s![.., vec![0i64, 2]])
        .unwrap()
        .getitem(&s![.., .., 0..1])
        .unwrap();
    assert_eq!(out.tojson().unwrap(), expected.tojson().unwrap());
}
