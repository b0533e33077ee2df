use ragged::{s, Content, ErrorKind, RegularArray, SliceArray};

fn iota(n: i64) -> Content {
    Content::from((0..n).collect::<Vec<i64>>())
}

fn grouped(size: i64, n: i64) -> Content {
    Content::Regular(RegularArray::new(iota(n), size))
}

#[test]
fn length_floors_incomplete_groups() {
    assert_eq!(grouped(3, 12).length(), 4);
    assert_eq!(grouped(3, 14).length(), 4);
    assert_eq!(grouped(5, 4).length(), 0);
    assert_eq!(Content::Regular(RegularArray::new(iota(4), 0)).length(), 0);
}

#[test]
fn getitem_at_wraps_and_checks() {
    let a = grouped(3, 12);
    assert_eq!(a.getitem_at(-1).unwrap().tojson().unwrap(), "[9,10,11]");
    assert_eq!(a.getitem_at(0).unwrap().tojson().unwrap(), "[0,1,2]");

    let err = a.getitem_at(4).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    assert_eq!(err.slice_index(), Some(4));
    assert_eq!(err.classname(), Some("RegularArray"));
}

#[test]
fn invisible_tail_elements_stay_invisible() {
    // 14 elements grouped by 3: the last two are unreachable
    let a = grouped(3, 14);
    assert_eq!(a.getitem_at(3).unwrap().tojson().unwrap(), "[9,10,11]");
    assert!(a.getitem_at(4).is_err());
}

#[test]
fn two_range_dimensions() {
    let a = grouped(3, 12);
    let out = a.getitem(&s![1..3, 0..2]).unwrap();
    assert_eq!(out.tojson().unwrap(), "[[3,4],[6,7]]");
}

#[test]
fn range_with_negative_step() {
    let a = grouped(3, 12);
    assert_eq!(
        a.getitem(&s![..;-1]).unwrap().tojson().unwrap(),
        "[[9,10,11],[6,7,8],[3,4,5],[0,1,2]]"
    );
    assert_eq!(
        a.getitem(&s![.., 2..0;-1]).unwrap().tojson().unwrap(),
        "[[2,1],[5,4],[8,7],[11,10]]"
    );
    assert_eq!(
        a.getitem(&s![.., ..;-2]).unwrap().tojson().unwrap(),
        "[[2,0],[5,3],[8,6],[11,9]]"
    );
}

#[test]
fn zero_length_range_still_recurses() {
    // a fixed-size group of size 0 has length 0, so the rows collapse
    let a = grouped(3, 12);
    let out = a.getitem(&s![.., 2..2]).unwrap();
    assert_eq!(out.length(), 0);
    assert_eq!(out.tojson().unwrap(), "[]");
    match &out {
        Content::Regular(r) => assert_eq!(r.size(), 0),
        other => panic!("expected a fixed-size group, got {}", other.classname()),
    }
}

#[test]
fn at_then_range_drops_a_dimension() {
    let a = grouped(3, 12);
    assert_eq!(a.getitem(&s![2, 1..]).unwrap().tojson().unwrap(), "[7,8]");
    assert_eq!(a.getitem(&s![2, 1]).unwrap().tojson().unwrap(), "7");
}

#[test]
fn fancy_index_keeps_its_shape() {
    let a = grouped(4, 16);
    let out = a
        .getitem(&s![0..2, SliceArray::new(vec![0, 2, 1, 3], vec![2, 2])])
        .unwrap();
    assert_eq!(out.tojson().unwrap(), "[[[0,2],[1,3]],[[4,6],[5,7]]]");

    // outermost dimensions mirror the slice-array shape as fixed sizes
    match &out {
        Content::Regular(outer) => {
            assert_eq!(outer.size(), 2);
            match outer.content() {
                Content::Regular(inner) => assert_eq!(inner.size(), 2),
                other => panic!("expected a fixed-size group, got {}", other.classname()),
            }
        }
        other => panic!("expected a fixed-size group, got {}", other.classname()),
    }
}

#[test]
fn fancy_index_canonicalizes_negatives() {
    let a = grouped(3, 12);
    let out = a.getitem(&s![.., vec![-1i64, 0]]).unwrap();
    assert_eq!(out.tojson().unwrap(), "[[2,0],[5,3],[8,6],[11,9]]");

    let err = a.getitem(&s![.., vec![3i64]]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    assert_eq!(err.slice_index(), Some(3));
}

#[test]
fn zipped_fancy_indexes() {
    let a = grouped(3, 12);
    // one index pair per row pick: a[[0, 2], [1, -1]]
    let out = a.getitem(&s![vec![0i64, 2], vec![1i64, -1]]).unwrap();
    assert_eq!(out.tojson().unwrap(), "[1,8]");
}

#[test]
fn new_axis_inserts_a_unit_dimension() {
    let a = grouped(3, 12);
    let out = a.getitem(&s![ragged::NewAxis]).unwrap();
    assert_eq!(
        out.tojson().unwrap(),
        "[[[0,1,2],[3,4,5],[6,7,8],[9,10,11]]]"
    );
    let out = a.getitem(&s![.., ragged::NewAxis, ..]).unwrap();
    assert_eq!(
        out.tojson().unwrap(),
        "[[[0,1,2]],[[3,4,5]],[[6,7,8]],[[9,10,11]]]"
    );
}

#[test]
fn ellipsis_fills_remaining_dimensions() {
    let a = grouped(3, 12);
    assert_eq!(
        a.getitem(&s![ragged::Ellipsis, 0]).unwrap().tojson().unwrap(),
        "[0,3,6,9]"
    );
    assert_eq!(
        a.getitem(&s![0, ragged::Ellipsis]).unwrap().tojson().unwrap(),
        "[0,1,2]"
    );
}

#[test]
fn too_many_dimensions_is_an_error() {
    let a = grouped(3, 12);
    let err = a.getitem(&s![0, 0, 0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn multidimensional_leaf_promotes_to_groups() {
    use ragged::{NumpyArray, PrimitiveData};

    let leaf = NumpyArray::new(
        PrimitiveData::from((0..12).collect::<Vec<i64>>()),
        vec![4, 3],
        vec![3, 1],
        0,
    );
    let a = Content::Numpy(leaf);
    assert_eq!(a.length(), 4);
    assert_eq!(a.getitem_at(1).unwrap().tojson().unwrap(), "[3,4,5]");
    assert_eq!(
        a.getitem(&s![1..3, 0..2]).unwrap().tojson().unwrap(),
        "[[3,4],[6,7]]"
    );
}

#[test]
fn range_view_shares_payload() {
    let a = grouped(3, 12);
    let view = a.getitem_range(1, 3).unwrap();
    assert_eq!(view.length(), 2);
    assert_eq!(view.tojson().unwrap(), "[[3,4,5],[6,7,8]]");

    match (&a, &view) {
        (Content::Regular(orig), Content::Regular(sub)) => {
            match (orig.content(), sub.content()) {
                (Content::Numpy(orig), Content::Numpy(sub)) => {
                    assert!(orig.data().ptr_eq(sub.data()));
                }
                _ => panic!("expected leaves"),
            }
        }
        _ => panic!("expected fixed-size groups"),
    }
}
