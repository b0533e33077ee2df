use defmac::defmac;
use ragged::{
    s, Content, ErrorKind, Index32, Index64, Index8, ListArray, ListOffsetArray, OptionArray,
    RecordArray, SliceInfo, SliceItem, UnionArray,
};

defmac!(json c => c.tojson().unwrap());

fn ragged_three() -> Content {
    // [[1, 2, 3], [], [4, 5]]
    Content::List32(ListArray::new(
        Index32::from_vec(vec![0, 3, 3]),
        Index32::from_vec(vec![3, 3, 5]),
        Content::from(vec![1i64, 2, 3, 4, 5]),
    ))
}

fn packed_three() -> Content {
    Content::ListOffset64(ListOffsetArray::new(
        Index64::from_vec(vec![0, 3, 3, 5]),
        Content::from(vec![1i64, 2, 3, 4, 5]),
    ))
}

#[test]
fn elements_follow_starts_and_stops() {
    for a in [ragged_three(), packed_three()] {
        assert_eq!(a.length(), 3);
        assert_eq!(json!(a.getitem_at(0).unwrap()), "[1,2,3]");
        assert_eq!(a.getitem_at(1).unwrap().length(), 0);
        assert_eq!(json!(a.getitem_at(2).unwrap()), "[4,5]");
        assert_eq!(json!(a), "[[1,2,3],[],[4,5]]");
    }
}

#[test]
fn carry_replicates_and_reorders() {
    let a = ragged_three();
    let carried = a.carry(&Index64::from_vec(vec![2, 0, 0])).unwrap();
    assert_eq!(carried.length(), 3);
    assert_eq!(json!(carried.clone()), "[[4,5],[1,2,3],[1,2,3]]");
    assert_eq!(carried.getitem_at(0).unwrap().length(), 2);
    assert_eq!(carried.getitem_at(1).unwrap().length(), 3);

    let err = a.carry(&Index64::from_vec(vec![3])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfBounds);
}

#[test]
fn carry_shares_content() {
    let a = packed_three();
    let carried = a.carry(&Index64::from_vec(vec![2, 1, 0])).unwrap();
    match (&a, &carried) {
        (Content::ListOffset64(orig), Content::List64(out)) => {
            match (orig.content(), out.content()) {
                (Content::Numpy(x), Content::Numpy(y)) => assert!(x.data().ptr_eq(y.data())),
                _ => panic!("expected leaves"),
            }
        }
        _ => panic!("carrying a packed list should yield a general list"),
    }
}

#[test]
fn per_sublist_ranges() {
    for a in [ragged_three(), packed_three()] {
        assert_eq!(json!(a.getitem(&s![.., 0..2]).unwrap()), "[[1,2],[],[4,5]]");
        assert_eq!(json!(a.getitem(&s![.., ..;-1]).unwrap()), "[[3,2,1],[],[5,4]]");
        assert_eq!(json!(a.getitem(&s![1.., 1..]).unwrap()), "[[],[5]]");
    }
}

#[test]
fn per_sublist_at_canonicalizes_against_each_length() {
    let a = Content::List32(ListArray::new(
        Index32::from_vec(vec![0, 3]),
        Index32::from_vec(vec![3, 5]),
        Content::from(vec![1i64, 2, 3, 4, 5]),
    ));
    assert_eq!(json!(a.getitem(&s![.., -1]).unwrap()), "[3,5]");

    // the empty middle sublist makes any per-sublist index fail
    let err = ragged_three().getitem(&s![.., 0]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    assert_eq!(err.logical_index(), Some(1));
}

#[test]
fn fancy_indexing_within_sublists() {
    let a = Content::List32(ListArray::new(
        Index32::from_vec(vec![0, 3]),
        Index32::from_vec(vec![3, 5]),
        Content::from(vec![1i64, 2, 3, 4, 5]),
    ));
    assert_eq!(
        json!(a.getitem(&s![.., vec![0i64, -1]]).unwrap()),
        "[[1,3],[4,5]]"
    );
    // zipped with an outer fancy index
    assert_eq!(json!(a.getitem(&s![vec![0i64, 1], vec![0i64, -1]]).unwrap()), "[1,5]");
}

#[test]
fn lists_of_lists() {
    // [[[1, 2, 3], []], [[4, 5]]]
    let outer = Content::ListOffset64(ListOffsetArray::new(
        Index64::from_vec(vec![0, 2, 3]),
        packed_three(),
    ));
    assert_eq!(json!(outer.clone()), "[[[1,2,3],[]],[[4,5]]]");
    assert_eq!(json!(outer.getitem(&s![.., 0]).unwrap()), "[[1,2,3],[4,5]]");
    assert_eq!(
        json!(outer.getitem(&s![.., 0, 1..]).unwrap()),
        "[[2,3],[5]]"
    );
}

#[test]
fn permuted_overlapping_bounds_are_legal() {
    // sublists may overlap and run in any order
    let a = Content::List64(ListArray::new(
        Index64::from_vec(vec![2, 0, 1]),
        Index64::from_vec(vec![5, 3, 3]),
        Content::from(vec![10i64, 11, 12, 13, 14]),
    ));
    assert_eq!(json!(a), "[[12,13,14],[10,11,12],[11,12]]");
}

#[test]
fn options_render_and_slice_through() {
    // [[1, 2], None, [3, 4, 5]]
    let a = Content::Option64(OptionArray::new(
        Index64::from_vec(vec![0, -1, 1]),
        Content::ListOffset64(ListOffsetArray::new(
            Index64::from_vec(vec![0, 2, 5]),
            Content::from(vec![1i64, 2, 3, 4, 5]),
        )),
    ));
    assert_eq!(json!(a.clone()), "[[1,2],null,[3,4,5]]");
    assert_eq!(json!(a.getitem(&s![.., 0]).unwrap()), "[1,null,3]");
    assert_eq!(json!(a.getitem(&s![.., 1..]).unwrap()), "[[2],null,[4,5]]");

    let carried = a.carry(&Index64::from_vec(vec![1, 2, 0, 1])).unwrap();
    assert_eq!(json!(carried), "[null,[3,4,5],[1,2],null]");
}

#[test]
fn indexed_composes_under_carry() {
    use ragged::IndexedArray;

    let a = Content::Indexed32(IndexedArray::new(
        Index32::from_vec(vec![2, 0, 1, 2]),
        Content::from(vec![10i64, 20, 30]),
    ));
    assert_eq!(json!(a.clone()), "[30,10,20,30]");
    let twice = a.carry(&Index64::from_vec(vec![3, 0])).unwrap();
    assert_eq!(json!(twice.clone()), "[30,30]");
    match &twice {
        Content::Indexed32(ix) => assert_eq!(ix.index().as_slice(), &[2, 2]),
        other => panic!("expected a composed index, got {}", other.classname()),
    }
}

#[test]
fn unions_partition_by_tag() {
    let a = Content::Union(UnionArray::new(
        Index8::from_vec(vec![0, 1, 0]),
        Index64::from_vec(vec![0, 0, 1]),
        vec![
            Content::from(vec![10i64, 20]),
            Content::from(vec![1.5f64]),
        ],
    ));
    assert_eq!(json!(a.clone()), "[10,1.5,20]");
    assert_eq!(json!(a.carry(&Index64::from_vec(vec![2, 1, 0])).unwrap()), "[20,1.5,10]");
}

#[test]
fn union_of_lists_slices_each_alternative() {
    let a = Content::Union(UnionArray::new(
        Index8::from_vec(vec![0, 1, 0]),
        Index64::from_vec(vec![0, 0, 1]),
        vec![
            packed_three().getitem_range(0, 2).unwrap(), // [[1,2,3],[]]
            Content::ListOffset64(ListOffsetArray::new(
                Index64::from_vec(vec![0, 2]),
                Content::from(vec![8i64, 9]),
            )),
        ],
    ));
    assert_eq!(json!(a.clone()), "[[1,2,3],[8,9],[]]");
    assert_eq!(json!(a.getitem(&s![.., 1..]).unwrap()), "[[2,3],[9],[]]");
}

#[test]
fn records_are_struct_of_arrays() {
    let a = Content::Record(RecordArray::new(
        vec![
            ("x".to_owned(), Content::from(vec![1i64, 2, 3])),
            ("y".to_owned(), Content::from(vec![1.5f64, 2.5, 3.5])),
        ],
        3,
    ));
    assert_eq!(
        json!(a.clone()),
        "[{\"x\":1,\"y\":1.5},{\"x\":2,\"y\":2.5},{\"x\":3,\"y\":3.5}]"
    );
    assert_eq!(a.numfields(), 2);
    assert_eq!(a.keys().unwrap(), vec!["x", "y"]);

    assert_eq!(json!(a.getitem_field("x").unwrap()), "[1,2,3]");
    assert_eq!(json!(a.getitem(&s!["x", 1]).unwrap()), "2");
    assert_eq!(
        json!(a.getitem_fields(&["y".to_owned()]).unwrap()),
        "[{\"y\":1.5},{\"y\":2.5},{\"y\":3.5}]"
    );

    let err = a.getitem_field("z").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfBounds);
}

#[test]
fn records_are_transparent_to_positional_slicing() {
    // one record column of ragged lists
    let a = Content::Record(RecordArray::new(
        vec![("v".to_owned(), packed_three())],
        3,
    ));
    let out = a.getitem(&s![1.., 0..1]).unwrap();
    assert_eq!(json!(out), "[{\"v\":[]},{\"v\":[4]}]");
}

#[test]
fn field_selection_through_containers() {
    // [[{"x": 1}, {"x": 2}], [{"x": 3}]]
    let rec = Content::Record(RecordArray::new(
        vec![("x".to_owned(), Content::from(vec![1i64, 2, 3]))],
        3,
    ));
    let lists = Content::ListOffset64(ListOffsetArray::new(
        Index64::from_vec(vec![0, 2, 3]),
        rec,
    ));
    assert_eq!(json!(lists.getitem_field("x").unwrap()), "[[1,2],[3]]");
    assert_eq!(json!(lists.getitem(&s![.., "x", 0]).unwrap()), "[1,3]");
    assert_eq!(lists.keys().unwrap(), vec!["x"]);
}

#[test]
fn missing_entries_in_the_leading_dimension() {
    let a = Content::from(vec![1i64, 2, 3]);
    let info = SliceInfo::new(vec![SliceItem::Missing(vec![0, -1, 2])]).unwrap();
    assert_eq!(json!(a.getitem(&info).unwrap()), "[1,null,3]");

    let b = ragged_three();
    let info = SliceInfo::new(vec![
        SliceItem::Missing(vec![2, -1, 0]),
        SliceItem::from(..2),
    ])
    .unwrap();
    assert_eq!(json!(b.getitem(&info).unwrap()), "[[4,5],null,[1,2]]");

    // deeper than the leading dimension is refused
    let info = SliceInfo::new(vec![
        SliceItem::from(..),
        SliceItem::Missing(vec![0, -1]),
    ])
    .unwrap();
    assert_eq!(b.getitem(&info).unwrap_err().kind(), ErrorKind::Unsupported);
}

#[test]
fn getitem_nothing_preserves_element_type() {
    let a = ragged_three();
    let nothing = a.getitem_nothing();
    assert_eq!(nothing.length(), 0);
    match nothing {
        Content::Numpy(_) => {}
        other => panic!("expected an empty leaf view, got {}", other.classname()),
    }

    let rec = Content::Record(RecordArray::new(
        vec![("x".to_owned(), Content::from(vec![1i64]))],
        1,
    ));
    match rec.getitem_nothing() {
        Content::Record(r) => assert_eq!(r.length(), 0),
        other => panic!("expected an empty record view, got {}", other.classname()),
    }
}
