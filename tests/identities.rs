use ragged::{Content, ErrorKind, Identity, Index64, ListArray, RecordArray, RegularArray};

fn grouped(size: i64, n: i64) -> Content {
    Content::Regular(RegularArray::new(
        Content::from((0..n).collect::<Vec<i64>>()),
        size,
    ))
}

fn content_id(content: &Content) -> &Identity {
    match content {
        Content::Regular(a) => a.content().id().expect("content should carry an identity"),
        Content::List64(a) => a.content().id().expect("content should carry an identity"),
        other => panic!("unexpected variant {}", other.classname()),
    }
}

#[test]
fn fresh_identities_widen_per_list_level() {
    let mut a = grouped(3, 12);
    a.setid().unwrap();

    let root = a.id().unwrap();
    assert_eq!(root.width(), 1);
    assert_eq!(root.length(), 4);
    for row in 0..4 {
        assert_eq!(root.values_at(row), vec![row]);
    }

    let sub = content_id(&a);
    assert_eq!(sub.width(), 2);
    assert_eq!(sub.length(), 12);
    assert_eq!(sub.values_at(0), vec![0, 0]);
    assert_eq!(sub.values_at(4), vec![1, 1]);
    assert_eq!(sub.values_at(11), vec![3, 2]);
}

#[test]
fn list_identities_label_covered_rows() {
    let mut a = Content::List64(ListArray::new(
        Index64::from_vec(vec![0, 3]),
        Index64::from_vec(vec![3, 5]),
        Content::from(vec![10i64, 11, 12, 13, 14]),
    ));
    a.setid().unwrap();

    let sub = content_id(&a);
    assert_eq!(sub.width(), 2);
    assert_eq!(sub.length(), 5);
    assert_eq!(sub.values_at(0), vec![0, 0]);
    assert_eq!(sub.values_at(2), vec![0, 2]);
    assert_eq!(sub.values_at(3), vec![1, 0]);
    assert_eq!(sub.values_at(4), vec![1, 1]);
}

#[test]
fn overlapping_sublists_make_identities_ambiguous() {
    let mut a = Content::List64(ListArray::new(
        Index64::from_vec(vec![0, 0]),
        Index64::from_vec(vec![2, 2]),
        Content::from(vec![1i64, 2]),
    ));
    let err = a.setid().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
}

#[test]
fn identity_length_must_match() {
    let mut a = grouped(3, 12);
    let err = a.setid_with(Some(Identity::new(3))).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdentityLength);
    assert_eq!(err.classname(), Some("RegularArray"));
}

#[test]
fn identities_follow_carries() {
    let mut a = grouped(3, 12);
    a.setid().unwrap();
    let carried = a.carry(&Index64::from_vec(vec![2, 0])).unwrap();
    let id = carried.id().unwrap();
    assert_eq!(id.length(), 2);
    assert_eq!(id.values_at(0), vec![2]);
    assert_eq!(id.values_at(1), vec![0]);
}

#[test]
fn identities_follow_range_views() {
    let mut a = grouped(3, 12);
    a.setid().unwrap();
    let view = a.getitem_range(1, 3).unwrap();
    let id = view.id().unwrap();
    assert_eq!(id.length(), 2);
    assert_eq!(id.values_at(0), vec![1]);
}

#[test]
fn record_descent_extends_the_field_path() {
    let mut rec = Content::Record(RecordArray::new(
        vec![
            ("x".to_owned(), Content::from(vec![1i64, 2])),
            ("y".to_owned(), Content::from(vec![3i64, 4])),
        ],
        2,
    ));
    rec.setid().unwrap();
    match &rec {
        Content::Record(r) => {
            let (_, x) = &r.fields()[0];
            let id = x.id().unwrap();
            assert_eq!(id.width(), 1);
            assert_eq!(id.fieldloc(), &vec![(1, "x".to_owned())]);
            assert_eq!(id.location_at(1), "1, \"x\"");
        }
        _ => unreachable!(),
    }
}

#[test]
fn widening_to_64_bits_is_explicit() {
    let id = Identity::new(5);
    assert_eq!(id.classname(), "Identity32");
    let wide = id.to64();
    assert_eq!(wide.classname(), "Identity64");
    assert_eq!(wide.values_at(4), vec![4]);
}

#[test]
fn clearing_identities_recurses() {
    let mut a = grouped(3, 12);
    a.setid().unwrap();
    a.setid_with(None).unwrap();
    assert!(a.id().is_none());
    match &a {
        Content::Regular(r) => assert!(r.content().id().is_none()),
        _ => unreachable!(),
    }
}

#[test]
fn iteration_checks_identity_length() {
    let mut a = grouped(3, 12);
    a.setid().unwrap();
    // a shorter view of the same node keeps a consistent identity
    let view = a.getitem_range(0, 2).unwrap();
    assert!(ragged::Iter::new(&view).is_ok());
}
