use ragged::{
    Content, DType, ErrorKind, Index64, ListOffsetArray, OptionArray, RecordArray, RecordType,
    RegularArray, Type,
};

fn grouped(size: i64, n: i64) -> Content {
    Content::Regular(RegularArray::new(
        Content::from((0..n).collect::<Vec<i64>>()),
        size,
    ))
}

#[test]
fn innertype_mirrors_the_tree() {
    let a = grouped(3, 12);
    assert_eq!(
        a.innertype(true),
        Type::regular(Type::Primitive(DType::Int64), 3)
    );
    assert_eq!(a.innertype(true).to_string(), "3 * int64");

    let lists = Content::ListOffset64(ListOffsetArray::new(
        Index64::from_vec(vec![0, 2, 5]),
        Content::from(vec![1.0f64, 2.0, 3.0, 4.0, 5.0]),
    ));
    assert_eq!(lists.innertype(true).to_string(), "var * float64");

    let option = Content::Option64(OptionArray::new(
        Index64::from_vec(vec![0, -1]),
        Content::from(vec![true, false]),
    ));
    assert_eq!(option.innertype(true).to_string(), "?bool");
}

#[test]
fn settype_part_roundtrips_own_type() {
    let mut a = grouped(3, 12);
    let bare = a.innertype(true);
    a.settype_part(bare.clone()).unwrap();
    assert_eq!(a.length(), 4);
    assert_eq!(a.ty().unwrap().as_ref(), &bare);

    // the inner layer was recursed into the child
    match &a {
        Content::Regular(r) => {
            assert_eq!(
                r.content().ty().unwrap().as_ref(),
                &Type::Primitive(DType::Int64)
            );
        }
        _ => unreachable!(),
    }
}

#[test]
fn settype_part_rejects_wrong_layers() {
    let mut a = grouped(3, 12);

    let err = a
        .settype_part(Type::list(Type::Primitive(DType::Int64)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert!(err.to_string().contains("versus"));

    // same variant but a different fixed size is still incompatible
    let err = a
        .settype_part(Type::regular(Type::Primitive(DType::Int64), 4))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    // options are invisible to the acceptance check
    let mut b = grouped(3, 12);
    b.settype_part(Type::option(Type::regular(
        Type::Primitive(DType::Int64),
        3,
    )))
    .unwrap();
}

#[test]
fn accepts_compares_only_the_outer_layer() {
    let a = grouped(3, 12);
    assert!(a.accepts(&Type::regular(Type::Unknown, 3)));
    assert!(a.accepts(&Type::regular(Type::list(Type::Unknown), 3)));
    assert!(!a.accepts(&Type::regular(Type::Unknown, 4)));
    assert!(!a.accepts(&Type::list(Type::Unknown)));
}

#[test]
fn record_types_on_record_arrays() {
    let mut rec = Content::Record(RecordArray::new(
        vec![
            ("x".to_owned(), Content::from(vec![1i64, 2])),
            ("y".to_owned(), Content::from(vec![0.5f64, 1.5])),
        ],
        2,
    ));
    assert_eq!(
        rec.innertype(true).to_string(),
        "{\"x\": int64, \"y\": float64}"
    );

    let ty = Type::Record(
        RecordType::new(vec![
            ("x".to_owned(), Type::Primitive(DType::Int64)),
            ("y".to_owned(), Type::Primitive(DType::Float64)),
        ])
        .with_aliases(vec![("horizontal".to_owned(), "x".to_owned())]),
    );
    rec.settype_part(ty).unwrap();

    // aliases resolve through the stored type
    assert_eq!(rec.fieldindex("horizontal").unwrap(), 0);
    assert_eq!(rec.keyaliases("x").unwrap(), vec!["horizontal"]);
    assert_eq!(rec.getitem_field("horizontal").unwrap().tojson().unwrap(), "[1,2]");
}

#[test]
fn introspection_reaches_through_containers() {
    let rec = Content::Record(RecordArray::new(
        vec![
            ("x".to_owned(), Content::from(vec![1i64, 2, 3])),
            ("y".to_owned(), Content::from(vec![4i64, 5, 6])),
        ],
        3,
    ));
    let lists = Content::ListOffset64(ListOffsetArray::new(
        Index64::from_vec(vec![0, 1, 3]),
        rec,
    ));
    let option = Content::Option64(OptionArray::new(
        Index64::from_vec(vec![0, -1]),
        lists,
    ));

    assert_eq!(option.numfields(), 2);
    assert_eq!(option.keys().unwrap(), vec!["x", "y"]);
    assert_eq!(option.fieldindex("y").unwrap(), 1);
    assert!(option.haskey("x").unwrap());
    assert!(!option.haskey("z").unwrap());
}

#[test]
fn leaves_have_no_records() {
    let a = Content::from(vec![1i64, 2]);
    assert_eq!(a.numfields(), -1);
    assert_eq!(a.keys().unwrap_err().kind(), ErrorKind::NoRecords);
    assert_eq!(a.fieldindex("x").unwrap_err().kind(), ErrorKind::NoRecords);
    assert_eq!(a.getitem_field("x").unwrap_err().kind(), ErrorKind::NoRecords);
}

#[test]
fn option_type_collapse() {
    let t = Type::option(Type::option(Type::list(Type::Primitive(DType::Int64))));
    assert_eq!(t.option_type(), &Type::list(Type::Primitive(DType::Int64)));

    // at type level, keys() of an option of list of primitive is empty
    let t = Type::option(Type::list(Type::Primitive(DType::Int64)));
    assert_eq!(t.keys().unwrap(), Vec::<String>::new());

    // two options around a record still reach the record
    let t = Type::option(Type::option(Type::Record(RecordType::new(vec![
        ("x".to_owned(), Type::Primitive(DType::Int64)),
        ("y".to_owned(), Type::Primitive(DType::Float64)),
    ]))));
    assert_eq!(t.keys().unwrap(), vec!["x", "y"]);
}

#[test]
fn union_types_match_arity() {
    use ragged::{Index8, UnionArray};

    let mut a = Content::Union(UnionArray::new(
        Index8::from_vec(vec![0, 1]),
        Index64::from_vec(vec![0, 0]),
        vec![Content::from(vec![1i64]), Content::from(vec![0.5f64])],
    ));
    assert_eq!(a.innertype(true).to_string(), "union[int64, float64]");

    a.settype_part(Type::union(vec![
        Type::Primitive(DType::Int64),
        Type::Primitive(DType::Float64),
    ]))
    .unwrap();

    let err = a
        .settype_part(Type::union(vec![Type::Primitive(DType::Int64)]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn stored_types_survive_range_views() {
    let mut a = grouped(3, 12);
    a.settype_part(a.innertype(true)).unwrap();
    let view = a.getitem_range(1, 3).unwrap();
    assert_eq!(view.ty().unwrap().to_string(), "3 * int64");
}
