use fielddata::{
    AtomicNumericFieldData, FieldDataSettings, Layout, NumericFieldDataLoader, NumericWidth,
};
use fielddata_ordinals::SegmentReader;
use fielddata_testkit::{
    MemorySegment, SegmentBuilder,
    data_gen::{ValueDistribution, generate_docs},
};
use itertools::Itertools;

fn load(segment: &MemorySegment) -> AtomicNumericFieldData {
    NumericFieldDataLoader::default()
        .load(segment, segment.field())
        .unwrap()
}

fn assert_values_preserved(segment: &MemorySegment, data: &AtomicNumericFieldData) {
    let values = data.long_values();
    for doc in 0..segment.max_doc() {
        let expected = segment.expected_values(doc);
        assert_eq!(values.value_count(doc), expected.len(), "doc {doc}");
        assert_eq!(values.values(doc).collect_vec(), expected, "doc {doc}");
        assert_eq!(values.value(doc), expected.first().copied(), "doc {doc}");
    }
}

#[test]
fn test_field_without_terms_is_empty() {
    let mut builder = SegmentBuilder::new(1, "price");
    builder.add_doc(&[]);
    builder.add_doc(&[]);
    let segment = builder.build();

    let data = load(&segment);
    assert_eq!(data.layout(), Layout::Empty);
    assert_eq!(data.estimated_memory_size_bytes(), 0);
    assert_eq!(data.num_docs(), 2);

    let data = NumericFieldDataLoader::default()
        .load(&segment, "missing")
        .unwrap();
    assert_eq!(data.layout(), Layout::Empty);
}

#[test]
fn test_single_valued_dense() {
    let segment = MemorySegment::from_docs(
        1,
        "f",
        &[vec![10], vec![20], vec![10], vec![30], vec![20]],
    );
    let data = load(&segment);
    assert_eq!(data.layout(), Layout::Single);
    assert_eq!(data.width(), Some(NumericWidth::I8));
    let values = data.long_values();
    assert_eq!(
        (0..5).map(|doc| values.value(doc).unwrap()).collect_vec(),
        vec![10, 20, 10, 30, 20]
    );
    assert_eq!(data.estimated_memory_size_bytes(), 5);
}

#[test]
fn test_single_valued_dense_with_null_set() {
    let segment = MemorySegment::from_docs(
        1,
        "f",
        &[vec![10], vec![], vec![10], vec![], vec![20]],
    );
    let data = load(&segment);
    assert_eq!(data.layout(), Layout::SingleWithNullSet);
    let AtomicNumericFieldData::SingleWithNullSet {
        docs_with_value, ..
    } = &data
    else {
        unreachable!()
    };
    assert_eq!(docs_with_value.iter().collect_vec(), vec![0, 2, 4]);
    assert_values_preserved(&segment, &data);
}

#[test]
fn test_multi_valued_keeps_ordinals() {
    let segment = MemorySegment::from_docs(1, "f", &[vec![7, 9], vec![7], vec![9], vec![8]]);
    let data = load(&segment);
    assert!(data.is_multi_valued());
    assert_eq!(data.layout(), Layout::WithOrdinals);
    assert_eq!(data.long_values().values(0).collect_vec(), vec![7, 9]);
    assert_values_preserved(&segment, &data);
}

#[test]
fn test_sparse_field_keeps_ordinals() {
    let mut docs = vec![Vec::new(); 2000];
    docs[17] = vec![i64::MAX];
    docs[1500] = vec![i64::MIN];
    let segment = MemorySegment::from_docs(1, "f", &docs);
    let data = load(&segment);
    assert_eq!(data.layout(), Layout::WithOrdinals);
    assert_eq!(data.width(), Some(NumericWidth::I64));
    assert_values_preserved(&segment, &data);
}

#[test]
fn test_narrowing_can_be_disabled() {
    let segment = MemorySegment::from_docs(1, "f", &[vec![1], vec![2]]);
    let settings = FieldDataSettings {
        optimize_type: false,
        ..Default::default()
    };
    let data = NumericFieldDataLoader::new(settings)
        .load(&segment, "f")
        .unwrap();
    assert_eq!(data.width(), Some(NumericWidth::I64));
    assert_values_preserved(&segment, &data);
}

#[test]
fn test_dense_path_can_be_disabled() {
    let segment = MemorySegment::from_docs(1, "f", &[vec![1], vec![2], vec![1]]);
    let settings = FieldDataSettings::from_json(r#"{"remove_ords_on_single_value": false}"#)
        .unwrap();
    let data = NumericFieldDataLoader::new(settings)
        .load(&segment, "f")
        .unwrap();
    assert_eq!(data.layout(), Layout::WithOrdinals);
    assert_eq!(data.width(), Some(NumericWidth::I8));
    assert_values_preserved(&segment, &data);
}

#[test]
fn test_widths_follow_value_range() {
    let cases = [
        (vec![-128, 127], NumericWidth::I8),
        (vec![-129, 0], NumericWidth::I16),
        (vec![0, 40_000], NumericWidth::I32),
        (vec![i32::MIN as i64, i32::MAX as i64], NumericWidth::I32),
        (vec![0, i32::MAX as i64 + 1], NumericWidth::I64),
    ];
    for (values, width) in cases {
        let docs = values.iter().map(|&v| vec![v]).collect_vec();
        let segment = MemorySegment::from_docs(1, "f", &docs);
        let data = load(&segment);
        assert_eq!(data.width(), Some(width), "{values:?}");
        assert_values_preserved(&segment, &data);
    }
}

#[test]
fn test_deleted_docs_are_absent() {
    let mut builder = SegmentBuilder::new(1, "f");
    builder.add_docs([&[5i64, 6][..], &[5], &[6], &[7]]);
    builder.delete_doc(0);
    let segment = builder.build();

    // The only multi-valued document is deleted.
    let data = load(&segment);
    assert!(!data.is_multi_valued());
    assert!(!data.long_values().has_value(0));
    assert_values_preserved(&segment, &data);
}

#[test]
fn test_all_docs_deleted() {
    let mut builder = SegmentBuilder::new(1, "f");
    builder.add_docs([&[1i64][..], &[2]]);
    builder.delete_doc(0).delete_doc(1);
    let segment = builder.build();

    let data = load(&segment);
    assert_ne!(data.layout(), Layout::Empty);
    assert!((0..2).all(|doc| !data.long_values().has_value(doc)));
}

#[test]
fn test_full_precision_only_segment() {
    let mut builder = SegmentBuilder::new(1, "f").with_precision_step(64);
    builder.add_docs([&[3i64][..], &[-3], &[3]]);
    let segment = builder.build();
    assert_eq!(segment.num_terms(), 2);
    let data = load(&segment);
    assert_values_preserved(&segment, &data);
}

#[test]
fn test_random_segments_preserve_values() {
    let distributions = [
        ValueDistribution::default(),
        ValueDistribution::default()
            .with_range(-100..=100)
            .with_missing_ratio(0.3),
        ValueDistribution::default()
            .with_range(-1_000_000..=1_000_000)
            .with_multi_ratio(0.2)
            .with_missing_ratio(0.1),
        ValueDistribution::default()
            .with_cardinality(3)
            .with_missing_ratio(0.5),
        ValueDistribution::default()
            .with_range(0..=60_000)
            .with_cardinality(1000)
            .with_multi_ratio(0.5),
    ];
    for (seed, distribution) in distributions.iter().enumerate() {
        let docs = generate_docs(seed as u64, 3000, distribution);
        let mut builder = SegmentBuilder::new(seed as u64, "f");
        builder.add_docs(docs.iter().map(Vec::as_slice));
        for doc in (0..docs.len() as u32).step_by(13) {
            builder.delete_doc(doc);
        }
        let segment = builder.build();

        let data = load(&segment);
        assert_values_preserved(&segment, &data);
        let multi_valued = (0..segment.max_doc())
            .any(|doc| segment.expected_values(doc).len() > 1);
        assert_eq!(data.is_multi_valued(), multi_valued, "seed {seed}");
        if multi_valued {
            assert_eq!(data.layout(), Layout::WithOrdinals);
        }

        let doubles = data.double_values();
        for doc in 0..segment.max_doc() {
            assert_eq!(
                doubles.values(doc).collect_vec(),
                segment
                    .expected_values(doc)
                    .iter()
                    .map(|&v| v as f64)
                    .collect_vec()
            );
        }
    }
}
