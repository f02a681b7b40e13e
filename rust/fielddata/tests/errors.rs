use std::error::Error as _;

use fielddata::{FieldDataSettings, NumericFieldDataLoader};
use fielddata_budget_tracker::Budget;
use fielddata_common::error::ErrorKind;
use fielddata_testkit::SegmentBuilder;

fn loader(budget: &Budget) -> NumericFieldDataLoader {
    NumericFieldDataLoader::new(FieldDataSettings::default()).with_budget(budget.clone())
}

fn builder(docs: &[&[i64]]) -> SegmentBuilder {
    let mut builder = SegmentBuilder::new(1, "f");
    builder.add_docs(docs.iter().copied());
    builder
}

#[test]
fn test_corrupt_term_aborts_build() {
    let budget = Budget::new(1 << 20);
    let segment = builder(&[&[1], &[2], &[3]]).with_corrupt_term(1).build();
    let err = loader(&budget).load(&segment, "f").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Codec { .. }), "{err}");
    assert!(err.is_data_error());
    assert_eq!(budget.used(), 0);
}

#[test]
fn test_source_failure_aborts_build() {
    let budget = Budget::new(1 << 20);
    let segment = builder(&[&[1, 2], &[2], &[3]])
        .with_postings_failure(2)
        .build();
    let err = loader(&budget).load(&segment, "f").unwrap_err();
    assert!(!err.is_data_error());
    let ErrorKind::Source { source, .. } = err.kind() else {
        panic!("unexpected error {err}");
    };
    let io = source.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io.kind(), std::io::ErrorKind::UnexpectedEof);
    assert!(err.source().is_some());
    assert_eq!(budget.used(), 0);
}

#[test]
fn test_lower_precision_term_failures_are_not_reached() {
    // Postings of lower-precision terms are never read.
    let segment = builder(&[&[1], &[2]]).with_postings_failure(5).build();
    assert!(segment.num_terms() > 5);
    let data = NumericFieldDataLoader::default().load(&segment, "f").unwrap();
    assert_eq!(data.long_values().value(1), Some(2));
}

#[test]
fn test_budget_exceeded_for_doc_buffer() {
    let budget = Budget::new(10);
    let segment = builder(&[&[1], &[2], &[3]]).build();
    let err = loader(&budget).load(&segment, "f").unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::BudgetExceeded {
            requested: 12,
            remaining: 10
        }
    ));
    assert_eq!(budget.used(), 0);
}

#[test]
fn test_budget_exceeded_for_multi_values() {
    // Enough for the per-document buffer, not for the first spill reservation.
    let budget = Budget::new(3 * 4 + 100);
    let segment = builder(&[&[1, 2], &[2], &[3]]).build();
    let err = loader(&budget).load(&segment, "f").unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::BudgetExceeded { .. }));
    assert_eq!(budget.used(), 0);

    let budget = Budget::new(1 << 20);
    let data = loader(&budget).load(&segment, "f").unwrap();
    assert!(data.is_multi_valued());
    assert_eq!(budget.used(), 0);
}
