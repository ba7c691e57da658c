#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use promkit_core::naming::{is_valid_label_name, is_valid_metric_name};
use promkit_core::{Counter, ErrorCode, Gauge, Histogram, Metric, MetricType, MetricsError};

#[test]
fn metric_name_grammar() {
    for ok in ["a", "_x", ":ns:name", "http_requests_total", "A1:b_2"] {
        assert!(is_valid_metric_name(ok), "{ok}");
    }
    for bad in ["", "1abc", "a-b", "a b", "é"] {
        assert!(!is_valid_metric_name(bad), "{bad}");
    }
}

#[test]
fn label_name_grammar() {
    assert!(is_valid_label_name("method"));
    assert!(is_valid_label_name("_k9"));
    assert!(!is_valid_label_name("a:b"));
    assert!(!is_valid_label_name("9a"));
    assert!(!is_valid_label_name(""));
}

#[test]
fn reserved_labels_fail_every_time() {
    for key in ["le", "quantile"] {
        for _ in 0..2 {
            let err = Counter::new("c", "", &["path", key]).unwrap_err();
            assert_eq!(err.code(), ErrorCode::ReservedLabel);
            let err = Histogram::new("h", "", &[key], None).unwrap_err();
            assert!(matches!(err, MetricsError::ReservedLabel(k) if k == key));
        }
    }
}

#[test]
fn invalid_names_are_rejected_at_construction() {
    assert!(matches!(Gauge::new("bad-name", "", &[]), Err(MetricsError::InvalidMetricName(_))));
    assert!(matches!(Gauge::new("ok", "", &["bad-key"]), Err(MetricsError::InvalidLabelName(_))));
}

#[test]
fn counters_only_move_forward() {
    let c = Counter::new("events_total", "", &[]).unwrap();
    c.inc(&[]).unwrap();
    c.add(2.5, &[]).unwrap();
    assert_eq!(c.get(&[]).unwrap(), 3.5);

    assert!(matches!(c.add(-1.0, &[]), Err(MetricsError::InvalidValue { .. })));
    assert!(matches!(c.set(-1.0, &[]), Err(MetricsError::InvalidValue { .. })));
    let err = c.metric().sample_for(&[]).unwrap().sub(1.0).unwrap_err();
    assert_eq!(err.code(), ErrorCode::WrongType);

    c.set(10.0, &[]).unwrap();
    assert_eq!(c.get(&[]).unwrap(), 10.0);
}

#[test]
fn gauge_set_accepts_anything() {
    let g = Gauge::new("temp", "", &["room"]).unwrap();
    g.set(-12.25, &["cellar"]).unwrap();
    assert_eq!(g.get(&["cellar"]).unwrap(), -12.25);
    assert!(g.set(1.0, &[]).is_err());
}

#[test]
fn samples_are_created_once_per_label_combination() {
    let m = Metric::new(MetricType::Counter, "req", "", &["code"]).unwrap();
    let a = m.sample_for(&["200"]).unwrap();
    a.add(1.0).unwrap();
    let b = m.sample_for(&["200"]).unwrap();
    assert_eq!(b.value(), 1.0);
    m.sample_for(&["500"]).unwrap();
    assert_eq!(m.series_count().unwrap(), 2);
}
