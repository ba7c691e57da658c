#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use promkit_core::buckets::DEFAULT_BOUNDS;
use promkit_core::{BucketSet, Histogram, MetricsError};

#[test]
fn linear_bounds() {
    let b = BucketSet::linear(1.0, 0.5, 4).unwrap();
    assert_eq!(b.bounds(), &[1.0, 1.5, 2.0, 2.5]);
    assert_eq!(b.keys(), &["1", "1.5", "2", "2.5"]);
    assert!(b.bounds().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn exponential_bounds() {
    let b = BucketSet::exponential(1.0, 2.0, 5).unwrap();
    assert_eq!(b.bounds(), &[1.0, 2.0, 4.0, 8.0, 16.0]);
}

#[test]
fn bad_bucket_parameters() {
    assert!(matches!(BucketSet::linear(0.0, 1.0, 0), Err(MetricsError::InvalidBuckets(_))));
    assert!(matches!(BucketSet::linear(0.0, 0.0, 3), Err(MetricsError::InvalidBuckets(_))));
    assert!(matches!(BucketSet::exponential(0.0, 2.0, 3), Err(MetricsError::InvalidBuckets(_))));
    assert!(matches!(BucketSet::exponential(1.0, 1.0, 3), Err(MetricsError::InvalidBuckets(_))));
    assert!(matches!(BucketSet::new(vec![]), Err(MetricsError::InvalidBuckets(_))));
    assert!(matches!(BucketSet::new(vec![1.0, 1.0]), Err(MetricsError::InvalidBuckets(_))));
    assert!(matches!(BucketSet::new(vec![2.0, 1.0]), Err(MetricsError::InvalidBuckets(_))));
    assert!(matches!(BucketSet::new(vec![1.0, f64::NAN]), Err(MetricsError::InvalidBuckets(_))));
}

#[test]
fn default_set_is_shared() {
    let a = BucketSet::default_set();
    let b = BucketSet::default_set();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(a.bounds(), &DEFAULT_BOUNDS);
}

#[test]
fn observation_equal_to_a_bound_counts_in_that_bucket() {
    let h = Histogram::new("lat", "", &[], Some(BucketSet::new(vec![1.0, 2.0, 3.0]).unwrap())).unwrap();
    h.observe(2.0, &[]).unwrap();
    let s = h.sample(&[]).unwrap();
    assert_eq!(s.bucket_value("1").unwrap(), 0.0);
    assert_eq!(s.bucket_value("2").unwrap(), 1.0);
    assert_eq!(s.bucket_value("3").unwrap(), 1.0);
    assert_eq!(s.bucket_value("+Inf").unwrap(), 1.0);
    assert_eq!(s.count().unwrap(), 1.0);
    assert_eq!(s.sum().unwrap(), 2.0);
}

#[test]
fn observation_only_touches_buckets_at_or_above_it() {
    let h = Histogram::new("size", "", &["kind"], Some(BucketSet::linear(10.0, 10.0, 5).unwrap())).unwrap();
    h.observe(25.0, &["a"]).unwrap();
    let s = h.sample(&["a"]).unwrap();
    let counts: Vec<f64> = ["10", "20", "30", "40", "50"]
        .iter()
        .map(|k| s.bucket_value(k).unwrap())
        .collect();
    assert_eq!(counts, vec![0.0, 0.0, 1.0, 1.0, 1.0]);

    h.observe(100.0, &["a"]).unwrap();
    assert_eq!(s.bucket_value("50").unwrap(), 1.0);
    assert_eq!(s.bucket_value("+Inf").unwrap(), 2.0);
    assert_eq!(s.sum().unwrap(), 125.0);
}

#[test]
fn default_buckets_end_to_end_counts() {
    let h = Histogram::new("h", "", &[], None).unwrap();
    for v in [0.5, 2.0, 7.0] {
        h.observe(v, &[]).unwrap();
    }
    let s = h.sample(&[]).unwrap();
    assert_eq!(s.bucket_value("1").unwrap(), 1.0);
    assert_eq!(s.bucket_value("5").unwrap(), 2.0);
    assert_eq!(s.bucket_value("+Inf").unwrap(), 3.0);
    assert_eq!(s.count().unwrap(), 3.0);
    assert_eq!(s.sum().unwrap(), 9.5);
}

#[test]
fn nan_observation_only_reaches_inf_and_count() {
    let h = Histogram::new("n", "", &[], Some(BucketSet::new(vec![1.0]).unwrap())).unwrap();
    h.observe(f64::NAN, &[]).unwrap();
    let s = h.sample(&[]).unwrap();
    assert_eq!(s.bucket_value("1").unwrap(), 0.0);
    assert_eq!(s.bucket_value("+Inf").unwrap(), 1.0);
    assert_eq!(s.count().unwrap(), 1.0);
    assert!(s.sum().unwrap().is_nan());
}
