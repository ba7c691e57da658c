#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use promkit_core::{Counter, Histogram, Metric, MetricType, Registry};

#[test]
fn concurrent_adds_are_never_lost() {
    let c = Counter::new("hits_total", "", &[]).unwrap();
    let threads = 8;
    let per_thread = 10_000;
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let c = c.clone();
            thread::spawn(move || {
                for _ in 0..per_thread {
                    c.add(0.5, &[]).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(c.get(&[]).unwrap(), 0.5 * f64::from(threads * per_thread));
}

#[test]
fn racing_creators_share_one_sample() {
    let m = Arc::new(Metric::new(MetricType::Gauge, "g", "", &["shard"]).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let m = Arc::clone(&m);
            thread::spawn(move || m.sample_for(&["0"]).unwrap())
        })
        .collect();
    let samples: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(samples.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(m.series_count().unwrap(), 1);
}

#[test]
fn scrapes_never_see_a_torn_histogram() {
    let h = Histogram::new("work", "", &[], None).unwrap();
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let h = h.clone();
            thread::spawn(move || {
                for i in 0..5_000 {
                    h.observe(f64::from(i % 20), &[]).unwrap();
                }
            })
        })
        .collect();

    let sample = h.sample(&[]).unwrap();
    for _ in 0..200 {
        let snapshot = sample.snapshot().unwrap();
        let inf = snapshot
            .iter()
            .find(|(l, _)| l.ends_with("le=\"+Inf\"}"))
            .map(|(_, v)| *v)
            .unwrap();
        let count = snapshot
            .iter()
            .find(|(l, _)| l == "work_count")
            .map(|(_, v)| *v)
            .unwrap();
        assert_eq!(inf, count);
    }
    for w in writers {
        w.join().unwrap();
    }
    assert_eq!(sample.count().unwrap(), 20_000.0);
}

#[test]
fn bridge_runs_alongside_writers() {
    let registry = Arc::new(Registry::new("app").unwrap());
    let c = Counter::new("ops_total", "Operations", &["worker"]).unwrap();
    registry.register_metric(c.metric()).unwrap();

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let c = c.clone();
            thread::spawn(move || {
                let label = w.to_string();
                for _ in 0..2_000 {
                    c.inc(&[label.as_str()]).unwrap();
                }
            })
        })
        .collect();
    for _ in 0..50 {
        let text = registry.bridge().unwrap();
        assert!(text.starts_with("# HELP ops_total Operations\n# TYPE ops_total counter\n"));
    }
    for w in writers {
        w.join().unwrap();
    }

    let text = registry.bridge().unwrap();
    for w in 0..4 {
        assert!(text.contains(&format!("ops_total{{worker=\"{w}\"}} 2000\n")), "{text}");
    }
}
