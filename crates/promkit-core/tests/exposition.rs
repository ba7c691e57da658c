#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use promkit_core::{
    BucketSet, Collector, Counter, Features, Gauge, Histogram, MetricsError, Registry,
    RegistryOptions, StaticCollector,
};

fn registry(features: Features, prefix: Option<&str>) -> Registry {
    Registry::with_options(
        "test",
        RegistryOptions {
            features,
            prefix: prefix.map(str::to_string),
        },
    )
    .unwrap()
}

#[test]
fn unlabeled_gauge_full_and_compact() {
    for (features, expected) in [
        (Features::NONE, "# HELP g A gauge\n# TYPE g gauge\ng 1\n\n"),
        (Features::COMPACT, "g 1\n\n"),
    ] {
        let r = registry(features, None);
        let g = Gauge::new("g", "A gauge", &[]).unwrap();
        r.register_metric(g.metric()).unwrap();
        g.set(1.0, &[]).unwrap();
        assert_eq!(r.bridge().unwrap(), expected);
    }
}

#[test]
fn empty_help_drops_only_the_help_line() {
    let r = registry(Features::NONE, None);
    let c = Counter::new("c_total", "", &[]).unwrap();
    r.register_metric(c.metric()).unwrap();
    c.inc(&[]).unwrap();
    assert_eq!(r.bridge().unwrap(), "# TYPE c_total counter\nc_total 1\n\n");
}

#[test]
fn histogram_block_layout() {
    let r = registry(Features::NONE, None);
    let h = Histogram::new(
        "req_seconds",
        "Request latency",
        &["path"],
        Some(BucketSet::new(vec![0.1, 1.0]).unwrap()),
    )
    .unwrap();
    r.register_metric(h.metric()).unwrap();
    h.observe(0.0625, &["/"]).unwrap();
    h.observe(0.5, &["/"]).unwrap();
    h.observe(3.0, &["/"]).unwrap();

    let expected = "\
# HELP req_seconds Request latency
# TYPE req_seconds histogram
req_seconds_bucket{path=\"/\",le=\"0.1\"} 1
req_seconds_bucket{path=\"/\",le=\"1\"} 2
req_seconds_bucket{path=\"/\",le=\"+Inf\"} 3
req_seconds_sum{path=\"/\"} 3.5625
req_seconds_count{path=\"/\"} 3

";
    assert_eq!(r.bridge().unwrap(), expected);
}

#[test]
fn default_bucket_histogram_renders_every_bound() {
    let r = registry(Features::COMPACT, None);
    let h = Histogram::new("h", "", &[], None).unwrap();
    r.register_metric(h.metric()).unwrap();
    for v in [0.5, 2.0, 7.0] {
        h.observe(v, &[]).unwrap();
    }
    let text = r.bridge().unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "h_bucket{le=\"0.005\"} 0",
            "h_bucket{le=\"0.01\"} 0",
            "h_bucket{le=\"0.025\"} 0",
            "h_bucket{le=\"0.05\"} 0",
            "h_bucket{le=\"0.1\"} 0",
            "h_bucket{le=\"0.25\"} 0",
            "h_bucket{le=\"0.5\"} 1",
            "h_bucket{le=\"1\"} 1",
            "h_bucket{le=\"2.5\"} 2",
            "h_bucket{le=\"5\"} 2",
            "h_bucket{le=\"10\"} 3",
            "h_bucket{le=\"+Inf\"} 3",
            "h_sum 9.5",
            "h_count 3",
            "",
        ]
    );
}

#[test]
fn prefix_applies_to_every_name() {
    let r = registry(Features::NONE, Some("app_"));
    let g = Gauge::new("up", "Liveness", &["zone"]).unwrap();
    r.register_metric(g.metric()).unwrap();
    g.set(1.0, &["eu"]).unwrap();
    assert_eq!(
        r.bridge().unwrap(),
        "# HELP app_up Liveness\n# TYPE app_up gauge\napp_up{zone=\"eu\"} 1\n\n"
    );
}

#[test]
fn invalid_prefix_is_rejected() {
    let err = Registry::with_options(
        "bad",
        RegistryOptions {
            features: Features::NONE,
            prefix: Some("9x".into()),
        },
    )
    .unwrap_err();
    assert!(matches!(err, MetricsError::InvalidMetricName(_)));
}

#[test]
fn collectors_render_in_registration_order() {
    let r = registry(Features::COMPACT, None);
    let first = Gauge::new("in_default", "", &[]).unwrap();
    r.register_metric(first.metric()).unwrap();

    let extra = Arc::new(StaticCollector::new("extra"));
    let second = Gauge::new("in_extra", "", &[]).unwrap();
    extra.add_metric(second.metric()).unwrap();
    r.register_collector(extra).unwrap();

    first.set(1.0, &[]).unwrap();
    second.set(2.0, &[]).unwrap();
    assert_eq!(r.bridge().unwrap(), "in_default 1\n\nin_extra 2\n\n");
}

#[test]
fn samples_render_in_creation_order() {
    let r = registry(Features::COMPACT, None);
    let c = Counter::new("codes_total", "", &["code"]).unwrap();
    r.register_metric(c.metric()).unwrap();
    for code in ["500", "200", "404"] {
        c.inc(&[code]).unwrap();
    }
    assert_eq!(
        r.bridge().unwrap(),
        "codes_total{code=\"500\"} 1\ncodes_total{code=\"200\"} 1\ncodes_total{code=\"404\"} 1\n\n"
    );
}

#[test]
fn aggregate_scrape_duration_is_appended_last() {
    let r = registry(Features::SCRAPE_TIME, None);
    let g = Gauge::new("g", "", &[]).unwrap();
    r.register_metric(g.metric()).unwrap();
    g.set(0.0, &[]).unwrap();

    let text = r.bridge().unwrap();
    let tail = text.split("g 0\n\n").nth(1).unwrap();
    assert!(tail.starts_with(
        "# HELP scrape_duration_seconds Duration of a collector scrape\n# TYPE scrape_duration_seconds gauge\nscrape_duration_seconds{collector=\"promkit\"} "
    ));
    assert!(!text.contains("collector=\"default\""));
    assert!(r.scrape_duration().unwrap().get(&["promkit"]).unwrap() >= 0.0);
}

#[test]
fn per_collector_scrape_duration() {
    let r = registry(Features::SCRAPE_TIME_ALL | Features::COMPACT, None);
    assert!(r.features().contains(Features::SCRAPE_TIME));
    r.register_collector(Arc::new(StaticCollector::new("jobs"))).unwrap();

    let text = r.bridge().unwrap();
    assert!(text.contains("scrape_duration_seconds{collector=\"default\"} "));
    assert!(text.contains("scrape_duration_seconds{collector=\"jobs\"} "));
    assert!(text.contains("scrape_duration_seconds{collector=\"promkit\"} "));
}

#[test]
fn repeated_bridges_are_independent() {
    let r = registry(Features::COMPACT, None);
    let g = Gauge::new("g", "", &[]).unwrap();
    r.register_metric(g.metric()).unwrap();
    g.set(1.0, &[]).unwrap();
    assert_eq!(r.bridge().unwrap(), "g 1\n\n");
    g.set(2.0, &[]).unwrap();
    assert_eq!(r.bridge().unwrap(), "g 2\n\n");
}

#[test]
fn label_sets_sharing_bytes_render_as_separate_series() {
    let r = registry(Features::COMPACT, None);
    let c = Counter::new("c", "", &["a", "b"]).unwrap();
    r.register_metric(c.metric()).unwrap();
    c.inc(&["x\u{1f}", "y"]).unwrap();
    c.inc(&["x", "\u{1f}y"]).unwrap();
    assert_eq!(c.metric().series_count().unwrap(), 2);
    assert_eq!(
        r.bridge().unwrap(),
        "c{a=\"x\u{1f}\",b=\"y\"} 1\nc{a=\"x\",b=\"\u{1f}y\"} 1\n\n"
    );
}
