//! # Reverie Pipeline Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | rv-01 Signature Verification | envelope parse, single and dual verify |
//! | rv-02 JSON Projection | view resolution, nested projection |
//! | rv-03 Resource API | result submission end to end |

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rv_01_signature_verification::{
    parse_envelope, parse_verifying_key, verify_dual, verify_single,
};
use rv_02_json_projection::{Projectable, Projector, TimestampFormat, Value, ViewName, ViewSet};
use rv_03_resource_api::{
    ApiConfig, ApiRequest, FixedClock, InMemoryEntityStore, ResourceApi, ResourceService,
};
use rv_tests::fixtures::{der_envelope, envelope, KeyHolder, SignatureForm};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// RV-01: Signature Verification
// ============================================================================

fn bench_envelope_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("rv-01-signature-verification");
    group.measurement_time(Duration::from_secs(10));

    let profile = KeyHolder::generate();
    let device = KeyHolder::generate();
    let profile_key = parse_verifying_key(&profile.pem).unwrap();
    let device_key = parse_verifying_key(&device.pem).unwrap();
    let payload = json!({"result": {"profile_id": profile.id(), "result_data": {"steps": 4200}}});

    let single = der_envelope(&payload, &[&profile]);
    group.bench_function("parse_envelope", |b| {
        b.iter(|| black_box(parse_envelope(&single).is_ok()))
    });

    for form in [SignatureForm::Der, SignatureForm::Fixed] {
        let body = envelope(&payload, &[&profile], form);
        let parsed = parse_envelope(&body).unwrap();
        group.bench_with_input(
            BenchmarkId::new("verify_single", format!("{form:?}")),
            &parsed,
            |b, parsed| b.iter(|| black_box(verify_single(parsed, &profile_key))),
        );
    }

    // Crossed order forces both assignments to be tried.
    let crossed = parse_envelope(&der_envelope(&payload, &[&device, &profile])).unwrap();
    group.bench_function("verify_dual_crossed", |b| {
        b.iter(|| black_box(verify_dual(&crossed, &profile_key, &device_key)))
    });

    group.finish();
}

// ============================================================================
// RV-02: JSON Projection
// ============================================================================

struct Sample {
    views: Arc<ViewSet>,
    id: usize,
    children: Vec<Sample>,
}

impl Projectable for Sample {
    fn views(&self) -> &ViewSet {
        &self.views
    }

    fn attribute(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "id" => Some(Value::scalar(self.id)),
            "label" => Some(Value::scalar(format!("sample-{}", self.id))),
            "created_at" => Some(Value::Timestamp(Utc.timestamp_opt(1_700_000_000, 0).single()?)),
            "children" => Some(Value::entities(self.children.iter())),
            _ => None,
        }
    }

    fn stored_field_names(&self) -> Vec<String> {
        vec!["id".into(), "label".into(), "created_at".into()]
    }
}

fn sample_views() -> Arc<ViewSet> {
    Arc::new(
        ViewSet::builder()
            .view("_jsonable", ["id", "label"])
            .view("_jsonable_private", ["created_at", "children", "n_children"])
            .view("_jsonable_private_ext", ["/^(la)bel$/"])
            .build()
            .unwrap(),
    )
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("rv-02-json-projection");
    let views = sample_views();
    let projector = Projector::new(TimestampFormat::Iso8601);

    let deep = ViewName::parse("_jsonable_private_ext_ext_ext").unwrap();
    group.bench_function("resolve_longest_prefix", |b| {
        b.iter(|| black_box(views.resolve(&deep).is_ok()))
    });

    for width in [10usize, 100, 1000] {
        let parent = Sample {
            views: views.clone(),
            id: 0,
            children: (1..=width)
                .map(|id| Sample {
                    views: views.clone(),
                    id,
                    children: Vec::new(),
                })
                .collect(),
        };
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("project_nested", width), &parent, |b, p| {
            b.iter(|| black_box(projector.to_view(p, "_jsonable_private").unwrap()))
        });
    }

    group.finish();
}

// ============================================================================
// RV-03: Resource API
// ============================================================================

fn bench_result_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("rv-03-resource-api");
    let clock = FixedClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
    let service = ResourceService::with_clock(
        Arc::new(InMemoryEntityStore::new()),
        clock,
        ApiConfig::default(),
    )
    .unwrap();
    let owner = service.create_user("Bench", "bench@lab.org").unwrap();
    let exp = service.create_exp(&owner.id, "bench", "").unwrap();

    let profile = KeyHolder::generate();
    let create = json!({"profile": {"vk_pem": profile.pem, "exp_id": exp.id}});
    service
        .create_profile(&ApiRequest::new(der_envelope(&create, &[&profile])))
        .unwrap();

    let result = json!({"result": {"profile_id": profile.id(), "result_data": {"steps": 1}}});
    let request = ApiRequest::new(der_envelope(&result, &[&profile]));
    group.bench_function("create_result", |b| {
        b.iter(|| black_box(service.create_result(&request).is_ok()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_envelope_verification,
    bench_projection,
    bench_result_submission
);
criterion_main!(benches);
