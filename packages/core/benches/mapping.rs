//! Performance benchmarks for the object graph mapper
//!
//! Run with: `cargo bench -p mdcatalog-core`
//!
//! These benchmarks measure the mapping hot paths:
//! - Serializing a metadata graph with N contacts into a value tree
//! - Materializing that tree back into objects (warm resolver cache)
//! - Full service round trip through the in-memory store

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mdcatalog_core::config::{MapperConfig, MappingOptions};
use mdcatalog_core::db::InMemoryRecordStore;
use mdcatalog_core::mapping::{Materializer, Serializer};
use mdcatalog_core::models::metadata::{
    DefaultCitation, DefaultDataIdentification, DefaultMetadata, DefaultResponsibleParty,
};
use mdcatalog_core::models::{CodeValue, InternationalString, Locale, ObjectRef, Record};
use mdcatalog_core::registry::{MetadataRegistry, TypeResolver};
use mdcatalog_core::services::{CatalogService, WriteContext};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Generate a metadata graph with `contacts` parties, each also cited
fn generate_metadata(contacts: usize) -> ObjectRef {
    let parties: Vec<ObjectRef> = (0..contacts)
        .map(|i| {
            ObjectRef::new(DefaultResponsibleParty {
                individual_name: Some(format!("Contact {}", i)),
                organisation_name: Some(
                    InternationalString::new("Lake Institute")
                        .with_translation(Locale::new("fr"), "Institut des lacs"),
                ),
                role: Some(CodeValue::new("CI_RoleCode", "pointOfContact")),
                ..Default::default()
            })
        })
        .collect();

    let citation = ObjectRef::new(DefaultCitation {
        title: Some(InternationalString::new("Benchmark lakes")),
        cited_responsible_parties: parties.clone(),
        ..Default::default()
    });
    let identification = ObjectRef::new(DefaultDataIdentification {
        citation: Some(citation),
        point_of_contacts: parties.clone(),
        topic_categories: vec![CodeValue::new("MD_TopicCategoryCode", "inlandWaters")],
        ..Default::default()
    });
    ObjectRef::new(DefaultMetadata {
        file_identifier: Some("urn:bench".to_string()),
        language: Some(Locale::with_country("en", "GB")),
        contacts: parties,
        identification_info: vec![identification],
        ..Default::default()
    })
}

fn write(resolver: &TypeResolver, options: &MappingOptions, root: &ObjectRef) -> Record {
    Serializer::new(resolver, options, Record::new("bench", "bench", "iso19115"))
        .write(root)
        .unwrap()
        .record
}

/// Benchmark graph → tree serialization
fn bench_serialize(c: &mut Criterion) {
    let resolver = TypeResolver::builtin();
    let options = MappingOptions::default();

    let mut group = c.benchmark_group("serialize");
    for contacts in [10, 100] {
        let root = generate_metadata(contacts);
        group.bench_with_input(BenchmarkId::from_parameter(contacts), &root, |b, root| {
            b.iter(|| black_box(write(&resolver, &options, root)));
        });
    }
    group.finish();
}

/// Benchmark tree → graph materialization
fn bench_materialize(c: &mut Criterion) {
    let resolver = TypeResolver::builtin();
    let options = MappingOptions::default();

    let mut group = c.benchmark_group("materialize");
    for contacts in [10, 100] {
        let record = write(&resolver, &options, &generate_metadata(contacts));
        group.bench_with_input(BenchmarkId::from_parameter(contacts), &record, |b, record| {
            b.iter(|| black_box(Materializer::new(&resolver, &options).read(record)));
        });
    }
    group.finish();
}

/// Benchmark a service write followed by a read of the same record
fn bench_service_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let service = rt
        .block_on(CatalogService::new(
            MapperConfig::default(),
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(MetadataRegistry::builtin()),
        ))
        .unwrap();
    let root = generate_metadata(25);

    let mut group = c.benchmark_group("service");
    group.sample_size(20);
    group.bench_function("write_then_read_25_contacts", |b| {
        b.iter(|| {
            rt.block_on(async {
                let written = service
                    .write_record(&root, WriteContext::new("bench", "iso19115"))
                    .await
                    .unwrap();
                let identifier = written.record.identifier.clone();
                black_box(service.read_record(&identifier).await.unwrap());
                service.delete_record(&identifier).await.unwrap();
            })
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_serialize,
    bench_materialize,
    bench_service_round_trip
);
criterion_main!(benches);
