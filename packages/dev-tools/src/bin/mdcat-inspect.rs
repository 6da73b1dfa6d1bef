//! Record Inspector
//!
//! Materializes a JSON-encoded value tree record and prints the resulting
//! object graph together with the mapping report.
//!
//! # Usage
//!
//! ```bash
//! # Inspect a record with the default configuration
//! cargo run --bin mdcat-inspect -- record.json
//!
//! # With a mapper configuration (mode, main standard, cache path)
//! cargo run --bin mdcat-inspect -- record.json mapper.json
//!
//! # More detail from the resolver
//! RUST_LOG=mdcatalog_core=debug cargo run --bin mdcat-inspect -- record.json
//! ```
//!
//! When the configuration names a `registry_cache_path`, the cache is
//! restored before reading and saved afterwards.

use anyhow::Context;
use mdcatalog_core::config::MapperConfig;
use mdcatalog_core::mapping::Materializer;
use mdcatalog_core::models::{ObjectRef, Record, Value};
use mdcatalog_core::registry::persistence;
use mdcatalog_core::registry::{MetadataRegistry, TypeResolver};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const MAX_DEPTH: usize = 8;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mdcatalog_core=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let record_path = PathBuf::from(
        args.next()
            .context("usage: mdcat-inspect <record.json> [mapper-config.json]")?,
    );
    let config = match args.next() {
        Some(path) => MapperConfig::from_file(&PathBuf::from(path))?,
        None => MapperConfig::default(),
    };
    let options = config
        .mapping_options()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    let text = std::fs::read_to_string(&record_path)
        .with_context(|| format!("cannot read {}", record_path.display()))?;
    let record: Record = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON record", record_path.display()))?;
    tracing::debug!("Loaded {} from {}", record.identifier, record_path.display());
    record
        .validate()
        .with_context(|| format!("record {} is malformed", record.identifier))?;

    let resolver = TypeResolver::new(Arc::new(MetadataRegistry::builtin()));
    if let Some(path) = &config.registry_cache_path {
        persistence::load_cache(&resolver, path)?;
    }

    println!(
        "Record {} (set {}, profile {}, {} nodes)",
        record.identifier,
        record.record_set,
        record.profile,
        record.len()
    );
    let links = record.external_links();
    if !links.is_empty() {
        println!("  links to records not loaded here: {:?}", links);
    }

    let outcome = Materializer::new(&resolver, &options).read(&record);
    match &outcome.object {
        Some(root) => {
            println!();
            let mut seen = HashSet::new();
            print_object(&resolver, root, 0, &mut seen);
        }
        None => println!("Record materialized to nothing (root has no schema class)"),
    }

    println!();
    if outcome.report.is_clean() {
        println!("Mapping report: clean");
    } else {
        println!("Mapping report: {} dropped attributes", outcome.report.failures.len());
        for failure in &outcome.report.failures {
            println!("  - {}", failure);
        }
    }

    if let Some(path) = &config.registry_cache_path {
        let saved = persistence::save_cache(&resolver, path)?;
        println!("Saved {} cache entries to {}", saved, path.display());
    }
    println!(
        "Resolver: {} cached types, {} chain evaluations",
        resolver.cached_types(),
        resolver.chain_evaluations()
    );
    Ok(())
}

/// Print an object and everything it reaches; revisited objects print as `@`
fn print_object(
    resolver: &TypeResolver,
    object: &ObjectRef,
    depth: usize,
    seen: &mut HashSet<usize>,
) {
    let indent = "  ".repeat(depth);
    if !seen.insert(object.identity()) {
        println!("{}@{} (already shown)", indent, object.type_name());
        return;
    }
    println!("{}{}", indent, object.type_name());
    if depth >= MAX_DEPTH {
        println!("{}  ...", indent);
        return;
    }

    let entries: Vec<(String, Vec<Value>)> = {
        let guard = object.read();
        match guard.attribute_map() {
            Some(map) => map
                .entries()
                .map(|(name, values)| (name.to_string(), values.to_vec()))
                .collect(),
            None => resolver
                .registry()
                .types()
                .get(object.type_name())
                .map(|descriptor| {
                    descriptor
                        .properties()
                        .iter()
                        .map(|accessor| (accessor.name.to_string(), accessor.get(&*guard)))
                        .collect()
                })
                .unwrap_or_default(),
        }
    };

    for (name, values) in entries.into_iter().filter(|(_, v)| !v.is_empty()) {
        for value in values {
            print_value(resolver, &name, &value, depth + 1, seen);
        }
    }
}

fn print_value(
    resolver: &TypeResolver,
    name: &str,
    value: &Value,
    depth: usize,
    seen: &mut HashSet<usize>,
) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(object) => {
            println!("{}{}:", indent, name);
            print_object(resolver, object, depth + 1, seen);
        }
        Value::List(items) => {
            for item in items {
                print_value(resolver, name, item, depth, seen);
            }
        }
        Value::Text(text) | Value::Uri(text) => println!("{}{} = {}", indent, name, text),
        Value::FreeText(text) => {
            println!("{}{} = {}", indent, name, text.value);
            for (locale, translated) in &text.translations {
                println!("{}  [{}] {}", indent, locale.tag(), translated);
            }
        }
        Value::Code(code) | Value::Enumeration(code) => {
            println!("{}{} = {}#{}", indent, name, code.list, code.identifier)
        }
        Value::Locale(locale) => println!("{}{} = {}", indent, name, locale.tag()),
        Value::Date(date) => println!("{}{} = {}", indent, name, date.to_rfc3339()),
        other => println!("{}{} = {:?}", indent, name, other),
    }
}
