use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cqns_core::{JsonTreeVisitor, NamespacePrefixRewriter};
use serde_json::{json, Value};

/// A dialog with `tabs` tabs of `fields` widgets each.
fn dialog(tabs: usize, fields: usize) -> Value {
    let items: Vec<Value> = (0..tabs)
        .map(|t| {
            let widgets: Vec<Value> = (0..fields)
                .map(|f| {
                    json!({
                        "primaryType": "cq:Widget",
                        "xtype": "textfield",
                        "name": format!("./tab{t}/field{f}"),
                        "fieldLabel": format!("Field {f}"),
                    })
                })
                .collect();
            json!({ "primaryType": "cq:Panel", "title": format!("Tab {t}"), "items": widgets })
        })
        .collect();
    json!({ "primaryType": "cq:Dialog", "items": { "primaryType": "cq:TabPanel", "items": items } })
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite");
    let rule = NamespacePrefixRewriter::new("bench");
    let walker = JsonTreeVisitor::new();

    for (label, tabs, fields) in [("small", 2usize, 8usize), ("medium", 10, 50), ("large", 50, 200)] {
        let doc = dialog(tabs, fields);
        group.throughput(Throughput::Elements((tabs * fields) as u64));

        group.bench_with_input(BenchmarkId::new("apply", label), &doc, |b, d| {
            b.iter_batched(
                || d.clone(),
                |mut doc| rule.apply_with(&walker, &mut doc).unwrap(),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rewrite);
criterion_main!(benches);
