use criterion::{black_box, criterion_group, criterion_main, Criterion};
use snapedit::{EditSession, FieldKind, FieldSchema, FieldValue, Record};
use std::sync::Arc;

const FIELDS: usize = 70;

fn wide_session() -> EditSession<Record> {
    let mut builder = FieldSchema::builder("Wide");
    for i in 0..FIELDS {
        builder = builder.field(format!("f{}", i), FieldKind::Int);
    }
    let schema = Arc::new(builder.build().unwrap());
    let record = Record::new(&schema, (0..FIELDS as i64).map(FieldValue::int).collect()).unwrap();
    EditSession::new(schema, record)
}

fn bench_edit_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit_session");

    group.bench_function("set_and_end_10_of_70", |b| {
        let mut session = wide_session();
        let mut round = 0i64;
        b.iter(|| {
            round += 1;
            session.begin_edit().unwrap();
            for i in (0..FIELDS).step_by(7) {
                session.set_field(i, black_box(round * 1000 + i as i64)).unwrap();
            }
            session.end_edit().unwrap();
        });
    });

    group.bench_function("set_and_cancel_10_of_70", |b| {
        let mut session = wide_session();
        b.iter(|| {
            session.begin_edit().unwrap();
            for i in (0..FIELDS).step_by(7) {
                session.set_field(i, black_box(-1i64)).unwrap();
            }
            session.cancel_edit().unwrap();
        });
    });

    group.bench_function("changed_fields_scan", |b| {
        let mut session = wide_session();
        session.begin_edit().unwrap();
        for i in [3, 63, 64, 69] {
            session.set_field(i, -1i64).unwrap();
        }
        b.iter(|| black_box(session.changed_fields().count()));
    });

    group.finish();
}

criterion_group!(benches, bench_edit_cycle);
criterion_main!(benches);
