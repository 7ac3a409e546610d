//! Criterion benchmarks for stage display decoding and text selection.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cue_core::{select_text_pair, FieldValue, StageEvent};

const FRAME: &str = r#"{"acn":"fv","uid":"L1","ary":[
    {"acn":"cs","txt":"Amazing grace, how sweet the sound"},
    {"acn":"csn","txt":"Amazing Grace"},
    {"acn":"ns","txt":"That saved a wretch like me"},
    {"acn":"clk","txt":"10:42"},
    {"acn":"sys","txt":"10:42 AM"}
]}"#;

fn bench_decode_frame(c: &mut Criterion) {
    c.bench_function("decode_field_value_frame", |b| {
        b.iter(|| StageEvent::from_json(black_box(FRAME)))
    });
}

fn bench_select_text_pair(c: &mut Criterion) {
    let fields = vec![
        FieldValue::new("clk", "10:42"),
        FieldValue::new("cs", "Amazing grace, how sweet the sound"),
        FieldValue::new("csn", "Amazing Grace"),
        FieldValue::new("ns", "That saved a wretch like me"),
        FieldValue::new("nsn", "A wretch like me"),
    ];
    c.bench_function("select_text_pair", |b| {
        b.iter(|| select_text_pair(black_box(&fields)))
    });
}

criterion_group!(benches, bench_decode_frame, bench_select_text_pair);
criterion_main!(benches);
