use criterion::{Criterion, criterion_group, criterion_main};
use structview::{
    decoder::decode_structure,
    field::{FieldDescriptor, SubstructureCatalog},
    kind::FieldKind,
    source::MemorySource,
};

fn gen_fields(field_count: usize) -> Vec<FieldDescriptor> {
    (0..field_count)
        .map(|i| FieldDescriptor::new(format!("f{}", i), FieldKind::Uint16))
        .collect()
}

fn gen_packet(total_bytes: usize) -> Vec<u8> {
    (0..total_bytes).map(|i| (i * 31 % 256) as u8).collect()
}

fn bench_flat(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let catalog = SubstructureCatalog::new();

    for &field_count in &[1usize, 10, 50, 100] {
        let fields = gen_fields(field_count);
        let source = MemorySource::new(gen_packet(field_count * 2));

        c.bench_function(&format!("decode_{}_fields", field_count), |b| {
            b.iter(|| rt.block_on(decode_structure(&fields, &catalog, &source)))
        });
    }
}

fn bench_repeated(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let catalog = SubstructureCatalog::new();

    let mut entries = FieldDescriptor::new("entries", FieldKind::Uint32);
    entries.set_repeat_ref("count");
    let fields = vec![FieldDescriptor::new("count", FieldKind::Uint16), entries];

    let mut packet = vec![0x03, 0xe8];
    packet.extend(gen_packet(1000 * 4));
    let source = MemorySource::new(packet);

    c.bench_function("decode_1000_repeats", |b| {
        b.iter(|| rt.block_on(decode_structure(&fields, &catalog, &source)))
    });
}

criterion_group!(benches, bench_flat, bench_repeated);
criterion_main!(benches);
