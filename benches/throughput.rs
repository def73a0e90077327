use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ens_vanity::{derive_address, Address, KeyDeriver, Prefix, PrivateKey};

fn bench_derive_address(c: &mut Criterion) {
    let deriver = KeyDeriver::new(StdRng::seed_from_u64(7));
    let mut bytes = [0u8; 32];
    bytes[31] = 1;
    let key = PrivateKey::from_bytes(bytes).unwrap();

    c.bench_function("derive_address", |b| {
        b.iter(|| deriver.derive_address(black_box(&key)))
    });

    c.bench_function("derive_address_fresh_context", |b| {
        b.iter(|| derive_address(black_box(&key)))
    });
}

fn bench_next_candidate(c: &mut Criterion) {
    let mut deriver = KeyDeriver::new(StdRng::seed_from_u64(7));

    c.bench_function("next_candidate", |b| {
        b.iter(|| deriver.next_candidate().unwrap())
    });
}

fn bench_prefix_match(c: &mut Criterion) {
    let prefix = Prefix::parse("deadbeef").unwrap();
    let address: Address = "deadbeef00000000000000000000000000000000".parse().unwrap();

    c.bench_function("prefix_match", |b| {
        b.iter(|| prefix.matches(black_box(&address)))
    });
}

criterion_group!(
    benches,
    bench_derive_address,
    bench_next_candidate,
    bench_prefix_match,
);
criterion_main!(benches);
