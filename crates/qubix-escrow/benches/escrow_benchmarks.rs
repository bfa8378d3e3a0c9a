//! Benchmarks for the escrow ledger hot paths.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qubix_core::{Address, Amount, JobId, MemoryHost, Tick};
use qubix_escrow::{EscrowLedger, FeeSplit};

fn fee_split(c: &mut Criterion) {
    c.bench_function("fee_split", |b| {
        b.iter(|| FeeSplit::new(black_box(Amount::new(123_456_789)), black_box(3)));
    });
}

fn full_lifecycle(c: &mut Criterion) {
    let consumer = Address::from_public_key(&[1; 32]);
    let provider = Address::from_public_key(&[2; 32]);

    c.bench_function("create_start_complete_1000_jobs", |b| {
        b.iter(|| {
            let mut host = MemoryHost::new();
            let _ = host.mint(consumer, Amount::new(1_000_000));
            let mut ledger = EscrowLedger::new(Address::contract(1));

            for n in 0..1000 {
                host.set_caller(consumer);
                let Ok(job_id) = JobId::new(format!("job-{n}")) else {
                    continue;
                };
                let Ok(index) =
                    ledger.create(&mut host, job_id, consumer, provider, Amount::new(100), Tick::new(10))
                else {
                    continue;
                };
                host.set_caller(provider);
                let _ = ledger.start(&host, index);
                let _ = ledger.complete(&mut host, index);
            }
            black_box(ledger.stats())
        });
    });
}

criterion_group!(benches, fee_split, full_lifecycle);
criterion_main!(benches);
