//! Endpoint dispatch micro-benchmark.
//!
//! Measures one full open/handler/close cycle per endpoint:
//! - lock-free page offset read
//! - context dump read (lock + format)
//! - debug level write (copy-in + parse + lock)
//! - hex config write

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use procintf::{Caller, ProcIntf, ProcTree};
use procintf_common::config::{ProcfsConfig, ValidationMode};

fn setup(validation: ValidationMode) -> ProcIntf {
    let config = ProcfsConfig {
        validation,
        ..ProcfsConfig::default()
    };
    ProcIntf::enable(&config, Box::new(ProcTree::new())).unwrap()
}

fn bench_reads(c: &mut Criterion) {
    let intf = setup(ValidationMode::Strict);
    let root = Caller::root();

    c.bench_function("read_show_pgoff", |b| {
        b.iter(|| black_box(intf.read_entry("llkdproc_show_pgoff", &root).unwrap()));
    });

    c.bench_function("read_show_drvctx", |b| {
        b.iter(|| black_box(intf.read_entry("llkdproc_show_drvctx", &root).unwrap()));
    });
}

fn bench_writes(c: &mut Criterion) {
    let intf = setup(ValidationMode::Strict);
    let root = Caller::root();
    let payloads: [&[u8]; 3] = [b"0\n", b"1\n", b"2\n"];
    let mut i = 0usize;

    c.bench_function("write_debug_level", |b| {
        b.iter(|| {
            i = (i + 1) % payloads.len();
            intf.write_entry("llkdproc_debug_level", &root, black_box(payloads[i]))
                .unwrap()
        });
    });

    let legacy = setup(ValidationMode::Legacy);
    c.bench_function("write_config1_hex", |b| {
        b.iter(|| {
            legacy
                .write_entry("llkdproc_config1", &root, black_box(b"0xbeef\n"))
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_reads, bench_writes);
criterion_main!(benches);
