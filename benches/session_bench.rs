//! Performance benchmarks for the control tick.
//!
//! The control loop ticks every 20 ms by default, so a tick must stay far
//! below that. These benchmarks measure an idle tick, a full login with a
//! lock command, and serial line validation.
//!
//! # Run Benchmarks
//!
//! ```sh
//! cargo bench --bench session_bench
//!
//! # Run specific benchmark group
//! cargo bench --bench session_bench -- idle_tick
//! ```

use ccls_controller::{BluetoothCentralLockSystem, SessionConfig};
use ccls_core::{Credentials, SerialLine, constants::DEFAULT_MAX_LINE_LENGTH};
use ccls_hardware::{DriverFactory, MockDriverFactory};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn session_config() -> SessionConfig {
    let credentials = Credentials::new("alice", "secret").expect("valid credentials");
    SessionConfig::new(credentials, DEFAULT_MAX_LINE_LENGTH).expect("valid config")
}

/// Benchmark a tick with nothing to do: buttons released, no line pending.
fn bench_idle_tick(c: &mut Criterion) {
    let (factory, mut handles) = MockDriverFactory::new();
    let drivers = factory.build().expect("mock drivers");
    let mut system = BluetoothCentralLockSystem::from_drivers(drivers, session_config());
    system.run().expect("greeting tick");
    handles.bluetooth.written_lines();

    let mut group = c.benchmark_group("idle_tick");
    group.throughput(Throughput::Elements(1));
    group.bench_function("mock_drivers", |b| {
        b.iter(|| black_box(system.run()).expect("tick"));
    });
    group.finish();
}

/// Benchmark greeting, login, one lock command and logout.
fn bench_login_cycle(c: &mut Criterion) {
    let (factory, mut handles) = MockDriverFactory::new();
    let drivers = factory.build().expect("mock drivers");
    let mut system = BluetoothCentralLockSystem::from_drivers(drivers, session_config());
    system.run().expect("greeting tick");

    let mut group = c.benchmark_group("login_cycle");
    group.throughput(Throughput::Elements(4));
    group.bench_function("login_lock_logout", |b| {
        b.iter(|| {
            for line in ["alice", "secret", "lock", "logout"] {
                handles.bluetooth.send_line(line).expect("send");
                system.run().expect("tick");
            }
            black_box(handles.bluetooth.written_lines());
            black_box(handles.power_locks.pulses());
        });
    });
    group.finish();
}

/// Benchmark line validation across lengths up to the default limit.
fn bench_line_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_parse");
    group.throughput(Throughput::Elements(1));

    for len in [4usize, 16, DEFAULT_MAX_LINE_LENGTH] {
        let raw = format!("{}\r\n", "a".repeat(len));
        group.bench_with_input(BenchmarkId::from_parameter(len), &raw, |b, raw| {
            b.iter(|| {
                let result = SerialLine::parse(black_box(raw), DEFAULT_MAX_LINE_LENGTH);
                black_box(result)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_idle_tick, bench_login_cycle, bench_line_parse);
criterion_main!(benches);
