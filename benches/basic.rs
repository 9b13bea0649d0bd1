use std::{cell::Cell, hint::black_box, rc::Rc};

use arid_signal::{AutoTerminator, Signal};
use criterion::{Criterion, criterion_group, criterion_main};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("emit/direct_call", |b| {
        let counter = Cell::new(0u32);
        let slot = |v: &u32| counter.set(counter.get() + v);

        b.iter(|| slot(black_box(&1)));
    });

    c.bench_function("emit/single_slot", |b| {
        let signal = Signal::<u32>::new();
        let counter = Rc::new(Cell::new(0u32));

        signal.connect({
            let counter = counter.clone();
            move |v| counter.set(counter.get() + v)
        });

        b.iter(|| signal.emit(black_box(1u32)));
    });

    c.bench_function("emit/sixteen_slots", |b| {
        let signal = Signal::<u32>::with_capacity(16);
        let counter = Rc::new(Cell::new(0u32));

        for _ in 0..16 {
            signal.connect({
                let counter = counter.clone();
                move |v| counter.set(counter.get() + v)
            });
        }

        b.iter(|| signal.emit(black_box(1u32)));
    });

    c.bench_function("connect/terminate", |b| {
        let signal = Signal::<u32>::new();

        b.iter(|| signal.connect(|_| {}).terminate());
    });

    c.bench_function("connect/auto_terminate", |b| {
        let signal = Signal::<u32>::new();

        b.iter(|| {
            let owner = AutoTerminator::new();

            for _ in 0..8 {
                signal.connect_with(|_| {}, Some(&owner));
            }
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
