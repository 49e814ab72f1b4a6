mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use cminus::backend::vm::{Function, Scope, VirtualMachine};

fn bench_vm(c: &mut Criterion) {
    c.bench_function("vm_countdown_1000", |b| {
        let mut vm = VirtualMachine::new(common::countdown(1000));
        b.iter(|| {
            let result = vm.run().expect("run");
            black_box(result);
        })
    });

    c.bench_function("vm_function_instance", |b| {
        let function = Function::new(common::countdown(100));
        let enclosing: Scope = [("limit", 100_i64)].into_iter().collect();
        let arguments: Scope = [("i", 0_i64)].into_iter().collect();
        b.iter(|| {
            let mut instance = function.instance_with_arguments(&enclosing, &arguments);
            let result = instance.run().expect("run");
            black_box(result);
        })
    });
}

criterion_group!(benches, bench_vm);
criterion_main!(benches);
