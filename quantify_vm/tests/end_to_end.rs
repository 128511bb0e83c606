//! End-to-end: instrument, execute concurrently, observe events.

use quantify_bytecode::{AccessFlags, ClassUnit, Constant, Instruction, MethodUnit};
use quantify_engine::{
    EligibilityFilter, ProbeInjector, RecordingSink, RunId, instrument_class,
};
use quantify_vm::{Value, VmEnv};
use std::sync::Arc;

/// `static int add(int a, int b) { return a + b; }`
fn calculator() -> ClassUnit {
    let mut class = ClassUnit::new("com/example/Calculator", AccessFlags::PUBLIC);
    let mut add = MethodUnit::new("add", "(II)I", AccessFlags::PUBLIC | AccessFlags::STATIC);
    add.instructions = vec![
        Instruction::ILoad(0),
        Instruction::ILoad(1),
        Instruction::IAdd,
        Instruction::IReturn,
    ];
    add.max_locals = 2;
    add.max_stack = 2;
    class.methods.push(add);
    class
}

fn instrumented_env(sink: Arc<RecordingSink>) -> (VmEnv, String) {
    let injector = ProbeInjector::new(RunId::new());
    let run_id = injector.run_id().to_string();
    let class = instrument_class(&EligibilityFilter::default(), &injector, &calculator());

    let mut vm = VmEnv::new(sink);
    vm.register_class(class);
    (vm, run_id)
}

#[test]
fn instrumented_method_returns_original_result() {
    let sink = Arc::new(RecordingSink::new());
    let (vm, _) = instrumented_env(sink.clone());

    let result = vm
        .invoke_static(
            "com/example/Calculator",
            "add",
            vec![Value::Int(19), Value::Int(23)],
        )
        .unwrap();
    assert_eq!(result, Some(Value::Int(42)));
    assert_eq!(sink.len(), 1);
}

#[test]
fn one_event_per_invocation() {
    let sink = Arc::new(RecordingSink::new());
    let (vm, run_id) = instrumented_env(sink.clone());

    for i in 0..10 {
        vm.invoke_static(
            "com/example/Calculator",
            "add",
            vec![Value::Int(i), Value::Int(i)],
        )
        .unwrap();
    }

    let events = sink.events();
    assert_eq!(events.len(), 10);
    for event in &events {
        assert_eq!(&*event.run_id, run_id);
        assert_eq!(&*event.class_name, "com/example/Calculator");
        assert_eq!(&*event.method_signature, "add(II)");
        assert!(event.start_nanos <= event.end_nanos);
    }
}

#[test]
fn concurrent_invocations_do_not_interfere() {
    let sink = Arc::new(RecordingSink::new());
    let (vm, _) = instrumented_env(sink.clone());
    let vm = &vm;

    std::thread::scope(|scope| {
        for name in ["worker-a", "worker-b"] {
            std::thread::Builder::new()
                .name(name.to_string())
                .spawn_scoped(scope, move || {
                    let result = vm
                        .invoke_static(
                            "com/example/Calculator",
                            "add",
                            vec![Value::Int(20), Value::Int(22)],
                        )
                        .unwrap();
                    assert_eq!(result, Some(Value::Int(42)));
                })
                .unwrap();
        }
    });

    let events = sink.events();
    assert_eq!(events.len(), 2);

    // Exactly one event per thread, each internally consistent: start and
    // end captured inside the same invocation, on the invoking thread.
    for name in ["worker-a", "worker-b"] {
        let mine: Vec<_> = events
            .iter()
            .filter(|e| &*e.thread_name == name)
            .collect();
        assert_eq!(mine.len(), 1, "expected exactly one event from {name}");
        assert!(mine[0].start_nanos <= mine[0].end_nanos);
    }

    // Same session: one run id across both threads.
    assert_eq!(events[0].run_id, events[1].run_id);
}

#[test]
fn throwing_invocation_emits_no_event() {
    // static void boom() { throw ...; } -- entry probe runs, no exit event.
    let mut class = ClassUnit::new("com/example/Faulty", AccessFlags::PUBLIC);
    let mut boom = MethodUnit::new("boom", "()V", AccessFlags::PUBLIC | AccessFlags::STATIC);
    boom.instructions = vec![
        Instruction::Ldc(Constant::Str("exceptional exit".into())),
        Instruction::Athrow,
    ];
    boom.max_stack = 1;
    class.methods.push(boom);

    let injector = ProbeInjector::new(RunId::new());
    let class = instrument_class(&EligibilityFilter::default(), &injector, &class);

    let sink = Arc::new(RecordingSink::new());
    let mut vm = VmEnv::new(sink.clone());
    vm.register_class(class);

    let err = vm.invoke_static("com/example/Faulty", "boom", vec![]).unwrap_err();
    assert!(err.to_string().contains("exceptional exit"));
    // Exception paths are not instrumented: timing data is absent, not wrong.
    assert!(sink.is_empty());
}

#[test]
fn both_paths_of_a_branchy_method_emit_one_event() {
    use quantify_bytecode::LabelId;

    let done = LabelId(7);
    let mut class = ClassUnit::new("com/example/Branchy", AccessFlags::PUBLIC);
    let mut clamp = MethodUnit::new("clamp", "(I)I", AccessFlags::PUBLIC | AccessFlags::STATIC);
    clamp.instructions = vec![
        Instruction::ILoad(0),
        Instruction::Ldc(Constant::Int(0)),
        Instruction::IfICmpGe(done),
        Instruction::Ldc(Constant::Int(0)),
        Instruction::IReturn,
        Instruction::Label(done),
        Instruction::ILoad(0),
        Instruction::IReturn,
    ];
    clamp.max_locals = 1;
    clamp.max_stack = 2;
    class.methods.push(clamp);

    let injector = ProbeInjector::new(RunId::new());
    let class = instrument_class(&EligibilityFilter::default(), &injector, &class);

    let sink = Arc::new(RecordingSink::new());
    let mut vm = VmEnv::new(sink.clone());
    vm.register_class(class);

    let clamp = |vm: &VmEnv, v: i32| {
        vm.invoke_static("com/example/Branchy", "clamp", vec![Value::Int(v)])
            .unwrap()
    };
    assert_eq!(clamp(&vm, -3), Some(Value::Int(0)));
    assert_eq!(clamp(&vm, 9), Some(Value::Int(9)));

    // Two invocations, two events, regardless of which return fired.
    assert_eq!(sink.len(), 2);
}
