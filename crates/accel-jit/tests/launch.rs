mod support;

use std::sync::Arc;

use accel_jit::{
    ArrayArg, Dims, JitError, JitOptions, KernelArg, ScalarType, SourceFunction, jit,
    launch_artifact,
};
use support::{Event, RecordingBackend};

fn compiled_kernel(
    backend: &Arc<RecordingBackend>,
    signature: &str,
) -> accel_jit::Kernel<RecordingBackend> {
    jit(
        SourceFunction::new("saxpy", "y[i] = a * x[i] + y[i]"),
        JitOptions::kernel().with_signature(signature),
        Arc::clone(backend),
    )
    .expect("jit")
    .into_kernel()
    .expect("eager kernel")
}

fn saxpy_args() -> Vec<KernelArg> {
    vec![
        KernelArg::from(2.0f32),
        ArrayArg::contiguous(ScalarType::Float32, vec![60], 0x10).into(),
        ArrayArg::contiguous(ScalarType::Float32, vec![60], 0x20).into(),
    ]
}

#[test]
fn integer_grid_and_tuple_block_reach_the_backend_normalized() {
    let backend = Arc::new(RecordingBackend::new());
    let kernel = compiled_kernel(&backend, "void(float32, float32[::1], float32[::1])");

    let launch = kernel.configure(5, (3, 4)).expect("configure");
    assert_eq!(launch.geometry().to_string(), "grid=(5,) block=(3, 4)");
    assert_eq!(launch.geometry().total_threads(), 60);
    launch.launch(&saxpy_args()).expect("launch");

    assert_eq!(
        backend.launches(),
        vec![Event::Launch {
            artifact: kernel.artifact().handle().id,
            grid: vec![5],
            block: vec![3, 4],
            args: 3,
        }]
    );
}

#[test]
fn geometry_can_be_reused_for_several_launches() {
    let backend = Arc::new(RecordingBackend::new());
    let kernel = compiled_kernel(&backend, "void(float32, float32[::1], float32[::1])");
    let launch = kernel.configure(vec![2, 2], 15).expect("configure");
    for _ in 0..3 {
        launch.launch(&saxpy_args()).expect("launch");
    }
    assert_eq!(backend.launches().len(), 3);
    assert_eq!(backend.kernel_compiles(), 1);
}

#[test]
fn oversized_block_tuple_is_rejected_before_dispatch() {
    let backend = Arc::new(RecordingBackend::new());
    let kernel = compiled_kernel(&backend, "void(int32)");
    let before = backend.events();

    let err = kernel.configure(1, (1, 2, 3, 4)).err().expect("launch config");
    assert!(matches!(err, JitError::LaunchConfig(_)), "{err}");
    let err = kernel.configure((1, 1, 1), 32).err().expect("grid arity");
    assert!(matches!(err, JitError::LaunchConfig(_)), "{err}");

    assert_eq!(backend.events(), before);
}

#[test]
fn negative_and_overflowing_components_are_rejected() {
    let backend = Arc::new(RecordingBackend::new());
    let kernel = compiled_kernel(&backend, "void(int32)");
    let err = kernel.configure(-1, 32).err().expect("negative grid");
    assert!(matches!(err, JitError::LaunchConfig(_)));
    let err = kernel.configure(1, 1i64 << 40).err().expect("too large");
    assert!(matches!(err, JitError::LaunchConfig(_)));
    assert!(backend.launches().is_empty());
}

#[test]
fn geometry_parsed_from_text_launches_like_typed_geometry() {
    let backend = Arc::new(RecordingBackend::new());
    let kernel = compiled_kernel(&backend, "void(int32)");
    let grid: Dims = "(4, 2)".parse().expect("grid");
    let block: Dims = "[64,]".parse().expect("block");
    kernel
        .configure(grid, block)
        .expect("configure")
        .launch(&[KernelArg::from(7i32)])
        .expect("launch");
    match backend.launches().as_slice() {
        [Event::Launch { grid, block, .. }] => {
            assert_eq!(grid, &vec![4, 2]);
            assert_eq!(block, &vec![64]);
        }
        other => panic!("unexpected launches: {other:?}"),
    }
}

#[test]
fn wrong_argument_count_is_an_invocation_error() {
    let backend = Arc::new(RecordingBackend::new());
    let kernel = compiled_kernel(&backend, "void(int32, int32)");
    let err = kernel
        .configure(1, 1)
        .expect("configure")
        .launch(&[KernelArg::from(1i32)])
        .expect_err("arity");
    assert!(matches!(err, JitError::Invocation(_)), "{err}");
    assert!(backend.launches().is_empty());
}

#[test]
fn device_functions_refuse_host_launches_without_side_effects() {
    let backend = Arc::new(RecordingBackend::new());
    let device = jit(
        SourceFunction::new("bar", "a + b"),
        JitOptions::device().with_signature("int32(int32, int32)"),
        Arc::clone(&backend),
    )
    .expect("jit")
    .into_device()
    .expect("device function");
    let before = backend.events();

    // Invalid geometry must not mask the role error.
    let err = device.configure(1, (1, 2, 3, 4)).err().expect("invocation");
    assert!(matches!(err, JitError::Invocation(_)), "{err}");
    assert!(err.to_string().contains("bar"));

    let err = launch_artifact(
        backend.as_ref(),
        device.artifact(),
        1,
        1,
        &[KernelArg::from(1i32), KernelArg::from(2i32)],
    )
    .expect_err("invocation");
    assert!(matches!(err, JitError::Invocation(_)));

    assert_eq!(backend.events(), before);
}

#[test]
fn launch_artifact_dispatches_kernels() {
    let backend = Arc::new(RecordingBackend::new());
    let kernel = compiled_kernel(&backend, "void(uint8[:])");
    launch_artifact(
        backend.as_ref(),
        kernel.artifact(),
        (2, 2),
        (8, 8, 2),
        &[ArrayArg::contiguous(ScalarType::UInt8, vec![512], 0).into()],
    )
    .expect("launch");
    match backend.launches().as_slice() {
        [Event::Launch { grid, block, .. }] => {
            assert_eq!(grid, &vec![2, 2]);
            assert_eq!(block, &vec![8, 8, 2]);
        }
        other => panic!("unexpected launches: {other:?}"),
    }
}
