//! Native providers: the runtime path and the CPU fallback
#![cfg(feature = "native")]

mod common;

use common::init_logging;
use matrixkit::prelude::*;
use matrixkit::provider::native::runtime::{self, EntryPoints, NativeRuntime};
use matrixkit::provider::native::{NativeCpuProvider, NativeCudaProvider};
use matrixkit::provider::registry;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const MISSING: &str = "/nonexistent/libmatrixkit_native_missing.so";

#[test]
fn test_missing_library_is_a_backend_error() {
    init_logging();
    assert!(matches!(
        NativeRuntime::load(Path::new(MISSING)),
        Err(Error::Backend(_))
    ));

    let config = EngineConfig::default().with_native_library(MISSING);
    assert_eq!(runtime::library_path(&config), Path::new(MISSING));
    assert!(runtime::probe_with(&config).is_none());
}

#[test]
fn test_providers_without_runtime() {
    let cpu = NativeCpuProvider::with_runtime(None);
    let cuda = NativeCudaProvider::with_runtime(None);

    assert!(!cpu.is_available());
    assert_eq!(cpu.priority(), 80);
    assert!(!cpu.supports_gpu());

    assert!(!cuda.is_available());
    assert_eq!(cuda.priority(), 100);
    assert_eq!(cuda.device_count(), 0);
    assert!(matches!(
        cuda.create_context(),
        Err(Error::BackendUnavailable { provider: "native-cuda", .. })
    ));

    // Construction still works, served by the CPU fallback
    for p in [
        &cpu as &dyn TensorProvider<Reals>,
        &cuda as &dyn TensorProvider<Reals>,
    ] {
        let ones = p.ones(&Reals, &[2, 2]).unwrap();
        assert_eq!(ones.sum(&Reals), 4.0);
        let t = p.create(&Reals, vec![1.0, 2.0, 3.0], &[3]).unwrap();
        assert_eq!(t.get(&[2]), Ok(3.0));
        assert!(p.create(&Reals, vec![1.0], &[3]).is_err());
    }
}

#[test]
fn test_registry_skips_absent_runtime() {
    if runtime::probe().is_some() {
        return;
    }
    let names: Vec<_> = registry::tensor_providers::<Reals>()
        .iter()
        .map(|p| p.name())
        .collect();
    assert!(names.contains(&"native-cpu"));
    assert!(names.contains(&"native-cuda"));
    assert_eq!(registry::tensor::<Reals>().name(), "cpu-naive");
}

// In-process stand-ins for the C ABI. Each counter belongs to one test.

static CPU_FILLS: AtomicUsize = AtomicUsize::new(0);
static CPU_COPIES: AtomicUsize = AtomicUsize::new(0);
static GATED_FILLS: AtomicUsize = AtomicUsize::new(0);

fn fill_slice(dst: *mut f64, len: usize, value: f64) -> i32 {
    // SAFETY: the runtime passes a buffer valid for `len` writes.
    unsafe { std::slice::from_raw_parts_mut(dst, len) }.fill(value);
    0
}

extern "C" fn fill_cpu(dst: *mut f64, len: usize, value: f64) -> i32 {
    CPU_FILLS.fetch_add(1, Ordering::SeqCst);
    fill_slice(dst, len, value)
}

extern "C" fn fill_gated(dst: *mut f64, len: usize, value: f64) -> i32 {
    GATED_FILLS.fetch_add(1, Ordering::SeqCst);
    fill_slice(dst, len, value)
}

extern "C" fn fill_plain(dst: *mut f64, len: usize, value: f64) -> i32 {
    fill_slice(dst, len, value)
}

extern "C" fn fill_broken(_dst: *mut f64, _len: usize, _value: f64) -> i32 {
    -1
}

extern "C" fn copy_cpu(src: *const f64, dst: *mut f64, len: usize) -> i32 {
    CPU_COPIES.fetch_add(1, Ordering::SeqCst);
    // SAFETY: both buffers are valid for `len` elements and disjoint.
    unsafe { std::ptr::copy_nonoverlapping(src, dst, len) };
    0
}

extern "C" fn copy_cpu_free(src: *const f64, dst: *mut f64, len: usize) -> i32 {
    // SAFETY: both buffers are valid for `len` elements and disjoint.
    unsafe { std::ptr::copy_nonoverlapping(src, dst, len) };
    0
}

extern "C" fn two_devices() -> i32 {
    2
}

extern "C" fn no_devices() -> i32 {
    0
}

fn runtime_with(entry: EntryPoints) -> Option<Arc<NativeRuntime>> {
    // SAFETY: the functions above honour the runtime ABI.
    Some(Arc::new(unsafe {
        NativeRuntime::from_entry_points("in-process", entry)
    }))
}

#[test]
fn test_native_cpu_serves_through_runtime() {
    init_logging();
    let p = NativeCpuProvider::with_runtime(runtime_with(EntryPoints {
        fill: fill_cpu,
        copy: copy_cpu,
        cuda_device_count: None,
    }));
    assert!(p.is_available());
    assert_eq!(p.create_context().unwrap().device, DeviceKind::Cpu);

    let ones = p.ones(&Reals, &[2, 3]).unwrap();
    assert!(!ones.is_sparse());
    assert_eq!(ones.shape().as_slice(), &[2, 3]);
    assert_eq!(ones.to_dense().as_slice(), &[1.0; 6]);
    let zeros = p.zeros(&Reals, &[4]).unwrap();
    assert_eq!(zeros.to_dense().as_slice(), &[0.0; 4]);
    assert_eq!(CPU_FILLS.load(Ordering::SeqCst), 2);

    let t = p
        .create(&Reals, vec![1.0, 0.0, -2.0, 3.5], &[2, 2])
        .unwrap();
    assert_eq!(t.get(&[1, 0]), Ok(-2.0));
    assert_eq!(t.get(&[1, 1]), Ok(3.5));
    assert_eq!(CPU_COPIES.load(Ordering::SeqCst), 1);

    // Malformed input never reaches the runtime
    assert!(p.create(&Reals, vec![1.0], &[2, 2]).is_err());
    assert_eq!(CPU_COPIES.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cuda_gated_on_device_count() {
    let with_gpu = NativeCudaProvider::with_runtime(runtime_with(EntryPoints {
        fill: fill_plain,
        copy: copy_cpu_free,
        cuda_device_count: Some(two_devices),
    }));
    assert!(with_gpu.is_available());
    assert!(with_gpu.supports_gpu());
    assert_eq!(with_gpu.device_count(), 2);
    assert_eq!(
        with_gpu.create_context().unwrap().device,
        DeviceKind::Gpu { ordinal: 0 }
    );
    assert_eq!(with_gpu.ones(&Reals, &[3]).unwrap().sum(&Reals), 3.0);

    // A runtime without devices is not used for CUDA at all
    let no_gpu = NativeCudaProvider::with_runtime(runtime_with(EntryPoints {
        fill: fill_gated,
        copy: copy_cpu_free,
        cuda_device_count: Some(no_devices),
    }));
    assert!(!no_gpu.is_available());
    assert!(matches!(
        no_gpu.create_context(),
        Err(Error::BackendUnavailable { provider: "native-cuda", .. })
    ));
    assert_eq!(no_gpu.ones(&Reals, &[3]).unwrap().sum(&Reals), 3.0);
    assert_eq!(GATED_FILLS.load(Ordering::SeqCst), 0);

    // The same runtime still backs the host provider
    let host = NativeCpuProvider::with_runtime(runtime_with(EntryPoints {
        fill: fill_gated,
        copy: copy_cpu_free,
        cuda_device_count: Some(no_devices),
    }));
    host.zeros(&Reals, &[2]).unwrap();
    assert_eq!(GATED_FILLS.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_native_call_degrades_to_cpu() {
    let p = NativeCpuProvider::with_runtime(runtime_with(EntryPoints {
        fill: fill_broken,
        copy: copy_cpu_free,
        cuda_device_count: None,
    }));
    assert!(p.is_available());
    let ones = p.ones(&Reals, &[2, 2]).unwrap();
    assert_eq!(ones.to_dense().as_slice(), &[1.0; 4]);
}
