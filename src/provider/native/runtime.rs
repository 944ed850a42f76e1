//! Dynamically loaded native compute runtime
//!
//! The runtime is a shared library exporting a small C ABI:
//!
//! ```text
//! uint32_t matrixkit_native_abi_version(void);
//! int32_t  matrixkit_native_fill_f64(double *dst, size_t len, double value);
//! int32_t  matrixkit_native_copy_f64(const double *src, double *dst, size_t len);
//! int32_t  matrixkit_native_cuda_device_count(void);   /* optional */
//! ```
//!
//! Calls return `0` on success. The library is probed once per process; a
//! runtime that appears later is not picked up.
//!
//! [`NativeRuntime::from_entry_points`] builds a runtime from function
//! pointers directly, for hosts that link the backend statically.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::storage::DirectBuffer;
use libloading::{Library, Symbol};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// ABI version this crate was written against
pub const ABI_VERSION: u32 = 1;

/// Library base name used when no path is configured
pub const DEFAULT_LIBRARY: &str = "matrixkit_native";

type AbiVersionFn = unsafe extern "C" fn() -> u32;
/// `matrixkit_native_fill_f64`
pub type FillFn = unsafe extern "C" fn(*mut f64, usize, f64) -> i32;
/// `matrixkit_native_copy_f64`
pub type CopyFn = unsafe extern "C" fn(*const f64, *mut f64, usize) -> i32;
/// `matrixkit_native_cuda_device_count`
pub type DeviceCountFn = unsafe extern "C" fn() -> i32;

/// Resolved entry points of a runtime
#[derive(Clone, Copy, Debug)]
pub struct EntryPoints {
    pub fill: FillFn,
    pub copy: CopyFn,
    pub cuda_device_count: Option<DeviceCountFn>,
}

/// A loaded and version-checked native runtime
pub struct NativeRuntime {
    path: PathBuf,
    fill: FillFn,
    copy: CopyFn,
    cuda_devices: usize,
    // Keeps the function pointers above valid; `None` for static entry points
    _library: Option<Library>,
}

impl std::fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeRuntime")
            .field("path", &self.path)
            .field("cuda_devices", &self.cuda_devices)
            .finish_non_exhaustive()
    }
}

fn symbol<T: Copy>(library: &Library, name: &[u8], path: &Path) -> Result<T> {
    // SAFETY: the caller names a symbol whose C signature matches `T`.
    let sym: Symbol<T> = unsafe { library.get(name) }.map_err(|e| {
        Error::Backend(format!(
            "{}: missing symbol {}: {}",
            path.display(),
            String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name)),
            e
        ))
    })?;
    Ok(*sym)
}

impl NativeRuntime {
    /// Load the library at `path` and resolve its entry points
    pub fn load(path: &Path) -> Result<Self> {
        // SAFETY: loading runs the library's initializers; the configured
        // runtime library is trusted.
        let library = unsafe { Library::new(path) }
            .map_err(|e| Error::Backend(format!("failed to load {}: {}", path.display(), e)))?;

        let abi_version: AbiVersionFn =
            symbol(&library, b"matrixkit_native_abi_version\0", path)?;
        // SAFETY: takes no arguments and returns a plain integer.
        let version = unsafe { abi_version() };
        if version != ABI_VERSION {
            return Err(Error::Backend(format!(
                "{}: ABI version {} (expected {})",
                path.display(),
                version,
                ABI_VERSION
            )));
        }

        let entry = EntryPoints {
            fill: symbol(&library, b"matrixkit_native_fill_f64\0", path)?,
            copy: symbol(&library, b"matrixkit_native_copy_f64\0", path)?,
            cuda_device_count: symbol(
                &library,
                b"matrixkit_native_cuda_device_count\0",
                path,
            )
            .ok(),
        };

        // SAFETY: the symbols were resolved from a library reporting our ABI
        // version, and the library is kept alive alongside them.
        let mut runtime = unsafe { Self::from_entry_points(path, entry) };
        runtime._library = Some(library);
        Ok(runtime)
    }

    /// Build a runtime from already-resolved entry points
    ///
    /// `label` stands in for the library path in logs and errors.
    ///
    /// # Safety
    ///
    /// Every pointer in `entry` must implement the C ABI described in the
    /// module docs and stay callable for the lifetime of the runtime.
    pub unsafe fn from_entry_points(label: impl Into<PathBuf>, entry: EntryPoints) -> Self {
        let cuda_devices = entry
            .cuda_device_count
            // SAFETY: takes no arguments and returns a plain integer.
            .map(|count| unsafe { count() })
            .map_or(0, |n| usize::try_from(n).unwrap_or(0));

        Self {
            path: label.into(),
            fill: entry.fill,
            copy: entry.copy,
            cuda_devices,
            _library: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// CUDA devices reported by the runtime, zero without CUDA support
    pub fn cuda_device_count(&self) -> usize {
        self.cuda_devices
    }

    /// Set every element of `dst` to `value`
    pub fn fill(&self, dst: &mut DirectBuffer, value: f64) -> Result<()> {
        // SAFETY: `dst` is valid for `dst.len()` writes.
        let status = unsafe { (self.fill)(dst.as_mut_ptr(), dst.len(), value) };
        check_status("fill_f64", status)
    }

    /// Copy `src` into `dst`
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn copy_into(&self, src: &[f64], dst: &mut DirectBuffer) -> Result<()> {
        assert_eq!(src.len(), dst.len(), "native copy length mismatch");
        // SAFETY: both buffers are valid for `src.len()` elements and do not
        // overlap, `dst` being uniquely borrowed.
        let status = unsafe { (self.copy)(src.as_ptr(), dst.as_mut_ptr(), src.len()) };
        check_status("copy_f64", status)
    }
}

fn check_status(call: &str, status: i32) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(Error::Backend(format!(
            "matrixkit_native_{} returned {}",
            call, status
        )))
    }
}

/// Location of the runtime library under `config`
pub fn library_path(config: &EngineConfig) -> PathBuf {
    config
        .native_library
        .clone()
        .unwrap_or_else(|| PathBuf::from(libloading::library_filename(DEFAULT_LIBRARY)))
}

/// Try to load the runtime described by `config`
pub fn probe_with(config: &EngineConfig) -> Option<Arc<NativeRuntime>> {
    let path = library_path(config);
    match NativeRuntime::load(&path) {
        Ok(runtime) => {
            info!(
                "native runtime loaded from {} ({} CUDA device(s))",
                path.display(),
                runtime.cuda_device_count()
            );
            Some(Arc::new(runtime))
        }
        Err(e) => {
            info!("native runtime not available: {}", e);
            None
        }
    }
}

/// The process-wide runtime, probed on first use
pub fn probe() -> Option<Arc<NativeRuntime>> {
    static RUNTIME: OnceLock<Option<Arc<NativeRuntime>>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| probe_with(EngineConfig::global()))
        .clone()
}
