//! Provider registry selection and binding

mod common;

use common::init_logging;
use matrixkit::prelude::*;
use matrixkit::provider::{CpuNaiveProvider, ProviderRegistry, registry};
use std::cmp::Ordering;
use std::sync::Arc;

/// Integers with exact arithmetic; only the units are invertible
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ints;

impl Field for Ints {
    type Elem = i64;

    fn name(&self) -> &'static str {
        "Ints"
    }

    fn zero(&self) -> i64 {
        0
    }

    fn one(&self) -> i64 {
        1
    }

    fn add(&self, a: &i64, b: &i64) -> i64 {
        a + b
    }

    fn mul(&self, a: &i64, b: &i64) -> i64 {
        a * b
    }

    fn neg(&self, a: &i64) -> i64 {
        -a
    }

    fn inv(&self, a: &i64) -> Option<i64> {
        matches!(*a, 1 | -1).then_some(*a)
    }

    fn cmp(&self, a: &i64, b: &i64) -> Option<Ordering> {
        Some(Ord::cmp(a, b))
    }
}

struct Tagged {
    name: &'static str,
    priority: u8,
    available: bool,
}

impl Provider for Tagged {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

impl LinearAlgebraProvider<Ints> for Tagged {}

fn tagged(
    name: &'static str,
    priority: u8,
    available: bool,
) -> Arc<dyn LinearAlgebraProvider<Ints>> {
    Arc::new(Tagged {
        name,
        priority,
        available,
    })
}

fn naive() -> Arc<dyn LinearAlgebraProvider<Ints>> {
    Arc::new(CpuNaiveProvider::new())
}

#[test]
fn test_higher_priority_wins() {
    let registry = ProviderRegistry::with_providers(
        vec![tagged("p50", 50, true), tagged("p90", 90, true)],
        naive(),
    );
    assert_eq!(registry.select().name(), "p90");
}

#[test]
fn test_unavailable_provider_is_skipped() {
    let registry = ProviderRegistry::with_providers(
        vec![tagged("p50", 50, true), tagged("p90", 90, false)],
        naive(),
    );
    assert_eq!(registry.select().name(), "p50");
}

#[test]
fn test_ties_go_to_registration_order() {
    let mut registry = ProviderRegistry::new(naive());
    registry.register(tagged("first", 70, true));
    registry.register(tagged("second", 70, true));
    assert_eq!(registry.select().name(), "first");
    assert_eq!(registry.providers().len(), 2);
}

#[test]
fn test_nothing_available_uses_fallback() {
    let registry =
        ProviderRegistry::with_providers(vec![tagged("offline", 100, false)], naive());
    assert_eq!(registry.select().name(), "cpu-naive");
}

#[test]
fn test_provider_is_bound_at_construction() {
    init_logging();
    let before = Matrix::from_rows(Ints, &[[1i64, 2], [3, 4]]).unwrap();
    assert_eq!(before.provider_name(), "cpu-naive");

    registry::register_linear_algebra::<Ints>(tagged("ints-fast", 90, true));
    registry::register_linear_algebra::<Ints>(tagged("ints-offline", 100, false));

    let after = Matrix::from_rows(Ints, &[[5i64, 6], [7, 8]]).unwrap();
    assert_eq!(after.provider_name(), "ints-fast");
    assert_eq!(before.provider_name(), "cpu-naive");

    // Results stay on the left operand's provider
    let product = before.multiply(&after).unwrap();
    assert_eq!(product.provider_name(), "cpu-naive");
    assert_eq!(product.to_rows(), vec![vec![19, 22], vec![43, 50]]);
    assert_eq!(after.transpose().provider_name(), "ints-fast");

    let names: Vec<_> = registry::linear_algebra_providers::<Ints>()
        .iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(names, vec!["cpu-naive", "ints-fast", "ints-offline"]);
}

#[test]
fn test_reals_registry_prefers_available_simd() {
    let names: Vec<_> = registry::linear_algebra_providers::<Reals>()
        .iter()
        .map(|p| p.name())
        .collect();
    assert_eq!(names[0], "cpu-naive");

    let m = Matrix::identity(Reals, 2);
    #[cfg(feature = "simd")]
    {
        assert!(names.contains(&"cpu-simd"));
        let simd = matrixkit::provider::CpuSimdProvider::new();
        let expected = if simd.is_available() { "cpu-simd" } else { "cpu-naive" };
        assert_eq!(m.provider_name(), expected);
    }
    #[cfg(not(feature = "simd"))]
    assert_eq!(m.provider_name(), "cpu-naive");
}

#[cfg(feature = "simd")]
#[test]
fn test_disabled_simd_refuses_explicit_context() {
    let config = EngineConfig::default().without_simd();
    let simd = matrixkit::provider::CpuSimdProvider::with_config(&config);
    assert!(!simd.is_available());
    assert!(matches!(
        simd.create_context(),
        Err(Error::BackendUnavailable { provider: "cpu-simd", .. })
    ));

    // The disabled provider is never selected over the baseline
    let registry = ProviderRegistry::with_providers(
        vec![
            Arc::new(CpuNaiveProvider::new()) as Arc<dyn LinearAlgebraProvider<Reals>>,
            Arc::new(simd),
        ],
        Arc::new(CpuNaiveProvider::new()) as Arc<dyn LinearAlgebraProvider<Reals>>,
    );
    assert_eq!(registry.select().name(), "cpu-naive");
}

#[test]
fn test_baseline_capabilities() {
    let p = CpuNaiveProvider::new();
    let la: &dyn LinearAlgebraProvider<Reals> = &p;
    assert_eq!(la.priority(), 50);
    assert!(la.is_available());
    assert!(!la.supports_gpu());
    assert_eq!(la.supports_parallel_ops(), cfg!(feature = "rayon"));

    let ctx = la.create_context().unwrap();
    assert_eq!(ctx.provider, "cpu-naive");
    assert_eq!(ctx.device, DeviceKind::Cpu);
}
