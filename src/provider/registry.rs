//! Provider registration and selection
//!
//! Selection is a pure function of the registered providers: filter to the
//! available ones, take the highest priority, and break ties by registration
//! order. When nothing is available the registry's fallback is returned, so
//! selection never fails.
//!
//! One registry per field and provider kind lives in a process-wide map. It
//! is seeded from [`Field::linear_algebra_providers`] and
//! [`Field::tensor_providers`] on first use and can be extended with
//! [`register_linear_algebra`] and [`register_tensor`].

use super::{CpuNaiveProvider, LinearAlgebraProvider, Provider, TensorProvider};
use crate::field::Field;
use log::debug;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Highest-priority available provider, ties to the earliest registered
pub fn select_provider<P: ?Sized + Provider>(providers: &[Arc<P>]) -> Option<&Arc<P>> {
    let mut best: Option<&Arc<P>> = None;
    for p in providers.iter().filter(|p| p.is_available()) {
        // Strictly greater, so an earlier provider keeps a tie
        if best.is_none_or(|b| p.priority() > b.priority()) {
            best = Some(p);
        }
    }
    best
}

/// Ordered providers of one kind with a terminal fallback
pub struct ProviderRegistry<P: ?Sized> {
    providers: Vec<Arc<P>>,
    fallback: Arc<P>,
}

impl<P: ?Sized + Provider> ProviderRegistry<P> {
    /// Empty registry that always selects `fallback`
    pub fn new(fallback: Arc<P>) -> Self {
        Self {
            providers: Vec::new(),
            fallback,
        }
    }

    /// Registry seeded with `providers` in order
    pub fn with_providers(providers: Vec<Arc<P>>, fallback: Arc<P>) -> Self {
        Self {
            providers,
            fallback,
        }
    }

    /// Append a provider; it loses ties against earlier registrations
    pub fn register(&mut self, provider: Arc<P>) {
        debug!(
            "Registering provider '{}' (priority {}, available: {})",
            provider.name(),
            provider.priority(),
            provider.is_available()
        );
        self.providers.push(provider);
    }

    /// Registered providers in registration order
    pub fn providers(&self) -> &[Arc<P>] {
        &self.providers
    }

    /// Best available provider, or the fallback
    pub fn select(&self) -> Arc<P> {
        match select_provider(&self.providers) {
            Some(p) => {
                debug!("Selected provider '{}' (priority {})", p.name(), p.priority());
                Arc::clone(p)
            }
            None => {
                debug!(
                    "No available provider among {}, using fallback '{}'",
                    self.providers.len(),
                    self.fallback.name()
                );
                Arc::clone(&self.fallback)
            }
        }
    }
}

type AnyRegistry = Box<dyn Any + Send + Sync>;

static REGISTRIES: OnceLock<RwLock<HashMap<TypeId, AnyRegistry>>> = OnceLock::new();

fn registries() -> &'static RwLock<HashMap<TypeId, AnyRegistry>> {
    REGISTRIES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Run `f` on the global registry for `P`, creating it with `init` if needed
fn with_registry<P, R>(
    init: fn() -> ProviderRegistry<P>,
    f: impl FnOnce(&mut ProviderRegistry<P>) -> R,
) -> R
where
    P: ?Sized + Provider + 'static,
{
    let mut map = registries().write();
    let entry = map
        .entry(TypeId::of::<ProviderRegistry<P>>())
        .or_insert_with(|| Box::new(init()));
    let registry = entry
        .downcast_mut::<ProviderRegistry<P>>()
        .expect("registry stored under its own TypeId");
    f(registry)
}

/// Read-only variant of [`with_registry`] that avoids the write lock once the
/// registry exists
fn read_registry<P, R>(
    init: fn() -> ProviderRegistry<P>,
    f: impl FnOnce(&ProviderRegistry<P>) -> R,
) -> R
where
    P: ?Sized + Provider + 'static,
{
    {
        let map = registries().read();
        if let Some(registry) = map
            .get(&TypeId::of::<ProviderRegistry<P>>())
            .and_then(|r| r.downcast_ref::<ProviderRegistry<P>>())
        {
            return f(registry);
        }
    }
    with_registry(init, |r| f(r))
}

fn linear_algebra_defaults<F: Field>() -> ProviderRegistry<dyn LinearAlgebraProvider<F>> {
    let mut registry = ProviderRegistry::new(
        Arc::new(CpuNaiveProvider::new()) as Arc<dyn LinearAlgebraProvider<F>>
    );
    for p in F::linear_algebra_providers() {
        registry.register(p);
    }
    registry
}

fn tensor_defaults<F: Field>() -> ProviderRegistry<dyn TensorProvider<F>> {
    let mut registry =
        ProviderRegistry::new(Arc::new(CpuNaiveProvider::new()) as Arc<dyn TensorProvider<F>>);
    for p in F::tensor_providers() {
        registry.register(p);
    }
    registry
}

/// Best linear algebra provider for `F`
pub fn linear_algebra<F: Field>() -> Arc<dyn LinearAlgebraProvider<F>> {
    read_registry(linear_algebra_defaults::<F>, |r| r.select())
}

/// Registered linear algebra providers for `F`, in registration order
pub fn linear_algebra_providers<F: Field>() -> Vec<Arc<dyn LinearAlgebraProvider<F>>> {
    read_registry(linear_algebra_defaults::<F>, |r| r.providers().to_vec())
}

/// Add a linear algebra provider for `F`
///
/// Matrices built afterwards may select it; existing matrices keep theirs.
pub fn register_linear_algebra<F: Field>(provider: Arc<dyn LinearAlgebraProvider<F>>) {
    with_registry(linear_algebra_defaults::<F>, |r| r.register(provider));
}

/// Best tensor provider for `F`
pub fn tensor<F: Field>() -> Arc<dyn TensorProvider<F>> {
    read_registry(tensor_defaults::<F>, |r| r.select())
}

/// Registered tensor providers for `F`, in registration order
pub fn tensor_providers<F: Field>() -> Vec<Arc<dyn TensorProvider<F>>> {
    read_registry(tensor_defaults::<F>, |r| r.providers().to_vec())
}

/// Best tensor provider for `F` that builds dense tensors
///
/// Falls back to the registry's CPU-naive fallback when no dense provider is
/// available.
pub fn dense_tensor<F: Field>() -> Arc<dyn TensorProvider<F>> {
    read_registry(tensor_defaults::<F>, |r| {
        let dense: Vec<_> = r
            .providers()
            .iter()
            .filter(|p| !p.builds_sparse())
            .cloned()
            .collect();
        match select_provider(&dense) {
            Some(p) => Arc::clone(p),
            None => Arc::clone(&r.fallback),
        }
    })
}

/// Add a tensor provider for `F`
pub fn register_tensor<F: Field>(provider: Arc<dyn TensorProvider<F>>) {
    with_registry(tensor_defaults::<F>, |r| r.register(provider));
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        priority: u8,
        available: bool,
    }

    impl Provider for Fixed {
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

    fn fixed(name: &'static str, priority: u8, available: bool) -> Arc<dyn Provider> {
        Arc::new(Fixed {
            name,
            priority,
            available,
        })
    }

    #[test]
    fn test_highest_priority_wins() {
        let providers = vec![fixed("naive", 50, true), fixed("simd", 90, true)];
        assert_eq!(select_provider(&providers).unwrap().name(), "simd");
    }

    #[test]
    fn test_unavailable_is_skipped() {
        let providers = vec![fixed("naive", 50, true), fixed("simd", 90, false)];
        assert_eq!(select_provider(&providers).unwrap().name(), "naive");
    }

    #[test]
    fn test_tie_goes_to_first_registered() {
        let providers = vec![fixed("first", 70, true), fixed("second", 70, true)];
        assert_eq!(select_provider(&providers).unwrap().name(), "first");
    }

    #[test]
    fn test_fallback_when_none_available() {
        let mut registry = ProviderRegistry::new(fixed("fallback", 0, true));
        registry.register(fixed("gpu", 100, false));
        assert!(select_provider(registry.providers()).is_none());
        assert_eq!(registry.select().name(), "fallback");
    }
}
