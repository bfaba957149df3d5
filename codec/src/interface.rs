//! Typed proxies over capability handles.
//!
//! An interface field carries a [`BinderHandle`] on the wire. On decode the
//! handle is turned into a typed proxy by the single factory registered for
//! that proxy type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::binder::BinderHandle;

/// A typed proxy for a remote interface.
pub trait InterfaceProxy: Send + Sync + 'static {
    /// Interface descriptor, e.g. `"com.example.ICallbacks"`.
    const DESCRIPTOR: &'static str;

    /// The handle this proxy talks through.
    fn as_binder(&self) -> BinderHandle;
}

/// A decoded interface field value.
pub struct Interface<P> {
    proxy: Arc<P>,
}

impl<P: InterfaceProxy> Interface<P> {
    pub fn new(proxy: P) -> Self {
        Self {
            proxy: Arc::new(proxy),
        }
    }

    #[must_use]
    pub fn proxy(&self) -> &P {
        &self.proxy
    }

    #[must_use]
    pub fn binder(&self) -> BinderHandle {
        self.proxy.as_binder()
    }
}

impl<P> Clone for Interface<P> {
    fn clone(&self) -> Self {
        Self {
            proxy: Arc::clone(&self.proxy),
        }
    }
}

impl<P: InterfaceProxy> PartialEq for Interface<P> {
    fn eq(&self, other: &Self) -> bool {
        self.binder() == other.binder()
    }
}

impl<P: InterfaceProxy> fmt::Debug for Interface<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("descriptor", &P::DESCRIPTOR)
            .field("binder", &self.binder())
            .finish()
    }
}

type Factory<P> = Box<dyn Fn(BinderHandle) -> P + Send + Sync>;

/// Process-wide table of proxy factories keyed by proxy type.
#[derive(Default)]
pub struct InterfaceRegistry {
    factories: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

static REGISTRY: Lazy<InterfaceRegistry> = Lazy::new(InterfaceRegistry::default);

impl InterfaceRegistry {
    /// The registry consulted by the decoder.
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    /// Registers the factory for `P`, replacing any previous one.
    pub fn register<P, F>(&self, factory: F)
    where
        P: InterfaceProxy,
        F: Fn(BinderHandle) -> P + Send + Sync + 'static,
    {
        let factory: Factory<P> = Box::new(factory);
        self.factories
            .write()
            .insert(TypeId::of::<P>(), Arc::new(factory));
    }

    /// Returns `true` if a factory for `P` is registered.
    pub fn contains<P: InterfaceProxy>(&self) -> bool {
        self.factories.read().contains_key(&TypeId::of::<P>())
    }

    /// Builds a proxy for `binder`, or `None` when no factory is registered.
    pub fn resolve<P: InterfaceProxy>(&self, binder: BinderHandle) -> Option<P> {
        let entry = self.factories.read().get(&TypeId::of::<P>()).cloned()?;
        let factory = entry.downcast_ref::<Factory<P>>()?;
        Some(factory(binder))
    }
}

impl fmt::Debug for InterfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceRegistry")
            .field("factories", &self.factories.read().len())
            .finish()
    }
}

/// Registers a proxy factory in the global registry.
pub fn register_interface<P, F>(factory: F)
where
    P: InterfaceProxy,
    F: Fn(BinderHandle) -> P + Send + Sync + 'static,
{
    InterfaceRegistry::global().register(factory);
}
