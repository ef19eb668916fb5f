use std::fmt;
use std::sync::Arc;

use scenario_schema::ComponentId;

/// Behavior attached to a global component, region, compartment or
/// materials producer. Instances are created by the host at run start.
pub trait Component: Send {
    fn init(&mut self, _id: &ComponentId) {}
}

type SupplierFn = dyn Fn() -> Box<dyn Component> + Send + Sync;

/// Shareable factory producing fresh [`Component`] instances.
///
/// Two suppliers are equal only when they are clones of the same factory.
#[derive(Clone)]
pub struct ComponentSupplier {
    factory: Arc<SupplierFn>,
}

impl ComponentSupplier {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn Component> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Supplier for components that need no behavior of their own.
    pub fn inert() -> Self {
        Self::new(|| Box::new(InertComponent))
    }

    pub fn instantiate(&self) -> Box<dyn Component> {
        (self.factory)()
    }
}

impl PartialEq for ComponentSupplier {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.factory, &other.factory)
    }
}

impl fmt::Debug for ComponentSupplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentSupplier({:p})", Arc::as_ptr(&self.factory) as *const ())
    }
}

#[derive(Debug, Default)]
struct InertComponent;

impl Component for InertComponent {}
