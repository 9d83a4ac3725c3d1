//! Named service container.
//!
//! Factories are registered by name with an ordered dependency list and are
//! instantiated eagerly, exactly once, by [`ServiceContainer::build`]. The
//! resulting [`Services`] map is read-only.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use plexus_core::{Container, Factory, PlexusError, Result, Service};
use tracing::{debug, info};

use crate::registrar::{Extension, ExtensionList};

struct Registration {
    depends: Vec<String>,
    factory: Factory,
}

#[derive(Default)]
pub struct ServiceContainer {
    registrations: HashMap<String, Registration>,
    /// Registration order; services are instantiated in this order.
    order: Vec<String>,
}

impl Container for ServiceContainer {
    fn factory(&mut self, name: &str, depends: Vec<String>, factory: Factory) -> Result<()> {
        if self.registrations.contains_key(name) {
            return Err(PlexusError::DuplicateService(name.to_string()));
        }
        debug!(service = name, depends = ?depends, "Registered factory");
        self.registrations
            .insert(name.to_string(), Registration { depends, factory });
        self.order.push(name.to_string());
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn depends(&self, name: &str) -> Option<&[String]> {
        self.registrations.get(name).map(|r| r.depends.as_slice())
    }

    /// Instantiate every registered service in dependency order.
    pub fn build(mut self) -> Result<Services> {
        for name in &self.order {
            for dependency in &self.registrations[name].depends {
                if !self.registrations.contains_key(dependency) {
                    return Err(PlexusError::UnknownDependency {
                        service: name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        let order = std::mem::take(&mut self.order);
        let mut built = HashMap::with_capacity(order.len());
        let mut stack = Vec::new();
        for name in &order {
            self.instantiate(name, &mut built, &mut stack)?;
        }

        info!(services = built.len(), "Service container built");
        Ok(Services {
            services: built,
            order,
        })
    }

    fn instantiate(
        &mut self,
        name: &str,
        built: &mut HashMap<String, Service>,
        stack: &mut Vec<String>,
    ) -> Result<Service> {
        if let Some(service) = built.get(name) {
            return Ok(Arc::clone(service));
        }
        if let Some(pos) = stack.iter().position(|n| n == name) {
            let mut cycle = stack[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(PlexusError::DependencyCycle(cycle));
        }
        let Some(registration) = self.registrations.remove(name) else {
            return Err(PlexusError::UnknownDependency {
                service: stack.last().cloned().unwrap_or_default(),
                dependency: name.to_string(),
            });
        };

        stack.push(name.to_string());
        let mut dependencies = Vec::with_capacity(registration.depends.len());
        for dependency in &registration.depends {
            dependencies.push(self.instantiate(dependency, built, stack)?);
        }
        stack.pop();

        let service = (registration.factory)(dependencies.as_slice()).map_err(|e| PlexusError::FactoryFailed {
            service: name.to_string(),
            message: format!("{e:#}"),
        })?;
        debug!(service = name, "Instantiated service");
        built.insert(name.to_string(), Arc::clone(&service));
        Ok(service)
    }
}

/// Instantiated services, keyed by name.
pub struct Services {
    services: HashMap<String, Service>,
    order: Vec<String>,
}

impl Services {
    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Typed lookup.
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let service = self
            .services
            .get(name)
            .ok_or_else(|| PlexusError::ServiceNotFound(name.to_string()))?;
        Arc::clone(service)
            .downcast::<T>()
            .map_err(|_| PlexusError::TypeMismatch {
                service: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn extension(&self, name: &str) -> Result<Arc<Extension>> {
        self.get_as::<Extension>(name)
    }

    /// A synthesized category collection, looked up by its full service name.
    pub fn collection(&self, name: &str) -> Result<Arc<ExtensionList>> {
        self.get_as::<ExtensionList>(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Service names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
