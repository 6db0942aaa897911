//! Plugin registry: the list of effect factories exposed to a host.

use crate::factory::CameraLocalizerFactory;
use crate::instance::{InstanceError, ParamChange};
use camera_localizer_core::{ContextKind, DescriptorError, EffectDescriptor, ParamSet};
use std::sync::OnceLock;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One effect a host can instantiate.
pub trait PluginFactory: Send + Sync {
    /// Reverse-domain identifier, stable across releases.
    fn identifier(&self) -> &'static str;
    /// `(major, minor)` version.
    fn version(&self) -> (u32, u32);
    /// Effect-level properties.
    fn describe(&self, desc: &mut EffectDescriptor);
    /// Clips and parameters for `context`.
    fn describe_in_context(&self, desc: &mut EffectDescriptor, context: ContextKind);
    fn create_instance(
        &self,
        desc: &EffectDescriptor,
        context: ContextKind,
    ) -> Box<dyn PluginInstance>;
}

/// A live effect instance.
pub trait PluginInstance: Send {
    fn params(&self) -> &ParamSet;
    fn params_mut(&mut self) -> &mut ParamSet;
    /// Called when the host (re)connects input clips.
    fn set_connected_inputs(&mut self, connected: usize) -> Result<(), InstanceError>;
    /// Called after the user edited parameter `name` at `time`.
    fn changed_param(&mut self, name: &str, time: f64) -> Result<ParamChange, InstanceError>;
}

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("no plugin registered as `{0}`")]
    UnknownPlugin(String),
    #[error("plugin `{plugin}` does not support the {context} context")]
    UnsupportedContext {
        plugin: String,
        context: &'static str,
    },
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Ordered set of plugin factories.
#[derive(Default)]
pub struct PluginRegistry {
    factories: Vec<Box<dyn PluginFactory>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory`. A second factory with the same identifier is ignored.
    pub fn register(&mut self, factory: Box<dyn PluginFactory>) {
        let id = factory.identifier();
        if self.find(id).is_some() {
            log::warn!("plugin `{id}` is already registered");
            return;
        }
        let (major, minor) = factory.version();
        log::info!("registered plugin {id} v{major}.{minor}");
        self.factories.push(factory);
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Identifiers of every registered plugin, in registration order.
    pub fn plugin_ids(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.identifier()).collect()
    }

    pub fn find(&self, id: &str) -> Option<&dyn PluginFactory> {
        self.factories
            .iter()
            .find(|f| f.identifier() == id)
            .map(|f| f.as_ref())
    }

    /// Build the full descriptor of plugin `id` in `context` and validate it.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn describe_plugin(
        &self,
        id: &str,
        context: ContextKind,
    ) -> Result<EffectDescriptor, RegistryError> {
        let factory = self
            .find(id)
            .ok_or_else(|| RegistryError::UnknownPlugin(id.to_owned()))?;

        let mut desc = EffectDescriptor::new();
        factory.describe(&mut desc);
        if !desc.supports_context(context) {
            return Err(RegistryError::UnsupportedContext {
                plugin: id.to_owned(),
                context: context.name(),
            });
        }
        factory.describe_in_context(&mut desc, context);
        desc.validate_for_context(context)?;
        Ok(desc)
    }

    /// Describe plugin `id` and create an instance over the described parameters.
    pub fn create_instance(
        &self,
        id: &str,
        context: ContextKind,
    ) -> Result<Box<dyn PluginInstance>, RegistryError> {
        let desc = self.describe_plugin(id, context)?;
        let factory = self
            .find(id)
            .ok_or_else(|| RegistryError::UnknownPlugin(id.to_owned()))?;
        Ok(factory.create_instance(&desc, context))
    }
}

/// Process-wide registry holding every plugin of this crate.
pub fn plugin_registry() -> &'static PluginRegistry {
    static REGISTRY: OnceLock<PluginRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(CameraLocalizerFactory::new()));
        registry
    })
}
