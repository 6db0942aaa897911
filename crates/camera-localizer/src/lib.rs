//! CameraLocalizer image-effect plugin.
//!
//! The plugin localizes the camera(s) of an image sequence against an
//! existing openMVG 3D reconstruction. This crate holds everything around
//! the localization core:
//! - the parameter contract (names, option lists, defaults, ranges) written
//!   into a host-agnostic [`camera_localizer_core::EffectDescriptor`],
//! - the plugin registry a host enumerates,
//! - the typed settings snapshot handed to the localization core,
//! - the live instance reacting to parameter edits, with its per-frame
//!   results cache.
//!
//! ## Quickstart
//!
//! ```
//! use camera_localizer::{plugin_registry, PLUGIN_IDENTIFIER};
//! use camera_localizer_core::ContextKind;
//!
//! let registry = plugin_registry();
//! let desc = registry
//!     .describe_plugin(PLUGIN_IDENTIFIER, ContextKind::General)
//!     .expect("valid descriptor");
//! assert!(desc.clip("Source").is_some());
//! ```
//!
//! ## API map
//! - [`definition`]: parameter names, choice enums, plugin identity.
//! - [`factory`]: `describe` / `describe_in_context`.
//! - [`registry`]: [`PluginFactory`], [`PluginRegistry`], [`plugin_registry`].
//! - [`settings`]: [`LocalizerSettings`] snapshot and its checks.
//! - [`instance`]: [`CameraLocalizerInstance`].
//! - [`cache`]: [`ResultsCache`] and the output camera values.
//! - [`rig`]: [`RelativePose`] and rig calibration files.

pub mod cache;
pub mod definition;
pub mod factory;
pub mod instance;
pub mod registry;
pub mod rig;
pub mod settings;

pub use cache::{
    CacheError, CameraIntrinsics, CameraPose, CameraResult, FrameResult, LocalizationStats,
    OutputCameraValues, ResultsCache,
};
pub use definition::{MAX_INPUTS, PLUGIN_IDENTIFIER};
pub use factory::CameraLocalizerFactory;
pub use instance::{
    CameraLocalizerInstance, InstanceError, InvalidationState, ParamChange, SfmDataSummary,
};
pub use registry::{plugin_registry, PluginFactory, PluginInstance, PluginRegistry, RegistryError};
pub use rig::{RelativePose, RigCalibration, RigError};
pub use settings::{
    AdvancedSettings, InputSettings, LocalizerSettings, OverlaySettings, SettingsError,
    TrackingSettings,
};
