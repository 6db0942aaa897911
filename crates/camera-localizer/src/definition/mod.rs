//! Identity of the CameraLocalizer plugin: names, option lists and the
//! environment it reads defaults from.

mod choices;
mod env;
mod names;

pub use choices::{
    Algorithm, Estimator, FeaturesPreset, FeaturesType, FocalLengthMode, LensDistortion,
    LensDistortionModel, RigMode, TrackingRangeMode,
};
pub use env::{
    default_voctree_path, EnvSource, ProcessEnv, ENV_DEFAULT_GENERIC_VOCTREE, ENV_OPENMVG_VOCTREE,
};
pub use names::*;

/// Host-visible plugin identifier.
pub const PLUGIN_IDENTIFIER: &str = "openmvg.cameralocalizer";
pub const PLUGIN_VERSION_MAJOR: u32 = 1;
pub const PLUGIN_VERSION_MINOR: u32 = 0;
pub const PLUGIN_GROUPING: &str = "openMVG";
