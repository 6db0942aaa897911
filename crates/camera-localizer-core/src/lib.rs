//! Host-agnostic model of an image-effect plugin's descriptors.
//!
//! An image-effect host asks a plugin to *describe* itself: effect-level
//! properties, input/output clips and an ordered list of parameters. This
//! crate records that description as plain data so it can be validated,
//! serialized, and instantiated into a [`ParamSet`] without a live host.
//!
//! ```
//! use camera_localizer_core::{ContextKind, EffectDescriptor, ParamSet, PixelComponent};
//!
//! let mut desc = EffectDescriptor::new();
//! desc.define_clip("Source").add_supported_component(PixelComponent::Rgba);
//! desc.define_clip("Output").add_supported_component(PixelComponent::Rgba);
//! desc.define_group_param("settings").as_tab();
//! desc.define_double_param("ratio")
//!     .parent("settings")
//!     .range(0.0, 1.0)
//!     .default_value(0.8);
//! desc.validate_for_context(ContextKind::Filter).unwrap();
//!
//! let params = ParamSet::from_descriptor(&desc);
//! assert_eq!(params.get_double("ratio").unwrap(), 0.8);
//! ```

mod effect;
mod logger;
mod param;
mod validate;
mod values;

pub use effect::{
    BitDepth, ClipDescriptor, ContextKind, DescriptorIoError, EffectDescriptor, EffectFlags,
    EffectLabels, PixelComponent, OUTPUT_CLIP_NAME, SOURCE_CLIP_NAME,
};
pub use param::{
    BoolParam, ChoiceParam, Double2DParam, Double3DParam, DoubleParam, GroupParam, IntParam,
    LayoutHint, ParamBuilder, ParamDescriptor, ParamKind, ParamKindAccess, PushButtonParam,
    Range, StringParam, StringType, INFINITE_MAX_DOUBLE, INFINITE_MAX_INT, INFINITE_MIN_DOUBLE,
    INFINITE_MIN_INT,
};
pub use validate::DescriptorError;
pub use values::{ParamError, ParamSet, ParamValue};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_verbosity, init_with_level, level_from_verbosity};
