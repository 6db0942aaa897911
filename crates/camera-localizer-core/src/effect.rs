//! Image-effect and clip descriptors.

use crate::param::{
    BoolParam, ChoiceParam, Double2DParam, Double3DParam, DoubleParam, GroupParam, IntParam,
    ParamBuilder, ParamDescriptor, ParamKind, ParamKindAccess, PushButtonParam, StringParam,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Name of the mandatory output clip.
pub const OUTPUT_CLIP_NAME: &str = "Output";
/// Name of the main source clip in filter-like contexts.
pub const SOURCE_CLIP_NAME: &str = "Source";

/// Context the host instantiates an effect in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Filter,
    General,
    Paint,
    Generator,
}

impl ContextKind {
    pub const ALL: [ContextKind; 4] = [
        ContextKind::Filter,
        ContextKind::General,
        ContextKind::Paint,
        ContextKind::Generator,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContextKind::Filter => "filter",
            ContextKind::General => "general",
            ContextKind::Paint => "paint",
            ContextKind::Generator => "generator",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Contexts that require a `Source` clip.
    #[inline]
    pub fn requires_source(self) -> bool {
        !matches!(self, ContextKind::Generator)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    UByte,
    UShort,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelComponent {
    Rgba,
    Rgb,
    Alpha,
}

/// Host-visible labels of an effect (short, normal and long forms).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectLabels {
    pub short: String,
    pub normal: String,
    pub long: String,
}

/// Behaviour flags negotiated with the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectFlags {
    pub single_instance: bool,
    pub host_frame_threading: bool,
    pub supports_multi_resolution: bool,
    pub supports_tiles: bool,
    pub temporal_clip_access: bool,
    pub render_twice_always: bool,
    pub supports_multiple_clip_pars: bool,
}

impl Default for EffectFlags {
    fn default() -> Self {
        // Host-side defaults.
        Self {
            single_instance: false,
            host_frame_threading: true,
            supports_multi_resolution: true,
            supports_tiles: true,
            temporal_clip_access: false,
            render_twice_always: true,
            supports_multiple_clip_pars: false,
        }
    }
}

/// One input or output clip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipDescriptor {
    pub name: String,
    pub components: Vec<PixelComponent>,
    pub temporal_clip_access: bool,
    pub supports_tiles: bool,
    pub is_mask: bool,
    pub optional: bool,
}

impl ClipDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            temporal_clip_access: false,
            supports_tiles: true,
            is_mask: false,
            optional: false,
        }
    }

    pub fn add_supported_component(&mut self, component: PixelComponent) -> &mut Self {
        if !self.components.contains(&component) {
            self.components.push(component);
        }
        self
    }

    pub fn temporal_clip_access(&mut self, enabled: bool) -> &mut Self {
        self.temporal_clip_access = enabled;
        self
    }

    pub fn supports_tiles(&mut self, enabled: bool) -> &mut Self {
        self.supports_tiles = enabled;
        self
    }

    pub fn is_mask(&mut self, is_mask: bool) -> &mut Self {
        self.is_mask = is_mask;
        self
    }

    pub fn optional(&mut self, optional: bool) -> &mut Self {
        self.optional = optional;
        self
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DescriptorIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Full description of an image effect: effect-level properties, clips and
/// the ordered parameter list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectDescriptor {
    pub labels: EffectLabels,
    pub grouping: String,
    pub description: String,
    pub contexts: Vec<ContextKind>,
    pub bit_depths: Vec<BitDepth>,
    pub flags: EffectFlags,
    pub overlay_interact: bool,
    clips: Vec<ClipDescriptor>,
    params: Vec<ParamDescriptor>,
}

impl EffectDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_labels(
        &mut self,
        short: impl Into<String>,
        normal: impl Into<String>,
        long: impl Into<String>,
    ) {
        self.labels = EffectLabels {
            short: short.into(),
            normal: normal.into(),
            long: long.into(),
        };
    }

    pub fn set_grouping(&mut self, grouping: impl Into<String>) {
        self.grouping = grouping.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn add_supported_context(&mut self, context: ContextKind) {
        if !self.contexts.contains(&context) {
            self.contexts.push(context);
        }
    }

    pub fn add_supported_bit_depth(&mut self, depth: BitDepth) {
        if !self.bit_depths.contains(&depth) {
            self.bit_depths.push(depth);
        }
    }

    pub fn supports_context(&self, context: ContextKind) -> bool {
        self.contexts.contains(&context)
    }

    /// Define a new clip. Duplicates are reported by `validate`.
    pub fn define_clip(&mut self, name: impl Into<String>) -> &mut ClipDescriptor {
        self.clips.push(ClipDescriptor::new(name));
        let last = self.clips.len() - 1;
        &mut self.clips[last]
    }

    fn define<T: ParamKindAccess>(
        &mut self,
        name: impl Into<String>,
        kind: ParamKind,
    ) -> ParamBuilder<'_, T> {
        self.params.push(ParamDescriptor::new(name, kind));
        let last = self.params.len() - 1;
        ParamBuilder::new(&mut self.params[last])
    }

    pub fn define_group_param(&mut self, name: impl Into<String>) -> ParamBuilder<'_, GroupParam> {
        self.define(name, ParamKind::Group(GroupParam::default()))
    }

    pub fn define_bool_param(&mut self, name: impl Into<String>) -> ParamBuilder<'_, BoolParam> {
        self.define(name, ParamKind::Bool(BoolParam::default()))
    }

    pub fn define_int_param(&mut self, name: impl Into<String>) -> ParamBuilder<'_, IntParam> {
        self.define(name, ParamKind::Int(IntParam::default()))
    }

    pub fn define_double_param(
        &mut self,
        name: impl Into<String>,
    ) -> ParamBuilder<'_, DoubleParam> {
        self.define(name, ParamKind::Double(DoubleParam::default()))
    }

    pub fn define_double2d_param(
        &mut self,
        name: impl Into<String>,
    ) -> ParamBuilder<'_, Double2DParam> {
        self.define(name, ParamKind::Double2D(Double2DParam::default()))
    }

    pub fn define_double3d_param(
        &mut self,
        name: impl Into<String>,
    ) -> ParamBuilder<'_, Double3DParam> {
        self.define(name, ParamKind::Double3D(Double3DParam::default()))
    }

    pub fn define_choice_param(
        &mut self,
        name: impl Into<String>,
    ) -> ParamBuilder<'_, ChoiceParam> {
        self.define(name, ParamKind::Choice(ChoiceParam::default()))
    }

    pub fn define_string_param(
        &mut self,
        name: impl Into<String>,
    ) -> ParamBuilder<'_, StringParam> {
        self.define(name, ParamKind::String(StringParam::default()))
    }

    pub fn define_push_button_param(
        &mut self,
        name: impl Into<String>,
    ) -> ParamBuilder<'_, PushButtonParam> {
        self.define(name, ParamKind::PushButton(PushButtonParam::default()))
    }

    #[inline]
    pub fn clips(&self) -> &[ClipDescriptor] {
        &self.clips
    }

    pub fn clip(&self, name: &str) -> Option<&ClipDescriptor> {
        self.clips.iter().find(|c| c.name == name)
    }

    #[inline]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParamDescriptor> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_mut(&mut self, name: &str) -> Option<&mut ParamDescriptor> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    /// Direct children of a group, in definition order.
    pub fn children<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a ParamDescriptor> {
        self.params
            .iter()
            .filter(move |p| p.parent.as_deref() == Some(group))
    }

    /// Group parameters displayed as tabs.
    pub fn tabs(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.params
            .iter()
            .filter(|p| matches!(&p.kind, ParamKind::Group(g) if g.tab))
    }

    /// Load a descriptor dump from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DescriptorIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this descriptor to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DescriptorIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
