//! Structural checks on a described effect.

use crate::effect::{ContextKind, EffectDescriptor, OUTPUT_CLIP_NAME, SOURCE_CLIP_NAME};
use crate::param::ParamKind;
use std::collections::HashSet;

/// Descriptor validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("parameter `{0}` is defined more than once")]
    DuplicateParam(String),
    #[error("clip `{0}` is defined more than once")]
    DuplicateClip(String),
    #[error("empty {0} name")]
    EmptyName(&'static str),
    #[error("parameter `{param}` references unknown parent `{parent}`")]
    UnknownParent { param: String, parent: String },
    #[error("parameter `{param}` has parent `{parent}` which is not a group")]
    ParentNotGroup { param: String, parent: String },
    #[error("parameter `{0}` has a range with min > max")]
    InvalidRange(String),
    #[error("default of parameter `{0}` lies outside its range")]
    DefaultOutOfRange(String),
    #[error("choice parameter `{0}` has no options")]
    EmptyChoice(String),
    #[error("choice parameter `{param}` defaults to option {default} of {options}")]
    ChoiceDefaultOutOfRange {
        param: String,
        default: usize,
        options: usize,
    },
    #[error("context `{context}` requires a clip named `{clip}`")]
    MissingClip {
        context: &'static str,
        clip: &'static str,
    },
}

impl EffectDescriptor {
    /// Check parameter and clip structure.
    ///
    /// Parents must be groups defined *before* their children, so a single
    /// forward pass is enough.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let mut clip_names = HashSet::new();
        for clip in self.clips() {
            if clip.name.is_empty() {
                return Err(DescriptorError::EmptyName("clip"));
            }
            if !clip_names.insert(clip.name.as_str()) {
                return Err(DescriptorError::DuplicateClip(clip.name.clone()));
            }
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut groups: HashSet<&str> = HashSet::new();
        for param in self.params() {
            let name = param.name.as_str();
            if name.is_empty() {
                return Err(DescriptorError::EmptyName("parameter"));
            }
            if !seen.insert(name) {
                return Err(DescriptorError::DuplicateParam(param.name.clone()));
            }
            if let Some(parent) = param.parent.as_deref() {
                if !groups.contains(parent) {
                    let err = if seen.contains(parent) {
                        DescriptorError::ParentNotGroup {
                            param: param.name.clone(),
                            parent: parent.to_owned(),
                        }
                    } else {
                        DescriptorError::UnknownParent {
                            param: param.name.clone(),
                            parent: parent.to_owned(),
                        }
                    };
                    return Err(err);
                }
            }
            if param.kind.is_group() {
                groups.insert(name);
            }
            check_kind(name, &param.kind)?;
        }
        Ok(())
    }

    /// `validate` plus the clips a context mandates.
    pub fn validate_for_context(&self, context: ContextKind) -> Result<(), DescriptorError> {
        self.validate()?;
        if self.clip(OUTPUT_CLIP_NAME).is_none() {
            return Err(DescriptorError::MissingClip {
                context: context.name(),
                clip: OUTPUT_CLIP_NAME,
            });
        }
        if context.requires_source() && self.clip(SOURCE_CLIP_NAME).is_none() {
            return Err(DescriptorError::MissingClip {
                context: context.name(),
                clip: SOURCE_CLIP_NAME,
            });
        }
        Ok(())
    }
}

fn check_kind(name: &str, kind: &ParamKind) -> Result<(), DescriptorError> {
    let (ordered, default_ok) = match kind {
        ParamKind::Int(p) => (
            p.range.is_ordered() && p.display_range.is_ordered(),
            p.range.contains(p.default),
        ),
        ParamKind::Double(p) => (
            p.range.is_ordered() && p.display_range.is_ordered(),
            p.range.contains(p.default),
        ),
        ParamKind::Double2D(p) => (
            p.range.is_ordered() && p.display_range.is_ordered(),
            p.range.contains(&p.default),
        ),
        ParamKind::Double3D(p) => (
            p.range.is_ordered() && p.display_range.is_ordered(),
            p.range.contains(&p.default),
        ),
        ParamKind::Choice(p) => {
            if p.options.is_empty() {
                return Err(DescriptorError::EmptyChoice(name.to_owned()));
            }
            if p.default >= p.options.len() {
                return Err(DescriptorError::ChoiceDefaultOutOfRange {
                    param: name.to_owned(),
                    default: p.default,
                    options: p.options.len(),
                });
            }
            (true, true)
        }
        ParamKind::Group(_)
        | ParamKind::Bool(_)
        | ParamKind::String(_)
        | ParamKind::PushButton(_) => (true, true),
    };
    if !ordered {
        return Err(DescriptorError::InvalidRange(name.to_owned()));
    }
    if !default_ok {
        return Err(DescriptorError::DefaultOutOfRange(name.to_owned()));
    }
    Ok(())
}
