//! Runtime parameter values of an effect instance.

use crate::effect::EffectDescriptor;
use crate::param::{ParamDescriptor, ParamKind, Range};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value currently held by a parameter instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    /// Groups and push buttons hold no value.
    None,
    Bool(bool),
    Int(i32),
    Double(f64),
    #[serde(rename = "double2d")]
    Double2D([f64; 2]),
    #[serde(rename = "double3d")]
    Double3D([f64; 3]),
    Choice(usize),
    String(String),
}

impl ParamValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::None => "none",
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Double(_) => "double",
            ParamValue::Double2D(_) => "double2d",
            ParamValue::Double3D(_) => "double3d",
            ParamValue::Choice(_) => "choice",
            ParamValue::String(_) => "string",
        }
    }

    /// The default value a descriptor instantiates to.
    pub fn default_for(kind: &ParamKind) -> Self {
        match kind {
            ParamKind::Group(_) | ParamKind::PushButton(_) => ParamValue::None,
            ParamKind::Bool(p) => ParamValue::Bool(p.default),
            ParamKind::Int(p) => ParamValue::Int(p.default),
            ParamKind::Double(p) => ParamValue::Double(p.default),
            ParamKind::Double2D(p) => ParamValue::Double2D(p.default),
            ParamKind::Double3D(p) => ParamValue::Double3D(p.default),
            ParamKind::Choice(p) => ParamValue::Choice(p.default),
            ParamKind::String(p) => ParamValue::String(p.default.clone()),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter `{0}`")]
    UnknownParam(String),
    #[error("parameter `{name}` is {found}, not {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("value {value} is outside the range of parameter `{name}`")]
    OutOfRange { name: String, value: String },
    #[error("option {index} does not exist for choice `{name}` ({options} options)")]
    ChoiceOutOfRange {
        name: String,
        index: usize,
        options: usize,
    },
}

#[derive(Clone, Debug, Serialize)]
struct ParamSlot {
    #[serde(skip)]
    descriptor: ParamDescriptor,
    name: String,
    value: ParamValue,
    enabled: bool,
    secret: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_range: Option<Range<i32>>,
}

/// Ordered parameter values keyed by name, plus the per-instance UI state
/// (enabled, secret, int display range) the plugin may change at runtime.
#[derive(Clone, Debug, Serialize)]
pub struct ParamSet {
    params: Vec<ParamSlot>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ParamSet {
    /// Instantiate every parameter of `desc` at its default.
    pub fn from_descriptor(desc: &EffectDescriptor) -> Self {
        let mut params = Vec::with_capacity(desc.params().len());
        let mut index = HashMap::with_capacity(desc.params().len());
        for p in desc.params() {
            if index.contains_key(&p.name) {
                log::warn!("duplicate parameter `{}` ignored", p.name);
                continue;
            }
            index.insert(p.name.clone(), params.len());
            params.push(ParamSlot {
                descriptor: p.clone(),
                name: p.name.clone(),
                value: ParamValue::default_for(&p.kind),
                enabled: p.enabled,
                secret: p.secret,
                display_range: None,
            });
        }
        Self { params, index }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|s| s.name.as_str())
    }

    fn slot(&self, name: &str) -> Result<&ParamSlot, ParamError> {
        self.index
            .get(name)
            .map(|&i| &self.params[i])
            .ok_or_else(|| ParamError::UnknownParam(name.to_owned()))
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut ParamSlot, ParamError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.params[i]),
            None => Err(ParamError::UnknownParam(name.to_owned())),
        }
    }

    pub fn descriptor(&self, name: &str) -> Result<&ParamDescriptor, ParamError> {
        Ok(&self.slot(name)?.descriptor)
    }

    pub fn value(&self, name: &str) -> Result<&ParamValue, ParamError> {
        Ok(&self.slot(name)?.value)
    }

    /// Set a value after checking its kind and hard range.
    pub fn set_value(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let slot = self.slot_mut(name)?;
        check_value(&slot.descriptor, &value)?;
        slot.value = value;
        Ok(())
    }

    /// Set a value the way a host writes a read-only output: numbers are
    /// clamped into the hard range first. Returns whether clamping changed
    /// the value. NaN and kind mismatches are still rejected.
    pub fn set_value_clamped(
        &mut self,
        name: &str,
        value: ParamValue,
    ) -> Result<bool, ParamError> {
        let clamped = clamp_value(&self.slot(name)?.descriptor.kind, &value);
        let changed = clamped != value;
        self.set_value(name, clamped)?;
        Ok(changed)
    }

    /// Restore the descriptor default.
    pub fn reset(&mut self, name: &str) -> Result<(), ParamError> {
        let slot = self.slot_mut(name)?;
        slot.value = ParamValue::default_for(&slot.descriptor.kind);
        Ok(())
    }

    fn mismatch(&self, name: &str, expected: &'static str) -> ParamError {
        let found = self
            .value(name)
            .map(ParamValue::type_name)
            .unwrap_or("unknown");
        ParamError::KindMismatch {
            name: name.to_owned(),
            expected,
            found,
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ParamError> {
        match self.value(name)? {
            ParamValue::Bool(v) => Ok(*v),
            _ => Err(self.mismatch(name, "bool")),
        }
    }

    pub fn get_int(&self, name: &str) -> Result<i32, ParamError> {
        match self.value(name)? {
            ParamValue::Int(v) => Ok(*v),
            _ => Err(self.mismatch(name, "int")),
        }
    }

    pub fn get_double(&self, name: &str) -> Result<f64, ParamError> {
        match self.value(name)? {
            ParamValue::Double(v) => Ok(*v),
            _ => Err(self.mismatch(name, "double")),
        }
    }

    pub fn get_double2d(&self, name: &str) -> Result<[f64; 2], ParamError> {
        match self.value(name)? {
            ParamValue::Double2D(v) => Ok(*v),
            _ => Err(self.mismatch(name, "double2d")),
        }
    }

    pub fn get_double3d(&self, name: &str) -> Result<[f64; 3], ParamError> {
        match self.value(name)? {
            ParamValue::Double3D(v) => Ok(*v),
            _ => Err(self.mismatch(name, "double3d")),
        }
    }

    pub fn get_choice(&self, name: &str) -> Result<usize, ParamError> {
        match self.value(name)? {
            ParamValue::Choice(v) => Ok(*v),
            _ => Err(self.mismatch(name, "choice")),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<&str, ParamError> {
        match self.value(name)? {
            ParamValue::String(v) => Ok(v.as_str()),
            _ => Err(self.mismatch(name, "string")),
        }
    }

    pub fn set_bool(&mut self, name: &str, v: bool) -> Result<(), ParamError> {
        self.set_value(name, ParamValue::Bool(v))
    }

    pub fn set_int(&mut self, name: &str, v: i32) -> Result<(), ParamError> {
        self.set_value(name, ParamValue::Int(v))
    }

    pub fn set_double(&mut self, name: &str, v: f64) -> Result<(), ParamError> {
        self.set_value(name, ParamValue::Double(v))
    }

    pub fn set_double2d(&mut self, name: &str, v: [f64; 2]) -> Result<(), ParamError> {
        self.set_value(name, ParamValue::Double2D(v))
    }

    pub fn set_double3d(&mut self, name: &str, v: [f64; 3]) -> Result<(), ParamError> {
        self.set_value(name, ParamValue::Double3D(v))
    }

    pub fn set_choice(&mut self, name: &str, index: usize) -> Result<(), ParamError> {
        self.set_value(name, ParamValue::Choice(index))
    }

    pub fn set_string(&mut self, name: &str, v: impl Into<String>) -> Result<(), ParamError> {
        self.set_value(name, ParamValue::String(v.into()))
    }

    pub fn is_enabled(&self, name: &str) -> Result<bool, ParamError> {
        Ok(self.slot(name)?.enabled)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), ParamError> {
        self.slot_mut(name)?.enabled = enabled;
        Ok(())
    }

    pub fn is_secret(&self, name: &str) -> Result<bool, ParamError> {
        Ok(self.slot(name)?.secret)
    }

    pub fn set_secret(&mut self, name: &str, secret: bool) -> Result<(), ParamError> {
        self.slot_mut(name)?.secret = secret;
        Ok(())
    }

    /// Display range of an int parameter, honouring runtime overrides.
    pub fn int_display_range(&self, name: &str) -> Result<Range<i32>, ParamError> {
        let slot = self.slot(name)?;
        match (&slot.descriptor.kind, slot.display_range) {
            (ParamKind::Int(_), Some(range)) => Ok(range),
            (ParamKind::Int(p), None) => Ok(p.display_range),
            _ => Err(self.mismatch(name, "int")),
        }
    }

    pub fn set_int_display_range(
        &mut self,
        name: &str,
        min: i32,
        max: i32,
    ) -> Result<(), ParamError> {
        if !matches!(self.slot(name)?.descriptor.kind, ParamKind::Int(_)) {
            return Err(self.mismatch(name, "int"));
        }
        self.slot_mut(name)?.display_range = Some(Range::new(min, max));
        Ok(())
    }
}

fn clamp_value(kind: &ParamKind, value: &ParamValue) -> ParamValue {
    match (kind, value) {
        (ParamKind::Int(p), ParamValue::Int(v)) => {
            ParamValue::Int((*v).clamp(p.range.min, p.range.max.max(p.range.min)))
        }
        (ParamKind::Double(p), ParamValue::Double(v)) => ParamValue::Double(p.range.clamp(*v)),
        (ParamKind::Double2D(p), ParamValue::Double2D(v)) => {
            ParamValue::Double2D(p.range.clamp(*v))
        }
        (ParamKind::Double3D(p), ParamValue::Double3D(v)) => {
            ParamValue::Double3D(p.range.clamp(*v))
        }
        _ => value.clone(),
    }
}

fn check_value(desc: &ParamDescriptor, value: &ParamValue) -> Result<(), ParamError> {
    let out_of_range = || ParamError::OutOfRange {
        name: desc.name.clone(),
        value: format!("{value:?}"),
    };
    match (&desc.kind, value) {
        (ParamKind::Group(_) | ParamKind::PushButton(_), ParamValue::None) => Ok(()),
        (ParamKind::Bool(_), ParamValue::Bool(_)) => Ok(()),
        (ParamKind::String(_), ParamValue::String(_)) => Ok(()),
        (ParamKind::Int(p), ParamValue::Int(v)) => {
            p.range.contains(*v).then_some(()).ok_or_else(out_of_range)
        }
        (ParamKind::Double(p), ParamValue::Double(v)) => {
            p.range.contains(*v).then_some(()).ok_or_else(out_of_range)
        }
        (ParamKind::Double2D(p), ParamValue::Double2D(v)) => {
            p.range.contains(v).then_some(()).ok_or_else(out_of_range)
        }
        (ParamKind::Double3D(p), ParamValue::Double3D(v)) => {
            p.range.contains(v).then_some(()).ok_or_else(out_of_range)
        }
        (ParamKind::Choice(p), ParamValue::Choice(i)) => {
            if *i < p.options.len() {
                Ok(())
            } else {
                Err(ParamError::ChoiceOutOfRange {
                    name: desc.name.clone(),
                    index: *i,
                    options: p.options.len(),
                })
            }
        }
        (kind, value) => Err(ParamError::KindMismatch {
            name: desc.name.clone(),
            expected: kind.type_name(),
            found: value.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParamSet {
        let mut desc = EffectDescriptor::new();
        desc.define_group_param("main").as_tab();
        desc.define_int_param("index")
            .range(0, 5)
            .display_range(0, 0)
            .parent("main");
        desc.define_double_param("coef").range(-1.0, 1.0);
        desc.define_choice_param("mode")
            .append_options(&["known", "unknown"])
            .default_value(1);
        desc.define_string_param("path").default_value("/tmp/tree");
        desc.define_push_button_param("clear");
        ParamSet::from_descriptor(&desc)
    }

    #[test]
    fn starts_at_defaults() {
        let params = sample();
        assert_eq!(params.len(), 6);
        assert_eq!(params.get_int("index"), Ok(0));
        assert_eq!(params.get_choice("mode"), Ok(1));
        assert_eq!(params.get_string("path"), Ok("/tmp/tree"));
        assert_eq!(params.value("clear"), Ok(&ParamValue::None));
    }

    #[test]
    fn setters_enforce_hard_range() {
        let mut params = sample();
        params.set_int("index", 5).expect("in range");
        assert!(matches!(
            params.set_int("index", 6),
            Err(ParamError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set_double("coef", f64::NAN),
            Err(ParamError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set_choice("mode", 2),
            Err(ParamError::ChoiceOutOfRange { options: 2, .. })
        ));
        assert_eq!(params.get_int("index"), Ok(5));
    }

    #[test]
    fn clamped_setter_keeps_values_in_range() {
        let mut params = sample();
        assert_eq!(
            params.set_value_clamped("coef", ParamValue::Double(1.5)),
            Ok(true)
        );
        assert_eq!(params.get_double("coef"), Ok(1.0));
        assert_eq!(
            params.set_value_clamped("coef", ParamValue::Double(-0.25)),
            Ok(false)
        );
        assert_eq!(params.get_double("coef"), Ok(-0.25));
        assert_eq!(
            params.set_value_clamped("index", ParamValue::Int(-3)),
            Ok(true)
        );
        assert_eq!(params.get_int("index"), Ok(0));
        assert!(matches!(
            params.set_value_clamped("coef", ParamValue::Double(f64::NAN)),
            Err(ParamError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set_value_clamped("coef", ParamValue::Bool(true)),
            Err(ParamError::KindMismatch { .. })
        ));
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let mut params = sample();
        assert_eq!(
            params.set_bool("coef", true),
            Err(ParamError::KindMismatch {
                name: "coef".into(),
                expected: "double",
                found: "bool"
            })
        );
        assert!(matches!(
            params.get_string("index"),
            Err(ParamError::KindMismatch { .. })
        ));
        assert_eq!(
            params.get_int("missing"),
            Err(ParamError::UnknownParam("missing".into()))
        );
    }

    #[test]
    fn display_range_override() {
        let mut params = sample();
        assert_eq!(params.int_display_range("index"), Ok(Range::new(0, 0)));
        params
            .set_int_display_range("index", 0, 3)
            .expect("override");
        assert_eq!(params.int_display_range("index"), Ok(Range::new(0, 3)));
        assert!(params.set_int_display_range("coef", 0, 1).is_err());
    }

    #[test]
    fn reset_restores_default() {
        let mut params = sample();
        params.set_double("coef", 0.5).expect("set");
        params.reset("coef").expect("reset");
        assert_eq!(params.get_double("coef"), Ok(0.0));
    }
}
