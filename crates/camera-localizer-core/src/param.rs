//! Parameter descriptors.
//!
//! A parameter is described once by the plugin factory and then instantiated
//! by the host. The descriptor carries the static contract: kind, default,
//! hard range, display range and the behavioural flags the host honours.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Maximum of an unbounded integer range (the host's "infinite max" flag).
pub const INFINITE_MAX_INT: i32 = i32::MAX;
/// Minimum of an unbounded integer range.
pub const INFINITE_MIN_INT: i32 = i32::MIN;
/// Maximum of an unbounded double range.
pub const INFINITE_MAX_DOUBLE: f64 = f64::MAX;
/// Minimum of an unbounded double range.
pub const INFINITE_MIN_DOUBLE: f64 = -f64::MAX;

/// Inclusive `[min, max]` range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T> Range<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl Range<i32> {
    pub const fn unbounded() -> Self {
        Self::new(INFINITE_MIN_INT, INFINITE_MAX_INT)
    }

    #[inline]
    pub fn contains(&self, v: i32) -> bool {
        (self.min..=self.max).contains(&v)
    }

    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }
}

impl Range<f64> {
    pub const fn unbounded() -> Self {
        Self::new(INFINITE_MIN_DOUBLE, INFINITE_MAX_DOUBLE)
    }

    /// NaN is never contained.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Clamp into the range. NaN stays NaN.
    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        if v.is_nan() {
            v
        } else {
            v.max(self.min).min(self.max)
        }
    }
}

impl<const N: usize> Range<[f64; N]> {
    pub const fn unbounded() -> Self {
        Self::new([INFINITE_MIN_DOUBLE; N], [INFINITE_MAX_DOUBLE; N])
    }

    pub fn contains(&self, v: &[f64; N]) -> bool {
        (0..N).all(|i| v[i] >= self.min[i] && v[i] <= self.max[i])
    }

    pub fn is_ordered(&self) -> bool {
        (0..N).all(|i| self.min[i] <= self.max[i])
    }

    pub fn clamp(&self, v: [f64; N]) -> [f64; N] {
        std::array::from_fn(|i| Range::new(self.min[i], self.max[i]).clamp(v[i]))
    }
}

/// Layout hint recorded for the host UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutHint {
    #[default]
    Normal,
    /// Draw a separator after this parameter.
    Divider,
    /// Keep the next parameter on the same row.
    NoNewLine,
}

/// Interpretation of a string parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringType {
    #[default]
    SingleLine,
    FilePath,
    DirectoryPath,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupParam {
    /// Displayed as a tab rather than a collapsible group.
    pub tab: bool,
    pub open: bool,
}

impl Default for GroupParam {
    fn default() -> Self {
        Self {
            tab: false,
            open: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolParam {
    pub default: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntParam {
    pub default: i32,
    pub range: Range<i32>,
    pub display_range: Range<i32>,
}

impl Default for IntParam {
    fn default() -> Self {
        Self {
            default: 0,
            range: Range::<i32>::unbounded(),
            display_range: Range::<i32>::unbounded(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoubleParam {
    pub default: f64,
    pub range: Range<f64>,
    pub display_range: Range<f64>,
}

impl Default for DoubleParam {
    fn default() -> Self {
        Self {
            default: 0.0,
            range: Range::<f64>::unbounded(),
            display_range: Range::<f64>::unbounded(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Double2DParam {
    pub default: [f64; 2],
    pub range: Range<[f64; 2]>,
    pub display_range: Range<[f64; 2]>,
    /// Whether the host may draw its own on-canvas handle for this point.
    pub use_host_overlay_handle: bool,
}

impl Default for Double2DParam {
    fn default() -> Self {
        Self {
            default: [0.0; 2],
            range: Range::<[f64; 2]>::unbounded(),
            display_range: Range::<[f64; 2]>::unbounded(),
            use_host_overlay_handle: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Double3DParam {
    pub default: [f64; 3],
    pub range: Range<[f64; 3]>,
    pub display_range: Range<[f64; 3]>,
}

impl Default for Double3DParam {
    fn default() -> Self {
        Self {
            default: [0.0; 3],
            range: Range::<[f64; 3]>::unbounded(),
            display_range: Range::<[f64; 3]>::unbounded(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceParam {
    pub options: Vec<String>,
    pub default: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StringParam {
    pub default: String,
    pub string_type: StringType,
    /// Host should only accept paths that exist.
    pub file_path_exists: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PushButtonParam {}

/// Kind-specific part of a parameter descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamKind {
    Group(GroupParam),
    Bool(BoolParam),
    Int(IntParam),
    Double(DoubleParam),
    #[serde(rename = "double2d")]
    Double2D(Double2DParam),
    #[serde(rename = "double3d")]
    Double3D(Double3DParam),
    Choice(ChoiceParam),
    String(StringParam),
    PushButton(PushButtonParam),
}

impl ParamKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::Group(_) => "group",
            ParamKind::Bool(_) => "bool",
            ParamKind::Int(_) => "int",
            ParamKind::Double(_) => "double",
            ParamKind::Double2D(_) => "double2d",
            ParamKind::Double3D(_) => "double3d",
            ParamKind::Choice(_) => "choice",
            ParamKind::String(_) => "string",
            ParamKind::PushButton(_) => "push_button",
        }
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        matches!(self, ParamKind::Group(_))
    }
}

/// Static description of one parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub hint: String,
    /// Name of the enclosing group parameter.
    #[serde(default)]
    pub parent: Option<String>,
    pub enabled: bool,
    /// Hidden from the UI but still persisted by the host.
    pub secret: bool,
    pub animates: bool,
    pub evaluate_on_change: bool,
    pub can_undo: bool,
    #[serde(default)]
    pub layout_hint: LayoutHint,
    pub kind: ParamKind,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            label: String::new(),
            hint: String::new(),
            parent: None,
            enabled: true,
            secret: false,
            animates: true,
            evaluate_on_change: true,
            can_undo: true,
            layout_hint: LayoutHint::Normal,
            kind,
        }
    }
}

/// Maps a concrete kind struct out of [`ParamKind`].
pub trait ParamKindAccess: Sized {
    fn access(kind: &mut ParamKind) -> Option<&mut Self>;
}

macro_rules! impl_kind_access {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl ParamKindAccess for $ty {
                fn access(kind: &mut ParamKind) -> Option<&mut Self> {
                    match kind {
                        ParamKind::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_kind_access!(
    GroupParam => Group,
    BoolParam => Bool,
    IntParam => Int,
    DoubleParam => Double,
    Double2DParam => Double2D,
    Double3DParam => Double3D,
    ChoiceParam => Choice,
    StringParam => String,
    PushButtonParam => PushButton,
);

/// Chainable setter handle returned by the `define_*_param` methods.
///
/// `T` pins the parameter kind so only the relevant setters are offered.
pub struct ParamBuilder<'a, T> {
    param: &'a mut ParamDescriptor,
    _kind: PhantomData<T>,
}

impl<'a, T: ParamKindAccess> ParamBuilder<'a, T> {
    pub(crate) fn new(param: &'a mut ParamDescriptor) -> Self {
        Self {
            param,
            _kind: PhantomData,
        }
    }

    fn with_kind(self, f: impl FnOnce(&mut T)) -> Self {
        if let Some(kind) = T::access(&mut self.param.kind) {
            f(kind);
        }
        self
    }

    /// Name of the parameter being built.
    pub fn name(&self) -> &str {
        &self.param.name
    }

    pub fn label(self, label: impl Into<String>) -> Self {
        self.param.label = label.into();
        self
    }

    pub fn hint(self, hint: impl Into<String>) -> Self {
        self.param.hint = hint.into();
        self
    }

    pub fn parent(self, group: &str) -> Self {
        self.param.parent = Some(group.to_owned());
        self
    }

    pub fn enabled(self, enabled: bool) -> Self {
        self.param.enabled = enabled;
        self
    }

    pub fn secret(self, secret: bool) -> Self {
        self.param.secret = secret;
        self
    }

    pub fn animates(self, animates: bool) -> Self {
        self.param.animates = animates;
        self
    }

    pub fn evaluate_on_change(self, evaluate: bool) -> Self {
        self.param.evaluate_on_change = evaluate;
        self
    }

    pub fn can_undo(self, can_undo: bool) -> Self {
        self.param.can_undo = can_undo;
        self
    }

    pub fn layout_hint(self, hint: LayoutHint) -> Self {
        self.param.layout_hint = hint;
        self
    }
}

impl ParamBuilder<'_, GroupParam> {
    pub fn as_tab(self) -> Self {
        self.with_kind(|g| g.tab = true)
    }

    pub fn open(self, open: bool) -> Self {
        self.with_kind(|g| g.open = open)
    }
}

impl ParamBuilder<'_, BoolParam> {
    pub fn default_value(self, v: bool) -> Self {
        self.with_kind(|p| p.default = v)
    }
}

impl ParamBuilder<'_, IntParam> {
    pub fn default_value(self, v: i32) -> Self {
        self.with_kind(|p| p.default = v)
    }

    pub fn range(self, min: i32, max: i32) -> Self {
        self.with_kind(|p| p.range = Range::new(min, max))
    }

    pub fn display_range(self, min: i32, max: i32) -> Self {
        self.with_kind(|p| p.display_range = Range::new(min, max))
    }
}

impl ParamBuilder<'_, DoubleParam> {
    pub fn default_value(self, v: f64) -> Self {
        self.with_kind(|p| p.default = v)
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.with_kind(|p| p.range = Range::new(min, max))
    }

    pub fn display_range(self, min: f64, max: f64) -> Self {
        self.with_kind(|p| p.display_range = Range::new(min, max))
    }
}

impl ParamBuilder<'_, Double2DParam> {
    pub fn default_value(self, x: f64, y: f64) -> Self {
        self.with_kind(|p| p.default = [x, y])
    }

    pub fn range(self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        self.with_kind(|p| p.range = Range::new([min_x, min_y], [max_x, max_y]))
    }

    pub fn display_range(self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        self.with_kind(|p| p.display_range = Range::new([min_x, min_y], [max_x, max_y]))
    }

    pub fn use_host_overlay_handle(self, use_handle: bool) -> Self {
        self.with_kind(|p| p.use_host_overlay_handle = use_handle)
    }
}

impl ParamBuilder<'_, Double3DParam> {
    pub fn default_value(self, x: f64, y: f64, z: f64) -> Self {
        self.with_kind(|p| p.default = [x, y, z])
    }

    pub fn range(self, min: [f64; 3], max: [f64; 3]) -> Self {
        self.with_kind(|p| p.range = Range::new(min, max))
    }

    pub fn display_range(self, min: [f64; 3], max: [f64; 3]) -> Self {
        self.with_kind(|p| p.display_range = Range::new(min, max))
    }
}

impl ParamBuilder<'_, ChoiceParam> {
    pub fn append_option(self, option: impl Into<String>) -> Self {
        let option = option.into();
        self.with_kind(|p| p.options.push(option))
    }

    pub fn append_options<S: AsRef<str>>(self, options: &[S]) -> Self {
        self.with_kind(|p| {
            p.options
                .extend(options.iter().map(|o| o.as_ref().to_owned()))
        })
    }

    pub fn default_value(self, index: usize) -> Self {
        self.with_kind(|p| p.default = index)
    }
}

impl ParamBuilder<'_, StringParam> {
    pub fn default_value(self, v: impl Into<String>) -> Self {
        let v = v.into();
        self.with_kind(|p| p.default = v)
    }

    pub fn string_type(self, string_type: StringType) -> Self {
        self.with_kind(|p| p.string_type = string_type)
    }

    pub fn file_path_exists(self, must_exist: bool) -> Self {
        self.with_kind(|p| p.file_path_exists = must_exist)
    }
}
