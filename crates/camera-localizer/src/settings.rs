//! Typed snapshot of the parameter values consumed by the localization core.

use crate::definition::*;
use crate::rig::RelativePose;
use camera_localizer_core::{ParamError, ParamSet};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("parameter `{param}` must not be negative (got {value})")]
    NegativeValue { param: String, value: i32 },
    #[error("choice `{param}` has no option {index}")]
    InvalidChoice { param: String, index: usize },
    #[error("{connected} inputs connected, at most {max} are supported")]
    TooManyInputs { connected: usize, max: usize },
    #[error("no input clip is connected")]
    NoInputs,
    #[error("a reconstruction file is required")]
    MissingReconstruction,
    #[error("a vocabulary tree file is required")]
    MissingVoctree,
    #[error("distance ratio {0} must lie in (0, 1]")]
    InvalidDistanceRatio(f64),
    #[error("output index {index} does not address one of the {connected} connected inputs")]
    OutputIndexOutOfRange { index: usize, connected: usize },
    #[error("a known rig requires a rig calibration file")]
    MissingRigCalibration,
    #[error("tracking range {min}..={max} is empty")]
    InvalidTrackingRange { min: i32, max: i32 },
}

/// Per-input camera settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputSettings {
    pub grayscale: bool,
    pub lens_calibration_file: Option<PathBuf>,
    pub sensor_width: f64,
    pub optical_center: [f64; 2],
    pub focal_length_mode: FocalLengthMode,
    pub focal_length: f64,
    pub focal_length_varying: bool,
    pub distortion: LensDistortion,
    pub distortion_model: LensDistortionModel,
    /// The leading coefficients read by `distortion_model`.
    pub distortion_coefficients: Vec<f64>,
    /// `None` while the relative pose parameters are left at their defaults.
    pub relative_pose: Option<RelativePose>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvancedSettings {
    pub algorithm: Algorithm,
    pub matching_estimator: Estimator,
    pub resection_estimator: Estimator,
    /// `None` lets the estimator choose.
    pub reprojection_error: Option<f64>,
    pub nb_image_match: usize,
    /// `None` disables the cutoff.
    pub max_results: Option<usize>,
    pub voctree_weights: Option<PathBuf>,
    /// `None` lets the estimator choose.
    pub matching_error: Option<f64>,
    pub cctag_nb_nearest_keyframes: usize,
    pub ba_min_point_visibility: usize,
    pub distance_ratio: f64,
    pub use_guided_matching: bool,
    pub debug_folder: Option<PathBuf>,
    pub always_compute_frame: bool,
}

/// Overlay toggles. They never affect the localization results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    pub detected_features: bool,
    pub matched_features: bool,
    pub resection_features: bool,
    pub reprojection_error: bool,
    pub reconstruction_visibility: bool,
    pub features_id: bool,
    pub features_scale_orientation: bool,
    pub features_scale_orientation_radius: f64,
    pub tracks: bool,
    pub tracks_window_size: usize,
}

impl OverlaySettings {
    pub fn any_enabled(&self) -> bool {
        self.detected_features
            || self.matched_features
            || self.resection_features
            || self.reprojection_error
            || self.reconstruction_visibility
            || self.features_id
            || self.features_scale_orientation
            || self.tracks
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingSettings {
    pub range_mode: TrackingRangeMode,
    pub range_min: i32,
    pub range_max: i32,
}

impl TrackingSettings {
    /// Frames to track, given the host timeline bounds.
    pub fn frame_range(&self, timeline: RangeInclusive<i64>) -> RangeInclusive<i64> {
        match self.range_mode {
            TrackingRangeMode::Timeline => timeline,
            TrackingRangeMode::Custom => i64::from(self.range_min)..=i64::from(self.range_max),
        }
    }
}

/// Everything the localization core reads from the parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalizerSettings {
    pub output_index: usize,
    pub features_type: FeaturesType,
    pub features_preset: FeaturesPreset,
    pub reconstruction_file: Option<PathBuf>,
    pub descriptors_folder: Option<PathBuf>,
    pub voctree_file: Option<PathBuf>,
    pub rig_mode: RigMode,
    pub rig_calibration_file: Option<PathBuf>,
    /// One entry per connected input.
    pub inputs: Vec<InputSettings>,
    pub advanced: AdvancedSettings,
    pub overlay: OverlaySettings,
    pub tracking: TrackingSettings,
}

fn choice<T>(
    params: &ParamSet,
    name: &str,
    from_index: fn(usize) -> Option<T>,
) -> Result<T, SettingsError> {
    let index = params.get_choice(name)?;
    from_index(index).ok_or_else(|| SettingsError::InvalidChoice {
        param: name.to_owned(),
        index,
    })
}

fn count(params: &ParamSet, name: &str) -> Result<usize, SettingsError> {
    let value = params.get_int(name)?;
    usize::try_from(value).map_err(|_| SettingsError::NegativeValue {
        param: name.to_owned(),
        value,
    })
}

/// Empty strings stand for "not set".
fn path(params: &ParamSet, name: &str) -> Result<Option<PathBuf>, SettingsError> {
    let value = params.get_string(name)?.trim();
    Ok((!value.is_empty()).then(|| PathBuf::from(value)))
}

fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

impl InputSettings {
    pub fn from_params(params: &ParamSet, input: usize) -> Result<Self, SettingsError> {
        let distortion_model = choice(
            params,
            &param_input_distortion_mode(input),
            LensDistortionModel::from_index,
        )?;
        let distortion_coefficients = param_input_distortion_coefs(input)
            .iter()
            .take(distortion_model.coefficient_count())
            .map(|name| params.get_double(name))
            .collect::<Result<Vec<_>, _>>()?;

        let pose = RelativePose::from_rows(
            params.get_double3d(&param_input_relative_pose_rotate_m1(input))?,
            params.get_double3d(&param_input_relative_pose_rotate_m2(input))?,
            params.get_double3d(&param_input_relative_pose_rotate_m3(input))?,
            params.get_double3d(&param_input_relative_pose_center(input))?,
        );

        Ok(Self {
            grayscale: params.get_bool(&param_input_is_grayscale(input))?,
            lens_calibration_file: path(params, &param_input_lens_calibration_file(input))?,
            sensor_width: params.get_double(&param_input_sensor_width(input))?,
            optical_center: params.get_double2d(&param_input_optical_center(input))?,
            focal_length_mode: choice(
                params,
                &param_input_focal_length_mode(input),
                FocalLengthMode::from_index,
            )?,
            focal_length: params.get_double(&param_input_focal_length(input))?,
            focal_length_varying: params.get_bool(&param_input_focal_length_varying(input))?,
            distortion: choice(
                params,
                &param_input_distortion(input),
                LensDistortion::from_index,
            )?,
            distortion_model,
            distortion_coefficients,
            relative_pose: (!pose.is_unset()).then_some(pose),
        })
    }
}

impl AdvancedSettings {
    pub fn from_params(params: &ParamSet) -> Result<Self, SettingsError> {
        let max_results = count(params, PARAM_MAX_RESULTS)?;
        let matching_error = params.get_int(PARAM_MATCHING_ERROR)?;
        Ok(Self {
            algorithm: choice(params, PARAM_ALGORITHM, Algorithm::from_index)?,
            matching_estimator: choice(params, PARAM_ESTIMATOR_MATCHING, Estimator::from_index)?,
            resection_estimator: choice(params, PARAM_ESTIMATOR_RESECTION, Estimator::from_index)?,
            reprojection_error: positive(params.get_double(PARAM_REPROJECTION_ERROR)?),
            nb_image_match: count(params, PARAM_NB_IMAGE_MATCH)?,
            max_results: (max_results > 0).then_some(max_results),
            voctree_weights: path(params, PARAM_VOCTREE_WEIGHTS)?,
            matching_error: positive(f64::from(matching_error)),
            cctag_nb_nearest_keyframes: count(params, PARAM_CCTAG_NB_NEAREST_KEYFRAMES)?,
            ba_min_point_visibility: count(params, PARAM_BA_MIN_POINT_VISIBILITY)?,
            distance_ratio: params.get_double(PARAM_DISTANCE_RATIO)?,
            use_guided_matching: params.get_bool(PARAM_USE_GUIDED_MATCHING)?,
            debug_folder: path(params, PARAM_DEBUG_FOLDER)?,
            always_compute_frame: params.get_bool(PARAM_DEBUG_ALWAYS_COMPUTE_FRAME)?,
        })
    }
}

impl OverlaySettings {
    pub fn from_params(params: &ParamSet) -> Result<Self, SettingsError> {
        Ok(Self {
            detected_features: params.get_bool(PARAM_OVERLAY_DETECTED_FEATURES)?,
            matched_features: params.get_bool(PARAM_OVERLAY_MATCHED_FEATURES)?,
            resection_features: params.get_bool(PARAM_OVERLAY_RESECTION_FEATURES)?,
            reprojection_error: params.get_bool(PARAM_OVERLAY_REPROJECTION_ERROR)?,
            reconstruction_visibility: params.get_bool(PARAM_OVERLAY_RECONSTRUCTION_VISIBILITY)?,
            features_id: params.get_bool(PARAM_OVERLAY_FEATURES_ID)?,
            features_scale_orientation: params
                .get_bool(PARAM_OVERLAY_FEATURES_SCALE_ORIENTATION)?,
            features_scale_orientation_radius: params
                .get_double(PARAM_OVERLAY_FEATURES_SCALE_ORIENTATION_RADIUS)?,
            tracks: params.get_bool(PARAM_OVERLAY_TRACKS)?,
            tracks_window_size: count(params, PARAM_OVERLAY_TRACKS_WINDOW_SIZE)?,
        })
    }
}

impl TrackingSettings {
    pub fn from_params(params: &ParamSet) -> Result<Self, SettingsError> {
        Ok(Self {
            range_mode: choice(
                params,
                PARAM_TRACKING_RANGE_MODE,
                TrackingRangeMode::from_index,
            )?,
            range_min: params.get_int(PARAM_TRACKING_RANGE_MIN)?,
            range_max: params.get_int(PARAM_TRACKING_RANGE_MAX)?,
        })
    }
}

impl LocalizerSettings {
    /// Snapshot `params` for the first `connected_inputs` inputs.
    pub fn from_params(params: &ParamSet, connected_inputs: usize) -> Result<Self, SettingsError> {
        if connected_inputs > MAX_INPUTS {
            return Err(SettingsError::TooManyInputs {
                connected: connected_inputs,
                max: MAX_INPUTS,
            });
        }
        let inputs = (0..connected_inputs)
            .map(|input| InputSettings::from_params(params, input))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            output_index: count(params, PARAM_OUTPUT_INDEX)?,
            features_type: choice(params, PARAM_FEATURES_TYPE, FeaturesType::from_index)?,
            features_preset: choice(params, PARAM_FEATURES_PRESET, FeaturesPreset::from_index)?,
            reconstruction_file: path(params, PARAM_RECONSTRUCTION_FILE)?,
            descriptors_folder: path(params, PARAM_DESCRIPTORS_FOLDER)?,
            voctree_file: path(params, PARAM_VOCTREE_FILE)?,
            rig_mode: choice(params, PARAM_RIG_MODE, RigMode::from_index)?,
            rig_calibration_file: path(params, PARAM_RIG_CALIBRATION_FILE)?,
            inputs,
            advanced: AdvancedSettings::from_params(params)?,
            overlay: OverlaySettings::from_params(params)?,
            tracking: TrackingSettings::from_params(params)?,
        })
    }

    /// Check that the snapshot is enough to run a localization.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.inputs.is_empty() {
            return Err(SettingsError::NoInputs);
        }
        if self.reconstruction_file.is_none() {
            return Err(SettingsError::MissingReconstruction);
        }
        if self.voctree_file.is_none() {
            return Err(SettingsError::MissingVoctree);
        }
        let ratio = self.advanced.distance_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(SettingsError::InvalidDistanceRatio(ratio));
        }
        if self.output_index >= self.inputs.len() {
            return Err(SettingsError::OutputIndexOutOfRange {
                index: self.output_index,
                connected: self.inputs.len(),
            });
        }
        if self.rig_mode == RigMode::Known && self.rig_calibration_file.is_none() {
            return Err(SettingsError::MissingRigCalibration);
        }
        if self.tracking.range_mode == TrackingRangeMode::Custom
            && self.tracking.range_min > self.tracking.range_max
        {
            return Err(SettingsError::InvalidTrackingRange {
                min: self.tracking.range_min,
                max: self.tracking.range_max,
            });
        }
        Ok(())
    }

    /// Whether more than one camera is localized jointly.
    pub fn is_rig(&self) -> bool {
        self.inputs.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::CameraLocalizerFactory;
    use camera_localizer_core::{ContextKind, EffectDescriptor};
    use std::collections::HashMap;

    fn params() -> ParamSet {
        let factory = CameraLocalizerFactory::with_env(&HashMap::new());
        let mut desc = EffectDescriptor::new();
        factory.describe(&mut desc);
        factory.describe_in_context(&mut desc, ContextKind::General);
        ParamSet::from_descriptor(&desc)
    }

    fn ready(params: &mut ParamSet) {
        params
            .set_string(PARAM_RECONSTRUCTION_FILE, "/data/sfm.abc")
            .expect("reconstruction");
        params
            .set_string(PARAM_VOCTREE_FILE, "/data/vocab.tree")
            .expect("voctree");
    }

    #[test]
    fn defaults_map_zero_to_auto() {
        let settings = LocalizerSettings::from_params(&params(), 1).expect("settings");
        assert_eq!(settings.inputs.len(), 1);
        assert_eq!(settings.advanced.reprojection_error, Some(4.0));
        assert_eq!(settings.advanced.max_results, Some(10));
        assert_eq!(settings.advanced.matching_error, Some(4.0));
        assert_eq!(settings.advanced.voctree_weights, None);
        assert_eq!(settings.inputs[0].distortion_coefficients.len(), 3);
        assert_eq!(settings.inputs[0].relative_pose, None);
        assert!(!settings.overlay.any_enabled());

        let mut p = params();
        p.set_double(PARAM_REPROJECTION_ERROR, 0.0).expect("auto");
        p.set_int(PARAM_MAX_RESULTS, 0).expect("ignored");
        let settings = LocalizerSettings::from_params(&p, 1).expect("settings");
        assert_eq!(settings.advanced.reprojection_error, None);
        assert_eq!(settings.advanced.max_results, None);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut p = params();
        p.set_int(PARAM_NB_IMAGE_MATCH, -1).expect("unbounded int");
        assert_eq!(
            LocalizerSettings::from_params(&p, 1),
            Err(SettingsError::NegativeValue {
                param: PARAM_NB_IMAGE_MATCH.into(),
                value: -1
            })
        );
    }

    #[test]
    fn validate_requires_files_and_addressable_output() {
        let mut p = params();
        let settings = LocalizerSettings::from_params(&p, 2).expect("settings");
        assert_eq!(settings.validate(), Err(SettingsError::MissingReconstruction));

        ready(&mut p);
        p.set_int(PARAM_OUTPUT_INDEX, 2).expect("output index");
        let settings = LocalizerSettings::from_params(&p, 2).expect("settings");
        assert_eq!(
            settings.validate(),
            Err(SettingsError::OutputIndexOutOfRange {
                index: 2,
                connected: 2
            })
        );

        p.set_int(PARAM_OUTPUT_INDEX, 1).expect("output index");
        p.set_choice(PARAM_RIG_MODE, RigMode::Known.index())
            .expect("rig mode");
        let settings = LocalizerSettings::from_params(&p, 2).expect("settings");
        assert_eq!(settings.validate(), Err(SettingsError::MissingRigCalibration));

        p.set_string(PARAM_RIG_CALIBRATION_FILE, "/data/rig.json")
            .expect("rig file");
        let settings = LocalizerSettings::from_params(&p, 2).expect("settings");
        assert_eq!(settings.validate(), Ok(()));
        assert!(settings.is_rig());
    }

    #[test]
    fn distance_ratio_must_be_a_ratio() {
        let mut p = params();
        ready(&mut p);
        p.set_double(PARAM_DISTANCE_RATIO, 0.0).expect("ratio");
        let settings = LocalizerSettings::from_params(&p, 1).expect("settings");
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidDistanceRatio(0.0))
        );
    }

    #[test]
    fn relative_pose_is_read_when_set() {
        let mut p = params();
        p.set_double3d(&param_input_relative_pose_rotate_m1(1), [1.0, 0.0, 0.0])
            .expect("m1");
        p.set_double3d(&param_input_relative_pose_rotate_m2(1), [0.0, 1.0, 0.0])
            .expect("m2");
        p.set_double3d(&param_input_relative_pose_rotate_m3(1), [0.0, 0.0, 1.0])
            .expect("m3");
        p.set_double3d(&param_input_relative_pose_center(1), [0.5, 0.0, 0.0])
            .expect("center");
        let settings = LocalizerSettings::from_params(&p, 2).expect("settings");
        let pose = settings.inputs[1].relative_pose.expect("pose");
        assert_eq!(pose.to_rows().1, [0.5, 0.0, 0.0]);
        assert_eq!(settings.inputs[0].relative_pose, None);
    }

    #[test]
    fn custom_tracking_range() {
        let tracking = TrackingSettings {
            range_mode: TrackingRangeMode::Custom,
            range_min: 10,
            range_max: 20,
        };
        assert_eq!(tracking.frame_range(0..=100), 10..=20);
        assert!(LocalizerSettings::from_params(&params(), MAX_INPUTS + 1).is_err());
    }
}
