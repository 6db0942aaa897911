//! A live CameraLocalizer instance: parameter values, UI state and the
//! per-frame results cache.

use crate::cache::{CacheError, FrameResult, OutputCameraValues, ResultsCache};
use crate::definition::*;
use crate::registry::PluginInstance;
use crate::settings::{LocalizerSettings, SettingsError};
use camera_localizer_core::{EffectDescriptor, ParamError, ParamSet, ParamValue};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum InstanceError {
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("{connected} inputs connected, expected 1..={max}")]
    InputCount { connected: usize, max: usize },
}

/// What an edit of one parameter caused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamChange {
    /// The parameter has no side effect.
    None,
    /// Only the overlay (or the displayed camera) changed; results stay valid.
    Redraw,
    /// Enable state of dependent parameters was refreshed.
    UiUpdated,
    ClearedFrame { frame: i64 },
    ClearedAll { frames: usize },
    /// A processing parameter changed and every cached result was dropped.
    Invalidated { frames: usize, ui_updated: bool },
    CreateCamera { output: usize },
    TrackRequested,
}

/// Counters mirrored into the hidden invalidation parameters. Changing them
/// makes the host discard its own render cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationState {
    pub force_invalidation: i32,
    pub force_invalidation_at_time: i32,
}

/// Reconstruction summary shown in the read-only SfM data parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfmDataSummary {
    pub views_root_path: String,
    pub nb_views: usize,
    pub nb_poses: usize,
    pub nb_intrinsics: usize,
    pub nb_structures: usize,
    pub nb_control_points: usize,
}

/// Where a parameter lives, which decides how an edit is handled.
enum ParamArea {
    Overlay,
    SfmData,
    Output,
    Tracking,
    Hidden,
    Processing,
}

fn frame_at(time: f64) -> i64 {
    time.round() as i64
}

fn to_param_int(frame: i64) -> i32 {
    frame.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

pub struct CameraLocalizerInstance {
    params: ParamSet,
    cache: ResultsCache,
    invalidation: InvalidationState,
    connected_inputs: usize,
}

impl CameraLocalizerInstance {
    /// Instantiate the parameters of `desc` and restore the serialized cache.
    pub fn new(desc: &EffectDescriptor) -> Self {
        let params = ParamSet::from_descriptor(desc);
        let cache = match params.get_string(PARAM_CACHE_SERIALIZED_RESULTS) {
            Ok(raw) => match ResultsCache::deserialize_lossy(raw) {
                Ok((cache, dropped)) => {
                    if !dropped.is_empty() {
                        log::warn!("restored {} cached frames, dropped {dropped:?}", cache.len());
                    }
                    cache
                }
                Err(err) => {
                    log::warn!("discarding unreadable results cache: {err}");
                    ResultsCache::default()
                }
            },
            Err(err) => {
                log::warn!("descriptor has no results cache parameter: {err}");
                ResultsCache::default()
            }
        };
        let invalidation = InvalidationState {
            force_invalidation: params.get_int(PARAM_FORCE_INVALIDATION).unwrap_or(0),
            force_invalidation_at_time: params
                .get_int(PARAM_FORCE_INVALIDATION_AT_TIME)
                .unwrap_or(0),
        };
        let mut instance = Self {
            params,
            cache,
            invalidation,
            connected_inputs: 1,
        };
        if let Err(err) = instance.refresh_ui() {
            log::warn!("could not initialize parameter state: {err}");
        }
        instance
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    pub fn cache(&self) -> &ResultsCache {
        &self.cache
    }

    pub fn invalidation(&self) -> InvalidationState {
        self.invalidation
    }

    pub fn connected_inputs(&self) -> usize {
        self.connected_inputs
    }

    /// Show the tabs of the `connected` first inputs and let the user pick
    /// one of them as output camera.
    pub fn set_connected_inputs(&mut self, connected: usize) -> Result<(), InstanceError> {
        if connected == 0 || connected > MAX_INPUTS {
            return Err(InstanceError::InputCount {
                connected,
                max: MAX_INPUTS,
            });
        }
        log::debug!("{connected} inputs connected");
        self.connected_inputs = connected;

        let last = (connected - 1) as i32;
        self.params
            .set_int_display_range(PARAM_OUTPUT_INDEX, 0, last)?;
        self.params.set_enabled(PARAM_OUTPUT_INDEX, connected > 1)?;
        if self.params.get_int(PARAM_OUTPUT_INDEX)? > last {
            self.params.set_int(PARAM_OUTPUT_INDEX, last)?;
        }

        for input in 0..MAX_INPUTS {
            let hidden = input >= connected;
            self.params.set_secret(&param_group_input(input), hidden)?;
            self.params
                .set_secret(&param_group_output_camera(input), hidden)?;
        }
        Ok(())
    }

    fn area(&self, name: &str) -> Result<ParamArea, InstanceError> {
        let mut parent = self.params.descriptor(name)?.parent.clone();
        if parent.is_none() {
            return Ok(ParamArea::Hidden);
        }
        while let Some(group) = parent {
            match group.as_str() {
                PARAM_ADVANCED_GROUP_OVERLAY => return Ok(ParamArea::Overlay),
                PARAM_ADVANCED_GROUP_SFM_DATA => return Ok(ParamArea::SfmData),
                PARAM_GROUP_OUTPUT => return Ok(ParamArea::Output),
                PARAM_GROUP_TRACKING => return Ok(ParamArea::Tracking),
                _ => parent = self.params.descriptor(&group)?.parent.clone(),
            }
        }
        Ok(ParamArea::Processing)
    }

    /// React to a user edit of parameter `name` at `time`.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn changed_param(&mut self, name: &str, time: f64) -> Result<ParamChange, InstanceError> {
        let change = match self.area(name)? {
            ParamArea::Hidden | ParamArea::SfmData => ParamChange::None,
            ParamArea::Overlay => ParamChange::Redraw,
            ParamArea::Output => self.changed_output_param(name, time)?,
            ParamArea::Tracking => self.changed_tracking_param(name)?,
            ParamArea::Processing if name == PARAM_OUTPUT_INDEX => ParamChange::Redraw,
            ParamArea::Processing => {
                let ui_updated = self.update_dependent_ui(name)?;
                let frames = self.invalidate()?;
                ParamChange::Invalidated { frames, ui_updated }
            }
        };
        log::debug!("parameter `{name}` changed at {time}: {change:?}");
        Ok(change)
    }

    fn changed_output_param(&mut self, name: &str, time: f64) -> Result<ParamChange, InstanceError> {
        if name == PARAM_CACHE_CLEAR_CURRENT_FRAME {
            let frame = frame_at(time);
            self.cache.clear_frame(frame);
            self.invalidation.force_invalidation_at_time = to_param_int(frame);
            self.params.set_int(
                PARAM_FORCE_INVALIDATION_AT_TIME,
                self.invalidation.force_invalidation_at_time,
            )?;
            self.reset_outputs()?;
            self.write_cache()?;
            log::info!("cleared results of frame {frame}");
            return Ok(ParamChange::ClearedFrame { frame });
        }
        if name == PARAM_CACHE_CLEAR {
            let frames = self.invalidate()?;
            log::info!("cleared {frames} cached frames");
            return Ok(ParamChange::ClearedAll { frames });
        }
        Ok((0..MAX_INPUTS)
            .find(|&output| param_output_create_camera(output) == name)
            .map_or(ParamChange::None, |output| ParamChange::CreateCamera {
                output,
            }))
    }

    fn changed_tracking_param(&mut self, name: &str) -> Result<ParamChange, InstanceError> {
        match name {
            PARAM_TRACKING_RANGE_MODE => {
                self.update_tracking_ui()?;
                Ok(ParamChange::UiUpdated)
            }
            PARAM_TRACKING_TRACK => Ok(ParamChange::TrackRequested),
            _ => Ok(ParamChange::None),
        }
    }

    /// Drop every cached result and make the host re-render.
    fn invalidate(&mut self) -> Result<usize, InstanceError> {
        let frames = self.cache.len();
        self.cache.clear_all();
        self.invalidation.force_invalidation = self.invalidation.force_invalidation.wrapping_add(1);
        self.params
            .set_int(PARAM_FORCE_INVALIDATION, self.invalidation.force_invalidation)?;
        self.reset_outputs()?;
        self.write_cache()?;
        Ok(frames)
    }

    fn write_cache(&mut self) -> Result<(), InstanceError> {
        let raw = self.cache.serialize()?;
        self.params.set_string(PARAM_CACHE_SERIALIZED_RESULTS, raw)?;
        Ok(())
    }

    fn update_dependent_ui(&mut self, name: &str) -> Result<bool, InstanceError> {
        if name == PARAM_RIG_MODE {
            self.update_rig_ui()?;
            return Ok(true);
        }
        if name == PARAM_RECONSTRUCTION_FILE {
            self.update_tracking_ui()?;
            return Ok(true);
        }
        for input in 0..MAX_INPUTS {
            if name == param_input_focal_length_mode(input) {
                self.update_focal_ui(input)?;
                return Ok(true);
            }
            if name == param_input_distortion(input) || name == param_input_distortion_mode(input)
            {
                self.update_distortion_ui(input)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn refresh_ui(&mut self) -> Result<(), InstanceError> {
        self.set_connected_inputs(self.connected_inputs)?;
        self.update_rig_ui()?;
        self.update_tracking_ui()?;
        for input in 0..MAX_INPUTS {
            self.update_focal_ui(input)?;
            self.update_distortion_ui(input)?;
        }
        Ok(())
    }

    fn update_rig_ui(&mut self) -> Result<(), InstanceError> {
        let known = self.params.get_choice(PARAM_RIG_MODE)? == RigMode::Known.index();
        self.params.set_enabled(PARAM_RIG_CALIBRATION_FILE, known)?;
        Ok(())
    }

    fn update_tracking_ui(&mut self) -> Result<(), InstanceError> {
        let custom =
            self.params.get_choice(PARAM_TRACKING_RANGE_MODE)? == TrackingRangeMode::Custom.index();
        self.params.set_enabled(PARAM_TRACKING_RANGE_MIN, custom)?;
        self.params.set_enabled(PARAM_TRACKING_RANGE_MAX, custom)?;
        let has_reconstruction = !self
            .params
            .get_string(PARAM_RECONSTRUCTION_FILE)?
            .trim()
            .is_empty();
        self.params
            .set_enabled(PARAM_TRACKING_TRACK, has_reconstruction)?;
        Ok(())
    }

    fn update_focal_ui(&mut self, input: usize) -> Result<(), InstanceError> {
        let mode = self
            .params
            .get_choice(&param_input_focal_length_mode(input))?;
        let known = mode != FocalLengthMode::Unknown.index();
        self.params
            .set_enabled(&param_input_focal_length(input), known)?;
        self.params
            .set_enabled(&param_input_focal_length_varying(input), known)?;
        Ok(())
    }

    fn update_distortion_ui(&mut self, input: usize) -> Result<(), InstanceError> {
        let status = self.params.get_choice(&param_input_distortion(input))?;
        let known = status != LensDistortion::Unknown.index();
        let used = LensDistortionModel::from_index(
            self.params
                .get_choice(&param_input_distortion_mode(input))?,
        )
        .unwrap_or_default()
        .coefficient_count();

        self.params
            .set_enabled(&param_input_distortion_mode(input), known)?;
        for (k, name) in param_input_distortion_coefs(input).iter().enumerate() {
            self.params.set_enabled(name, known && k < used)?;
        }
        Ok(())
    }

    /// Cache `result` for the frame at `time` and show it in the output
    /// parameters.
    ///
    /// A result with non-finite values is rejected before anything changes.
    /// Output values outside their parameter range are clamped, the cached
    /// result keeps the exact values.
    pub fn store_result(&mut self, time: f64, result: FrameResult) -> Result<(), InstanceError> {
        result.check_finite()?;
        let frame = frame_at(time);
        let replaced = self.cache.insert(frame, result.clone());
        if let Err(err) = self.write_cache() {
            match replaced {
                Some(previous) => self.cache.insert(frame, previous),
                None => self.cache.clear_frame(frame),
            };
            return Err(err);
        }
        if replaced.is_some() {
            log::debug!("replaced cached result of frame {frame}");
        }
        self.write_outputs(&result)
    }

    /// Show the cached result at `time`, or the defaults when nothing is cached.
    pub fn restore_outputs(&mut self, time: f64) -> Result<bool, InstanceError> {
        match self.cache.get(frame_at(time)).cloned() {
            Some(result) => {
                self.write_outputs(&result)?;
                Ok(true)
            }
            None => {
                self.reset_outputs()?;
                Ok(false)
            }
        }
    }

    fn write_outputs(&mut self, result: &FrameResult) -> Result<(), InstanceError> {
        for (output, camera) in result.cameras.iter().enumerate().take(MAX_INPUTS) {
            let values = OutputCameraValues::from_result(camera);
            let mut fields = vec![
                (param_output_translate(output), ParamValue::Double3D(values.translate)),
                (param_output_rotate(output), ParamValue::Double3D(values.rotate)),
                (param_output_scale(output), ParamValue::Double3D(values.scale)),
                (
                    param_output_optical_center(output),
                    ParamValue::Double2D(values.optical_center),
                ),
                (param_output_focal_length(output), ParamValue::Double(values.focal_length)),
                (param_output_near(output), ParamValue::Double(values.near)),
                (param_output_far(output), ParamValue::Double(values.far)),
            ];
            fields.extend(
                param_output_distortion_coefs(output)
                    .into_iter()
                    .zip(values.distortion.map(ParamValue::Double)),
            );
            fields.extend(
                output_stat_names(output)
                    .into_iter()
                    .zip(values.statistics.map(ParamValue::Double)),
            );
            for (name, value) in fields {
                if self.params.set_value_clamped(&name, value)? {
                    log::debug!("output `{name}` clamped to its range");
                }
            }
        }
        Ok(())
    }

    fn reset_outputs(&mut self) -> Result<(), InstanceError> {
        for output in 0..MAX_INPUTS {
            let names = [
                param_output_translate(output),
                param_output_rotate(output),
                param_output_scale(output),
                param_output_optical_center(output),
                param_output_focal_length(output),
                param_output_near(output),
                param_output_far(output),
            ];
            for name in names
                .iter()
                .chain(&param_output_distortion_coefs(output))
                .chain(&output_stat_names(output))
            {
                self.params.reset(name)?;
            }
        }
        Ok(())
    }

    /// Fill the read-only reconstruction summary.
    pub fn set_sfm_summary(&mut self, summary: &SfmDataSummary) -> Result<(), InstanceError> {
        let p = &mut self.params;
        p.set_string(PARAM_SFM_DATA_VIEWS_ROOT_PATH, summary.views_root_path.as_str())?;
        p.set_string(PARAM_SFM_DATA_NB_VIEWS, summary.nb_views.to_string())?;
        p.set_string(PARAM_SFM_DATA_NB_POSES, summary.nb_poses.to_string())?;
        p.set_string(PARAM_SFM_DATA_NB_INTRINSICS, summary.nb_intrinsics.to_string())?;
        p.set_string(PARAM_SFM_DATA_NB_STRUCTURES, summary.nb_structures.to_string())?;
        p.set_string(
            PARAM_SFM_DATA_NB_CONTROL_POINTS,
            summary.nb_control_points.to_string(),
        )?;
        Ok(())
    }

    /// Typed snapshot of the current values for the connected inputs.
    pub fn settings(&self) -> Result<LocalizerSettings, InstanceError> {
        Ok(LocalizerSettings::from_params(
            &self.params,
            self.connected_inputs,
        )?)
    }
}

fn output_stat_names(output: usize) -> [String; 7] {
    [
        param_output_stat_error_mean(output),
        param_output_stat_error_min(output),
        param_output_stat_error_max(output),
        param_output_stat_nb_matched_images(output),
        param_output_stat_nb_detected_features(output),
        param_output_stat_nb_matched_features(output),
        param_output_stat_nb_inlier_features(output),
    ]
}

impl PluginInstance for CameraLocalizerInstance {
    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn set_connected_inputs(&mut self, connected: usize) -> Result<(), InstanceError> {
        CameraLocalizerInstance::set_connected_inputs(self, connected)
    }

    fn changed_param(&mut self, name: &str, time: f64) -> Result<ParamChange, InstanceError> {
        CameraLocalizerInstance::changed_param(self, name, time)
    }
}
