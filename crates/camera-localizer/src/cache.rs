//! Per-frame localization results and the values they write into the output
//! camera parameters.

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{BTreeMap, Entry};

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{inliers} inlier features exceed {matched} matched features")]
    InconsistentStats { matched: u32, inliers: u32 },
    #[error("{field} is not finite ({value})")]
    NonFinite { field: &'static str, value: f64 },
}

fn finite(field: &'static str, values: &[f64]) -> Result<(), CacheError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(CacheError::NonFinite { field, value }),
        None => Ok(()),
    }
}

/// Localized pose: world-to-camera rotation and camera center in world
/// coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub rotation: Matrix3<f64>,
    pub center: Vector3<f64>,
}

impl CameraPose {
    pub fn new(rotation: Matrix3<f64>, center: Vector3<f64>) -> Self {
        Self { rotation, center }
    }

    /// Camera-to-world rotation of a camera looking down -Z with +Y up.
    pub fn host_camera_rotation(&self) -> Matrix3<f64> {
        let flip_yz = Matrix3::from_diagonal(&Vector3::new(1.0, -1.0, -1.0));
        self.rotation.transpose() * flip_yz
    }
}

/// Quality figures of one localization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStats")]
pub struct LocalizationStats {
    error_mean: f64,
    error_min: f64,
    error_max: f64,
    nb_matched_images: u32,
    nb_detected_features: u32,
    nb_matched_features: u32,
    nb_inlier_features: u32,
}

#[derive(Deserialize)]
struct RawStats {
    error_mean: f64,
    error_min: f64,
    error_max: f64,
    nb_matched_images: u32,
    nb_detected_features: u32,
    nb_matched_features: u32,
    nb_inlier_features: u32,
}

impl TryFrom<RawStats> for LocalizationStats {
    type Error = CacheError;

    fn try_from(raw: RawStats) -> Result<Self, Self::Error> {
        LocalizationStats::new(
            raw.error_mean,
            raw.error_min,
            raw.error_max,
            raw.nb_matched_images,
            raw.nb_detected_features,
            raw.nb_matched_features,
            raw.nb_inlier_features,
        )
    }
}

impl LocalizationStats {
    /// Reprojection errors are in pixels and must be finite; a localization
    /// without inliers reports zeros. Fails when the inliers exceed the
    /// matched features.
    pub fn new(
        error_mean: f64,
        error_min: f64,
        error_max: f64,
        nb_matched_images: u32,
        nb_detected_features: u32,
        nb_matched_features: u32,
        nb_inlier_features: u32,
    ) -> Result<Self, CacheError> {
        finite("error_mean", &[error_mean])?;
        finite("error_min", &[error_min])?;
        finite("error_max", &[error_max])?;
        if nb_inlier_features > nb_matched_features {
            return Err(CacheError::InconsistentStats {
                matched: nb_matched_features,
                inliers: nb_inlier_features,
            });
        }
        Ok(Self {
            error_mean,
            error_min,
            error_max,
            nb_matched_images,
            nb_detected_features,
            nb_matched_features,
            nb_inlier_features,
        })
    }

    pub fn error_mean(&self) -> f64 {
        self.error_mean
    }

    pub fn error_min(&self) -> f64 {
        self.error_min
    }

    pub fn error_max(&self) -> f64 {
        self.error_max
    }

    pub fn nb_matched_images(&self) -> u32 {
        self.nb_matched_images
    }

    pub fn nb_detected_features(&self) -> u32 {
        self.nb_detected_features
    }

    pub fn nb_matched_features(&self) -> u32 {
        self.nb_matched_features
    }

    pub fn nb_inlier_features(&self) -> u32 {
        self.nb_inlier_features
    }

    /// Values of the statistics parameters, in parameter order.
    pub fn as_param_values(&self) -> [f64; 7] {
        [
            self.error_mean,
            self.error_min,
            self.error_max,
            f64::from(self.nb_matched_images),
            f64::from(self.nb_detected_features),
            f64::from(self.nb_matched_features),
            f64::from(self.nb_inlier_features),
        ]
    }
}

/// Intrinsics the localizer used (or refined) for one camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in millimeters.
    pub focal_length: f64,
    pub optical_center: [f64; 2],
    pub distortion: [f64; 4],
    pub near: f64,
    pub far: f64,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            focal_length: 0.0,
            optical_center: [0.0; 2],
            distortion: [0.0; 4],
            near: 0.0,
            far: 10000.0,
        }
    }
}

/// Localization outcome of one input camera.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraResult {
    /// `None` when the camera could not be localized.
    pub pose: Option<CameraPose>,
    pub intrinsics: CameraIntrinsics,
    pub stats: LocalizationStats,
}

impl CameraResult {
    pub fn is_localized(&self) -> bool {
        self.pose.is_some()
    }

    /// Non-finite values cannot be stored in the serialized cache.
    pub fn check_finite(&self) -> Result<(), CacheError> {
        if let Some(pose) = &self.pose {
            finite("rotation", pose.rotation.as_slice())?;
            finite("center", pose.center.as_slice())?;
        }
        let intrinsics = &self.intrinsics;
        finite("focal_length", &[intrinsics.focal_length])?;
        finite("optical_center", &intrinsics.optical_center)?;
        finite("distortion", &intrinsics.distortion)?;
        finite("near", &[intrinsics.near])?;
        finite("far", &[intrinsics.far])
    }
}

/// Results of every input camera at one frame, indexed by input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub cameras: Vec<CameraResult>,
}

impl FrameResult {
    pub fn check_finite(&self) -> Result<(), CacheError> {
        self.cameras.iter().try_for_each(CameraResult::check_finite)
    }
}

/// Localization results keyed by frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsCache {
    frames: BTreeMap<i64, FrameResult>,
}

impl ResultsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, frame: i64) -> Option<&FrameResult> {
        self.frames.get(&frame)
    }

    pub fn contains(&self, frame: i64) -> bool {
        self.frames.contains_key(&frame)
    }

    /// Store `result`, returning the result it replaces.
    pub fn insert(&mut self, frame: i64, result: FrameResult) -> Option<FrameResult> {
        self.frames.insert(frame, result)
    }

    /// Cached result of `frame`, running `compute` only on a miss.
    pub fn get_or_compute<E>(
        &mut self,
        frame: i64,
        compute: impl FnOnce() -> Result<FrameResult, E>,
    ) -> Result<&FrameResult, E> {
        match self.frames.entry(frame) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                log::debug!("localizing frame {frame}");
                Ok(entry.insert(compute()?))
            }
        }
    }

    pub fn clear_frame(&mut self, frame: i64) -> Option<FrameResult> {
        self.frames.remove(&frame)
    }

    pub fn clear_all(&mut self) {
        self.frames.clear();
    }

    /// Cached frames in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = i64> + '_ {
        self.frames.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &FrameResult)> {
        self.frames.iter().map(|(frame, result)| (*frame, result))
    }

    /// JSON form stored in the hidden cache parameter. An empty cache is the
    /// empty string.
    pub fn serialize(&self) -> Result<String, CacheError> {
        if self.frames.is_empty() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(&self.frames)?)
    }

    pub fn deserialize(raw: &str) -> Result<Self, CacheError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let frames = serde_json::from_str(raw)?;
        Ok(Self { frames })
    }

    /// Like [`ResultsCache::deserialize`], but a frame that does not parse
    /// is dropped on its own. Returns the cache and the dropped frames.
    pub fn deserialize_lossy(raw: &str) -> Result<(Self, Vec<i64>), CacheError> {
        if raw.trim().is_empty() {
            return Ok((Self::default(), Vec::new()));
        }
        let entries: BTreeMap<i64, serde_json::Value> = serde_json::from_str(raw)?;
        let mut cache = Self::default();
        let mut dropped = Vec::new();
        for (frame, value) in entries {
            match serde_json::from_value::<FrameResult>(value) {
                Ok(result) => {
                    cache.frames.insert(frame, result);
                }
                Err(err) => {
                    log::warn!("dropping unreadable cached result of frame {frame}: {err}");
                    dropped.push(frame);
                }
            }
        }
        Ok((cache, dropped))
    }
}

/// Values written into the parameters of one output camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputCameraValues {
    pub translate: [f64; 3],
    /// XYZ euler angles in degrees.
    pub rotate: [f64; 3],
    pub scale: [f64; 3],
    pub optical_center: [f64; 2],
    pub focal_length: f64,
    pub near: f64,
    pub far: f64,
    pub distortion: [f64; 4],
    /// Statistics in the order of the statistics parameters.
    pub statistics: [f64; 7],
}

impl OutputCameraValues {
    pub fn from_result(result: &CameraResult) -> Self {
        let (translate, rotate) = match &result.pose {
            Some(pose) => {
                let rotation = Rotation3::from_matrix_unchecked(pose.host_camera_rotation());
                let (rx, ry, rz) = rotation.euler_angles();
                (
                    pose.center.into(),
                    [rx.to_degrees(), ry.to_degrees(), rz.to_degrees()],
                )
            }
            None => ([0.0; 3], [0.0; 3]),
        };
        let intrinsics = &result.intrinsics;
        Self {
            translate,
            rotate,
            scale: [1.0; 3],
            optical_center: intrinsics.optical_center,
            focal_length: intrinsics.focal_length,
            near: intrinsics.near,
            far: intrinsics.far,
            distortion: intrinsics.distortion,
            statistics: result.stats.as_param_values(),
        }
    }
}
