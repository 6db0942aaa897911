//! Clip and parameter names.
//!
//! Names are the persistent keys the host stores in project files, so they
//! must never change once released. Per-input parameters carry a `_<index>`
//! suffix.

/// Maximum number of input clips (cameras of a rig).
pub const MAX_INPUTS: usize = 5;

/// Clip name of input `input`. Input 0 doubles as the host's main source clip.
pub fn clip_name(input: usize) -> String {
    if input == 0 {
        camera_localizer_core::SOURCE_CLIP_NAME.to_owned()
    } else {
        format!("{}{input}", camera_localizer_core::SOURCE_CLIP_NAME)
    }
}

fn indexed(base: &str, index: usize) -> String {
    format!("{base}_{index}")
}

macro_rules! indexed_names {
    ($($(#[$meta:meta])* $fn_name:ident => $base:literal),* $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $fn_name(index: usize) -> String {
                indexed($base, index)
            }
        )*
    };
}

// Main tab.
pub const PARAM_GROUP_MAIN: &str = "groupMain";
pub const PARAM_OUTPUT_INDEX: &str = "outputIndex";
pub const PARAM_FEATURES_TYPE: &str = "featuresType";
pub const PARAM_FEATURES_PRESET: &str = "featuresPreset";
pub const PARAM_RECONSTRUCTION_FILE: &str = "reconstructionFile";
pub const PARAM_DESCRIPTORS_FOLDER: &str = "descriptorsFolder";
pub const PARAM_VOCTREE_FILE: &str = "voctreeFile";
pub const PARAM_RIG_MODE: &str = "rigMode";
pub const PARAM_RIG_CALIBRATION_FILE: &str = "rigCalibrationFile";

indexed_names! {
    param_group_input => "groupInput",
    param_input_is_grayscale => "inputIsGrayscale",
    param_input_lens_calibration_file => "inputLensCalibrationFile",
    param_input_group_lens_calibration => "groupInputLensCalibration",
    param_input_sensor_width => "inputSensorWidth",
    param_input_optical_center => "inputOpticalCenter",
    param_input_focal_length_mode => "inputFocalLengthMode",
    param_input_focal_length => "inputFocalLength",
    param_input_focal_length_varying => "inputFocalLengthVarying",
    param_input_distortion => "inputDistortion",
    param_input_distortion_mode => "inputDistortionMode",
    param_input_distortion_coef1 => "inputDistortionCoef1",
    param_input_distortion_coef2 => "inputDistortionCoef2",
    param_input_distortion_coef3 => "inputDistortionCoef3",
    param_input_distortion_coef4 => "inputDistortionCoef4",
    param_input_group_relative_pose => "groupInputRelativePose",
    param_input_relative_pose_rotate_m1 => "inputRelativePoseRotateM1",
    param_input_relative_pose_rotate_m2 => "inputRelativePoseRotateM2",
    param_input_relative_pose_rotate_m3 => "inputRelativePoseRotateM3",
    param_input_relative_pose_center => "inputRelativePoseCenter",
}

/// The four distortion coefficient names of an input, in order.
pub fn param_input_distortion_coefs(input: usize) -> [String; 4] {
    [
        param_input_distortion_coef1(input),
        param_input_distortion_coef2(input),
        param_input_distortion_coef3(input),
        param_input_distortion_coef4(input),
    ]
}

// Advanced tab.
pub const PARAM_GROUP_ADVANCED: &str = "groupAdvanced";
pub const PARAM_ADVANCED_GROUP_OVERLAY: &str = "groupAdvancedOverlay";
pub const PARAM_OVERLAY_DETECTED_FEATURES: &str = "overlayDetectedFeatures";
pub const PARAM_OVERLAY_MATCHED_FEATURES: &str = "overlayMatchedFeatures";
pub const PARAM_OVERLAY_RESECTION_FEATURES: &str = "overlayResectionFeatures";
pub const PARAM_OVERLAY_REPROJECTION_ERROR: &str = "overlayReprojectionError";
pub const PARAM_OVERLAY_RECONSTRUCTION_VISIBILITY: &str = "overlayReconstructionVisibility";
pub const PARAM_OVERLAY_FEATURES_ID: &str = "overlayFeaturesId";
pub const PARAM_OVERLAY_FEATURES_SCALE_ORIENTATION: &str = "overlayFeaturesScaleOrientation";
pub const PARAM_OVERLAY_FEATURES_SCALE_ORIENTATION_RADIUS: &str =
    "overlayFeaturesScaleOrientationRadius";
pub const PARAM_OVERLAY_TRACKS: &str = "overlayTracks";
pub const PARAM_OVERLAY_TRACKS_WINDOW_SIZE: &str = "overlayTracksWindowSize";

pub const PARAM_ALGORITHM: &str = "algorithm";
pub const PARAM_ESTIMATOR_MATCHING: &str = "estimatorMatching";
pub const PARAM_ESTIMATOR_RESECTION: &str = "estimatorResection";
pub const PARAM_REPROJECTION_ERROR: &str = "reprojectionError";
pub const PARAM_NB_IMAGE_MATCH: &str = "nbImageMatch";
pub const PARAM_MAX_RESULTS: &str = "maxResults";
pub const PARAM_VOCTREE_WEIGHTS: &str = "voctreeWeights";
pub const PARAM_MATCHING_ERROR: &str = "matchingError";
pub const PARAM_CCTAG_NB_NEAREST_KEYFRAMES: &str = "cctagNbNearestKeyFrames";
pub const PARAM_BA_MIN_POINT_VISIBILITY: &str = "baMinPointVisibility";
pub const PARAM_DISTANCE_RATIO: &str = "distanceRatio";
pub const PARAM_USE_GUIDED_MATCHING: &str = "useGuidedMatching";
pub const PARAM_DEBUG_FOLDER: &str = "debugFolder";
pub const PARAM_DEBUG_ALWAYS_COMPUTE_FRAME: &str = "debugAlwaysComputeFrame";

pub const PARAM_ADVANCED_GROUP_SFM_DATA: &str = "groupAdvancedSfMData";
pub const PARAM_SFM_DATA_VIEWS_ROOT_PATH: &str = "sfmDataViewsRootPath";
pub const PARAM_SFM_DATA_NB_VIEWS: &str = "sfmDataNbViews";
pub const PARAM_SFM_DATA_NB_POSES: &str = "sfmDataNbPoses";
pub const PARAM_SFM_DATA_NB_INTRINSICS: &str = "sfmDataNbIntrinsics";
pub const PARAM_SFM_DATA_NB_STRUCTURES: &str = "sfmDataNbStructures";
pub const PARAM_SFM_DATA_NB_CONTROL_POINTS: &str = "sfmDataNbControlPoints";

/// Overlay toggles, in UI order.
pub const OVERLAY_PARAMS: [&str; 10] = [
    PARAM_OVERLAY_DETECTED_FEATURES,
    PARAM_OVERLAY_MATCHED_FEATURES,
    PARAM_OVERLAY_RESECTION_FEATURES,
    PARAM_OVERLAY_REPROJECTION_ERROR,
    PARAM_OVERLAY_RECONSTRUCTION_VISIBILITY,
    PARAM_OVERLAY_FEATURES_ID,
    PARAM_OVERLAY_FEATURES_SCALE_ORIENTATION,
    PARAM_OVERLAY_FEATURES_SCALE_ORIENTATION_RADIUS,
    PARAM_OVERLAY_TRACKS,
    PARAM_OVERLAY_TRACKS_WINDOW_SIZE,
];

// Tracking tab.
pub const PARAM_GROUP_TRACKING: &str = "groupTracking";
pub const PARAM_TRACKING_RANGE_MODE: &str = "trackingRangeMode";
pub const PARAM_TRACKING_RANGE_MIN: &str = "trackingRangeMin";
pub const PARAM_TRACKING_RANGE_MAX: &str = "trackingRangeMax";
pub const PARAM_TRACKING_TRACK: &str = "trackingTrack";

// Output tab.
pub const PARAM_GROUP_OUTPUT: &str = "groupOutput";

indexed_names! {
    param_group_output_camera => "groupOutputCamera",
    param_output_translate => "outputTranslate",
    param_output_rotate => "outputRotate",
    param_output_scale => "outputScale",
    param_output_optical_center => "outputOpticalCenter",
    param_output_focal_length => "outputFocalLength",
    param_output_near => "outputNear",
    param_output_far => "outputFar",
    param_output_distortion_coef1 => "outputDistortionCoef1",
    param_output_distortion_coef2 => "outputDistortionCoef2",
    param_output_distortion_coef3 => "outputDistortionCoef3",
    param_output_distortion_coef4 => "outputDistortionCoef4",
    param_output_stat_group => "groupOutputStat",
    param_output_stat_error_mean => "outputStatErrorMean",
    param_output_stat_error_min => "outputStatErrorMin",
    param_output_stat_error_max => "outputStatErrorMax",
    param_output_stat_nb_matched_images => "outputStatNbMatchedImages",
    param_output_stat_nb_detected_features => "outputStatNbDetectedFeatures",
    param_output_stat_nb_matched_features => "outputStatNbMatchedFeatures",
    param_output_stat_nb_inlier_features => "outputStatNbInlierFeatures",
    /// Push button asking the host to build a linked camera node.
    param_output_create_camera => "outputCreateCamera",
}

pub fn param_output_distortion_coefs(output: usize) -> [String; 4] {
    [
        param_output_distortion_coef1(output),
        param_output_distortion_coef2(output),
        param_output_distortion_coef3(output),
        param_output_distortion_coef4(output),
    ]
}

// Cache controls.
pub const PARAM_CACHE_CLEAR_CURRENT_FRAME: &str = "cacheClearCurrentFrame";
pub const PARAM_CACHE_CLEAR: &str = "cacheClear";
pub const PARAM_CACHE_SERIALIZED_RESULTS: &str = "cacheSerializedResults";
pub const PARAM_FORCE_INVALIDATION: &str = "forceInvalidation";
pub const PARAM_FORCE_INVALIDATION_AT_TIME: &str = "forceInvalidationAtTime";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_names_start_with_source() {
        assert_eq!(clip_name(0), "Source");
        assert_eq!(clip_name(3), "Source3");
    }

    #[test]
    fn indexed_names_do_not_collide_across_inputs() {
        let mut names: Vec<String> = (0..MAX_INPUTS)
            .flat_map(|i| {
                param_input_distortion_coefs(i)
                    .into_iter()
                    .chain(param_output_distortion_coefs(i))
            })
            .collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(param_input_distortion_coef1(1), "inputDistortionCoef1_1");
    }
}
