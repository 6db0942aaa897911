//! Registration of the CameraLocalizer effect: effect properties, clips and
//! the full parameter tree.

use crate::definition::*;
use crate::instance::CameraLocalizerInstance;
use crate::registry::{PluginFactory, PluginInstance};
use camera_localizer_core::{
    BitDepth, ContextKind, EffectDescriptor, LayoutHint, PixelComponent, StringType,
    INFINITE_MAX_DOUBLE, INFINITE_MAX_INT, OUTPUT_CLIP_NAME,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

const DESCRIPTION: &str = "CameraLocalizer estimates the camera pose of an image \
regarding an existing 3D reconstruction generated by openMVG.\n\
The plugin supports multiple clips in input to localize a RIG of cameras \
(multiple cameras rigidly fixed).";

const FOCAL_LENGTH_HINT: &str = "The focal length of the lens is the distance between the lens \
and the image sensor when the subject is in focus, usually stated in millimeters. \
The shorter the focal length, the wider the angle of view.";

const DISPLAY_3D_MIN: [f64; 3] = [-100.0; 3];
const DISPLAY_3D_MAX: [f64; 3] = [100.0; 3];

/// Factory of the CameraLocalizer effect.
#[derive(Clone, Debug, Default)]
pub struct CameraLocalizerFactory {
    voctree_default: Option<String>,
}

impl CameraLocalizerFactory {
    /// Factory reading its defaults from the process environment.
    pub fn new() -> Self {
        Self::with_env(&ProcessEnv)
    }

    pub fn with_env(env: &impl EnvSource) -> Self {
        let voctree_default = default_voctree_path(env);
        if voctree_default.is_none() {
            log::warn!(
                "neither {ENV_DEFAULT_GENERIC_VOCTREE} nor {ENV_OPENMVG_VOCTREE} is set, \
                 the voctree file has no default"
            );
        }
        Self { voctree_default }
    }

    /// Default of the voctree file parameter.
    pub fn voctree_default(&self) -> Option<&str> {
        self.voctree_default.as_deref()
    }

    /// Effect-level properties.
    pub fn describe(&self, desc: &mut EffectDescriptor) {
        desc.set_labels(
            "CameraLocalizer",
            "CameraLocalizer",
            "openMVG CameraLocalizer",
        );
        desc.set_grouping(PLUGIN_GROUPING);
        desc.set_description(DESCRIPTION);

        desc.add_supported_context(ContextKind::Filter);
        desc.add_supported_context(ContextKind::General);
        desc.add_supported_context(ContextKind::Paint);

        desc.add_supported_bit_depth(BitDepth::UByte);
        desc.add_supported_bit_depth(BitDepth::UShort);
        desc.add_supported_bit_depth(BitDepth::Float);

        desc.flags.single_instance = false;
        desc.flags.host_frame_threading = false;
        desc.flags.supports_multi_resolution = false;
        desc.flags.supports_tiles = false;
        desc.flags.temporal_clip_access = false;
        desc.flags.render_twice_always = false;
        desc.flags.supports_multiple_clip_pars = false;

        desc.overlay_interact = true;
    }

    /// Clips and parameters. The topology is the same in every context.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, desc)))]
    pub fn describe_in_context(&self, desc: &mut EffectDescriptor, context: ContextKind) {
        log::debug!("describing {PLUGIN_IDENTIFIER} in {} context", context.name());

        describe_clips(desc);
        self.describe_main(desc);
        for input in 0..MAX_INPUTS {
            describe_input(desc, input);
        }
        describe_advanced(desc);
        describe_tracking(desc);
        describe_output(desc);
        describe_cache(desc);

        log::debug!(
            "{} clips, {} parameters described",
            desc.clips().len(),
            desc.params().len()
        );
    }

    fn describe_main(&self, desc: &mut EffectDescriptor) {
        desc.define_group_param(PARAM_GROUP_MAIN)
            .label("Settings")
            .as_tab();

        desc.define_int_param(PARAM_OUTPUT_INDEX)
            .label("Camera Output Index")
            .hint("The index of the input clip to expose as the output camera.")
            .range(0, MAX_INPUTS as i32)
            // Widened once the connected clips are known.
            .display_range(0, 0)
            .animates(false)
            .enabled(false)
            .parent(PARAM_GROUP_MAIN)
            .layout_hint(LayoutHint::Divider);

        desc.define_choice_param(PARAM_FEATURES_TYPE)
            .label("Features Type")
            .hint("Type of descriptors to use")
            .append_options(&FeaturesType::labels())
            .default_value(FeaturesType::default().index())
            .parent(PARAM_GROUP_MAIN);

        desc.define_choice_param(PARAM_FEATURES_PRESET)
            .label("Features Preset")
            .hint("Preset for the feature extractor when localizing a new image")
            .append_options(&FeaturesPreset::labels())
            .default_value(FeaturesPreset::default().index())
            .parent(PARAM_GROUP_MAIN);

        desc.define_string_param(PARAM_RECONSTRUCTION_FILE)
            .label("Reconstruction File")
            .hint("3D reconstruction file performed with openMVG (*.abc, *.json, *.bin)")
            .string_type(StringType::FilePath)
            .file_path_exists(true)
            .parent(PARAM_GROUP_MAIN);

        desc.define_string_param(PARAM_DESCRIPTORS_FOLDER)
            .label("Descriptors Folder")
            .hint("3D reconstruction descriptors folder")
            .string_type(StringType::DirectoryPath)
            .file_path_exists(true)
            .parent(PARAM_GROUP_MAIN);

        let voctree = desc
            .define_string_param(PARAM_VOCTREE_FILE)
            .label("Voctree File")
            .hint("Vocabulary tree is a precomputed file required to match image descriptors (*.tree)")
            .string_type(StringType::FilePath)
            .file_path_exists(true)
            .parent(PARAM_GROUP_MAIN);
        if let Some(path) = self.voctree_default.as_deref() {
            voctree.default_value(path);
        }

        desc.define_choice_param(PARAM_RIG_MODE)
            .label("Rig Status")
            .hint("Is the camera rig calibrated?")
            .append_options(&RigMode::labels())
            .default_value(RigMode::default().index())
            .parent(PARAM_GROUP_MAIN);

        desc.define_string_param(PARAM_RIG_CALIBRATION_FILE)
            .label("Rig Calibration File")
            .hint("Rig calibration file")
            .string_type(StringType::FilePath)
            .file_path_exists(true)
            .parent(PARAM_GROUP_MAIN)
            .layout_hint(LayoutHint::Divider);
    }
}

fn describe_clips(desc: &mut EffectDescriptor) {
    for input in 0..MAX_INPUTS {
        desc.define_clip(clip_name(input))
            .add_supported_component(PixelComponent::Rgba)
            .temporal_clip_access(false)
            .supports_tiles(false)
            .is_mask(false)
            .optional(input > 0);
    }

    desc.define_clip(OUTPUT_CLIP_NAME)
        .add_supported_component(PixelComponent::Rgba)
        .supports_tiles(false);
}

fn describe_input(desc: &mut EffectDescriptor, input: usize) {
    let group = param_group_input(input);
    desc.define_group_param(&group)
        .label(format!("Input {}", clip_name(input)))
        .as_tab()
        .parent(PARAM_GROUP_MAIN);

    desc.define_bool_param(param_input_is_grayscale(input))
        .label("Is Grayscale")
        .hint("Is Grayscale?")
        .animates(false)
        .default_value(false)
        .parent(&group);

    desc.define_string_param(param_input_lens_calibration_file(input))
        .label("Lens Calibration File")
        .hint("Calibration file to initialize camera intrinsics parameters.")
        .string_type(StringType::DirectoryPath)
        .parent(&group);

    let lens = param_input_group_lens_calibration(input);
    desc.define_group_param(&lens)
        .label("Lens calibration")
        .open(false)
        .parent(&group);

    desc.define_double_param(param_input_sensor_width(input))
        .label("Sensor Width")
        .hint("sensor Width")
        .display_range(0.0, 100.0)
        .animates(false)
        .parent(&lens);

    desc.define_double2d_param(param_input_optical_center(input))
        .label("Optical Center")
        .hint("Optical center coordinates")
        .display_range(-50.0, -50.0, 50.0, 50.0)
        .animates(false)
        .use_host_overlay_handle(false)
        .parent(&lens);

    desc.define_choice_param(param_input_focal_length_mode(input))
        .label("Focal Length Mode")
        .hint("Focal length information")
        .parent(&lens)
        .append_options(&FocalLengthMode::labels())
        .default_value(FocalLengthMode::default().index());

    desc.define_double_param(param_input_focal_length(input))
        .label("Focal Length")
        .hint(FOCAL_LENGTH_HINT)
        .display_range(0.0, 300.0)
        .parent(&lens)
        .layout_hint(LayoutHint::NoNewLine);

    desc.define_bool_param(param_input_focal_length_varying(input))
        .label("Varying")
        .hint("Is focal length varying?")
        .animates(false)
        .parent(&lens)
        .layout_hint(LayoutHint::Divider);

    desc.define_choice_param(param_input_distortion(input))
        .label("Lens Distortion Status")
        .hint("Is the lens distortion calibrated?")
        .parent(&lens)
        .append_options(&LensDistortion::labels())
        .default_value(LensDistortion::default().index());

    desc.define_choice_param(param_input_distortion_mode(input))
        .label("Lens Distortion Model")
        .hint("Mathematical model used for lens distortion.")
        .parent(&lens)
        .append_options(&LensDistortionModel::labels())
        .default_value(LensDistortionModel::default().index());

    for (k, name) in param_input_distortion_coefs(input).into_iter().enumerate() {
        desc.define_double_param(name)
            .label(format!("Lens Distortion Coef{}", k + 1))
            .hint(format!("Lens distortion coefficient {}", k + 1))
            .range(-1.0, 1.0)
            .display_range(-1.0, 1.0)
            .parent(&lens);
    }

    let pose = param_input_group_relative_pose(input);
    desc.define_group_param(&pose)
        .label("Relative Pose")
        .open(false)
        .parent(&group);

    let rows = [
        param_input_relative_pose_rotate_m1(input),
        param_input_relative_pose_rotate_m2(input),
        param_input_relative_pose_rotate_m3(input),
    ];
    for (k, name) in rows.into_iter().enumerate() {
        // Only the first row carries a label; the three rows read as a matrix.
        let label = if k == 0 { "Rotate" } else { "" };
        desc.define_double3d_param(name)
            .label(label)
            .hint(format!("Relative pose rotation matrix {}", k + 1))
            .default_value(0.0, 0.0, 0.0)
            .display_range(DISPLAY_3D_MIN, DISPLAY_3D_MAX)
            .animates(false)
            .parent(&pose);
    }

    desc.define_double3d_param(param_input_relative_pose_center(input))
        .label("Center")
        .hint("Relative pose center")
        .default_value(0.0, 0.0, 0.0)
        .display_range(DISPLAY_3D_MIN, DISPLAY_3D_MAX)
        .animates(false)
        .parent(&pose);
}

fn describe_advanced(desc: &mut EffectDescriptor) {
    desc.define_group_param(PARAM_GROUP_ADVANCED)
        .label("Advanced")
        .as_tab();

    describe_overlay(desc);

    desc.define_choice_param(PARAM_ALGORITHM)
        .label("Algorithm")
        .hint("Camera Localizer Algorithm")
        .parent(PARAM_GROUP_ADVANCED)
        .append_options(&Algorithm::labels())
        .default_value(Algorithm::default().index());

    desc.define_choice_param(PARAM_ESTIMATOR_MATCHING)
        .label("Matching Estimator")
        .hint("Robust estimator used for the geometric verification of matches")
        .parent(PARAM_GROUP_ADVANCED)
        .append_options(&Estimator::labels())
        .default_value(Estimator::default().index());

    desc.define_choice_param(PARAM_ESTIMATOR_RESECTION)
        .label("Resection Estimator")
        .hint("Robust estimator used for the camera resection")
        .parent(PARAM_GROUP_ADVANCED)
        .append_options(&Estimator::labels())
        .default_value(Estimator::default().index());

    desc.define_double_param(PARAM_REPROJECTION_ERROR)
        .label("Reprojection Error")
        .hint(
            "Maximum reprojection error (in pixels) allowed for resectioning. \
             If set to 0 it lets the ACRansac select an optimal value",
        )
        .display_range(0.0, 10.0)
        .default_value(4.0)
        .animates(false)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_int_param(PARAM_NB_IMAGE_MATCH)
        .label("Nb Image Match")
        .hint("Number of images to retrieve in database")
        .display_range(0, 100)
        .default_value(4)
        .animates(false)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_int_param(PARAM_MAX_RESULTS)
        .label("Max Results")
        .hint(
            "For algorithm AllResults, it stops the image matching when this number \
             of matched images is reached. If 0 it is ignored.",
        )
        .display_range(0, 100)
        .default_value(10)
        .animates(false)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_string_param(PARAM_VOCTREE_WEIGHTS)
        .label("Voctree Weights File")
        .hint("Vocabulary tree weights filename")
        .string_type(StringType::DirectoryPath)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_int_param(PARAM_MATCHING_ERROR)
        .label("Matching Error")
        .hint(
            "Maximum matching error (in pixels) allowed for image matching with geometric \
             verification. If set to 0 it lets the ACRansac select an optimal value.",
        )
        .display_range(0, 10)
        .default_value(4)
        .animates(false)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_int_param(PARAM_CCTAG_NB_NEAREST_KEYFRAMES)
        .label("CCTag Nb Nearest KeyFrames")
        .hint("Number of images to retrieve in the database")
        .display_range(0, 100)
        .animates(false)
        .default_value(5)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_int_param(PARAM_BA_MIN_POINT_VISIBILITY)
        .label("BA Min Point Visibility")
        .hint(
            "Minimum number of observation that a point must have in order to be \
             considered for bundle adjustment",
        )
        .display_range(0, 10)
        .default_value(0)
        .animates(false)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_double_param(PARAM_DISTANCE_RATIO)
        .label("Distance Ratio")
        .hint("The ratio distance to use when matching feature with the ratio test")
        .display_range(-1.0, 1.0)
        .default_value(0.8)
        .animates(false)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_bool_param(PARAM_USE_GUIDED_MATCHING)
        .label("Guided Matching")
        .hint("Use guided matching?")
        .animates(false)
        .default_value(false)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_string_param(PARAM_DEBUG_FOLDER)
        .label("Debug Folder")
        .hint(
            "If a directory is provided it enables visual debug and saves all the \
             debugging info in that directory",
        )
        .string_type(StringType::DirectoryPath)
        .parent(PARAM_GROUP_ADVANCED);

    desc.define_bool_param(PARAM_DEBUG_ALWAYS_COMPUTE_FRAME)
        .label("Always Compute Frame")
        .hint("Is always computing frame?")
        .animates(false)
        .default_value(false)
        .parent(PARAM_GROUP_ADVANCED)
        .layout_hint(LayoutHint::Divider);

    describe_sfm_data(desc);
}

fn describe_overlay(desc: &mut EffectDescriptor) {
    desc.define_group_param(PARAM_ADVANCED_GROUP_OVERLAY)
        .label("Overlay")
        .open(false)
        .parent(PARAM_GROUP_ADVANCED);

    let toggles = [
        (
            PARAM_OVERLAY_DETECTED_FEATURES,
            "Detected features",
            "Enable overlay of detected points.",
        ),
        (
            PARAM_OVERLAY_MATCHED_FEATURES,
            "Matched features",
            "Enable overlay of matched points.",
        ),
        (
            PARAM_OVERLAY_RESECTION_FEATURES,
            "Resection features",
            "Enable overlay of resection inliers/outliers.",
        ),
        (
            PARAM_OVERLAY_REPROJECTION_ERROR,
            "Reprojection Error",
            "Enable overlay of reprojection error.",
        ),
        (
            PARAM_OVERLAY_RECONSTRUCTION_VISIBILITY,
            "Reconstruction Visibility",
            "Enable overlay of visibility in reconstruction for all points of the reconstruction",
        ),
        (
            PARAM_OVERLAY_FEATURES_ID,
            "Features Id",
            "Enable overlay of features id",
        ),
    ];
    for (name, label, hint) in toggles {
        desc.define_bool_param(name)
            .label(label)
            .hint(hint)
            .parent(PARAM_ADVANCED_GROUP_OVERLAY)
            .default_value(false)
            .evaluate_on_change(false);
    }

    desc.define_bool_param(PARAM_OVERLAY_FEATURES_SCALE_ORIENTATION)
        .label("Features Scale / Orientation")
        .hint("Enable overlay of features scale and orientation")
        .parent(PARAM_ADVANCED_GROUP_OVERLAY)
        .default_value(false)
        .evaluate_on_change(false)
        .layout_hint(LayoutHint::NoNewLine);

    desc.define_double_param(PARAM_OVERLAY_FEATURES_SCALE_ORIENTATION_RADIUS)
        .label("Radius")
        .hint("Radius scale factor for overlay.")
        .range(0.0, INFINITE_MAX_DOUBLE)
        .display_range(1.0, 40.0)
        .default_value(3.0)
        .animates(false)
        .parent(PARAM_ADVANCED_GROUP_OVERLAY)
        .evaluate_on_change(false);

    desc.define_bool_param(PARAM_OVERLAY_TRACKS)
        .label("Tracking")
        .hint("Enable overlay of visibility in tracking.")
        .parent(PARAM_ADVANCED_GROUP_OVERLAY)
        .default_value(false)
        .evaluate_on_change(false)
        .layout_hint(LayoutHint::NoNewLine);

    desc.define_int_param(PARAM_OVERLAY_TRACKS_WINDOW_SIZE)
        .label("Frames Window Size")
        .hint("Number of frames before/after the current frame to display feature tracks.")
        .range(0, INFINITE_MAX_INT)
        .display_range(1, 10)
        .default_value(3)
        .animates(false)
        .parent(PARAM_ADVANCED_GROUP_OVERLAY)
        .evaluate_on_change(false)
        .layout_hint(LayoutHint::Divider);
}

fn describe_sfm_data(desc: &mut EffectDescriptor) {
    desc.define_group_param(PARAM_ADVANCED_GROUP_SFM_DATA)
        .label("SfM Data Information")
        .open(false)
        .parent(PARAM_GROUP_ADVANCED);

    let fields = [
        (PARAM_SFM_DATA_VIEWS_ROOT_PATH, "Views Root Path"),
        (PARAM_SFM_DATA_NB_VIEWS, "Nb Views"),
        (PARAM_SFM_DATA_NB_POSES, "Nb Pose"),
        (PARAM_SFM_DATA_NB_INTRINSICS, "Nb Intrinsics"),
        (PARAM_SFM_DATA_NB_STRUCTURES, "Nb Structures"),
        (PARAM_SFM_DATA_NB_CONTROL_POINTS, "Nb Control Points"),
    ];
    for (name, label) in fields {
        desc.define_string_param(name)
            .label(label)
            .hint(label)
            .string_type(StringType::SingleLine)
            .evaluate_on_change(false)
            .enabled(false)
            .parent(PARAM_ADVANCED_GROUP_SFM_DATA);
    }
}

fn describe_tracking(desc: &mut EffectDescriptor) {
    desc.define_group_param(PARAM_GROUP_TRACKING)
        .label("Tracking")
        .as_tab();

    desc.define_choice_param(PARAM_TRACKING_RANGE_MODE)
        .label("Tracking Range")
        .hint("Tracking Range")
        .append_options(&TrackingRangeMode::labels())
        .default_value(TrackingRangeMode::default().index())
        .evaluate_on_change(false)
        .enabled(true)
        .parent(PARAM_GROUP_TRACKING);

    for (name, label, hint) in [
        (PARAM_TRACKING_RANGE_MIN, "from", "Start frame"),
        (PARAM_TRACKING_RANGE_MAX, "to", "Stop frame"),
    ] {
        desc.define_int_param(name)
            .label(label)
            .hint(hint)
            .display_range(0, 240)
            .animates(false)
            .evaluate_on_change(false)
            .enabled(false)
            .parent(PARAM_GROUP_TRACKING);
    }

    desc.define_push_button_param(PARAM_TRACKING_TRACK)
        .label("Track")
        .hint("track")
        .enabled(false)
        .parent(PARAM_GROUP_TRACKING);
}

fn describe_output(desc: &mut EffectDescriptor) {
    desc.define_group_param(PARAM_GROUP_OUTPUT)
        .label("Output")
        .as_tab();

    for output in 0..MAX_INPUTS {
        describe_output_camera(desc, output);
    }

    desc.define_push_button_param(PARAM_CACHE_CLEAR_CURRENT_FRAME)
        .label("Clear Current Frame")
        .hint("Clear current frame values and cache")
        .enabled(true)
        .parent(PARAM_GROUP_OUTPUT);

    desc.define_push_button_param(PARAM_CACHE_CLEAR)
        .label("Clear All")
        .hint("Clear all output values and cache")
        .enabled(true)
        .parent(PARAM_GROUP_OUTPUT);
}

fn describe_output_camera(desc: &mut EffectDescriptor, output: usize) {
    let group = param_group_output_camera(output);
    desc.define_group_param(&group)
        .label(format!("Output {}", clip_name(output)))
        .parent(PARAM_GROUP_OUTPUT)
        .as_tab();

    // Output values are written by the plugin, never edited by the user.
    for (name, label, hint) in [
        (param_output_translate(output), "Translate", "Camera output translate"),
        (param_output_rotate(output), "Rotate", "Camera output rotate"),
        (param_output_scale(output), "Scale", "Camera output scale"),
    ] {
        desc.define_double3d_param(name)
            .label(label)
            .hint(hint)
            .animates(true)
            .enabled(false)
            .evaluate_on_change(false)
            .can_undo(false)
            .parent(&group);
    }

    desc.define_double2d_param(param_output_optical_center(output))
        .label("Optical Center")
        .hint("Camera output optical center")
        .display_range(-50.0, -50.0, 50.0, 50.0)
        .animates(true)
        .enabled(false)
        .use_host_overlay_handle(false)
        .evaluate_on_change(false)
        .can_undo(false)
        .parent(&group);

    for (name, label, hint, default) in [
        (
            param_output_focal_length(output),
            "Focal Length",
            "Camera output focal length",
            0.0,
        ),
        (
            param_output_near(output),
            "Near",
            "Camera output near distance",
            0.0,
        ),
        (
            param_output_far(output),
            "Far",
            "Camera output far distance",
            10000.0,
        ),
    ] {
        desc.define_double_param(name)
            .label(label)
            .hint(hint)
            .default_value(default)
            .display_range(0.0, 300.0)
            .animates(true)
            .enabled(false)
            .evaluate_on_change(false)
            .can_undo(false)
            .parent(&group);
    }

    for (k, name) in param_output_distortion_coefs(output)
        .into_iter()
        .enumerate()
    {
        let layout = if k == 3 {
            LayoutHint::Divider
        } else {
            LayoutHint::Normal
        };
        desc.define_double_param(name)
            .label(format!("Lens Distortion Coef{}", k + 1))
            .hint(format!("Lens distortion coefficient {}", k + 1))
            .range(-1.0, 1.0)
            .display_range(-1.0, 1.0)
            .enabled(false)
            .evaluate_on_change(false)
            .can_undo(false)
            .parent(&group)
            .layout_hint(layout);
    }

    let stats = param_output_stat_group(output);
    desc.define_group_param(&stats)
        .label("Statistics")
        .parent(&group)
        .open(false);

    let fields = [
        (
            param_output_stat_error_mean(output),
            "Error Mean",
            "Error Mean",
            (-1.0, 1.0),
        ),
        (
            param_output_stat_error_min(output),
            "Error Min",
            "Error Min",
            (-1.0, 1.0),
        ),
        (
            param_output_stat_error_max(output),
            "Error Max",
            "Error Max",
            (-1.0, 1.0),
        ),
        (
            param_output_stat_nb_matched_images(output),
            "Nb Matched Images",
            "Number of images matched in the 3D reconstruction.",
            (0.0, 50.0),
        ),
        (
            param_output_stat_nb_detected_features(output),
            "Nb Detected Features",
            "Number of features detected in the image.",
            (0.0, 50000.0),
        ),
        (
            param_output_stat_nb_matched_features(output),
            "Nb Matched Features",
            "Number of features from the image that match with 3D points.",
            (0.0, 5000.0),
        ),
        (
            param_output_stat_nb_inlier_features(output),
            "Nb Inliers Features",
            "Number of features validated / used for the camera pose localization.",
            (0.0, 2000.0),
        ),
    ];
    let last = fields.len() - 1;
    for (k, (name, label, hint, (min, max))) in fields.into_iter().enumerate() {
        let layout = if k == last {
            LayoutHint::Divider
        } else {
            LayoutHint::Normal
        };
        desc.define_double_param(name)
            .label(label)
            .hint(hint)
            .display_range(min, max)
            .enabled(false)
            .evaluate_on_change(false)
            .can_undo(false)
            .parent(&stats)
            .layout_hint(layout);
    }

    desc.define_push_button_param(param_output_create_camera(output))
        .label("Create Camera")
        .hint("Create a linked camera node in the host")
        .enabled(true)
        .parent(&group);
}

fn describe_cache(desc: &mut EffectDescriptor) {
    desc.define_string_param(PARAM_CACHE_SERIALIZED_RESULTS)
        .label("Localization Results Cache")
        .hint("Allow the plugin to store serialized computed results")
        .secret(true)
        .enabled(false)
        .animates(true)
        .string_type(StringType::SingleLine)
        .evaluate_on_change(false)
        .can_undo(false);

    desc.define_int_param(PARAM_FORCE_INVALIDATION)
        .label("Force Invalidation")
        .hint("Allow the plugin to force the host to render")
        .secret(true)
        .enabled(false)
        .can_undo(false);

    desc.define_int_param(PARAM_FORCE_INVALIDATION_AT_TIME)
        .label("Force Invalidation At Time")
        .hint("Allow the plugin to force the host to render at a specific time")
        .secret(true)
        .enabled(false)
        .can_undo(false);
}

impl PluginFactory for CameraLocalizerFactory {
    fn identifier(&self) -> &'static str {
        PLUGIN_IDENTIFIER
    }

    fn version(&self) -> (u32, u32) {
        (PLUGIN_VERSION_MAJOR, PLUGIN_VERSION_MINOR)
    }

    fn describe(&self, desc: &mut EffectDescriptor) {
        CameraLocalizerFactory::describe(self, desc);
    }

    fn describe_in_context(&self, desc: &mut EffectDescriptor, context: ContextKind) {
        CameraLocalizerFactory::describe_in_context(self, desc, context);
    }

    fn create_instance(
        &self,
        desc: &EffectDescriptor,
        context: ContextKind,
    ) -> Box<dyn PluginInstance> {
        log::info!("creating {PLUGIN_IDENTIFIER} instance ({})", context.name());
        Box::new(CameraLocalizerInstance::new(desc))
    }
}
