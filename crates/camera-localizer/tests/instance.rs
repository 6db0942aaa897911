use approx::assert_relative_eq;
use camera_localizer::definition::*;
use camera_localizer::{
    CameraIntrinsics, CameraLocalizerFactory, CameraLocalizerInstance, CameraPose, CameraResult,
    CacheError, FrameResult, InstanceError, LocalizationStats, ParamChange, ResultsCache,
    SfmDataSummary,
};
use camera_localizer_core::{ContextKind, EffectDescriptor, Range};
use nalgebra::{Matrix3, Vector3};
use std::collections::HashMap;

fn descriptor() -> EffectDescriptor {
    let factory = CameraLocalizerFactory::with_env(&HashMap::new());
    let mut desc = EffectDescriptor::new();
    factory.describe(&mut desc);
    factory.describe_in_context(&mut desc, ContextKind::General);
    desc
}

fn instance() -> CameraLocalizerInstance {
    CameraLocalizerInstance::new(&descriptor())
}

fn frame(cameras: usize, inliers: u32) -> FrameResult {
    let camera = CameraResult {
        pose: Some(CameraPose::new(
            Matrix3::identity(),
            Vector3::new(0.5, 1.5, -2.0),
        )),
        intrinsics: CameraIntrinsics {
            focal_length: 35.0,
            optical_center: [0.1, -0.2],
            distortion: [0.01, -0.002, 0.0, 0.0],
            near: 0.1,
            far: 500.0,
        },
        stats: LocalizationStats::new(0.4, 0.05, 1.9, 4, 5200, inliers * 2, inliers)
            .expect("stats"),
    };
    FrameResult {
        cameras: vec![camera; cameras],
    }
}

#[test]
fn new_instance_shows_only_the_first_input() {
    let inst = instance();
    assert_eq!(inst.connected_inputs(), 1);
    assert_eq!(inst.params().is_secret(&param_group_input(0)), Ok(false));
    assert_eq!(
        inst.params().is_secret(&param_group_output_camera(0)),
        Ok(false)
    );
    for input in 1..MAX_INPUTS {
        assert_eq!(inst.params().is_secret(&param_group_input(input)), Ok(true));
        assert_eq!(
            inst.params().is_secret(&param_group_output_camera(input)),
            Ok(true)
        );
    }
    assert_eq!(inst.params().is_enabled(PARAM_OUTPUT_INDEX), Ok(false));
}

#[test]
fn connected_inputs_drive_output_index_and_tabs() {
    let mut inst = instance();
    inst.set_connected_inputs(3).expect("connect");
    let params = inst.params();
    assert_eq!(params.int_display_range(PARAM_OUTPUT_INDEX), Ok(Range::new(0, 2)));
    assert_eq!(params.is_enabled(PARAM_OUTPUT_INDEX), Ok(true));
    for input in 0..MAX_INPUTS {
        let hidden = input >= 3;
        assert_eq!(params.is_secret(&param_group_input(input)), Ok(hidden));
        assert_eq!(params.is_secret(&param_group_output_camera(input)), Ok(hidden));
    }

    inst.params_mut()
        .set_int(PARAM_OUTPUT_INDEX, 2)
        .expect("select camera");
    inst.set_connected_inputs(1).expect("disconnect");
    assert_eq!(inst.params().is_enabled(PARAM_OUTPUT_INDEX), Ok(false));
    assert_eq!(inst.params().get_int(PARAM_OUTPUT_INDEX), Ok(0));

    assert!(matches!(
        inst.set_connected_inputs(MAX_INPUTS + 1),
        Err(InstanceError::InputCount { .. })
    ));
}

#[test]
fn store_result_writes_outputs_and_serialized_cache() {
    let mut inst = instance();
    inst.set_connected_inputs(2).expect("connect");
    inst.store_result(12.0, frame(2, 300)).expect("store");

    let params = inst.params();
    assert_eq!(
        params.get_double3d(&param_output_translate(1)),
        Ok([0.5, 1.5, -2.0])
    );
    assert_eq!(params.get_double(&param_output_focal_length(0)), Ok(35.0));
    assert_eq!(params.get_double(&param_output_far(0)), Ok(500.0));
    assert_eq!(
        params.get_double(&param_output_stat_nb_inlier_features(1)),
        Ok(300.0)
    );
    assert_eq!(
        params.get_double(&param_output_stat_nb_matched_features(1)),
        Ok(600.0)
    );
    let rotate = params
        .get_double3d(&param_output_rotate(0))
        .expect("rotate");
    assert_relative_eq!(rotate[0].abs(), 180.0, epsilon = 1e-9);

    let serialized = params
        .get_string(PARAM_CACHE_SERIALIZED_RESULTS)
        .expect("cache string");
    assert!(!serialized.is_empty());

    // A new instance over the saved values restores the cache.
    let mut desc = descriptor();
    if let Some(param) = desc.param_mut(PARAM_CACHE_SERIALIZED_RESULTS) {
        if let camera_localizer_core::ParamKind::String(p) = &mut param.kind {
            p.default = serialized.to_owned();
        }
    }
    let restored = CameraLocalizerInstance::new(&desc);
    assert_eq!(restored.cache().frames().collect::<Vec<_>>(), [12]);
}

#[test]
fn strong_distortion_is_cached_and_clamped_in_outputs() {
    let mut inst = instance();
    let mut result = frame(1, 80);
    result.cameras[0].intrinsics.distortion = [1.5, -2.0, 0.25, 0.0];
    inst.store_result(3.0, result).expect("store");

    let cached = inst.cache().get(3).expect("frame 3 is cached");
    assert_eq!(cached.cameras[0].intrinsics.distortion[0], 1.5);
    let params = inst.params();
    assert_eq!(params.get_double(&param_output_distortion_coef1(0)), Ok(1.0));
    assert_eq!(params.get_double(&param_output_distortion_coef2(0)), Ok(-1.0));
    assert_eq!(params.get_double(&param_output_distortion_coef3(0)), Ok(0.25));
    assert_eq!(
        params.get_double3d(&param_output_translate(0)),
        Ok([0.5, 1.5, -2.0])
    );

    let serialized = params
        .get_string(PARAM_CACHE_SERIALIZED_RESULTS)
        .expect("cache string");
    let reloaded = ResultsCache::deserialize(serialized).expect("reload");
    assert_eq!(
        reloaded.get(3).map(|f| f.cameras[0].intrinsics.distortion),
        Some([1.5, -2.0, 0.25, 0.0])
    );
}

#[test]
fn non_finite_result_changes_nothing() {
    let mut inst = instance();
    inst.store_result(1.0, frame(1, 40)).expect("store");
    let serialized = inst
        .params()
        .get_string(PARAM_CACHE_SERIALIZED_RESULTS)
        .expect("cache string")
        .to_owned();

    let mut result = frame(1, 90);
    result.cameras[0].intrinsics.focal_length = f64::NAN;
    assert!(matches!(
        inst.store_result(2.0, result),
        Err(InstanceError::Cache(CacheError::NonFinite {
            field: "focal_length",
            ..
        }))
    ));
    assert_eq!(inst.cache().frames().collect::<Vec<_>>(), [1]);
    assert_eq!(
        inst.params().get_string(PARAM_CACHE_SERIALIZED_RESULTS),
        Ok(serialized.as_str())
    );
    assert_eq!(
        inst.params().get_double(&param_output_stat_nb_inlier_features(0)),
        Ok(40.0)
    );
    assert!(LocalizationStats::new(f64::NAN, 0.0, 0.0, 0, 100, 0, 0).is_err());
}

#[test]
fn damaged_frame_does_not_drop_the_rest_of_the_cache() {
    let mut inst = instance();
    inst.store_result(1.0, frame(1, 40)).expect("store");
    inst.store_result(2.0, frame(1, 50)).expect("store");
    let serialized = inst
        .params()
        .get_string(PARAM_CACHE_SERIALIZED_RESULTS)
        .expect("cache string");
    let mut json: serde_json::Value = serde_json::from_str(serialized).expect("json");
    json["2"]["cameras"][0]["stats"]["error_mean"] = serde_json::Value::Null;

    let mut desc = descriptor();
    if let Some(param) = desc.param_mut(PARAM_CACHE_SERIALIZED_RESULTS) {
        if let camera_localizer_core::ParamKind::String(p) = &mut param.kind {
            p.default = json.to_string();
        }
    }
    let restored = CameraLocalizerInstance::new(&desc);
    assert_eq!(restored.cache().frames().collect::<Vec<_>>(), [1]);
}

#[test]
fn restore_outputs_follows_the_cache() {
    let mut inst = instance();
    inst.store_result(1.0, frame(1, 100)).expect("store");
    assert!(!inst.restore_outputs(2.0).expect("nothing cached"));
    assert_eq!(
        inst.params().get_double(&param_output_focal_length(0)),
        Ok(0.0)
    );
    assert!(inst.restore_outputs(1.0).expect("restore"));
    assert_eq!(
        inst.params().get_double(&param_output_focal_length(0)),
        Ok(35.0)
    );
}

#[test]
fn clear_current_frame_only_drops_that_frame() {
    let mut inst = instance();
    inst.store_result(4.0, frame(1, 50)).expect("store");
    inst.store_result(5.0, frame(1, 60)).expect("store");

    let change = inst
        .changed_param(PARAM_CACHE_CLEAR_CURRENT_FRAME, 5.0)
        .expect("clear frame");
    assert_eq!(change, ParamChange::ClearedFrame { frame: 5 });
    assert_eq!(inst.cache().frames().collect::<Vec<_>>(), [4]);
    assert_eq!(inst.invalidation().force_invalidation_at_time, 5);
    assert_eq!(
        inst.params().get_int(PARAM_FORCE_INVALIDATION_AT_TIME),
        Ok(5)
    );
    assert_eq!(
        inst.params().get_double3d(&param_output_translate(0)),
        Ok([0.0; 3])
    );
}

#[test]
fn clear_all_empties_the_cache() {
    let mut inst = instance();
    inst.store_result(4.0, frame(1, 50)).expect("store");
    inst.store_result(5.0, frame(1, 60)).expect("store");
    let before = inst.invalidation().force_invalidation;

    let change = inst.changed_param(PARAM_CACHE_CLEAR, 5.0).expect("clear");
    assert_eq!(change, ParamChange::ClearedAll { frames: 2 });
    assert!(inst.cache().is_empty());
    assert_eq!(inst.invalidation().force_invalidation, before + 1);
    assert_eq!(
        inst.params().get_string(PARAM_CACHE_SERIALIZED_RESULTS),
        Ok("")
    );
}

#[test]
fn processing_parameters_invalidate_results() {
    let mut inst = instance();
    inst.store_result(4.0, frame(1, 50)).expect("store");

    inst.params_mut()
        .set_double(PARAM_DISTANCE_RATIO, 0.6)
        .expect("ratio");
    let change = inst
        .changed_param(PARAM_DISTANCE_RATIO, 4.0)
        .expect("changed");
    assert_eq!(
        change,
        ParamChange::Invalidated {
            frames: 1,
            ui_updated: false
        }
    );
    assert!(inst.cache().is_empty());
}

#[test]
fn overlay_and_output_selection_keep_results() {
    let mut inst = instance();
    inst.store_result(4.0, frame(1, 50)).expect("store");

    assert_eq!(
        inst.changed_param(PARAM_OVERLAY_MATCHED_FEATURES, 4.0)
            .expect("overlay"),
        ParamChange::Redraw
    );
    assert_eq!(
        inst.changed_param(PARAM_OUTPUT_INDEX, 4.0).expect("output"),
        ParamChange::Redraw
    );
    assert_eq!(
        inst.changed_param(PARAM_SFM_DATA_NB_VIEWS, 4.0)
            .expect("sfm data"),
        ParamChange::None
    );
    assert_eq!(
        inst.changed_param(&param_output_create_camera(3), 4.0)
            .expect("create camera"),
        ParamChange::CreateCamera { output: 3 }
    );
    assert_eq!(inst.cache().len(), 1);
}

#[test]
fn tracking_range_mode_enables_bounds() {
    let mut inst = instance();
    assert_eq!(inst.params().is_enabled(PARAM_TRACKING_RANGE_MIN), Ok(false));
    assert_eq!(inst.params().is_enabled(PARAM_TRACKING_TRACK), Ok(false));

    inst.params_mut()
        .set_choice(PARAM_TRACKING_RANGE_MODE, TrackingRangeMode::Custom.index())
        .expect("custom");
    assert_eq!(
        inst.changed_param(PARAM_TRACKING_RANGE_MODE, 0.0)
            .expect("mode"),
        ParamChange::UiUpdated
    );
    assert_eq!(inst.params().is_enabled(PARAM_TRACKING_RANGE_MIN), Ok(true));
    assert_eq!(inst.params().is_enabled(PARAM_TRACKING_RANGE_MAX), Ok(true));

    inst.params_mut()
        .set_string(PARAM_RECONSTRUCTION_FILE, "/data/sfm.abc")
        .expect("reconstruction");
    let change = inst
        .changed_param(PARAM_RECONSTRUCTION_FILE, 0.0)
        .expect("reconstruction");
    assert!(matches!(
        change,
        ParamChange::Invalidated {
            ui_updated: true,
            ..
        }
    ));
    assert_eq!(inst.params().is_enabled(PARAM_TRACKING_TRACK), Ok(true));
}

#[test]
fn rig_mode_enables_calibration_file() {
    let mut inst = instance();
    assert_eq!(inst.params().is_enabled(PARAM_RIG_CALIBRATION_FILE), Ok(false));
    inst.params_mut()
        .set_choice(PARAM_RIG_MODE, RigMode::Known.index())
        .expect("known");
    inst.changed_param(PARAM_RIG_MODE, 0.0).expect("rig mode");
    assert_eq!(inst.params().is_enabled(PARAM_RIG_CALIBRATION_FILE), Ok(true));
}

#[test]
fn unknown_lens_disables_dependent_parameters() {
    let mut inst = instance();
    let input = 1;
    assert_eq!(
        inst.params().is_enabled(&param_input_distortion_coef4(input)),
        Ok(false),
        "radial3 reads three coefficients"
    );

    inst.params_mut()
        .set_choice(
            &param_input_focal_length_mode(input),
            FocalLengthMode::Unknown.index(),
        )
        .expect("focal mode");
    inst.changed_param(&param_input_focal_length_mode(input), 0.0)
        .expect("focal mode");
    assert_eq!(
        inst.params().is_enabled(&param_input_focal_length(input)),
        Ok(false)
    );
    assert_eq!(
        inst.params()
            .is_enabled(&param_input_focal_length_varying(input)),
        Ok(false)
    );
    assert_eq!(inst.params().is_enabled(&param_input_focal_length(0)), Ok(true));

    inst.params_mut()
        .set_choice(
            &param_input_distortion(input),
            LensDistortion::Unknown.index(),
        )
        .expect("distortion");
    inst.changed_param(&param_input_distortion(input), 0.0)
        .expect("distortion");
    assert_eq!(
        inst.params().is_enabled(&param_input_distortion_mode(input)),
        Ok(false)
    );
    for name in param_input_distortion_coefs(input) {
        assert_eq!(inst.params().is_enabled(&name), Ok(false));
    }
}

#[test]
fn distortion_model_enables_its_coefficients() {
    let mut inst = instance();
    let input = 2;
    for model in LensDistortionModel::ALL {
        inst.params_mut()
            .set_choice(&param_input_distortion_mode(input), model.index())
            .expect("model");
        inst.changed_param(&param_input_distortion_mode(input), 0.0)
            .expect("model change");
        let enabled: Vec<bool> = param_input_distortion_coefs(input)
            .iter()
            .map(|name| inst.params().is_enabled(name).expect("coefficient"))
            .collect();
        let used = model.coefficient_count();
        assert_eq!(
            enabled,
            (0..4).map(|k| k < used).collect::<Vec<_>>(),
            "{} enables {used} coefficients",
            model.label()
        );
    }
    assert_eq!(LensDistortionModel::Brown.coefficient_count(), 4);
    assert_eq!(LensDistortionModel::Fisheye4.coefficient_count(), 4);
}

#[test]
fn sfm_summary_fills_read_only_strings() {
    let mut inst = instance();
    inst.set_sfm_summary(&SfmDataSummary {
        views_root_path: "/data/images".into(),
        nb_views: 120,
        nb_poses: 118,
        nb_intrinsics: 1,
        nb_structures: 45000,
        nb_control_points: 0,
    })
    .expect("summary");
    let params = inst.params();
    assert_eq!(params.get_string(PARAM_SFM_DATA_VIEWS_ROOT_PATH), Ok("/data/images"));
    assert_eq!(params.get_string(PARAM_SFM_DATA_NB_POSES), Ok("118"));
    assert_eq!(params.get_string(PARAM_SFM_DATA_NB_STRUCTURES), Ok("45000"));
}

#[test]
fn settings_snapshot_covers_connected_inputs() {
    let mut inst = instance();
    inst.set_connected_inputs(2).expect("connect");
    let settings = inst.settings().expect("settings");
    assert_eq!(settings.inputs.len(), 2);
    assert_eq!(settings.features_type, FeaturesType::Sift);
    assert_eq!(settings.reconstruction_file, None);
}
