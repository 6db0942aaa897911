use camera_localizer::definition::*;
use camera_localizer::{plugin_registry, CameraLocalizerFactory};
use camera_localizer_core::{
    ContextKind, EffectDescriptor, LayoutHint, ParamKind, Range, StringType, INFINITE_MAX_INT,
};
use std::collections::{HashMap, HashSet};

fn describe() -> EffectDescriptor {
    let factory = CameraLocalizerFactory::with_env(&HashMap::new());
    let mut desc = EffectDescriptor::new();
    factory.describe(&mut desc);
    factory.describe_in_context(&mut desc, ContextKind::General);
    desc
}

fn kind<'a>(desc: &'a EffectDescriptor, name: &str) -> &'a ParamKind {
    &desc
        .param(name)
        .unwrap_or_else(|| panic!("missing parameter {name}"))
        .kind
}

#[test]
fn clip_topology() {
    let desc = describe();
    let names: Vec<&str> = desc.clips().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["Source", "Source1", "Source2", "Source3", "Source4", "Output"]
    );
    let mandatory: Vec<&str> = desc
        .clips()
        .iter()
        .filter(|c| !c.optional)
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(mandatory, ["Source", "Output"]);
    assert!(desc.clips().iter().all(|c| !c.supports_tiles && !c.is_mask));
}

#[test]
fn registry_descriptor_validates_in_supported_contexts() {
    for context in [ContextKind::Filter, ContextKind::General, ContextKind::Paint] {
        let desc = plugin_registry()
            .describe_plugin(PLUGIN_IDENTIFIER, context)
            .expect("valid descriptor");
        assert_eq!(desc.params().len(), describe().params().len());
    }
}

#[test]
fn per_input_names_are_unique() {
    let desc = describe();
    let mut seen = HashSet::new();
    for param in desc.params() {
        assert!(seen.insert(param.name.as_str()), "duplicate {}", param.name);
    }
    for input in 0..MAX_INPUTS {
        assert!(desc.param(&param_input_is_grayscale(input)).is_some());
        assert!(desc.param(&param_output_create_camera(input)).is_some());
    }
}

#[test]
fn tabs_in_host_order() {
    let desc = describe();
    let tabs: Vec<&str> = desc.tabs().map(|p| p.name.as_str()).collect();
    let mut expected = vec![PARAM_GROUP_MAIN.to_owned()];
    expected.extend((0..MAX_INPUTS).map(param_group_input));
    expected.push(PARAM_GROUP_ADVANCED.to_owned());
    expected.push(PARAM_GROUP_TRACKING.to_owned());
    expected.push(PARAM_GROUP_OUTPUT.to_owned());
    expected.extend((0..MAX_INPUTS).map(param_group_output_camera));
    assert_eq!(tabs, expected);

    let input_tab = desc.param(&param_group_input(2)).expect("input tab");
    assert_eq!(input_tab.label, "Input Source2");
    assert_eq!(input_tab.parent.as_deref(), Some(PARAM_GROUP_MAIN));
}

#[test]
fn output_index_starts_hidden_behind_a_single_input() {
    let desc = describe();
    let param = desc.param(PARAM_OUTPUT_INDEX).expect("output index");
    assert!(!param.enabled);
    assert!(!param.animates);
    assert_eq!(param.layout_hint, LayoutHint::Divider);
    let ParamKind::Int(p) = &param.kind else {
        panic!("output index is not an int");
    };
    assert_eq!(p.range, Range::new(0, MAX_INPUTS as i32));
    assert_eq!(p.display_range, Range::new(0, 0));

    let first_main_child = desc
        .children(PARAM_GROUP_MAIN)
        .next()
        .expect("main tab has children");
    assert_eq!(first_main_child.name, PARAM_OUTPUT_INDEX);
}

#[test]
fn file_parameters_must_exist() {
    let desc = describe();
    for (name, string_type) in [
        (PARAM_RECONSTRUCTION_FILE, StringType::FilePath),
        (PARAM_DESCRIPTORS_FOLDER, StringType::DirectoryPath),
        (PARAM_VOCTREE_FILE, StringType::FilePath),
    ] {
        let ParamKind::String(p) = kind(&desc, name) else {
            panic!("{name} is not a string");
        };
        assert_eq!(p.string_type, string_type);
        assert!(p.file_path_exists, "{name} must exist");
    }
    let ParamKind::String(voctree) = kind(&desc, PARAM_VOCTREE_FILE) else {
        unreachable!();
    };
    assert!(voctree.default.is_empty());
}

#[test]
fn lens_calibration_group_is_closed() {
    let desc = describe();
    let ParamKind::Group(group) = kind(&desc, &param_input_group_lens_calibration(0)) else {
        panic!("lens calibration is not a group");
    };
    assert!(!group.tab);
    assert!(!group.open);

    let lens_group = param_input_group_lens_calibration(0);
    let children: Vec<&str> = desc
        .children(&lens_group)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(children.len(), 11);
    assert!(children.contains(&param_input_distortion_coef4(0).as_str()));
}

#[test]
fn overlay_parameters_do_not_trigger_evaluation() {
    let desc = describe();
    for name in OVERLAY_PARAMS {
        let param = desc.param(name).expect("overlay param");
        assert!(!param.evaluate_on_change, "{name} evaluates on change");
        assert_eq!(param.parent.as_deref(), Some(PARAM_ADVANCED_GROUP_OVERLAY));
    }
    let ParamKind::Int(window) = kind(&desc, PARAM_OVERLAY_TRACKS_WINDOW_SIZE) else {
        panic!("window size is not an int");
    };
    assert_eq!(window.default, 3);
    assert_eq!(window.range, Range::new(0, INFINITE_MAX_INT));
}

#[test]
fn advanced_defaults() {
    let desc = describe();
    let double = |name: &str| match kind(&desc, name) {
        ParamKind::Double(p) => p.default,
        other => panic!("{name} is {}", other.type_name()),
    };
    let int = |name: &str| match kind(&desc, name) {
        ParamKind::Int(p) => p.default,
        other => panic!("{name} is {}", other.type_name()),
    };
    assert_eq!(double(PARAM_REPROJECTION_ERROR), 4.0);
    assert_eq!(double(PARAM_DISTANCE_RATIO), 0.8);
    assert_eq!(int(PARAM_NB_IMAGE_MATCH), 4);
    assert_eq!(int(PARAM_MAX_RESULTS), 10);
    assert_eq!(int(PARAM_MATCHING_ERROR), 4);
    assert_eq!(int(PARAM_CCTAG_NB_NEAREST_KEYFRAMES), 5);
    assert_eq!(int(PARAM_BA_MIN_POINT_VISIBILITY), 0);
    assert_eq!(double(&param_output_far(3)), 10000.0);

    let ParamKind::Choice(algorithm) = kind(&desc, PARAM_ALGORITHM) else {
        panic!("algorithm is not a choice");
    };
    assert_eq!(algorithm.options[algorithm.default], "AllResults");
}

#[test]
fn output_values_are_read_only() {
    let desc = describe();
    for name in [
        param_output_translate(1),
        param_output_rotate(1),
        param_output_scale(1),
        param_output_stat_nb_inlier_features(1),
    ] {
        let param = desc.param(&name).expect("output param");
        assert!(!param.enabled, "{name} is editable");
        assert!(!param.can_undo, "{name} is undoable");
        assert!(!param.evaluate_on_change, "{name} evaluates on change");
    }
    let buttons: Vec<&str> = desc
        .children(PARAM_GROUP_OUTPUT)
        .filter(|p| matches!(p.kind, ParamKind::PushButton(_)))
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(buttons, [PARAM_CACHE_CLEAR_CURRENT_FRAME, PARAM_CACHE_CLEAR]);
}

#[test]
fn cache_parameters_are_hidden() {
    let desc = describe();
    for name in [
        PARAM_CACHE_SERIALIZED_RESULTS,
        PARAM_FORCE_INVALIDATION,
        PARAM_FORCE_INVALIDATION_AT_TIME,
    ] {
        let param = desc.param(name).expect("cache param");
        assert!(param.secret && !param.enabled && !param.can_undo);
        assert_eq!(param.parent, None);
    }
}

#[test]
fn descriptor_round_trips_through_json_file() {
    let desc = describe();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("camera_localizer.json");
    desc.write_json(&path).expect("write");
    let loaded = EffectDescriptor::load_json(&path).expect("load");
    assert_eq!(loaded, desc);
}
