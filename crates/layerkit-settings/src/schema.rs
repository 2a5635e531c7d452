//! Built-in binding collections
//!
//! Binding ids match the persisted field names, so an override file and a
//! settings file use the same keys.

use crate::binding::{SettingBinding, SettingGroup};
use crate::collection::SettingsCollection;
use crate::fff::{FffSettings, GenericRepRapSettings, MarlinSettings};
use layerkit_core::ValidationResult;

pub mod groups {
    use super::SettingGroup;

    pub const BASIC: SettingGroup = SettingGroup::new("basic", "Basic");
    pub const MATERIAL: SettingGroup = SettingGroup::new("material", "Material");
    pub const TEMPERATURE: SettingGroup = SettingGroup::new("temperature", "Temperatures");
    pub const RETRACTION: SettingGroup = SettingGroup::new("retraction", "Retraction");
    pub const SPEEDS: SettingGroup = SettingGroup::new("speeds", "Speeds");
    pub const TRAVEL: SettingGroup = SettingGroup::new("travel", "Travel");
    pub const SHELLS: SettingGroup = SettingGroup::new("shells", "Shells");
    pub const ROOF_FLOOR: SettingGroup = SettingGroup::new("roof_floor", "Roofs and Floors");
    pub const FILL: SettingGroup = SettingGroup::new("fill", "Infill");
    pub const FIRST_LAYERS: SettingGroup = SettingGroup::new("first_layers", "First Layers");
    pub const SUPPORT: SettingGroup = SettingGroup::new("support", "Support");
    pub const BRIDGING: SettingGroup = SettingGroup::new("bridging", "Bridging");
    pub const FILTERING: SettingGroup = SettingGroup::new("filtering", "Toolpath Filtering");
    pub const DEBUG: SettingGroup = SettingGroup::new("debug", "Debug");
}

/// Ids of the debug layer-range bindings
pub const LAYER_RANGE_IDS: [&str; 2] = ["layer_range_filter_min", "layer_range_filter_max"];

// Binding for a field of the underlying FFF settings, id = field name
macro_rules! fff_field {
    ($field:ident: $ty:ty, $name:literal, $group:expr) => {
        SettingBinding::<S, $ty>::named(
            stringify!($field),
            $name,
            |s: &S| s.fff().$field.clone(),
            |s: &mut S, v: $ty| s.fff_mut().$field = v,
        )
        .in_group($group)
    };
}

#[allow(clippy::ptr_arg)]
fn non_empty(v: &String) -> ValidationResult {
    if v.trim().is_empty() {
        ValidationResult::error("must not be empty")
    } else {
        ValidationResult::ok()
    }
}

fn temperature(v: &i32) -> ValidationResult {
    ValidationResult::in_range(f64::from(*v), 0.0, 500.0)
}

/// Every field of the FFF settings, grouped for display
pub fn fff_settings_collection<S: FffSettings>() -> SettingsCollection<S> {
    use groups::*;

    let mut c = SettingsCollection::new();

    c.push(fff_field!(identifier: String, "Profile Name", BASIC).with_validation(non_empty));
    c.push(
        fff_field!(layer_height_mm: f64, "Layer Height", BASIC)
            .with_description(|| "Height of each printed layer in mm".to_string())
            .with_validation(|v| ValidationResult::positive(*v)),
    );

    c.push(fff_field!(material_source: String, "Material Source", MATERIAL));
    c.push(fff_field!(material_type: String, "Material Type", MATERIAL).with_validation(non_empty));
    c.push(fff_field!(material_color: String, "Material Color", MATERIAL));

    c.push(
        fff_field!(extruder_temp_c: i32, "Extruder Temperature", TEMPERATURE)
            .with_validation(temperature),
    );
    c.push(
        fff_field!(heated_bed_temp_c: i32, "Bed Temperature", TEMPERATURE)
            .with_description(|| "0 leaves the bed unheated".to_string())
            .with_validation(temperature),
    );

    c.push(fff_field!(enable_retraction: bool, "Enable Retraction", RETRACTION));
    c.push(
        fff_field!(retract_distance_mm: f64, "Retract Distance", RETRACTION)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(
        fff_field!(min_retract_travel_length: f64, "Min Retract Travel", RETRACTION)
            .with_description(|| "Shorter travel moves do not retract".to_string())
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );

    c.push(
        fff_field!(retract_speed: f64, "Retract Speed", SPEEDS)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(z_travel_speed: f64, "Z Travel Speed", SPEEDS)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(rapid_travel_speed: f64, "Travel Speed", SPEEDS)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(careful_extrude_speed: f64, "First Layer Speed", SPEEDS)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(rapid_extrude_speed: f64, "Print Speed", SPEEDS)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(min_extrude_speed: f64, "Min Print Speed", SPEEDS)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(outer_perimeter_speed_x: f64, "Outer Perimeter Speed Multiplier", SPEEDS)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(
        fff_field!(fan_speed_x: f64, "Fan Speed", SPEEDS)
            .with_validation(|v| ValidationResult::unit_interval(*v)),
    );

    c.push(fff_field!(travel_lift_enabled: bool, "Enable Z-Lift", TRAVEL));
    c.push(
        fff_field!(travel_lift_height: f64, "Z-Lift Height", TRAVEL)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(
        fff_field!(travel_lift_distance_threshold: f64, "Z-Lift Min Distance", TRAVEL)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );

    c.push(fff_field!(shells: u32, "Shells", SHELLS));
    c.push(fff_field!(interior_solid_region_shells: u32, "Interior Solid Shells", SHELLS));
    c.push(fff_field!(outer_shell_last: bool, "Outer Shell Last", SHELLS));
    c.push(
        fff_field!(shells_fill_nozzle_diam_step_x: f64, "Shell Spacing", SHELLS)
            .with_description(|| "Multiplier on nozzle diameter; below 1 overlaps".to_string())
            .with_validation(|v| ValidationResult::positive(*v)),
    );

    c.push(fff_field!(roof_layers: u32, "Roof Layers", ROOF_FLOOR));
    c.push(fff_field!(floor_layers: u32, "Floor Layers", ROOF_FLOOR));

    c.push(
        fff_field!(solid_fill_nozzle_diam_step_x: f64, "Solid Fill Spacing", FILL)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(solid_fill_border_overlap_x: f64, "Solid Fill Overlap", FILL)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(
        fff_field!(sparse_linear_infill_step_x: f64, "Infill Spacing", FILL)
            .with_description(|| "Multiplier on solid fill spacing".to_string())
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(sparse_fill_border_overlap_x: f64, "Infill Overlap", FILL)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );

    c.push(fff_field!(start_layers: u32, "Start Layers", FIRST_LAYERS));
    c.push(
        fff_field!(start_layer_height_mm: f64, "Start Layer Height", FIRST_LAYERS)
            .with_description(|| "0 uses the regular layer height".to_string())
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );

    c.push(fff_field!(generate_support: bool, "Generate Support", SUPPORT));
    c.push(
        fff_field!(support_overhang_angle_deg: f64, "Overhang Angle", SUPPORT)
            .with_validation(|v| ValidationResult::in_range(*v, 0.0, 90.0)),
    );
    c.push(
        fff_field!(support_spacing_step_x: f64, "Support Spacing", SUPPORT)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(support_volume_scale: f64, "Support Volume Scale", SUPPORT)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(fff_field!(enable_support_shell: bool, "Support Shell", SUPPORT));
    c.push(fff_field!(support_area_offset_x: f64, "Support Area Offset", SUPPORT));
    c.push(
        fff_field!(support_solid_space: f64, "Support Gap", SUPPORT)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(
        fff_field!(support_region_join_tol_x: f64, "Support Join Tolerance", SUPPORT)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(fff_field!(enable_support_release_opt: bool, "Support Release", SUPPORT));
    c.push(
        fff_field!(support_release_gap: f64, "Support Release Gap", SUPPORT)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(
        fff_field!(support_min_dimension: f64, "Min Support Size", SUPPORT)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(fff_field!(support_min_z_tips: bool, "Support Tips", SUPPORT));
    c.push(
        fff_field!(support_point_diam: f64, "Support Point Diameter", SUPPORT)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(support_point_sides: u32, "Support Point Sides", SUPPORT).with_validation(|v| {
            if *v < 3 {
                ValidationResult::error("at least 3 sides are required")
            } else {
                ValidationResult::ok()
            }
        }),
    );

    c.push(fff_field!(enable_bridging: bool, "Enable Bridging", BRIDGING));
    c.push(
        fff_field!(max_bridge_width_mm: f64, "Max Bridge Width", BRIDGING)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(
        fff_field!(bridge_fill_nozzle_diam_step_x: f64, "Bridge Spacing", BRIDGING)
            .with_validation(|v| ValidationResult::positive(*v)),
    );
    c.push(
        fff_field!(bridge_volume_scale: f64, "Bridge Volume Scale", BRIDGING)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(
        fff_field!(bridge_extrude_speed_x: f64, "Bridge Speed", BRIDGING)
            .with_validation(|v| ValidationResult::positive(*v)),
    );

    c.push(
        fff_field!(min_layer_time: f64, "Min Layer Time", FILTERING)
            .with_description(|| "Seconds".to_string())
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );
    c.push(fff_field!(clip_self_overlaps: bool, "Clip Self-Overlaps", FILTERING));
    c.push(
        fff_field!(self_overlap_tolerance_x: f64, "Self-Overlap Tolerance", FILTERING)
            .with_validation(|v| ValidationResult::non_negative(*v)),
    );

    c.push(
        SettingBinding::<S, i64>::named(
            LAYER_RANGE_IDS[0],
            "First Layer to Generate",
            |s: &S| s.fff().layer_range_filter.min,
            |s: &mut S, v| s.fff_mut().layer_range_filter.min = v,
        )
        .in_group(DEBUG),
    );
    c.push(
        SettingBinding::<S, i64>::named(
            LAYER_RANGE_IDS[1],
            "Last Layer to Generate",
            |s: &S| s.fff().layer_range_filter.max,
            |s: &mut S, v| s.fff_mut().layer_range_filter.max = v,
        )
        .in_group(DEBUG),
    );

    c
}

fn without_debug<S: FffSettings>(mut c: SettingsCollection<S>) -> SettingsCollection<S> {
    for id in LAYER_RANGE_IDS {
        if let Err(e) = c.hide(id) {
            tracing::warn!("Cannot hide {}: {}", id, e);
        }
    }
    c
}

pub fn reprap_settings_collection() -> SettingsCollection<GenericRepRapSettings> {
    without_debug(fff_settings_collection())
}

pub fn marlin_settings_collection() -> SettingsCollection<MarlinSettings> {
    without_debug(fff_settings_collection())
}
