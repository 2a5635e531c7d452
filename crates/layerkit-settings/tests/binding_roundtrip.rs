//! Round-trip law for the built-in bindings: for every value a binding
//! accepts, setting it and reading it back returns the same value.

use proptest::prelude::*;

use layerkit_settings::{
    fff_settings_collection, ProcessSettings, SettingValue, SettingsCollection,
    SingleMaterialFffSettings, UserSetting,
};

/// A candidate value of the binding's own type
fn arb_value(type_name: &'static str) -> BoxedStrategy<SettingValue> {
    match type_name {
        "bool" => any::<bool>().prop_map(SettingValue::Bool).boxed(),
        "float" => (-10.0f64..100.0).prop_map(SettingValue::Float).boxed(),
        "32-bit integer" => (-500i64..500).prop_map(SettingValue::Int).boxed(),
        "unsigned 32-bit integer" => (0i64..1000).prop_map(SettingValue::Int).boxed(),
        "integer" => any::<i32>().prop_map(|v| SettingValue::Int(i64::from(v))).boxed(),
        _ => "[A-Za-z0-9 ]{0,16}".prop_map(SettingValue::Text).boxed(),
    }
}

fn collection() -> SettingsCollection<SingleMaterialFffSettings> {
    fff_settings_collection()
}

/// A binding index paired with a candidate value of that binding's type
fn arb_binding_value() -> impl Strategy<Value = (usize, SettingValue)> {
    let types: Vec<&'static str> = collection().iter().map(|b| b.type_name()).collect();
    (0..types.len()).prop_flat_map(move |i| (Just(i), arb_value(types[i])))
}

proptest! {
    #[test]
    fn accepted_values_read_back((index, value) in arb_binding_value()) {
        let mut bindings = collection();
        let id = bindings.iter().nth(index).unwrap().id().to_string();
        prop_assume!(!bindings.find(&id).unwrap().validate(&value).is_error());

        let mut settings = SingleMaterialFffSettings::default();
        bindings.set_by_id(&mut settings, &id, value.clone()).unwrap();
        prop_assert_eq!(bindings.get_by_id(&settings, &id).unwrap(), value);
    }

    #[test]
    fn layer_height_roundtrip(h in 0.01f64..2.0) {
        let mut bindings = collection();
        let mut settings = SingleMaterialFffSettings::default();
        bindings.set_by_id(&mut settings, "layer_height_mm", SettingValue::Float(h)).unwrap();
        prop_assert_eq!(settings.layer_height_mm(), h);
        prop_assert_eq!(bindings.get_by_id(&settings, "layer_height_mm").unwrap(), SettingValue::Float(h));
    }
}

#[test]
fn test_snapshot_restores_settings() {
    let mut bindings = collection();
    let mut source = SingleMaterialFffSettings::default();
    bindings.set_by_id(&mut source, "shells", SettingValue::Int(6)).unwrap();
    bindings.set_by_id(&mut source, "fan_speed_x", SettingValue::Float(0.4)).unwrap();
    bindings.set_by_id(&mut source, "material_type", SettingValue::from("PETG")).unwrap();

    let mut target = SingleMaterialFffSettings::default();
    for (id, value) in bindings.snapshot(&source) {
        bindings.set_by_id(&mut target, &id, value).unwrap();
    }
    let mut expected = source.clone();
    expected.machine = target.machine.clone();
    assert_eq!(target, expected);
}

#[test]
fn test_every_binding_has_name_and_group() {
    let bindings = collection();
    for binding in bindings.iter() {
        assert!(!binding.name().is_empty(), "{}", binding.id());
        assert!(binding.group().is_some(), "{}", binding.id());
    }
}
