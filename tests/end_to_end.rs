use layerkit::{
    builtin_profiles, load_settings, save_settings, GenerationSinks, GenericRepRapSettings, Generator, LayerRange,
    PlanError, PlannedLayer, PrintGenerator, PrintPart, ProcessSettings, SingleMaterialFffSettings, ToolpathCommand,
    ToolpathPlanner,
};

/// One square perimeter per layer
struct Square;

impl ToolpathPlanner<GenericRepRapSettings> for Square {
    type Model = (f64, usize);

    fn plan_part<'a>(
        &'a self,
        _part_index: usize,
        model: &'a (f64, usize),
        settings: &'a GenericRepRapSettings,
    ) -> Result<layerkit::LayerStream<'a>, PlanError> {
        let (side, layers) = *model;
        let height = settings.layer_height_mm;
        let speed = settings.outer_perimeter_speed();
        Ok(Box::new((0..layers).map(move |i| {
            let corners = [(side, 0.0), (side, side), (0.0, side), (0.0, 0.0)];
            let mut commands = vec![ToolpathCommand::Travel {
                x: 0.0,
                y: 0.0,
                z: None,
                speed: 9000.0,
            }];
            commands.extend(corners.iter().map(|&(x, y)| ToolpathCommand::Extrude {
                x,
                y,
                filament_mm: 0.4,
                speed,
            }));
            commands.push(ToolpathCommand::Retract);
            Ok::<_, PlanError>(PlannedLayer::new(i, height * (i + 1) as f64).with_commands(commands))
        })))
    }
}

#[test]
fn template_file_loads_and_generates() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("ender.toml");

    let machine = builtin_profiles()
        .into_iter()
        .find(|m| m.base.model_identifier == "Ender 3")
        .unwrap();
    save_settings(&settings_path, &SingleMaterialFffSettings::new(machine)).unwrap();

    let mut settings: GenericRepRapSettings = load_settings(&settings_path).unwrap();
    assert!(!settings.validate().has_errors(), "{}", settings.validate().summary());
    settings.layer_range_filter = LayerRange::new(0, 2);

    let generator = PrintGenerator::new(Square);
    let file = generator
        .generate_gcode(&[PrintPart::new((20.0, 5))], &settings, GenerationSinks::new())
        .unwrap();
    assert_eq!(file.layer_count(), 3);

    let gcode_path = dir.path().join("square.gcode");
    generator.save_gcode(&gcode_path, &file).unwrap();
    assert_eq!(generator.load_gcode(&gcode_path).unwrap(), file);
}
