use anyhow::{bail, Context};
use layerkit::units::{format_feed_rate, FeedRateUnits};
use layerkit::{
    builtin_profiles, init_logging, load_settings, save_settings, GenericRepRapSettings, ProcessSettings,
    SingleMaterialFffSettings, BUILD_DATE, VERSION,
};
use std::path::Path;

const USAGE: &str = "\
Usage:
  layerkit validate <settings.(json|toml)>
  layerkit template <out.(json|toml)> [machine]
  layerkit machines
  layerkit --version";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd, path] if cmd == "validate" => validate(Path::new(path)),
        [cmd, path] if cmd == "template" => template(Path::new(path), None),
        [cmd, path, machine] if cmd == "template" => template(Path::new(path), Some(machine)),
        [cmd] if cmd == "machines" => {
            for machine in builtin_profiles() {
                println!(
                    "{:<12} {:<22} {} x {} x {} mm, travel up to {}",
                    machine.base.manufacturer_name,
                    machine.base.model_identifier,
                    machine.base.bed_size_x_mm,
                    machine.base.bed_size_y_mm,
                    machine.base.max_height_mm,
                    format_feed_rate(f64::from(machine.max_travel_speed_mmm), FeedRateUnits::MmPerSec)
                );
            }
            Ok(())
        }
        [flag] if flag == "--version" || flag == "-V" => {
            println!("layerkit {} ({})", VERSION, BUILD_DATE);
            Ok(())
        }
        _ => {
            eprintln!("{USAGE}");
            bail!("unrecognized arguments: {}", args.join(" "))
        }
    }
}

fn validate(path: &Path) -> anyhow::Result<()> {
    let settings: GenericRepRapSettings =
        load_settings(path).with_context(|| format!("reading {}", path.display()))?;
    let report = settings.validate();

    println!("{}: {}", settings.identifier(), report.worst());
    print!("{report}");

    if report.has_errors() {
        bail!("{} has invalid settings", path.display());
    }
    Ok(())
}

fn template(path: &Path, machine: Option<&String>) -> anyhow::Result<()> {
    let settings = match machine {
        Some(name) => {
            let machine = builtin_profiles()
                .into_iter()
                .find(|m| m.base.model_identifier.eq_ignore_ascii_case(name))
                .with_context(|| format!("no built-in machine named '{name}'"))?;
            SingleMaterialFffSettings::new(machine)
        }
        None => SingleMaterialFffSettings::default(),
    };
    save_settings(path, &settings).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!("Wrote default settings to {}", path.display());
    Ok(())
}
