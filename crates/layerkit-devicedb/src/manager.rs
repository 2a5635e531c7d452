//! Machine profile library
//!
//! An ordered, id-keyed collection of FFF machine profiles with a set of
//! built-in machines, persisted as a single JSON document.

use crate::error::{DeviceError, DeviceResult, ProfileError};
use crate::model::{FffMachineInfo, MachineClass, MachineInfo};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct LibraryFile {
    profiles: Vec<FffMachineInfo>,
    active: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct MachineLibrary {
    profiles: Vec<FffMachineInfo>,
    active: Option<Uuid>,
}

impl MachineLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library holding the built-in machines
    pub fn with_builtins() -> Self {
        let profiles = builtin_profiles();
        let active = profiles.first().map(|p| p.base.model_uuid);
        Self { profiles, active }
    }

    /// Default location of the library file in the user's config directory
    pub fn default_path() -> DeviceResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("layerkit").join("machines.json"))
            .ok_or_else(|| DeviceError::LoadError {
                path: PathBuf::from("machines.json"),
                reason: "no configuration directory on this platform".to_string(),
            })
    }

    pub fn add(&mut self, profile: FffMachineInfo) -> DeviceResult<()> {
        let id = profile.base.model_uuid;
        if id.is_nil() {
            return Err(ProfileError::MissingField("model_uuid".to_string()).into());
        }
        if self.get(&id).is_some() {
            return Err(DeviceError::ProfileAlreadyExists(id.to_string()));
        }
        let report = profile.validate();
        if report.has_errors() {
            return Err(ProfileError::Invalid {
                profile: profile.base.model_identifier.clone(),
                issues: report.summary(),
            }
            .into());
        }
        tracing::debug!("Added machine profile {}", profile.base.model_identifier);
        self.profiles.push(profile);
        Ok(())
    }

    pub fn get(&self, id: &Uuid) -> Option<&FffMachineInfo> {
        self.profiles.iter().find(|p| p.base.model_uuid == *id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut FffMachineInfo> {
        self.profiles.iter_mut().find(|p| p.base.model_uuid == *id)
    }

    /// Find a profile by model identifier, ignoring case
    pub fn find_by_name(&self, model_identifier: &str) -> Option<&FffMachineInfo> {
        self.profiles
            .iter()
            .find(|p| p.base.model_identifier.eq_ignore_ascii_case(model_identifier))
    }

    pub fn remove(&mut self, id: &Uuid) -> DeviceResult<FffMachineInfo> {
        let pos = self
            .profiles
            .iter()
            .position(|p| p.base.model_uuid == *id)
            .ok_or_else(|| DeviceError::ProfileNotFound(id.to_string()))?;
        if self.active == Some(*id) {
            self.active = None;
        }
        Ok(self.profiles.remove(pos))
    }

    pub fn list(&self) -> &[FffMachineInfo] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn set_active(&mut self, id: &Uuid) -> DeviceResult<()> {
        if self.get(id).is_none() {
            return Err(DeviceError::ProfileNotFound(id.to_string()));
        }
        self.active = Some(*id);
        Ok(())
    }

    pub fn active(&self) -> Option<&FffMachineInfo> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    /// Load a library from a JSON file.
    ///
    /// Profiles that fail validation are kept but logged, so a user can fix
    /// them in an editor.
    pub fn load_from_file(path: &Path) -> DeviceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DeviceError::LoadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let file: LibraryFile =
            serde_json::from_str(&content).map_err(|e| DeviceError::LoadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut library = Self::new();
        for mut profile in file.profiles {
            profile.base.class = MachineClass::FilamentExtrusion;
            let id = profile.base.model_uuid;
            if library.get(&id).is_some() {
                tracing::warn!("Skipping duplicate machine profile {}", id);
                continue;
            }
            let report = profile.validate();
            if report.has_errors() {
                tracing::warn!(
                    "Machine profile {} has invalid values: {}",
                    profile.base.model_identifier,
                    report.summary()
                );
            }
            library.profiles.push(profile);
        }
        library.active = file.active.filter(|id| library.get(id).is_some());

        tracing::info!("Loaded {} machine profiles from {:?}", library.len(), path);
        Ok(library)
    }

    /// Save the library to a JSON file, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> DeviceResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DeviceError::SaveError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        let file = LibraryFile {
            profiles: self.profiles.clone(),
            active: self.active,
        };
        let content = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, content).map_err(|e| DeviceError::SaveError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn fff(
    manufacturer: &str,
    manufacturer_uuid: u128,
    model: &str,
    model_uuid: u128,
    bed: (f64, f64, f64),
) -> FffMachineInfo {
    FffMachineInfo {
        base: MachineInfo {
            manufacturer_name: manufacturer.to_string(),
            manufacturer_uuid: Uuid::from_u128(manufacturer_uuid),
            model_identifier: model.to_string(),
            model_uuid: Uuid::from_u128(model_uuid),
            class: MachineClass::FilamentExtrusion,
            bed_size_x_mm: bed.0,
            bed_size_y_mm: bed.1,
            max_height_mm: bed.2,
            ..MachineInfo::default()
        },
        ..FffMachineInfo::default()
    }
}

/// Machines shipped with the library
pub fn builtin_profiles() -> Vec<FffMachineInfo> {
    let generic = FffMachineInfo {
        min_layer_height_mm: 0.1,
        max_layer_height_mm: 0.3,
        ..fff(
            "Generic",
            0x1f0e_2c3a_0000_4000_8000_0000_0000_0001,
            "RepRap",
            0x1f0e_2c3a_0000_4000_8000_0000_0000_0101,
            (200.0, 200.0, 200.0),
        )
    };

    let prusa = FffMachineInfo {
        min_layer_height_mm: 0.05,
        max_layer_height_mm: 0.35,
        max_extruder_temp_c: 300,
        has_heated_bed: true,
        max_bed_temp_c: 120,
        max_extrude_speed_mmm: 80 * 60,
        max_travel_speed_mmm: 200 * 60,
        max_z_travel_speed_mmm: 12 * 60,
        max_retract_speed_mmm: 35 * 60,
        has_auto_bed_leveling: true,
        enable_auto_bed_leveling: true,
        ..fff(
            "Prusa",
            0x1f0e_2c3a_0000_4000_8000_0000_0000_0002,
            "i3 MK3",
            0x1f0e_2c3a_0000_4000_8000_0000_0000_0201,
            (250.0, 210.0, 210.0),
        )
    };

    let ender = FffMachineInfo {
        min_layer_height_mm: 0.1,
        max_layer_height_mm: 0.3,
        max_extruder_temp_c: 260,
        has_heated_bed: true,
        max_bed_temp_c: 100,
        max_z_travel_speed_mmm: 5 * 60,
        max_retract_speed_mmm: 45 * 60,
        ..fff(
            "Creality",
            0x1f0e_2c3a_0000_4000_8000_0000_0000_0003,
            "Ender 3",
            0x1f0e_2c3a_0000_4000_8000_0000_0000_0301,
            (220.0, 220.0, 250.0),
        )
    };

    let mini = FffMachineInfo {
        min_layer_height_mm: 0.1,
        max_layer_height_mm: 0.3,
        has_heated_bed: true,
        max_bed_temp_c: 60,
        ..fff(
            "Monoprice",
            0x1f0e_2c3a_0000_4000_8000_0000_0000_0004,
            "Select Mini",
            0x1f0e_2c3a_0000_4000_8000_0000_0000_0401,
            (120.0, 120.0, 120.0),
        )
    };

    let mut delta = fff(
        "Generic",
        0x1f0e_2c3a_0000_4000_8000_0000_0000_0001,
        "Delta",
        0x1f0e_2c3a_0000_4000_8000_0000_0000_0102,
        (180.0, 180.0, 300.0),
    );
    delta.base.bed_origin_factor_x = 0.5;
    delta.base.bed_origin_factor_y = 0.5;
    delta.min_layer_height_mm = 0.1;
    delta.max_layer_height_mm = 0.3;

    vec![generic, prusa, ender, mini, delta]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MachineProfile;
    use tempfile::tempdir;

    #[test]
    fn test_builtins_are_valid_and_unique() {
        let library = MachineLibrary::with_builtins();
        assert_eq!(library.len(), 5);
        for profile in library.list() {
            assert!(
                !profile.validate().has_errors(),
                "{} invalid",
                profile.base.model_identifier
            );
        }
        let mut ids: Vec<_> = library.list().iter().map(|p| p.base.model_uuid).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert!(library.active().is_some());
    }

    #[test]
    fn test_delta_origin_is_centered() {
        let library = MachineLibrary::with_builtins();
        let delta = library.find_by_name("delta").unwrap();
        assert_eq!(delta.origin_offset(), (90.0, 90.0));
    }

    #[test]
    fn test_add_rejects_duplicates_and_invalid() {
        let mut library = MachineLibrary::with_builtins();
        let existing = library.list()[0].clone();
        assert!(matches!(
            library.add(existing),
            Err(DeviceError::ProfileAlreadyExists(_))
        ));

        let mut broken = fff("X", 9, "Broken", 10, (0.0, 100.0, 100.0));
        broken.nozzle_diam_mm = 0.4;
        assert!(matches!(library.add(broken), Err(DeviceError::Validation(_))));

        let nil = FffMachineInfo::default();
        assert!(matches!(library.add(nil), Err(DeviceError::Validation(_))));
    }

    #[test]
    fn test_remove_clears_active() {
        let mut library = MachineLibrary::with_builtins();
        let id = library.active().unwrap().base.model_uuid;
        library.remove(&id).unwrap();
        assert!(library.active().is_none());
        assert!(matches!(
            library.remove(&id),
            Err(DeviceError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("machines.json");

        let mut library = MachineLibrary::with_builtins();
        let prusa_id = library.find_by_name("i3 MK3").unwrap().base.model_uuid;
        library.set_active(&prusa_id).unwrap();
        library.save_to_file(&path).unwrap();

        let loaded = MachineLibrary::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), library.len());
        assert_eq!(loaded.active().unwrap().base.model_uuid, prusa_id);
        assert_eq!(loaded.list(), library.list());
    }

    #[test]
    fn test_load_error_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = MachineLibrary::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_save_error_names_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("machines.json");

        let err = MachineLibrary::with_builtins().save_to_file(&path).unwrap_err();
        assert!(matches!(err, DeviceError::SaveError { .. }));
        assert!(err.to_string().contains("machines.json"));
    }
}
