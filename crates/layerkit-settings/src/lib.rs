//! # LayerKit Settings
//!
//! Process settings and the machinery around them:
//! - `ProcessSettings`, the per-machine-class settings contract, with the
//!   single-material FFF implementation and its RepRap/Marlin leaves
//! - Setting bindings: type-safe, type-erased accessors for every field
//! - Sparse per-part overrides applied through the bindings
//! - Dialect selection and JSON/TOML persistence

pub mod binding;
pub mod collection;
pub mod dialect;
pub mod error;
pub mod fff;
pub mod overrides;
pub mod persistence;
pub mod process;
pub mod schema;

pub use binding::{SettingBinding, SettingGroup, SettingKind, SettingType, SettingValue, UserSetting};
pub use collection::SettingsCollection;
pub use dialect::{new_assembler, select_assembler};
pub use error::{SettingsError, SettingsResult};
pub use fff::{FffSettings, GenericRepRapSettings, MarlinSettings, SingleMaterialFffSettings};
pub use overrides::SettingsOverride;
pub use persistence::{load_settings, save_settings, SettingsFormat, SCHEMA_VERSION};
pub use process::{LayerRange, ProcessSettings, Profile, SpacingField};
pub use schema::{fff_settings_collection, marlin_settings_collection, reprap_settings_collection};
