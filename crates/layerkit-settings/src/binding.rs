//! Setting bindings
//!
//! A binding describes one user-facing setting of a settings type `S`
//! without runtime type inspection: it holds a display name, a group, and
//! three functions that load the value out of `S`, apply a value back into
//! `S`, and validate a candidate value.
//!
//! Bindings are stored behind the object-safe [`UserSetting`] trait so a
//! collection can hold settings of different value types. Values cross that
//! boundary as [`SettingValue`].
//!
//! For every value accepted by `validate`, `set(s, v)` followed by `get(s)`
//! returns `v`.

use layerkit_core::{ConfigurationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a type-erased value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    Bool,
    Int,
    Float,
    Text,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// A setting value with its type erased
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            Self::Bool(_) => SettingKind::Bool,
            Self::Int(_) => SettingKind::Int,
            Self::Float(_) => SettingKind::Float,
            Self::Text(_) => SettingKind::Text,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        bool::from_value(self)
    }

    pub fn as_i64(&self) -> Option<i64> {
        i64::from_value(self)
    }

    /// Numeric value, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        f64::from_value(self)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for SettingValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for SettingValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// A concrete value type a binding can store.
///
/// Conversion from [`SettingValue`] accepts the exact kind only, except that
/// integers widen to floats and in-range integers narrow to smaller integer
/// types.
pub trait SettingType: Clone + PartialEq + Default + fmt::Debug + Send + 'static {
    /// Human-readable type name used in mismatch errors
    const TYPE_NAME: &'static str;

    fn into_value(self) -> SettingValue;

    fn from_value(value: &SettingValue) -> Option<Self>;
}

impl SettingType for bool {
    const TYPE_NAME: &'static str = "bool";

    fn into_value(self) -> SettingValue {
        SettingValue::Bool(self)
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl SettingType for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn into_value(self) -> SettingValue {
        SettingValue::Int(self)
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl SettingType for i32 {
    const TYPE_NAME: &'static str = "32-bit integer";

    fn into_value(self) -> SettingValue {
        SettingValue::Int(i64::from(self))
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        i64::from_value(value).and_then(|v| i32::try_from(v).ok())
    }
}

impl SettingType for u32 {
    const TYPE_NAME: &'static str = "unsigned 32-bit integer";

    fn into_value(self) -> SettingValue {
        SettingValue::Int(i64::from(self))
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        i64::from_value(value).and_then(|v| u32::try_from(v).ok())
    }
}

impl SettingType for f64 {
    const TYPE_NAME: &'static str = "float";

    fn into_value(self) -> SettingValue {
        SettingValue::Float(self)
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        match value {
            SettingValue::Float(v) => Some(*v),
            SettingValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl SettingType for String {
    const TYPE_NAME: &'static str = "text";

    fn into_value(self) -> SettingValue {
        SettingValue::Text(self)
    }

    fn from_value(value: &SettingValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

/// Display grouping for settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingGroup {
    pub id: &'static str,
    pub name: &'static str,
}

impl SettingGroup {
    pub const fn new(id: &'static str, name: &'static str) -> Self {
        Self { id, name }
    }
}

/// Object-safe view of a binding over settings type `S`
pub trait UserSetting<S>: Send {
    /// Stable identifier, used by overrides and persistence
    fn id(&self) -> &str;

    fn name(&self) -> String;

    fn description(&self) -> Option<String>;

    fn group(&self) -> Option<SettingGroup>;

    fn is_hidden(&self) -> bool;

    fn set_hidden(&mut self, hidden: bool);

    /// Type name of the stored value
    fn type_name(&self) -> &'static str;

    /// Read the current value out of `settings`
    fn get(&self, settings: &S) -> SettingValue;

    /// Write `value` into `settings` and cache it.
    ///
    /// Fails with [`ConfigurationError::TypeMismatch`] when the value cannot
    /// be converted to the binding's type; `settings` is untouched then.
    fn set(&mut self, settings: &mut S, value: SettingValue) -> Result<(), ConfigurationError>;

    /// Check that `value` converts to the binding's type without writing it
    fn check_type(&self, value: &SettingValue) -> Result<(), ConfigurationError>;

    /// Validate a candidate value
    fn validate(&self, value: &SettingValue) -> ValidationResult;

    /// Validate the cached value
    fn validation(&self) -> ValidationResult;

    /// Refresh the cached value from `settings`
    fn load(&mut self, settings: &S);

    /// Write the cached value into `settings`
    fn apply(&self, settings: &mut S);

    /// The cached value
    fn value(&self) -> SettingValue;

    /// Replace the cached value without touching any settings
    fn set_value(&mut self, value: SettingValue) -> Result<(), ConfigurationError>;
}

type NameFn = Box<dyn Fn() -> String + Send>;
type LoadFn<S, V> = Box<dyn Fn(&S) -> V + Send>;
type ApplyFn<S, V> = Box<dyn Fn(&mut S, V) + Send>;
type ValidateFn<V> = Box<dyn Fn(&V) -> ValidationResult + Send>;

/// A binding from settings type `S` to a value of type `V`
pub struct SettingBinding<S, V: SettingType> {
    id: String,
    name: NameFn,
    description: Option<NameFn>,
    group: Option<SettingGroup>,
    hidden: bool,
    load: LoadFn<S, V>,
    apply: ApplyFn<S, V>,
    validate: Option<ValidateFn<V>>,
    value: V,
}

impl<S: 'static, V: SettingType> SettingBinding<S, V> {
    /// Create a binding with a lazily computed display name
    pub fn new(
        id: impl Into<String>,
        name: impl Fn() -> String + Send + 'static,
        load: impl Fn(&S) -> V + Send + 'static,
        apply: impl Fn(&mut S, V) + Send + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: Box::new(name),
            description: None,
            group: None,
            hidden: false,
            load: Box::new(load),
            apply: Box::new(apply),
            validate: None,
            value: V::default(),
        }
    }

    /// Create a binding with a fixed display name
    pub fn named(
        id: impl Into<String>,
        name: &'static str,
        load: impl Fn(&S) -> V + Send + 'static,
        apply: impl Fn(&mut S, V) + Send + 'static,
    ) -> Self {
        Self::new(id, move || name.to_string(), load, apply)
    }

    pub fn with_description(mut self, description: impl Fn() -> String + Send + 'static) -> Self {
        self.description = Some(Box::new(description));
        self
    }

    pub fn in_group(mut self, group: SettingGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_validation(
        mut self,
        validate: impl Fn(&V) -> ValidationResult + Send + 'static,
    ) -> Self {
        self.validate = Some(Box::new(validate));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Cached value with its concrete type
    pub fn typed_value(&self) -> &V {
        &self.value
    }

    fn convert(&self, value: &SettingValue) -> Result<V, ConfigurationError> {
        V::from_value(value).ok_or_else(|| ConfigurationError::TypeMismatch {
            setting: (self.name)(),
            expected: V::TYPE_NAME.to_string(),
            actual: value.kind().to_string(),
        })
    }

    fn check(&self, value: &V) -> ValidationResult {
        match &self.validate {
            Some(f) => f(value),
            None => ValidationResult::ok(),
        }
    }
}

impl<S: 'static, V: SettingType> UserSetting<S> for SettingBinding<S, V> {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> String {
        (self.name)()
    }

    fn description(&self) -> Option<String> {
        self.description.as_ref().map(|f| f())
    }

    fn group(&self) -> Option<SettingGroup> {
        self.group
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn type_name(&self) -> &'static str {
        V::TYPE_NAME
    }

    fn get(&self, settings: &S) -> SettingValue {
        (self.load)(settings).into_value()
    }

    fn set(&mut self, settings: &mut S, value: SettingValue) -> Result<(), ConfigurationError> {
        let typed = self.convert(&value)?;
        (self.apply)(settings, typed.clone());
        self.value = typed;
        Ok(())
    }

    fn check_type(&self, value: &SettingValue) -> Result<(), ConfigurationError> {
        self.convert(value).map(|_| ())
    }

    fn validate(&self, value: &SettingValue) -> ValidationResult {
        match V::from_value(value) {
            Some(typed) => self.check(&typed),
            None => ValidationResult::error(format!(
                "expected {}, got {}",
                V::TYPE_NAME,
                value.kind()
            )),
        }
    }

    fn validation(&self) -> ValidationResult {
        self.check(&self.value)
    }

    fn load(&mut self, settings: &S) {
        self.value = (self.load)(settings);
    }

    fn apply(&self, settings: &mut S) {
        (self.apply)(settings, self.value.clone());
    }

    fn value(&self) -> SettingValue {
        self.value.clone().into_value()
    }

    fn set_value(&mut self, value: SettingValue) -> Result<(), ConfigurationError> {
        self.value = self.convert(&value)?;
        Ok(())
    }
}

impl<S, V: SettingType> fmt::Debug for SettingBinding<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingBinding")
            .field("id", &self.id)
            .field("type", &V::TYPE_NAME)
            .field("hidden", &self.hidden)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Printer {
        layer_height: f64,
        shells: u32,
        name: String,
    }

    fn layer_height() -> SettingBinding<Printer, f64> {
        SettingBinding::named(
            "layer_height_mm",
            "Layer Height",
            |s: &Printer| s.layer_height,
            |s: &mut Printer, v| s.layer_height = v,
        )
        .with_validation(|v| ValidationResult::positive(*v))
    }

    #[test]
    fn test_set_then_get() {
        let mut printer = Printer::default();
        let mut binding = layer_height();
        binding.set(&mut printer, SettingValue::Float(0.15)).unwrap();
        assert_eq!(printer.layer_height, 0.15);
        assert_eq!(binding.get(&printer), SettingValue::Float(0.15));
        assert_eq!(binding.value(), SettingValue::Float(0.15));
    }

    #[test]
    fn test_type_mismatch_leaves_settings_untouched() {
        let mut printer = Printer {
            layer_height: 0.2,
            ..Printer::default()
        };
        let mut binding = layer_height();
        let err = binding
            .set(&mut printer, SettingValue::Text("thin".to_string()))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Setting 'Layer Height': expected float, got text"
        );
        assert_eq!(printer.layer_height, 0.2);
    }

    #[test]
    fn test_integer_widens_to_float() {
        let mut printer = Printer::default();
        let mut binding = layer_height();
        binding.set(&mut printer, SettingValue::Int(1)).unwrap();
        assert_eq!(printer.layer_height, 1.0);
        assert_eq!(binding.get(&printer), SettingValue::Float(1.0));
    }

    #[test]
    fn test_integer_narrowing_checks_range() {
        let mut printer = Printer::default();
        let mut shells = SettingBinding::named(
            "shells",
            "Shells",
            |s: &Printer| s.shells,
            |s: &mut Printer, v| s.shells = v,
        );
        shells.set(&mut printer, SettingValue::Int(3)).unwrap();
        assert_eq!(printer.shells, 3);
        assert!(matches!(
            shells.set(&mut printer, SettingValue::Int(-1)),
            Err(ConfigurationError::TypeMismatch { .. })
        ));
        assert!(matches!(
            shells.set(&mut printer, SettingValue::Float(2.0)),
            Err(ConfigurationError::TypeMismatch { .. })
        ));
        assert_eq!(printer.shells, 3);
    }

    #[test]
    fn test_load_apply_cache() {
        let mut printer = Printer {
            name: "Draft".to_string(),
            ..Printer::default()
        };
        let mut name = SettingBinding::named(
            "identifier",
            "Profile Name",
            |s: &Printer| s.name.clone(),
            |s: &mut Printer, v| s.name = v,
        );
        name.load(&printer);
        assert_eq!(name.typed_value(), "Draft");
        name.set_value(SettingValue::from("Fine")).unwrap();
        assert_eq!(printer.name, "Draft");
        name.apply(&mut printer);
        assert_eq!(printer.name, "Fine");
    }

    #[test]
    fn test_validation_of_values_and_cache() {
        let binding = layer_height();
        assert!(binding.validate(&SettingValue::Float(0.1)).is_ok());
        assert!(binding.validate(&SettingValue::Float(-0.1)).is_error());
        assert!(binding.validate(&SettingValue::Bool(true)).is_error());
        // default cache is 0.0
        assert!(binding.validation().is_error());
    }

    #[test]
    fn test_lazy_name_and_description() {
        let binding = layer_height()
            .with_description(|| "Height of each layer".to_string())
            .in_group(SettingGroup::new("basic", "Basic"));
        assert_eq!(binding.name(), "Layer Height");
        assert_eq!(binding.description().as_deref(), Some("Height of each layer"));
        assert_eq!(binding.group().map(|g| g.id), Some("basic"));
        assert_eq!(binding.type_name(), "float");
    }

    #[test]
    fn test_untagged_value_serde() {
        let values: Vec<SettingValue> = serde_json::from_str(r#"[true, 3, 0.25, "PLA"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SettingValue::Bool(true),
                SettingValue::Int(3),
                SettingValue::Float(0.25),
                SettingValue::Text("PLA".to_string()),
            ]
        );
    }
}
