//! Schema-driven property bags
//!
//! Every behavior declares a [`Schema`]: an ordered set of typed, defaulted
//! properties. The host coerces raw string values against the schema before a
//! behavior ever sees them, so behaviors only work with typed
//! [`PropertyValue`]s. Property changes are detected by diffing the current
//! [`PropertyBag`] against the previous snapshot; an empty snapshot marks the
//! initialization pass.

use std::collections::HashMap;

use crate::foundation::math::Color;

/// Raw, uncoerced property values as they appear in declarations
pub type RawProperties = HashMap<String, String>;

/// The type of a schema property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    /// Free-form string
    Str,
    /// Floating point number
    Number,
    /// Color in string encoding (`#RGB`, `#RRGGBB`, or a CSS name)
    Color,
    /// Reference to another entity by id (optionally written `#id`)
    Selector,
}

/// A typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// String value
    Str(String),
    /// Numeric value
    Number(f32),
    /// Color value
    Color(Color),
    /// Entity id reference; empty means unset
    Selector(String),
}

impl PropertyValue {
    /// The schema type this value belongs to
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::Str(_) => PropertyType::Str,
            Self::Number(_) => PropertyType::Number,
            Self::Color(_) => PropertyType::Color,
            Self::Selector(_) => PropertyType::Selector,
        }
    }

    /// Get the string value if this is a `Str`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value if this is a `Number`
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the color value if this is a `Color`
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Get the referenced entity id if this is a `Selector`
    pub fn as_selector(&self) -> Option<&str> {
        match self {
            Self::Selector(s) => Some(s),
            _ => None,
        }
    }
}

/// Errors produced while coercing raw properties against a schema
#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    /// Property name not declared by the schema
    #[error("unknown property '{0}'")]
    UnknownProperty(String),

    /// Value could not be parsed as a number
    #[error("property '{name}': invalid number '{value}'")]
    InvalidNumber {
        /// Property name
        name: String,
        /// Offending raw value
        value: String,
    },

    /// Value could not be parsed as a color
    #[error("property '{name}': invalid color '{value}'")]
    InvalidColor {
        /// Property name
        name: String,
        /// Offending raw value
        value: String,
    },

    /// Inline declaration entry missing the `key: value` separator
    #[error("malformed declaration entry '{0}'")]
    MalformedDeclaration(String),
}

/// Ordered, typed, defaulted declaration of a behavior's properties
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<(String, PropertyValue)>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property with its default value
    ///
    /// The property's type is the type of the default; every property has
    /// one. Builder-style so schemas read like the declarations they model.
    pub fn property(mut self, name: &str, default: PropertyValue) -> Self {
        self.entries.push((name.to_string(), default));
        self
    }

    /// Look up a property's default value
    pub fn default_of(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate declared property names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Coerce raw values into a fully-populated bag
    ///
    /// Missing properties resolve to their schema defaults. Raw keys not in
    /// the schema are rejected.
    pub fn coerce(&self, raw: &RawProperties) -> Result<PropertyBag, SchemaError> {
        self.coerce_over(None, raw)
    }

    /// Coerce raw values over an existing bag
    ///
    /// Like [`Schema::coerce`], but properties absent from `raw` keep their
    /// value from `base` instead of resetting to the schema default. This is
    /// the partial-update path used when the host re-applies a declaration.
    pub fn coerce_over(
        &self,
        base: Option<&PropertyBag>,
        raw: &RawProperties,
    ) -> Result<PropertyBag, SchemaError> {
        for key in raw.keys() {
            if self.default_of(key).is_none() {
                return Err(SchemaError::UnknownProperty(key.clone()));
            }
        }

        let mut values = HashMap::new();
        for (name, default) in &self.entries {
            let value = match raw.get(name) {
                Some(raw_value) => Self::coerce_value(name, default.property_type(), raw_value)?,
                None => base
                    .and_then(|bag| bag.get(name).cloned())
                    .unwrap_or_else(|| default.clone()),
            };
            values.insert(name.clone(), value);
        }
        Ok(PropertyBag { values })
    }

    fn coerce_value(
        name: &str,
        ty: PropertyType,
        raw: &str,
    ) -> Result<PropertyValue, SchemaError> {
        match ty {
            PropertyType::Str => Ok(PropertyValue::Str(raw.to_string())),
            PropertyType::Number => {
                let n = raw
                    .trim()
                    .parse::<f32>()
                    .map_err(|_| SchemaError::InvalidNumber {
                        name: name.to_string(),
                        value: raw.to_string(),
                    })?;
                Ok(PropertyValue::Number(n))
            }
            PropertyType::Color => {
                let c = Color::parse(raw).ok_or_else(|| SchemaError::InvalidColor {
                    name: name.to_string(),
                    value: raw.to_string(),
                })?;
                Ok(PropertyValue::Color(c))
            }
            PropertyType::Selector => {
                // Selectors may be written `#id` in declarations.
                let id = raw.trim().trim_start_matches('#');
                Ok(PropertyValue::Selector(id.to_string()))
            }
        }
    }

    /// Parse an inline `key: value; key: value` declaration into raw values
    pub fn parse_declaration(source: &str) -> Result<RawProperties, SchemaError> {
        let mut raw = RawProperties::new();
        for entry in source.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = entry
                .split_once(':')
                .ok_or_else(|| SchemaError::MalformedDeclaration(entry.to_string()))?;
            raw.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(raw)
    }
}

/// A behavior instance's coerced property data
///
/// An empty bag is only ever seen as the "previous" side of the first update
/// after creation, where it signals initialization rather than a change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    values: HashMap<String, PropertyValue>,
}

impl PropertyBag {
    /// Create the empty bag used as the initial previous-snapshot
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this bag carries no values (the initialization signal)
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a property value
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Get a string property
    pub fn str_of(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_str)
    }

    /// Get a numeric property
    pub fn number_of(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(PropertyValue::as_number)
    }

    /// Get a color property
    pub fn color_of(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(PropertyValue::as_color)
    }

    /// Get a selector property
    pub fn selector_of(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_selector)
    }

    /// Whether `name` differs between this bag and a previous snapshot
    ///
    /// A property absent from the snapshot counts as changed.
    pub fn changed_from(&self, previous: &Self, name: &str) -> bool {
        self.get(name) != previous.get(name)
    }

    /// Names of all properties that differ from a previous snapshot
    pub fn changed_keys<'a>(&'a self, previous: &Self) -> Vec<&'a str> {
        let mut keys: Vec<&str> = self
            .values
            .iter()
            .filter(|(name, value)| previous.get(name) != Some(value))
            .map(|(name, _)| name.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_schema() -> Schema {
        Schema::new()
            .property("width", PropertyValue::Number(1.0))
            .property("height", PropertyValue::Number(1.0))
            .property("depth", PropertyValue::Number(1.0))
            .property("color", PropertyValue::Color(Color::from_u8(0xAA, 0xAA, 0xAA)))
    }

    #[test]
    fn test_coerce_fills_defaults() {
        let schema = box_schema();
        let bag = schema.coerce(&RawProperties::new()).unwrap();

        assert_eq!(bag.number_of("width"), Some(1.0));
        assert_eq!(bag.number_of("depth"), Some(1.0));
        assert_eq!(bag.color_of("color"), Some(Color::from_u8(0xAA, 0xAA, 0xAA)));
    }

    #[test]
    fn test_coerce_parses_typed_values() {
        let schema = box_schema();
        let mut raw = RawProperties::new();
        raw.insert("width".to_string(), "2.5".to_string());
        raw.insert("color".to_string(), "#FF0000".to_string());

        let bag = schema.coerce(&raw).unwrap();
        assert_eq!(bag.number_of("width"), Some(2.5));
        assert_eq!(bag.color_of("color"), Some(Color::rgb(1.0, 0.0, 0.0)));
        // Unspecified values still default.
        assert_eq!(bag.number_of("height"), Some(1.0));
    }

    #[test]
    fn test_coerce_rejects_unknown_property() {
        let schema = box_schema();
        let mut raw = RawProperties::new();
        raw.insert("radius".to_string(), "3".to_string());

        assert!(matches!(
            schema.coerce(&raw),
            Err(SchemaError::UnknownProperty(name)) if name == "radius"
        ));
    }

    #[test]
    fn test_coerce_rejects_malformed_values() {
        let schema = box_schema();

        let mut raw = RawProperties::new();
        raw.insert("width".to_string(), "wide".to_string());
        assert!(matches!(
            schema.coerce(&raw),
            Err(SchemaError::InvalidNumber { .. })
        ));

        let mut raw = RawProperties::new();
        raw.insert("color".to_string(), "#XYZ".to_string());
        assert!(matches!(
            schema.coerce(&raw),
            Err(SchemaError::InvalidColor { .. })
        ));

        // Multi-byte input is an error like any other malformed color.
        let mut raw = RawProperties::new();
        raw.insert("color".to_string(), "#aé".to_string());
        assert!(matches!(
            schema.coerce(&raw),
            Err(SchemaError::InvalidColor { .. })
        ));
    }

    #[test]
    fn test_coerce_over_keeps_unspecified_values() {
        let schema = box_schema();
        let mut raw = RawProperties::new();
        raw.insert("width".to_string(), "4".to_string());
        let bag = schema.coerce(&raw).unwrap();

        // A later partial update must not reset width to its default.
        let mut raw = RawProperties::new();
        raw.insert("height".to_string(), "2".to_string());
        let updated = schema.coerce_over(Some(&bag), &raw).unwrap();

        assert_eq!(updated.number_of("width"), Some(4.0));
        assert_eq!(updated.number_of("height"), Some(2.0));
    }

    #[test]
    fn test_selector_strips_hash_prefix() {
        let schema =
            Schema::new().property("target", PropertyValue::Selector(String::new()));
        let mut raw = RawProperties::new();
        raw.insert("target".to_string(), "#player".to_string());

        let bag = schema.coerce(&raw).unwrap();
        assert_eq!(bag.selector_of("target"), Some("player"));
    }

    #[test]
    fn test_parse_declaration() {
        let raw = Schema::parse_declaration("event: ping; message: hi there").unwrap();
        assert_eq!(raw.get("event").map(String::as_str), Some("ping"));
        assert_eq!(raw.get("message").map(String::as_str), Some("hi there"));

        assert!(Schema::parse_declaration("").unwrap().is_empty());
        assert!(Schema::parse_declaration("no-separator").is_err());
    }

    #[test]
    fn test_changed_keys_against_snapshot() {
        let schema = box_schema();
        let old = schema.coerce(&RawProperties::new()).unwrap();

        let mut raw = RawProperties::new();
        raw.insert("width".to_string(), "2".to_string());
        raw.insert("color".to_string(), "red".to_string());
        let new = schema.coerce_over(Some(&old), &raw).unwrap();

        assert_eq!(new.changed_keys(&old), vec!["color", "width"]);
        assert!(new.changed_from(&old, "width"));
        assert!(!new.changed_from(&old, "height"));
    }

    #[test]
    fn test_empty_bag_marks_initialization() {
        let empty = PropertyBag::empty();
        assert!(empty.is_empty());

        let schema = box_schema();
        let bag = schema.coerce(&RawProperties::new()).unwrap();
        assert!(!bag.is_empty());
        // Everything counts as changed against the empty snapshot.
        assert_eq!(bag.changed_keys(&empty).len(), 4);
    }
}
