use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DomainError;

/// Componente dentro de un paquete (`package/class`).
///
/// La forma corta `pkg/.Clase` se expande a `pkg/pkg.Clase` al parsear, de
/// modo que dos nombres equivalentes comparan iguales.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentName {
    package: String,
    class: String,
}

impl ComponentName {
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Result<Self, DomainError> {
        let package = package.into();
        let class = class.into();
        if package.trim().is_empty() || class.trim().is_empty() {
            return Err(DomainError::ValidationError("component package and class must be non-empty".into()));
        }
        let class = if class.starts_with('.') { format!("{package}{class}") } else { class };
        Ok(Self { package, class })
    }

    pub fn package_name(&self) -> &str {
        &self.package
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    /// Forma abreviada: si la clase está dentro del paquete se usa `pkg/.Clase`.
    pub fn flatten_to_short_string(&self) -> String {
        match self.class.strip_prefix(self.package.as_str()) {
            Some(rest) if rest.starts_with('.') => format!("{}/{}", self.package, rest),
            _ => format!("{}/{}", self.package, self.class),
        }
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

impl FromStr for ComponentName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (package, class) = s.split_once('/')
                                .ok_or_else(|| DomainError::ValidationError(format!("component '{s}' is not of the form package/class")))?;
        Self::new(package, class)
    }
}

impl Serialize for ComponentName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.flatten_to_short_string())
    }
}

impl<'de> Deserialize<'de> for ComponentName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_expands_and_round_trips() {
        let c: ComponentName = "sample.package.name/.DeviceAdmin".parse().unwrap();
        assert_eq!(c.package_name(), "sample.package.name");
        assert_eq!(c.class_name(), "sample.package.name.DeviceAdmin");
        assert_eq!(c.flatten_to_short_string(), "sample.package.name/.DeviceAdmin");
        assert_eq!(c, ComponentName::new("sample.package.name", "sample.package.name.DeviceAdmin").unwrap());
    }

    #[test]
    fn rejects_missing_separator_or_empty_parts() {
        assert!("no.separator".parse::<ComponentName>().is_err());
        assert!("/.Admin".parse::<ComponentName>().is_err());
        assert!("pkg/".parse::<ComponentName>().is_err());
    }

    #[test]
    fn foreign_class_keeps_long_form() {
        let c = ComponentName::new("a.b", "c.d.Admin").unwrap();
        assert_eq!(c.flatten_to_short_string(), "a.b/c.d.Admin");
    }
}
