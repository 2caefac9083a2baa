//! Sensor kinds and the platform sensor-type catalog.
//!
//! Hosts address sensors by name (`"accelerometer"`, `"heart_rate"`, ...).
//! Names are case-insensitive and underscore-insensitive; they normalize to
//! one of the closed set of [`SensorKind`] variants. Which platform sensor
//! type a kind maps to is data, supplied by the platform adapter through a
//! [`SensorCatalog`].

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// Physical sensor category.
///
/// The canonical name of each variant is its lowercase identifier without
/// separators, e.g. `AmbientTemperature` is `"ambienttemperature"`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    IntoStaticStr,
    strum::EnumString,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Accelerometer,
    AmbientTemperature,
    GameRotationVector,
    GeomagneticRotationVector,
    Gravity,
    Gyroscope,
    GyroscopeUncalibrated,
    HeartRate,
    Light,
    LinearAcceleration,
    MagneticField,
    MagneticFieldUncalibrated,
    Pressure,
    Proximity,
    RelativeHumidity,
    RotationVector,
    SignificantMotion,
    StepCounter,
    StepDetector,
}

/// Normalize a host-supplied sensor name: lowercase, underscores removed.
///
/// Normalization is idempotent.
pub fn normalize_kind(name: &str) -> String {
    name.to_lowercase().replace('_', "")
}

impl SensorKind {
    /// Parse a host-supplied name after normalization.
    pub fn parse(name: &str) -> Option<Self> {
        Self::from_str(&normalize_kind(name)).ok()
    }

    /// Canonical name of this kind.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Number of values a reading of this kind carries.
    pub fn value_count(self) -> usize {
        match self {
            Self::Accelerometer
            | Self::Gravity
            | Self::Gyroscope
            | Self::LinearAcceleration
            | Self::MagneticField => 3,
            Self::GyroscopeUncalibrated | Self::MagneticFieldUncalibrated => 6,
            Self::GameRotationVector => 4,
            Self::RotationVector | Self::GeomagneticRotationVector => 5,
            Self::AmbientTemperature
            | Self::HeartRate
            | Self::Light
            | Self::Pressure
            | Self::Proximity
            | Self::RelativeHumidity
            | Self::SignificantMotion
            | Self::StepCounter
            | Self::StepDetector => 1,
        }
    }
}

/// Opaque platform identifier for a sensor category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorType(pub i32);

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mapping from [`SensorKind`] to the platform's sensor-type identifier.
///
/// A kind missing from the catalog is treated the same as an unknown name.
#[derive(Debug, Clone, Default)]
pub struct SensorCatalog {
    types: HashMap<SensorKind, SensorType>,
}

impl SensorCatalog {
    /// Build a catalog from `(kind, type)` pairs. Later pairs win.
    pub fn from_table<I>(table: I) -> Self
    where
        I: IntoIterator<Item = (SensorKind, SensorType)>,
    {
        Self {
            types: table.into_iter().collect(),
        }
    }

    /// The Android `android.hardware.Sensor.TYPE_*` table.
    pub fn android() -> Self {
        use SensorKind::*;
        Self::from_table([
            (Accelerometer, SensorType(1)),
            (MagneticField, SensorType(2)),
            (Gyroscope, SensorType(4)),
            (Light, SensorType(5)),
            (Pressure, SensorType(6)),
            (Proximity, SensorType(8)),
            (Gravity, SensorType(9)),
            (LinearAcceleration, SensorType(10)),
            (RotationVector, SensorType(11)),
            (RelativeHumidity, SensorType(12)),
            (AmbientTemperature, SensorType(13)),
            (MagneticFieldUncalibrated, SensorType(14)),
            (GameRotationVector, SensorType(15)),
            (GyroscopeUncalibrated, SensorType(16)),
            (SignificantMotion, SensorType(17)),
            (StepDetector, SensorType(18)),
            (StepCounter, SensorType(19)),
            (GeomagneticRotationVector, SensorType(20)),
            (HeartRate, SensorType(21)),
        ])
    }

    /// Platform type for a kind.
    pub fn sensor_type(&self, kind: SensorKind) -> Option<SensorType> {
        self.types.get(&kind).copied()
    }

    /// Reverse lookup: which kind a platform type belongs to.
    pub fn kind_of(&self, sensor_type: SensorType) -> Option<SensorKind> {
        self.types
            .iter()
            .find(|(_, t)| **t == sensor_type)
            .map(|(k, _)| *k)
    }

    /// Kinds present in the catalog, in declaration order.
    pub fn kinds(&self) -> Vec<SensorKind> {
        SensorKind::iter()
            .filter(|k| self.types.contains_key(k))
            .collect()
    }

    /// Comma separated list of the catalog's kind names, for diagnostics.
    pub fn available(&self) -> String {
        self.kinds()
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Resolve a host-supplied name to its kind and platform type.
    pub fn resolve(&self, name: &str) -> Result<(SensorKind, SensorType)> {
        SensorKind::parse(name)
            .and_then(|kind| self.sensor_type(kind).map(|t| (kind, t)))
            .ok_or_else(|| BridgeError::UnknownSensorKind {
                kind: name.to_string(),
                available: self.available(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_case_and_underscore_insensitive() {
        assert_eq!(normalize_kind("ACCELEROMETER"), "accelerometer");
        assert_eq!(normalize_kind("accel_erometer"), "accelerometer");
        assert_eq!(normalize_kind("Heart_Rate"), "heartrate");
        let once = normalize_kind("Linear_Acceleration");
        assert_eq!(normalize_kind(&once), once);
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(SensorKind::parse("gyroscope"), Some(SensorKind::Gyroscope));
        assert_eq!(
            SensorKind::parse("AMBIENT_TEMPERATURE"),
            Some(SensorKind::AmbientTemperature)
        );
        assert_eq!(
            SensorKind::parse("game_rotation_vector"),
            Some(SensorKind::GameRotationVector)
        );
        assert_eq!(SensorKind::parse("not_a_real_sensor"), None);
        assert_eq!(SensorKind::parse(""), None);
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for kind in SensorKind::iter() {
            assert_eq!(SensorKind::parse(kind.name()), Some(kind));
            assert_eq!(kind.to_string(), kind.name());
            assert!(!kind.name().contains('_'));
        }
    }

    #[test]
    fn test_android_catalog_covers_every_kind() {
        let catalog = SensorCatalog::android();
        assert_eq!(catalog.kinds().len(), SensorKind::iter().count());
        assert_eq!(
            catalog.sensor_type(SensorKind::Accelerometer),
            Some(SensorType(1))
        );
        assert_eq!(
            catalog.sensor_type(SensorKind::HeartRate),
            Some(SensorType(21))
        );
        assert_eq!(
            catalog.kind_of(SensorType(4)),
            Some(SensorKind::Gyroscope)
        );
        assert_eq!(catalog.kind_of(SensorType(3)), None);
    }

    #[test]
    fn test_resolve_unknown_lists_available_types() {
        let catalog = SensorCatalog::from_table([
            (SensorKind::Accelerometer, SensorType(1)),
            (SensorKind::Light, SensorType(5)),
        ]);

        let err = catalog.resolve("barometer").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("barometer"));
        assert!(message.contains("accelerometer, light"));

        // A known kind missing from this platform's table is also rejected
        assert!(catalog.resolve("gyroscope").is_err());
        assert_eq!(
            catalog.resolve("Light").unwrap(),
            (SensorKind::Light, SensorType(5))
        );
    }

    #[test]
    fn test_kind_serializes_as_canonical_name() {
        let json = serde_json::to_string(&SensorKind::StepCounter).unwrap();
        assert_eq!(json, "\"stepcounter\"");
    }
}
