use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};

use crate::{Result, SpecErr};

/// Arm length as a fraction of height, used when the caller omits it.
pub const ARM_LENGTH_RATIO: f64 = 0.38;

/// Inseam as a fraction of height, used when the caller omits it.
pub const INSEAM_RATIO: f64 = 0.45;

/// Neck circumference in cm used when the caller omits it.
pub const DEFAULT_NECK_CIRCUMFERENCE: f64 = 38.0;

/// One of the eight anthropometric measurements. All values are in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeasurementField {
    Height,
    Chest,
    Waist,
    Hips,
    ShoulderWidth,
    ArmLength,
    Inseam,
    NeckCircumference,
}

impl MeasurementField {
    pub const COUNT: usize = 8;

    /// Every field, in canonical order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Height,
        Self::Chest,
        Self::Waist,
        Self::Hips,
        Self::ShoulderWidth,
        Self::ArmLength,
        Self::Inseam,
        Self::NeckCircumference,
    ];

    /// The wire name of the field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Chest => "chest",
            Self::Waist => "waist",
            Self::Hips => "hips",
            Self::ShoulderWidth => "shoulderWidth",
            Self::ArmLength => "armLength",
            Self::Inseam => "inseam",
            Self::NeckCircumference => "neckCircumference",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// The inclusive range a value of this field must fall in.
    pub fn range(self) -> ValidRange {
        match self {
            Self::Height => ValidRange::new(140.0, 210.0),
            Self::Chest => ValidRange::new(70.0, 140.0),
            Self::Waist => ValidRange::new(60.0, 130.0),
            Self::Hips => ValidRange::new(70.0, 140.0),
            Self::ShoulderWidth => ValidRange::new(30.0, 60.0),
            Self::ArmLength => ValidRange::new(50.0, 90.0),
            Self::Inseam => ValidRange::new(60.0, 100.0),
            Self::NeckCircumference => ValidRange::new(30.0, 50.0),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// An inclusive `[min, max]` range. Serialized as a two element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the range. `NaN` never does.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl From<(f64, f64)> for ValidRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

impl From<ValidRange> for (f64, f64) {
    fn from(value: ValidRange) -> Self {
        (value.min, value.max)
    }
}

/// The table of valid ranges, serialized as a map in canonical field order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeTable;

impl Serialize for RangeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MeasurementField::COUNT))?;
        for field in MeasurementField::ALL {
            map.serialize_entry(field.key(), &field.range())?;
        }
        map.end()
    }
}

/// The ordering of measurement keys used to lay out regression features.
///
/// Both the trainer and the predictor read feature vectors through this type, and the
/// trained artifact records the schema it was fitted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    keys: Vec<String>,
}

impl FeatureSchema {
    /// The schema every trainer in this workspace writes.
    pub fn canonical() -> Self {
        let keys = MeasurementField::ALL
            .iter()
            .map(|field| field.key().to_string())
            .collect();

        Self { keys }
    }

    /// Creates a schema with an arbitrary key ordering, as read back from an artifact.
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_canonical(&self) -> bool {
        *self == Self::canonical()
    }

    /// Lays out the values of `set` in schema order. Keys the set doesn't know read as zero.
    pub fn features(&self, set: &MeasurementSet) -> Vec<f64> {
        self.keys
            .iter()
            .map(|key| set.get_key(key).unwrap_or(0.0))
            .collect()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::canonical()
    }
}

/// A complete, immutable set of the eight measurements.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
pub struct MeasurementSet {
    values: [f64; MeasurementField::COUNT],
}

impl MeasurementSet {
    /// Creates a set from values laid out in canonical field order.
    pub fn new(values: [f64; MeasurementField::COUNT]) -> Self {
        Self { values }
    }

    /// Creates a set from labelled values given in any order.
    ///
    /// # Errors
    /// `SpecErr::MissingField` if any of the eight fields was not given. A repeated field
    /// keeps its last value.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (MeasurementField, f64)>,
    {
        let mut values = [None; MeasurementField::COUNT];
        for (field, value) in pairs {
            values[field.index()] = Some(value);
        }

        let mut out = [0.0; MeasurementField::COUNT];
        for (field, (slot, value)) in MeasurementField::ALL
            .into_iter()
            .zip(out.iter_mut().zip(values))
        {
            *slot = value.ok_or(SpecErr::MissingField(field))?;
        }

        Ok(Self::new(out))
    }

    pub fn get(&self, field: MeasurementField) -> f64 {
        self.values[field.index()]
    }

    pub fn get_key(&self, key: &str) -> Option<f64> {
        MeasurementField::from_key(key).map(|field| self.get(field))
    }

    /// The values in canonical field order.
    pub fn values(&self) -> &[f64; MeasurementField::COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeasurementField, f64)> + '_ {
        MeasurementField::ALL.into_iter().zip(self.values.iter().copied())
    }

    /// Checks every field against its valid range.
    ///
    /// # Errors
    /// `SpecErr::OutOfRange` describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        match self.iter().find(|(field, value)| !field.range().contains(*value)) {
            Some((field, value)) => Err(SpecErr::OutOfRange {
                field,
                value,
                range: field.range(),
            }),
            None => Ok(()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// A JSON object of the set with keys sorted, independent of how the set was built.
    pub fn canonical_json(&self) -> Result<String> {
        let sorted: BTreeMap<&str, f64> = self
            .iter()
            .map(|(field, value)| (field.key(), value))
            .collect();

        Ok(serde_json::to_string(&sorted)?)
    }
}

impl Serialize for MeasurementSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MeasurementField::COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), &value)?;
        }
        map.end()
    }
}

impl TryFrom<BTreeMap<String, f64>> for MeasurementSet {
    type Error = SpecErr;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self> {
        let pairs = map
            .into_iter()
            .map(|(key, value)| match MeasurementField::from_key(&key) {
                Some(field) => Ok((field, value)),
                None => Err(SpecErr::UnknownField(key)),
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_pairs(pairs)
    }
}
