use serde::{Deserialize, Serialize};

use crate::{
    BodyVariant, MeasurementSet, Result,
    measurement::{ARM_LENGTH_RATIO, DEFAULT_NECK_CIRCUMFERENCE, INSEAM_RATIO},
};

/// The body of a `POST /generate` request.
///
/// Five measurements are required, the other three are filled from height derived
/// proportions or fixed constants by `with_defaults`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRequest {
    pub height: f64,
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
    pub shoulder_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arm_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inseam: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neck_circumference: Option<f64>,
    #[serde(default = "default_gender")]
    pub gender: String,
}

fn default_gender() -> String {
    BodyVariant::Neutral.as_str().to_string()
}

impl MeasurementRequest {
    /// The body variant selected by `gender`.
    ///
    /// # Errors
    /// `SpecErr::InvalidVariant` for anything but `neutral`, `male` or `female`.
    pub fn variant(&self) -> Result<BodyVariant> {
        self.gender.parse()
    }

    /// The full measurement set with the optional fields defaulted.
    pub fn with_defaults(&self) -> MeasurementSet {
        let arm_length = self.arm_length.unwrap_or(self.height * ARM_LENGTH_RATIO);
        let inseam = self.inseam.unwrap_or(self.height * INSEAM_RATIO);
        let neck = self.neck_circumference.unwrap_or(DEFAULT_NECK_CIRCUMFERENCE);

        MeasurementSet::new([
            self.height,
            self.chest,
            self.waist,
            self.hips,
            self.shoulder_width,
            arm_length,
            inseam,
            neck,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeasurementField;

    #[test]
    fn optional_fields_are_defaulted_from_height() {
        let json = r#"{"height":180,"chest":100,"waist":85,"hips":100,"shoulderWidth":46}"#;
        let request: MeasurementRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.variant().unwrap(), BodyVariant::Neutral);

        let set = request.with_defaults();
        assert_eq!(set.get(MeasurementField::ArmLength), 180.0 * 0.38);
        assert_eq!(set.get(MeasurementField::Inseam), 180.0 * 0.45);
        assert_eq!(set.get(MeasurementField::NeckCircumference), 38.0);
    }

    #[test]
    fn given_optional_fields_are_kept() {
        let json = r#"{"height":175,"chest":95,"waist":80,"hips":98,"shoulderWidth":45,
            "armLength":60,"inseam":78,"neckCircumference":38,"gender":"female"}"#;
        let request: MeasurementRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.variant().unwrap(), BodyVariant::Female);
        assert_eq!(
            request.with_defaults(),
            MeasurementSet::new([175.0, 95.0, 80.0, 98.0, 45.0, 60.0, 78.0, 38.0])
        );
    }

    #[test]
    fn missing_required_field_fails_to_parse() {
        let json = r#"{"height":175,"chest":95,"waist":80,"hips":98}"#;
        assert!(serde_json::from_str::<MeasurementRequest>(json).is_err());
    }
}
