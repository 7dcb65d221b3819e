//! Measurement from body proportions and the first shape coefficient.

use specs::{
    MeasurementField, Outcome,
    measurement::{ARM_LENGTH_RATIO, INSEAM_RATIO},
};

use crate::{MeasurementReport, Result, report::ReportBuilder, slice::BodyPoints};

const BASE_HEIGHT: f64 = 170.0;
const BASE_CHEST: f64 = 95.0;
const BASE_WAIST: f64 = 80.0;
const BASE_HIPS: f64 = 95.0;
const BASE_SHOULDER: f64 = 45.0;
const BASE_NECK: f64 = 35.0;

/// Girth change per unit of beta 0.
const GIRTH_PER_BETA: f64 = 0.15;
/// Neck change in cm per unit of beta 0.
const NECK_PER_BETA: f64 = 3.0;

/// Derives measurements from the measured height and `betas[0]`.
///
/// Only height is read from the geometry. Girths scale with `sqrt(height / 170)` and
/// linearly with beta 0, shoulder width with `(height / 170)^0.7`. An empty `betas`
/// slice reads as the average body.
///
/// # Errors
/// When the vertex set is empty or holds non finite coordinates.
pub fn measure_proportional(vertices: &[[f32; 3]], betas: &[f32]) -> Result<MeasurementReport> {
    let height = BodyPoints::from_vertices(vertices)?.height();
    let beta0 = betas.first().copied().map(f64::from).unwrap_or(0.0);

    let height_factor = height / BASE_HEIGHT;
    let girth = (1.0 + beta0 * GIRTH_PER_BETA) * height_factor.sqrt();

    let mut report = ReportBuilder::new(height);
    report.record(MeasurementField::Chest, Outcome::Ok(BASE_CHEST * girth));
    report.record(MeasurementField::Waist, Outcome::Ok(BASE_WAIST * girth));
    report.record(MeasurementField::Hips, Outcome::Ok(BASE_HIPS * girth));
    report.record(
        MeasurementField::ShoulderWidth,
        Outcome::Ok(BASE_SHOULDER * height_factor.powf(0.7)),
    );
    report.record(MeasurementField::ArmLength, Outcome::Ok(height * ARM_LENGTH_RATIO));
    report.record(MeasurementField::Inseam, Outcome::Ok(height * INSEAM_RATIO));
    report.record(
        MeasurementField::NeckCircumference,
        Outcome::Ok(BASE_NECK + beta0 * NECK_PER_BETA),
    );

    Ok(report.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pole(height_m: f32) -> Vec<[f32; 3]> {
        vec![[0.0, 0.0, 0.0], [0.0, height_m, 0.0]]
    }

    #[test]
    fn base_body_at_base_height() {
        let report = measure_proportional(&pole(1.7), &[0.0; 10]).unwrap();
        let m = report.measurements;

        assert!(report.fallbacks.is_empty());
        assert!((m.get(MeasurementField::Height) - 170.0).abs() < 1e-4);
        assert!((m.get(MeasurementField::Chest) - 95.0).abs() < 1e-4);
        assert!((m.get(MeasurementField::ShoulderWidth) - 45.0).abs() < 1e-4);
        assert_eq!(m.get(MeasurementField::NeckCircumference), 35.0);
    }

    #[test]
    fn first_beta_drives_girth_and_clamps() {
        let m = measure_proportional(&pole(1.7), &[2.0]).unwrap().measurements;
        assert!((m.get(MeasurementField::Waist) - 104.0).abs() < 1e-3);
        assert_eq!(m.get(MeasurementField::NeckCircumference), 41.0);

        let m = measure_proportional(&pole(1.7), &[-3.0]).unwrap().measurements;
        assert_eq!(m.get(MeasurementField::Chest), 70.0);
        assert_eq!(m.get(MeasurementField::NeckCircumference), 30.0);
    }
}
