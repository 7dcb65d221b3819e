//! Slice based measurement of a vertex cloud.

use log::debug;
use specs::{
    MeasurementField, Outcome,
    measurement::{ARM_LENGTH_RATIO, INSEAM_RATIO},
};

use crate::{
    MeasurementReport, Result,
    hull::{self, Point2},
    report::ReportBuilder,
    slice::{BodyPoints, SliceSpec, project_xz},
};

/// A girth measured as the hull perimeter of a horizontal slice.
#[derive(Debug, Clone, Copy)]
pub struct Girth {
    pub field: MeasurementField,
    pub slice: SliceSpec,
    /// Applied to the measured perimeter.
    pub scale: f64,
    /// Reported when the slice holds no vertices at all.
    pub fallback: f64,
}

pub const CHEST: Girth = Girth {
    field: MeasurementField::Chest,
    slice: SliceSpec::new(0.75, 5.0),
    scale: 1.0,
    fallback: 95.0,
};

pub const WAIST: Girth = Girth {
    field: MeasurementField::Waist,
    slice: SliceSpec::new(0.6, 5.0),
    scale: 1.0,
    fallback: 80.0,
};

pub const HIPS: Girth = Girth {
    field: MeasurementField::Hips,
    slice: SliceSpec::new(0.52, 5.0),
    scale: 1.0,
    fallback: 95.0,
};

pub const NECK: Girth = Girth {
    field: MeasurementField::NeckCircumference,
    slice: SliceSpec::new(0.88, 2.0),
    scale: 0.5,
    fallback: 38.0,
};

pub const SHOULDER: SliceSpec = SliceSpec::new(0.82, 3.0);
pub const SHOULDER_FALLBACK: f64 = 45.0;

impl Girth {
    fn measure(&self, body: &BodyPoints) -> Outcome<f64> {
        let points: Vec<Point2> = project_xz(&body.slice(self.slice));
        if points.is_empty() {
            return Outcome::degraded(self.fallback, "empty slice, used fixed value");
        }

        hull::circumference(&points).map(|perimeter| perimeter * self.scale)
    }
}

fn shoulder_width(body: &BodyPoints) -> Outcome<f64> {
    let points = body.slice(SHOULDER);
    let xs = points.iter().map(|p| p[0]);
    let (Some(min), Some(max)) = (xs.clone().reduce(f64::min), xs.reduce(f64::max)) else {
        return Outcome::degraded(SHOULDER_FALLBACK, "empty slice, used fixed value");
    };

    Outcome::Ok(max - min)
}

/// Derives a measurement set from body vertices given in metres, Y up.
///
/// Height is the raw vertical extent. Arm length and inseam are fixed proportions of it.
/// Every other field comes from a slice of the body and is clamped to its valid range.
///
/// # Errors
/// When the vertex set is empty or holds non finite coordinates.
pub fn measure_body(vertices: &[[f32; 3]]) -> Result<MeasurementReport> {
    let body = BodyPoints::from_vertices(vertices)?;
    let height = body.height();
    let mut report = ReportBuilder::new(height);

    for girth in [CHEST, WAIST, HIPS] {
        report.record(girth.field, girth.measure(&body));
    }
    report.record(MeasurementField::ShoulderWidth, shoulder_width(&body));
    report.record(MeasurementField::ArmLength, Outcome::Ok(height * ARM_LENGTH_RATIO));
    report.record(MeasurementField::Inseam, Outcome::Ok(height * INSEAM_RATIO));
    report.record(NECK.field, NECK.measure(&body));

    let report = report.finish();
    for fallback in &report.fallbacks {
        debug!(field = fallback.field.key(); "{}", fallback.reason);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use body_model::{Betas, BodyModel, NUM_BETAS, fixtures};
    use specs::BodyVariant;

    use super::*;

    #[test]
    fn ring_body_measures_its_profile() {
        let mesh = fixtures::ring_body(BodyVariant::Neutral)
            .evaluate(&Betas::zeros())
            .unwrap();
        let report = measure_body(&mesh.vertices).unwrap();
        let m = report.measurements;

        assert!(report.fallbacks.is_empty(), "{:?}", report.fallbacks);
        assert_eq!(m.get(MeasurementField::Height), 175.0);
        assert!((m.get(MeasurementField::Chest) - 95.0).abs() < 1.5);
        assert!((m.get(MeasurementField::Waist) - 80.0).abs() < 1.5);
        assert!((m.get(MeasurementField::Hips) - 98.0).abs() < 1.5);
        assert!((m.get(MeasurementField::ShoulderWidth) - 45.0).abs() < 0.5);
        assert!((m.get(MeasurementField::NeckCircumference) - 38.0).abs() < 1.0);
        assert_eq!(m.get(MeasurementField::ArmLength), 175.0 * 0.38);
        assert!(m.is_valid());
    }

    #[test]
    fn girth_grows_with_the_first_beta() {
        let model = fixtures::ring_body(BodyVariant::Neutral);
        let mut betas = [0.0; NUM_BETAS];
        betas[0] = 1.0;

        let base = measure_body(&model.evaluate(&Betas::zeros()).unwrap().vertices).unwrap();
        let wide = measure_body(&model.evaluate(&Betas::new(betas)).unwrap().vertices).unwrap();

        let ratio = wide.measurements.get(MeasurementField::Waist)
            / base.measurements.get(MeasurementField::Waist);
        assert!((ratio - 1.1).abs() < 1e-3);
        assert_eq!(wide.measurements.get(MeasurementField::Height), 175.0);
    }

    #[test]
    fn sparse_slices_fall_back() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [0.0, 1.75, 0.0],
            [-0.2, 1.3125, 0.0],
            [0.2, 1.3125, 0.15],
        ];
        let report = measure_body(&vertices).unwrap();
        let m = report.measurements;

        assert_eq!(m.get(MeasurementField::Height), 175.0);
        // two points at chest level: bounding box 2 * (40 + 15)
        assert!((m.get(MeasurementField::Chest) - 110.0).abs() < 1e-4);
        assert_eq!(m.get(MeasurementField::Waist), 80.0);
        assert_eq!(m.get(MeasurementField::Hips), 95.0);
        assert_eq!(m.get(MeasurementField::ShoulderWidth), 45.0);
        assert_eq!(m.get(MeasurementField::NeckCircumference), 38.0);

        let fields: Vec<_> = report.fallbacks.iter().map(|f| f.field).collect();
        assert_eq!(
            fields,
            vec![
                MeasurementField::Chest,
                MeasurementField::Waist,
                MeasurementField::Hips,
                MeasurementField::ShoulderWidth,
                MeasurementField::NeckCircumference,
            ]
        );
    }

    #[test]
    fn derived_values_are_clamped_but_height_is_not() {
        // 3 m tall pole with nothing in any slice but the chest, which is tiny.
        let vertices = [
            [0.0, 0.0, 0.0],
            [0.0, 3.0, 0.0],
            [-0.01, 2.25, 0.0],
            [0.01, 2.25, 0.01],
        ];
        let m = measure_body(&vertices).unwrap().measurements;

        assert_eq!(m.get(MeasurementField::Height), 300.0);
        assert_eq!(m.get(MeasurementField::Chest), 70.0);
        assert_eq!(m.get(MeasurementField::ArmLength), 90.0);
        assert_eq!(m.get(MeasurementField::Inseam), 100.0);
        assert!(!m.is_valid());
    }
}
