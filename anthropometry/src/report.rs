use specs::{MeasurementField, MeasurementSet, Outcome};

/// A fallback taken while deriving one measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    pub field: MeasurementField,
    pub reason: String,
}

/// The measurements derived from a body and the fallbacks taken to get them.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementReport {
    pub measurements: MeasurementSet,
    pub fallbacks: Vec<Fallback>,
}

impl MeasurementReport {
    pub fn is_degraded(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

/// Collects per field outcomes into a report, clamping every field but height.
pub(crate) struct ReportBuilder {
    values: Vec<(MeasurementField, f64)>,
    fallbacks: Vec<Fallback>,
}

impl ReportBuilder {
    pub(crate) fn new(height: f64) -> Self {
        Self {
            values: vec![(MeasurementField::Height, height)],
            fallbacks: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, field: MeasurementField, outcome: Outcome<f64>) {
        if let Some(reason) = outcome.reason() {
            self.fallbacks.push(Fallback {
                field,
                reason: reason.to_string(),
            });
        }

        let value = field.range().clamp(outcome.into_value());
        self.values.push((field, value));
    }

    pub(crate) fn finish(self) -> MeasurementReport {
        let mut values = [0.0; MeasurementField::COUNT];
        for (field, value) in self.values {
            if let Some(pos) = MeasurementField::ALL.iter().position(|f| *f == field) {
                values[pos] = value;
            }
        }

        MeasurementReport {
            measurements: MeasurementSet::new(values),
            fallbacks: self.fallbacks,
        }
    }
}
