//! demo data loaded at startup so the dashboard and stats endpoints have
//! something to show before any sensor has reported.

use crate::domain::Measurement;
use crate::store::MeasurementStore;

/// (timestamp, temperature, dewPoint, precipitation)
const DEMO_READINGS: [(&str, f64, f64, f64); 6] = [
    ("2015-09-01T16:00:00.000Z", 27.1, 16.7, 0.0),
    ("2015-09-01T16:10:00.000Z", 27.3, 16.9, 0.0),
    ("2015-09-01T16:20:00.000Z", 27.5, 17.1, 0.0),
    ("2015-09-01T16:30:00.000Z", 27.4, 17.3, 0.0),
    ("2015-09-01T16:40:00.000Z", 27.2, 17.2, 0.0),
    ("2015-09-02T16:00:00.000Z", 28.1, 18.3, 0.0),
];

pub fn demo_measurements() -> Vec<Measurement> {
    DEMO_READINGS
        .iter()
        .map(|&(ts, temperature, dew_point, precipitation)| {
            Measurement::new(ts)
                .with("temperature", temperature)
                .with("dewPoint", dew_point)
                .with("precipitation", precipitation)
        })
        .collect()
}

pub fn seed(store: &mut MeasurementStore) {
    for m in demo_measurements() {
        store.put(m);
    }
    tracing::info!(count = DEMO_READINGS.len(), "seeded demo measurements");
}
