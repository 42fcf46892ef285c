use approx::assert_relative_eq;
use chrono::NaiveDate;

use gr4j_core::calibration::calibrate;
use gr4j_core::config::CalibrationConfig;
use gr4j_core::forcing::ForcingData;
use gr4j_core::gr4j::Parameters;
use gr4j_core::io;
use gr4j_core::validation::{validate, MetricFlag};

const PRECIP: [f64; 10] = [12.0, 0.0, 3.5, 25.0, 0.0, 0.0, 8.0, 1.0, 0.0, 0.0];
const TEMPERATURE: [f64; 10] = [10.0, 14.0, 18.0, 12.0, 20.0, 22.0, 15.0, 9.0, 5.0, -2.0];
const OBSERVED: [f64; 10] = [0.3, 0.5, 0.4, 1.9, 1.2, 0.8, 0.9, 0.7, 0.5, 0.4];

fn fixture_forcing() -> ForcingData {
    ForcingData::from_temperature(PRECIP.to_vec(), &TEMPERATURE).unwrap()
}

#[test]
fn reproduces_precomputed_scores() {
    let report = validate(&Parameters::default(), &fixture_forcing(), &OBSERVED, None).unwrap();

    assert!((report.metrics.nse - -0.9261842934401208).abs() < 1e-6);
    assert_relative_eq!(report.metrics.rmse, 0.6396260969712553, epsilon = 1e-9);
    assert_relative_eq!(report.metrics.bias, -0.48712065657058723, epsilon = 1e-9);
    assert!(report.is_clean());

    let expected_sim = [
        0.07982306686601222,
        0.2502123776309079,
        0.18275187580414298,
        0.27684833603117764,
        0.6132401787200978,
        0.35434037287240155,
        0.17474323012850917,
        0.33373121812422946,
        0.285808394844848,
        0.1772943832718008,
    ];
    for (got, want) in report.simulated().iter().zip(expected_sim) {
        assert_relative_eq!(*got, want, max_relative = 1e-10);
    }
}

#[test]
fn degenerate_observations_are_reported() {
    let report = validate(&Parameters::default(), &fixture_forcing(), &[1.0; 10], None).unwrap();
    assert!(report.metrics.nse.is_nan());
    assert_eq!(report.flags, vec![MetricFlag::UndefinedNse]);
    assert_eq!(report.series.len(), 10);
}

#[test]
fn calibrate_then_validate_through_csv_tables() {
    let dir = tempfile::tempdir().unwrap();
    let basin = dir.path().join("complete_data.csv");

    let start = NaiveDate::from_ymd_opt(2011, 1, 1).unwrap();
    let mut text = String::from("date,streamflow_cfs,precipitation_mm,temperature_c\n");
    for (i, date) in start.iter_days().take(730).enumerate() {
        let rain = if i % 5 == 0 { 14.0 } else if i % 3 == 0 { 2.5 } else { 0.0 };
        let temp = 10.0 + 10.0 * (i as f64 / 58.0).sin();
        let flow = 400.0 + 300.0 * (i as f64 / 40.0).cos().abs() + (i % 7) as f64 * 20.0;
        text.push_str(&format!("{},{},{},{}\n", date.format("%Y-%m-%d"), flow, rain, temp));
    }
    std::fs::write(&basin, text).unwrap();

    let table = io::read_basin_table(&basin).unwrap();
    let split = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
    let (cal, val) = table.split_at(split);
    assert_eq!(cal.len(), 365);
    assert_eq!(val.len(), 365);

    let config = CalibrationConfig {
        population_size: 12,
        max_generations: 10,
        ..CalibrationConfig::default()
    };
    let result = calibrate(&cal.forcing().unwrap(), &cal.observed_mm(2000.0), &config).unwrap();
    let params_path = dir.path().join("calibrated_parameters.csv");
    io::write_calibration_table(&params_path, &result).unwrap();

    let (params, nse) = io::read_calibration_table(&params_path).unwrap();
    assert_eq!(params, result.params);
    assert_eq!(nse, Some(result.nse));

    let dates = val.dates();
    let report = validate(&params, &val.forcing().unwrap(), &val.observed_mm(2000.0), Some(&dates))
        .unwrap();
    let results_path = dir.path().join("validation_results.csv");
    io::write_validation_table(&results_path, &report).unwrap();

    let written = std::fs::read_to_string(&results_path).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("date,observed,simulated,precipitation"));
    assert!(lines.next().unwrap().starts_with("2012-01-01,"));
    assert_eq!(written.lines().count(), 366);
}
