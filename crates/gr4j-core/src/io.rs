//! CSV tables exchanged with the preprocessing and dashboard tooling.
//!
//! - basin table: `date, precipitation_mm, temperature_c, streamflow_cfs`
//!   (further columns are ignored, `streamflow_cfs` may be absent)
//! - calibration artifact: `parameter, value` with rows X1..X4 and NSE
//! - validation artifact: `date, observed, simulated, precipitation`
//! - simulation table: `date` followed by every GR4J flux column
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::calibration::CalibrationResult;
use crate::error::{IoError, ModelError};
use crate::forcing::{convert_cfs_series, ForcingData};
use crate::gr4j::constants::PARAM_NAMES;
use crate::gr4j::fluxes::FluxesTimeseries;
use crate::gr4j::Parameters;
use crate::validation::ValidationReport;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse `YYYY-MM-DD`, tolerating a trailing time component such as
/// `2012-01-01 00:00:00`.
fn parse_date(value: &str) -> Result<NaiveDate, IoError> {
    let day = value
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or_default();
    NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|source| IoError::Date {
        value: value.to_string(),
        source,
    })
}

fn format_value(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        "NaN".to_string()
    }
}

#[derive(Debug, Deserialize)]
struct RawBasinRecord {
    date: String,
    precipitation_mm: f64,
    temperature_c: f64,
    streamflow_cfs: Option<f64>,
}

/// One row of the basin table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasinRecord {
    pub date: NaiveDate,
    pub precipitation_mm: f64,
    pub temperature_c: f64,
    pub streamflow_cfs: Option<f64>,
}

/// Daily basin records in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasinTable {
    pub records: Vec<BasinRecord>,
}

impl BasinTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn precipitation(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.precipitation_mm).collect()
    }

    pub fn temperature(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.temperature_c).collect()
    }

    /// Precipitation plus Hargreaves PET from the temperature column.
    pub fn forcing(&self) -> Result<ForcingData, ModelError> {
        ForcingData::from_temperature(self.precipitation(), &self.temperature())
    }

    /// Observed discharge converted to mm/day. Missing flow values become NaN.
    pub fn observed_mm(&self, basin_area_km2: f64) -> Vec<f64> {
        let cfs: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.streamflow_cfs.unwrap_or(f64::NAN))
            .collect();
        convert_cfs_series(&cfs, basin_area_km2)
    }

    /// Split into (rows strictly before `date`, rows on or after `date`).
    pub fn split_at(&self, date: NaiveDate) -> (BasinTable, BasinTable) {
        let (before, after): (Vec<BasinRecord>, Vec<BasinRecord>) =
            self.records.iter().partition(|r| r.date < date);
        (BasinTable { records: before }, BasinTable { records: after })
    }
}

pub fn read_basin_table_from<R: Read>(reader: R) -> Result<BasinTable, IoError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        let raw: RawBasinRecord = row?;
        records.push(BasinRecord {
            date: parse_date(&raw.date)?,
            precipitation_mm: raw.precipitation_mm,
            temperature_c: raw.temperature_c,
            streamflow_cfs: raw.streamflow_cfs,
        });
    }
    Ok(BasinTable { records })
}

pub fn read_basin_table(path: &Path) -> Result<BasinTable, IoError> {
    read_basin_table_from(File::open(path)?)
}

pub fn write_basin_table_to<W: Write>(writer: W, table: &BasinTable) -> Result<(), IoError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "precipitation_mm", "temperature_c", "streamflow_cfs"])?;
    for r in &table.records {
        wtr.write_record([
            r.date.format(DATE_FORMAT).to_string(),
            r.precipitation_mm.to_string(),
            r.temperature_c.to_string(),
            r.streamflow_cfs.map(format_value).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_basin_table(path: &Path, table: &BasinTable) -> Result<(), IoError> {
    write_basin_table_to(File::create(path)?, table)
}

pub fn write_calibration_table_to<W: Write>(
    writer: W,
    result: &CalibrationResult,
) -> Result<(), IoError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["parameter", "value"])?;
    for (name, value) in result.table_rows() {
        wtr.write_record([name.to_string(), format_value(value)])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_calibration_table(path: &Path, result: &CalibrationResult) -> Result<(), IoError> {
    write_calibration_table_to(File::create(path)?, result)
}

#[derive(Debug, Deserialize)]
struct ParameterRow {
    parameter: String,
    value: f64,
}

/// Parameters and, when present, the recorded calibration NSE.
pub fn read_calibration_table_from<R: Read>(
    reader: R,
) -> Result<(Parameters, Option<f64>), IoError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut values: [Option<f64>; 4] = [None; 4];
    let mut nse = None;
    for row in rdr.deserialize() {
        let row: ParameterRow = row?;
        if row.parameter == "NSE" {
            nse = Some(row.value);
        } else if let Some(i) = PARAM_NAMES.iter().position(|&n| n == row.parameter) {
            values[i] = Some(row.value);
        }
    }
    let mut x = [0.0; 4];
    for (i, v) in values.iter().enumerate() {
        x[i] = v.ok_or(IoError::MissingParameter(PARAM_NAMES[i]))?;
    }
    let params = Parameters::new(x[0], x[1], x[2], x[3])?;
    Ok((params, nse))
}

pub fn read_calibration_table(path: &Path) -> Result<(Parameters, Option<f64>), IoError> {
    read_calibration_table_from(File::open(path)?)
}

pub fn write_validation_table_to<W: Write>(
    writer: W,
    report: &ValidationReport,
) -> Result<(), IoError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "observed", "simulated", "precipitation"])?;
    for r in &report.series {
        wtr.write_record([
            r.date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            format_value(r.observed),
            format_value(r.simulated),
            format_value(r.precipitation),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_validation_table(path: &Path, report: &ValidationReport) -> Result<(), IoError> {
    write_validation_table_to(File::create(path)?, report)
}

/// Write one row per day: the date, then every flux column in declaration order.
pub fn write_simulation_table_to<W: Write>(
    writer: W,
    dates: &[NaiveDate],
    fluxes: &FluxesTimeseries,
) -> Result<(), IoError> {
    if dates.len() != fluxes.len() {
        return Err(ModelError::shape("dates", "fluxes", dates.len(), fluxes.len()).into());
    }
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["date"];
    header.extend(fluxes.columns().map(|(name, _)| name));
    wtr.write_record(&header)?;
    for (i, date) in dates.iter().enumerate() {
        let mut row = vec![date.format(DATE_FORMAT).to_string()];
        row.extend(fluxes.columns().map(|(_, col)| format_value(col[i])));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_simulation_table(
    path: &Path,
    dates: &[NaiveDate],
    fluxes: &FluxesTimeseries,
) -> Result<(), IoError> {
    write_simulation_table_to(File::create(path)?, dates, fluxes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Termination;
    use crate::metrics::PerformanceMetrics;
    use crate::validation::AlignedRecord;

    const BASIN_CSV: &str = "\
date,streamflow_cfs,precipitation_mm,temperature_c,precip_7day
2011-12-30,2000.0,4.5,3.0,2.1
2011-12-31 00:00:00,1800.0,0.0,-1.5,2.0
2012-01-01,,12.0,10.0,3.3
2012-01-02,2100.0,0.0,20.0,3.1
";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn reads_basin_table_ignoring_extra_columns() {
        let table = read_basin_table_from(BASIN_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.records[1].date, ymd(2011, 12, 31));
        assert_eq!(table.records[0].precipitation_mm, 4.5);
        assert_eq!(table.records[2].streamflow_cfs, None);
        assert_eq!(table.records[3].temperature_c, 20.0);
    }

    #[test]
    fn observed_conversion_and_forcing() {
        let table = read_basin_table_from(BASIN_CSV.as_bytes()).unwrap();
        let obs = table.observed_mm(2000.0);
        assert!((obs[0] - 2.44657152).abs() < 1e-12);
        assert!(obs[2].is_nan());
        let forcing = table.forcing().unwrap();
        assert_eq!(forcing.len(), 4);
        assert_eq!(forcing.pet[3], crate::forcing::hargreaves_pet(20.0));
    }

    #[test]
    fn bad_date_is_reported() {
        let csv = "date,precipitation_mm,temperature_c\n01/02/2012,1.0,2.0\n";
        assert!(matches!(
            read_basin_table_from(csv.as_bytes()),
            Err(IoError::Date { .. })
        ));
    }

    #[test]
    fn split_is_strictly_before_date() {
        let table = read_basin_table_from(BASIN_CSV.as_bytes()).unwrap();
        let (cal, val) = table.split_at(ymd(2012, 1, 1));
        assert_eq!(cal.dates(), vec![ymd(2011, 12, 30), ymd(2011, 12, 31)]);
        assert_eq!(val.dates(), vec![ymd(2012, 1, 1), ymd(2012, 1, 2)]);
    }

    #[test]
    fn basin_table_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validation_data.csv");
        let table = read_basin_table_from(BASIN_CSV.as_bytes()).unwrap();
        write_basin_table(&path, &table).unwrap();
        assert_eq!(read_basin_table(&path).unwrap(), table);
    }

    #[test]
    fn calibration_table_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibrated_parameters.csv");
        let result = CalibrationResult {
            params: Parameters::new(412.5, -0.75, 63.0, 2.05).unwrap(),
            nse: 0.8125,
            generations: 50,
            evaluations: 2040,
            termination: Termination::MaxGenerations,
            history: vec![],
        };
        write_calibration_table(&path, &result).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("parameter,value\nX1,412.5\n"));
        let (params, nse) = read_calibration_table(&path).unwrap();
        assert_eq!(params, result.params);
        assert_eq!(nse, Some(0.8125));
    }

    #[test]
    fn calibration_table_missing_row() {
        let csv = "parameter,value\nX1,350\nX2,0\nX4,1.7\n";
        assert!(matches!(
            read_calibration_table_from(csv.as_bytes()),
            Err(IoError::MissingParameter("X3"))
        ));
    }

    #[test]
    fn calibration_table_invalid_params() {
        let csv = "parameter,value\nX1,-3\nX2,0\nX3,90\nX4,1.7\n";
        assert!(matches!(
            read_calibration_table_from(csv.as_bytes()),
            Err(IoError::Model(ModelError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn simulation_table_has_all_flux_columns() {
        let p = Parameters::default();
        let fluxes = crate::gr4j::run_fluxes(&p, &[10.0, 0.0], &[1.0, 1.0], None).unwrap();
        let dates = [ymd(2012, 1, 1), ymd(2012, 1, 2)];
        let mut buf = Vec::new();
        write_simulation_table_to(&mut buf, &dates, &fluxes).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("date,pet,precip,"));
        assert!(header.ends_with(",streamflow"));
        assert_eq!(lines.count(), 2);

        assert!(write_simulation_table_to(Vec::new(), &dates[..1], &fluxes).is_err());
    }

    #[test]
    fn validation_table_writes_nan() {
        let report = ValidationReport {
            metrics: PerformanceMetrics {
                nse: f64::NAN,
                rmse: 0.0,
                bias: 0.0,
                kge: 0.0,
            },
            series: vec![
                AlignedRecord {
                    date: Some(ymd(2012, 1, 1)),
                    observed: 0.5,
                    simulated: 0.25,
                    precipitation: 12.0,
                },
                AlignedRecord {
                    date: Some(ymd(2012, 1, 2)),
                    observed: f64::NAN,
                    simulated: 0.125,
                    precipitation: 0.0,
                },
            ],
            flags: vec![],
        };
        let mut buf = Vec::new();
        write_validation_table_to(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "date,observed,simulated,precipitation\n\
             2012-01-01,0.5,0.25,12\n\
             2012-01-02,NaN,0.125,0\n"
        );
    }
}
