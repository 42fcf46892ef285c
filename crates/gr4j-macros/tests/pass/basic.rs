use gr4j_macros::Fluxes;

#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
pub struct DayFluxes {
    pub precip: f64,
    pub pet: f64,
    pub streamflow: f64,
}

fn main() {
    let f = DayFluxes { precip: 10.0, pet: 2.0, streamflow: 0.5 };
    let mut ts = DayFluxesTimeseries::with_capacity(10);
    ts.push(&f);
    assert_eq!(ts.len(), 1);
    assert!(!ts.is_empty());
    assert_eq!(DayFluxes::field_names(), &["precip", "pet", "streamflow"]);
    assert_eq!(ts.column("pet"), Some(&[2.0][..]));
    assert_eq!(ts.columns().map(|(name, _)| name).collect::<Vec<_>>(), ["precip", "pet", "streamflow"]);
    assert_eq!(ts.get(0), Some(f));
}
