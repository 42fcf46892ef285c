use gr4j_macros::Fluxes;

#[derive(Debug, Clone, Copy, PartialEq, Fluxes)]
#[fluxes(timeseries_name = "RoutingSeries")]
pub struct RoutingFluxes {
    pub q9: f64,
    pub q1: f64,
}

fn main() {
    let f = RoutingFluxes { q9: 1.5, q1: 0.2 };
    let mut ts = RoutingSeries::with_capacity(5);
    ts.push(&f);
    assert_eq!(ts.len(), 1);
    assert_eq!(RoutingFluxes::field_names(), &["q9", "q1"]);
}
