use gr4j_macros::Fluxes;

#[derive(Fluxes)]
pub struct BadFluxes {
    pub streamflow: f64,
    pub day: u32,
}

fn main() {}
