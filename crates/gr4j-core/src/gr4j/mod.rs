/// GR4J (Génie Rural à 4 paramètres Journalier).
///
/// A lumped conceptual daily rainfall-runoff model with 4 parameters,
/// 2 stores, and two unit hydrographs routed through circular delay lines.
pub mod constants;
pub mod fluxes;
pub mod params;
pub mod processes;
pub mod run;
pub mod state;
pub mod unit_hydrographs;

pub use params::Parameters;
pub use run::{run, run_fluxes, step, Gr4j};
pub use state::State;
pub use unit_hydrographs::UnitHydrographs;
