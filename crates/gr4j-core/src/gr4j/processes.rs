/// GR4J core process functions.
///
/// Pure functions implementing the equations of each step of the daily
/// recurrence. All inputs and outputs are f64.
use super::constants::{EXCHANGE_EXPONENT, NONLINEARITY_SCALE};

/// Result of the production store update for one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionUpdate {
    /// Store level after the update, clipped to [0, X1].
    pub store: f64,
    /// Net rainfall Pn (0 on the evaporation-dominant branch).
    pub net_rainfall: f64,
    /// Net evaporation demand En (0 on the rainfall-dominant branch).
    pub net_evap: f64,
    /// Rainfall entering the store, Ps.
    pub storage_infiltration: f64,
    /// Evaporation drawn from the store, Es.
    pub store_evaporation: f64,
}

/// Update the production store based on precipitation and evapotranspiration.
///
/// Handles two cases:
/// - P >= E: rainfall dominant, the store gains Ps
/// - P < E: evapotranspiration dominant, the store loses Es
pub fn production_store_update(
    precip: f64,
    pet: f64,
    production_store: f64,
    x1: f64,
) -> ProductionUpdate {
    let store_ratio = production_store / x1;

    let (net_rainfall, net_evap, ps, es) = if precip >= pet {
        let pn = precip - pet;
        let tanh_ws = (pn / x1).tanh();
        let ps = x1 * (1.0 - store_ratio * store_ratio) * tanh_ws / (1.0 + store_ratio * tanh_ws);
        (pn, 0.0, ps, 0.0)
    } else {
        let en = pet - precip;
        let tanh_ws = (en / x1).tanh();
        let es = production_store * (2.0 - store_ratio) * tanh_ws
            / (1.0 + (1.0 - store_ratio) * tanh_ws);
        (0.0, en, 0.0, es)
    };

    ProductionUpdate {
        store: (production_store - es + ps).clamp(0.0, x1),
        net_rainfall,
        net_evap,
        storage_infiltration: ps,
        store_evaporation: es,
    }
}

/// Saturating outflow law shared by percolation and routing:
/// `level * (1 - (1 + (level / (2.25 * capacity))^4)^-0.25)`.
#[inline]
fn saturating_outflow(level: f64, capacity: f64) -> f64 {
    let ratio = level / (NONLINEARITY_SCALE * capacity);
    level * (1.0 - (1.0 + ratio.powi(4)).powf(-0.25))
}

/// Compute percolation from the production store.
///
/// Returns (new_store, percolation_amount).
pub fn percolation(production_store: f64, x1: f64) -> (f64, f64) {
    let perc = saturating_outflow(production_store, x1);
    (production_store - perc, perc)
}

/// Effective rainfall sent to routing: `perc + (precip - Ps)`.
///
/// Uses the day's raw precipitation on both branches, so on an
/// evaporation-dominant day the rainfall already offset against PET is
/// still routed.
#[inline]
pub fn effective_rainfall(percolation: f64, precip: f64, storage_infiltration: f64) -> f64 {
    percolation + (precip - storage_infiltration)
}

/// Compute groundwater exchange.
///
/// F = X2 * (R/X3)^3.5. Positive X2 imports water, negative exports it.
pub fn groundwater_exchange(routing_store: f64, x2: f64, x3: f64) -> f64 {
    x2 * (routing_store / x3).powf(EXCHANGE_EXPONENT)
}

/// Update the routing store and compute its outflow.
///
/// The store receives UH1 output plus exchange and is floored at zero but
/// not capped at X3.
///
/// Returns (new_store, outflow_qr).
pub fn routing_store_update(routing_store: f64, q9: f64, exchange: f64, x3: f64) -> (f64, f64) {
    let store = (routing_store + q9 + exchange).max(0.0);
    let qr = saturating_outflow(store, x3);
    (store - qr, qr)
}

/// Total streamflow: routing outflow plus the direct UH2 branch, floored at zero.
#[inline]
pub fn total_streamflow(qr: f64, q1: f64) -> f64 {
    (qr + q1).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected} ± {tol}, got {actual}"
        );
    }

    // -- Production store update --

    #[test]
    fn rainfall_dominant_increases_store() {
        let u = production_store_update(10.0, 3.0, 175.0, 350.0);
        assert!(u.store > 175.0);
        assert_approx(u.net_rainfall, 7.0, 1e-12);
        assert_eq!(u.net_evap, 0.0);
        assert_eq!(u.store_evaporation, 0.0);
    }

    #[test]
    fn evap_dominant_decreases_store() {
        let u = production_store_update(2.0, 5.0, 175.0, 350.0);
        assert!(u.store < 175.0);
        assert_approx(u.net_evap, 3.0, 1e-12);
        assert_eq!(u.storage_infiltration, 0.0);
    }

    #[test]
    fn zero_inputs_no_change() {
        let u = production_store_update(0.0, 0.0, 175.0, 350.0);
        assert_approx(u.store, 175.0, 1e-12);
        assert_eq!(u.storage_infiltration, 0.0);
        assert_eq!(u.store_evaporation, 0.0);
    }

    #[test]
    fn infiltration_never_exceeds_net_rainfall() {
        for s in [0.0, 50.0, 175.0, 349.0] {
            let u = production_store_update(40.0, 1.0, s, 350.0);
            assert!(u.storage_infiltration <= u.net_rainfall + 1e-12);
        }
    }

    #[test]
    fn store_clipped_to_capacity() {
        let u = production_store_update(1.0e6, 0.0, 350.0, 350.0);
        assert!(u.store <= 350.0);
        let u = production_store_update(0.0, 1.0e6, 1.0, 350.0);
        assert!(u.store >= 0.0);
    }

    // -- Percolation --

    #[test]
    fn percolation_conservation() {
        let (new_store, perc) = percolation(175.0, 350.0);
        assert!(perc > 0.0);
        assert_approx(new_store + perc, 175.0, 1e-12);
    }

    #[test]
    fn percolation_zero_for_empty_store() {
        let (new_store, perc) = percolation(0.0, 350.0);
        assert_eq!(new_store, 0.0);
        assert_eq!(perc, 0.0);
    }

    // -- Effective rainfall --

    #[test]
    fn effective_rainfall_uses_raw_precip() {
        // Evaporation-dominant day: Ps = 0, precipitation still routed.
        assert_approx(effective_rainfall(0.5, 2.0, 0.0), 2.5, 1e-12);
    }

    // -- Groundwater exchange --

    #[test]
    fn exchange_zero_when_x2_zero() {
        assert_eq!(groundwater_exchange(45.0, 0.0, 90.0), 0.0);
    }

    #[test]
    fn exchange_follows_sign_of_x2() {
        // (45/90)^3.5 = 0.08838834764831845
        assert_approx(groundwater_exchange(45.0, 1.0, 90.0), 0.08838834764831845, 1e-12);
        assert_approx(groundwater_exchange(45.0, -2.0, 90.0), -0.1767766952966369, 1e-12);
    }

    // -- Routing store update --

    #[test]
    fn routing_outflow_positive_with_inflow() {
        let (new_store, qr) = routing_store_update(45.0, 5.0, 0.0, 90.0);
        assert!(qr > 0.0);
        assert_approx(new_store + qr, 50.0, 1e-12);
    }

    #[test]
    fn routing_store_floored_at_zero() {
        let (new_store, qr) = routing_store_update(5.0, 1.0, -100.0, 90.0);
        assert_eq!(new_store, 0.0);
        assert_eq!(qr, 0.0);
    }

    #[test]
    fn routing_store_may_exceed_capacity() {
        let (new_store, _qr) = routing_store_update(85.0, 60.0, 3.0, 90.0);
        assert!(new_store > 90.0);
    }

    #[test]
    fn streamflow_non_negative() {
        assert_eq!(total_streamflow(0.0, 0.0), 0.0);
        assert_approx(total_streamflow(1.5, 0.25), 1.75, 1e-12);
    }
}
