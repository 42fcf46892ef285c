/// Timing harness for the GR4J engine (direct and trait paths) and the
/// calibration loop.
///
/// Uses std::time::Instant for timing, a deterministic LCG PRNG for data generation,
/// and std::hint::black_box to prevent dead-code elimination.
use std::hint::black_box;
use std::time::{Duration, Instant};

use gr4j_core::calibration::calibrate;
use gr4j_core::config::CalibrationConfig;
use gr4j_core::forcing::ForcingData;
use gr4j_core::gr4j::{run, run_fluxes, Gr4j, Parameters};
use gr4j_core::traits::HydrologicalModel;

const REPEATS: usize = 7;

/// Daily rain on roughly 40% of days plus a seasonal PET cycle.
fn make_data(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut state = seed;
    let mut next_f64 = || -> f64 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let precip: Vec<f64> = (0..n)
        .map(|_| {
            let wet = next_f64() < 0.4;
            let amount = next_f64() * 20.0;
            if wet {
                amount
            } else {
                0.0
            }
        })
        .collect();
    let pet: Vec<f64> = (0..n)
        .map(|t| (2.5 + 2.0 * (2.0 * std::f64::consts::PI * t as f64 / 365.25).sin()).max(0.0))
        .collect();
    (precip, pet)
}

/// Run a closure `REPEATS` times, return the median duration.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn bench_run(sizes: &[usize]) -> Vec<(&'static str, usize, Duration)> {
    let params = Parameters::default();
    let mut results = Vec::new();

    for &n in sizes {
        let (precip, pet) = make_data(n, 42);
        let days = ForcingData::new(precip.clone(), pet.clone())
            .map(|f| f.days())
            .unwrap_or_default();

        // Warmup
        black_box(run(&params, &precip, &pet).ok());

        let dur = median_time(|| {
            black_box(run(&params, &precip, &pet).ok());
        });
        results.push(("gr4j run", n, dur));

        let dur = median_time(|| {
            black_box(run_fluxes(&params, &precip, &pet, None).ok());
        });
        results.push(("gr4j run_fluxes", n, dur));

        let dur = median_time(|| {
            black_box(Gr4j::run(&params, &days, None).ok());
        });
        results.push(("gr4j trait run", n, dur));
    }
    results
}

fn bench_calibration(n: usize) -> Option<(&'static str, usize, Duration)> {
    let (precip, pet) = make_data(n, 7);
    let truth = Parameters::new(320.0, -0.8, 75.0, 2.1).ok()?;
    let observed = run(&truth, &precip, &pet).ok()?;
    let forcing = ForcingData::new(precip, pet).ok()?;
    let config = CalibrationConfig {
        max_generations: 20,
        ..CalibrationConfig::default()
    };

    let dur = median_time(|| {
        black_box(calibrate(&forcing, &observed, &config).ok());
    });
    Some(("calibrate (20 gen)", n, dur))
}

fn main() {
    println!("GR4J Core Benchmarks");
    println!("============================================================");
    println!("{:<18} {:>6}   {:>12}", "Task", "N", "Median (ms)");
    println!("--------------------------------------------");

    let mut all_results: Vec<(&str, usize, Duration)> = Vec::new();

    all_results.extend(bench_run(&[3650, 36500]));
    all_results.extend(bench_calibration(1095));

    for (task, n, dur) in &all_results {
        let ms = dur.as_secs_f64() * 1000.0;
        println!("{:<18} {:>6}      {:>8.2}", task, n, ms);
    }

    println!("============================================================");
}
