//! Building many independent profiles at once.
//!
//! Every site is built on a rayon thread pool. A shared [`BatchProgress`]
//! counts finished sites and carries a cancellation flag that the workers
//! check before starting each site.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;

use crate::error::AtmError;
use crate::profile::{AtmProfile, BasicParameters, ProfileOptions};

/// Progress of a batch, shared between the workers and the caller.
#[derive(Debug, Default)]
pub struct BatchProgress {
    completed: AtomicUsize,
    cancelled: AtomicBool,
}

impl BatchProgress {
    /// Fresh counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sites finished so far, including cancelled ones.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Ask the workers to stop. Sites already being built still finish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether [`BatchProgress::cancel`] was called
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

fn thread_pool(num_threads: Option<usize>) -> Result<rayon::ThreadPool, AtmError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .map_err(|e| AtmError::ThreadPool(e.to_string()))
}

fn build_all(
    sites: &[BasicParameters],
    options: &ProfileOptions,
    progress: &BatchProgress,
    results: &mut Vec<Result<AtmProfile, AtmError>>,
) {
    sites
        .par_iter()
        .map(|&site| -> Result<_, AtmError> {
            if progress.is_cancelled() {
                return Err(AtmError::Cancelled);
            }
            Ok(AtmProfile::with_options(site, *options))
        })
        .inspect(|_| {
            progress.completed.fetch_add(1, Ordering::Relaxed);
        })
        .collect_into_vec(results);
}

/// Build one profile per site, in order.
///
/// `num_threads` of `None` lets rayon choose. Fails with
/// [`AtmError::Cancelled`] if `progress` is cancelled before every site was
/// started.
pub fn build_profiles(
    sites: &[BasicParameters],
    options: &ProfileOptions,
    num_threads: Option<usize>,
    progress: &BatchProgress,
) -> Result<Vec<AtmProfile>, AtmError> {
    let pool = thread_pool(num_threads)?;
    info!("Building {} atmospheric profiles", sites.len());

    let mut results = Vec::new();
    pool.install(|| build_all(sites, options, progress, &mut results));

    debug!("collecting {} profiles", results.len());
    results.into_iter().collect()
}

/// Like [`build_profiles`], but the calling thread stays free while the pool
/// works and repeatedly runs `monitor`.
///
/// `monitor` is called until every site is done. It is expected to report
/// progress and block for a while. If it fails the batch is cancelled and its
/// error returned.
pub fn build_profiles_monitored<E, M>(
    sites: &[BasicParameters],
    options: &ProfileOptions,
    num_threads: Option<usize>,
    progress: &BatchProgress,
    mut monitor: M,
) -> Result<Vec<AtmProfile>, E>
where
    E: From<AtmError>,
    M: FnMut(&BatchProgress) -> Result<(), E>,
{
    let pool = thread_pool(num_threads)?;
    let num_sites = sites.len();
    info!("Building {num_sites} atmospheric profiles");

    let mut results = Vec::new();

    pool.in_place_scope(|s| -> Result<(), E> {
        s.spawn(|_| build_all(sites, options, progress, &mut results));

        // The main thread only watches the progress
        while !progress.is_cancelled() {
            if let Err(e) = monitor(progress) {
                progress.cancel();
                return Err(e);
            }
            if progress.completed() == num_sites {
                break;
            }
        }

        Ok(())
    })?;

    debug!("collecting {} profiles", results.len());
    Ok(results.into_iter().collect::<Result<Vec<_>, AtmError>>()?)
}

/// Scalars and layer arrays of a batch of profiles.
///
/// Per-site arrays have shape (`num_sites`,); layer arrays have shape
/// (`num_sites`, `max_layers`) and are padded with NaN past each profile's
/// last layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    /// Number of layers of each profile
    pub num_layers: Array1<u32>,
    /// Zenith water vapor column in mm
    pub ground_wh2o_mm: Array1<f64>,
    /// Tropopause altitude in km
    pub tropopause_altitude_km: Array1<f64>,
    /// Tropopause temperature in K
    pub tropopause_temperature_k: Array1<f64>,
    /// Layer thickness in m
    pub thickness_m: Array2<f64>,
    /// Layer temperature in K
    pub temperature_k: Array2<f64>,
    /// Layer pressure in mb
    pub pressure_mb: Array2<f64>,
    /// Layer water vapor in kg/m³
    pub water_vapor_kg_m3: Array2<f64>,
}

fn stack<F>(profiles: &[AtmProfile], max_layers: usize, layer_values: F) -> Array2<f64>
where
    F: Fn(&AtmProfile) -> Vec<f64>,
{
    let mut out = Array2::from_elem([profiles.len(), max_layers], f64::NAN);
    for (mut row, profile) in out.axis_iter_mut(Axis(0)).zip(profiles) {
        for (slot, value) in row.iter_mut().zip(layer_values(profile)) {
            *slot = value;
        }
    }
    out
}

/// Gather the profiles into arrays.
pub fn summarize(profiles: &[AtmProfile]) -> ProfileSummary {
    let max_layers = profiles.iter().map(AtmProfile::num_layers).max().unwrap_or(0);

    ProfileSummary {
        num_layers: profiles.iter().map(|p| p.num_layers() as u32).collect(),
        ground_wh2o_mm: profiles.iter().map(|p| p.ground_wh2o().get("mm")).collect(),
        tropopause_altitude_km: profiles
            .iter()
            .map(|p| p.tropopause_altitude().get("km"))
            .collect(),
        tropopause_temperature_k: profiles
            .iter()
            .map(|p| p.tropopause_temperature().get("K"))
            .collect(),
        thickness_m: stack(profiles, max_layers, |p| {
            p.thickness_profile().iter().map(|v| v.get("m")).collect()
        }),
        temperature_k: stack(profiles, max_layers, |p| {
            p.temperature_profile().iter().map(|v| v.get("K")).collect()
        }),
        pressure_mb: stack(profiles, max_layers, |p| {
            p.pressure_profile().iter().map(|v| v.get("mb")).collect()
        }),
        water_vapor_kg_m3: stack(profiles, max_layers, |p| {
            p.water_vapor_profile().iter().map(|v| v.get("kgm**-3")).collect()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::AtmosphereType;
    use crate::units::{Humidity, Length, Pressure, Temperature};
    use approx::assert_relative_eq;

    fn sites() -> Vec<BasicParameters> {
        (0..12)
            .map(|i| {
                let altitude = 400.0 * i as f64;
                BasicParameters::new(
                    Length::new(altitude, "m"),
                    Pressure::new(1013.0 * (-altitude / 8000.0).exp(), "mb"),
                    Temperature::new(290.0 - 6.5 * altitude / 1000.0, "K"),
                    -6.5,
                    Humidity::new(30.0 + 4.0 * i as f64, "%"),
                    Length::new(2.0, "km"),
                    AtmosphereType::ALL[i % 5],
                )
            })
            .collect()
    }

    #[test]
    fn parallel_matches_sequential() {
        let sites = sites();
        let options = ProfileOptions::default();
        let progress = BatchProgress::new();

        let parallel = build_profiles(&sites, &options, Some(4), &progress).unwrap();
        assert_eq!(parallel.len(), sites.len());
        assert_eq!(progress.completed(), sites.len());

        for (site, profile) in sites.iter().zip(&parallel) {
            let expected = AtmProfile::new(*site);
            assert_eq!(profile.num_layers(), expected.num_layers());
            assert_eq!(profile.pressure_profile(), expected.pressure_profile());
            assert_eq!(profile.o3_profile(), expected.o3_profile());
        }
    }

    #[test]
    fn cancelled_before_start() {
        let progress = BatchProgress::new();
        progress.cancel();
        let result = build_profiles(&sites(), &ProfileOptions::default(), Some(2), &progress);
        assert_eq!(result.unwrap_err(), AtmError::Cancelled);
    }

    #[test]
    fn monitored_run_completes() {
        let sites = sites();
        let progress = BatchProgress::new();
        let mut calls = 0;

        let profiles = build_profiles_monitored(
            &sites,
            &ProfileOptions::default(),
            Some(2),
            &progress,
            |p: &BatchProgress| -> Result<(), AtmError> {
                calls += 1;
                assert!(p.completed() <= sites.len());
                std::thread::sleep(std::time::Duration::from_millis(1));
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(profiles.len(), sites.len());
        assert!(calls >= 1);
    }

    #[test]
    fn failing_monitor_cancels() {
        let progress = BatchProgress::new();
        let result: Result<Vec<AtmProfile>, AtmError> = build_profiles_monitored(
            &sites(),
            &ProfileOptions::default(),
            Some(2),
            &progress,
            |_| Err(AtmError::Cancelled),
        );
        assert_eq!(result.unwrap_err(), AtmError::Cancelled);
        assert!(progress.is_cancelled());
    }

    #[test]
    fn empty_batch() {
        let progress = BatchProgress::new();
        let profiles = build_profiles(&[], &ProfileOptions::default(), None, &progress).unwrap();
        assert!(profiles.is_empty());

        let summary = summarize(&profiles);
        assert_eq!(summary.num_layers.len(), 0);
        assert_eq!(summary.pressure_mb.dim(), (0, 0));
    }

    #[test]
    fn summary_is_padded() {
        let short = AtmProfile::with_layers(2);
        let built = AtmProfile::new(sites()[0]);
        let n = built.num_layers();
        assert!(n > 2);

        let summary = summarize(&[short, built.clone()]);
        assert_eq!(summary.num_layers.to_vec(), vec![2, n as u32]);
        assert_eq!(summary.temperature_k.dim(), (2, n));
        assert_eq!(summary.temperature_k[[0, 1]], 0.0);
        assert!(summary.temperature_k[[0, 2]].is_nan());
        assert_relative_eq!(
            summary.pressure_mb[[1, n - 1]],
            built.layer_pressure(n - 1).unwrap().get("mb")
        );
        assert_relative_eq!(summary.ground_wh2o_mm[1], built.ground_wh2o().get("mm"));
        assert_relative_eq!(
            summary.tropopause_altitude_km[1],
            built.tropopause_altitude().get("km")
        );
    }
}
