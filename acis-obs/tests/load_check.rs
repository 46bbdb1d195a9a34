mod common;

use std::collections::HashMap;

use acis_obs::{
    review_load, CatalogEntry, CatalogResponse, CatalogUnavailable, CategoryLimits, Instrument,
    NoCatalog, ObsId, StaticCatalog, TemperatureSeries, ThermalCheckError,
};
use approx::assert_relative_eq;
use common::{
    init_logging, StateStream, ACIS_I_SIMPOS, ACIS_S_SIMPOS, HRC_I_SIMPOS, HRC_S_SIMPOS, S3_ONLY,
    SIX_CHIP,
};

const T0: f64 = 7.0e8;
const STEP: f64 = 1000.0;

/// Four observations, each spanning four records:
///
/// | obsid | instrument | science window          |
/// |-------|------------|-------------------------|
/// | 1000  | ACIS-S, S3 | T0 + 2000 .. T0 + 4000  |
/// | 2000  | ACIS-I     | T0 + 6000 .. T0 + 8000  |
/// | 3000  | HRC-I      | T0 + 10000 .. T0 + 12000|
/// | 60100 | HRC-S ECS  | T0 + 14000 .. T0 + 16000|
fn states() -> Vec<acis_obs::CommandedState> {
    StateStream::new(T0, STEP)
        .observation(1000, ACIS_S_SIMPOS, S3_ONLY, 1)
        .observation(2000, ACIS_I_SIMPOS, SIX_CHIP, 6)
        .observation(3000, HRC_I_SIMPOS, "WSPOW00000", 0)
        .observation(60100, HRC_S_SIMPOS, S3_ONLY, 1)
        .build()
}

/// Baseline -120 C sampled every 500 s, with excursions in the windows of
/// 1000 (-110), 2000 (-111.5 twice), 3000 (-100) and 60100 (-119).
fn temperatures() -> TemperatureSeries {
    let times: Vec<f64> = (0..=32).map(|i| T0 + 500.0 * i as f64).collect();
    let values = times
        .iter()
        .map(|t| match (t - T0) as i64 {
            3000 => -110.0,
            6500 | 7000 => -111.5,
            11000 => -100.0,
            15000 => -119.0,
            _ => -120.0,
        })
        .collect();
    TemperatureSeries::from_vecs(times, values).unwrap()
}

fn catalog() -> StaticCatalog {
    StaticCatalog::new(HashMap::from([
        (
            1000,
            CatalogEntry {
                grating: "NONE".to_string(),
                cnt_rate: 0.001,
                app_exp: 10.0,
            },
        ),
        (
            2000,
            CatalogEntry {
                grating: "NONE".to_string(),
                cnt_rate: 5.0,
                app_exp: 50.0,
            },
        ),
    ]))
}

fn obsids(observations: &[acis_obs::ObservationInterval]) -> Vec<ObsId> {
    observations.iter().map(|o| o.obsid).collect()
}

#[test]
fn test_review_with_catalog() {
    init_logging();

    let report = review_load(
        &states(),
        &temperatures(),
        T0 - 100.0,
        &CategoryLimits::default(),
        &catalog(),
    )
    .unwrap();

    assert!(!report.catalog_degraded);
    assert!(report.catalog_warning.is_none());

    let classified = &report.observations;
    assert_eq!(obsids(&classified.acis_hot), vec![1000]);
    assert_eq!(obsids(&classified.acis_i), vec![2000]);
    assert!(classified.acis_s.is_empty());
    assert_eq!(obsids(&classified.cold_ecs), vec![60100]);
    assert_eq!(classified.acis_i[0].instrument, Instrument::AcisI);

    assert!(report.limit("planning_hi").unwrap().violations.is_empty());
    assert!(report.limit("acis_hot").unwrap().violations.is_empty());

    let acis_i = &report.limit("acis_i").unwrap().violations;
    assert_eq!(acis_i.len(), 1);
    assert_eq!(acis_i[0].obsid, Some(2000));
    assert_eq!(acis_i[0].tstart, T0 + 6500.0);
    assert_eq!(acis_i[0].tstop, T0 + 7000.0);
    assert_relative_eq!(acis_i[0].duration, 500.0);
    assert_eq!(acis_i[0].extreme_value, -111.5);
    assert_relative_eq!(acis_i[0].exposure_time.unwrap(), 50.0);

    let ecs = &report.limit("cold_ecs").unwrap().violations;
    assert_eq!(ecs.len(), 1);
    assert_eq!(ecs[0].obsid, Some(60100));
    assert!(ecs[0].exposure_time.is_none());

    assert_eq!(report.violation_count(), 2);
}

#[test]
fn test_review_without_catalog_is_degraded() {
    init_logging();

    let report = review_load(
        &states(),
        &temperatures(),
        T0 - 100.0,
        &CategoryLimits::default(),
        &NoCatalog,
    )
    .unwrap();

    assert!(report.catalog_degraded);
    assert!(report.catalog_warning.as_deref().unwrap().contains("hand-checked"));

    // Without count rates nothing can run hot
    assert!(report.observations.acis_hot.is_empty());
    let acis_s = &report.limit("acis_s").unwrap().violations;
    assert_eq!(acis_s.len(), 1);
    assert_eq!(acis_s[0].obsid, Some(1000));
    assert_eq!(acis_s[0].extreme_value, -110.0);
    assert_eq!(report.violation_count(), 3);
}

#[test]
fn test_failed_lookup_reason_is_reported() {
    init_logging();

    let lookup = |_: &[ObsId]| {
        CatalogResponse::Unavailable(CatalogUnavailable::RequestFailed("HTTP 503".to_string()))
    };
    let report = review_load(
        &states(),
        &temperatures(),
        T0 - 100.0,
        &CategoryLimits::default(),
        &lookup,
    )
    .unwrap();
    assert!(report.catalog_warning.unwrap().contains("HTTP 503"));
}

#[test]
fn test_planning_limit_masked_before_load_start() {
    init_logging();

    let limits = CategoryLimits {
        planning_hi: -105.0,
        ..CategoryLimits::default()
    };
    // Load starts after the -100 spike at T0 + 11000
    let report = review_load(
        &states(),
        &temperatures(),
        T0 + 11500.0,
        &limits,
        &catalog(),
    )
    .unwrap();
    assert!(report.limit("planning_hi").unwrap().violations.is_empty());
    // Only the ECS observation starts science after the load start
    assert_eq!(obsids(&report.observations.cold_ecs), vec![60100]);
    assert!(report.limit("acis_i").unwrap().violations.is_empty());

    let report = review_load(
        &states(),
        &temperatures(),
        T0 - 100.0,
        &limits,
        &catalog(),
    )
    .unwrap();
    let planning = &report.limit("planning_hi").unwrap().violations;
    assert_eq!(planning.len(), 1);
    assert_eq!(planning[0].tstart, T0 + 11000.0);
    assert!(planning[0].obsid.is_none());
}

#[test]
fn test_launchlock_science_is_unclassifiable() {
    init_logging();

    let states = StateStream::new(T0, STEP)
        .observation(1000, 0, S3_ONLY, 1)
        .build();
    match review_load(
        &states,
        &temperatures(),
        T0 - 100.0,
        &CategoryLimits::default(),
        &NoCatalog,
    ) {
        Err(ThermalCheckError::Classification { obsid, .. }) => assert_eq!(obsid, 1000),
        other => panic!("expected classification error, got {other:?}"),
    }
}
