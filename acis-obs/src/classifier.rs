//! Thermal category assignment for ACIS and ECS observations.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThermalCheckError};
use crate::focal_plane::Instrument;
use crate::segmenter::ObservationInterval;
use crate::ObsId;

/// Obsids at or above this are engineering/calibration (ECS) runs.
pub const ECS_OBSID_MIN: ObsId = 60000;

/// Observations with fewer expected counts than this on S3 may run hot.
pub const LOW_COUNT_THRESHOLD: i64 = 300;

/// Observations partitioned by the thermal limit that applies to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classified {
    pub acis_i: Vec<ObservationInterval>,
    pub acis_s: Vec<ObservationInterval>,
    pub acis_hot: Vec<ObservationInterval>,
    pub cold_ecs: Vec<ObservationInterval>,
}

impl Classified {
    pub fn len(&self) -> usize {
        self.acis_i.len() + self.acis_s.len() + self.acis_hot.len() + self.cold_ecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Remove HRC science observations; HRC-S ECS runs are kept.
pub fn hrc_science_filter(intervals: Vec<ObservationInterval>) -> Vec<ObservationInterval> {
    intervals
        .into_iter()
        .filter(|obs| !(obs.instrument.is_hrc() && obs.obsid < ECS_OBSID_MIN))
        .collect()
}

/// Decide whether an observation may run at the hot limit.
///
/// HETG observations always can. So can low-count observations with S3 on
/// and at most one other chip, provided that chip is not S1. Without catalog
/// data nothing is hot.
fn is_hot(obs: &mut ObservationInterval) -> bool {
    let (hetg, cnt_rate, app_exp) = match obs.catalog_fields() {
        Some((grating, cnt_rate, app_exp)) => (grating == "HETG", cnt_rate, app_exp),
        None => return false,
    };

    let num_counts = (cnt_rate * app_exp).floor() as i64;
    obs.num_counts = Some(num_counts);

    let low_ct_s3 = match obs.ccd_count {
        0..=2 => {
            let mut low = num_counts < LOW_COUNT_THRESHOLD && obs.has_ccd("S3");
            if obs.ccd_count == 2 {
                low &= !obs.has_ccd("S1");
            }
            low
        }
        _ => false,
    };

    log::debug!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        obs.obsid,
        cnt_rate,
        app_exp * 1.0e-3,
        num_counts,
        obs.grating.as_deref().unwrap_or(""),
        obs.ccds.as_deref().unwrap_or("")
    );

    hetg || low_ct_s3
}

/// Partition observations into ACIS-I, ACIS-S, hot ACIS, and cold ECS.
///
/// HRC science runs must already have been removed with
/// [`hrc_science_filter`]; anything left that fits no category is an error.
pub fn classify(intervals: Vec<ObservationInterval>) -> Result<Classified> {
    let mut classified = Classified::default();

    log::debug!("OBSID\tCNT_RATE\tAPP_EXP\tNUM_CTS\tGRATING\tCCDS");
    for mut obs in intervals {
        if is_hot(&mut obs) {
            classified.acis_hot.push(obs);
            continue;
        }
        match obs.instrument {
            Instrument::AcisS => classified.acis_s.push(obs),
            Instrument::AcisI => classified.acis_i.push(obs),
            Instrument::HrcS if obs.obsid >= ECS_OBSID_MIN => classified.cold_ecs.push(obs),
            instrument => {
                return Err(ThermalCheckError::Classification {
                    obsid: obs.obsid,
                    instrument: instrument.to_string(),
                })
            }
        }
    }
    Ok(classified)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(obsid: ObsId, instrument: Instrument, ccd_count: u8, ccds: &str) -> ObservationInterval {
        ObservationInterval {
            obsid,
            datestart: String::new(),
            datestop: String::new(),
            tstart: 0.0,
            tstop: 100.0,
            start_science: 10.0,
            instrument,
            ccd_count,
            ccds: Some(ccds.to_string()),
            grating: None,
            cnt_rate: None,
            app_exp: None,
            num_counts: None,
        }
    }

    fn with_catalog(
        mut o: ObservationInterval,
        grating: &str,
        cnt_rate: f64,
        app_exp: f64,
    ) -> ObservationInterval {
        o.grating = Some(grating.to_string());
        o.cnt_rate = Some(cnt_rate);
        o.app_exp = Some(app_exp);
        o
    }

    #[test]
    fn test_hetg_is_hot() {
        let o = with_catalog(
            obs(1, Instrument::AcisS, 6, "I2,I3,S1,S2,S3,S4"),
            "HETG",
            100.0,
            1e6,
        );
        let c = classify(vec![o]).unwrap();
        assert_eq!(c.acis_hot.len(), 1);
    }

    #[test]
    fn test_low_count_s3_is_hot() {
        let o = with_catalog(obs(1, Instrument::AcisS, 1, "S3"), "NONE", 0.5, 400.0);
        let c = classify(vec![o]).unwrap();
        assert_eq!(c.acis_hot.len(), 1);
        assert_eq!(c.acis_hot[0].num_counts, Some(200));
    }

    #[test]
    fn test_low_count_threshold_is_exclusive() {
        let o = with_catalog(obs(1, Instrument::AcisS, 1, "S3"), "NONE", 0.5, 600.0);
        let c = classify(vec![o]).unwrap();
        assert_eq!(c.acis_s.len(), 1);
        assert_eq!(c.acis_s[0].num_counts, Some(300));
    }

    #[test]
    fn test_two_chips_with_s1_not_hot() {
        let o = with_catalog(obs(1, Instrument::AcisS, 2, "S1,S3"), "NONE", 0.001, 1000.0);
        assert_eq!(classify(vec![o]).unwrap().acis_s.len(), 1);

        let o = with_catalog(obs(2, Instrument::AcisS, 2, "S2,S3"), "NONE", 0.001, 1000.0);
        assert_eq!(classify(vec![o]).unwrap().acis_hot.len(), 1);
    }

    #[test]
    fn test_three_chips_never_low_count() {
        let o = with_catalog(obs(1, Instrument::AcisS, 3, "S2,S3,S4"), "NONE", 0.0, 1000.0);
        assert_eq!(classify(vec![o]).unwrap().acis_s.len(), 1);
    }

    #[test]
    fn test_missing_catalog_never_hot() {
        let o = obs(1, Instrument::AcisS, 1, "S3");
        let c = classify(vec![o]).unwrap();
        assert_eq!(c.acis_s.len(), 1);
        assert!(c.acis_s[0].num_counts.is_none());
    }

    #[test]
    fn test_instrument_dispatch() {
        let c = classify(vec![
            obs(1, Instrument::AcisI, 6, "I0,I1,I2,I3,S2,S3"),
            obs(2, Instrument::AcisS, 4, "S0,S1,S2,S3"),
            obs(60010, Instrument::HrcS, 0, ""),
        ])
        .unwrap();
        assert_eq!(c.acis_i.len(), 1);
        assert_eq!(c.acis_s.len(), 1);
        assert_eq!(c.cold_ecs.len(), 1);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_every_instrument_obsid_catalog_combination() {
        fn category(c: &Classified) -> &'static str {
            match (c.acis_i.len(), c.acis_s.len(), c.acis_hot.len(), c.cold_ecs.len()) {
                (1, 0, 0, 0) => "acis_i",
                (0, 1, 0, 0) => "acis_s",
                (0, 0, 1, 0) => "acis_hot",
                (0, 0, 0, 1) => "cold_ecs",
                _ => panic!("observation not in exactly one category: {c:?}"),
            }
        }

        let instruments = [
            (Instrument::AcisI, 4, "I0,I1,I2,I3"),
            (Instrument::AcisS, 3, "S2,S3,S4"),
            (Instrument::HrcI, 0, ""),
            (Instrument::HrcS, 0, ""),
            (Instrument::LaunchLock, 0, ""),
        ];
        for (instrument, ccd_count, ccds) in instruments {
            for obsid in [ECS_OBSID_MIN - 1, ECS_OBSID_MIN] {
                for catalog in [false, true] {
                    let mut o = obs(obsid, instrument, ccd_count, ccds);
                    if catalog {
                        o = with_catalog(o, "NONE", 10.0, 1e5);
                    }
                    let expected = match instrument {
                        Instrument::AcisI => Some("acis_i"),
                        Instrument::AcisS => Some("acis_s"),
                        Instrument::HrcS if obsid >= ECS_OBSID_MIN => Some("cold_ecs"),
                        _ => None,
                    };
                    let case = format!("{instrument} obsid {obsid} catalog {catalog}");
                    match (classify(vec![o]), expected) {
                        (Ok(c), Some(want)) => assert_eq!(category(&c), want, "{case}"),
                        (Err(ThermalCheckError::Classification { obsid: bad, .. }), None) => {
                            assert_eq!(bad, obsid, "{case}")
                        }
                        (other, _) => panic!("{case}: unexpected {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn test_unclassifiable_observation_errors() {
        for (obsid, instrument) in [
            (60010, Instrument::HrcI),
            (1234, Instrument::HrcS),
            (1234, Instrument::LaunchLock),
            (60011, Instrument::LaunchLock),
        ] {
            match classify(vec![obs(obsid, instrument, 0, "")]) {
                Err(ThermalCheckError::Classification { obsid: bad, .. }) => assert_eq!(bad, obsid),
                other => panic!("expected classification error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_hrc_science_filter() {
        let kept = hrc_science_filter(vec![
            obs(1, Instrument::HrcI, 0, ""),
            obs(2, Instrument::HrcS, 0, ""),
            obs(60010, Instrument::HrcS, 0, ""),
            obs(3, Instrument::AcisS, 1, "S3"),
            obs(4, Instrument::LaunchLock, 0, ""),
        ]);
        let obsids: Vec<_> = kept.iter().map(|o| o.obsid).collect();
        assert_eq!(obsids, vec![60010, 3, 4]);
    }
}
