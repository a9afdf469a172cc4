// tests/config_validation.rs

use std::path::PathBuf;

use rnapipe::config::manifest::ReadSpec;
use rnapipe::errors::PipelineError;
use rnapipe_test_utils::builders::ConfigFileBuilder;

fn paths(parts: &[&str]) -> Vec<PathBuf> {
    parts.iter().map(PathBuf::from).collect()
}

#[test]
fn single_end_one_lane() {
    let spec = ReadSpec::parse("s", "reads/s.fq").unwrap();
    assert_eq!(spec, ReadSpec::SingleEnd(paths(&["reads/s.fq"])));
    assert!(!spec.is_paired());
}

#[test]
fn paired_end_with_colon() {
    let spec = ReadSpec::parse("s", "s_R1.fq:s_R2.fq").unwrap();
    assert_eq!(
        spec,
        ReadSpec::PairedEnd {
            r1: paths(&["s_R1.fq"]),
            r2: paths(&["s_R2.fq"]),
        }
    );
}

#[test]
fn semicolon_is_an_accepted_pair_separator() {
    let spec = ReadSpec::parse("s", "s_R1.fq;s_R2.fq").unwrap();
    assert!(spec.is_paired());
}

#[test]
fn comma_separated_lanes_per_side() {
    let spec = ReadSpec::parse("s", "l1_R1.fq,l2_R1.fq:l1_R2.fq,l2_R2.fq").unwrap();
    assert_eq!(
        spec,
        ReadSpec::PairedEnd {
            r1: paths(&["l1_R1.fq", "l2_R1.fq"]),
            r2: paths(&["l1_R2.fq", "l2_R2.fq"]),
        }
    );
    assert_eq!(spec.all_inputs().len(), 4);
}

#[test]
fn whitespace_around_paths_is_trimmed() {
    let spec = ReadSpec::parse("s", " a.fq , b.fq : c.fq , d.fq ").unwrap();
    assert_eq!(
        spec,
        ReadSpec::PairedEnd {
            r1: paths(&["a.fq", "b.fq"]),
            r2: paths(&["c.fq", "d.fq"]),
        }
    );
}

#[test]
fn empty_spec_is_rejected() {
    let err = ReadSpec::parse("s", "   ").unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidManifestEntry { ref sample, .. } if sample == "s"
    ));
}

#[test]
fn empty_lane_entry_is_rejected() {
    assert!(ReadSpec::parse("s", "a.fq,:b.fq").is_err());
    assert!(ReadSpec::parse("s", "a.fq,,c.fq").is_err());
}

#[test]
fn mismatched_paired_lane_counts_are_rejected() {
    let err = ReadSpec::parse("s", "l1_R1.fq,l2_R1.fq:l1_R2.fq").unwrap_err();
    match err {
        PipelineError::InvalidManifestEntry { sample, reason } => {
            assert_eq!(sample, "s");
            assert!(reason.contains("lane counts"), "reason: {reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn more_than_two_sides_is_rejected() {
    assert!(ReadSpec::parse("s", "a.fq:b.fq:c.fq").is_err());
}

#[test]
fn config_without_samples_is_rejected() {
    let err = ConfigFileBuilder::new().try_build().unwrap_err();
    assert!(matches!(err, PipelineError::ConfigError(_)));
}

#[test]
fn malformed_sample_fails_config_validation() {
    let err = ConfigFileBuilder::new()
        .with_sample("good", "a.fq:b.fq")
        .with_sample("bad", "a.fq:b.fq:c.fq")
        .try_build()
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidManifestEntry { ref sample, .. } if sample == "bad"
    ));
}

#[test]
fn zero_jobs_is_rejected() {
    let err = ConfigFileBuilder::new()
        .with_sample("s", "a.fq")
        .with_jobs(0)
        .try_build()
        .unwrap_err();
    assert!(matches!(err, PipelineError::ConfigError(_)));
}

#[test]
fn p_value_outside_unit_interval_is_rejected() {
    for p in [0.0, -0.1, 1.5] {
        let result = ConfigFileBuilder::new()
            .with_sample("s", "a.fq")
            .with_p_value(p)
            .try_build();
        assert!(result.is_err(), "p_value {p} should be rejected");
    }
}

#[test]
fn empty_feature_list_is_rejected() {
    let err = ConfigFileBuilder::new()
        .with_sample("s", "a.fq")
        .with_features(&[])
        .try_build()
        .unwrap_err();
    assert!(matches!(err, PipelineError::ConfigError(_)));
}

#[test]
fn samples_come_out_in_name_order() {
    let cfg = ConfigFileBuilder::new()
        .with_sample("zeta", "z.fq")
        .with_sample("alpha", "a.fq")
        .build();
    let names: Vec<&str> = cfg.samples().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}
