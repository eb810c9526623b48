use mr_controls::{ControllerConfig, ControllerKind, PidGains, StcGains, preset_bank};
use mr_project::schema::*;
use mr_project::{ProjectError, ValidationError, build_config, validate_scenario};
use mr_sim::DemandProfile;

fn base() -> Scenario {
    Scenario::preset(ControllerKind::Pid, 8, DemandProfile::Step)
}

#[test]
fn presets_validate_and_build() {
    for count in [1, 2, 4, 8] {
        for kind in ControllerKind::ALL {
            let scenario = Scenario::preset(kind, count, DemandProfile::MultiStep);
            validate_scenario(&scenario).unwrap();
            let cfg = build_config(&scenario).unwrap();
            assert_eq!(cfg.drums.count, count);
            assert_eq!(cfg.controller.kind(), kind);
            assert_eq!(cfg.horizon_s, 400.0);
        }
    }
}

#[test]
fn reference_values_fill_gaps() {
    let cfg = build_config(&base()).unwrap();
    let bank = preset_bank(8).unwrap();
    assert_eq!(cfg.drums.limits.rate_max_deg_s, bank.rate_limit());
    assert_eq!(&cfg.drums.curve, bank.curve());
    assert_eq!(cfg.controller, ControllerConfig::Pid(PidGains::for_bank(&bank)));
}

#[test]
fn overrides_replace_single_gains() {
    let mut scenario = Scenario::preset(ControllerKind::SuperTwisting, 2, DemandProfile::Step);
    scenario.controller = ControllerDef::SuperTwisting {
        k1: Some(3.0),
        k2: None,
        surface_derivative_s: None,
        derivative_filter_s: None,
    };
    let cfg = build_config(&scenario).unwrap();
    let reference = StcGains::for_bank(&preset_bank(2).unwrap());
    match cfg.controller {
        ControllerConfig::SuperTwisting(g) => {
            assert_eq!(g.k1, 3.0);
            assert_eq!(g.k2, reference.k2);
        }
        other => panic!("unexpected controller {other:?}"),
    }
}

#[test]
fn rejects_future_version() {
    let mut scenario = base();
    scenario.version = LATEST_VERSION + 1;
    assert!(matches!(
        validate_scenario(&scenario),
        Err(ValidationError::UnsupportedVersion { .. })
    ));
}

#[test]
fn rejects_unsupported_drum_count() {
    let mut scenario = base();
    scenario.drums.count = 3;
    assert!(matches!(
        validate_scenario(&scenario),
        Err(ValidationError::Unsupported { .. })
    ));
}

#[test]
fn rejects_bad_run_settings() {
    let mut scenario = base();
    scenario.run.dt_s = 0.0;
    assert!(validate_scenario(&scenario).is_err());

    let mut scenario = base();
    scenario.run.dt_s = 0.2;
    assert!(validate_scenario(&scenario).is_err());

    let mut scenario = base();
    scenario.run.record_every = 0;
    assert!(validate_scenario(&scenario).is_err());
}

#[test]
fn rejects_negative_gain_override() {
    let mut scenario = base();
    scenario.controller = ControllerDef::Pid {
        kp: Some(-1.0),
        ki: None,
        kd: None,
        derivative_filter_s: None,
        kaw: None,
    };
    match validate_scenario(&scenario) {
        Err(ValidationError::InvalidValue { field, .. }) => assert_eq!(field, "controller.kp"),
        other => panic!("expected invalid kp, got {other:?}"),
    }
}

#[test]
fn rejects_decreasing_demand_points() {
    let mut scenario = base();
    scenario.demand = DemandDef::Points {
        points: vec![
            DemandPointDef {
                time_s: 5.0,
                power: 1.0,
            },
            DemandPointDef {
                time_s: 1.0,
                power: 1.0,
            },
        ],
    };
    assert!(validate_scenario(&scenario).is_err());
}

#[test]
fn critical_angle_outside_limits_fails_at_build() {
    let mut scenario = base();
    scenario.drums.worth = Some(WorthDef::Linear {
        worth_per_deg: 1e-5,
        critical_angle_deg: 170.0,
    });
    scenario.drums.angle_max_deg = 160.0;
    validate_scenario(&scenario).unwrap();
    assert!(matches!(
        build_config(&scenario),
        Err(ProjectError::Sim(_))
    ));
}

#[test]
fn kaw_override_reaches_pid() {
    let mut scenario = base();
    scenario.controller = ControllerDef::Pid {
        kp: None,
        ki: None,
        kd: None,
        derivative_filter_s: None,
        kaw: Some(0.05),
    };
    match build_config(&scenario).unwrap().controller {
        ControllerConfig::Pid(g) => {
            assert_eq!(g.kaw, 0.05);
            assert_eq!(g.kp, PidGains::for_bank(&preset_bank(8).unwrap()).kp);
        }
        other => panic!("unexpected controller {other:?}"),
    }
}

#[test]
fn load_follow_presets_start_at_first_level() {
    for (count, first) in [(1, 0.9), (2, 0.7), (4, 0.3), (8, 1.0)] {
        let scenario = Scenario::preset(ControllerKind::Pid, count, DemandProfile::LoadFollow);
        assert_eq!(scenario.run.initial_power, first);
        let cfg = build_config(&scenario).unwrap();
        assert_eq!(cfg.demand.initial(), first);
        assert_eq!(cfg.horizon_s, 6000.0);
    }
}

#[test]
fn unreachable_demand_fails_at_build() {
    let mut scenario = Scenario::preset(ControllerKind::SuperTwisting, 1, DemandProfile::Step);
    scenario.demand = DemandDef::Constant { power: 0.2 };
    validate_scenario(&scenario).unwrap();
    assert!(matches!(
        build_config(&scenario),
        Err(ProjectError::Sim(mr_sim::SimError::Config(_)))
    ));
}
