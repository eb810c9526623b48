//! Open-loop reactor transients with the drum reactivity held fixed.

use mr_plant::{IntegratorType, PlantState, Reactor, ReactorParams};
use proptest::prelude::*;

fn reactor(integrator: IntegratorType) -> Reactor {
    Reactor::new(ReactorParams::microreactor().unwrap(), integrator)
}

fn hold(r: &Reactor, mut s: PlantState, rho: f64, dt: f64, t_end: f64) -> PlantState {
    let steps = (t_end / dt).round() as usize;
    for _ in 0..steps {
        s = r.step(&s, rho, dt).unwrap();
    }
    s
}

#[test]
fn nominal_state_does_not_drift() {
    let r = reactor(IntegratorType::RK4);
    let s0 = r.steady_state(1.0).unwrap();
    let s = hold(&r, s0.clone(), 0.0, 0.01, 100.0);
    assert!((s.power - 1.0).abs() < 1e-10);
    assert!((s.fuel_temp_k - s0.fuel_temp_k).abs() < 1e-8);
    assert!((s.moderator_temp_k - s0.moderator_temp_k).abs() < 1e-8);
}

#[test]
fn feedback_settles_power_at_static_balance() {
    let r = reactor(IntegratorType::RK4);
    let rho = 1.0e-4;
    let s = hold(&r, r.steady_state(1.0).unwrap(), rho, 0.01, 600.0);

    let pc = r.params().thermal.power_coefficient();
    assert!(pc < 0.0);
    let expected = 1.0 - rho / pc;
    assert!((s.power - expected).abs() < 2e-3, "P = {}, expected {expected}", s.power);
    assert!(r.total_reactivity(&s, rho).abs() < 2e-5);
    assert!(s.fuel_temp_k > 1105.0);
}

#[test]
fn euler_agrees_with_rk4_at_small_steps() {
    let rho = 2.0e-4;
    let rk4 = reactor(IntegratorType::RK4);
    let euler = reactor(IntegratorType::ForwardEuler);
    let a = hold(&rk4, rk4.steady_state(1.0).unwrap(), rho, 0.01, 20.0);
    let b = hold(&euler, euler.steady_state(1.0).unwrap(), rho, 0.001, 20.0);
    assert!((a.power - b.power).abs() < 1e-3, "{} vs {}", a.power, b.power);
}

#[test]
fn deep_insertion_keeps_state_physical() {
    let r = reactor(IntegratorType::RK4);
    let mut s = r.steady_state(1.0).unwrap();
    for _ in 0..10_000 {
        s = r.step(&s, -5.0e-3, 0.01).unwrap();
        assert!(s.is_non_negative());
    }
    assert!(s.power < 0.5);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn bounded_reactivity_keeps_power_positive(
        rho in -3.0e-3_f64..1.0e-3,
        p0 in 0.3_f64..1.2,
    ) {
        let r = reactor(IntegratorType::RK4);
        let mut s = r.steady_state(p0).unwrap();
        for _ in 0..500 {
            s = r.step(&s, rho, 0.01).unwrap();
            prop_assert!(s.power > 0.0);
            prop_assert!(s.is_non_negative());
        }
    }
}
