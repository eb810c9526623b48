//! Parallel sweeps over independent runs.

use mr_controls::ControllerKind;
use rayon::prelude::*;

use crate::config::SimConfig;
use crate::driver::{RunOutcome, Simulation};
use crate::error::SimResult;

/// Run every configuration, in parallel, returning outcomes in input order.
pub fn run_sweep(configs: &[SimConfig]) -> Vec<SimResult<RunOutcome>> {
    configs
        .par_iter()
        .map(|cfg| Simulation::new(cfg.clone()).map(|mut sim| sim.run()))
        .collect()
}

/// `base` retargeted to every (drum count, controller) pair, counts outermost.
pub fn grid(
    base: &SimConfig,
    counts: &[usize],
    kinds: &[ControllerKind],
) -> SimResult<Vec<SimConfig>> {
    let mut out = Vec::with_capacity(counts.len() * kinds.len());
    for &count in counts {
        for &kind in kinds {
            out.push(base.retarget(kind, count)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_order_and_size() {
        let base = SimConfig::preset(ControllerKind::Pid, 8).unwrap();
        let cfgs = grid(&base, &[1, 4], &ControllerKind::ALL).unwrap();
        let labels: Vec<(usize, ControllerKind)> = cfgs
            .iter()
            .map(|c| (c.drums.count, c.controller.kind()))
            .collect();
        assert_eq!(
            labels,
            vec![
                (1, ControllerKind::Pid),
                (1, ControllerKind::SuperTwisting),
                (4, ControllerKind::Pid),
                (4, ControllerKind::SuperTwisting),
            ]
        );
        assert!(grid(&base, &[3], &ControllerKind::ALL).is_err());
    }

    #[test]
    fn sweep_matches_serial_runs() {
        let base = SimConfig::preset(ControllerKind::Pid, 8)
            .unwrap()
            .with_horizon(2.0);
        let cfgs = grid(&base, &[2, 8], &ControllerKind::ALL).unwrap();
        let parallel = run_sweep(&cfgs);
        assert_eq!(parallel.len(), cfgs.len());
        for (cfg, out) in cfgs.iter().zip(parallel) {
            let serial = Simulation::new(cfg.clone()).unwrap().run();
            assert_eq!(out.unwrap(), serial);
        }
    }

    #[test]
    fn invalid_entries_fail_individually() {
        let good = SimConfig::preset(ControllerKind::Pid, 8)
            .unwrap()
            .with_horizon(0.5);
        let bad = good.clone().with_dt(0.0);
        let out = run_sweep(&[good, bad]);
        assert!(out[0].is_ok());
        assert!(out[1].is_err());
    }

    #[test]
    fn banks_too_small_for_the_demand_fail_alone() {
        let base = SimConfig::preset(ControllerKind::Pid, 8)
            .unwrap()
            .with_demand(crate::LoadDemand::step(1.0, 0.2, 10.0).unwrap())
            .with_horizon(0.5);
        let cfgs = grid(&base, &[1, 8], &[ControllerKind::Pid]).unwrap();
        let out = run_sweep(&cfgs);
        assert!(matches!(out[0], Err(crate::SimError::Config(_))));
        assert!(out[1].is_ok());
    }
}
