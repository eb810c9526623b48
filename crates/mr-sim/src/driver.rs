//! Fixed-step closed-loop driver.
//!
//! Each step at `t_n = n * dt`:
//! 1. evaluate the demand at `t_n`
//! 2. the controller turns `(power, demand)` into a drum rate command
//! 3. the drum bank applies slew and travel limits and yields drum reactivity
//! 4. the reactor advances one step with that reactivity held constant
//! 5. the new sample is recorded at `t_{n+1}`
//!
//! The run stops at the horizon or at the first invalid plant state.

use mr_controls::{AnyController, Controller, DrumBank, DrumState, Observation};
use mr_plant::{PlantError, PlantState, Reactor, ReactorParams};
use tracing::{debug, info, warn};

use crate::config::{SimConfig, equilibrium};
use crate::error::SimResult;
use crate::trace::{SimulationTrace, TraceRecord};

/// Why and where a run stopped early.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFailure {
    /// Step whose result was rejected.
    pub step: usize,
    /// Time the rejected state would have had.
    pub time_s: f64,
    pub error: PlantError,
    /// Last state that passed the physical checks.
    pub last_state: PlantState,
}

/// Trace of a run, complete or cut short.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub trace: SimulationTrace,
    pub failure: Option<RunFailure>,
}

impl RunOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// A validated, ready-to-run simulation.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    reactor: Reactor,
    bank: DrumBank,
    controller: AnyController,
    initial_plant: PlantState,
    initial_drum: DrumState,
}

impl Simulation {
    /// Validate `config` and build the plant, bank and controller.
    ///
    /// The plant starts in equilibrium at `initial_power`; the drums start at
    /// the angle that cancels the resulting temperature feedback.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if the configuration is invalid, including
    /// when the drums cannot hold the initial power or any demanded level.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let bank = config.drums.build()?;
        let controller = config.controller.build(bank.rate_limit())?;
        let reactor = Reactor::new(ReactorParams::microreactor()?, config.integrator);
        let (initial_plant, initial_drum) = equilibrium(&bank, &reactor, config.initial_power)?;

        Ok(Self {
            config,
            reactor,
            bank,
            controller,
            initial_plant,
            initial_drum,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bank(&self) -> &DrumBank {
        &self.bank
    }

    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    pub fn initial_plant(&self) -> &PlantState {
        &self.initial_plant
    }

    pub fn initial_drum(&self) -> DrumState {
        self.initial_drum
    }

    /// Run from the initial state to the horizon.
    ///
    /// Controller memory is reset first, so repeated runs are identical.
    pub fn run(&mut self) -> RunOutcome {
        self.controller.reset();

        let cfg = &self.config;
        let dt = cfg.dt_s;
        let steps = cfg.steps();
        info!(
            controller = self.controller.name(),
            drums = self.bank.count(),
            dt,
            steps,
            "starting run"
        );

        let mut trace = SimulationTrace::with_capacity(steps / cfg.record_every + 2);
        let mut plant = self.initial_plant.clone();
        let mut drum = self.initial_drum;

        trace.push(self.record(
            0,
            0.0,
            &plant,
            drum,
            Applied {
                command: 0.0,
                rate_saturated: false,
                angle_saturated: false,
            },
        ));

        let mut saturated = false;
        // Saturation seen since the last recorded sample.
        let mut window_rate_saturated = false;
        let mut window_angle_saturated = false;
        let mut failure = None;
        for n in 0..steps {
            let t = n as f64 * dt;
            let obs = Observation {
                time_s: t,
                power: plant.power,
                demand: cfg.demand.at(t),
            };
            let action = self.controller.update(&obs, dt);
            let actuated = self.bank.step(&drum, action.rate, dt);
            // The controller clamps to the same limit before the bank sees it.
            let rate_saturated =
                actuated.rate_saturated || action.command.abs() > self.bank.rate_limit();

            let now_saturated = rate_saturated || actuated.angle_saturated;
            if now_saturated != saturated {
                debug!(
                    time_s = t,
                    rate = rate_saturated,
                    angle = actuated.angle_saturated,
                    "drum saturation {}",
                    if now_saturated { "entered" } else { "cleared" }
                );
                saturated = now_saturated;
            }
            window_rate_saturated |= rate_saturated;
            window_angle_saturated |= actuated.angle_saturated;

            let t_next = (n + 1) as f64 * dt;
            match self.reactor.step(&plant, actuated.reactivity, dt) {
                Ok(next) => {
                    plant = next;
                    drum = actuated.state;
                }
                Err(error) => {
                    warn!(time_s = t_next, %error, "plant left the valid region; stopping run");
                    failure = Some(RunFailure {
                        step: n + 1,
                        time_s: t_next,
                        error,
                        last_state: plant.clone(),
                    });
                    break;
                }
            }

            if (n + 1) % cfg.record_every == 0 || n + 1 == steps {
                trace.push(self.record(
                    n + 1,
                    t_next,
                    &plant,
                    drum,
                    Applied {
                        command: action.command,
                        rate_saturated: window_rate_saturated,
                        angle_saturated: window_angle_saturated,
                    },
                ));
                window_rate_saturated = false;
                window_angle_saturated = false;
            }
        }

        if let Some(last) = trace.last() {
            info!(
                time_s = last.time_s,
                power = last.plant.power,
                samples = trace.len(),
                complete = failure.is_none(),
                "run finished"
            );
        }
        RunOutcome { trace, failure }
    }

    fn record(
        &self,
        step: usize,
        time_s: f64,
        plant: &PlantState,
        drum: DrumState,
        applied: Applied,
    ) -> TraceRecord {
        let demand = self.config.demand.at(time_s);
        let rho_drum = self.bank.reactivity(drum.angle_deg);
        let rho_feedback = self.reactor.feedback_reactivity(plant);
        TraceRecord {
            step,
            time_s,
            demand,
            plant: plant.clone(),
            drum,
            rho_drum,
            rho_feedback,
            rho_total: rho_drum + rho_feedback,
            error: demand - plant.power,
            command: applied.command,
            rate_saturated: applied.rate_saturated,
            angle_saturated: applied.angle_saturated,
            controller: self.controller.snapshot(),
        }
    }
}

/// Actuation over the steps a sample covers: the last command, and whether
/// any of those steps hit a limit.
struct Applied {
    command: f64,
    rate_saturated: bool,
    angle_saturated: bool,
}
