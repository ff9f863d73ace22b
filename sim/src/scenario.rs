//! Scenario files: which body to simulate, how to drive it, and how to print it.
//!
//! A scenario is a list of segments, each held for its duration. Every field has a default, so an empty file
//! (or no file at all) runs the built-in hover-and-spin demo.
use std::f64::consts::PI;
use std::io::Write;
use std::path::Path;

use anyhow::{ensure, Context};
use nalgebra::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use tracing::info;

use se3sim_physics::{
    compose_input, compose_state, Agent, AgentConfig, ControllerConfig, LowLevelController, PassThroughController,
    PhysicalConfig, PrintType, ReferenceTrajectory, RigidBodyDynamics, StateVector, TerminalContext,
    TrackingController, STANDARD_GRAVITY,
};
use se3sim_utils::expm_so3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    #[default]
    PassThrough,
    Tracking,
}

/// One constant-input stretch of the scenario.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    pub duration: f64,
    pub force: [f64; 3],
    pub moment: [f64; 3],
    /// position the tracking controller steers towards; ignored by pass-through.
    pub target_position: Option<[f64; 3]>,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            force: [0.0; 3],
            moment: [0.0; 3],
            target_position: None,
        }
    }
}

/// Everything needed to build and run one agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub agent: AgentConfig,
    pub physical: PhysicalConfig,
    pub controller: ControllerConfig,
    pub controller_kind: ControllerKind,
    /// state component to print; all of position when unset.
    pub print_component: Option<usize>,
    pub print_interval: usize,
    /// largest initial tilt about each axis, radians.
    pub attitude_jitter: f64,
    pub seed: u64,
    pub segments: Vec<SegmentConfig>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            physical: PhysicalConfig::default(),
            controller: ControllerConfig::default(),
            controller_kind: ControllerKind::default(),
            print_component: None,
            print_interval: 10,
            attitude_jitter: 0.0,
            seed: 0,
            segments: vec![
                // climb while spinning up about the body z axis
                SegmentConfig {
                    duration: 2.0,
                    force: [0.0, 0.0, STANDARD_GRAVITY + 1.0],
                    moment: [0.0, 0.0, 0.2],
                    target_position: None,
                },
                // hover and let the spin carry on
                SegmentConfig {
                    duration: 3.0,
                    force: [0.0, 0.0, STANDARD_GRAVITY],
                    moment: [0.0; 3],
                    target_position: None,
                },
            ],
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn print_type(&self) -> PrintType {
        self.print_component.map_or(PrintType::GraphAll, PrintType::GraphSingle)
    }

    pub fn build_agent(&self) -> anyhow::Result<Agent<RigidBodyDynamics>> {
        //! agent at the default state, tilted by up to `attitude_jitter` about each axis.
        let dynamics = RigidBodyDynamics::from_config(&self.physical)?;
        let controller: Box<dyn LowLevelController> = match self.controller_kind {
            ControllerKind::PassThrough => Box::new(PassThroughController::new(self.controller)),
            ControllerKind::Tracking => Box::new(TrackingController::new(self.controller)),
        };
        let mut agent = Agent::new(dynamics, controller, self.agent.clone())?;

        let j = self.attitude_jitter;
        ensure!((0.0..=PI).contains(&j), "attitude_jitter must be between 0 and pi radians, got {j}");
        if j > 0.0 {
            let mut rng = StdRng::seed_from_u64(self.seed);
            let tilt = Vector3::new(rng.gen_range(-j..=j), rng.gen_range(-j..=j), rng.gen_range(-j..=j));
            agent.reset(self.agent.default_state, Some(expm_so3(&tilt)))?;
        }
        Ok(agent)
    }

    fn reference(&self, segment: &SegmentConfig) -> anyhow::Result<ReferenceTrajectory> {
        let input = compose_input(&Vector3::from(segment.force), &Vector3::from(segment.moment));
        let reference = ReferenceTrajectory::hold(input, segment.duration)?;
        let Some(target) = segment.target_position else {
            return Ok(reference);
        };
        let desired: StateVector = compose_state(&Vector3::from(target), &Vector3::zeros(), &Vector3::zeros());
        let samples = reference.times().len();
        Ok(reference.with_desired_states(vec![desired; samples])?)
    }

    pub fn run<W: Write>(&self, out: W) -> anyhow::Result<W> {
        //! simulates every segment in order, printing after each one. Returns the writer.
        let mut agent = self.build_agent()?;
        let mut context = TerminalContext::new(out, self.print_type(), self.print_interval);
        agent.plot(&mut context);

        for (index, segment) in self.segments.iter().enumerate() {
            let reference = self.reference(segment)?;
            agent
                .advance(segment.duration, &reference)
                .with_context(|| format!("segment {index}"))?;
            agent.plot(&mut context);
            info!(segment = index, t = agent.current_time(), "segment done");
        }
        Ok(context.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use se3sim_physics::position;

    #[test]
    fn empty_file_is_the_default_scenario() {
        assert_eq!(Scenario::parse("").unwrap(), Scenario::default());
    }

    #[test]
    fn parses_segments_and_overrides() {
        let scenario = Scenario::parse(
            r#"
            controller_kind = "tracking"
            print_component = 2
            print_interval = 5

            [agent]
            time_discretization = 0.1

            [physical]
            gravity_enabled = false

            [[segments]]
            duration = 4.0
            target_position = [1.0, 0.0, 0.0]
            "#,
        )
        .unwrap();

        assert_eq!(scenario.controller_kind, ControllerKind::Tracking);
        assert_eq!(scenario.print_type(), PrintType::GraphSingle(2));
        assert_eq!(scenario.agent.time_discretization, 0.1);
        assert!(!scenario.physical.gravity_enabled);
        assert_eq!(scenario.physical.mass, 1.0);
        assert_eq!(scenario.segments.len(), 1);
        assert_eq!(scenario.segments[0].moment, [0.0; 3]);
    }

    #[test]
    fn default_run_prints_every_tenth_sample() {
        let out = Scenario::default().run(Vec::new()).unwrap();
        let text = String::from_utf8(out).unwrap();
        // 5 s at 0.05 s is 101 samples: 0, 10, ..., 100
        assert_eq!(text.lines().filter(|l| l.starts_with("TRJ")).count(), 11);
        assert!(text.lines().any(|l| l.starts_with("FRM")));
    }

    #[test]
    fn tracking_scenario_reaches_target() {
        let scenario = Scenario {
            physical: PhysicalConfig::zero_gravity(),
            controller_kind: ControllerKind::Tracking,
            segments: vec![SegmentConfig {
                duration: 12.0,
                target_position: Some([0.0, 2.0, 0.0]),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut agent = scenario.build_agent().unwrap();
        let reference = scenario.reference(&scenario.segments[0]).unwrap();
        agent.advance(12.0, &reference).unwrap();
        let p = position(agent.state().last().unwrap());
        assert_relative_eq!(p, Vector3::new(0.0, 2.0, 0.0), epsilon = 1e-2);
    }

    #[test]
    fn out_of_range_jitter_is_an_error() {
        for text in ["attitude_jitter = 1e308", "attitude_jitter = inf", "attitude_jitter = nan", "attitude_jitter = -0.1"] {
            let scenario = Scenario::parse(text).unwrap();
            assert!(scenario.build_agent().is_err(), "{text}");
        }
        assert!(Scenario::parse("attitude_jitter = 3.0").unwrap().build_agent().is_ok());
    }

    #[test]
    fn jitter_is_seeded() {
        let scenario = Scenario {
            attitude_jitter: 0.3,
            seed: 11,
            ..Default::default()
        };
        let a = scenario.build_agent().unwrap();
        let b = scenario.build_agent().unwrap();
        assert_eq!(a.attitude(), b.attitude());
        assert_ne!(a.attitude()[0], nalgebra::Matrix3::identity());
    }
}
