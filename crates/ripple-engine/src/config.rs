//! Simulator configuration, validation, and error types.
//!
//! [`SimConfig`] is the input for constructing a [`Simulator`](crate::Simulator).
//! [`validate()`](SimConfig::validate) checks structural invariants and
//! performs a dry-run schedule build; the simulator itself schedules
//! lazily so the `Failed` state stays observable.

use ripple_core::{mask_to_width, ElaborationError, NetId, NetModel, NetModelBuilder, Value};
use ripple_sched::{
    build_schedule, Action, ActionDecl, FootprintTable, RawConstraint, ScheduleError, TieBreak,
};
use thiserror::Error;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a [`SimConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Building the net model failed.
    #[error("elaboration: {0}")]
    Elaboration(#[from] ElaborationError),
    /// The design cannot be scheduled.
    #[error("schedule: {0}")]
    Schedule(#[from] ScheduleError),
    /// An initial value targets a net outside the model.
    #[error("initial value for unknown net {net}")]
    UnknownNet {
        /// The unknown net.
        net: NetId,
    },
    /// An initial value does not fit its net.
    #[error("initial value {value:#x} does not fit {width}-bit net {net}")]
    ValueTooWide {
        /// Target net.
        net: NetId,
        /// The rejected value.
        value: Value,
        /// The net's width.
        width: u32,
    },
    /// `max_consecutive_failures` is `Some(0)`, which would disable ticking
    /// before the first tick.
    #[error("max_consecutive_failures must be at least 1")]
    InvalidFailureLimit,
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Complete configuration for constructing a simulator.
///
/// `ActionId(n)` refers to `actions[n]`; `footprints` must hold an entry
/// for every action.
pub struct SimConfig {
    /// Elaborated nets.
    pub nets: NetModel,
    /// Update actions in declaration order.
    pub actions: Vec<Box<dyn Action>>,
    /// Read/write footprints keyed by action id.
    pub footprints: FootprintTable,
    /// Explicit ordering declarations.
    pub constraints: Vec<RawConstraint>,
    /// Net values at tick 0. Unlisted nets start at zero.
    pub initial_values: Vec<(NetId, Value)>,
    /// Ordering policy among unconstrained actions. Default: declaration order.
    pub tie_break: TieBreak,
    /// Disable ticking after this many consecutive failed ticks.
    /// Default: `None` (never disable).
    pub max_consecutive_failures: Option<u32>,
}

impl SimConfig {
    /// An empty configuration over `nets`.
    pub fn new(nets: NetModel) -> Self {
        Self {
            nets,
            actions: Vec::new(),
            footprints: FootprintTable::new(),
            constraints: Vec::new(),
            initial_values: Vec::new(),
            tie_break: TieBreak::default(),
            max_consecutive_failures: None,
        }
    }

    /// Elaborate `builder` and start an empty configuration over the result.
    pub fn from_builder(builder: NetModelBuilder) -> Result<Self, ConfigError> {
        Ok(Self::new(builder.build()?))
    }

    /// Validate every invariant, including schedulability.
    ///
    /// This is a pure validation pass; the schedule is discarded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_values()?;
        let _ = build_schedule(
            &self.decls(),
            &self.constraints,
            &self.footprints,
            &self.nets,
            self.tie_break,
        )?;
        Ok(())
    }

    /// Checks that do not require scheduling.
    pub(crate) fn validate_values(&self) -> Result<(), ConfigError> {
        // 1. Initial values must target known nets and fit them.
        for &(net, value) in &self.initial_values {
            let width = self
                .nets
                .net(net)
                .map(|n| n.width)
                .ok_or(ConfigError::UnknownNet { net })?;
            if mask_to_width(value, width) != value {
                return Err(ConfigError::ValueTooWide { net, value, width });
            }
        }
        // 2. A zero failure limit would forbid ticking outright.
        if self.max_consecutive_failures == Some(0) {
            return Err(ConfigError::InvalidFailureLimit);
        }
        Ok(())
    }

    pub(crate) fn decls(&self) -> Vec<ActionDecl> {
        self.actions
            .iter()
            .map(|a| ActionDecl::new(a.name(), a.kind()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::{ActionError, ActionId};
    use ripple_sched::{ActionContext, ActionKind, Footprint};

    struct Drive(NetId);

    impl Action for Drive {
        fn name(&self) -> &str {
            "drive"
        }
        fn kind(&self) -> ActionKind {
            ActionKind::Combinational
        }
        fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
            ctx.write(self.0, 1)
        }
    }

    fn config() -> SimConfig {
        let mut b = NetModelBuilder::new();
        b.add_signal("nibble", 4);
        let mut cfg = SimConfig::new(b.build().unwrap());
        cfg.actions.push(Box::new(Drive(NetId(0))));
        cfg.footprints
            .insert(ActionId(0), Footprint::new([], [NetId(0)]));
        cfg
    }

    #[test]
    fn valid_config_passes() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn initial_value_checks() {
        let mut cfg = config();
        cfg.initial_values.push((NetId(3), 0));
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::UnknownNet { net: NetId(3) })
        );

        let mut cfg = config();
        cfg.initial_values.push((NetId(0), 0x10));
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ValueTooWide {
                net: NetId(0),
                value: 0x10,
                width: 4,
            })
        );
    }

    #[test]
    fn elaboration_errors_surface() {
        let mut b = NetModelBuilder::new();
        b.add_signal("wide", 65);
        let err = SimConfig::from_builder(b).err();
        assert_eq!(
            err,
            Some(ConfigError::Elaboration(ElaborationError::InvalidWidth {
                signal: "wide".into(),
                width: 65,
            }))
        );

        let mut b = NetModelBuilder::new();
        b.add_signal("ok", 8);
        let cfg = SimConfig::from_builder(b).unwrap();
        assert_eq!(cfg.nets.net_count(), 1);
        assert!(cfg.actions.is_empty());
    }

    #[test]
    fn zero_failure_limit_rejected() {
        let mut cfg = config();
        cfg.max_consecutive_failures = Some(0);
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidFailureLimit));
    }

    #[test]
    fn schedule_errors_surface() {
        let mut cfg = config();
        cfg.actions.push(Box::new(Drive(NetId(0))));
        cfg.footprints
            .insert(ActionId(1), Footprint::new([], [NetId(0)]));
        // Same name twice.
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Schedule(ScheduleError::DuplicateAction { .. }))
        ));
    }

    #[test]
    fn errors_chain_to_source() {
        use std::error::Error;
        let e = ConfigError::from(ScheduleError::MissingFootprint {
            action: "x".into(),
        });
        assert!(e.source().is_some());
        assert_eq!(e.to_string(), "schedule: no footprint for action 'x'");
    }
}
