//! Simulator behavior over multi-action designs built from fixtures.

use ripple_core::{ActionError, ActionId, NetId, TickId};
use ripple_engine::{ConfigError, SimConfig, SimState, Simulator, TickError};
use ripple_sched::{Action, Footprint, ScheduleError, TieBreak};
use ripple_test_utils::{flat_model, Adder, ConstDriver, Counter, FailingAction, Register};

fn push(cfg: &mut SimConfig, action: impl Action, footprint: Footprint) -> ActionId {
    let id = ActionId(cfg.actions.len() as u32);
    cfg.actions.push(Box::new(action));
    cfg.footprints.insert(id, footprint);
    id
}

/// `n0 = 5; n1 <<= n0; n2 <<= n1; n3 = n2 + n0`, declared adder first.
fn pipeline() -> SimConfig {
    let mut cfg = SimConfig::new(flat_model(4, 8));
    let add = Adder::new("add", NetId(2), NetId(0), NetId(3));
    let fp = add.footprint();
    push(&mut cfg, add, fp);
    let r2 = Register::new("r2", NetId(1), NetId(2));
    let fp = r2.footprint();
    push(&mut cfg, r2, fp);
    let r1 = Register::new("r1", NetId(0), NetId(1));
    let fp = r1.footprint();
    push(&mut cfg, r1, fp);
    let c = ConstDriver::new("five", NetId(0), 5);
    let fp = c.footprint();
    push(&mut cfg, c, fp);
    cfg
}

#[test]
fn registers_delay_by_one_tick_each() {
    let mut sim = Simulator::build(pipeline()).unwrap();
    let order = sim.current_schedule().unwrap().names();
    // The driver must precede its combinational reader; registers are free.
    let pos = |name: &str| order.iter().position(|n| *n == name).unwrap();
    assert!(pos("five") < pos("add"));

    assert!(pos("five") < pos("r1"));

    // r1 samples the driver's value in the tick it is first driven.
    sim.tick().unwrap();
    assert_eq!(sim.store().values(), &[5, 5, 0, 5]);
    sim.tick().unwrap();
    assert_eq!(sim.store().values(), &[5, 5, 5, 5]);
    sim.tick().unwrap();
    assert_eq!(sim.store().values(), &[5, 5, 5, 10]);
    sim.tick().unwrap();
    assert_eq!(sim.store().values(), &[5, 5, 5, 10]);
    assert_eq!(sim.line_trace(), "n0=0x5 n1=0x5 n2=0x5 n3=0xa");
    assert_eq!(sim.current_tick(), TickId(4));
}

#[test]
fn register_samples_same_tick_combinational_value() {
    // Declared register-first so only the read-after-write edge can put
    // the driver ahead of it.
    for tie_break in [TieBreak::DeclarationOrder, TieBreak::Seeded(1), TieBreak::Seeded(99)] {
        let mut cfg = SimConfig::new(flat_model(2, 8));
        cfg.tie_break = tie_break;
        let r = Register::new("r", NetId(0), NetId(1));
        let fp = r.footprint();
        push(&mut cfg, r, fp);
        let c = ConstDriver::new("five", NetId(0), 5);
        let fp = c.footprint();
        push(&mut cfg, c, fp);

        let mut sim = Simulator::build(cfg).unwrap();
        assert_eq!(sim.current_schedule().unwrap().names(), vec!["five", "r"]);
        sim.tick().unwrap();
        assert_eq!(sim.read(NetId(1)), Some(5), "tie break {tie_break:?}");
    }
}

#[test]
fn two_combinational_drivers_are_rejected() {
    let mut cfg = SimConfig::new(flat_model(1, 8));
    let a = ConstDriver::new("a", NetId(0), 1);
    let fp = a.footprint();
    push(&mut cfg, a, fp.clone());
    push(&mut cfg, ConstDriver::new("b", NetId(0), 2), fp);

    let err = Simulator::build(cfg).unwrap_err();
    match err {
        ConfigError::Schedule(ScheduleError::DriverConflict { net, writers, .. }) => {
            assert_eq!(net, NetId(0));
            assert_eq!(writers, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected driver conflict, got {other:?}"),
    }
}

#[test]
fn failed_tick_rolls_back_everything() {
    let mut cfg = SimConfig::new(flat_model(3, 8));
    push(&mut cfg, ConstDriver::new("seven", NetId(0), 7), Footprint::new([], [NetId(0)]));
    let flaky = FailingAction::new("flaky", NetId(1), 2);
    let calls = flaky.counter();
    let fp = flaky.footprint();
    push(&mut cfg, flaky, fp);
    let count = Counter::new("count", NetId(2));
    let fp = count.footprint();
    push(&mut cfg, count, fp);

    let mut sim = Simulator::build(cfg).unwrap();
    sim.run(2).unwrap();
    assert_eq!(sim.store().values(), &[7, 2, 2]);

    let err = sim.tick().unwrap_err();
    assert_eq!(
        err,
        TickError::ActionFailed {
            action: "flaky".into(),
            tick: TickId(3),
            source: ActionError::ExecutionFailed {
                reason: "deliberate failure after 2 successful calls".into(),
            },
        }
    );
    assert_eq!(sim.store().values(), &[7, 2, 2]);
    assert_eq!(sim.current_tick(), TickId(2));
    assert_eq!(sim.state(), SimState::Ticking);
    assert_eq!(sim.counters().failed_ticks, 1);
    assert_eq!(calls.load(std::sync::atomic::Ordering::Relaxed), 3);
}

#[test]
fn consecutive_failures_disable_ticking() {
    let mut cfg = SimConfig::new(flat_model(1, 8));
    let flaky = FailingAction::new("flaky", NetId(0), 0);
    let fp = flaky.footprint();
    push(&mut cfg, flaky, fp);
    cfg.max_consecutive_failures = Some(2);

    let mut sim = Simulator::build(cfg).unwrap();
    assert!(matches!(sim.tick(), Err(TickError::ActionFailed { .. })));
    assert!(!sim.is_tick_disabled());
    assert!(matches!(sim.tick(), Err(TickError::ActionFailed { .. })));
    assert!(sim.is_tick_disabled());
    assert_eq!(sim.tick(), Err(TickError::TickDisabled { failures: 2 }));

    sim.reset();
    assert!(!sim.is_tick_disabled());
    assert_eq!(sim.consecutive_failures(), 0);
}

#[test]
fn poked_values_are_masked_and_registered() {
    let mut cfg = SimConfig::new(flat_model(2, 8));
    let r = Register::new("r", NetId(0), NetId(1));
    let fp = r.footprint();
    push(&mut cfg, r, fp);
    let mut sim = Simulator::build(cfg).unwrap();

    assert!(sim.poke(NetId(0), 0x1ff));
    assert!(!sim.poke(NetId(9), 1));
    assert_eq!(sim.read(NetId(0)), Some(0xff));
    sim.tick().unwrap();
    assert_eq!(sim.read(NetId(1)), Some(0xff));
}

#[test]
fn registers_swap_without_ordering() {
    // a <<= b and b <<= a must swap regardless of execution order.
    let mut cfg = SimConfig::new(flat_model(2, 8));
    cfg.initial_values = vec![(NetId(0), 1), (NetId(1), 2)];
    let ra = Register::new("ra", NetId(1), NetId(0));
    let fp = ra.footprint();
    push(&mut cfg, ra, fp);
    let rb = Register::new("rb", NetId(0), NetId(1));
    let fp = rb.footprint();
    push(&mut cfg, rb, fp);

    let mut sim = Simulator::build(cfg).unwrap();
    assert!(sim.current_schedule().unwrap().edges().is_empty());
    sim.tick().unwrap();
    assert_eq!(sim.store().values(), &[2, 1]);
    sim.tick().unwrap();
    assert_eq!(sim.store().values(), &[1, 2]);
}

#[test]
fn schedule_is_cached_across_identical_requests() {
    let mut sim = Simulator::build(pipeline()).unwrap();
    sim.run(3).unwrap();
    sim.schedule().unwrap();
    sim.schedule().unwrap();
    let stats = sim.scheduler_stats();
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.cache_hits, 2);
    assert_eq!(sim.counters().schedules, 3);
    // A cache hit keeps the simulator ticking.
    assert_eq!(sim.state(), SimState::Ticking);
}
