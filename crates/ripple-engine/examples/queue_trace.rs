//! Line-trace a source feeding a sink through a one-entry queue.
//!
//! Demonstrates:
//!   1. Building a net model and registering guarded method actions
//!   2. Ordering enq, deq, and peek with queue-policy constraints
//!   3. Ticking the simulator and printing per-tick line traces
//!
//! Run with:
//!   cargo run --example queue_trace -- [pipe|bypass|normal]

use ripple_core::{ActionId, NetId};
use ripple_engine::{SimConfig, Simulator};
use ripple_sched::{Action, TieBreak};
use ripple_test_utils::{
    flat_model, Queue, QueuePeek, QueuePolicy, QueuePulse, TestSink, TestSource,
};

fn main() {
    let policy = match std::env::args().nth(1).as_deref() {
        Some("bypass") => QueuePolicy::Bypass,
        Some("normal") => QueuePolicy::Normal,
        _ => QueuePolicy::Pipe,
    };

    let queue = Queue::new(policy, 1);
    let source = TestSource::new("src", &queue, NetId(0), [0xa, 0xb, 0xc, 0xd]);
    let sink = TestSink::new("sink", &queue, NetId(1));
    let pulse = QueuePulse::new("q.pulse", &queue);
    let peek = QueuePeek::new("q.peek", &queue, NetId(2));

    let mut config = SimConfig::new(flat_model(3, 8));
    config.tie_break = TieBreak::DeclarationOrder;
    config.footprints.insert(ActionId(0), source.footprint());
    config.footprints.insert(ActionId(1), sink.footprint());
    config.footprints.insert(ActionId(2), pulse.footprint());
    config.footprints.insert(ActionId(3), peek.footprint());
    let actions: Vec<Box<dyn Action>> = vec![
        Box::new(source),
        Box::new(sink),
        Box::new(pulse),
        Box::new(peek),
    ];
    config.actions = actions;
    config.constraints = queue.constraints(ActionId(0), ActionId(1), Some(ActionId(2)));
    config
        .constraints
        .extend(queue.peek_constraints(ActionId(3), ActionId(0), ActionId(1)));

    let mut sim = match Simulator::build(config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("cannot build simulator: {e}");
            std::process::exit(1);
        }
    };

    println!("policy: {policy:?}");
    if let Some(schedule) = sim.current_schedule() {
        println!("schedule: {}", schedule.names().join(" -> "));
    }
    for _ in 0..10 {
        match sim.tick() {
            Ok(outcome) => println!(
                "{:>3}: {}  [{}]",
                outcome.tick_id.0,
                sim.line_trace(),
                sim.action_trace()
            ),
            Err(e) => {
                eprintln!("tick failed: {e}");
                std::process::exit(1);
            }
        }
    }
}
