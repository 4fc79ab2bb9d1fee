//! Discrete-event simulation of two Go-Back-N endpoints
//!
//! The simulator plays every external collaborator an endpoint needs: the
//! application layer on both sides, the network between them and the
//! per-entity retransmission timers. Events are processed strictly in
//! (time, insertion) order and each one runs an endpoint entry point to
//! completion before the next is popped.

use crate::clock::{SimTime, TimerSlot};
use crate::config::{SimConfig, SimError};
use crate::entity::Entity;
use crate::link::{Link, LinkStats};
use crate::workload;
use bytes::Bytes;
use gbn_protocol::{Endpoint, EndpointStats, FrameKind, Host};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

#[derive(Debug)]
enum EventKind {
    FromApplication { payload: String },
    FromNetwork { frame: Bytes },
    TimerExpired { generation: u64 },
}

#[derive(Debug)]
struct Event {
    time: SimTime,
    order: u64,
    entity: Entity,
    kind: EventKind,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.time, self.order).cmp(&(other.time, other.order))
    }
}

/// Min-heap of pending events
#[derive(Debug, Default)]
struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_order: u64,
}

impl EventQueue {
    fn push(&mut self, time: SimTime, entity: Entity, kind: EventKind) {
        let order = self.next_order;
        self.next_order += 1;
        self.heap.push(Reverse(Event {
            time,
            order,
            entity,
            kind,
        }));
    }

    fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(event)| event.time)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Everything the simulator keeps for one entity
#[derive(Debug)]
struct Side {
    endpoint: Endpoint,
    /// Outbound link towards the peer
    link: Link,
    timer: TimerSlot,
    /// Payloads handed to this entity's endpoint by its application
    sent: Vec<String>,
    /// Payloads this entity's endpoint delivered upward
    delivered: Vec<String>,
}

/// The endpoint's view of the simulator while it handles one event
struct SimHost<'a> {
    entity: Entity,
    now: SimTime,
    queue: &'a mut EventQueue,
    link: &'a mut Link,
    timer: &'a mut TimerSlot,
    delivered: &'a mut Vec<String>,
    rng: &'a mut StdRng,
}

impl Host for SimHost<'_> {
    fn deliver(&mut self, payload: String) {
        trace!(entity = %self.entity, %payload, "delivered to application");
        self.delivered.push(payload);
    }

    fn transmit(&mut self, frame: Bytes, kind: FrameKind) {
        if let Some(arrival) = self.link.send(frame, kind, self.now, self.rng) {
            self.queue.push(
                arrival.at,
                self.entity.peer(),
                EventKind::FromNetwork {
                    frame: arrival.frame,
                },
            );
        }
    }

    fn start_timer(&mut self, interval: Duration) {
        if self.timer.is_armed() {
            warn!(entity = %self.entity, "start_timer on a running timer, replacing it");
        }
        let deadline = self.now + interval;
        let generation = self.timer.arm(deadline);
        self.queue
            .push(deadline, self.entity, EventKind::TimerExpired { generation });
    }

    fn stop_timer(&mut self) {
        if !self.timer.is_armed() {
            warn!(entity = %self.entity, "stop_timer on an idle timer");
        }
        self.timer.disarm();
    }
}

/// Final state of one entity after a run
#[derive(Debug, Clone)]
pub struct EntityReport {
    pub entity: Entity,
    /// Payloads this entity's application submitted, in order
    pub sent: Vec<String>,
    /// Payloads this entity delivered to its application, in order
    pub delivered: Vec<String>,
    pub stats: EndpointStats,
    /// Counters of this entity's outbound link
    pub link: LinkStats,
}

/// Outcome of a simulation run
#[derive(Debug, Clone)]
pub struct SimReport {
    /// Time of the last processed event
    pub finished_at: SimTime,
    /// The run hit its time limit with events still pending
    pub timed_out: bool,
    /// Events processed
    pub events: u64,
    pub entities: [EntityReport; 2],
}

impl SimReport {
    pub fn entity(&self, entity: Entity) -> &EntityReport {
        &self.entities[entity.index()]
    }

    /// Every payload sent by either side was delivered exactly once, in order,
    /// at the other side.
    pub fn is_complete(&self) -> bool {
        Entity::ALL
            .iter()
            .all(|&e| self.entity(e).sent == self.entity(e.peer()).delivered)
    }
}

/// A two-entity Go-Back-N simulation
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    now: SimTime,
    queue: EventQueue,
    rng: StdRng,
    sides: [Side; 2],
    events: u64,
}

impl Simulation {
    /// Build a simulation and schedule its configured workload
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let mut sim = Self::idle(config)?;
        let schedule = workload::generate(&sim.config.workload, &mut sim.rng);
        for (at, entity, payload) in schedule {
            sim.submit_at(at, entity, payload);
        }
        Ok(sim)
    }

    /// Build a simulation with no workload; traffic is added with [`submit_at`](Self::submit_at)
    pub fn idle(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;

        let side = |entity: Entity| -> Result<Side, SimError> {
            Ok(Side {
                endpoint: Endpoint::new(entity.to_string(), config.endpoint)?,
                link: Link::new(config.link),
                timer: TimerSlot::default(),
                sent: Vec::new(),
                delivered: Vec::new(),
            })
        };

        Ok(Simulation {
            rng: StdRng::seed_from_u64(config.seed),
            now: SimTime::ZERO,
            queue: EventQueue::default(),
            sides: [side(Entity::A)?, side(Entity::B)?],
            events: 0,
            config,
        })
    }

    /// Schedule `payload` to arrive from `entity`'s application layer at `at`
    pub fn submit_at(&mut self, at: SimTime, entity: Entity, payload: String) {
        self.queue
            .push(at, entity, EventKind::FromApplication { payload });
    }

    /// Process the next event. Returns `false` when no event is left within
    /// the time limit.
    pub fn step(&mut self) -> bool {
        let limit = SimTime::from_duration(self.config.time_limit());
        match self.queue.peek_time() {
            Some(time) if time <= limit => {}
            _ => return false,
        }
        let Some(event) = self.queue.pop() else {
            return false;
        };

        self.now = event.time;
        self.events += 1;

        let side = &mut self.sides[event.entity.index()];
        let mut host = SimHost {
            entity: event.entity,
            now: self.now,
            queue: &mut self.queue,
            link: &mut side.link,
            timer: &mut side.timer,
            delivered: &mut side.delivered,
            rng: &mut self.rng,
        };

        match event.kind {
            EventKind::FromApplication { payload } => {
                trace!(time = %self.now, entity = %event.entity, "payload from application");
                side.sent.push(payload.clone());
                if let Err(e) = side.endpoint.on_application_payload(payload, &mut host) {
                    warn!(entity = %event.entity, "payload rejected: {}", e);
                    side.sent.pop();
                }
            }
            EventKind::FromNetwork { frame } => {
                trace!(time = %self.now, entity = %event.entity, len = frame.len(), "frame from network");
                if let Err(e) = side.endpoint.on_network_frame(&frame, &mut host) {
                    debug!(time = %self.now, entity = %event.entity, "frame rejected: {}", e);
                }
            }
            EventKind::TimerExpired { generation } => {
                if host.timer.try_fire(generation) {
                    trace!(time = %self.now, entity = %event.entity, "timer expired");
                    side.endpoint.on_timer_fired(&mut host);
                }
            }
        }

        true
    }

    /// Run until no events remain or the time limit is reached
    pub fn run(mut self) -> SimReport {
        info!(
            seed = self.config.seed,
            window = self.config.endpoint.window_size,
            "simulation starting"
        );

        while self.step() {}

        let timed_out = !self.queue.is_empty();
        if timed_out {
            warn!(pending = self.queue.len(), "time limit reached with events pending");
        }

        let report = self.into_report(timed_out);
        info!(
            finished_at = %report.finished_at,
            events = report.events,
            complete = report.is_complete(),
            "simulation finished"
        );
        report
    }

    fn into_report(self, timed_out: bool) -> SimReport {
        let [a, b] = self.sides;
        let report = |entity: Entity, side: Side| EntityReport {
            entity,
            stats: side.endpoint.stats(),
            link: side.link.stats(),
            sent: side.sent,
            delivered: side.delivered,
        };

        SimReport {
            finished_at: self.now,
            timed_out,
            events: self.events,
            entities: [report(Entity::A, a), report(Entity::B, b)],
        }
    }

    /// Current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn endpoint(&self, entity: Entity) -> &Endpoint {
        &self.sides[entity.index()].endpoint
    }

    /// Payloads `entity` has delivered to its application so far
    pub fn delivered(&self, entity: Entity) -> &[String] {
        &self.sides[entity.index()].delivered
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
