//! Contact network: exploration events civilizations emit once they can
//! travel, processed in external-time order.
//!
//! The causality rule is firm: arrival order in the external frame is
//! launch time plus distance over c·β, no matter whose shipboard clock
//! reads less. The queue is keyed by (event time, sequence number) so
//! simultaneous events process in schedule order, deterministically.

use farlight_logic::relativity;
use farlight_logic::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// External-frame arrival time for a traveler leaving at `launch_year`
/// covering `distance_ly` at constant `beta`.
pub fn arrival_time(launch_year: f64, distance_ly: f64, beta: f64) -> f64 {
    launch_year + distance_ly / beta.max(1e-9)
}

/// Proper time elapsed aboard for the same transit: (d/β)/γ.
pub fn proper_transit_time(distance_ly: f64, beta: f64) -> f64 {
    let transit = distance_ly / beta.max(1e-9);
    transit * relativity::sr_time_factor(&Vec3::new(0.0, 0.0, beta))
}

/// A scheduled external-time event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub time_years: f64,
    pub seq: u64,
    pub kind: ContactEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactEventKind {
    /// A civilization launches a probe; processing schedules the arrival.
    ProbeLaunch {
        from_planet: u32,
        to_star: u32,
        beta: f64,
    },
    /// The probe reaches its target; a contact edge is established.
    ProbeArrival {
        from_planet: u32,
        at_star: u32,
        launch_year: f64,
    },
}

/// An established contact edge between a civilization and a star system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactEdge {
    pub from_planet: u32,
    pub to_star: u32,
    pub established_year: f64,
}

/// Priority queue of contact events plus the established edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactNetwork {
    /// Pending events, sorted ascending by (time, seq).
    events: Vec<ContactEvent>,
    pub edges: Vec<ContactEdge>,
    next_seq: u64,
}

impl ContactNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event at an external time. Keeps the queue sorted.
    pub fn schedule(&mut self, time_years: f64, kind: ContactEventKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let event = ContactEvent {
            time_years,
            seq,
            kind,
        };
        let at = self
            .events
            .binary_search_by(|probe| {
                probe
                    .time_years
                    .total_cmp(&event.time_years)
                    .then(probe.seq.cmp(&event.seq))
            })
            .unwrap_or_else(|e| e);
        self.events.insert(at, event);
        seq
    }

    /// Remove and return every event due at or before `now`, in order.
    pub fn pop_due(&mut self, now_years: f64) -> Vec<ContactEvent> {
        let split = self.events.partition_point(|e| e.time_years <= now_years);
        self.events.drain(..split).collect()
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn record_edge(&mut self, from_planet: u32, to_star: u32, year: f64) {
        self.edges.push(ContactEdge {
            from_planet,
            to_star,
            established_year: year,
        });
    }

    /// Peek at the next pending event without removing it.
    pub fn peek(&self) -> Option<&ContactEvent> {
        self.events.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_arrival_order_ignores_proper_time() {
        // You: launch year 0 at β=0.999 toward a target 400 ly out.
        // Them: launch year 100 at β=0.99 toward the same target.
        let yours = arrival_time(0.0, 400.0, 0.999);
        let theirs = arrival_time(100.0, 400.0, 0.99);
        assert!((yours - 400.4).abs() < 0.01);
        assert!((theirs - 504.04).abs() < 0.01);
        assert!(yours < theirs, "earlier launch + faster ⇒ first in external frame");

        // Their shipboard clock still reads more than yours.
        let your_tau = proper_transit_time(400.0, 0.999);
        let their_tau = proper_transit_time(400.0, 0.99);
        assert!((your_tau - 17.9).abs() < 0.1, "got {}", your_tau);
        assert!((their_tau - 57.0).abs() < 0.1, "got {}", their_tau);
        assert!(your_tau < their_tau);
    }

    #[test]
    fn queue_pops_in_time_order() {
        let mut net = ContactNetwork::new();
        net.schedule(
            30.0,
            ContactEventKind::ProbeArrival {
                from_planet: 1,
                at_star: 2,
                launch_year: 0.0,
            },
        );
        net.schedule(
            10.0,
            ContactEventKind::ProbeLaunch {
                from_planet: 1,
                to_star: 2,
                beta: 0.5,
            },
        );
        net.schedule(
            20.0,
            ContactEventKind::ProbeLaunch {
                from_planet: 3,
                to_star: 4,
                beta: 0.5,
            },
        );

        let due = net.pop_due(25.0);
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].time_years, 10.0);
        assert_eq!(due[1].time_years, 20.0);
        assert_eq!(net.pending(), 1);
    }

    #[test]
    fn simultaneous_events_keep_schedule_order() {
        let mut net = ContactNetwork::new();
        let a = net.schedule(
            5.0,
            ContactEventKind::ProbeLaunch {
                from_planet: 1,
                to_star: 2,
                beta: 0.5,
            },
        );
        let b = net.schedule(
            5.0,
            ContactEventKind::ProbeLaunch {
                from_planet: 9,
                to_star: 8,
                beta: 0.5,
            },
        );
        assert!(a < b);
        let due = net.pop_due(5.0);
        assert_eq!(due[0].seq, a);
        assert_eq!(due[1].seq, b);
    }

    #[test]
    fn pop_due_ignores_future() {
        let mut net = ContactNetwork::new();
        net.schedule(
            100.0,
            ContactEventKind::ProbeLaunch {
                from_planet: 1,
                to_star: 2,
                beta: 0.9,
            },
        );
        assert!(net.pop_due(99.999).is_empty());
        assert_eq!(net.pending(), 1);
        assert_eq!(net.pop_due(100.0).len(), 1);
    }
}
