//! A single boid and its per-tick update rule.

use std::f64::consts::{PI, TAU};

use boids_config::SimulationConfig;
use boids_core::AgentId;
use glam::DVec2;

/// A boid: a point with a heading (radians) and a constant speed.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: DVec2,
    pub heading: f64,
    pub speed: f64,
    pub radius: f64,
}

impl Agent {
    pub fn new(x: f64, y: f64, heading: f64, speed: f64, radius: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            heading,
            speed,
            radius,
        }
    }

    /// Advances this agent by one tick.
    ///
    /// `candidates` is the raw output of the spatial index together with the
    /// tick-start state of each candidate; it may contain this agent itself and
    /// agents well outside the neighbourhood. `jitter` is the heading noise for
    /// this tick, in radians.
    pub fn update<'a, I>(&mut self, id: AgentId, candidates: I, jitter: f64, rules: &UpdateRules)
    where
        I: IntoIterator<Item = (AgentId, &'a Agent)>,
    {
        self.heading += jitter;

        // Alignment: turn part of the way towards each close neighbour's heading.
        let reach_sq = rules.neighbor_distance * rules.neighbor_distance;
        for (other_id, other) in candidates {
            if other_id == id || self.position.distance_squared(other.position) >= reach_sq {
                continue;
            }
            self.heading += rules.alignment_factor * shortest_turn(self.heading, other.heading);
        }
        self.heading = wrap(self.heading, TAU);

        self.position += DVec2::new(self.heading.cos(), self.heading.sin()) * self.speed;
        self.position = DVec2::new(
            wrap(self.position.x, rules.world_size.x),
            wrap(self.position.y, rules.world_size.y),
        );
    }
}

/// Flock-wide constants of the update rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateRules {
    pub neighbor_distance: f64,
    pub alignment_factor: f64,
    /// Wraparound extent; positions are kept in `[0, w) × [0, h)`.
    pub world_size: DVec2,
}

impl UpdateRules {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            neighbor_distance: config.flock.neighbor_distance,
            alignment_factor: config.flock.alignment_factor,
            world_size: DVec2::new(config.world.width, config.world.height),
        }
    }
}

/// Signed angle in `(-π, π]` that turns `from` onto `to` the short way round.
#[inline]
pub fn shortest_turn(from: f64, to: f64) -> f64 {
    let turn = wrap(to - from, TAU);
    if turn > PI {
        turn - TAU
    } else {
        turn
    }
}

/// Maps `value` into `[0, extent)`.
#[inline]
pub fn wrap(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid rounds tiny negative inputs up to `extent` itself
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn rules() -> UpdateRules {
        UpdateRules {
            neighbor_distance: 10.0,
            alignment_factor: 0.5,
            world_size: DVec2::new(100.0, 100.0),
        }
    }

    #[test]
    fn lone_agent_moves_along_heading() {
        let mut agent = Agent::new(10.0, 10.0, FRAC_PI_2, 2.0, 1.0);
        agent.update(AgentId(0), std::iter::empty(), 0.0, &rules());
        assert!((agent.position.x - 10.0).abs() < EPS);
        assert!((agent.position.y - 12.0).abs() < EPS);
        assert!((agent.heading - FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn jitter_is_added_to_heading() {
        let mut agent = Agent::new(10.0, 10.0, 1.0, 0.0, 1.0);
        agent.update(AgentId(0), std::iter::empty(), 0.25, &rules());
        assert!((agent.heading - 1.25).abs() < EPS);
    }

    #[test]
    fn close_neighbour_pulls_heading_halfway() {
        let mut a = Agent::new(50.0, 50.0, 0.0, 1.0, 1.0);
        let b = Agent::new(50.0, 55.0, FRAC_PI_2, 1.0, 1.0);
        a.update(AgentId(0), [(AgentId(1), &b)], 0.0, &rules());
        assert!((a.heading - FRAC_PI_2 / 2.0).abs() < EPS);
    }

    #[test]
    fn distant_and_self_candidates_are_ignored() {
        let start = Agent::new(10.0, 10.0, 0.0, 1.0, 1.0);
        let far = Agent::new(90.0, 90.0, 3.0, 1.0, 1.0);
        let edge = Agent::new(20.0, 10.0, 3.0, 1.0, 1.0); // exactly at the threshold
        let mut a = start.clone();
        a.update(
            AgentId(0),
            [(AgentId(0), &start), (AgentId(1), &far), (AgentId(2), &edge)],
            0.0,
            &rules(),
        );
        assert_eq!(a.heading, 0.0);
    }

    #[test]
    fn alignment_turns_the_short_way() {
        let mut a = Agent::new(50.0, 50.0, 0.1, 0.0, 1.0);
        let b = Agent::new(51.0, 50.0, TAU - 0.1, 0.0, 1.0);
        a.update(AgentId(0), [(AgentId(1), &b)], 0.0, &rules());
        assert!(a.heading.abs() < EPS || (a.heading - TAU).abs() < EPS);
    }

    #[test]
    fn neighbours_apply_in_candidate_order() {
        let mut a = Agent::new(50.0, 50.0, 0.0, 0.0, 1.0);
        let b = Agent::new(52.0, 50.0, 1.0, 0.0, 1.0);
        let c = Agent::new(48.0, 50.0, 1.0, 0.0, 1.0);
        a.update(AgentId(0), [(AgentId(1), &b), (AgentId(2), &c)], 0.0, &rules());
        // 0 -> 0.5 -> 0.75
        assert!((a.heading - 0.75).abs() < EPS);
    }

    #[test]
    fn position_wraps_toroidally() {
        let mut a = Agent::new(99.5, 50.0, 0.0, 1.0, 1.0);
        a.update(AgentId(0), std::iter::empty(), 0.0, &rules());
        assert!((a.position.x - 0.5).abs() < EPS);

        let mut b = Agent::new(50.0, 0.25, -FRAC_PI_2, 1.0, 1.0);
        b.update(AgentId(0), std::iter::empty(), 0.0, &rules());
        assert!((b.position.y - 99.25).abs() < EPS);
        assert!((b.heading - 3.0 * FRAC_PI_2).abs() < EPS, "heading is only normalised");
    }

    #[test]
    fn wrap_stays_half_open() {
        assert_eq!(wrap(100.0, 100.0), 0.0);
        assert!((wrap(100.0 + 1e-6, 100.0) - 1e-6).abs() < 1e-9);
        assert_eq!(wrap(-1e-20, 100.0), 0.0);
        assert_eq!(wrap(-0.0, 100.0), 0.0);
        assert!((wrap(-30.0, 100.0) - 70.0).abs() < EPS);
    }

    #[test]
    fn shortest_turn_range() {
        assert!((shortest_turn(0.0, FRAC_PI_2) - FRAC_PI_2).abs() < EPS);
        assert!((shortest_turn(FRAC_PI_2, 0.0) + FRAC_PI_2).abs() < EPS);
        assert!((shortest_turn(0.0, PI) - PI).abs() < EPS);
        assert!((shortest_turn(0.1, TAU - 0.1) + 0.2).abs() < EPS);
    }
}
