//! Velocity-Verlet style force simulation over an index arena.
//!
//! Forces follow d3-force: `link`, `collide`, `charge` (many-body) and `center`,
//! applied in that order every tick, followed by velocity decay and integration.
//! Nodes with a pin (`fx`/`fy`) snap to it and lose their velocity.

use std::f64::consts::PI;

use super::build::{GraphModel, Link};
use super::types::GraphConfig;

const INITIAL_RADIUS: f64 = 10.0;

/// Per-node physics state. Index-aligned with [`GraphModel::nodes`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNode {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub fx: Option<f64>,
	pub fy: Option<f64>,
	pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParams {
	pub link_strength: f64,
	pub link_distance: f64,
	pub collide_strength: f64,
	pub collide_iterations: usize,
	pub charge_strength: f64,
	pub charge_distance_min: f64,
	pub charge_distance_max: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub velocity_decay: f64,
}

impl Default for SimulationParams {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_strength: 0.01,
			link_distance: 30.0,
			collide_strength: 0.5,
			collide_iterations: 1,
			charge_strength: -50.0,
			charge_distance_min: 1.0,
			charge_distance_max: 200.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
		}
	}
}

impl SimulationParams {
	pub fn from_config(config: &GraphConfig) -> Self {
		Self {
			link_strength: config.link_force,
			charge_strength: config.body_force,
			..Default::default()
		}
	}
}

/// Tiny xorshift64* generator used to break exact coincidences.
#[derive(Clone, Debug)]
struct Jiggle(u64);

impl Jiggle {
	fn next(&mut self) -> f64 {
		let mut x = self.0;
		x ^= x >> 12;
		x ^= x << 25;
		x ^= x >> 27;
		self.0 = x;
		let bits = x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11;
		((bits as f64) / ((1u64 << 53) as f64) - 0.5) * 1e-6
	}
}

pub struct Simulation {
	pub nodes: Vec<SimNode>,
	links: Vec<Link>,
	link_bias: Vec<f64>,
	params: SimulationParams,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	running: bool,
	jiggle: Jiggle,
}

impl Simulation {
	pub fn new(model: &GraphModel, params: SimulationParams, width: f64, height: f64) -> Self {
		let golden = PI * (3.0 - 5f64.sqrt());
		let nodes = model
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let (r, angle) = (INITIAL_RADIUS * (0.5 + i as f64).sqrt(), i as f64 * golden);
				SimNode {
					x: r * angle.cos(),
					y: r * angle.sin(),
					radius: node.radius,
					..Default::default()
				}
			})
			.collect();

		let mut degree = vec![0usize; model.nodes.len()];
		for link in &model.links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		let link_bias = model
			.links
			.iter()
			.map(|l| degree[l.source] as f64 / (degree[l.source] + degree[l.target]) as f64)
			.collect();

		Self {
			nodes,
			links: model.links.clone(),
			link_bias,
			params,
			center: (width / 2.0, height / 2.0),
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
			jiggle: Jiggle(0x9E37_79B9_7F4A_7C15),
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha.clamp(0.0, 1.0);
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	#[cfg(test)]
	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Halt ticking. Safe to call any number of times.
	pub fn stop(&mut self) {
		self.running = false;
	}

	#[cfg(test)]
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	pub fn set_center(&mut self, width: f64, height: f64) {
		self.center = (width / 2.0, height / 2.0);
	}

	pub fn pin(&mut self, idx: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = Some(x);
			node.fy = Some(y);
		}
	}

	pub fn unpin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.fx = None;
			node.fy = None;
		}
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Advance one frame if running; stops once alpha cools below `alpha_min`.
	/// Returns whether a tick happened.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick();
		if self.alpha < self.params.alpha_min {
			self.running = false;
			log::debug!("simulation settled");
		}
		true
	}

	/// One unconditional simulation tick.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		let alpha = self.alpha;

		self.apply_links(alpha);
		for _ in 0..self.params.collide_iterations {
			self.apply_collide();
		}
		self.apply_charge(alpha);
		self.apply_center();

		let decay = 1.0 - self.params.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= decay;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= decay;
					node.y += node.vy;
				}
			}
		}
	}

	fn apply_links(&mut self, alpha: f64) {
		let (strength, distance) = (self.params.link_strength, self.params.link_distance);
		for (link, &bias) in self.links.iter().zip(&self.link_bias) {
			let (s, t) = (&self.nodes[link.source], &self.nodes[link.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 {
				x = self.jiggle.next();
			}
			if y == 0.0 {
				y = self.jiggle.next();
			}
			let len = (x * x + y * y).sqrt();
			let scale = (len - distance) / len * alpha * strength;
			let (x, y) = (x * scale, y * scale);

			let t = &mut self.nodes[link.target];
			t.vx -= x * bias;
			t.vy -= y * bias;
			let s = &mut self.nodes[link.source];
			s.vx += x * (1.0 - bias);
			s.vy += y * (1.0 - bias);
		}
	}

	fn apply_collide(&mut self) {
		let strength = self.params.collide_strength;
		let n = self.nodes.len();
		for i in 0..n {
			let ni = &self.nodes[i];
			let (ri, xi, yi) = (ni.radius, ni.x + ni.vx, ni.y + ni.vy);
			let ri2 = ri * ri;
			for j in (i + 1)..n {
				let nj = &self.nodes[j];
				let r = ri + nj.radius;
				let mut x = xi - nj.x - nj.vx;
				let mut y = yi - nj.y - nj.vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = self.jiggle.next();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle.next();
					l += y * y;
				}
				let len = l.sqrt();
				let scale = (r - len) / len * strength;
				let (x, y) = (x * scale, y * scale);
				let rj2 = nj.radius * nj.radius;
				let share = rj2 / (ri2 + rj2);

				let ni = &mut self.nodes[i];
				ni.vx += x * share;
				ni.vy += y * share;
				let nj = &mut self.nodes[j];
				nj.vx -= x * (1.0 - share);
				nj.vy -= y * (1.0 - share);
			}
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		let strength = self.params.charge_strength * alpha;
		let min2 = self.params.charge_distance_min.powi(2);
		let max2 = self.params.charge_distance_max.powi(2);
		let n = self.nodes.len();
		for i in 0..n {
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut x = self.nodes[j].x - self.nodes[i].x;
				let mut y = self.nodes[j].y - self.nodes[i].y;
				let mut l = x * x + y * y;
				if l >= max2 {
					continue;
				}
				if x == 0.0 {
					x = self.jiggle.next();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle.next();
					l += y * y;
				}
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				dvx += x * strength / l;
				dvy += y * strength / l;
			}
			self.nodes[i].vx += dvx;
			self.nodes[i].vy += dvy;
		}
	}

	fn apply_center(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (dx, dy) = (sx / n - self.center.0, sy / n - self.center.1);
		for node in &mut self.nodes {
			node.x -= dx;
			node.y -= dy;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::types::Entry;

	fn model(entries: &[Entry]) -> GraphModel {
		GraphModel::build(entries, &GraphConfig::default())
	}

	fn isolated(n: usize) -> GraphModel {
		let entries: Vec<Entry> = (0..n).map(|i| Entry::new(format!("n{i}"))).collect();
		model(&entries)
	}

	#[test]
	fn settles_and_stops() {
		let entries = vec![
			Entry::new("a").with_outgoing(["b"]),
			Entry::new("b").with_incoming(["a"]),
		];
		let mut sim = Simulation::new(&model(&entries), SimulationParams::default(), 800.0, 600.0);
		let mut ticks = 0;
		while sim.step() {
			ticks += 1;
			assert!(ticks < 1000, "simulation never settled");
		}
		assert!(!sim.is_running());
		assert!(sim.alpha() < 0.001);
		assert!((290..=310).contains(&ticks), "took {ticks} ticks");
		assert!(!sim.step());
	}

	#[test]
	fn stop_is_idempotent_and_restart_resumes() {
		let mut sim = Simulation::new(&isolated(3), SimulationParams::default(), 100.0, 100.0);
		sim.stop();
		sim.stop();
		assert!(!sim.step());
		sim.restart();
		assert!(sim.step());
	}

	#[test]
	fn center_force_moves_mean_to_midpoint() {
		let mut sim = Simulation::new(&isolated(5), SimulationParams::default(), 800.0, 600.0);
		sim.tick();
		let n = sim.nodes.len() as f64;
		let mx: f64 = sim.nodes.iter().map(|p| p.x).sum::<f64>() / n;
		let my: f64 = sim.nodes.iter().map(|p| p.y).sum::<f64>() / n;
		// integration after centering moves the mean by the summed velocity only
		assert!((mx - 400.0).abs() < 5.0, "mean x {mx}");
		assert!((my - 300.0).abs() < 5.0, "mean y {my}");
	}

	#[test]
	fn zero_area_collapses_to_origin() {
		let mut sim = Simulation::new(&isolated(4), SimulationParams::default(), 0.0, 0.0);
		for _ in 0..10 {
			sim.tick();
		}
		assert!(sim.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
		assert_eq!(sim.center(), (0.0, 0.0));
	}

	#[test]
	fn charge_ignores_distant_pairs() {
		let mut sim = Simulation::new(&isolated(2), SimulationParams::default(), 800.0, 600.0);
		sim.nodes[0].x = 250.0;
		sim.nodes[1].x = 550.0;
		sim.nodes[0].y = 300.0;
		sim.nodes[1].y = 300.0;
		sim.tick();
		assert_eq!(sim.nodes[0].x, 250.0);
		assert_eq!(sim.nodes[1].x, 550.0);
	}

	#[test]
	fn charge_repels_nearby_pairs() {
		let mut sim = Simulation::new(&isolated(2), SimulationParams::default(), 800.0, 600.0);
		sim.nodes[0].x = 350.0;
		sim.nodes[1].x = 450.0;
		sim.nodes[0].y = 300.0;
		sim.nodes[1].y = 300.0;
		sim.tick();
		assert!(sim.nodes[1].x - sim.nodes[0].x > 100.0);
	}

	#[test]
	fn collide_separates_overlapping_nodes() {
		let params = SimulationParams {
			charge_strength: 0.0,
			..Default::default()
		};
		let mut sim = Simulation::new(&isolated(2), params, 0.0, 0.0);
		sim.nodes[0].x = -1.0;
		sim.nodes[1].x = 1.0;
		sim.nodes[0].y = 0.0;
		sim.nodes[1].y = 0.0;
		let before = sim.nodes[1].x - sim.nodes[0].x;
		sim.tick();
		assert!(sim.nodes[1].x - sim.nodes[0].x > before);
	}

	#[test]
	fn link_pulls_distant_endpoints_together() {
		let entries = vec![Entry::new("a").with_outgoing(["b"]), Entry::new("b")];
		let params = SimulationParams {
			charge_strength: 0.0,
			link_strength: 1.0,
			..Default::default()
		};
		let mut sim = Simulation::new(&model(&entries), params, 0.0, 0.0);
		sim.nodes[0].x = -100.0;
		sim.nodes[1].x = 100.0;
		sim.nodes[0].y = 0.0;
		sim.nodes[1].y = 0.0;
		sim.tick();
		assert!(sim.nodes[1].x - sim.nodes[0].x < 200.0);
	}

	#[test]
	fn pinned_node_snaps_to_pin() {
		let mut sim = Simulation::new(&isolated(3), SimulationParams::default(), 800.0, 600.0);
		sim.pin(1, 410.0, 300.0);
		sim.tick();
		assert_eq!((sim.nodes[1].x, sim.nodes[1].y), (410.0, 300.0));
		assert_eq!((sim.nodes[1].vx, sim.nodes[1].vy), (0.0, 0.0));
		sim.unpin(1);
		sim.tick();
		assert_ne!((sim.nodes[1].x, sim.nodes[1].y), (410.0, 300.0));
	}

	#[test]
	fn alpha_target_holds_energy() {
		let mut sim = Simulation::new(&isolated(2), SimulationParams::default(), 100.0, 100.0);
		sim.set_alpha_target(0.3);
		for _ in 0..2000 {
			sim.step();
		}
		assert!(sim.is_running());
		assert!((sim.alpha() - 0.3).abs() < 1e-3);
	}

	#[test]
	fn empty_graph_ticks() {
		let mut sim = Simulation::new(&isolated(0), SimulationParams::default(), 100.0, 100.0);
		sim.tick();
		assert!(sim.nodes.is_empty());
	}
}
