//! Simulation driver for the principal vehicle
//!
//! Each call to [`TransitWorld::step`] advances simulated time by a caller
//! supplied delta. Waiting (red signal, gridlock, travel along an edge) is
//! reported as a blocked status rather than slept through, so a blocked
//! step can be re-entered freely.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::SimConfig;
use super::error::{NetworkError, Result};
use super::events::SimEvent;
use super::network::{EdgeConditions, Network};
use super::planner::{self, PathResult};
use super::signal::Phase;
use super::traffic_controller::TrafficController;
use super::types::{EdgeId, NodeId, SignalId, VehicleId, VehicleKind};
use super::vehicle::Vehicle;
use super::vehicle_manager::VehicleManager;

/// Why the principal vehicle could not move this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockReason {
    RedSignal { signal: SignalId },
    Gridlock,
    InTransit { edge: EdgeId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepStatus {
    /// The principal vehicle is at its destination
    Arrived,
    /// Left the current node along `edge`
    Departed { edge: EdgeId, travel_time: f64 },
    /// Finished travelling an edge and is now at `node`
    Moved { node: NodeId },
    Blocked { reason: BlockReason, remaining: f64 },
    /// No edge leaves the current node
    Halted,
}

impl StepStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, StepStatus::Arrived | StepStatus::Halted)
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub status: StepStatus,
    pub events: Vec<SimEvent>,
}

/// Summary of a multi-step run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub steps: usize,
    pub final_status: Option<StepStatus>,
    pub events: Vec<SimEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DriverState {
    Ready,
    AtSignal {
        signal: SignalId,
    },
    Gridlocked {
        remaining: f64,
    },
    InTransit {
        edge: EdgeId,
        destination: NodeId,
        remaining: f64,
    },
    Arrived,
}

/// The network, its signals and the principal vehicle
pub struct TransitWorld {
    network: Network,
    controller: TrafficController,
    manager: VehicleManager,
    config: SimConfig,
    state: DriverState,
    /// Simulated time
    time: f64,
}

impl TransitWorld {
    pub fn new(network: Network, principal: Vehicle, config: SimConfig) -> Result<Self> {
        network.check_node(principal.current)?;
        network.check_node(principal.destination)?;
        if !principal.speed.is_finite() || principal.speed <= 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "speed",
                value: principal.speed.to_string(),
            });
        }

        let controller = TrafficController::new(&network);
        let manager = VehicleManager::new(principal, network.node_count());
        Ok(Self {
            network,
            controller,
            manager,
            config,
            state: DriverState::Ready,
            time: 0.0,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn controller(&self) -> &TrafficController {
        &self.controller
    }

    pub fn manager(&self) -> &VehicleManager {
        &self.manager
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn principal(&self) -> &Vehicle {
        self.manager.principal()
    }

    pub fn signal_phase(&self, signal: SignalId) -> Option<Phase> {
        self.network.signal(signal).map(|s| s.phase())
    }

    /// Send the principal vehicle on a new trip from `source` to `destination`.
    ///
    /// A copy of the principal still waiting at a signal is withdrawn.
    pub fn begin_journey(&mut self, source: NodeId, destination: NodeId) -> Result<()> {
        self.network.check_node(source)?;
        self.network.check_node(destination)?;
        if let DriverState::AtSignal { signal } = self.state {
            let id = self.manager.principal().id;
            self.controller.withdraw(signal, id);
        }
        let principal = self.manager.principal_mut();
        principal.current = source;
        principal.destination = destination;
        self.state = DriverState::Ready;
        Ok(())
    }

    pub fn add_waiting_passenger(&mut self, node: NodeId, destination: NodeId) -> Result<()> {
        self.manager.add_waiting_passenger(node, destination).map(|_| ())
    }

    /// Put another vehicle in a signal's queue
    pub fn enqueue_at_signal(&mut self, signal: SignalId, vehicle: Vehicle) -> Result<SimEvent> {
        self.controller.enqueue(signal, vehicle)
    }

    pub fn hold_vehicle(&mut self, vehicle: Vehicle) -> SimEvent {
        self.manager.hold(vehicle)
    }

    pub fn release_next_held(&mut self) -> Option<SimEvent> {
        self.manager.release_next_held()
    }

    /// Vehicles at `node`, including those queued at its signals
    pub fn count_at_stop(&self, node: NodeId) -> usize {
        self.manager
            .count_at_stop(node, &self.network, &self.controller)
    }

    /// Scale an edge's distance to model a disturbance, then replan.
    ///
    /// The new distance is kept.
    pub fn recalculate_route(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge: EdgeId,
        congestion_factor: f64,
    ) -> Result<SimEvent> {
        self.network.check_node(source)?;
        self.network.check_node(target)?;
        let new_distance = self.network.scale_edge_distance(edge, congestion_factor)?;
        let path = planner::dijkstra(&self.network, source, target)?;
        info!(
            "Disturbance on edge {}: new distance {:.2}, route {:?}",
            edge,
            new_distance,
            path.as_ref().map(|p| &p.nodes)
        );
        Ok(SimEvent::RouteRecalculated {
            edge,
            new_distance,
            path,
        })
    }

    /// Advance the simulation by `delta` time units
    pub fn step(&mut self, delta: f64) -> StepOutcome {
        self.time += delta;
        let mut events = Vec::new();

        let principal_id = self.manager.principal().id;
        let tick = self.controller.tick(&mut self.network, delta);
        events.extend(tick.events);
        let mut principal_released = false;
        for vehicle in tick.released {
            if vehicle.id == principal_id {
                principal_released = true;
            } else {
                self.manager.record_departure(vehicle);
            }
        }

        let state = self.state;
        let status = match state {
            DriverState::Arrived => StepStatus::Arrived,
            DriverState::Ready => self.evaluate(&mut events),
            DriverState::AtSignal { signal } => {
                let still_red = self
                    .network
                    .signal(signal)
                    .is_some_and(|s| s.is_red());
                if principal_released || !still_red {
                    self.state = DriverState::Ready;
                    self.evaluate(&mut events)
                } else {
                    let remaining = self.network.signal(signal).map_or(0.0, |s| s.remaining());
                    StepStatus::Blocked {
                        reason: BlockReason::RedSignal { signal },
                        remaining,
                    }
                }
            }
            DriverState::Gridlocked { remaining } => {
                let remaining = remaining - delta;
                if remaining > 0.0 {
                    self.state = DriverState::Gridlocked { remaining };
                    StepStatus::Blocked {
                        reason: BlockReason::Gridlock,
                        remaining,
                    }
                } else {
                    self.state = DriverState::Ready;
                    self.evaluate(&mut events)
                }
            }
            DriverState::InTransit {
                edge,
                destination,
                remaining,
            } => {
                let remaining = remaining - delta;
                if remaining > 0.0 {
                    self.state = DriverState::InTransit {
                        edge,
                        destination,
                        remaining,
                    };
                    StepStatus::Blocked {
                        reason: BlockReason::InTransit { edge },
                        remaining,
                    }
                } else {
                    self.arrive_at(destination, &mut events)
                }
            }
        };

        debug!("t={:.2} {:?}", self.time, status);
        StepOutcome { status, events }
    }

    fn arrive_at(&mut self, node: NodeId, events: &mut Vec<SimEvent>) -> StepStatus {
        let principal = self.manager.principal_mut();
        principal.current = node;
        let vehicle = principal.id;
        events.push(SimEvent::ArrivedAtNode { vehicle, node });

        if node == principal.destination {
            info!("Vehicle {} reached its destination (node {})", vehicle.0, node);
            events.push(SimEvent::ReachedDestination { vehicle, node });
            self.state = DriverState::Arrived;
            return StepStatus::Arrived;
        }

        self.state = DriverState::Ready;
        StepStatus::Moved { node }
    }

    /// Decide what the principal vehicle does at its current node
    fn evaluate(&mut self, events: &mut Vec<SimEvent>) -> StepStatus {
        let principal = self.manager.principal();
        let vehicle = principal.id;
        let here = principal.current;

        if here == principal.destination {
            events.push(SimEvent::ReachedDestination {
                vehicle,
                node: here,
            });
            self.state = DriverState::Arrived;
            return StepStatus::Arrived;
        }

        if let Some(signal) = self.network.red_signal_at(here) {
            let (signal, remaining) = (signal.id(), signal.remaining());
            let snapshot = principal.clone();
            match self.controller.enqueue(signal, snapshot) {
                Ok(event) => events.push(event),
                Err(err) => warn!("Could not queue vehicle at signal {:?}: {}", signal, err),
            }
            self.state = DriverState::AtSignal { signal };
            return StepStatus::Blocked {
                reason: BlockReason::RedSignal { signal },
                remaining,
            };
        }

        let vehicles = self.count_at_stop(here);
        if vehicles > self.config.gridlock_threshold {
            events.push(SimEvent::Gridlock {
                node: here,
                vehicles,
            });
            let remaining = self.config.gridlock_wait;
            self.state = DriverState::Gridlocked { remaining };
            return StepStatus::Blocked {
                reason: BlockReason::Gridlock,
                remaining,
            };
        }

        let Some((edge, next)) = self
            .network
            .first_outgoing(here)
            .map(|(id, e)| (id, (e.destination, e.distance)))
        else {
            warn!("No edge leaves node {}", here);
            events.push(SimEvent::NoOutgoingEdge {
                vehicle,
                node: here,
            });
            return StepStatus::Halted;
        };
        let (destination, distance) = next;

        events.extend(self.manager.disembark_principal());
        events.extend(self.manager.embark_principal());

        let travel_time = distance / self.manager.principal().speed;
        events.push(SimEvent::Departed {
            vehicle,
            edge,
            from: here,
            to: destination,
            travel_time,
        });
        self.state = DriverState::InTransit {
            edge,
            destination,
            remaining: travel_time,
        };
        StepStatus::Departed { edge, travel_time }
    }

    /// Step until the principal vehicle arrives, halts, or `max_steps` pass
    pub fn run_until_settled(&mut self, delta: f64, max_steps: usize) -> RunReport {
        let mut report = RunReport {
            steps: 0,
            final_status: None,
            events: Vec::new(),
        };
        while report.steps < max_steps {
            let outcome = self.step(delta);
            report.steps += 1;
            report.events.extend(outcome.events);
            report.final_status = Some(outcome.status);
            if outcome.status.is_settled() {
                break;
            }
        }
        report
    }

    /// Shortest route for the principal vehicle from where it stands
    pub fn planned_route(&self) -> Result<Option<PathResult<i64>>> {
        let principal = self.manager.principal();
        planner::dijkstra(&self.network, principal.current, principal.destination)
    }

    /// Six-stop network with two signals and a bus as principal vehicle
    pub fn create_demo_world(seed: u64, passengers: usize) -> Result<Self> {
        let mut network = Network::create(6, 8, 2)?;

        let stops = [
            ("Central Station", "Multi", 10.0, 20.0),
            ("City Square", "Bus", 15.0, 30.0),
            ("Metro Station", "Metro", 20.0, 40.0),
            ("Main Park", "Bus", 25.0, 35.0),
            ("Shopping Centre", "Multi", 30.0, 25.0),
            ("Industrial Zone", "Bus", 35.0, 45.0),
        ];
        for (id, (name, category, x, y)) in stops.into_iter().enumerate() {
            network.set_node(NodeId(id), name, category, x, y)?;
        }

        let routes = [
            (0, 1, 5.0, true, 10),
            (1, 2, 3.5, false, 6),
            (2, 3, 4.0, true, 8),
            (3, 4, 3.0, true, 7),
            (4, 5, 4.5, false, 9),
            (0, 2, 8.0, true, 4),
            (1, 3, 6.0, false, 5),
            (2, 4, 5.5, true, 6),
        ];
        for (index, (from, to, distance, priority, capacity)) in routes.into_iter().enumerate() {
            network.set_flow_edge(
                EdgeId(index),
                NodeId(from),
                NodeId(to),
                distance,
                priority,
                capacity,
            )?;
        }
        network.set_edge_conditions(
            EdgeId(2),
            EdgeConditions {
                traffic_light_present: true,
                ..EdgeConditions::default()
            },
        )?;
        network.set_edge_conditions(
            EdgeId(6),
            EdgeConditions {
                congested: true,
                ..EdgeConditions::default()
            },
        )?;

        network.set_signal(SignalId(0), NodeId(1), Phase::Red, 3.0, 5.0)?;
        network.set_signal(SignalId(1), NodeId(3), Phase::Green, 2.0, 4.0)?;

        let principal = Vehicle::new(VehicleId(0), VehicleKind::Bus, NodeId(0), NodeId(5));
        let mut world = Self::new(network, principal, SimConfig::default())?;

        let mut rng = StdRng::seed_from_u64(seed);
        world
            .manager
            .populate_waiting_passengers(&mut rng, passengers);
        Ok(world)
    }
}
