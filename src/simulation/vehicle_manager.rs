//! Principal vehicle, waiting passengers and the stop-side traffic queue
//!
//! Passengers wait in one FIFO queue per node until a vehicle boards them.
//! Vehicles parked at a stop wait in a general traffic queue; once they move
//! on they are recorded on a history stack.

use log::debug;
use rand::Rng;

use super::error::{NetworkError, Result};
use super::events::SimEvent;
use super::network::Network;
use super::queue::{TransitQueue, TransitStack};
use super::traffic_controller::TrafficController;
use super::types::{NodeId, PassengerId};
use super::vehicle::{Passenger, Vehicle};

#[derive(Debug, Clone)]
pub struct VehicleManager {
    principal: Vehicle,
    waiting: Vec<TransitQueue<Passenger>>,
    traffic: TransitQueue<Vehicle>,
    history: TransitStack<Vehicle>,
    next_passenger_id: usize,
}

/// Board from `waiting` into `vehicle`, reporting each boarding
pub fn embark(vehicle: &mut Vehicle, waiting: &mut TransitQueue<Passenger>) -> Vec<SimEvent> {
    vehicle
        .embark(waiting)
        .into_iter()
        .map(|passenger| SimEvent::PassengerBoarded {
            passenger: passenger.id,
            vehicle: vehicle.id,
            destination: passenger.destination,
        })
        .collect()
}

/// Drop off everyone bound for the vehicle's current node
pub fn disembark(vehicle: &mut Vehicle) -> Vec<SimEvent> {
    let node = vehicle.current;
    vehicle
        .disembark()
        .into_iter()
        .map(|passenger| SimEvent::PassengerAlighted {
            passenger: passenger.id,
            vehicle: vehicle.id,
            node,
        })
        .collect()
}

impl VehicleManager {
    pub fn new(principal: Vehicle, node_count: usize) -> Self {
        Self {
            principal,
            waiting: (0..node_count).map(|_| TransitQueue::new()).collect(),
            traffic: TransitQueue::new(),
            history: TransitStack::new(),
            next_passenger_id: 0,
        }
    }

    pub fn principal(&self) -> &Vehicle {
        &self.principal
    }

    pub(crate) fn principal_mut(&mut self) -> &mut Vehicle {
        &mut self.principal
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if node.0 < self.waiting.len() {
            Ok(())
        } else {
            Err(NetworkError::IndexOutOfRange {
                kind: "node",
                index: node.0,
                len: self.waiting.len(),
            })
        }
    }

    /// Queue a new passenger at `node` bound for `destination`
    pub fn add_waiting_passenger(&mut self, node: NodeId, destination: NodeId) -> Result<PassengerId> {
        self.check_node(node)?;
        self.check_node(destination)?;
        let id = PassengerId(self.next_passenger_id);
        self.next_passenger_id += 1;
        self.waiting[node.0].push(Passenger { id, destination });
        Ok(id)
    }

    /// Scatter `count` passengers over random stops with random destinations
    pub fn populate_waiting_passengers<R: Rng>(&mut self, rng: &mut R, count: usize) -> Vec<PassengerId> {
        let nodes = self.waiting.len();
        if nodes < 2 {
            return Vec::new();
        }

        let mut added = Vec::with_capacity(count);
        for _ in 0..count {
            let origin = rng.random_range(0..nodes);
            let mut destination = rng.random_range(0..nodes - 1);
            if destination >= origin {
                destination += 1;
            }
            let id = PassengerId(self.next_passenger_id);
            self.next_passenger_id += 1;
            self.waiting[origin].push(Passenger {
                id,
                destination: NodeId(destination),
            });
            added.push(id);
        }
        added
    }

    /// Passengers waiting at `node`, front first
    pub fn waiting_at(&self, node: NodeId) -> Option<&TransitQueue<Passenger>> {
        self.waiting.get(node.0)
    }

    pub fn total_waiting(&self) -> usize {
        self.waiting.iter().map(TransitQueue::len).sum()
    }

    /// Board waiting passengers at the principal's current node
    pub fn embark_principal(&mut self) -> Vec<SimEvent> {
        let node = self.principal.current;
        match self.waiting.get_mut(node.0) {
            Some(queue) => embark(&mut self.principal, queue),
            None => Vec::new(),
        }
    }

    pub fn disembark_principal(&mut self) -> Vec<SimEvent> {
        disembark(&mut self.principal)
    }

    /// Vehicles at `node`: the principal if it is there, vehicles held in
    /// the traffic queue there, and vehicles queued at signals on the node.
    pub fn count_at_stop(&self, node: NodeId, network: &Network, controller: &TrafficController) -> usize {
        let principal = usize::from(self.principal.current == node);
        let held = self.traffic.iter().filter(|v| v.current == node).count();
        principal + held + controller.queued_at_node(network, node)
    }

    /// Park a vehicle in the traffic queue at its current node
    pub fn hold(&mut self, vehicle: Vehicle) -> SimEvent {
        let event = SimEvent::VehicleHeld {
            vehicle: vehicle.id,
            node: vehicle.current,
        };
        debug!("{:?}", event);
        self.traffic.push(vehicle);
        event
    }

    /// Let the longest-held vehicle move on and record it in the history
    pub fn release_next_held(&mut self) -> Option<SimEvent> {
        let vehicle = self.traffic.pop()?;
        let event = SimEvent::VehicleAdvanced {
            vehicle: vehicle.id,
            node: vehicle.current,
        };
        debug!("{:?}", event);
        self.history.push(vehicle);
        Some(event)
    }

    pub(crate) fn record_departure(&mut self, vehicle: Vehicle) {
        self.history.push(vehicle);
    }

    pub fn held(&self) -> impl Iterator<Item = &Vehicle> {
        self.traffic.iter()
    }

    /// Vehicles that moved on, most recent first
    pub fn history(&self) -> impl Iterator<Item = &Vehicle> {
        self.history.iter()
    }

    pub fn pop_history(&mut self) -> Option<Vehicle> {
        self.history.pop()
    }
}
