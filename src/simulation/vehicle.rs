//! Vehicles and the passengers they carry

use std::collections::VecDeque;

use super::queue::TransitQueue;
use super::types::{NodeId, PassengerId, VehicleId, VehicleKind};

/// A traveller waiting at a stop or riding a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passenger {
    pub id: PassengerId,
    pub destination: NodeId,
}

/// A vehicle moving through the network
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: VehicleId,
    pub kind: VehicleKind,
    /// Seating capacity
    pub capacity: usize,
    pub current: NodeId,
    pub destination: NodeId,
    pub speed: f64,
    /// Boarded passengers, most recently boarded first
    manifest: VecDeque<Passenger>,
}

impl Vehicle {
    pub fn new(id: VehicleId, kind: VehicleKind, current: NodeId, destination: NodeId) -> Self {
        Self {
            id,
            kind,
            capacity: kind.default_capacity(),
            current,
            destination,
            speed: kind.base_speed(),
            manifest: VecDeque::new(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Number of passengers on board
    pub fn occupancy(&self) -> usize {
        self.manifest.len()
    }

    pub fn is_full(&self) -> bool {
        self.manifest.len() >= self.capacity
    }

    /// Boarded passengers, most recently boarded first
    pub fn manifest(&self) -> impl Iterator<Item = &Passenger> {
        self.manifest.iter()
    }

    /// Board passengers from `waiting` in FIFO order until the vehicle is
    /// full or the queue is empty.
    pub fn embark(&mut self, waiting: &mut TransitQueue<Passenger>) -> Vec<Passenger> {
        let mut boarded = Vec::new();
        while !self.is_full() {
            let Some(passenger) = waiting.pop() else {
                break;
            };
            self.manifest.push_front(passenger);
            boarded.push(passenger);
        }
        boarded
    }

    /// Remove every passenger whose destination is the current node.
    ///
    /// Remaining passengers keep their relative order.
    pub fn disembark(&mut self) -> Vec<Passenger> {
        let here = self.current;
        let (leaving, staying): (VecDeque<_>, VecDeque<_>) = self
            .manifest
            .drain(..)
            .partition(|passenger| passenger.destination == here);
        self.manifest = staying;
        leaving.into_iter().collect()
    }
}
