//! Core types for the transit simulation
//!
//! Identifiers are dense indices into the fixed-size tables owned by the
//! network, so they stay valid for the lifetime of the graph.

use std::fmt;

/// A stop or intersection in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Slot index of an edge in the edge table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

/// Slot index of a traffic signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleId(pub usize);

/// A wrapper type for passenger IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassengerId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 2D map coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance, used as the A* heuristic
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Category of vehicle, each with its own cruising speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    Car,
    Bus,
    Truck,
}

impl VehicleKind {
    /// Base speed in distance units per time unit
    pub fn base_speed(self) -> f64 {
        match self {
            VehicleKind::Car => SPEED_CAR,
            VehicleKind::Bus => SPEED_BUS,
            VehicleKind::Truck => SPEED_TRUCK,
        }
    }

    /// Default seating capacity
    pub fn default_capacity(self) -> usize {
        match self {
            VehicleKind::Car => 4,
            VehicleKind::Bus => 40,
            VehicleKind::Truck => 2,
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleKind::Car => "Car",
            VehicleKind::Bus => "Bus",
            VehicleKind::Truck => "Truck",
        };
        f.write_str(name)
    }
}

pub const SPEED_CAR: f64 = 60.0;
pub const SPEED_BUS: f64 = 40.0;
pub const SPEED_TRUCK: f64 = 30.0;
