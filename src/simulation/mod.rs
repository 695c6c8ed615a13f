//! Transport network simulation engine
//!
//! Graph model, path planners, max-flow solver, signal control and the
//! step-driven simulation of a principal vehicle. Nothing here renders or
//! reads input; callers consume the returned values and events.

mod config;
mod error;
mod events;
mod flow;
mod journey;
mod network;
mod planner;
mod queue;
mod signal;
mod traffic_controller;
mod types;
mod vehicle;
mod vehicle_manager;
mod world;

pub use config::{JourneyConfig, SimConfig};
pub use error::{NetworkError, Result};
pub use events::SimEvent;
pub use flow::{max_flow, max_flow_sparse, DenseResidual, FlowSolution, ResidualGraph, SparseResidual};
pub use journey::{Journey, JourneyUpdate, PauseReason};
pub use network::{Edge, EdgeConditions, Network, NetworkSummary, Node};
pub use planner::{astar, dijkstra, plan, priority_dijkstra, Algorithm, PathResult};
pub use queue::{TransitQueue, TransitStack};
pub use signal::{Phase, Signal};
pub use traffic_controller::{SignalTick, TrafficController};
pub use types::{
    EdgeId, NodeId, PassengerId, Position, SignalId, VehicleId, VehicleKind, SPEED_BUS, SPEED_CAR,
    SPEED_TRUCK,
};
pub use vehicle::{Passenger, Vehicle};
pub use vehicle_manager::{disembark, embark, VehicleManager};
pub use world::{BlockReason, RunReport, StepOutcome, StepStatus, TransitWorld};
