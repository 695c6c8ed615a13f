//! Transit Simulation Library
//!
//! A transport network engine: shortest paths, maximum flow and a
//! step-driven vehicle simulation with signals, congestion and passengers.

pub mod simulation;
