//! Signal timing and per-signal vehicle queues
//!
//! Vehicles stopped at a red signal wait in that signal's FIFO queue. The
//! queue drains, in arrival order, when the signal turns green.

use log::debug;

use super::error::{NetworkError, Result};
use super::events::SimEvent;
use super::network::Network;
use super::queue::TransitQueue;
use super::signal::Phase;
use super::types::{NodeId, SignalId, VehicleId};
use super::vehicle::Vehicle;

/// What happened to the signals during one tick
#[derive(Debug, Default)]
pub struct SignalTick {
    pub events: Vec<SimEvent>,
    /// Vehicles let through, in release order
    pub released: Vec<Vehicle>,
}

/// Owns one vehicle queue per signal slot
#[derive(Debug, Clone)]
pub struct TrafficController {
    queues: Vec<TransitQueue<Vehicle>>,
}

impl TrafficController {
    pub fn new(network: &Network) -> Self {
        Self {
            queues: (0..network.signal_count())
                .map(|_| TransitQueue::new())
                .collect(),
        }
    }

    fn queue_mut(&mut self, signal: SignalId) -> Result<&mut TransitQueue<Vehicle>> {
        let len = self.queues.len();
        self.queues
            .get_mut(signal.0)
            .ok_or(NetworkError::IndexOutOfRange {
                kind: "signal",
                index: signal.0,
                len,
            })
    }

    /// Add a vehicle to the back of a signal's queue
    pub fn enqueue(&mut self, signal: SignalId, vehicle: Vehicle) -> Result<SimEvent> {
        let event = SimEvent::VehicleQueuedAtSignal {
            vehicle: vehicle.id,
            signal,
        };
        self.queue_mut(signal)?.push(vehicle);
        debug!("{:?}", event);
        Ok(event)
    }

    pub fn queue_len(&self, signal: SignalId) -> usize {
        self.queues.get(signal.0).map_or(0, TransitQueue::len)
    }

    /// Vehicles waiting at a signal, front first
    pub fn queued(&self, signal: SignalId) -> impl Iterator<Item = &Vehicle> {
        self.queues.get(signal.0).into_iter().flat_map(|q| q.iter())
    }

    /// Vehicles waiting at any signal governing `node`
    pub fn queued_at_node(&self, network: &Network, node: NodeId) -> usize {
        network
            .signals_at(node)
            .map(|signal| self.queue_len(signal.id()))
            .sum()
    }

    /// Drop `vehicle` from a signal's queue, keeping the others in order
    pub(crate) fn withdraw(&mut self, signal: SignalId, vehicle: VehicleId) {
        if let Some(queue) = self.queues.get_mut(signal.0) {
            queue.retain(|v| v.id != vehicle);
        }
    }

    /// Let every vehicle waiting at `signal` through, front first
    fn release(&mut self, signal: SignalId, tick: &mut SignalTick) {
        let Some(queue) = self.queues.get_mut(signal.0) else {
            return;
        };
        for vehicle in queue.drain() {
            tick.events.push(SimEvent::VehicleReleasedFromSignal {
                vehicle: vehicle.id,
                signal,
            });
            tick.released.push(vehicle);
        }
    }

    /// Advance every signal by `delta` and drain the queue of a signal
    /// each time it turns green.
    pub fn tick(&mut self, network: &mut Network, delta: f64) -> SignalTick {
        let mut tick = SignalTick::default();

        for index in 0..network.signal_count() {
            let id = SignalId(index);
            let Some(signal) = network.signal_mut(id) else {
                continue;
            };
            let node = signal.node();

            for phase in signal.advance(delta) {
                debug!("signal {} at node {} turned {:?}", index, node, phase);
                tick.events.push(SimEvent::SignalChanged {
                    signal: id,
                    node,
                    phase,
                });
                if phase == Phase::Green {
                    self.release(id, &mut tick);
                }
            }
        }

        tick
    }
}
