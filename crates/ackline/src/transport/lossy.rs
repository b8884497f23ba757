use std::io;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Transport;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PacketLossSimulation {
    pub enabled: bool,
    /// Chance of dropping an outgoing datagram, `0.0..=100.0`.
    pub loss_percent: f32,
}

impl PacketLossSimulation {
    pub fn with_loss(loss_percent: f32) -> Self {
        Self {
            enabled: loss_percent > 0.0,
            loss_percent: loss_percent.clamp(0.0, 100.0),
        }
    }

    pub fn should_drop(&self, rng: &mut impl Rng) -> bool {
        if !self.enabled || self.loss_percent <= 0.0 {
            return false;
        }
        rng.random_bool(f64::from(self.loss_percent.min(100.0)) / 100.0)
    }
}

/// Wraps a transport and randomly discards outgoing datagrams.
///
/// Dropped datagrams still report a full write so the engine behaves as if
/// the network lost them.
#[derive(Debug)]
pub struct LossyTransport<T> {
    inner: T,
    simulation: PacketLossSimulation,
    rng: StdRng,
    dropped: u64,
}

impl<T: Transport> LossyTransport<T> {
    pub fn new(inner: T, simulation: PacketLossSimulation) -> Self {
        Self::with_rng(inner, simulation, StdRng::from_os_rng())
    }

    pub fn with_seed(inner: T, simulation: PacketLossSimulation, seed: u64) -> Self {
        Self::with_rng(inner, simulation, StdRng::seed_from_u64(seed))
    }

    fn with_rng(inner: T, simulation: PacketLossSimulation, rng: StdRng) -> Self {
        Self {
            inner,
            simulation,
            rng,
            dropped: 0,
        }
    }

    pub fn simulation(&self) -> &PacketLossSimulation {
        &self.simulation
    }

    pub fn set_simulation(&mut self, simulation: PacketLossSimulation) {
        self.simulation = simulation;
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Transport> Transport for LossyTransport<T> {
    fn send(&mut self, datagram: &[u8]) -> io::Result<usize> {
        if self.simulation.should_drop(&mut self.rng) {
            self.dropped += 1;
            log::trace!("simulated loss of {} byte datagram", datagram.len());
            return Ok(datagram.len());
        }
        self.inner.send(datagram)
    }

    fn receive(&mut self) -> io::Result<Option<Bytes>> {
        self.inner.receive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    #[test]
    fn test_disabled_never_drops() {
        let (a, mut b) = MemoryTransport::pair();
        let mut lossy = LossyTransport::with_seed(a, PacketLossSimulation::default(), 7);

        for i in 0..50u8 {
            lossy.send(&[i]).unwrap();
        }

        assert_eq!(lossy.dropped(), 0);
        let mut count = 0;
        while b.receive().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 50);
    }

    #[test]
    fn test_total_loss_drops_everything() {
        let (a, mut b) = MemoryTransport::pair();
        let mut lossy = LossyTransport::with_seed(a, PacketLossSimulation::with_loss(100.0), 7);

        for i in 0..20u8 {
            assert_eq!(lossy.send(&[i, i]).unwrap(), 2);
        }

        assert_eq!(lossy.dropped(), 20);
        assert!(b.receive().unwrap().is_none());
    }

    #[test]
    fn test_partial_loss() {
        let mut lossy = LossyTransport::with_seed(
            MemoryTransport::new(),
            PacketLossSimulation::with_loss(50.0),
            42,
        );

        for _ in 0..1000 {
            lossy.send(&[0]).unwrap();
        }

        let dropped = lossy.dropped();
        assert!(dropped > 300 && dropped < 700, "dropped {dropped}");
    }
}
