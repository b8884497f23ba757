//! Datagram transports the engine can be driven over.
//!
//! The engine never resolves addresses. A transport is one link to one peer;
//! serving several peers means one transport and one endpoint per peer.

use std::io;

use bytes::Bytes;

mod lossy;
mod memory;
mod udp;

pub use lossy::{LossyTransport, PacketLossSimulation};
pub use memory::MemoryTransport;
pub use udp::UdpTransport;

pub trait Transport {
    /// Writes one datagram, returning the number of bytes accepted.
    fn send(&mut self, datagram: &[u8]) -> io::Result<usize>;

    /// Takes the next waiting datagram. Never blocks: `Ok(None)` means
    /// nothing has arrived yet.
    fn receive(&mut self) -> io::Result<Option<Bytes>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, datagram: &[u8]) -> io::Result<usize> {
        (**self).send(datagram)
    }

    fn receive(&mut self) -> io::Result<Option<Bytes>> {
        (**self).receive()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, datagram: &[u8]) -> io::Result<usize> {
        (**self).send(datagram)
    }

    fn receive(&mut self) -> io::Result<Option<Bytes>> {
        (**self).receive()
    }
}
