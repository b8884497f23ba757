use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use bytes::Bytes;

use super::Transport;

/// Largest datagram UDP can carry over IPv4.
const RECV_BUFFER_SIZE: usize = 65_507;

/// Non-blocking UDP socket connected to a single peer.
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
    recv_buffer: Box<[u8]>,
}

impl UdpTransport {
    pub fn bind<A: ToSocketAddrs, B: ToSocketAddrs>(local: A, peer: B) -> io::Result<Self> {
        let socket = UdpSocket::bind(local)?;
        socket.connect(peer)?;
        Self::from_socket(socket)
    }

    /// Wraps a socket that is already connected to its peer.
    pub fn from_socket(socket: UdpSocket) -> io::Result<Self> {
        socket.set_nonblocking(true)?;

        let local_addr = socket.local_addr()?;
        let peer_addr = socket.peer_addr()?;

        Ok(Self {
            socket,
            local_addr,
            peer_addr,
            recv_buffer: vec![0u8; RECV_BUFFER_SIZE].into_boxed_slice(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, datagram: &[u8]) -> io::Result<usize> {
        match self.socket.send(datagram) {
            Ok(n) => Ok(n),
            // peer not up yet; the datagram is lost like any other
            Err(ref e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                log::debug!("peer {} refused datagram", self.peer_addr);
                Ok(datagram.len())
            }
            Err(e) => Err(e),
        }
    }

    fn receive(&mut self) -> io::Result<Option<Bytes>> {
        loop {
            match self.socket.recv(&mut self.recv_buffer) {
                Ok(size) => return Ok(Some(Bytes::copy_from_slice(&self.recv_buffer[..size]))),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                // ICMP port unreachable from an earlier send, skip it
                Err(ref e) if e.kind() == io::ErrorKind::ConnectionRefused => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("local_addr", &self.local_addr)
            .field("peer_addr", &self.peer_addr)
            .finish()
    }
}
