use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

use super::Transport;

type Queue = Arc<Mutex<VecDeque<Bytes>>>;

fn lock(queue: &Queue) -> std::sync::MutexGuard<'_, VecDeque<Bytes>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process datagram link.
///
/// Datagrams written by one end of a [`pair`](Self::pair) show up on the other
/// end in order. Every datagram written is also kept in a log for inspection.
/// Drops can be scheduled on either direction to script loss.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    incoming: Queue,
    outgoing: Option<Queue>,
    sent: Vec<Bytes>,
    drop_outgoing: usize,
    drop_incoming: usize,
}

impl MemoryTransport {
    /// A transport with no peer. Outgoing datagrams only land in [`sent`](Self::sent).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair() -> (Self, Self) {
        let a_to_b: Queue = Arc::default();
        let b_to_a: Queue = Arc::default();

        let a = Self {
            incoming: Arc::clone(&b_to_a),
            outgoing: Some(Arc::clone(&a_to_b)),
            ..Self::default()
        };
        let b = Self {
            incoming: a_to_b,
            outgoing: Some(b_to_a),
            ..Self::default()
        };

        (a, b)
    }

    pub fn push_incoming(&self, datagram: impl Into<Bytes>) {
        lock(&self.incoming).push_back(datagram.into());
    }

    /// Every datagram passed to `send`, dropped ones included.
    pub fn sent(&self) -> &[Bytes] {
        &self.sent
    }

    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    pub fn pending_incoming(&self) -> usize {
        lock(&self.incoming).len()
    }

    /// The next datagram written is recorded but never delivered.
    pub fn drop_next_outgoing(&mut self) {
        self.drop_outgoing += 1;
    }

    /// The next waiting datagram is discarded instead of returned.
    pub fn drop_next_incoming(&mut self) {
        self.drop_incoming += 1;
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, datagram: &[u8]) -> io::Result<usize> {
        let datagram = Bytes::copy_from_slice(datagram);
        self.sent.push(datagram.clone());

        if self.drop_outgoing > 0 {
            self.drop_outgoing -= 1;
            log::trace!("dropping outgoing datagram of {} bytes", datagram.len());
        } else if let Some(outgoing) = &self.outgoing {
            lock(outgoing).push_back(datagram.clone());
        }

        Ok(datagram.len())
    }

    fn receive(&mut self) -> io::Result<Option<Bytes>> {
        let mut incoming = lock(&self.incoming);

        while self.drop_incoming > 0 {
            if incoming.pop_front().is_none() {
                return Ok(None);
            }
            self.drop_incoming -= 1;
            log::trace!("dropped incoming datagram");
        }

        Ok(incoming.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_delivers_in_order() {
        let (mut a, mut b) = MemoryTransport::pair();

        a.send(&[1]).unwrap();
        a.send(&[2]).unwrap();
        b.send(&[9]).unwrap();

        assert_eq!(b.receive().unwrap().as_deref(), Some(&[1u8][..]));
        assert_eq!(b.receive().unwrap().as_deref(), Some(&[2u8][..]));
        assert!(b.receive().unwrap().is_none());
        assert_eq!(a.receive().unwrap().as_deref(), Some(&[9u8][..]));
    }

    #[test]
    fn test_drop_next_outgoing_still_records() {
        let (mut a, mut b) = MemoryTransport::pair();

        a.drop_next_outgoing();
        a.send(&[1]).unwrap();
        a.send(&[2]).unwrap();

        assert_eq!(a.sent().len(), 2);
        assert_eq!(b.receive().unwrap().as_deref(), Some(&[2u8][..]));
        assert!(b.receive().unwrap().is_none());
    }

    #[test]
    fn test_drop_next_incoming_waits_for_a_datagram() {
        let mut transport = MemoryTransport::new();

        transport.drop_next_incoming();
        assert!(transport.receive().unwrap().is_none());

        transport.push_incoming(vec![1u8]);
        transport.push_incoming(vec![2u8]);
        assert_eq!(transport.pending_incoming(), 2);
        assert_eq!(transport.receive().unwrap().as_deref(), Some(&[2u8][..]));
    }
}
