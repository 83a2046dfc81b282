//! Ordered buffer of complete received messages
//!
//! The receive loop is the only producer and the caller the only consumer.
//! Both ends wrap an unbounded crossbeam channel, so neither side locks.

use crate::error::{PollSockError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::trace;

/// Create a connected producer/consumer pair
pub fn delivery_queue() -> (QueueProducer, DeliveryQueue) {
    let (tx, rx) = unbounded();
    (QueueProducer { tx }, DeliveryQueue { rx })
}

/// Producer half, owned by the receive loop
#[derive(Debug, Clone)]
pub struct QueueProducer {
    tx: Sender<Vec<u8>>,
}

impl QueueProducer {
    /// Enqueue one fully reassembled message
    ///
    /// Returns false when the consumer half is gone.
    pub fn push(&self, message: Vec<u8>) -> bool {
        let len = message.len();
        match self.tx.send(message) {
            Ok(()) => {
                trace!(len, "Message enqueued");
                true
            }
            Err(_) => false,
        }
    }
}

/// Consumer half, read by the caller
#[derive(Debug)]
pub struct DeliveryQueue {
    rx: Receiver<Vec<u8>>,
}

impl DeliveryQueue {
    #[inline]
    pub fn has_unread(&self) -> bool {
        !self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Remove and return the oldest message
    pub fn pop(&self) -> Result<Vec<u8>> {
        match self.rx.try_recv() {
            Ok(message) => Ok(message),
            // A disconnected producer only means the loop finished;
            // try_recv still drains what it left behind first.
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                Err(PollSockError::QueueEmpty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_queue_is_empty() {
        let (_tx, queue) = delivery_queue();
        assert!(!queue.has_unread());
        assert!(matches!(queue.pop(), Err(PollSockError::QueueEmpty)));
    }

    #[test]
    fn test_fifo_order() {
        let (tx, queue) = delivery_queue();
        tx.push(vec![1]);
        tx.push(vec![2, 2]);
        tx.push(vec![3, 3, 3]);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap(), vec![1]);
        assert_eq!(queue.pop().unwrap(), vec![2, 2]);
        assert_eq!(queue.pop().unwrap(), vec![3, 3, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_readable_after_producer_dropped() {
        let (tx, queue) = delivery_queue();
        tx.push(b"last words".to_vec());
        drop(tx);

        assert!(queue.has_unread());
        assert_eq!(queue.pop().unwrap(), b"last words".to_vec());
        assert!(matches!(queue.pop(), Err(PollSockError::QueueEmpty)));
    }

    #[test]
    fn test_push_fails_without_consumer() {
        let (tx, queue) = delivery_queue();
        drop(queue);
        assert!(!tx.push(vec![0]));
    }

    #[test]
    fn test_concurrent_producer_keeps_order() {
        let (tx, queue) = delivery_queue();
        let producer = std::thread::spawn(move || {
            for i in 0..1000u32 {
                tx.push(i.to_le_bytes().to_vec());
            }
        });

        let mut next = 0u32;
        while next < 1000 {
            if let Ok(message) = queue.pop() {
                assert_eq!(message, next.to_le_bytes().to_vec());
                next += 1;
            }
        }
        producer.join().unwrap();
    }
}
