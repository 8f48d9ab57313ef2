//! Event queue between driver callbacks and the game thread.
//!
//! An unbounded MPSC FIFO: any number of notifier threads push, exactly
//! one consumer polls. Pushing never blocks and never fails while the
//! consumer lives; once the consumer is gone, pushes are silently
//! dropped, which is the accepted shutdown race.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::event::PadEvent;

/// Producer half of the event queue. Cheap to clone, one per callback.
#[derive(Clone)]
pub struct EventSender(Sender<PadEvent>);

/// Consumer half of the event queue. Owned by the game thread.
pub struct EventReceiver(Receiver<PadEvent>);

/// Create a connected sender/receiver pair.
pub fn event_queue() -> (EventSender, EventReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (EventSender(tx), EventReceiver(rx))
}

impl EventSender {
    /// Enqueue an event. Never blocks; dropped if the consumer is gone.
    pub fn push(&self, event: PadEvent) {
        if self.0.send(event).is_err() {
            tracing::debug!("dropping {:?} pushed after consumer shutdown", event);
        }
    }
}

impl EventReceiver {
    /// Dequeue the oldest pending event, if any. Never blocks.
    #[inline]
    pub fn try_pop(&self) -> Option<PadEvent> {
        match self.0.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Slot;
    use std::thread;

    fn pressed(n: u8) -> PadEvent {
        PadEvent::Pressed(Slot::new(n).unwrap())
    }

    #[test]
    fn test_fifo_ordering() {
        let (tx, rx) = event_queue();
        for n in 1..=16 {
            tx.push(pressed(n));
        }
        let popped: Vec<PadEvent> = std::iter::from_fn(|| rx.try_pop()).collect();
        let expected: Vec<PadEvent> = (1..=16).map(pressed).collect();
        assert_eq!(popped, expected);
    }

    #[test]
    fn test_try_pop_on_empty_queue() {
        let (_tx, rx) = event_queue();
        assert_eq!(rx.try_pop(), None);
    }

    #[test]
    fn test_repeated_events_are_not_coalesced() {
        let (tx, rx) = event_queue();
        for _ in 0..5 {
            tx.push(pressed(3));
        }
        let mut count = 0;
        while rx.try_pop().is_some() {
            count += 1;
        }
        assert_eq!(count, 5);
    }

    #[test]
    fn test_cloned_sender_feeds_same_queue() {
        let (tx, rx) = event_queue();
        let tx2 = tx.clone();
        tx.push(pressed(1));
        tx2.push(pressed(2));
        assert_eq!(rx.try_pop(), Some(pressed(1)));
        assert_eq!(rx.try_pop(), Some(pressed(2)));
    }

    #[test]
    fn test_push_after_consumer_drop_is_silent() {
        let (tx, rx) = event_queue();
        drop(rx);
        tx.push(pressed(4));
    }

    #[test]
    fn test_cross_thread_delivery() {
        let (tx, rx) = event_queue();
        let producer = thread::spawn(move || {
            for n in 1..=16 {
                tx.push(pressed(n));
            }
        });
        producer.join().unwrap();
        let popped: Vec<PadEvent> = std::iter::from_fn(|| rx.try_pop()).collect();
        assert_eq!(popped.len(), 16);
        assert_eq!(popped[0], pressed(1));
        assert_eq!(popped[15], pressed(16));
    }
}
