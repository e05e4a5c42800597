// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Connected-client registry and fan-out.

use super::protocol::ServerEvent;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// Identifies one connected client for the lifetime of its socket.
pub type ClientId = Uuid;

/// Broker holding one outbound queue per connected client.
///
/// Delivery is best effort: events for a client whose socket has already
/// gone are dropped.
#[derive(Debug, Default)]
pub struct Hub {
    clients: Mutex<HashMap<ClientId, UnboundedSender<ServerEvent>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    fn clients(&self) -> MutexGuard<'_, HashMap<ClientId, UnboundedSender<ServerEvent>>> {
        // Senders stay valid even if a holder panicked.
        self.clients.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a client and return the queue its socket should drain.
    ///
    /// Subscribing an id twice replaces the earlier queue.
    pub fn subscribe(&self, client: ClientId) -> UnboundedReceiver<ServerEvent> {
        let (tx, rx) = unbounded_channel();
        self.clients().insert(client, tx);
        rx
    }

    pub fn unsubscribe(&self, client: ClientId) {
        self.clients().remove(&client);
    }

    pub fn client_count(&self) -> usize {
        self.clients().len()
    }

    /// Deliver to one client. Returns whether it was still connected.
    pub fn send_to(&self, client: ClientId, event: ServerEvent) -> bool {
        match self.clients().get(&client) {
            Some(tx) => deliver(client, tx, event),
            None => {
                log::debug!("Dropping {} for unknown client {}", event.name(), client);
                false
            }
        }
    }

    /// Deliver to every client except `sender`. Returns the number reached.
    pub fn broadcast_except(&self, sender: ClientId, event: ServerEvent) -> usize {
        self.clients()
            .iter()
            .filter(|(id, _)| **id != sender)
            .filter(|(id, tx)| deliver(**id, tx, event.clone()))
            .count()
    }

    /// Deliver to every client. Returns the number reached.
    pub fn broadcast_all(&self, event: ServerEvent) -> usize {
        self.clients()
            .iter()
            .filter(|(id, tx)| deliver(**id, tx, event.clone()))
            .count()
    }
}

fn deliver(client: ClientId, tx: &UnboundedSender<ServerEvent>, event: ServerEvent) -> bool {
    let name = event.name();
    match tx.send(event) {
        Ok(()) => true,
        Err(_) => {
            log::debug!("Client {} is gone, dropped {}", client, name);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::image::AnnotationSet;

    fn saved(filename: &str) -> ServerEvent {
        ServerEvent::Saved(AnnotationSet {
            filename: filename.to_string(),
            annotations: Vec::new(),
        })
    }

    #[test]
    fn test_broadcast_except_skips_sender() {
        let hub = Hub::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut rx_a = hub.subscribe(a);
        let mut rx_b = hub.subscribe(b);
        let mut rx_c = hub.subscribe(c);

        assert_eq!(hub.broadcast_except(a, saved("x.jpg")), 2);
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), saved("x.jpg"));
        assert_eq!(rx_c.try_recv().unwrap(), saved("x.jpg"));
    }

    #[test]
    fn test_broadcast_all_includes_everyone() {
        let hub = Hub::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut rx_a = hub.subscribe(a);
        let mut rx_b = hub.subscribe(b);

        assert_eq!(hub.broadcast_all(saved("x.jpg")), 2);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_unsubscribe_and_dropped_receivers() {
        let hub = Hub::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rx_a = hub.subscribe(a);
        let _rx_b = hub.subscribe(b);
        assert_eq!(hub.client_count(), 2);

        drop(rx_a);
        assert!(!hub.send_to(a, saved("x.jpg")));
        assert_eq!(hub.broadcast_all(saved("x.jpg")), 1);

        hub.unsubscribe(a);
        assert_eq!(hub.client_count(), 1);
        assert!(!hub.send_to(a, saved("x.jpg")));
    }

    #[test]
    fn test_events_arrive_in_order() {
        let hub = Hub::new();
        let a = Uuid::new_v4();
        let mut rx = hub.subscribe(a);
        hub.send_to(a, saved("1.jpg"));
        hub.send_to(a, saved("2.jpg"));
        assert_eq!(rx.try_recv().unwrap().filename(), Some("1.jpg"));
        assert_eq!(rx.try_recv().unwrap().filename(), Some("2.jpg"));
    }
}
