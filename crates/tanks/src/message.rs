//! Point-to-point messaging between entities.
//!
//! Each receiver owns a FIFO inbox. Messages stay queued until the receiver
//! fetches them; there is no multicast, senders loop over their recipients.

use hecs::Entity;
use std::collections::{HashMap, VecDeque};

/// Sender id used for orders issued by the simulation itself (Start/Stop).
pub const SYSTEM_SENDER: Entity = Entity::DANGLING;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Begin patrolling.
    Start,
    /// Stand down.
    Stop,
    /// The sender's shell struck the receiver.
    Hit,
    /// The sender is under attack and wants teammates to engage.
    Help,
    /// The sender is an ammo crate resting on the ground.
    AmmoAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub from: Entity,
}

impl Message {
    pub fn new(kind: MessageKind, from: Entity) -> Self {
        Self { kind, from }
    }
}

/// Per-receiver message queues.
#[derive(Debug, Default)]
pub struct Messenger {
    inboxes: HashMap<Entity, VecDeque<Message>>,
    sent: u64,
}

impl Messenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for `to`. Fire-and-forget.
    pub fn send(&mut self, to: Entity, message: Message) {
        log::trace!("{:?} -> {:?}: {:?}", message.from, to, message.kind);
        self.inboxes.entry(to).or_default().push_back(message);
        self.sent += 1;
    }

    /// Take the oldest pending message for `id`.
    pub fn fetch(&mut self, id: Entity) -> Option<Message> {
        let inbox = self.inboxes.get_mut(&id)?;
        let message = inbox.pop_front();
        if inbox.is_empty() {
            self.inboxes.remove(&id);
        }
        message
    }

    pub fn pending(&self, id: Entity) -> usize {
        self.inboxes.get(&id).map_or(0, VecDeque::len)
    }

    /// Drop everything queued for an entity that no longer exists.
    pub fn discard(&mut self, id: Entity) {
        if let Some(inbox) = self.inboxes.remove(&id) {
            if !inbox.is_empty() {
                log::trace!("Dropped {} undelivered messages for {:?}", inbox.len(), id);
            }
        }
    }

    /// Total messages sent since creation.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn delivery_is_fifo_per_receiver() {
        let mut world = World::new();
        let a = world.spawn(());
        let b = world.spawn(());
        let mut messenger = Messenger::new();
        messenger.send(a, Message::new(MessageKind::Start, b));
        messenger.send(a, Message::new(MessageKind::Hit, b));
        messenger.send(b, Message::new(MessageKind::Help, a));

        assert_eq!(messenger.fetch(a).map(|m| m.kind), Some(MessageKind::Start));
        assert_eq!(messenger.fetch(a).map(|m| m.kind), Some(MessageKind::Hit));
        assert_eq!(messenger.fetch(a), None);
        assert_eq!(messenger.pending(b), 1);
        assert_eq!(messenger.sent_count(), 3);
    }

    #[test]
    fn discard_drops_pending_messages() {
        let mut world = World::new();
        let a = world.spawn(());
        let mut messenger = Messenger::new();
        messenger.send(a, Message::new(MessageKind::AmmoAvailable, SYSTEM_SENDER));
        messenger.discard(a);
        assert_eq!(messenger.fetch(a), None);
    }
}
