/// An event tagged with its emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequenced<E> {
    pub seq: u64,
    pub event: E,
}

/// Ordered outbox for events raised while handling engine or user input.
///
/// Producers push, the host drains once per input turn. Sequence numbers keep
/// increasing across drains so logs can be correlated.
#[derive(Debug)]
pub struct EventBus<E> {
    next_seq: u64,
    events: Vec<Sequenced<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            events: Vec::new(),
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: E) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Sequenced { seq, event });
        seq
    }

    pub fn events(&self) -> &[Sequenced<E>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
            .into_iter()
            .map(|s| s.event)
            .collect()
    }
}
