use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle returned by [`EventBus::subscribe`], used to detach a handler.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

enum Sink<E> {
    Handler(Box<dyn FnMut(&E)>),
    Inbox(Weak<RefCell<VecDeque<E>>>),
}

/// Single-threaded broadcast channel.
///
/// Delivery contract:
/// - Every subscriber sees every event published after it subscribed, exactly
///   once, in publish order.
/// - Nothing is replayed: events published before a subscription are never
///   seen by it.
/// - No filtering and no coalescing; subscribers ignore what they don't need.
///
/// Subscribers are either handlers, invoked synchronously inside `publish`, or
/// [`Inbox`]es, which queue events until their owner drains them. An inbox is
/// detached automatically once dropped.
pub struct EventBus<E> {
    next_id: u64,
    subscribers: Vec<(SubscriberId, Sink<E>)>,
    published: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
            published: 0,
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("published", &self.published)
            .finish()
    }
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&E) + 'static) -> SubscriberId {
        let id = self.allocate_id();
        self.subscribers.push((id, Sink::Handler(Box::new(handler))));
        id
    }

    /// Attach a queue-backed subscriber.
    pub fn inbox(&mut self) -> Inbox<E> {
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        let id = self.allocate_id();
        self.subscribers
            .push((id, Sink::Inbox(Rc::downgrade(&queue))));
        Inbox { queue }
    }

    /// Returns `true` if a subscriber was removed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver `event` to all current subscribers.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&mut self, event: E) -> usize {
        self.published += 1;
        let mut delivered = 0;
        self.subscribers.retain_mut(|(_, sink)| match sink {
            Sink::Handler(handler) => {
                handler(&event);
                delivered += 1;
                true
            }
            Sink::Inbox(weak) => match weak.upgrade() {
                Some(queue) => {
                    queue.borrow_mut().push_back(event.clone());
                    delivered += 1;
                    true
                }
                None => false,
            },
        });
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|(_, sink)| match sink {
                Sink::Handler(_) => true,
                Sink::Inbox(weak) => weak.strong_count() > 0,
            })
            .count()
    }

    /// Total number of events published over the bus's life.
    pub fn published(&self) -> u64 {
        self.published
    }

    fn allocate_id(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Receiving end of a queue-backed subscription.
pub struct Inbox<E> {
    queue: Rc<RefCell<VecDeque<E>>>,
}

impl<E> fmt::Debug for Inbox<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inbox")
            .field("pending", &self.queue.borrow().len())
            .finish()
    }
}

impl<E> Inbox<E> {
    pub fn try_recv(&self) -> Option<E> {
        self.queue.borrow_mut().pop_front()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<E> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}
