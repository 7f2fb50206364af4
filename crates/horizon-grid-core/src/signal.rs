//! Signal/slot notifications for Horizon Grid.
//!
//! Views use signals to tell the rendering layer that their row projection
//! changed. A slot is either invoked directly during [`Signal::emit`], or
//! posted to a [`SharedTaskQueue`] so that it runs on the host's next turn.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//! - [`ConnectionType`] - Whether a slot runs now or on the next turn
//!
//! # Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let rows_changed = Signal::<usize>::new();
//!
//! let conn_id = rows_changed.connect(|count| {
//!     println!("Projection now has {} rows", count);
//! });
//!
//! rows_changed.emit(42);
//! rows_changed.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;
use crate::task::SharedTaskQueue;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

/// Specifies how a connected slot is invoked when the signal is emitted.
#[derive(Clone, Default)]
pub enum ConnectionType {
    /// Invoke the slot immediately, inside `emit`.
    #[default]
    Direct,

    /// Post the slot invocation to a task queue.
    ///
    /// The slot runs when the host drains the queue, after the update batch
    /// that emitted the signal has completed.
    Deferred(Arc<SharedTaskQueue>),
}

impl std::fmt::Debug for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "Direct"),
            Self::Deferred(_) => write!(f, "Deferred"),
        }
    }
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

struct Connection<Args> {
    slot: Slot<Args>,
    connection_type: ConnectionType,
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments.
///
/// Slots are invoked with the connection lock released, so a slot may connect,
/// disconnect or emit on the same signal without deadlocking.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    blocked: AtomicBool,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot that is invoked directly on emission.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_with_type(slot, ConnectionType::Direct)
    }

    /// Connect a slot whose invocation is posted to `queue`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use horizon_grid_core::{Signal, SharedTaskQueue};
    ///
    /// let queue = Arc::new(SharedTaskQueue::new());
    /// let signal = Signal::<i32>::new();
    /// signal.connect_deferred(queue.clone(), |n| println!("{}", n));
    ///
    /// signal.emit(7);
    /// assert_eq!(queue.pending_count(), 1);
    /// queue.process_all();
    /// ```
    pub fn connect_deferred<F>(&self, queue: Arc<SharedTaskQueue>, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_with_type(slot, ConnectionType::Deferred(queue))
    }

    /// Connect a slot with a specific connection type.
    pub fn connect_with_type<F>(&self, slot: F, connection_type: ConnectionType) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
            connection_type,
        })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking or posting all connected slots.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let snapshot: Vec<(Slot<Args>, ConnectionType)> = self
            .connections
            .lock()
            .values()
            .map(|conn| (conn.slot.clone(), conn.connection_type.clone()))
            .collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        for (slot, connection_type) in snapshot {
            match connection_type {
                ConnectionType::Direct => slot(&args),
                ConnectionType::Deferred(queue) => {
                    let args = args.clone();
                    queue.post(move || slot(&args));
                }
            }
        }
    }
}
