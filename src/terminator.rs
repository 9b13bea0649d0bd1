use std::{cell::RefCell, fmt, mem, rc::Rc};

use crate::Connection;

// === AutoTerminate === //

/// Implemented by objects which own an [`AutoTerminator`] and may therefore be passed as the owner
/// of a connection.
///
/// ```
/// use arid_signal::{AutoTerminate, AutoTerminator, Signal};
///
/// #[derive(Default)]
/// struct Label {
///     terminator: AutoTerminator,
/// }
///
/// impl AutoTerminate for Label {
///     fn auto_terminator(&self) -> &AutoTerminator {
///         &self.terminator
///     }
/// }
///
/// let clicked = Signal::<()>::new();
/// let label = Label::default();
///
/// clicked.connect_with(|_| {}, Some(&label));
/// assert_eq!(clicked.slot_count(), 1);
///
/// drop(label);
/// assert_eq!(clicked.slot_count(), 0);
/// ```
pub trait AutoTerminate {
    fn auto_terminator(&self) -> &AutoTerminator;
}

impl AutoTerminate for AutoTerminator {
    fn auto_terminator(&self) -> &AutoTerminator {
        self
    }
}

impl<T: ?Sized + AutoTerminate> AutoTerminate for Rc<T> {
    fn auto_terminator(&self) -> &AutoTerminator {
        (**self).auto_terminator()
    }
}

impl<T: ?Sized + AutoTerminate> AutoTerminate for &T {
    fn auto_terminator(&self) -> &AutoTerminator {
        (**self).auto_terminator()
    }
}

// === AutoTerminator === //

/// A collection of [`Connection`]s which are all terminated when the collection is dropped.
///
/// Compose one into any object whose lifetime should bound the lifetime of its subscriptions.
/// The terminator owns the connections it collects but never the signals or slots behind them.
#[derive(Default)]
pub struct AutoTerminator {
    connections: RefCell<Vec<Connection>>,
}

impl fmt::Debug for AutoTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoTerminator")
            .field("connection_count", &self.connection_count())
            .finish()
    }
}

impl AutoTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes responsibility for terminating `connection`.
    ///
    /// Connections which were terminated by other means are forgotten here, so churning through
    /// short-lived connections does not grow the collection.
    pub fn adopt(&self, connection: Connection) {
        let mut connections = self.connections.borrow_mut();
        connections.retain(|held| !held.is_terminated());

        if !connection.is_terminated() {
            connections.push(connection);
        }
    }

    /// Terminates every collected connection and forgets about them.
    pub fn terminate_all(&self) {
        // Taken up front: terminating drops slot closures, which may adopt new connections into
        // this very terminator.
        let connections = mem::take(&mut *self.connections.borrow_mut());

        if !connections.is_empty() {
            log::debug!("terminating {} connection(s)", connections.len());
        }

        for connection in connections {
            connection.terminate();
        }
    }

    /// The number of connections collected since the last [`terminate_all`]. Connections
    /// terminated through other means are only forgotten on the next [`adopt`], so some of the
    /// counted connections may already be terminated.
    ///
    /// [`adopt`]: AutoTerminator::adopt
    /// [`terminate_all`]: AutoTerminator::terminate_all
    pub fn connection_count(&self) -> usize {
        self.connections.borrow().len()
    }
}

impl Drop for AutoTerminator {
    fn drop(&mut self) {
        self.terminate_all();
    }
}
