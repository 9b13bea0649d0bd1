use std::{
    cell::RefCell,
    fmt, mem,
    ops::Deref,
    rc::{Rc, Weak},
};

use crate::{ErasedSignal, SignalState, SlotId};

// === ConnectionError === //

/// The reason a [`Connection`] operation had nothing to act upon.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, thiserror::Error)]
pub enum ConnectionError {
    #[error("connection was never attached to a signal")]
    Detached,
    #[error("the signal owning the slot has been dropped")]
    SignalDropped,
    #[error("the slot has been terminated")]
    Terminated,
}

// === ConnectionState === //

/// The lifecycle of a [`Connection`]. `Terminated` is final.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq)]
pub enum ConnectionState {
    /// The slot is connected and runs whenever the signal is emitted.
    Active,
    /// The slot is connected but skipped by emissions until it is reactivated.
    Inactive,
    /// The slot is gone for good, either explicitly or because its signal was dropped.
    Terminated,
}

// === Connection === //

/// An observer of a single slot registration.
///
/// A `Connection` never keeps its slot or its signal alive. Every operation on it checks that both
/// are still around and quietly does nothing otherwise, making it safe to hold onto a connection
/// past the lifetime of either party. Once [terminated](Connection::is_terminated), a connection
/// stays terminated forever.
///
/// Cloning a connection yields another observer of the same slot.
#[derive(Clone)]
pub struct Connection {
    slot: Option<SlotId>,
    signal: Weak<dyn ErasedSignal>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("slot", &self.slot)
            .field("state", &self.state())
            .finish()
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::detached()
    }
}

impl Eq for Connection {}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && Weak::ptr_eq(&self.signal, &other.signal)
    }
}

impl Connection {
    pub(crate) fn new<A: ?Sized + 'static>(
        slot: SlotId,
        signal: &Rc<RefCell<SignalState<A>>>,
    ) -> Self {
        let signal: Weak<RefCell<SignalState<A>>> = Rc::downgrade(signal);
        let signal: Weak<dyn ErasedSignal> = signal;

        Self {
            slot: Some(slot),
            signal,
        }
    }

    /// Creates an inert connection which behaves as if it had already been terminated.
    pub fn detached() -> Self {
        Self {
            slot: None,
            signal: Weak::<RefCell<SignalState<()>>>::new(),
        }
    }

    fn resolve(&self) -> Result<(SlotId, Rc<dyn ErasedSignal>), ConnectionError> {
        let slot = self.slot.ok_or(ConnectionError::Detached)?;
        let signal = self
            .signal
            .upgrade()
            .ok_or(ConnectionError::SignalDropped)?;

        Ok((slot, signal))
    }

    /// The identity of the observed slot, or `None` for a [detached](Connection::detached)
    /// connection. The identity outlives the slot itself.
    pub fn id(&self) -> Option<SlotId> {
        self.slot
    }

    /// Removes the slot from its signal. Calling this on a connection whose slot or signal is
    /// already gone does nothing.
    pub fn terminate(&self) {
        if let Ok((slot, signal)) = self.resolve() {
            signal.terminate(slot);
        }
    }

    /// Returns `true` once the slot has been removed from its signal or the signal itself has been
    /// dropped.
    pub fn is_terminated(&self) -> bool {
        match self.resolve() {
            Ok((slot, signal)) => !signal.contains(slot),
            Err(_) => true,
        }
    }

    /// Toggles whether the slot runs on emission without disconnecting it. This is a no-op on
    /// terminated connections; use [`Connection::try_activate`] to learn whether it happened.
    pub fn activate(&self, active: bool) {
        _ = self.try_activate(active);
    }

    pub fn try_activate(&self, active: bool) -> Result<(), ConnectionError> {
        let (slot, signal) = self.resolve()?;

        if signal.set_active(slot, active) {
            Ok(())
        } else {
            Err(ConnectionError::Terminated)
        }
    }

    /// Returns whether the slot will run on the next emission. Terminated connections are never
    /// active.
    pub fn is_active(&self) -> bool {
        self.state() == ConnectionState::Active
    }

    pub fn state(&self) -> ConnectionState {
        let Ok((slot, signal)) = self.resolve() else {
            return ConnectionState::Terminated;
        };

        match signal.is_active(slot) {
            Some(true) => ConnectionState::Active,
            Some(false) => ConnectionState::Inactive,
            None => ConnectionState::Terminated,
        }
    }

    /// Wraps the connection in a guard which terminates it when dropped.
    pub fn scoped(self) -> ScopedConnection {
        ScopedConnection(self)
    }
}

// === ScopedConnection === //

/// A [`Connection`] which is [terminated](Connection::terminate) when the guard goes out of scope.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct ScopedConnection(Connection);

impl From<Connection> for ScopedConnection {
    fn from(connection: Connection) -> Self {
        Self(connection)
    }
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ScopedConnection {
    /// Disarms the guard, handing back a connection which stays connected after the guard is
    /// gone.
    pub fn release(mut self) -> Connection {
        mem::take(&mut self.0)
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        self.0.terminate();
    }
}
