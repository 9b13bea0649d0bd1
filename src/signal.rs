use std::{
    any::Any,
    borrow,
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use derive_where::derive_where;

use crate::{AutoTerminate, Connection, SignalState, Slot};

// === Signal === //

/// A broadcast point for events carrying a payload of type `A`.
///
/// Slots receive the payload by reference. Signals with several parameters use a tuple payload
/// and signals with none use `()`.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// use arid_signal::Signal;
///
/// let renamed = Signal::<(u32, String)>::new();
/// let log = Rc::new(RefCell::new(Vec::new()));
///
/// let conn = renamed.connect({
///     let log = log.clone();
///     move |(index, name)| log.borrow_mut().push(format!("{index}: {name}"))
/// });
///
/// renamed.emit((3, "x".to_string()));
/// conn.terminate();
/// renamed.emit((4, "y".to_string()));
///
/// assert_eq!(*log.borrow(), ["3: x"]);
/// ```
///
/// The signal exclusively owns its slots. Dropping the signal drops every slot and leaves all of
/// its [`Connection`]s terminated.
#[derive_where(Default)]
pub struct Signal<A: ?Sized + 'static> {
    state: Rc<RefCell<SignalState<A>>>,
}

impl<A: ?Sized + 'static> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slot_count", &self.slot_count())
            .field("is_emitting", &self.is_emitting())
            .finish()
    }
}

impl<A: ?Sized + 'static> Signal<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(SignalState::with_capacity(capacity))),
        }
    }

    fn connect_slot(&self, slot: Slot<A>) -> Connection {
        let id = self.state.borrow_mut().connect(slot);
        log::trace!("connected slot {id:?}");

        Connection::new(id, &self.state)
    }

    /// Appends `slot` to the signal. It runs after every slot connected before it.
    pub fn connect(&self, slot: impl 'static + Fn(&A)) -> Connection {
        self.connect_slot(Slot::new(Rc::new(slot)))
    }

    /// Connects `slot` and hands the connection to `owner`, which terminates it when the owner is
    /// dropped.
    ///
    /// Without an `owner`, nothing is connected and an inert connection is returned.
    pub fn connect_with<O>(&self, slot: impl 'static + Fn(&A), owner: Option<&O>) -> Connection
    where
        O: ?Sized + AutoTerminate,
    {
        let Some(owner) = owner else {
            return Connection::detached();
        };

        let connection = self.connect(slot);
        owner.auto_terminator().adopt(connection.clone());
        connection
    }

    /// Binds `method` to `owner` and connects the result, tying the connection's lifetime to the
    /// owner.
    ///
    /// The binding only keeps a weak reference to the owner. Dropping the owner drops its
    /// terminator, which removes the slot. Emissions made while the owner is mid-teardown skip
    /// the slot.
    pub fn connect_method<T>(
        &self,
        owner: &Rc<T>,
        method: impl 'static + Fn(&T, &A),
    ) -> Connection
    where
        T: 'static + AutoTerminate,
    {
        let weak = Rc::downgrade(owner);
        let erased: Weak<dyn Any> = weak.clone();

        let callback = move |args: &A| {
            if let Some(owner) = weak.upgrade() {
                method(&owner, args);
            }
        };

        let connection = self.connect_slot(Slot::bound(Rc::new(callback), erased));
        owner.auto_terminator().adopt(connection.clone());
        connection
    }

    /// Like [`Signal::connect_method`] but takes the owner by weak reference, returning an inert
    /// connection if the owner is already gone.
    pub fn connect_method_weak<T>(
        &self,
        owner: &Weak<T>,
        method: impl 'static + Fn(&T, &A),
    ) -> Connection
    where
        T: 'static + AutoTerminate,
    {
        match owner.upgrade() {
            Some(owner) => self.connect_method(&owner, method),
            None => Connection::detached(),
        }
    }

    /// Runs every active slot in the order they were connected.
    ///
    /// Slots may freely re-enter the signal. Slots connected during the emission are first run by
    /// the next emission and slots terminated before their turn are not run at all. Activation
    /// changes made before a slot's turn apply to the running emission.
    pub fn emit(&self, args: impl borrow::Borrow<A>) {
        let args: &A = borrow::Borrow::borrow(&args);
        SignalState::emit(&self.state, args);
    }

    /// The number of slots which have not been terminated, active or not.
    pub fn slot_count(&self) -> usize {
        self.state.borrow().slot_count()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }

    /// Returns `true` while an [`emit`](Signal::emit) of this signal is on the stack.
    pub fn is_emitting(&self) -> bool {
        self.state.borrow().is_emitting()
    }

    /// Terminates every slot.
    pub fn disconnect_all(&self) {
        let removed = self.state.borrow_mut().terminate_all();

        if !removed.is_empty() {
            log::debug!("disconnected {} slot(s)", removed.len());
        }

        // Dropped outside the borrow since slot closures may re-enter the signal.
        drop(removed);
    }
}
