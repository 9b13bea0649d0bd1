use std::{
    any::Any,
    cell::RefCell,
    fmt, mem,
    rc::{Rc, Weak},
};

use thunderdome::{Arena, Index};

// === SlotId === //

/// The identity of a single slot registration.
///
/// A `SlotId` pairs the slot's position in its signal's arena with the generation the position had
/// when the slot was connected. Positions are reused once a slot is terminated but generations are
/// not, so a stale `SlotId` never aliases a newer registration.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SlotId(pub(crate) Index);

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId[{}, {:#x}]", self.0.slot(), self.0.to_bits())
    }
}

impl SlotId {
    /// Fetches the arena position of the slot. Positions may be shared by terminated and live
    /// slots; compare entire `SlotId`s to test identity.
    pub fn slot(self) -> u32 {
        self.0.slot()
    }
}

// === Slot === //

pub(crate) type Callback<A> = Rc<dyn Fn(&A)>;

pub(crate) struct Slot<A: ?Sized> {
    callback: Callback<A>,
    /// Only bound methods can go empty: their owner may die while the slot stays connected.
    owner: Option<Weak<dyn Any>>,
    active: bool,
}

impl<A: ?Sized> Slot<A> {
    pub fn new(callback: Callback<A>) -> Self {
        Self {
            callback,
            owner: None,
            active: true,
        }
    }

    pub fn bound(callback: Callback<A>, owner: Weak<dyn Any>) -> Self {
        Self {
            callback,
            owner: Some(owner),
            active: true,
        }
    }

    fn is_empty(&self) -> bool {
        self.owner
            .as_ref()
            .is_some_and(|owner| owner.strong_count() == 0)
    }

    fn is_invocable(&self) -> bool {
        self.active && !self.is_empty()
    }
}

// === SignalState === //

/// Slot storage for a single signal.
///
/// Slots live in a generational arena so their identity is stable regardless of what else is
/// connected or terminated. `order` records connection order, which is also emission order.
pub(crate) struct SignalState<A: ?Sized> {
    slots: Arena<Slot<A>>,
    order: Vec<Index>,
    emit_depth: u32,
}

impl<A: ?Sized> Default for SignalState<A> {
    fn default() -> Self {
        Self {
            slots: Arena::new(),
            order: Vec::new(),
            emit_depth: 0,
        }
    }
}

impl<A: ?Sized> fmt::Debug for SignalState<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalState")
            .field("slot_count", &self.slots.len())
            .field("emit_depth", &self.emit_depth)
            .finish_non_exhaustive()
    }
}

impl<A: ?Sized> SignalState<A> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Arena::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            emit_depth: 0,
        }
    }

    pub fn connect(&mut self, slot: Slot<A>) -> SlotId {
        let index = self.slots.insert(slot);
        self.order.push(index);

        SlotId(index)
    }

    /// Removes the slot and hands it back so the caller can drop it outside of any borrow.
    #[must_use]
    pub fn terminate(&mut self, id: SlotId) -> Option<Slot<A>> {
        let slot = self.slots.remove(id.0)?;
        self.order.retain(|&index| index != id.0);

        Some(slot)
    }

    /// Removes every slot. Each removal goes through the arena so generations keep advancing.
    #[must_use]
    pub fn terminate_all(&mut self) -> Vec<Slot<A>> {
        mem::take(&mut self.order)
            .into_iter()
            .filter_map(|index| self.slots.remove(index))
            .collect()
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.slots.contains(id.0)
    }

    pub fn is_active(&self, id: SlotId) -> Option<bool> {
        self.slots.get(id.0).map(|slot| slot.active)
    }

    pub fn set_active(&mut self, id: SlotId, active: bool) -> bool {
        match self.slots.get_mut(id.0) {
            Some(slot) => {
                slot.active = active;
                true
            }
            None => false,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_emitting(&self) -> bool {
        self.emit_depth > 0
    }

    /// Invokes every active, non-empty slot in connection order.
    ///
    /// No borrow of `cell` is held while a slot runs, so slots may connect, terminate, activate or
    /// emit on the same signal. The pass walks a snapshot of the order taken up front: slots
    /// connected mid-pass wait for the next emit, and slots terminated mid-pass fail their
    /// generation check before their turn comes. The active flag is likewise read at each slot's
    /// turn, so toggling a later slot mid-pass takes effect in the same pass.
    pub fn emit(cell: &RefCell<Self>, args: &A) {
        let snapshot = {
            let mut state = cell.borrow_mut();
            state.emit_depth += 1;
            state.order.clone()
        };

        let _depth = scopeguard::guard((), |()| cell.borrow_mut().emit_depth -= 1);

        log::trace!("emitting to {} slot(s)", snapshot.len());

        for index in snapshot {
            let callback = {
                let state = cell.borrow();
                match state.slots.get(index) {
                    Some(slot) if slot.is_invocable() => slot.callback.clone(),
                    _ => continue,
                }
            };

            callback(args);
        }
    }
}

// === ErasedSignal === //

/// The payload-independent view of a signal that [`Connection`](crate::Connection)s hold onto.
pub(crate) trait ErasedSignal {
    fn terminate(&self, id: SlotId);

    fn contains(&self, id: SlotId) -> bool;

    fn is_active(&self, id: SlotId) -> Option<bool>;

    fn set_active(&self, id: SlotId, active: bool) -> bool;
}

impl<A: ?Sized + 'static> ErasedSignal for RefCell<SignalState<A>> {
    fn terminate(&self, id: SlotId) {
        let removed = self.borrow_mut().terminate(id);

        if removed.is_some() {
            log::trace!("terminated slot {id:?}");
        }

        // The slot's closure may own values whose destructors re-enter this signal.
        drop(removed);
    }

    fn contains(&self, id: SlotId) -> bool {
        self.borrow().contains(id)
    }

    fn is_active(&self, id: SlotId) -> Option<bool> {
        self.borrow().is_active(id)
    }

    fn set_active(&self, id: SlotId, active: bool) -> bool {
        self.borrow_mut().set_active(id, active)
    }
}
