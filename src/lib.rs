//! Single-threaded signals and slots which survive any teardown order.
//!
//! A [`Signal`] broadcasts a payload to every slot connected to it. Each call to
//! [`Signal::connect`] returns a [`Connection`], a handle which can suspend, resume, or remove that
//! one slot.
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//!
//! use arid_signal::Signal;
//!
//! let focused = Signal::<()>::new();
//! let count = Rc::new(Cell::new(0));
//!
//! let conn = focused.connect({
//!     let count = count.clone();
//!     move |_| count.set(count.get() + 1)
//! });
//!
//! focused.emit(());
//! conn.activate(false);
//! focused.emit(());
//! conn.activate(true);
//! focused.emit(());
//!
//! assert_eq!(count.get(), 2);
//! ```
//!
//! # Teardown
//!
//! Connections never keep anything alive. A slot is identified by a generational [`SlotId`] and
//! its signal is observed through a weak reference, so a connection outliving its signal (or a
//! slot removed and its storage reused) turns every operation into a harmless no-op. Once
//! [`Connection::is_terminated`] returns `true`, it keeps doing so.
//!
//! Objects which should drop their subscriptions when they die compose an [`AutoTerminator`] and
//! implement [`AutoTerminate`]. Connections created through [`Signal::connect_with`] or
//! [`Signal::connect_method`] are collected by the owner's terminator and terminated when it is
//! dropped, whichever of the signal and the owner goes first.
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//!
//! use arid_signal::{AutoTerminate, AutoTerminator, Signal};
//!
//! #[derive(Default)]
//! struct Widget {
//!     terminator: AutoTerminator,
//!     name: RefCell<String>,
//! }
//!
//! impl AutoTerminate for Widget {
//!     fn auto_terminator(&self) -> &AutoTerminator {
//!         &self.terminator
//!     }
//! }
//!
//! impl Widget {
//!     fn rename(&self, name: &str) {
//!         *self.name.borrow_mut() = name.to_string();
//!     }
//! }
//!
//! let renamed = Signal::<str>::new();
//! let widget = Rc::new(Widget::default());
//!
//! let conn = renamed.connect_method(&widget, Widget::rename);
//! renamed.emit("listbox");
//! assert_eq!(*widget.name.borrow(), "listbox");
//!
//! drop(widget);
//! assert!(conn.is_terminated());
//! assert_eq!(renamed.slot_count(), 0);
//! ```
//!
//! # Reentrancy
//!
//! Slots may connect, terminate, activate, and emit on the signal currently running them. An
//! emission visits the slots connected when it started, in connection order, and skips any of them
//! terminated before its turn.
//!
//! Nothing here is thread-safe. Signals, connections and terminators are `!Send` and `!Sync`.

mod connection;
pub use self::connection::*;

mod signal;
pub use self::signal::*;

mod state;
pub use self::state::SlotId;
pub(crate) use self::state::{ErasedSignal, SignalState, Slot};

mod terminator;
pub use self::terminator::*;
