//! Core types and traits for the Ripple hardware simulator.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! fundamental abstractions used throughout the Ripple workspace:
//! typed IDs, the [`NetSet`] bitset, the frozen [`NetModel`], shared
//! error types, and the net access traits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod net;
pub mod net_set;
pub mod traits;

pub use error::{ActionError, ElaborationError};
pub use id::{mask_to_width, ActionId, NetId, SignalId, TickId, Value, MAX_WIDTH};
pub use net::{Net, NetModel, NetModelBuilder, Signal};
pub use net_set::{NetSet, NetSetIter};
pub use traits::{NetReader, NetWriter};
