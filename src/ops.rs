//! Operators.
//!
//! Every operator is an inherent method of [`Observable`] returning a new
//! observable; the receiver is left untouched. Each stage subscribes
//! upstream with its own [`Subscriber`] chained under the downstream one,
//! so completing or disposing downstream tears down the stages above it.
//!
//! [`Observable`]: crate::observable::Observable
//! [`Subscriber`]: crate::subscriber::Subscriber

mod combine_latest;
mod combine_sources;
mod concat;
mod debounce;
mod distinct_until_changed;
mod element_at;
mod filter;
mod map;
mod merge_all;
mod observe_on;
mod sample;
mod scan;
mod skip;
#[cfg(feature = "stream")]
mod stream;
mod switch_on_next;
mod take;
mod take_last;
mod take_until;
mod take_while;
mod with_latest_from;
mod zip;

pub use combine_sources::{CombineSources, TupleAppend};
#[cfg(feature = "stream")]
pub use stream::ObservableStream;
