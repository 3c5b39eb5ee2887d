//! Shared-buffer sequence and text views.
//!
//! One memory model backs three kinds of values:
//!
//! - [`SeqView`]: a growable window `(offset, len, capacity)` into a
//!   reference-counted [`Buffer`]. Views are cheap headers; reslicing, cloning
//!   and in-place appends share the buffer, so writes through one view show up
//!   in every overlapping view.
//! - [`TextView`]: an immutable window into a *frozen* byte buffer. Text views
//!   are `Send + Sync` and decode as UTF-8 without ever failing (see
//!   [`utf8`]).
//! - [`FixedSeq`]: an inline array with value semantics.
//!
//! Appends return a new header. When the capacity is exhausted (or the buffer
//! is frozen) the elements move to a fresh buffer and the new header no longer
//! aliases the old one:
//!
//! ```rust
//! use bufview::{FrontRemoval, SeqView, TextView};
//!
//! let line = SeqView::<u8>::allocate(8).append(b"  key=value");
//! let line = line.remove_front(2, FrontRemoval::Compact).unwrap();
//! let text: TextView = line.freeze();
//! assert_eq!(text.substr(4, 9).unwrap(), "value");
//!
//! // The buffer is read-only now; growing copies.
//! let more = line.clone().append(b";");
//! assert!(!more.shares_buffer(&line));
//! assert_eq!(text, "key=value");
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod array;
mod buffer;
mod cast;
mod error;
mod grow;
mod options;
mod retain;
mod text;
pub mod utf8;
mod view;

#[cfg(any(test, feature = "serde"))]
mod serde_impls;

#[cfg(test)]
mod tests;

pub use array::FixedSeq;
pub use buffer::Buffer;
pub use cast::Plain;
pub use error::{AlignmentError, FrozenError, RangeError, ViewError};
pub use options::GrowthPolicy;
pub use retain::FrontRemoval;
pub use text::TextView;
pub use utf8::CodePoint;
pub use view::{Iter, SeqView};
