//! # Boxworks
//!
//! Boxworks is an implementation of the typesetting engine inside TeX.
//! It is independent of the TeX language:
//!     an interpreter drives a [Typesetter] with commands like "add this letter"
//!     or "end the paragraph",
//!     and the typesetter builds boxes and hands finished material to a
//!     [page builder](page::PageBuilder).
//!
//! The engine is organized the way TeX's is.
//! In every mode a [list maker](listmaker) builds the current list.
//! List makers live on a [stack](Manager);
//!     entering a box or a formula pushes a new one
//!     and leaving it pops the list maker and adds its result to the one below.
//! Paragraphs are broken into lines by a [greedy line breaker](linebreak).
//!
//! Font metrics come from an implementation of [font::Metrics]
//!     and parameters like `\hsize` from [Parameters].

pub mod error;
pub mod linebreak;
pub mod listmaker;
pub mod math;
pub mod node;
pub mod page;
pub mod params;
pub mod show;
mod stack;
pub mod typesetter;

pub use error::Error;
pub use listmaker::{ListMaker, Locator, Mode};
pub use params::{ParagraphShape, Parameters};
pub use stack::Manager;
pub use typesetter::Typesetter;
