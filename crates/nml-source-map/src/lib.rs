//! Source buffers and position tracking for NML
//!
//! Every parse (and every recursive sub-parse) runs over a [`Buffer`]: a
//! named piece of text that remembers where it came from. Nested buffers
//! carry the names of all the buffers that produced them together with the
//! line and column at which their content started in the parent, so a
//! position inside a list entry or a figure description can still be
//! reported against the file the user actually wrote.
//!
//! # Example
//!
//! ```rust
//! use nml_source_map::Buffer;
//!
//! let root = Buffer::new("doc.nml", "intro\n- first entry\n");
//! let entry = root.nested_at("[list entry]", "first entry\n", 8);
//!
//! assert_eq!(entry.ancestors(), ["doc.nml".to_string()]);
//! let loc = entry.location(6);
//! assert_eq!((loc.row, loc.column), (1, 8));
//! ```

pub mod buffer;
pub mod file_info;
pub mod types;

pub use buffer::{Buffer, Origin};
pub use file_info::FileInformation;
pub use types::{Location, Range};
