//! MIME assembly of outgoing letters.
//!
//! A [`Letter`] accumulates recipients, a subject, a plain-text body and any
//! number of [`Attachment`]s, and builds them into a `multipart/mixed` wire
//! form separated by a [`Boundary`].
//!
//! ```
//! use courier_smtp::mime::{Attachment, Boundary, Letter};
//!
//! let letter = Letter::new("me@example.com", "Me", Boundary::generate());
//! letter.add_recipients(["you@example.com"]);
//! letter.add_attachments([Attachment::new("notes.txt", b"hello".to_vec())]);
//!
//! let wire = letter.build();
//! assert!(wire.ends_with(format!("--{}--\r\n", letter.boundary()).as_bytes()));
//! ```

mod attachment;
mod boundary;
pub mod encoding;
mod letter;

pub use attachment::{Attachment, AttachmentError};
pub use boundary::{BOUNDARY_BYTES, Boundary};
pub use letter::{BodyEncoding, Envelope, Letter};
