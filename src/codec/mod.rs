//! Low-level binary helpers shared by the wire codecs

mod bcs;
mod cursor;

pub(crate) use bcs::BcsWriter;
pub(crate) use cursor::{AtField, Cursor};
