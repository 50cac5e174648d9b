//! Core math modules.

pub mod stable;
