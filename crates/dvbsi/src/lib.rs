//! DVB（ETSI EN 300 468）のSI記述子を読み込み、EPGを組み立てるためのクレート。

#![deny(missing_docs)]

pub mod classify;
pub mod cursor;
pub mod epg;
pub mod lang;
pub mod psi;
pub mod text;
pub mod time;
mod utils;

pub use cursor::{ByteCursor, ReadError};
pub use epg::{Assembler, DecodeError, EpgEvent, EventKey};
pub use text::{DvbStr, DvbString};
