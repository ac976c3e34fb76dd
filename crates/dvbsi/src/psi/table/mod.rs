//! SIテーブルの定義。

mod eit;

pub use eit::*;
