//! Terminal state machine.
//!
//! `termstate` turns the byte stream of a child process into structured
//! mutations of an abstract screen and encodes keyboard events into the byte
//! stream going the other way. It covers the VT102 command set plus the
//! later additions that curses applications, editors and shells actually
//! use. The cell store itself is not part of this crate; embedders provide
//! one through the [`Screen`] trait and receive responses through
//! [`TerminalHost`].
//!
//! Useful references:
//! <https://vt100.net/emu/dec_ansi_parser>
//! <https://invisible-island.net/xterm/ctlseqs/ctlseqs.html>
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::too_many_lines,
    clippy::cast_lossless,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::return_self_not_must_use,
    clippy::match_same_arms
)]

mod attribute;
pub use attribute::*;

mod color;
pub use color::*;

mod palette;
pub use palette::*;

mod charset;
pub use charset::*;

mod error;
pub use error::*;

mod host;
pub use host::*;

mod screen;
pub use screen::*;

mod utf8;
pub use utf8::*;

mod vte;
pub use vte::*;

pub type EngineResult<T> = anyhow::Result<T>;
