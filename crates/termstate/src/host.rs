/// Outbound side of the emulator: everything the VTE needs from the
/// embedding application. One object bundles the write-back channel and the
/// rarely-used notifications.
///
/// All calls happen synchronously from inside [`crate::Vte::input`] or
/// [`crate::Vte::handle_keyboard`]; implementations must not call back into
/// the VTE.
pub trait TerminalHost: Send {
    /// Bytes to deliver to the child process (DA/DSR replies, encoded key
    /// presses, local echo is handled before this is called).
    fn write(&mut self, bytes: &[u8]);

    /// BEL received.
    fn bell(&mut self) {}

    /// A complete OSC string was received. The payload is the raw bytes
    /// between the introducer and the terminator, truncated to the OSC
    /// buffer size. Interpretation (window title, palette programming, ...)
    /// is up to the host.
    fn osc(&mut self, _payload: &[u8]) {}
}
