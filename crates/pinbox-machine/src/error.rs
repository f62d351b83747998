/// Errors raised while constructing a [`PinInputMachine`](crate::PinInputMachine).
///
/// Events themselves never fail: out-of-range indices are absorbed. Only the
/// configuration can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    /// A PIN input needs at least one slot.
    #[error("pin input must have at least one slot")]
    NoSlots,
}
