use thiserror::Error;

/// Why a connection was refused.
///
/// Only recoverable refusals are reported this way. Addressing a slot the
/// consumer does not have panics instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("no free input slot (maximum inputs {maximum_inputs})")]
    NoFreeSlot { maximum_inputs: usize },
}
