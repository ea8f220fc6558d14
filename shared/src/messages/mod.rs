mod lock_step_message;
mod network_data;

pub use lock_step_message::LockStepMessage;
pub use network_data::{DomainEvent, NetworkData, RawData, RemoteCall};
