mod dispatcher;
mod error;
mod event_handlers;
mod remote_procedures;

pub use dispatcher::{Dispatcher, RawDataObserver};
pub use error::RpcError;
pub use event_handlers::{EventDispatcher, EventHandlers};
pub use remote_procedures::{FromArgs, RemoteProcedures, RpcTarget};
