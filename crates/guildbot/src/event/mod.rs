// Event dispatch
//
// Callbacks are registered once per event category into a HandlerSet, which
// also works out the intents the client must identify with. Received frames
// are then routed through the Dispatcher trait.

pub mod dispatch;
pub mod error;
pub mod handler;

pub use dispatch::{parse_data, Dispatcher};
pub use error::EventError;
pub use handler::{
    EventCallback, EventHandler, ErrorNotifyHandler, HandlerKind, HandlerResult, HandlerSet,
    PlainEventHandler, ReadyHandler,
};
