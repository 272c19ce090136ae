mod message;
mod retained;

pub use message::RetainedMessage;
pub use retained::RetainedMessageStore;
