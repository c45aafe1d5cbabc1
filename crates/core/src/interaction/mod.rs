//! Chat-driven control of the hide pipeline.
//!
//! `InteractionController` turns chat updates into pipeline runs through an
//! explicit routing table. Per-user prompts live in an injected
//! `ConversationStore`; outbound messages go through a `ChatTransport`.

mod controller;
pub mod messages;
mod router;
mod state;
mod transport;
mod types;

pub use controller::{BotError, Context, Handler, InteractionController};
pub use router::{Route, Router};
pub use state::{ConversationStore, InMemoryConversationStore, StateTag};
pub use transport::{ChatTransport, TransportError};
pub use types::*;
