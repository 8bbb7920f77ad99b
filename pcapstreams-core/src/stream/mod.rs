//! Conversation reconstruction.
//!
//! - [`ConversationKey`] - directional `"src:port -> dst:port"` key
//! - [`ConversationIndex`] - shared map from key to packet records
//!
//! A conversation is the set of packets between two address/port endpoints
//! regardless of direction. Each packet is filed under both directional
//! keys, so looking up either direction yields the whole conversation.

mod index;
mod key;

pub use index::ConversationIndex;
pub use key::ConversationKey;
