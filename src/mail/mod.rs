//! Mail collaborator: confirmation drafts and message search.

mod file_mailbox;
mod mailbox;
mod memory;

pub use file_mailbox::FileMailbox;
pub use mailbox::{Mailbox, MessageMetadata};
pub use memory::MemoryMailbox;
