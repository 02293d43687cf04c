//! Message helpers.
//!
//! - `dispatch` - chunked sends that degrade on missing permissions
//! - `response` - interaction responses with followup and channel fallbacks
//! - `reply` - prompting for replies, fetching and deleting messages

mod dispatch;
mod reply;
mod response;

pub use dispatch::{MAX_LENGTH, SendOutcome, attempt, send_message, send_message_with_files, split_content};
pub use reply::{
    REPLY_TIMEOUT, ReplyOutcome, await_message, await_message_or_cancel, delete_message,
    fetch_message_or_none,
};
pub use response::send_response;
