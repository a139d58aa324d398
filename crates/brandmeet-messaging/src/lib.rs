// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-app messaging: conversation aggregation over the flat `messages`
//! table and the stateful view behind the messages screen.

pub mod conversations;
pub mod view;

pub use conversations::fetch_conversations;
pub use view::{MessagesView, send_message, send_message_to_profile};
