//! UI widgets for the chat app.

pub mod attach;
