//! Recipe list browser: pages recipes in from a search API as the reader
//! scrolls, lets them edit titles or delete entries, and mirrors the list
//! into local storage after every change.

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod feed;
pub mod list;
pub mod pagination;
pub mod recipe;
pub mod scroll;
pub mod storage;
pub mod view;
