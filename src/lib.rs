//! This crate provides a way to manage a to-do list, along with local deadlines.
//!
//! Tasks are owned by a remote todo API, that is reached by the [`Client`](client::Client) of the [`client`] module.
//!
//! The remote API knows nothing about deadlines. These are kept locally, in a [`DeadlineIndex`](deadlines::DeadlineIndex)
//! that maps calendar dates to task IDs, and that is persisted in a [`KeyValueStore`](traits::KeyValueStore) (see the [`store`] module).
//!
//! A [`Board`] combines both, and is what a user interface usually talks to. \
//! This crate also provides the color [`theme`]s of such an interface, a daily [`streak`] mini-game,
//! and a [`view`] state reducer.

pub mod traits;

mod task;
pub use task::{NewTask, Task, TaskChanges, TaskId, TaskStatus};
pub mod deadlines;
pub use deadlines::{DeadlineIndex, DeadlineMap};
pub mod board;
pub use board::Board;

pub mod client;
pub mod store;
pub mod mock_behaviour;
pub mod mock_source;

pub mod theme;
pub mod streak;
pub mod view;

pub mod config;
pub mod utils;
