//! Transition history adapter for waymark
//!
//! This crate binds a [`waymark_core::TransitionStore`] to one owner:
//! - TransitionHistory: create transitions, read the last one, list all
//! - CacheSlot: the per-adapter memory of the last transition
//! - Observers: no-op, closure-backed and recording implementations

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod history;
pub mod observer;

pub use cache::CacheSlot;
pub use history::TransitionHistory;
pub use observer::{
    observer_fn, FnObserver, NullObserver, ObservedTransition, Phase, RecordingObserver,
};
