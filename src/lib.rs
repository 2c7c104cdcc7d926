//! Grid snake simulation with a server-backed persistence layer.
//!
//! The engine ([`game`], [`snake`], [`food`], [`scheduler`]) is a discrete
//! state machine driven by an explicit tick clock and fully testable
//! without a rendering surface. The persistence side ([`api`], [`identity`],
//! [`recorder`], [`sync`]) reconciles local episode state with a remote
//! store from a background thread, so the simulation keeps ticking while
//! requests are in flight. The binary wires both to a ratatui terminal
//! frontend.

pub mod api;
pub mod config;
pub mod food;
pub mod game;
pub mod identity;
pub mod input;
pub mod recorder;
pub mod renderer;
pub mod scheduler;
pub mod score;
pub mod snake;
pub mod sync;
pub mod terminal_runtime;
pub mod ui;
