//! Terminal UI layer for interactive chat sessions.
//!
//! The UI module owns rendering, layout, keyboard handling, and loop control
//! for the text user interface.
//!
//! Key submodules:
//! - [`chat_loop`]: the main interaction loop that routes key events into
//!   [`crate::core::app`] and lands completion outcomes between frames.
//! - [`renderer`]: view composition and frame output.
//! - [`theme`]: color/style policy.
//!
//! Ownership boundary: this layer presents and captures interaction state,
//! while [`crate::core`] owns domain logic and backend coordination.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
