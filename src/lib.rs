//! Universal Login screen controllers and the cross-screen hand-off channel
//!
//! The identifier screen looks up the sign-in methods for what the user
//! typed and, for a passwordless choice, leaves a [`handoff::HandoffIntent`]
//! in tab storage. Whichever screen the flow engine shows next takes the
//! intent on first render and either switches connection or pre-fills its
//! identifier.

pub mod handoff;
pub mod methods;
pub mod model;
pub mod navigation;
pub mod screens;
pub mod sdk;

#[cfg(not(target_arch = "wasm32"))]
pub mod common;
#[cfg(not(target_arch = "wasm32"))]
pub mod http_client;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(test)]
pub(crate) mod testing;
