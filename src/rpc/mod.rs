//! Remote call boundary between the gateway and the credential backend:
//! JSON bodies POSTed to `/auth.Auth/<Method>`.

mod client;
mod recovery;
mod server;
mod wire;

pub use client::*;
pub use recovery::*;
pub use server::routes;
pub use wire::*;
