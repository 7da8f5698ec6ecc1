//! OAuth token lifecycle: acquisition, persistence, refresh and revocation.

pub mod flows;
pub mod manager;
pub mod store;
pub mod token;
