//! Multi-widget integration flows.

#[cfg(test)]
mod fixtures;

pub mod channel_flows;
pub mod map_flows;
