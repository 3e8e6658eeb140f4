//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "seastream";

/// Placeholder token used until the caller supplies a real one.
pub const DEFAULT_TOKEN: &str = "<TOKEN>";

/// Interval between heartbeat ticks in seconds.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Wait between connect attempts in seconds.
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 5;

/// Maximum number of connect attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Stream endpoints per network.
pub mod endpoints {
    /// Production feed.
    pub const MAINNET: &str = "wss://stream.openseabeta.com/socket/websocket";
    /// Test network feed.
    pub const TESTNET: &str = "wss://testnets-stream.openseabeta.com/socket/websocket";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_secure_websockets() {
        assert!(endpoints::MAINNET.starts_with("wss://"));
        assert!(endpoints::TESTNET.starts_with("wss://"));
        assert_ne!(endpoints::MAINNET, endpoints::TESTNET);
    }
}
