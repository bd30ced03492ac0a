//! Parser configuration.
//!
//! [`ParserConfig`] is plain data that deserialises from whatever format the
//! host application uses for its settings. Accepted `NAD`/`PCB` values are
//! protocol constants and are not configurable.

use serde::Deserialize;

use crate::{frame::MAX_PACKET_LEN, tlv::NESTED_TAGS};

/// Settings consumed by [`FrameParser::with_config`](crate::FrameParser::with_config).
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Port the parser is bound to; enables per-port error counting.
    pub port: Option<String>,
    /// Tags whose values are decoded into child records.
    pub nested_tags: Vec<u32>,
    /// Largest `LEN` accepted in a single packet.
    pub max_packet_len: u8,
}

impl ParserConfig {
    /// Bind the configuration to `port`.
    #[must_use]
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// Port name if one is set and not blank.
    #[must_use]
    pub fn bound_port(&self) -> Option<&str> {
        self.port.as_deref().map(str::trim).filter(|port| !port.is_empty())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            port: None,
            nested_tags: NESTED_TAGS.to_vec(),
            max_packet_len: u8::try_from(MAX_PACKET_LEN).unwrap_or(u8::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::ParserConfig;

    #[test]
    fn defaults_use_protocol_constants() {
        let config = ParserConfig::default();
        assert_eq!(config.max_packet_len, 0xFE);
        assert!(config.nested_tags.contains(&0xFF7C));
        assert_eq!(config.bound_port(), None);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("  "), None)]
    #[case(Some("COM4"), Some("COM4"))]
    fn blank_ports_are_unbound(#[case] port: Option<&str>, #[case] expected: Option<&str>) {
        let config = ParserConfig {
            port: port.map(str::to_owned),
            ..ParserConfig::default()
        };
        assert_eq!(config.bound_port(), expected);
    }
}
