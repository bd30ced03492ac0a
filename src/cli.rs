//! Command line interface for the `vipaframe` replay binary.
//!
//! The binary feeds captured link traffic through the frame parser and prints
//! what a handler would have received.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `vipaframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "vipaframe",
    version,
    about = "Replay captured terminal responses through the link framer"
)]
pub struct Cli {
    /// Port name used for error accounting and log fields.
    #[arg(short, long)]
    pub port: Option<String>,
    /// Treat the input as a single chained response.
    #[arg(short, long)]
    pub chained: bool,
    /// Print raw payloads instead of decoded tags.
    #[arg(short, long)]
    pub tagless: bool,
    /// Read raw link bytes from a file instead of hex arguments.
    #[arg(short, long, value_name = "FILE", conflicts_with = "responses")]
    pub input: Option<PathBuf>,
    /// Captured chunks as hex, appended in order.
    #[arg(value_name = "HEX")]
    pub responses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn parses_hex_chunks_in_order() {
        let cli = Cli::parse_from(["vipaframe", "--port", "COM3", "010003", "2A9000B8"]);
        assert_eq!(cli.port.as_deref(), Some("COM3"));
        assert_eq!(cli.responses, vec!["010003", "2A9000B8"]);
        assert!(!cli.chained);
        assert!(!cli.tagless);
    }

    #[test]
    fn input_file_conflicts_with_hex_chunks() {
        let result = Cli::try_parse_from(["vipaframe", "--input", "capture.bin", "010003"]);
        assert!(result.is_err());
    }
}
