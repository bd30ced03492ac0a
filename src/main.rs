//! Replay captured link traffic through [`vipaframe::FrameParser`].
//!
//! Hex arguments are appended one chunk at a time and drained after each,
//! the way a serial read loop would. A capture file is streamed through
//! [`VipaFrameCodec`] instead.

mod cli;

use std::error::Error;

use clap::Parser;
use futures::StreamExt;
use tokio_util::codec::FramedRead;
use vipaframe::{
    BerTlvDecoder,
    DrainMode,
    ErrorLevel,
    FrameParser,
    ParserConfig,
    ResponseHandler,
    StatusCode,
    TagDecoder,
    Tlv,
    VipaFrameCodec,
    hex::{HexSpan, parse_hex},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let mut config = ParserConfig::default();
    if let Some(port) = cli.port.as_deref() {
        config = config.with_port(port);
    }
    let mode = if cli.chained {
        DrainMode::ChainedResponse
    } else {
        DrainMode::Frames
    };

    match cli.input.as_deref() {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            let mut codec = VipaFrameCodec::new(FrameParser::with_config(config.clone()));
            if cli.chained {
                codec = codec.chained_response();
            }
            let mut frames = FramedRead::new(file, codec);
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(frame) if cli.tagless => print_raw(&frame.payload, frame.status),
                    Ok(frame) => {
                        let tags = frame
                            .status
                            .is_success()
                            .then(|| BerTlvDecoder.decode(&frame.payload, &config.nested_tags))
                            .and_then(Result::ok);
                        print_tags(tags.as_deref(), frame.status);
                    }
                    Err(e) => eprintln!("error: {e}"),
                }
            }
        }
        None => {
            let parser = FrameParser::with_config(config);
            let mut handler = if cli.tagless {
                ResponseHandler::tagless(|payload, _, status, _| print_raw(payload, status))
            } else {
                ResponseHandler::tags(|tags, status, _| print_tags(tags.as_deref(), status))
            };
            for chunk in &cli.responses {
                let bytes = parse_hex(chunk)?;
                parser.append(&bytes, None)?;
                parser.read_and_execute(&mut handler, mode);
            }
            let report = parser.sanity_report();
            if report.discarded_bytes > 0 || report.discarded_fragments > 0 {
                eprintln!(
                    "warning: {} bytes and {} fragments left undispatched",
                    report.discarded_bytes, report.discarded_fragments
                );
            }
            if report.level != ErrorLevel::None {
                eprintln!("warning: last read ended at error level {}", report.level);
            }
        }
    }
    Ok(())
}

fn print_raw(payload: &[u8], status: StatusCode) {
    println!("{status}: {}", HexSpan(payload));
}

fn print_tags(tags: Option<&[Tlv]>, status: StatusCode) {
    println!("{status}");
    match tags {
        Some(tags) => print_tree(tags, 1),
        None => println!("  (no tags)"),
    }
}

fn print_tree(tags: &[Tlv], depth: usize) {
    for tag in tags {
        let indent = "  ".repeat(depth);
        match tag.children() {
            Some(children) => {
                println!("{indent}{:X}", tag.tag());
                print_tree(children, depth + 1);
            }
            None => println!("{indent}{:X}: {}", tag.tag(), HexSpan(tag.value())),
        }
    }
}
