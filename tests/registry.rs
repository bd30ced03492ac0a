//! Tests for per-port error accounting across parsers.

use std::sync::Arc;

use vipaframe::{DrainMode, FrameParser, ParserConfig, PortErrorRegistry};
use vipaframe_testing::{recording_tagless, response};

fn broken_frame() -> Vec<u8> {
    let mut frame = response(&[0x01], 0x90, 0x00);
    frame[0] = 0x00;
    frame
}

fn feed(parser: &FrameParser, bytes: &[u8]) {
    parser.append(bytes, None).unwrap();
    let (mut handler, _calls) = recording_tagless();
    parser.read_and_execute(&mut handler, DrainMode::Frames);
}

#[test]
fn parsers_on_one_port_share_a_counter() {
    let registry = Arc::new(PortErrorRegistry::new());
    let config = ParserConfig::default().with_port("COM4");
    let first = FrameParser::with_registry(config.clone(), Arc::clone(&registry));
    let second = FrameParser::with_registry(config, Arc::clone(&registry));

    feed(&first, &broken_frame());
    feed(&second, &broken_frame());
    feed(&second, &response(&[0x02], 0x90, 0x00));

    assert_eq!(registry.count("COM4"), Some(2));
}

#[test]
fn ports_are_counted_separately() {
    let registry = Arc::new(PortErrorRegistry::new());
    let a = FrameParser::with_registry(
        ParserConfig::default().with_port("COM1"),
        Arc::clone(&registry),
    );
    let _b = FrameParser::with_registry(
        ParserConfig::default().with_port("COM2"),
        Arc::clone(&registry),
    );

    feed(&a, &broken_frame());

    assert_eq!(registry.count("COM1"), Some(1));
    assert_eq!(registry.count("COM2"), Some(0));
    let mut ports = registry.ports();
    ports.sort();
    assert_eq!(ports, vec!["COM1", "COM2"]);
}

#[test]
fn unbound_parser_records_nothing() {
    let registry = Arc::new(PortErrorRegistry::new());
    let parser = FrameParser::with_registry(
        ParserConfig::default().with_port("   "),
        Arc::clone(&registry),
    );
    assert_eq!(parser.port(), None);

    feed(&parser, &broken_frame());
    assert!(registry.ports().is_empty());
}

#[test]
fn bound_parser_registers_in_the_global_registry() {
    let parser = FrameParser::with_config(ParserConfig::default().with_port("registry-test-port"));
    assert_eq!(parser.port(), Some("registry-test-port"));
    assert_eq!(
        PortErrorRegistry::global().count("registry-test-port"),
        Some(0)
    );
}
