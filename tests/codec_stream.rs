//! Tests driving `VipaFrameCodec` through `FramedRead` over in-memory streams.

use std::io;

use futures::StreamExt;
use tokio::io::{AsyncWriteExt, duplex};
use tokio_util::codec::FramedRead;
use vipaframe::{FrameFault, ParserConfig, StatusCode, VipaFrameCodec, frame::MAX_PACKET_LEN};
use vipaframe_testing::{chained_command, chained_response, response};

#[tokio::test]
async fn frames_survive_small_reads() {
    let mut stream = Vec::new();
    stream.extend(response(&[0x01, 0x02], 0x90, 0x00));
    stream.extend(chained_command(&[0x33; 40], 16, 0x62, 0x83));
    stream.extend(response(&[], 0x90, 0x00));

    let (mut client, server) = duplex(5);
    let writer = tokio::spawn(async move {
        for chunk in stream.chunks(3) {
            client.write_all(chunk).await.expect("write chunk");
        }
    });

    let frames: Vec<_> = FramedRead::new(server, VipaFrameCodec::default())
        .collect()
        .await;
    writer.await.expect("writer task");

    let frames: Vec<_> = frames
        .into_iter()
        .collect::<io::Result<Vec<_>>>()
        .expect("no stream errors");
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].payload, [0x01, 0x02][..]);
    assert_eq!(frames[1].payload, vec![0x33; 40]);
    assert_eq!(frames[1].status, StatusCode::from_sw(0x62, 0x83));
    assert!(frames[2].payload.is_empty());
}

#[tokio::test]
async fn chained_response_stream_yields_one_frame() {
    let data: Vec<u8> = (0..300)
        .map(|i| u8::try_from(i % 250 + 1).expect("fits"))
        .collect();
    let bytes = chained_response(&data, MAX_PACKET_LEN, 0x90, 0x00);

    let codec = VipaFrameCodec::default().chained_response();
    let mut frames = FramedRead::new(bytes.as_slice(), codec);

    let frame = frames.next().await.expect("one frame").expect("decoded");
    assert_eq!(frame.payload, data);
    assert_eq!(frame.status, StatusCode::SUCCESS);
    assert!(frames.next().await.is_none());
}

#[tokio::test]
async fn protocol_fault_surfaces_as_invalid_data() {
    let mut bytes = response(&[0x10], 0x90, 0x00);
    bytes[1] = 0x22;

    let parser = vipaframe::FrameParser::with_config(ParserConfig::default());
    let mut frames = FramedRead::new(bytes.as_slice(), VipaFrameCodec::new(parser));

    let err = frames.next().await.expect("an item").expect_err("rejected");
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    let fault = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<FrameFault>())
        .expect("frame fault");
    assert_eq!(fault, &FrameFault::InvalidPcb { pcb: 0x22 });
}

#[tokio::test]
async fn truncated_stream_reports_unexpected_eof() {
    let bytes = response(&[0x10, 0x20, 0x30], 0x90, 0x00);
    let mut frames = FramedRead::new(&bytes[..6], VipaFrameCodec::default());

    let err = frames.next().await.expect("an item").expect_err("truncated");
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}
