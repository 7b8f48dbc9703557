//! Data transfer over loopback in both blocking modes

use srt::{MsgCtrl, SrtError};
use srt_tests::{config, connected_pair, init};
use std::io::{Read, Write};
use std::time::Duration;

const MESSAGE_SIZE: usize = 1316;

fn transfer_messages(blocking: bool, count: usize) {
    init();
    let (client, server) = connected_pair(config(blocking));

    crossbeam::scope(|scope| {
        let sender = scope.spawn(|_| {
            for i in 0..count {
                let payload = vec![i as u8; MESSAGE_SIZE];
                assert_eq!(client.write(&payload).unwrap(), MESSAGE_SIZE);
            }
        });

        let mut buf = [0u8; MESSAGE_SIZE];
        for i in 0..count {
            let n = server.read(&mut buf).unwrap();
            assert_eq!(n, MESSAGE_SIZE);
            assert!(buf.iter().all(|&b| b == i as u8), "message {} corrupted", i);
        }

        sender.join().unwrap();
    })
    .unwrap();
}

#[test]
fn test_transfer_non_blocking() {
    transfer_messages(false, 100);
}

#[test]
fn test_transfer_blocking() {
    transfer_messages(true, 100);
}

#[test]
fn test_live_writes_sized_to_max_message() {
    init();
    let (client, server) = connected_pair(config(true));

    let chunk = client.max_message_size().unwrap();
    assert!(chunk < client.packet_size());
    assert!(client.write(&vec![1u8; client.packet_size()]).is_err());

    assert_eq!(client.write(&vec![2u8; chunk]).unwrap(), chunk);
    let mut buf = vec![0u8; server.packet_size()];
    assert_eq!(server.read(&mut buf).unwrap(), chunk);
    assert!(buf[..chunk].iter().all(|&b| b == 2));
}

#[test]
fn test_read_timeout_without_data() {
    init();
    let (_client, server) = connected_pair(config(false));

    let mut buf = [0u8; MESSAGE_SIZE];
    let err = server.read_timeout(&mut buf, Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, SrtError::EpollTimeout));
    assert!(err.is_timeout());
}

#[test]
fn test_empty_buffers_are_no_ops() {
    init();
    let (client, server) = connected_pair(config(false));

    assert_eq!(client.write(&[]).unwrap(), 0);
    assert_eq!(server.read(&mut []).unwrap(), 0);
}

#[test]
fn test_message_control_block() {
    init();
    let (client, server) = connected_pair(config(false));

    client.send_msg(b"first", &MsgCtrl::default()).unwrap();
    let mut buf = [0u8; MESSAGE_SIZE];
    let (n, ctrl) = server.recv_msg(&mut buf).unwrap();

    assert_eq!(&buf[..n], b"first");
    assert!(ctrl.msg_no > 0);
    assert!(ctrl.src_time > 0);
}

#[test]
fn test_std_io_traits() {
    init();
    let (mut client, mut server) = connected_pair(config(true));

    client.write_all(b"through std::io").unwrap();
    client.flush().unwrap();

    let mut buf = [0u8; 64];
    let n = Read::read(&mut server, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"through std::io");
}

#[test]
fn test_read_after_peer_close() {
    init();
    let (mut client, server) = connected_pair(config(false));
    client.close().unwrap();

    let mut buf = [0u8; MESSAGE_SIZE];
    let err = server.read(&mut buf).unwrap_err();
    assert!(!matches!(err, SrtError::EpollTimeout), "read should fail fast, got {:?}", err);
}

#[test]
fn test_stats_count_transfer() {
    init();
    let (client, server) = connected_pair(config(true));

    let payload = [7u8; MESSAGE_SIZE];
    for _ in 0..10 {
        client.write(&payload).unwrap();
    }
    let mut buf = [0u8; MESSAGE_SIZE];
    for _ in 0..10 {
        server.read(&mut buf).unwrap();
    }

    let sent = client.stats(false).unwrap();
    assert!(sent.pkt_sent_total >= 10);
    assert!(sent.byte_sent_total >= (10 * MESSAGE_SIZE) as u64);

    let received = server.instant_stats(true).unwrap();
    assert!(received.pkt_recv_total >= 10);
    assert!(received.uptime > Duration::ZERO);
}
