//! Listener/caller connection tests over loopback

use srt::{RejectReason, SocketConfig, SrtError};
use srt_tests::{caller, config, init, listener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn accept_callers(blocking: bool, callers: usize) {
    init();
    let (listener, port) = listener(config(blocking), 5);

    crossbeam::scope(|scope| {
        for _ in 0..callers {
            scope.spawn(move |_| {
                let mut socket = caller(port, config(blocking));
                socket.connect().expect("connect");
                // Hold the connection until the listener has seen it.
                std::thread::sleep(Duration::from_millis(200));
            });
        }

        for _ in 0..callers {
            let (accepted, peer) = listener.accept().expect("accept");
            assert!(peer.ip().is_loopback());
            assert_ne!(peer.port(), 0);
            assert_eq!(accepted.is_blocking(), blocking);
            assert_eq!(accepted.packet_size(), listener.packet_size());
            assert_eq!(accepted.peer_addr().unwrap(), peer);
        }
    })
    .unwrap();
}

#[test]
fn test_accept_non_blocking() {
    accept_callers(false, 1);
}

#[test]
fn test_accept_blocking() {
    accept_callers(true, 1);
}

#[test]
fn test_multiple_accept_non_blocking() {
    accept_callers(false, 4);
}

#[test]
fn test_multiple_accept_blocking() {
    accept_callers(true, 4);
}

#[test]
fn test_accept_times_out_without_callers() {
    init();
    let (mut listener, _) = listener(config(false), 1);
    listener.set_poll_timeout(Duration::from_millis(100));

    assert!(matches!(listener.accept(), Err(SrtError::EpollTimeout)));
}

#[test]
fn test_accepted_socket_inherits_post_options() {
    init();
    let config = config(false).set("rcvtimeo", "500");
    let (client, server) = srt_tests::connected_pair(config);

    assert_eq!(server.get_sock_opt_int(srt::sys::SRTO_RCVTIMEO).unwrap(), 500);
    assert_eq!(client.get_sock_opt_int(srt::sys::SRTO_RCVTIMEO).unwrap(), 500);
}

fn stream_id_filter(blocking: bool) {
    init();
    let mut listener_config = config(false);
    listener_config.insert("mode", "listener");

    let mut listener = srt::Socket::new("127.0.0.1", 0, listener_config).unwrap();
    listener.set_poll_timeout(srt_tests::TEST_TIMEOUT);

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    listener
        .set_listen_callback(move |request| {
            counter.fetch_add(1, Ordering::SeqCst);
            if request.stream_id() == "allowed" {
                return true;
            }
            request.set_reject_reason(RejectReason::Unauthorized).unwrap();
            false
        })
        .unwrap();
    listener.listen(5).unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut rejected = caller(port, config(blocking).set("streamid", "intruder"));
    match rejected.connect() {
        Err(SrtError::ConnectionRejected(reason)) => assert_eq!(reason, RejectReason::Unauthorized),
        other => panic!("expected rejection, got {:?}", other),
    }

    let mut admitted = caller(port, config(blocking).set("streamid", "allowed"));
    crossbeam::scope(|scope| {
        let accepted = scope.spawn(|_| listener.accept().map(|(_, peer)| peer));
        admitted.connect().expect("allowed caller connects");
        assert!(accepted.join().unwrap().is_ok());
    })
    .unwrap();

    assert!(seen.load(Ordering::SeqCst) >= 2);
}

#[test]
fn test_listen_callback_rejects_blocking_caller() {
    stream_id_filter(true);
}

#[test]
fn test_listen_callback_rejects_non_blocking_caller() {
    stream_id_filter(false);
}

#[test]
fn test_listen_callback_sets_stream_passphrase() {
    init();
    let mut listener = srt::Socket::new("127.0.0.1", 0, config(false).set("mode", "listener")).unwrap();
    listener.set_poll_timeout(srt_tests::TEST_TIMEOUT);
    listener
        .set_listen_callback(|request| {
            if request.stream_id() == "secure" {
                request.set_option("passphrase", "correct-horse-battery").unwrap();
            }
            true
        })
        .unwrap();
    listener.listen(2).unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut encrypted = caller(
        port,
        config(true)
            .set("streamid", "secure")
            .set("passphrase", "correct-horse-battery"),
    );
    crossbeam::scope(|scope| {
        let accepted = scope.spawn(|_| listener.accept().map(|(socket, _)| socket));
        encrypted.connect().expect("caller with matching passphrase connects");
        let server = accepted.join().unwrap().expect("accept");

        encrypted.write(b"sealed").unwrap();
        let mut buf = [0u8; 64];
        let n = server.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"sealed");
    })
    .unwrap();
}

#[test]
fn test_listen_callback_panic_rejects() {
    init();
    let mut listener_config = config(false);
    listener_config.insert("mode", "listener");
    let mut listener = srt::Socket::new("127.0.0.1", 0, listener_config).unwrap();
    listener
        .set_listen_callback(|_| panic!("callback failure"))
        .unwrap();
    listener.listen(1).unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut socket = caller(port, config(true));
    assert!(matches!(socket.connect(), Err(SrtError::ConnectionRejected(_))));
}

#[test]
fn test_connect_without_listener_fails() {
    init();
    // Bind and close a listener to find a port nobody is using.
    let port = {
        let (mut listener, port) = listener(config(false), 1);
        listener.close().unwrap();
        port
    };

    let mut socket = caller(port, SocketConfig::new().set("conntimeo", "500"));
    let err = socket.connect().unwrap_err();
    assert!(
        matches!(err, SrtError::ConnectTimeout | SrtError::ConnectionFailed(_)),
        "unexpected error {:?}",
        err
    );
    assert_eq!(socket.id(), srt::sys::SRT_INVALID_SOCK);
}
