//! Socket creation, options and lifecycle against the native library

use srt::sys;
use srt::{Mode, Socket, SocketConfig, SocketState, SrtError};
use srt_tests::{config, init};

#[test]
fn test_new_socket_defaults_to_non_blocking() {
    init();
    let socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();

    assert!(!socket.is_blocking());
    assert_eq!(socket.mode(), Mode::Caller);
    assert_eq!(socket.packet_size(), srt::DEFAULT_PACKET_SIZE);
    assert!(!socket.get_sock_opt_bool(sys::SRTO_RCVSYN).unwrap());
    assert_eq!(socket.state(), SocketState::Init);
}

#[test]
fn test_new_socket_blocking() {
    init();
    let socket = Socket::new("127.0.0.1", 9000, config(true)).unwrap();

    assert!(socket.is_blocking());
    assert!(socket.get_sock_opt_bool(sys::SRTO_RCVSYN).unwrap());
}

#[test]
fn test_empty_host_is_listener() {
    init();
    let socket = Socket::new("", 9000, SocketConfig::new()).unwrap();
    assert_eq!(socket.mode(), Mode::Listener);
}

#[test]
fn test_new_socket_linger() {
    init();
    let socket = Socket::new("127.0.0.1", 9000, SocketConfig::new().set("linger", "60"));
    assert!(socket.is_ok());
}

#[test]
fn test_config_applies_pre_options() {
    init();
    let config = SocketConfig::new()
        .set("transtype", "file")
        .set("latency", "300")
        .set("maxbw", "300000")
        .set("messageapi", "1")
        .set("streamid", "live/camera1");
    let socket = Socket::new("127.0.0.1", 9000, config).unwrap();

    assert_eq!(socket.get_sock_opt_int(sys::SRTO_LATENCY).unwrap(), 300);
    assert_eq!(socket.get_sock_opt_int64(sys::SRTO_MAXBW).unwrap(), 300_000);
    assert!(socket.get_sock_opt_bool(sys::SRTO_MESSAGEAPI).unwrap());
    assert_eq!(socket.get_sock_opt_string(sys::SRTO_STREAMID).unwrap(), "live/camera1");
}

#[test]
fn test_malformed_option_is_skipped() {
    init();
    let config = SocketConfig::new().set("latency", "soon").set("unknownkey", "1");
    let socket = Socket::new("127.0.0.1", 9000, config).unwrap();

    // Library default stays in place.
    assert_eq!(socket.get_sock_opt_int(sys::SRTO_LATENCY).unwrap(), 120);
}

#[test]
fn test_sock_opt_int_round_trip() {
    init();
    let socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();

    socket.set_sock_opt_int(sys::SRTO_LATENCY, 200).unwrap();
    assert_eq!(socket.get_sock_opt_int(sys::SRTO_LATENCY).unwrap(), 200);
}

#[test]
fn test_sock_opt_int64_round_trip() {
    init();
    let socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();

    socket.set_sock_opt_int64(sys::SRTO_MAXBW, 5_000_000).unwrap();
    assert_eq!(socket.get_sock_opt_int64(sys::SRTO_MAXBW).unwrap(), 5_000_000);
}

#[test]
fn test_sock_opt_string_round_trip() {
    init();
    let socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();

    socket.set_sock_opt_string(sys::SRTO_STREAMID, "#!::r=live/feed,m=publish").unwrap();
    assert_eq!(
        socket.get_sock_opt_string(sys::SRTO_STREAMID).unwrap(),
        "#!::r=live/feed,m=publish"
    );
}

#[test]
fn test_longest_string_option_round_trip() {
    init();
    let socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();
    let stream_id = "s".repeat(srt::MAX_STRING_OPTION_LEN);

    socket.set_sock_opt_string(sys::SRTO_STREAMID, &stream_id).unwrap();
    assert_eq!(socket.get_sock_opt_string(sys::SRTO_STREAMID).unwrap(), stream_id);
}

#[test]
fn test_max_message_size_follows_payload_size() {
    init();
    let live = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();
    assert_eq!(live.packet_size(), srt::DEFAULT_PACKET_SIZE);
    assert_eq!(live.max_message_size().unwrap(), 1316);

    let small = Socket::new("127.0.0.1", 9000, SocketConfig::new().set("pktsize", "1000")).unwrap();
    assert_eq!(small.max_message_size().unwrap(), 1000);

    let file = Socket::new("127.0.0.1", 9000, SocketConfig::new().set("transtype", "file")).unwrap();
    assert_eq!(file.get_sock_opt_int(sys::SRTO_PAYLOADSIZE).unwrap(), 0);
    assert_eq!(file.max_message_size().unwrap(), srt::DEFAULT_PACKET_SIZE);
}

#[test]
fn test_sock_opt_bool_round_trip() {
    init();
    let socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();

    socket.set_sock_opt_bool(sys::SRTO_MESSAGEAPI, false).unwrap();
    assert!(!socket.get_sock_opt_bool(sys::SRTO_MESSAGEAPI).unwrap());
    socket.set_sock_opt_bool(sys::SRTO_MESSAGEAPI, true).unwrap();
    assert!(socket.get_sock_opt_bool(sys::SRTO_MESSAGEAPI).unwrap());
}

#[test]
fn test_listen_reports_bound_address() {
    init();
    let (listener, port) = srt_tests::listener(config(false), 5);

    assert_ne!(port, 0);
    assert_eq!(listener.state(), SocketState::Listening);
    assert!(listener.local_addr().unwrap().ip().is_loopback());
}

#[test]
fn test_listen_on_taken_port_fails_and_closes() {
    init();
    let (_first, port) = srt_tests::listener(config(false), 1);

    let mut second = Socket::new("127.0.0.1", port, config(false).set("mode", "listener")).unwrap();
    assert!(second.listen(1).is_err());
    assert_eq!(second.id(), sys::SRT_INVALID_SOCK);
}

#[test]
fn test_close_is_idempotent() {
    init();
    let mut socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();

    socket.close().unwrap();
    socket.close().unwrap();
    assert_eq!(socket.id(), sys::SRT_INVALID_SOCK);
}

#[test]
fn test_operations_after_close_fail() {
    init();
    let mut socket = Socket::new("127.0.0.1", 9000, SocketConfig::new()).unwrap();
    socket.close().unwrap();

    let mut buf = [0u8; 16];
    assert!(matches!(socket.read(&mut buf), Err(SrtError::InvalidSocket)));
    assert!(matches!(socket.write(b"data"), Err(SrtError::InvalidSocket)));
    assert!(matches!(socket.connect(), Err(SrtError::InvalidSocket)));
    assert!(matches!(socket.accept(), Err(SrtError::InvalidSocket)));
    assert!(matches!(socket.stats(false), Err(SrtError::InvalidSocket)));
    assert!(matches!(
        socket.set_sock_opt_int(sys::SRTO_LATENCY, 1),
        Err(SrtError::InvalidSocket)
    ));
}

#[test]
fn test_version_is_known() {
    init();
    assert!(srt::version().major >= 1);
}
