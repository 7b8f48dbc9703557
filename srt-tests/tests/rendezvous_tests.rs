//! Rendezvous connections between two loopback sockets

use srt::{sys, Mode, Socket, SocketState};
use srt_tests::{config, free_port, init, rendezvous};

/// Connect both sides from their own threads and hand the sockets back.
fn meet(blocking: bool) -> (Socket, Socket) {
    init();
    let (port_a, port_b) = (free_port(), free_port());
    let mut a = rendezvous(port_a, port_b, config(blocking));
    let mut b = rendezvous(port_b, port_a, config(blocking));

    assert_eq!(a.mode(), Mode::Rendezvous);
    assert!(a.get_sock_opt_bool(sys::SRTO_RENDEZVOUS).unwrap());

    crossbeam::scope(|scope| {
        let side_b = scope.spawn(move |_| {
            b.connect().expect("side b connects");
            b
        });
        a.connect().expect("side a connects");
        (a, side_b.join().expect("side b thread"))
    })
    .unwrap()
}

fn exchange(blocking: bool) {
    let (a, b) = meet(blocking);

    assert_eq!(a.state(), SocketState::Connected);
    assert_eq!(b.state(), SocketState::Connected);
    assert_eq!(a.local_addr().unwrap().port(), b.peer_addr().unwrap().port());
    assert_eq!(b.local_addr().unwrap().port(), a.peer_addr().unwrap().port());

    a.write(b"from a").unwrap();
    b.write(b"from b").unwrap();

    let mut buf = [0u8; 64];
    let n = b.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"from a");
    let n = a.read(&mut buf).unwrap();
    assert_eq!(&buf[..n], b"from b");
}

#[test]
fn test_rendezvous_blocking() {
    exchange(true);
}

#[test]
fn test_rendezvous_non_blocking() {
    exchange(false);
}

#[test]
fn test_rendezvous_mode_inferred_from_adapter() {
    init();
    let socket = Socket::new(
        "127.0.0.1",
        9000,
        srt::SocketConfig::new().set("adapter", "127.0.0.1"),
    )
    .unwrap();

    assert_eq!(socket.mode(), Mode::Rendezvous);
    assert!(socket.get_sock_opt_bool(sys::SRTO_RENDEZVOUS).unwrap());
}
