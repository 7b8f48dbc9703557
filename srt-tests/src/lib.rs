//! Helpers shared by the loopback integration tests.
//!
//! Every test binds its listener to port 0 and learns the real port from
//! `local_addr`, so tests can run in parallel.

use srt::{PollTimeout, Socket, SocketConfig};
use std::time::Duration;

/// Upper bound on any readiness wait in tests, so a bug fails instead of hanging
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn init() {
    srt::startup().expect("srt startup");
}

/// Config with `blocking` set as requested
pub fn config(blocking: bool) -> SocketConfig {
    SocketConfig::new().set("blocking", if blocking { "1" } else { "0" })
}

/// A listening socket on an ephemeral loopback port, and that port.
pub fn listener(config: SocketConfig, backlog: i32) -> (Socket, u16) {
    let mut socket = Socket::new("127.0.0.1", 0, config.set("mode", "listener")).expect("create listener");
    socket.set_poll_timeout(PollTimeout::After(TEST_TIMEOUT));
    socket.listen(backlog).expect("listen");
    let port = socket.local_addr().expect("listener address").port();
    (socket, port)
}

/// A caller socket for `127.0.0.1:port`, not yet connected.
pub fn caller(port: u16, config: SocketConfig) -> Socket {
    let mut socket = Socket::new("127.0.0.1", port, config.set("mode", "caller")).expect("create caller");
    socket.set_poll_timeout(PollTimeout::After(TEST_TIMEOUT));
    socket
}

/// A loopback port that was free a moment ago.
pub fn free_port() -> u16 {
    let (mut socket, port) = listener(config(false), 1);
    socket.close().expect("close scratch listener");
    port
}

/// A rendezvous socket on `127.0.0.1:local` meeting its peer at `127.0.0.1:remote`.
pub fn rendezvous(local: u16, remote: u16, config: SocketConfig) -> Socket {
    let config = config
        .set("adapter", "127.0.0.1")
        .set("localport", local.to_string());
    let mut socket = Socket::new("127.0.0.1", remote, config).expect("create rendezvous socket");
    socket.set_poll_timeout(PollTimeout::After(TEST_TIMEOUT));
    socket
}

/// A connected (caller, accepted) pair over loopback.
pub fn connected_pair(config: SocketConfig) -> (Socket, Socket) {
    let (listener, port) = listener(config.clone(), 1);
    let mut client = caller(port, config);

    let server = crossbeam::scope(|scope| {
        let accepted = scope.spawn(|_| listener.accept().expect("accept").0);
        client.connect().expect("connect");
        accepted.join().expect("accept thread")
    })
    .expect("scope");

    (client, server)
}
