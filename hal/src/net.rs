//! Network stack collaborator
//!
//! TCP and TLS surfaces are mirrored: same operations, separate handle
//! spaces, so a program can be written against either without caring which
//! transport secures it. Receive is non-blocking at this layer
//! (`WouldBlock` when the socket is empty); the kernel turns that into a
//! scheduler suspension.

use thiserror::Error;

/// Socket handle issued by the stack. Opaque integer, never a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(pub u32);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetError {
    #[error("host name did not resolve")]
    DnsFailure,
    #[error("connection refused or unreachable")]
    ConnectFailed,
    #[error("socket is not connected")]
    NotConnected,
    #[error("no data available")]
    WouldBlock,
    #[error("ping timed out")]
    Timeout,
}

/// Network stack contract: ICMP, DNS, TCP and its TLS mirror.
pub trait NetworkStack {
    /// Sends one echo request; `Ok(rtt_ms)` or `Timeout`.
    fn ping(&mut self, ip: [u8; 4], seq: u16, timeout_ms: u32) -> Result<u32, NetError>;

    /// Pumps the interface; drivers deliver pending frames here.
    fn poll(&mut self);

    fn ip(&self) -> [u8; 4];
    fn mac(&self) -> [u8; 6];

    fn dns_resolve(&mut self, host: &str) -> Result<[u8; 4], NetError>;

    fn tcp_connect(&mut self, ip: [u8; 4], port: u16) -> Result<SocketId, NetError>;
    fn tcp_send(&mut self, sock: SocketId, data: &[u8]) -> Result<usize, NetError>;
    fn tcp_recv(&mut self, sock: SocketId, buf: &mut [u8]) -> Result<usize, NetError>;
    fn tcp_close(&mut self, sock: SocketId);
    fn tcp_is_connected(&self, sock: SocketId) -> bool;

    /// True when `tcp_recv` (or `tls_recv`; the handle space decides)
    /// would return data. The scheduler uses this to wake blocked readers.
    fn has_data(&self, sock: SocketId) -> bool;

    fn tls_connect(&mut self, host: &str, port: u16) -> Result<SocketId, NetError>;
    fn tls_send(&mut self, sock: SocketId, data: &[u8]) -> Result<usize, NetError>;
    fn tls_recv(&mut self, sock: SocketId, buf: &mut [u8]) -> Result<usize, NetError>;
    fn tls_close(&mut self, sock: SocketId);
    fn tls_is_connected(&self, sock: SocketId) -> bool;
}

struct Socket {
    connected: bool,
    /// Bytes waiting to be received.
    rx: Vec<u8>,
}

/// Loopback stack: every connect succeeds, every send echoes back into the
/// socket's receive buffer, DNS resolves from a seeded table. TLS shares
/// the implementation (the mirror contract, minus the cryptography).
pub struct LoopbackNet {
    ip: [u8; 4],
    mac: [u8; 6],
    dns: Vec<(String, [u8; 4])>,
    sockets: Vec<Socket>,
}

impl LoopbackNet {
    pub fn new() -> Self {
        Self {
            ip: [10, 0, 0, 2],
            mac: [0x52, 0x54, 0x00, 0x12, 0x34, 0x56],
            dns: vec![("localhost".to_string(), [127, 0, 0, 1])],
            sockets: Vec::new(),
        }
    }

    /// Seeds a DNS answer.
    pub fn with_host(mut self, name: &str, ip: [u8; 4]) -> Self {
        self.dns.push((name.to_string(), ip));
        self
    }

    fn socket_mut(&mut self, sock: SocketId) -> Result<&mut Socket, NetError> {
        self.sockets
            .get_mut(sock.0 as usize)
            .filter(|s| s.connected)
            .ok_or(NetError::NotConnected)
    }

    fn open(&mut self) -> SocketId {
        self.sockets.push(Socket {
            connected: true,
            rx: Vec::new(),
        });
        SocketId(self.sockets.len() as u32 - 1)
    }
}

impl Default for LoopbackNet {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkStack for LoopbackNet {
    fn ping(&mut self, ip: [u8; 4], _seq: u16, _timeout_ms: u32) -> Result<u32, NetError> {
        // Loopback and own-subnet addresses answer instantly; everything
        // else times out.
        if ip[0] == 127 || ip[..3] == self.ip[..3] {
            Ok(1)
        } else {
            Err(NetError::Timeout)
        }
    }

    fn poll(&mut self) {}

    fn ip(&self) -> [u8; 4] {
        self.ip
    }

    fn mac(&self) -> [u8; 6] {
        self.mac
    }

    fn dns_resolve(&mut self, host: &str) -> Result<[u8; 4], NetError> {
        self.dns
            .iter()
            .find(|(name, _)| name == host)
            .map(|(_, ip)| *ip)
            .ok_or(NetError::DnsFailure)
    }

    fn tcp_connect(&mut self, _ip: [u8; 4], _port: u16) -> Result<SocketId, NetError> {
        Ok(self.open())
    }

    fn tcp_send(&mut self, sock: SocketId, data: &[u8]) -> Result<usize, NetError> {
        let s = self.socket_mut(sock)?;
        s.rx.extend_from_slice(data);
        Ok(data.len())
    }

    fn tcp_recv(&mut self, sock: SocketId, buf: &mut [u8]) -> Result<usize, NetError> {
        let s = self.socket_mut(sock)?;
        if s.rx.is_empty() {
            return Err(NetError::WouldBlock);
        }
        let n = buf.len().min(s.rx.len());
        buf[..n].copy_from_slice(&s.rx[..n]);
        s.rx.drain(..n);
        Ok(n)
    }

    fn tcp_close(&mut self, sock: SocketId) {
        if let Some(s) = self.sockets.get_mut(sock.0 as usize) {
            s.connected = false;
            s.rx.clear();
        }
    }

    fn tcp_is_connected(&self, sock: SocketId) -> bool {
        self.sockets
            .get(sock.0 as usize)
            .map(|s| s.connected)
            .unwrap_or(false)
    }

    fn has_data(&self, sock: SocketId) -> bool {
        self.sockets
            .get(sock.0 as usize)
            .map(|s| s.connected && !s.rx.is_empty())
            .unwrap_or(false)
    }

    fn tls_connect(&mut self, host: &str, _port: u16) -> Result<SocketId, NetError> {
        self.dns_resolve(host)?;
        Ok(self.open())
    }

    fn tls_send(&mut self, sock: SocketId, data: &[u8]) -> Result<usize, NetError> {
        self.tcp_send(sock, data)
    }

    fn tls_recv(&mut self, sock: SocketId, buf: &mut [u8]) -> Result<usize, NetError> {
        self.tcp_recv(sock, buf)
    }

    fn tls_close(&mut self, sock: SocketId) {
        self.tcp_close(sock)
    }

    fn tls_is_connected(&self, sock: SocketId) -> bool {
        self.tcp_is_connected(sock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_echo_roundtrip() {
        let mut net = LoopbackNet::new();
        let sock = net.tcp_connect([127, 0, 0, 1], 7).unwrap();
        net.tcp_send(sock, b"hello").unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(net.tcp_recv(sock, &mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
    }

    #[test]
    fn test_recv_empty_would_block() {
        let mut net = LoopbackNet::new();
        let sock = net.tcp_connect([127, 0, 0, 1], 80).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(net.tcp_recv(sock, &mut buf), Err(NetError::WouldBlock));
    }

    #[test]
    fn test_close_disconnects() {
        let mut net = LoopbackNet::new();
        let sock = net.tcp_connect([127, 0, 0, 1], 80).unwrap();
        assert!(net.tcp_is_connected(sock));
        net.tcp_close(sock);
        assert!(!net.tcp_is_connected(sock));
        assert_eq!(net.tcp_send(sock, b"x"), Err(NetError::NotConnected));
    }

    #[test]
    fn test_dns_from_seeded_table() {
        let mut net = LoopbackNet::new().with_host("kiki.example", [93, 184, 216, 34]);
        assert_eq!(net.dns_resolve("kiki.example"), Ok([93, 184, 216, 34]));
        assert_eq!(net.dns_resolve("nope.example"), Err(NetError::DnsFailure));
    }

    #[test]
    fn test_ping_subnet_answers() {
        let mut net = LoopbackNet::new();
        assert!(net.ping([10, 0, 0, 1], 1, 100).is_ok());
        assert_eq!(net.ping([8, 8, 8, 8], 1, 100), Err(NetError::Timeout));
    }
}
