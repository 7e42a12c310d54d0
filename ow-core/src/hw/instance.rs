//! Single-instance guard
//!
//! A UDP socket bound to a fixed loopback port. The kernel releases it when
//! the process exits, so there is no stale-lock cleanup.

use std::io;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};

use tracing::debug;

use crate::constants::instance;
use crate::error::{OnewireError, Result};

/// Proof that this process is the only running instance; keep it alive
#[derive(Debug)]
pub struct InstanceGuard {
    socket: UdpSocket,
}

impl InstanceGuard {
    /// Claim `port` on loopback
    ///
    /// Returns `Ok(None)` when another process already holds it.
    pub fn acquire(port: u16) -> Result<Option<InstanceGuard>> {
        let addr = SocketAddr::V4(SocketAddrV4::new(instance::BIND_ADDR, port));
        match UdpSocket::bind(addr) {
            Ok(socket) => {
                debug!(%addr, "Instance guard acquired");
                Ok(Some(InstanceGuard { socket }))
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                debug!(%addr, "Instance guard held elsewhere");
                Ok(None)
            }
            Err(source) => Err(OnewireError::InstanceBind { addr, source }),
        }
    }

    /// Claim the production port
    pub fn acquire_default() -> Result<Option<InstanceGuard>> {
        Self::acquire(instance::INSTANCE_PORT)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused() {
        let first = InstanceGuard::acquire(0).unwrap().expect("ephemeral port is free");
        let port = first.local_addr().unwrap().port();

        assert!(InstanceGuard::acquire(port).unwrap().is_none());
    }

    #[test]
    fn test_released_on_drop() {
        let first = InstanceGuard::acquire(0).unwrap().unwrap();
        let port = first.local_addr().unwrap().port();
        drop(first);

        assert!(InstanceGuard::acquire(port).unwrap().is_some());
    }
}
