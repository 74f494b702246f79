// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
//! ArtNet output. Universes are sent as ArtDmx packets over UDP.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::trace;

use crate::device::universe::UNIVERSE_SIZE;

use super::{Transport, TransportError};

/// The UDP port every ArtNet node listens on.
pub const ARTNET_PORT: u16 = 6454;

const ARTNET_ID: &[u8; 8] = b"Art-Net\0";
const OP_DMX: u16 = 0x5000;
const PROTOCOL_VERSION: u16 = 14;
const HEADER_SIZE: usize = 18;
const MAX_PORT_ADDRESS: u16 = 0x7fff;

/// Sends universes to a single ArtNet node.
pub struct ArtNet {
    socket: UdpSocket,
    target: SocketAddr,
    /// The 15 bit port-address (net, sub-net and universe).
    port_address: u16,
    sequence: u8,
    packet: Vec<u8>,
}

impl ArtNet {
    /// Creates a sender for the node at the given address. Sends are bounded by `timeout`.
    pub fn new(ip: IpAddr, port_address: u16, timeout: Duration) -> Result<ArtNet, TransportError> {
        if port_address > MAX_PORT_ADDRESS {
            return Err(TransportError::PortAddress(port_address));
        }

        let bind_addr: SocketAddr = match ip {
            IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind_addr)?;
        if ip.is_ipv4() {
            socket.set_broadcast(true)?;
        }
        if !timeout.is_zero() {
            socket.set_write_timeout(Some(timeout))?;
        }

        Ok(ArtNet {
            socket,
            target: SocketAddr::new(ip, ARTNET_PORT),
            port_address,
            sequence: 0,
            packet: vec![0; HEADER_SIZE + UNIVERSE_SIZE],
        })
    }

    /// Writes an ArtDmx packet for the universe into the packet buffer.
    fn build_packet(&mut self, universe: &[u8; UNIVERSE_SIZE]) {
        let packet = &mut self.packet;
        packet[0..8].copy_from_slice(ARTNET_ID);
        packet[8..10].copy_from_slice(&OP_DMX.to_le_bytes());
        packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
        packet[12] = self.sequence;
        // Physical input port, informational only.
        packet[13] = 0;
        packet[14..16].copy_from_slice(&self.port_address.to_le_bytes());
        packet[16..18].copy_from_slice(&(UNIVERSE_SIZE as u16).to_be_bytes());
        packet[HEADER_SIZE..].copy_from_slice(universe);
    }
}

impl Transport for ArtNet {
    fn transmit(&mut self, universe: &[u8; UNIVERSE_SIZE]) -> Result<(), TransportError> {
        // Sequence 0 disables reordering on the receiver, so skip it after wrapping.
        self.sequence = match self.sequence.wrapping_add(1) {
            0 => 1,
            sequence => sequence,
        };
        self.build_packet(universe);
        self.socket.send_to(&self.packet, self.target)?;

        trace!(
            node = self.target.to_string(),
            sequence = self.sequence,
            "Sent ArtDmx packet"
        );
        Ok(())
    }

    fn address(&self) -> String {
        format!("artnet://{}/{}", self.target, self.port_address)
    }
}
