//! Radio color synchronization.
//!
//! The coordinator broadcasts its target color in a seven byte packet:
//! `0x06 'W' 'x' 'S' H S V`. Peers poll for packets and adopt the color they
//! carry. The radio queue itself (buffering, retransmission) lives behind the
//! [`RadioQueue`] trait.

use crate::colors::Hsv;
use crate::time::TimeInstant;

/// Length of a sync packet on the wire, including the length byte.
pub const PACKET_LEN: usize = 7;

/// Value of the leading length byte: the bytes that follow it.
pub const PAYLOAD_LEN: u8 = 6;

/// Signature following the length byte.
pub const PACKET_SIGNATURE: [u8; 3] = *b"WxS";

/// Time between periodic broadcasts while the target is unchanged.
pub const BROADCAST_INTERVAL_MS: u64 = 5_000;

/// Trait for abstracting the radio packet queue.
///
/// Buffers are borrowed from the queue: a transmit slot is filled and then
/// committed, a received packet is read and then released.
pub trait RadioQueue {
    /// Returns the next free transmit buffer, if one is available.
    fn tx_slot(&mut self) -> Option<&mut [u8]>;

    /// Queues the buffer last returned by [`tx_slot`](Self::tx_slot) for sending.
    fn tx_commit(&mut self);

    /// Returns the oldest received packet, if any.
    fn rx_packet(&mut self) -> Option<&[u8]>;

    /// Hands the buffer last returned by [`rx_packet`](Self::rx_packet) back to the queue.
    fn rx_release(&mut self);
}

/// Packet validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Fewer than [`PACKET_LEN`] bytes.
    Truncated(usize),

    /// Length byte other than [`PAYLOAD_LEN`].
    Length(u8),

    /// Signature other than [`PACKET_SIGNATURE`].
    Signature,
}

impl core::fmt::Display for PacketError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PacketError::Truncated(len) => {
                write!(f, "packet too short: {} of {} bytes", len, PACKET_LEN)
            }
            PacketError::Length(len) => {
                write!(f, "unexpected length byte {}", len)
            }
            PacketError::Signature => {
                write!(f, "packet signature mismatch")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PacketError {}

/// A color sync packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncPacket {
    pub color: Hsv,
}

impl SyncPacket {
    pub fn new(color: Hsv) -> Self {
        Self { color }
    }

    /// Serializes the packet. Channels outside `0..=255` are clamped.
    pub fn encode(&self) -> [u8; PACKET_LEN] {
        let [hue, saturation, value] = self.color.to_bytes();
        let [w, x, s] = PACKET_SIGNATURE;
        [PAYLOAD_LEN, w, x, s, hue, saturation, value]
    }

    /// Parses a received buffer. Bytes past [`PACKET_LEN`] are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        let Some(packet) = bytes.get(..PACKET_LEN) else {
            return Err(PacketError::Truncated(bytes.len()));
        };
        if packet[0] != PAYLOAD_LEN {
            return Err(PacketError::Length(packet[0]));
        }
        if packet[1..4] != PACKET_SIGNATURE {
            return Err(PacketError::Signature);
        }
        Ok(Self::new(Hsv::from_bytes(packet[4], packet[5], packet[6])))
    }
}

/// Result of a coordinator service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BroadcastOutcome {
    /// The interval has not elapsed and the target has not changed.
    NotDue,
    /// A broadcast was due but the queue had no usable transmit slot.
    NoSlot,
    /// A packet was queued.
    Sent,
}

/// Coordinator-side broadcast scheduling.
///
/// A broadcast is due immediately after [`mark_due`](Self::mark_due) and
/// otherwise once the interval has passed since the last one that was
/// actually queued. A missing transmit slot is not remembered: the next
/// service call simply tries again.
#[derive(Debug, Clone, Copy)]
pub struct Broadcaster<I: TimeInstant> {
    last_sent: Option<I>,
    interval_ms: u64,
}

impl<I: TimeInstant> Broadcaster<I> {
    /// Creates a broadcaster that is due immediately.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            last_sent: None,
            interval_ms,
        }
    }

    /// Forces the next service call to broadcast.
    pub fn mark_due(&mut self) {
        self.last_sent = None;
    }

    /// Returns true if a broadcast should go out at `now`.
    pub fn is_due(&self, now: I) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => now.millis_since(last) >= self.interval_ms,
        }
    }

    /// Broadcasts `color` if due.
    pub fn service<R: RadioQueue>(&mut self, radio: &mut R, color: Hsv, now: I) -> BroadcastOutcome {
        if !self.is_due(now) {
            return BroadcastOutcome::NotDue;
        }

        let Some(slot) = radio.tx_slot() else {
            trace!("no transmit slot, broadcast skipped");
            return BroadcastOutcome::NoSlot;
        };
        let Some(slot) = slot.get_mut(..PACKET_LEN) else {
            warn!("transmit slot too small for sync packet");
            return BroadcastOutcome::NoSlot;
        };
        slot.copy_from_slice(&SyncPacket::new(color).encode());
        radio.tx_commit();

        self.last_sent = Some(now);
        debug!("broadcast {}", color);
        BroadcastOutcome::Sent
    }
}

/// Takes the oldest received packet off the queue.
///
/// Returns `None` when nothing is waiting. Otherwise the buffer is released
/// back to the queue whether or not it held a valid sync packet.
pub fn receive<R: RadioQueue>(radio: &mut R) -> Option<Result<SyncPacket, PacketError>> {
    let decoded = SyncPacket::decode(radio.rx_packet()?);
    radio.rx_release();
    Some(decoded)
}
