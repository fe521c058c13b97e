//! The controller node.
//!
//! [`Node`] owns everything one strip controller needs: the animator (and
//! through it the strip), the radio queue, the framing scanner, the USB line
//! reader and the coordinator/peer role. Board code calls
//! [`Node::service`] from its main loop; each call does a bounded amount of
//! work and never blocks.

use crate::animation::{ColorAnimator, STEP_INTERVAL_MS};
use crate::colors::Hsv;
use crate::command::{Command, CommandBuffer, LineReader};
use crate::framing::FrameScanner;
use crate::radio::{self, BROADCAST_INTERVAL_MS, BroadcastOutcome, Broadcaster, RadioQueue};
use crate::strip::{DEFAULT_STRIP_LENGTH, LedStrip, RgbFrame};
use crate::time::{TimeInstant, TimeSource};
use embedded_io::{Read, ReadReady};

/// Upper bound on bytes taken from one byte source per service call.
pub const MAX_BYTES_PER_SERVICE: usize = 64;

/// Radio role of a node.
///
/// Every node starts as a peer. Receiving a framed command over the UART link
/// makes it the coordinator, and it stays coordinator until reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Follows the color broadcast by a coordinator.
    #[default]
    Peer,
    /// Broadcasts its target color.
    Coordinator,
}

/// Timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    /// Minimum time between animation steps.
    pub step_interval_ms: u64,
    /// Time between repeated broadcasts of an unchanged target.
    pub broadcast_interval_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: STEP_INTERVAL_MS,
            broadcast_interval_ms: BROADCAST_INTERVAL_MS,
        }
    }
}

/// What happened during one [`Node::service`] call.
///
/// Boards typically blink status LEDs from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceReport {
    /// Commands applied from USB or UART.
    pub commands: u8,
    /// The node became coordinator during this call.
    pub promoted: bool,
    /// A new frame was pushed to the strip.
    pub frame_pushed: bool,
    /// A sync packet was queued for transmission.
    pub broadcast_sent: bool,
    /// A radio packet was taken off the receive queue.
    pub packet_received: bool,
    /// The received packet was a valid sync packet and was applied.
    pub packet_accepted: bool,
}

/// A strip controller node.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `S` - Strip implementation type
/// * `R` - Radio queue implementation type
/// * `N` - Number of strip positions
pub struct Node<'t, I, T, S, R, const N: usize = DEFAULT_STRIP_LENGTH>
where
    I: TimeInstant,
    T: TimeSource<I>,
    S: LedStrip,
    R: RadioQueue,
{
    time_source: &'t T,
    animator: ColorAnimator<I, S, N>,
    radio: R,
    role: Role,
    broadcaster: Broadcaster<I>,
    scanner: FrameScanner,
    usb_lines: LineReader,
}

impl<'t, I, T, S, R, const N: usize> Node<'t, I, T, S, R, N>
where
    I: TimeInstant,
    T: TimeSource<I>,
    S: LedStrip,
    R: RadioQueue,
{
    /// Creates a peer node with default timing.
    pub fn new(strip: S, radio: R, time_source: &'t T) -> Self {
        Self::with_config(strip, radio, time_source, NodeConfig::default())
    }

    /// Creates a peer node with the given timing.
    pub fn with_config(strip: S, radio: R, time_source: &'t T, config: NodeConfig) -> Self {
        let mut animator = ColorAnimator::new(strip);
        animator.set_step_interval(config.step_interval_ms);

        Self {
            time_source,
            animator,
            radio,
            role: Role::Peer,
            broadcaster: Broadcaster::new(config.broadcast_interval_ms),
            scanner: FrameScanner::new(),
            usb_lines: LineReader::new(),
        }
    }

    /// Pushes the power-up frame to the strip.
    ///
    /// Call once after construction, before the first [`service`](Self::service).
    pub fn start(&mut self) {
        info!("node start, {} leds", N);
        self.animator.render();
    }

    /// Runs one pass of the main loop.
    ///
    /// Order: USB commands, UART frames, animation step, then the coordinator
    /// broadcast or the peer receive depending on the role.
    pub fn service<B, U>(&mut self, usb: &mut B, uart: &mut U) -> ServiceReport
    where
        B: Read + ReadReady,
        U: Read + ReadReady,
    {
        let mut report = ServiceReport::default();

        report.commands += self.service_usb(usb);
        let (commands, promoted) = self.service_uart(uart);
        report.commands += commands;
        report.promoted = promoted;

        report.frame_pushed = self.tick();

        match self.role {
            Role::Coordinator => {
                report.broadcast_sent = self.service_coordinator() == BroadcastOutcome::Sent;
            }
            Role::Peer => {
                if let Some(accepted) = self.service_peer() {
                    report.packet_received = true;
                    report.packet_accepted = accepted;
                }
            }
        }

        report
    }

    /// Reads pending USB bytes and applies complete commands.
    ///
    /// USB commands do not change the role. Returns the number of commands
    /// applied.
    pub fn service_usb<B: Read + ReadReady>(&mut self, usb: &mut B) -> u8 {
        let mut applied = 0;
        drain(usb, |byte| {
            if let Some(buffer) = self.usb_lines.push(byte) {
                if self.apply_buffer(&buffer) {
                    applied += 1;
                }
            }
        });
        applied
    }

    /// Reads pending UART bytes through the frame scanner.
    ///
    /// Every complete frame promotes the node to coordinator, even if its
    /// command is not recognized. Returns the number of commands applied and
    /// whether this call promoted the node.
    pub fn service_uart<U: Read + ReadReady>(&mut self, uart: &mut U) -> (u8, bool) {
        let mut applied = 0;
        let mut promoted = false;
        drain(uart, |byte| {
            if let Some(buffer) = self.scanner.push(byte) {
                promoted |= self.promote();
                if self.apply_buffer(&buffer) {
                    applied += 1;
                }
            }
        });
        (applied, promoted)
    }

    /// Steps the animation if due. Returns true if a frame was pushed.
    pub fn tick(&mut self) -> bool {
        let now = self.time_source.now();
        self.animator.tick(now)
    }

    /// Broadcasts the target color if this node is coordinator and a broadcast is due.
    pub fn service_coordinator(&mut self) -> BroadcastOutcome {
        if self.role != Role::Coordinator {
            return BroadcastOutcome::NotDue;
        }
        let now = self.time_source.now();
        let target = self.animator.target();
        self.broadcaster.service(&mut self.radio, target, now)
    }

    /// Applies a received sync packet if this node is a peer.
    ///
    /// Returns `None` if nothing was received, otherwise whether the packet
    /// was valid and applied. The receive buffer is always released.
    pub fn service_peer(&mut self) -> Option<bool> {
        if self.role != Role::Peer {
            return None;
        }
        match radio::receive(&mut self.radio)? {
            Ok(packet) => {
                debug!("sync packet {}", packet.color);
                self.set_target(packet.color);
                Some(true)
            }
            Err(err) => {
                debug!("dropped radio packet: {}", err);
                Some(false)
            }
        }
    }

    /// Sets the color to animate toward and schedules an immediate broadcast.
    ///
    /// Hue is capped at 239; saturation and value are kept as given.
    pub fn set_target(&mut self, color: Hsv) {
        self.animator.set_target(color);
        self.broadcaster.mark_due();
    }

    /// Applies a decoded command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetColor(color) => self.set_target(color),
        }
    }

    /// Parses and applies a raw command buffer.
    ///
    /// Returns false if the command letter was not recognized.
    pub fn apply_buffer(&mut self, buffer: &CommandBuffer) -> bool {
        match Command::parse(buffer) {
            Some(command) => {
                debug!("command {}", command);
                self.apply(command);
                true
            }
            None => {
                debug!("ignored command letter {}", buffer[0]);
                false
            }
        }
    }

    /// Makes this node the coordinator. Returns true if it was a peer before.
    fn promote(&mut self) -> bool {
        if self.role == Role::Coordinator {
            return false;
        }
        info!("promoted to coordinator");
        self.role = Role::Coordinator;
        true
    }

    /// Returns the current role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the color currently on the strip.
    pub fn current(&self) -> Hsv {
        self.animator.current()
    }

    /// Returns the color being animated toward.
    pub fn target(&self) -> Hsv {
        self.animator.target()
    }

    /// Returns the last rendered frame.
    pub fn frame(&self) -> &RgbFrame<N> {
        self.animator.frame()
    }

    /// Returns the strip driver.
    pub fn strip(&self) -> &S {
        self.animator.strip()
    }

    /// Returns the radio queue.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Returns the radio queue mutably, e.g. to service the radio driver.
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }
}

/// Feeds available bytes from `source` to `on_byte`.
///
/// Stops when the source has nothing ready, after [`MAX_BYTES_PER_SERVICE`]
/// bytes, or on the first read error. Errors are logged and otherwise
/// ignored; the next call simply tries again.
fn drain<B: Read + ReadReady>(source: &mut B, mut on_byte: impl FnMut(u8)) {
    let mut byte = [0u8; 1];
    for _ in 0..MAX_BYTES_PER_SERVICE {
        match source.read_ready() {
            Ok(true) => {}
            Ok(false) => return,
            Err(_) => {
                warn!("byte source not ready");
                return;
            }
        }
        match source.read(&mut byte) {
            Ok(1) => on_byte(byte[0]),
            Ok(_) => return,
            Err(_) => {
                warn!("byte source read failed");
                return;
            }
        }
    }
}
