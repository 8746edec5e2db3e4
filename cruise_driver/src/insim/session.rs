//! One InSim connection
//!
//! Reads the byte stream, frames and decodes packets, dispatches the
//! resulting events to the speed control node and writes whatever the node
//! published back to the host after every packet. Buttons go out before
//! actuator packets.

use super::packet::{self, InitRequest, Packet, TINY_CLOSE, TINY_NONE, TINY_NPL, VERSION_REQI};
use cruise_core::error::CruiseResult;
use cruise_core::Dispatcher;
use cruise_library::{
    ActuatorCommand, PlayerId, SpeedControlNode, SpeedSample, VehicleEvent,
};
use std::future::Future;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 4096;

/// Why a session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Local shutdown requested
    Shutdown,
    /// Host closed the connection
    Closed,
}

/// Event for the node, if the packet carries one
pub fn translate(packet: &Packet) -> Option<VehicleEvent> {
    match packet {
        Packet::Version {
            reqi,
            version,
            product,
            ..
        } if *reqi == VERSION_REQI => Some(VehicleEvent::Connected {
            product: product.clone(),
            version: version.clone(),
        }),
        Packet::NewPlayer { plid, name, .. } => Some(VehicleEvent::PlayerJoined {
            target: PlayerId(*plid),
            name: name.clone(),
        }),
        Packet::MultiCarInfo(cars) => Some(VehicleEvent::Telemetry(
            cars.iter()
                .map(|car| SpeedSample::new(PlayerId(car.plid), car.speed as f64))
                .collect(),
        )),
        Packet::ButtonType { click_id, text, .. } => Some(VehicleEvent::TextSubmitted {
            click_id: *click_id,
            text: text.clone(),
        }),
        Packet::AiInfo { plid } => Some(VehicleEvent::ControlTick {
            target: PlayerId(*plid),
        }),
        Packet::Tiny {
            subtype: TINY_CLOSE,
            ..
        } => Some(VehicleEvent::Disconnected),
        _ => None,
    }
}

pub struct Session<S> {
    stream: S,
    buf: Vec<u8>,
    peer: String,
}

impl Session<TcpStream> {
    pub async fn connect(host: &str, port: u16) -> CruiseResult<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        info!("InSim connected to {}:{}", host, port);
        Ok(Self::new(stream, format!("{}:{}", host, port)))
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl Into<String>) -> Self {
        Self {
            stream,
            buf: Vec::with_capacity(READ_CHUNK),
            peer: peer.into(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Send the init packet; the host answers with its version
    pub async fn handshake(&mut self, init: &InitRequest) -> CruiseResult<()> {
        self.write(&packet::encode_init(init)).await?;
        debug!("Sent init to {} as '{}'", self.peer, init.app_name);
        Ok(())
    }

    /// Pump packets until the host closes or `shutdown` resolves
    pub async fn run<F>(
        &mut self,
        dispatcher: &mut Dispatcher<SpeedControlNode>,
        shutdown: &mut F,
    ) -> CruiseResult<SessionEnd>
    where
        F: Future + Unpin,
    {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            while let Some(frame) = packet::take_frame(&mut self.buf)? {
                let packet = Packet::decode(&frame)?;
                if !self.handle(packet, dispatcher).await? {
                    return Ok(SessionEnd::Closed);
                }
            }

            tokio::select! {
                _ = &mut *shutdown => {
                    info!("Shutdown requested");
                    return Ok(SessionEnd::Shutdown);
                }
                read = self.stream.read(&mut chunk) => {
                    let n = read?;
                    if n == 0 {
                        info!("InSim disconnected: {} closed the connection", self.peer);
                        dispatcher.dispatch(VehicleEvent::Disconnected)?;
                        return Ok(SessionEnd::Closed);
                    }
                    self.buf.extend_from_slice(&chunk[..n]);
                }
            }
        }
    }

    /// Returns false once the host has said goodbye
    async fn handle(
        &mut self,
        packet: Packet,
        dispatcher: &mut Dispatcher<SpeedControlNode>,
    ) -> CruiseResult<bool> {
        match &packet {
            Packet::Tiny {
                subtype: TINY_NONE, ..
            } => {
                // Keep-alive, must be answered
                self.write(&packet::encode_tiny(0, TINY_NONE)).await?;
            }
            Packet::Version {
                reqi: VERSION_REQI,
                product,
                version,
                insim_version,
            } => {
                info!(
                    "Connected to LFS {} {} (InSim v{})",
                    product, version, insim_version
                );
                self.write(&packet::encode_tiny(1, TINY_NPL)).await?;
            }
            Packet::NewPlayer { plid, name, .. } => {
                info!("{} - {}", name, plid);
            }
            Packet::Other(kind) => {
                debug!("Ignoring packet type {}", kind);
            }
            _ => {}
        }

        let Some(event) = translate(&packet) else {
            return Ok(true);
        };
        let closing = event == VehicleEvent::Disconnected;
        if closing {
            info!("InSim disconnected: {} sent close", self.peer);
        }

        dispatcher.dispatch(event)?;
        self.flush(dispatcher.node()).await?;
        Ok(!closing)
    }

    /// Write everything the node published since the last flush
    pub async fn flush(&mut self, node: &SpeedControlNode) -> CruiseResult<()> {
        for draw in node.ui_hub().drain() {
            self.write(&packet::encode_button(&draw)).await?;
        }
        for actuation in node.actuation_hub().drain() {
            self.write(&packet::encode_actuation(&actuation)).await?;
        }
        Ok(())
    }

    /// Orderly disconnect: pending output, coast if still actuating, close
    pub async fn close(&mut self, node: &SpeedControlNode) -> CruiseResult<()> {
        self.flush(node).await?;
        if node.is_engaged() {
            let target = node.config().target;
            let coast = packet::command_inputs(&ActuatorCommand::coast(target));
            self.write(&packet::encode_ai_control(target.0, &coast)).await?;
            info!("Released throttle and brake for {}", target);
        }
        self.write(&packet::encode_tiny(0, TINY_CLOSE)).await?;
        if let Err(e) = self.stream.shutdown().await {
            warn!("Socket shutdown failed: {}", e);
        }
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8]) -> CruiseResult<()> {
        self.stream.write_all(bytes).await?;
        Ok(())
    }
}
