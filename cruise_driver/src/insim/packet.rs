//! InSim v9 packet codec
//!
//! Every packet starts with a 3-byte header: size / 4, type, request id.
//! Multi-byte fields are little-endian. Only the packets the regulator
//! exchanges are modelled; everything else decodes to `Packet::Other`.

use cruise_core::error::{CruiseError, CruiseResult};
use cruise_library::{Actuation, ActuatorCommand, TargetRegistration, UiDraw};

pub const INSIM_VERSION: u8 = 9;

/// Request id the init packet uses to ask for the version packet
pub const VERSION_REQI: u8 = 1;

// Packet types
pub const ISP_ISI: u8 = 1;
pub const ISP_VER: u8 = 2;
pub const ISP_TINY: u8 = 3;
pub const ISP_NPL: u8 = 21;
pub const ISP_MCI: u8 = 38;
pub const ISP_BTN: u8 = 45;
pub const ISP_BTT: u8 = 47;
pub const ISP_AIC: u8 = 68;
pub const ISP_AII: u8 = 69;

// Tiny subtypes
pub const TINY_NONE: u8 = 0;
pub const TINY_CLOSE: u8 = 2;
pub const TINY_NPL: u8 = 14;

// Init flags
pub const ISF_LOCAL: u16 = 4;
pub const ISF_MCI: u16 = 32;

// AI control inputs
pub const CS_MSX: u8 = 0;
pub const CS_THROTTLE: u8 = 1;
pub const CS_BRAKE: u8 = 2;
pub const CS_IGNITION: u8 = 5;
pub const CS_REPEAT_AI_INFO: u8 = 241;
pub const CS_SET_HELP_FLAGS: u8 = 253;

pub const PIF_AUTOGEARS: u16 = 8;
pub const SWITCH_ON: u16 = 3;
pub const STEER_CENTRE: u16 = 32768;

const HEADER_SIZE: usize = 4;
const ISI_SIZE: usize = 44;
const VER_SIZE: usize = 20;
const NPL_SIZE: usize = 76;
const BTT_SIZE: usize = 104;
const BTN_HEADER_SIZE: usize = 12;
const MAX_BTN_TEXT: usize = 240;
const COMPCAR_SIZE: usize = 28;
const AII_MIN_SIZE: usize = 4;

/// Speed of one car from a multi car info packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarSpeed {
    pub plid: u8,
    /// 32768 = 100 m/s
    pub speed: u16,
}

/// Decoded inbound packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Version {
        reqi: u8,
        version: String,
        product: String,
        insim_version: u8,
    },
    Tiny {
        reqi: u8,
        subtype: u8,
    },
    NewPlayer {
        plid: u8,
        ucid: u8,
        name: String,
    },
    ButtonType {
        ucid: u8,
        click_id: u8,
        text: String,
    },
    MultiCarInfo(Vec<CarSpeed>),
    AiInfo {
        plid: u8,
    },
    Other(u8),
}

impl Packet {
    /// Decode one complete frame as produced by `take_frame`
    pub fn decode(frame: &[u8]) -> CruiseResult<Packet> {
        if frame.len() < HEADER_SIZE {
            return Err(truncated("header", HEADER_SIZE, frame.len()));
        }
        let kind = frame[1];
        let reqi = frame[2];

        match kind {
            ISP_VER => {
                expect_len(frame, VER_SIZE, "IS_VER")?;
                Ok(Packet::Version {
                    reqi,
                    version: c_string(&frame[4..12]),
                    product: c_string(&frame[12..18]),
                    insim_version: frame[18],
                })
            }
            ISP_TINY => Ok(Packet::Tiny {
                reqi,
                subtype: frame[3],
            }),
            ISP_NPL => {
                expect_len(frame, NPL_SIZE, "IS_NPL")?;
                Ok(Packet::NewPlayer {
                    plid: frame[3],
                    ucid: frame[4],
                    name: c_string(&frame[8..32]),
                })
            }
            ISP_BTT => {
                expect_len(frame, BTT_SIZE, "IS_BTT")?;
                Ok(Packet::ButtonType {
                    ucid: frame[3],
                    click_id: frame[4],
                    text: c_string(&frame[8..BTT_SIZE]),
                })
            }
            ISP_MCI => {
                let count = frame[3] as usize;
                let needed = HEADER_SIZE + count * COMPCAR_SIZE;
                expect_len(frame, needed, "IS_MCI")?;
                let cars = frame[HEADER_SIZE..needed]
                    .chunks_exact(COMPCAR_SIZE)
                    .map(|car| CarSpeed {
                        plid: car[4],
                        speed: u16::from_le_bytes([car[20], car[21]]),
                    })
                    .collect();
                Ok(Packet::MultiCarInfo(cars))
            }
            ISP_AII => {
                expect_len(frame, AII_MIN_SIZE, "IS_AII")?;
                Ok(Packet::AiInfo { plid: frame[3] })
            }
            other => Ok(Packet::Other(other)),
        }
    }
}

/// Split the next complete packet off the front of `buf`.
///
/// Returns `None` until enough bytes have arrived. A zero size byte can
/// never be resynchronised and is a protocol error.
pub fn take_frame(buf: &mut Vec<u8>) -> CruiseResult<Option<Vec<u8>>> {
    let Some(&size_byte) = buf.first() else {
        return Ok(None);
    };
    let size = size_byte as usize * 4;
    if size == 0 {
        return Err(CruiseError::Protocol("packet with zero size".to_string()));
    }
    if buf.len() < size {
        return Ok(None);
    }
    Ok(Some(buf.drain(..size).collect()))
}

/// Settings sent in the init packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitRequest {
    pub admin: String,
    pub app_name: String,
    /// Multi car info interval
    pub interval_ms: u16,
}

pub fn encode_init(init: &InitRequest) -> Vec<u8> {
    let mut out = Vec::with_capacity(ISI_SIZE);
    out.extend_from_slice(&[(ISI_SIZE / 4) as u8, ISP_ISI, VERSION_REQI, 0]);
    out.extend_from_slice(&0u16.to_le_bytes()); // UDPPort
    out.extend_from_slice(&(ISF_LOCAL | ISF_MCI).to_le_bytes());
    out.push(INSIM_VERSION);
    out.push(0); // Prefix
    out.extend_from_slice(&init.interval_ms.to_le_bytes());
    put_fixed(&mut out, &init.admin, 16);
    put_fixed(&mut out, &init.app_name, 16);
    out
}

pub fn encode_tiny(reqi: u8, subtype: u8) -> Vec<u8> {
    vec![1, ISP_TINY, reqi, subtype]
}

/// Button for the local connection
pub fn encode_button(draw: &UiDraw) -> Vec<u8> {
    let mut text = Vec::new();
    if let Some(caption) = &draw.caption {
        text.push(0);
        text.extend_from_slice(caption.as_bytes());
        text.push(0);
    }
    text.extend_from_slice(draw.text.as_bytes());
    text.truncate(MAX_BTN_TEXT - 1);
    // NUL terminated, padded to a multiple of 4
    let padded = (text.len() / 4 + 1) * 4;
    text.resize(padded, 0);

    let size = BTN_HEADER_SIZE + text.len();
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&[
        (size / 4) as u8,
        ISP_BTN,
        1, // ReqI must be nonzero
        0, // UCID: local
        draw.click_id,
        0, // Inst
        draw.style.0,
        draw.type_in,
        draw.rect.left,
        draw.rect.top,
        draw.rect.width,
        draw.rect.height,
    ]);
    out.extend_from_slice(&text);
    out
}

/// One AI control input: (input, time, value)
pub type AiInput = (u8, u8, u16);

pub fn encode_ai_control(plid: u8, inputs: &[AiInput]) -> Vec<u8> {
    let size = HEADER_SIZE + inputs.len() * 4;
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&[(size / 4) as u8, ISP_AIC, 0, plid]);
    for &(input, time, value) in inputs {
        out.push(input);
        out.push(time);
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

pub fn registration_inputs(registration: &TargetRegistration) -> Vec<AiInput> {
    vec![
        (CS_REPEAT_AI_INFO, registration.repeat_hundredths, 0),
        (CS_IGNITION, 0, SWITCH_ON),
        (CS_SET_HELP_FLAGS, 0, PIF_AUTOGEARS),
        (CS_MSX, 0, STEER_CENTRE),
    ]
}

pub fn command_inputs(command: &ActuatorCommand) -> Vec<AiInput> {
    vec![
        (CS_THROTTLE, 0, command.throttle),
        (CS_BRAKE, 0, command.brake),
    ]
}

pub fn encode_actuation(actuation: &Actuation) -> Vec<u8> {
    let inputs = match actuation {
        Actuation::Register(registration) => registration_inputs(registration),
        Actuation::Command(command) => command_inputs(command),
    };
    encode_ai_control(actuation.target().0, &inputs)
}

fn expect_len(frame: &[u8], needed: usize, what: &str) -> CruiseResult<()> {
    if frame.len() < needed {
        return Err(truncated(what, needed, frame.len()));
    }
    Ok(())
}

fn truncated(what: &str, needed: usize, got: usize) -> CruiseError {
    CruiseError::Protocol(format!(
        "truncated {}: need {} bytes, got {}",
        what, needed, got
    ))
}

fn c_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

// Always leaves room for the terminating NUL
fn put_fixed(out: &mut Vec<u8>, text: &str, width: usize) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(width - 1);
    out.extend_from_slice(&bytes[..len]);
    out.resize(out.len() + width - len, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruise_library::{PlayerId, UiDraw};

    fn assert_framed(packet: &[u8]) {
        assert_eq!(packet.len() % 4, 0, "{:?}", packet);
        assert_eq!(packet[0] as usize * 4, packet.len());
    }

    #[test]
    fn test_init_layout() {
        let init = InitRequest {
            admin: "pass".to_string(),
            app_name: "AI".to_string(),
            interval_ms: 50,
        };
        let packet = encode_init(&init);

        assert_eq!(packet.len(), 44);
        assert_framed(&packet);
        assert_eq!(&packet[..4], &[11, ISP_ISI, 1, 0]);
        assert_eq!(u16::from_le_bytes([packet[6], packet[7]]), 36);
        assert_eq!(packet[8], 9);
        assert_eq!(u16::from_le_bytes([packet[10], packet[11]]), 50);
        assert_eq!(&packet[12..16], b"pass");
        assert_eq!(packet[16], 0);
        assert_eq!(&packet[28..30], b"AI");
    }

    #[test]
    fn test_init_truncates_long_names() {
        let init = InitRequest {
            admin: String::new(),
            app_name: "a-name-that-is-far-too-long".to_string(),
            interval_ms: 50,
        };
        let packet = encode_init(&init);
        assert_eq!(packet.len(), 44);
        assert_eq!(packet[43], 0);
    }

    #[test]
    fn test_button_entry_text() {
        let packet = encode_button(&UiDraw::target_entry(80));
        assert_framed(&packet);

        assert_eq!(packet[1], ISP_BTN);
        assert_ne!(packet[2], 0);
        assert_eq!(packet[4], 3); // ClickID
        assert_eq!(packet[6], 40); // dark | click
        assert_eq!(packet[7], 138);
        assert_eq!(&packet[8..12], &[60, 55, 5, 5]);

        let text = &packet[12..];
        let expected = b"\0Target speed in km/h\080";
        assert_eq!(&text[..expected.len()], expected);
        assert!(text[expected.len()..].iter().all(|&b| b == 0));
        assert!(text.len() > expected.len());
    }

    #[test]
    fn test_button_text_always_terminated() {
        for label in ["", "abc", "abcd", "Speed:"] {
            let mut draw = UiDraw::speed_label();
            draw.text = label.to_string();
            let packet = encode_button(&draw);
            assert_framed(&packet);
            assert_eq!(*packet.last().unwrap(), 0);
        }

        let mut draw = UiDraw::speed_label();
        draw.text = "x".repeat(400);
        let packet = encode_button(&draw);
        assert_framed(&packet);
        assert_eq!(packet.len(), 12 + 240);
    }

    #[test]
    fn test_command_packet() {
        let packet = encode_actuation(&Actuation::Command(ActuatorCommand::brake(PlayerId(2), 579)));
        assert_framed(&packet);
        assert_eq!(
            packet,
            vec![3, ISP_AIC, 0, 2, CS_THROTTLE, 0, 0, 0, CS_BRAKE, 0, 0x43, 0x02]
        );
    }

    #[test]
    fn test_registration_packet() {
        let registration = TargetRegistration::new(PlayerId(2), 50);
        let packet = encode_actuation(&Actuation::Register(registration));
        assert_framed(&packet);
        assert_eq!(packet.len(), 4 + 4 * 4);
        assert_eq!(&packet[4..8], &[CS_REPEAT_AI_INFO, 5, 0, 0]);
        assert_eq!(&packet[8..12], &[CS_IGNITION, 0, 3, 0]);
        assert_eq!(&packet[12..16], &[CS_SET_HELP_FLAGS, 0, 8, 0]);
        assert_eq!(&packet[16..20], &[CS_MSX, 0, 0x00, 0x80]);
    }

    #[test]
    fn test_take_frame_waits_for_whole_packet() {
        let mut buf = vec![1, ISP_TINY, 0];
        assert_eq!(take_frame(&mut buf).unwrap(), None);

        buf.extend_from_slice(&[TINY_NONE, 1, ISP_TINY]);
        assert_eq!(take_frame(&mut buf).unwrap(), Some(vec![1, ISP_TINY, 0, 0]));
        assert_eq!(buf, vec![1, ISP_TINY]);
        assert_eq!(take_frame(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_take_frame_rejects_zero_size() {
        let mut buf = vec![0, 0, 0, 0];
        assert!(matches!(take_frame(&mut buf), Err(CruiseError::Protocol(_))));
    }

    #[test]
    fn test_decode_version() {
        let mut frame = vec![5, ISP_VER, 1, 0];
        frame.extend_from_slice(b"0.7F\0\0\0\0");
        frame.extend_from_slice(b"S3\0\0\0\0");
        frame.extend_from_slice(&[9, 0]);

        assert_eq!(
            Packet::decode(&frame).unwrap(),
            Packet::Version {
                reqi: 1,
                version: "0.7F".to_string(),
                product: "S3".to_string(),
                insim_version: 9,
            }
        );
    }

    #[test]
    fn test_decode_multi_car_info() {
        let mut frame = vec![15, ISP_MCI, 0, 2];
        for (plid, speed) in [(1u8, 1000u16), (2, 2730)] {
            let mut car = [0u8; 28];
            car[4] = plid;
            car[20..22].copy_from_slice(&speed.to_le_bytes());
            frame.extend_from_slice(&car);
        }

        assert_eq!(
            Packet::decode(&frame).unwrap(),
            Packet::MultiCarInfo(vec![
                CarSpeed { plid: 1, speed: 1000 },
                CarSpeed { plid: 2, speed: 2730 },
            ])
        );
    }

    #[test]
    fn test_decode_button_type() {
        let mut frame = vec![26, ISP_BTT, 0, 0, 3, 0, 138, 0];
        let mut text = [0u8; 96];
        text[..2].copy_from_slice(b"90");
        frame.extend_from_slice(&text);

        assert_eq!(
            Packet::decode(&frame).unwrap(),
            Packet::ButtonType {
                ucid: 0,
                click_id: 3,
                text: "90".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_new_player() {
        let mut frame = vec![0u8; 76];
        frame[..6].copy_from_slice(&[19, ISP_NPL, 0, 2, 0, 0]);
        frame[8..13].copy_from_slice(b"Racer");

        assert_eq!(
            Packet::decode(&frame).unwrap(),
            Packet::NewPlayer {
                plid: 2,
                ucid: 0,
                name: "Racer".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_small_packets() {
        assert_eq!(
            Packet::decode(&[1, ISP_TINY, 7, TINY_CLOSE]).unwrap(),
            Packet::Tiny {
                reqi: 7,
                subtype: TINY_CLOSE,
            }
        );
        assert_eq!(
            Packet::decode(&[1, ISP_AII, 0, 2]).unwrap(),
            Packet::AiInfo { plid: 2 }
        );
        assert_eq!(Packet::decode(&[1, 99, 0, 0]).unwrap(), Packet::Other(99));
    }

    #[test]
    fn test_decode_truncated() {
        assert!(matches!(
            Packet::decode(&[5, ISP_VER, 1, 0, b'0']),
            Err(CruiseError::Protocol(_))
        ));
        // Claims two cars, carries one
        let mut frame = vec![8, ISP_MCI, 0, 2];
        frame.extend_from_slice(&[0u8; 28]);
        assert!(matches!(Packet::decode(&frame), Err(CruiseError::Protocol(_))));
        assert!(Packet::decode(&[1, ISP_TINY]).is_err());
    }
}
