// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin map for the STM32F767ZI (Nucleo-144).
//!
//! Motor wiring is described with board pin names such as `"PC6"`. Every name is resolved against
//! the package and the timer alternate-function table before any peripheral is touched, so a typo
//! or an impossible timer assignment fails at startup instead of at first use.

use core::fmt;

/// A GPIO pin that exists on the package.
///
/// Only [`resolve`] builds one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PinId {
    /// Port index, 0 = A
    port: u8,
    number: u8,
}

impl PinId {
    /// Port index, 0 for `A`.
    #[inline]
    pub fn port(&self) -> u8 {
        self.port
    }

    #[inline]
    pub fn port_letter(&self) -> char {
        (b'A' + self.port) as char
    }

    #[inline]
    pub fn number(&self) -> u8 {
        self.number
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.port_letter(), self.number)
    }
}

/// A pin routed to a timer channel through an alternate function.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimerPin {
    pub pin: PinId,
    /// Timer number (`3` for TIM3)
    pub timer: u8,
    /// Capture/compare channel, 1-based
    pub channel: u8,
    /// Alternate function number
    pub af: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PinError<'a> {
    /// Not a pin of this package.
    Unknown(&'a str),
    /// Timer the firmware cannot use.
    UnknownTimer(u8),
    /// The pin cannot carry this timer channel.
    NoTimerChannel { pin: PinId, timer: u8, channel: u8 },
    /// The same pin was assigned twice.
    Duplicate(PinId),
    /// A binding names a different timer than the peripheral it is given to.
    TimerMismatch { expected: u8, found: u8 },
    /// The pin's port is owned by something else.
    PortUnavailable(PinId),
}

impl fmt::Display for PinError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinError::Unknown(name) => write!(f, "unknown pin {name:?}"),
            PinError::UnknownTimer(t) => write!(f, "unsupported timer TIM{t}"),
            PinError::NoTimerChannel {
                pin,
                timer,
                channel,
            } => write!(f, "{pin} cannot be TIM{timer}_CH{channel}"),
            PinError::Duplicate(pin) => write!(f, "{pin} assigned twice"),
            PinError::TimerMismatch { expected, found } => {
                write!(f, "binding names TIM{found}, peripheral is TIM{expected}")
            }
            PinError::PortUnavailable(pin) => write!(f, "port of {pin} is not available"),
        }
    }
}

/// Highest pin number per port on the LQFP144 package, ports A..H.
const PORT_PINS: [u8; 8] = [15, 15, 15, 15, 15, 15, 15, 1];

/// Timers usable for encoder or PWM duty.
pub const TIMERS: [u8; 5] = [2, 3, 4, 5, 8];

/// (pin, timer, channel, af) for channels 1 and 2 of the supported timers.
const TIMER_CHANNELS: &[(&str, u8, u8, u8)] = &[
    ("PA0", 2, 1, 1),
    ("PA5", 2, 1, 1),
    ("PA15", 2, 1, 1),
    ("PA1", 2, 2, 1),
    ("PB3", 2, 2, 1),
    ("PA6", 3, 1, 2),
    ("PB4", 3, 1, 2),
    ("PC6", 3, 1, 2),
    ("PA7", 3, 2, 2),
    ("PB5", 3, 2, 2),
    ("PC7", 3, 2, 2),
    ("PB6", 4, 1, 2),
    ("PD12", 4, 1, 2),
    ("PB7", 4, 2, 2),
    ("PD13", 4, 2, 2),
    ("PA0", 5, 1, 2),
    ("PA1", 5, 2, 2),
    ("PC6", 8, 1, 3),
    ("PC7", 8, 2, 3),
];

/// Resolve a board pin name such as `"PB6"`.
pub fn resolve(name: &str) -> Result<PinId, PinError<'_>> {
    let unknown = PinError::Unknown(name);

    let rest = name.strip_prefix('P').ok_or(unknown)?;
    let mut chars = rest.chars();
    let letter = chars.next().ok_or(unknown)?;
    let digits = chars.as_str();

    if !letter.is_ascii_uppercase() || digits.is_empty() || digits.len() > 2 {
        return Err(unknown);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unknown);
    }

    let port = (letter as u8).wrapping_sub(b'A');
    let number: u8 = digits.parse().map_err(|_| unknown)?;

    match PORT_PINS.get(port as usize) {
        Some(&max) if number <= max => Ok(PinId { port, number }),
        _ => Err(unknown),
    }
}

/// Resolve a pin name and check that it can carry `TIM<timer>_CH<channel>`.
pub fn resolve_timer_pin(name: &str, timer: u8, channel: u8) -> Result<TimerPin, PinError<'_>> {
    let pin = resolve(name)?;
    if !TIMERS.contains(&timer) {
        return Err(PinError::UnknownTimer(timer));
    }

    TIMER_CHANNELS
        .iter()
        .find(|&&(n, t, c, _)| t == timer && c == channel && resolve(n) == Ok(pin))
        .map(|&(_, _, _, af)| TimerPin {
            pin,
            timer,
            channel,
            af,
        })
        .ok_or(PinError::NoTimerChannel {
            pin,
            timer,
            channel,
        })
}

/// Check that `pins` are channels 1 and 2 of timer `timer`, in that order.
pub fn check_channels(timer: u8, pins: &[TimerPin; 2]) -> Result<(), PinError<'static>> {
    for (pin, channel) in pins.iter().zip([1, 2]) {
        if pin.timer != timer {
            return Err(PinError::TimerMismatch {
                expected: timer,
                found: pin.timer,
            });
        }
        if pin.channel != channel {
            return Err(PinError::NoTimerChannel {
                pin: pin.pin,
                timer,
                channel,
            });
        }
    }
    Ok(())
}

/// Symbolic wiring of one motor: an H-bridge (enable + two PWM inputs) and a quadrature encoder.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MotorPins {
    /// Bridge enable, plain push-pull output
    pub enable: &'static str,
    /// Bridge input 1, on channel 1 of `pwm_timer`
    pub in1: &'static str,
    /// Bridge input 2, on channel 2 of `pwm_timer`
    pub in2: &'static str,
    pub pwm_timer: u8,
    /// Encoder phase A, on channel 1 of `encoder_timer`
    pub enc_a: &'static str,
    /// Encoder phase B, on channel 2 of `encoder_timer`
    pub enc_b: &'static str,
    pub encoder_timer: u8,
}

/// [`MotorPins`] after resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MotorBinding {
    pub enable: PinId,
    /// Channel 1 and channel 2 of the PWM timer
    pub pwm: [TimerPin; 2],
    /// Channel 1 and channel 2 of the encoder timer
    pub encoder: [TimerPin; 2],
}

impl MotorBinding {
    /// Every pin of the binding.
    pub fn pins(&self) -> [PinId; 5] {
        [
            self.enable,
            self.pwm[0].pin,
            self.pwm[1].pin,
            self.encoder[0].pin,
            self.encoder[1].pin,
        ]
    }
}

impl MotorPins {
    pub fn resolve(&self) -> Result<MotorBinding, PinError<'static>> {
        let binding = MotorBinding {
            enable: resolve(self.enable)?,
            pwm: [
                resolve_timer_pin(self.in1, self.pwm_timer, 1)?,
                resolve_timer_pin(self.in2, self.pwm_timer, 2)?,
            ],
            encoder: [
                resolve_timer_pin(self.enc_a, self.encoder_timer, 1)?,
                resolve_timer_pin(self.enc_b, self.encoder_timer, 2)?,
            ],
        };
        if self.pwm_timer == self.encoder_timer {
            return Err(PinError::TimerMismatch {
                expected: self.pwm_timer,
                found: self.encoder_timer,
            });
        }
        ensure_distinct(&[binding])?;
        Ok(binding)
    }
}

/// Fail if any pin appears in more than one place across `bindings`.
pub fn ensure_distinct(bindings: &[MotorBinding]) -> Result<(), PinError<'static>> {
    let pins = || bindings.iter().flat_map(MotorBinding::pins);
    for (i, pin) in pins().enumerate() {
        if pins().skip(i + 1).any(|other| other == pin) {
            return Err(PinError::Duplicate(pin));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_board_names() {
        let pin = resolve("PC6").unwrap();
        assert_eq!((pin.port_letter(), pin.number()), ('C', 6));
        assert_eq!(resolve("PA15").unwrap().number(), 15);
        assert_eq!(resolve("PH1").unwrap().port(), 7);
        assert_eq!(std::format!("{}", resolve("PB10").unwrap()), "PB10");
    }

    #[test]
    fn rejects_unknown_names() {
        for name in ["", "P", "PC", "C6", "PC16", "PH2", "PZ1", "Pc6", "PC-1", "PC123", "PC 6"] {
            assert_eq!(resolve(name), Err(PinError::Unknown(name)), "{name}");
        }
    }

    #[test]
    fn timer_channels_follow_af_table() {
        let tp = resolve_timer_pin("PC6", 8, 1).unwrap();
        assert_eq!((tp.timer, tp.channel, tp.af), (8, 1, 3));

        let tp = resolve_timer_pin("PC6", 3, 1).unwrap();
        assert_eq!(tp.af, 2);

        assert_eq!(
            resolve_timer_pin("PC6", 8, 2),
            Err(PinError::NoTimerChannel {
                pin: resolve("PC6").unwrap(),
                timer: 8,
                channel: 2
            })
        );
        assert_eq!(
            resolve_timer_pin("PC6", 1, 1),
            Err(PinError::UnknownTimer(1))
        );
    }

    #[test]
    fn motor_pins_resolve_and_reject_duplicates() {
        let pins = MotorPins {
            enable: "PA10",
            in1: "PB4",
            in2: "PB5",
            pwm_timer: 3,
            enc_a: "PB6",
            enc_b: "PB7",
            encoder_timer: 4,
        };
        let binding = pins.resolve().unwrap();
        assert_eq!(binding.pwm[0].pin, resolve("PB4").unwrap());
        assert_eq!(binding.encoder[1].channel, 2);

        let clash = MotorPins {
            enable: "PB4",
            ..pins
        };
        assert_eq!(
            clash.resolve(),
            Err(PinError::Duplicate(resolve("PB4").unwrap()))
        );

        assert!(ensure_distinct(&[binding, binding]).is_err());
    }

    /// Binding `k` on port `k`, pins 0..=4. Timer fields are irrelevant to the overlap check.
    fn synthetic_binding(port: u8) -> MotorBinding {
        let pin = |number| PinId { port, number };
        let channel = |number, channel| TimerPin {
            pin: pin(number),
            timer: 3,
            channel,
            af: 2,
        };
        MotorBinding {
            enable: pin(0),
            pwm: [channel(1, 1), channel(2, 2)],
            encoder: [channel(3, 1), channel(4, 2)],
        }
    }

    #[test]
    fn overlap_check_has_no_binding_limit() {
        let bindings: std::vec::Vec<MotorBinding> = (0..6).map(synthetic_binding).collect();
        assert_eq!(ensure_distinct(&bindings), Ok(()));

        let mut clash = bindings.clone();
        clash[5].encoder[1].pin = PinId { port: 0, number: 2 };
        assert_eq!(
            ensure_distinct(&clash),
            Err(PinError::Duplicate(PinId { port: 0, number: 2 }))
        );
    }

    #[test]
    fn pwm_and_encoder_need_different_timers() {
        let pins = MotorPins {
            enable: "PC1",
            in1: "PA6",
            in2: "PA7",
            pwm_timer: 3,
            enc_a: "PC6",
            enc_b: "PC7",
            encoder_timer: 3,
        };
        assert!(matches!(
            pins.resolve(),
            Err(PinError::TimerMismatch { .. })
        ));
    }

    #[test]
    fn channel_pairs_must_match_the_peripheral() {
        let pair = [
            resolve_timer_pin("PB6", 4, 1).unwrap(),
            resolve_timer_pin("PB7", 4, 2).unwrap(),
        ];
        assert_eq!(check_channels(4, &pair), Ok(()));
        assert_eq!(
            check_channels(8, &pair),
            Err(PinError::TimerMismatch {
                expected: 8,
                found: 4
            })
        );

        let swapped = [pair[1], pair[0]];
        assert!(matches!(
            check_channels(4, &swapped),
            Err(PinError::NoTimerChannel { channel: 1, .. })
        ));
    }
}
