//! Mode-01 PID identifiers and the static descriptor table.
//!
//! The table is the single source of truth for per-PID byte counts and
//! conversion formulas. Each entry declares an explicit `byte_count`; the
//! decode function is always handed exactly that many leading data bytes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ObdError, ObdResult};

/// A Mode-01 Parameter ID, canonically rendered as two uppercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Pid(u8);

impl Pid {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Parse PID text of any case (e.g., "0c", "0C") into canonical form.
    ///
    /// All incoming PID text is normalized here, once, at the boundary.
    pub fn parse(text: &str) -> ObdResult<Self> {
        let trimmed = text.trim();
        if trimmed.len() != 2 {
            return Err(ObdError::MalformedResponse(format!(
                "PID must be 2 hex digits, got {trimmed:?}"
            )));
        }
        u8::from_str_radix(trimmed, 16)
            .map(Pid)
            .map_err(|_| ObdError::InvalidHex(trimmed.to_string()))
    }

    /// Whether this PID is one of the supported-PID probe bases
    /// (0x00, 0x20, 0x40, ...). Probes describe availability, not data.
    pub fn is_probe_base(self) -> bool {
        self.0 % 0x20 == 0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

impl FromStr for Pid {
    type Err = ObdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pid::parse(s)
    }
}

impl From<Pid> for String {
    fn from(pid: Pid) -> Self {
        pid.to_string()
    }
}

impl TryFrom<String> for Pid {
    type Error = ObdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Pid::parse(&s)
    }
}

/// Static descriptor for one Mode-01 PID.
pub struct PidDescriptor {
    /// PID number.
    pub pid: Pid,
    /// Human-readable parameter name.
    pub description: &'static str,
    /// Physical unit of the decoded value.
    pub unit: &'static str,
    /// Number of data bytes the formula consumes (1, 2, or 4).
    pub byte_count: usize,
    /// Conversion from raw data bytes to a physical value.
    ///
    /// Always called with exactly `byte_count` bytes.
    pub decode: fn(&[u8]) -> f64,
}

// ── Conversion formulas (SAE J1979 Mode 01) ─────────────────────

fn percent(b: &[u8]) -> f64 {
    b[0] as f64 * 100.0 / 255.0
}

fn temp_c(b: &[u8]) -> f64 {
    b[0] as f64 - 40.0
}

fn fuel_trim(b: &[u8]) -> f64 {
    (b[0] as f64 - 128.0) * 100.0 / 128.0
}

fn identity(b: &[u8]) -> f64 {
    b[0] as f64
}

fn word(b: &[u8]) -> f64 {
    b[0] as f64 * 256.0 + b[1] as f64
}

fn rpm(b: &[u8]) -> f64 {
    word(b) / 4.0
}

fn timing_advance(b: &[u8]) -> f64 {
    b[0] as f64 / 2.0 - 64.0
}

fn maf(b: &[u8]) -> f64 {
    word(b) / 100.0
}

fn fuel_rail_gauge(b: &[u8]) -> f64 {
    word(b) * 10.0
}

fn module_voltage(b: &[u8]) -> f64 {
    word(b) / 1000.0
}

fn fuel_rate(b: &[u8]) -> f64 {
    word(b) / 20.0
}

fn odometer(b: &[u8]) -> f64 {
    let raw = ((b[0] as u32) << 24) | ((b[1] as u32) << 16) | ((b[2] as u32) << 8) | b[3] as u32;
    raw as f64 / 10.0
}

/// The Mode-01 descriptor table. Process-wide, immutable, keyed by PID.
pub static MODE_01_PIDS: &[PidDescriptor] = &[
    PidDescriptor {
        pid: Pid::new(0x04),
        description: "Calculated engine load",
        unit: "%",
        byte_count: 1,
        decode: percent,
    },
    PidDescriptor {
        pid: Pid::new(0x05),
        description: "Engine coolant temperature",
        unit: "°C",
        byte_count: 1,
        decode: temp_c,
    },
    PidDescriptor {
        pid: Pid::new(0x06),
        description: "Short term fuel trim, bank 1",
        unit: "%",
        byte_count: 1,
        decode: fuel_trim,
    },
    PidDescriptor {
        pid: Pid::new(0x07),
        description: "Long term fuel trim, bank 1",
        unit: "%",
        byte_count: 1,
        decode: fuel_trim,
    },
    PidDescriptor {
        pid: Pid::new(0x0A),
        description: "Fuel pressure",
        unit: "kPa",
        byte_count: 1,
        decode: |b| b[0] as f64 * 3.0,
    },
    PidDescriptor {
        pid: Pid::new(0x0B),
        description: "Intake manifold absolute pressure",
        unit: "kPa",
        byte_count: 1,
        decode: identity,
    },
    PidDescriptor {
        pid: Pid::new(0x0C),
        description: "Engine RPM",
        unit: "rpm",
        byte_count: 2,
        decode: rpm,
    },
    PidDescriptor {
        pid: Pid::new(0x0D),
        description: "Vehicle speed",
        unit: "km/h",
        byte_count: 1,
        decode: identity,
    },
    PidDescriptor {
        pid: Pid::new(0x0E),
        description: "Timing advance",
        unit: "°",
        byte_count: 1,
        decode: timing_advance,
    },
    PidDescriptor {
        pid: Pid::new(0x0F),
        description: "Intake air temperature",
        unit: "°C",
        byte_count: 1,
        decode: temp_c,
    },
    PidDescriptor {
        pid: Pid::new(0x10),
        description: "Mass air flow rate",
        unit: "g/s",
        byte_count: 2,
        decode: maf,
    },
    PidDescriptor {
        pid: Pid::new(0x11),
        description: "Throttle position",
        unit: "%",
        byte_count: 1,
        decode: percent,
    },
    PidDescriptor {
        pid: Pid::new(0x1F),
        description: "Run time since engine start",
        unit: "s",
        byte_count: 2,
        decode: word,
    },
    PidDescriptor {
        pid: Pid::new(0x21),
        description: "Distance traveled with MIL on",
        unit: "km",
        byte_count: 2,
        decode: word,
    },
    PidDescriptor {
        pid: Pid::new(0x23),
        description: "Fuel rail gauge pressure",
        unit: "kPa",
        byte_count: 2,
        decode: fuel_rail_gauge,
    },
    PidDescriptor {
        pid: Pid::new(0x2F),
        description: "Fuel tank level input",
        unit: "%",
        byte_count: 1,
        decode: percent,
    },
    PidDescriptor {
        pid: Pid::new(0x31),
        description: "Distance traveled since codes cleared",
        unit: "km",
        byte_count: 2,
        decode: word,
    },
    PidDescriptor {
        pid: Pid::new(0x33),
        description: "Absolute barometric pressure",
        unit: "kPa",
        byte_count: 1,
        decode: identity,
    },
    PidDescriptor {
        pid: Pid::new(0x42),
        description: "Control module voltage",
        unit: "V",
        byte_count: 2,
        decode: module_voltage,
    },
    PidDescriptor {
        pid: Pid::new(0x46),
        description: "Ambient air temperature",
        unit: "°C",
        byte_count: 1,
        decode: temp_c,
    },
    PidDescriptor {
        pid: Pid::new(0x49),
        description: "Accelerator pedal position D",
        unit: "%",
        byte_count: 1,
        decode: percent,
    },
    PidDescriptor {
        pid: Pid::new(0x4C),
        description: "Commanded throttle actuator",
        unit: "%",
        byte_count: 1,
        decode: percent,
    },
    PidDescriptor {
        pid: Pid::new(0x5E),
        description: "Engine fuel rate",
        unit: "L/h",
        byte_count: 2,
        decode: fuel_rate,
    },
    PidDescriptor {
        pid: Pid::new(0xA6),
        description: "Odometer",
        unit: "km",
        byte_count: 4,
        decode: odometer,
    },
];

/// Look up the descriptor for a PID. `None` means the PID has no known
/// decode formula and its readings must be dropped by the caller.
pub fn descriptor(pid: Pid) -> Option<&'static PidDescriptor> {
    MODE_01_PIDS.iter().find(|d| d.pid == pid)
}
