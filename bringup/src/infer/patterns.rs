//! Pattern tables for free-text inference
//!
//! ORDER MATTERS: tables are scanned top to bottom and the first entry that
//! produces a given result wins. All patterns run against upper-cased text.

use once_cell::sync::Lazy;
use regex::Regex;

pub struct RailPattern {
    pub pattern: Regex,
    pub voltage: f64,
}

/// Substring triggers for a functional test. Any trigger fires the test.
pub struct TestTrigger {
    pub triggers: &'static [&'static str],
    pub name: &'static str,
    pub command: &'static str,
    pub expected: &'static str,
}

pub struct OscillatorTrigger {
    pub triggers: &'static [&'static str],
    pub reference: &'static str,
    pub frequency_hz: f64,
}

pub static RAIL_PATTERNS: Lazy<Vec<RailPattern>> = Lazy::new(|| {
    [
        (r"\+?5V", 5.0),
        (r"\+?3V3", 3.3),
        (r"\+?3\.3V", 3.3),
        (r"VCC5", 5.0),
        (r"VCC3V3", 3.3),
        (r"PWR_JACK", 5.0),
    ]
    .into_iter()
    .map(|(p, voltage)| RailPattern {
        pattern: Regex::new(p).expect("valid regex"),
        voltage,
    })
    .collect()
});

pub const OSCILLATOR_TRIGGERS: &[OscillatorTrigger] = &[
    OscillatorTrigger {
        triggers: &["Y1", "16MHZ"],
        reference: "Y1",
        frequency_hz: 16_000_000.0,
    },
    OscillatorTrigger {
        triggers: &["Y2", "32MHZ"],
        reference: "Y2",
        frequency_hz: 32_000_000.0,
    },
];

pub const TEST_TRIGGERS: &[TestTrigger] = &[
    TestTrigger {
        triggers: &["LORA", "SX1276"],
        name: "LoRa BIT",
        command: "bit.lora",
        expected: "PASS",
    },
    TestTrigger {
        triggers: &["GPS", "MAX-M10S"],
        name: "GPS BIT",
        command: "bit.gps",
        expected: "PASS",
    },
    TestTrigger {
        triggers: &["IMU", "LSM6DSOX"],
        name: "IMU BIT",
        command: "bit.imu",
        expected: "PASS",
    },
    TestTrigger {
        triggers: &["I2C"],
        name: "I2C BIT",
        command: "bit.i2c",
        expected: "PASS",
    },
];

/// Emitted when no rail pattern matched.
pub const DEFAULT_RAILS: &[(&str, f64)] = &[("+5V", 5.0), ("+3.3V", 3.3)];

/// Emitted when no test trigger matched.
pub const FALLBACK_TEST: TestTrigger = TestTrigger {
    triggers: &[],
    name: "Full BIT",
    command: "bit",
    expected: "PASS",
};
