//! IPC-D-356A Netlist Parser
//!
//! Reads the fixed-format test records of an IPC-D-356A netlist and builds an
//! entity set directly from them. Only `327` and `317` records are used:
//! token 1 is the net name and token 2 the attached component reference.
//! Lines that do not fit are skipped, never reported.
//!
//! Crystal frequencies cannot be read from a netlist, so detected crystals get
//! a placeholder frequency from a fixed rotation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::{FunctionalTest, Oscillator, ParsedEntities, PowerRail};

pub const UNKNOWN_BOARD: &str = "Unknown Board";

const TITLE_PREFIXES: [&str; 2] = ["C  Project Name :", "C  Board Name :"];
const RECORD_PREFIXES: [&str; 2] = ["327", "317"];
const POWER_KEYWORDS: [&str; 4] = ["VCC", "VDD", "PWR", "POWER"];
const DEFAULT_POWER_VOLTAGE: f64 = 3.3;
const RAIL_TOLERANCE_MV: u32 = 100;
const CRYSTAL_TOLERANCE_HZ: u32 = 100_000;

/// Placeholder crystal frequencies, indexed by 1-based position mod 4.
const CRYSTAL_FREQUENCIES_HZ: [f64; 4] = [16_000_000.0, 32_000_000.0, 8_000_000.0, 12_000_000.0];

/// Net-name patterns tried in order. Capturing patterns yield a voltage;
/// the bare name patterns only mark the net as a supply.
static RAIL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"(\d+)V", r"(\d+\.\d+)V", r"VCC", r"VDD"]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

static FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid regex"));
static CRYSTAL_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[YX]\d+$").expect("valid regex"));
static COORD_X: Lazy<Regex> = Lazy::new(|| Regex::new(r"X(\d+)").expect("valid regex"));
static COORD_Y: Lazy<Regex> = Lazy::new(|| Regex::new(r"Y(\d+)").expect("valid regex"));

#[derive(Debug, Error)]
pub enum NetlistError {
    #[error("Netlist file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A test point record found in the netlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPointRecord {
    pub reference: String,
    /// Raw record token 0 (record code and any packed fields)
    pub net: String,
    pub coordinates: Option<(u32, u32)>,
}

/// One named net and the references attached to it, in file order.
#[derive(Debug, Clone)]
struct Net {
    name: String,
    components: Vec<String>,
}

pub struct NetlistParser;

impl NetlistParser {
    /// Parse a netlist file. Fails only when the file is missing or unreadable.
    pub fn parse_file(path: &Path) -> Result<ParsedEntities, NetlistError> {
        if !path.exists() {
            return Err(NetlistError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(Self::parse_str(&content))
    }

    /// Parse netlist text. Never fails; unrecognised lines are ignored.
    pub fn parse_str(content: &str) -> ParsedEntities {
        let lines: Vec<&str> = content.lines().collect();

        let title = Self::extract_title(&lines);
        let nets = Self::collect_nets(&lines);
        let rails = Self::detect_rails(&nets);
        let oscillators = Self::detect_crystals(&lines);
        let functional_tests = Self::infer_functional_tests(&lines);

        tracing::debug!(
            "Netlist '{}': {} nets, {} rails, {} crystals",
            title,
            nets.len(),
            rails.len(),
            oscillators.len()
        );

        ParsedEntities {
            title,
            rails,
            oscillators,
            functional_tests,
        }
    }

    /// List test point records with their coordinates, if present.
    pub fn extract_test_points(content: &str) -> Vec<TestPointRecord> {
        content
            .lines()
            .filter(|l| Self::is_record(l))
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 2 || !parts[1].starts_with("TP") {
                    return None;
                }
                let coordinates = parts
                    .iter()
                    .filter(|p| p.contains('X') && p.contains('Y'))
                    .find_map(|p| Self::parse_coordinates(p));
                Some(TestPointRecord {
                    reference: parts[1].to_string(),
                    net: parts[0].to_string(),
                    coordinates,
                })
            })
            .collect()
    }

    /// File variant of [`Self::extract_test_points`]; a missing file yields nothing.
    pub fn extract_test_points_from_file(path: &Path) -> Vec<TestPointRecord> {
        match std::fs::read(path) {
            Ok(bytes) => Self::extract_test_points(&String::from_utf8_lossy(&bytes)),
            Err(_) => Vec::new(),
        }
    }

    fn is_record(line: &str) -> bool {
        RECORD_PREFIXES.iter().any(|p| line.starts_with(p))
    }

    fn extract_title(lines: &[&str]) -> String {
        lines
            .iter()
            .find(|l| TITLE_PREFIXES.iter().any(|p| l.starts_with(p)))
            .and_then(|l| l.split_once(':'))
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_else(|| UNKNOWN_BOARD.to_string())
    }

    fn collect_nets(lines: &[&str]) -> Vec<Net> {
        let mut nets: Vec<Net> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for line in lines.iter().filter(|l| Self::is_record(l)) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                continue;
            }
            let (name, component) = (parts[1], parts[2]);
            match index.get(name) {
                Some(&i) => nets[i].components.push(component.to_string()),
                None => {
                    index.insert(name.to_string(), nets.len());
                    nets.push(Net {
                        name: name.to_string(),
                        components: vec![component.to_string()],
                    });
                }
            }
        }

        nets
    }

    /// At most one rail per net. The keyword check runs after the pattern
    /// check and its voltage wins when both fire.
    fn detect_rails(nets: &[Net]) -> Vec<PowerRail> {
        let mut rails = Vec::new();

        for net in nets {
            let upper = net.name.to_uppercase();
            if upper.contains("GND") {
                continue;
            }

            let mut is_power = false;
            let mut voltage: Option<f64> = None;

            for pattern in RAIL_PATTERNS.iter() {
                if let Some(caps) = pattern.captures(&net.name) {
                    is_power = true;
                    if let Some(v) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) {
                        voltage = Some(v);
                        break;
                    }
                }
            }

            if POWER_KEYWORDS.iter().any(|k| upper.contains(k)) {
                is_power = true;
                voltage = Some(
                    FIRST_NUMBER
                        .captures(&net.name)
                        .and_then(|c| c[1].parse::<f64>().ok())
                        .unwrap_or(DEFAULT_POWER_VOLTAGE),
                );
            }

            match voltage {
                Some(v) if is_power && v > 0.0 => {
                    tracing::debug!(
                        "Rail {} at {} V ({} connections)",
                        net.name,
                        v,
                        net.components.len()
                    );
                    rails.push(PowerRail {
                        name: net.name.clone(),
                        voltage: v,
                        tolerance_mv: RAIL_TOLERANCE_MV,
                    });
                }
                _ => {}
            }
        }

        rails
    }

    fn record_refs<'a>(lines: &'a [&'a str]) -> impl Iterator<Item = &'a str> + 'a {
        lines
            .iter()
            .filter(|l| Self::is_record(l))
            .filter_map(|l| l.split_whitespace().nth(1))
    }

    fn detect_crystals(lines: &[&str]) -> Vec<Oscillator> {
        let crystals: BTreeSet<&str> = Self::record_refs(lines)
            .filter(|r| CRYSTAL_REF.is_match(r))
            .collect();

        crystals
            .into_iter()
            .enumerate()
            .map(|(i, reference)| {
                let position = i + 1;
                Oscillator {
                    reference: reference.to_string(),
                    frequency_hz: CRYSTAL_FREQUENCIES_HZ[position % CRYSTAL_FREQUENCIES_HZ.len()],
                    tolerance_hz: CRYSTAL_TOLERANCE_HZ,
                }
            })
            .collect()
    }

    fn infer_functional_tests(lines: &[&str]) -> Vec<FunctionalTest> {
        let mut has_test_points = false;
        let mut has_connectors = false;
        for reference in Self::record_refs(lines) {
            if reference.starts_with("TP") {
                has_test_points = true;
            } else if reference.starts_with('J') || reference.starts_with('P') {
                has_connectors = true;
            }
        }

        let mut tests = Vec::new();
        if has_test_points {
            tests.push(FunctionalTest::new(
                "Test Point Verification",
                "check_test_points",
                "All test points accessible",
            ));
        }
        if has_connectors {
            tests.push(FunctionalTest::new(
                "Connector Interface Test",
                "test_connectors",
                "All connectors functional",
            ));
        }
        tests.push(FunctionalTest::new("Power-On Self Test", "post", "PASS"));
        tests.push(FunctionalTest::new(
            "Communication Test",
            "comm_test",
            "All interfaces responsive",
        ));
        tests
    }

    fn parse_coordinates(token: &str) -> Option<(u32, u32)> {
        let x = COORD_X.captures(token)?[1].parse().ok()?;
        let y = COORD_Y.captures(token)?[1].parse().ok()?;
        Some((x, y))
    }
}
