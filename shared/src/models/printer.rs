//! Printer Configuration Model

use serde::{Deserialize, Serialize};

/// Serial parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Physical connection variant of a printer
///
/// Closed union: the transport dispatcher matches on this, so there is no
/// "unknown interface" runtime path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "interface", rename_all = "lowercase")]
pub enum PrinterInterface {
    /// Raw TCP printing (port 9100)
    Network {
        host: String,
        #[serde(default = "default_port")]
        port: u16,
    },
    /// OS print spooler, RAW datatype, addressed by exact display name
    #[serde(rename = "usb")]
    UsbSpooler { printer_name: String },
    /// Serial (COM/tty) port
    Serial {
        path: String,
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
        #[serde(default = "default_data_bits")]
        data_bits: u8,
        #[serde(default)]
        parity: Parity,
        #[serde(default = "default_stop_bits")]
        stop_bits: u8,
    },
}

fn default_port() -> u16 {
    9100
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

/// A configured logical printer
///
/// Owned by the agent's configuration file; routing and layout parameters
/// live here, transport parameters live in the [`PrinterInterface`] variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfig {
    pub id: String,
    pub alias: String,
    /// Routing tags; `"all"` matches every order
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub interface: PrinterInterface,

    // -- Layout --
    /// Paper width in mm (58 or 80)
    #[serde(default = "default_width")]
    pub width: u16,
    /// Codepage name: PC437 | PC850 | PC860 | PC863 | PC865 | WIN1252 | UTF8
    #[serde(default = "default_character_set")]
    pub character_set: String,
    /// Extra blank columns on the left (0 = none)
    #[serde(default)]
    pub margin_left: u8,
    /// Thermal head heating density, 0..15
    #[serde(default = "default_density")]
    pub density: u8,
    /// Number of copies per job
    #[serde(default = "default_copies")]
    pub copies: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Per-printer receipt template override
    #[serde(default)]
    pub template: Option<String>,
}

fn default_width() -> u16 {
    80
}

fn default_character_set() -> String {
    "PC850".to_string()
}

fn default_density() -> u8 {
    8
}

fn default_copies() -> u32 {
    1
}

fn default_enabled() -> bool {
    true
}

impl PrinterConfig {
    /// Create a network printer with default layout parameters
    pub fn network(alias: &str, host: &str, port: u16) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            alias: alias.to_string(),
            categories: vec!["all".to_string()],
            interface: PrinterInterface::Network {
                host: host.to_string(),
                port,
            },
            width: default_width(),
            character_set: default_character_set(),
            margin_left: 0,
            density: default_density(),
            copies: default_copies(),
            enabled: true,
            template: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_tag_roundtrip() {
        let json = r#"{
            "id": "p1",
            "alias": "Cozinha",
            "categories": ["food"],
            "interface": "network",
            "host": "192.168.0.50"
        }"#;

        let printer: PrinterConfig = serde_json::from_str(json).unwrap();
        match &printer.interface {
            PrinterInterface::Network { host, port } => {
                assert_eq!(host, "192.168.0.50");
                assert_eq!(*port, 9100);
            }
            other => panic!("wrong interface: {:?}", other),
        }
        assert_eq!(printer.width, 80);
        assert_eq!(printer.character_set, "PC850");
        assert_eq!(printer.copies, 1);
        assert!(printer.enabled);
    }

    #[test]
    fn test_serial_defaults() {
        let json = r#"{
            "id": "p2",
            "alias": "Balcao",
            "interface": "serial",
            "path": "/dev/ttyUSB0"
        }"#;

        let printer: PrinterConfig = serde_json::from_str(json).unwrap();
        match &printer.interface {
            PrinterInterface::Serial {
                baud_rate,
                data_bits,
                parity,
                stop_bits,
                ..
            } => {
                assert_eq!(*baud_rate, 9600);
                assert_eq!(*data_bits, 8);
                assert_eq!(*parity, Parity::None);
                assert_eq!(*stop_bits, 1);
            }
            other => panic!("wrong interface: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_interface_is_rejected() {
        let json = r#"{
            "id": "p3",
            "alias": "Fax",
            "interface": "parallel"
        }"#;

        assert!(serde_json::from_str::<PrinterConfig>(json).is_err());
    }
}
