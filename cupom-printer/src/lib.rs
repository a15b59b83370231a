//! # cupom-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building (stateless byte producers)
//! - Codepage encoding (PC850 for pt-BR, WIN1252, UTF-8)
//! - Network printing (TCP port 9100)
//! - OS spooler RAW printing (Windows)
//! - Serial port printing (tty/COM)
//!
//! Business logic (WHAT to print) stays in the agent:
//! - Template compilation and receipt rendering -> print-agent
//! - Job queueing and routing -> print-agent
//!
//! ## Example
//!
//! ```ignore
//! use cupom_printer::{escpos, Charset, NetworkPrinter, Printer};
//!
//! // Build ESC/POS content
//! let mut doc = Vec::new();
//! doc.extend(escpos::init());
//! doc.extend(escpos::codepage(Charset::Pc850));
//! doc.extend(escpos::bold(true));
//! doc.extend(escpos::text("PEDIDO #1042", Charset::Pc850));
//! doc.extend(escpos::bold(false));
//! doc.extend(escpos::cut(escpos::CutMode::Partial));
//!
//! // Send to a network printer
//! let printer = NetworkPrinter::new("192.168.1.100", 9100);
//! printer.print(&doc).await?;
//! ```

pub mod encoding;
pub mod escpos;
mod error;
mod printer;

// Re-exports
pub use encoding::{Charset, encode_text};
pub use error::{PrintResult, TransportError};
pub use escpos::{Alignment, CutMode, columns_for_width};
pub use printer::{
    NetworkPrinter, Printer, SerialParity, SerialPrinter, SerialProfile, SpoolerPrinter,
    SystemPrinter, list_system_printers,
};
