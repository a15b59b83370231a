//! Delivery print agent
//!
//! Local agent that turns delivery-order events into physical receipts on
//! thermal printers.
//!
//! # Module structure
//!
//! ```text
//! print-agent/src/
//! ├── config/    # agent configuration file
//! ├── logger/    # tracing setup + log retention
//! ├── template/  # receipt markup compiler and context
//! ├── renderer/  # instruction list -> ESC/POS bytes
//! ├── registry/  # printer set + category routing
//! ├── dispatch/  # PrinterConfig -> physical transport
//! ├── queue/     # FIFO queue, dedup, retry
//! └── ingress/   # event channel client + handlers
//! ```

pub mod config;
pub mod dispatch;
pub mod ingress;
pub mod logger;
pub mod queue;
pub mod registry;
pub mod renderer;
pub mod template;

// Re-export public types
pub use config::{AgentConfig, config_dir};
pub use dispatch::{Dispatcher, TransportDispatcher};
pub use ingress::{Backoff, EventClient, IngressHandler, TestPrintRequest};
pub use queue::{JobQueue, PrintJob, ReceiptDefaults};
pub use registry::{PrinterRegistry, RoutingError};
