//! Transport dispatch
//!
//! Maps a [`PrinterConfig`]'s interface variant onto the matching physical
//! transport. The [`Dispatcher`] trait is the seam the queue depends on,
//! so tests can inject fault transports.

use async_trait::async_trait;
use cupom_printer::{
    NetworkPrinter, Printer, SerialParity, SerialPrinter, SerialProfile, SpoolerPrinter,
    TransportError,
};
use shared::{Parity, PrinterConfig, PrinterInterface};

/// Delivery of a rendered document to one printer, single attempt
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, printer: &PrinterConfig, data: &[u8]) -> Result<(), TransportError>;
}

/// Production dispatcher over the three physical transports
pub struct TransportDispatcher;

#[async_trait]
impl Dispatcher for TransportDispatcher {
    async fn dispatch(&self, printer: &PrinterConfig, data: &[u8]) -> Result<(), TransportError> {
        match &printer.interface {
            PrinterInterface::Network { host, port } => {
                NetworkPrinter::new(host, *port).print(data).await
            }
            PrinterInterface::UsbSpooler { printer_name } => {
                SpoolerPrinter::new(printer_name).print(data).await
            }
            PrinterInterface::Serial {
                path,
                baud_rate,
                data_bits,
                parity,
                stop_bits,
            } => {
                let profile = SerialProfile {
                    baud_rate: *baud_rate,
                    data_bits: *data_bits,
                    parity: match parity {
                        Parity::None => SerialParity::None,
                        Parity::Even => SerialParity::Even,
                        Parity::Odd => SerialParity::Odd,
                    },
                    stop_bits: *stop_bits,
                };
                SerialPrinter::new(path, profile).print(data).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_network_dispatch_reaches_the_socket() {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            sock.read_to_end(&mut buf).await.unwrap();
            buf
        });

        let printer = PrinterConfig::network("Caixa", "127.0.0.1", port);
        TransportDispatcher
            .dispatch(&printer, b"\x1b@ticket")
            .await
            .unwrap();

        assert_eq!(server.await.unwrap(), b"\x1b@ticket");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_serial_dispatch_maps_profile() {
        let printer = PrinterConfig {
            interface: PrinterInterface::Serial {
                path: "/dev/missing-port".to_string(),
                baud_rate: 19200,
                data_bits: 8,
                parity: Parity::None,
                stop_bits: 1,
            },
            ..PrinterConfig::network("Serial", "x", 1)
        };

        match TransportDispatcher.dispatch(&printer, b"x").await {
            Err(TransportError::PortOpenFailed(_)) => {}
            other => panic!("expected PortOpenFailed, got {:?}", other),
        }
    }
}
