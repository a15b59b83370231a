//! Printer transports for sending ESC/POS data
//!
//! Three physical channels, one trait:
//! - Network printers (raw TCP, port 9100)
//! - OS print spooler (RAW document, Windows)
//! - Serial ports (tty/COM, 8-bit raw profile)
//!
//! Every transport is a single attempt: it either delivers the whole buffer
//! or returns a [`TransportError`]. Retry policy belongs to the caller.

use crate::error::{PrintResult, TransportError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, instrument};

/// Trait for printer transports
#[allow(async_fn_in_trait)]
pub trait Printer {
    /// Send raw ESC/POS data to the printer
    async fn print(&self, data: &[u8]) -> PrintResult<()>;
}

// ============================================================================
// Network (TCP 9100)
// ============================================================================

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(8);
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// Network printer (raw TCP)
///
/// Most thermal printers accept raw ESC/POS bytes on TCP port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    connect_timeout: Duration,
    write_timeout: Duration,
}

impl NetworkPrinter {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, write: Duration) -> Self {
        self.connect_timeout = connect;
        self.write_timeout = write;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(addr = %self.endpoint(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let addr = self.endpoint();

        let mut stream = tokio::time::timeout(
            self.connect_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        .map_err(|_| TransportError::ConnectTimeout(addr.clone()))?
        .map_err(|e| TransportError::SocketError(format!("{}: {}", addr, e)))?;

        info!(bytes = data.len(), "connected, sending");

        tokio::time::timeout(self.write_timeout, async {
            stream.write_all(data).await?;
            stream.flush().await?;
            // Half-close tells the printer the job is complete
            stream.shutdown().await
        })
        .await
        .map_err(|_| TransportError::WriteTimeout(addr.clone()))?
        .map_err(|e| TransportError::SocketError(format!("{}: {}", addr, e)))?;

        info!("print data sent");
        Ok(())
    }
}

// ============================================================================
// OS spooler (RAW document)
// ============================================================================

/// An installed system printer, as reported by the OS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPrinter {
    pub name: String,
    pub port: String,
    pub status: String,
}

/// Spooler printer (RAW datatype)
///
/// Submits the buffer as a RAW print job addressed by the exact printer
/// display name. The buffer is staged in a transient file that is removed
/// after submission regardless of outcome.
#[derive(Debug, Clone)]
pub struct SpoolerPrinter {
    name: String,
}

impl SpoolerPrinter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Printer for SpoolerPrinter {
    #[instrument(skip(self, data), fields(printer = %self.name, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        use std::io::Write;

        // Transient artifact; NamedTempFile removes it on drop no matter
        // how submission ends
        let mut artifact = tempfile::NamedTempFile::new()
            .map_err(|e| TransportError::SpoolerOpenFailed(format!("spool artifact: {}", e)))?;
        artifact
            .write_all(data)
            .and_then(|_| artifact.flush())
            .map_err(|e| TransportError::SpoolerOpenFailed(format!("spool artifact: {}", e)))?;

        let name = self.name.clone();
        let path = artifact.path().to_path_buf();

        let result = tokio::task::spawn_blocking(move || spool_raw(&name, &path))
            .await
            .map_err(|e| TransportError::HelperProcessError(format!("spool task: {}", e)))?;

        drop(artifact);

        if result.is_ok() {
            info!("spool job submitted");
        }
        result
    }
}

/// Submit a staged RAW document to the spooler
#[cfg(windows)]
fn spool_raw(printer_name: &str, artifact: &std::path::Path) -> PrintResult<()> {
    use core::ffi::c_void;
    use windows::Win32::Graphics::Printing::{
        ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, PRINTER_HANDLE,
        StartDocPrinterW, StartPagePrinter, WritePrinter,
    };
    use windows::core::{PCWSTR, PWSTR};

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    let data = std::fs::read(artifact)
        .map_err(|e| TransportError::SpoolerOpenFailed(format!("read artifact: {}", e)))?;

    unsafe {
        let mut handle: PRINTER_HANDLE = PRINTER_HANDLE::default();
        let name_w = to_wide(printer_name);

        OpenPrinterW(PCWSTR::from_raw(name_w.as_ptr()), &mut handle, None).map_err(|_| {
            TransportError::SpoolerOpenFailed(format!("OpenPrinter: {}", printer_name))
        })?;

        let doc_name_w = to_wide("Delivery Receipt");
        let datatype_w = to_wide("RAW");
        let doc_info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name_w.as_ptr() as *mut _),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype_w.as_ptr() as *mut _),
        };

        if StartDocPrinterW(handle, 1, &doc_info as *const DOC_INFO_1W) == 0 {
            let _ = ClosePrinter(handle);
            return Err(TransportError::SpoolerOpenFailed(format!(
                "StartDocPrinter: {}",
                printer_name
            )));
        }

        if !StartPagePrinter(handle).as_bool() {
            let _ = EndDocPrinter(handle);
            let _ = ClosePrinter(handle);
            return Err(TransportError::SpoolerOpenFailed(format!(
                "StartPagePrinter: {}",
                printer_name
            )));
        }

        let mut written: u32 = 0;
        let ok = WritePrinter(
            handle,
            data.as_ptr() as *const c_void,
            data.len() as u32,
            &mut written,
        );

        let _ = EndPagePrinter(handle);
        let _ = EndDocPrinter(handle);
        let _ = ClosePrinter(handle);

        if !ok.as_bool() {
            return Err(TransportError::SpoolerWriteFailed(format!(
                "WritePrinter: {}",
                printer_name
            )));
        }

        if written != data.len() as u32 {
            return Err(TransportError::SpoolerWriteFailed(format!(
                "short write: {}/{} bytes",
                written,
                data.len()
            )));
        }

        Ok(())
    }
}

#[cfg(not(windows))]
fn spool_raw(printer_name: &str, _artifact: &std::path::Path) -> PrintResult<()> {
    Err(TransportError::SpoolerOpenFailed(format!(
        "RAW spooler printing requires Windows (printer: {})",
        printer_name
    )))
}

/// Enumerate installed system printers
///
/// Side-effecting OS query; failures degrade to an empty list so callers
/// never block on enumeration errors.
pub fn list_system_printers() -> Vec<SystemPrinter> {
    #[cfg(windows)]
    {
        match enum_printers() {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "printer enumeration failed");
                Vec::new()
            }
        }
    }
    #[cfg(not(windows))]
    {
        Vec::new()
    }
}

#[cfg(windows)]
fn enum_printers() -> PrintResult<Vec<SystemPrinter>> {
    use windows::Win32::Graphics::Printing::{
        EnumPrintersW, PRINTER_ATTRIBUTE_WORK_OFFLINE, PRINTER_ENUM_CONNECTIONS,
        PRINTER_ENUM_LOCAL, PRINTER_INFO_5W,
    };
    use windows::core::PWSTR;

    unsafe {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: u32 = 0;
        let mut returned: u32 = 0;

        let _ = EnumPrintersW(flags, None, 5, None, &mut needed, &mut returned);

        if needed == 0 {
            return Ok(Vec::new());
        }

        let mut buf: Vec<u8> = vec![0; needed as usize];
        EnumPrintersW(
            flags,
            None,
            5,
            Some(buf.as_mut_slice()),
            &mut needed,
            &mut returned,
        )
        .map_err(|_| TransportError::SpoolerOpenFailed("EnumPrinters".to_string()))?;

        let ptr = buf.as_ptr() as *const PRINTER_INFO_5W;
        let slice = std::slice::from_raw_parts(ptr, returned as usize);

        let mut result = Vec::new();
        for info in slice.iter() {
            if info.pPrinterName.is_null() {
                continue;
            }
            let name = PWSTR(info.pPrinterName.0).to_string().unwrap_or_default();
            let port = if info.pPortName.is_null() {
                String::new()
            } else {
                PWSTR(info.pPortName.0).to_string().unwrap_or_default()
            };

            if is_virtual_port(&port) {
                continue;
            }

            let status = if (info.Attributes & PRINTER_ATTRIBUTE_WORK_OFFLINE) != 0 {
                "Offline".to_string()
            } else {
                "OK".to_string()
            };

            result.push(SystemPrinter { name, port, status });
        }

        Ok(result)
    }
}

/// Virtual printer ports (PDF writers, OneNote, XPS) are not physical targets
#[cfg(windows)]
fn is_virtual_port(port: &str) -> bool {
    let p = port.to_lowercase();
    p == "file:"
        || p == "portprompt:"
        || p == "xpsport:"
        || p.starts_with("onenote")
        || p == "nul:"
        || p.starts_with("wfsport:")
}

// ============================================================================
// Serial (tty/COM)
// ============================================================================

const SERIAL_TIMEOUT: Duration = Duration::from_secs(15);

/// Serial parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerialParity {
    #[default]
    None,
    Even,
    Odd,
}

/// Serial line profile (default 9600-8-N-1)
#[derive(Debug, Clone)]
pub struct SerialProfile {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: SerialParity,
    pub stop_bits: u8,
}

impl Default for SerialProfile {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            parity: SerialParity::None,
            stop_bits: 1,
        }
    }
}

/// Serial printer (tty/COM device)
///
/// Opens the device, applies a raw 8-bit profile, writes the buffer and
/// waits for the OS drain before closing.
#[derive(Debug, Clone)]
pub struct SerialPrinter {
    path: String,
    profile: SerialProfile,
}

impl SerialPrinter {
    pub fn new(path: &str, profile: SerialProfile) -> Self {
        Self {
            path: path.to_string(),
            profile,
        }
    }
}

impl Printer for SerialPrinter {
    #[instrument(skip(self, data), fields(path = %self.path, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        #[cfg(unix)]
        {
            let path = self.path.clone();
            let profile = self.profile.clone();
            let data = data.to_vec();

            let result = tokio::time::timeout(
                SERIAL_TIMEOUT,
                tokio::task::spawn_blocking(move || serial::write_all(&path, &profile, &data)),
            )
            .await
            .map_err(|_| TransportError::WriteFailed(format!("timeout: {}", self.path)))?
            .map_err(|e| TransportError::WriteFailed(format!("serial task: {}", e)))?;

            if result.is_ok() {
                info!("serial data drained");
            }
            result
        }
        #[cfg(not(unix))]
        {
            let _ = data;
            Err(TransportError::DriverUnavailable)
        }
    }
}

#[cfg(unix)]
mod serial {
    //! Raw tty writes via termios
    //!
    //! The device is put in a fully raw profile so ESC/POS bytes pass
    //! through without CR/LF translation or flow-control surprises.

    use super::{SerialParity, SerialProfile};
    use crate::error::{PrintResult, TransportError};
    use std::io::Write;
    use std::os::unix::io::{AsRawFd, RawFd};

    pub fn write_all(path: &str, profile: &SerialProfile, data: &[u8]) -> PrintResult<()> {
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| TransportError::PortOpenFailed(format!("{}: {}", path, e)))?;

        configure(file.as_raw_fd(), profile)
            .map_err(|e| TransportError::PortOpenFailed(format!("{}: {}", path, e)))?;

        file.write_all(data)
            .and_then(|_| file.flush())
            .map_err(|e| TransportError::WriteFailed(format!("{}: {}", path, e)))?;

        // tcdrain blocks until the UART reports every byte transmitted
        if unsafe { libc::tcdrain(file.as_raw_fd()) } != 0 {
            return Err(TransportError::DrainFailed(format!(
                "{}: {}",
                path,
                std::io::Error::last_os_error()
            )));
        }

        Ok(())
    }

    fn configure(fd: RawFd, profile: &SerialProfile) -> std::io::Result<()> {
        let mut tio: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut tio) } != 0 {
            return Err(std::io::Error::last_os_error());
        }

        // Raw mode: no input translation, no output processing, no echo,
        // no canonical line buffering
        tio.c_iflag &= !(libc::IGNBRK
            | libc::BRKINT
            | libc::PARMRK
            | libc::ISTRIP
            | libc::INLCR
            | libc::IGNCR
            | libc::ICRNL
            | libc::IXON);
        tio.c_oflag &= !libc::OPOST;
        tio.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

        tio.c_cflag |= libc::CLOCAL | libc::CREAD;

        tio.c_cflag &= !libc::CSIZE;
        tio.c_cflag |= match profile.data_bits {
            5 => libc::CS5,
            6 => libc::CS6,
            7 => libc::CS7,
            _ => libc::CS8,
        };

        match profile.parity {
            SerialParity::None => {
                tio.c_cflag &= !libc::PARENB;
            }
            SerialParity::Even => {
                tio.c_cflag |= libc::PARENB;
                tio.c_cflag &= !libc::PARODD;
            }
            SerialParity::Odd => {
                tio.c_cflag |= libc::PARENB | libc::PARODD;
            }
        }

        if profile.stop_bits >= 2 {
            tio.c_cflag |= libc::CSTOPB;
        } else {
            tio.c_cflag &= !libc::CSTOPB;
        }

        let speed = baud_constant(profile.baud_rate);
        unsafe {
            libc::cfsetispeed(&mut tio, speed);
            libc::cfsetospeed(&mut tio, speed);
        }

        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tio) } != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(())
    }

    fn baud_constant(baud: u32) -> libc::speed_t {
        match baud {
            1200 => libc::B1200,
            2400 => libc::B2400,
            4800 => libc::B4800,
            9600 => libc::B9600,
            19200 => libc::B19200,
            38400 => libc::B38400,
            57600 => libc::B57600,
            115200 => libc::B115200,
            _ => libc::B9600,
        }
    }
}
