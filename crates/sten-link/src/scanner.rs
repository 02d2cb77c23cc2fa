//! Serial port enumeration
//!
//! Used to tell the operator which ports exist when the configured one
//! cannot be opened.

use serialport::{available_ports, SerialPortType};
use tracing::{info, warn};

use crate::error::LinkError;

/// Information about a serial port
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// USB product string, if this is a USB adapter
    pub product: Option<String>,
}

impl PortInfo {
    /// Create from serialport crate's port info
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                port: name,
                product: usb.product.clone(),
            },
            _ => Self {
                port: name,
                product: None,
            },
        }
    }

    /// Port name with the USB product appended when known
    pub fn label(&self) -> String {
        match &self.product {
            Some(product) => format!("{} ({})", self.port, product),
            None => self.port.clone(),
        }
    }
}

/// Enumerate all available serial ports
pub fn enumerate_ports() -> Result<Vec<PortInfo>, LinkError> {
    let ports = available_ports().map_err(|e| LinkError::EnumerationFailed(e.to_string()))?;
    Ok(ports
        .into_iter()
        .map(|p| PortInfo::from_serialport(p.port_name, &p.port_type))
        .collect())
}

/// Log the serial ports present on this machine
pub fn log_available_ports() {
    match enumerate_ports() {
        Ok(ports) if ports.is_empty() => info!("Serial ports available: none"),
        Ok(ports) => {
            let names: Vec<String> = ports.iter().map(PortInfo::label).collect();
            info!("Serial ports available: {}", names.join(", "));
        }
        Err(e) => warn!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serialport::UsbPortInfo;

    #[test]
    fn test_port_info_from_usb() {
        let usb_info = SerialPortType::UsbPort(UsbPortInfo {
            vid: 0x0403,
            pid: 0x6001,
            serial_number: Some("12345".to_string()),
            manufacturer: Some("FTDI".to_string()),
            product: Some("FT232R".to_string()),
        });

        let info = PortInfo::from_serialport("/dev/ttyUSB0".to_string(), &usb_info);

        assert_eq!(info.product.as_deref(), Some("FT232R"));
        assert_eq!(info.label(), "/dev/ttyUSB0 (FT232R)");
    }

    #[test]
    fn test_port_info_builtin() {
        let info = PortInfo::from_serialport("COM1".to_string(), &SerialPortType::Unknown);
        assert_eq!(info.product, None);
        assert_eq!(info.label(), "COM1");
    }
}
