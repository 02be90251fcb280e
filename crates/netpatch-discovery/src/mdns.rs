//! mDNS/Bonjour discovery

use crate::{DiscoveredDevice, DiscoveryError, DiscoveryEvent, Result};
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// mDNS service type advertised by audio devices' control service
pub const SERVICE_TYPE: &str = crate::DEFAULT_SERVICE_TYPE;

/// Browse for `service_type` until `stop` is cancelled or the receiver of
/// `tx` is dropped.
///
/// Fails only if the mDNS daemon cannot be started.
pub async fn discover(
    service_type: &str,
    tx: mpsc::Sender<DiscoveryEvent>,
    stop: CancellationToken,
) -> Result<()> {
    let mdns = ServiceDaemon::new().map_err(|e| DiscoveryError::Mdns(e.to_string()))?;

    let receiver = mdns
        .browse(service_type)
        .map_err(|e| DiscoveryError::Mdns(e.to_string()))?;

    info!("Starting mDNS discovery for {}", service_type);

    loop {
        let event = tokio::select! {
            _ = stop.cancelled() => break,
            event = receiver.recv_async() => event,
        };

        match event {
            Ok(ServiceEvent::ServiceResolved(info)) => {
                debug!("mDNS resolved: {:?}", info);
                let device = record_from_service(&info, service_type);
                info!("Discovered device: {} at {:?}", device.name, device.addresses);

                if tx.send(DiscoveryEvent::Found(device)).await.is_err() {
                    break;
                }
            }
            Ok(ServiceEvent::ServiceRemoved(_, fullname)) => {
                info!("Device lost: {}", fullname);
                if tx.send(DiscoveryEvent::Lost(fullname)).await.is_err() {
                    break;
                }
            }
            Ok(ServiceEvent::SearchStarted(_)) => {
                debug!("mDNS search started");
            }
            Ok(ServiceEvent::SearchStopped(_)) => {
                debug!("mDNS search stopped");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("mDNS receive error: {:?}", e);
                let _ = tx.send(DiscoveryEvent::Error(e.to_string())).await;
                break;
            }
        }
    }

    let _ = mdns.stop_browse(service_type);
    let _ = mdns.shutdown();
    Ok(())
}

/// Build a device record from a resolved service.
///
/// The name comes from the TXT `name` property when present, otherwise
/// from the service instance name.
pub fn record_from_service(info: &ServiceInfo, service_type: &str) -> DiscoveredDevice {
    let fullname = info.get_fullname();
    let instance = fullname
        .strip_suffix(service_type)
        .map(|s| s.trim_end_matches('.'))
        .unwrap_or(fullname);

    let mut device = DiscoveredDevice::new(fullname, instance);
    device.hostname = info.get_hostname().trim_end_matches('.').to_string();
    device.port = info.get_port();

    for property in info.get_properties().iter() {
        if let Some(val) = property.val() {
            device.meta.insert(
                property.key().to_string(),
                String::from_utf8_lossy(val).to_string(),
            );
        }
    }

    if let Some(name) = device.meta.get("name").filter(|n| !n.is_empty()) {
        device.name = name.clone();
    }

    let mut addresses: Vec<String> = info.get_addresses().iter().map(|a| a.to_string()).collect();
    addresses.sort();
    device.addresses = addresses;

    device
}
