use std::time::Duration;
use log::{debug, info, warn};
use tokio::process::Command;

/// One `systemctl is-active` call. Any failure to run it counts as inactive.
pub async fn is_active(service: &str) -> bool {
    match Command::new("systemctl").arg("is-active").arg(service).output().await {
        Ok(output) => {
            let state = String::from_utf8_lossy(&output.stdout);
            debug!("systemctl is-active {service}: {}", state.trim());
            state.trim() == "active"
        }
        Err(e) => {
            debug!("systemctl unavailable: {e}");
            false
        }
    }
}

/// Poll until the unit reports active, up to `attempts` tries `interval` apart.
pub async fn wait_until_active(service: &str, attempts: u32, interval: Duration) -> bool {
    for attempt in 1..=attempts.max(1) {
        if is_active(service).await {
            info!("{service} is active");
            return true;
        }
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    warn!("{service} not active after {attempts} attempts");
    false
}
