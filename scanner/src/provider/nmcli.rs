use log::{debug, warn};
use std::process::Command;
use wifiidcore::prelude::{
    normalize_bssid, ConnectionStatus, Interface, Observation, ScanError, ScanProvider, ScanResult,
};

/// Linux provider backed by NetworkManager's `nmcli`.
pub struct NmcliProvider {
    interface: Option<String>,
}

impl NmcliProvider {
    /// `interface` pins scanning to one device; otherwise every Wi-Fi device is offered.
    pub fn new(interface: Option<String>) -> Self {
        Self { interface }
    }

    fn run(args: &[&str]) -> ScanResult<String> {
        debug!("nmcli {}", args.join(" "));
        let output = Command::new("nmcli")
            .args(args)
            .output()
            .map_err(|err| ScanError::Provider(format!("failed to run nmcli: {}", err)))?;

        if !output.status.success() {
            return Err(ScanError::Provider(format!(
                "nmcli {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn list(interface: &Interface) -> ScanResult<String> {
        Self::run(&[
            "-t",
            "-f",
            "IN-USE,SSID,BSSID,SIGNAL",
            "device",
            "wifi",
            "list",
            "ifname",
            &interface.name,
            "--rescan",
            "no",
        ])
    }
}

impl ScanProvider for NmcliProvider {
    fn interfaces(&self) -> ScanResult<Vec<Interface>> {
        let output = Self::run(&["-t", "-f", "DEVICE,TYPE", "device"])?;
        Ok(parse_devices(&output)
            .into_iter()
            .filter(|iface| {
                self.interface
                    .as_ref()
                    .map_or(true, |wanted| &iface.name == wanted)
            })
            .collect())
    }

    fn trigger_scan(&self, interface: &Interface) -> ScanResult<()> {
        // NetworkManager refuses rescans shortly after a previous one; the cached list is still usable.
        if let Err(err) = Self::run(&["device", "wifi", "rescan", "ifname", &interface.name]) {
            warn!("rescan request on {} rejected: {}", interface.name, err);
        }
        Ok(())
    }

    fn scan_results(&self, interface: &Interface) -> ScanResult<Vec<Observation>> {
        Ok(parse_wifi_list(&Self::list(interface)?).0)
    }

    fn connection_status(&self, interface: &Interface) -> ScanResult<ConnectionStatus> {
        let output = Self::run(&["-t", "-f", "DEVICE,STATE", "device"])?;
        Ok(parse_device_state(&output, &interface.name))
    }

    fn connected_bssid(&self, interface: &Interface) -> ScanResult<Option<String>> {
        Ok(parse_wifi_list(&Self::list(interface)?).1)
    }
}

/// Splits one line of `nmcli -t` output, honouring `\:` and `\\` escapes.
pub fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

/// nmcli reports signal as a 0-100 quality percentage.
pub fn percent_to_dbm(percent: i32) -> i32 {
    percent.clamp(0, 100) / 2 - 100
}

pub fn parse_devices(output: &str) -> Vec<Interface> {
    output
        .lines()
        .map(split_terse)
        .filter(|fields| fields.len() >= 2 && fields[1] == "wifi")
        .map(|fields| Interface::new(fields[0].clone()))
        .collect()
}

pub fn parse_device_state(output: &str, device: &str) -> ConnectionStatus {
    let connected = output
        .lines()
        .map(split_terse)
        .any(|fields| fields.len() >= 2 && fields[0] == device && fields[1].starts_with("connected"));
    if connected {
        ConnectionStatus::Connected
    } else {
        ConnectionStatus::Disconnected
    }
}

/// Parses `IN-USE,SSID,BSSID,SIGNAL` rows into observations plus the in-use BSSID.
pub fn parse_wifi_list(output: &str) -> (Vec<Observation>, Option<String>) {
    let mut observations = Vec::new();
    let mut in_use = None;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_terse(line);
        if fields.len() < 4 {
            warn!("skipping malformed nmcli row {:?}", line);
            continue;
        }
        let Ok(percent) = fields[3].trim().parse::<i32>() else {
            warn!("skipping nmcli row with bad signal {:?}", line);
            continue;
        };

        let observation = Observation::new(fields[1].clone(), &fields[2], percent_to_dbm(percent));
        if fields[0].trim() == "*" {
            in_use = Some(normalize_bssid(&fields[2]));
        }
        observations.push(observation);
    }

    (observations, in_use)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_terse_unescapes_mac_colons() {
        let fields = split_terse(r"*:Home\:Net:AA\:BB\:CC\:DD\:EE\:FF:72");
        assert_eq!(fields, vec!["*", "Home:Net", "AA:BB:CC:DD:EE:FF", "72"]);
    }

    #[test]
    fn wifi_list_yields_observations_and_connected_bssid() {
        let output = "\
 :CoffeeHouse:AA\\:AA\\:AA\\:AA\\:AA\\:AA:90
*:Home:BB\\:BB\\:BB\\:BB\\:BB\\:BB:60
 ::CC\\:CC\\:CC\\:CC\\:CC\\:CC:40
garbage
";
        let (observations, connected) = parse_wifi_list(output);
        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].rssi, -55);
        assert_eq!(observations[1].bssid, "bb:bb:bb:bb:bb:bb");
        assert_eq!(observations[2].ssid, "");
        assert_eq!(connected.as_deref(), Some("bb:bb:bb:bb:bb:bb"));
    }

    #[test]
    fn percent_conversion_matches_quality_scale() {
        assert_eq!(percent_to_dbm(100), -50);
        assert_eq!(percent_to_dbm(0), -100);
        assert_eq!(percent_to_dbm(150), -50);
    }

    #[test]
    fn device_listing_keeps_wifi_only() {
        let output = "wlp2s0:wifi\nenp3s0:ethernet\nlo:loopback\n";
        let devices = parse_devices(output);
        assert_eq!(devices, vec![Interface::new("wlp2s0")]);

        let states = "wlp2s0:connected\nenp3s0:unavailable\n";
        assert_eq!(parse_device_state(states, "wlp2s0"), ConnectionStatus::Connected);
        assert_eq!(parse_device_state(states, "enp3s0"), ConnectionStatus::Disconnected);
    }
}
