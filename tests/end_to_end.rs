use std::collections::VecDeque;
use std::ffi::CString;
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use scanner_mqtt::broker::{BrokerConnector, BrokerLink, Publication};
use scanner_mqtt::config::Config;
use scanner_mqtt::devices::DeviceEntry;
use scanner_mqtt::error::{BrokerError, DeviceError};
use scanner_mqtt::locator::{HidBackend, ReportSource};
use scanner_mqtt::supervisor::{StopToken, Supervisor};

struct KeyboardDevice {
    keycodes: VecDeque<u8>,
}

impl ReportSource for KeyboardDevice {
    fn read_report(&mut self, buf: &mut [u8], _timeout_ms: i32) -> Result<usize, DeviceError> {
        match self.keycodes.pop_front() {
            Some(code) => {
                let report = [0, 0, code, 0, 0, 0, 0, 0];
                buf[..report.len()].copy_from_slice(&report);
                Ok(report.len())
            }
            None => {
                sleep(Duration::from_millis(1));
                Ok(0)
            }
        }
    }
}

struct Host {
    attached: Vec<DeviceEntry>,
    keycodes: Vec<u8>,
}

impl HidBackend for Host {
    type Device = KeyboardDevice;

    fn enumerate(&mut self) -> Result<Vec<DeviceEntry>, DeviceError> {
        Ok(self.attached.clone())
    }

    fn open(&mut self, entry: &DeviceEntry) -> Result<KeyboardDevice, DeviceError> {
        assert_eq!(entry.path, CString::new("/dev/hidraw1").unwrap());
        Ok(KeyboardDevice {
            keycodes: self.keycodes.drain(..).collect(),
        })
    }
}

struct RecordingLink {
    published: Arc<Mutex<Vec<Publication>>>,
    stop: StopToken,
}

impl BrokerLink for RecordingLink {
    fn publish(&mut self, publication: &Publication) -> Result<(), BrokerError> {
        self.published.lock().unwrap().push(publication.clone());
        self.stop.stop();
        Ok(())
    }

    fn poll(&mut self, _timeout: Duration) -> Result<(), BrokerError> {
        sleep(Duration::from_millis(1));
        Ok(())
    }
}

struct RecordingBroker {
    refuse_first: usize,
    published: Arc<Mutex<Vec<Publication>>>,
    stop: StopToken,
}

impl BrokerConnector for RecordingBroker {
    type Link = RecordingLink;

    fn connect(&mut self, _host: &str, _port: u16) -> Result<RecordingLink, BrokerError> {
        if self.refuse_first > 0 {
            self.refuse_first -= 1;
            return Err(BrokerError::Connection("connection refused".to_string()));
        }
        Ok(RecordingLink {
            published: self.published.clone(),
            stop: self.stop.clone(),
        })
    }
}

fn entry(vendor_id: u16, product_id: u16, path: &str) -> DeviceEntry {
    DeviceEntry {
        vendor_id,
        product_id,
        path: CString::new(path).unwrap(),
    }
}

fn scan_through(refuse_first: usize) -> Vec<Publication> {
    let config = Config {
        locate_retry_interval: Duration::ZERO,
        poll_interval: Duration::ZERO,
        ..Config::default()
    };
    let supervisor = Supervisor::new(config);
    let published = Arc::new(Mutex::new(Vec::new()));

    let host = Host {
        attached: vec![
            entry(0x046d, 0xc52b, "/dev/hidraw0"),
            entry(0x05e0, 0x0200, "/dev/hidraw1"),
        ],
        keycodes: vec![0x1D, 0x00, 0x1E, 0x00, 0x28, 0x00],
    };
    let broker = RecordingBroker {
        refuse_first,
        published: published.clone(),
        stop: supervisor.stop_token(),
    };

    supervisor.run_with(move || Some(host), broker).unwrap();

    let published = published.lock().unwrap().clone();
    published
}

#[test]
fn scan_is_published_once_on_the_scan_topic() {
    let published = scan_through(0);

    assert_eq!(
        published,
        vec![Publication {
            topic: "hasi/code_scanner".to_string(),
            payload: "01".to_string(),
        }]
    );
}

#[test]
fn scan_survives_broker_reconnects() {
    let published = scan_through(3);

    assert_eq!(published.len(), 1);
    assert_eq!(published[0].payload, "01");
}
