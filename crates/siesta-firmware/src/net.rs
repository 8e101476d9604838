//! Wi-Fi bring-up, SNTP query, and the HTTP report sink.

use core::fmt::Write as _;
use core::net::Ipv4Addr;

use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{Runner, Stack, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};
use embedded_io_async::Write;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice};
use heapless::String;
use log::{info, warn};
use siesta_core::telemetry::ReportSink;
use thiserror_no_std::Error;

/// Cloudflare-anycast pool.ntp.org instance.
const SNTP_SERVER: Ipv4Addr = Ipv4Addr::new(162, 159, 200, 1);
const SNTP_PORT: u16 = 123;
const SNTP_TIMEOUT: Duration = Duration::from_secs(3);

const RESPONSE_CAPACITY: usize = 256;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    #[error("report host is not a dotted-quad IPv4 address")]
    BadAddress,
    #[error("TCP connect failed")]
    Connect,
    #[error("socket I/O failed")]
    Io,
    #[error("server response was not an HTTP status line")]
    BadResponse,
    #[error("SNTP exchange timed out")]
    SntpTimeout,
}

/// Bring the station interface up and keep retrying until associated.
pub async fn wifi_connect(controller: &mut WifiController<'static>, ssid: &str, password: &str) {
    if !matches!(controller.is_started(), Ok(true)) {
        let client_config = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(ssid.into())
                .with_password(password.into()),
        );
        controller
            .set_config(&client_config)
            .expect("client config rejected");
        info!("starting Wi-Fi");
        controller.start_async().await.expect("Wi-Fi start failed");
    }

    info!("connecting to {ssid}");
    loop {
        match controller.connect_async().await {
            Ok(()) => {
                info!("Wi-Fi connected");
                break;
            }
            Err(e) => {
                warn!("connect failed: {e:?}, retrying");
                Timer::after(Duration::from_secs(5)).await;
            }
        }
    }
}

/// Disconnect and stop the radio ahead of standby.
pub async fn wifi_disconnect(controller: &mut WifiController<'static>) {
    if let Err(e) = controller.disconnect_async().await {
        warn!("disconnect: {e:?}");
    }
    if let Err(e) = controller.stop_async().await {
        warn!("radio stop: {e:?}");
    }
    info!("Wi-Fi stopped");
}

/// Block until DHCP has produced an address.
pub async fn wait_for_ip(stack: Stack<'static>) {
    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
    loop {
        if let Some(config) = stack.config_v4() {
            info!("got IP: {}", config.address);
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// One SNTP exchange; returns seconds since 1900 from the transmit
/// timestamp.
pub async fn sntp_query(stack: Stack<'static>) -> Result<u32, NetError> {
    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buffer = [0u8; 128];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_buffer = [0u8; 128];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    socket.bind(0).map_err(|_| NetError::Io)?;

    // LI=0, VN=3, Mode=3 (client).
    let mut packet = [0u8; 48];
    packet[0] = 0x1B;

    socket
        .send_to(&packet, (SNTP_SERVER, SNTP_PORT))
        .await
        .map_err(|_| NetError::Io)?;

    let (len, _) = with_timeout(SNTP_TIMEOUT, socket.recv_from(&mut packet))
        .await
        .map_err(|_| NetError::SntpTimeout)?
        .map_err(|_| NetError::Io)?;

    if len < 48 {
        return Err(NetError::BadResponse);
    }

    // Transmit timestamp seconds live in bytes 40..44.
    Ok(u32::from_be_bytes([
        packet[40], packet[41], packet[42], packet[43],
    ]))
}

/// Parse a dotted-quad address without pulling in a resolver.
pub fn parse_ipv4(host: &str) -> Result<Ipv4Addr, NetError> {
    let mut octets = [0u8; 4];
    let mut parts = host.split('.');
    for octet in &mut octets {
        *octet = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or(NetError::BadAddress)?;
    }
    if parts.next().is_some() {
        return Err(NetError::BadAddress);
    }
    Ok(Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]))
}

/// [`ReportSink`] over a plain TCP socket, one short-lived connection per
/// post.
pub struct HttpReporter {
    stack: Stack<'static>,
    host: &'static str,
    address: Ipv4Addr,
    port: u16,
}

impl HttpReporter {
    pub fn new(stack: Stack<'static>, host: &'static str, port: u16) -> Result<Self, NetError> {
        Ok(Self {
            stack,
            host,
            address: parse_ipv4(host)?,
            port,
        })
    }
}

impl ReportSink for HttpReporter {
    type Error = NetError;

    async fn post(&mut self, resource: &str, body: &str) -> Result<u16, NetError> {
        let mut rx_buffer = [0u8; 1024];
        let mut tx_buffer = [0u8; 1024];
        let mut socket = TcpSocket::new(self.stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(10)));

        socket
            .connect((self.address, self.port))
            .await
            .map_err(|_| NetError::Connect)?;

        let mut request: String<512> = String::new();
        write!(
            request,
            "POST {resource} HTTP/1.0\r\n\
             Host: {host}\r\n\
             Content-Type: text/plain\r\n\
             Content-Length: {length}\r\n\
             \r\n\
             {body}",
            host = self.host,
            length = body.len(),
        )
        .map_err(|_| NetError::Io)?;

        socket
            .write_all(request.as_bytes())
            .await
            .map_err(|_| NetError::Io)?;

        let mut response = [0u8; RESPONSE_CAPACITY];
        let mut filled = 0;
        while filled < response.len() {
            match socket.read(&mut response[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(_) => return Err(NetError::Io),
            }
            // The status line is all we need.
            if response[..filled].windows(2).any(|w| w == b"\r\n") {
                break;
            }
        }
        socket.close();

        parse_status_line(&response[..filled])
    }
}

/// Extract the status code from `HTTP/1.x NNN ...`.
fn parse_status_line(response: &[u8]) -> Result<u16, NetError> {
    let line = response
        .split(|&b| b == b'\r')
        .next()
        .ok_or(NetError::BadResponse)?;
    let mut fields = line.split(|&b| b == b' ');

    let version = fields.next().ok_or(NetError::BadResponse)?;
    if !version.starts_with(b"HTTP/") {
        return Err(NetError::BadResponse);
    }

    let code = fields.next().ok_or(NetError::BadResponse)?;
    core::str::from_utf8(code)
        .ok()
        .and_then(|code| code.parse().ok())
        .ok_or(NetError::BadResponse)
}
