#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_time::{Duration, with_timeout};
use esp_hal::clock::CpuClock;
use esp_hal::rtc_cntl::Rtc;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info, warn};

use siesta_core::persist::{HealthStore, ShutdownStatus};
use siesta_core::rtc::calendar;
use siesta_core::telemetry::{
    ReportSink, SHUTDOWN_ERROR_BODY, SHUTDOWN_ERROR_RESOURCE, is_accepted,
};
use siesta_core::wake::{WakeCycle, store_datetime};
use siesta_firmware::health_slot::RtcHealthSlot;
use siesta_firmware::net::{self, HttpReporter};
use siesta_firmware::system_clock::{self, SystemClock};
use siesta_firmware::{sensors, wifi_secrets};

/// Give any single network interaction this long before declaring the radio
/// unresponsive and forcing the shutdown path.
const NETWORK_DEADLINE: Duration = Duration::from_secs(30);

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
esp_bootloader_esp_idf::esp_app_desc!();

macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let wake_cause = esp_hal::rtc_cntl::wakeup_cause();
    info!("boot, wake cause: {wake_cause:?}");

    let device_config = wifi_secrets::config();
    let mut rtc = Rtc::new(peripherals.LPWR);
    let mut cycle = WakeCycle::new();

    let mut health = HealthStore::new(RtcHealthSlot::take().expect("health slot taken twice"));
    let mut clock = SystemClock::take().expect("system clock taken twice");

    if let Some(target) = system_clock::wake_target(&clock) {
        info!(
            "woke on schedule at {:02}:{:02}:{:02}",
            target.time.hour, target.time.minute, target.time.second
        );
    }

    // Radio and network stack.
    let radio_init = esp_radio::init().expect("radio controller init failed");
    let (mut controller, interfaces) =
        esp_radio::wifi::new(&radio_init, peripherals.WIFI, Default::default())
            .expect("Wi-Fi controller init failed");

    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let seed = 0x5139_7A5E_u64;
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        net_config,
        mk_static!(StackResources<3>, StackResources::<3>::new()),
        seed,
    );
    spawner.spawn(net::net_task(runner)).ok();

    let connect = async {
        net::wifi_connect(
            &mut controller,
            device_config.internet.ssid,
            device_config.internet.password,
        )
        .await;
        net::wait_for_ip(stack).await;
    };
    if with_timeout(NETWORK_DEADLINE, connect).await.is_err() {
        radio_unresponsive(&mut health, &mut cycle, &mut clock, &mut rtc, &device_config);
    }

    // Sync the calendar before deriving anything from it.
    if clock.needs_sync() {
        info!("time needs updated");
        match net::sntp_query(stack).await {
            Ok(sntp_seconds) => match calendar::from_sntp(sntp_seconds) {
                Some(now) => store_datetime(&mut clock, &now),
                None => error!("SNTP returned a pre-2000 timestamp"),
            },
            Err(e) => error!("SNTP sync failed: {e}"),
        }
    } else {
        info!("time doesn't need updated");
    }

    let mut reporter = match HttpReporter::new(
        stack,
        device_config.report.host,
        device_config.report.port,
    ) {
        Ok(reporter) => reporter,
        Err(e) => {
            // Without a report target there is nothing to stay awake for.
            error!("report host invalid: {e}");
            suspend(&mut cycle, &mut clock, &mut rtc, &device_config);
        }
    };

    // Report an unclean (or unreadable) previous shutdown before clearing it,
    // so a persistent failure keeps resurfacing every wake cycle.
    match health.last_shutdown_status() {
        ShutdownStatus::Clean => info!("last shutdown was OK"),
        status @ (ShutdownStatus::Unclean | ShutdownStatus::Corrupt) => {
            warn!("last shutdown was not OK: {status:?}");
            match post_with_deadline(
                &mut reporter,
                SHUTDOWN_ERROR_RESOURCE,
                SHUTDOWN_ERROR_BODY,
                &mut health,
                &mut cycle,
                &mut clock,
                &mut rtc,
                &device_config,
            )
            .await
            {
                Some(code) if is_accepted(code) => {
                    let cleared = match status {
                        // A corrupt record holds nothing worth keeping.
                        ShutdownStatus::Corrupt => health.wipe(),
                        _ => health.acknowledge_shutdown_error(),
                    };
                    if let Err(e) = cleared {
                        error!("clearing shutdown error failed: {e}");
                    }
                }
                Some(code) => warn!("shutdown error report rejected: {code}"),
                None => warn!("shutdown error report failed"),
            }
        }
    }

    // Sensor readings, each posted independently; one bad sensor must not
    // silence the others.
    let mut i2c = esp_hal::i2c::master::I2c::new(
        peripherals.I2C0,
        esp_hal::i2c::master::Config::default(),
    )
    .expect("I2C init failed")
    .with_sda(peripherals.GPIO8)
    .with_scl(peripherals.GPIO9)
    .into_async();

    #[cfg(feature = "sensor-bmp388")]
    if let Ok(reading) = sensors::pressure::sample(&mut i2c).await {
        post_reading(
            &mut reporter,
            reading,
            &mut health,
            &mut cycle,
            &mut clock,
            &mut rtc,
            &device_config,
        )
        .await;
    }

    #[cfg(feature = "sensor-sht40")]
    if let Ok(reading) = sensors::temperature::sample(&mut i2c).await {
        post_reading(
            &mut reporter,
            reading,
            &mut health,
            &mut cycle,
            &mut clock,
            &mut rtc,
            &device_config,
        )
        .await;
    }

    #[cfg(feature = "sensor-bh1750")]
    if let Ok(reading) = sensors::light::sample(&mut i2c).await {
        post_reading(
            &mut reporter,
            reading,
            &mut health,
            &mut cycle,
            &mut clock,
            &mut rtc,
            &device_config,
        )
        .await;
    }

    let _ = i2c;

    net::wifi_disconnect(&mut controller).await;

    info!("done");
    suspend(&mut cycle, &mut clock, &mut rtc, &device_config)
}

/// Post one sensor reading, feeding timeouts into the unresponsive path.
async fn post_reading(
    reporter: &mut HttpReporter,
    reading: siesta_core::telemetry::Reading,
    health: &mut HealthStore<RtcHealthSlot>,
    cycle: &mut WakeCycle,
    clock: &mut SystemClock,
    rtc: &mut Rtc<'_>,
    config: &siesta_core::config::Config<'_>,
) {
    info!("posting {}", reading.resource());
    match post_with_deadline(
        reporter,
        reading.resource(),
        reading.body().as_str(),
        health,
        cycle,
        clock,
        rtc,
        config,
    )
    .await
    {
        Some(code) if is_accepted(code) => {}
        Some(code) => warn!("{} rejected: {code}", reading.resource()),
        None => warn!("{} post failed", reading.resource()),
    }
}

/// Post with the radio deadline applied. A deadline overrun means the radio
/// has hung, which is unrecoverable while awake; never returns in that case.
async fn post_with_deadline(
    reporter: &mut HttpReporter,
    resource: &str,
    body: &str,
    health: &mut HealthStore<RtcHealthSlot>,
    cycle: &mut WakeCycle,
    clock: &mut SystemClock,
    rtc: &mut Rtc<'_>,
    config: &siesta_core::config::Config<'_>,
) -> Option<u16> {
    match with_timeout(NETWORK_DEADLINE, reporter.post(resource, body)).await {
        Ok(Ok(code)) => Some(code),
        Ok(Err(e)) => {
            error!("post {resource} failed: {e}");
            None
        }
        Err(_) => radio_unresponsive(health, cycle, clock, rtc, config),
    }
}

/// Recovery path registered against the radio: record the forced shutdown,
/// then schedule the next wake and suspend.
fn radio_unresponsive(
    health: &mut HealthStore<RtcHealthSlot>,
    cycle: &mut WakeCycle,
    clock: &mut SystemClock,
    rtc: &mut Rtc<'_>,
    config: &siesta_core::config::Config<'_>,
) -> ! {
    warn!("radio unresponsive, forcing shutdown");
    if let Err(e) = health.record_unresponsive_shutdown() {
        error!("recording unresponsive shutdown failed: {e}");
    }
    suspend(cycle, clock, rtc, config)
}

/// Program the wake alarm and drop into standby. Never returns; the RTC
/// alarm resets the chip back into `main`.
fn suspend(
    cycle: &mut WakeCycle,
    clock: &mut SystemClock,
    rtc: &mut Rtc<'_>,
    config: &siesta_core::config::Config<'_>,
) -> ! {
    let standby = cycle.schedule_wake(clock, config.standby_secs);
    system_clock::enter_standby(clock, rtc, standby, config.standby_secs)
}
