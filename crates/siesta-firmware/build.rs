//! Forwards Wi-Fi and reporting-server settings from a `.env` file (or the
//! environment) into `env!` constants, so credentials never live in source.

fn main() {
    // A missing .env is fine; plain environment variables still apply.
    let _ = dotenvy::dotenv();

    for key in ["WIFI_SSID", "WIFI_PASSWORD", "REPORT_HOST", "REPORT_PORT"] {
        let value = std::env::var(key).unwrap_or_default();
        println!("cargo:rustc-env={key}={value}");
        println!("cargo:rerun-if-env-changed={key}");
    }
    println!("cargo:rerun-if-changed=.env");
}
