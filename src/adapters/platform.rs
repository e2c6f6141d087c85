//! Platform adapter: monotonic clock, blocking delay and restart.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()`, FreeRTOS delay and
//!   `esp_restart()`.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `thread::sleep` for host-side simulation.  Restart is recorded rather
//!   than performed.

use log::warn;

pub struct EspPlatform {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    #[cfg(not(target_os = "espidf"))]
    restarts: u32,
}

impl Default for EspPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl EspPlatform {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            restarts: 0,
        }
    }

    /// Restarts requested so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

#[cfg(target_os = "espidf")]
impl crate::app::ports::PlatformPort for EspPlatform {
    fn now_ms(&self) -> u32 {
        // Truncation wraps after ~49 days; every consumer uses wrapping_sub.
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    fn restart(&mut self) {
        warn!("Restarting");
        // SAFETY: esp_restart never returns; no Rust state needs unwinding.
        unsafe { esp_idf_svc::sys::esp_restart() };
    }
}

#[cfg(not(target_os = "espidf"))]
impl crate::app::ports::PlatformPort for EspPlatform {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    fn restart(&mut self) {
        warn!("Restart requested (simulated)");
        self.restarts += 1;
    }
}
