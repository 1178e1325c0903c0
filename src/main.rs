//! # Pad Bridge
//!
//! Translate host keyboard and joystick input into a stable virtual-pad
//! button image, and drive a force-feedback actuator with debounced rumble
//! commands.
//!
//! This binary runs the emulated frame loop: it polls the input devices
//! once per frame, arbitrates the virtual pad state, and exposes the
//! committed image to the consumer.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

mod config;
mod error;
mod pad;
mod rumble;

use config::Config;
use pad::devices::{Joystick, JoystickInput, Keyboard};
use pad::engine::PadEngine;
use pad::menu::MenuHandler;
use rumble::engine::RumbleEngine;

/// Emulated frame rate in Hz.
const FRAME_RATE_HZ: u32 = 60;

/// Number of frames between status log messages (~17 seconds at 60Hz).
const LOG_INTERVAL_FRAMES: u64 = 1000;

/// Default configuration file next to the binary's working directory.
const CONFIG_PATH: &str = "pad-bridge.toml";

/// Frontend stand-in wired into the menu handshake.
///
/// A real frontend would flush memory card writes, swap display modes, and
/// run its menu here; this one logs each step and returns immediately so
/// the handshake sequencing can be exercised end to end.
#[derive(Debug, Default)]
struct LoggingFrontend;

impl MenuHandler for LoggingFrontend {
    fn flush_storage(&mut self) {
        info!("flushing pending storage writes");
    }

    fn pause(&mut self) {
        info!("pausing emulation");
    }

    fn enter_menu_display(&mut self) {
        info!("switching to menu display mode");
    }

    fn run_menu(&mut self) {
        info!("menu opened (stub frontend, returning immediately)");
    }

    fn resume(&mut self) {
        info!("resuming emulation");
    }

    fn enter_game_display(&mut self) {
        info!("restoring gameplay display mode");
    }
}

/// Main entry point for the Pad Bridge frame loop
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load TOML configuration (falling back to defaults)
///    - Open the keyboard (required) and joystick (optional)
///    - Probe for a haptic device and initialize the rumble engine
///
/// 2. **Main Loop**
///    - Poll devices and arbitrate the pad state once per frame at 60Hz
///    - Log committed-state changes and periodic status
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop and release the rumble effect
///    - Log total frame count
///
/// # Errors
///
/// Returns error if no keyboard device can be opened or the configuration
/// file exists but cannot be parsed.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Pad Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match Config::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(error::PadBridgeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("no {} found, using defaults", CONFIG_PATH);
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };
    debug!("configuration: {:?}", config);

    let mut keyboard = Keyboard::open()?;
    info!("keyboard opened at: {}", keyboard.device_path());

    let mut joystick = Joystick::open();
    if let Some(joy) = &joystick {
        info!("joystick opened at: {}", joy.device_path());
    } else {
        info!("no joystick detected, running keyboard-only");
    }

    let mut engine = PadEngine::new(&config.input);
    let personality = engine.personality();
    info!(
        "controller personality: id=0x{:02x} mode={} type={}",
        personality.id, personality.pad_mode, personality.controller_type
    );

    let mut rumble = RumbleEngine::new();
    rumble.initialize(
        rumble::device::probe().map(|d| Box::new(d) as Box<dyn rumble::device::HapticDevice>),
        config.rumble.gain,
    );

    let mut frontend = LoggingFrontend;

    let period_us = 1_000_000 / FRAME_RATE_HZ;
    let mut frame_interval = interval(Duration::from_micros(period_us as u64));

    info!("starting frame loop at {}Hz", FRAME_RATE_HZ);
    info!("Press Ctrl+C to exit");

    let mut frame_count: u64 = 0;
    let mut last_log_count: u64 = 0;
    let mut last_state: u16 = 0xFFFF;

    // Main frame loop
    loop {
        tokio::select! {
            _ = frame_interval.tick() => {
                let (keys, key_downs) = match keyboard.poll() {
                    Ok(polled) => polled,
                    Err(e) => {
                        warn!("keyboard poll failed: {}", e);
                        continue;
                    }
                };

                engine.begin_frame(&keys);
                for key in key_downs {
                    engine.key_down(key);
                }

                let mut joystick_lost = false;
                if let Some(joy) = joystick.as_mut() {
                    match joy.poll() {
                        Ok(inputs) => {
                            for input in inputs {
                                match input {
                                    JoystickInput::Axis { axis, raw } => {
                                        engine.axis_event(axis, raw);
                                    }
                                    JoystickInput::ThumbDown(thumb) => {
                                        engine.thumb_button_down(thumb);
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            warn!("joystick poll failed, dropping device: {}", e);
                            joystick_lost = true;
                        }
                    }
                }
                if joystick_lost {
                    joystick = None;
                }

                let state = engine.end_frame(&keys, &mut frontend);
                if state != last_state {
                    debug!("pad state now 0x{:04x}", state);
                    last_state = state;
                }

                frame_count += 1;
                if frame_count - last_log_count >= LOG_INTERVAL_FRAMES {
                    let axes = engine.axes();
                    info!(
                        "frame {}: pad=0x{:04x} axes=({},{})/({},{}) rumble_active={}",
                        frame_count, state,
                        axes.left_x, axes.left_y, axes.right_x, axes.right_y,
                        rumble.is_active(),
                    );
                    last_log_count = frame_count;
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                rumble.shutdown();
                info!("Total frames processed: {}", frame_count);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_constant() {
        assert_eq!(FRAME_RATE_HZ, 60, "frame rate should match the console's");
    }

    #[test]
    fn test_frame_period_calculation() {
        let period_us = 1_000_000 / FRAME_RATE_HZ;
        assert_eq!(period_us, 16_666, "period should be ~16.7ms at 60Hz");
    }

    #[test]
    fn test_log_interval_constant() {
        // At 60Hz, 1000 frames is roughly 17 seconds between status lines.
        assert_eq!(LOG_INTERVAL_FRAMES, 1000);
    }
}
