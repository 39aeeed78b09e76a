//! # outrun
//!
//! Lane-dodging arcade game for a small ESP32-S3 handheld.
//!
//! The game core is hardware independent and runs on the host:
//! - **Input**: 4×3 keypad strobe scan, encoder steps, edge-triggered confirm
//! - **Obstacles**: the 4×3 field that rolls toward the car
//! - **Game**: splash → menu → info / play → lose state machine
//! - **Present**: monochrome game surface and LED strip colours
//!
//! With the default `badge` feature the crate also brings up the board:
//! - **Screen**: 320×170 ST7789 LCD over SPI with DMA, game surface scaled 2×
//! - **Leds**: 12× WS2812 indicator strip via RMT
//! - **Knob**: quadrature encoder on PCNT with its push-button
//! - **Keypad**: 4 column outputs, 3 row inputs
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let peripherals = outrun::init();
//! let resources = outrun::split_resources!(peripherals);
//!
//! let screen = outrun::Screen::new(resources.display, resources.backlight);
//! let leds: outrun::Leds = resources.leds.into();
//! let keypad: outrun::Keypad = resources.keypad.into();
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod frame;
pub mod game;
pub mod input;
pub mod obstacles;
pub mod present;
pub mod rng;

#[cfg(feature = "badge")]
mod display;
#[cfg(feature = "badge")]
mod knob;
#[cfg(feature = "badge")]
mod leds;

pub use config::GameConfig;
pub use frame::Frame;
pub use game::{
    GameState,
    Ui,
};
pub use input::{
    InputSampler,
    Inputs,
    KeyMatrix,
};

#[cfg(feature = "badge")]
pub use badge::*;

#[cfg(feature = "badge")]
mod badge {
    use esp_hal::{
        Blocking,
        assign_resources,
        clock::{
            Clock,
            CpuClock,
        },
        delay::Delay,
        gpio::{
            Input,
            InputConfig,
            Level,
            Output,
            OutputConfig,
            Pull,
        },
        rmt::{
            Rmt,
            Tx,
            TxChannelConfig,
            TxChannelCreator as _,
        },
        rom,
        time::Rate,
    };

    pub use crate::{
        display::{
            Panel,
            Screen,
        },
        knob::Knob,
        leds::Leds,
    };
    use crate::input::{
        InputSampler,
        KeyMatrix,
    };

    /// StaticCell helper — allocates a value into a `static` exactly once.
    #[macro_export]
    macro_rules! mk_static {
        ($t:ty, $val:expr) => {{
            static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
            #[deny(unused_attributes)]
            let x = STATIC_CELL.uninit().write($val);
            x
        }};
    }

    /// The board's keypad scanner.
    pub type Keypad<'d> = KeyMatrix<Output<'d>, Input<'d>, Delay>;

    /// Keypad, encoder and confirm button as wired on the board.
    pub type Controls<'d> = InputSampler<Output<'d>, Input<'d>, Delay, Knob<'d>, Input<'d>>;

    // ── Pin / peripheral assignments ────────────────────────────────────────

    assign_resources! {
        pub Resources<'d> {
            display: DisplayResources<'d> {
                dc: GPIO15,
                rst: GPIO7,
                sck: GPIO4,
                cs: GPIO6,
                miso: GPIO16,
                mosi: GPIO5,
                spi: SPI2,
                dma: DMA_CH0,
            },
            backlight: BacklightResources<'d> {
                led: GPIO19,
            },
            leds: LedResources<'d> {
                power: GPIO17,
                io: GPIO18,
                rmt: RMT,
            },
            knob: KnobResources<'d> {
                a: GPIO1,
                b: GPIO2,
                button: GPIO21,
                pcnt: PCNT,
            },
            keypad: KeypadResources<'d> {
                col0: GPIO11,
                col1: GPIO12,
                col2: GPIO13,
                col3: GPIO14,
                row0: GPIO38,
                row1: GPIO47,
                row2: GPIO48,
            },
        }
    }

    // ── Board initialisation ────────────────────────────────────────────────

    /// Minimal CPU clock switcher for ESP32-S3.
    ///
    /// Steps through an intermediate frequency before reaching the target,
    /// which is required by the hardware.
    fn set_cpu_clock(cpu_clock_speed: CpuClock) {
        let _ = esp_hal::peripherals::SYSTEM::regs()
            .sysclk_conf()
            .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
        let _ = esp_hal::peripherals::SYSTEM::regs()
            .cpu_per_conf()
            .modify(|_, w| unsafe {
                let _ = w.pll_freq_sel().set_bit();
                w.cpuperiod_sel().bits(match cpu_clock_speed {
                    CpuClock::_80MHz => 0,
                    CpuClock::_160MHz => 1,
                    CpuClock::_240MHz => 2,
                    _ => panic!("Unsupported CPU clock speed"),
                })
            });

        rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
    }

    /// Initialise the board and return the raw peripheral set.
    ///
    /// Call this once at the top of `main`, then use [`split_resources!`] to
    /// break the peripherals into typed resource groups.
    #[must_use]
    pub fn init() -> esp_hal::peripherals::Peripherals {
        set_cpu_clock(CpuClock::_160MHz);
        let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
        esp_hal::init(config)
    }

    /// One random word from the hardware RNG, for seeding the game.
    #[must_use]
    pub fn seed() -> u32 {
        esp_hal::rng::Rng::new().random()
    }

    // ── Resource → peripheral conversions ───────────────────────────────────

    impl From<esp_hal::peripherals::Peripherals> for Resources<'_> {
        fn from(peripherals: esp_hal::peripherals::Peripherals) -> Self {
            split_resources!(peripherals)
        }
    }

    impl<'a> From<LedResources<'a>> for esp_hal::rmt::Channel<'a, Blocking, Tx> {
        fn from(res: LedResources<'a>) -> Self {
            // The strip's supply switch has to stay on for the life of the program.
            core::mem::forget(Output::new(res.power, Level::High, OutputConfig::default()));
            let rmt = Rmt::new(res.rmt, Rate::from_mhz(40)).unwrap();
            let tx_config = TxChannelConfig::default().with_clk_divider(1);
            rmt.channel0.configure_tx(res.io, tx_config).unwrap()
        }
    }

    impl<'a> From<LedResources<'a>> for Leds<'a> {
        fn from(res: LedResources<'a>) -> Self {
            Leds::new(res.into())
        }
    }

    impl<'a> From<KeypadResources<'a>> for Keypad<'a> {
        fn from(res: KeypadResources<'a>) -> Self {
            let pull_down = InputConfig::default().with_pull(Pull::Down);
            KeyMatrix::new(
                [
                    Output::new(res.col0, Level::Low, OutputConfig::default()),
                    Output::new(res.col1, Level::Low, OutputConfig::default()),
                    Output::new(res.col2, Level::Low, OutputConfig::default()),
                    Output::new(res.col3, Level::Low, OutputConfig::default()),
                ],
                [
                    Input::new(res.row0, pull_down),
                    Input::new(res.row1, pull_down),
                    Input::new(res.row2, pull_down),
                ],
                Delay::new(),
            )
        }
    }

    impl<'a> Controls<'a> {
        pub fn from_resources(keypad: KeypadResources<'a>, knob: KnobResources<'a>) -> Self {
            let (encoder, button) = Knob::new(knob);
            InputSampler::new(keypad.into(), encoder, button)
        }
    }
}
