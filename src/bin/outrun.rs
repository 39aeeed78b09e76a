//! Outrun firmware.
//!
//! Dodge the green trees! The car is the red LED on the near row of the strip.
//! - Turn the knob to change lanes
//! - Press the knob to pick a menu entry or leave a screen
//! - The road speeds up a little with every row that passes

#![no_std]
#![no_main]

use defmt::{
    debug,
    info,
};
#[allow(clippy::wildcard_imports)]
use outrun::*;
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use outrun::config::{
    SPLASH_HOLD_MS,
    TICK_MS,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

#[embassy_executor::task]
async fn game_task(
    screen: &'static mut Screen<'static>,
    leds: &'static mut Leds<'static>,
    controls: &'static mut Controls<'static>,
    seed: u32,
) {
    info!("Outrun game task started, seed {=u32:#x}", seed);

    let mut game = GameState::new(GameConfig::DEFAULT, seed);
    let mut frame = Frame::new();

    let Ok(()) = present::draw(&game, &mut frame);
    screen.present(&frame);
    leds.show(&present::indicators(&game)).await;
    Timer::after(Duration::from_millis(SPLASH_HOLD_MS)).await;

    let tick = Duration::from_millis(TICK_MS);
    loop {
        let inputs = controls.sample();
        for key in inputs.key_edges.iter_pressed() {
            debug!("key {} down", key);
        }

        game.update(&inputs);

        let Ok(()) = present::draw(&game, &mut frame);
        screen.present(&frame);
        leds.show(&present::indicators(&game)).await;

        Timer::after(tick).await;
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = outrun::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let screen = mk_static!(
        Screen<'static>,
        Screen::new(resources.display, resources.backlight)
    );
    let leds = mk_static!(Leds<'static>, resources.leds.into());
    let controls = mk_static!(
        Controls<'static>,
        Controls::from_resources(resources.keypad, resources.knob)
    );

    spawner.must_spawn(game_task(screen, leds, controls, outrun::seed()));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
