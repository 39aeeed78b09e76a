//! Projection of the game onto the two outputs: the monochrome game surface
//! and the indicator LEDs.
//!
//! Both functions only read [`GameState`]; drawing the same state twice gives
//! the same output.

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::FONT_6X10,
    },
    pixelcolor::{
        BinaryColor,
        Rgb888,
    },
    prelude::*,
    text::Text,
};
use palette::Srgb;
use tinybmp::Bmp;

use crate::{
    config::{
        CAR_COLOR,
        DEPTH_ROWS,
        EMPTY_COLOR,
        INDICATOR_COUNT,
        LANES,
        OBSTACLE_COLOR,
        SPLASH_X,
        SPLASH_Y,
    },
    frame::Rotated270,
    game::{
        GameState,
        MenuItem,
        Ui,
    },
    obstacles::PLAYER_ROW,
};

/// Title art shown while booting.
const TITLE_BMP: &[u8] = include_bytes!("../assets/title.bmp");

const TEXT: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

/// Instructions, as (baseline y before scrolling, line).
const INFO_LINES: &[(i32, &str)] = &[
    (20, "--- OUTRUN ---"),
    (34, "In this game you"),
    (48, "drive a RED car and"),
    (62, "use the knob to"),
    (76, "change lanes. Avoid"),
    (90, "the green trees. To"),
    (104, "better play rotate"),
    (118, "the pad 90 degrees"),
    (132, "clockwise."),
    (160, "-- Press KNOB --"),
];

/// Colours for the LED strip. Index is `3 * depth_row + lane`.
pub type IndicatorBuffer = [Srgb<u8>; INDICATOR_COUNT];

/// Draw the current screen onto `target`.
pub fn draw<D>(game: &GameState, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;

    match game.ui() {
        Ui::Boot => draw_splash(target),
        Ui::Menu => draw_menu(target, game.cursor()),
        Ui::Info => draw_info(target, game.scroll()),
        Ui::Play => draw_score(target, game.session().score),
        Ui::Lose => draw_lose(target, game.session().score),
    }
}

/// LED colours for the current state: obstacles green, the car red on the
/// near row. The strip keeps showing the last run's field outside of play.
#[must_use]
pub fn indicators(game: &GameState) -> IndicatorBuffer {
    let mut colors = [EMPTY_COLOR; INDICATOR_COUNT];

    let field = game.field();
    for row in 0..DEPTH_ROWS {
        for lane in 0..LANES {
            if field.has(row, lane) {
                colors[LANES * row + lane] = OBSTACLE_COLOR;
            }
        }
    }
    colors[LANES * PLAYER_ROW + game.session().lane] = CAR_COLOR;

    colors
}

fn draw_splash<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let bmp: Bmp<Rgb888> = match Bmp::from_slice(TITLE_BMP) {
        Ok(bmp) => bmp,
        Err(_) => {
            error!("title bitmap is unreadable");
            return Ok(());
        }
    };

    let offset = Point::new(SPLASH_X, SPLASH_Y);
    target.draw_iter(bmp.pixels().map(|Pixel(p, c)| {
        let luma = u16::from(c.r()) + u16::from(c.g()) + u16::from(c.b());
        Pixel(p + offset, BinaryColor::from(luma > 3 * 127))
    }))
}

fn draw_menu<D>(target: &mut D, cursor: MenuItem) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let (start, info) = match cursor {
        MenuItem::StartGame => ("[+] START GAME", "[ ] INFO"),
        MenuItem::Info => ("[ ] START GAME", "[+] INFO"),
    };
    Text::new(start, Point::new(10, 20), TEXT).draw(target)?;
    Text::new(info, Point::new(10, 34), TEXT).draw(target)?;
    Ok(())
}

fn draw_info<D>(target: &mut D, scroll: i16) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let scroll = i32::from(scroll);
    for &(y, line) in INFO_LINES {
        Text::new(line, Point::new(0, y + scroll), TEXT).draw(target)?;
    }
    Ok(())
}

/// Score readout turned sideways, for playing with the pad rotated.
fn draw_score<D>(target: &mut D, score: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let mut buf = [0u8; 10];
    Text::new("SCORE", Point::zero(), TEXT)
        .draw(&mut Rotated270::new(target, Point::new(20, 60)))?;
    Text::new(format_u32(score, &mut buf), Point::zero(), TEXT)
        .draw(&mut Rotated270::new(target, Point::new(34, 64)))?;
    Ok(())
}

fn draw_lose<D>(target: &mut D, score: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let mut buf = [0u8; 10];
    Text::new("You LOSE", Point::new(10, 20), TEXT).draw(target)?;
    let next = Text::new("SCORE:", Point::new(10, 34), TEXT).draw(target)?;
    Text::new(format_u32(score, &mut buf), next, TEXT).draw(target)?;
    Ok(())
}

fn format_u32(mut n: u32, buf: &mut [u8; 10]) -> &str {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    core::str::from_utf8(&buf[i..]).unwrap_or("")
}
