//! ST7789 panel — 320×170 LCD over SPI with DMA, showing the 128×64 game
//! surface scaled 2× in the middle of the screen.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    dma::{
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    spi::master::Spi,
    time::Rate,
};

use crate::{
    BacklightResources,
    DisplayResources,
    config::{
        FRAME_H,
        FRAME_W,
    },
    frame::Frame,
};

const PANEL_W: u32 = 320;
const PANEL_H: u32 = 170;
const SCALE: u32 = 2;
const ORIGIN: Point = Point::new(
    ((PANEL_W - FRAME_W * SCALE) / 2) as i32,
    ((PANEL_H - FRAME_H * SCALE) / 2) as i32,
);

const LIT: Rgb565 = Rgb565::WHITE;
const UNLIT: Rgb565 = Rgb565::BLACK;

type SpiInterface<'a> = mipidsi::interface::SpiInterface<
    'a,
    ExclusiveDevice<esp_hal::spi::master::SpiDmaBus<'a, Async>, Output<'a>, esp_hal::delay::Delay>,
    Output<'a>,
>;

/// The raw ST7789 panel.
pub type Panel<'a> = mipidsi::Display<SpiInterface<'a>, mipidsi::models::ST7789, Output<'a>>;

impl<'a> From<DisplayResources<'a>> for Panel<'a> {
    fn from(res: DisplayResources<'a>) -> Self {
        let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(32000);
        let dma_rx_buf = DmaRxBuf::new(rx_descriptors, rx_buffer).unwrap();
        let dma_tx_buf = DmaTxBuf::new(tx_descriptors, tx_buffer).unwrap();

        let mut delay = esp_hal::delay::Delay::new();

        let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
        let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
        rst.set_high();

        let spi = Spi::new(
            res.spi,
            esp_hal::spi::master::Config::default().with_frequency(Rate::from_mhz(80)),
        )
        .unwrap()
        .with_sck(res.sck)
        .with_mosi(res.mosi)
        .with_miso(res.miso)
        .with_dma(res.dma)
        .with_buffers(dma_rx_buf, dma_tx_buf)
        .into_async();

        let cs = Output::new(res.cs, Level::High, OutputConfig::default());
        let spi_device = ExclusiveDevice::new(spi, cs, delay).unwrap();

        let buffer = crate::mk_static!([u8; 32000], [0_u8; 32000]);
        let di = mipidsi::interface::SpiInterface::new(spi_device, dc, buffer);

        mipidsi::Builder::new(mipidsi::models::ST7789, di)
            .reset_pin(rst)
            .display_size(PANEL_H as u16, PANEL_W as u16)
            .invert_colors(mipidsi::options::ColorInversion::Inverted)
            .orientation(
                mipidsi::options::Orientation::new().rotate(mipidsi::options::Rotation::Deg90),
            )
            .display_offset(35, 0)
            .init(&mut delay)
            .unwrap()
    }
}

/// Panel plus backlight, fed whole game frames.
pub struct Screen<'a> {
    panel: Panel<'a>,
    _backlight: Output<'a>,
    /// Last frame that reached the panel.
    shown: Option<Frame>,
}

impl<'a> Screen<'a> {
    /// Blanks the panel and switches the backlight on.
    pub fn new(display: DisplayResources<'a>, backlight: BacklightResources<'a>) -> Self {
        let mut panel: Panel<'a> = display.into();
        if panel.clear(UNLIT).is_err() {
            error!("panel clear failed");
        }
        Self {
            panel,
            _backlight: Output::new(backlight.led, Level::High, OutputConfig::default()),
            shown: None,
        }
    }

    /// Push `frame` to the panel. Unchanged frames are skipped; a failed
    /// transfer is logged and retried with the next frame.
    pub fn present(&mut self, frame: &Frame) {
        if self.shown.as_ref() == Some(frame) {
            return;
        }

        let area = Rectangle::new(ORIGIN, Size::new(FRAME_W * SCALE, FRAME_H * SCALE));
        let colors = (0..FRAME_H * SCALE).flat_map(|y| {
            (0..FRAME_W * SCALE).map(move |x| {
                if frame.is_on(x / SCALE, y / SCALE) {
                    LIT
                } else {
                    UNLIT
                }
            })
        });

        if self.panel.fill_contiguous(&area, colors).is_err() {
            error!("panel flush failed");
            self.shown = None;
            return;
        }
        self.shown = Some(frame.clone());
    }
}
