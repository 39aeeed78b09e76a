//! Rotary encoder on the PCNT peripheral, plus its push-button.
//!
//! Both PCNT channels count on A and B edges, giving four counts per detent.
//! The hardware counter returns to zero at `±COUNTER_SPAN` and is never
//! cleared by software; [`CounterUnwrap`] turns its readings into an `i32`.

use esp_hal::{
    gpio::{
        Input,
        InputConfig,
        Pull,
    },
    pcnt::{
        Pcnt,
        channel::{
            CtrlMode,
            EdgeMode,
        },
        unit::Unit,
    },
};

use crate::{
    KnobResources,
    config::COUNTS_PER_DETENT,
    input::{
        CounterUnwrap,
        EncoderPosition,
    },
};

/// Glitch filter, in APB cycles (80 MHz).
const FILTER_CYCLES: u16 = 1_000;

/// Counter limit in either direction.
const COUNTER_SPAN: i16 = 16_384;

/// Quadrature encoder reporting its position in detents.
pub struct Knob<'d> {
    unit: Unit<'d, 0>,
    counts: CounterUnwrap,
    _a: Input<'d>,
    _b: Input<'d>,
}

impl<'d> Knob<'d> {
    /// Returns the encoder and its push-button (active low).
    pub fn new(res: KnobResources<'d>) -> (Self, Input<'d>) {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        let a = Input::new(res.a, pull_up);
        let b = Input::new(res.b, pull_up);
        let button = Input::new(res.button, pull_up);

        let pcnt = Pcnt::new(res.pcnt);
        let unit = pcnt.unit0;
        unit.set_filter(Some(FILTER_CYCLES)).unwrap();
        unit.set_high_limit(Some(COUNTER_SPAN)).unwrap();
        unit.set_low_limit(Some(-COUNTER_SPAN)).unwrap();
        unit.clear();

        let ch0 = &unit.channel0;
        ch0.set_ctrl_signal(a.peripheral_input());
        ch0.set_edge_signal(b.peripheral_input());
        ch0.set_ctrl_mode(CtrlMode::Reverse, CtrlMode::Keep);
        ch0.set_input_mode(EdgeMode::Increment, EdgeMode::Decrement);

        let ch1 = &unit.channel1;
        ch1.set_ctrl_signal(b.peripheral_input());
        ch1.set_edge_signal(a.peripheral_input());
        ch1.set_ctrl_mode(CtrlMode::Reverse, CtrlMode::Keep);
        ch1.set_input_mode(EdgeMode::Decrement, EdgeMode::Increment);

        unit.resume();
        info!("encoder counting on PCNT unit 0");

        (
            Self {
                unit,
                counts: CounterUnwrap::new(COUNTER_SPAN),
                _a: a,
                _b: b,
            },
            button,
        )
    }
}

impl EncoderPosition for Knob<'_> {
    fn position(&mut self) -> i32 {
        self.counts
            .update(self.unit.value())
            .div_euclid(COUNTS_PER_DETENT)
    }
}
