//! Status output adapter.
//!
//! Every status line goes to the console through `log` and, once the panel
//! has answered its init sequence, replaces whatever the SH1106 shows.
//! Text is held in a fixed 128-byte buffer; longer input is cut at the last
//! character boundary that fits.

use core::fmt::Write as _;

use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use embedded_hal::i2c::I2c;
use heapless::String;
use log::{info, warn};

use crate::app::ports::StatusPort;
use crate::drivers::sh1106::{HEIGHT, PageBuffer, Sh1106, WIDTH};
use crate::error::InitError;

/// Size of the status text buffer, terminator included.
pub const STATUS_BUFFER_LEN: usize = 128;

/// Longest prefix of `text` that fits the status buffer.
pub fn truncate(text: &str) -> &str {
    const MAX: usize = STATUS_BUFFER_LEN - 1;
    if text.len() <= MAX {
        return text;
    }
    let mut end = MAX;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// 6x10 glyphs: 21 columns by 6 rows on the panel.
const COLUMNS: usize = WIDTH / 6;
const LINE_HEIGHT: i32 = 10;

/// Lay `text` out from the top-left corner of `frame`.  A newline or the
/// right edge starts a new row; rows past the bottom are dropped.
pub fn render(frame: &mut PageBuffer, text: &str) {
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let _ = frame.clear(BinaryColor::Off);

    let mut y = 0;
    for line in text.split('\n') {
        let mut rest = line;
        loop {
            if y >= HEIGHT as i32 {
                return;
            }
            let cut = rest.char_indices().nth(COLUMNS).map_or(rest.len(), |(i, _)| i);
            let (row, tail) = rest.split_at(cut);
            let _ = Text::with_baseline(row, Point::new(0, y), style, Baseline::Top).draw(frame);
            y += LINE_HEIGHT;
            rest = tail;
            if rest.is_empty() {
                break;
            }
        }
    }
}

pub struct DisplayStatus<I2C> {
    panel: Sh1106<I2C>,
    panel_ready: bool,
    frame: PageBuffer,
    current: String<STATUS_BUFFER_LEN>,
}

impl<I2C: I2c> DisplayStatus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            panel: Sh1106::new(i2c, address),
            panel_ready: false,
            frame: PageBuffer::new(),
            current: String::new(),
        }
    }

    /// Text currently on screen.
    pub fn current(&self) -> &str {
        &self.current
    }
}

impl<I2C: I2c> StatusPort for DisplayStatus<I2C> {
    fn init(&mut self) -> Result<(), InitError> {
        match self.panel.init() {
            Ok(()) => {
                self.panel_ready = true;
                Ok(())
            }
            Err(e) => {
                warn!("SH1106 init failed: {:?}", e);
                Err(InitError::DisplayNotFound)
            }
        }
    }

    fn show(&mut self, text: &str) {
        self.current.clear();
        let _ = self.current.write_str(truncate(text));
        info!("{}", self.current);

        if self.panel_ready {
            render(&mut self.frame, &self.current);
            if let Err(e) = self.panel.flush(&self.frame) {
                warn!("SH1106 write failed: {:?}", e);
            }
        }
    }
}
