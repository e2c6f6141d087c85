//! SH1106 128x64 monochrome OLED controller over I2C.
//!
//! Drawing happens off-screen in a [`PageBuffer`] (an `embedded-graphics`
//! draw target laid out like the controller's RAM) and is pushed to the
//! panel a page at a time.  Every transfer is prefixed with a control byte
//! that selects command (0x00) or display-RAM data (0x40).

use core::convert::Infallible;

use embedded_graphics::{
    Pixel,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    prelude::*,
};
use embedded_hal::i2c::I2c;

const CONTROL_CMD: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;

/// Visible columns and page count of a 128x64 panel.
pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
pub const PAGES: u8 = 8;

/// Controller RAM is 132 columns wide; 128-column glass sits at offset 2.
const COLUMN_OFFSET: u8 = 2;

const INIT_SEQUENCE: &[u8] = &[
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 1/64
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0xAD, 0x8B, // DC-DC on
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xFF, // contrast
    0xD9, 0x1F, // pre-charge
    0xDB, 0x40, // VCOMH
    0x33, // pump 9 V
    0xA6, // normal (not inverted)
    0xAF, // display on
];

pub struct Sh1106<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Sh1106<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Send the power-on sequence.  A NACK here means no panel on the bus.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        self.command(INIT_SEQUENCE)?;
        self.clear()
    }

    /// Blank every page.
    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        let blank = [0u8; WIDTH];
        for page in 0..PAGES {
            self.write_page(page, 0, &blank)?;
        }
        Ok(())
    }

    /// Write column bytes (8 vertical pixels each) into one page.
    pub fn write_page(&mut self, page: u8, column: u8, data: &[u8]) -> Result<(), I2C::Error> {
        let col = column.saturating_add(COLUMN_OFFSET);
        self.command(&[0xB0 | (page & 0x07), col & 0x0F, 0x10 | (col >> 4)])?;

        let mut buf = [0u8; WIDTH + 1];
        buf[0] = CONTROL_DATA;
        let n = data.len().min(WIDTH);
        buf[1..=n].copy_from_slice(&data[..n]);
        self.i2c.write(self.address, &buf[..=n])
    }

    /// Copy a whole frame into display RAM.
    pub fn flush(&mut self, frame: &PageBuffer) -> Result<(), I2C::Error> {
        for page in 0..PAGES {
            self.write_page(page, 0, frame.page(page))?;
        }
        Ok(())
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn command(&mut self, cmds: &[u8]) -> Result<(), I2C::Error> {
        let mut buf = [0u8; 32];
        buf[0] = CONTROL_CMD;
        let n = cmds.len().min(buf.len() - 1);
        buf[1..=n].copy_from_slice(&cmds[..n]);
        self.i2c.write(self.address, &buf[..=n])
    }
}

// ── Off-screen frame ──────────────────────────────────────────

/// 128x64 monochrome frame.  Byte `x` of page `p` holds rows `8p..8p+8`
/// of column `x`, least significant bit at the top.
pub struct PageBuffer {
    pages: [[u8; WIDTH]; PAGES as usize],
}

impl PageBuffer {
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES as usize],
        }
    }

    pub fn page(&self, page: u8) -> &[u8; WIDTH] {
        &self.pages[usize::from(page & 0x07)]
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }
}

impl Default for PageBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for PageBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for PageBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (x, y) = (point.x, point.y);
            if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            let mask = 1u8 << (y % 8);
            match color {
                BinaryColor::On => self.pages[y / 8][x] |= mask,
                BinaryColor::Off => self.pages[y / 8][x] &= !mask,
            }
        }
        Ok(())
    }
}
