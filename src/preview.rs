use anyhow::{Context, Result};
use image::RgbImage;
use minifb::{Key, Window, WindowOptions};

/// Where processed frames go. The main loop also polls it for the quit key.
pub trait Display {
    /// Show a frame that already carries its overlay
    fn show(&mut self, image: &RgbImage) -> Result<()>;

    /// Pump window events when there is no frame to show
    fn poll(&mut self) -> Result<()>;

    fn quit_requested(&self) -> bool;
}

/// Live preview window; `q` or Escape quits
pub struct PreviewWindow {
    window: Window,
    pixels: Vec<u32>,
}

impl PreviewWindow {
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self> {
        let window = Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions::default(),
        )
        .context("Failed to open preview window")?;

        Ok(Self {
            window,
            pixels: Vec::new(),
        })
    }
}

impl Display for PreviewWindow {
    fn show(&mut self, image: &RgbImage) -> Result<()> {
        to_argb(image, &mut self.pixels);
        self.window
            .update_with_buffer(&self.pixels, image.width() as usize, image.height() as usize)
            .context("Failed to update preview window")
    }

    fn poll(&mut self) -> Result<()> {
        self.window.update();
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        !self.window.is_open() || self.window.is_key_down(Key::Q) || self.window.is_key_down(Key::Escape)
    }
}

/// Pack RGB pixels into minifb's 0RGB u32 layout
pub fn to_argb(image: &RgbImage, out: &mut Vec<u32>) {
    out.clear();
    out.extend(
        image
            .pixels()
            .map(|p| (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_to_argb_packing() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([0x12, 0x34, 0x56]));
        image.put_pixel(1, 0, Rgb([0xff, 0x00, 0x01]));

        let mut out = vec![7; 10];
        to_argb(&image, &mut out);
        assert_eq!(out, vec![0x0012_3456, 0x00ff_0001]);
    }
}
