use sdl2::pixels::PixelFormatEnum;
use thiserror::Error;

use emu8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use emu8_core::FrameBuffer;

#[derive(Debug, Error)]
#[error("sdl2: {0}")]
pub struct DisplayError(String);

fn sdl_error(error: impl ToString) -> DisplayError {
    DisplayError(error.to_string())
}

/// # Display
/// The Chip-8 display is composed of 64x32 black/white pixels.
/// The machine stores each pixel as a 32-bit word that is either all ones or all zeros,
/// which maps directly onto an RGBA8888 texture.
pub struct Display {
    canvas: sdl2::render::WindowCanvas,
}

impl Display {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `title` the window title
    /// * `scale` the size multiplier for each pixel
    pub fn new(sdl: &sdl2::Sdl, title: &str, scale: u32) -> Result<Self, DisplayError> {
        let video_subsystem = sdl.video().map_err(sdl_error)?;
        let window = video_subsystem
            .window(
                title,
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(sdl_error)?;
        let canvas = window.into_canvas().build().map_err(sdl_error)?;

        Ok(Display { canvas })
    }

    /// Formats a Chip-8 FrameBuffer as the bytes of an RGBA8888 texture.
    ///
    /// RGBA8888 is a packed format, so every pixel is laid out as a native-endian u32.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    fn frame_to_sdl_texture(frame: &FrameBuffer) -> Vec<u8> {
        frame.iter().flat_map(|pixel| pixel.to_ne_bytes()).collect()
    }

    /// Uploads the FrameBuffer to a streaming texture and presents it.
    ///
    /// # Arguments
    /// * `frame` a Chip-8 FrameBuffer
    /// * `pitch` the length of one FrameBuffer row in bytes
    pub fn render(&mut self, frame: &FrameBuffer, pitch: usize) -> Result<(), DisplayError> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGBA8888,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )
            .map_err(sdl_error)?;

        texture
            .update(None, &Display::frame_to_sdl_texture(frame), pitch)
            .map_err(sdl_error)?;

        self.canvas.clear();
        self.canvas.copy(&texture, None, None).map_err(sdl_error)?;
        self.canvas.present();
        Ok(())
    }
}
