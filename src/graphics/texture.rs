use std::ptr::null;

/// A floating point RGBA texture meant to be written by a compute shader through an image unit
/// and read back by a later draw.
pub struct ImageTexture {
    id: u32,
    width: u32,
    height: u32,
}

impl ImageTexture {
    pub fn id(&self) -> u32 { self.id }
    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    pub fn new(width: u32, height: u32) -> Self {
        let mut id: u32 = 0;
        unsafe {
            gl::GenTextures(1, &mut id);
            gl::BindTexture(gl::TEXTURE_2D, id);

            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);

            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA32F as i32,
                width as i32,
                height as i32,
                0,
                gl::RGBA,
                gl::FLOAT,
                null()
            );
        }

        Self { id, width, height }
    }

    /// Binds the texture to image unit `unit`. `access` is `gl::READ_ONLY`, `gl::WRITE_ONLY` or
    /// `gl::READ_WRITE`.
    pub fn bind_image(&self, unit: u32, access: u32) {
        unsafe {
            gl::BindImageTexture(unit, self.id, 0, gl::FALSE, 0, access, gl::RGBA32F);
        }
    }

    pub fn delete(self) {
        unsafe {
            gl::DeleteTextures(1, &self.id);
        }
    }
}
