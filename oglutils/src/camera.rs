use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Mat4, Vec3};

const MIN_RADIUS: f32 = 0.1;

/// Virtual camera that controls the view transformation through an observer position, an azimuth
/// and a zenith (both in radians).
///
/// The eye can sit at the observer position (first person) or orbit it at `radius` (third
/// person). The z axis is "up". A camera is immutable: every operation returns a new one, so
/// input handlers read as `self.camera = self.camera.forward(1.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    azimuth: f32,
    zenith: f32,
    radius: f32,
    first_person: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0, 0.0, 1.0, true)
    }
}

impl Camera {
    pub fn new(position: Vec3, azimuth: f32, zenith: f32, radius: f32, first_person: bool) -> Self {
        Self { position, azimuth, zenith, radius, first_person }
    }

    pub fn position(&self) -> Vec3 { self.position }
    pub fn azimuth(&self) -> f32 { self.azimuth }
    pub fn zenith(&self) -> f32 { self.zenith }
    pub fn radius(&self) -> f32 { self.radius }
    pub fn is_first_person(&self) -> bool { self.first_person }

    /// Unit vector the observer looks along.
    pub fn view_vector(&self) -> Vec3 {
        direction(self.azimuth, self.zenith)
    }

    /// Unit vector that is "up" for the observer, perpendicular to the view vector.
    pub fn up_vector(&self) -> Vec3 {
        direction(self.azimuth, self.zenith + FRAC_PI_2)
    }

    /// Where the eye actually is: the observer position in first person, `radius` behind it in
    /// third person.
    pub fn eye(&self) -> Vec3 {
        if self.first_person {
            self.position
        } else {
            self.position - self.view_vector() * self.radius
        }
    }

    /// Right-handed view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye(), self.view_vector(), self.up_vector())
    }

    pub fn add_azimuth(self, angle: f32) -> Self {
        Self { azimuth: self.azimuth + angle, ..self }
    }

    /// Zenith stays within [-π/2, π/2].
    pub fn add_zenith(self, angle: f32) -> Self {
        Self { zenith: (self.zenith + angle).max(-FRAC_PI_2).min(FRAC_PI_2), ..self }
    }

    /// Radius stays at 0.1 or more.
    pub fn add_radius(self, distance: f32) -> Self {
        Self { radius: (self.radius + distance).max(MIN_RADIUS), ..self }
    }

    /// Radius stays at 0.1 or more.
    pub fn mul_radius(self, scale: f32) -> Self {
        Self { radius: (self.radius * scale).max(MIN_RADIUS), ..self }
    }

    pub fn forward(self, speed: f32) -> Self {
        self.move_by(self.view_vector() * speed)
    }

    pub fn backward(self, speed: f32) -> Self {
        self.forward(-speed)
    }

    /// Moves to the observer's right, staying in the horizontal plane.
    pub fn right(self, speed: f32) -> Self {
        let right = Vec3::new((self.azimuth - FRAC_PI_2).cos(), (self.azimuth - FRAC_PI_2).sin(), 0.0);
        self.move_by(right * speed)
    }

    pub fn left(self, speed: f32) -> Self {
        self.right(-speed)
    }

    pub fn up(self, speed: f32) -> Self {
        self.move_by(Vec3::new(0.0, 0.0, speed))
    }

    pub fn down(self, speed: f32) -> Self {
        self.up(-speed)
    }

    pub fn move_by(self, offset: Vec3) -> Self {
        Self { position: self.position + offset, ..self }
    }

    pub fn with_position(self, position: Vec3) -> Self {
        Self { position, ..self }
    }

    pub fn with_azimuth(self, azimuth: f32) -> Self {
        Self { azimuth, ..self }
    }

    pub fn with_zenith(self, zenith: f32) -> Self {
        Self { zenith, ..self }
    }

    pub fn with_radius(self, radius: f32) -> Self {
        Self { radius, ..self }
    }

    pub fn with_first_person(self, first_person: bool) -> Self {
        Self { first_person, ..self }
    }
}

fn direction(azimuth: f32, zenith: f32) -> Vec3 {
    Vec3::new(
        azimuth.cos() * zenith.cos(),
        azimuth.sin() * zenith.cos(),
        zenith.sin(),
    )
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Camera {{ position: {}, azimuth: {:.3}, zenith: {:.3}, radius: {:.3}, {} }}",
            self.position,
            self.azimuth,
            self.zenith,
            self.radius,
            if self.first_person { "first person" } else { "third person" }
        )
    }
}
