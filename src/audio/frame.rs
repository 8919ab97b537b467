// One output frame; the tone is mono so both sides usually match until the
// reverb writes into them
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn mono(s: f32) -> Self {
        Self { left: s, right: s }
    }
}
