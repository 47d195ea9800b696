use rand::RngCore;

/// Uniform byte generator used by `Cxnn`.
pub trait RandomSource {
    fn random_byte(&mut self) -> u8;
}

impl<R: RngCore> RandomSource for R {
    fn random_byte(&mut self) -> u8 {
        (self.next_u32() & 0xFF) as u8
    }
}
