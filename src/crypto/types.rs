use crate::rings::PolyRing;

/// BFV ciphertext with level bookkeeping.
///
/// `c2` is present only between a multiplication and the following
/// relinearization. `level` counts the multiplications still allowed before
/// decryption is expected to fail.
#[derive(Debug, Clone)]
pub struct BfvCiphertext<P, const DEGREE: usize>
where
    P: PolyRing<DEGREE>,
{
    pub c0: P,
    pub c1: P,
    pub c2: Option<P>,
    pub level: u32,
}

impl<P, const DEGREE: usize> BfvCiphertext<P, DEGREE>
where
    P: PolyRing<DEGREE>,
{
    /// Number of polynomial components: 2 when linear, 3 after a multiplication.
    pub fn size(&self) -> usize {
        if self.c2.is_some() { 3 } else { 2 }
    }

    pub fn is_linear(&self) -> bool {
        self.c2.is_none()
    }
}
