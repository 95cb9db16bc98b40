/// Maps a residue in `[0, modulus)` to its centered representative in
/// `(-modulus/2, modulus/2]`.
pub fn centered_residue(value: u64, modulus: u64) -> i64 {
    debug_assert!(value < modulus, "centered_residue: value must be reduced");
    if value > modulus / 2 {
        -((modulus - value) as i64)
    } else {
        value as i64
    }
}
