//! Two's-complement arithmetic on partial-width bit fields.

/// Reinterprets the low `width` bits of `bits` as a two's-complement number.
///
/// Implements sign extension as described at
/// [Sign extension](https://en.wikipedia.org/wiki/Sign_extension):
/// bit `width - 1` contributes `-2^(width - 1)`, every lower bit its plain
/// power of two. Pure integer shifting, exact for every width from 1 to 16.
///
/// # Panics
/// Debug-asserts that `width` is in `1..=16` and that `bits` is masked to its
/// width.
#[must_use]
pub const fn sign_extend(bits: u16, width: u32) -> i16 {
    debug_assert!(width >= 1 && width <= u16::BITS, "field width out of range");
    debug_assert!(
        width == u16::BITS || bits >> width == 0,
        "field value not masked to its width"
    );
    let unused = u16::BITS - width;
    #[expect(
        clippy::cast_possible_wrap,
        reason = "the wrap of the top bit is the sign extension"
    )]
    let widened = (bits << unused) as i16;
    widened >> unused
}

/// 16-bit modular addition of two fields with independent bit widths.
///
/// Each operand is sign-extended from its own width, the signed sum is
/// truncated to its low 16 bits. Overflow wraps silently, the LC-3 bus has
/// no overflow indication.
#[must_use]
pub const fn add16(op1: u16, width1: u32, op2: u16, width2: u32) -> u16 {
    let sum = sign_extend(op1, width1) as i32 + sign_extend(op2, width2) as i32;
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "truncation to the low 16 bits is the modular wrap"
    )]
    let wrapped = sum as u16;
    wrapped
}
