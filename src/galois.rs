//! GF(256) arithmetic with irreducible polynomial x^8 + x^4 + x^3 + x^2 + 1.
//!
//! Addition and subtraction are both exclusive-or. Multiplication and
//! division go through log/exp tables built once per process; the coding
//! loop's hot path uses a full 256x256 product table instead of per-byte
//! log/exp lookups.

use std::sync::LazyLock;

use crate::error::ErasureError;

const POLYNOMIAL: u16 = 0x11D;

/// Log and exp tables for GF(256) multiplication.
struct Tables {
    log: [u8; 256],
    exp: [u8; 256],
}

static TABLES: LazyLock<Tables> = LazyLock::new(|| {
    let mut log = [0u8; 256];
    let mut exp = [0u8; 256];

    let mut val: u16 = 1;
    for i in 0..255u16 {
        exp[i as usize] = val as u8;
        log[val as usize] = i as u8;
        val <<= 1;
        if val & 0x100 != 0 {
            val ^= POLYNOMIAL;
        }
    }
    // exp[255] wraps back to exp[0]; log[0] is never consulted because
    // multiply and divide handle zero operands before the lookup.
    exp[255] = exp[0];

    Tables { log, exp }
});

/// `table[a][b] == multiply(a, b)` for every pair of field elements.
static MULTIPLICATION_TABLE: LazyLock<[[u8; 256]; 256]> = LazyLock::new(|| {
    let mut table = [[0u8; 256]; 256];
    for (a, row) in table.iter_mut().enumerate() {
        for (b, entry) in row.iter_mut().enumerate() {
            *entry = multiply(a as u8, b as u8);
        }
    }
    table
});

/// Addition in GF(256).
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Subtraction in GF(256), identical to addition.
#[inline]
pub fn sub(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Multiplication in GF(256).
#[inline]
pub fn multiply(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let tables = &*TABLES;
    let log_sum = (tables.log[a as usize] as u16 + tables.log[b as usize] as u16) % 255;
    tables.exp[log_sum as usize]
}

/// Division in GF(256).
///
/// A zero numerator yields zero regardless of the divisor. A zero divisor
/// with a nonzero numerator fails with [`ErasureError::DivideByZero`].
#[inline]
pub fn divide(a: u8, b: u8) -> Result<u8, ErasureError> {
    if a == 0 {
        return Ok(0);
    }
    if b == 0 {
        return Err(ErasureError::DivideByZero);
    }
    let tables = &*TABLES;
    let mut log_diff = tables.log[a as usize] as i32 - tables.log[b as usize] as i32;
    if log_diff < 0 {
        log_diff += 255;
    }
    Ok(tables.exp[log_diff as usize])
}

/// Raise `base` to `power` by repeated field multiplication.
///
/// `exp(base, 0)` is 1 for every base, including 0.
pub fn exp(base: u8, power: usize) -> u8 {
    let mut result = 1u8;
    for _ in 0..power {
        result = multiply(result, base);
    }
    result
}

/// The full 256x256 product table, built once and shared read-only.
#[inline]
pub fn multiplication_table() -> &'static [[u8; 256]; 256] {
    &MULTIPLICATION_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_xor() {
        assert_eq!(add(0x53, 0xCA), 0x53 ^ 0xCA);
        assert_eq!(sub(0x53, 0xCA), add(0x53, 0xCA));
        assert_eq!(add(0xFF, 0xFF), 0);
    }

    #[test]
    fn test_multiply_zero() {
        for a in 0..=255u8 {
            assert_eq!(multiply(a, 0), 0);
            assert_eq!(multiply(0, a), 0);
        }
    }

    #[test]
    fn test_multiply_identity() {
        for a in 0..=255u8 {
            assert_eq!(multiply(a, 1), a);
            assert_eq!(multiply(1, a), a);
        }
    }

    #[test]
    fn test_multiply_commutative() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                assert_eq!(multiply(a, b), multiply(b, a));
            }
        }
    }

    #[test]
    fn test_multiply_distributes_over_add() {
        for a in [0x01u8, 0x02, 0x53, 0xCA, 0xFF] {
            for b in 0..=255u8 {
                for c in [0x07u8, 0x8E, 0xB3] {
                    assert_eq!(
                        multiply(a, add(b, c)),
                        add(multiply(a, b), multiply(a, c))
                    );
                }
            }
        }
    }

    #[test]
    fn test_divide_inverts_multiply() {
        for a in 0..=255u8 {
            for b in 1..=255u8 {
                assert_eq!(divide(multiply(a, b), b).unwrap(), a);
            }
        }
    }

    #[test]
    fn test_divide_zero_numerator() {
        assert_eq!(divide(0, 7).unwrap(), 0);
        assert_eq!(divide(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_divide_by_zero_errors() {
        for a in 1..=255u8 {
            assert!(matches!(divide(a, 0), Err(ErasureError::DivideByZero)));
        }
    }

    #[test]
    fn test_exp_zeroth_power() {
        for base in 0..=255u8 {
            assert_eq!(exp(base, 0), 1);
        }
    }

    #[test]
    fn test_exp_repeated_multiply() {
        for base in [0u8, 1, 2, 3, 0x1D, 0xFF] {
            let mut expected = 1u8;
            for power in 0..16 {
                assert_eq!(exp(base, power), expected);
                expected = multiply(expected, base);
            }
        }
    }

    #[test]
    fn test_multiplication_table_matches_multiply() {
        let table = multiplication_table();
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                assert_eq!(table[a as usize][b as usize], multiply(a, b));
            }
        }
    }
}
