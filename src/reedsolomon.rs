//! Reed-Solomon error correction over GF(256).
//!
//! The field is generated by the QR primitive polynomial `x^8 + x^4 + x^3 + x^2 + 1`
//! (`0x11D`). Polynomials are coefficient slices ordered from the highest degree down,
//! and field addition is XOR.

/// The QR primitive polynomial, including the `x^8` term.
const PRIMITIVE_POLYNOMIAL: u16 = 0x11d;

/// Shared field tables, built at compile time.
pub static GF256: Gf256 = Gf256::new();

/// Exponent and logarithm tables for GF(256).
///
/// `exp` is 512 entries long: the first 255 entries repeat from index 255 on, so
/// the sum of two logarithms can index it without reducing modulo 255.
/// `log[0]` is meaningless and never read.
pub struct Gf256 {
    exp: [u8; 512],
    log: [u8; 256],
}

impl Gf256 {
    /// Builds the tables starting from generator value 1.
    pub const fn new() -> Self {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        let mut i = 0;
        while i < 255 {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE_POLYNOMIAL;
            }
            i += 1;
        }
        while i < exp.len() {
            exp[i] = exp[i - 255];
            i += 1;
        }
        Self { exp, log }
    }

    /// Returns alpha raised to the power `i`, for `i` below 512.
    pub fn exp(&self, i: usize) -> u8 {
        self.exp[i]
    }

    /// Returns the discrete logarithm of a nonzero element.
    pub fn log(&self, x: u8) -> u8 {
        debug_assert_ne!(x, 0, "log of zero is undefined");
        self.log[usize::from(x)]
    }

    /// Multiplies two field elements.
    pub fn mul(&self, x: u8, y: u8) -> u8 {
        if x == 0 || y == 0 {
            return 0;
        }
        self.exp[usize::from(self.log[usize::from(x)]) + usize::from(self.log[usize::from(y)])]
    }

    /// Divides `x` by the nonzero element `y`.
    pub fn div(&self, x: u8, y: u8) -> u8 {
        assert_ne!(y, 0, "Division by zero");
        if x == 0 {
            return 0;
        }
        self.exp[usize::from(self.log[usize::from(x)]) + 255 - usize::from(self.log[usize::from(y)])]
    }

    /// Multiplies two polynomials.
    ///
    /// The result has `a.len() + b.len() - 1` coefficients, each the XOR-sum of the
    /// pairwise products contributing to that degree.
    ///
    /// ```rust
    /// use qrbar::reedsolomon::GF256;
    ///
    /// // (x + 1)(x + 2) = x^2 + 3x + 2
    /// assert_eq!(GF256.multiply(&[1, 1], &[1, 2]), vec![1, 3, 2]);
    /// ```
    pub fn multiply(&self, a: &[u8], b: &[u8]) -> Vec<u8> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }
        let mut result = vec![0u8; a.len() + b.len() - 1];
        for (i, &x) in a.iter().enumerate() {
            for (j, &y) in b.iter().enumerate() {
                result[i + j] ^= self.mul(x, y);
            }
        }
        result
    }

    /// Divides `dividend` by `divisor` and returns the remainder, which has
    /// `divisor.len() - 1` coefficients.
    ///
    /// # Panics
    ///
    /// Panics if `divisor` is empty or its leading coefficient is zero.
    pub fn divide(&self, dividend: &[u8], divisor: &[u8]) -> Vec<u8> {
        self.div_rem(dividend, divisor).1
    }

    /// Polynomial long division returning `(quotient, remainder)`.
    ///
    /// For every leading nonzero coefficient the divisor is scaled by the ratio of
    /// that coefficient to the divisor's lead and XORed into the running dividend.
    pub fn div_rem(&self, dividend: &[u8], divisor: &[u8]) -> (Vec<u8>, Vec<u8>) {
        assert!(
            divisor.first().map_or(false, |&lead| lead != 0),
            "Divisor must have a nonzero leading coefficient"
        );
        let degree = divisor.len() - 1;
        if dividend.len() < divisor.len() {
            let mut remainder = vec![0u8; degree - dividend.len()];
            remainder.extend_from_slice(dividend);
            return (Vec::new(), remainder);
        }

        let mut rem = dividend.to_vec();
        let steps = dividend.len() - divisor.len() + 1;
        let mut quotient = vec![0u8; steps];
        let leadlog = usize::from(self.log[usize::from(divisor[0])]);
        for i in 0..steps {
            let coef = rem[i];
            if coef == 0 {
                continue;
            }
            // log(coef / lead), kept non-negative
            let factor = (usize::from(self.log[usize::from(coef)]) + 255 - leadlog) % 255;
            quotient[i] = self.exp[factor];
            for (j, &d) in divisor.iter().enumerate() {
                if d == 0 {
                    continue;
                }
                rem[i + j] ^= self.exp[usize::from(self.log[usize::from(d)]) + factor];
            }
        }
        let remainder = rem.split_off(rem.len() - degree);
        (quotient, remainder)
    }
}

impl Default for Gf256 {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes error-correction codewords for a single block.
///
/// The generator polynomial is `(x + a^0)(x + a^1)...(x + a^(degree-1))`, built
/// once at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReedSolomon {
    generator: Vec<u8>,
}

impl ReedSolomon {
    /// Creates an encoder producing `degree` parity codewords.
    pub fn new(degree: usize) -> Self {
        assert!(degree < 255, "Degree out of range");
        let mut generator = vec![1u8];
        for i in 0..degree {
            generator = GF256.multiply(&generator, &[1, GF256.exp(i)]);
        }
        Self { generator }
    }

    /// Number of parity codewords produced.
    pub fn degree(&self) -> usize {
        self.generator.len() - 1
    }

    /// The generator polynomial, leading coefficient first.
    pub fn generator(&self) -> &[u8] {
        &self.generator
    }

    /// Returns the parity codewords for `data`: the remainder of
    /// `data * x^degree` divided by the generator polynomial.
    ///
    /// ```rust
    /// use qrbar::reedsolomon::ReedSolomon;
    ///
    /// let rs = ReedSolomon::new(10);
    /// let ecc = rs.compute_remainder(b"hello");
    /// assert_eq!(ecc.len(), 10);
    /// ```
    pub fn compute_remainder(&self, data: &[u8]) -> Vec<u8> {
        let mut padded = Vec::with_capacity(data.len() + self.degree());
        padded.extend_from_slice(data);
        padded.resize(data.len() + self.degree(), 0);
        GF256.divide(&padded, &self.generator)
    }
}
