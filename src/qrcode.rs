#![forbid(unsafe_code)]
//! QR code encoding functionality.
//!
//! Byte-mode encoding for QR Code Model 2 symbols of versions 2 to 4, at the
//! lowest error correction level with the fixed checkerboard mask (pattern 0).
//! The pipeline is: pick a version, encode the payload into data codewords,
//! append Reed-Solomon codewords, then lay the bit stream into a [`Matrix`].

use crate::error::CodeError;
use crate::matrix::Matrix;
use crate::reedsolomon::ReedSolomon;

/// A finished QR Code symbol: a square grid of dark and light modules.
///
/// Instances are immutable after creation. Encoding the same data with the same
/// version always yields the same modules.
///
/// # Example
///
/// ```rust
/// use qrbar::qrcode::QrCode;
///
/// let qr = QrCode::encode_text("Hello, World!").unwrap();
/// assert_eq!(qr.version().value(), 2);
/// assert_eq!(qr.size(), 25);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    config: Config,

    /// Row-major modules, `true` for dark.
    modules: Vec<bool>,
}

impl QrCode {
    /// Encodes a text string in byte mode, choosing the smallest version that fits.
    pub fn encode_text(text: &str) -> Result<Self, CodeError> {
        Self::encode(text.as_bytes())
    }

    /// Encodes binary data, choosing the smallest version that fits.
    ///
    /// Returns [`CodeError::UnsupportedVersion`] with `None` if the data does not fit
    /// any supported version.
    pub fn encode(data: &[u8]) -> Result<Self, CodeError> {
        let version = select_version(data)?;
        Self::encode_with_config(data, Config::new(version))
    }

    /// Encodes binary data into a symbol of the given version.
    ///
    /// # Errors
    ///
    /// - [`CodeError::UnsupportedVersion`] if `version` is outside 2..=4.
    /// - [`CodeError::InputTooLarge`] if the data exceeds the version's byte capacity.
    ///
    /// ```rust
    /// use qrbar::qrcode::QrCode;
    ///
    /// let qr = QrCode::encode_with_version(b"pinned", 4).unwrap();
    /// assert_eq!(qr.size(), 33);
    /// assert!(QrCode::encode_with_version(b"pinned", 5).is_err());
    /// ```
    pub fn encode_with_version(data: &[u8], version: u8) -> Result<Self, CodeError> {
        let config = Config::new(Version::new(version)?);
        Self::encode_with_config(data, config)
    }

    fn encode_with_config(data: &[u8], config: Config) -> Result<Self, CodeError> {
        let codewords = encode_codewords(data, &config)?;

        let mut matrix = Matrix::new(&config);
        let consumed = matrix.map_bits(codeword_bits(&codewords));
        debug_assert_eq!(consumed, config.total_codewords() * 8);
        let remainder = matrix.fill_remainder();
        log::trace!(
            "version {}: mapped {} bits, {} remainder modules",
            config.version().value(),
            consumed,
            remainder
        );
        matrix.apply_mask();
        matrix.write_format_info(format_word(ECL_LOW_BITS, MASK_PATTERN));

        Ok(Self {
            modules: matrix.into_modules(),
            config,
        })
    }

    /// Returns this QR Code's version, in the range [2, 4].
    pub fn version(&self) -> Version {
        self.config.version()
    }

    /// Returns this QR Code's side length in modules.
    pub fn size(&self) -> usize {
        self.config.size()
    }

    /// Returns the version parameters used to build this symbol.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Row-major modules, `true` for dark.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules. Coordinates outside
    /// the symbol's bounds return `false`, so renderers can read the quiet zone directly.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (column, 0 is left).
    /// * `y` - Y-coordinate (row, 0 is top).
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let size = self.size() as i32;
        let range = 0..size;
        range.contains(&x) && range.contains(&y) && self.modules[(y * size + x) as usize]
    }

    /// Reads the format information back out of the primary band next to the
    /// top-left finder and returns its unmasked 5-bit payload:
    /// error correction indicator in bits 4..3, mask pattern in bits 2..0.
    pub fn format_information(&self) -> u8 {
        let mut word: u16 = 0;
        for (row, col) in format_band_primary() {
            word = (word << 1) | u16::from(self.get_module(col as i32, row as i32));
        }
        ((word ^ FORMAT_XOR_MASK) >> 10) as u8
    }
}

/// Byte mode indicator.
const MODE_BYTE: u32 = 0b0100;

/// Width of the byte-mode character count field for versions 1 to 9.
const BYTE_COUNT_BITS: u8 = 8;

/// Bits reserved for the mode indicator and length field, rounded up to bytes.
const BYTE_MODE_OVERHEAD: usize = 2;

/// Alternating fill bytes appended after the terminator.
const PAD_BYTES: [u32; 2] = [0b1110_1100, 0b0001_0001];

/// Error correction level L in the format word.
pub const ECL_LOW_BITS: u8 = 0b01;

/// The only mask pattern applied: invert where `(row + col) % 2 == 0`.
pub const MASK_PATTERN: u8 = 0;

/// BCH(15,5) generator for format information.
const FORMAT_GENERATOR: u16 = 0b101_0011_0111;

/// XOR mask applied to the complete format word.
const FORMAT_XOR_MASK: u16 = 0b101_0100_0001_0010;

/// Computes the 15-bit format word for an error correction indicator and mask.
///
/// The 5-bit payload is shifted left by 10 and reduced by the BCH generator from
/// bit 14 down to bit 10; payload and 10-bit remainder are concatenated and XORed
/// with the fixed mask.
///
/// ```rust
/// use qrbar::qrcode::format_word;
///
/// assert_eq!(format_word(0b01, 0), 0b111_0111_1100_0100);
/// ```
pub fn format_word(ecl_bits: u8, mask: u8) -> u16 {
    assert!(ecl_bits <= 3 && mask <= 7, "Format field out of range");
    let data = (u16::from(ecl_bits) << 3) | u16::from(mask);
    let mut rem = data << 10;
    for i in (10..=14).rev() {
        if (rem >> i) & 1 != 0 {
            rem ^= FORMAT_GENERATOR << (i - 10);
        }
    }
    ((data << 10) | (rem & 0x3ff)) ^ FORMAT_XOR_MASK
}

/// Positions of the primary format band, most significant bit first:
/// row 8 across columns 0..=8 (skipping the timing column), then column 8
/// from row 7 up to row 0 (skipping the timing row).
pub(crate) fn format_band_primary() -> impl Iterator<Item = (usize, usize)> {
    let horizontal = (0..=8).filter(|&col| col != 6).map(|col| (8, col));
    let vertical = (0..=7).rev().filter(|&row| row != 6).map(|row| (row, 8));
    horizontal.chain(vertical)
}

/// Selects the smallest supported version whose byte capacity holds `data`.
pub fn select_version(data: &[u8]) -> Result<Version, CodeError> {
    let version = recommend_version_for_len(data.len(), Mode::Byte)
        .ok_or(CodeError::UnsupportedVersion(None))?;
    log::debug!("selected QR version {} for {} bytes", version.value(), data.len());
    Ok(version)
}

/// Recommends the smallest version able to hold `data` in the given mode.
///
/// Byte mode counts bytes, the other modes count characters. Versions 1 to 7 are
/// tried in order; versions without a codeword table are skipped, so only 2 to 4 can
/// be returned. `None` means the data is too large.
///
/// ```rust
/// use qrbar::qrcode::{recommend_version, Mode};
///
/// let v = recommend_version(&"A".repeat(34), Mode::Byte).unwrap();
/// assert_eq!(v.value(), 3);
/// ```
pub fn recommend_version(data: &str, mode: Mode) -> Option<Version> {
    let len = match mode {
        Mode::Byte => data.len(),
        Mode::Numeric | Mode::Alphanumeric => data.chars().count(),
    };
    recommend_version_for_len(len, mode)
}

/// Length-based form of [`recommend_version`].
pub fn recommend_version_for_len(len: usize, mode: Mode) -> Option<Version> {
    (1u8..=7)
        .find(|&ver| version_capacity(ver, mode).map_or(false, |capacity| len <= capacity))
        .and_then(|ver| Version::new(ver).ok())
}

/// Returns the capacity of a version in the given mode, or `None` for a version
/// without a codeword table.
///
/// Byte capacity is exact: data codewords minus two bytes for the mode indicator and
/// length field (three from version 5 on). Numeric and alphanumeric capacities are
/// coarse estimates of 0.3 and 0.18 characters per data bit, meant for rough sizing
/// only.
pub fn version_capacity(ver: u8, mode: Mode) -> Option<usize> {
    let entry = VersionEntry::lookup(ver)?;
    let databits = entry.data_codewords * 8;
    Some(match mode {
        Mode::Numeric => databits * 3 / 10,
        Mode::Alphanumeric => databits * 18 / 100,
        Mode::Byte => {
            let overhead = if ver <= 4 { BYTE_MODE_OVERHEAD } else { BYTE_MODE_OVERHEAD + 1 };
            entry.data_codewords - overhead
        }
    })
}

/// Data modes known to the capacity estimate. Only [`Mode::Byte`] is encoded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
}

/// Encodes `data` into exactly `config.data_codewords()` data codewords.
///
/// Layout: mode indicator `0100`, 8-bit byte count, payload, up to four terminator
/// zeros, zero padding to a byte boundary, then alternating `0xEC`/`0x11` fill.
pub fn encode_data(data: &[u8], config: &Config) -> Result<Vec<u8>, CodeError> {
    let capacity = config.byte_capacity();
    if data.len() > capacity {
        return Err(CodeError::InputTooLarge { len: data.len(), max: capacity });
    }
    let datacapacitybits: usize = config.data_codewords() * 8;
    let mut bb = BitBuffer::with_capacity(config.data_codewords());
    bb.append_bits(MODE_BYTE, 4);
    bb.append_bits(u32::try_from(data.len()).unwrap_or(u32::MAX), BYTE_COUNT_BITS);
    for &b in data {
        bb.append_bits(b.into(), 8);
    }

    // Add terminator and pad up to a byte if applicable
    let numzerobits: usize = core::cmp::min(4, datacapacitybits - bb.len());
    bb.append_bits(0, numzerobits as u8);
    let numzerobits: usize = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, numzerobits as u8);
    debug_assert_eq!(bb.len() % 8, 0);

    // Pad with alternating bytes until data capacity is reached
    for &padbyte in PAD_BYTES.iter().cycle() {
        if bb.len() >= datacapacitybits {
            break;
        }
        bb.append_bits(padbyte, 8);
    }
    debug_assert_eq!(bb.len(), datacapacitybits);
    Ok(bb.into_bytes())
}

/// Encodes `data` and appends the Reed-Solomon codewords, yielding all
/// `data_codewords + ec_codewords` codewords of the symbol.
pub fn encode_codewords(data: &[u8], config: &Config) -> Result<Vec<u8>, CodeError> {
    let mut codewords = encode_data(data, config)?;
    let ecc = ReedSolomon::new(config.ec_codewords()).compute_remainder(&codewords);
    codewords.extend_from_slice(&ecc);
    debug_assert_eq!(codewords.len(), config.total_codewords());
    Ok(codewords)
}

/// Iterates the bits of `codewords`, most significant bit of each byte first.
pub fn codeword_bits(codewords: &[u8]) -> impl Iterator<Item = bool> + '_ {
    codewords
        .iter()
        .flat_map(|&b| (0..8).rev().map(move |i| get_bit(b.into(), i)))
}

/// Appends bit fields most significant bit first, packing them into bytes.
#[derive(Clone, Debug, Default)]
pub struct BitBuffer {
    data: Vec<u8>,
    length: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            length: 0,
        }
    }

    /// Length in bits.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends the low `len` bits of `val`.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0);
        for i in (0..len).rev() {
            let shift: usize = 7 - (self.length & 7);
            if shift == 7 {
                self.data.push(0);
            }
            let bit: u8 = ((val >> i) as u8) & 1;
            self.data[self.length >> 3] |= bit << shift;
            self.length += 1;
        }
    }

    /// The packed bytes; a trailing partial byte is zero-filled.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Per-version constants for a supported QR version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    version: Version,
    size: usize,
    data_codewords: usize,
    ec_codewords: usize,
    alignment: &'static [usize],
}

impl Config {
    pub fn new(version: Version) -> Self {
        // Version guarantees a table entry
        let entry = VersionEntry::lookup(version.value()).unwrap_or(&VERSION_TABLE[0]);
        Self {
            version,
            size: 21 + 4 * (usize::from(version.value()) - 1),
            data_codewords: entry.data_codewords,
            ec_codewords: entry.ec_codewords,
            alignment: entry.alignment,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Side length of the module grid.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data_codewords(&self) -> usize {
        self.data_codewords
    }

    pub fn ec_codewords(&self) -> usize {
        self.ec_codewords
    }

    pub fn total_codewords(&self) -> usize {
        self.data_codewords + self.ec_codewords
    }

    /// Alignment-pattern center coordinates; every pairing is a candidate center.
    pub fn alignment(&self) -> &'static [usize] {
        self.alignment
    }

    /// Largest byte-mode payload this version holds.
    pub fn byte_capacity(&self) -> usize {
        self.data_codewords - BYTE_MODE_OVERHEAD
    }
}

struct VersionEntry {
    version: u8,
    data_codewords: usize,
    ec_codewords: usize,
    alignment: &'static [usize],
}

impl VersionEntry {
    fn lookup(ver: u8) -> Option<&'static VersionEntry> {
        VERSION_TABLE.iter().find(|entry| entry.version == ver)
    }
}

/// Level L codeword counts (single block) and alignment centers.
static VERSION_TABLE: [VersionEntry; 3] = [
    VersionEntry { version: 2, data_codewords: 34, ec_codewords: 10, alignment: &[18] },
    VersionEntry { version: 3, data_codewords: 55, ec_codewords: 15, alignment: &[6, 22] },
    VersionEntry { version: 4, data_codewords: 80, ec_codewords: 20, alignment: &[6, 26] },
];

/// A supported QR code version (2–4).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Version(u8);

impl Version {
    /// The smallest supported version.
    pub const MIN: Version = Version(2);

    /// The largest supported version.
    pub const MAX: Version = Version(4);

    /// Creates a version object from the given number.
    ///
    /// Returns [`CodeError::UnsupportedVersion`] outside the range [2, 4].
    pub fn new(ver: u8) -> Result<Self, CodeError> {
        if (Version::MIN.value()..=Version::MAX.value()).contains(&ver) {
            Ok(Self(ver))
        } else {
            Err(CodeError::UnsupportedVersion(Some(ver)))
        }
    }

    /// Returns the value, which is in the range [2, 4].
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Version {
    type Error = CodeError;

    fn try_from(ver: u8) -> Result<Self, Self::Error> {
        Version::new(ver)
    }
}

fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_sizes() {
        for ver in 2..=4u8 {
            let config = Config::new(Version::new(ver).unwrap());
            assert_eq!(config.size(), 21 + 4 * (usize::from(ver) - 1));
            assert_eq!(config.size() % 2, 1);
        }
        let v3 = Config::new(Version::new(3).unwrap());
        assert_eq!(v3.data_codewords(), 55);
        assert_eq!(v3.ec_codewords(), 15);
        assert_eq!(v3.alignment(), &[6, 22]);
    }

    #[test]
    fn test_unsupported_versions() {
        for ver in [0u8, 1, 5, 7, 40] {
            assert!(matches!(
                Version::new(ver),
                Err(CodeError::UnsupportedVersion(Some(v))) if v == ver
            ));
        }
        assert!(Version::try_from(3).is_ok());
    }

    #[test]
    fn test_version_capacity() {
        assert_eq!(version_capacity(1, Mode::Byte), None);
        assert_eq!(version_capacity(5, Mode::Byte), None);
        assert_eq!(version_capacity(2, Mode::Byte), Some(32));
        assert_eq!(version_capacity(3, Mode::Byte), Some(53));
        assert_eq!(version_capacity(4, Mode::Byte), Some(78));
        assert_eq!(version_capacity(2, Mode::Numeric), Some(81));
        assert_eq!(version_capacity(3, Mode::Numeric), Some(132));
        assert_eq!(version_capacity(4, Mode::Alphanumeric), Some(115));
    }

    #[test]
    fn test_recommend_version() {
        let v = |s: String| recommend_version(&s, Mode::Byte).map(Version::value);
        assert_eq!(v(String::new()), Some(2));
        assert_eq!(v("A".repeat(32)), Some(2));
        assert_eq!(v("A".repeat(33)), Some(3));
        assert_eq!(v("A".repeat(34)), Some(3));
        assert_eq!(v("A".repeat(53)), Some(3));
        assert_eq!(v("A".repeat(55)), Some(4));
        assert_eq!(v("A".repeat(78)), Some(4));
        assert_eq!(v("A".repeat(79)), None);
    }

    #[test]
    fn test_recommend_version_counts_bytes() {
        // 17 two-byte characters need 34 bytes
        let text = "é".repeat(17);
        assert_eq!(recommend_version(&text, Mode::Byte).map(Version::value), Some(3));
        assert_eq!(recommend_version(&text, Mode::Alphanumeric).map(Version::value), Some(2));
    }

    #[test]
    fn test_bit_buffer() {
        let mut bb = BitBuffer::new();
        assert!(bb.is_empty());
        bb.append_bits(0b0100, 4);
        bb.append_bits(0b1, 1);
        assert_eq!(bb.len(), 5);
        bb.append_bits(0xabc, 12);
        assert_eq!(bb.into_bytes(), vec![0b0100_1101, 0b0101_1110, 0b0000_0000]);
    }

    #[test]
    fn test_encode_data_layout() {
        let config = Config::new(Version::new(2).unwrap());
        let data = encode_data(b"hi", &config).unwrap();
        assert_eq!(data.len(), 34);
        assert_eq!(&data[..4], &[0x40, 0x26, 0x86, 0x90]);
        for (i, &b) in data[4..].iter().enumerate() {
            assert_eq!(b, if i % 2 == 0 { 0xec } else { 0x11 });
        }
    }

    #[test]
    fn test_encode_data_short_terminator() {
        // 32 bytes leave exactly 4 bits for the terminator on version 2
        let config = Config::new(Version::new(2).unwrap());
        let data = encode_data(&[0xff; 32], &config).unwrap();
        assert_eq!(data.len(), 34);
        assert_eq!(data[0], 0x42);
        assert_eq!(data[1], 0x0f);
        assert_eq!(data[33], 0xf0);
    }

    #[test]
    fn test_encode_data_rejects_oversize() {
        let config = Config::new(Version::new(2).unwrap());
        assert!(matches!(
            encode_data(&[0u8; 33], &config),
            Err(CodeError::InputTooLarge { len: 33, max: 32 })
        ));
    }

    #[test]
    fn test_codewords_length() {
        for ver in 2..=4u8 {
            let config = Config::new(Version::new(ver).unwrap());
            let codewords = encode_codewords(b"qrbar", &config).unwrap();
            assert_eq!(codewords.len(), config.total_codewords());
            assert_eq!(codeword_bits(&codewords).count(), config.total_codewords() * 8);
        }
    }

    #[test]
    fn test_codeword_bits_order() {
        let bits: Vec<bool> = codeword_bits(&[0b1000_0001]).collect();
        assert_eq!(bits, vec![true, false, false, false, false, false, false, true]);
    }

    #[test]
    fn test_format_word() {
        assert_eq!(format_word(ECL_LOW_BITS, MASK_PATTERN), 0x77c4);
        // Level M, mask 0 from the standard's table
        assert_eq!(format_word(0b00, 0), 0x5412);
    }

    #[test]
    fn test_format_band_positions() {
        let band: Vec<(usize, usize)> = format_band_primary().collect();
        assert_eq!(band.len(), 15);
        assert_eq!(band[0], (8, 0));
        assert_eq!(band[7], (8, 8));
        assert_eq!(band[8], (7, 8));
        assert_eq!(band[14], (0, 8));
        assert!(!band.contains(&(8, 6)) && !band.contains(&(6, 8)));
    }

    #[test]
    fn test_encode_selects_version() {
        assert_eq!(QrCode::encode(&[b'A'; 34]).unwrap().version().value(), 3);
        assert_eq!(QrCode::encode(&[b'A'; 55]).unwrap().version().value(), 4);
        assert!(matches!(
            QrCode::encode(&[b'A'; 79]),
            Err(CodeError::UnsupportedVersion(None))
        ));
    }

    #[test]
    fn test_pinned_version_too_small() {
        assert!(matches!(
            QrCode::encode_with_version(&[b'A'; 40], 2),
            Err(CodeError::InputTooLarge { len: 40, max: 32 })
        ));
        assert!(matches!(
            QrCode::encode_with_version(b"A", 1),
            Err(CodeError::UnsupportedVersion(Some(1)))
        ));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = QrCode::encode_with_version(b"https://example.com", 3).unwrap();
        let b = QrCode::encode_with_version(b"https://example.com", 3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.modules().len(), 29 * 29);
    }

    #[test]
    fn test_format_information_read_back() {
        let qr = QrCode::encode_text("format").unwrap();
        assert_eq!(qr.format_information(), (ECL_LOW_BITS << 3) | MASK_PATTERN);
    }

    #[test]
    fn test_format_modules_known_answer() {
        // 0x77C4 = 111011111000100, level L with mask 0
        let expected = "111011111000100";
        let qr = QrCode::encode_with_version(b"known answer", 2).unwrap();
        assert_eq!(qr.size(), 25);
        let module = |row: i32, col: i32| if qr.get_module(col, row) { '1' } else { '0' };

        let primary: String = [
            (8, 0), (8, 1), (8, 2), (8, 3), (8, 4), (8, 5), (8, 7), (8, 8),
            (7, 8), (5, 8), (4, 8), (3, 8), (2, 8), (1, 8), (0, 8),
        ]
        .iter()
        .map(|&(row, col)| module(row, col))
        .collect();
        assert_eq!(primary, expected);

        // Top-right copy, row 8 from column 17 to 24: bits 7..0
        let top_right: String = (17..25).map(|col| module(8, col)).collect();
        assert_eq!(top_right, "11000100");

        // Bottom-left copy, column 8 from row 24 up to row 18: bits 14..8
        let bottom_left: String = (18..25).rev().map(|row| module(row, 8)).collect();
        assert_eq!(bottom_left, "1110111");

        // Dark module just above the bottom-left copy
        assert_eq!(module(17, 8), '1');
        // Timing row between the separators
        let timing: String = (8..17).map(|col| module(6, col)).collect();
        assert_eq!(timing, "101010101");
    }

    #[test]
    fn test_get_module_out_of_bounds() {
        let qr = QrCode::encode_text("bounds").unwrap();
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(0, qr.size() as i32));
        // Finder corner
        assert!(qr.get_module(0, 0));
    }
}
