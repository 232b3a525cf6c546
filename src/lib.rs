//! # qrbar
//!
//! A small Rust library for generating QR codes and UPC-A barcodes and rendering them
//! to images.
//!
//! `qrbar` encodes byte strings into QR Code Model 2 symbols of versions 2 to 4, using
//! byte mode, the lowest error correction level and the fixed checkerboard mask. The
//! encoder produces a plain module grid; rendering to pixels is a separate step. The
//! UPC-A encoder turns an integer of up to 11 digits into a bar sequence with its
//! check digit.
//!
//! ## Features
//!
//! - Automatic version selection (2–4) or a pinned version.
//! - Reed-Solomon error correction over GF(256).
//! - UPC-A bar sequences, full or trimmed to the right half.
//! - Rendering to in-memory RGB image buffers, PNG files, SVG or terminal text.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Example
//!
//! Generate a QR code image buffer:
//!
//! ```rust
//! use qrbar::helper::{qr_to_image, RenderOptions};
//! use qrbar::qrcode::QrCode;
//!
//! let qr = QrCode::encode_text("https://example.com").unwrap();
//! let img = qr_to_image(&qr, &RenderOptions::default()).unwrap();
//! assert_eq!(img.width(), (qr.size() as u32 + 8) * 4);
//! ```
//!
//! Generate a barcode:
//!
//! ```rust
//! use qrbar::barcode::Barcode;
//! use qrbar::helper::{barcode_to_image, BarcodeOptions};
//!
//! let code = Barcode::new(12345678901).unwrap();
//! let img = barcode_to_image(&code.encode(), &BarcodeOptions::default()).unwrap();
//! assert_eq!(img.width(), 95 * 4);
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Version selection, data encoding and the finished symbol.
//! - [`matrix`]: Module grid construction, bit placement, masking and format information.
//! - [`reedsolomon`]: GF(256) arithmetic and Reed-Solomon codewords.
//! - [`barcode`]: UPC-A encoding.
//! - [`helper`]: Utilities for rendering codes in various formats.
//! - [`error`]: The error type shared by all of the above.

pub mod barcode;
pub mod error;
pub mod helper;
pub mod matrix;
pub mod qrcode;
pub mod reedsolomon;

pub use barcode::Barcode;
pub use error::CodeError;
pub use qrcode::{QrCode, Version};
