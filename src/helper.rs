use crate::barcode::Barcode;
use crate::error::CodeError;
use crate::qrcode::QrCode;

use image::{ImageBuffer, Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Color for dark modules and bars.
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Color for light modules, bars and the quiet zone.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Rendering parameters for QR codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Width and height of one module in pixels.
    pub unit_size: u32,
    /// Light border around the symbol, in modules.
    pub quiet_zone: u32,
    pub dark: Rgb<u8>,
    pub light: Rgb<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            unit_size: 4,
            quiet_zone: 4,
            dark: BLACK,
            light: WHITE,
        }
    }
}

/// Rendering parameters for barcodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarcodeOptions {
    /// Width of one bar unit in pixels.
    pub unit: u32,
    /// Bar height in pixels.
    pub height: u32,
    pub dark: Rgb<u8>,
    pub light: Rgb<u8>,
}

impl Default for BarcodeOptions {
    fn default() -> Self {
        Self {
            unit: 4,
            height: 96,
            dark: BLACK,
            light: WHITE,
        }
    }
}

/*---- Utilities ----*/

/// Renders a QR code as an RGB image.
///
/// Each module becomes a `unit_size` x `unit_size` square, surrounded by
/// `quiet_zone` light modules on every side, so the image side length is
/// `(size + 2 * quiet_zone) * unit_size`.
///
/// Returns [`CodeError::InvalidRenderSize`] if `unit_size` is zero or the side
/// length does not fit in a `u32`.
///
/// # Example
///
/// ```rust
/// use qrbar::helper::{qr_to_image, RenderOptions};
/// use qrbar::qrcode::QrCode;
///
/// let qr = QrCode::encode_text("Hello, World!").unwrap();
/// let img = qr_to_image(&qr, &RenderOptions::default()).unwrap();
/// assert_eq!(img.dimensions(), (132, 132));
/// ```
pub fn qr_to_image(qr: &QrCode, options: &RenderOptions) -> Result<RgbImage, CodeError> {
    let unit = options.unit_size;
    let border = options.quiet_zone;
    let side = u32::try_from(qr.size())
        .ok()
        .and_then(|size| border.checked_mul(2)?.checked_add(size))
        .and_then(|modules| scaled_length(modules, unit))
        .ok_or_else(|| too_large(unit))?;
    Ok(ImageBuffer::from_fn(side, side, |x, y| {
        let qr_x = i64::from(x / unit) - i64::from(border);
        let qr_y = i64::from(y / unit) - i64::from(border);
        let dark = match (i32::try_from(qr_x), i32::try_from(qr_y)) {
            (Ok(qr_x), Ok(qr_y)) => qr.get_module(qr_x, qr_y),
            _ => false,
        };
        if dark {
            options.dark
        } else {
            options.light
        }
    }))
}

/// Renders a bar sequence as an RGB image `bars.len() * unit` pixels wide.
///
/// Returns [`CodeError::InvalidRenderSize`] for a zero unit or height, or a width
/// that does not fit in a `u32`.
pub fn barcode_to_image(bars: &[bool], options: &BarcodeOptions) -> Result<RgbImage, CodeError> {
    let unit = options.unit;
    if options.height == 0 {
        return Err(CodeError::InvalidRenderSize("height must be positive".to_string()));
    }
    let width = u32::try_from(bars.len())
        .ok()
        .and_then(|len| scaled_length(len, unit))
        .ok_or_else(|| too_large(unit))?;
    Ok(ImageBuffer::from_fn(width, options.height, |x, _| {
        if bars[(x / unit) as usize] {
            options.dark
        } else {
            options.light
        }
    }))
}

/// `modules * unit`, or `None` for a zero unit or on overflow.
fn scaled_length(modules: u32, unit: u32) -> Option<u32> {
    if unit == 0 {
        return None;
    }
    modules.checked_mul(unit)
}

fn too_large(unit: u32) -> CodeError {
    if unit == 0 {
        CodeError::InvalidRenderSize("unit must be positive".to_string())
    } else {
        CodeError::InvalidRenderSize(format!("image dimensions overflow at unit {}", unit))
    }
}

// Returns a string of SVG code for an image depicting
// the given QR Code, with the given number of border modules.
// The string always uses Unix newlines (\n), regardless of the platform.
pub fn to_svg_string(qr: &QrCode, border: u32) -> String {
    let border = border as i32;
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    let dimension = qr.size() as i32 + border * 2;
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        dimension
    );
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    result += "\t<path d=\"";
    let mut first = true;
    for y in 0..qr.size() as i32 {
        for x in 0..qr.size() as i32 {
            if qr.get_module(x, y) {
                if !first {
                    result += " ";
                }
                first = false;
                result += &format!("M{},{}h1v1h-1z", x + border, y + border);
            }
        }
    }
    result += "\" fill=\"#000000\"/>\n";
    result += "</svg>\n";
    result
}

/// Renders the QR code as text, two characters per module.
pub fn to_ascii_string(qr: &QrCode, border: u32) -> String {
    let border = border as i32;
    let size = qr.size() as i32;
    let mut result = String::new();
    for y in -border..size + border {
        for x in -border..size + border {
            let c: char = if qr.get_module(x, y) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Prints the given QrCode object to the console.
pub fn print_qr(qr: &QrCode) {
    println!("{}", to_ascii_string(qr, 4));
}

/// Saves an image as PNG and returns the written path.
///
/// # Arguments
///
/// * `img` - The image to save.
/// * `directory_path` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file, without extension. If not provided, a timestamp-based filename will be used.
pub fn save_image(
    img: &RgbImage,
    directory_path: Option<&str>,
    filename: Option<&str>,
) -> Result<PathBuf, CodeError> {
    let directory_path = directory_path.unwrap_or("generated");
    let filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            since_the_epoch.as_millis().to_string()
        }
    };

    // Check if the directory exists, create it if it doesn't
    if !Path::new(directory_path).exists() {
        fs::create_dir_all(directory_path)?;
    }

    let file_path = Path::new(directory_path).join(format!("{}.png", filename));
    img.save(&file_path)?;
    log::info!("wrote {}x{} image to {}", img.width(), img.height(), file_path.display());
    Ok(file_path)
}

/// Generates a QR Code image buffer from the provided content with default options.
///
/// # Example
///
/// ```
/// use qrbar::helper::generate_image_buffer;
///
/// let img_buffer = generate_image_buffer("Hello, World!").unwrap();
/// assert_eq!(img_buffer.width(), (25 + 2 * 4) * 4);
/// ```
pub fn generate_image_buffer(content: &str) -> Result<RgbImage, CodeError> {
    let qr = QrCode::encode_text(content)?;
    qr_to_image(&qr, &RenderOptions::default())
}

/// Generates a QR Code image from the provided content and saves it to a file.
///
/// # Arguments
///
/// * `content` - The content to encode into the QR Code.
/// * `directory` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file. If not provided, a timestamp-based filename will be used.
///
/// # Example
///
/// ```no_run
/// use qrbar::helper::generate_image;
///
/// generate_image("Hello, World!", Some("images"), Some("qr_code")).unwrap();
/// ```
pub fn generate_image(
    content: &str,
    directory: Option<&str>,
    filename: Option<&str>,
) -> Result<PathBuf, CodeError> {
    let img = generate_image_buffer(content)?;
    save_image(&img, directory, filename)
}

/// Generates a UPC-A barcode image for `number`, full or trimmed.
pub fn generate_barcode_image(
    number: u64,
    trimmed: bool,
    options: &BarcodeOptions,
) -> Result<RgbImage, CodeError> {
    let code = Barcode::new(number)?;
    let bars = if trimmed { code.encode_trimmed() } else { code.encode() };
    barcode_to_image(&bars, options)
}

/// Parses a `#RRGGBB` or `RRGGBB` color.
pub fn parse_color(s: &str) -> Option<Rgb<u8>> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_svg_string() {
        let qr = QrCode::encode_text("HELLO WORLD").unwrap();
        let svg = to_svg_string(&qr, 4);

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 33 33\""));
        assert!(svg.contains("M4,4h1v1h-1z"));
    }

    #[test]
    fn test_to_ascii_string() {
        let qr = QrCode::encode_text("ascii").unwrap();
        let text = to_ascii_string(&qr, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 27);
        assert_eq!(lines[0].chars().count(), 54);
        assert!(lines[1].starts_with("  ██"));
    }

    #[test]
    fn test_generate_image_buffer() {
        let img = generate_image_buffer("Hello, world!").unwrap();

        // Version 2 is 25 modules wide; with the 4-module quiet zone at
        // 4 pixels per module the image is 132 pixels square.
        assert_eq!(img.dimensions(), (132, 132));
    }

    #[test]
    fn test_qr_to_image_pixels() {
        let qr = QrCode::encode_text("pixels").unwrap();
        let options = RenderOptions {
            unit_size: 2,
            quiet_zone: 1,
            dark: Rgb([10, 20, 30]),
            light: Rgb([200, 210, 220]),
        };
        let img = qr_to_image(&qr, &options).unwrap();
        assert_eq!(img.width(), (25 + 2) * 2);
        assert_eq!(*img.get_pixel(0, 0), options.light);
        assert_eq!(*img.get_pixel(1, 1), options.light);
        // Top-left finder corner starts after the quiet zone
        assert_eq!(*img.get_pixel(2, 2), options.dark);
        assert_eq!(*img.get_pixel(3, 3), options.dark);
    }

    #[test]
    fn test_barcode_to_image() {
        let options = BarcodeOptions::default();
        let img = generate_barcode_image(12345678901, false, &options).unwrap();
        assert_eq!(img.dimensions(), (95 * 4, 96));
        // Left guard 101
        assert_eq!(*img.get_pixel(0, 0), BLACK);
        assert_eq!(*img.get_pixel(4, 50), WHITE);
        assert_eq!(*img.get_pixel(8, 95), BLACK);

        let trimmed = generate_barcode_image(12345678901, true, &options).unwrap();
        assert_eq!(trimmed.width(), 42 * 4);
    }

    #[test]
    fn test_generate_barcode_image_rejects_oversize() {
        let err = generate_barcode_image(123456789012, false, &BarcodeOptions::default());
        assert!(matches!(err, Err(CodeError::InputTooLarge { .. })));
    }

    #[test]
    fn test_render_rejects_zero_unit() {
        let qr = QrCode::encode_text("zero").unwrap();
        let options = RenderOptions {
            unit_size: 0,
            ..RenderOptions::default()
        };
        assert!(matches!(
            qr_to_image(&qr, &options),
            Err(CodeError::InvalidRenderSize(_))
        ));

        let bars = Barcode::new(42).unwrap().encode();
        let zero_unit = BarcodeOptions {
            unit: 0,
            ..BarcodeOptions::default()
        };
        assert!(matches!(
            barcode_to_image(&bars, &zero_unit),
            Err(CodeError::InvalidRenderSize(_))
        ));
        let zero_height = BarcodeOptions {
            height: 0,
            ..BarcodeOptions::default()
        };
        assert!(matches!(
            barcode_to_image(&bars, &zero_height),
            Err(CodeError::InvalidRenderSize(_))
        ));
    }

    #[test]
    fn test_render_rejects_overflowing_size() {
        let qr = QrCode::encode_text("overflow").unwrap();
        let huge_unit = RenderOptions {
            unit_size: u32::MAX,
            ..RenderOptions::default()
        };
        assert!(matches!(
            qr_to_image(&qr, &huge_unit),
            Err(CodeError::InvalidRenderSize(_))
        ));
        let huge_border = RenderOptions {
            quiet_zone: u32::MAX,
            ..RenderOptions::default()
        };
        assert!(matches!(
            qr_to_image(&qr, &huge_border),
            Err(CodeError::InvalidRenderSize(_))
        ));

        let bars = Barcode::new(42).unwrap().encode();
        let wide = BarcodeOptions {
            unit: u32::MAX / 10,
            ..BarcodeOptions::default()
        };
        assert!(matches!(
            barcode_to_image(&bars, &wide),
            Err(CodeError::InvalidRenderSize(_))
        ));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000"), Some(Rgb([255, 128, 0])));
        assert_eq!(parse_color("000000"), Some(BLACK));
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("zzzzzz"), None);
    }

    #[test]
    fn test_save_image() {
        let dir = std::env::temp_dir().join("qrbar-helper-test");
        let dir = dir.to_str().unwrap();
        let img = generate_image_buffer("save me").unwrap();
        let path = save_image(&img, Some(dir), Some("qr")).unwrap();
        assert!(path.exists());
        let reloaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(reloaded.dimensions(), img.dimensions());
        fs::remove_file(path).unwrap();
    }
}
