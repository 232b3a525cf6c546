use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use image::Rgb;

use qrbar::barcode::Barcode;
use qrbar::helper::{
    barcode_to_image, parse_color, print_qr, qr_to_image, save_image, to_svg_string,
    BarcodeOptions, RenderOptions, BLACK, WHITE,
};
use qrbar::qrcode::QrCode;

#[derive(Parser)]
#[command(name = "qrbar", version, about = "Generate QR codes and UPC-A barcodes as PNG images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode text as a byte-mode QR code (versions 2-4)
    Qr {
        /// Text to encode
        data: String,

        /// Pin the QR version (2-4) instead of picking the smallest that fits
        #[arg(long = "qr-version")]
        qr_version: Option<u8>,

        /// Module size in pixels
        #[arg(long, default_value_t = 4, value_parser = unit_arg())]
        unit: u32,

        /// Quiet zone width in modules
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(0..=MAX_QUIET_ZONE))]
        quiet_zone: u32,

        /// Write an SVG to stdout instead of a PNG
        #[arg(long)]
        svg: bool,

        /// Also print the code to the terminal
        #[arg(long)]
        print: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Encode an integer of up to 11 digits as a UPC-A barcode
    Barcode {
        /// Number to encode
        number: String,

        /// Only render the right half (last five digits and check digit)
        #[arg(long)]
        trimmed: bool,

        /// Bar unit width in pixels
        #[arg(long, default_value_t = 4, value_parser = unit_arg())]
        unit: u32,

        /// Bar height in pixels
        #[arg(long, default_value_t = 96, value_parser = clap::value_parser!(u32).range(1..=MAX_HEIGHT))]
        height: u32,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Dark color as #RRGGBB
    #[arg(long, value_parser = color_arg)]
    dark: Option<Rgb<u8>>,

    /// Light color as #RRGGBB
    #[arg(long, value_parser = color_arg)]
    light: Option<Rgb<u8>>,

    /// Output directory
    #[arg(long, default_value = "generated")]
    dir: String,

    /// Output file name without extension (defaults to a timestamp)
    #[arg(long)]
    name: Option<String>,
}

const MAX_UNIT: i64 = 256;
const MAX_QUIET_ZONE: i64 = 64;
const MAX_HEIGHT: i64 = 4096;

fn unit_arg() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=MAX_UNIT)
}

fn color_arg(s: &str) -> Result<Rgb<u8>, String> {
    parse_color(s).ok_or_else(|| format!("invalid color {:?}, expected #RRGGBB", s))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Qr { data, qr_version, unit, quiet_zone, svg, print, output } => {
            let qr = match qr_version {
                Some(v) => QrCode::encode_with_version(data.as_bytes(), v),
                None => QrCode::encode_text(&data),
            }
            .context("failed to encode QR code")?;
            log::debug!("encoded {} bytes as version {}", data.len(), qr.version().value());

            if print {
                print_qr(&qr);
            }
            if svg {
                print!("{}", to_svg_string(&qr, quiet_zone));
                return Ok(());
            }
            let options = RenderOptions {
                unit_size: unit,
                quiet_zone,
                dark: output.dark.unwrap_or(BLACK),
                light: output.light.unwrap_or(WHITE),
            };
            let img = qr_to_image(&qr, &options).context("failed to render QR code")?;
            save_image(&img, Some(output.dir.as_str()), output.name.as_deref())
                .context("failed to save QR code image")?;
        }
        Command::Barcode { number, trimmed, unit, height, output } => {
            let code: Barcode = number
                .parse()
                .with_context(|| format!("invalid barcode number {:?}", number))?;
            log::debug!("encoding UPC-A {}", code);
            let bars = if trimmed { code.encode_trimmed() } else { code.encode() };
            let options = BarcodeOptions {
                unit,
                height,
                dark: output.dark.unwrap_or(BLACK),
                light: output.light.unwrap_or(WHITE),
            };
            let img = barcode_to_image(&bars, &options).context("failed to render barcode")?;
            save_image(&img, Some(output.dir.as_str()), output.name.as_deref())
                .context("failed to save barcode image")?;
        }
    }
    Ok(())
}
