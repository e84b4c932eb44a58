//! pixnorm CLI - decode JPEG / JPEG 2000 images to canonical RGBA8.
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` to see pipeline
//! decisions such as inferred colour spaces and applied profiles.

use clap::{Parser, Subcommand, ValueEnum};
use pixnorm_rs::constants::DCT_MAGIC;
use pixnorm_rs::jpeg2000::jp2::detect_container;
use pixnorm_rs::jpeg2000::image::{ColorSpecification, Container};
use pixnorm_rs::{
    CmykConverter, DctImageDecoder, DecodeOptions, DecodeRegion, DeviceTransform, ImageInfo,
    WaveletImageDecoder,
};
use std::fs;
use std::path::PathBuf;

/// Decode-and-normalise pipeline for DCT and wavelet images
#[derive(Parser)]
#[command(name = "pixnorm")]
#[command(version)]
#[command(about = "Decode JPEG and JPEG 2000 images to 8-bit RGBA", long_about = None)]
#[command(after_help = "EXAMPLES:
    pixnorm decode -i page.jpg -o page.rgba
    pixnorm decode -i scan.jp2 -o scan.pam -f pam
    pixnorm decode -i print.jpg -o print.pam -f pam --profile USWebCoatedSWOP.icc
    pixnorm info -i scan.jp2
    pixnorm convert --profile USWebCoatedSWOP.icc 0 255 255 0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an image to RGBA8
    ///
    /// The input format is detected from its magic bytes.
    #[command(visible_alias = "d")]
    Decode {
        #[arg(short, long, help = "Path to the input image file")]
        input: PathBuf,

        #[arg(short, long, help = "Path for the output file")]
        output: PathBuf,

        /// Output format: raw RGBA bytes or PAM (P7, RGB_ALPHA)
        #[arg(short, long, default_value = "raw", value_enum)]
        format: OutputFormat,

        /// CMYK ICC profile used for four-component JPEG data
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Decode only x0 y0 x1 y1
        #[arg(long, num_args = 4, value_names = ["X0", "Y0", "X1", "Y1"])]
        region: Option<Vec<u32>>,

        /// Reject images with more pixels than this (0 disables)
        #[arg(long, default_value_t = pixnorm_rs::config::DEFAULT_MAX_PIXELS)]
        max_pixels: u64,

        /// Ignore ICC / CIELab data embedded in JP2 files
        #[arg(long)]
        ignore_embedded_profile: bool,
    },

    /// Display image dimensions and colour information
    #[command(visible_alias = "i")]
    Info {
        #[arg(short, long, help = "Path to the image file to inspect")]
        input: PathBuf,
    },

    /// Convert a single CMYK value to RGB through a device profile
    #[command(visible_alias = "c")]
    Convert {
        #[arg(long)]
        profile: PathBuf,
        c: u8,
        m: u8,
        y: u8,
        k: u8,
    },

    /// List supported input formats
    #[command(visible_alias = "l")]
    List,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Raw interleaved RGBA bytes
    Raw,
    /// Portable Arbitrary Map
    Pam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Dct,
    Wavelet(Container),
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            format,
            profile,
            region,
            max_pixels,
            ignore_embedded_profile,
        } => {
            let mut options = DecodeOptions::default()
                .with_max_pixels(max_pixels)
                .with_embedded_profile(!ignore_embedded_profile);
            if let Some(r) = region {
                options = options.with_region(DecodeRegion::new(r[0], r[1], r[2], r[3]));
            }
            decode_image(&input, &output, &format, profile.as_ref(), options)
        }
        Commands::Info { input } => show_info(&input),
        Commands::Convert { profile, c, m, y, k } => convert_pixel(&profile, [c, m, y, k]),
        Commands::List => list_formats(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn detect(data: &[u8]) -> Result<InputKind, Box<dyn std::error::Error>> {
    if data.starts_with(&DCT_MAGIC) {
        return Ok(InputKind::Dct);
    }
    detect_container(data)
        .map(InputKind::Wavelet)
        .ok_or_else(|| "unrecognised input format".into())
}

/// Loads the device profile. A rejected profile is reported and decoding
/// continues without CMYK support.
fn load_transform(path: Option<&PathBuf>) -> Result<Option<DeviceTransform>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = fs::read(path)?;
    match pixnorm_rs::setup(&bytes) {
        Ok(transform) => Ok(Some(transform)),
        Err(e) => {
            log::warn!("{:?}: {}; CMYK images will fail to decode", path, e);
            Ok(None)
        }
    }
}

fn decode_image(
    input: &PathBuf,
    output: &PathBuf,
    format: &OutputFormat,
    profile: Option<&PathBuf>,
    options: DecodeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let transform = load_transform(profile)?;

    let (info, pixels) = match detect(&data)? {
        InputKind::Dct => {
            let decoder = DctImageDecoder::with_options(&data, options);
            let mut pixels = allocate(&decoder.read_info()?)?;
            let converter = transform.as_ref().map(|t| t as &dyn CmykConverter);
            (decoder.decode(converter, &mut pixels)?, pixels)
        }
        InputKind::Wavelet(_) => {
            let decoder = WaveletImageDecoder::with_options(&data, options);
            let mut pixels = allocate(&decoder.read_info()?)?;
            (decoder.decode(&mut pixels)?, pixels)
        }
    };

    match format {
        OutputFormat::Raw => fs::write(output, &pixels)?,
        OutputFormat::Pam => write_pam(output, &pixels, info.width, info.height)?,
    }

    println!(
        "Decoded {}x{} image ({} components) to {:?}",
        info.width, info.height, info.component_count, output
    );
    Ok(())
}

fn allocate(info: &ImageInfo) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let len = info.rgba_len().ok_or("image too large for this platform")?;
    Ok(vec![0u8; len])
}

fn show_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;

    println!("File: {:?}", input);
    println!("Size: {} bytes", data.len());
    println!();

    match detect(&data)? {
        InputKind::Dct => {
            println!("Format: JPEG (DCT)");
            let info = DctImageDecoder::new(&data).read_info()?;
            println!("  Dimensions: {}x{}", info.width, info.height);
            println!("  Components: {}", info.component_count);
        }
        InputKind::Wavelet(container) => {
            println!(
                "Format: {}",
                match container {
                    Container::Jp2 => "JP2 Container (JPEG 2000)",
                    Container::Codestream => "JPEG 2000 Codestream",
                }
            );
            let header = WaveletImageDecoder::new(&data).read_header()?;
            let (width, height) = header.codestream.image_size();
            println!("  Dimensions: {}x{}", width, height);
            println!("  Components: {}", header.codestream.components.len());
            for (i, c) in header.codestream.components.iter().enumerate() {
                println!(
                    "    [{}] {} bit {}, sub-sampling {}x{}",
                    i,
                    c.precision,
                    if c.signed { "signed" } else { "unsigned" },
                    c.dx,
                    c.dy
                );
            }
            match &header.color {
                ColorSpecification::None => println!("  Colour:     not signalled"),
                ColorSpecification::Enumerated(space) => println!("  Colour:     {:?}", space),
                ColorSpecification::CieLab(_) => println!("  Colour:     CIELab"),
                ColorSpecification::Icc(icc) => println!("  Colour:     ICC profile ({} bytes)", icc.len()),
            }
        }
    }
    Ok(())
}

fn convert_pixel(profile: &PathBuf, cmyk: [u8; 4]) -> Result<(), Box<dyn std::error::Error>> {
    let transform = pixnorm_rs::setup(&fs::read(profile)?)?;
    let [c, m, y, k] = cmyk;
    let [r, g, b] = pixnorm_rs::convert_cmyk_pixel(&transform, c, m, y, k);
    println!("CMYK({}, {}, {}, {}) -> RGB({}, {}, {})", c, m, y, k, r, g, b);
    Ok(())
}

fn list_formats() -> Result<(), Box<dyn std::error::Error>> {
    println!("Supported Inputs:");
    println!();
    println!("  JPEG");
    println!("    Standard: ISO/IEC 10918-1 / ITU-T T.81");
    println!("    Layouts:  greyscale (8/16 bit), RGB, CMYK (with --profile)");
    println!();
    println!("  JPEG 2000 (.jp2 / .j2k)");
    println!("    Standard: ISO/IEC 15444-1");
    println!("    Colour:   sRGB, greyscale, sYCC, CMYK, CIELab, embedded ICC");
    println!();
    println!("Output: 8-bit RGBA, opaque alpha");
    Ok(())
}

fn write_pam(path: &PathBuf, pixels: &[u8], width: u32, height: u32) -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;
    let mut file = fs::File::create(path)?;

    writeln!(file, "P7")?;
    writeln!(file, "WIDTH {}", width)?;
    writeln!(file, "HEIGHT {}", height)?;
    writeln!(file, "DEPTH 4")?;
    writeln!(file, "MAXVAL 255")?;
    writeln!(file, "TUPLTYPE RGB_ALPHA")?;
    writeln!(file, "ENDHDR")?;
    file.write_all(pixels)?;

    Ok(())
}
