//! # Image Loading and Decoding
//!
//! Seal and signature rasters are fetched through an [`ImageProvider`], so
//! the renderer never touches the network itself and tests can substitute
//! a provider that always fails.
//!
//! JPEG images pass through without re-encoding (DCTDecode). PNG and WebP
//! images are decoded to RGB pixels with a separate alpha channel for SMask
//! transparency.

use std::io::Cursor;

use crate::error::CertError;

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Source of raster images for the vector renderer.
///
/// Implementations must be safe to share across concurrent renders. A
/// failed fetch is never fatal: the renderer falls back to a placeholder.
pub trait ImageProvider: Send + Sync {
    fn fetch(&self, src: &str) -> Result<LoadedImage, CertError>;
}

/// Loads data URIs, raw base64 and local files. Never touches the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceImageProvider;

impl ImageProvider for SourceImageProvider {
    fn fetch(&self, src: &str) -> Result<LoadedImage, CertError> {
        load_image(src)
    }
}

pub fn is_remote(src: &str) -> bool {
    let src = src.trim_start();
    src.starts_with("http://") || src.starts_with("https://")
}

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
pub use http::HttpImageProvider;

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
mod http {
    use std::time::Duration;

    use super::{decode_image_bytes, is_remote, load_image, ImageProvider, LoadedImage};
    use crate::error::CertError;

    /// Fetches `http(s)` sources; everything else is delegated to
    /// [`load_image`].
    ///
    /// Each remote fetch runs on its own scoped thread, which builds, uses
    /// and drops the blocking client. The calling thread never enters the
    /// client's internal runtime, so this is safe to call from inside an
    /// async host.
    #[derive(Debug, Clone, Copy)]
    pub struct HttpImageProvider {
        connect_timeout: Duration,
        timeout: Duration,
    }

    impl Default for HttpImageProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HttpImageProvider {
        pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
        pub const TIMEOUT: Duration = Duration::from_secs(15);

        pub fn new() -> Self {
            Self::with_timeouts(Self::CONNECT_TIMEOUT, Self::TIMEOUT)
        }

        pub fn with_timeouts(connect_timeout: Duration, timeout: Duration) -> Self {
            Self {
                connect_timeout,
                timeout,
            }
        }

        fn download(&self, url: &str) -> Result<Vec<u8>, CertError> {
            let client = reqwest::blocking::Client::builder()
                .connect_timeout(self.connect_timeout)
                .timeout(self.timeout)
                .build()
                .map_err(|e| CertError::Image(format!("cannot build HTTP client: {}", e)))?;
            let response = client
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| CertError::Image(format!("cannot fetch {:?}: {}", url, e)))?;
            let bytes = response
                .bytes()
                .map_err(|e| CertError::Image(format!("cannot read {:?}: {}", url, e)))?;
            Ok(bytes.to_vec())
        }
    }

    impl ImageProvider for HttpImageProvider {
        fn fetch(&self, src: &str) -> Result<LoadedImage, CertError> {
            if !is_remote(src) {
                return load_image(src);
            }
            let url = src.trim();
            let bytes = std::thread::scope(|scope| {
                scope
                    .spawn(|| self.download(url))
                    .join()
                    .unwrap_or_else(|_| {
                        Err(CertError::Image(format!("fetch of {:?} panicked", url)))
                    })
            })?;
            decode_image_bytes(&bytes)
        }
    }
}

/// Raster formats the loader accepts, identified by signature bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RasterFormat {
    Jpeg,
    Png,
    WebP,
}

impl RasterFormat {
    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG") {
            Some(Self::Png)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(Self::WebP)
        } else {
            None
        }
    }
}

/// Resolve a seal or signature source without the network: a data URI, a
/// path starting with `/`, `./` or `../`, or bare base64.
pub fn load_image(src: &str) -> Result<LoadedImage, CertError> {
    let bytes = source_bytes(src.trim())?;
    decode_image_bytes(&bytes)
}

fn source_bytes(src: &str) -> Result<Vec<u8>, CertError> {
    if src.is_empty() {
        return Err(CertError::Image("image source is empty".to_string()));
    }
    if let Some(uri) = src.strip_prefix("data:") {
        let (_, payload) = uri
            .split_once(',')
            .ok_or_else(|| CertError::Image("data URI has no payload".to_string()))?;
        return decode_base64(payload);
    }
    if is_remote(src) {
        return Err(CertError::Image(format!(
            "remote image {:?} needs an HTTP image provider",
            src
        )));
    }
    // Bare base64 may contain '/', so only explicit path prefixes count as files.
    if ["/", "./", "../"].iter().any(|p| src.starts_with(p)) {
        return read_file(src);
    }
    decode_base64(src)
}

#[cfg(not(target_arch = "wasm32"))]
fn read_file(path: &str) -> Result<Vec<u8>, CertError> {
    std::fs::read(path).map_err(|e| CertError::Image(format!("cannot read {:?}: {}", path, e)))
}

#[cfg(target_arch = "wasm32")]
fn read_file(path: &str) -> Result<Vec<u8>, CertError> {
    Err(CertError::Image(format!(
        "no filesystem in wasm; pass {:?} as a data URI",
        path
    )))
}

fn decode_base64(payload: &str) -> Result<Vec<u8>, CertError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| CertError::Image(format!("invalid base64 image: {}", e)))
}

/// Identify the format by signature and prepare it for embedding.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<LoadedImage, CertError> {
    match RasterFormat::sniff(bytes) {
        Some(RasterFormat::Jpeg) => passthrough_jpeg(bytes),
        Some(RasterFormat::Png) | Some(RasterFormat::WebP) => decode_raster(bytes),
        None => Err(CertError::Image(
            "not a JPEG, PNG or WebP image".to_string(),
        )),
    }
}

fn reader(bytes: &[u8]) -> Result<image::io::Reader<Cursor<&[u8]>>, CertError> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CertError::Image(format!("unrecognized image data: {}", e)))
}

/// JPEGs are embedded as-is; only the header is read.
fn passthrough_jpeg(bytes: &[u8]) -> Result<LoadedImage, CertError> {
    let (width_px, height_px) = reader(bytes)?
        .into_dimensions()
        .map_err(|e| CertError::Image(format!("corrupt JPEG header: {}", e)))?;
    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: bytes.to_vec(),
            color_space: jpeg_color_space(bytes),
        },
        width_px,
        height_px,
    })
}

/// Walk the JPEG segments to the first start-of-frame and read its
/// component count. Anything unexpected is treated as RGB.
fn jpeg_color_space(bytes: &[u8]) -> JpegColorSpace {
    let mut pos = 2;
    while let Some(&[0xFF, marker, len_hi, len_lo]) = bytes.get(pos..pos + 4) {
        let start_of_frame = matches!(
            marker,
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF
        );
        if start_of_frame {
            return match bytes.get(pos + 9) {
                Some(1) => JpegColorSpace::DeviceGray,
                _ => JpegColorSpace::DeviceRGB,
            };
        }
        pos += 2 + u16::from_be_bytes([len_hi, len_lo]) as usize;
    }
    JpegColorSpace::DeviceRGB
}

/// Decode to RGB plus an alpha plane, dropping the plane when every pixel
/// is opaque.
fn decode_raster(bytes: &[u8]) -> Result<LoadedImage, CertError> {
    let rgba = reader(bytes)?
        .decode()
        .map_err(|e| CertError::Image(format!("cannot decode image: {}", e)))?
        .into_rgba8();
    let (width_px, height_px) = rgba.dimensions();

    let raw = rgba.into_raw();
    let rgb: Vec<u8> = raw
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let alpha: Vec<u8> = raw.chunks_exact(4).map(|px| px[3]).collect();
    let translucent = alpha.iter().any(|&a| a < 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: translucent.then_some(alpha),
        },
        width_px,
        height_px,
    })
}
