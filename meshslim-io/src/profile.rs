//! Serialization profiles tried by the export search

/// Bit depths for quantized vertex attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantization {
    pub position_bits: u8,
    pub normal_bits: u8,
    pub uv_bits: u8,
}

impl Quantization {
    pub fn new(position_bits: u8, normal_bits: u8, uv_bits: u8) -> Self {
        Self {
            position_bits,
            normal_bits,
            uv_bits,
        }
    }
}

/// How a scene is written to bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportProfile {
    pub name: String,
    /// `None` stores attributes as `f32`
    pub quantization: Option<Quantization>,
    /// Write texture payloads into the container instead of references
    pub embed_images: bool,
    /// Drop ancillary metadata chunks from embedded PNG images
    pub strip_image_metadata: bool,
    /// Pad every chunk to a 4-byte boundary
    pub align_chunks: bool,
    /// Use 16-bit indices when every index fits
    pub compact_indices: bool,
}

impl ExportProfile {
    /// Aggressive quantization
    pub fn high_compression() -> Self {
        Self {
            name: "high_compression".to_string(),
            quantization: Some(Quantization::new(11, 8, 10)),
            embed_images: true,
            strip_image_metadata: false,
            align_chunks: true,
            compact_indices: true,
        }
    }

    /// Looser quantization that every decoder handles
    pub fn compatible() -> Self {
        Self {
            name: "compatible".to_string(),
            quantization: Some(Quantization::new(14, 10, 12)),
            embed_images: true,
            strip_image_metadata: false,
            align_chunks: true,
            compact_indices: true,
        }
    }

    /// Uncompressed `f32` attributes and 32-bit indices
    pub fn plain_binary() -> Self {
        Self {
            name: "plain_binary".to_string(),
            quantization: None,
            embed_images: true,
            strip_image_metadata: false,
            align_chunks: true,
            compact_indices: false,
        }
    }

    /// Plain encoding that always embeds images and strips their metadata
    pub fn embedded_images() -> Self {
        Self {
            name: "embedded_images".to_string(),
            strip_image_metadata: true,
            ..Self::plain_binary()
        }
    }

    /// Unpadded re-encoding used by the minify pass
    pub fn minimal() -> Self {
        Self {
            name: "minimal".to_string(),
            quantization: None,
            embed_images: true,
            strip_image_metadata: false,
            align_chunks: false,
            compact_indices: true,
        }
    }

    pub fn with_embed_images(mut self, embed_images: bool) -> Self {
        self.embed_images = embed_images;
        self
    }

    pub fn is_quantized(&self) -> bool {
        self.quantization.is_some()
    }
}
