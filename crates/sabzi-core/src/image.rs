use std::fmt;

use sabzi_types::ImageSource;

/// JPEG payload ready for upload, with its pixel size
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
    source: ImageSource,
}

impl CapturedImage {
    pub fn new(jpeg: Vec<u8>, width: u32, height: u32, source: ImageSource) -> Self {
        Self {
            jpeg,
            width,
            height,
            source,
        }
    }

    pub fn jpeg(&self) -> &[u8] {
        &self.jpeg
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn source(&self) -> ImageSource {
        self.source
    }

    /// Attachment name used in the multipart upload
    pub fn file_name(&self) -> &'static str {
        match self.source {
            ImageSource::Camera => "captured_image.jpg",
            ImageSource::File => "upload.jpg",
        }
    }
}

impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("bytes", &self.jpeg.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source", &self.source)
            .finish()
    }
}
