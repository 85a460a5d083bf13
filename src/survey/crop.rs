use anyhow::{Result, anyhow};
use image::{DynamicImage, ImageError, ImageFormat};
use std::io::Cursor;

use super::Bounds;

/// Crops a sub-region from an image using absolute pixel bounds.
///
/// Bounds are taken as-is. They come from the fixed region table, so a
/// rectangle that does not fit inside the image is reported as an error
/// instead of being clamped.
pub fn crop_region(img: &DynamicImage, bounds: &Bounds) -> Result<DynamicImage> {
    let (w, h) = (img.width(), img.height());

    if bounds.x1 >= bounds.x2 || bounds.y1 >= bounds.y2 || bounds.x2 > w || bounds.y2 > h {
        return Err(anyhow!(
            "Crop bounds {:?} do not fit inside a {}x{} image",
            <[u32; 4]>::from(*bounds),
            w,
            h
        ));
    }

    Ok(img.crop_imm(bounds.x1, bounds.y1, bounds.width(), bounds.height()))
}

/// Encodes an image as PNG bytes for upload.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::REGIONS;
    use image::{ImageBuffer, Rgba};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let buf: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        DynamicImage::ImageRgba8(buf)
    }

    #[test]
    fn test_crop_region() {
        let img = gradient(100, 200);
        let cropped = crop_region(&img, &Bounds::new(10, 50, 60, 70)).unwrap();

        assert_eq!((cropped.width(), cropped.height()), (50, 20));
        // Top-left pixel should be (10, 50) from original
        let px = cropped.to_rgba8().get_pixel(0, 0).0;
        assert_eq!(px[0], 10);
        assert_eq!(px[1], 50);
    }

    #[test]
    fn test_crop_region_full_image() {
        let img = gradient(40, 30);
        let cropped = crop_region(&img, &Bounds::new(0, 0, 40, 30)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (40, 30));
    }

    #[test]
    fn test_crop_region_out_of_range_is_error() {
        let img = gradient(100, 100);
        assert!(crop_region(&img, &Bounds::new(90, 90, 150, 150)).is_err());
        assert!(crop_region(&img, &Bounds::new(0, 0, 101, 10)).is_err());
    }

    #[test]
    fn test_crop_survey_regions_sizes() {
        // Survey sheets are scanned at 900x1250 or larger
        let img = DynamicImage::new_rgb8(900, 1250);
        for region in &REGIONS {
            let b = region.bounds;
            let cropped = crop_region(&img, &b).unwrap();
            assert_eq!(
                (cropped.width(), cropped.height()),
                (b.x2 - b.x1, b.y2 - b.y1),
                "region {}",
                region.id
            );
        }
    }

    #[test]
    fn test_encode_png_signature() {
        let bytes = encode_png(&gradient(4, 4)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
    }
}
